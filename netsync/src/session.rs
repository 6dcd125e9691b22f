//! One peer's view of a two-car race.

use physics::{CarProgress, Checkpoint, RaceWorld};
use tracing::{debug, info, warn};
use wire::{
    decode_game_state, decode_input, ControlState, DecodeError, GamePhase, GameStatePacket,
    InputSample, PacketKind,
};

use crate::config::SyncConfig;
use crate::error::{SyncError, SyncResult};
use crate::events::{LinkEvent, SyncEvent};
use crate::history::{control_input, InputHistory, PredictionKind, HISTORY_CAPACITY};
use crate::inbox::InboxReceiver;
use crate::reconcile::{correct, should_rollback, BlendCorrection, CarSnapshot};
use crate::ring::FrameRing;
use crate::role::Role;
use crate::tracker::{FrameTracker, TrackerStats};

/// Outcome of one [`SyncSession::tick`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TickReport {
    /// Frame that was simulated.
    pub frame: u32,
    /// How the remote car's input for the frame was obtained.
    pub remote_prediction: PredictionKind,
    /// The remote peer is further behind than predictions should run.
    pub input_late: bool,
    pub events: Vec<SyncEvent>,
}

/// The synchronization state owned by one peer.
///
/// Every peer simulates both cars. Its own car runs on recorded input; the
/// other runs on received input when it has arrived and on prediction when
/// it has not. Authoritative game-state packets from the other peer correct
/// the remote car when the prediction drifted.
#[derive(Debug, Clone)]
pub struct SyncSession {
    config: SyncConfig,
    role: Role,
    phase: GamePhase,
    world: RaceWorld,
    history: InputHistory,
    tracker: FrameTracker,
    predicted_remote: FrameRing<CarSnapshot, HISTORY_CAPACITY>,
    blend: Option<BlendCorrection>,
    /// Frame of the newest game-state packet accepted from the other peer.
    last_state_frame: Option<u32>,
    /// First frame whose stored prediction reflects the last correction.
    settled_frame: u32,
}

impl SyncSession {
    /// Creates a session with both cars on the grid, waiting for a connection.
    #[must_use]
    pub fn new(config: SyncConfig, role: Role, checkpoints: Vec<Checkpoint>) -> Self {
        let mut session = Self {
            config,
            role,
            phase: GamePhase::Racing,
            world: RaceWorld::new(config.physics, checkpoints),
            history: InputHistory::new(),
            tracker: FrameTracker::new(config.max_prediction_frames),
            predicted_remote: FrameRing::new(),
            blend: None,
            last_state_frame: None,
            settled_frame: 0,
        };
        session.record_remote_snapshot();
        session
    }

    pub const fn config(&self) -> &SyncConfig {
        &self.config
    }

    pub const fn role(&self) -> Role {
        self.role
    }

    pub const fn world(&self) -> &RaceWorld {
        &self.world
    }

    pub const fn history(&self) -> &InputHistory {
        &self.history
    }

    pub const fn tracker(&self) -> &FrameTracker {
        &self.tracker
    }

    pub const fn stats(&self) -> TrackerStats {
        self.tracker.stats()
    }

    /// The frame the next [`tick`](Self::tick) will simulate.
    pub const fn current_frame(&self) -> u32 {
        self.history.current_frame()
    }

    pub const fn phase(&self) -> GamePhase {
        self.phase
    }

    pub fn set_phase(&mut self, phase: GamePhase) {
        self.phase = phase;
    }

    /// Applies a link state change. Either direction restarts the race and
    /// discards all history.
    pub fn handle_connection(&mut self, connected: bool) -> SyncEvent {
        self.reset();
        self.tracker.set_connected(connected, self.role.is_host());
        info!(connected, role = ?self.role, "link state changed");
        SyncEvent::ConnectionChanged { connected }
    }

    fn reset(&mut self) {
        self.history.clear();
        self.tracker.reset();
        self.predicted_remote.clear();
        self.blend = None;
        self.last_state_frame = None;
        self.settled_frame = 0;
        self.world.reset_race();
        self.record_remote_snapshot();
    }

    /// Remembers where the remote car is at the start of the current frame.
    fn record_remote_snapshot(&mut self) {
        let frame = self.history.current_frame();
        if let Some(car) = self.world.car(self.role.remote_slot()) {
            self.predicted_remote.store(frame, CarSnapshot::of(frame, car));
        }
    }

    /// Quantizes this peer's controls for the current frame, records them and
    /// returns the packet to send.
    pub fn record_local_input(&mut self, controls: &ControlState, now_ms: u16) -> Vec<u8> {
        let frame = self.history.current_frame();
        let sample = InputSample::quantize(self.role.local_id(), frame, now_ms, controls);
        self.history.store_local(sample);
        sample.to_bytes().to_vec()
    }

    /// Decodes and stores an input packet from the other peer.
    ///
    /// On error nothing in the session changes.
    pub fn receive_input(&mut self, bytes: &[u8], now_ms: u16) -> SyncResult<InputSample> {
        let sample = decode_input(bytes)?;
        let expected = self.role.remote_id();
        if sample.player_id != expected {
            return Err(DecodeError::WrongPlayerId {
                expected,
                found: sample.player_id,
            }
            .into());
        }
        self.history.store_remote(sample);
        self.tracker
            .record_remote(sample.frame, sample.timestamp, now_ms);
        Ok(sample)
    }

    /// Decodes an authoritative state packet for the remote car and corrects
    /// the local copy if its prediction for the packet's frame drifted.
    ///
    /// Packets older than the newest one accepted are rejected. A packet whose
    /// frame has no usable prediction (it left the history window, lies
    /// ahead of this peer, or predates the last correction) is not measured.
    /// Race progress in the packet is adopted only when it is ahead of the
    /// local view. On error nothing in the session changes.
    pub fn receive_game_state(&mut self, bytes: &[u8], now_ms: u16) -> SyncResult<Vec<SyncEvent>> {
        let packet = decode_game_state(bytes, self.role.remote_id())?;
        if let Some(newest) = self.last_state_frame.filter(|&newest| packet.frame < newest) {
            return Err(SyncError::StaleGameState {
                frame: packet.frame,
                newest,
            });
        }
        let slot = self.role.remote_slot();
        if self.world.car(slot).is_none() {
            return Err(SyncError::UnknownCar { index: slot });
        }

        self.last_state_frame = Some(packet.frame);
        self.tracker
            .record_remote(packet.frame, packet.timestamp, now_ms);

        let actual = CarSnapshot {
            frame: packet.frame,
            position: packet.position,
            velocity: packet.velocity,
            heading: packet.heading,
        };
        let predicted = (packet.frame >= self.settled_frame)
            .then(|| self.predicted_remote.get(packet.frame).copied())
            .flatten();

        let mut events = Vec::new();
        match predicted {
            Some(predicted) => {
                if let Some(divergence) =
                    should_rollback(&predicted, &actual, self.config.rollback_threshold)
                {
                    events.push(SyncEvent::Diverged {
                        frame: packet.frame,
                        position_error: divergence.position_error,
                        heading_error: divergence.heading_error,
                    });
                    self.apply_correction(slot, &predicted, &actual);
                    events.push(SyncEvent::Corrected {
                        frame: packet.frame,
                        policy: self.config.correction,
                    });
                }
            }
            None => debug!(
                frame = packet.frame,
                current = self.current_frame(),
                "no prediction to measure game state against"
            ),
        }

        self.adopt_progress(slot, &packet);
        Ok(events)
    }

    /// Corrects the remote car. Predictions stored before the correction
    /// finishes no longer describe the car, so packets for those frames are
    /// not measured again.
    fn apply_correction(&mut self, slot: usize, predicted: &CarSnapshot, actual: &CarSnapshot) {
        if let Some(car) = self.world.car_mut(slot) {
            self.blend = correct(car, predicted, actual, self.config.correction);
        }
        let pending = self.blend.map_or(1, |blend| u32::from(blend.remaining()));
        self.settled_frame = self.current_frame() + pending;
    }

    fn adopt_progress(&mut self, slot: usize, packet: &GameStatePacket) {
        let Some(local) = self.world.car_progress(slot) else {
            return;
        };
        let remote = CarProgress {
            next_checkpoint: usize::from(packet.checkpoint_index),
            laps: packet.lap_count,
            finished: packet.finished,
            race_time_ms: local.race_time_ms,
        };
        let ahead = (remote.finished, remote.laps, remote.next_checkpoint)
            > (local.finished, local.laps, local.next_checkpoint);
        if ahead {
            debug!(
                car = slot,
                laps = remote.laps,
                checkpoint = remote.next_checkpoint,
                "adopting remote race progress"
            );
            self.world.set_progress(slot, remote);
        }
    }

    /// Handles one event from the transport, turning packet faults into
    /// [`SyncEvent::PacketRejected`].
    pub fn handle_link_event(&mut self, event: LinkEvent, now_ms: u16) -> Vec<SyncEvent> {
        match event {
            LinkEvent::Connected { role } => {
                self.role = role;
                vec![self.handle_connection(true)]
            }
            LinkEvent::Disconnected => vec![self.handle_connection(false)],
            LinkEvent::Input(bytes) => match self.receive_input(&bytes, now_ms) {
                Ok(_) => Vec::new(),
                Err(error) => vec![rejected(PacketKind::Input, error)],
            },
            LinkEvent::GameState(bytes) => match self.receive_game_state(&bytes, now_ms) {
                Ok(events) => events,
                Err(error) => vec![rejected(PacketKind::GameState, error)],
            },
        }
    }

    /// Handles every event waiting in `inbox`.
    pub fn drain_inbox(&mut self, inbox: &InboxReceiver, now_ms: u16) -> Vec<SyncEvent> {
        let mut events = Vec::new();
        for event in inbox.drain() {
            events.extend(self.handle_link_event(event, now_ms));
        }
        events
    }

    /// Simulates the current frame and moves to the next.
    ///
    /// Local input is applied before remote input, and both before the step
    /// resolves collisions.
    pub fn tick(&mut self) -> TickReport {
        let frame = self.history.current_frame();
        let local = self.history.predict_local(self.role.local_id(), frame);
        let remote = self.history.predict_remote(self.role.remote_id(), frame);

        self.world
            .handle_input(self.role.local_slot(), &local.control());
        self.world
            .handle_input(self.role.remote_slot(), &control_input(&remote.sample));

        if let Some(blend) = self.blend.as_mut() {
            let running = self
                .world
                .car_mut(self.role.remote_slot())
                .is_some_and(|car| blend.apply(car));
            if !running {
                self.blend = None;
            }
        }

        let events = self
            .world
            .step()
            .into_iter()
            .map(SyncEvent::from)
            .collect();

        let next = self.history.advance_frame();
        self.tracker.advance();
        self.predicted_remote.compact(next);
        self.record_remote_snapshot();

        let input_late = self.tracker.is_input_late(frame);
        if input_late {
            debug!(
                frame,
                remote_frame = self.tracker.remote_frame(),
                "remote input late"
            );
        }

        TickReport {
            frame,
            remote_prediction: remote.kind,
            input_late,
            events,
        }
    }

    /// Packs this peer's car as an authoritative state packet for the
    /// current frame.
    pub fn pack_game_state(&self, now_ms: u16) -> SyncResult<Vec<u8>> {
        let slot = self.role.local_slot();
        let car = self
            .world
            .car(slot)
            .ok_or(SyncError::UnknownCar { index: slot })?;
        let progress = self.world.car_progress(slot).unwrap_or_default();
        let packet = GameStatePacket {
            phase: self.phase,
            player_id: self.role.local_id(),
            frame: self.history.current_frame(),
            position: car.position,
            velocity: car.velocity,
            heading: car.heading,
            checkpoint_index: u8::try_from(progress.next_checkpoint).unwrap_or(u8::MAX),
            lap_count: progress.laps,
            finished: progress.finished,
            timestamp: now_ms,
        };
        Ok(packet.to_bytes().to_vec())
    }
}

fn rejected(kind: PacketKind, error: SyncError) -> SyncEvent {
    warn!(%kind, %error, "dropping packet");
    SyncEvent::PacketRejected { kind, error }
}
