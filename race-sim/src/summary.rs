use fixmath::Vec2;
use netsync::{SyncEvent, SyncSession, TrackerStats};
use physics::{CarProgress, RaceEvent};
use serde::Serialize;

use crate::link::{LinkCounters, LinkFaults};

#[derive(Debug, Default, Clone, Copy, Serialize)]
pub struct EventCounts {
    pub rejected: u64,
    pub diverged: u64,
    pub corrected: u64,
    pub checkpoints: u64,
    pub laps: u64,
    pub wall_contacts: u64,
    pub car_contacts: u64,
    pub reconnects: u64,
    /// Largest position error reported by a divergence, in track units.
    pub max_position_error: f64,
}

impl EventCounts {
    pub fn record(&mut self, event: &SyncEvent) {
        match event {
            SyncEvent::PacketRejected { .. } => self.rejected += 1,
            SyncEvent::Diverged { position_error, .. } => {
                self.diverged += 1;
                self.max_position_error = self.max_position_error.max(position_error.to_f64());
            }
            SyncEvent::Corrected { .. } => self.corrected += 1,
            SyncEvent::ConnectionChanged { connected } => {
                if *connected {
                    self.reconnects += 1;
                }
            }
            SyncEvent::Race(race) => match race {
                RaceEvent::CheckpointPassed { .. } => self.checkpoints += 1,
                RaceEvent::LapCompleted { .. } => self.laps += 1,
                RaceEvent::Finished { .. } => {}
                RaceEvent::WallContact { .. } => self.wall_contacts += 1,
                RaceEvent::CarContact { .. } => self.car_contacts += 1,
            },
        }
    }
}

#[derive(Debug, Serialize)]
pub struct PeerSummary {
    pub role: String,
    pub frames: u32,
    pub late_input_frames: u32,
    pub inbox_dropped: u64,
    pub events: EventCounts,
    pub link_in: LinkCounters,
    pub tracker: TrackerStats,
    pub positions: Vec<Vec2>,
    pub progress: Vec<CarProgress>,
    pub state_hash: String,
}

impl PeerSummary {
    pub fn new(
        session: &SyncSession,
        late_input_frames: u32,
        inbox_dropped: u64,
        events: EventCounts,
        link_in: LinkCounters,
    ) -> Self {
        let world = session.world();
        Self {
            role: format!("{:?}", session.role()),
            frames: session.current_frame(),
            late_input_frames,
            inbox_dropped,
            events,
            link_in,
            tracker: session.stats(),
            positions: world.cars().iter().map(|car| car.position).collect(),
            progress: world.progress().to_vec(),
            state_hash: format!("0x{:016x}", world.state_hash()),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct Summary {
    pub frames: u32,
    pub seed: u64,
    pub faults: LinkFaults,
    pub state_every: u32,
    pub packets_captured: u64,
    pub frames_in_sync: u32,
    pub finished: bool,
    /// Worst distance between the two peers' views of the same car.
    pub max_view_gap: f64,
    pub host: PeerSummary,
    pub client: PeerSummary,
}

impl Summary {
    pub fn assert_budgets(&self, max_divergences: Option<u64>) -> anyhow::Result<()> {
        if let Some(max) = max_divergences {
            let total = self.host.events.diverged + self.client.events.diverged;
            if total > max {
                anyhow::bail!("{total} divergences exceed budget {max}");
            }
        }
        Ok(())
    }
}
