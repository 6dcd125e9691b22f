//! Two-peer synchronization for the slipstream race core.
//!
//! Each peer runs a [`SyncSession`]. Every frame it records local input and
//! sends it to the other peer, simulates both cars, and now and then sends
//! its own car's state as an authoritative [`wire::GameStatePacket`]. Remote
//! input that has not arrived is predicted by holding the last known sample.
//! When an authoritative packet shows the prediction drifted past the
//! configured threshold, the remote car is corrected by a
//! [`CorrectionPolicy`].
//!
//! Transport is out of scope. A transport thread pushes [`LinkEvent`]s into
//! an [`inbox::channel`], and the game loop drains it once per frame.
//!
//! # Example
//!
//! ```
//! use fixmath::Fixed;
//! use netsync::{Role, SyncConfig, SyncSession};
//! use physics::checkpoint;
//! use wire::ControlState;
//!
//! let checkpoints = checkpoint::ring(4, Fixed::from_int(10), Fixed::TWO);
//! let mut host = SyncSession::new(SyncConfig::for_testing(), Role::Host, checkpoints.clone());
//! let mut client = SyncSession::new(SyncConfig::for_testing(), Role::Client, checkpoints);
//!
//! let controls = ControlState { throttle: 1.0, ..ControlState::default() };
//! let from_host = host.record_local_input(&controls, 0);
//! let from_client = client.record_local_input(&controls, 0);
//! client.receive_input(&from_host, 8).unwrap();
//! host.receive_input(&from_client, 8).unwrap();
//! host.tick();
//! client.tick();
//!
//! assert_eq!(host.world().state_hash(), client.world().state_hash());
//! ```

mod config;
mod error;
mod events;
mod history;
pub mod inbox;
mod reconcile;
mod ring;
mod role;
mod session;
mod tracker;

pub use config::SyncConfig;
pub use error::{SyncError, SyncResult};
pub use events::{LinkEvent, SyncEvent};
pub use history::{
    control_input, predict, InputHistory, InputRing, Predicted, PredictionKind, HISTORY_CAPACITY,
};
pub use inbox::{InboxError, InboxReceiver, InboxSender};
pub use reconcile::{
    correct, should_rollback, BlendCorrection, CarSnapshot, CorrectionPolicy, Divergence,
    HEADING_THRESHOLD,
};
pub use ring::{FrameRing, Resolved};
pub use role::Role;
pub use session::{SyncSession, TickReport};
pub use tracker::{FrameTracker, TrackerStats, LATENCY_WINDOW};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn public_api_exports() {
        let _ = HISTORY_CAPACITY;
        let _ = LATENCY_WINDOW;
        let _ = HEADING_THRESHOLD;
        let _ = InputHistory::new();
        let _ = FrameTracker::new(4);
        let _ = CorrectionPolicy::default();
        let _ = Role::Host;
        let _ = SyncConfig::default();
        let _: FrameRing<u32, 8> = FrameRing::new();
        let _ = inbox::channel(1);

        // Error types
        let _: SyncResult<()> = Ok(());
        let _ = InboxError::Full;
    }

    #[test]
    fn history_ring_capacity_matches_constant() {
        assert_eq!(InputRing::CAPACITY as usize, HISTORY_CAPACITY);
    }
}
