use fixmath::{Fixed, Vec2};
use netsync::SyncSession;
use wire::{Buttons, ControlState};

use crate::Rng;

/// Steers the session's own car toward its next checkpoint.
///
/// Reads only the local view of the world, so each peer drives its car from
/// its own simulation.
pub fn drive(session: &SyncSession, rng: &mut Rng) -> ControlState {
    let world = session.world();
    let slot = session.role().local_slot();
    let (Some(car), Some(progress)) = (world.car(slot), world.car_progress(slot)) else {
        return ControlState::default();
    };
    let Some(target) = world.checkpoints().get(progress.next_checkpoint) else {
        return ControlState::default();
    };
    if progress.finished {
        return ControlState {
            brake: 1.0,
            ..ControlState::default()
        };
    }

    let forward = Vec2::from_angle(car.heading);
    let to_target = target.position - car.position;
    let turn = forward.cross(to_target.normalize());
    let ahead = forward.dot(to_target) > Fixed::ZERO;

    let steering = (turn.to_f64() * 2.0).clamp(-1.0, 1.0) as f32;
    let wobble = (rng.next_u32() % 21) as f32 / 100.0;
    let (throttle, brake) = if ahead {
        (0.8 + wobble, 0.0)
    } else {
        (0.3, 0.2)
    };
    let buttons = if rng.percent(2) {
        Buttons::NONE.with(Buttons::HORN)
    } else {
        Buttons::NONE
    };

    ControlState {
        throttle,
        brake,
        steering: if ahead { steering } else { steering.signum() },
        buttons,
    }
}
