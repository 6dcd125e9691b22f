#![no_main]

use fixmath::Fixed;
use libfuzzer_sys::fuzz_target;
use netsync::{inbox, LinkEvent, Role, SyncConfig, SyncSession};
use physics::checkpoint;
use wire::{GAME_STATE_PACKET_SIZE, INPUT_PACKET_SIZE};

fuzz_target!(|data: &[u8]| {
    let checkpoints = checkpoint::ring(4, Fixed::from_int(10), Fixed::TWO);
    let mut session = SyncSession::new(SyncConfig::for_testing(), Role::Host, checkpoints);
    let (tx, rx) = inbox::channel(16);

    // Each chunk is an opcode byte followed by an optional packet body.
    let mut idx = 0usize;
    let mut now = 0u16;
    while idx < data.len() && idx < 4096 {
        let op = data[idx] % 5;
        idx += 1;
        let len = match op {
            0 => INPUT_PACKET_SIZE,
            1 => GAME_STATE_PACKET_SIZE,
            _ => 0,
        };
        let end = (idx + len).min(data.len());
        let body = data[idx..end].to_vec();
        idx = end;

        let event = match op {
            0 => Some(LinkEvent::Input(body)),
            1 => Some(LinkEvent::GameState(body)),
            2 => Some(LinkEvent::Disconnected),
            3 => Some(LinkEvent::Connected { role: Role::Host }),
            _ => None,
        };
        if let Some(event) = event {
            let _ = tx.send(event);
        }
        now = now.wrapping_add(16);
        let _ = session.drain_inbox(&rx, now);
        let report = session.tick();
        assert!(report.frame < session.current_frame());
        assert!(session.history().remote().start_frame() <= session.current_frame());
    }
});
