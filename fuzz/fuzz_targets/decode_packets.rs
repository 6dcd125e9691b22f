#![no_main]

use libfuzzer_sys::fuzz_target;
use wire::{decode_game_state, decode_input, PlayerId};

fuzz_target!(|data: &[u8]| {
    if let Ok(sample) = decode_input(data) {
        // Anything that decodes re-encodes to the same bytes.
        assert_eq!(&sample.to_bytes()[..], data);
    }
    for player in [PlayerId::HOST, PlayerId::CLIENT] {
        if let Ok(packet) = decode_game_state(data, player) {
            assert_eq!(packet.player_id, player);
            assert_eq!(&packet.to_bytes()[..], data);
        }
    }
});
