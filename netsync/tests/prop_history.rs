use netsync::{FrameRing, InputHistory, PredictionKind, Resolved, HISTORY_CAPACITY};
use proptest::prelude::*;
use wire::{InputSample, PlayerId};

const REMOTE: PlayerId = PlayerId::CLIENT;

fn sample(frame: u32, throttle: i8) -> InputSample {
    InputSample {
        throttle,
        ..InputSample::neutral(REMOTE, frame)
    }
}

proptest! {
    #[test]
    fn stored_frames_read_back(
        writes in prop::collection::vec((0u32..16, any::<u16>()), 1..64)
    ) {
        let mut ring: FrameRing<u16, 16> = FrameRing::new();
        let mut expected = [None; 16];
        for &(frame, value) in &writes {
            prop_assert!(ring.store(frame, value));
            expected[frame as usize] = Some(value);
        }
        for (frame, value) in expected.iter().enumerate() {
            prop_assert_eq!(ring.get(frame as u32).copied(), *value);
        }
    }

    #[test]
    fn window_never_exceeds_half_capacity(advance in 0u32..500) {
        let mut history = InputHistory::new();
        for _ in 0..advance {
            history.advance_frame();
            let lag = history.current_frame() - history.remote().start_frame();
            prop_assert!(lag <= HISTORY_CAPACITY as u32 / 2);
        }
    }

    #[test]
    fn prediction_is_stamped_with_requested_frame(
        stored in prop::collection::btree_set(0u32..48, 1..20),
        query in 0u32..200,
    ) {
        let mut history = InputHistory::new();
        for &frame in &stored {
            history.store_remote(sample(frame, (frame % 100) as i8));
        }
        let predicted = history.predict_remote(REMOTE, query);
        prop_assert_eq!(predicted.sample.frame, query);
        prop_assert_eq!(predicted.sample.player_id, REMOTE);
        if stored.contains(&query) {
            prop_assert_eq!(predicted.kind, PredictionKind::Stored);
        } else {
            prop_assert_eq!(predicted.kind, PredictionKind::Extrapolated);
        }
    }

    #[test]
    fn held_value_comes_from_latest_earlier_frame(
        stored in prop::collection::btree_set(0u32..16, 1..8),
        query in 0u32..16,
    ) {
        let mut ring: FrameRing<u32, 16> = FrameRing::new();
        for &frame in &stored {
            ring.store(frame, frame * 10);
        }
        let max = *stored.iter().next_back().unwrap_or(&0);
        match ring.resolve(query) {
            Resolved::Exact(value) => prop_assert_eq!(*value, query * 10),
            Resolved::Held { source, value } => {
                prop_assert_eq!(*value, source * 10);
                match stored.range(..=query).next_back() {
                    Some(&earlier) => prop_assert_eq!(source, earlier),
                    None => prop_assert_eq!(source, max),
                }
            }
            other => prop_assert!(false, "unexpected {:?}", other),
        }
    }

    #[test]
    fn arrival_order_does_not_change_hold_last(
        frames in prop::collection::btree_set(0u32..48, 1..20)
            .prop_map(|set| set.into_iter().collect::<Vec<_>>())
            .prop_shuffle(),
        past in 1u32..16,
    ) {
        let mut history = InputHistory::new();
        for &frame in &frames {
            prop_assert!(history.store_remote(sample(frame, (frame % 100) as i8)));
        }
        let newest = frames.iter().copied().max().unwrap_or(0);
        let predicted = history.predict_remote(REMOTE, newest + past);
        prop_assert_eq!(predicted.kind, PredictionKind::Extrapolated);
        prop_assert_eq!(predicted.sample.throttle, (newest % 100) as i8);
        prop_assert_eq!(predicted.sample.frame, newest + past);
    }

    #[test]
    fn late_sample_does_not_override_newer_one(early in 0u32..32, gap in 1u32..16) {
        let late = early + gap;
        let mut history = InputHistory::new();
        history.store_remote(sample(late, 70));
        history.store_remote(sample(early, 10));
        let predicted = history.predict_remote(REMOTE, late + 10);
        prop_assert_eq!(predicted.sample.throttle, 70);
        prop_assert_eq!(history.predict_remote(REMOTE, early).sample.throttle, 10);
    }
}
