#![no_main]

use breathpace::sequencer::{PhaseSequencer, SequencerConfig};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if data.len() < 5 {
        return;
    }
    let d = |i: usize| u32::from(data[i] % 16) + 1;
    let config = SequencerConfig::new(d(0), d(1), d(2), d(3), u32::from(data[4] % 4) + 1);
    let Ok(mut seq) = PhaseSequencer::new(config) else {
        return;
    };

    for byte in &data[5..] {
        match byte % 6 {
            0 => seq.start(),
            1 => seq.pause(),
            2 => seq.toggle(),
            3 => {
                seq.reset();
                assert!(seq.state().is_ready(seq.config()));
            }
            4 => {
                let _ = seq.reconfigure(SequencerConfig::new(
                    u32::from(byte / 6 % 4),
                    d(1),
                    d(2),
                    d(3),
                    u32::from(byte / 24) + 1,
                ));
            }
            _ => {
                let outcome = seq.tick_with_outcome();
                if outcome.finished {
                    assert!(!outcome.state.running);
                    assert!(seq.is_terminal());
                }
            }
        }

        let state = seq.state();
        assert!(state.seconds_remaining_in_phase >= 1);
        assert!(state.completed_cycles <= seq.config().total_cycles);
        if seq.is_terminal() {
            assert!(!state.running);
        }
    }
});
