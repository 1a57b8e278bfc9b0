#![no_main]

use breathpace::config::ConfigLoader;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if let Ok(yaml) = std::str::from_utf8(data) {
        let loader = ConfigLoader::with_defaults();
        // Any accepted session must also build a sequencer.
        if let Ok(result) = loader.load_from_str(yaml) {
            assert!(result.config.sequencer.validate().is_ok());
        }
    }
});
