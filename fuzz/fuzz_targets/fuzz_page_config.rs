#![no_main]

use libfuzzer_sys::fuzz_target;
use pagefx_runtime::PageConfig;

fuzz_target!(|data: &[u8]| {
    let Ok(json) = std::str::from_utf8(data) else {
        return;
    };
    if let Ok(config) = PageConfig::from_json(json) {
        let encoded = config.to_json().expect("config re-encodes");
        let again = PageConfig::from_json(&encoded).expect("config re-parses");
        assert_eq!(again.to_json().expect("config re-encodes"), encoded);
    }
});
