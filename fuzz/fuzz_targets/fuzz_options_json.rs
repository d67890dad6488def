#![no_main]

use bumpgen_spec::{BumpOptions, STRENGTH_MAX, STRENGTH_MIN};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let Ok(text) = std::str::from_utf8(data) else {
        return;
    };
    let Ok(options) = BumpOptions::from_json(text) else {
        return;
    };

    let result = options.validate();
    if result.is_ok() {
        let strength = options.effective_strength();
        assert!((STRENGTH_MIN..=STRENGTH_MAX).contains(&strength));
    }

    if let Ok(json) = options.to_json() {
        let reloaded = BumpOptions::from_json(&json).expect("serialized options must reload");
        assert_eq!(reloaded.gradient_method, options.gradient_method);
    }
});
