#![no_main]

use libfuzzer_sys::fuzz_target;
use pagefx_core::FormFields;
use pagefx_runtime::form::{is_valid_email, validate};

fuzz_target!(|pairs: Vec<(String, String)>| {
    let fields: FormFields = pairs.into_iter().collect();
    if let Some(email) = fields.get("email") {
        let _ = is_valid_email(email);
    }
    let _ = validate(&fields);
});
