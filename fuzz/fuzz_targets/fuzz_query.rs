//! Fuzz the grepql front end and evaluator
//!
//! The first line of the input is the query, the rest is the text searched.
//! Nothing here may panic; malformed queries must come back as errors.

#![no_main]

use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if let Ok(input) = std::str::from_utf8(data) {
        let (query, text) = input.split_once('\n').unwrap_or((input, ""));
        if let Ok(compiled) = grepql::compile_str(query) {
            let _ = grepql::Evaluator::new(&compiled).run(text.lines());
        }
    }
});
