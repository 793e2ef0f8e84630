//! Fuzz target for single-row VisDrone annotation parsing.

#![no_main]

use libfuzzer_sys::fuzz_target;
use fedsplit::annotation::fuzz_parse_source_line;

fuzz_target!(|data: &[u8]| {
    if data.len() > 1024 * 1024 {
        return;
    }

    let Ok(line) = std::str::from_utf8(data) else {
        return;
    };

    fuzz_parse_source_line(line);
});
