//! Fuzz target for one YOLO label line (`class cx cy w h`).

#![no_main]

use libfuzzer_sys::fuzz_target;
use potholekit::ir::io_yolo_txt::fuzz_parse_label_line;

fuzz_target!(|data: &[u8]| {
    let Ok(line) = std::str::from_utf8(data) else {
        return;
    };

    let _ = fuzz_parse_label_line(line);
});
