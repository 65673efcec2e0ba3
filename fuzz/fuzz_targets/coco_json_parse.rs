//! Fuzz target for the COCO JSON reader, including the positional
//! category lookup.

#![no_main]

use libfuzzer_sys::fuzz_target;
use potholekit::ir::io_coco_json::from_coco_slice;

fuzz_target!(|data: &[u8]| {
    // 10MB is generous for one annotation file.
    if data.len() > 10 * 1024 * 1024 {
        return;
    }

    let _ = from_coco_slice(data);
});
