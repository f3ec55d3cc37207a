//! Fuzz target for /proc/meminfo parsing.
//!
//! Arbitrary bytes must yield a (possibly partial) result, never a panic or
//! an overflowed byte count.

#![no_main]

use libfuzzer_sys::fuzz_target;
use osinfo_core::host::parse_meminfo;
use std::io::Cursor;

fuzz_target!(|data: &[u8]| {
    let info = parse_meminfo(Cursor::new(data));
    if let Some(total) = info.total_bytes {
        assert_eq!(total % 1024, 0);
    }
    if let Some(free) = info.free_bytes {
        assert_eq!(free % 1024, 0);
    }
});
