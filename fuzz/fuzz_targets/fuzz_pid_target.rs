//! Fuzz target for PID literal validation.

#![no_main]

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use osinfo_core::sched::Target;

#[derive(Arbitrary, Debug)]
struct Input {
    literal: Option<String>,
}

fuzz_target!(|input: Input| {
    match Target::parse(input.literal.as_deref()) {
        Ok(Target::Current) => assert!(input.literal.is_none()),
        Ok(Target::Pid(pid)) => {
            assert!(pid >= 1 && pid <= i32::MAX as u32);
        }
        Err(_) => assert!(input.literal.is_some()),
    }
});
