#![no_main]

use cpapflow::breath::{detect_breaths, BreathConfig};
use cpapflow::leakage::net_volume;
use cpapflow::session::SessionPipeline;
use libfuzzer_sys::fuzz_target;
use std::io::Cursor;

fuzz_target!(|data: &[u8]| {
    // Arbitrary bytes must never panic: bad lines are skipped, never fatal
    let session = match SessionPipeline::default().run_reader(Cursor::new(data)) {
        Ok(session) => session,
        Err(_) => return,
    };

    let _ = detect_breaths(session.time(), session.flow(), &BreathConfig::default());
    let _ = net_volume(session.time(), session.flow());
});
