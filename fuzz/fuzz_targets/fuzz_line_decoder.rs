//! Fuzz target: `TelegramDecoder::feed`
//!
//! Drives arbitrary byte sequences, split at a fuzzer-chosen point, into
//! the streaming telegram decoder and asserts that it never panics, never
//! buffers past its cap, and only yields finite, correctly sized telegrams.
//!
//! cargo fuzz run fuzz_line_decoder

#![no_main]

use aquamon::link::codec::TelegramDecoder;
use aquamon::link::telegram::TelegramSchema;
use libfuzzer_sys::fuzz_target;

const CAP: usize = 64;

fuzz_target!(|data: &[u8]| {
    let Some((&split, rest)) = data.split_first() else {
        return;
    };
    let schema = if split & 1 == 0 {
        TelegramSchema::OxygenMonitor
    } else {
        TelegramSchema::Prediction
    };
    let at = usize::from(split).min(rest.len());
    let mut decoder = TelegramDecoder::new(schema, CAP);

    for chunk in [&rest[..at], &rest[at..]] {
        for telegram in decoder.feed(chunk) {
            assert_eq!(telegram.values().len(), schema.arity());
            assert!(telegram.values().iter().all(|v| v.is_finite()));
        }
        assert!(decoder.buffered() <= CAP, "buffer exceeds cap");
    }

    // After a reset the decoder must accept bytes cleanly again.
    decoder.reset();
    assert_eq!(decoder.buffered(), 0);
    for _ in decoder.feed(rest) {}
});
