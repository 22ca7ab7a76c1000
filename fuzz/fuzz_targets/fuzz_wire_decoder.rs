//! Fuzz target: the wire header and command decoders.
//!
//! Drives arbitrary byte sequences into `decode_header` and
//! `decode_command` and asserts neither ever panics, and that a decoded
//! command's target is readable without further validation.
//!
//! cargo fuzz run fuzz_wire_decoder

#![no_main]

use libfuzzer_sys::fuzz_target;
use swarmit_supervisor::wire::codec;

fuzz_target!(|data: &[u8]| {
    if let Some((_, body)) = codec::decode_header(data) {
        if let Some(frame) = codec::decode_command(body) {
            let _ = frame.target();
        }
    }

    // A raw body with no header in front must decode the same way,
    // independent of whatever came before it.
    let _ = codec::decode_command(data);
});
