//! Wire protocol: frame header, command/notification tags, and the
//! encoder/decoder pair.
//!
//! This follows the newest ("Mira-style") tag-first framing: no 8-byte
//! preamble, command frames begin directly with a one-byte tag. See
//! [`codec`] for the exact byte layouts.

pub mod codec;
pub mod packet;

pub use packet::*;
