//! Integration test driver for `tests/integration/`.
//!
//! Each `mod` below maps to a file that exercises a subsystem against
//! mock hardware adapters. All tests run on the host with no radio or
//! flash hardware required.

mod mock_hw;
mod scenarios;
