// SPDX-License-Identifier: (MIT OR Apache-2.0)
//! Scanner for the Unholy language.
//!
//! Turns a UTF-8 source buffer into a stream of semantic elements with
//! exact positions, supporting bounded lookahead and speculative scanning
//! through an explicit snapshot stack.

mod scanner;

pub use scanner::{LexError, Scanner};
