//! # Utility Functions and Helpers
//!
//! - [`logging`]: tracing subscriber and color setup
//! - [`parsing`]: parsing of user-supplied values such as timestamps

pub mod logging;
pub mod parsing;
