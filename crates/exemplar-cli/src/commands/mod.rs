//! Command implementations for the exemplar CLI
//!
//! Each command lives in its own submodule.

mod extract;
mod ledger;
mod split;

pub use extract::execute as extract_release;
pub use ledger::execute as manage_ledger;
pub use split::execute as split_file;
