//! Error type and the `verify_*` checks shared by the docvalues-* crates.

pub mod error;
pub mod macros;
pub mod result;

pub use result::Result;
