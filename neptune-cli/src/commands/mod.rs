//! CLI command implementations.

pub mod info;
pub mod output;
pub mod query;
pub mod run;
pub mod sign;
