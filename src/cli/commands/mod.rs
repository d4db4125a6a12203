//! CLI command implementations

pub mod provision;

pub use provision::execute as provision;
