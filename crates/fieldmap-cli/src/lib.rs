//! CLI library components for the `fieldmap` binary.

pub mod commands;
pub mod logging;
