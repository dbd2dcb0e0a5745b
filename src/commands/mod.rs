//! Command implementations for the `segments` CLI.

pub mod apply;
pub mod generate;
pub mod verify;

pub use apply::{ApplyCommand, ApplyStats};
pub use generate::{GenerateCommand, GenerateConfig, GenerateStats};
pub use verify::{VerifyCommand, VerifyConfig, VerifyStats};
