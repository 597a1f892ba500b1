//! Trim the working set of the current process, list processes whose
//! resident memory is at or above a threshold, and optionally terminate them.
//!
//! OS access goes through [`process::ProcessHost`]; [`process::NativeHost`]
//! is the implementation compiled for the current target.

pub mod app;
pub mod cli;
pub mod error;
pub mod menu;
pub mod model;
pub mod output;
pub mod privilege;
pub mod process;
pub mod trim;
