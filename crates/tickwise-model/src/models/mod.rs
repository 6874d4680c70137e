//! Data records shared by the store and the command-line client.

mod common;
mod recurrence;
mod task;

pub use common::*;
pub use recurrence::*;
pub use task::*;
