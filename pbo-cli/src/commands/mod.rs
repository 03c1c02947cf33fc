//! Command implementations for the pbo CLI.

pub mod create;
pub mod extract;
pub mod list;

pub use create::{CreateArgs, cmd_create};
pub use extract::{ExtractArgs, cmd_extract};
pub use list::{ListArgs, cmd_list};
