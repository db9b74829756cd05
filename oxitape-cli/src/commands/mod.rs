//! Command implementations for OxiTape CLI.

pub mod detect;
pub mod extract;
pub mod info;
pub mod list;

pub use detect::cmd_detect;
pub use extract::{ExtractOptions, cmd_extract};
pub use info::cmd_info;
pub use list::{ListOptions, cmd_list};
