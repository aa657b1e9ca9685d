//! CLI command handlers, one per file.

mod build;
mod checksum;
mod completions;
mod fetch;
mod list;

pub use build::{run_build, BuildArgs};
pub use checksum::run_checksum;
pub use completions::run_completions;
pub use fetch::run_fetch;
pub use list::run_list;
