//! Command line surface of the demo binary.

mod args;
mod output;

pub use args::{CliArgs, LevelArg, OutputFormat, parse_cli};
pub use output::{print_json, print_plain};
