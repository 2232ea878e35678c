// Re-export CLI types and functions for testing
pub mod cli;
pub use cli::{Cli, Commands, load_config, run_with_cli};
