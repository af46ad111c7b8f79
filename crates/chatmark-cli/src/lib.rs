// Library interface for chatmark-cli
// This allows integration tests to access internal modules

// NOTE: these files are also declared in main.rs, so a path attribute
// points at the same source to avoid "file loaded multiple times" errors.

#[path = "cli.rs"]
pub mod cli;

#[path = "commands.rs"]
pub mod commands;

#[path = "input.rs"]
pub mod input;

#[path = "theme.rs"]
pub mod theme;

// Re-export commonly used items for easier testing
pub use cli::{Cli, SessionOptions};
pub use commands::{complete_command, handle_command, CommandResult};
pub use input::{InputHistory, InputLine};
pub use theme::Theme;
