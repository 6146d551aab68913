mod cli;

pub use cli::{Action, Cli};
