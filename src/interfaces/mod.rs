pub mod cli;
pub mod watcher;
