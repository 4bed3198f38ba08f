pub mod deletion;
pub mod entry;
pub mod git;
pub mod info;
pub mod lister;
pub mod watcher;
