pub mod cli;
pub mod notifications;

pub use cli::{Cli, CliDependencies, Command};
pub use notifications::{Notification, NotificationCenter, Tone};
