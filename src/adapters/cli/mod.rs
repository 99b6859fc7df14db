pub mod args;
pub mod commands;

pub use args::{Cli, Command, DocumentTypeArg, ExportFormatArg};
pub use commands::{CliDependencies, CommandOutput, dispatch, run};
