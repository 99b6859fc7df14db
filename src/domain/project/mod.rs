pub mod entities;
pub mod ports;

pub use entities::{ImportReport, PROJECT_EXTENSION, ProjectArchive, ProjectSummary};
pub use ports::ProjectArchiveApi;
