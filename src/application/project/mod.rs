pub mod export_project;
pub mod import_project;

pub use export_project::{ExportProjectResponse, ExportProjectUseCase};
pub use import_project::{ImportProjectCommand, ImportProjectResponse, ImportProjectUseCase};
