pub mod client;
pub mod counter;
pub mod project;
pub mod records;
pub mod render;
pub mod totals;

pub use client::ApiClient;
pub use counter::HttpCounterApi;
pub use project::HttpProjectArchiveApi;
pub use records::HttpDocumentRecordsApi;
pub use render::HttpDocumentRenderer;
pub use totals::HttpTotalsCalculator;
