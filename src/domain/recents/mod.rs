pub mod entities;
pub mod errors;
pub mod ports;
pub mod services;

pub use entities::{RecentAction, RecentEntry, RecentSort};
pub use errors::RecentsError;
pub use ports::RecentsRepository;
pub use services::{DEFAULT_MAX_ENTRIES, RecentsService};
