pub mod list_recents;
pub mod remove_recent;

pub use list_recents::{ListRecentsCommand, ListRecentsResponse, ListRecentsUseCase, RecentEntryDto};
pub use remove_recent::{RemoveRecentCommand, RemoveRecentResponse, RemoveRecentUseCase};
