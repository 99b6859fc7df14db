pub mod recents_repository;

pub use recents_repository::JsonFileRecentsRepository;
