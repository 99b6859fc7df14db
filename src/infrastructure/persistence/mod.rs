pub mod file;
pub mod memory;

pub use file::JsonFileRecentsRepository;
pub use memory::InMemoryRecentsRepository;
