pub mod logo;

pub use logo::FileLogoSource;
