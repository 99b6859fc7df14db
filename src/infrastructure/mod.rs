pub mod api;
pub mod assets;
pub mod config;
pub mod output;
pub mod persistence;
pub mod render;
