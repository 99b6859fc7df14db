pub mod tera_markup;

pub use tera_markup::{TeraMarkupRenderer, data_uri};
