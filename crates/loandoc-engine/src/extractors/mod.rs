pub mod fields;

pub use fields::{extract_key_terms, find_first};
