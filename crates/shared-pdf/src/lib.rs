//! Shared document decoding utilities
//!
//! Turns uploaded document bytes into the plain text the analysis engine
//! works on. PDFs go through `pdf-extract`; plain-text uploads are passed
//! through as UTF-8.

pub mod decode;

pub use decode::{decode_document, detect_format, DecodeError, DocumentFormat};
