//! Container extraction and member decompression for Geoflow.
//!
//! Two thin stage adapters over well-known formats: tar containers and
//! single-stream gzip members. Both fully materialize their output
//! directory before returning success.

pub mod decompress;
pub mod extract;

pub use decompress::decompress_members;
pub use extract::extract_tar;
