//! Archive creation for batches of downloaded images.
//!
//! Builds a store-only ZIP from the successful slots of a batch result.
//! Entries are never recompressed: the inputs are photographic images that
//! are already entropy-dense, so deflate would burn CPU for nothing.

pub use service::build_zip;

mod service;
