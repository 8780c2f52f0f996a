//! Data shapes exchanged with clients and with the three backends.
//!
//! Users live in MongoDB, products in MySQL. Buckets and objects are never
//! persisted here; the types below only describe what S3 returns.

pub mod bucket;
pub mod object;
pub mod product;
pub mod user;
