//! Sanity-backed content repository.

mod client;
mod images;
mod queries;
mod wire;

pub use client::SanityRepo;
pub use images::SanityImageUrls;
