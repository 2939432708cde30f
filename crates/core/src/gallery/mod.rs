//! Gallery listing upstream client.

mod client;
mod error;

pub use client::GalleryClient;
pub use error::GalleryError;
