//! Testing utilities and mock implementations.
//!
//! Lets the orchestrator and the server be exercised without a real upload
//! server.
//!
//! # Example
//!
//! ```rust,ignore
//! use photodrop_core::testing::{fixtures, MockUploader};
//!
//! let uploader = MockUploader::new();
//! uploader.push_success("/a.jpg").await;
//!
//! orchestrator.stage(vec![fixtures::jpeg("a.jpg")]).await;
//! ```

mod mock_uploader;

pub use mock_uploader::{MockUploader, RecordedUpload};

/// Test fixtures and helper functions.
pub mod fixtures {
    use crate::staging::SelectedFile;

    /// Smallest byte sequence that starts like a JPEG.
    pub const JPEG_BYTES: &[u8] = &[0xFF, 0xD8, 0xFF, 0xE0, 0x00, 0x10, 0x4A, 0x46, 0x49, 0x46];

    /// PNG signature.
    pub const PNG_BYTES: &[u8] = &[0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A];

    /// A JPEG selection with the given name.
    pub fn jpeg(name: &str) -> SelectedFile {
        SelectedFile::new(name, JPEG_BYTES.to_vec()).with_content_type("image/jpeg")
    }

    /// A PNG selection with the given name.
    pub fn png(name: &str) -> SelectedFile {
        SelectedFile::new(name, PNG_BYTES.to_vec()).with_content_type("image/png")
    }

    /// `count` JPEG selections named `photo_{i}.jpg`.
    pub fn jpegs(count: usize) -> Vec<SelectedFile> {
        (1..=count).map(|i| jpeg(&format!("photo_{}.jpg", i))).collect()
    }
}
