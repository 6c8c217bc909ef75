//! unistrap - MBR kernel imager
//!
//! Packs a bootstrap payload and a kernel payload into a single disk image:
//!
//! ```text
//! sector 0        ImageHeader, then zeros (reserved for MBR boot code)
//! sector 1..      bootstrap payload, kernel payload, 0xEE fill
//! ```
//!
//! The bootstrap always starts at byte 512 and the kernel immediately follows
//! it. The image is padded to a whole number of 512-byte sectors, and the
//! header's `sector_count` describes that padded length.

pub mod builder;
pub mod cli;
pub mod error;
pub mod header;
pub mod layout;
pub mod utils;

pub use builder::{write_image, BuildReport, ImageBuilder, ImageConfig};
pub use error::{ImageError, Result};
pub use header::ImageHeader;
pub use layout::ImageLayout;
pub use utils::{MBR_END_OFFSET, PAD_BYTE, SECTOR_SIZE};
