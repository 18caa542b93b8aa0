//! Tourney Processing Library
//!
//! Content sniffing, the accepted-type policy, upload validation and the image
//! resize engine used when committing staged uploads.

#[cfg(feature = "image")]
pub mod image;
pub mod policy;
pub mod sniffer;
pub mod validator;

#[cfg(feature = "image")]
pub use self::image::{target_dimensions, ImageResizer, ResizeError};
pub use policy::AcceptPolicy;
pub use sniffer::{sniff, sniff_bytes, SniffedType};
pub use validator::{UploadValidator, ValidationError};
