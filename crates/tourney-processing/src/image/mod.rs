//! Image processing module
//!
//! Width-constrained, aspect-preserving resize with PNG output, used by the
//! commit step.

pub mod resize;

pub use resize::{target_dimensions, ImageResizer, ResizeError};
