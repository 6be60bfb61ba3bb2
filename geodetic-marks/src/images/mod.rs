//! Mark image filenames.
//!
//! Photographs and diagrams of marks follow a fixed naming scheme that
//! encodes the mark code, the image type, when it was taken and the file
//! format. This module parses those names and derives where the files are
//! stored.

mod error;
mod name;
mod path;
mod pattern;

pub use error::ImageError;
pub use name::{MarkImage, validate};
pub use path::{DEFAULT_BASE_PATH, image_path, image_path_in};
pub use pattern::{ImageFormat, ImageType};
