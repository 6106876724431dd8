//! Icon containers.
//!
//! An [`IconImage`] is one sub-image, a [`SingleIcon`] is what an `.ico`
//! file holds, and a [`MultiIcon`] is a named collection of icons with one of
//! them selected for load and save.

mod icon_image;
mod multi_icon;
mod single_icon;

pub use icon_image::IconImage;
pub use multi_icon::{MultiIcon, UNTITLED};
pub use single_icon::SingleIcon;

use crate::error::IconError;

/// Largest width or height an icon image may have.
pub const MAX_ICON_SIZE: u32 = 256;

/// Both sides must be within 1..=256.
pub(crate) fn check_dimensions(width: u32, height: u32) -> Result<(), IconError> {
    if width > MAX_ICON_SIZE || height > MAX_ICON_SIZE {
        return Err(IconError::ImageTooLarge { width, height });
    }
    if width == 0 || height == 0 {
        return Err(IconError::InvalidImageFormat(format!(
            "{width}x{height} image has no pixels"
        )));
    }
    Ok(())
}
