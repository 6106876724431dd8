use std::fs;
use std::io::Write;
use std::path::Path;

use octree_quant::{Bitmap, PixelFormat, Rgb};
use tracing::debug;

use super::IconImage;
use crate::error::IconError;
use crate::ico::IcoCodec;
use crate::models::IconOutputFormat;
use crate::rendering::{PngCodec, StandardPngCodec};
use crate::synth::IconSynthesizer;
use crate::transparency::{MaskSource, TransparentColor};

/// A named, ordered set of sub-images; the contents of one `.ico` file.
///
/// No two images share the same width, height and bit depth.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SingleIcon {
    name: String,
    images: Vec<IconImage>,
}

impl SingleIcon {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            images: Vec::new(),
        }
    }

    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    pub(crate) fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.images.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.images.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&IconImage> {
        self.images.get(index)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, IconImage> {
        self.images.iter()
    }

    pub fn images(&self) -> &[IconImage] {
        &self.images
    }

    /// Add `bitmap`, hiding pixels with alpha 0 for 32 bpp bitmaps and
    /// pixels of the top-left pixel's color otherwise.
    pub fn add(&mut self, bitmap: &Bitmap) -> Result<&IconImage, IconError> {
        self.check_free(
            bitmap.width(),
            bitmap.height(),
            bitmap.format().bits_per_pixel(),
        )?;
        let rule = if bitmap.format() == PixelFormat::Bgra32 {
            TransparentColor::Alpha
        } else {
            TransparentColor::Rgb(bitmap.pixel(0, 0))
        };
        self.add_with(bitmap, MaskSource::Derive(rule))
    }

    /// Add `bitmap`, hiding every pixel of color `transparent`.
    pub fn add_with_color(
        &mut self,
        bitmap: &Bitmap,
        transparent: Rgb,
    ) -> Result<&IconImage, IconError> {
        self.add_with(bitmap, MaskSource::Derive(TransparentColor::Rgb(transparent)))
    }

    /// Add `bitmap` with an explicit 1 bpp mask of the same size.
    pub fn add_with_mask(&mut self, bitmap: &Bitmap, mask: &Bitmap) -> Result<&IconImage, IconError> {
        self.add_with(bitmap, MaskSource::Bitmap(mask))
    }

    fn add_with(&mut self, bitmap: &Bitmap, mask: MaskSource<'_>) -> Result<&IconImage, IconError> {
        self.check_free(
            bitmap.width(),
            bitmap.height(),
            bitmap.format().bits_per_pixel(),
        )?;
        let image = IconImage::from_bitmap(bitmap, mask)?;
        self.push(image)
    }

    /// Add an already built image.
    pub fn insert(&mut self, image: IconImage) -> Result<&IconImage, IconError> {
        self.check_free(image.width(), image.height(), image.bit_count())?;
        self.push(image)
    }

    fn push(&mut self, image: IconImage) -> Result<&IconImage, IconError> {
        debug!(
            icon = %self.name,
            width = image.width(),
            height = image.height(),
            bits = image.bit_count(),
            "Added icon image"
        );
        let index = self.images.len();
        self.images.push(image);
        Ok(&self.images[index])
    }

    /// Duplicates are reported before oversized images.
    fn check_free(&self, width: u32, height: u32, bits: u16) -> Result<(), IconError> {
        if self
            .images
            .iter()
            .any(|i| i.size() == (width, height) && i.bit_count() == bits)
        {
            return Err(IconError::DuplicateResolution {
                width,
                height,
                bits,
            });
        }
        super::check_dimensions(width, height)
    }

    pub fn remove_at(&mut self, index: usize) -> Option<IconImage> {
        (index < self.images.len()).then(|| self.images.remove(index))
    }

    pub fn clear(&mut self) {
        self.images.clear();
    }

    /// Position of the image with this size and depth.
    pub fn index_of(&self, size: (u32, u32), bits: u16) -> Option<usize> {
        self.images
            .iter()
            .position(|i| i.size() == size && i.bit_count() == bits)
    }

    /// Replace all images with the ones synthesized from `source`.
    ///
    /// On failure the icon is left as it was.
    pub fn create_from(
        &mut self,
        source: &Bitmap,
        format: IconOutputFormat,
        synthesizer: &IconSynthesizer,
    ) -> Result<(), IconError> {
        self.images = synthesizer.synthesize_format(source, format)?;
        Ok(())
    }

    /// Replace all images with the contents of an `.ico` file.
    pub fn load(&mut self, path: &Path) -> Result<(), IconError> {
        self.load_with(path, &StandardPngCodec::default())
    }

    pub fn load_with(&mut self, path: &Path, codec: &dyn PngCodec) -> Result<(), IconError> {
        let bytes = fs::read(path)?;
        self.read(&bytes, codec)
    }

    /// Replace all images with the ones parsed from `.ico` bytes.
    pub fn read(&mut self, bytes: &[u8], codec: &dyn PngCodec) -> Result<(), IconError> {
        let mut loaded = SingleIcon::new(self.name.clone());
        for image in IcoCodec::read(bytes, codec)? {
            loaded.insert(image)?;
        }
        self.images = loaded.images;
        Ok(())
    }

    pub fn save(&self, path: &Path) -> Result<(), IconError> {
        self.save_with(path, &StandardPngCodec::default())
    }

    pub fn save_with(&self, path: &Path, codec: &dyn PngCodec) -> Result<(), IconError> {
        let bytes = IcoCodec::to_bytes(&self.images, codec)?;
        let mut file = fs::File::create(path)?;
        file.write_all(&bytes)?;
        debug!(icon = %self.name, path = %path.display(), bytes = bytes.len(), "Saved icon");
        Ok(())
    }
}

impl<'a> IntoIterator for &'a SingleIcon {
    type Item = &'a IconImage;
    type IntoIter = std::slice::Iter<'a, IconImage>;

    fn into_iter(self) -> Self::IntoIter {
        self.images.iter()
    }
}
