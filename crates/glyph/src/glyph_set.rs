use std::path::Path;

use image::RgbaImage;

use crate::error::Result;

/// Drawn characters and their canvas images, in insertion order.
///
/// Owned by the caller and only read by the pipeline; keys are unique and
/// re-inserting a character replaces its image in place.
#[derive(Debug, Clone, Default)]
pub struct GlyphSet {
    entries: Vec<(char, RgbaImage)>,
}

impl GlyphSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace; returns the previous image for `character`
    pub fn insert(&mut self, character: char, image: RgbaImage) -> Option<RgbaImage> {
        match self.entries.iter_mut().find(|(c, _)| *c == character) {
            Some((_, existing)) => Some(std::mem::replace(existing, image)),
            None => {
                self.entries.push((character, image));
                None
            }
        }
    }

    /// Decode an image file (any format the image crate reads) as RGBA8
    pub fn load_image<P: AsRef<Path>>(&mut self, character: char, path: P) -> Result<()> {
        let image = image::open(path)?.to_rgba8();
        self.insert(character, image);
        Ok(())
    }

    /// Decode an in-memory encoded image as RGBA8
    pub fn load_image_from_bytes(&mut self, character: char, bytes: &[u8]) -> Result<()> {
        let image = image::load_from_memory(bytes)?.to_rgba8();
        self.insert(character, image);
        Ok(())
    }

    pub fn remove(&mut self, character: char) -> Option<RgbaImage> {
        let index = self.entries.iter().position(|(c, _)| *c == character)?;
        Some(self.entries.remove(index).1)
    }

    pub fn get(&self, character: char) -> Option<&RgbaImage> {
        self.entries
            .iter()
            .find(|(c, _)| *c == character)
            .map(|(_, image)| image)
    }

    pub fn get_index(&self, index: usize) -> Option<(char, &RgbaImage)> {
        self.entries.get(index).map(|(c, image)| (*c, image))
    }

    pub fn contains(&self, character: char) -> bool {
        self.entries.iter().any(|(c, _)| *c == character)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn characters(&self) -> impl Iterator<Item = char> + '_ {
        self.entries.iter().map(|(c, _)| *c)
    }

    pub fn iter(&self) -> impl Iterator<Item = (char, &RgbaImage)> {
        self.entries.iter().map(|(c, image)| (*c, image))
    }
}

impl FromIterator<(char, RgbaImage)> for GlyphSet {
    fn from_iter<I: IntoIterator<Item = (char, RgbaImage)>>(iter: I) -> Self {
        let mut glyphs = Self::new();
        for (character, image) in iter {
            glyphs.insert(character, image);
        }
        glyphs
    }
}
