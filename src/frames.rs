//! Decoded tray frames.
//!
//! The whole animation is decoded and scaled to icon size once at startup, so
//! the animation thread only ever indexes into memory.

use crate::error::{BounceResult, Error};
use image::codecs::gif::GifDecoder;
use image::imageops::{self, FilterType};
use image::{AnimationDecoder, ImageFormat, ImageReader, RgbaImage};
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

#[derive(Debug, Clone)]
pub struct FrameSequence {
    frames: Vec<RgbaImage>,
    size: u32,
}

impl FrameSequence {
    /// Decodes every frame of `path` in order and scales each to
    /// `size`×`size`. Non-GIF images load as a single frame.
    pub fn load(path: &Path, size: u32) -> BounceResult<Self> {
        if !path.is_file() {
            return Err(Error::MissingAnimation(path.to_path_buf()));
        }

        let reader = ImageReader::open(path)?.with_guessed_format()?;
        let images = match reader.format() {
            Some(ImageFormat::Gif) => {
                let decoder = GifDecoder::new(BufReader::new(File::open(path)?))?;
                decoder
                    .into_frames()
                    .collect_frames()?
                    .into_iter()
                    .map(|frame| frame.into_buffer())
                    .collect()
            }
            _ => vec![reader.decode()?.to_rgba8()],
        };

        Self::from_images(images, size)
    }

    /// Scales already decoded images. Fails if there are none.
    pub fn from_images(images: Vec<RgbaImage>, size: u32) -> BounceResult<Self> {
        if images.is_empty() {
            return Err(Error::NoFrames);
        }
        let frames = images
            .iter()
            .map(|image| {
                if image.dimensions() == (size, size) {
                    image.clone()
                } else {
                    imageops::resize(image, size, size, FilterType::Lanczos3)
                }
            })
            .collect();
        Ok(FrameSequence { frames, size })
    }

    /// Never zero.
    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn size(&self) -> u32 {
        self.size
    }

    /// Indexes cyclically, so any cursor value is valid.
    pub fn get(&self, index: usize) -> &RgbaImage {
        &self.frames[index % self.frames.len()]
    }

    pub fn iter(&self) -> impl Iterator<Item = &RgbaImage> {
        self.frames.iter()
    }
}
