//! Texture preparation: decode, power-of-two padding and GPU upload.
//!
//! Loading is split in two steps so the CPU half can run (and fail) before a
//! window exists:
//!
//! 1. [`TextureImage::decode`] turns encoded bytes into an RGB pixel buffer
//!    whose dimensions are powers of two.
//! 2. [`Texture::upload`] copies that buffer into a sampled GPU texture.
//!
//! [`Texture::load`] does both at once.
//!
//! ```
//! use orbitlab::next_pow2;
//!
//! assert_eq!(next_pow2(5), Some(8));
//! assert_eq!(next_pow2(257), Some(512));
//! assert_eq!(next_pow2(u32::MAX), None);
//! ```

use std::path::Path;

use image::imageops::{self, FilterType};
use image::{ColorType, DynamicImage, RgbImage};

use crate::gpu::GpuContext;

/// Errors from reading, decoding or uploading a texture.
#[derive(Debug, thiserror::Error)]
pub enum TextureError {
    #[error("failed to read texture '{path}': {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to decode texture: {0}")]
    Decode(#[from] image::ImageError),
    /// The pixel layout has no lossless 8-bit RGB representation.
    #[error("unsupported texture layout {0:?}: expected 8 or 16 bit luma/RGB channels")]
    UnsupportedFormat(ColorType),
    #[error("padded texture {width}x{height} exceeds the device limit of {max}")]
    TooLarge { width: u32, height: u32, max: u32 },
}

/// How texture coordinates outside `[0, 1]` are resolved.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum WrapMode {
    #[default]
    Repeat,
    Clamp,
}

impl WrapMode {
    fn address_mode(self) -> wgpu::AddressMode {
        match self {
            WrapMode::Repeat => wgpu::AddressMode::Repeat,
            WrapMode::Clamp => wgpu::AddressMode::ClampToEdge,
        }
    }
}

/// Options applied while preparing a texture.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TextureOptions {
    pub wrap: WrapMode,
    /// Store rows bottom-up so UV `(0, 0)` is the image's bottom-left corner.
    pub flip_vertical: bool,
}

impl Default for TextureOptions {
    fn default() -> Self {
        Self {
            wrap: WrapMode::Repeat,
            flip_vertical: true,
        }
    }
}

/// Smallest power of two that is `>= n`, or `None` when it does not fit
/// in a `u32` (`n > 2^31`).
pub fn next_pow2(n: u32) -> Option<u32> {
    let mut value = 1u32;
    while value < n {
        value = value.checked_mul(2)?;
    }
    Some(value)
}

/// A decoded RGB image with power-of-two dimensions, ready for upload.
#[derive(Clone, Debug)]
pub struct TextureImage {
    pixels: RgbImage,
    source_size: (u32, u32),
}

impl TextureImage {
    /// Read and decode an image file.
    pub fn open(path: impl AsRef<Path>, options: &TextureOptions) -> Result<Self, TextureError> {
        let path = path.as_ref();
        let bytes = std::fs::read(path).map_err(|source| TextureError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::decode(&bytes, options)
    }

    /// Decode encoded image bytes (PNG, JPEG, ...) and pad to powers of two.
    pub fn decode(bytes: &[u8], options: &TextureOptions) -> Result<Self, TextureError> {
        let image = image::load_from_memory(bytes)?;
        Self::from_dynamic(image, options)
    }

    /// Convert an already decoded image.
    pub fn from_dynamic(image: DynamicImage, options: &TextureOptions) -> Result<Self, TextureError> {
        match image.color() {
            ColorType::L8
            | ColorType::La8
            | ColorType::Rgb8
            | ColorType::Rgba8
            | ColorType::L16
            | ColorType::La16
            | ColorType::Rgb16
            | ColorType::Rgba16 => {}
            other => return Err(TextureError::UnsupportedFormat(other)),
        }

        let source_size = (image.width(), image.height());
        let mut pixels = pad_to_pow2(image.to_rgb8())?;
        if options.flip_vertical {
            imageops::flip_vertical_in_place(&mut pixels);
        }

        Ok(Self {
            pixels,
            source_size,
        })
    }

    pub fn width(&self) -> u32 {
        self.pixels.width()
    }

    pub fn height(&self) -> u32 {
        self.pixels.height()
    }

    /// Dimensions of the image before padding.
    pub fn source_size(&self) -> (u32, u32) {
        self.source_size
    }

    pub fn pixels(&self) -> &RgbImage {
        &self.pixels
    }

    /// Expand to tightly packed RGBA rows with opaque alpha.
    fn to_rgba_bytes(&self) -> Vec<u8> {
        self.pixels
            .pixels()
            .flat_map(|p| [p[0], p[1], p[2], u8::MAX])
            .collect()
    }
}

/// Largest dimension [`next_pow2`] can pad to.
const MAX_POW2: u32 = 1 << 31;

/// Resize to the next power of two on each axis; a no-op when already there.
fn pad_to_pow2(image: RgbImage) -> Result<RgbImage, TextureError> {
    let (width, height) = image.dimensions();
    let (Some(padded_w), Some(padded_h)) = (next_pow2(width), next_pow2(height)) else {
        return Err(TextureError::TooLarge {
            width,
            height,
            max: MAX_POW2,
        });
    };
    if (padded_w, padded_h) == (width, height) {
        return Ok(image);
    }
    tracing::debug!(width, height, padded_w, padded_h, "padding texture to power of two");
    Ok(imageops::resize(&image, padded_w, padded_h, FilterType::Lanczos3))
}

/// Sampler settings for a texture: the wrap mode on every axis and linear
/// filtering for magnification and minification.
fn sampler_descriptor<'a>(options: &TextureOptions, label: &'a str) -> wgpu::SamplerDescriptor<'a> {
    let address_mode = options.wrap.address_mode();
    wgpu::SamplerDescriptor {
        label: Some(label),
        address_mode_u: address_mode,
        address_mode_v: address_mode,
        address_mode_w: address_mode,
        mag_filter: wgpu::FilterMode::Linear,
        min_filter: wgpu::FilterMode::Linear,
        mipmap_filter: wgpu::FilterMode::Nearest,
        ..Default::default()
    }
}

/// A GPU texture that can be bound to shaders.
#[derive(Debug)]
pub struct Texture {
    #[allow(dead_code)]
    pub(crate) texture: wgpu::Texture,
    pub(crate) view: wgpu::TextureView,
    pub(crate) sampler: wgpu::Sampler,
    pub width: u32,
    pub height: u32,
}

impl Texture {
    /// Decode and upload in one step.
    pub fn load(
        gpu: &GpuContext,
        bytes: &[u8],
        options: &TextureOptions,
    ) -> Result<Self, TextureError> {
        let image = TextureImage::decode(bytes, options)?;
        Self::upload(gpu, &image, options, "Texture")
    }

    /// Allocate a GPU texture and copy the prepared pixels into it.
    ///
    /// Rows are written without padding (`bytes_per_row == 4 * width`) and
    /// the sampler filters linearly in both directions.
    pub fn upload(
        gpu: &GpuContext,
        image: &TextureImage,
        options: &TextureOptions,
        label: &str,
    ) -> Result<Self, TextureError> {
        let (width, height) = (image.width(), image.height());
        let max = gpu.device.limits().max_texture_dimension_2d;
        if width > max || height > max {
            return Err(TextureError::TooLarge { width, height, max });
        }

        let size = wgpu::Extent3d {
            width,
            height,
            depth_or_array_layers: 1,
        };

        let texture = gpu.device.create_texture(&wgpu::TextureDescriptor {
            label: Some(label),
            size,
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: wgpu::TextureFormat::Rgba8UnormSrgb,
            usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
            view_formats: &[],
        });

        gpu.queue.write_texture(
            wgpu::TexelCopyTextureInfo {
                texture: &texture,
                mip_level: 0,
                origin: wgpu::Origin3d::ZERO,
                aspect: wgpu::TextureAspect::All,
            },
            &image.to_rgba_bytes(),
            wgpu::TexelCopyBufferLayout {
                offset: 0,
                bytes_per_row: Some(4 * width),
                rows_per_image: Some(height),
            },
            size,
        );

        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());

        let sampler_label = format!("{} Sampler", label);
        let sampler = gpu
            .device
            .create_sampler(&sampler_descriptor(options, &sampler_label));

        let (source_w, source_h) = image.source_size();
        tracing::info!(
            source_w,
            source_h,
            width,
            height,
            wrap = ?options.wrap,
            "texture uploaded"
        );

        Ok(Self {
            texture,
            view,
            sampler,
            width,
            height,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{ImageFormat, Rgb, Rgb32FImage};
    use std::io::Cursor;

    fn encode_png(image: DynamicImage) -> Vec<u8> {
        let mut bytes = Vec::new();
        image
            .write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)
            .unwrap();
        bytes
    }

    #[test]
    fn next_pow2_values() {
        assert_eq!(next_pow2(1), Some(1));
        assert_eq!(next_pow2(5), Some(8));
        assert_eq!(next_pow2(16), Some(16));
        assert_eq!(next_pow2(257), Some(512));
        assert_eq!(next_pow2(0), Some(1));
    }

    #[test]
    fn next_pow2_stops_at_u32_range() {
        assert_eq!(next_pow2(1 << 31), Some(1 << 31));
        assert_eq!(next_pow2((1 << 31) + 1), None);
        assert_eq!(next_pow2(u32::MAX), None);
    }

    #[test]
    fn clamp_wrap_clamps_every_axis() {
        let options = TextureOptions {
            wrap: WrapMode::Clamp,
            ..Default::default()
        };
        let desc = sampler_descriptor(&options, "Wall Sampler");
        assert_eq!(desc.label, Some("Wall Sampler"));
        assert_eq!(desc.address_mode_u, wgpu::AddressMode::ClampToEdge);
        assert_eq!(desc.address_mode_v, wgpu::AddressMode::ClampToEdge);
        assert_eq!(desc.address_mode_w, wgpu::AddressMode::ClampToEdge);
    }

    #[test]
    fn repeat_wrap_repeats_with_linear_filtering() {
        let desc = sampler_descriptor(&TextureOptions::default(), "Sampler");
        assert_eq!(desc.address_mode_u, wgpu::AddressMode::Repeat);
        assert_eq!(desc.address_mode_v, wgpu::AddressMode::Repeat);
        assert_eq!(desc.address_mode_w, wgpu::AddressMode::Repeat);
        assert_eq!(desc.mag_filter, wgpu::FilterMode::Linear);
        assert_eq!(desc.min_filter, wgpu::FilterMode::Linear);
    }

    #[test]
    fn pads_each_axis_independently() {
        let bytes = encode_png(DynamicImage::ImageRgb8(RgbImage::new(5, 3)));
        let image = TextureImage::decode(&bytes, &TextureOptions::default()).unwrap();
        assert_eq!((image.width(), image.height()), (8, 4));
        assert_eq!(image.source_size(), (5, 3));
    }

    #[test]
    fn power_of_two_image_is_left_alone() {
        let mut source = RgbImage::new(4, 2);
        source.put_pixel(1, 0, Rgb([10, 20, 30]));
        let options = TextureOptions {
            flip_vertical: false,
            ..Default::default()
        };
        let image = TextureImage::from_dynamic(DynamicImage::ImageRgb8(source.clone()), &options)
            .unwrap();
        assert_eq!(image.pixels(), &source);
    }

    #[test]
    fn flip_puts_bottom_row_first() {
        let mut source = RgbImage::new(1, 2);
        source.put_pixel(0, 0, Rgb([255, 0, 0]));
        source.put_pixel(0, 1, Rgb([0, 0, 255]));
        let image =
            TextureImage::from_dynamic(DynamicImage::ImageRgb8(source), &TextureOptions::default())
                .unwrap();
        assert_eq!(image.pixels().get_pixel(0, 0), &Rgb([0, 0, 255]));
        assert_eq!(image.pixels().get_pixel(0, 1), &Rgb([255, 0, 0]));
    }

    #[test]
    fn rgba_bytes_are_tightly_packed_and_opaque() {
        let mut source = RgbImage::new(2, 1);
        source.put_pixel(0, 0, Rgb([1, 2, 3]));
        source.put_pixel(1, 0, Rgb([4, 5, 6]));
        let image =
            TextureImage::from_dynamic(DynamicImage::ImageRgb8(source), &TextureOptions::default())
                .unwrap();
        assert_eq!(image.to_rgba_bytes(), vec![1, 2, 3, 255, 4, 5, 6, 255]);
    }

    #[test]
    fn grayscale_converts_to_rgb() {
        let source = DynamicImage::ImageLuma8(image::GrayImage::from_pixel(2, 2, image::Luma([7])));
        let image = TextureImage::from_dynamic(source, &TextureOptions::default()).unwrap();
        assert_eq!(image.pixels().get_pixel(1, 1), &Rgb([7, 7, 7]));
    }

    #[test]
    fn float_layout_is_unsupported() {
        let source = DynamicImage::ImageRgb32F(Rgb32FImage::new(2, 2));
        let err = TextureImage::from_dynamic(source, &TextureOptions::default()).unwrap_err();
        assert!(matches!(err, TextureError::UnsupportedFormat(ColorType::Rgb32F)));
    }

    #[test]
    fn garbage_bytes_fail_to_decode() {
        let err = TextureImage::decode(b"definitely not an image", &TextureOptions::default())
            .unwrap_err();
        assert!(matches!(err, TextureError::Decode(_)));
    }

    #[test]
    fn missing_file_reports_path() {
        let err = TextureImage::open("no/such/wall.jpg", &TextureOptions::default()).unwrap_err();
        match err {
            TextureError::Io { path, .. } => assert!(path.ends_with("wall.jpg")),
            other => panic!("expected io error, got {other:?}"),
        }
    }
}
