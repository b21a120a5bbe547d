use fast_image_resize as fr;
use image::{DynamicImage, RgbaImage};

use crate::error::{AppError, AppResult};

use super::frame::RgbaFrame;

pub(crate) const DOWNSCALE_FILTER: fr::FilterType = fr::FilterType::CatmullRom;

/// Fractional crop of a page, all values in `0.0..=1.0`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CropRect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl CropRect {
    pub const FULL: Self = Self {
        x: 0.0,
        y: 0.0,
        width: 1.0,
        height: 1.0,
    };

    pub fn is_full(&self) -> bool {
        *self == Self::FULL
    }
}

/// Decodes an encoded page image and downscales it to fit `max_size`.
/// Returns the frame together with the natural image dimensions.
pub fn decode_page_image(
    page: usize,
    bytes: &[u8],
    max_size: (u32, u32),
) -> AppResult<(RgbaFrame, (u32, u32))> {
    let image = image::load_from_memory(bytes).map_err(|err| AppError::image_decode(page, err))?;
    let rgba = image.to_rgba8();
    let natural = rgba.dimensions();
    let frame = RgbaFrame {
        width: natural.0,
        height: natural.1,
        pixels: rgba.into_raw().into(),
    };
    let frame = downscale_to_fit(frame, max_size.0, max_size.1)?;
    Ok((frame, natural))
}

pub fn frame_to_image(frame: &RgbaFrame, crop: CropRect) -> AppResult<DynamicImage> {
    let image = RgbaImage::from_raw(frame.width, frame.height, frame.pixels_to_vec()).ok_or(
        AppError::invalid_argument("rgba frame pixels length does not match dimensions"),
    )?;
    let image = DynamicImage::ImageRgba8(image);
    if crop.is_full() {
        return Ok(image);
    }

    let (x, y, width, height) = crop_pixels(frame.width, frame.height, crop);
    Ok(image.crop_imm(x, y, width, height))
}

pub(crate) fn crop_pixels(width: u32, height: u32, crop: CropRect) -> (u32, u32, u32, u32) {
    let clamp_unit = |value: f32| {
        if value.is_finite() {
            value.clamp(0.0, 1.0)
        } else {
            0.0
        }
    };
    let x = (clamp_unit(crop.x) * width as f32).floor() as u32;
    let y = (clamp_unit(crop.y) * height as f32).floor() as u32;
    let crop_width = (clamp_unit(crop.width) * width as f32).round() as u32;
    let crop_height = (clamp_unit(crop.height) * height as f32).round() as u32;
    let x = x.min(width.saturating_sub(1));
    let y = y.min(height.saturating_sub(1));
    (
        x,
        y,
        crop_width.clamp(1, width.saturating_sub(x).max(1)),
        crop_height.clamp(1, height.saturating_sub(y).max(1)),
    )
}

pub fn downscale_to_fit(frame: RgbaFrame, max_width: u32, max_height: u32) -> AppResult<RgbaFrame> {
    let Some((dst_width, dst_height)) =
        fit_downscale_dimensions(frame.width, frame.height, max_width, max_height)
    else {
        return Ok(frame);
    };

    resize_frame(frame, dst_width, dst_height)
}

pub(crate) fn fit_downscale_dimensions(
    src_width: u32,
    src_height: u32,
    max_width: u32,
    max_height: u32,
) -> Option<(u32, u32)> {
    if src_width == 0 || src_height == 0 || max_width == 0 || max_height == 0 {
        return None;
    }
    if src_width <= max_width && src_height <= max_height {
        return None;
    }

    let width_limited = (max_width as u64).saturating_mul(src_height as u64)
        <= (max_height as u64).saturating_mul(src_width as u64);

    if width_limited {
        let dst_width = max_width.max(1);
        let dst_height =
            ((src_height as u64).saturating_mul(dst_width as u64) / src_width as u64).max(1) as u32;
        Some((dst_width, dst_height.min(max_height.max(1))))
    } else {
        let dst_height = max_height.max(1);
        let dst_width = ((src_width as u64).saturating_mul(dst_height as u64) / src_height as u64)
            .max(1) as u32;
        Some((dst_width.min(max_width.max(1)), dst_height))
    }
}

fn resize_frame(frame: RgbaFrame, dst_width: u32, dst_height: u32) -> AppResult<RgbaFrame> {
    if frame.width == dst_width && frame.height == dst_height {
        return Ok(frame);
    }

    let src = fr::images::Image::from_vec_u8(
        frame.width,
        frame.height,
        frame.pixels_to_vec(),
        fr::PixelType::U8x4,
    )
    .map_err(|_| {
        AppError::invalid_argument("rgba frame pixels length does not match dimensions")
    })?;

    let mut dst = fr::images::Image::new(dst_width, dst_height, fr::PixelType::U8x4);
    let mut resizer = fr::Resizer::new();
    let options = fr::ResizeOptions::new().resize_alg(fr::ResizeAlg::Convolution(DOWNSCALE_FILTER));

    resizer
        .resize(&src, &mut dst, &options)
        .map_err(|_| AppError::unsupported("failed to downscale page frame"))?;

    Ok(RgbaFrame {
        width: dst_width,
        height: dst_height,
        pixels: dst.into_vec().into(),
    })
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;
    use std::sync::Arc;

    use image::{ImageFormat, RgbaImage};

    use super::{
        CropRect, crop_pixels, decode_page_image, downscale_to_fit, fit_downscale_dimensions,
        frame_to_image,
    };
    use crate::render::frame::RgbaFrame;

    fn png_bytes(width: u32, height: u32) -> Vec<u8> {
        let image = RgbaImage::from_pixel(width, height, image::Rgba([200, 10, 10, 255]));
        let mut bytes = Cursor::new(Vec::new());
        image
            .write_to(&mut bytes, ImageFormat::Png)
            .expect("png should encode");
        bytes.into_inner()
    }

    #[test]
    fn fit_downscale_keeps_aspect_ratio() {
        assert_eq!(fit_downscale_dimensions(1000, 1418, 500, 500), Some((352, 500)));
        assert_eq!(fit_downscale_dimensions(100, 100, 500, 500), None);
        assert_eq!(fit_downscale_dimensions(0, 100, 500, 500), None);
    }

    #[test]
    fn decode_reports_natural_size_and_downscales() {
        let bytes = png_bytes(40, 80);
        let (frame, natural) = decode_page_image(0, &bytes, (10, 10)).expect("png should decode");
        assert_eq!(natural, (40, 80));
        assert_eq!((frame.width, frame.height), (5, 10));
        assert_eq!(frame.byte_len(), 5 * 10 * 4);
    }

    #[test]
    fn decode_failure_carries_page_index() {
        let err = decode_page_image(4, b"not an image", (10, 10)).expect_err("garbage should fail");
        assert_eq!(err.to_string(), "failed to decode image for page 4");
    }

    #[test]
    fn crop_pixels_stay_inside_frame() {
        assert_eq!(
            crop_pixels(
                100,
                200,
                CropRect {
                    x: 0.5,
                    y: 0.25,
                    width: 0.5,
                    height: 0.5
                }
            ),
            (50, 50, 50, 100)
        );
        assert_eq!(
            crop_pixels(
                10,
                10,
                CropRect {
                    x: 2.0,
                    y: -1.0,
                    width: 1.0,
                    height: 1.0
                }
            ),
            (9, 0, 1, 10)
        );
    }

    #[test]
    fn frame_to_image_applies_crop() {
        let frame = RgbaFrame {
            width: 4,
            height: 4,
            pixels: Arc::from(vec![255_u8; 4 * 4 * 4]),
        };
        let full = frame_to_image(&frame, CropRect::FULL).expect("full image");
        assert_eq!((full.width(), full.height()), (4, 4));

        let half = frame_to_image(
            &frame,
            CropRect {
                x: 0.5,
                y: 0.0,
                width: 0.5,
                height: 1.0,
            },
        )
        .expect("cropped image");
        assert_eq!((half.width(), half.height()), (2, 4));
    }

    #[test]
    fn downscale_is_noop_when_frame_fits() {
        let frame = RgbaFrame {
            width: 2,
            height: 2,
            pixels: Arc::from(vec![0_u8; 16]),
        };
        let same = downscale_to_fit(frame.clone(), 10, 10).expect("noop downscale");
        assert_eq!(same, frame);
    }
}
