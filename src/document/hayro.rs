use std::path::Path;
use std::sync::Arc;

use hayro::hayro_interpret::InterpreterSettings;
use hayro::hayro_syntax::Pdf;
use hayro::hayro_syntax::page::Page;
use hayro::vello_cpu::color::palette::css::WHITE;
use hayro::{RenderSettings, render};

use crate::error::{AppError, AppResult};
use crate::render::frame::RgbaFrame;

use super::traits::DocumentRenderer;

const PDF_MAGIC: &[u8] = b"%PDF-";

/// PDF album rasterized with hayro.
pub struct HayroDocument {
    pdf: Pdf,
}

impl HayroDocument {
    pub fn open(path: impl AsRef<Path>) -> AppResult<Self> {
        let bytes = Self::load_bytes(path)?;
        Self::from_bytes(bytes)
    }

    pub fn load_bytes(path: impl AsRef<Path>) -> AppResult<Arc<Vec<u8>>> {
        let path = path.as_ref();
        if path.as_os_str().is_empty() {
            return Err(AppError::invalid_argument("pdf path must not be empty"));
        }
        if !path.is_file() {
            if !path.exists() {
                return Err(AppError::io_with_context(
                    std::io::Error::new(std::io::ErrorKind::NotFound, "missing file"),
                    format!("pdf file not found: {}", path.display()),
                ));
            }
            return Err(AppError::invalid_argument("pdf path must be a regular file"));
        }

        let bytes = std::fs::read(path).map_err(|err| {
            AppError::io_with_context(err, format!("failed to read {}", path.display()))
        })?;
        Ok(Arc::new(bytes))
    }

    pub fn from_bytes(bytes: Arc<Vec<u8>>) -> AppResult<Self> {
        if !bytes.as_slice().starts_with(PDF_MAGIC) {
            return Err(AppError::invalid_argument("input is not a valid PDF header"));
        }
        let pdf = Pdf::new(bytes)
            .map_err(|_| AppError::invalid_argument("failed to parse PDF with hayro"))?;
        Ok(Self { pdf })
    }

    fn page(&self, page: usize) -> AppResult<&Page<'_>> {
        self.pdf
            .pages()
            .get(page)
            .ok_or(AppError::invalid_argument("page index is out of range"))
    }
}

impl DocumentRenderer for HayroDocument {
    fn page_count(&self) -> usize {
        self.pdf.pages().len()
    }

    fn page_dimensions(&self, page: usize) -> AppResult<(f32, f32)> {
        Ok(self.page(page)?.render_dimensions())
    }

    fn render_page(&self, page: usize, scale: f32) -> AppResult<RgbaFrame> {
        if !scale.is_finite() || scale <= 0.0 {
            return Err(AppError::invalid_argument(
                "scale must be a positive finite value",
            ));
        }
        let page_ref = self.page(page)?;

        let render_settings = RenderSettings {
            x_scale: scale,
            y_scale: scale,
            bg_color: WHITE,
            ..Default::default()
        };
        let pixmap = render(page_ref, &InterpreterSettings::default(), &render_settings);

        Ok(RgbaFrame {
            width: pixmap.width() as u32,
            height: pixmap.height() as u32,
            pixels: pixmap.data_as_u8_slice().to_vec().into(),
        })
    }
}
