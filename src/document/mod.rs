use std::sync::Arc;

use crate::error::AppResult;

mod hayro;
#[cfg(test)]
pub(crate) mod testing;
mod traits;

pub use hayro::HayroDocument;
pub use traits::DocumentRenderer;

pub fn open_document_bytes(bytes: Arc<Vec<u8>>) -> AppResult<Box<dyn DocumentRenderer>> {
    HayroDocument::from_bytes(bytes).map(|doc| Box::new(doc) as Box<dyn DocumentRenderer>)
}

/// Scale that fits a `page` of the given point size inside `max_px`.
pub fn fit_scale(page: (f32, f32), max_px: (u32, u32)) -> f32 {
    let (width, height) = page;
    if width <= 0.0 || height <= 0.0 || !width.is_finite() || !height.is_finite() {
        return 1.0;
    }
    let scale = (max_px.0 as f32 / width).min(max_px.1 as f32 / height);
    if scale.is_finite() && scale > 0.0 {
        scale
    } else {
        1.0
    }
}
