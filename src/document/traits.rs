use crate::error::AppResult;
use crate::render::frame::RgbaFrame;

/// A paginated document that rasterizes pages on demand.
pub trait DocumentRenderer: Send {
    fn page_count(&self) -> usize;
    /// Page size in points at scale 1.0.
    fn page_dimensions(&self, page: usize) -> AppResult<(f32, f32)>;
    fn render_page(&self, page: usize, scale: f32) -> AppResult<RgbaFrame>;
}
