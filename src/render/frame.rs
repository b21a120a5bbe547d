use std::sync::Arc;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RgbaFrame {
    pub width: u32,
    pub height: u32,
    pub pixels: Arc<[u8]>,
}

impl RgbaFrame {
    pub fn byte_len(&self) -> usize {
        self.pixels.len()
    }

    pub fn pixels_to_vec(&self) -> Vec<u8> {
        self.pixels.as_ref().to_vec()
    }
}

/// Identifies one page of one source-list generation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PageKey {
    pub generation: u64,
    pub page: usize,
}

impl PageKey {
    pub fn new(generation: u64, page: usize) -> Self {
        Self { generation, page }
    }
}
