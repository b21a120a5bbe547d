use std::num::NonZeroUsize;

use crossterm::terminal;
use lru::LruCache;
use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::widgets::Clear;
use ratatui_image::picker::{Capability, Picker, ProtocolType};
use ratatui_image::protocol::StatefulProtocol;
use ratatui_image::{FilterType, Resize, StatefulImage};
use tracing::{debug, info};

use crate::error::{AppError, AppResult};
use crate::render::image_ops::{CropRect, frame_to_image};
use crate::render::{PageKey, RgbaFrame};

const PROTOCOL_CACHE_ENTRIES: usize = 6;
const CROP_STEPS: f32 = 1000.0;
const FALLBACK_CELL_PX: (u16, u16) = (10, 20);
/// Filter ratatui-image uses when fitting a protocol into its cell area.
const PRESENT_RESIZE_FILTER: FilterType = FilterType::CatmullRom;

/// Crop quantized so that float noise does not defeat the protocol cache.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
struct CropKey([u16; 4]);

impl From<CropRect> for CropKey {
    fn from(crop: CropRect) -> Self {
        let quantize = |value: f32| (value.clamp(0.0, 1.0) * CROP_STEPS).round() as u16;
        Self([
            quantize(crop.x),
            quantize(crop.y),
            quantize(crop.width),
            quantize(crop.height),
        ])
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
struct ProtocolKey {
    page: PageKey,
    crop: CropKey,
}

/// Draws page frames through ratatui-image, keeping a few encoded protocols
/// around so flipping back and forth does not re-encode.
pub(crate) struct PagePresenter {
    picker: Picker,
    protocol_label: &'static str,
    protocols: LruCache<ProtocolKey, StatefulProtocol>,
    current: Option<ProtocolKey>,
}

impl Default for PagePresenter {
    fn default() -> Self {
        Self::with_picker(Picker::halfblocks())
    }
}

impl PagePresenter {
    pub(crate) fn with_picker(picker: Picker) -> Self {
        let protocol_label = protocol_type_label(picker.protocol_type());
        Self {
            picker,
            protocol_label,
            protocols: LruCache::new(
                NonZeroUsize::new(PROTOCOL_CACHE_ENTRIES).unwrap_or(NonZeroUsize::MIN),
            ),
            current: None,
        }
    }

    /// Queries the terminal for its graphics protocol; falls back to halfblocks.
    pub(crate) fn detect() -> Self {
        match Picker::from_query_stdio() {
            Ok(picker) => {
                let protocol_type = picker.protocol_type();
                let presenter = Self::with_picker(picker_with_resolved_cell_size(picker, protocol_type));
                info!(protocol = presenter.protocol_label, "terminal graphics detected");
                presenter
            }
            Err(err) => {
                debug!(error = %err, "terminal graphics query failed; using halfblocks");
                Self::default()
            }
        }
    }

    pub(crate) fn protocol_label(&self) -> &'static str {
        self.protocol_label
    }

    pub(crate) fn cell_px(&self) -> (u16, u16) {
        let (width, height) = self.picker.font_size();
        if width == 0 || height == 0 {
            return FALLBACK_CELL_PX;
        }
        (width, height)
    }

    pub(crate) fn prepare(&mut self, page: PageKey, frame: &RgbaFrame, crop: CropRect) -> AppResult<()> {
        let key = ProtocolKey {
            page,
            crop: CropKey::from(crop),
        };
        if self.protocols.get(&key).is_none() {
            let image = frame_to_image(frame, crop)?;
            let protocol = self.picker.new_resize_protocol(image);
            self.protocols.put(key, protocol);
        }
        self.current = Some(key);
        Ok(())
    }

    pub(crate) fn clear_current(&mut self) {
        self.current = None;
    }

    #[cfg(test)]
    pub(crate) fn has_current(&self) -> bool {
        self.current.is_some()
    }

    /// Drops encoded pages that belong to earlier source lists.
    pub(crate) fn retain_generation(&mut self, generation: u64) {
        let stale: Vec<_> = self
            .protocols
            .iter()
            .filter_map(|(key, _)| (key.page.generation != generation).then_some(*key))
            .collect();
        for key in stale {
            self.protocols.pop(&key);
        }
        if self
            .current
            .is_some_and(|key| key.page.generation != generation)
        {
            self.current = None;
        }
    }

    pub(crate) fn render(&mut self, frame: &mut Frame<'_>, area: Rect) -> AppResult<bool> {
        if area.width == 0 || area.height == 0 {
            return Ok(false);
        }
        let Some(key) = self.current else {
            return Ok(false);
        };
        let Some(protocol) = self.protocols.get_mut(&key) else {
            return Ok(false);
        };

        frame.render_widget(Clear, area);
        frame.render_stateful_widget(
            StatefulImage::<StatefulProtocol>::default()
                .resize(Resize::Fit(Some(PRESENT_RESIZE_FILTER))),
            area,
            protocol,
        );
        if let Some(result) = protocol.last_encoding_result() {
            result.map_err(|_| AppError::unsupported("failed to encode terminal image"))?;
        }
        Ok(true)
    }
}

fn picker_with_resolved_cell_size(picker: Picker, protocol_type: ProtocolType) -> Picker {
    let current = picker.font_size();
    let resolved = cell_size_from_window().or_else(|| {
        picker.capabilities().iter().find_map(|cap| match cap {
            Capability::CellSize(Some((width, height))) if *width > 0 && *height > 0 => {
                Some((*width, *height))
            }
            _ => None,
        })
    });
    match resolved {
        Some(resolved) if resolved != current => {
            #[allow(deprecated)]
            let mut rebuilt = Picker::from_fontsize(resolved);
            rebuilt.set_protocol_type(protocol_type);
            rebuilt
        }
        _ => picker,
    }
}

fn cell_size_from_window() -> Option<(u16, u16)> {
    let window = terminal::window_size().ok()?;
    cell_size_from_window_metrics(window.width, window.height, window.columns, window.rows)
}

pub(crate) fn cell_size_from_window_metrics(
    width_px: u16,
    height_px: u16,
    columns: u16,
    rows: u16,
) -> Option<(u16, u16)> {
    if width_px == 0 || height_px == 0 || columns == 0 || rows == 0 {
        return None;
    }
    let cell = (width_px / columns, height_px / rows);
    (cell.0 > 0 && cell.1 > 0).then_some(cell)
}

fn protocol_type_label(protocol: ProtocolType) -> &'static str {
    match protocol {
        ProtocolType::Halfblocks => "halfblocks",
        ProtocolType::Sixel => "sixel",
        ProtocolType::Kitty => "kitty",
        ProtocolType::Iterm2 => "iterm2",
    }
}
