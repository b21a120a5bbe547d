use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::error::{AppError, AppResult};
use crate::zoom::{MAX_ZOOM, MIN_ZOOM};

pub const DEFAULT_ALBUM_UPSTREAM: &str =
    "https://github.com/kazumi-sansan/wings-in-bloom-2025/releases/download/v1.0.0/album.pdf";

#[derive(Debug, Clone, Deserialize, PartialEq, Default)]
#[serde(default)]
pub struct Config {
    pub layout: LayoutConfig,
    pub zoom: ZoomConfig,
    pub loading: LoadingConfig,
    pub hint: HintConfig,
    pub prefetch: PrefetchConfig,
    pub engine: EngineConfig,
    pub album: AlbumConfig,
    pub log: LogConfig,
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct LayoutConfig {
    pub desktop_width_px: f32,
    /// Height over width, used until a page image has been measured.
    pub default_aspect_ratio: f32,
    pub control_reserve_px: f32,
    pub height_fraction: f32,
    pub mobile_breakpoint_px: f32,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            desktop_width_px: 620.0,
            default_aspect_ratio: 709.0 / 500.0,
            control_reserve_px: 72.0,
            height_fraction: 0.9,
            mobile_breakpoint_px: 768.0,
        }
    }
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
/// Zoom steps. The bounds themselves are fixed, see [`crate::zoom::MIN_ZOOM`].
pub struct ZoomConfig {
    pub button_step: f32,
    pub wheel_step: f32,
    pub scroll_threshold: f32,
}

impl Default for ZoomConfig {
    fn default() -> Self {
        Self {
            button_step: 0.15,
            wheel_step: 0.12,
            scroll_threshold: 1.01,
        }
    }
}

#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct LoadingConfig {
    pub min_display_ms: u64,
}

impl Default for LoadingConfig {
    fn default() -> Self {
        Self {
            min_display_ms: 1100,
        }
    }
}

#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct HintConfig {
    pub display_ms: u64,
}

impl Default for HintConfig {
    fn default() -> Self {
        Self { display_ms: 4000 }
    }
}

#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct PrefetchConfig {
    pub radius: usize,
    pub cache_entries: usize,
    pub cache_memory_mb: usize,
}

impl Default for PrefetchConfig {
    fn default() -> Self {
        Self {
            radius: 2,
            cache_entries: 32,
            cache_memory_mb: 256,
        }
    }
}

impl PrefetchConfig {
    pub fn cache_memory_bytes(&self) -> usize {
        self.cache_memory_mb.saturating_mul(1024 * 1024)
    }
}

#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct EngineConfig {
    pub flipping_time_ms: u64,
    pub swipe_distance_px: u16,
    pub double_click_ms: u64,
    pub tick_ms: u64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            flipping_time_ms: 1000,
            swipe_distance_px: 30,
            double_click_ms: 300,
            tick_ms: 33,
        }
    }
}

#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct AlbumConfig {
    pub bind: String,
    pub upstream_url: String,
    pub filename: String,
    pub static_root: PathBuf,
}

impl Default for AlbumConfig {
    fn default() -> Self {
        Self {
            bind: "127.0.0.1:8787".to_string(),
            upstream_url: DEFAULT_ALBUM_UPSTREAM.to_string(),
            filename: "album.pdf".to_string(),
            static_root: PathBuf::from("public"),
        }
    }
}

#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct LogConfig {
    pub level: String,
    pub file: Option<PathBuf>,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            file: None,
        }
    }
}

impl Config {
    pub fn load() -> AppResult<Self> {
        let Some(path) = default_config_path() else {
            return Ok(Self::default());
        };
        Self::load_from_path(path)
    }

    pub fn load_from_path(path: impl AsRef<Path>) -> AppResult<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Ok(Self::default());
        }
        if !path.is_file() {
            return Err(AppError::invalid_argument(format!(
                "config path is not a regular file: {}",
                path.display()
            )));
        }

        let raw = fs::read_to_string(path).map_err(|source| {
            AppError::io_with_context(source, format!("failed to read config: {}", path.display()))
        })?;
        let parsed = toml::from_str::<Self>(&raw).map_err(|source| {
            AppError::invalid_argument(format!(
                "failed to parse config {}: {source}",
                path.display()
            ))
        })?;
        Ok(parsed.sanitized())
    }

    fn sanitized(mut self) -> Self {
        let layout_defaults = LayoutConfig::default();
        if !positive_finite(self.layout.desktop_width_px) {
            self.layout.desktop_width_px = layout_defaults.desktop_width_px;
        }
        if !positive_finite(self.layout.default_aspect_ratio) {
            self.layout.default_aspect_ratio = layout_defaults.default_aspect_ratio;
        }
        if !self.layout.control_reserve_px.is_finite() || self.layout.control_reserve_px < 0.0 {
            self.layout.control_reserve_px = layout_defaults.control_reserve_px;
        }
        if !positive_finite(self.layout.height_fraction) || self.layout.height_fraction > 1.0 {
            self.layout.height_fraction = layout_defaults.height_fraction;
        }
        if !positive_finite(self.layout.mobile_breakpoint_px) {
            self.layout.mobile_breakpoint_px = layout_defaults.mobile_breakpoint_px;
        }

        let zoom_defaults = ZoomConfig::default();
        if !positive_finite(self.zoom.button_step) {
            self.zoom.button_step = zoom_defaults.button_step;
        }
        if !positive_finite(self.zoom.wheel_step) {
            self.zoom.wheel_step = zoom_defaults.wheel_step;
        }
        if !self.zoom.scroll_threshold.is_finite()
            || !(MIN_ZOOM..MAX_ZOOM).contains(&self.zoom.scroll_threshold)
        {
            self.zoom.scroll_threshold = zoom_defaults.scroll_threshold;
        }

        self.prefetch.cache_entries = self.prefetch.cache_entries.max(1);
        self.prefetch.cache_memory_mb = self.prefetch.cache_memory_mb.max(1);
        self.engine.swipe_distance_px = self.engine.swipe_distance_px.max(1);
        self.engine.double_click_ms = self.engine.double_click_ms.max(1);
        self.engine.tick_ms = self.engine.tick_ms.max(1);
        if self.log.level.trim().is_empty() {
            self.log.level = LogConfig::default().level;
        }
        self
    }
}

fn positive_finite(value: f32) -> bool {
    value.is_finite() && value > 0.0
}

pub fn default_config_path() -> Option<PathBuf> {
    if let Some(explicit) = std::env::var_os("FLIPBOOK_CONFIG_PATH")
        && !explicit.is_empty()
    {
        return Some(PathBuf::from(explicit));
    }

    if let Some(xdg) = std::env::var_os("XDG_CONFIG_HOME")
        && !xdg.is_empty()
    {
        return Some(PathBuf::from(xdg).join("flipbook").join("config.toml"));
    }
    if let Some(home) = std::env::var_os("HOME")
        && !home.is_empty()
    {
        return Some(
            PathBuf::from(home)
                .join(".config")
                .join("flipbook")
                .join("config.toml"),
        );
    }
    if let Some(appdata) = std::env::var_os("APPDATA")
        && !appdata.is_empty()
    {
        return Some(PathBuf::from(appdata).join("flipbook").join("config.toml"));
    }
    None
}

#[cfg(test)]
mod tests {
    use std::fs;
    use std::path::PathBuf;
    use std::process;
    use std::time::{SystemTime, UNIX_EPOCH};

    use super::Config;
    use crate::zoom::{MAX_ZOOM, MIN_ZOOM, ZoomController};

    fn unique_temp_path(suffix: &str) -> PathBuf {
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("clock should be after unix epoch")
            .as_nanos();
        let mut path = std::env::temp_dir();
        path.push(format!("flipbook_config_{suffix}_{}_{}", process::id(), nanos));
        path
    }

    #[test]
    fn load_from_path_returns_defaults_for_missing_file() {
        let missing = unique_temp_path("missing.toml");
        let config = Config::load_from_path(&missing).expect("missing config should fallback");
        assert_eq!(config, Config::default());
    }

    #[test]
    fn defaults_match_album_layout() {
        let config = Config::default();
        assert_eq!(config.layout.desktop_width_px, 620.0);
        assert_eq!(config.layout.control_reserve_px, 72.0);
        assert_eq!(config.zoom.button_step, 0.15);
        assert_eq!(config.zoom.scroll_threshold, 1.01);
        assert_eq!(config.loading.min_display_ms, 1100);
        assert_eq!(config.hint.display_ms, 4000);
        assert_eq!(config.prefetch.radius, 2);
        assert_eq!(config.album.filename, "album.pdf");
    }

    #[test]
    fn load_from_path_applies_partial_overrides_and_sanitizes() {
        let path = unique_temp_path("custom.toml");
        fs::write(
            &path,
            r#"
            [layout]
            desktop_width_px = 0.0
            default_aspect_ratio = -1.0
            height_fraction = 3.0

            [zoom]
            wheel_step = 0.0
            scroll_threshold = 0.2

            [engine]
            swipe_distance_px = 0
            double_click_ms = 0

            [prefetch]
            radius = 4
            cache_entries = 0

            [album]
            bind = "0.0.0.0:9000"
            "#,
        )
        .expect("config file should be written");

        let config = Config::load_from_path(&path).expect("config should parse");
        assert_eq!(config.layout.desktop_width_px, 620.0);
        assert_eq!(config.layout.default_aspect_ratio, 709.0 / 500.0);
        assert_eq!(config.layout.height_fraction, 0.9);
        assert_eq!(config.zoom.scroll_threshold, 1.01);
        assert_eq!(config.zoom.wheel_step, 0.12);
        assert_eq!(config.engine.swipe_distance_px, 1);
        assert_eq!(config.engine.double_click_ms, 1);
        assert_eq!(config.prefetch.radius, 4);
        assert_eq!(config.prefetch.cache_entries, 1);
        assert_eq!(config.album.bind, "0.0.0.0:9000");
        assert_eq!(config.album.filename, "album.pdf");

        fs::remove_file(&path).expect("config file should be removed");
    }

    #[test]
    fn load_from_path_rejects_malformed_toml() {
        let path = unique_temp_path("broken.toml");
        fs::write(&path, "[zoom\nmin = ").expect("config file should be written");

        assert!(Config::load_from_path(&path).is_err());

        fs::remove_file(&path).expect("config file should be removed");
    }

    #[test]
    fn configured_zoom_cannot_leave_fixed_bounds() {
        let path = unique_temp_path("zoom.toml");
        fs::write(
            &path,
            "[zoom]\nmin = 0.5\nmax = 4.0\nbutton_step = 0.5\nscroll_threshold = 3.0\n",
        )
        .expect("config file should be written");

        let config = Config::load_from_path(&path).expect("config should parse");
        assert_eq!(config.zoom.button_step, 0.5);
        assert_eq!(config.zoom.scroll_threshold, 1.01);

        let mut zoom = ZoomController::new(config.zoom);
        assert_eq!(zoom.level(), MIN_ZOOM);
        for _ in 0..40 {
            zoom.zoom_in();
            assert!((MIN_ZOOM..=MAX_ZOOM).contains(&zoom.level()));
        }
        assert_eq!(zoom.level(), MAX_ZOOM);
        for _ in 0..40 {
            zoom.zoom_out();
        }
        assert_eq!(zoom.level(), MIN_ZOOM);

        zoom.zoom_in();
        assert!(zoom.reset());
        assert_eq!(zoom.level(), 1.0);

        fs::remove_file(&path).expect("config file should be removed");
    }
}
