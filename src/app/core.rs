use std::collections::HashSet;
use std::time::{Duration, Instant};

use tracing::{debug, info, warn};

use crate::config::Config;
use crate::engine::page_book_factory;
use crate::event::AppEvent;
use crate::render::{LoaderEvent, PageCache, PageKey, PageLoader, RgbaFrame};
use crate::source::PageSource;
use crate::viewer::{Viewer, ViewerInput, ViewerOutcome};
use crate::viewport::ViewportSize;

/// Largest frame the loader keeps per page. Zoomed views crop from it.
pub(crate) const PAGE_MAX_PX: (u32, u32) = (2048, 2048);

/// Terminal-independent half of the viewer application: the state machine,
/// the decoded page cache and the pages that failed to load.
pub struct App {
    pub(crate) config: Config,
    pub(crate) viewer: Viewer,
    pub(crate) cache: PageCache,
    pub(crate) initial_source: Option<PageSource>,
    pub(crate) source_label: String,
    pub(crate) failed_pages: HashSet<PageKey>,
}

impl App {
    pub fn new(
        config: Config,
        source: PageSource,
        source_label: impl Into<String>,
        touch_capable: bool,
    ) -> Self {
        let viewer = Viewer::new(
            &config,
            ViewportSize::new(0.0, 0.0),
            touch_capable,
            page_book_factory(Duration::from_millis(config.engine.flipping_time_ms)),
        );
        let cache = PageCache::new(
            config.prefetch.cache_entries,
            config.prefetch.cache_memory_bytes(),
        );

        Self {
            config,
            viewer,
            cache,
            initial_source: Some(source),
            source_label: source_label.into(),
            failed_pages: HashSet::new(),
        }
    }

    pub fn viewer(&self) -> &Viewer {
        &self.viewer
    }

    pub fn cache(&self) -> &PageCache {
        &self.cache
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn source_label(&self) -> &str {
        &self.source_label
    }

    /// Hands the source given at construction to the viewer. Later calls
    /// are no-ops.
    pub(crate) fn load_initial_source(&mut self, now: Instant) -> ViewerOutcome {
        match self.initial_source.take() {
            Some(source) => self.viewer.handle(ViewerInput::ReplaceSource(source), now),
            None => ViewerOutcome::default(),
        }
    }

    /// The current page when it still has to be fetched: not cached and
    /// not known to have failed.
    pub(crate) fn missing_current_page(&self) -> Option<(PageKey, String)> {
        if self.viewer.page_count() == 0 {
            return None;
        }
        let key = PageKey::new(self.viewer.generation(), self.viewer.current_page());
        if self.cache.contains(&key) || self.failed_pages.contains(&key) {
            return None;
        }
        let locator = self.viewer.locator(key.page)?;
        Some((key, locator.to_string()))
    }

    /// Feeds a loader result into the cache and the viewer.
    pub(crate) fn apply_loader_event(&mut self, event: LoaderEvent, now: Instant) -> ViewerOutcome {
        match event {
            LoaderEvent::PageReady {
                key,
                frame,
                natural,
            } => {
                debug!(
                    page = key.page,
                    width = frame.width,
                    height = frame.height,
                    "page ready"
                );
                self.cache.insert(key, frame);
                let mut outcome = self.viewer.handle(
                    ViewerInput::ImageSettled {
                        generation: key.generation,
                        page: key.page,
                        dimensions: Some(natural),
                    },
                    now,
                );
                if key.page == self.viewer.current_page() {
                    outcome.redraw = true;
                }
                outcome
            }
            LoaderEvent::PageFailed { key, message } => {
                warn!(page = key.page, error = %message, "page failed to load");
                self.failed_pages.insert(key);
                self.viewer.handle(
                    ViewerInput::ImageSettled {
                        generation: key.generation,
                        page: key.page,
                        dimensions: None,
                    },
                    now,
                )
            }
            LoaderEvent::DocumentOpened {
                generation,
                page_count,
                first_page,
            } => {
                info!(generation, page_count, "document opened");
                self.viewer.handle(
                    ViewerInput::DocumentLoaded {
                        generation,
                        page_count,
                        dimensions: first_page,
                    },
                    now,
                )
            }
            LoaderEvent::DocumentFailed {
                generation,
                message,
            } => self.viewer.handle(
                ViewerInput::DocumentFailed {
                    generation,
                    message,
                },
                now,
            ),
        }
    }

    /// Logs emitted events and, on a source switch, drops everything that
    /// belongs to earlier lists. Returns the new generation when the
    /// source was replaced.
    pub(crate) fn absorb_events(&mut self, events: &[AppEvent]) -> Option<u64> {
        let mut replaced = None;
        for event in events {
            match event {
                AppEvent::SourceReplaced {
                    generation,
                    page_count,
                } => {
                    info!(generation, ?page_count, "source list replaced");
                    self.cache.retain_generation(*generation);
                    self.failed_pages.clear();
                    replaced = Some(*generation);
                }
                AppEvent::PageChanged { from, to, reason } => {
                    debug!(from, to, ?reason, "page changed");
                }
                AppEvent::ZoomChanged { level } => debug!(level, "zoom changed"),
                AppEvent::AspectRatioLocked { ratio } => info!(ratio, "aspect ratio locked"),
                AppEvent::LoadingFinished { generation } => info!(generation, "loading finished"),
                AppEvent::LoadingFailed {
                    generation,
                    message,
                } => warn!(generation, error = %message, "loading failed"),
                AppEvent::HintShown => debug!("swipe hint shown"),
                AppEvent::HintHidden => debug!("swipe hint hidden"),
            }
        }
        replaced
    }

    pub(crate) fn cached_frame(&mut self, key: &PageKey) -> Option<&RgbaFrame> {
        self.cache.get(key)
    }

    pub(crate) fn new_loader(&self) -> PageLoader {
        PageLoader::new(PAGE_MAX_PX)
    }
}
