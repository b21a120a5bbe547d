use std::collections::HashSet;
use std::sync::Arc;
use std::time::Instant;

use tokio::sync::mpsc::{UnboundedReceiver, UnboundedSender, unbounded_channel};
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use crate::document::{DocumentRenderer, fit_scale, open_document_bytes};
use crate::error::{AppError, AppResult};
use crate::source::{PageSource, is_remote_locator};

use super::frame::{PageKey, RgbaFrame};
use super::image_ops::decode_page_image;

#[derive(Debug)]
pub enum LoaderEvent {
    PageReady {
        key: PageKey,
        frame: RgbaFrame,
        /// Natural size of the page before downscaling.
        natural: (u32, u32),
    },
    PageFailed {
        key: PageKey,
        message: String,
    },
    DocumentOpened {
        generation: u64,
        page_count: usize,
        first_page: Option<(f32, f32)>,
    },
    DocumentFailed {
        generation: u64,
        message: String,
    },
}

impl LoaderEvent {
    fn generation(&self) -> u64 {
        match self {
            Self::PageReady { key, .. } | Self::PageFailed { key, .. } => key.generation,
            Self::DocumentOpened { generation, .. } | Self::DocumentFailed { generation, .. } => {
                *generation
            }
        }
    }
}

/// Loads pages for the active source list off the event loop. Image pages are
/// fetched and decoded on blocking tasks; document pages are rasterized by a
/// single worker that owns the parsed document.
pub struct PageLoader {
    client: reqwest::Client,
    max_size: (u32, u32),
    generation: u64,
    event_tx: UnboundedSender<LoaderEvent>,
    event_rx: UnboundedReceiver<LoaderEvent>,
    document_tx: Option<UnboundedSender<PageKey>>,
    in_flight: HashSet<PageKey>,
    tasks: Vec<JoinHandle<()>>,
}

impl PageLoader {
    pub fn new(max_size: (u32, u32)) -> Self {
        let (event_tx, event_rx) = unbounded_channel();
        Self {
            client: reqwest::Client::new(),
            max_size: (max_size.0.max(1), max_size.1.max(1)),
            generation: 0,
            event_tx,
            event_rx,
            document_tx: None,
            in_flight: HashSet::new(),
            tasks: Vec::new(),
        }
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn max_size(&self) -> (u32, u32) {
        self.max_size
    }

    /// Switches to a new source list. Work for earlier generations is
    /// abandoned and its late results are discarded.
    pub fn open(&mut self, generation: u64, source: &PageSource) {
        self.generation = generation;
        self.in_flight.clear();
        self.document_tx = None;
        for task in self.tasks.drain(..) {
            task.abort();
        }

        if let PageSource::Document(locator) = source {
            let (request_tx, request_rx) = unbounded_channel();
            self.document_tx = Some(request_tx);
            let task = tokio::spawn(open_document_task(
                self.client.clone(),
                locator.clone(),
                generation,
                self.max_size,
                request_rx,
                self.event_tx.clone(),
            ));
            self.tasks.push(task);
        }
    }

    /// Queues one page. Returns false when the key is stale or already queued.
    pub fn request(&mut self, key: PageKey, locator: &str) -> bool {
        if key.generation != self.generation || self.in_flight.contains(&key) {
            return false;
        }

        if let Some(document_tx) = &self.document_tx {
            if document_tx.send(key).is_err() {
                return false;
            }
        } else {
            self.tasks.retain(|task| !task.is_finished());
            let task = tokio::spawn(load_image_task(
                self.client.clone(),
                key,
                locator.to_string(),
                self.max_size,
                self.event_tx.clone(),
            ));
            self.tasks.push(task);
        }

        self.in_flight.insert(key);
        true
    }

    pub fn is_in_flight(&self, key: &PageKey) -> bool {
        self.in_flight.contains(key)
    }

    pub fn in_flight_len(&self) -> usize {
        self.in_flight.len()
    }

    pub async fn recv(&mut self) -> Option<LoaderEvent> {
        while let Some(event) = self.event_rx.recv().await {
            if let Some(event) = self.accept(event) {
                return Some(event);
            }
        }
        None
    }

    fn accept(&mut self, event: LoaderEvent) -> Option<LoaderEvent> {
        if let LoaderEvent::PageReady { key, .. } | LoaderEvent::PageFailed { key, .. } = &event {
            self.in_flight.remove(key);
        }
        if event.generation() != self.generation {
            debug!(
                generation = event.generation(),
                active = self.generation,
                "dropping stale loader event"
            );
            return None;
        }
        Some(event)
    }
}

impl Drop for PageLoader {
    fn drop(&mut self) {
        for task in self.tasks.drain(..) {
            task.abort();
        }
    }
}

async fn fetch_bytes(client: &reqwest::Client, locator: &str) -> AppResult<Vec<u8>> {
    if is_remote_locator(locator) {
        let response = client
            .get(locator)
            .send()
            .await
            .map_err(|err| AppError::upstream(err, format!("GET {locator}")))?
            .error_for_status()
            .map_err(|err| AppError::upstream(err, format!("GET {locator}")))?;
        let bytes = response
            .bytes()
            .await
            .map_err(|err| AppError::upstream(err, format!("reading body of {locator}")))?;
        return Ok(bytes.to_vec());
    }

    let path = locator.to_string();
    tokio::task::spawn_blocking(move || {
        std::fs::read(&path)
            .map_err(|err| AppError::io_with_context(err, format!("failed to read {path}")))
    })
    .await
    .map_err(|_| AppError::unsupported("page read task was cancelled"))?
}

async fn load_image_task(
    client: reqwest::Client,
    key: PageKey,
    locator: String,
    max_size: (u32, u32),
    events: UnboundedSender<LoaderEvent>,
) {
    let started = Instant::now();
    let result = match fetch_bytes(&client, &locator).await {
        Ok(bytes) => tokio::task::spawn_blocking(move || {
            decode_page_image(key.page, &bytes, max_size)
        })
        .await
        .unwrap_or_else(|_| Err(AppError::unsupported("page decode task was cancelled"))),
        Err(err) => Err(err),
    };

    let event = match result {
        Ok((frame, natural)) => {
            debug!(
                page = key.page,
                elapsed_ms = started.elapsed().as_millis() as u64,
                "page image ready"
            );
            LoaderEvent::PageReady {
                key,
                frame,
                natural,
            }
        }
        Err(err) => {
            warn!(page = key.page, %locator, error = %err, "page image failed");
            LoaderEvent::PageFailed {
                key,
                message: err.to_string(),
            }
        }
    };
    let _ = events.send(event);
}

async fn open_document_task(
    client: reqwest::Client,
    locator: String,
    generation: u64,
    max_size: (u32, u32),
    requests: UnboundedReceiver<PageKey>,
    events: UnboundedSender<LoaderEvent>,
) {
    let bytes = match fetch_bytes(&client, &locator).await {
        Ok(bytes) => bytes,
        Err(err) => {
            warn!(%locator, error = %err, "document fetch failed");
            let _ = events.send(LoaderEvent::DocumentFailed {
                generation,
                message: err.to_string(),
            });
            return;
        }
    };

    let worker = tokio::task::spawn_blocking(move || {
        document_worker_main(bytes, generation, max_size, requests, events)
    });
    let _ = worker.await;
}

fn document_worker_main(
    bytes: Vec<u8>,
    generation: u64,
    max_size: (u32, u32),
    mut requests: UnboundedReceiver<PageKey>,
    events: UnboundedSender<LoaderEvent>,
) {
    let doc = match open_document_bytes(Arc::new(bytes)) {
        Ok(doc) => doc,
        Err(err) => {
            let _ = events.send(LoaderEvent::DocumentFailed {
                generation,
                message: err.to_string(),
            });
            return;
        }
    };

    let page_count = doc.page_count();
    let opened = LoaderEvent::DocumentOpened {
        generation,
        page_count,
        first_page: doc.page_dimensions(0).ok(),
    };
    if events.send(opened).is_err() {
        return;
    }

    while let Some(key) = requests.blocking_recv() {
        let event = match render_document_page(doc.as_ref(), key.page, max_size) {
            Ok((frame, natural)) => LoaderEvent::PageReady {
                key,
                frame,
                natural,
            },
            Err(err) => LoaderEvent::PageFailed {
                key,
                message: err.to_string(),
            },
        };
        if events.send(event).is_err() {
            break;
        }
    }
}

fn render_document_page(
    doc: &dyn DocumentRenderer,
    page: usize,
    max_size: (u32, u32),
) -> AppResult<(RgbaFrame, (u32, u32))> {
    let dimensions = doc.page_dimensions(page)?;
    let frame = doc
        .render_page(page, fit_scale(dimensions, max_size))
        .map_err(|err| AppError::document_render(page, err))?;
    let natural = (
        dimensions.0.round().max(1.0) as u32,
        dimensions.1.round().max(1.0) as u32,
    );
    Ok((frame, natural))
}
