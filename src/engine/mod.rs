use std::time::Duration;

mod book;
mod traits;

#[cfg(test)]
pub(crate) mod testing;

pub use book::PageBook;
pub use traits::{FlipEngine, FlipEvent};

/// Builds an engine for a given page count when the viewer mounts one.
pub type EngineFactory = Box<dyn Fn(usize) -> Box<dyn FlipEngine> + Send>;

pub fn page_book_factory(flipping_time: Duration) -> EngineFactory {
    Box::new(move |page_count| Box::new(PageBook::new(page_count, flipping_time)))
}
