pub mod cache;
pub mod frame;
pub mod image_ops;
pub mod loader;
pub mod prefetch;

pub use cache::{CacheCounters, PageCache};
pub use frame::{PageKey, RgbaFrame};
pub use image_ops::CropRect;
pub use loader::{LoaderEvent, PageLoader};
pub use prefetch::{PrefetchRequest, PrefetchWindow};
