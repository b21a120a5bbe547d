use std::fs;
use std::path::Path;

use crate::error::{AppError, AppResult};

const PAGE_IMAGE_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "webp"];

/// Ordered page locators handed to the viewer at mount.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PageSource {
    /// One locator per page, front cover first.
    Images(Vec<String>),
    /// A single multi-page document.
    Document(String),
}

impl PageSource {
    /// Builds `base/1.ext` … `base/N.ext`.
    pub fn numbered_images(base: &str, count: usize, extension: &str) -> Self {
        let base = base.trim_end_matches('/');
        let pages = (1..=count)
            .map(|number| format!("{base}/{number}.{extension}"))
            .collect();
        Self::Images(pages)
    }

    pub fn locators(&self) -> &[String] {
        match self {
            Self::Images(pages) => pages,
            Self::Document(locator) => std::slice::from_ref(locator),
        }
    }

    pub fn is_empty(&self) -> bool {
        match self {
            Self::Images(pages) => pages.is_empty(),
            Self::Document(locator) => locator.is_empty(),
        }
    }

    pub fn is_document(&self) -> bool {
        matches!(self, Self::Document(_))
    }

    /// Page count known up front; documents report theirs after loading.
    pub fn known_page_count(&self) -> Option<usize> {
        match self {
            Self::Images(pages) => Some(pages.len()),
            Self::Document(_) => None,
        }
    }
}

pub fn is_remote_locator(locator: &str) -> bool {
    locator.starts_with("http://") || locator.starts_with("https://")
}

/// Resolves a command-line source: a directory of numbered page images, a PDF
/// file, or a remote PDF URL.
pub fn resolve_source(input: &str) -> AppResult<PageSource> {
    if input.trim().is_empty() {
        return Err(AppError::invalid_argument("source must not be empty"));
    }
    if is_remote_locator(input) {
        return Ok(PageSource::Document(input.to_string()));
    }

    let path = Path::new(input);
    if path.is_dir() {
        return scan_numbered_images(path);
    }
    if path.is_file() {
        let is_pdf = path
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext.eq_ignore_ascii_case("pdf"));
        if is_pdf {
            return Ok(PageSource::Document(input.to_string()));
        }
        return Err(AppError::unsupported(format!(
            "expected a PDF file or an image directory: {input}"
        )));
    }

    Err(AppError::io_with_context(
        std::io::Error::new(std::io::ErrorKind::NotFound, "missing source"),
        format!("source not found: {input}"),
    ))
}

fn scan_numbered_images(dir: &Path) -> AppResult<PageSource> {
    let entries = fs::read_dir(dir).map_err(|source| {
        AppError::io_with_context(source, format!("failed to list {}", dir.display()))
    })?;

    let mut numbered = Vec::new();
    for entry in entries {
        let path = entry?.path();
        if let Some(number) = page_number(&path) {
            numbered.push((number, path.to_string_lossy().into_owned()));
        }
    }

    if numbered.is_empty() {
        return Err(AppError::invalid_argument(format!(
            "no numbered page images (1.png, 2.png, ...) in {}",
            dir.display()
        )));
    }

    numbered.sort_by_key(|(number, _)| *number);
    Ok(PageSource::Images(
        numbered.into_iter().map(|(_, path)| path).collect(),
    ))
}

fn page_number(path: &Path) -> Option<u32> {
    let extension = path.extension()?.to_str()?.to_ascii_lowercase();
    if !PAGE_IMAGE_EXTENSIONS.contains(&extension.as_str()) {
        return None;
    }
    path.file_stem()?.to_str()?.parse::<u32>().ok()
}

#[cfg(test)]
mod tests {
    use std::fs;
    use std::path::PathBuf;
    use std::process;
    use std::time::{SystemTime, UNIX_EPOCH};

    use super::{PageSource, is_remote_locator, resolve_source};

    fn unique_temp_dir(suffix: &str) -> PathBuf {
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("clock should be after unix epoch")
            .as_nanos();
        let mut path = std::env::temp_dir();
        path.push(format!("flipbook_source_{suffix}_{}_{}", process::id(), nanos));
        path
    }

    #[test]
    fn numbered_images_follow_filename_convention() {
        let source = PageSource::numbered_images("/", 3, "png");
        assert_eq!(
            source.locators(),
            &["/1.png".to_string(), "/2.png".to_string(), "/3.png".to_string()]
        );
        assert_eq!(source.known_page_count(), Some(3));
        assert!(!source.is_document());
    }

    #[test]
    fn remote_urls_resolve_to_documents() {
        let source = resolve_source("https://example.com/album.pdf").expect("url should resolve");
        assert!(source.is_document());
        assert_eq!(source.known_page_count(), None);
        assert!(is_remote_locator("http://localhost/api/album"));
        assert!(!is_remote_locator("/12.png"));
    }

    #[test]
    fn directory_scan_orders_pages_numerically() {
        let dir = unique_temp_dir("pages");
        fs::create_dir_all(&dir).expect("dir should be created");
        for name in ["10.png", "2.png", "1.png", "cover.png", "notes.txt"] {
            fs::write(dir.join(name), b"x").expect("file should be written");
        }

        let source = resolve_source(dir.to_str().expect("utf-8 path")).expect("dir should resolve");
        let names: Vec<String> = source
            .locators()
            .iter()
            .map(|path| {
                PathBuf::from(path)
                    .file_name()
                    .expect("file name")
                    .to_string_lossy()
                    .into_owned()
            })
            .collect();
        assert_eq!(names, vec!["1.png", "2.png", "10.png"]);

        fs::remove_dir_all(&dir).expect("dir should be removed");
    }

    #[test]
    fn missing_source_and_empty_directory_are_errors() {
        assert!(resolve_source("").is_err());
        assert!(resolve_source("/definitely/not/here").is_err());

        let dir = unique_temp_dir("empty");
        fs::create_dir_all(&dir).expect("dir should be created");
        assert!(resolve_source(dir.to_str().expect("utf-8 path")).is_err());
        fs::remove_dir_all(&dir).expect("dir should be removed");
    }
}
