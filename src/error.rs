pub type AppResult<T> = Result<T, AppError>;

#[derive(thiserror::Error, Debug)]
pub enum AppError {
    #[error("I/O error: {context}")]
    Io {
        #[source]
        source: std::io::Error,
        context: String,
    },
    #[error("failed to decode image for page {page}")]
    ImageDecode {
        page: usize,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
    #[error("document render failed for page {page}")]
    DocumentRender {
        page: usize,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
    #[error("upstream request failed: {context}")]
    Upstream {
        context: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("server error: {0}")]
    Server(String),
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
    #[error("unsupported: {0}")]
    Unsupported(String),
}

impl From<std::io::Error> for AppError {
    fn from(source: std::io::Error) -> Self {
        Self::Io {
            source,
            context: "I/O operation failed".to_string(),
        }
    }
}

impl AppError {
    pub fn io_with_context(source: std::io::Error, context: impl Into<String>) -> Self {
        Self::Io {
            source,
            context: context.into(),
        }
    }

    pub fn invalid_argument(message: impl Into<String>) -> Self {
        Self::InvalidArgument(message.into())
    }

    pub fn image_decode(
        page: usize,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self::ImageDecode {
            page,
            source: Box::new(source),
        }
    }

    pub fn document_render(
        page: usize,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self::DocumentRender {
            page,
            source: Box::new(source),
        }
    }

    pub fn upstream(source: reqwest::Error, context: impl Into<String>) -> Self {
        Self::Upstream {
            context: context.into(),
            source,
        }
    }

    pub fn server(message: impl Into<String>) -> Self {
        Self::Server(message.into())
    }

    pub fn unsupported(message: impl Into<String>) -> Self {
        Self::Unsupported(message.into())
    }
}
