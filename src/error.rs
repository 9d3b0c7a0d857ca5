use std::path::PathBuf;

/// Errors raised while loading or navigating the site content.
#[derive(Debug, thiserror::Error)]
pub enum GalleryError {
    #[error("failed to read content file {}: {source}", path.display())]
    ContentLoad {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid content file {}: {source}", path.display())]
    ContentParse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("{kind} not found: {id}")]
    NotFound { kind: &'static str, id: String },
}

impl GalleryError {
    pub fn album_not_found(id: &str) -> Self {
        GalleryError::NotFound {
            kind: "album",
            id: id.to_string(),
        }
    }
}
