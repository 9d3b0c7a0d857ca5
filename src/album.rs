use serde::Serialize;

use crate::content::{Album, ContentStore};
use crate::error::GalleryError;
use crate::i18n::{Lang, format_date, resolve, resolve_opt};

#[derive(Serialize, Clone, Copy, Debug, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum MediaKind {
    Image,
    Video,
}

/// One navigable unit of the lightbox, with its caption already localized.
#[derive(Serialize, Clone, Debug, PartialEq)]
pub struct MediaItem {
    pub kind: MediaKind,
    pub src: String,
    pub caption: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration: Option<String>,
}

impl MediaItem {
    pub fn image(src: &str, caption: &str) -> Self {
        Self {
            kind: MediaKind::Image,
            src: src.to_string(),
            caption: caption.to_string(),
            duration: None,
        }
    }

    pub fn is_video(&self) -> bool {
        self.kind == MediaKind::Video
    }
}

/// Lightbox order of an album: featured image, then images, then videos.
pub fn media_sequence(album: &Album, lang: Lang) -> Vec<MediaItem> {
    let mut items = Vec::with_capacity(1 + album.images.len() + album.videos.len());
    items.push(MediaItem::image(
        &album.featured_image,
        resolve(&album.title, lang),
    ));
    for image in &album.images {
        items.push(MediaItem {
            kind: MediaKind::Image,
            src: image.src.clone(),
            caption: resolve_opt(image.caption.as_ref(), lang),
            duration: None,
        });
    }
    for video in &album.videos {
        items.push(MediaItem {
            kind: MediaKind::Video,
            src: video.src.clone(),
            caption: resolve_opt(video.caption.as_ref(), lang),
            duration: video.duration.clone(),
        });
    }
    items
}

/// A cell of the album media grid; `index` is the item's position in the lightbox sequence.
#[derive(Clone, Debug, PartialEq)]
pub struct GridTile {
    pub index: usize,
    pub kind: MediaKind,
    pub thumbnail: String,
    pub alt: String,
    pub duration: Option<String>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct AlbumHeader {
    pub title: String,
    pub date: String,
    pub category: String,
    pub description: String,
    pub photo_count: usize,
    /// `None` when the album has no videos, so the count is not shown at all.
    pub video_count: Option<usize>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct AlbumDetail {
    pub album_id: String,
    pub featured_image: String,
    pub header: AlbumHeader,
    pub media: Vec<MediaItem>,
    pub tiles: Vec<GridTile>,
}

impl AlbumDetail {
    /// Build the detail model of `album_id`, or `NotFound` if the store has no such album.
    pub fn open(store: &ContentStore, album_id: &str, lang: Lang) -> Result<Self, GalleryError> {
        let album = store
            .album(album_id)
            .ok_or_else(|| GalleryError::album_not_found(album_id))?;
        Ok(Self::build(store, album, lang))
    }

    pub fn build(store: &ContentStore, album: &Album, lang: Lang) -> Self {
        let header = AlbumHeader {
            title: resolve(&album.title, lang).to_string(),
            date: format_date(&album.date, lang),
            category: store.category_name(&album.category, lang).to_string(),
            description: resolve(&album.description, lang).to_string(),
            photo_count: album.images.len(),
            video_count: (!album.videos.is_empty()).then_some(album.videos.len()),
        };

        let mut tiles = Vec::with_capacity(album.images.len() + album.videos.len());
        for (i, image) in album.images.iter().enumerate() {
            tiles.push(GridTile {
                index: i + 1,
                kind: MediaKind::Image,
                thumbnail: image.thumbnail.clone().unwrap_or_else(|| image.src.clone()),
                alt: resolve_opt(image.caption.as_ref(), lang),
                duration: None,
            });
        }
        let offset = album.images.len() + 1;
        for (i, video) in album.videos.iter().enumerate() {
            tiles.push(GridTile {
                index: offset + i,
                kind: MediaKind::Video,
                thumbnail: video.thumbnail.clone(),
                alt: resolve_opt(video.caption.as_ref(), lang),
                duration: video.duration.clone(),
            });
        }

        Self {
            album_id: album.id.clone(),
            featured_image: album.featured_image.clone(),
            header,
            media: media_sequence(album, lang),
            tiles,
        }
    }
}
