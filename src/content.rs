use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;

use crate::error::GalleryError;
use crate::i18n::{Lang, Text, resolve};

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct Category {
    pub id: String,
    pub name: Text,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct AlbumImage {
    pub src: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thumbnail: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub caption: Option<Text>,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct AlbumVideo {
    pub src: String,
    pub thumbnail: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub caption: Option<Text>,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Album {
    pub id: String,
    pub category: String,
    pub year: i32,
    pub title: Text,
    #[serde(default)]
    pub description: Text,
    #[serde(default)]
    pub date: String,
    pub featured_image: String,
    #[serde(default)]
    pub images: Vec<AlbumImage>,
    #[serde(default)]
    pub videos: Vec<AlbumVideo>,
}

#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
pub struct GalleryDocument {
    #[serde(default)]
    pub categories: Vec<Category>,
    #[serde(default)]
    pub years: Vec<i32>,
    #[serde(default)]
    pub albums: Vec<Album>,
}

/// Read-only snapshot of the gallery content.
#[derive(Debug, Clone, Default)]
pub struct ContentStore {
    doc: GalleryDocument,
}

fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T, GalleryError> {
    let data = std::fs::read_to_string(path).map_err(|source| GalleryError::ContentLoad {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_str(&data).map_err(|source| GalleryError::ContentParse {
        path: path.to_path_buf(),
        source,
    })
}

impl ContentStore {
    /// The state before anything was loaded.
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn load(path: &Path) -> Result<Self, GalleryError> {
        let doc: GalleryDocument = read_json(path)?;
        tracing::debug!(
            path = %path.display(),
            albums = doc.albums.len(),
            categories = doc.categories.len(),
            "gallery content loaded"
        );
        Ok(Self::from_document(doc))
    }

    /// Wrap a parsed document, deriving the year list when the document has none.
    pub fn from_document(mut doc: GalleryDocument) -> Self {
        if doc.years.is_empty() {
            let mut years: Vec<i32> = doc.albums.iter().map(|a| a.year).collect();
            years.sort_unstable_by(|a, b| b.cmp(a));
            years.dedup();
            doc.years = years;
        }
        Self { doc }
    }

    pub fn categories(&self) -> &[Category] {
        &self.doc.categories
    }

    pub fn years(&self) -> &[i32] {
        &self.doc.years
    }

    pub fn albums(&self) -> &[Album] {
        &self.doc.albums
    }

    pub fn is_empty(&self) -> bool {
        self.doc.albums.is_empty()
    }

    pub fn album(&self, id: &str) -> Option<&Album> {
        self.doc.albums.iter().find(|a| a.id == id)
    }

    pub fn category(&self, id: &str) -> Option<&Category> {
        self.doc.categories.iter().find(|c| c.id == id)
    }

    /// Localized category label; a dangling id gives an empty label.
    pub fn category_name(&self, id: &str, lang: Lang) -> &str {
        self.category(id).map(|c| resolve(&c.name, lang)).unwrap_or("")
    }
}

/// Achievement years show up both as numbers and as free text ("2019-20").
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(untagged)]
pub enum YearLabel {
    Number(i64),
    Text(String),
}

impl fmt::Display for YearLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            YearLabel::Number(n) => write!(f, "{n}"),
            YearLabel::Text(s) => f.write_str(s),
        }
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct Achievement {
    pub image: String,
    pub title: Text,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub year: Option<YearLabel>,
}

#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
pub struct AchievementsDocument {
    #[serde(default)]
    pub images: Vec<Achievement>,
}

/// Read-only snapshot of the achievements album.
#[derive(Debug, Clone, Default)]
pub struct AchievementsStore {
    doc: AchievementsDocument,
}

impl AchievementsStore {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn load(path: &Path) -> Result<Self, GalleryError> {
        let doc: AchievementsDocument = read_json(path)?;
        Ok(Self::from_document(doc))
    }

    pub fn from_document(doc: AchievementsDocument) -> Self {
        Self { doc }
    }

    pub fn entries(&self) -> &[Achievement] {
        &self.doc.images
    }
}

#[cfg(test)]
pub(crate) mod fixtures {
    use super::*;

    /// Two categories, three albums (2023, 2023, 2024); the first album has
    /// two images and one video.
    pub const GALLERY_JSON: &str = r#"{
        "categories": [
            {"id": "sports", "name": {"bn": "খেলাধুলা", "en": "Sports"}},
            {"id": "cultural", "name": {"bn": "সাংস্কৃতিক", "en": "Cultural"}}
        ],
        "years": [2024, 2023],
        "albums": [
            {
                "id": "football-2023",
                "category": "sports",
                "year": 2023,
                "title": {"bn": "ফুটবল টুর্নামেন্ট", "en": "Football Tournament"},
                "description": {"bn": "বার্ষিক টুর্নামেন্ট", "en": "Annual tournament"},
                "date": "2023-03-15",
                "featuredImage": "assets/images/gallery/football/cover.jpg",
                "images": [
                    {"src": "assets/images/gallery/football/1.jpg",
                     "thumbnail": "assets/images/gallery/football/1-thumb.jpg",
                     "caption": {"bn": "উদ্বোধন", "en": "Opening"}},
                    {"src": "assets/images/gallery/football/2.jpg",
                     "caption": {"bn": "ফাইনাল", "en": "Final"}}
                ],
                "videos": [
                    {"src": "assets/videos/football/highlights.mp4",
                     "thumbnail": "assets/videos/football/highlights.jpg",
                     "duration": "2:45",
                     "caption": {"bn": "হাইলাইটস", "en": "Highlights"}}
                ]
            },
            {
                "id": "durga-puja-2023",
                "category": "cultural",
                "year": 2023,
                "title": {"bn": "দুর্গাপূজা", "en": "Durga Puja"},
                "description": {"bn": "শারদোৎসব", "en": "Autumn festival"},
                "date": "2023-10-20",
                "featuredImage": "assets/images/gallery/durga/cover.jpg",
                "images": [
                    {"src": "assets/images/gallery/durga/1.jpg"}
                ]
            },
            {
                "id": "cricket-2024",
                "category": "sports",
                "year": 2024,
                "title": {"bn": "ক্রিকেট", "en": "Cricket"},
                "description": {"bn": "গ্রীষ্মকালীন ক্রিকেট", "en": "Summer cricket"},
                "date": "2024-05-02",
                "featuredImage": "assets/images/gallery/cricket/cover.jpg",
                "images": []
            }
        ]
    }"#;

    pub const ACHIEVEMENTS_JSON: &str = r#"{
        "images": [
            {"image": "assets/images/achievements/2019.jpg", "title": {"bn": "শ্রেষ্ঠ প্রতিমা", "en": "Best Idol"}, "year": 2019},
            {"image": "assets/images/achievements/2021.jpg", "title": {"bn": "শ্রেষ্ঠ মণ্ডপ", "en": "Best Pandal"}, "year": "2021-22"},
            {"image": "assets/images/achievements/2023.jpg", "title": {"bn": "শ্রেষ্ঠ আলোকসজ্জা", "en": "Best Lighting"}}
        ]
    }"#;

    pub fn store() -> ContentStore {
        ContentStore::from_document(serde_json::from_str(GALLERY_JSON).unwrap())
    }

    pub fn achievements() -> AchievementsStore {
        AchievementsStore::from_document(serde_json::from_str(ACHIEVEMENTS_JSON).unwrap())
    }
}
