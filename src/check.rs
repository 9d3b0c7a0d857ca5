use anyhow::{Result, bail};
use chrono::NaiveDate;
use console::style;
use regex::Regex;
use std::collections::hash_map::Entry;
use std::collections::{BTreeSet, HashMap, HashSet};
use std::fmt;
use std::path::Path;
use walkdir::WalkDir;

use crate::config::SiteConfig;
use crate::content::{AchievementsStore, Album, ContentStore};
use crate::i18n::{Lang, Text, resolve};
use crate::render::slug;
use crate::site::referenced_media;

/// Files under `assets/` that count as media when looking for orphans.
const MEDIA_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "gif", "webp", "tiff", "tif", "svg", "mp4", "webm"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Severity {
    Warning,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Finding {
    pub severity: Severity,
    /// Where the problem is, e.g. `album football-2023`.
    pub location: String,
    pub message: String,
}

impl Finding {
    fn error(location: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Error,
            location: location.into(),
            message: message.into(),
        }
    }

    fn warning(location: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Warning,
            location: location.into(),
            message: message.into(),
        }
    }
}

impl fmt::Display for Finding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.location, self.message)
    }
}

fn blank(text: &Text) -> bool {
    resolve(text, Lang::Bn).trim().is_empty() && resolve(text, Lang::En).trim().is_empty()
}

/// Structural checks on the gallery document.
pub fn check_gallery(store: &ContentStore) -> Result<Vec<Finding>> {
    let id_re = Regex::new(r"^[A-Za-z0-9_-]+$")?;
    let date_re = Regex::new(r"^\d{4}-\d{2}-\d{2}")?;
    let duration_re = Regex::new(r"^\d{1,2}(:\d{2}){1,2}$")?;

    let mut findings = Vec::new();

    let mut category_ids = HashSet::new();
    let mut category_slugs = HashMap::new();
    for category in store.categories() {
        let location = format!("category {}", category.id);
        if !category_ids.insert(category.id.as_str()) {
            findings.push(Finding::error(&location, "duplicate category id"));
        } else if let Some(other) = slug_clash(&mut category_slugs, &category.id) {
            findings.push(Finding::error(
                &location,
                format!("static file names clash with category `{other}`"),
            ));
        }
        if blank(&category.name) {
            findings.push(Finding::error(&location, "category has no name"));
        }
    }

    let mut album_ids = HashSet::new();
    let mut album_slugs = HashMap::new();
    for album in store.albums() {
        let location = format!("album {}", album.id);
        if album.id.is_empty() {
            findings.push(Finding::error("album", "album without id"));
        } else if !album_ids.insert(album.id.as_str()) {
            findings.push(Finding::error(&location, "duplicate album id"));
        } else if let Some(other) = slug_clash(&mut album_slugs, &album.id) {
            findings.push(Finding::error(
                &location,
                format!("static file names clash with album `{other}`"),
            ));
        } else if !id_re.is_match(&album.id) {
            findings.push(Finding::warning(
                &location,
                "id contains characters outside [A-Za-z0-9_-]; static file names will be mangled",
            ));
        }
        if !category_ids.contains(album.category.as_str()) {
            findings.push(Finding::error(
                &location,
                format!("unknown category `{}`", album.category),
            ));
        }
        if !store.years().contains(&album.year) {
            findings.push(Finding::warning(
                &location,
                format!("year {} is missing from the year list", album.year),
            ));
        }
        if blank(&album.title) {
            findings.push(Finding::error(&location, "album has no title"));
        }
        findings.extend(check_date(&location, &album.date, &date_re));
        findings.extend(check_album_media(&location, album, &duration_re));
    }

    Ok(findings)
}

/// Record `id` under its file-name slug; returns the earlier id that already
/// maps to the same slug.
fn slug_clash<'a>(seen: &mut HashMap<String, &'a str>, id: &'a str) -> Option<&'a str> {
    match seen.entry(slug(id)) {
        Entry::Occupied(entry) => Some(*entry.get()),
        Entry::Vacant(entry) => {
            entry.insert(id);
            None
        }
    }
}

fn check_date(location: &str, date: &str, date_re: &Regex) -> Option<Finding> {
    if date.is_empty() {
        return Some(Finding::warning(location, "album has no date"));
    }
    let valid = date_re.is_match(date)
        && date
            .get(..10)
            .is_some_and(|day| NaiveDate::parse_from_str(day, "%Y-%m-%d").is_ok());
    (!valid).then(|| Finding::error(location, format!("invalid date `{date}` (expected YYYY-MM-DD)")))
}

fn check_album_media(location: &str, album: &Album, duration_re: &Regex) -> Vec<Finding> {
    let mut findings = Vec::new();
    if album.featured_image.is_empty() {
        findings.push(Finding::error(location, "album has no featured image"));
    }
    for (i, image) in album.images.iter().enumerate() {
        if image.src.is_empty() {
            findings.push(Finding::error(location, format!("image {i} has no source")));
        }
    }
    for (i, video) in album.videos.iter().enumerate() {
        if video.src.is_empty() {
            findings.push(Finding::error(location, format!("video {i} has no source")));
        }
        if video.thumbnail.is_empty() {
            findings.push(Finding::warning(location, format!("video {i} has no thumbnail")));
        }
        if let Some(duration) = &video.duration {
            if !duration_re.is_match(duration) {
                findings.push(Finding::warning(
                    location,
                    format!("video {i} duration `{duration}` is not m:ss or h:mm:ss"),
                ));
            }
        }
    }
    findings
}

pub fn check_achievements(store: &AchievementsStore) -> Vec<Finding> {
    let mut findings = Vec::new();
    for (i, entry) in store.entries().iter().enumerate() {
        let location = format!("achievement {i}");
        if entry.image.is_empty() {
            findings.push(Finding::error(&location, "achievement has no image"));
        }
        if blank(&entry.title) {
            findings.push(Finding::warning(&location, "achievement has no title"));
        }
    }
    findings
}

/// Referenced files that do not exist under the site root.
pub fn check_media_files(root: &Path, rels: &BTreeSet<String>) -> Vec<Finding> {
    rels.iter()
        .filter(|rel| !root.join(rel).is_file())
        .map(|rel| Finding::error(format!("media {rel}"), "file not found"))
        .collect()
}

/// Media files under `assets/` that no page references. Generated thumbnails
/// live outside `assets/` and are never reported.
pub fn unreferenced_media(root: &Path, rels: &BTreeSet<String>) -> Vec<String> {
    let assets = root.join("assets");
    if !assets.is_dir() {
        return Vec::new();
    }
    WalkDir::new(&assets)
        .sort_by_file_name()
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file())
        .filter(|e| {
            e.path()
                .extension()
                .map(|ext| ext.to_string_lossy().to_lowercase())
                .is_some_and(|ext| MEDIA_EXTENSIONS.contains(&ext.as_str()))
        })
        .filter_map(|e| {
            let rel = e.path().strip_prefix(root).ok()?;
            let rel = rel.to_string_lossy().replace('\\', "/");
            (!rels.contains(&rel)).then_some(rel)
        })
        .collect()
}

/// Every check over a site. A content file that cannot be loaded is itself
/// an error finding.
pub fn check_site(config: &SiteConfig) -> Result<Vec<Finding>> {
    let mut findings = Vec::new();

    let gallery = match ContentStore::load(&config.gallery_path) {
        Ok(store) => {
            findings.extend(check_gallery(&store)?);
            store
        }
        Err(e) => {
            findings.push(Finding::error("gallery", e.to_string()));
            ContentStore::empty()
        }
    };
    let achievements = match AchievementsStore::load(&config.achievements_path) {
        Ok(store) => {
            findings.extend(check_achievements(&store));
            store
        }
        Err(e) => {
            findings.push(Finding::error("achievements", e.to_string()));
            AchievementsStore::empty()
        }
    };

    let rels = referenced_media(&gallery, &achievements, &config.placeholder_image);
    findings.extend(check_media_files(&config.root, &rels));
    for rel in unreferenced_media(&config.root, &rels) {
        findings.push(Finding::warning(format!("media {rel}"), "not referenced by any page"));
    }

    findings.sort_by(|a, b| b.severity.cmp(&a.severity));
    Ok(findings)
}

pub fn run_check(config: &SiteConfig) -> Result<()> {
    let findings = check_site(config)?;
    let errors = findings.iter().filter(|f| f.severity == Severity::Error).count();
    let warnings = findings.len() - errors;

    for finding in &findings {
        let marker = match finding.severity {
            Severity::Error => style("✘").red().bold(),
            Severity::Warning => style("!").yellow().bold(),
        };
        println!("  {marker} {finding}");
    }
    tracing::debug!(errors, warnings, "content check finished");

    if errors > 0 {
        bail!("{errors} error(s), {warnings} warning(s)");
    }
    println!(
        "  {} content OK ({} warning(s))",
        style("✔").green().bold(),
        style(warnings).cyan()
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Overrides;
    use crate::content::{GalleryDocument, fixtures};
    use std::path::PathBuf;
    use std::sync::atomic::{AtomicU32, Ordering};

    static TEST_COUNTER: AtomicU32 = AtomicU32::new(0);

    fn tmpdir() -> PathBuf {
        let id = TEST_COUNTER.fetch_add(1, Ordering::SeqCst);
        let dir = std::env::temp_dir().join(format!(
            "club_site_check_test_{}_{id}",
            std::process::id()
        ));
        let _ = std::fs::remove_dir_all(&dir);
        std::fs::create_dir_all(&dir).unwrap();
        dir
    }

    fn store_from(json: &str) -> ContentStore {
        let doc: GalleryDocument = serde_json::from_str(json).unwrap();
        ContentStore::from_document(doc)
    }

    fn messages(findings: &[Finding]) -> Vec<String> {
        findings.iter().map(|f| f.to_string()).collect()
    }

    #[test]
    fn fixture_gallery_is_clean() {
        let findings = check_gallery(&fixtures::store()).unwrap();
        assert!(findings.is_empty(), "{:?}", messages(&findings));
    }

    #[test]
    fn detects_duplicates_and_dangling_category() {
        let store = store_from(
            r#"{
            "categories": [{"id": "sports", "name": "Sports"}, {"id": "sports", "name": "Again"}],
            "years": [2023],
            "albums": [
                {"id": "a", "category": "sports", "year": 2023, "title": "A", "date": "2023-01-01", "featuredImage": "a.jpg"},
                {"id": "a", "category": "music", "year": 2023, "title": "B", "date": "2023-01-01", "featuredImage": "b.jpg"}
            ]
        }"#,
        );
        let findings = check_gallery(&store).unwrap();
        let msgs = messages(&findings);
        assert!(msgs.contains(&"category sports: duplicate category id".to_string()));
        assert!(msgs.contains(&"album a: duplicate album id".to_string()));
        assert!(msgs.contains(&"album a: unknown category `music`".to_string()));
        assert!(findings.iter().all(|f| f.severity == Severity::Error));
    }

    #[test]
    fn detects_bad_dates_years_and_durations() {
        let store = store_from(
            r#"{
            "categories": [{"id": "c", "name": "C"}],
            "years": [2024],
            "albums": [{
                "id": "x", "category": "c", "year": 2023, "title": "X",
                "date": "2023-02-30", "featuredImage": "x.jpg",
                "videos": [{"src": "v.mp4", "thumbnail": "v.jpg", "duration": "two minutes"}]
            }]
        }"#,
        );
        let findings = check_gallery(&store).unwrap();
        let msgs = messages(&findings);
        assert!(msgs.iter().any(|m| m.contains("invalid date `2023-02-30`")));
        assert!(msgs.iter().any(|m| m.contains("year 2023 is missing")));
        assert!(msgs.iter().any(|m| m.contains("duration `two minutes`")));
    }

    #[test]
    fn accepts_long_durations_and_timestamps() {
        let re = Regex::new(r"^\d{1,2}(:\d{2}){1,2}$").unwrap();
        assert!(re.is_match("2:45"));
        assert!(re.is_match("1:02:45"));
        assert!(!re.is_match("245"));
        let date_re = Regex::new(r"^\d{4}-\d{2}-\d{2}").unwrap();
        assert!(check_date("album x", "2023-03-15T10:00:00", &date_re).is_none());
        assert_eq!(
            check_date("album x", "", &date_re).map(|f| f.severity),
            Some(Severity::Warning)
        );
    }

    #[test]
    fn flags_unsafe_ids_and_blank_titles() {
        let store = store_from(
            r#"{
            "categories": [{"id": "c", "name": "C"}],
            "albums": [{"id": "a b", "category": "c", "year": 2023, "title": {"bn": "", "en": " "},
                        "date": "2023-01-01", "featuredImage": "x.jpg"}]
        }"#,
        );
        let findings = check_gallery(&store).unwrap();
        assert!(findings.iter().any(|f| f.severity == Severity::Warning && f.message.contains("static file names")));
        assert!(findings.iter().any(|f| f.message == "album has no title"));
    }

    #[test]
    fn ids_that_share_a_file_name_are_errors() {
        let store = store_from(
            r#"{
            "categories": [{"id": "arts & crafts", "name": "A"}, {"id": "arts_&_crafts", "name": "B"}],
            "albums": [
                {"id": "a b", "category": "arts & crafts", "year": 2023, "title": "One",
                 "date": "2023-01-01", "featuredImage": "x.jpg"},
                {"id": "a_b", "category": "arts & crafts", "year": 2023, "title": "Two",
                 "date": "2023-01-01", "featuredImage": "y.jpg"}
            ]
        }"#,
        );
        let findings = check_gallery(&store).unwrap();
        let msgs = messages(&findings);
        assert!(msgs.contains(&"album a_b: static file names clash with album `a b`".to_string()), "{msgs:?}");
        assert!(
            msgs.contains(&"category arts_&_crafts: static file names clash with category `arts & crafts`".to_string()),
            "{msgs:?}"
        );
        let clashes = findings.iter().filter(|f| f.message.contains("clash")).count();
        assert_eq!(clashes, 2);
        assert!(findings.iter().filter(|f| f.message.contains("clash")).all(|f| f.severity == Severity::Error));
    }

    #[test]
    fn achievements_need_an_image() {
        let store = AchievementsStore::from_document(
            serde_json::from_str(r#"{"images": [{"image": "", "title": "T"}]}"#).unwrap(),
        );
        let findings = check_achievements(&store);
        assert_eq!(findings.len(), 1);
        assert_eq!(findings[0].location, "achievement 0");
        assert!(check_achievements(&fixtures::achievements()).is_empty());
    }

    #[test]
    fn unreferenced_media_skips_thumbs_and_non_media() {
        let tmp = tmpdir();
        std::fs::create_dir_all(tmp.join("assets/images")).unwrap();
        std::fs::create_dir_all(tmp.join("assets/css")).unwrap();
        std::fs::create_dir_all(tmp.join("thumbs/assets/images")).unwrap();
        std::fs::write(tmp.join("assets/images/used.jpg"), b"x").unwrap();
        std::fs::write(tmp.join("assets/images/orphan.PNG"), b"x").unwrap();
        std::fs::write(tmp.join("assets/css/site.css"), b"x").unwrap();
        std::fs::write(tmp.join("thumbs/assets/images/used.jpg.jpg"), b"x").unwrap();

        let rels: BTreeSet<String> = ["assets/images/used.jpg".to_string()].into();
        assert_eq!(unreferenced_media(&tmp, &rels), vec!["assets/images/orphan.PNG"]);
        assert!(unreferenced_media(&tmp.join("nowhere"), &rels).is_empty());
        let _ = std::fs::remove_dir_all(&tmp);
    }

    #[test]
    fn check_site_reports_missing_media_then_passes() {
        let tmp = tmpdir();
        std::fs::create_dir_all(tmp.join("data")).unwrap();
        std::fs::write(tmp.join("data/gallery.json"), fixtures::GALLERY_JSON).unwrap();
        std::fs::write(tmp.join("data/achievements.json"), fixtures::ACHIEVEMENTS_JSON).unwrap();
        let config = SiteConfig::resolve(&tmp, None, &Overrides::default());

        let findings = check_site(&config).unwrap();
        let missing = findings.iter().filter(|f| f.message == "file not found").count();
        let expected = referenced_media(&fixtures::store(), &fixtures::achievements(), &config.placeholder_image).len();
        assert_eq!(missing, expected);
        assert!(run_check(&config).is_err());

        for rel in referenced_media(&fixtures::store(), &fixtures::achievements(), &config.placeholder_image) {
            let path = tmp.join(&rel);
            std::fs::create_dir_all(path.parent().unwrap()).unwrap();
            std::fs::write(path, b"x").unwrap();
        }
        let findings = check_site(&config).unwrap();
        assert!(findings.iter().all(|f| f.severity == Severity::Warning), "{findings:?}");
        assert!(run_check(&config).is_ok());
        let _ = std::fs::remove_dir_all(&tmp);
    }

    #[test]
    fn unreadable_content_is_an_error_finding() {
        let tmp = tmpdir();
        let config = SiteConfig::resolve(&tmp, None, &Overrides::default());
        let findings = check_site(&config).unwrap();
        assert_eq!(findings[0].severity, Severity::Error);
        assert!(findings.iter().any(|f| f.location == "gallery"));
        assert!(findings.iter().any(|f| f.location == "achievements"));
        let _ = std::fs::remove_dir_all(&tmp);
    }
}
