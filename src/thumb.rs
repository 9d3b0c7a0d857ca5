use anyhow::{Context, Result};
use indicatif::ProgressBar;
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};

use crate::content::ContentStore;

/// Directory, relative to a site or output root, holding generated thumbnails.
pub const THUMB_DIR: &str = "thumbs";

/// Bounding box (in pixels) of generated thumbnails.
const THUMB_MAX_SIZE: u32 = 400;

/// JPEG quality for thumbnails (0–100).
const THUMB_QUALITY: u8 = 80;

/// Extensions that the `image` crate can decode with the enabled features.
const SUPPORTED_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "tiff", "tif"];

/// Relative path of the thumbnail for a media path. Always ends in `.jpg`.
/// E.g. `thumb_rel("assets/a.png")` → `thumbs/assets/a.jpg`
pub fn thumb_rel(rel: &str) -> String {
    let mut p = PathBuf::from(THUMB_DIR).join(rel);
    p.set_extension("jpg");
    p.to_string_lossy().replace('\\', "/")
}

pub fn thumb_cache_path(cache_root: &Path, rel: &str) -> PathBuf {
    cache_root.join(thumb_rel(rel))
}

/// Return `true` if the cached thumbnail is still fresh (newer than the source).
pub fn thumb_is_fresh(source: &Path, cached: &Path) -> bool {
    let Ok(src_meta) = source.metadata() else {
        return false;
    };
    let Ok(cache_meta) = cached.metadata() else {
        return false;
    };
    let Ok(src_mtime) = src_meta.modified() else {
        return false;
    };
    let Ok(cache_mtime) = cache_meta.modified() else {
        return false;
    };
    cache_mtime >= src_mtime
}

pub fn can_generate_thumb(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|ext| SUPPORTED_EXTENSIONS.contains(&ext.to_lowercase().as_str()))
}

/// Generate a JPEG thumbnail from `source` and write it to `dest`.
pub fn generate_thumb(source: &Path, dest: &Path) -> Result<()> {
    let img = image::open(source)
        .with_context(|| format!("Cannot open image: {}", source.display()))?;

    let thumb = img.thumbnail(THUMB_MAX_SIZE, THUMB_MAX_SIZE);

    if let Some(parent) = dest.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Cannot create thumb dir: {}", parent.display()))?;
    }

    let mut out = std::fs::File::create(dest)
        .with_context(|| format!("Cannot create thumb file: {}", dest.display()))?;

    let encoder = image::codecs::jpeg::JpegEncoder::new_with_quality(&mut out, THUMB_QUALITY);
    thumb
        .write_with_encoder(encoder)
        .context("Failed to encode thumbnail")?;

    Ok(())
}

/// Return the path to a cached (or freshly generated) thumbnail.
/// Returns `None` if the format is not supported for thumbnail generation.
pub fn get_or_create_thumb(source_root: &Path, cache_root: &Path, rel: &str) -> Result<Option<PathBuf>> {
    let source = source_root.join(rel);
    if !can_generate_thumb(&source) {
        return Ok(None);
    }

    let cached = thumb_cache_path(cache_root, rel);
    if thumb_is_fresh(&source, &cached) {
        return Ok(Some(cached));
    }

    generate_thumb(&source, &cached)?;
    tracing::debug!(rel, "thumbnail generated");
    Ok(Some(cached))
}

/// Media paths shown as grid thumbnails without an explicit thumbnail in the
/// content: every album cover, and images that name none.
pub fn thumbnail_sources(store: &ContentStore) -> Vec<String> {
    let mut rels = BTreeSet::new();
    for album in store.albums() {
        rels.insert(album.featured_image.clone());
        for image in album.images.iter().filter(|i| i.thumbnail.is_none()) {
            rels.insert(image.src.clone());
        }
    }
    rels.into_iter()
        .filter(|rel| can_generate_thumb(Path::new(rel)))
        .collect()
}

/// Spawn a background thread that pre-generates thumbnails under the site root.
pub fn spawn_prewarm(root: PathBuf, rels: Vec<String>) {
    std::thread::spawn(move || {
        let generated = prewarm_thumbnails(&root, &root, &rels, None);
        tracing::info!(generated, "thumbnail prewarm finished");
    });
}

/// Pre-generate thumbnails in parallel using scoped threads. Sources that are
/// missing or fail to decode are logged and skipped. Returns how many were written.
pub fn prewarm_thumbnails(
    source_root: &Path,
    cache_root: &Path,
    rels: &[String],
    progress: Option<&ProgressBar>,
) -> usize {
    let to_generate: Vec<&String> = rels
        .iter()
        .filter(|rel| {
            let source = source_root.join(rel.as_str());
            if !can_generate_thumb(&source) || !source.is_file() {
                return false;
            }
            let cached = thumb_cache_path(cache_root, rel);
            !thumb_is_fresh(&source, &cached)
        })
        .collect();

    if let Some(pb) = progress {
        pb.set_length(to_generate.len() as u64);
    }
    if to_generate.is_empty() {
        return 0;
    }

    let n_workers = std::thread::available_parallelism()
        .map(|n| n.get().min(8))
        .unwrap_or(4);

    let chunks: Vec<&[&String]> = to_generate
        .chunks(to_generate.len().div_ceil(n_workers))
        .collect();

    let generated = AtomicUsize::new(0);
    std::thread::scope(|s| {
        for chunk in chunks {
            let generated = &generated;
            s.spawn(move || {
                for rel in chunk {
                    match get_or_create_thumb(source_root, cache_root, rel) {
                        Ok(Some(_)) => {
                            generated.fetch_add(1, Ordering::Relaxed);
                        }
                        Ok(None) => {}
                        Err(e) => tracing::warn!(rel = rel.as_str(), error = %e, "thumbnail failed"),
                    }
                    if let Some(pb) = progress {
                        pb.inc(1);
                    }
                }
            });
        }
    });
    generated.into_inner()
}
