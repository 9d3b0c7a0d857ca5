use anyhow::{Context, Result};
use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use std::cell::RefCell;
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use std::rc::Rc;

use crate::config::SiteConfig;
use crate::content::{AchievementsStore, ContentStore};
use crate::controller::{AchievementsController, GalleryController, follow_language};
use crate::filter::{self, CategoryFilter, FilterSelection, YearFilter};
use crate::i18n::{Lang, resolve};
use crate::language::LanguageState;
use crate::render::{self, LinkStyle, Page, PageContext};
use crate::serve::safe_path;
use crate::thumb;

#[derive(Debug, Default, PartialEq, Eq)]
pub struct BuildReport {
    pub pages: usize,
    pub thumbnails: usize,
    pub media_copied: usize,
}

/// Every filter combination the grid can show: "all" plus each category,
/// crossed with "all" plus each year.
pub fn filter_combinations(store: &ContentStore) -> Vec<FilterSelection> {
    let mut categories = vec![CategoryFilter::All];
    categories.extend(
        store
            .categories()
            .iter()
            .map(|c| CategoryFilter::Only(c.id.clone())),
    );
    let mut years = vec![YearFilter::All];
    years.extend(store.years().iter().map(|&y| YearFilter::Only(y)));

    let mut combos = Vec::with_capacity(categories.len() * years.len());
    for category in &categories {
        for &year in &years {
            combos.push(FilterSelection {
                category: category.clone(),
                year,
            });
        }
    }
    combos
}

fn write_page(dir: &Path, name: &str, html: &str) -> Result<()> {
    let path = dir.join(name);
    std::fs::write(&path, html).with_context(|| format!("Cannot write {}", path.display()))
}

/// Paths of every media file the pages reference, relative to the site root.
pub(crate) fn referenced_media(store: &ContentStore, achievements: &AchievementsStore, placeholder: &str) -> BTreeSet<String> {
    let mut rels = BTreeSet::new();
    for album in store.albums() {
        rels.insert(album.featured_image.clone());
        for image in &album.images {
            rels.insert(image.src.clone());
            if let Some(t) = &image.thumbnail {
                rels.insert(t.clone());
            }
        }
        for video in &album.videos {
            rels.insert(video.src.clone());
            rels.insert(video.thumbnail.clone());
        }
    }
    for entry in achievements.entries() {
        rels.insert(entry.image.clone());
    }
    if !placeholder.is_empty() {
        rels.insert(placeholder.to_string());
    }
    rels.retain(|r| !r.is_empty());
    rels
}

/// Copy media next to the pages when the output is not the site root itself.
/// Missing sources are reported and skipped; up-to-date copies are left alone.
fn copy_media(root: &Path, out: &Path, rels: &BTreeSet<String>) -> Result<usize> {
    let pb = ProgressBar::new(rels.len() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("  {bar:40.green/dark_gray} {pos}/{len}  {msg}")
            .context("Invalid progress template")?
            .progress_chars("━╸─"),
    );
    pb.set_message("media");

    let mut copied = 0usize;
    for rel in rels {
        pb.inc(1);
        let Some(src) = safe_path(root, rel) else {
            tracing::warn!(rel = rel.as_str(), "media path escapes the site root, skipped");
            continue;
        };
        if !src.is_file() {
            pb.suspend(|| {
                eprintln!("  {} missing media: {}", style("!").yellow().bold(), rel);
            });
            continue;
        }
        let dest = out.join(rel);
        if thumb::thumb_is_fresh(&src, &dest) {
            continue;
        }
        if let Some(parent) = dest.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Cannot create {}", parent.display()))?;
        }
        std::fs::copy(&src, &dest).with_context(|| format!("Cannot copy {rel}"))?;
        copied += 1;
    }
    pb.finish_and_clear();
    Ok(copied)
}

/// Write every page for both languages into `out`.
pub fn build_site(config: &SiteConfig, out: &Path, thumbs: bool) -> Result<BuildReport> {
    let gallery = GalleryController::from_load(
        ContentStore::load(&config.gallery_path),
        config.default_lang,
    );
    let achievements = AchievementsController::from_load(
        AchievementsStore::load(&config.achievements_path),
        config.default_lang,
    );

    let combos = filter_combinations(gallery.store());
    let rels = referenced_media(
        gallery.store(),
        achievements.store(),
        &config.placeholder_image,
    );
    let thumb_sources = if thumbs {
        thumb::thumbnail_sources(gallery.store())
    } else {
        Vec::new()
    };

    let gallery = Rc::new(RefCell::new(gallery));
    let achievements = Rc::new(RefCell::new(achievements));
    let mut language = LanguageState::new(config.default_lang);
    follow_language(&mut language, &gallery);
    follow_language(&mut language, &achievements);

    let ctx = PageContext {
        links: LinkStyle::Static { thumbs },
        site_name: &config.site_name,
        placeholder: &config.placeholder_image,
    };

    let mut report = BuildReport::default();
    for lang in [config.default_lang, config.default_lang.other()] {
        // Controllers re-localize through their subscriptions.
        language.set_language(lang)?;
        let dir = out.join(lang.code());
        std::fs::create_dir_all(&dir)
            .with_context(|| format!("Cannot create {}", dir.display()))?;

        report.pages += write_gallery_pages(&mut gallery.borrow_mut(), &ctx, &dir, &combos)?;
        report.pages += write_achievement_pages(&mut achievements.borrow_mut(), &ctx, &dir)?;
        tracing::debug!(lang = lang.code(), pages = report.pages, "language written");
    }

    write_page(
        out,
        "index.html",
        &render::render_redirect(&format!("{}/gallery.html", config.default_lang.code())),
    )?;

    if !thumb_sources.is_empty() {
        let pb = ProgressBar::new(0);
        pb.set_style(
            ProgressStyle::default_bar()
                .template("  {bar:40.cyan/dark_gray} {pos}/{len}  {msg}")
                .context("Invalid progress template")?
                .progress_chars("━╸─"),
        );
        pb.set_message("thumbnails");
        report.thumbnails = thumb::prewarm_thumbnails(&config.root, out, &thumb_sources, Some(&pb));
        pb.finish_and_clear();
    }

    let same_tree = match (out.canonicalize(), config.root.canonicalize()) {
        (Ok(a), Ok(b)) => a == b,
        _ => false,
    };
    if !same_tree {
        report.media_copied = copy_media(&config.root, out, &rels)?;
    }

    Ok(report)
}

fn write_gallery_pages(
    ctrl: &mut GalleryController,
    ctx: &PageContext<'_>,
    dir: &Path,
    combos: &[FilterSelection],
) -> Result<usize> {
    let mut pages = 0;
    for selection in combos {
        ctrl.close_album();
        ctrl.set_selection(selection.clone());
        write_page(
            dir,
            &render::static_file_name(Page::Gallery, selection),
            &render::render_gallery(ctrl, ctx),
        )?;
        pages += 1;

        // Album pages per grid that lists them, so closing one returns to that grid.
        let ids: Vec<String> = ctrl.visible_albums().iter().map(|a| a.id.clone()).collect();
        for id in &ids {
            ctrl.open_album(id)?;
            for i in 0..ctrl.lightbox().len() {
                ctrl.open_media(i);
                write_page(
                    dir,
                    &render::static_file_name(Page::Media(id, i), selection),
                    &render::render_gallery(ctrl, ctx),
                )?;
                pages += 1;
            }
            ctrl.close_media();
            write_page(
                dir,
                &render::static_file_name(Page::Album(id), selection),
                &render::render_gallery(ctrl, ctx),
            )?;
            pages += 1;
            ctrl.close_album();
        }
    }
    ctrl.reset_filters();
    Ok(pages)
}

fn write_achievement_pages(
    ctrl: &mut AchievementsController,
    ctx: &PageContext<'_>,
    dir: &Path,
) -> Result<usize> {
    let all = FilterSelection::default();
    ctrl.lightbox_mut().close();
    write_page(
        dir,
        &render::static_file_name(Page::Achievements, &all),
        &render::render_achievements(ctrl, ctx),
    )?;
    let mut pages = 1;
    for i in 0..ctrl.lightbox().len() {
        ctrl.lightbox_mut().open(i);
        write_page(
            dir,
            &render::static_file_name(Page::Achievement(i), &all),
            &render::render_achievements(ctrl, ctx),
        )?;
        pages += 1;
    }
    ctrl.lightbox_mut().close();
    Ok(pages)
}

pub fn run_build(config: &SiteConfig, out: Option<PathBuf>, thumbs: bool) -> Result<()> {
    let out = out.unwrap_or_else(|| config.root.clone());
    std::fs::create_dir_all(&out)
        .with_context(|| format!("Cannot create output dir: {}", out.display()))?;

    println!(
        "\n{}  {}\n",
        style("club-site").bold().cyan(),
        style("build").dim(),
    );
    println!(
        "  {}  {}",
        style("Site").dim(),
        style(config.root.display()).white().bold()
    );
    println!(
        "  {}  {}\n",
        style("Output").dim(),
        style(out.display()).white().bold()
    );

    let report = build_site(config, &out, thumbs)?;

    println!("  {} Done!", style("✔").green().bold());
    println!(
        "  {}  {}  {}  {} {}  {}  {} {}",
        style("Pages").dim(),
        style(report.pages).green().bold(),
        style("·").dim(),
        style("Thumbnails").dim(),
        style(report.thumbnails).cyan().bold(),
        style("·").dim(),
        style("Media copied").dim(),
        style(report.media_copied).yellow().bold(),
    );
    println!(
        "  {}  {}",
        style("Open").dim(),
        style(out.join("index.html").display()).cyan()
    );
    Ok(())
}

/// Print the albums of the grid under a filter, one per line.
pub fn run_albums(config: &SiteConfig, selection: &FilterSelection, lang: Lang) -> Result<()> {
    let store = ContentStore::load(&config.gallery_path)?;
    let albums = filter::apply(store.albums(), selection);

    println!("\n  {}\n", style(filter::results_count(albums.len(), lang)).bold());
    for album in albums {
        let videos = if album.videos.is_empty() {
            String::new()
        } else {
            format!(" + {} video", album.videos.len())
        };
        println!(
            "  {}  {}  {}  {}  {}",
            style(album.year).yellow(),
            style(&album.id).cyan().bold(),
            style(store.category_name(&album.category, lang)).dim(),
            resolve(&album.title, lang),
            style(format!("({} img{videos})", album.images.len())).dim(),
        );
    }
    println!();
    Ok(())
}
