use std::path::Path;

use crate::album::{AlbumDetail, GridTile, MediaItem, MediaKind};
use crate::content::Album;
use crate::controller::{AchievementsController, GalleryController, ViewMode};
use crate::filter::{self, CategoryFilter, FilterSelection, YearFilter};
use crate::i18n::{Labels, Lang, Text, format_date, resolve};
use crate::lightbox::{Lightbox, SWIPE_THRESHOLD};
use crate::thumb;

/// How pages link to each other and to media.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LinkStyle {
    /// Relative links inside a `build` output tree (`<out>/{lang}/*.html`).
    Static { thumbs: bool },
    /// Absolute routes of the HTTP server.
    Server,
}

/// A page of the site, independent of language and link style.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Page<'a> {
    Gallery,
    Album(&'a str),
    Media(&'a str, usize),
    Achievements,
    Achievement(usize),
}

/// Site-wide inputs every page needs.
#[derive(Clone, Copy, Debug)]
pub struct PageContext<'a> {
    pub links: LinkStyle,
    pub site_name: &'a Text,
    pub placeholder: &'a str,
}

/// Reduce an id to characters that are safe in a file name.
pub fn slug(id: &str) -> String {
    id.chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '-' || c == '_' {
                c
            } else {
                '_'
            }
        })
        .collect()
}

/// Percent-encode everything except RFC 3986 unreserved characters.
pub fn urlencode(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for b in s.bytes() {
        if b.is_ascii_alphanumeric() || matches!(b, b'-' | b'_' | b'.' | b'~') {
            out.push(b as char);
        } else {
            out.push_str(&format!("%{b:02X}"));
        }
    }
    out
}

/// Percent-encode each segment of a relative media path.
fn encode_path(rel: &str) -> String {
    rel.split('/').map(urlencode).collect::<Vec<_>>().join("/")
}

/// `.{category}-{year}` for a filtered selection. Slugs never contain `.`,
/// and the filter part always contains `-` while a media index never does,
/// so album, media and filter variants cannot share a file name.
fn filter_suffix(selection: &FilterSelection) -> String {
    if selection.is_all() {
        String::new()
    } else {
        format!(".{}-{}", slug(selection.category_param()), selection.year_param())
    }
}

/// File name of a page inside `<out>/{lang}/`. Album and media pages carry
/// the grid selection they were opened from, so "Back" returns to that grid.
pub fn static_file_name(page: Page<'_>, selection: &FilterSelection) -> String {
    match page {
        Page::Gallery if selection.is_all() => "gallery.html".to_string(),
        Page::Gallery => format!(
            "gallery-{}-{}.html",
            slug(selection.category_param()),
            selection.year_param()
        ),
        Page::Album(id) => format!("album.{}{}.html", slug(id), filter_suffix(selection)),
        Page::Media(id, i) => format!("album.{}{}.{i}.html", slug(id), filter_suffix(selection)),
        Page::Achievements => "achievements.html".to_string(),
        Page::Achievement(i) => format!("achievement-{i}.html"),
    }
}

/// Server route of a page. Gallery and album routes carry the filter
/// selection, so closing an album lands back on the same filtered grid.
pub fn server_path(lang: Lang, page: Page<'_>, selection: &FilterSelection) -> String {
    let base = match page {
        Page::Gallery => format!("/{lang}/gallery"),
        Page::Album(id) => format!("/{lang}/album/{}", urlencode(id)),
        Page::Media(id, i) => format!("/{lang}/album/{}/{i}", urlencode(id)),
        Page::Achievements => format!("/{lang}/achievements"),
        Page::Achievement(i) => format!("/{lang}/achievements/{i}"),
    };
    let carries_filter = matches!(page, Page::Gallery | Page::Album(_) | Page::Media(..));
    if carries_filter && !selection.is_all() {
        format!("{base}?{}", filter_query(selection))
    } else {
        base
    }
}

fn filter_query(selection: &FilterSelection) -> String {
    let mut parts = Vec::new();
    if let CategoryFilter::Only(id) = &selection.category {
        parts.push(format!("category={}", urlencode(id)));
    }
    if let YearFilter::Only(y) = selection.year {
        parts.push(format!("year={y}"));
    }
    parts.join("&")
}

impl LinkStyle {
    pub fn href(self, lang: Lang, page: Page<'_>, selection: &FilterSelection) -> String {
        match self {
            LinkStyle::Static { .. } => static_file_name(page, selection),
            LinkStyle::Server => server_path(lang, page, selection),
        }
    }

    /// The same page in the other language.
    pub fn switch_language(self, lang: Lang, page: Page<'_>, selection: &FilterSelection) -> String {
        let other = lang.other();
        match self {
            LinkStyle::Static { .. } => {
                format!("../{}/{}", other.code(), static_file_name(page, selection))
            }
            LinkStyle::Server => format!(
                "/lang/{}?next={}",
                other.code(),
                urlencode(&server_path(other, page, selection))
            ),
        }
    }

    pub fn asset(self, src: &str) -> String {
        match self {
            LinkStyle::Static { .. } => format!("../{}", encode_path(src)),
            LinkStyle::Server => format!("/{}", encode_path(src)),
        }
    }

    /// Small version of `src` for grids.
    pub fn thumbnail(self, src: &str) -> String {
        match self {
            LinkStyle::Static { thumbs: true } if thumb::can_generate_thumb(Path::new(src)) => {
                format!("../{}", encode_path(&thumb::thumb_rel(src)))
            }
            LinkStyle::Static { .. } => self.asset(src),
            LinkStyle::Server => format!("/thumb/{}", encode_path(src)),
        }
    }
}

pub fn escape_html(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

/// Escape for a single- or double-quoted JS string literal.
fn escape_js(s: &str) -> String {
    s.replace('\\', "\\\\")
        .replace('\'', "\\'")
        .replace('"', "\\\"")
        .replace('\n', "\\n")
}

/// Count with its unit, e.g. `5টি ছবি` or `5 Photos`.
fn count_label(n: usize, unit: &str, lang: Lang) -> String {
    match lang {
        Lang::Bn => format!("{n}{unit}"),
        Lang::En => format!("{n} {unit}"),
    }
}

const STYLE: &str = r#"
*{margin:0;padding:0;box-sizing:border-box}
body{background:#faf7f2;color:#2d2a26;font-family:"Noto Sans Bengali","Hind Siliguri",-apple-system,"Segoe UI",Roboto,sans-serif}
body.lightbox-open{overflow:hidden}
a{color:inherit;text-decoration:none}
header.site{position:sticky;top:0;z-index:100;background:rgba(255,255,255,.96);padding:1rem 2rem;display:flex;justify-content:space-between;align-items:center;border-bottom:1px solid #eadfce}
header.site h1{font-size:1.2rem;color:#b5432f}
header.site nav{display:flex;gap:1rem;align-items:center}
header.site nav a.active{color:#b5432f;font-weight:600}
.lang-toggle{border:1px solid #b5432f;border-radius:6px;padding:.3rem .7rem;color:#b5432f}
main{max-width:1200px;margin:0 auto;padding:1.5rem 2rem 4rem}
main h2{font-size:1.6rem;margin-bottom:1rem}
.error-panel,.empty-state,.not-found{text-align:center;padding:3rem 1rem;color:#7a6f63}
.error-panel h3,.empty-state h3{color:#b5432f;margin-bottom:.5rem}
.filter-bar{display:flex;gap:1.5rem;flex-wrap:wrap;align-items:center;margin-bottom:1rem}
.filter-group{display:flex;gap:.5rem;align-items:center}
.filter-label{font-size:.75rem;text-transform:uppercase;color:#7a6f63}
.filter-btn{border:1px solid #d8cbb8;border-radius:14px;padding:.25rem .7rem;font-size:.85rem}
.filter-btn.active{background:#b5432f;border-color:#b5432f;color:#fff}
.filter-reset{font-size:.85rem;text-decoration:underline}
.active-filters{display:flex;gap:.5rem;margin-bottom:.5rem}
.filter-tag{background:#f1e3d3;border-radius:12px;padding:.2rem .6rem;font-size:.8rem}
.results-count{color:#7a6f63;font-size:.9rem;margin-bottom:1rem}
.album-grid,.achievements-grid{display:grid;grid-template-columns:repeat(auto-fill,minmax(260px,1fr));gap:1.2rem}
.album-card,.achievement-card{display:block;background:#fff;border-radius:8px;overflow:hidden;box-shadow:0 1px 4px rgba(0,0,0,.08)}
.album-card img,.achievement-card img{width:100%;aspect-ratio:4/3;object-fit:cover}
.album-info,.achievement-info{padding:.8rem 1rem}
.album-meta{display:flex;gap:.8rem;flex-wrap:wrap;color:#7a6f63;font-size:.85rem;margin:.3rem 0}
.album-view{color:#b5432f;font-size:.85rem}
.back-btn{display:inline-block;margin-bottom:1rem;color:#b5432f}
.album-header{margin-bottom:1rem}
.album-description{margin-top:.5rem;line-height:1.6}
.album-featured img{width:100%;max-height:480px;object-fit:cover;border-radius:8px}
.media-grid{display:grid;grid-template-columns:repeat(auto-fill,minmax(180px,1fr));gap:6px;margin-top:1rem}
.media-item{position:relative;display:block;aspect-ratio:1;overflow:hidden;border-radius:4px}
.media-item img{width:100%;height:100%;object-fit:cover}
.play-icon{position:absolute;inset:0;display:flex;align-items:center;justify-content:center;font-size:2.5rem;color:#fff;text-shadow:0 0 8px #000}
.video-duration{position:absolute;right:.4rem;bottom:.4rem;background:rgba(0,0,0,.7);color:#fff;font-size:.75rem;padding:.1rem .4rem;border-radius:4px}
.lightbox{position:fixed;inset:0;z-index:1000;background:rgba(0,0,0,.95);display:flex;flex-direction:column;align-items:center;justify-content:center}
.lightbox img,.lightbox video{max-width:95vw;max-height:80vh;object-fit:contain;border-radius:4px}
.lightbox figcaption{margin-top:1rem;text-align:center;color:#ddd}
.lb-note{color:#999;font-size:.85rem}
.lb-close{position:absolute;top:1rem;right:1.5rem;font-size:2rem;color:#aaa}
.lb-nav{position:absolute;top:50%;transform:translateY(-50%);font-size:3rem;color:#777;padding:1rem}
.lb-prev{left:1rem}
.lb-next{right:1rem}
.lb-counter{position:absolute;bottom:1.2rem;color:#aaa;font-size:.9rem}
@media(max-width:600px){
  header.site{padding:.8rem 1rem}
  main{padding:1rem}
  .media-grid{grid-template-columns:repeat(auto-fill,minmax(110px,1fr));gap:3px}
}
"#;

/// Keyboard and swipe bindings; each trigger follows the matching link.
fn lightbox_script() -> String {
    format!(
        r##"<script>
(function(){{
var lb=document.getElementById('lightbox');
if(!lb)return;
function go(id){{var a=document.getElementById(id);if(a)location.href=a.href;}}
document.addEventListener('keydown',function(e){{
  if(e.key==='Escape')go('lb-close');
  else if(e.key==='ArrowLeft')go('lb-prev');
  else if(e.key==='ArrowRight')go('lb-next');
}});
var startX=null;
lb.addEventListener('touchstart',function(e){{startX=e.changedTouches[0].screenX;}},{{passive:true}});
lb.addEventListener('touchend',function(e){{
  if(startX===null)return;
  var diff=startX-e.changedTouches[0].screenX;
  startX=null;
  if(Math.abs(diff)>{threshold})go(diff>0?'lb-next':'lb-prev');
}},{{passive:true}});
}})();
</script>"##,
        threshold = SWIPE_THRESHOLD
    )
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum Section {
    Gallery,
    Achievements,
}

struct Shell<'a> {
    title: &'a str,
    section: Section,
    switch_href: String,
    scroll_locked: bool,
    main: String,
    overlay: String,
}

fn layout(ctx: &PageContext<'_>, lang: Lang, shell: Shell<'_>) -> String {
    let labels = Labels::for_lang(lang);
    let site_name = resolve(ctx.site_name, lang);
    let all = FilterSelection::default();
    let nav_link = |section: Section, page: Page<'_>, label: &str| {
        format!(
            "<a href=\"{}\"{}>{}</a>",
            escape_html(&ctx.links.href(lang, page, &all)),
            if shell.section == section { " class=\"active\"" } else { "" },
            escape_html(label)
        )
    };
    format!(
        r##"<!DOCTYPE html>
<html lang="{lang}">
<head>
<meta charset="utf-8">
<meta name="viewport" content="width=device-width,initial-scale=1">
<title>{title} · {site}</title>
<style>{style}</style>
</head>
<body{body_class}>
<header class="site">
  <h1>{site}</h1>
  <nav>
    {gallery_link}
    {achievements_link}
    <a class="lang-toggle" href="{switch}" hreflang="{other}">{other_name}</a>
  </nav>
</header>
<main>
{main}
</main>
{overlay}
</body>
</html>
"##,
        lang = lang.code(),
        title = escape_html(shell.title),
        site = escape_html(site_name),
        style = STYLE,
        body_class = if shell.scroll_locked { " class=\"lightbox-open\"" } else { "" },
        gallery_link = nav_link(Section::Gallery, Page::Gallery, labels.gallery),
        achievements_link = nav_link(Section::Achievements, Page::Achievements, labels.achievements),
        switch = escape_html(&shell.switch_href),
        other = lang.other().code(),
        other_name = lang.other().native_name(),
        main = shell.main,
        overlay = shell.overlay,
    )
}

fn error_panel(labels: &Labels, detail: &str) -> String {
    format!(
        "<div class=\"error-panel\" role=\"alert\"><h3>{}</h3><p>{}</p><!-- {} --></div>\n",
        escape_html(labels.load_error),
        escape_html(labels.load_error_hint),
        escape_html(&detail.replace("--", "- -"))
    )
}

/// Overlay for an open lightbox; empty while closed.
fn lightbox_overlay(
    lightbox: &Lightbox,
    labels: &Labels,
    ctx: &PageContext<'_>,
    close_href: &str,
    item_href: impl Fn(usize) -> String,
    note: &str,
) -> String {
    let (Some(index), Some(item), Some((prev, next))) =
        (lightbox.current_index(), lightbox.current(), lightbox.neighbors())
    else {
        return String::new();
    };

    let media = media_element(lightbox, index, item, ctx);
    let mut caption = String::new();
    if !item.caption.is_empty() {
        caption.push_str(&format!("<p>{}</p>", escape_html(&item.caption)));
    }
    if !note.is_empty() {
        caption.push_str(&format!("<p class=\"lb-note\">{}</p>", escape_html(note)));
    }

    format!(
        r##"<div class="lightbox" id="lightbox" role="dialog" aria-modal="true">
  <a class="lb-close" id="lb-close" href="{close}" aria-label="{close_label}">&times;</a>
  <a class="lb-nav lb-prev" id="lb-prev" href="{prev}" aria-label="{prev_label}">&#8249;</a>
  <a class="lb-nav lb-next" id="lb-next" href="{next}" aria-label="{next_label}">&#8250;</a>
  <figure>{media}<figcaption>{caption}</figcaption></figure>
  <div class="lb-counter">{counter}</div>
</div>
{script}"##,
        close = escape_html(close_href),
        close_label = escape_html(labels.close),
        prev = escape_html(&item_href(prev)),
        prev_label = escape_html(labels.previous),
        next = escape_html(&item_href(next)),
        next_label = escape_html(labels.next),
        counter = lightbox.counter().unwrap_or_default(),
        script = lightbox_script(),
    )
}

fn media_element(lightbox: &Lightbox, index: usize, item: &MediaItem, ctx: &PageContext<'_>) -> String {
    let src = escape_html(&ctx.links.asset(&item.src));
    match item.kind {
        MediaKind::Video if lightbox.playing() == Some(index) => {
            format!("<video src=\"{src}\" controls autoplay playsinline></video>")
        }
        MediaKind::Video => format!("<video src=\"{src}\" controls playsinline preload=\"none\"></video>"),
        MediaKind::Image => format!(
            "<img src=\"{src}\" alt=\"{}\"{}>",
            escape_html(&item.caption),
            placeholder_attr(ctx)
        ),
    }
}

fn placeholder_attr(ctx: &PageContext<'_>) -> String {
    if ctx.placeholder.is_empty() {
        return String::new();
    }
    let fallback = escape_js(&ctx.links.asset(ctx.placeholder));
    format!(
        " onerror=\"this.onerror=null;this.src='{}'\"",
        escape_html(&fallback)
    )
}

// --- Gallery ---

/// The gallery page as the controller currently sees it.
pub fn render_gallery(ctrl: &GalleryController, ctx: &PageContext<'_>) -> String {
    let lang = ctrl.lang();
    let labels = Labels::for_lang(lang);
    let selection = ctrl.selection();

    let mut main = String::new();
    if let Some(err) = ctrl.load_error() {
        main.push_str(&error_panel(&labels, err));
    }

    let (page, overlay) = match (ctrl.view(), ctrl.detail()) {
        (ViewMode::Detail(_), Some(detail)) => {
            main.push_str(&album_section(ctrl, detail, ctx));
            let id = detail.album_id.as_str();
            let page = match ctrl.lightbox().current_index() {
                Some(i) => Page::Media(id, i),
                None => Page::Album(id),
            };
            let overlay = lightbox_overlay(
                ctrl.lightbox(),
                &labels,
                ctx,
                &ctx.links.href(lang, Page::Album(id), selection),
                |i| ctx.links.href(lang, Page::Media(id, i), selection),
                "",
            );
            (page, overlay)
        }
        _ => {
            main.push_str(&grid_section(ctrl, ctx));
            (Page::Gallery, String::new())
        }
    };

    let title = ctrl
        .detail()
        .map(|d| d.header.title.as_str())
        .filter(|t| !t.is_empty())
        .unwrap_or(labels.gallery);

    layout(
        ctx,
        lang,
        Shell {
            title,
            section: Section::Gallery,
            switch_href: ctx.links.switch_language(lang, page, selection),
            scroll_locked: ctrl.lightbox().is_scroll_locked(),
            main,
            overlay,
        },
    )
}

fn filter_button(href: String, label: &str, active: bool) -> String {
    format!(
        "<a class=\"filter-btn{}\" href=\"{}\">{}</a>",
        if active { " active" } else { "" },
        escape_html(&href),
        escape_html(label)
    )
}

fn grid_section(ctrl: &GalleryController, ctx: &PageContext<'_>) -> String {
    let lang = ctrl.lang();
    let labels = Labels::for_lang(lang);
    let store = ctrl.store();
    let selection = ctrl.selection();
    let href = |sel: &FilterSelection| ctx.links.href(lang, Page::Gallery, sel);

    let mut html = format!(
        "<section class=\"gallery\">\n<h2>{}</h2>\n<div class=\"filter-bar\">\n",
        escape_html(labels.gallery)
    );

    // Category buttons keep the year, year buttons keep the category.
    html.push_str(&format!(
        "<div class=\"filter-group\"><span class=\"filter-label\">{}</span>",
        escape_html(labels.category)
    ));
    let mut all_categories = selection.clone();
    all_categories.category = CategoryFilter::All;
    html.push_str(&filter_button(
        href(&all_categories),
        labels.all,
        selection.category == CategoryFilter::All,
    ));
    for category in store.categories() {
        let mut sel = selection.clone();
        sel.category = CategoryFilter::Only(category.id.clone());
        let active = selection.category == sel.category;
        html.push_str(&filter_button(href(&sel), resolve(&category.name, lang), active));
    }
    html.push_str("</div>\n");

    html.push_str(&format!(
        "<div class=\"filter-group\"><span class=\"filter-label\">{}</span>",
        escape_html(labels.year)
    ));
    let mut all_years = selection.clone();
    all_years.year = YearFilter::All;
    html.push_str(&filter_button(
        href(&all_years),
        labels.all,
        selection.year == YearFilter::All,
    ));
    for &year in store.years() {
        let mut sel = selection.clone();
        sel.year = YearFilter::Only(year);
        let active = selection.year == sel.year;
        html.push_str(&filter_button(href(&sel), &year.to_string(), active));
    }
    html.push_str("</div>\n");
    html.push_str(&format!(
        "<a class=\"filter-reset\" href=\"{}\">{}</a>\n</div>\n",
        escape_html(&href(&FilterSelection::default())),
        escape_html(labels.reset)
    ));

    let tags = filter::active_tags(store, selection, lang);
    if !tags.is_empty() {
        html.push_str("<div class=\"active-filters\">");
        for tag in &tags {
            html.push_str(&format!(
                "<span class=\"filter-tag\">{} <a href=\"{}\" aria-label=\"{}\">&times;</a></span>",
                escape_html(&tag.label),
                escape_html(&href(&selection.without(tag.kind))),
                escape_html(labels.close)
            ));
        }
        html.push_str("</div>\n");
    }

    let albums = ctrl.visible_albums();
    html.push_str(&format!(
        "<p class=\"results-count\">{}</p>\n",
        escape_html(&filter::results_count(albums.len(), lang))
    ));

    if store.is_empty() && ctrl.load_error().is_none() {
        html.push_str(&format!(
            "<div class=\"empty-state\"><h3>{}</h3></div>\n",
            escape_html(labels.no_data)
        ));
    } else if albums.is_empty() && ctrl.load_error().is_none() {
        html.push_str(&format!(
            "<div class=\"empty-state\"><h3>{}</h3><p>{}</p></div>\n",
            escape_html(labels.no_results),
            escape_html(labels.no_results_hint)
        ));
    } else if !albums.is_empty() {
        html.push_str("<div class=\"album-grid\">\n");
        for album in albums {
            html.push_str(&album_card(ctrl, album, ctx));
        }
        html.push_str("</div>\n");
    }
    html.push_str("</section>\n");
    html
}

fn album_card(ctrl: &GalleryController, album: &Album, ctx: &PageContext<'_>) -> String {
    let lang = ctrl.lang();
    let labels = Labels::for_lang(lang);
    let title = resolve(&album.title, lang);
    format!(
        "  <a class=\"album-card\" href=\"{href}\" data-category=\"{category_id}\" data-year=\"{year}\">\
<img src=\"{img}\" alt=\"{title}\" loading=\"lazy\"{fallback}>\
<div class=\"album-info\"><h3>{title}</h3>\
<p class=\"album-meta\"><span>{date}</span><span>{category}</span></p>\
<p class=\"album-count\">{count}</p>\
<span class=\"album-view\">{view}</span></div></a>\n",
        href = escape_html(&ctx.links.href(lang, Page::Album(&album.id), ctrl.selection())),
        category_id = escape_html(&album.category),
        year = album.year,
        img = escape_html(&ctx.links.thumbnail(&album.featured_image)),
        fallback = placeholder_attr(ctx),
        title = escape_html(title),
        date = escape_html(&format_date(&album.date, lang)),
        category = escape_html(ctrl.store().category_name(&album.category, lang)),
        count = escape_html(&count_label(album.images.len(), labels.photos, lang)),
        view = escape_html(labels.view),
    )
}

fn album_section(ctrl: &GalleryController, detail: &AlbumDetail, ctx: &PageContext<'_>) -> String {
    let lang = ctrl.lang();
    let labels = Labels::for_lang(lang);
    let selection = ctrl.selection();
    let header = &detail.header;
    let id = detail.album_id.as_str();

    let mut meta = format!(
        "<span class=\"album-date\">{}</span><span class=\"album-category\">{}</span><span class=\"album-photos\">{}</span>",
        escape_html(&header.date),
        escape_html(&header.category),
        escape_html(&count_label(header.photo_count, labels.photos, lang))
    );
    if let Some(videos) = header.video_count {
        meta.push_str(&format!(
            "<span class=\"album-videos\">{}</span>",
            escape_html(&count_label(videos, labels.videos, lang))
        ));
    }

    let mut html = format!(
        r##"<section class="album-detail" data-album="{data_id}">
<a class="back-btn" href="{back}">&larr; {back_label}</a>
<div class="album-header">
  <h2>{title}</h2>
  <div class="album-meta">{meta}</div>
  <p class="album-description">{description}</p>
</div>
<a class="album-featured" href="{featured_href}"><img src="{featured}" alt="{title}"{fallback}></a>
<div class="media-grid">
"##,
        data_id = escape_html(id),
        back = escape_html(&ctx.links.href(lang, Page::Gallery, selection)),
        back_label = escape_html(labels.back),
        title = escape_html(&header.title),
        meta = meta,
        description = escape_html(&header.description),
        featured_href = escape_html(&ctx.links.href(lang, Page::Media(id, 0), selection)),
        featured = escape_html(&ctx.links.asset(&detail.featured_image)),
        fallback = placeholder_attr(ctx),
    );

    for tile in &detail.tiles {
        let Some(item) = detail.media.get(tile.index) else {
            continue;
        };
        html.push_str(&media_tile(tile, item, ctx, &ctx.links.href(lang, Page::Media(id, tile.index), selection)));
    }
    html.push_str("</div>\n</section>\n");
    html
}

fn media_tile(tile: &GridTile, item: &MediaItem, ctx: &PageContext<'_>, href: &str) -> String {
    // A tile falling back to the full image gets a generated thumbnail instead.
    let img = if tile.kind == MediaKind::Image && tile.thumbnail == item.src {
        ctx.links.thumbnail(&item.src)
    } else {
        ctx.links.asset(&tile.thumbnail)
    };
    let mut extra = String::new();
    if tile.kind == MediaKind::Video {
        extra.push_str("<span class=\"play-icon\">&#9654;</span>");
        if let Some(duration) = &tile.duration {
            extra.push_str(&format!(
                "<span class=\"video-duration\">{}</span>",
                escape_html(duration)
            ));
        }
    }
    let kind = match tile.kind {
        MediaKind::Image => "image",
        MediaKind::Video => "video",
    };
    format!(
        "  <a class=\"media-item {kind}\" href=\"{}\" data-index=\"{}\"><img src=\"{}\" alt=\"{}\" loading=\"lazy\"{}>{extra}</a>\n",
        escape_html(href),
        tile.index,
        escape_html(&img),
        escape_html(&tile.alt),
        placeholder_attr(ctx),
    )
}

// --- Achievements ---

pub fn render_achievements(ctrl: &AchievementsController, ctx: &PageContext<'_>) -> String {
    let lang = ctrl.lang();
    let labels = Labels::for_lang(lang);
    let all = FilterSelection::default();

    let mut main = format!(
        "<section class=\"achievements\">\n<h2>{}</h2>\n",
        escape_html(labels.achievements)
    );
    if let Some(err) = ctrl.load_error() {
        main.push_str(&error_panel(&labels, err));
    } else if ctrl.entries().is_empty() {
        main.push_str(&format!(
            "<div class=\"empty-state\"><h3>{}</h3></div>\n",
            escape_html(labels.no_data)
        ));
    } else {
        main.push_str("<div class=\"achievements-grid\">\n");
        for (i, entry) in ctrl.entries().iter().enumerate() {
            let title = resolve(&entry.title, lang);
            let year = entry.year.as_ref().map(|y| y.to_string()).unwrap_or_default();
            main.push_str(&format!(
                "  <a class=\"achievement-card\" href=\"{}\"><img src=\"{}\" alt=\"{}\" loading=\"lazy\"{}>\
<div class=\"achievement-info\"><h3>{}</h3><p>{}</p></div></a>\n",
                escape_html(&ctx.links.href(lang, Page::Achievement(i), &all)),
                escape_html(&ctx.links.asset(&entry.image)),
                escape_html(title),
                placeholder_attr(ctx),
                escape_html(title),
                escape_html(&year),
            ));
        }
        main.push_str("</div>\n");
    }
    main.push_str("</section>\n");

    let note = ctrl
        .current_entry()
        .and_then(|e| e.year.as_ref())
        .map(|y| y.to_string())
        .unwrap_or_default();
    let overlay = lightbox_overlay(
        ctrl.lightbox(),
        &labels,
        ctx,
        &ctx.links.href(lang, Page::Achievements, &all),
        |i| ctx.links.href(lang, Page::Achievement(i), &all),
        &note,
    );
    let page = match ctrl.lightbox().current_index() {
        Some(i) => Page::Achievement(i),
        None => Page::Achievements,
    };

    layout(
        ctx,
        lang,
        Shell {
            title: labels.achievements,
            section: Section::Achievements,
            switch_href: ctx.links.switch_language(lang, page, &all),
            scroll_locked: ctrl.lightbox().is_scroll_locked(),
            main,
            overlay,
        },
    )
}

// --- Misc pages ---

pub fn render_not_found(lang: Lang, ctx: &PageContext<'_>) -> String {
    let labels = Labels::for_lang(lang);
    let all = FilterSelection::default();
    let main = format!(
        "<section class=\"not-found\">\n<h2>{}</h2>\n<a class=\"back-btn\" href=\"{}\">&larr; {}</a>\n</section>\n",
        escape_html(labels.not_found),
        escape_html(&ctx.links.href(lang, Page::Gallery, &all)),
        escape_html(labels.back)
    );
    layout(
        ctx,
        lang,
        Shell {
            title: labels.not_found,
            section: Section::Gallery,
            switch_href: ctx.links.switch_language(lang, Page::Gallery, &all),
            scroll_locked: false,
            main,
            overlay: String::new(),
        },
    )
}

/// Minimal page that forwards the browser to `target`.
pub fn render_redirect(target: &str) -> String {
    let target = escape_html(target);
    format!(
        "<!DOCTYPE html>\n<html>\n<head>\n<meta charset=\"utf-8\">\n<meta http-equiv=\"refresh\" content=\"0; url={target}\">\n</head>\n<body><a href=\"{target}\">{target}</a></body>\n</html>\n"
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::{AchievementsStore, ContentStore, fixtures};
    use std::sync::Arc;

    fn site_name() -> Text {
        Text::bilingual("সার্বেরিয়া পল্লী সেবা সমিতি", "Sarberia Pally Seba Samity")
    }

    fn ctx(name: &Text, links: LinkStyle) -> PageContext<'_> {
        PageContext {
            links,
            site_name: name,
            placeholder: "assets/images/common/placeholder.jpg",
        }
    }

    fn gallery(lang: Lang) -> GalleryController {
        GalleryController::new(Arc::new(fixtures::store()), lang)
    }

    const STATIC: LinkStyle = LinkStyle::Static { thumbs: false };

    // --- links ---

    #[test]
    fn static_names_for_every_page() {
        let all = FilterSelection::default();
        assert_eq!(static_file_name(Page::Gallery, &all), "gallery.html");
        assert_eq!(
            static_file_name(Page::Gallery, &FilterSelection::category("sports")),
            "gallery-sports-all.html"
        );
        assert_eq!(
            static_file_name(Page::Gallery, &FilterSelection::year(2024)),
            "gallery-all-2024.html"
        );
        assert_eq!(static_file_name(Page::Album("a b"), &all), "album.a_b.html");
        assert_eq!(static_file_name(Page::Media("x", 3), &all), "album.x.3.html");
        let sports = FilterSelection::category("sports");
        assert_eq!(static_file_name(Page::Album("x"), &sports), "album.x.sports-all.html");
        assert_eq!(static_file_name(Page::Media("x", 3), &sports), "album.x.sports-all.3.html");
        assert_eq!(static_file_name(Page::Achievement(0), &all), "achievement-0.html");
    }

    #[test]
    fn static_names_are_distinct_across_pages_and_filters() {
        let mut names = std::collections::HashSet::new();
        let selections = [
            FilterSelection::default(),
            FilterSelection::category("sports"),
            FilterSelection::from_params(Some("sports"), Some("2023")),
            FilterSelection::year(2),
        ];
        for sel in &selections {
            for id in ["puja", "puja-2", "puja-2-2", "sports", "all-2"] {
                assert!(names.insert(static_file_name(Page::Album(id), sel)));
                for i in 0..3 {
                    assert!(names.insert(static_file_name(Page::Media(id, i), sel)), "{id} {i}");
                }
            }
            assert!(names.insert(static_file_name(Page::Gallery, sel)));
        }
        assert_eq!(static_file_name(Page::Media("puja", 2), &selections[0]), "album.puja.2.html");
    }

    #[test]
    fn server_paths_carry_filters_and_encode_ids() {
        let sel = FilterSelection::from_params(Some("sports"), Some("2023"));
        assert_eq!(
            server_path(Lang::En, Page::Gallery, &sel),
            "/en/gallery?category=sports&year=2023"
        );
        assert_eq!(
            server_path(Lang::Bn, Page::Media("a b", 2), &FilterSelection::default()),
            "/bn/album/a%20b/2"
        );
        assert_eq!(server_path(Lang::En, Page::Achievement(1), &sel), "/en/achievements/1");
    }

    #[test]
    fn switch_language_targets_same_page() {
        let all = FilterSelection::default();
        assert_eq!(
            STATIC.switch_language(Lang::Bn, Page::Album("football-2023"), &all),
            "../en/album.football-2023.html"
        );
        assert_eq!(
            LinkStyle::Server.switch_language(Lang::En, Page::Achievements, &all),
            "/lang/bn?next=%2Fbn%2Fachievements"
        );
    }

    #[test]
    fn assets_and_thumbnails_per_style() {
        assert_eq!(STATIC.asset("assets/a b.jpg"), "../assets/a%20b.jpg");
        assert_eq!(LinkStyle::Server.asset("assets/a.jpg"), "/assets/a.jpg");
        assert_eq!(LinkStyle::Server.thumbnail("assets/a.jpg"), "/thumb/assets/a.jpg");
        let thumbs = LinkStyle::Static { thumbs: true };
        assert_eq!(thumbs.thumbnail("assets/a.png"), "../thumbs/assets/a.jpg");
        assert_eq!(thumbs.thumbnail("assets/a.webp"), "../assets/a.webp");
        assert_eq!(STATIC.thumbnail("assets/a.png"), "../assets/a.png");
    }

    #[test]
    fn urlencode_keeps_unreserved() {
        assert_eq!(urlencode("abc-1_2.x~"), "abc-1_2.x~");
        assert_eq!(urlencode("a/b?c"), "a%2Fb%3Fc");
        assert_eq!(urlencode("দু"), "%E0%A6%A6%E0%A7%81");
    }

    #[test]
    fn escape_html_special_chars() {
        assert_eq!(escape_html("<a href=\"x\">&</a>"), "&lt;a href=&quot;x&quot;&gt;&amp;&lt;/a&gt;");
    }

    // --- gallery grid ---

    #[test]
    fn grid_page_structure() {
        let name = site_name();
        let html = render_gallery(&gallery(Lang::En), &ctx(&name, STATIC));
        assert!(html.starts_with("<!DOCTYPE html>"));
        assert!(html.contains("<html lang=\"en\">"));
        assert!(html.contains("Sarberia Pally Seba Samity"));
        assert!(html.contains("Football Tournament"));
        assert!(html.contains("Durga Puja"));
        assert!(html.contains("Found 3 albums"));
        assert!(html.contains("href=\"album.football-2023.html\""));
        assert!(html.contains("href=\"../bn/gallery.html\""));
        assert!(!html.contains("id=\"lightbox\""));
    }

    #[test]
    fn grid_in_bengali_uses_bengali_labels() {
        let name = site_name();
        let html = render_gallery(&gallery(Lang::Bn), &ctx(&name, STATIC));
        assert!(html.contains("<html lang=\"bn\">"));
        assert!(html.contains("ফুটবল টুর্নামেন্ট"));
        assert!(html.contains("3টি অ্যালবাম পাওয়া গেছে"));
        assert!(html.contains("১৫ মার্চ ২০২৩"));
        assert!(html.contains(">English</a>"));
    }

    #[test]
    fn filtered_grid_marks_active_filters() {
        let name = site_name();
        let mut ctrl = gallery(Lang::En);
        ctrl.set_selection(FilterSelection::from_params(Some("sports"), Some("2024")));
        let html = render_gallery(&ctrl, &ctx(&name, STATIC));
        assert!(html.contains("Found 1 album<"));
        assert!(html.contains("Cricket"));
        assert!(!html.contains("Durga Puja"));
        assert!(html.contains("<span class=\"filter-tag\">Sports"));
        assert!(html.contains("<span class=\"filter-tag\">2024"));
        // Removing the year chip keeps the category.
        assert!(html.contains("href=\"gallery-sports-all.html\""));
        assert!(html.contains("class=\"filter-btn active\" href=\"gallery-sports-2024.html\""));
    }

    #[test]
    fn no_match_shows_empty_state() {
        let name = site_name();
        let mut ctrl = gallery(Lang::En);
        ctrl.set_selection(FilterSelection::from_params(Some("cultural"), Some("2024")));
        let html = render_gallery(&ctrl, &ctx(&name, STATIC));
        assert!(html.contains("No albums found"));
        assert!(html.contains("Try a different filter"));
        assert!(!html.contains("class=\"album-grid\""));
    }

    #[test]
    fn load_error_renders_panel() {
        let name = site_name();
        let result = ContentStore::load(Path::new("/nonexistent/gallery.json"));
        let ctrl = GalleryController::from_load(result, Lang::Bn);
        let html = render_gallery(&ctrl, &ctx(&name, STATIC));
        assert!(html.contains("class=\"error-panel\""));
        assert!(html.contains("গ্যালারি লোড করা যায়নি"));
        assert!(!html.contains("class=\"empty-state\""));
    }

    // --- album detail ---

    #[test]
    fn detail_page_header_and_tiles() {
        let name = site_name();
        let mut ctrl = gallery(Lang::En);
        ctrl.open_album("football-2023").unwrap();
        let html = render_gallery(&ctrl, &ctx(&name, STATIC));
        assert!(html.contains("<title>Football Tournament · Sarberia Pally Seba Samity</title>"));
        assert!(html.contains("March 15, 2023"));
        assert!(html.contains("2 Photos"));
        assert!(html.contains("1 Videos"));
        assert!(html.contains("Annual tournament"));
        assert!(html.contains("href=\"album.football-2023.3.html\""));
        assert!(html.contains("<span class=\"video-duration\">2:45</span>"));
        assert!(html.contains("href=\"gallery.html\">&larr; Back"));
        assert!(html.contains("href=\"../bn/album.football-2023.html\""));
    }

    #[test]
    fn detail_without_videos_hides_video_count() {
        let name = site_name();
        let mut ctrl = gallery(Lang::En);
        ctrl.open_album("durga-puja-2023").unwrap();
        let html = render_gallery(&ctrl, &ctx(&name, STATIC));
        assert!(html.contains("1 Photos"));
        assert!(!html.contains("class=\"album-videos\""));
    }

    #[test]
    fn detail_uses_explicit_or_generated_thumbnails() {
        let name = site_name();
        let mut ctrl = gallery(Lang::En);
        ctrl.open_album("football-2023").unwrap();
        let html = render_gallery(&ctrl, &ctx(&name, LinkStyle::Static { thumbs: true }));
        assert!(html.contains("src=\"../assets/images/gallery/football/1-thumb.jpg\""));
        assert!(html.contains("src=\"../thumbs/assets/images/gallery/football/2.jpg\""));
        assert!(html.contains("src=\"../assets/videos/football/highlights.jpg\""));
    }

    #[test]
    fn server_detail_back_link_keeps_filter() {
        let name = site_name();
        let mut ctrl = gallery(Lang::En);
        ctrl.set_selection(FilterSelection::category("sports"));
        ctrl.open_album("football-2023").unwrap();
        let html = render_gallery(&ctrl, &ctx(&name, LinkStyle::Server));
        assert!(html.contains("href=\"/en/gallery?category=sports\">&larr; Back"));
        assert!(html.contains("href=\"/en/album/football-2023/1?category=sports\""));
    }

    // --- lightbox ---

    #[test]
    fn open_lightbox_renders_overlay_with_wrapping_links() {
        let name = site_name();
        let mut ctrl = gallery(Lang::En);
        ctrl.open_album("football-2023").unwrap();
        ctrl.open_media(0);
        let html = render_gallery(&ctrl, &ctx(&name, STATIC));
        assert!(html.contains("<body class=\"lightbox-open\">"));
        assert!(html.contains("id=\"lb-prev\" href=\"album.football-2023.3.html\""));
        assert!(html.contains("id=\"lb-next\" href=\"album.football-2023.1.html\""));
        assert!(html.contains("id=\"lb-close\" href=\"album.football-2023.html\""));
        assert!(html.contains("<div class=\"lb-counter\">1 / 4</div>"));
        assert!(html.contains("Math.abs(diff)>50"));
        assert!(html.contains("href=\"../bn/album.football-2023.0.html\""));
    }

    #[test]
    fn current_video_autoplays() {
        let name = site_name();
        let mut ctrl = gallery(Lang::En);
        ctrl.open_album("football-2023").unwrap();
        ctrl.open_media(3);
        let html = render_gallery(&ctrl, &ctx(&name, STATIC));
        assert!(html.contains("<video src=\"../assets/videos/football/highlights.mp4\" controls autoplay"));
        assert!(html.contains("<p>Highlights</p>"));
    }

    #[test]
    fn closed_lightbox_has_no_overlay_or_lock() {
        let name = site_name();
        let mut ctrl = gallery(Lang::En);
        ctrl.open_album("football-2023").unwrap();
        ctrl.open_media(3);
        ctrl.close_media();
        let html = render_gallery(&ctrl, &ctx(&name, STATIC));
        assert!(html.contains("<body>"));
        assert!(!html.contains("<video"));
    }

    #[test]
    fn image_fallback_points_at_placeholder() {
        let name = site_name();
        let mut ctrl = gallery(Lang::En);
        ctrl.open_album("durga-puja-2023").unwrap();
        ctrl.open_media(1);
        let html = render_gallery(&ctrl, &ctx(&name, LinkStyle::Server));
        assert!(html.contains("this.src='/assets/images/common/placeholder.jpg'"));
    }

    // --- achievements ---

    #[test]
    fn achievements_grid_and_overlay() {
        let name = site_name();
        let mut ctrl = AchievementsController::new(Arc::new(fixtures::achievements()), Lang::En);
        let html = render_achievements(&ctrl, &ctx(&name, STATIC));
        assert!(html.contains("Best Pandal"));
        assert!(html.contains("2021-22"));
        assert!(html.contains("href=\"achievement-2.html\""));
        assert!(!html.contains("id=\"lightbox\""));

        ctrl.lightbox_mut().open(1);
        let html = render_achievements(&ctrl, &ctx(&name, STATIC));
        assert!(html.contains("<p class=\"lb-note\">2021-22</p>"));
        assert!(html.contains("id=\"lb-next\" href=\"achievement-2.html\""));
        assert!(html.contains("id=\"lb-close\" href=\"achievements.html\""));
        assert!(html.contains("href=\"../bn/achievement-1.html\""));
    }

    #[test]
    fn empty_achievements_show_no_data() {
        let name = site_name();
        let ctrl = AchievementsController::new(Arc::new(AchievementsStore::empty()), Lang::Bn);
        let html = render_achievements(&ctrl, &ctx(&name, STATIC));
        assert!(html.contains("কোনো তথ্য পাওয়া যায়নি"));
    }

    #[test]
    fn not_found_and_redirect_pages() {
        let name = site_name();
        let html = render_not_found(Lang::En, &ctx(&name, LinkStyle::Server));
        assert!(html.contains("Album not found"));
        assert!(html.contains("href=\"/en/gallery\""));

        let redirect = render_redirect("bn/gallery.html");
        assert!(redirect.contains("url=bn/gallery.html"));
    }
}
