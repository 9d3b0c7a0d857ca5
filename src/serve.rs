use anyhow::{Context, Result};
use std::collections::HashMap;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::{SystemTime, UNIX_EPOCH};
use tiny_http::{Header, Method, Request, Response, Server, StatusCode};

use crate::config::SiteConfig;
use crate::content::{AchievementsStore, ContentStore};
use crate::controller::{AchievementsController, GalleryController};
use crate::filter::{self, FilterSelection};
use crate::i18n::{Lang, resolve};
use crate::lightbox::{Key, Lightbox, Swipe, SwipeTracker};
use crate::prefs::LANG_KEY;
use crate::render::{self, LinkStyle, Page, PageContext};
use crate::thumb;

const COOKIE_MAX_AGE: u64 = 365 * 24 * 60 * 60;

fn lock<T>(m: &Mutex<T>) -> MutexGuard<'_, T> {
    m.lock().unwrap_or_else(PoisonError::into_inner)
}

fn mtime(path: &Path) -> Option<SystemTime> {
    std::fs::metadata(path).and_then(|m| m.modified()).ok()
}

/// Content as loaded at one point in time. Load failures are kept as messages
/// so pages can show the error panel.
pub struct Snapshot {
    gallery: Arc<ContentStore>,
    gallery_error: Option<String>,
    achievements: Arc<AchievementsStore>,
    achievements_error: Option<String>,
    stamp: (Option<SystemTime>, Option<SystemTime>),
    /// Cache generation this snapshot belongs to.
    generation: u64,
}

impl Snapshot {
    fn load(config: &SiteConfig, generation: u64) -> Self {
        let stamp = (mtime(&config.gallery_path), mtime(&config.achievements_path));
        let (gallery, gallery_error) = match ContentStore::load(&config.gallery_path) {
            Ok(store) => (store, None),
            Err(e) => {
                tracing::warn!(error = %e, "gallery content unavailable");
                (ContentStore::empty(), Some(e.to_string()))
            }
        };
        let (achievements, achievements_error) = match AchievementsStore::load(&config.achievements_path) {
            Ok(store) => (store, None),
            Err(e) => {
                tracing::warn!(error = %e, "achievements content unavailable");
                (AchievementsStore::empty(), Some(e.to_string()))
            }
        };
        Self {
            gallery: Arc::new(gallery),
            gallery_error,
            achievements: Arc::new(achievements),
            achievements_error,
            stamp,
            generation,
        }
    }

    fn gallery_controller(&self, lang: Lang) -> GalleryController {
        let ctrl = GalleryController::new(Arc::clone(&self.gallery), lang);
        match &self.gallery_error {
            Some(e) => ctrl.with_load_error(e.clone()),
            None => ctrl,
        }
    }

    fn achievements_controller(&self, lang: Lang) -> AchievementsController {
        let ctrl = AchievementsController::new(Arc::clone(&self.achievements), lang);
        match &self.achievements_error {
            Some(e) => ctrl.with_load_error(e.clone()),
            None => ctrl,
        }
    }
}

/// Server state: the loaded content and a cache of rendered pages.
pub struct ServerState {
    pub config: SiteConfig,
    content: Mutex<Arc<Snapshot>>,
    page_cache: Mutex<HashMap<String, Arc<String>>>,
    cache_gen: AtomicU64,
}

impl ServerState {
    /// Canonicalize the site root and load the content once.
    pub fn new(config: SiteConfig) -> Result<Arc<Self>> {
        let mut config = config;
        config.root = config
            .root
            .canonicalize()
            .with_context(|| format!("Site directory not found: {}", config.root.display()))?;
        let snapshot = Snapshot::load(&config, 0);
        Ok(Arc::new(Self {
            config,
            content: Mutex::new(Arc::new(snapshot)),
            page_cache: Mutex::new(HashMap::new()),
            cache_gen: AtomicU64::new(0),
        }))
    }

    /// Current content, reloaded first if either file changed on disk.
    pub fn content(&self) -> Arc<Snapshot> {
        let stamp = (
            mtime(&self.config.gallery_path),
            mtime(&self.config.achievements_path),
        );
        let mut current = lock(&self.content);
        if current.stamp != stamp {
            tracing::info!("content changed on disk, reloading");
            let generation = self.invalidate_cache();
            *current = Arc::new(Snapshot::load(&self.config, generation));
        }
        Arc::clone(&current)
    }

    /// Return the cached page for `key`, rendering it from `snapshot` on a
    /// miss. A render returning `None` (unknown album, bad index) is not
    /// cached, and neither is a page rendered from a superseded snapshot.
    pub fn cached_page(
        &self,
        snapshot: &Snapshot,
        key: &str,
        render: impl FnOnce() -> Option<String>,
    ) -> Option<Arc<String>> {
        if let Some(html) = lock(&self.page_cache).get(key) {
            return Some(Arc::clone(html));
        }

        let html = Arc::new(render()?);
        let mut cache = lock(&self.page_cache);
        if snapshot.generation == self.cache_gen.load(Ordering::Acquire) {
            cache.insert(key.to_string(), Arc::clone(&html));
        }
        Some(html)
    }

    /// Render through the cache when there is a canonical key, directly otherwise.
    fn page(
        &self,
        snapshot: &Snapshot,
        key: Option<String>,
        render: impl FnOnce() -> Option<String>,
    ) -> Option<Arc<String>> {
        match key {
            Some(key) => self.cached_page(snapshot, &key, render),
            None => render().map(Arc::new),
        }
    }

    /// Start a new generation and drop every cached page. Returns the new generation.
    fn invalidate_cache(&self) -> u64 {
        let generation = self.cache_gen.fetch_add(1, Ordering::AcqRel) + 1;
        lock(&self.page_cache).clear();
        generation
    }

    fn page_context(&self) -> PageContext<'_> {
        PageContext {
            links: LinkStyle::Server,
            site_name: &self.config.site_name,
            placeholder: &self.config.placeholder_image,
        }
    }
}

/// What a request path asks for.
#[derive(Debug, PartialEq, Eq)]
pub enum Route<'a> {
    Root,
    Gallery(Lang),
    Album {
        lang: Lang,
        id: String,
        index: Option<usize>,
    },
    Achievements {
        lang: Lang,
        index: Option<usize>,
    },
    SetLanguage(&'a str),
    ApiGallery,
    Thumb(&'a str),
    NotFound(Lang),
    Static(&'a str),
}

pub fn route(path: &str) -> Route<'_> {
    if path == "/" {
        return Route::Root;
    }
    if path == "/api/gallery" {
        return Route::ApiGallery;
    }
    if let Some(rel) = path.strip_prefix("/thumb/") {
        return Route::Thumb(rel);
    }
    if let Some(code) = path.strip_prefix("/lang/") {
        return Route::SetLanguage(code);
    }

    let rel = path.trim_start_matches('/');
    let segments: Vec<&str> = rel.trim_end_matches('/').split('/').collect();
    let Some(lang) = segments.first().and_then(|s| Lang::parse(s)) else {
        return Route::Static(rel);
    };
    let index = |s: &str| s.parse::<usize>().ok();
    match segments[1..] {
        [] | ["gallery"] => Route::Gallery(lang),
        ["album", id] => Route::Album {
            lang,
            id: urldecode(id),
            index: None,
        },
        ["album", id, i] => match index(i) {
            Some(i) => Route::Album {
                lang,
                id: urldecode(id),
                index: Some(i),
            },
            None => Route::NotFound(lang),
        },
        ["achievements"] => Route::Achievements { lang, index: None },
        ["achievements", i] => match index(i) {
            Some(i) => Route::Achievements {
                lang,
                index: Some(i),
            },
            None => Route::NotFound(lang),
        },
        // Files of a static build that lives inside the site root.
        [_, ..] if rel.ends_with(".html") => Route::Static(rel),
        _ => Route::NotFound(lang),
    }
}

/// MIME type from file extension.
fn mime_type(path: &Path) -> &'static str {
    match path
        .extension()
        .unwrap_or_default()
        .to_string_lossy()
        .to_lowercase()
        .as_str()
    {
        "html" => "text/html; charset=utf-8",
        "json" => "application/json",
        "jpg" | "jpeg" => "image/jpeg",
        "png" => "image/png",
        "gif" => "image/gif",
        "webp" => "image/webp",
        "svg" => "image/svg+xml",
        "ico" => "image/x-icon",
        "tiff" | "tif" => "image/tiff",
        "mp4" => "video/mp4",
        "webm" => "video/webm",
        "css" => "text/css",
        "js" => "application/javascript",
        "woff2" => "font/woff2",
        _ => "application/octet-stream",
    }
}

fn with_header<R: Read>(resp: Response<R>, name: &str, value: &str) -> Response<R> {
    match Header::from_bytes(name.as_bytes(), value.as_bytes()) {
        Ok(h) => resp.with_header(h),
        Err(()) => {
            tracing::warn!(name, "dropping header with invalid value");
            resp
        }
    }
}

fn json_response(status: u16, value: &serde_json::Value) -> Response<std::io::Cursor<Vec<u8>>> {
    let resp = Response::from_string(value.to_string()).with_status_code(StatusCode(status));
    with_header(resp, "Content-Type", "application/json")
}

fn json_error(status: u16, msg: &str) -> Response<std::io::Cursor<Vec<u8>>> {
    json_response(status, &serde_json::json!({ "error": msg }))
}

fn redirect(status: u16, location: &str) -> Response<std::io::Empty> {
    with_header(Response::empty(StatusCode(status)), "Location", location)
}

/// Send a response and log the outcome.
fn send<R: Read>(req: Request, resp: Response<R>) {
    let status = resp.status_code().0;
    tracing::info!(method = %req.method(), url = req.url(), status, "request");
    if let Err(e) = req.respond(resp) {
        tracing::debug!(error = %e, "client went away");
    }
}

fn header_value<'a>(req: &'a Request, name: &'static str) -> Option<&'a str> {
    req.headers()
        .iter()
        .find(|h| h.field.equiv(name))
        .map(|h| h.value.as_str())
}

/// Value of cookie `name` in a `Cookie` header.
pub fn parse_cookie<'a>(header: &'a str, name: &str) -> Option<&'a str> {
    header.split(';').find_map(|pair| {
        let (k, v) = pair.trim().split_once('=')?;
        (k == name).then_some(v)
    })
}

/// Parse query string into key-value pairs.
pub fn parse_query(url: &str) -> HashMap<String, String> {
    let mut params = HashMap::new();
    if let Some(qs) = url.split('?').nth(1) {
        for pair in qs.split('&') {
            let mut kv = pair.splitn(2, '=');
            if let (Some(k), Some(v)) = (kv.next(), kv.next()) {
                params.insert(urldecode(k), urldecode(v));
            }
        }
    }
    params
}

/// Minimal URL decode (%XX and +). A `%` not followed by two hex digits is kept as is.
pub fn urldecode(s: &str) -> String {
    let mut result = Vec::new();
    let bytes = s.as_bytes();
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'%'
            && i + 2 < bytes.len()
            && bytes[i + 1].is_ascii_hexdigit()
            && bytes[i + 2].is_ascii_hexdigit()
        {
            if let Ok(val) = u8::from_str_radix(&String::from_utf8_lossy(&bytes[i + 1..i + 3]), 16) {
                result.push(val);
                i += 3;
                continue;
            }
        }
        if bytes[i] == b'+' {
            result.push(b' ');
        } else {
            result.push(bytes[i]);
        }
        i += 1;
    }
    String::from_utf8_lossy(&result).to_string()
}

/// Validate that a relative path doesn't escape the base dir.
pub fn safe_path(base: &Path, relative: &str) -> Option<PathBuf> {
    let clean = relative.replace('\\', "/");
    if clean.is_empty() || clean.starts_with('/') || clean.contains("..") {
        return None;
    }
    let full = base.join(&clean);
    if full.starts_with(base) {
        Some(full)
    } else {
        None
    }
}

/// Only same-site absolute paths are accepted as redirect targets.
fn safe_next(next: Option<&String>, lang: Lang) -> String {
    match next {
        Some(n) if n.starts_with('/') && !n.starts_with("//") && !n.contains('\\') => n.clone(),
        _ => format!("/{lang}/gallery"),
    }
}

/// Strong validator for a file, from its size and modification time.
fn file_etag(meta: &std::fs::Metadata) -> String {
    let mut hasher = blake3::Hasher::new();
    hasher.update(&meta.len().to_le_bytes());
    if let Some(nanos) = meta
        .modified()
        .ok()
        .and_then(|m| m.duration_since(UNIX_EPOCH).ok())
        .map(|d| d.as_nanos())
    {
        hasher.update(&nanos.to_le_bytes());
    }
    format!("\"{}\"", &hasher.finalize().to_hex()[..16])
}

fn body_etag(body: &str) -> String {
    format!("\"{}\"", &blake3::hash(body.as_bytes()).to_hex()[..16])
}

fn send_html(req: Request, status: u16, html: &str, if_none_match: Option<&str>) {
    let etag = body_etag(html);
    if status == 200 && if_none_match == Some(etag.as_str()) {
        send(req, with_header(Response::empty(StatusCode(304)), "ETag", &etag));
        return;
    }
    let resp = Response::from_string(html).with_status_code(StatusCode(status));
    let resp = with_header(resp, "Content-Type", "text/html; charset=utf-8");
    send(req, with_header(resp, "ETag", &etag));
}

fn send_file(req: Request, path: &Path, if_none_match: Option<&str>) {
    let file = match std::fs::File::open(path) {
        Ok(f) => f,
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "cannot open file");
            send(req, json_error(500, "cannot read file"));
            return;
        }
    };
    let meta = file.metadata().ok();
    let etag = meta.as_ref().map(file_etag);
    if let Some(tag) = etag.as_deref().filter(|t| Some(*t) == if_none_match) {
        send(req, with_header(Response::empty(StatusCode(304)), "ETag", tag));
        return;
    }
    let len = meta.map(|m| m.len()).unwrap_or(0);
    let mut resp = Response::from_file(file);
    resp = with_header(resp, "Content-Type", mime_type(path));
    resp = with_header(resp, "Content-Length", &len.to_string());
    if let Some(etag) = etag {
        resp = with_header(resp, "ETag", &etag);
    }
    send(req, resp);
}

fn not_found(req: Request, state: &ServerState, lang: Lang) {
    let html = render::render_not_found(lang, &state.page_context());
    send_html(req, 404, &html, None);
}

/// Language of a request: the language cookie, else the configured default.
fn request_lang(req: &Request, state: &ServerState) -> Lang {
    header_value(req, "Cookie")
        .and_then(|h| parse_cookie(h, LANG_KEY))
        .and_then(Lang::parse)
        .unwrap_or(state.config.default_lang)
}

fn selection_from(query: &HashMap<String, String>) -> FilterSelection {
    FilterSelection::from_params(
        query.get("category").map(String::as_str),
        query.get("year").map(String::as_str),
    )
}

/// Lightbox navigation sent as raw input instead of a followed link:
/// `key=<KeyboardEvent.key>` or `swipe=<startX>,<endX>`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LightboxCommand {
    Key(Key),
    Swipe(Option<Swipe>),
}

impl LightboxCommand {
    fn from_query(query: &HashMap<String, String>) -> Option<Self> {
        if let Some(name) = query.get("key") {
            return Some(Self::Key(Key::from_name(name)));
        }
        let (start, end) = query.get("swipe")?.split_once(',')?;
        let mut tracker = SwipeTracker::default();
        tracker.touch_start(start.trim().parse().ok()?);
        Some(Self::Swipe(tracker.touch_end(end.trim().parse().ok()?)))
    }

    fn apply(self, lightbox: &mut Lightbox) -> bool {
        match self {
            Self::Key(key) => lightbox.handle_key(key),
            Self::Swipe(swipe) => lightbox.handle_swipe(swipe),
        }
    }
}

/// Where an open album lightbox ends up after `command`: the new media page,
/// or the album page once closed. `None` when the album or index is unknown.
fn album_navigation(
    snapshot: &Snapshot,
    lang: Lang,
    id: &str,
    index: usize,
    selection: &FilterSelection,
    command: LightboxCommand,
) -> Option<String> {
    let mut ctrl = snapshot.gallery_controller(lang);
    ctrl.set_selection(selection.clone());
    ctrl.open_album(id).ok()?;
    ctrl.open_media(index).then_some(())?;
    command.apply(ctrl.lightbox_mut());
    let page = match ctrl.lightbox().current_index() {
        Some(i) => Page::Media(id, i),
        None => Page::Album(id),
    };
    Some(render::server_path(lang, page, selection))
}

fn achievement_navigation(snapshot: &Snapshot, lang: Lang, index: usize, command: LightboxCommand) -> Option<String> {
    let mut ctrl = snapshot.achievements_controller(lang);
    ctrl.lightbox_mut().open(index).then_some(())?;
    command.apply(ctrl.lightbox_mut());
    let page = match ctrl.lightbox().current_index() {
        Some(i) => Page::Achievement(i),
        None => Page::Achievements,
    };
    Some(render::server_path(lang, page, &FilterSelection::default()))
}

fn send_navigation(req: Request, state: &ServerState, lang: Lang, target: Option<String>) {
    match target {
        Some(location) => send(req, redirect(303, &location)),
        None => not_found(req, state, lang),
    }
}

/// Handle a single HTTP request.
pub fn handle_request(req: Request, state: &ServerState) {
    let url = req.url().to_string();
    let path = url.split('?').next().unwrap_or(&url);
    if *req.method() != Method::Get {
        send(req, json_error(405, "method not allowed"));
        return;
    }
    let query = parse_query(&url);
    let if_none_match = header_value(&req, "If-None-Match").map(str::to_string);
    let if_none_match = if_none_match.as_deref();
    let ctx = state.page_context();

    match route(path) {
        Route::Root => {
            let lang = request_lang(&req, state);
            send(req, redirect(302, &format!("/{lang}/gallery")));
        }

        // Pages are cached under their canonical path; selections naming
        // unknown categories or years render uncached.
        Route::Gallery(lang) => {
            let snapshot = state.content();
            let selection = selection_from(&query);
            let key = selection
                .is_known(&snapshot.gallery)
                .then(|| render::server_path(lang, Page::Gallery, &selection));
            let page = state.page(&snapshot, key, || {
                let mut ctrl = snapshot.gallery_controller(lang);
                ctrl.set_selection(selection.clone());
                Some(render::render_gallery(&ctrl, &ctx))
            });
            match page {
                Some(html) => send_html(req, 200, &html, if_none_match),
                None => not_found(req, state, lang),
            }
        }

        Route::Album { lang, id, index } => {
            let snapshot = state.content();
            let selection = selection_from(&query);
            if let (Some(i), Some(command)) = (index, LightboxCommand::from_query(&query)) {
                let target = album_navigation(&snapshot, lang, &id, i, &selection, command);
                send_navigation(req, state, lang, target);
                return;
            }
            let key = selection.is_known(&snapshot.gallery).then(|| {
                let page = match index {
                    Some(i) => Page::Media(&id, i),
                    None => Page::Album(&id),
                };
                render::server_path(lang, page, &selection)
            });
            let page = state.page(&snapshot, key, || {
                let mut ctrl = snapshot.gallery_controller(lang);
                ctrl.set_selection(selection.clone());
                ctrl.open_album(&id).ok()?;
                if let Some(i) = index {
                    ctrl.open_media(i).then_some(())?;
                }
                Some(render::render_gallery(&ctrl, &ctx))
            });
            match page {
                Some(html) => send_html(req, 200, &html, if_none_match),
                None => not_found(req, state, lang),
            }
        }

        Route::Achievements { lang, index } => {
            let snapshot = state.content();
            if let (Some(i), Some(command)) = (index, LightboxCommand::from_query(&query)) {
                let target = achievement_navigation(&snapshot, lang, i, command);
                send_navigation(req, state, lang, target);
                return;
            }
            let page_id = match index {
                Some(i) => Page::Achievement(i),
                None => Page::Achievements,
            };
            let key = render::server_path(lang, page_id, &FilterSelection::default());
            let page = state.cached_page(&snapshot, &key, || {
                let mut ctrl = snapshot.achievements_controller(lang);
                if let Some(i) = index {
                    ctrl.lightbox_mut().open(i).then_some(())?;
                }
                Some(render::render_achievements(&ctrl, &ctx))
            });
            match page {
                Some(html) => send_html(req, 200, &html, if_none_match),
                None => not_found(req, state, lang),
            }
        }

        Route::NotFound(lang) => not_found(req, state, lang),

        // Remember the choice in a cookie and go back to where the user was.
        Route::SetLanguage(code) => {
            let Some(lang) = Lang::parse(code) else {
                let lang = request_lang(&req, state);
                not_found(req, state, lang);
                return;
            };
            let target = safe_next(query.get("next"), lang);
            let cookie = format!(
                "{LANG_KEY}={}; Path=/; Max-Age={COOKIE_MAX_AGE}; SameSite=Lax",
                lang.code()
            );
            let resp = with_header(redirect(303, &target), "Set-Cookie", &cookie);
            tracing::debug!(lang = lang.code(), "language cookie set");
            send(req, resp);
        }

        Route::ApiGallery => {
            let lang = query
                .get("lang")
                .and_then(|l| Lang::parse(l))
                .unwrap_or_else(|| request_lang(&req, state));
            let snapshot = state.content();
            let mut ctrl = snapshot.gallery_controller(lang);
            ctrl.set_selection(selection_from(&query));
            send(req, json_response(200, &gallery_json(&ctrl)));
        }

        Route::Thumb(rel) => {
            let rel = urldecode(rel);
            let Some(full_path) = safe_path(&state.config.root, &rel) else {
                send(req, json_error(400, "invalid path"));
                return;
            };
            if !full_path.is_file() {
                send(req, json_error(404, "file not found"));
                return;
            }
            // Fall back to the original on error or unsupported format
            let serve_path = match thumb::get_or_create_thumb(&state.config.root, &state.config.root, &rel) {
                Ok(Some(thumb_path)) => thumb_path,
                Ok(None) => full_path,
                Err(e) => {
                    tracing::warn!(rel = rel.as_str(), error = %e, "thumbnail failed");
                    full_path
                }
            };
            send_file(req, &serve_path, if_none_match);
        }

        Route::Static(rel) => {
            let rel = urldecode(rel);
            match safe_path(&state.config.root, &rel) {
                Some(full_path) if full_path.is_file() => send_file(req, &full_path, if_none_match),
                Some(_) => {
                    let lang = request_lang(&req, state);
                    not_found(req, state, lang);
                }
                None => send(req, json_error(400, "invalid path")),
            }
        }
    }
}

/// The filtered album list as served by `/api/gallery`.
fn gallery_json(ctrl: &GalleryController) -> serde_json::Value {
    let lang = ctrl.lang();
    let store = ctrl.store();
    let albums: Vec<serde_json::Value> = ctrl
        .visible_albums()
        .into_iter()
        .map(|a| {
            serde_json::json!({
                "id": a.id,
                "category": a.category,
                "categoryName": store.category_name(&a.category, lang),
                "year": a.year,
                "title": resolve(&a.title, lang),
                "date": a.date,
                "featuredImage": a.featured_image,
                "photos": a.images.len(),
                "videos": a.videos.len(),
            })
        })
        .collect();
    let selection = ctrl.selection();
    serde_json::json!({
        "lang": lang,
        "category": selection.category_param(),
        "year": selection.year_param(),
        "count": albums.len(),
        "summary": filter::results_count(albums.len(), lang),
        "error": ctrl.load_error(),
        "albums": albums,
    })
}

/// Start the HTTP server; Ctrl+C stops it.
pub fn run_serve(config: SiteConfig) -> Result<()> {
    let state = ServerState::new(config)?;

    // Pre-generate thumbnails in the background
    let sources = thumb::thumbnail_sources(&state.content().gallery);
    thumb::spawn_prewarm(state.config.root.clone(), sources);

    let addr = state.config.bind_addr();
    let server = Arc::new(
        Server::http(&addr).map_err(|e| anyhow::anyhow!("Cannot start server on {addr}: {e}"))?,
    );

    let stopping = Arc::new(AtomicBool::new(false));
    {
        let server = Arc::clone(&server);
        let stopping = Arc::clone(&stopping);
        ctrlc::set_handler(move || {
            stopping.store(true, Ordering::SeqCst);
            server.unblock();
        })?;
    }

    let lang = state.config.default_lang;
    println!(
        "  {} {} available at {}",
        console::style("✔").green().bold(),
        resolve(&state.config.site_name, lang),
        console::style(format!("http://localhost:{}/", state.config.port)).cyan().bold()
    );
    println!("  {} to stop", console::style("Ctrl+C").yellow().bold());
    tracing::info!(addr = addr.as_str(), root = %state.config.root.display(), "server started");

    for req in server.incoming_requests() {
        if stopping.load(Ordering::SeqCst) {
            break;
        }
        let state = Arc::clone(&state);
        std::thread::spawn(move || {
            handle_request(req, &state);
        });
    }

    println!("  {} server stopped", console::style("✔").green().bold());
    Ok(())
}
