use std::cell::RefCell;
use std::rc::{Rc, Weak};
use std::sync::Arc;

use crate::album::{AlbumDetail, MediaItem};
use crate::content::{Achievement, AchievementsStore, Album, ContentStore};
use crate::error::GalleryError;
use crate::filter::{self, FilterSelection};
use crate::i18n::{Lang, resolve};
use crate::language::{LanguageState, SubscriptionId};
use crate::lightbox::Lightbox;

/// Anything that re-renders its text when the display language changes.
pub trait Relocalize {
    fn language_changed(&mut self, lang: Lang);
}

/// Subscribe `target` to `language`. The subscription holds a weak reference,
/// so dropping the controller silently ends it.
pub fn follow_language<C>(language: &mut LanguageState, target: &Rc<RefCell<C>>) -> SubscriptionId
where
    C: Relocalize + 'static,
{
    let weak: Weak<RefCell<C>> = Rc::downgrade(target);
    language.subscribe(move |lang| {
        if let Some(target) = weak.upgrade() {
            target.borrow_mut().language_changed(lang);
        }
    })
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ViewMode {
    Grid,
    Detail(String),
}

/// Owner of the gallery page state: filters, view mode, open album and lightbox.
#[derive(Debug)]
pub struct GalleryController {
    store: Arc<ContentStore>,
    load_error: Option<String>,
    lang: Lang,
    selection: FilterSelection,
    view: ViewMode,
    detail: Option<AlbumDetail>,
    lightbox: Lightbox,
}

impl GalleryController {
    pub fn new(store: Arc<ContentStore>, lang: Lang) -> Self {
        Self {
            store,
            load_error: None,
            lang,
            selection: FilterSelection::default(),
            view: ViewMode::Grid,
            detail: None,
            lightbox: Lightbox::default(),
        }
    }

    /// Start from a load result; a failure leaves the store empty and is shown as an error panel.
    pub fn from_load(result: Result<ContentStore, GalleryError>, lang: Lang) -> Self {
        match result {
            Ok(store) => Self::new(Arc::new(store), lang),
            Err(err) => {
                tracing::warn!(error = %err, "gallery content unavailable");
                Self::new(Arc::new(ContentStore::empty()), lang).with_load_error(err.to_string())
            }
        }
    }

    pub fn with_load_error(mut self, message: String) -> Self {
        self.load_error = Some(message);
        self
    }

    pub fn load_error(&self) -> Option<&str> {
        self.load_error.as_deref()
    }

    pub fn store(&self) -> &ContentStore {
        &self.store
    }

    pub fn lang(&self) -> Lang {
        self.lang
    }

    pub fn selection(&self) -> &FilterSelection {
        &self.selection
    }

    pub fn view(&self) -> &ViewMode {
        &self.view
    }

    pub fn detail(&self) -> Option<&AlbumDetail> {
        self.detail.as_ref()
    }

    pub fn lightbox(&self) -> &Lightbox {
        &self.lightbox
    }

    pub fn lightbox_mut(&mut self) -> &mut Lightbox {
        &mut self.lightbox
    }

    /// Albums of the grid under the current selection.
    pub fn visible_albums(&self) -> Vec<&Album> {
        filter::apply(self.store.albums(), &self.selection)
    }

    pub fn set_selection(&mut self, selection: FilterSelection) {
        self.selection = selection;
    }

    pub fn reset_filters(&mut self) {
        self.selection = FilterSelection::default();
    }

    /// Switch to the detail view of `album_id`. On `NotFound` nothing changes.
    pub fn open_album(&mut self, album_id: &str) -> Result<(), GalleryError> {
        let detail = AlbumDetail::open(&self.store, album_id, self.lang)?;
        self.lightbox.load(detail.media.clone());
        self.view = ViewMode::Detail(detail.album_id.clone());
        self.detail = Some(detail);
        Ok(())
    }

    /// Back to the grid; the filter selection is kept.
    pub fn close_album(&mut self) {
        self.lightbox.load(Vec::new());
        self.detail = None;
        self.view = ViewMode::Grid;
    }

    /// Open the lightbox of the current album at `index`.
    pub fn open_media(&mut self, index: usize) -> bool {
        self.lightbox.open(index)
    }

    pub fn close_media(&mut self) -> bool {
        self.lightbox.close()
    }
}

impl Relocalize for GalleryController {
    fn language_changed(&mut self, lang: Lang) {
        self.lang = lang;
        let Some(current) = self.detail.as_ref() else {
            return;
        };
        if let Some(album) = self.store.album(&current.album_id) {
            let detail = AlbumDetail::build(&self.store, album, lang);
            self.lightbox.replace_items(detail.media.clone());
            self.detail = Some(detail);
        }
    }
}

/// Owner of the achievements album state.
#[derive(Debug)]
pub struct AchievementsController {
    store: Arc<AchievementsStore>,
    load_error: Option<String>,
    lang: Lang,
    lightbox: Lightbox,
}

impl AchievementsController {
    pub fn new(store: Arc<AchievementsStore>, lang: Lang) -> Self {
        let lightbox = Lightbox::new(achievement_items(store.entries(), lang));
        Self {
            store,
            load_error: None,
            lang,
            lightbox,
        }
    }

    pub fn from_load(result: Result<AchievementsStore, GalleryError>, lang: Lang) -> Self {
        match result {
            Ok(store) => Self::new(Arc::new(store), lang),
            Err(err) => {
                tracing::warn!(error = %err, "achievements content unavailable");
                Self::new(Arc::new(AchievementsStore::empty()), lang)
                    .with_load_error(err.to_string())
            }
        }
    }

    pub fn with_load_error(mut self, message: String) -> Self {
        self.load_error = Some(message);
        self
    }

    pub fn load_error(&self) -> Option<&str> {
        self.load_error.as_deref()
    }

    pub fn lang(&self) -> Lang {
        self.lang
    }

    pub fn store(&self) -> &AchievementsStore {
        &self.store
    }

    pub fn entries(&self) -> &[Achievement] {
        self.store.entries()
    }

    pub fn lightbox(&self) -> &Lightbox {
        &self.lightbox
    }

    pub fn lightbox_mut(&mut self) -> &mut Lightbox {
        &mut self.lightbox
    }

    /// The entry shown in the lightbox, if it is open.
    pub fn current_entry(&self) -> Option<&Achievement> {
        self.lightbox
            .current_index()
            .and_then(|i| self.store.entries().get(i))
    }
}

impl Relocalize for AchievementsController {
    fn language_changed(&mut self, lang: Lang) {
        self.lang = lang;
        self.lightbox
            .replace_items(achievement_items(self.store.entries(), lang));
    }
}

fn achievement_items(entries: &[Achievement], lang: Lang) -> Vec<MediaItem> {
    entries
        .iter()
        .map(|a| MediaItem::image(&a.image, resolve(&a.title, lang)))
        .collect()
}
