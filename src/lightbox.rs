use crate::album::MediaItem;

/// Minimum horizontal travel, in logical pixels, for a touch to count as a swipe.
pub const SWIPE_THRESHOLD: f32 = 50.0;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LightboxState {
    Closed,
    Open(usize),
}

/// Keys the lightbox listens to while open.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Key {
    Escape,
    ArrowLeft,
    ArrowRight,
    Other,
}

impl Key {
    /// Map a DOM `KeyboardEvent.key` value.
    pub fn from_name(name: &str) -> Key {
        match name {
            "Escape" | "Esc" => Key::Escape,
            "ArrowLeft" | "Left" => Key::ArrowLeft,
            "ArrowRight" | "Right" => Key::ArrowRight,
            _ => Key::Other,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Swipe {
    /// Finger moved right to left: show the next item.
    Left,
    /// Finger moved left to right: show the previous item.
    Right,
}

/// Tracks one touch gesture from start to end.
#[derive(Debug, Default)]
pub struct SwipeTracker {
    start_x: Option<f32>,
}

impl SwipeTracker {
    pub fn touch_start(&mut self, x: f32) {
        self.start_x = Some(x);
    }

    /// Finish the gesture. Travel up to the threshold is a tap and gives `None`.
    pub fn touch_end(&mut self, x: f32) -> Option<Swipe> {
        let start = self.start_x.take()?;
        let delta = start - x;
        if delta.abs() <= SWIPE_THRESHOLD {
            None
        } else if delta > 0.0 {
            Some(Swipe::Left)
        } else {
            Some(Swipe::Right)
        }
    }
}

/// Full-screen viewer over a media sequence.
///
/// `Open(i)` always satisfies `i < items.len()`. Entering `Open` from `Closed`
/// locks background scrolling and leaving it unlocks; retargeting an open
/// lightbox leaves the lock alone. A video plays only while it is the current
/// item of an open lightbox.
#[derive(Debug)]
pub struct Lightbox {
    state: LightboxState,
    items: Vec<MediaItem>,
    scroll_locked: bool,
    playing: Option<usize>,
}

impl Default for Lightbox {
    fn default() -> Self {
        Self::new(Vec::new())
    }
}

impl Lightbox {
    pub fn new(items: Vec<MediaItem>) -> Self {
        Self {
            state: LightboxState::Closed,
            items,
            scroll_locked: false,
            playing: None,
        }
    }

    pub fn state(&self) -> LightboxState {
        self.state
    }

    pub fn is_open(&self) -> bool {
        matches!(self.state, LightboxState::Open(_))
    }

    pub fn current_index(&self) -> Option<usize> {
        match self.state {
            LightboxState::Open(i) => Some(i),
            LightboxState::Closed => None,
        }
    }

    pub fn current(&self) -> Option<&MediaItem> {
        self.current_index().and_then(|i| self.items.get(i))
    }

    pub fn items(&self) -> &[MediaItem] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn is_scroll_locked(&self) -> bool {
        self.scroll_locked
    }

    /// Index of the video currently playing, if any.
    pub fn playing(&self) -> Option<usize> {
        self.playing
    }

    /// Load a new sequence (another album). Closes the lightbox first.
    pub fn load(&mut self, items: Vec<MediaItem>) {
        self.close();
        self.items = items;
    }

    /// Swap in a re-localized copy of the same sequence, keeping position and open state.
    /// A sequence of a different length is treated as [`Lightbox::load`].
    pub fn replace_items(&mut self, items: Vec<MediaItem>) {
        if items.len() != self.items.len() {
            self.load(items);
            return;
        }
        self.items = items;
    }

    /// Open at `index`, or retarget an open lightbox. Out-of-range indices and
    /// empty sequences leave the state untouched. Returns whether it moved.
    pub fn open(&mut self, index: usize) -> bool {
        if index >= self.items.len() {
            return false;
        }
        if !self.is_open() {
            self.scroll_locked = true;
        }
        self.show(index);
        true
    }

    pub fn next(&mut self) -> bool {
        let LightboxState::Open(i) = self.state else {
            return false;
        };
        let n = self.items.len();
        self.show((i + 1) % n);
        true
    }

    pub fn previous(&mut self) -> bool {
        let LightboxState::Open(i) = self.state else {
            return false;
        };
        let n = self.items.len();
        self.show((i + n - 1) % n);
        true
    }

    /// Close and stop any playing video. No-op when already closed.
    pub fn close(&mut self) -> bool {
        if !self.is_open() {
            return false;
        }
        self.playing = None;
        self.state = LightboxState::Closed;
        self.scroll_locked = false;
        true
    }

    /// Keyboard navigation; keys are ignored while closed.
    pub fn handle_key(&mut self, key: Key) -> bool {
        if !self.is_open() {
            return false;
        }
        match key {
            Key::Escape => self.close(),
            Key::ArrowLeft => self.previous(),
            Key::ArrowRight => self.next(),
            Key::Other => false,
        }
    }

    pub fn handle_swipe(&mut self, swipe: Option<Swipe>) -> bool {
        match swipe {
            Some(Swipe::Left) => self.next(),
            Some(Swipe::Right) => self.previous(),
            None => false,
        }
    }

    /// `"3 / 7"` style position, or `None` while closed.
    pub fn counter(&self) -> Option<String> {
        self.current_index()
            .map(|i| format!("{} / {}", i + 1, self.items.len()))
    }

    /// Indices that `previous()` and `next()` would move to, without moving.
    pub fn neighbors(&self) -> Option<(usize, usize)> {
        let i = self.current_index()?;
        let n = self.items.len();
        Some(((i + n - 1) % n, (i + 1) % n))
    }

    fn show(&mut self, index: usize) {
        self.state = LightboxState::Open(index);
        self.playing = self.items[index].is_video().then_some(index);
    }
}
