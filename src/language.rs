use anyhow::Result;

use crate::i18n::Lang;
use crate::prefs::{LANG_KEY, Preferences};

pub type SubscriptionId = usize;

type Listener = Box<dyn FnMut(Lang)>;

/// The selected display language plus everyone who needs to re-render when it changes.
///
/// Listeners are called synchronously, in subscription order, after the new
/// value has been persisted.
pub struct LanguageState {
    current: Lang,
    prefs: Option<Preferences>,
    listeners: Vec<(SubscriptionId, Listener)>,
    next_id: SubscriptionId,
}

impl LanguageState {
    /// A language state that is never persisted.
    pub fn new(lang: Lang) -> Self {
        Self {
            current: lang,
            prefs: None,
            listeners: Vec::new(),
            next_id: 0,
        }
    }

    /// Read the stored preference; absent or invalid values give Bengali.
    pub fn from_prefs(prefs: Preferences) -> Self {
        let current = Lang::from_pref(prefs.get(LANG_KEY));
        Self {
            current,
            prefs: Some(prefs),
            listeners: Vec::new(),
            next_id: 0,
        }
    }

    pub fn current(&self) -> Lang {
        self.current
    }

    pub fn subscribe<F>(&mut self, listener: F) -> SubscriptionId
    where
        F: FnMut(Lang) + 'static,
    {
        let id = self.next_id;
        self.next_id += 1;
        self.listeners.push((id, Box::new(listener)));
        id
    }

    /// Returns `false` if the id was not subscribed.
    #[cfg(test)]
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|(sid, _)| *sid != id);
        self.listeners.len() != before
    }

    #[cfg(test)]
    pub fn subscriber_count(&self) -> usize {
        self.listeners.len()
    }

    /// Switch language, persist it and notify listeners.
    /// Returns `Ok(false)` when `lang` is already selected. A failed save
    /// leaves both the selection and the stored value as they were.
    pub fn set_language(&mut self, lang: Lang) -> Result<bool> {
        if lang == self.current {
            return Ok(false);
        }
        if let Some(prefs) = self.prefs.as_mut() {
            let previous = prefs.get(LANG_KEY).map(str::to_string);
            prefs.set(LANG_KEY, lang.code());
            if let Err(e) = prefs.save() {
                match previous {
                    Some(value) => prefs.set(LANG_KEY, &value),
                    None => prefs.remove(LANG_KEY),
                }
                return Err(e);
            }
        }
        self.current = lang;
        tracing::debug!(lang = lang.code(), listeners = self.listeners.len(), "language changed");
        for (_, listener) in self.listeners.iter_mut() {
            listener(lang);
        }
        Ok(true)
    }

    /// Switch to the other language.
    pub fn toggle(&mut self) -> Result<Lang> {
        let next = self.current.other();
        self.set_language(next)?;
        Ok(next)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;
    use std::sync::atomic::{AtomicU32, Ordering};

    static TEST_COUNTER: AtomicU32 = AtomicU32::new(0);

    fn tmpdir() -> std::path::PathBuf {
        let id = TEST_COUNTER.fetch_add(1, Ordering::SeqCst);
        let dir = std::env::temp_dir().join(format!(
            "club_site_language_test_{}_{id}",
            std::process::id()
        ));
        let _ = std::fs::remove_dir_all(&dir);
        std::fs::create_dir_all(&dir).unwrap();
        dir
    }

    #[test]
    fn default_from_empty_prefs_is_bengali() {
        let state = LanguageState::from_prefs(Preferences::default());
        assert_eq!(state.current(), Lang::Bn);
    }

    #[test]
    fn invalid_stored_value_defaults_to_bengali() {
        let mut prefs = Preferences::default();
        prefs.set(LANG_KEY, "fr");
        assert_eq!(LanguageState::from_prefs(prefs).current(), Lang::Bn);
    }

    #[test]
    fn set_language_notifies_subscribers() {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let mut state = LanguageState::new(Lang::Bn);
        let sink = Rc::clone(&seen);
        state.subscribe(move |lang| sink.borrow_mut().push(lang));

        assert!(state.set_language(Lang::En).unwrap());
        assert_eq!(state.current(), Lang::En);
        assert_eq!(*seen.borrow(), vec![Lang::En]);
    }

    #[test]
    fn setting_same_language_is_noop() {
        let calls = Rc::new(RefCell::new(0));
        let mut state = LanguageState::new(Lang::Bn);
        let sink = Rc::clone(&calls);
        state.subscribe(move |_| *sink.borrow_mut() += 1);

        assert!(!state.set_language(Lang::Bn).unwrap());
        assert_eq!(*calls.borrow(), 0);
    }

    #[test]
    fn unsubscribe_stops_notifications() {
        let calls = Rc::new(RefCell::new(0));
        let mut state = LanguageState::new(Lang::Bn);
        let sink = Rc::clone(&calls);
        let id = state.subscribe(move |_| *sink.borrow_mut() += 1);

        assert!(state.unsubscribe(id));
        assert!(!state.unsubscribe(id));
        state.toggle().unwrap();
        assert_eq!(*calls.borrow(), 0);
        assert_eq!(state.subscriber_count(), 0);
    }

    #[test]
    fn listeners_run_in_subscription_order() {
        let order = Rc::new(RefCell::new(Vec::new()));
        let mut state = LanguageState::new(Lang::Bn);
        for name in ["gallery", "achievements"] {
            let sink = Rc::clone(&order);
            state.subscribe(move |_| sink.borrow_mut().push(name));
        }
        state.toggle().unwrap();
        assert_eq!(*order.borrow(), vec!["gallery", "achievements"]);
    }

    #[test]
    fn set_language_persists_choice() {
        let tmp = tmpdir();
        let mut state = LanguageState::from_prefs(Preferences::load(&tmp));
        state.set_language(Lang::En).unwrap();

        let reloaded = LanguageState::from_prefs(Preferences::load(&tmp));
        assert_eq!(reloaded.current(), Lang::En);
        let _ = std::fs::remove_dir_all(&tmp);
    }

    fn stored(state: &LanguageState) -> Option<&str> {
        state.prefs.as_ref().and_then(|p| p.get(LANG_KEY))
    }

    #[test]
    fn failed_save_changes_nothing() {
        let tmp = tmpdir();
        let path = tmp.join(crate::prefs::PREFS_FILE);
        std::fs::write(&path, r#"{"values": {"club-website-lang": "bn"}}"#).unwrap();
        let calls = Rc::new(RefCell::new(0));
        let mut state = LanguageState::from_prefs(Preferences::load(&tmp));
        let sink = Rc::clone(&calls);
        state.subscribe(move |_| *sink.borrow_mut() += 1);

        // A directory in place of the file makes every write fail
        std::fs::remove_file(&path).unwrap();
        std::fs::create_dir(&path).unwrap();
        assert!(state.set_language(Lang::En).is_err());
        assert_eq!(state.current(), Lang::Bn);
        assert_eq!(stored(&state), Some("bn"));
        assert_eq!(*calls.borrow(), 0);

        std::fs::remove_dir(&path).unwrap();
        assert!(state.set_language(Lang::En).unwrap());
        assert_eq!(Preferences::load(&tmp).get(LANG_KEY), Some("en"));
        let _ = std::fs::remove_dir_all(&tmp);
    }

    #[test]
    fn failed_first_save_leaves_no_value() {
        let tmp = tmpdir();
        let mut state = LanguageState::from_prefs(Preferences::load(&tmp));
        std::fs::create_dir(tmp.join(crate::prefs::PREFS_FILE)).unwrap();

        assert!(state.toggle().is_err());
        assert_eq!(state.current(), Lang::Bn);
        assert_eq!(stored(&state), None);
        let _ = std::fs::remove_dir_all(&tmp);
    }
}
