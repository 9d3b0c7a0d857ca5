use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

pub const PREFS_FILE: &str = ".club_site_prefs.json";

/// Key under which the selected language is stored.
pub const LANG_KEY: &str = "club-website-lang";

/// Small local key-value store, persisted as JSON next to the site content.
#[derive(Serialize, Deserialize, Default, Debug)]
pub struct Preferences {
    #[serde(default)]
    pub values: BTreeMap<String, String>,
    #[serde(skip)]
    path: Option<PathBuf>,
}

fn read_prefs(path: &Path) -> Result<Preferences> {
    let data = std::fs::read_to_string(path).context("Cannot read preferences file")?;
    serde_json::from_str(&data).context("Invalid preferences file")
}

impl Preferences {
    /// Load the store of a site directory. A missing file is an empty store,
    /// and so is one that cannot be read or parsed; the next save replaces it.
    pub fn load(dir: &Path) -> Self {
        let path = dir.join(PREFS_FILE);
        let mut prefs = if path.exists() {
            match read_prefs(&path) {
                Ok(prefs) => prefs,
                Err(e) => {
                    tracing::warn!(path = %path.display(), error = %format!("{e:#}"), "ignoring preferences file");
                    Preferences::default()
                }
            }
        } else {
            Preferences::default()
        };
        prefs.path = Some(path);
        prefs
    }

    /// Write the store back to where it was loaded from. In-memory stores are left alone.
    pub fn save(&self) -> Result<()> {
        let Some(path) = &self.path else {
            return Ok(());
        };
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json).context("Cannot save preferences")?;
        Ok(())
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.values.get(key).map(String::as_str)
    }

    pub fn set(&mut self, key: &str, value: &str) {
        self.values.insert(key.to_string(), value.to_string());
    }

    pub fn remove(&mut self, key: &str) {
        self.values.remove(key);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    static TEST_COUNTER: AtomicU32 = AtomicU32::new(0);

    fn tmpdir() -> std::path::PathBuf {
        let id = TEST_COUNTER.fetch_add(1, Ordering::SeqCst);
        let dir = std::env::temp_dir().join(format!(
            "club_site_prefs_test_{}_{id}",
            std::process::id()
        ));
        let _ = std::fs::remove_dir_all(&dir);
        std::fs::create_dir_all(&dir).unwrap();
        dir
    }

    #[test]
    fn set_and_get() {
        let mut prefs = Preferences::default();
        prefs.set(LANG_KEY, "en");
        assert_eq!(prefs.get(LANG_KEY), Some("en"));
    }

    #[test]
    fn overwrite_value() {
        let mut prefs = Preferences::default();
        prefs.set(LANG_KEY, "en");
        prefs.set(LANG_KEY, "bn");
        assert_eq!(prefs.get(LANG_KEY), Some("bn"));
    }

    #[test]
    fn remove_value() {
        let mut prefs = Preferences::default();
        prefs.set(LANG_KEY, "en");
        prefs.remove(LANG_KEY);
        assert_eq!(prefs.get(LANG_KEY), None);
    }

    #[test]
    fn get_unknown_key_is_none() {
        let prefs = Preferences::default();
        assert!(prefs.get("missing").is_none());
    }

    #[test]
    fn save_and_load_roundtrip() {
        let tmp = tmpdir();
        let mut prefs = Preferences::load(&tmp);
        prefs.set(LANG_KEY, "en");
        prefs.save().unwrap();

        let loaded = Preferences::load(&tmp);
        assert_eq!(loaded.get(LANG_KEY), Some("en"));
        let _ = std::fs::remove_dir_all(&tmp);
    }

    #[test]
    fn load_missing_file_returns_empty() {
        let prefs = Preferences::load(Path::new("/nonexistent"));
        assert!(prefs.values.is_empty());
    }

    #[test]
    fn corrupt_file_loads_empty_and_is_overwritten() {
        let tmp = tmpdir();
        std::fs::write(tmp.join(PREFS_FILE), "bad json").unwrap();
        let mut prefs = Preferences::load(&tmp);
        assert!(prefs.get(LANG_KEY).is_none());

        prefs.set(LANG_KEY, "en");
        prefs.save().unwrap();
        assert_eq!(Preferences::load(&tmp).get(LANG_KEY), Some("en"));
        let _ = std::fs::remove_dir_all(&tmp);
    }

    #[test]
    fn unreadable_file_loads_empty() {
        let tmp = tmpdir();
        std::fs::create_dir_all(tmp.join(PREFS_FILE)).unwrap();
        assert!(Preferences::load(&tmp).values.is_empty());
        let _ = std::fs::remove_dir_all(&tmp);
    }

    #[test]
    fn in_memory_save_is_noop() {
        let mut prefs = Preferences::default();
        prefs.set(LANG_KEY, "en");
        assert!(prefs.save().is_ok());
    }
}
