use anyhow::{Context, Result};
use log::{info, warn};
use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

pub const THEME_KEY: &str = "calculator-theme";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Theme {
    #[default]
    Amphora,
    Premium,
    Apple,
}

impl Theme {
    pub fn name(&self) -> &'static str {
        match self {
            Theme::Amphora => "amphora",
            Theme::Premium => "premium",
            Theme::Apple => "apple",
        }
    }

    /// Amphora switches to Premium; anything else goes back to Amphora.
    pub fn toggled(&self) -> Self {
        match self {
            Theme::Amphora => Theme::Premium,
            _ => Theme::Amphora,
        }
    }

    /// Developer-flavoured themes print `//` annotations next to figures.
    pub fn shows_annotations(&self) -> bool {
        !matches!(self, Theme::Apple)
    }
}

impl fmt::Display for Theme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Theme {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "amphora" => Ok(Theme::Amphora),
            "premium" => Ok(Theme::Premium),
            "apple" => Ok(Theme::Apple),
            other => anyhow::bail!("Unknown theme '{}'", other),
        }
    }
}

/// Durable string key-value storage for UI preferences.
pub trait KeyValueStore {
    fn get(&self, key: &str) -> Result<Option<String>>;
    fn set(&mut self, key: &str, value: &str) -> Result<()>;
}

#[derive(Debug, Default)]
pub struct MemoryStore {
    values: HashMap<String, String>,
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.values.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        self.values.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// Keys stored as one flat JSON object; the file is created on first write.
#[derive(Debug, Clone)]
pub struct FileStore {
    path: PathBuf,
}

impl FileStore {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_contents(&self) -> Result<Option<String>> {
        if !self.path.exists() {
            return Ok(None);
        }
        let contents = std::fs::read_to_string(&self.path)
            .with_context(|| format!("Failed to read {:?}", self.path))?;
        if contents.trim().is_empty() {
            return Ok(None);
        }
        Ok(Some(contents))
    }

    fn read_all(&self) -> Result<BTreeMap<String, String>> {
        match self.read_contents()? {
            Some(contents) => serde_json::from_str(&contents)
                .with_context(|| format!("Malformed store {:?}", self.path)),
            None => Ok(BTreeMap::new()),
        }
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.read_all()?.remove(key))
    }

    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        // Unreadable files fail the write; only a corrupt one is replaced
        let mut values: BTreeMap<String, String> = match self.read_contents()? {
            Some(contents) => serde_json::from_str(&contents).unwrap_or_else(|e| {
                warn!("Replacing malformed store {:?}: {}", self.path, e);
                BTreeMap::new()
            }),
            None => BTreeMap::new(),
        };
        values.insert(key.to_string(), value.to_string());

        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        std::fs::write(&self.path, serde_json::to_string_pretty(&values)?)
            .with_context(|| format!("Failed to write {:?}", self.path))
    }
}

/// The active theme, loaded once from a store and written back on change.
pub struct ThemeState<S: KeyValueStore> {
    store: S,
    theme: Theme,
}

impl<S: KeyValueStore> ThemeState<S> {
    pub fn load(store: S) -> Self {
        let theme = match store.get(THEME_KEY) {
            Ok(Some(saved)) => saved.parse::<Theme>().unwrap_or_else(|e| {
                warn!("{}, using {}", e, Theme::default());
                Theme::default()
            }),
            Ok(None) => Theme::default(),
            Err(e) => {
                warn!("Could not load theme preference: {:#}", e);
                Theme::default()
            }
        };
        info!("Theme: {}", theme);

        Self { store, theme }
    }

    pub fn theme(&self) -> Theme {
        self.theme
    }

    pub fn set(&mut self, theme: Theme) {
        self.theme = theme;
        if let Err(e) = self.store.set(THEME_KEY, theme.name()) {
            warn!("Could not save theme preference: {:#}", e);
        }
    }

    pub fn toggle(&mut self) -> Theme {
        self.set(self.theme.toggled());
        self.theme
    }

    pub fn into_store(self) -> S {
        self.store
    }
}
