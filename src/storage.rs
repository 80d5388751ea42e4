use crate::errors::HabitError;
use crate::models::{Habit, Mood, Profile, Theme, TrackerData};
use chrono::NaiveDate;
use std::{
    collections::{BTreeMap, BTreeSet},
    fs, io,
    path::{Path, PathBuf},
};
use tracing::warn;

pub const HABITS_KEY: &str = "ht_habits_v1";
pub const EXPERIENCE_KEY: &str = "ht_xp_v1";
pub const COINS_KEY: &str = "ht_coins_v1";
pub const MOOD_KEY: &str = "ht_mood_v1";
pub const THEMES_KEY: &str = "ht_themes_v1";
pub const LAST_DAY_KEY: &str = "ht_last_login_v1";
pub const THEME_CHOICE_KEY: &str = "ht_theme_choice";

/// String-keyed, string-valued slots that survive restarts.
pub trait KeyValueStore: Send {
    fn get(&self, key: &str) -> Option<String>;

    /// Writes every entry in one batch; either all land or none do.
    fn set_all(&mut self, entries: Vec<(&'static str, String)>) -> io::Result<()>;
}

#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    slots: BTreeMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_slot(mut self, key: &str, value: impl Into<String>) -> Self {
        self.slots.insert(key.to_string(), value.into());
        self
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        self.slots.get(key).cloned()
    }

    fn set_all(&mut self, entries: Vec<(&'static str, String)>) -> io::Result<()> {
        for (key, value) in entries {
            self.slots.insert(key.to_string(), value);
        }
        Ok(())
    }
}

/// Slots kept as one JSON object on disk, rewritten on every batch.
#[derive(Debug)]
pub struct FileStore {
    path: PathBuf,
    slots: BTreeMap<String, String>,
}

impl FileStore {
    pub fn open(path: &Path) -> Self {
        Self::from_read(path, fs::read(path))
    }

    /// Same as [`FileStore::open`], reading the file on the async runtime.
    pub async fn load(path: &Path) -> Self {
        Self::from_read(path, tokio::fs::read(path).await)
    }

    fn from_read(path: &Path, read: io::Result<Vec<u8>>) -> Self {
        let slots = match read {
            Ok(bytes) => match serde_json::from_slice(&bytes) {
                Ok(slots) => slots,
                Err(err) => {
                    warn!("failed to parse data file: {err}");
                    BTreeMap::new()
                }
            },
            Err(err) if err.kind() == io::ErrorKind::NotFound => BTreeMap::new(),
            Err(err) => {
                warn!("failed to read data file: {err}");
                BTreeMap::new()
            }
        };

        Self {
            path: path.to_path_buf(),
            slots,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Option<String> {
        self.slots.get(key).cloned()
    }

    fn set_all(&mut self, entries: Vec<(&'static str, String)>) -> io::Result<()> {
        let mut next = self.slots.clone();
        for (key, value) in entries {
            next.insert(key.to_string(), value);
        }

        let payload = serde_json::to_vec_pretty(&next)?;
        let staging = self.path.with_extension("tmp");
        fs::write(&staging, payload)?;
        fs::rename(&staging, &self.path)?;

        self.slots = next;
        Ok(())
    }
}

/// Rebuilds tracker state from the slots. Absent or malformed slots fall back
/// to their defaults one by one.
pub fn load_data(store: &dyn KeyValueStore) -> TrackerData {
    let habits = read_slot(store, HABITS_KEY, |raw| {
        serde_json::from_str::<Vec<Habit>>(raw).map_err(|err| err.to_string())
    })
    .unwrap_or_else(Habit::seed);

    let experience = read_slot(store, EXPERIENCE_KEY, parse_counter).unwrap_or(0);
    let coins = read_slot(store, COINS_KEY, parse_counter).unwrap_or(0);
    let mood = read_slot(store, MOOD_KEY, parse_mood).flatten();

    let mut unlocked_themes = read_slot(store, THEMES_KEY, parse_themes).unwrap_or_default();
    unlocked_themes.extend(Theme::FREE);

    let last_active_day = read_slot(store, LAST_DAY_KEY, |raw| {
        raw.trim()
            .parse::<NaiveDate>()
            .map_err(|err| err.to_string())
    });

    let mut profile = Profile {
        experience,
        coins,
        mood,
        unlocked_themes,
        selected_theme: Theme::Default,
        last_active_day,
    };
    if let Some(choice) = read_slot(store, THEME_CHOICE_KEY, |raw| raw.parse::<Theme>()) {
        if profile.owns(choice) {
            profile.selected_theme = choice;
        } else {
            warn!("stored theme choice '{choice}' is not unlocked, using default");
        }
    }

    TrackerData { habits, profile }
}

/// Writes every slot for `data` as a single batch.
pub fn persist_data(store: &mut dyn KeyValueStore, data: &TrackerData) -> Result<(), HabitError> {
    let profile = &data.profile;
    let themes: Vec<&str> = profile
        .unlocked_themes
        .iter()
        .map(|theme| theme.as_str())
        .collect();

    let mut entries = vec![
        (HABITS_KEY, serde_json::to_string(&data.habits)?),
        (EXPERIENCE_KEY, profile.experience.to_string()),
        (COINS_KEY, profile.coins.to_string()),
        (
            MOOD_KEY,
            profile
                .mood
                .map(|mood| mood.level().to_string())
                .unwrap_or_default(),
        ),
        (THEMES_KEY, serde_json::to_string(&themes)?),
        (THEME_CHOICE_KEY, profile.selected_theme.to_string()),
    ];
    if let Some(day) = profile.last_active_day {
        entries.push((LAST_DAY_KEY, date_key(day)));
    }

    store.set_all(entries)?;
    Ok(())
}

pub fn date_key(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

fn read_slot<T>(
    store: &dyn KeyValueStore,
    key: &str,
    parse: impl FnOnce(&str) -> Result<T, String>,
) -> Option<T> {
    let raw = store.get(key)?;
    match parse(&raw) {
        Ok(value) => Some(value),
        Err(err) => {
            warn!("ignoring malformed storage slot {key}: {err}");
            None
        }
    }
}

fn parse_counter(raw: &str) -> Result<u64, String> {
    raw.trim().parse::<u64>().map_err(|err| err.to_string())
}

fn parse_mood(raw: &str) -> Result<Option<Mood>, String> {
    let raw = raw.trim();
    if raw.is_empty() || raw == "null" {
        return Ok(None);
    }
    let level = raw.parse::<u8>().map_err(|err| err.to_string())?;
    Mood::try_from(level).map(Some)
}

fn parse_themes(raw: &str) -> Result<BTreeSet<Theme>, String> {
    let names: Vec<String> = serde_json::from_str(raw).map_err(|err| err.to_string())?;
    Ok(names
        .iter()
        .filter_map(|name| match name.parse::<Theme>() {
            Ok(theme) => Some(theme),
            Err(err) => {
                warn!("dropping stored theme: {err}");
                None
            }
        })
        .collect())
}
