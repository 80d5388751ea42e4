use chrono::{DateTime, NaiveDate, SubsecRound, Utc};
use serde::{Deserialize, Serialize};
use std::{collections::BTreeSet, fmt, str::FromStr};
use uuid::Uuid;

pub const DEFAULT_CATEGORY: &str = "Other";
pub const NEVER_DONE: &str = "never";
pub const DONE_TODAY: &str = "today";
pub const CHALLENGE_LENGTHS: [u32; 3] = [7, 21, 30];

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct HabitId(String);

impl HabitId {
    pub fn generate() -> Self {
        Self(format!("h_{}", Uuid::new_v4().simple()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for HabitId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for HabitId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl fmt::Display for HabitId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A tracked behavior, either recurring (`is_daily`) or one-off.
///
/// Stored records are checked on the way in, so a deserialized `Habit`
/// always has a non-empty name, a progress within 0..=100, and, when one-off,
/// a zero streak and no completion flag.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", try_from = "HabitRecord")]
pub struct Habit {
    pub id: HabitId,
    pub name: String,
    pub category: String,
    pub is_daily: bool,
    pub progress: u8,
    pub streak: u32,
    pub completed_today: bool,
    pub last_done: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub challenge: Option<Challenge>,
}

impl Habit {
    pub fn new(name: &str, category: &str, is_daily: bool, progress: i64) -> Self {
        Self {
            id: HabitId::generate(),
            name: name.trim().to_string(),
            category: normalize_category(Some(category)),
            is_daily,
            progress: progress.clamp(0, 100) as u8,
            streak: 0,
            completed_today: false,
            last_done: NEVER_DONE.to_string(),
            challenge: None,
        }
    }

    /// Built-in habits used when storage holds no habit list.
    pub fn seed() -> Vec<Habit> {
        let mut run = Habit::new("Morning run", "Fitness", true, 0);
        run.streak = 3;
        run.last_done = "2 days".to_string();

        let mut read = Habit::new("Read 30 min", "Study", true, 0);
        read.streak = 7;
        read.last_done = DONE_TODAY.to_string();

        let task = Habit::new("One-off Task", "Work", false, 0);

        vec![run, read, task]
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct HabitRecord {
    id: HabitId,
    name: String,
    #[serde(default)]
    category: Option<String>,
    #[serde(default)]
    is_daily: bool,
    #[serde(default)]
    progress: i64,
    #[serde(default)]
    streak: u32,
    #[serde(default)]
    completed_today: bool,
    #[serde(default)]
    last_done: Option<String>,
    #[serde(default)]
    challenge: Option<Challenge>,
}

impl TryFrom<HabitRecord> for Habit {
    type Error = String;

    fn try_from(record: HabitRecord) -> Result<Self, Self::Error> {
        let name = record.name.trim();
        if name.is_empty() {
            return Err(format!("habit {} has an empty name", record.id));
        }
        if !(0..=100).contains(&record.progress) {
            return Err(format!(
                "habit {} has progress {} outside 0-100",
                record.id, record.progress
            ));
        }

        Ok(Self {
            name: name.to_string(),
            category: normalize_category(record.category.as_deref()),
            is_daily: record.is_daily,
            progress: record.progress as u8,
            streak: if record.is_daily { record.streak } else { 0 },
            completed_today: record.is_daily && record.completed_today,
            last_done: record.last_done.unwrap_or_else(|| NEVER_DONE.to_string()),
            challenge: record.challenge,
            id: record.id,
        })
    }
}

fn normalize_category(category: Option<&str>) -> String {
    match category.map(str::trim) {
        Some(value) if !value.is_empty() => value.to_string(),
        _ => DEFAULT_CATEGORY.to_string(),
    }
}

/// Side-tracking attached to a habit. Recorded only; nothing advances it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Challenge {
    pub length: u32,
    #[serde(alias = "started", with = "chrono::serde::ts_milliseconds")]
    pub started_at: DateTime<Utc>,
    #[serde(default)]
    pub progress: u32,
}

impl Challenge {
    pub fn start(requested_length: u32, started_at: DateTime<Utc>) -> Self {
        let length = if CHALLENGE_LENGTHS.contains(&requested_length) {
            requested_length
        } else {
            CHALLENGE_LENGTHS[0]
        };
        Self {
            length,
            started_at: started_at.trunc_subsecs(3),
            progress: 0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum Mood {
    Frustrated = 1,
    Down = 2,
    Neutral = 3,
    Happy = 4,
}

impl Mood {
    pub fn level(self) -> u8 {
        self as u8
    }
}

impl TryFrom<u8> for Mood {
    type Error = String;

    fn try_from(level: u8) -> Result<Self, Self::Error> {
        match level {
            1 => Ok(Mood::Frustrated),
            2 => Ok(Mood::Down),
            3 => Ok(Mood::Neutral),
            4 => Ok(Mood::Happy),
            other => Err(format!("mood must be between 1 and 4, got {other}")),
        }
    }
}

impl From<Mood> for u8 {
    fn from(mood: Mood) -> Self {
        mood.level()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    Default,
    Ocean,
    Midnight,
    Sunset,
}

impl Theme {
    /// Themes every profile owns without spending coins.
    pub const FREE: [Theme; 3] = [Theme::Default, Theme::Ocean, Theme::Midnight];
    /// Theme granted by the reward claim.
    pub const REWARD: Theme = Theme::Sunset;

    pub fn as_str(self) -> &'static str {
        match self {
            Theme::Default => "default",
            Theme::Ocean => "ocean",
            Theme::Midnight => "midnight",
            Theme::Sunset => "sunset",
        }
    }
}

impl FromStr for Theme {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim() {
            "default" => Ok(Theme::Default),
            "ocean" => Ok(Theme::Ocean),
            "midnight" => Ok(Theme::Midnight),
            "sunset" => Ok(Theme::Sunset),
            other => Err(format!("unknown theme '{other}'")),
        }
    }
}

impl fmt::Display for Theme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Profile {
    pub experience: u64,
    pub coins: u64,
    pub mood: Option<Mood>,
    pub unlocked_themes: BTreeSet<Theme>,
    pub selected_theme: Theme,
    /// `None` until the first daily check records a day.
    pub last_active_day: Option<NaiveDate>,
}

impl Profile {
    pub fn owns(&self, theme: Theme) -> bool {
        theme == Theme::Default || self.unlocked_themes.contains(&theme)
    }
}

impl Default for Profile {
    fn default() -> Self {
        Self {
            experience: 0,
            coins: 0,
            mood: None,
            unlocked_themes: Theme::FREE.into_iter().collect(),
            selected_theme: Theme::Default,
            last_active_day: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TrackerData {
    pub habits: Vec<Habit>,
    pub profile: Profile,
}

impl TrackerData {
    pub fn habit(&self, id: &HabitId) -> Option<&Habit> {
        self.habits.iter().find(|habit| &habit.id == id)
    }
}

impl Default for TrackerData {
    fn default() -> Self {
        Self {
            habits: Habit::seed(),
            profile: Profile::default(),
        }
    }
}

/// One-way message for the view layer, shown for roughly `duration_ms`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notice {
    pub message: String,
    pub duration_ms: u64,
}

#[derive(Debug, Deserialize)]
pub struct NewHabitRequest {
    pub name: String,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub start_progress: Option<i64>,
    #[serde(default)]
    pub is_daily: Option<bool>,
}

#[derive(Debug, Deserialize)]
pub struct ChallengeRequest {
    #[serde(default)]
    pub length: Option<u32>,
}

#[derive(Debug, Default, Deserialize)]
pub struct ClaimRequest {
    #[serde(default)]
    pub theme: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ThemeRequest {
    pub theme: String,
}

#[derive(Debug, Deserialize)]
pub struct MoodRequest {
    pub mood: u8,
}

#[derive(Debug, Default, Deserialize)]
pub struct ListQuery {
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub search: Option<String>,
    #[serde(default)]
    pub focus: Option<bool>,
}

#[derive(Debug, Serialize)]
pub struct StateResponse {
    pub habits: Vec<Habit>,
    pub experience: u64,
    pub coins: u64,
    pub mood: Option<Mood>,
    pub unlocked_themes: Vec<Theme>,
    pub selected_theme: Theme,
    pub last_active_day: Option<String>,
    pub best_streak: u32,
    pub xp_meter: f64,
    pub notices: Vec<Notice>,
}

#[derive(Debug, Serialize)]
pub struct ActionResponse<T> {
    pub result: T,
    pub state: StateResponse,
}
