use crate::errors::HabitError;
use crate::models::{
    Challenge, DONE_TODAY, Habit, HabitId, Mood, NEVER_DONE, Notice, Theme, TrackerData,
};
use crate::storage::{KeyValueStore, load_data, persist_data};
use chrono::Utc;
use serde::Serialize;
use tracing::{error, info};

pub const EXPERIENCE_REWARD: u64 = 10;
pub const COIN_REWARD: u64 = 2;
pub const THEME_COST: u64 = 30;
pub const NOTICE_MS: u64 = 1400;

/// Input for [`HabitStore::add_habit`], as typed by the user.
#[derive(Debug, Clone)]
pub struct NewHabit {
    pub name: String,
    pub category: Option<String>,
    pub is_daily: bool,
    pub start_progress: i64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum Completion {
    /// A recurring habit was marked done for today.
    Completed { streak: u32 },
    /// A one-off habit was finished and removed.
    Removed,
    AlreadyCompleted,
    NotFound,
}

impl Completion {
    pub fn rewarded(self) -> bool {
        matches!(self, Completion::Completed { .. } | Completion::Removed)
    }
}

/// Owns the habit collection and profile, and writes both through to the
/// key-value backend at the end of every mutating operation.
pub struct HabitStore {
    data: TrackerData,
    backend: Box<dyn KeyValueStore>,
    notices: Vec<Notice>,
}

impl HabitStore {
    pub fn open(backend: Box<dyn KeyValueStore>) -> Self {
        let data = load_data(backend.as_ref());
        info!(
            "loaded {} habits, {} xp, {} coins",
            data.habits.len(),
            data.profile.experience,
            data.profile.coins
        );
        Self {
            data,
            backend,
            notices: Vec::new(),
        }
    }

    pub fn data(&self) -> &TrackerData {
        &self.data
    }

    pub fn habit(&self, id: &HabitId) -> Option<&Habit> {
        self.data.habit(id)
    }

    /// Writes the current state to the backend.
    pub fn commit(&mut self) -> Result<(), HabitError> {
        persist_data(self.backend.as_mut(), &self.data).inspect_err(|err| {
            error!("failed to persist habits: {err}");
        })
    }

    /// Applies `change` to a copy of the state and swaps it in only after the
    /// copy has been persisted, so a failed change leaves nothing behind.
    pub(crate) fn transact<T>(
        &mut self,
        change: impl FnOnce(&mut TrackerData) -> Result<T, HabitError>,
    ) -> Result<T, HabitError> {
        let mut draft = self.data.clone();
        let value = change(&mut draft)?;
        persist_data(self.backend.as_mut(), &draft).inspect_err(|err| {
            error!("failed to persist habits: {err}");
        })?;
        self.data = draft;
        Ok(value)
    }

    pub(crate) fn notify(&mut self, message: impl Into<String>, duration_ms: u64) {
        let message = message.into();
        info!("notice: {message}");
        self.notices.push(Notice {
            message,
            duration_ms,
        });
    }

    /// Drains notifications raised since the last call.
    pub fn take_notices(&mut self) -> Vec<Notice> {
        std::mem::take(&mut self.notices)
    }

    pub fn add_habit(&mut self, input: NewHabit) -> Result<Habit, HabitError> {
        let name = input.name.trim();
        if name.is_empty() {
            return Err(HabitError::validation("Please enter a habit name."));
        }
        if !(0..=100).contains(&input.start_progress) {
            return Err(HabitError::validation("Start progress must be 0-100."));
        }

        let habit = Habit::new(
            name,
            input.category.as_deref().unwrap_or_default(),
            input.is_daily,
            input.start_progress,
        );
        let added = habit.clone();
        self.transact(move |data| {
            data.habits.insert(0, habit);
            Ok(())
        })?;
        self.notify(format!("Habit added: {}", added.name), NOTICE_MS);
        Ok(added)
    }

    pub fn add_demo_habit(&mut self) -> Result<Habit, HabitError> {
        let habit = Habit::new("New Demo Habit", "Study", false, 0);
        let added = habit.clone();
        self.transact(move |data| {
            data.habits.insert(0, habit);
            Ok(())
        })?;
        self.notify("Demo habit added", NOTICE_MS);
        Ok(added)
    }

    /// Marks a habit done. Recurring habits complete once per day; one-off
    /// habits are removed. Rewards are granted only for those two outcomes.
    pub fn on_done(&mut self, id: &HabitId) -> Result<Completion, HabitError> {
        let Some(habit) = self.data.habit(id) else {
            return Ok(Completion::NotFound);
        };
        if habit.is_daily && habit.completed_today {
            return Ok(Completion::AlreadyCompleted);
        }

        let completion = self.transact(|data| {
            let completion = match data.habits.iter().position(|habit| &habit.id == id) {
                Some(index) if data.habits[index].is_daily => {
                    let habit = &mut data.habits[index];
                    habit.completed_today = true;
                    habit.streak = habit.streak.saturating_add(1);
                    habit.progress = 100;
                    habit.last_done = DONE_TODAY.to_string();
                    Completion::Completed {
                        streak: habit.streak,
                    }
                }
                Some(index) => {
                    data.habits.remove(index);
                    Completion::Removed
                }
                None => return Err(HabitError::validation(format!("habit {id} disappeared"))),
            };

            let profile = &mut data.profile;
            profile.experience = profile.experience.saturating_add(EXPERIENCE_REWARD);
            profile.coins = profile.coins.saturating_add(COIN_REWARD);
            Ok(completion)
        })?;

        match completion {
            Completion::Completed { .. } => {
                self.notify(format!("Daily task completed! +{EXPERIENCE_REWARD} XP"), NOTICE_MS)
            }
            Completion::Removed => self.notify(
                format!("Task completed & removed! +{EXPERIENCE_REWARD} XP"),
                NOTICE_MS,
            ),
            Completion::AlreadyCompleted | Completion::NotFound => {}
        }
        Ok(completion)
    }

    /// Spends [`THEME_COST`] coins on `theme`. Either both the spend and the
    /// unlock happen or neither does.
    pub fn unlock_theme(&mut self, theme: Theme) -> Result<Theme, HabitError> {
        let profile = &self.data.profile;
        if profile.owns(theme) {
            return Err(HabitError::AlreadyUnlocked(theme));
        }
        if profile.coins < THEME_COST {
            return Err(HabitError::InsufficientCoins {
                needed: THEME_COST,
                available: profile.coins,
            });
        }

        self.transact(|data| {
            data.profile.coins -= THEME_COST;
            data.profile.unlocked_themes.insert(theme);
            Ok(())
        })?;
        self.notify(format!("Reward claimed: {theme} theme unlocked!"), NOTICE_MS);
        Ok(theme)
    }

    pub fn claim_reward(&mut self) -> Result<Theme, HabitError> {
        self.unlock_theme(Theme::REWARD)
    }

    pub fn select_theme(&mut self, theme: Theme) -> Result<Theme, HabitError> {
        if !self.data.profile.owns(theme) {
            return Err(HabitError::ThemeLocked(theme));
        }
        self.transact(|data| {
            data.profile.selected_theme = theme;
            Ok(())
        })?;
        self.notify("Theme applied", NOTICE_MS);
        Ok(theme)
    }

    pub fn set_mood(&mut self, level: u8) -> Result<Mood, HabitError> {
        let mood = Mood::try_from(level).map_err(HabitError::Validation)?;
        self.transact(|data| {
            data.profile.mood = Some(mood);
            Ok(())
        })?;
        self.notify("Mood saved", NOTICE_MS);
        Ok(mood)
    }

    /// Attaches a challenge to a habit. Unknown ids are ignored.
    pub fn start_challenge(
        &mut self,
        id: &HabitId,
        length: u32,
    ) -> Result<Option<Challenge>, HabitError> {
        if self.data.habit(id).is_none() {
            return Ok(None);
        }

        let challenge = Challenge::start(length, Utc::now());
        let attached = challenge.clone();
        let name = self.transact(move |data| {
            let habit = data
                .habits
                .iter_mut()
                .find(|habit| &habit.id == id)
                .ok_or_else(|| HabitError::validation(format!("habit {id} disappeared")))?;
            habit.challenge = Some(challenge);
            Ok(habit.name.clone())
        })?;
        self.notify(
            format!("{}-day challenge started for {name}", attached.length),
            NOTICE_MS,
        );
        Ok(Some(attached))
    }

    /// Clears all progress, streaks, experience and coins. Themes are kept.
    pub fn reset_progress(&mut self) -> Result<(), HabitError> {
        self.transact(|data| {
            for habit in &mut data.habits {
                habit.progress = 0;
                habit.streak = 0;
                habit.last_done = NEVER_DONE.to_string();
                habit.completed_today = false;
            }
            data.profile.experience = 0;
            data.profile.coins = 0;
            Ok(())
        })?;
        self.notify("Day reset", NOTICE_MS);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::{COINS_KEY, HABITS_KEY, MemoryStore};
    use std::io;

    fn seeded() -> HabitStore {
        HabitStore::open(Box::new(MemoryStore::new()))
    }

    fn id_of(store: &HabitStore, name: &str) -> HabitId {
        store
            .data()
            .habits
            .iter()
            .find(|habit| habit.name == name)
            .map(|habit| habit.id.clone())
            .expect("missing habit")
    }

    struct FailingStore;

    impl KeyValueStore for FailingStore {
        fn get(&self, _key: &str) -> Option<String> {
            None
        }

        fn set_all(&mut self, _entries: Vec<(&'static str, String)>) -> io::Result<()> {
            Err(io::Error::other("disk full"))
        }
    }

    #[derive(Default)]
    struct CountingStore {
        writes: std::sync::Arc<std::sync::atomic::AtomicUsize>,
    }

    impl KeyValueStore for CountingStore {
        fn get(&self, _key: &str) -> Option<String> {
            None
        }

        fn set_all(&mut self, _entries: Vec<(&'static str, String)>) -> io::Result<()> {
            self.writes.fetch_add(1, std::sync::atomic::Ordering::SeqCst);
            Ok(())
        }
    }

    #[test]
    fn no_op_completions_do_not_write() {
        let backend = CountingStore::default();
        let writes = std::sync::Arc::clone(&backend.writes);
        let mut store = HabitStore::open(Box::new(backend));
        let id = id_of(&store, "Morning run");

        store.on_done(&HabitId::from("h_missing")).unwrap();
        assert_eq!(writes.load(std::sync::atomic::Ordering::SeqCst), 0);

        store.on_done(&id).unwrap();
        store.on_done(&id).unwrap();
        assert_eq!(writes.load(std::sync::atomic::Ordering::SeqCst), 1);
    }

    #[test]
    fn recurring_completion_rewards_once_per_day() {
        let mut store = seeded();
        let id = id_of(&store, "Morning run");

        assert_eq!(store.on_done(&id).unwrap(), Completion::Completed { streak: 4 });
        assert_eq!(store.on_done(&id).unwrap(), Completion::AlreadyCompleted);

        let habit = store.habit(&id).unwrap();
        assert_eq!(habit.streak, 4);
        assert!(habit.completed_today);
        assert_eq!(habit.progress, 100);
        assert_eq!(habit.last_done, "today");
        assert_eq!(store.data().profile.experience, 10);
        assert_eq!(store.data().profile.coins, 2);
    }

    #[test]
    fn one_off_completion_removes_habit() {
        let mut store = seeded();
        let id = id_of(&store, "One-off Task");

        assert_eq!(store.on_done(&id).unwrap(), Completion::Removed);
        assert!(store.habit(&id).is_none());
        assert_eq!(store.on_done(&id).unwrap(), Completion::NotFound);
        assert_eq!(store.data().profile.experience, 10);
        assert_eq!(store.data().profile.coins, 2);
    }

    #[test]
    fn unknown_id_is_a_silent_no_op() {
        let mut store = seeded();
        let before = store.data().clone();
        assert_eq!(store.on_done(&HabitId::from("h_missing")).unwrap(), Completion::NotFound);
        assert_eq!(store.data(), &before);
        assert!(store.take_notices().is_empty());
    }

    #[test]
    fn add_habit_validates_and_inserts_first() {
        let mut store = seeded();

        let err = store
            .add_habit(NewHabit {
                name: "   ".into(),
                category: None,
                is_daily: true,
                start_progress: 0,
            })
            .unwrap_err();
        assert!(matches!(err, HabitError::Validation(_)));

        let err = store
            .add_habit(NewHabit {
                name: "Stretch".into(),
                category: None,
                is_daily: true,
                start_progress: 101,
            })
            .unwrap_err();
        assert_eq!(err.to_string(), "Start progress must be 0-100.");
        assert_eq!(store.data().habits.len(), 3);

        let habit = store
            .add_habit(NewHabit {
                name: "  Stretch ".into(),
                category: None,
                is_daily: true,
                start_progress: 40,
            })
            .unwrap();
        assert_eq!(habit.name, "Stretch");
        assert_eq!(habit.category, "Other");
        assert_eq!(habit.progress, 40);
        assert_eq!(habit.last_done, "never");
        assert_eq!(store.data().habits[0].id, habit.id);
    }

    #[test]
    fn unlock_requires_enough_coins() {
        let mut store = HabitStore::open(Box::new(MemoryStore::new().with_slot(COINS_KEY, "28")));
        let before = store.data().profile.clone();

        let err = store.claim_reward().unwrap_err();
        assert!(matches!(
            err,
            HabitError::InsufficientCoins {
                needed: 30,
                available: 28
            }
        ));
        assert_eq!(store.data().profile, before);
    }

    #[test]
    fn unlock_spends_exactly_the_cost() {
        let mut store = HabitStore::open(Box::new(MemoryStore::new().with_slot(COINS_KEY, "45")));

        assert_eq!(store.claim_reward().unwrap(), Theme::Sunset);
        assert_eq!(store.data().profile.coins, 15);
        assert!(store.data().profile.unlocked_themes.contains(&Theme::Sunset));

        let err = store.claim_reward().unwrap_err();
        assert!(matches!(err, HabitError::AlreadyUnlocked(Theme::Sunset)));
        assert_eq!(store.data().profile.coins, 15);
    }

    #[test]
    fn locked_theme_cannot_be_selected() {
        let mut store = seeded();
        assert!(matches!(
            store.select_theme(Theme::Sunset),
            Err(HabitError::ThemeLocked(Theme::Sunset))
        ));
        assert_eq!(store.data().profile.selected_theme, Theme::Default);

        store.select_theme(Theme::Midnight).unwrap();
        assert_eq!(store.data().profile.selected_theme, Theme::Midnight);
    }

    #[test]
    fn mood_must_be_in_range() {
        let mut store = seeded();
        assert!(matches!(store.set_mood(0), Err(HabitError::Validation(_))));
        assert!(matches!(store.set_mood(5), Err(HabitError::Validation(_))));
        assert_eq!(store.set_mood(4).unwrap(), Mood::Happy);
        assert_eq!(store.data().profile.mood, Some(Mood::Happy));
    }

    #[test]
    fn challenge_length_defaults_to_seven() {
        let mut store = seeded();
        let id = id_of(&store, "Read 30 min");

        let challenge = store.start_challenge(&id, 21).unwrap().unwrap();
        assert_eq!(challenge.length, 21);
        let challenge = store.start_challenge(&id, 14).unwrap().unwrap();
        assert_eq!(challenge.length, 7);
        assert_eq!(challenge.progress, 0);
        assert_eq!(store.habit(&id).unwrap().challenge.as_ref(), Some(&challenge));

        assert_eq!(store.start_challenge(&HabitId::from("h_missing"), 7).unwrap(), None);
    }

    #[test]
    fn reset_progress_clears_streaks_and_counters() {
        let mut store = seeded();
        let id = id_of(&store, "Morning run");
        store.on_done(&id).unwrap();

        store.reset_progress().unwrap();
        let data = store.data();
        assert!(data.habits.iter().all(|habit| habit.streak == 0 && habit.progress == 0));
        assert!(data.habits.iter().all(|habit| !habit.completed_today));
        assert_eq!(data.profile.experience, 0);
        assert_eq!(data.profile.coins, 0);
    }

    #[test]
    fn failed_write_leaves_state_intact() {
        let mut store = HabitStore::open(Box::new(FailingStore));
        let id = id_of(&store, "Morning run");
        let before = store.data().clone();

        assert!(matches!(store.on_done(&id), Err(HabitError::Storage(_))));
        assert_eq!(store.data(), &before);
    }

    #[test]
    fn notices_are_drained_once() {
        let mut store = seeded();
        store.add_demo_habit().unwrap();
        let notices = store.take_notices();
        assert_eq!(notices.len(), 1);
        assert_eq!(notices[0].message, "Demo habit added");
        assert!(store.take_notices().is_empty());
    }

    #[test]
    fn commit_writes_current_state() {
        let mut store = seeded();
        store.commit().unwrap();
        assert_eq!(store.data().habits.len(), 3);
        assert!(store.backend.get(HABITS_KEY).is_some());
    }
}
