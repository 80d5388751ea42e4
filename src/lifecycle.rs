use crate::errors::HabitError;
use crate::models::TrackerData;
use crate::store::{HabitStore, NOTICE_MS};
use chrono::{Local, NaiveDate};
use tracing::info;

/// Runs the start-of-day check against the local calendar date.
pub fn check_daily_reset(store: &mut HabitStore) -> Result<bool, HabitError> {
    check_daily_reset_at(store, Local::now().date_naive())
}

/// Resets per-day state of recurring habits when `today` differs from the
/// last recorded day. Returns whether a reset happened.
pub fn check_daily_reset_at(store: &mut HabitStore, today: NaiveDate) -> Result<bool, HabitError> {
    if store.data().profile.last_active_day == Some(today) {
        return Ok(false);
    }

    let previous = store.data().profile.last_active_day;
    store.transact(|data| {
        start_new_day(data, today);
        Ok(())
    })?;

    match previous {
        Some(day) => info!("new day {today} (last active {day}), daily habits reset"),
        None => info!("no recorded day, starting at {today}"),
    }
    store.notify("Daily tasks reset for a new day!", NOTICE_MS);
    Ok(true)
}

/// Clears the completion flag and progress of every recurring habit and
/// records `today`. Streaks carry over.
pub fn start_new_day(data: &mut TrackerData, today: NaiveDate) {
    for habit in data.habits.iter_mut().filter(|habit| habit.is_daily) {
        habit.completed_today = false;
        habit.progress = 0;
    }
    data.profile.last_active_day = Some(today);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Habit, HabitId};
    use crate::storage::{HABITS_KEY, LAST_DAY_KEY, MemoryStore};

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 1, d).unwrap()
    }

    fn store_with(habits: &[Habit], last_day: &str) -> HabitStore {
        let backend = MemoryStore::new()
            .with_slot(HABITS_KEY, serde_json::to_string(habits).unwrap())
            .with_slot(LAST_DAY_KEY, last_day);
        HabitStore::open(Box::new(backend))
    }

    #[test]
    fn new_day_resets_completion_but_keeps_streak() {
        let mut done = Habit::new("Morning run", "Fitness", true, 0);
        done.completed_today = true;
        done.progress = 100;
        done.streak = 5;
        let one_off = Habit::new("File taxes", "Work", false, 60);
        let mut store = store_with(&[done.clone(), one_off.clone()], "2026-01-04");

        assert!(check_daily_reset_at(&mut store, day(5)).unwrap());

        let habit = store.habit(&done.id).unwrap();
        assert!(!habit.completed_today);
        assert_eq!(habit.progress, 0);
        assert_eq!(habit.streak, 5);
        assert_eq!(store.habit(&one_off.id).unwrap().progress, 60);
        assert_eq!(store.data().profile.last_active_day, Some(day(5)));
        assert_eq!(store.take_notices().len(), 1);
    }

    #[test]
    fn same_day_check_is_idempotent() {
        let mut store = store_with(&Habit::seed(), "2026-01-04");
        assert!(check_daily_reset_at(&mut store, day(5)).unwrap());
        let id: HabitId = store.data().habits[0].id.clone();
        store.on_done(&id).unwrap();
        let after_completion = store.data().clone();

        assert!(!check_daily_reset_at(&mut store, day(5)).unwrap());
        assert_eq!(store.data(), &after_completion);
    }

    #[test]
    fn first_run_records_today() {
        let mut store = HabitStore::open(Box::new(MemoryStore::new()));
        assert_eq!(store.data().profile.last_active_day, None);

        assert!(check_daily_reset_at(&mut store, day(9)).unwrap());
        assert_eq!(store.data().profile.last_active_day, Some(day(9)));
        assert_eq!(store.data().habits.len(), 3);
    }
}
