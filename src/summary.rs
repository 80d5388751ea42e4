use crate::models::{Habit, ListQuery, Notice, StateResponse, TrackerData};
use crate::storage::date_key;

/// Number of habits shown in focus mode.
pub const FOCUS_LIMIT: usize = 3;
const ALL_CATEGORIES: &str = "All";

/// Habits matching the category chip, the search text and focus mode, in
/// display order.
pub fn filter_habits<'a>(habits: &'a [Habit], query: &ListQuery) -> Vec<&'a Habit> {
    let category = query
        .category
        .as_deref()
        .map(str::trim)
        .filter(|category| !category.is_empty() && *category != ALL_CATEGORIES);
    let search = query
        .search
        .as_deref()
        .map(|search| search.trim().to_lowercase())
        .filter(|search| !search.is_empty());

    let mut items: Vec<&Habit> = habits
        .iter()
        .filter(|habit| category.is_none_or(|category| habit.category == category))
        .filter(|habit| {
            search.as_deref().is_none_or(|search| {
                habit.name.to_lowercase().contains(search)
                    || habit.category.to_lowercase().contains(search)
            })
        })
        .collect();

    if query.focus.unwrap_or(false) {
        items.sort_by(|a, b| b.streak.cmp(&a.streak));
        items.truncate(FOCUS_LIMIT);
    }
    items
}

pub fn best_streak(habits: &[Habit]) -> u32 {
    habits.iter().map(|habit| habit.streak).max().unwrap_or(0)
}

/// Fill of the experience bar, cycling every 200 points.
pub fn xp_meter(experience: u64) -> f64 {
    ((experience % 200) as f64 / 2.0).min(100.0)
}

pub fn build_state(data: &TrackerData, notices: Vec<Notice>) -> StateResponse {
    let profile = &data.profile;
    StateResponse {
        habits: data.habits.clone(),
        experience: profile.experience,
        coins: profile.coins,
        mood: profile.mood,
        unlocked_themes: profile.unlocked_themes.iter().copied().collect(),
        selected_theme: profile.selected_theme,
        last_active_day: profile.last_active_day.map(date_key),
        best_streak: best_streak(&data.habits),
        xp_meter: xp_meter(profile.experience),
        notices,
    }
}
