use crate::errors::AppError;
use crate::models::{
    ActionResponse, Challenge, ChallengeRequest, ClaimRequest, Habit, HabitId, ListQuery, MoodRequest,
    NewHabitRequest, StateResponse, Theme, ThemeRequest,
};
use crate::state::AppState;
use crate::store::{Completion, HabitStore, NewHabit};
use crate::summary::{build_state, filter_habits};
use crate::ui::render_index;
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{Html, Redirect},
    Json,
};
use chrono::Local;

pub async fn index(State(state): State<AppState>) -> Html<String> {
    let store = state.store.lock().await;
    Html(render_index(Local::now().date_naive(), store.data()))
}

pub async fn get_state(State(state): State<AppState>) -> Json<StateResponse> {
    let mut store = state.store.lock().await;
    let notices = store.take_notices();
    Json(build_state(store.data(), notices))
}

pub async fn list_habits(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> Json<Vec<Habit>> {
    let store = state.store.lock().await;
    let habits = filter_habits(&store.data().habits, &query)
        .into_iter()
        .cloned()
        .collect();
    Json(habits)
}

pub async fn create_habit(
    State(state): State<AppState>,
    Json(payload): Json<NewHabitRequest>,
) -> Result<(StatusCode, Json<ActionResponse<Habit>>), AppError> {
    let mut store = state.store.lock().await;
    let input = NewHabit {
        name: payload.name,
        category: payload.category,
        is_daily: payload.is_daily.unwrap_or(true),
        start_progress: payload.start_progress.unwrap_or(0),
    };
    let habit = blocking(|| store.add_habit(input))?;
    Ok((StatusCode::CREATED, respond(&mut store, habit)))
}

pub async fn create_demo_habit(
    State(state): State<AppState>,
) -> Result<(StatusCode, Json<ActionResponse<Habit>>), AppError> {
    let mut store = state.store.lock().await;
    let habit = blocking(|| store.add_demo_habit())?;
    Ok((StatusCode::CREATED, respond(&mut store, habit)))
}

pub async fn done(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<ActionResponse<Completion>>, AppError> {
    let mut store = state.store.lock().await;
    let id = HabitId::from(id);
    let completion = blocking(|| store.on_done(&id))?;
    Ok(respond(&mut store, completion))
}

pub async fn done_form(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Redirect, AppError> {
    let mut store = state.store.lock().await;
    let id = HabitId::from(id);
    blocking(|| store.on_done(&id))?;
    Ok(Redirect::to("/"))
}

pub async fn start_challenge(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(payload): Json<ChallengeRequest>,
) -> Result<Json<ActionResponse<Option<Challenge>>>, AppError> {
    let mut store = state.store.lock().await;
    let id = HabitId::from(id);
    let length = payload.length.unwrap_or(7);
    let challenge = blocking(|| store.start_challenge(&id, length))?;
    Ok(respond(&mut store, challenge))
}

pub async fn claim_reward(
    State(state): State<AppState>,
    Json(payload): Json<ClaimRequest>,
) -> Result<Json<ActionResponse<Theme>>, AppError> {
    let theme = match payload.theme.as_deref() {
        Some(name) => parse_theme(name)?,
        None => Theme::REWARD,
    };
    let mut store = state.store.lock().await;
    let theme = blocking(|| store.unlock_theme(theme))?;
    Ok(respond(&mut store, theme))
}

pub async fn select_theme(
    State(state): State<AppState>,
    Json(payload): Json<ThemeRequest>,
) -> Result<Json<ActionResponse<Theme>>, AppError> {
    let theme = parse_theme(&payload.theme)?;
    let mut store = state.store.lock().await;
    let theme = blocking(|| store.select_theme(theme))?;
    Ok(respond(&mut store, theme))
}

pub async fn set_mood(
    State(state): State<AppState>,
    Json(payload): Json<MoodRequest>,
) -> Result<Json<ActionResponse<u8>>, AppError> {
    let mut store = state.store.lock().await;
    let mood = blocking(|| store.set_mood(payload.mood))?;
    Ok(respond(&mut store, mood.level()))
}

pub async fn reset(
    State(state): State<AppState>,
) -> Result<Json<ActionResponse<()>>, AppError> {
    let mut store = state.store.lock().await;
    blocking(|| store.reset_progress())?;
    Ok(respond(&mut store, ()))
}

/// Store writes go straight to disk, so they run where the runtime allows
/// blocking. Requires the multi-threaded runtime.
fn blocking<T>(write: impl FnOnce() -> T) -> T {
    tokio::task::block_in_place(write)
}

fn parse_theme(name: &str) -> Result<Theme, AppError> {
    name.parse::<Theme>().map_err(AppError::bad_request)
}

fn respond<T>(store: &mut HabitStore, result: T) -> Json<ActionResponse<T>> {
    let notices = store.take_notices();
    Json(ActionResponse {
        result,
        state: build_state(store.data(), notices),
    })
}
