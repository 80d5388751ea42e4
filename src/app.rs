use crate::handlers;
use crate::state::AppState;
use axum::{routing::{get, post}, Router};

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(handlers::index))
        .route("/habits/:id/done", post(handlers::done_form))
        .route("/api/state", get(handlers::get_state))
        .route("/api/habits", get(handlers::list_habits).post(handlers::create_habit))
        .route("/api/habits/demo", post(handlers::create_demo_habit))
        .route("/api/habits/:id/done", post(handlers::done))
        .route("/api/habits/:id/challenge", post(handlers::start_challenge))
        .route("/api/rewards/claim", post(handlers::claim_reward))
        .route("/api/theme", post(handlers::select_theme))
        .route("/api/mood", post(handlers::set_mood))
        .route("/api/reset", post(handlers::reset))
        .with_state(state)
}
