pub mod app;
pub mod config;
pub mod errors;
pub mod handlers;
pub mod lifecycle;
pub mod models;
pub mod storage;
pub mod store;
pub mod summary;
pub mod ui;
pub mod state;

pub use app::router;
pub use config::Config;
pub use errors::{AppError, HabitError};
pub use lifecycle::{check_daily_reset, check_daily_reset_at};
pub use state::AppState;
pub use storage::{FileStore, KeyValueStore, MemoryStore};
pub use store::{Completion, HabitStore, NewHabit};
