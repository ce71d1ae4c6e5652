pub mod actions;
pub mod cli;
pub mod config;
pub mod logging;
pub mod models;
pub mod persistence;
pub mod pipeline;
pub mod refresh;
pub mod store;
pub mod tui;
pub mod utils;

pub use config::Config;
pub use models::{Priority, Status, Task, TaskDraft, TaskId};
pub use persistence::{KeyValueStore, SqliteKeyValue};
pub use pipeline::Filter;
pub use store::TaskStore;
pub use utils::Profile;
