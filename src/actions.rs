//! User-facing operations on the task store.
//!
//! Each handler mutates the store (which persists itself) and reports the
//! outcome through a [`Notifier`]. Unknown ids are silent no-ops.

use chrono::Utc;
use tracing::{debug, info};

use crate::models::{Status, Task, TaskDraft, TaskId, ValidationError};
use crate::persistence::KeyValueStore;
use crate::store::TaskStore;

/// A toast-style message for the user
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub title: String,
    pub description: String,
    /// Destructive notices (deletions) are styled as warnings
    pub destructive: bool,
}

impl Notification {
    pub fn info(title: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            description: description.into(),
            destructive: false,
        }
    }

    pub fn destructive(title: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            description: description.into(),
            destructive: true,
        }
    }

    pub fn created(task: &Task) -> Self {
        Self::info(
            "Task Created",
            format!("\"{}\" has been added to your todo list.", task.title),
        )
    }

    pub fn updated(task: &Task) -> Self {
        Self::info("Task Updated", format!("\"{}\" has been updated.", task.title))
    }

    /// Message for a toggle, chosen from the status *before* the toggle
    pub fn toggled(title: &str, previous: Status) -> Self {
        match previous {
            Status::Open => Self::info("Task Completed", format!("\"{}\" has been completed.", title)),
            Status::Completed => Self::info("Task Reopened", format!("\"{}\" has been reopened.", title)),
        }
    }

    pub fn deleted(task: &Task) -> Self {
        Self::destructive(
            "Task Deleted",
            format!("\"{}\" has been removed from your todo list.", task.title),
        )
    }

    pub fn refreshed() -> Self {
        Self::info("Refreshed", "Your todo list has been refreshed.")
    }
}

/// Receiver of notifications (status bar, stdout, a test buffer)
pub trait Notifier {
    fn notify(&mut self, notification: Notification);
}

impl Notifier for Vec<Notification> {
    fn notify(&mut self, notification: Notification) {
        self.push(notification);
    }
}

/// Validate `draft` and prepend a new open task. Nothing is stored on error.
pub fn create_task<K, N>(
    store: &mut TaskStore<K>,
    draft: &TaskDraft,
    notifier: &mut N,
) -> Result<TaskId, ValidationError>
where
    K: KeyValueStore,
    N: Notifier + ?Sized,
{
    let fields = draft.validate()?;
    let task = Task::new(fields, Utc::now());
    let id = task.id;
    info!(%id, title = %task.title, "task created");
    notifier.notify(Notification::created(&task));
    store.insert(task);
    Ok(id)
}

/// Merge `draft` into an existing task. Returns `Ok(false)` if `id` is unknown.
pub fn update_task<K, N>(
    store: &mut TaskStore<K>,
    id: &TaskId,
    draft: &TaskDraft,
    notifier: &mut N,
) -> Result<bool, ValidationError>
where
    K: KeyValueStore,
    N: Notifier + ?Sized,
{
    let fields = draft.validate()?;
    let Some(mut task) = store.get(id).cloned() else {
        debug!(%id, "update ignored, no such task");
        return Ok(false);
    };
    task.apply(fields, Utc::now());
    info!(%id, "task updated");
    notifier.notify(Notification::updated(&task));
    Ok(store.replace(task))
}

/// Flip a task between open and completed
pub fn toggle_complete<K, N>(store: &mut TaskStore<K>, id: &TaskId, notifier: &mut N) -> bool
where
    K: KeyValueStore,
    N: Notifier + ?Sized,
{
    let now = Utc::now();
    let mut previous = Status::Open;
    let toggled = store.modify(id, |task| {
        previous = task.status;
        task.status = task.status.toggled();
        task.touch(now);
    });
    match toggled {
        Some(task) => {
            info!(%id, status = %task.status, "task toggled");
            notifier.notify(Notification::toggled(&task.title, previous));
            true
        }
        None => {
            debug!(%id, "toggle ignored, no such task");
            false
        }
    }
}

/// Remove a task. The notification uses the removed value itself.
pub fn delete_task<K, N>(store: &mut TaskStore<K>, id: &TaskId, notifier: &mut N) -> bool
where
    K: KeyValueStore,
    N: Notifier + ?Sized,
{
    match store.remove(id) {
        Some(task) => {
            info!(%id, title = %task.title, "task deleted");
            notifier.notify(Notification::deleted(&task));
            true
        }
        None => {
            debug!(%id, "delete ignored, no such task");
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Priority;
    use crate::persistence::MemoryKeyValue;
    use crate::utils::parse_date;

    fn draft(title: &str) -> TaskDraft {
        TaskDraft {
            title: title.to_string(),
            description: String::new(),
            due_date: Some(parse_date("2024-01-01").unwrap()),
            priority: Priority::Low,
        }
    }

    fn store() -> TaskStore<MemoryKeyValue> {
        TaskStore::load(MemoryKeyValue::new())
    }

    #[test]
    fn create_assigns_identity_and_notifies() {
        let mut store = store();
        let mut notes = Vec::new();
        let id = create_task(&mut store, &draft(" Buy milk "), &mut notes).unwrap();
        let task = store.get(&id).unwrap();
        assert_eq!(task.title, "Buy milk");
        assert_eq!(task.status, Status::Open);
        assert_eq!(task.created_at, task.updated_at);
        assert_eq!(
            notes,
            vec![Notification::info("Task Created", "\"Buy milk\" has been added to your todo list.")]
        );
    }

    #[test]
    fn create_rejects_invalid_draft_without_mutation() {
        let mut store = store();
        let mut notes = Vec::new();
        let err = create_task(&mut store, &draft("   "), &mut notes).unwrap_err();
        assert_eq!(err, ValidationError::EmptyTitle);
        assert!(store.is_empty());
        assert!(notes.is_empty());
        assert_eq!(store.kv().get(crate::persistence::TASKS_KEY).unwrap(), None);
    }

    #[test]
    fn update_merges_fields_and_keeps_identity() {
        let mut store = store();
        let mut notes = Vec::new();
        let id = create_task(&mut store, &draft("old"), &mut notes).unwrap();
        let before = store.get(&id).unwrap().clone();

        let mut edit = draft("new");
        edit.priority = Priority::High;
        assert_eq!(update_task(&mut store, &id, &edit, &mut notes), Ok(true));

        let after = store.get(&id).unwrap();
        assert_eq!(after.id, before.id);
        assert_eq!(after.created_at, before.created_at);
        assert!(after.updated_at >= before.updated_at);
        assert_eq!(after.title, "new");
        assert_eq!(after.priority, Priority::High);
        assert_eq!(notes.last().unwrap().title, "Task Updated");
    }

    #[test]
    fn update_unknown_id_is_silent() {
        let mut store = store();
        let mut notes = Vec::new();
        assert_eq!(update_task(&mut store, &TaskId::new(), &draft("x"), &mut notes), Ok(false));
        assert!(notes.is_empty());
    }

    #[test]
    fn toggle_twice_restores_status() {
        let mut store = store();
        let mut notes = Vec::new();
        let id = create_task(&mut store, &draft("Walk dog"), &mut notes).unwrap();
        let created = store.get(&id).unwrap().updated_at;

        assert!(toggle_complete(&mut store, &id, &mut notes));
        assert_eq!(store.get(&id).unwrap().status, Status::Completed);
        let first = store.get(&id).unwrap().updated_at;
        assert!(first >= created);

        assert!(toggle_complete(&mut store, &id, &mut notes));
        assert_eq!(store.get(&id).unwrap().status, Status::Open);
        assert!(store.get(&id).unwrap().updated_at >= first);

        let titles: Vec<_> = notes.iter().map(|n| n.title.as_str()).collect();
        assert_eq!(titles, vec!["Task Created", "Task Completed", "Task Reopened"]);
        assert_eq!(notes[2].description, "\"Walk dog\" has been reopened.");
    }

    #[test]
    fn toggle_unknown_id_is_silent() {
        let mut store = store();
        let mut notes = Vec::new();
        assert!(!toggle_complete(&mut store, &TaskId::new(), &mut notes));
        assert!(notes.is_empty());
    }

    #[test]
    fn delete_notifies_destructively() {
        let mut store = store();
        let mut notes = Vec::new();
        let id = create_task(&mut store, &draft("Old task"), &mut notes).unwrap();
        notes.clear();

        assert!(delete_task(&mut store, &id, &mut notes));
        assert!(store.is_empty());
        assert_eq!(
            notes,
            vec![Notification::destructive(
                "Task Deleted",
                "\"Old task\" has been removed from your todo list."
            )]
        );
    }

    #[test]
    fn delete_unknown_id_changes_nothing() {
        let mut store = store();
        let mut notes = Vec::new();
        create_task(&mut store, &draft("keep"), &mut notes).unwrap();
        notes.clear();
        let before = store.tasks().to_vec();

        assert!(!delete_task(&mut store, &TaskId::new(), &mut notes));
        assert_eq!(store.tasks(), before.as_slice());
        assert!(notes.is_empty());
    }
}
