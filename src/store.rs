use tracing::{debug, error, info, warn};

use crate::models::{Task, TaskId};
use crate::persistence::{decode_tasks, encode_tasks, KeyValueStore, PersistenceError, TASKS_KEY};
use crate::pipeline::FilterCounts;

/// Authoritative, newest-first task list. Every mutation rewrites the whole
/// collection to the key-value store.
pub struct TaskStore<K: KeyValueStore> {
    tasks: Vec<Task>,
    kv: K,
}

impl<K: KeyValueStore> TaskStore<K> {
    /// Load tasks from `kv`. Missing or unreadable data yields an empty store;
    /// the failure is logged and otherwise ignored.
    pub fn load(kv: K) -> Self {
        let tasks = match Self::read(&kv) {
            Ok(Some(tasks)) => {
                info!(count = tasks.len(), "loaded tasks");
                tasks
            }
            Ok(None) => {
                debug!("no saved tasks, starting empty");
                Vec::new()
            }
            Err(e) => {
                warn!(error = %e, "failed to load saved tasks, starting empty");
                Vec::new()
            }
        };
        Self { tasks, kv }
    }

    fn read(kv: &K) -> Result<Option<Vec<Task>>, PersistenceError> {
        match kv.get(TASKS_KEY)? {
            Some(json) => decode_tasks(&json).map(Some),
            None => Ok(None),
        }
    }

    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    pub fn get(&self, id: &TaskId) -> Option<&Task> {
        self.tasks.iter().find(|t| t.id == *id)
    }

    /// Tasks whose id starts with `prefix` (case-insensitive)
    pub fn find_by_prefix(&self, prefix: &str) -> Vec<&Task> {
        let prefix = prefix.trim().to_lowercase();
        if prefix.is_empty() {
            return Vec::new();
        }
        self.tasks
            .iter()
            .filter(|t| t.id.to_string().starts_with(&prefix))
            .collect()
    }

    pub fn counts(&self) -> FilterCounts {
        FilterCounts::from_tasks(&self.tasks)
    }

    pub fn kv(&self) -> &K {
        &self.kv
    }

    /// Prepend a task. An existing task with the same id is dropped first so
    /// ids stay unique.
    pub fn insert(&mut self, task: Task) {
        self.tasks.retain(|t| t.id != task.id);
        self.tasks.insert(0, task);
        self.persist();
    }

    /// Swap in `task` for the stored task with the same id, keeping its position
    pub fn replace(&mut self, task: Task) -> bool {
        match self.tasks.iter_mut().find(|t| t.id == task.id) {
            Some(slot) => {
                *slot = task;
                self.persist();
                true
            }
            None => false,
        }
    }

    /// Mutate a task in place and persist. Returns the updated task, or `None`
    /// when the id is unknown (nothing is written).
    pub fn modify<F>(&mut self, id: &TaskId, f: F) -> Option<&Task>
    where
        F: FnOnce(&mut Task),
    {
        let index = self.tasks.iter().position(|t| t.id == *id)?;
        f(&mut self.tasks[index]);
        self.persist();
        self.tasks.get(index)
    }

    pub fn remove(&mut self, id: &TaskId) -> Option<Task> {
        let index = self.tasks.iter().position(|t| t.id == *id)?;
        let task = self.tasks.remove(index);
        self.persist();
        Some(task)
    }

    /// Write the full collection. Failures are logged, not returned.
    fn persist(&mut self) {
        let result = encode_tasks(&self.tasks).and_then(|json| self.kv.set(TASKS_KEY, &json));
        match result {
            Ok(()) => debug!(count = self.tasks.len(), "saved tasks"),
            Err(e) => error!(error = %e, "failed to save tasks"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Priority, TaskDraft};
    use crate::persistence::MemoryKeyValue;
    use crate::utils::parse_date;
    use chrono::Utc;

    fn task(title: &str) -> Task {
        Task::new(
            TaskDraft {
                title: title.to_string(),
                description: String::new(),
                due_date: Some(parse_date("2024-01-01").unwrap()),
                priority: Priority::Medium,
            }
            .validate()
            .unwrap(),
            Utc::now(),
        )
    }

    fn stored(store: &TaskStore<MemoryKeyValue>) -> Vec<Task> {
        decode_tasks(&store.kv().get(TASKS_KEY).unwrap().unwrap()).unwrap()
    }

    #[test]
    fn starts_empty_without_saved_data() {
        let store = TaskStore::load(MemoryKeyValue::new());
        assert!(store.is_empty());
    }

    #[test]
    fn starts_empty_on_corrupt_data() {
        let store = TaskStore::load(MemoryKeyValue::with_entry(TASKS_KEY, "{broken"));
        assert!(store.is_empty());
        // the corrupt value stays until the next write
        assert_eq!(store.kv().get(TASKS_KEY).unwrap().as_deref(), Some("{broken"));
    }

    #[test]
    fn insert_prepends_and_persists() {
        let mut store = TaskStore::load(MemoryKeyValue::new());
        store.insert(task("first"));
        store.insert(task("second"));
        let titles: Vec<_> = store.tasks().iter().map(|t| t.title.as_str()).collect();
        assert_eq!(titles, vec!["second", "first"]);
        assert_eq!(stored(&store), store.tasks());
    }

    #[test]
    fn insert_keeps_ids_unique() {
        let mut store = TaskStore::load(MemoryKeyValue::new());
        let mut t = task("original");
        store.insert(t.clone());
        t.title = "again".to_string();
        store.insert(t);
        assert_eq!(store.len(), 1);
        assert_eq!(store.tasks()[0].title, "again");
    }

    #[test]
    fn replace_keeps_position() {
        let mut store = TaskStore::load(MemoryKeyValue::new());
        let a = task("a");
        store.insert(a.clone());
        store.insert(task("b"));
        let mut edited = a.clone();
        edited.title = "a2".to_string();
        assert!(store.replace(edited));
        assert_eq!(store.tasks()[1].title, "a2");
        assert!(!store.replace(task("stranger")));
        assert_eq!(store.len(), 2);
    }

    #[test]
    fn modify_keeps_position() {
        let mut store = TaskStore::load(MemoryKeyValue::new());
        let a = task("a");
        store.insert(a.clone());
        store.insert(task("b"));
        let updated = store.modify(&a.id, |t| t.title = "a2".to_string()).map(|t| t.title.clone());
        assert_eq!(updated.as_deref(), Some("a2"));
        assert_eq!(store.tasks()[1].title, "a2");
        assert_eq!(stored(&store), store.tasks());
        assert!(store.modify(&TaskId::new(), |t| t.title.clear()).is_none());
        assert_eq!(store.len(), 2);
    }

    #[test]
    fn remove_unknown_id_leaves_store_untouched() {
        let mut store = TaskStore::load(MemoryKeyValue::new());
        store.insert(task("a"));
        let before = store.tasks().to_vec();
        assert!(store.remove(&TaskId::new()).is_none());
        assert_eq!(store.tasks(), before.as_slice());
    }

    #[test]
    fn reload_restores_saved_tasks() {
        let mut store = TaskStore::load(MemoryKeyValue::new());
        store.insert(task("a"));
        store.insert(task("b"));
        let saved = store.tasks().to_vec();
        let kv = store.kv().clone();
        let reloaded = TaskStore::load(kv);
        assert_eq!(reloaded.tasks(), saved.as_slice());
    }

    #[test]
    fn finds_tasks_by_id_prefix() {
        let mut store = TaskStore::load(MemoryKeyValue::new());
        let t = task("a");
        let id = t.id;
        store.insert(t);
        let short = id.short().to_uppercase();
        let found = store.find_by_prefix(&short);
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].id, id);
        assert!(store.find_by_prefix("").is_empty());
    }
}
