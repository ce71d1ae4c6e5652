use crate::actions::{self, Notification, Notifier};
use crate::config::Config;
use crate::models::{MAX_DESCRIPTION_LEN, MAX_TITLE_LEN, Priority, Task, TaskDraft, TaskId, parse_due_date};
use crate::persistence::SqliteKeyValue;
use crate::pipeline::{self, Filter};
use crate::refresh::RefreshState;
use crate::store::TaskStore;
use crate::tui::widgets::editor::Editor;
use chrono::NaiveDate;
use ratatui::widgets::ListState;
use std::cmp;
use std::time::{Duration, Instant};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    View,
    Search,
    Form,
    Help,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskField {
    Title,
    Description,
    DueDate,
    Priority,
}

impl TaskField {
    pub fn next(self) -> Self {
        match self {
            TaskField::Title => TaskField::Description,
            TaskField::Description => TaskField::DueDate,
            TaskField::DueDate => TaskField::Priority,
            TaskField::Priority => TaskField::Title, // Wrap around
        }
    }

    pub fn prev(self) -> Self {
        match self {
            TaskField::Title => TaskField::Priority, // Wrap around
            TaskField::Description => TaskField::Title,
            TaskField::DueDate => TaskField::Description,
            TaskField::Priority => TaskField::DueDate,
        }
    }
}

#[derive(Debug, Clone)]
pub struct TaskForm {
    pub current_field: TaskField,
    pub title: Editor,
    pub description: Editor,
    pub due_date: Editor,
    pub priority: Priority,
    pub editing_task_id: Option<TaskId>, // None for new tasks, Some(id) for editing
    /// Last validation failure, shown inside the form
    pub error: Option<String>,
}

impl TaskForm {
    fn from_draft(draft: &TaskDraft, editing_task_id: Option<TaskId>) -> Self {
        let due = draft
            .due_date
            .map(|d| d.format("%Y-%m-%d").to_string())
            .unwrap_or_default();
        Self {
            current_field: TaskField::Title,
            title: Editor::from_string(&draft.title).with_max_chars(MAX_TITLE_LEN),
            description: Editor::from_string(&draft.description).with_max_chars(MAX_DESCRIPTION_LEN),
            due_date: Editor::from_string(&due).with_max_chars(10),
            priority: draft.priority,
            editing_task_id,
            error: None,
        }
    }

    pub fn is_editing(&self) -> bool {
        self.editing_task_id.is_some()
    }

    /// Build a draft from the form contents. Date parse errors surface here,
    /// everything else is checked by `TaskDraft::validate`.
    pub fn to_draft(&self) -> Result<TaskDraft, crate::models::ValidationError> {
        Ok(TaskDraft {
            title: self.title.text(),
            description: self.description.text(),
            due_date: parse_due_date(&self.due_date.text())?,
            priority: self.priority,
        })
    }
}

#[derive(Debug, Clone)]
pub struct UiState {
    pub mode: Mode,
    pub selected_index: usize,
    pub list_state: ListState,
    /// Advances each tick while a refresh runs; drives the spinner
    pub spinner_tick: usize,
}

impl Default for UiState {
    fn default() -> Self {
        Self {
            mode: Mode::View,
            selected_index: 0,
            list_state: ListState::default(),
            spinner_tick: 0,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct ModalState {
    pub delete_confirmation: Option<Task>,
    pub delete_modal_selection: usize, // 0 = Delete, 1 = Cancel
}

/// The latest notification and when it was shown
#[derive(Debug, Clone)]
pub struct StatusState {
    pub notification: Option<Notification>,
    pub shown_at: Option<Instant>,
    pub timeout: Duration,
}

impl StatusState {
    pub fn new(timeout: Duration) -> Self {
        Self {
            notification: None,
            shown_at: None,
            timeout,
        }
    }

    pub fn clear(&mut self) {
        self.notification = None;
        self.shown_at = None;
    }

    /// Clear the message once it has been visible for the configured timeout
    pub fn check_timeout(&mut self, now: Instant) {
        if let Some(shown) = self.shown_at
            && now.saturating_duration_since(shown) >= self.timeout
        {
            self.clear();
        }
    }
}

impl Notifier for StatusState {
    fn notify(&mut self, notification: Notification) {
        self.notification = Some(notification);
        self.shown_at = Some(Instant::now());
    }
}

#[derive(Debug, Clone, Default)]
pub struct SearchState {
    pub query: String,
}

pub struct App {
    pub config: Config,
    pub store: TaskStore<SqliteKeyValue>,

    pub ui: UiState,
    pub filter: Filter,
    pub search: SearchState,
    pub form: Option<TaskForm>,
    pub modals: ModalState,
    pub status: StatusState,
    pub refresh: RefreshState,
    /// Reference date for due labels; updated on every tick
    pub today: NaiveDate,
}

impl App {
    pub fn new(config: Config, store: TaskStore<SqliteKeyValue>) -> Self {
        let filter = config.default_filter;
        let status = StatusState::new(config.status_message_timeout());
        let refresh = RefreshState::new(config.refresh_delay());
        let mut app = Self {
            config,
            store,
            ui: UiState::default(),
            filter,
            search: SearchState::default(),
            form: None,
            modals: ModalState::default(),
            status,
            refresh,
            today: crate::utils::today(),
        };
        app.adjust_selected_index();
        app
    }

    /// Tasks in display order: search, then filter, then sort
    pub fn visible_tasks(&self) -> Vec<Task> {
        pipeline::derive(self.store.tasks(), &self.search.query, self.filter)
    }

    pub fn selected_task(&self) -> Option<Task> {
        self.visible_tasks().into_iter().nth(self.ui.selected_index)
    }

    /// Sync ListState with selected_index for proper scrolling
    pub fn sync_list_state(&mut self) {
        if self.visible_tasks().is_empty() {
            self.ui.list_state.select(None);
        } else {
            self.ui.list_state.select(Some(self.ui.selected_index));
        }
    }

    /// Clamp the selection after the visible list changed
    pub fn adjust_selected_index(&mut self) {
        let len = self.visible_tasks().len();
        self.ui.selected_index = cmp::min(self.ui.selected_index, len.saturating_sub(1));
        self.sync_list_state();
    }

    /// Point the selection at `id` if it is visible, otherwise just clamp
    pub fn select_task(&mut self, id: &TaskId) {
        if let Some(idx) = self.visible_tasks().iter().position(|t| t.id == *id) {
            self.ui.selected_index = idx;
        }
        self.adjust_selected_index();
    }

    pub fn move_selection_up(&mut self) {
        if self.ui.selected_index > 0 {
            self.ui.selected_index -= 1;
            self.sync_list_state();
        }
    }

    pub fn move_selection_down(&mut self) {
        let len = self.visible_tasks().len();
        if self.ui.selected_index < len.saturating_sub(1) {
            self.ui.selected_index += 1;
            self.sync_list_state();
        }
    }

    pub fn notify(&mut self, notification: Notification) {
        self.status.notify(notification);
    }

    /// Periodic housekeeping: status timeout, refresh completion, date rollover
    pub fn tick(&mut self, now: Instant) {
        self.status.check_timeout(now);
        if self.refresh.is_refreshing() {
            self.ui.spinner_tick = self.ui.spinner_tick.wrapping_add(1);
        }
        self.refresh.poll(now, &mut self.status);
        self.today = crate::utils::today();
    }

    // Search

    pub fn enter_search_mode(&mut self) {
        self.ui.mode = Mode::Search;
    }

    /// Leave search mode keeping the query applied
    pub fn exit_search_mode(&mut self) {
        self.ui.mode = Mode::View;
    }

    /// Leave search mode and drop the query
    pub fn cancel_search(&mut self) {
        self.search.query.clear();
        self.ui.mode = Mode::View;
        self.adjust_selected_index();
    }

    pub fn add_to_search(&mut self, ch: char) {
        self.search.query.push(ch);
        self.ui.selected_index = 0;
        self.adjust_selected_index();
    }

    pub fn remove_from_search(&mut self) {
        self.search.query.pop();
        self.ui.selected_index = 0;
        self.adjust_selected_index();
    }

    // Filter

    pub fn set_filter(&mut self, filter: Filter) {
        let selected = self.selected_task().map(|t| t.id);
        self.filter = filter;
        self.ui.selected_index = 0;
        match selected {
            Some(id) => self.select_task(&id),
            None => self.adjust_selected_index(),
        }
    }

    pub fn next_filter(&mut self) {
        self.set_filter(self.filter.next());
    }

    pub fn prev_filter(&mut self) {
        self.set_filter(self.filter.prev());
    }

    // Help

    pub fn enter_help_mode(&mut self) {
        self.ui.mode = Mode::Help;
    }

    pub fn exit_help_mode(&mut self) {
        self.ui.mode = Mode::View;
    }

    // Form

    pub fn enter_create_mode(&mut self) {
        let draft = TaskDraft::new(self.config.default_priority, self.today);
        self.form = Some(TaskForm::from_draft(&draft, None));
        self.ui.mode = Mode::Form;
    }

    pub fn enter_edit_mode(&mut self) {
        match self.selected_task() {
            Some(task) => {
                let draft = TaskDraft::from_task(&task);
                self.form = Some(TaskForm::from_draft(&draft, Some(task.id)));
                self.ui.mode = Mode::Form;
            }
            None => self.notify(Notification::info("Nothing selected", "Select a task to edit.")),
        }
    }

    pub fn exit_form_mode(&mut self) {
        self.form = None;
        self.ui.mode = Mode::View;
    }

    pub fn navigate_form_field(&mut self, forward: bool) {
        if let Some(ref mut form) = self.form {
            form.current_field = if forward {
                form.current_field.next()
            } else {
                form.current_field.prev()
            };
        }
    }

    pub fn get_current_form_editor(&mut self) -> Option<&mut Editor> {
        let form = self.form.as_mut()?;
        match form.current_field {
            TaskField::Title => Some(&mut form.title),
            TaskField::Description => Some(&mut form.description),
            TaskField::DueDate => Some(&mut form.due_date),
            TaskField::Priority => None, // Priority is a selector, not an editor
        }
    }

    pub fn is_priority_field_active(&self) -> bool {
        self.form
            .as_ref()
            .is_some_and(|f| f.current_field == TaskField::Priority)
    }

    pub fn raise_form_priority(&mut self) {
        if let Some(ref mut form) = self.form {
            form.priority = form.priority.raised();
        }
    }

    pub fn lower_form_priority(&mut self) {
        if let Some(ref mut form) = self.form {
            form.priority = form.priority.lowered();
        }
    }

    /// Validate and submit the form. On a validation failure the form stays
    /// open with the message; on success it closes and the task is selected.
    pub fn save_form(&mut self) {
        let Some(form) = self.form.as_ref() else {
            return;
        };
        let editing = form.editing_task_id;
        let result = form.to_draft().and_then(|draft| match editing {
            Some(id) => actions::update_task(&mut self.store, &id, &draft, &mut self.status).map(|_| id),
            None => actions::create_task(&mut self.store, &draft, &mut self.status),
        });

        match result {
            Ok(id) => {
                self.exit_form_mode();
                self.select_task(&id);
            }
            Err(err) => {
                if let Some(ref mut form) = self.form {
                    form.error = Some(err.to_string());
                }
            }
        }
    }

    // Row actions

    pub fn toggle_selected(&mut self) {
        if let Some(task) = self.selected_task() {
            actions::toggle_complete(&mut self.store, &task.id, &mut self.status);
            self.select_task(&task.id);
        }
    }

    pub fn request_delete(&mut self) {
        if let Some(task) = self.selected_task() {
            self.modals.delete_confirmation = Some(task);
            self.modals.delete_modal_selection = 0;
        }
    }

    pub fn cancel_delete(&mut self) {
        self.modals.delete_confirmation = None;
    }

    pub fn confirm_delete(&mut self) {
        if let Some(task) = self.modals.delete_confirmation.take() {
            actions::delete_task(&mut self.store, &task.id, &mut self.status);
            self.adjust_selected_index();
        }
    }

    pub fn start_refresh(&mut self) {
        self.refresh.start(Instant::now());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Status;

    fn app() -> App {
        let kv = SqliteKeyValue::open_in_memory().unwrap();
        App::new(Config::default(), TaskStore::load(kv))
    }

    fn add(app: &mut App, title: &str, priority: Priority) -> TaskId {
        let mut draft = TaskDraft::new(priority, app.today);
        draft.title = title.to_string();
        actions::create_task(&mut app.store, &draft, &mut app.status).unwrap()
    }

    fn type_into_form(app: &mut App, text: &str) {
        let editor = app.get_current_form_editor().unwrap();
        for ch in text.chars() {
            editor.insert_char(ch);
        }
    }

    #[test]
    fn create_form_defaults_and_saves() {
        let mut app = app();
        app.enter_create_mode();
        let form = app.form.as_ref().unwrap();
        assert_eq!(form.priority, Priority::Medium);
        assert!(!form.due_date.text().is_empty());

        type_into_form(&mut app, "Write report");
        app.save_form();

        assert_eq!(app.ui.mode, Mode::View);
        assert!(app.form.is_none());
        assert_eq!(app.selected_task().unwrap().title, "Write report");
        assert_eq!(app.status.notification.as_ref().unwrap().title, "Task Created");
    }

    #[test]
    fn invalid_form_stays_open_with_error() {
        let mut app = app();
        app.enter_create_mode();
        app.save_form();

        let form = app.form.as_ref().unwrap();
        assert_eq!(form.error.as_deref(), Some("Please enter a task title"));
        assert_eq!(app.ui.mode, Mode::Form);
        assert!(app.store.is_empty());
    }

    #[test]
    fn bad_due_date_is_reported() {
        let mut app = app();
        app.enter_create_mode();
        type_into_form(&mut app, "Taxes");
        app.navigate_form_field(true);
        app.navigate_form_field(true);
        let editor = app.get_current_form_editor().unwrap();
        *editor = Editor::from_string("2024-13-01");
        app.save_form();

        assert!(app.form.as_ref().unwrap().error.is_some());
        assert!(app.store.is_empty());
    }

    #[test]
    fn edit_keeps_identity_and_updates_fields() {
        let mut app = app();
        let id = add(&mut app, "Draft", Priority::Low);
        app.enter_edit_mode();
        assert_eq!(app.form.as_ref().unwrap().editing_task_id, Some(id));

        type_into_form(&mut app, " v2");
        app.navigate_form_field(false);
        assert!(app.is_priority_field_active());
        app.raise_form_priority();
        app.save_form();

        let task = app.store.get(&id).unwrap();
        assert_eq!(task.title, "Draft v2");
        assert_eq!(task.priority, Priority::Medium);
        assert_eq!(app.store.len(), 1);
    }

    #[test]
    fn selection_follows_toggled_task() {
        let mut app = app();
        add(&mut app, "b", Priority::Low);
        let first = add(&mut app, "a", Priority::High);
        app.select_task(&first);
        assert_eq!(app.ui.selected_index, 0);

        app.toggle_selected();
        assert_eq!(app.store.get(&first).unwrap().status, Status::Completed);
        // Completed tasks sort last
        assert_eq!(app.ui.selected_index, 1);
        assert_eq!(app.selected_task().unwrap().id, first);
    }

    #[test]
    fn delete_requires_confirmation() {
        let mut app = app();
        add(&mut app, "gone", Priority::Medium);
        app.request_delete();
        assert!(app.store.len() == 1);
        app.cancel_delete();
        assert_eq!(app.store.len(), 1);

        app.request_delete();
        app.confirm_delete();
        assert!(app.store.is_empty());
        let note = app.status.notification.as_ref().unwrap();
        assert!(note.destructive);
        assert_eq!(app.ui.list_state.selected(), None);
    }

    #[test]
    fn search_and_filter_narrow_the_list() {
        let mut app = app();
        add(&mut app, "Buy milk", Priority::High);
        add(&mut app, "Call mom", Priority::Low);

        app.enter_search_mode();
        for ch in "MILK".chars() {
            app.add_to_search(ch);
        }
        assert_eq!(app.visible_tasks().len(), 1);
        app.cancel_search();
        assert_eq!(app.visible_tasks().len(), 2);

        app.set_filter(Filter::Low);
        let visible = app.visible_tasks();
        assert_eq!(visible.len(), 1);
        assert_eq!(visible[0].title, "Call mom");
    }

    #[test]
    fn status_message_times_out() {
        let mut app = app();
        app.notify(Notification::info("Hi", "there"));
        let shown = app.status.shown_at.unwrap();
        app.status.check_timeout(shown + Duration::from_secs(1));
        assert!(app.status.notification.is_some());
        app.status.check_timeout(shown + app.config.status_message_timeout());
        assert!(app.status.notification.is_none());
    }

    #[test]
    fn refresh_completes_on_tick() {
        let mut app = app();
        app.start_refresh();
        assert!(app.refresh.is_refreshing());
        app.tick(Instant::now() + app.config.refresh_delay());
        assert!(!app.refresh.is_refreshing());
        assert_eq!(app.status.notification.as_ref().unwrap().title, "Refreshed");
    }
}
