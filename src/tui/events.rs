use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use crossterm::execute;
use crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode, size as terminal_size,
};
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;
use ratatui::layout::Rect;
use std::io;
use std::time::{Duration, Instant};
use tracing::{debug, info};

use crate::tui::app::{App, Mode};
use crate::tui::error::TuiError;
use crate::tui::layout::Layout;
use crate::tui::widgets::confirm_delete::DELETE_OPTIONS;
use crate::utils::{ParsedKeyBinding, parse_key_binding};

/// How long to wait for input before running a tick
const TICK_RATE: Duration = Duration::from_millis(100);

/// Guard that ensures terminal state is restored even on panic
/// If the terminal is left in raw mode or alternate screen, the user's
/// terminal will be unusable.
struct TerminalGuard {
    raw_mode_enabled: bool,
    alternate_screen_enabled: bool,
}

impl TerminalGuard {
    fn new() -> Result<Self, TuiError> {
        enable_raw_mode()?;
        execute!(io::stdout(), EnterAlternateScreen)?;
        Ok(Self {
            raw_mode_enabled: true,
            alternate_screen_enabled: true,
        })
    }

    /// Restore terminal state (called on normal exit)
    /// After calling this, the guard will do nothing on drop
    fn restore(&mut self) -> Result<(), TuiError> {
        if self.raw_mode_enabled {
            disable_raw_mode()?;
            self.raw_mode_enabled = false;
        }
        if self.alternate_screen_enabled {
            execute!(io::stdout(), LeaveAlternateScreen)?;
            self.alternate_screen_enabled = false;
        }
        Ok(())
    }
}

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        // Ignore errors in drop - we're already in a cleanup path
        if self.raw_mode_enabled {
            let _ = disable_raw_mode();
        }
        if self.alternate_screen_enabled {
            let _ = execute!(io::stdout(), LeaveAlternateScreen);
        }
    }
}

pub fn run_event_loop(mut app: App) -> Result<(), TuiError> {
    // Check terminal size before entering alternate screen so the error
    // message lands in the normal terminal
    let (width, height) = terminal_size()?;
    let min_width = Layout::MIN_WIDTH + 2;
    let min_height = Layout::MIN_HEIGHT + 2;
    if width < min_width || height < min_height {
        return Err(TuiError::RenderError(format!(
            "Terminal size too small. Current: {}x{}, Minimum required: {}x{}. Please resize your terminal window.",
            width, height, min_width, min_height
        )));
    }

    let mut guard = TerminalGuard::new()?;
    let backend = CrosstermBackend::new(io::stdout());
    let mut terminal = Terminal::new(backend)?;
    info!(tasks = app.store.len(), "tui started");

    loop {
        app.tick(Instant::now());

        let size = terminal.size()?;
        let terminal_rect = Rect::new(0, 0, size.width, size.height);
        terminal.draw(|f| {
            let layout = Layout::calculate(terminal_rect);
            crate::tui::render::render(f, &mut app, &layout);
        })?;

        // Only process Press events to avoid duplicate processing on Windows
        if event::poll(TICK_RATE)?
            && let Event::Key(key_event) = event::read()?
            && key_event.kind == KeyEventKind::Press
            && handle_key_event(&mut app, key_event)?
        {
            break;
        }
    }

    guard.restore()?;
    info!("tui stopped");
    Ok(())
}

fn binding(key: &str) -> Result<ParsedKeyBinding, TuiError> {
    parse_key_binding(key).map_err(TuiError::KeyBindingError)
}

fn matches_key_event(key_event: KeyEvent, key: &str) -> Result<bool, TuiError> {
    Ok(binding(key)?.matches(&key_event))
}

/// Returns Ok(true) when the user asked to quit
pub fn handle_key_event(app: &mut App, key_event: KeyEvent) -> Result<bool, TuiError> {
    // Delete confirmation modal takes precedence over every mode
    if app.modals.delete_confirmation.is_some() {
        handle_delete_confirmation_modal(app, key_event);
        return Ok(false);
    }

    match app.ui.mode {
        Mode::Form => handle_form_mode(app, key_event),
        Mode::Help => handle_help_mode(app, key_event),
        Mode::Search => {
            handle_search_mode(app, key_event);
            Ok(false)
        }
        Mode::View => handle_global_key_bindings(app, key_event),
    }
}

fn handle_delete_confirmation_modal(app: &mut App, key_event: KeyEvent) {
    let options = DELETE_OPTIONS.len();
    match key_event.code {
        KeyCode::Up | KeyCode::Char('k') => {
            app.modals.delete_modal_selection = (app.modals.delete_modal_selection + options - 1) % options;
        }
        KeyCode::Down | KeyCode::Char('j') | KeyCode::Tab => {
            app.modals.delete_modal_selection = (app.modals.delete_modal_selection + 1) % options;
        }
        KeyCode::Enter => {
            if app.modals.delete_modal_selection == 0 {
                app.confirm_delete();
            } else {
                app.cancel_delete();
            }
        }
        KeyCode::Char('y') => app.confirm_delete(),
        KeyCode::Esc | KeyCode::Char('n') => app.cancel_delete(),
        _ => {
            // Ignore all other keys when confirmation modal is shown
        }
    }
}

fn handle_help_mode(app: &mut App, key_event: KeyEvent) -> Result<bool, TuiError> {
    if key_event.code == KeyCode::Esc || matches_key_event(key_event, &app.config.key_bindings.help)? {
        app.exit_help_mode();
    }
    Ok(false)
}

fn handle_search_mode(app: &mut App, key_event: KeyEvent) {
    match key_event.code {
        KeyCode::Esc => app.cancel_search(),
        KeyCode::Enter => app.exit_search_mode(),
        KeyCode::Backspace => app.remove_from_search(),
        KeyCode::Char(c) if !key_event.modifiers.contains(KeyModifiers::CONTROL) => app.add_to_search(c),
        _ => {}
    }
}

fn handle_form_mode(app: &mut App, key_event: KeyEvent) -> Result<bool, TuiError> {
    if matches_key_event(key_event, &app.config.key_bindings.save)? {
        app.save_form();
        return Ok(false);
    }

    match key_event.code {
        KeyCode::Esc => {
            debug!("form cancelled");
            app.exit_form_mode();
            return Ok(false);
        }
        KeyCode::Tab => {
            app.navigate_form_field(true);
            return Ok(false);
        }
        KeyCode::BackTab => {
            app.navigate_form_field(false);
            return Ok(false);
        }
        _ => {}
    }

    if app.is_priority_field_active() {
        match key_event.code {
            KeyCode::Left | KeyCode::Up => app.lower_form_priority(),
            KeyCode::Right | KeyCode::Down | KeyCode::Char(' ') => app.raise_form_priority(),
            KeyCode::Enter => app.save_form(),
            _ => {}
        }
        return Ok(false);
    }

    let multi_line = app
        .form
        .as_ref()
        .is_some_and(|f| f.current_field == crate::tui::app::TaskField::Description);

    // Enter on a single-line field moves to the next field
    if key_event.code == KeyCode::Enter && !multi_line {
        app.navigate_form_field(true);
        return Ok(false);
    }

    if let Some(editor) = app.get_current_form_editor() {
        match key_event.code {
            KeyCode::Char(c) if !key_event.modifiers.contains(KeyModifiers::CONTROL) => editor.insert_char(c),
            KeyCode::Enter => editor.insert_newline(),
            KeyCode::Backspace => editor.delete_char(),
            KeyCode::Delete => editor.delete_forward(),
            KeyCode::Left => editor.move_cursor_left(),
            KeyCode::Right => editor.move_cursor_right(),
            KeyCode::Up => editor.move_cursor_up(),
            KeyCode::Down => editor.move_cursor_down(),
            KeyCode::Home => editor.move_cursor_home(),
            KeyCode::End => editor.move_cursor_end(),
            _ => {}
        }
    }
    Ok(false)
}

fn handle_global_key_bindings(app: &mut App, key_event: KeyEvent) -> Result<bool, TuiError> {
    let kb = app.config.key_bindings.clone();

    if matches_key_event(key_event, &kb.quit)? {
        return Ok(true);
    }
    if matches_key_event(key_event, &kb.help)? {
        app.enter_help_mode();
    } else if matches_key_event(key_event, &kb.new)? {
        app.enter_create_mode();
    } else if matches_key_event(key_event, &kb.edit)? {
        app.enter_edit_mode();
    } else if matches_key_event(key_event, &kb.delete)? {
        app.request_delete();
    } else if matches_key_event(key_event, &kb.toggle_task_status)? {
        app.toggle_selected();
    } else if matches_key_event(key_event, &kb.search)? {
        app.enter_search_mode();
    } else if matches_key_event(key_event, &kb.filter_next)? {
        app.next_filter();
    } else if matches_key_event(key_event, &kb.filter_prev)? {
        app.prev_filter();
    } else if matches_key_event(key_event, &kb.refresh)? {
        app.start_refresh();
    } else if key_event.code == KeyCode::Up || matches_key_event(key_event, &kb.list_up)? {
        app.move_selection_up();
    } else if key_event.code == KeyCode::Down || matches_key_event(key_event, &kb.list_down)? {
        app.move_selection_down();
    } else if key_event.code == KeyCode::Esc && !app.search.query.is_empty() {
        app.cancel_search();
    }
    Ok(false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::persistence::SqliteKeyValue;
    use crate::store::TaskStore;

    fn app() -> App {
        let kv = SqliteKeyValue::open_in_memory().unwrap();
        App::new(Config::default(), TaskStore::load(kv))
    }

    fn press(app: &mut App, code: KeyCode) -> bool {
        handle_key_event(app, KeyEvent::new(code, KeyModifiers::NONE)).unwrap()
    }

    fn type_text(app: &mut App, text: &str) {
        for ch in text.chars() {
            press(app, KeyCode::Char(ch));
        }
    }

    fn save(app: &mut App) {
        handle_key_event(app, KeyEvent::new(KeyCode::Char('s'), KeyModifiers::CONTROL)).unwrap();
    }

    #[test]
    fn quit_key_stops_loop() {
        let mut app = app();
        assert!(press(&mut app, KeyCode::Char('q')));
    }

    #[test]
    fn keyboard_create_edit_toggle_delete() {
        let mut app = app();

        press(&mut app, KeyCode::Char('n'));
        assert_eq!(app.ui.mode, Mode::Form);
        // 'q' while typing is text, not quit
        assert!(!press(&mut app, KeyCode::Char('q')));
        type_text(&mut app, "uarterly report");
        save(&mut app);
        assert_eq!(app.store.len(), 1);
        assert_eq!(app.store.tasks()[0].title, "quarterly report");

        press(&mut app, KeyCode::Char(' '));
        assert!(app.store.tasks()[0].is_completed());

        press(&mut app, KeyCode::Char('e'));
        press(&mut app, KeyCode::BackTab);
        press(&mut app, KeyCode::Right);
        save(&mut app);
        assert_eq!(app.store.tasks()[0].priority, crate::models::Priority::High);

        press(&mut app, KeyCode::Char('d'));
        assert!(app.modals.delete_confirmation.is_some());
        press(&mut app, KeyCode::Down);
        press(&mut app, KeyCode::Enter);
        assert_eq!(app.store.len(), 1, "Cancel keeps the task");

        press(&mut app, KeyCode::Char('d'));
        press(&mut app, KeyCode::Enter);
        assert!(app.store.is_empty());
    }

    #[test]
    fn search_typing_filters_live() {
        let mut app = app();
        for title in ["alpha", "beta"] {
            press(&mut app, KeyCode::Char('n'));
            type_text(&mut app, title);
            save(&mut app);
        }

        press(&mut app, KeyCode::Char('/'));
        type_text(&mut app, "ALP");
        assert_eq!(app.visible_tasks().len(), 1);
        press(&mut app, KeyCode::Enter);
        assert_eq!(app.ui.mode, Mode::View);
        assert_eq!(app.search.query, "ALP");

        press(&mut app, KeyCode::Esc);
        assert_eq!(app.visible_tasks().len(), 2);
    }

    #[test]
    fn filter_keys_cycle() {
        let mut app = app();
        press(&mut app, KeyCode::Char('f'));
        assert_eq!(app.filter, crate::pipeline::Filter::Open);
        handle_key_event(&mut app, KeyEvent::new(KeyCode::Char('F'), KeyModifiers::SHIFT)).unwrap();
        assert_eq!(app.filter, crate::pipeline::Filter::All);
    }

    #[test]
    fn help_toggles_with_f1() {
        let mut app = app();
        press(&mut app, KeyCode::F(1));
        assert_eq!(app.ui.mode, Mode::Help);
        press(&mut app, KeyCode::F(1));
        assert_eq!(app.ui.mode, Mode::View);
    }
}
