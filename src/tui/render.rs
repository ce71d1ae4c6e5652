use ratatui::Frame;
use ratatui::layout::Alignment;
use ratatui::style::Style;
use ratatui::widgets::{Block, Borders};

use crate::tui::app::Mode;
use crate::tui::widgets::{
    color::parse_color, confirm_delete::render_confirm_delete, filters_box::render_filters_box,
    form::render_task_form, header::render_header, help::render_help, status_bar::render_status_bar,
    task_list::render_task_list, task_view::render_task_view,
};
use crate::tui::{App, Layout};
use crate::utils::format_key_binding_for_display as display;

pub fn render(f: &mut Frame, app: &mut App, layout: &Layout) {
    let theme = app.config.get_active_theme();
    let fg_color = parse_color(&theme.fg);
    let bg_color = parse_color(&theme.bg);
    let outer_block = Block::default()
        .borders(Borders::ALL)
        .title("Todo")
        .title_alignment(Alignment::Center)
        .style(Style::default().fg(fg_color).bg(bg_color));
    f.render_widget(outer_block, f.area());

    let counts = app.store.counts();
    let tasks = app.visible_tasks();
    let selected = app.ui.list_state.selected().and_then(|i| tasks.get(i));

    render_header(
        f,
        layout.header_area,
        &counts,
        app.refresh.is_refreshing(),
        app.ui.spinner_tick,
        &app.config,
    );
    render_filters_box(
        f,
        layout.filters_area,
        app.filter,
        &counts,
        &app.search.query,
        app.ui.mode == Mode::Search,
        &app.config,
    );
    render_task_list(
        f,
        layout.list_area,
        &tasks,
        app.store.len(),
        &mut app.ui.list_state,
        app.today,
        &app.config,
    );
    render_task_view(f, layout.detail_area, selected, app.today, &app.config);

    // Overlays render after normal content
    match app.ui.mode {
        Mode::Help => render_help(f, f.area(), &app.config),
        Mode::Form => {
            if let Some(ref mut form) = app.form {
                render_task_form(f, f.area(), form, &app.config);
            }
        }
        Mode::View | Mode::Search => {}
    }

    if let Some(ref task) = app.modals.delete_confirmation {
        render_confirm_delete(f, f.area(), task, app.modals.delete_modal_selection, &app.config);
    }

    let key_hints = get_key_hints(app);
    render_status_bar(
        f,
        layout.status_area,
        app.status.notification.as_ref(),
        &key_hints,
        &app.config,
    );
}

fn get_key_hints(app: &App) -> Vec<String> {
    let kb = &app.config.key_bindings;
    if app.modals.delete_confirmation.is_some() {
        return vec!["↑/↓: Choose".to_string(), "Enter: Confirm".to_string(), "Esc: Cancel".to_string()];
    }
    match app.ui.mode {
        Mode::Help => vec![format!("Esc or {}: Exit help", display(&kb.help))],
        Mode::Search => vec![
            "Enter: Apply search".to_string(),
            "Esc: Clear search".to_string(),
        ],
        Mode::Form => vec![
            format!("{}: Save", display(&kb.save)),
            "Tab/Shift+Tab: Next/previous field".to_string(),
            "Esc: Cancel".to_string(),
        ],
        Mode::View => vec![
            format!("{}: Quit", display(&kb.quit)),
            format!("{}: New", display(&kb.new)),
            format!("{}: Edit", display(&kb.edit)),
            format!("{}: Toggle", display(&kb.toggle_task_status)),
            format!("{}: Delete", display(&kb.delete)),
            format!("{}: Search", display(&kb.search)),
            format!("{}/{}: Filter", display(&kb.filter_next), display(&kb.filter_prev)),
            format!("{}: Refresh", display(&kb.refresh)),
            format!("{}: Help", display(&kb.help)),
        ],
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::persistence::SqliteKeyValue;
    use crate::store::TaskStore;
    use ratatui::Terminal;
    use ratatui::backend::TestBackend;
    use ratatui::layout::Rect;

    fn buffer_text(terminal: &Terminal<TestBackend>) -> String {
        terminal
            .backend()
            .buffer()
            .content()
            .iter()
            .map(|cell| cell.symbol())
            .collect()
    }

    #[test]
    fn renders_empty_state_and_form() {
        let kv = SqliteKeyValue::open_in_memory().unwrap();
        let mut app = App::new(Config::default(), TaskStore::load(kv));
        let mut terminal = Terminal::new(TestBackend::new(100, 30)).unwrap();

        terminal
            .draw(|f| render(f, &mut app, &Layout::calculate(Rect::new(0, 0, 100, 30))))
            .unwrap();
        let text = buffer_text(&terminal);
        assert!(text.contains("No tasks yet"));
        assert!(text.contains("All (0)"));

        app.enter_create_mode();
        terminal
            .draw(|f| render(f, &mut app, &Layout::calculate(Rect::new(0, 0, 100, 30))))
            .unwrap();
        assert!(buffer_text(&terminal).contains("Add New Task"));
    }
}
