use ratatui::Frame;
use ratatui::layout::{Alignment, Rect};
use ratatui::style::Style;
use ratatui::widgets::{Block, Borders, Clear, Paragraph, Wrap};

use crate::Config;
use crate::tui::widgets::color::parse_color;
use crate::tui::widgets::popup_area;
use crate::utils::format_key_binding_for_display as display;

pub fn render_help(f: &mut Frame, area: Rect, config: &Config) {
    let theme = config.get_active_theme();
    let fg_color = parse_color(&theme.fg);
    let bg_color = parse_color(&theme.bg);

    // Calculate popup area (60% width, 70% height, centered)
    let popup_area = popup_area(area, 60, 70);
    f.render_widget(Clear, popup_area);

    let paragraph = Paragraph::new(build_help_text(config))
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title("Help - Key Bindings")
                .title_alignment(Alignment::Center)
                .style(Style::default().fg(fg_color).bg(bg_color)),
        )
        .style(Style::default().fg(fg_color).bg(bg_color))
        .wrap(Wrap { trim: false });

    f.render_widget(paragraph, popup_area);
}

pub fn build_help_text(config: &Config) -> String {
    let kb = &config.key_bindings;
    let mut text = String::new();

    text.push_str("Navigation:\n");
    text.push_str(&format!("  {} / {} or ↑/↓: Move selection\n", display(&kb.list_up), display(&kb.list_down)));
    text.push_str(&format!("  {}: Search titles and descriptions\n", display(&kb.search)));
    text.push_str(&format!(
        "  {} / {}: Next / previous filter\n",
        display(&kb.filter_next),
        display(&kb.filter_prev)
    ));
    text.push('\n');

    text.push_str("Tasks:\n");
    text.push_str(&format!("  {}: New task\n", display(&kb.new)));
    text.push_str(&format!("  {}: Edit selected task\n", display(&kb.edit)));
    text.push_str(&format!("  {}: Toggle complete\n", display(&kb.toggle_task_status)));
    text.push_str(&format!("  {}: Delete selected task\n", display(&kb.delete)));
    text.push_str(&format!("  {}: Refresh\n", display(&kb.refresh)));
    text.push('\n');

    text.push_str("Task Form:\n");
    text.push_str(&format!("  {}: Save\n", display(&kb.save)));
    text.push_str("  Tab / Shift+Tab: Next / previous field\n");
    text.push_str("  ←/→ on Priority: Change priority\n");
    text.push_str("  Esc: Cancel\n");
    text.push('\n');

    text.push_str("General:\n");
    text.push_str(&format!("  {}: Quit\n", display(&kb.quit)));
    text.push_str(&format!("  {}: Show/hide help\n", display(&kb.help)));

    text
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn help_uses_configured_bindings() {
        let mut config = Config::default();
        config.key_bindings.new = "a".to_string();
        let text = build_help_text(&config);
        assert!(text.contains("  a: New task\n"));
        assert!(text.contains(&format!("{}: Save", display("Ctrl+s"))));
    }
}
