pub mod color;
pub mod confirm_delete;
pub mod editor;
pub mod filters_box;
pub mod form;
pub mod header;
pub mod help;
pub mod status_bar;
pub mod task_list;
pub mod task_view;

use ratatui::layout::{Constraint, Flex, Layout, Rect};

/// Helper function to create a centered rect using up certain percentage of the available rect
/// Based on ratatui popup example: https://ratatui.rs/examples/apps/popup/
pub(crate) fn popup_area(area: Rect, percent_x: u16, percent_y: u16) -> Rect {
    let vertical = Layout::vertical([Constraint::Percentage(percent_y)]).flex(Flex::Center);
    let horizontal = Layout::horizontal([Constraint::Percentage(percent_x)]).flex(Flex::Center);
    let [area] = vertical.areas(area);
    let [area] = horizontal.areas(area);
    area
}

/// Cut `text` to `max_width` characters, ending with "..." when shortened
pub(crate) fn truncate(text: &str, max_width: usize) -> String {
    if text.chars().count() <= max_width {
        text.to_string()
    } else if max_width < 3 {
        text.chars().take(max_width).collect()
    } else {
        text.chars().take(max_width - 3).collect::<String>() + "..."
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn popup_is_centered() {
        let area = popup_area(Rect::new(0, 0, 100, 50), 50, 40);
        assert_eq!(area, Rect::new(25, 15, 50, 20));
    }

    #[test]
    fn truncate_adds_ellipsis() {
        assert_eq!(truncate("short", 10), "short");
        assert_eq!(truncate("a longer title", 8), "a lon...");
        assert_eq!(truncate("exactly8", 8), "exactly8");
    }

    #[test]
    fn truncate_never_exceeds_tiny_widths() {
        assert_eq!(truncate("title", 2), "ti");
        assert_eq!(truncate("title", 0), "");
        assert_eq!(truncate("title", 3), "...");
    }
}
