use ratatui::layout::{Constraint, Direction, Layout as RatLayout, Rect};

pub struct Layout {
    pub inner_area: Rect, // Area inside the outer border
    pub header_area: Rect,
    pub filters_area: Rect,
    pub list_area: Rect,
    pub detail_area: Rect,
    pub status_area: Rect,
}

impl Layout {
    /// Minimum terminal dimensions required for the application
    /// Width: 60 columns fits the filter bar labels with counts
    /// Height: 14 lines (2 header + 3 filters + 8 content + 1 status)
    pub const MIN_WIDTH: u16 = 60;
    pub const MIN_HEIGHT: u16 = 14;

    /// Percentage of the content width given to the task list
    const LIST_WIDTH_PERCENT: u16 = 55;

    pub fn calculate(size: Rect) -> Self {
        // Ensure minimum terminal size (accounting for outer border)
        let width = size.width.max(Self::MIN_WIDTH + 2);
        let height = size.height.max(Self::MIN_HEIGHT + 2);
        let size = Rect::new(size.x, size.y, width, height);

        let inner_area = Rect::new(
            size.x + 1,
            size.y + 1,
            size.width.saturating_sub(2),
            size.height.saturating_sub(2),
        );

        // Header (summary line + progress gauge), filter bar, content, status
        let vertical = RatLayout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(2),
                Constraint::Length(3),
                Constraint::Min(1),
                Constraint::Length(1),
            ])
            .split(inner_area);

        let horizontal = RatLayout::default()
            .direction(Direction::Horizontal)
            .constraints([
                Constraint::Percentage(Self::LIST_WIDTH_PERCENT),
                Constraint::Min(1),
            ])
            .split(vertical[2]);

        Self {
            inner_area,
            header_area: vertical[0],
            filters_area: vertical[1],
            list_area: horizontal[0],
            detail_area: horizontal[1],
            status_area: vertical[3],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn areas_stack_inside_border() {
        let layout = Layout::calculate(Rect::new(0, 0, 100, 30));
        assert_eq!(layout.inner_area, Rect::new(1, 1, 98, 28));
        assert_eq!(layout.header_area.height, 2);
        assert_eq!(layout.filters_area.y, 3);
        assert_eq!(layout.status_area.y, 28);
        assert_eq!(layout.list_area.width + layout.detail_area.width, 98);
    }

    #[test]
    fn small_terminals_are_clamped() {
        let layout = Layout::calculate(Rect::new(0, 0, 10, 5));
        assert_eq!(layout.inner_area.width, Layout::MIN_WIDTH);
        assert_eq!(layout.inner_area.height, Layout::MIN_HEIGHT);
    }
}
