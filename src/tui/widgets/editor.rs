use ratatui::layout::Rect;
use std::cmp;

/// Text input used by the task form. Lines are stored separately; the cursor
/// column counts characters, not bytes.
#[derive(Debug, Clone)]
pub struct Editor {
    pub lines: Vec<String>,
    pub cursor_line: usize,
    pub cursor_col: usize,
    pub scroll_offset: usize, // Vertical scroll (line offset)
    pub scroll_col: usize,    // Horizontal scroll (column offset)
    /// Upper bound on total characters (newlines included); None = unlimited
    pub max_chars: Option<usize>,
}

impl Default for Editor {
    fn default() -> Self {
        Self::new()
    }
}

impl Editor {
    pub fn new() -> Self {
        Self {
            lines: vec![String::new()],
            cursor_line: 0,
            cursor_col: 0,
            scroll_offset: 0,
            scroll_col: 0,
            max_chars: None,
        }
    }

    pub fn from_string(content: &str) -> Self {
        let lines: Vec<String> = if content.is_empty() {
            vec![String::new()]
        } else {
            content.split('\n').map(|s| s.to_string()).collect()
        };
        let cursor_line = lines.len().saturating_sub(1);
        let cursor_col = lines.last().map(|l| l.chars().count()).unwrap_or(0);
        Self {
            lines,
            cursor_line,
            cursor_col,
            ..Self::new()
        }
    }

    pub fn with_max_chars(mut self, max: usize) -> Self {
        self.max_chars = Some(max);
        self
    }

    /// Total characters, counting each line break as one
    pub fn char_count(&self) -> usize {
        let chars: usize = self.lines.iter().map(|l| l.chars().count()).sum();
        chars + self.lines.len().saturating_sub(1)
    }

    fn has_room(&self) -> bool {
        self.max_chars.is_none_or(|max| self.char_count() < max)
    }

    /// Ensure cursor_line is within valid bounds
    fn ensure_cursor_valid(&mut self) {
        if self.lines.is_empty() {
            self.lines.push(String::new());
        }
        if self.cursor_line >= self.lines.len() {
            self.cursor_line = self.lines.len() - 1;
        }
        let len = self.lines[self.cursor_line].chars().count();
        self.cursor_col = cmp::min(self.cursor_col, len);
    }

    /// Byte offset of a character column within a line
    fn byte_index(line: &str, col: usize) -> usize {
        line.char_indices().nth(col).map(|(i, _)| i).unwrap_or(line.len())
    }

    pub fn insert_char(&mut self, ch: char) {
        if ch == '\n' {
            self.insert_newline();
            return;
        }
        if !self.has_room() {
            return;
        }
        self.ensure_cursor_valid();
        let line = &mut self.lines[self.cursor_line];
        let idx = Self::byte_index(line, self.cursor_col);
        line.insert(idx, ch);
        self.cursor_col += 1;
    }

    pub fn insert_newline(&mut self) {
        if !self.has_room() {
            return;
        }
        self.ensure_cursor_valid();
        let line = &mut self.lines[self.cursor_line];
        let idx = Self::byte_index(line, self.cursor_col);
        let rest = line.split_off(idx);
        self.lines.insert(self.cursor_line + 1, rest);
        self.cursor_line += 1;
        self.cursor_col = 0;
    }

    /// Backspace: delete the character before the cursor, joining lines at column 0
    pub fn delete_char(&mut self) {
        self.ensure_cursor_valid();
        if self.cursor_col > 0 {
            let line = &mut self.lines[self.cursor_line];
            let idx = Self::byte_index(line, self.cursor_col - 1);
            line.remove(idx);
            self.cursor_col -= 1;
        } else if self.cursor_line > 0 {
            let current = self.lines.remove(self.cursor_line);
            self.cursor_line -= 1;
            let prev = &mut self.lines[self.cursor_line];
            self.cursor_col = prev.chars().count();
            prev.push_str(&current);
        }
    }

    /// Delete the character under the cursor
    pub fn delete_forward(&mut self) {
        self.ensure_cursor_valid();
        let len = self.lines[self.cursor_line].chars().count();
        if self.cursor_col < len {
            let line = &mut self.lines[self.cursor_line];
            let idx = Self::byte_index(line, self.cursor_col);
            line.remove(idx);
        } else if self.cursor_line + 1 < self.lines.len() {
            let next = self.lines.remove(self.cursor_line + 1);
            self.lines[self.cursor_line].push_str(&next);
        }
    }

    pub fn move_cursor_left(&mut self) {
        self.ensure_cursor_valid();
        if self.cursor_col > 0 {
            self.cursor_col -= 1;
        } else if self.cursor_line > 0 {
            self.cursor_line -= 1;
            self.cursor_col = self.lines[self.cursor_line].chars().count();
        }
    }

    pub fn move_cursor_right(&mut self) {
        self.ensure_cursor_valid();
        let len = self.lines[self.cursor_line].chars().count();
        if self.cursor_col < len {
            self.cursor_col += 1;
        } else if self.cursor_line + 1 < self.lines.len() {
            self.cursor_line += 1;
            self.cursor_col = 0;
        }
    }

    pub fn move_cursor_up(&mut self) {
        if self.cursor_line > 0 {
            self.cursor_line -= 1;
        }
        self.ensure_cursor_valid();
    }

    pub fn move_cursor_down(&mut self) {
        if self.cursor_line + 1 < self.lines.len() {
            self.cursor_line += 1;
        }
        self.ensure_cursor_valid();
    }

    pub fn move_cursor_home(&mut self) {
        self.cursor_col = 0;
    }

    pub fn move_cursor_end(&mut self) {
        self.ensure_cursor_valid();
        self.cursor_col = self.lines[self.cursor_line].chars().count();
    }

    /// Lines inside the viewport, horizontally scrolled and clipped
    pub fn get_visible_lines(&self, viewport_height: usize, viewport_width: usize) -> Vec<String> {
        let start = cmp::min(self.scroll_offset, self.lines.len());
        let end = cmp::min(start + viewport_height, self.lines.len());
        self.lines[start..end]
            .iter()
            .map(|line| line.chars().skip(self.scroll_col).take(viewport_width).collect())
            .collect()
    }

    /// Keep the cursor inside a viewport of `viewport_height` lines
    pub fn update_scroll(&mut self, viewport_height: usize) {
        let viewport_height = viewport_height.max(1);
        if self.cursor_line < self.scroll_offset {
            self.scroll_offset = self.cursor_line;
        } else if self.cursor_line >= self.scroll_offset + viewport_height {
            self.scroll_offset = self.cursor_line + 1 - viewport_height;
        }
    }

    /// Keep the cursor inside a viewport of `viewport_width` columns
    pub fn update_horizontal_scroll(&mut self, viewport_width: usize) {
        let viewport_width = viewport_width.max(1);
        if self.cursor_col < self.scroll_col {
            self.scroll_col = self.cursor_col;
        } else if self.cursor_col >= self.scroll_col + viewport_width {
            self.scroll_col = self.cursor_col + 1 - viewport_width;
        }
    }

    pub fn text(&self) -> String {
        self.lines.join("\n")
    }

    /// Screen position of the cursor inside a bordered `area`, if visible
    pub fn get_cursor_screen_pos(&self, area: Rect) -> Option<(u16, u16)> {
        let inner_height = area.height.saturating_sub(2) as usize;
        let inner_width = area.width.saturating_sub(2) as usize;
        if self.cursor_line < self.scroll_offset || self.cursor_col < self.scroll_col {
            return None;
        }
        let row = self.cursor_line - self.scroll_offset;
        let col = self.cursor_col - self.scroll_col;
        if row >= inner_height || col >= inner_width {
            return None;
        }
        Some((area.x + 1 + col as u16, area.y + 1 + row as u16))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn type_str(editor: &mut Editor, s: &str) {
        for ch in s.chars() {
            editor.insert_char(ch);
        }
    }

    #[test]
    fn inserts_and_deletes_multibyte_text() {
        let mut editor = Editor::new();
        type_str(&mut editor, "café");
        editor.move_cursor_left();
        editor.delete_char();
        assert_eq!(editor.text(), "caé");
        editor.delete_forward();
        assert_eq!(editor.text(), "ca");
    }

    #[test]
    fn newline_splits_and_backspace_joins() {
        let mut editor = Editor::from_string("hello world");
        for _ in 0..6 {
            editor.move_cursor_left();
        }
        editor.insert_newline();
        assert_eq!(editor.lines, vec!["hello", " world"]);
        editor.delete_char();
        assert_eq!(editor.text(), "hello world");
        assert_eq!((editor.cursor_line, editor.cursor_col), (0, 5));
    }

    #[test]
    fn respects_character_limit() {
        let mut editor = Editor::new().with_max_chars(5);
        type_str(&mut editor, "abc\ndefg");
        assert_eq!(editor.char_count(), 5);
        assert_eq!(editor.text(), "abc\nd");
    }

    #[test]
    fn vertical_moves_clamp_column() {
        let mut editor = Editor::from_string("a long line\nab");
        editor.move_cursor_up();
        editor.move_cursor_end();
        editor.move_cursor_down();
        assert_eq!((editor.cursor_line, editor.cursor_col), (1, 2));
    }

    #[test]
    fn scrolling_keeps_cursor_visible() {
        let mut editor = Editor::from_string("1\n2\n3\n4\n5");
        editor.update_scroll(2);
        assert_eq!(editor.scroll_offset, 3);
        assert_eq!(editor.get_visible_lines(2, 10), vec!["4", "5"]);

        let area = Rect::new(0, 0, 10, 4);
        assert_eq!(editor.get_cursor_screen_pos(area), Some((2, 2)));
    }
}
