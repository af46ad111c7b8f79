use unicode_width::UnicodeWidthChar;

/// Single-line editor behind the input box.
///
/// The cursor counts chars, not bytes, so multi-byte input (Hangul, emoji)
/// can be edited without landing inside a code point.
#[derive(Debug, Default, Clone)]
pub struct InputLine {
    text: String,
    cursor: usize,
}

impl InputLine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    /// Replace the contents and put the cursor at the end.
    pub fn set(&mut self, text: impl Into<String>) {
        self.text = text.into();
        self.cursor = self.char_len();
    }

    /// Take the contents, leaving the line empty.
    pub fn take(&mut self) -> String {
        self.cursor = 0;
        std::mem::take(&mut self.text)
    }

    pub fn insert(&mut self, c: char) {
        let at = self.byte_index(self.cursor);
        self.text.insert(at, c);
        self.cursor += 1;
    }

    /// Paste text at the cursor. Line breaks become spaces since the box is
    /// one line.
    pub fn insert_str(&mut self, s: &str) {
        let cleaned: String = s
            .chars()
            .filter(|c| *c != '\r')
            .map(|c| if c == '\n' { ' ' } else { c })
            .collect();
        let at = self.byte_index(self.cursor);
        self.text.insert_str(at, &cleaned);
        self.cursor += cleaned.chars().count();
    }

    pub fn backspace(&mut self) {
        if self.cursor == 0 {
            return;
        }
        let at = self.byte_index(self.cursor - 1);
        self.text.remove(at);
        self.cursor -= 1;
    }

    pub fn delete(&mut self) {
        if self.cursor < self.char_len() {
            let at = self.byte_index(self.cursor);
            self.text.remove(at);
        }
    }

    pub fn left(&mut self) {
        self.cursor = self.cursor.saturating_sub(1);
    }

    pub fn right(&mut self) {
        if self.cursor < self.char_len() {
            self.cursor += 1;
        }
    }

    pub fn home(&mut self) {
        self.cursor = 0;
    }

    pub fn end(&mut self) {
        self.cursor = self.char_len();
    }

    pub fn word_left(&mut self) {
        self.cursor = self.word_boundary_left();
    }

    pub fn word_right(&mut self) {
        self.cursor = self.word_boundary_right();
    }

    /// Ctrl+U
    pub fn kill_to_start(&mut self) {
        let at = self.byte_index(self.cursor);
        self.text.drain(..at);
        self.cursor = 0;
    }

    /// Ctrl+K
    pub fn kill_to_end(&mut self) {
        let at = self.byte_index(self.cursor);
        self.text.truncate(at);
    }

    /// Ctrl+W
    pub fn delete_word_back(&mut self) {
        let start = self.word_boundary_left();
        let from = self.byte_index(start);
        let to = self.byte_index(self.cursor);
        self.text.drain(from..to);
        self.cursor = start;
    }

    /// The slice of the line that fits in `width` terminal cells, scrolled so
    /// the cursor stays visible, and the cursor's cell column within it.
    ///
    /// Wide chars (Hangul, CJK) take two cells.
    pub fn visible_window(&self, width: usize) -> (String, usize) {
        let cells: Vec<(char, usize)> = self
            .text
            .chars()
            .map(|c| (c, c.width().unwrap_or(0)))
            .collect();
        let cursor = self.cursor.min(cells.len());

        // One cell stays free for the cursor itself
        let room = width.saturating_sub(1);
        let mut start = 0;
        let mut column: usize = cells[..cursor].iter().map(|(_, w)| w).sum();
        while column > room && start < cursor {
            column -= cells[start].1;
            start += 1;
        }

        let mut shown = String::new();
        let mut used = 0;
        for &(c, w) in &cells[start..] {
            if used + w > width {
                break;
            }
            shown.push(c);
            used += w;
        }
        (shown, column)
    }

    fn char_len(&self) -> usize {
        self.text.chars().count()
    }

    fn byte_index(&self, char_pos: usize) -> usize {
        self.text
            .char_indices()
            .nth(char_pos)
            .map(|(i, _)| i)
            .unwrap_or(self.text.len())
    }

    fn word_boundary_left(&self) -> usize {
        let chars: Vec<char> = self.text.chars().collect();
        let mut i = self.cursor.min(chars.len());
        // Skip whitespace, then the word itself
        while i > 0 && chars[i - 1].is_whitespace() {
            i -= 1;
        }
        while i > 0 && !chars[i - 1].is_whitespace() {
            i -= 1;
        }
        i
    }

    fn word_boundary_right(&self) -> usize {
        let chars: Vec<char> = self.text.chars().collect();
        let len = chars.len();
        let mut i = self.cursor.min(len);
        while i < len && !chars[i].is_whitespace() {
            i += 1;
        }
        while i < len && chars[i].is_whitespace() {
            i += 1;
        }
        i
    }
}

/// Previously submitted lines, recalled with Up/Down.
#[derive(Debug, Default)]
pub struct InputHistory {
    entries: Vec<String>,
    pos: Option<usize>,
}

impl InputHistory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Consecutive duplicates are stored once.
    pub fn push(&mut self, input: String) {
        if !input.is_empty() && self.entries.last() != Some(&input) {
            self.entries.push(input);
        }
        self.pos = None;
    }

    pub fn older(&mut self) -> Option<&str> {
        if self.entries.is_empty() {
            return None;
        }
        let pos = match self.pos {
            None => self.entries.len() - 1,
            Some(p) => p.saturating_sub(1),
        };
        self.pos = Some(pos);
        Some(&self.entries[pos])
    }

    /// `Some("")` once the walk moves past the newest entry.
    pub fn newer(&mut self) -> Option<&str> {
        let pos = self.pos?;
        if pos + 1 >= self.entries.len() {
            self.pos = None;
            Some("")
        } else {
            self.pos = Some(pos + 1);
            Some(&self.entries[pos + 1])
        }
    }
}
