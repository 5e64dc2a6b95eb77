use std::{fs::File, io::BufReader, path::Path};

use anyhow::{Context, Result};
use flume::Sender;
use multiseek_search::{Position, Selection, SelectionHost, TextSource};
use ropey::{Rope, RopeSlice};

/// Notifications the document sends to whoever drives a search over it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HostEvent {
    SelectionsChanged,
    TextChanged { revision: u64 },
}

/// A rope-backed text buffer with a set of selections.
pub struct Document {
    rope: Rope,
    selections: Vec<Selection>,
    revision: u64,
    events: Sender<HostEvent>,
}

impl Document {
    pub fn new(text: &str, events: Sender<HostEvent>) -> Self {
        Self {
            rope: Rope::from_str(text),
            selections: vec![Selection::cursor(Position::default())],
            revision: 0,
            events,
        }
    }

    pub fn open(path: &Path, events: Sender<HostEvent>) -> Result<Self> {
        let file = File::open(path).with_context(|| format!("opening {}", path.display()))?;
        let rope = Rope::from_reader(BufReader::new(file))
            .with_context(|| format!("reading {}", path.display()))?;
        Ok(Self {
            rope,
            selections: vec![Selection::cursor(Position::default())],
            revision: 0,
            events,
        })
    }

    /// Replace the selections from outside any search session. Positions
    /// past the end of a line or the document are clamped.
    pub fn select(&mut self, selections: Vec<Selection>) {
        let selections = selections
            .into_iter()
            .map(|selection| {
                Selection::new(self.clamp(selection.anchor), self.clamp(selection.active))
            })
            .collect();
        self.replace_selections(selections);
    }

    /// Insert `text` at `position`, shifting every selection end that sits
    /// at or after the insertion point.
    pub fn insert(&mut self, position: Position, text: &str) {
        let at = self.char_index(position);
        let inserted = text.chars().count();
        let shift = |char_idx: usize| {
            if char_idx >= at {
                char_idx + inserted
            } else {
                char_idx
            }
        };

        let shifted: Vec<(usize, usize)> = self
            .selections
            .iter()
            .map(|selection| {
                (
                    shift(self.char_index(selection.anchor)),
                    shift(self.char_index(selection.active)),
                )
            })
            .collect();

        self.rope.insert(at, text);
        self.revision += 1;
        self.selections = shifted
            .into_iter()
            .map(|(anchor, active)| {
                Selection::new(self.char_position(anchor), self.char_position(active))
            })
            .collect();

        let _ = self.events.send(HostEvent::TextChanged {
            revision: self.revision,
        });
    }

    /// The text with selections marked inline: `[` and `]` around a
    /// selected range, `|` for an empty cursor.
    pub fn render(&self) -> String {
        let mut marks: Vec<(usize, char)> = Vec::new();
        for selection in &self.selections {
            let start = self.char_index(selection.start());
            let end = self.char_index(selection.end());
            if start == end {
                marks.push((start, '|'));
            } else {
                marks.push((start, '['));
                marks.push((end, ']'));
            }
        }
        // Closing marks sort before opening marks at the same index.
        marks.sort_by_key(|&(index, mark)| (index, mark != ']'));

        let mut rendered = String::with_capacity(self.rope.len_bytes() + marks.len());
        let mut marks = marks.into_iter().peekable();
        for (index, ch) in self.rope.chars().enumerate() {
            while let Some((_, mark)) = marks.next_if(|&(at, _)| at == index) {
                rendered.push(mark);
            }
            rendered.push(ch);
        }
        for (_, mark) in marks {
            rendered.push(mark);
        }
        rendered
    }

    fn replace_selections(&mut self, selections: Vec<Selection>) {
        self.selections = selections;
        let _ = self.events.send(HostEvent::SelectionsChanged);
    }

    fn clamp(&self, position: Position) -> Position {
        self.char_position(self.char_index(position))
    }

    fn char_index(&self, position: Position) -> usize {
        let line = position.line.min(self.rope.len_lines().saturating_sub(1));
        let slice = self.rope.line(line);
        // Columns inside a CRLF break stay addressable; anything further
        // lands on the end of the line's content.
        let column = if position.column < slice.len_chars() {
            position.column
        } else {
            content_len(slice)
        };
        self.rope.line_to_char(line) + column
    }

    fn char_position(&self, char_idx: usize) -> Position {
        let char_idx = char_idx.min(self.rope.len_chars());
        let line = self.rope.char_to_line(char_idx);
        Position::new(line, char_idx - self.rope.line_to_char(line))
    }
}

/// Characters in `line` not counting its line break.
fn content_len(line: RopeSlice<'_>) -> usize {
    let len = line.len_chars();
    if len == 0 {
        return 0;
    }
    match line.char(len - 1) {
        '\n' if len >= 2 && line.char(len - 2) == '\r' => len - 2,
        '\n' | '\r' | '\u{000B}' | '\u{000C}' | '\u{0085}' | '\u{2028}' | '\u{2029}' => len - 1,
        _ => len,
    }
}

impl TextSource for Document {
    fn text(&self) -> String {
        self.rope.to_string()
    }

    fn offset_at(&self, position: Position) -> usize {
        self.rope.char_to_byte(self.char_index(position))
    }

    fn position_at(&self, offset: usize) -> Position {
        let offset = offset.min(self.rope.len_bytes());
        self.char_position(self.rope.byte_to_char(offset))
    }

    fn revision(&self) -> u64 {
        self.revision
    }
}

impl SelectionHost for Document {
    fn selections(&self) -> Vec<Selection> {
        self.selections.clone()
    }

    fn set_selections(&mut self, selections: Vec<Selection>) {
        self.replace_selections(selections);
    }
}
