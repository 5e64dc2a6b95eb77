use std::cmp::Ordering;

/// A point in the document. Both fields are zero-based; `column` counts
/// characters, not bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Position {
    pub line: usize,
    pub column: usize,
}

impl Position {
    pub const fn new(line: usize, column: usize) -> Self {
        Self { line, column }
    }
}

/// An ordered pair of positions, `start <= end`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Range {
    pub start: Position,
    pub end: Position,
}

impl Range {
    /// Builds a range from two positions in any order.
    pub fn new(a: Position, b: Position) -> Self {
        if b < a {
            Self { start: b, end: a }
        } else {
            Self { start: a, end: b }
        }
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    pub fn contains(&self, position: Position) -> bool {
        position >= self.start && position < self.end
    }
}

/// A range with a direction. The anchor stays put while the active end is
/// where the cursor sits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Selection {
    pub anchor: Position,
    pub active: Position,
}

impl Selection {
    pub const fn new(anchor: Position, active: Position) -> Self {
        Self { anchor, active }
    }

    pub const fn cursor(position: Position) -> Self {
        Self::new(position, position)
    }

    pub fn start(&self) -> Position {
        self.anchor.min(self.active)
    }

    pub fn end(&self) -> Position {
        self.anchor.max(self.active)
    }

    pub fn is_reversed(&self) -> bool {
        self.active < self.anchor
    }

    pub fn is_empty(&self) -> bool {
        self.anchor == self.active
    }

    pub fn range(&self) -> Range {
        Range::new(self.anchor, self.active)
    }
}

impl From<Range> for Selection {
    fn from(range: Range) -> Self {
        Self::new(range.start, range.end)
    }
}

/// Anything with ordered bounds that the normalizer can merge.
pub trait Span: Copy {
    fn start(&self) -> Position;
    fn end(&self) -> Position;
    /// Rebuilds a value covering `start..end` after a merge.
    fn spanning(start: Position, end: Position) -> Self;
}

impl Span for Range {
    fn start(&self) -> Position {
        self.start
    }

    fn end(&self) -> Position {
        self.end
    }

    fn spanning(start: Position, end: Position) -> Self {
        Self { start, end }
    }
}

impl Span for Selection {
    fn start(&self) -> Position {
        Selection::start(self)
    }

    fn end(&self) -> Position {
        Selection::end(self)
    }

    fn spanning(start: Position, end: Position) -> Self {
        Self::new(start, end)
    }
}

fn span_order<T: Span>(a: &T, b: &T) -> Ordering {
    a.start().cmp(&b.start()).then_with(|| a.end().cmp(&b.end()))
}

/// Sorts `spans` and merges every overlapping or touching pair, producing
/// the minimal ordered set covering the same positions.
pub fn normalize<T: Span>(spans: &[T]) -> Vec<T> {
    let mut sorted = spans.to_vec();
    sorted.sort_by(span_order);

    let mut merged: Vec<T> = Vec::with_capacity(sorted.len());
    for span in sorted {
        if let Some(last) = merged.last_mut()
            && span.start() <= last.end()
        {
            if span.end() > last.end() {
                *last = T::spanning(last.start(), span.end());
            }
            continue;
        }
        merged.push(span);
    }

    merged
}

/// Like [`normalize`] but only merges spans that share positions or start
/// together, so adjacent spans stay separate.
pub fn merge_overlapping<T: Span>(spans: &[T]) -> Vec<T> {
    let mut sorted = spans.to_vec();
    sorted.sort_by(span_order);

    let mut merged: Vec<T> = Vec::with_capacity(sorted.len());
    for span in sorted {
        if let Some(last) = merged.last_mut()
            && (span.start() < last.end() || span.start() == last.start())
        {
            if span.end() > last.end() {
                *last = T::spanning(last.start(), span.end());
            }
            continue;
        }
        merged.push(span);
    }

    merged
}
