//! Rendering context and placeholder allocation.
//!
//! There is no shared counter: the pipeline builds a fresh [`RenderContext`]
//! for every clause, seeded with the number of placeholders consumed so far
//! (skeleton placeholders plus every argument rendered by earlier clauses).

use std::fmt::Write;

/// Per-clause rendering state handed out by the build pipeline.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RenderContext {
    offset: usize,
    where_present: bool,
}

impl RenderContext {
    /// Create a context whose first placeholder is `$offset + 1`.
    pub fn new(offset: usize) -> Self {
        Self {
            offset,
            where_present: false,
        }
    }

    /// Mark the statement as already carrying a `WHERE` keyword.
    pub fn with_where_present(mut self, present: bool) -> Self {
        self.where_present = present;
        self
    }

    /// Number of placeholders consumed before this clause.
    pub fn offset(&self) -> usize {
        self.offset
    }

    /// Whether a `WHERE` keyword has already been emitted.
    pub fn where_present(&self) -> bool {
        self.where_present
    }

    /// Start allocating placeholders for this clause.
    pub fn placeholders(&self) -> Placeholders {
        Placeholders::after(self.offset)
    }
}

/// Monotonic `$n` allocator.
#[derive(Debug, Clone)]
pub struct Placeholders {
    start: usize,
    last: usize,
}

impl Placeholders {
    /// Allocator whose first placeholder is `$offset + 1`.
    pub fn after(offset: usize) -> Self {
        Self {
            start: offset,
            last: offset,
        }
    }

    /// Allocate the next placeholder number.
    pub fn next_index(&mut self) -> usize {
        self.last += 1;
        self.last
    }

    /// Allocate the next placeholder and write it as `$n`.
    pub fn push_next(&mut self, out: &mut String) {
        let n = self.next_index();
        // Writing into a String cannot fail.
        let _ = write!(out, "${n}");
    }

    /// Placeholders handed out so far.
    pub fn consumed(&self) -> usize {
        self.last - self.start
    }
}
