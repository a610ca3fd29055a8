//! "Show more" / "show less" display limit
//!
//! A rendering slice over the already-fetched list. Never changes what is
//! fetched or subscribed.

/// Number of entries shown before the first "show more"
pub const DEFAULT_INITIAL_LIMIT: usize = 5;

/// Entries revealed per "show more"
pub const DEFAULT_LIMIT_STEP: usize = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DisplayLimit {
    initial: usize,
    step: usize,
    current: usize,
}

impl DisplayLimit {
    pub fn new(initial: usize, step: usize) -> Self {
        let step = step.max(1);
        Self {
            initial,
            step,
            current: initial,
        }
    }

    pub fn current(&self) -> usize {
        self.current
    }

    pub fn initial(&self) -> usize {
        self.initial
    }

    /// Raise the limit by one step, never past `total`.
    /// Returns how many more entries became visible.
    pub fn show_more(&mut self, total: usize) -> usize {
        let before = self.current.min(total);
        self.current = (self.current + self.step).min(total.max(self.initial));
        self.current.min(total) - before
    }

    /// Back to the initial limit
    pub fn show_less(&mut self) {
        self.current = self.initial;
    }

    /// Whether "show more" would reveal anything
    pub fn has_more(&self, total: usize) -> bool {
        total > self.current
    }

    /// Whether "show less" would hide anything
    pub fn is_expanded(&self) -> bool {
        self.current > self.initial
    }

    /// The visible prefix of `items`
    pub fn visible<'a, T>(&self, items: &'a [T]) -> &'a [T] {
        &items[..self.current.min(items.len())]
    }
}

impl Default for DisplayLimit {
    fn default() -> Self {
        Self::new(DEFAULT_INITIAL_LIMIT, DEFAULT_LIMIT_STEP)
    }
}
