/// Focus position within a list of `len` items. The index is always in
/// `0..len` while the list is non-empty.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FocusCursor {
    index: usize,
    len: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FocusChange {
    pub from: usize,
    pub to: usize,
}

impl FocusCursor {
    pub fn new(len: usize) -> Self {
        Self { index: 0, len }
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn next(&mut self) -> Option<FocusChange> {
        let last = self.len.checked_sub(1)?;
        self.move_to(self.index.saturating_add(1).min(last))
    }

    pub fn previous(&mut self) -> Option<FocusChange> {
        if self.is_empty() {
            return None;
        }
        self.move_to(self.index.saturating_sub(1))
    }

    /// Moves to `index`. Returns `None` when out of range or already there.
    pub fn set(&mut self, index: usize) -> Option<FocusChange> {
        if index >= self.len {
            return None;
        }
        self.move_to(index)
    }

    /// 1-based selection as spoken or typed by the voter. Returns the new
    /// index, or `None` when the number is not on the list.
    pub fn select_number(&mut self, number: u32) -> Option<usize> {
        let index = usize::try_from(number)
            .ok()?
            .checked_sub(1)
            .filter(|i| *i < self.len)?;
        self.index = index;
        Some(index)
    }

    fn move_to(&mut self, to: usize) -> Option<FocusChange> {
        let from = self.index;
        if from == to {
            return None;
        }
        self.index = to;
        Some(FocusChange { from, to })
    }
}
