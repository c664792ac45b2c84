/// Rows taken by everything except list entries: four header lines, the
/// filter line with a blank on each side, the two scroll-indicator rows,
/// and the footer with its spacer.
pub const CHROME_ROWS: u16 = 11;

/// List rows that fit on a screen `height` rows tall.
pub fn list_capacity(height: u16) -> usize {
    usize::from(height.saturating_sub(CHROME_ROWS)).max(1)
}

/// Visible slice `[start, end)` of a list that may be taller than the screen.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Window {
    pub start: usize,
    pub end: usize,
    pub total: usize,
}

impl Window {
    pub fn more_above(&self) -> bool {
        self.start > 0
    }

    pub fn more_below(&self) -> bool {
        self.end < self.total
    }

    pub fn len(&self) -> usize {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }
}

/// Window of at most `capacity` rows containing `cursor`, anchored at the top.
pub fn visible_range(total: usize, cursor: usize, capacity: usize) -> Window {
    follow(0, total, cursor, capacity)
}

/// Shifts a window that previously started at `offset` just far enough to
/// bring `cursor` back into view.
pub fn follow(offset: usize, total: usize, cursor: usize, capacity: usize) -> Window {
    let capacity = capacity.max(1);
    if total <= capacity {
        return Window {
            start: 0,
            end: total,
            total,
        };
    }
    let cursor = cursor.min(total - 1);
    let mut start = offset.min(total - capacity);
    if cursor < start {
        start = cursor;
    } else if cursor >= start + capacity {
        start = cursor + 1 - capacity;
    }
    Window {
        start,
        end: start + capacity,
        total,
    }
}
