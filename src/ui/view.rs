use listsync::controller::ScrollMetrics;

/// Scroll units per table row. The scroll threshold is expressed in these
/// units, so the default of 200 means "within ten rows of the end".
pub(super) const ROW_UNITS: f64 = 20.0;

/// Cursor and viewport position over the loaded items.
///
/// This is presentation state only; the controller never sees it except as
/// [`ScrollMetrics`].
#[derive(Debug, Default)]
pub(super) struct ListView {
    pub cursor: usize,
    pub offset: usize,
    /// Table rows visible in the last frame.
    pub viewport_rows: usize,
    pub needs_redraw: bool,
}

/// Cursor movement requested by a key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) enum CursorMove {
    Up,
    Down,
    PageUp,
    PageDown,
    Top,
    Bottom,
}

impl ListView {
    pub fn new() -> Self {
        Self {
            needs_redraw: true,
            ..Self::default()
        }
    }

    /// Move the cursor over `len` rows and keep it inside the viewport.
    pub fn move_cursor(&mut self, movement: CursorMove, len: usize) {
        if len == 0 {
            self.cursor = 0;
            self.offset = 0;
            return;
        }
        let page = self.viewport_rows.max(1);
        let last = len - 1;
        self.cursor = match movement {
            CursorMove::Up => self.cursor.saturating_sub(1),
            CursorMove::Down => (self.cursor + 1).min(last),
            CursorMove::PageUp => self.cursor.saturating_sub(page),
            CursorMove::PageDown => (self.cursor + page).min(last),
            CursorMove::Top => 0,
            CursorMove::Bottom => last,
        };
        self.follow_cursor();
    }

    /// Re-clamp after the item list changed underneath the cursor.
    pub fn clamp(&mut self, len: usize) {
        if len == 0 {
            self.cursor = 0;
            self.offset = 0;
            return;
        }
        self.cursor = self.cursor.min(len - 1);
        self.offset = self.offset.min(len - 1);
        self.follow_cursor();
    }

    /// Jump back to the first row (after a new search).
    pub fn reset(&mut self) {
        self.cursor = 0;
        self.offset = 0;
    }

    pub fn set_viewport(&mut self, rows: usize) {
        self.viewport_rows = rows;
        self.follow_cursor();
    }

    fn follow_cursor(&mut self) {
        let rows = self.viewport_rows.max(1);
        if self.cursor < self.offset {
            self.offset = self.cursor;
        } else if self.cursor >= self.offset + rows {
            self.offset = self.cursor + 1 - rows;
        }
    }

    /// Viewport position over `len` rows, in scroll units.
    pub fn metrics(&self, len: usize) -> ScrollMetrics {
        ScrollMetrics {
            scroll_top: self.offset as f64 * ROW_UNITS,
            scroll_height: len as f64 * ROW_UNITS,
            client_height: self.viewport_rows as f64 * ROW_UNITS,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn view(rows: usize) -> ListView {
        let mut view = ListView::new();
        view.set_viewport(rows);
        view
    }

    #[test]
    fn test_cursor_stays_in_bounds() {
        let mut view = view(5);
        view.move_cursor(CursorMove::Up, 20);
        assert_eq!(view.cursor, 0);
        view.move_cursor(CursorMove::Bottom, 20);
        assert_eq!(view.cursor, 19);
        view.move_cursor(CursorMove::Down, 20);
        assert_eq!(view.cursor, 19);
    }

    #[test]
    fn test_offset_follows_cursor() {
        let mut view = view(5);
        for _ in 0..7 {
            view.move_cursor(CursorMove::Down, 20);
        }
        assert_eq!(view.cursor, 7);
        assert_eq!(view.offset, 3);

        view.move_cursor(CursorMove::Top, 20);
        assert_eq!(view.offset, 0);
    }

    #[test]
    fn test_page_moves_by_viewport() {
        let mut view = view(5);
        view.move_cursor(CursorMove::PageDown, 20);
        assert_eq!(view.cursor, 5);
        view.move_cursor(CursorMove::PageUp, 20);
        assert_eq!(view.cursor, 0);
    }

    #[test]
    fn test_clamp_after_list_shrinks() {
        let mut view = view(5);
        view.move_cursor(CursorMove::Bottom, 40);
        view.clamp(10);
        assert_eq!(view.cursor, 9);
        assert!(view.offset <= 9);

        view.clamp(0);
        assert_eq!((view.cursor, view.offset), (0, 0));
    }

    #[test]
    fn test_metrics_reach_threshold_near_end() {
        let mut view = view(10);
        view.move_cursor(CursorMove::Bottom, 20);
        // 20 rows loaded, 10 visible, scrolled to the end.
        let metrics = view.metrics(20);
        assert_eq!(metrics.scroll_top, 200.0);
        assert_eq!(metrics.remaining(), 0.0);

        view.move_cursor(CursorMove::Top, 20);
        assert_eq!(view.metrics(20).remaining(), 200.0);
    }
}
