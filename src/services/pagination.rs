//! Paged browsing over one result set per conversation.
//!
//! A [`BrowseSession`] is never empty: [`BrowseSession::start`] and
//! [`BrowseSession::remove`] return `None` instead, and the caller renders the
//! empty state.

use crate::models::{ContentId, MediaKind, ResultItem};

/// Result sets from popular and similar lists are cut to this many items
pub const BROWSE_LIMIT: usize = 10;

/// Which list the session is paging through
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BrowseKind {
    Search,
    Popular(MediaKind),
    Similar,
    Favorites,
}

impl BrowseKind {
    /// Header shown above every item of the list
    pub fn label(&self) -> &'static str {
        match self {
            BrowseKind::Search => "🔍 Search result",
            BrowseKind::Popular(MediaKind::Movie) => "📺 Popular movies",
            BrowseKind::Popular(MediaKind::Tv) => "📺 Popular TV shows",
            BrowseKind::Similar => "🎬 Similar movies",
            BrowseKind::Favorites => "⭐ Favorites",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct BrowseSession {
    owner_user_id: i64,
    kind: BrowseKind,
    items: Vec<ResultItem>,
    cursor: usize,
}

impl BrowseSession {
    /// Opens a session on the first item, or `None` for an empty set
    pub fn start(owner_user_id: i64, kind: BrowseKind, items: Vec<ResultItem>) -> Option<Self> {
        if items.is_empty() {
            return None;
        }
        Some(Self {
            owner_user_id,
            kind,
            items,
            cursor: 0,
        })
    }

    pub fn owner_user_id(&self) -> i64 {
        self.owner_user_id
    }

    pub fn kind(&self) -> BrowseKind {
        self.kind
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Always false; kept for clippy's `len_without_is_empty`
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn current(&self) -> &ResultItem {
        &self.items[self.cursor]
    }

    pub fn has_prev(&self) -> bool {
        self.cursor > 0
    }

    pub fn has_next(&self) -> bool {
        self.cursor + 1 < self.items.len()
    }

    /// Moves to the next item; a no-op on the last one. Returns whether it moved.
    pub fn advance(&mut self) -> bool {
        if self.has_next() {
            self.cursor += 1;
            true
        } else {
            false
        }
    }

    /// Moves to the previous item; a no-op on the first one. Returns whether it moved.
    pub fn retreat(&mut self) -> bool {
        if self.has_prev() {
            self.cursor -= 1;
            true
        } else {
            false
        }
    }

    /// Drops every item with `content_id`
    ///
    /// The cursor stays put unless it fell off the end, in which case it is
    /// clamped to the new last item. `None` once nothing is left.
    pub fn remove(mut self, content_id: ContentId) -> Option<Self> {
        self.items.retain(|item| item.content_id != content_id);
        if self.items.is_empty() {
            return None;
        }
        if self.cursor >= self.items.len() {
            self.cursor = self.items.len() - 1;
        }
        Some(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn item(content_id: ContentId) -> ResultItem {
        ResultItem {
            content_id,
            title: format!("Title {}", content_id),
            release_year: Some(2000),
            rating: Some(7.0),
            synopsis: None,
            poster_path: None,
            media_kind: MediaKind::Movie,
        }
    }

    fn session(n: usize) -> BrowseSession {
        let items = (1..=n as ContentId).map(item).collect();
        BrowseSession::start(42, BrowseKind::Favorites, items).unwrap()
    }

    #[test]
    fn test_start_on_empty_set_is_none() {
        assert!(BrowseSession::start(42, BrowseKind::Search, vec![]).is_none());
    }

    #[test]
    fn test_start_points_at_first_item() {
        let s = session(3);
        assert_eq!(s.cursor(), 0);
        assert_eq!(s.current().content_id, 1);
        assert!(!s.has_prev());
        assert!(s.has_next());
    }

    #[test]
    fn test_advance_and_retreat_are_noops_at_bounds() {
        let mut s = session(2);

        assert!(!s.retreat());
        assert_eq!(s.cursor(), 0);

        assert!(s.advance());
        assert!(!s.advance());
        assert_eq!(s.cursor(), 1);
        assert_eq!(s.current().content_id, 2);
    }

    #[test]
    fn test_single_item_has_no_navigation() {
        let mut s = session(1);
        assert!(!s.has_prev());
        assert!(!s.has_next());
        assert!(!s.advance());
        assert!(!s.retreat());
    }

    #[test]
    fn test_remove_last_remaining_is_empty() {
        assert!(session(1).remove(1).is_none());
    }

    #[test]
    fn test_remove_at_end_clamps_cursor() {
        let mut s = session(3);
        s.advance();
        s.advance();

        let s = s.remove(3).unwrap();

        assert_eq!(s.len(), 2);
        assert_eq!(s.cursor(), 1);
        assert_eq!(s.current().content_id, 2);
    }

    #[test]
    fn test_remove_in_middle_shows_following_item() {
        let mut s = session(3);
        s.advance();

        let s = s.remove(2).unwrap();

        assert_eq!(s.cursor(), 1);
        assert_eq!(s.current().content_id, 3);
    }

    #[test]
    fn test_remove_drops_duplicates() {
        let items = vec![item(5), item(6), item(5)];
        let s = BrowseSession::start(42, BrowseKind::Favorites, items).unwrap();

        let s = s.remove(5).unwrap();

        assert_eq!(s.len(), 1);
        assert_eq!(s.current().content_id, 6);
    }

    #[test]
    fn test_remove_unknown_id_keeps_session() {
        let s = session(2).remove(99).unwrap();
        assert_eq!(s.len(), 2);
        assert_eq!(s.cursor(), 0);
    }

    proptest! {
        #[test]
        fn prop_cursor_stays_in_bounds(n in 1usize..20, moves in proptest::collection::vec(any::<bool>(), 0..64)) {
            let mut s = session(n);
            for forward in moves {
                let before = s.cursor();
                let moved = if forward { s.advance() } else { s.retreat() };
                prop_assert!(s.cursor() < n);
                if !moved {
                    prop_assert_eq!(s.cursor(), before);
                    let at_edge = if forward { before == n - 1 } else { before == 0 };
                    prop_assert!(at_edge);
                }
            }
        }

        #[test]
        fn prop_remove_current_shrinks_by_one(n in 2usize..20, steps in 0usize..20) {
            let mut s = session(n);
            for _ in 0..steps {
                s.advance();
            }
            let current = s.current().content_id;

            let s = s.remove(current).unwrap();

            prop_assert_eq!(s.len(), n - 1);
            prop_assert!(s.cursor() <= n - 2);
        }
    }
}
