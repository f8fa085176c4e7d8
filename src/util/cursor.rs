//! Cursor over an indexable sequence
//!
//! The same cursor drives both stages of the front end: the lexer walks a
//! slice of `char`s and the parser walks a slice of tokens.

use thiserror::Error;

/// Error raised when a cursor is asked for more items than remain
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CursorError {
    #[error("unexpected end of input: needed {requested} more item(s), {remaining} left")]
    UnexpectedEnd { requested: usize, remaining: usize },
}

/// Forward-only cursor with one step of pushback
#[derive(Debug, Clone)]
pub struct Cursor<'a, T> {
    items: &'a [T],
    index: usize,
}

impl<'a, T> Cursor<'a, T> {
    /// Create a cursor positioned at the start of `items`
    pub fn new(items: &'a [T]) -> Self {
        Cursor { items, index: 0 }
    }

    /// Look at up to `n` items without consuming them
    ///
    /// The returned slice is shorter than `n` near the end of input.
    pub fn peek(&self, n: usize) -> &'a [T] {
        let end = self.index.saturating_add(n).min(self.items.len());
        &self.items[self.index..end]
    }

    /// Look at the next item without consuming it
    #[inline]
    pub fn peek_one(&self) -> Option<&'a T> {
        self.items.get(self.index)
    }

    /// Consume exactly `n` items
    pub fn take(&mut self, n: usize) -> Result<&'a [T], CursorError> {
        let remaining = self.remaining();
        if n > remaining {
            return Err(CursorError::UnexpectedEnd {
                requested: n,
                remaining,
            });
        }
        let taken = &self.items[self.index..self.index + n];
        self.index += n;
        Ok(taken)
    }

    /// Consume exactly one item
    pub fn take_one(&mut self) -> Result<&'a T, CursorError> {
        let item = self.items.get(self.index).ok_or(CursorError::UnexpectedEnd {
            requested: 1,
            remaining: 0,
        })?;
        self.index += 1;
        Ok(item)
    }

    /// Consume the next item if there is one
    #[inline]
    pub fn advance(&mut self) -> Option<&'a T> {
        let item = self.items.get(self.index)?;
        self.index += 1;
        Some(item)
    }

    /// Step back over the most recently consumed item
    pub fn unread(&mut self) {
        debug_assert!(self.index > 0, "unread at start of input");
        self.index = self.index.saturating_sub(1);
    }

    /// Whether any items remain
    #[inline]
    pub fn has_next(&self) -> bool {
        self.index < self.items.len()
    }

    /// Index of the next item to be consumed
    #[inline]
    pub fn current_index(&self) -> usize {
        self.index
    }

    /// Number of items left
    #[inline]
    pub fn remaining(&self) -> usize {
        self.items.len() - self.index
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_peek_does_not_consume() {
        let items = ['a', 'b', 'c'];
        let cursor = Cursor::new(&items);

        assert_eq!(cursor.peek(2), &['a', 'b']);
        assert_eq!(cursor.peek_one(), Some(&'a'));
        assert_eq!(cursor.current_index(), 0);
    }

    #[test]
    fn test_peek_past_end_is_short() {
        let items = [1, 2];
        let mut cursor = Cursor::new(&items);
        cursor.take_one().unwrap();

        assert_eq!(cursor.peek(5), &[2]);
        cursor.take_one().unwrap();
        assert!(cursor.peek(1).is_empty());
        assert_eq!(cursor.peek_one(), None);
    }

    #[test]
    fn test_take() {
        let items = [1, 2, 3, 4];
        let mut cursor = Cursor::new(&items);

        assert_eq!(cursor.take(3).unwrap(), &[1, 2, 3]);
        assert_eq!(cursor.current_index(), 3);
        assert_eq!(cursor.remaining(), 1);
        assert!(cursor.has_next());
    }

    #[test]
    fn test_take_past_end_fails_without_consuming() {
        let items = [1, 2];
        let mut cursor = Cursor::new(&items);

        let err = cursor.take(3).unwrap_err();
        assert_eq!(
            err,
            CursorError::UnexpectedEnd {
                requested: 3,
                remaining: 2
            }
        );
        assert_eq!(cursor.current_index(), 0);

        cursor.take(2).unwrap();
        assert!(cursor.take_one().is_err());
        assert!(!cursor.has_next());
    }

    #[test]
    fn test_unread() {
        let items = ['x', 'y'];
        let mut cursor = Cursor::new(&items);

        assert_eq!(cursor.advance(), Some(&'x'));
        assert_eq!(cursor.advance(), Some(&'y'));
        cursor.unread();
        assert_eq!(cursor.current_index(), 1);
        assert_eq!(cursor.advance(), Some(&'y'));
        assert_eq!(cursor.advance(), None);
    }

    #[test]
    fn test_empty() {
        let items: [u8; 0] = [];
        let mut cursor = Cursor::new(&items);

        assert!(!cursor.has_next());
        assert_eq!(cursor.advance(), None);
        assert!(cursor.take(0).unwrap().is_empty());
    }
}
