/// Bounds checked index over `0..total` slide pages
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SlideCursor {
    index: usize,
    total: usize,
}

impl SlideCursor {
    pub fn new(total: usize) -> Self {
        Self { index: 0, total }
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn total(&self) -> usize {
        self.total
    }

    pub fn is_empty(&self) -> bool {
        self.total == 0
    }

    pub fn is_last(&self) -> bool {
        self.total == 0 || self.index + 1 >= self.total
    }

    /// Returns `false` and leaves the cursor alone when `index` is out of range
    pub fn jump_to(&mut self, index: usize) -> bool {
        if index < self.total {
            self.index = index;
            true
        } else {
            false
        }
    }

    pub fn next(&mut self) -> bool {
        self.jump_to(self.index + 1)
    }

    pub fn prev(&mut self) -> bool {
        match self.index.checked_sub(1) {
            Some(index) => self.jump_to(index),
            None => false,
        }
    }

    pub fn reset(&mut self) {
        self.index = 0;
    }

    /// Changing the page count always starts over from the first page
    pub fn set_total(&mut self, total: usize) {
        self.total = total;
        self.index = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn jump_out_of_range_is_ignored() {
        let mut cursor = SlideCursor::new(3);
        assert!(cursor.jump_to(2));
        assert!(!cursor.jump_to(3));
        assert_eq!(cursor.index(), 2);
    }

    #[test]
    fn steps_stop_at_the_ends() {
        let mut cursor = SlideCursor::new(2);
        assert!(!cursor.prev());
        assert!(cursor.next());
        assert!(cursor.is_last());
        assert!(!cursor.next());
        assert_eq!(cursor.index(), 1);
        assert!(cursor.prev());
        assert_eq!(cursor.index(), 0);
    }

    #[test]
    fn empty_deck() {
        let mut cursor = SlideCursor::default();
        assert!(cursor.is_empty());
        assert!(!cursor.jump_to(0));
        assert!(!cursor.next());
    }

    #[test]
    fn new_total_resets() {
        let mut cursor = SlideCursor::new(5);
        cursor.jump_to(4);
        cursor.set_total(2);
        assert_eq!((cursor.index(), cursor.total()), (0, 2));
    }
}
