//! Disposable resources
//!
//! Everything that registers a listener hands back a [`Disposable`]; owners keep
//! them in a [`DisposableStore`] and release them all at once.

/// A resource that can be released exactly once
pub trait Disposable {
    /// Release the resource. Calling it again must be a no-op.
    fn dispose(&mut self);
}

/// Collection of disposables released together
#[derive(Default)]
pub struct DisposableStore {
    items: Vec<Box<dyn Disposable>>,
    disposed: bool,
}

impl DisposableStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Track a disposable. Once the store is disposed, new items are released immediately.
    pub fn add<D: Disposable + 'static>(&mut self, mut item: D) {
        if self.disposed {
            item.dispose();
            return;
        }
        self.items.push(Box::new(item));
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn is_disposed(&self) -> bool {
        self.disposed
    }

    /// Release everything tracked so far, keeping the store usable
    pub fn clear(&mut self) {
        let items = std::mem::take(&mut self.items);
        for mut item in items {
            item.dispose();
        }
    }
}

impl Disposable for DisposableStore {
    fn dispose(&mut self) {
        if self.disposed {
            return;
        }
        self.disposed = true;
        self.clear();
    }
}

impl Drop for DisposableStore {
    fn drop(&mut self) {
        self.dispose();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;
    use std::rc::Rc;

    struct Counted(Rc<Cell<u32>>);

    impl Disposable for Counted {
        fn dispose(&mut self) {
            self.0.set(self.0.get() + 1);
        }
    }

    fn counter() -> (Rc<Cell<u32>>, Counted) {
        let count = Rc::new(Cell::new(0));
        (count.clone(), Counted(count))
    }

    #[test]
    fn store_disposes_once() {
        let (count, d) = counter();
        let mut store = DisposableStore::new();
        store.add(d);
        store.dispose();
        store.dispose();
        assert_eq!(count.get(), 1);
        assert!(store.is_disposed());
    }

    #[test]
    fn add_after_dispose_releases_immediately() {
        let mut store = DisposableStore::new();
        store.dispose();
        let (count, d) = counter();
        store.add(d);
        assert_eq!(count.get(), 1);
        assert!(store.is_empty());
    }

    #[test]
    fn clear_keeps_store_alive() {
        let mut store = DisposableStore::new();
        let (first, d) = counter();
        store.add(d);
        store.clear();
        let (second, d) = counter();
        store.add(d);
        assert_eq!(first.get(), 1);
        assert_eq!(second.get(), 0);
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn drop_disposes() {
        let (count, d) = counter();
        {
            let mut store = DisposableStore::new();
            store.add(d);
        }
        assert_eq!(count.get(), 1);
    }
}
