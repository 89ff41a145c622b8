//! Single-threaded event emitter
//!
//! Components expose `on_*` methods returning a [`Subscription`]; dropping or
//! disposing the subscription disconnects the listener.

use slotmap::{new_key_type, SlotMap};
use std::cell::RefCell;
use std::rc::{Rc, Weak};

use crate::lifecycle::Disposable;

new_key_type! {
    /// Identifies one connected listener
    pub struct ConnectionId;
}

type Listeners<T> = RefCell<SlotMap<ConnectionId, Rc<dyn Fn(&T)>>>;

/// Broadcasts values to every connected listener
pub struct Emitter<T> {
    listeners: Rc<Listeners<T>>,
}

impl<T: 'static> Emitter<T> {
    pub fn new() -> Self {
        Self {
            listeners: Rc::new(RefCell::new(SlotMap::with_key())),
        }
    }

    /// Connect a listener
    pub fn subscribe(&self, listener: impl Fn(&T) + 'static) -> Subscription {
        let id = self.listeners.borrow_mut().insert(Rc::new(listener));
        let weak: Weak<Listeners<T>> = Rc::downgrade(&self.listeners);
        Subscription {
            disconnect: Some(Box::new(move || {
                if let Some(listeners) = weak.upgrade() {
                    listeners.borrow_mut().remove(id);
                }
            })),
        }
    }

    /// Invoke every listener connected at the time of the call
    pub fn fire(&self, value: T) {
        let snapshot: Vec<Rc<dyn Fn(&T)>> = self.listeners.borrow().values().cloned().collect();
        for listener in snapshot {
            listener(&value);
        }
    }

    pub fn listener_count(&self) -> usize {
        self.listeners.borrow().len()
    }

    /// Disconnect everybody
    pub fn clear(&self) {
        self.listeners.borrow_mut().clear();
    }
}

impl<T: 'static> Default for Emitter<T> {
    fn default() -> Self {
        Self::new()
    }
}

/// Handle to a connected listener
pub struct Subscription {
    disconnect: Option<Box<dyn FnOnce()>>,
}

impl Disposable for Subscription {
    fn dispose(&mut self) {
        if let Some(disconnect) = self.disconnect.take() {
            disconnect();
        }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.dispose();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    #[test]
    fn fire_reaches_subscribers() {
        let emitter = Emitter::<bool>::new();
        let seen = Rc::new(Cell::new(None));
        let s = seen.clone();
        let _sub = emitter.subscribe(move |v| s.set(Some(*v)));
        emitter.fire(true);
        assert_eq!(seen.get(), Some(true));
    }

    #[test]
    fn dropped_subscription_disconnects() {
        let emitter = Emitter::<u32>::new();
        let count = Rc::new(Cell::new(0));
        let c = count.clone();
        let sub = emitter.subscribe(move |_| c.set(c.get() + 1));
        emitter.fire(1);
        drop(sub);
        emitter.fire(2);
        assert_eq!(count.get(), 1);
        assert_eq!(emitter.listener_count(), 0);
    }

    #[test]
    fn subscription_outliving_emitter_is_harmless() {
        let emitter = Emitter::<u32>::new();
        let mut sub = emitter.subscribe(|_| {});
        drop(emitter);
        sub.dispose();
    }
}
