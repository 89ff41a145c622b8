//! Host window abstraction
//!
//! The titlebar never reaches for a global window object: the host passes in a
//! [`HostWindow`] that emits lifecycle events and executes window commands.
//! [`HeadlessWindow`] is a complete in-memory implementation used by the demo
//! binary and the tests.

use log::debug;
use slotmap::{new_key_type, SlotMap};
use std::cell::{Cell, RefCell};
use std::rc::Rc;

use crate::menu::Menu;

new_key_type! {
    /// Identifies a listener registered with [`HostWindow::on`]
    pub struct SubscriptionId;
}

/// Window lifecycle notifications
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WindowEvent {
    Focus,
    Blur,
    Maximize,
    Unmaximize,
    EnterFullScreen,
    LeaveFullScreen,
}

impl WindowEvent {
    pub const ALL: [WindowEvent; 6] = [
        WindowEvent::Focus,
        WindowEvent::Blur,
        WindowEvent::Maximize,
        WindowEvent::Unmaximize,
        WindowEvent::EnterFullScreen,
        WindowEvent::LeaveFullScreen,
    ];
}

/// Commands sent to the host window
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WindowCommand {
    Minimize,
    Maximize,
    Unmaximize,
    Close,
    Hide,
}

/// The native window the titlebar decorates
pub trait HostWindow {
    /// Register a lifecycle listener
    fn on(&self, event: WindowEvent, callback: Rc<dyn Fn()>) -> SubscriptionId;

    /// Remove a listener registered with [`HostWindow::on`]
    fn remove_listener(&self, id: SubscriptionId);

    fn minimize(&self);
    fn maximize(&self);
    fn unmaximize(&self);
    fn close(&self);
    fn hide(&self);
    fn is_maximized(&self) -> bool;

    /// Install the native application menu (macOS keeps its menu outside the window)
    fn set_application_menu(&self, menu: Option<&Menu>);
}

/// In-memory window that behaves like a desktop window without drawing anything
///
/// Commands update the window flags and emit the matching lifecycle events
/// synchronously, the way a native window would.
#[derive(Default)]
pub struct HeadlessWindow {
    listeners: RefCell<SlotMap<SubscriptionId, (WindowEvent, Rc<dyn Fn()>)>>,
    commands: RefCell<Vec<WindowCommand>>,
    application_menu: RefCell<Option<Menu>>,
    maximized: Cell<bool>,
    focused: Cell<bool>,
    fullscreen: Cell<bool>,
    visible: Cell<bool>,
    closed: Cell<bool>,
}

impl HeadlessWindow {
    pub fn new() -> Self {
        Self {
            focused: Cell::new(true),
            visible: Cell::new(true),
            ..Default::default()
        }
    }

    /// Start maximized
    pub fn maximized() -> Self {
        let window = Self::new();
        window.maximized.set(true);
        window
    }

    /// Deliver a lifecycle event to every listener registered for it
    pub fn emit(&self, event: WindowEvent) {
        let callbacks: Vec<Rc<dyn Fn()>> = self
            .listeners
            .borrow()
            .values()
            .filter(|(e, _)| *e == event)
            .map(|(_, cb)| cb.clone())
            .collect();
        debug!("Window event {:?} -> {} listener(s)", event, callbacks.len());
        for callback in callbacks {
            callback();
        }
    }

    pub fn focus(&self) {
        self.focused.set(true);
        self.emit(WindowEvent::Focus);
    }

    pub fn blur(&self) {
        self.focused.set(false);
        self.emit(WindowEvent::Blur);
    }

    pub fn set_full_screen(&self, fullscreen: bool) {
        self.fullscreen.set(fullscreen);
        self.emit(if fullscreen {
            WindowEvent::EnterFullScreen
        } else {
            WindowEvent::LeaveFullScreen
        });
    }

    pub fn listener_count(&self) -> usize {
        self.listeners.borrow().len()
    }

    pub fn commands(&self) -> Vec<WindowCommand> {
        self.commands.borrow().clone()
    }

    pub fn is_focused(&self) -> bool {
        self.focused.get()
    }

    pub fn is_full_screen(&self) -> bool {
        self.fullscreen.get()
    }

    pub fn is_visible(&self) -> bool {
        self.visible.get()
    }

    pub fn is_closed(&self) -> bool {
        self.closed.get()
    }

    pub fn application_menu(&self) -> Option<Menu> {
        self.application_menu.borrow().clone()
    }

    fn record(&self, command: WindowCommand) {
        self.commands.borrow_mut().push(command);
    }
}

impl HostWindow for HeadlessWindow {
    fn on(&self, event: WindowEvent, callback: Rc<dyn Fn()>) -> SubscriptionId {
        self.listeners.borrow_mut().insert((event, callback))
    }

    fn remove_listener(&self, id: SubscriptionId) {
        self.listeners.borrow_mut().remove(id);
    }

    fn minimize(&self) {
        self.record(WindowCommand::Minimize);
    }

    fn maximize(&self) {
        self.record(WindowCommand::Maximize);
        if !self.maximized.replace(true) {
            self.emit(WindowEvent::Maximize);
        }
    }

    fn unmaximize(&self) {
        self.record(WindowCommand::Unmaximize);
        if self.maximized.replace(false) {
            self.emit(WindowEvent::Unmaximize);
        }
    }

    fn close(&self) {
        self.record(WindowCommand::Close);
        self.closed.set(true);
        self.visible.set(false);
    }

    fn hide(&self) {
        self.record(WindowCommand::Hide);
        self.visible.set(false);
    }

    fn is_maximized(&self) -> bool {
        self.maximized.get()
    }

    fn set_application_menu(&self, menu: Option<&Menu>) {
        *self.application_menu.borrow_mut() = menu.cloned();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn maximize_emits_once() {
        let window = HeadlessWindow::new();
        let count = Rc::new(Cell::new(0));
        let c = count.clone();
        window.on(WindowEvent::Maximize, Rc::new(move || c.set(c.get() + 1)));
        window.maximize();
        window.maximize();
        assert_eq!(count.get(), 1);
        assert!(window.is_maximized());
        assert_eq!(
            window.commands(),
            vec![WindowCommand::Maximize, WindowCommand::Maximize]
        );
    }

    #[test]
    fn removed_listener_is_silent() {
        let window = HeadlessWindow::new();
        let count = Rc::new(Cell::new(0));
        let c = count.clone();
        let id = window.on(WindowEvent::Blur, Rc::new(move || c.set(c.get() + 1)));
        window.remove_listener(id);
        window.blur();
        assert_eq!(count.get(), 0);
        assert_eq!(window.listener_count(), 0);
        assert!(!window.is_focused());
    }

    #[test]
    fn close_and_hide_track_visibility() {
        let window = HeadlessWindow::new();
        window.hide();
        assert!(!window.is_visible());
        assert!(!window.is_closed());
        window.close();
        assert!(window.is_closed());
    }
}
