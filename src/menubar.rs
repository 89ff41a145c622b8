//! Menubar
//!
//! One button per top-level menu entry. Clicking a button toggles its
//! dropdown, hovering another button while a dropdown is open switches to it,
//! and the keyboard drives everything once the bar has focus (Alt, arrows,
//! mnemonics). The titlebar listens to visibility and focus changes to manage
//! its drag region.

use log::{debug, info};
use std::cell::RefCell;
use std::rc::{Rc, Weak};

use crate::dom::{add_disposable_listener, DomEvent, EventType, Key, NodeId};
use crate::event::{Emitter, Subscription};
use crate::lifecycle::{Disposable, DisposableStore};
use crate::menu::mnemonic::{parse_label, KeyCode};
use crate::menu::model::{activate_item, Menu, MenuClickEvent, MenuItemRef};
use crate::menu::{MenuContainer, MenuContext};
use crate::theme::MenuStyle;

/// Interaction state of the bar
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenubarMode {
    /// Idle
    Visible,
    /// A button has keyboard focus, no dropdown open
    Focused,
    /// A dropdown is open
    Open,
}

struct MenubarButton {
    node: NodeId,
    title: NodeId,
    item: MenuItemRef,
    mnemonic: Option<KeyCode>,
}

struct OpenMenu {
    index: usize,
    holder: NodeId,
    container: MenuContainer,
}

struct MenubarState {
    ctx: Rc<MenuContext>,
    container: NodeId,
    menu: Menu,
    buttons: Vec<MenubarButton>,
    open: Option<OpenMenu>,
    focused: Option<usize>,
    mode: MenubarMode,
    style: Option<MenuStyle>,
    listeners: DisposableStore,
    disposed: bool,
}

struct MenubarShared {
    state: RefCell<MenubarState>,
    on_visibility: Emitter<bool>,
    on_focus_state: Emitter<bool>,
}

/// The menubar mounted inside the titlebar
#[derive(Clone)]
pub struct Menubar {
    shared: Rc<MenubarShared>,
}

impl Menubar {
    /// Create a menubar for `menu` that renders into `container`
    pub fn new(ctx: Rc<MenuContext>, container: NodeId, menu: Menu) -> Self {
        Self {
            shared: Rc::new(MenubarShared {
                state: RefCell::new(MenubarState {
                    ctx,
                    container,
                    menu,
                    buttons: Vec::new(),
                    open: None,
                    focused: None,
                    mode: MenubarMode::Visible,
                    style: None,
                    listeners: DisposableStore::new(),
                    disposed: false,
                }),
                on_visibility: Emitter::new(),
                on_focus_state: Emitter::new(),
            }),
        }
    }

    fn from_weak(weak: &Weak<MenubarShared>) -> Option<Self> {
        weak.upgrade().map(|shared| Self { shared })
    }

    /// Render one button per top-level entry and wire input handling
    pub fn setup_menubar(&self) {
        let (ctx, container, menu) = {
            let state = self.shared.state.borrow();
            if state.disposed || !state.buttons.is_empty() {
                return;
            }
            (state.ctx.clone(), state.container, state.menu.clone())
        };

        let mut buttons = Vec::with_capacity(menu.len());
        {
            let mut doc = ctx.dom.borrow_mut();
            for item in menu.items() {
                let descriptor = item.borrow();
                let parsed = parse_label(&descriptor.label, ctx.enable_mnemonics);

                let node = doc.append_new(container, "div.menubar-menu-button");
                doc.set_attribute(node, "role", "menuitem");
                doc.set_tab_index(node, Some(-1));
                doc.set_attribute(node, "aria-label", &parsed.clean);
                if descriptor.child_menu().is_some() {
                    doc.set_attribute(node, "aria-haspopup", "true");
                }
                if let Some(shortcut) = parsed.shortcut() {
                    doc.set_attribute(node, "aria-keyshortcuts", &shortcut);
                }
                if !descriptor.enabled {
                    doc.add_class(node, "disabled");
                }
                if !descriptor.visible {
                    doc.hide(node);
                }

                let title = doc.append_new(node, "div.menubar-menu-title");
                doc.set_attribute(title, "role", "none");
                doc.set_inner_html(title, &parsed.markup);

                buttons.push(MenubarButton {
                    node,
                    title,
                    item: item.clone(),
                    mnemonic: parsed.key_code,
                });
            }
        }

        let weak = Rc::downgrade(&self.shared);
        let mut listeners = Vec::with_capacity(buttons.len() * 2 + 1);
        for (index, button) in buttons.iter().enumerate() {
            let w = weak.clone();
            let (node, title) = (button.node, button.title);
            listeners.push(add_disposable_listener(&ctx.dom, node, EventType::Click, move |e| {
                // Clicks bubbling up from the dropdown belong to the dropdown
                if e.button != 0 || !(e.target == Some(node) || e.target == Some(title)) {
                    return;
                }
                if let Some(this) = Self::from_weak(&w) {
                    e.stop(true);
                    this.toggle(index);
                }
            }));

            let w = weak.clone();
            listeners.push(add_disposable_listener(&ctx.dom, button.node, EventType::MouseOver, move |_| {
                if let Some(this) = Self::from_weak(&w) {
                    if this.mode() == MenubarMode::Open && this.open_index() != Some(index) {
                        this.open(index);
                    }
                }
            }));
        }

        let w = weak.clone();
        listeners.push(add_disposable_listener(&ctx.dom, container, EventType::KeyDown, move |e| {
            if let Some(this) = Self::from_weak(&w) {
                this.on_key_down(e);
            }
        }));

        let style = {
            let mut state = self.shared.state.borrow_mut();
            state.buttons = buttons;
            for listener in listeners {
                state.listeners.add(listener);
            }
            state.style
        };
        if let Some(style) = style {
            self.set_styles(style);
        }
        debug!("Menubar set up with {} top-level menu(s)", menu.len());
    }

    fn on_key_down(&self, event: &mut DomEvent) {
        let Some(key) = event.key else {
            return;
        };
        if self.handle_key(key, event.alt_key) {
            event.stop(true);
        }
    }

    /// Open the dropdown at `index`, or close it when it is already open
    pub fn toggle(&self, index: usize) {
        if self.open_index() == Some(index) {
            self.blur();
        } else {
            self.open(index);
        }
    }

    /// Open the dropdown of the top-level entry at `index`
    ///
    /// An entry without submenu is activated directly instead.
    pub fn open(&self, index: usize) {
        let (ctx, item, node, previous_mode) = {
            let state = self.shared.state.borrow();
            let Some(button) = state.buttons.get(index) else {
                return;
            };
            if state.disposed {
                return;
            }
            (state.ctx.clone(), button.item.clone(), button.node, state.mode)
        };
        let (enabled, submenu) = {
            let descriptor = item.borrow();
            (descriptor.enabled && descriptor.visible, descriptor.child_menu().cloned())
        };
        if !enabled {
            return;
        }

        let Some(submenu) = submenu else {
            self.blur();
            activate_item(&item, ctx.window.as_ref(), &MenuClickEvent::default());
            return;
        };

        self.close_open_menu();

        let weak = Rc::downgrade(&self.shared);
        let close: Rc<dyn Fn()> = Rc::new(move || {
            if let Some(this) = Self::from_weak(&weak) {
                this.blur();
            }
        });
        let holder = {
            let mut doc = ctx.dom.borrow_mut();
            doc.add_class(node, "open");
            doc.set_attribute(node, "aria-expanded", "true");
            doc.append_new(node, "div.menubar-menu-container")
        };
        let container = MenuContainer::new(ctx.clone(), submenu, close);
        container.render(holder);

        let style = {
            let mut state = self.shared.state.borrow_mut();
            if let Some(previous) = state.focused.replace(index) {
                if previous != index {
                    if let Some(button) = state.buttons.get(previous) {
                        ctx.dom.borrow_mut().remove_class(button.node, "focused");
                    }
                }
            }
            state.mode = MenubarMode::Open;
            state.open = Some(OpenMenu {
                index,
                holder,
                container: container.clone(),
            });
            state.style
        };
        ctx.dom.borrow_mut().add_class(node, "focused");
        if let Some(style) = style {
            self.set_styles(style);
        }

        if previous_mode != MenubarMode::Open {
            self.shared.on_visibility.fire(true);
        }
        if previous_mode == MenubarMode::Visible {
            self.shared.on_focus_state.fire(true);
        }
    }

    fn close_open_menu(&self) {
        let (open, dom, node) = {
            let mut state = self.shared.state.borrow_mut();
            let open = state.open.take();
            let node = open
                .as_ref()
                .and_then(|o| state.buttons.get(o.index))
                .map(|b| b.node);
            (open, state.ctx.dom.clone(), node)
        };
        let Some(open) = open else {
            return;
        };
        open.container.dispose();
        let mut doc = dom.borrow_mut();
        doc.destroy_node(open.holder);
        if let Some(node) = node {
            doc.remove_class(node, "open");
            doc.remove_attribute(node, "aria-expanded");
        }
    }

    /// Close any dropdown and drop keyboard focus
    pub fn blur(&self) {
        let (previous_mode, focused, dom) = {
            let mut state = self.shared.state.borrow_mut();
            if state.disposed {
                return;
            }
            let focused = state.focused.take().and_then(|i| state.buttons.get(i)).map(|b| b.node);
            let mode = std::mem::replace(&mut state.mode, MenubarMode::Visible);
            (mode, focused, state.ctx.dom.clone())
        };
        self.close_open_menu();
        if let Some(node) = focused {
            let mut doc = dom.borrow_mut();
            doc.remove_class(node, "focused");
            doc.blur(node);
        }
        self.paint_buttons();

        if previous_mode == MenubarMode::Open {
            self.shared.on_visibility.fire(false);
        }
        if previous_mode != MenubarMode::Visible {
            self.shared.on_focus_state.fire(false);
        }
    }

    /// Give keyboard focus to the button at `index` without opening it
    pub fn focus(&self, index: usize) {
        let (previous_mode, dom, node, previous) = {
            let mut state = self.shared.state.borrow_mut();
            let Some(node) = state.buttons.get(index).map(|b| b.node) else {
                return;
            };
            if state.disposed {
                return;
            }
            let previous = state
                .focused
                .replace(index)
                .and_then(|i| state.buttons.get(i))
                .map(|b| b.node);
            let mode = state.mode;
            if mode == MenubarMode::Visible {
                state.mode = MenubarMode::Focused;
            }
            (mode, state.ctx.dom.clone(), node, previous)
        };
        {
            let mut doc = dom.borrow_mut();
            if let Some(previous) = previous {
                doc.remove_class(previous, "focused");
            }
            doc.add_class(node, "focused");
            doc.focus(node);
        }
        self.paint_buttons();
        if previous_mode == MenubarMode::Visible {
            self.shared.on_focus_state.fire(true);
        }
    }

    /// Keyboard handling. Returns whether the key was consumed.
    pub fn handle_key(&self, key: Key, alt: bool) -> bool {
        let (mode, focused, open, mnemonics) = {
            let state = self.shared.state.borrow();
            if state.disposed || state.buttons.is_empty() {
                return false;
            }
            (
                state.mode,
                state.focused,
                state.open.as_ref().map(|o| o.container.clone()),
                state.ctx.enable_mnemonics,
            )
        };

        match mode {
            MenubarMode::Open => {
                if let Some(container) = open {
                    if container.handle_key(key) {
                        return true;
                    }
                }
                match key {
                    Key::ArrowLeft => self.open_neighbour(focused, -1),
                    Key::ArrowRight => self.open_neighbour(focused, 1),
                    Key::Escape => {
                        self.blur();
                        true
                    }
                    Key::Tab => {
                        self.blur();
                        false
                    }
                    Key::Char(c) if alt && mnemonics => self.open_by_mnemonic(c),
                    _ => false,
                }
            }
            MenubarMode::Focused => match key {
                Key::ArrowLeft => self.focus_neighbour(focused, -1),
                Key::ArrowRight => self.focus_neighbour(focused, 1),
                Key::ArrowDown | Key::Enter | Key::Space => match focused {
                    Some(index) => {
                        self.open(index);
                        true
                    }
                    None => false,
                },
                Key::Escape | Key::Alt => {
                    self.blur();
                    true
                }
                Key::Char(c) if mnemonics => self.open_by_mnemonic(c),
                _ => false,
            },
            MenubarMode::Visible => match key {
                Key::Alt => match self.neighbour(None, 1) {
                    Some(first) => {
                        self.focus(first);
                        true
                    }
                    None => false,
                },
                Key::Char(c) if alt && mnemonics => self.open_by_mnemonic(c),
                _ => false,
            },
        }
    }

    /// Next usable button from `from` in `direction`, wrapping around
    fn neighbour(&self, from: Option<usize>, direction: isize) -> Option<usize> {
        let usable: Vec<bool> = {
            let state = self.shared.state.borrow();
            state
                .buttons
                .iter()
                .map(|b| {
                    let d = b.item.borrow();
                    d.enabled && d.visible
                })
                .collect()
        };
        let len = usable.len() as isize;
        if len == 0 {
            return None;
        }
        let start = match from {
            Some(i) => i as isize,
            None if direction > 0 => -1,
            None => len,
        };
        (1..=len)
            .map(|step| (start + direction * step).rem_euclid(len) as usize)
            .find(|&i| usable[i])
    }

    fn open_neighbour(&self, from: Option<usize>, direction: isize) -> bool {
        match self.neighbour(from, direction) {
            Some(index) => {
                self.open(index);
                true
            }
            None => false,
        }
    }

    fn focus_neighbour(&self, from: Option<usize>, direction: isize) -> bool {
        match self.neighbour(from, direction) {
            Some(index) => {
                self.focus(index);
                true
            }
            None => false,
        }
    }

    fn open_by_mnemonic(&self, c: char) -> bool {
        let Some(code) = KeyCode::from_char(c) else {
            return false;
        };
        let index = self
            .shared
            .state
            .borrow()
            .buttons
            .iter()
            .position(|b| b.mnemonic == Some(code));
        match index {
            Some(index) => {
                self.open(index);
                true
            }
            None => false,
        }
    }

    /// Store the palette and forward it to the open dropdown
    pub fn set_styles(&self, style: MenuStyle) {
        let open = {
            let mut state = self.shared.state.borrow_mut();
            state.style = Some(style);
            state.open.as_ref().map(|o| o.container.clone())
        };
        self.paint_buttons();
        if let Some(container) = open {
            container.set_style(style);
        }
    }

    fn paint_buttons(&self) {
        let state = self.shared.state.borrow();
        let Some(style) = state.style else {
            return;
        };
        let mut doc = state.ctx.dom.borrow_mut();
        for (index, button) in state.buttons.iter().enumerate() {
            doc.set_style(button.title, "color", &style.foreground.to_css());
            if state.focused == Some(index) {
                doc.set_style(button.node, "background-color", &style.selection_background.to_css());
                doc.set_style(button.title, "color", &style.selection_foreground.to_css());
            } else {
                doc.remove_style(button.node, "background-color");
            }
        }
    }

    /// Fires `true` when a dropdown opens and `false` when the last one closes
    pub fn on_visibility_change(&self, listener: impl Fn(&bool) + 'static) -> Subscription {
        self.shared.on_visibility.subscribe(listener)
    }

    /// Fires when the bar gains or loses keyboard focus
    pub fn on_focus_state_change(&self, listener: impl Fn(&bool) + 'static) -> Subscription {
        self.shared.on_focus_state.subscribe(listener)
    }

    pub fn mode(&self) -> MenubarMode {
        self.shared.state.borrow().mode
    }

    pub fn is_open(&self) -> bool {
        self.mode() == MenubarMode::Open
    }

    pub fn open_index(&self) -> Option<usize> {
        self.shared.state.borrow().open.as_ref().map(|o| o.index)
    }

    /// The dropdown currently open
    pub fn open_menu(&self) -> Option<MenuContainer> {
        self.shared
            .state
            .borrow()
            .open
            .as_ref()
            .map(|o| o.container.clone())
    }

    pub fn button(&self, index: usize) -> Option<NodeId> {
        self.shared.state.borrow().buttons.get(index).map(|b| b.node)
    }

    pub fn button_count(&self) -> usize {
        self.shared.state.borrow().buttons.len()
    }

    pub fn is_disposed(&self) -> bool {
        self.shared.state.borrow().disposed
    }

    /// Remove every button and listener. Repeated calls do nothing.
    pub fn dispose(&self) {
        if self.is_disposed() {
            return;
        }
        self.close_open_menu();
        let (listeners, buttons, dom) = {
            let mut state = self.shared.state.borrow_mut();
            state.disposed = true;
            state.open = None;
            state.focused = None;
            state.mode = MenubarMode::Visible;
            (
                std::mem::take(&mut state.listeners),
                std::mem::take(&mut state.buttons),
                state.ctx.dom.clone(),
            )
        };
        let mut listeners = listeners;
        listeners.dispose();
        {
            let mut doc = dom.borrow_mut();
            for button in &buttons {
                doc.destroy_node(button.node);
            }
        }
        self.shared.on_visibility.clear();
        self.shared.on_focus_state.clear();
        info!("Menubar disposed");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::{dispatch_event, Document};
    use crate::host::HeadlessWindow;
    use crate::menu::MenuItemDescriptor;
    use crate::platform::Platform;
    use crate::theme::{Color, TitlebarPalette};
    use std::cell::Cell;

    struct Fixture {
        menubar: Menubar,
        ctx: Rc<MenuContext>,
        container: NodeId,
        window: Rc<HeadlessWindow>,
    }

    fn app_menu(quit_calls: Rc<Cell<u32>>) -> Menu {
        Menu::new(vec![
            MenuItemDescriptor::submenu(
                "&&File",
                Menu::new(vec![
                    MenuItemDescriptor::normal("&&New"),
                    MenuItemDescriptor::separator(),
                    MenuItemDescriptor::normal("&&Quit").on_click(move |_, window, _| {
                        quit_calls.set(quit_calls.get() + 1);
                        window.close();
                    }),
                ]),
            ),
            MenuItemDescriptor::submenu(
                "&&Edit",
                Menu::new(vec![MenuItemDescriptor::normal("&&Undo").with_role("undo")]),
            ),
            MenuItemDescriptor::submenu("&&Help", Menu::new(vec![MenuItemDescriptor::normal("&&About")])),
        ])
    }

    fn setup(menu: Menu) -> Fixture {
        let dom = Document::shared();
        let container = {
            let mut doc = dom.borrow_mut();
            let body = doc.body();
            doc.append_new(body, "div.menubar")
        };
        let window = Rc::new(HeadlessWindow::new());
        let ctx = Rc::new(MenuContext {
            dom,
            window: window.clone(),
            platform: Platform::Windows,
            enable_mnemonics: true,
        });
        let menubar = Menubar::new(ctx.clone(), container, menu);
        menubar.setup_menubar();
        Fixture {
            menubar,
            ctx,
            container,
            window,
        }
    }

    fn record(emitter_sub: impl FnOnce(Rc<RefCell<Vec<bool>>>) -> Subscription) -> (Rc<RefCell<Vec<bool>>>, Subscription) {
        let log = Rc::new(RefCell::new(Vec::new()));
        let sub = emitter_sub(log.clone());
        (log, sub)
    }

    #[test]
    fn renders_buttons_with_mnemonic_titles() {
        let fx = setup(app_menu(Rc::new(Cell::new(0))));
        assert_eq!(fx.menubar.button_count(), 3);
        let doc = fx.ctx.dom.borrow();
        let button = fx.menubar.button(0).unwrap();
        assert_eq!(doc.attribute(button, "aria-label"), Some("File"));
        assert_eq!(doc.attribute(button, "aria-keyshortcuts"), Some("f"));
        let title = doc.query_selector(button, "menubar-menu-title").unwrap();
        assert_eq!(doc.inner_html(title), Some("<u aria-hidden=\"true\">F</u>ile"));
    }

    #[test]
    fn click_toggles_dropdown_and_fires_events() {
        let fx = setup(app_menu(Rc::new(Cell::new(0))));
        let (visibility, _v) = record(|log| fx.menubar.on_visibility_change(move |v| log.borrow_mut().push(*v)));
        let (focus, _f) = record(|log| fx.menubar.on_focus_state_change(move |v| log.borrow_mut().push(*v)));

        let button = fx.menubar.button(0).unwrap();
        dispatch_event(&fx.ctx.dom, button, DomEvent::click());
        assert!(fx.menubar.is_open());
        assert!(fx.ctx.dom.borrow().has_class(button, "open"));

        dispatch_event(&fx.ctx.dom, button, DomEvent::click());
        assert!(!fx.menubar.is_open());
        assert!(!fx.ctx.dom.borrow().has_class(button, "open"));
        assert_eq!(*visibility.borrow(), vec![true, false]);
        assert_eq!(*focus.borrow(), vec![true, false]);
    }

    #[test]
    fn hover_switches_open_dropdown() {
        let fx = setup(app_menu(Rc::new(Cell::new(0))));
        let (visibility, _v) = record(|log| fx.menubar.on_visibility_change(move |v| log.borrow_mut().push(*v)));
        fx.menubar.open(0);
        let edit = fx.menubar.button(1).unwrap();
        dispatch_event(&fx.ctx.dom, edit, DomEvent::new(EventType::MouseOver));
        assert_eq!(fx.menubar.open_index(), Some(1));
        assert_eq!(*visibility.borrow(), vec![true]);
        let file = fx.menubar.button(0).unwrap();
        assert!(fx.ctx.dom.borrow().query_selector(file, "menubar-menu-container").is_none());
    }

    #[test]
    fn hover_without_open_menu_does_nothing() {
        let fx = setup(app_menu(Rc::new(Cell::new(0))));
        let edit = fx.menubar.button(1).unwrap();
        dispatch_event(&fx.ctx.dom, edit, DomEvent::new(EventType::MouseOver));
        assert!(!fx.menubar.is_open());
    }

    #[test]
    fn activating_command_closes_menubar() {
        let quits = Rc::new(Cell::new(0));
        let fx = setup(app_menu(quits.clone()));
        fx.menubar.open(0);
        let dropdown = fx.menubar.open_menu().unwrap();
        let quit_li = dropdown.item(2).unwrap().container().unwrap();
        dispatch_event(&fx.ctx.dom, quit_li, DomEvent::click());
        assert_eq!(quits.get(), 1);
        assert!(fx.window.is_closed());
        assert!(!fx.menubar.is_open());
        assert!(dropdown.is_disposed());
    }

    #[test]
    fn keyboard_navigation() {
        let fx = setup(app_menu(Rc::new(Cell::new(0))));
        let key = |k: Key| dispatch_event(&fx.ctx.dom, fx.container, DomEvent::key_down(k));

        key(Key::Alt);
        assert_eq!(fx.menubar.mode(), MenubarMode::Focused);
        key(Key::ArrowRight);
        key(Key::ArrowDown);
        assert_eq!(fx.menubar.open_index(), Some(1));

        key(Key::ArrowRight);
        assert_eq!(fx.menubar.open_index(), Some(2));
        key(Key::ArrowRight);
        assert_eq!(fx.menubar.open_index(), Some(0));

        let ev = key(Key::Escape);
        assert!(ev.is_default_prevented());
        assert_eq!(fx.menubar.mode(), MenubarMode::Visible);
    }

    #[test]
    fn alt_mnemonic_opens_menu() {
        let fx = setup(app_menu(Rc::new(Cell::new(0))));
        dispatch_event(
            &fx.ctx.dom,
            fx.container,
            DomEvent::key_down(Key::Char('h')).with_alt(),
        );
        assert_eq!(fx.menubar.open_index(), Some(2));
        // without Alt a bare letter is ignored while idle
        fx.menubar.blur();
        assert!(!fx.menubar.handle_key(Key::Char('e'), false));
    }

    #[test]
    fn styles_reach_open_dropdown() {
        let fx = setup(app_menu(Rc::new(Cell::new(0))));
        let style = TitlebarPalette::derive(Color::rgb(0x44, 0x44, 0x44), None, false, true).menu;
        fx.menubar.set_styles(style);
        fx.menubar.open(0);
        let root = fx.menubar.open_menu().unwrap().root().unwrap();
        let doc = fx.ctx.dom.borrow();
        assert_eq!(
            doc.style(root, "background-color").map(str::to_string),
            Some(style.background.to_css())
        );
        let button = fx.menubar.button(0).unwrap();
        assert_eq!(
            doc.style(button, "background-color").map(str::to_string),
            Some(style.selection_background.to_css())
        );
    }

    #[test]
    fn dispose_is_idempotent() {
        let fx = setup(app_menu(Rc::new(Cell::new(0))));
        let calls = Rc::new(Cell::new(0));
        let c = calls.clone();
        let _sub = fx.menubar.on_visibility_change(move |_| c.set(c.get() + 1));
        fx.menubar.open(1);
        fx.menubar.dispose();
        fx.menubar.dispose();
        assert_eq!(fx.ctx.dom.borrow().listener_count(None), 0);
        assert!(fx.ctx.dom.borrow().children(fx.container).is_empty());
        fx.menubar.open(0);
        assert!(!fx.menubar.is_open());
        assert_eq!(calls.get(), 1);
    }
}
