//! Rendered menu lists
//!
//! A [`MenuContainer`] renders one [`Menu`] as `ul.actions-container` with one
//! `li.action-item` per entry, owns the controllers of those entries and the
//! sibling list they share, and handles focus, nested submenus and keyboard
//! navigation.

use log::debug;
use std::cell::RefCell;
use std::rc::{Rc, Weak};

use crate::dom::{add_disposable_listener, EventType, Key, NodeId};
use crate::lifecycle::{Disposable, DisposableStore};
use crate::menu::item::{Activation, ItemHooks, MenuItemController, Siblings};
use crate::menu::mnemonic::KeyCode;
use crate::menu::model::{Menu, MenuItemType};
use crate::menu::MenuContext;
use crate::theme::MenuStyle;

struct ContainerState {
    ctx: Rc<MenuContext>,
    menu: Menu,
    close_menu: Rc<dyn Fn()>,
    root: Option<NodeId>,
    items: Siblings,
    focused: Option<usize>,
    child: Option<(usize, MenuContainer)>,
    style: Option<MenuStyle>,
    listeners: DisposableStore,
    disposed: bool,
}

/// One level of a rendered menu
#[derive(Clone)]
pub struct MenuContainer {
    inner: Rc<RefCell<ContainerState>>,
}

impl MenuContainer {
    /// `close_menu` closes the whole menu tree after a command runs
    pub fn new(ctx: Rc<MenuContext>, menu: Menu, close_menu: Rc<dyn Fn()>) -> Self {
        Self {
            inner: Rc::new(RefCell::new(ContainerState {
                ctx,
                menu,
                close_menu,
                root: None,
                items: Rc::new(RefCell::new(Vec::new())),
                focused: None,
                child: None,
                style: None,
                listeners: DisposableStore::new(),
                disposed: false,
            })),
        }
    }

    fn from_weak(weak: &Weak<RefCell<ContainerState>>) -> Option<Self> {
        weak.upgrade().map(|inner| Self { inner })
    }

    /// Render the list into `parent`
    pub fn render(&self, parent: NodeId) {
        let (ctx, menu, close_menu, siblings) = {
            let state = self.inner.borrow();
            if state.disposed || state.root.is_some() {
                return;
            }
            (
                state.ctx.clone(),
                state.menu.clone(),
                state.close_menu.clone(),
                state.items.clone(),
            )
        };

        let root = {
            let mut doc = ctx.dom.borrow_mut();
            let root = doc.append_new(parent, "ul.actions-container");
            doc.set_attribute(root, "role", "menu");
            root
        };
        self.inner.borrow_mut().root = Some(root);

        let weak = Rc::downgrade(&self.inner);
        let mut controllers = Vec::with_capacity(menu.len());
        let mut listeners = Vec::with_capacity(menu.len());
        for (index, item) in menu.items().iter().enumerate() {
            let open_submenu: Option<Rc<dyn Fn()>> = (item.borrow().kind() == MenuItemType::Submenu).then(|| {
                let w = weak.clone();
                Rc::new(move || {
                    if let Some(this) = Self::from_weak(&w) {
                        this.open_child(index);
                        this.focus_first_in_child();
                    }
                }) as Rc<dyn Fn()>
            });
            let hooks = ItemHooks {
                close_submenu: close_menu.clone(),
                open_submenu,
            };
            let controller = MenuItemController::new(
                item.clone(),
                ctx.clone(),
                Rc::downgrade(&siblings),
                index,
                hooks,
            );

            let li = {
                let mut doc = ctx.dom.borrow_mut();
                let li = doc.append_new(root, "li.action-item");
                doc.set_attribute(li, "role", "presentation");
                li
            };

            let w = weak.clone();
            listeners.push(add_disposable_listener(&ctx.dom, li, EventType::MouseOver, move |e| {
                e.stop_propagation();
                if let Some(this) = Self::from_weak(&w) {
                    this.on_hover(index);
                }
            }));

            controllers.push((controller, li));
        }

        *siblings.borrow_mut() = controllers.iter().map(|(c, _)| c.clone()).collect();
        for (controller, li) in &controllers {
            controller.render(*li);
        }

        let style = {
            let mut state = self.inner.borrow_mut();
            for listener in listeners {
                state.listeners.add(listener);
            }
            state.style
        };
        if let Some(style) = style {
            self.set_style(style);
        }
        debug!("Rendered menu with {} item(s)", controllers.len());
    }

    fn on_hover(&self, index: usize) {
        let Some(controller) = self.item(index) else {
            return;
        };
        if controller.is_separator() {
            return;
        }
        self.focus_item(index);
        if controller.has_submenu() && controller.is_enabled() {
            self.open_child(index);
        } else {
            self.close_child();
        }
    }

    /// Open the submenu of the entry at `index`, closing any other open child
    pub fn open_child(&self, index: usize) {
        let (ctx, close_menu, style) = {
            let state = self.inner.borrow();
            if state.disposed || matches!(state.child, Some((open, _)) if open == index) {
                return;
            }
            (state.ctx.clone(), state.close_menu.clone(), state.style)
        };
        self.close_child();

        let Some(controller) = self.item(index) else {
            return;
        };
        let (Some(li), Some(submenu)) = (controller.container(), controller.item().borrow().child_menu().cloned())
        else {
            return;
        };

        let child = MenuContainer::new(ctx.clone(), submenu, close_menu);
        child.render(li);
        if let Some(root) = child.root() {
            ctx.dom.borrow_mut().add_class(root, "submenu");
        }
        if let Some(style) = style {
            child.set_style(style);
        }
        if let Some(item) = controller.item_element() {
            ctx.dom.borrow_mut().set_attribute(item, "aria-expanded", "true");
        }
        self.inner.borrow_mut().child = Some((index, child));
    }

    /// Dispose the open submenu, if any
    pub fn close_child(&self) {
        let Some((index, child)) = self.inner.borrow_mut().child.take() else {
            return;
        };
        child.dispose();
        if let Some(item) = self.item(index).and_then(|c| c.item_element()) {
            let dom = self.inner.borrow().ctx.dom.clone();
            dom.borrow_mut().remove_attribute(item, "aria-expanded");
        }
    }

    fn focus_first_in_child(&self) {
        if let Some(child) = self.child() {
            child.focus_next(1);
        }
    }

    /// Move focus to the entry at `index`
    pub fn focus_item(&self, index: usize) {
        let previous = self.inner.borrow_mut().focused.replace(index);
        if previous == Some(index) {
            return;
        }
        if let Some(previous) = previous.and_then(|i| self.item(i)) {
            previous.blur();
        }
        if let Some(controller) = self.item(index) {
            controller.focus();
        }
    }

    /// Clear focus from every entry
    pub fn blur(&self) {
        if let Some(previous) = self.inner.borrow_mut().focused.take() {
            if let Some(controller) = self.item(previous) {
                controller.blur();
            }
        }
    }

    /// Focus the next focusable entry in `direction` (+1/-1), wrapping around
    pub fn focus_next(&self, direction: isize) -> bool {
        let items = self.items();
        let len = items.len() as isize;
        if len == 0 {
            return false;
        }
        let start = match self.focused_index() {
            Some(i) => i as isize,
            None if direction > 0 => -1,
            None => len,
        };
        for step in 1..=len {
            let index = (start + direction * step).rem_euclid(len) as usize;
            if is_focusable(&items[index]) {
                self.focus_item(index);
                return true;
            }
        }
        false
    }

    /// Handle a key while this menu (or one of its submenus) is open
    ///
    /// Returns `false` for keys the owner should handle, such as Left/Escape on
    /// the innermost menu or Right on an entry without submenu.
    pub fn handle_key(&self, key: Key) -> bool {
        if let Some(child) = self.child() {
            if child.handle_key(key) {
                return true;
            }
            if matches!(key, Key::ArrowLeft | Key::Escape) {
                self.close_child();
                return true;
            }
            return false;
        }

        match key {
            Key::ArrowDown => self.focus_next(1),
            Key::ArrowUp => self.focus_next(-1),
            Key::Enter | Key::Space => match self.focused_item() {
                Some(controller) => {
                    controller.activate();
                    true
                }
                None => false,
            },
            Key::ArrowRight => match self.focused_item() {
                Some(controller) if controller.has_submenu() && controller.is_enabled() => {
                    controller.activate() == Activation::OpenSubmenu
                }
                _ => false,
            },
            Key::Char(c) => self.activate_mnemonic(c),
            Key::ArrowLeft | Key::Escape | Key::Tab | Key::Alt => false,
        }
    }

    fn activate_mnemonic(&self, c: char) -> bool {
        let Some(code) = KeyCode::from_char(c) else {
            return false;
        };
        let target = self
            .items()
            .into_iter()
            .find(|item| item.mnemonic() == Some(code) && is_focusable(item));
        match target {
            Some(controller) => {
                self.focus_item(controller.index());
                controller.activate();
                true
            }
            None => false,
        }
    }

    /// Paint the list and every entry with `style`
    pub fn set_style(&self, style: MenuStyle) {
        let (root, dom, child) = {
            let mut state = self.inner.borrow_mut();
            state.style = Some(style);
            (
                state.root,
                state.ctx.dom.clone(),
                state.child.as_ref().map(|(_, c)| c.clone()),
            )
        };
        if let Some(root) = root {
            let mut doc = dom.borrow_mut();
            doc.set_style(root, "background-color", &style.background.to_css());
            doc.set_style(root, "color", &style.foreground.to_css());
        }
        for item in self.items() {
            item.style(style);
        }
        if let Some(child) = child {
            child.set_style(style);
        }
    }

    /// Tear down submenus, controllers, listeners and the list element
    pub fn dispose(&self) {
        let (listeners, root, dom, child) = {
            let mut state = self.inner.borrow_mut();
            if state.disposed {
                return;
            }
            state.disposed = true;
            (
                std::mem::take(&mut state.listeners),
                state.root.take(),
                state.ctx.dom.clone(),
                state.child.take(),
            )
        };
        if let Some((_, child)) = child {
            child.dispose();
        }
        let mut listeners = listeners;
        listeners.dispose();
        let items = std::mem::take(&mut *self.inner.borrow().items.borrow_mut());
        for item in &items {
            item.dispose();
        }
        if let Some(root) = root {
            dom.borrow_mut().destroy_node(root);
        }
    }

    pub fn items(&self) -> Vec<MenuItemController> {
        self.inner.borrow().items.borrow().clone()
    }

    pub fn item(&self, index: usize) -> Option<MenuItemController> {
        self.inner.borrow().items.borrow().get(index).cloned()
    }

    pub fn root(&self) -> Option<NodeId> {
        self.inner.borrow().root
    }

    pub fn focused_index(&self) -> Option<usize> {
        self.inner.borrow().focused
    }

    pub fn focused_item(&self) -> Option<MenuItemController> {
        self.focused_index().and_then(|i| self.item(i))
    }

    /// The open submenu, if any
    pub fn child(&self) -> Option<MenuContainer> {
        self.inner.borrow().child.as_ref().map(|(_, c)| c.clone())
    }

    pub fn is_disposed(&self) -> bool {
        self.inner.borrow().disposed
    }
}

fn is_focusable(item: &MenuItemController) -> bool {
    !item.is_separator() && item.is_enabled() && item.is_visible()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::{dispatch_event, Document, DomEvent};
    use crate::host::HeadlessWindow;
    use crate::menu::model::MenuItemDescriptor;
    use crate::platform::Platform;
    use std::cell::Cell;

    fn setup(menu: Menu) -> (MenuContainer, Rc<MenuContext>, Rc<Cell<u32>>) {
        let dom = Document::shared();
        let body = dom.borrow().body();
        let ctx = Rc::new(MenuContext {
            dom,
            window: Rc::new(HeadlessWindow::new()),
            platform: Platform::Linux,
            enable_mnemonics: true,
        });
        let closes = Rc::new(Cell::new(0));
        let c = closes.clone();
        let container = MenuContainer::new(ctx.clone(), menu, Rc::new(move || c.set(c.get() + 1)));
        container.render(body);
        (container, ctx, closes)
    }

    fn edit_menu() -> Menu {
        Menu::new(vec![
            MenuItemDescriptor::normal("&&Undo").with_role("undo"),
            MenuItemDescriptor::separator(),
            MenuItemDescriptor::normal("Cu&&t").enabled(false),
            MenuItemDescriptor::normal("&&Copy"),
            MenuItemDescriptor::submenu(
                "&&Find",
                Menu::new(vec![
                    MenuItemDescriptor::normal("Find &&Next"),
                    MenuItemDescriptor::normal("Find &&Previous"),
                ]),
            ),
        ])
    }

    #[test]
    fn renders_list_items() {
        let (container, ctx, _) = setup(edit_menu());
        let root = container.root().unwrap();
        let doc = ctx.dom.borrow();
        assert_eq!(doc.attribute(root, "role"), Some("menu"));
        assert_eq!(doc.children(root).len(), 5);
        assert_eq!(doc.query_selector_all(root, "separator").len(), 1);
        assert_eq!(doc.query_selector_all(root, "submenu-indicator").len(), 1);
    }

    #[test]
    fn arrow_keys_skip_separators_and_disabled_items() {
        let (container, _, _) = setup(edit_menu());
        assert!(container.handle_key(Key::ArrowDown));
        assert_eq!(container.focused_index(), Some(0));
        assert!(container.handle_key(Key::ArrowDown));
        assert_eq!(container.focused_index(), Some(3));
        container.handle_key(Key::ArrowDown);
        assert_eq!(container.focused_index(), Some(4));
        container.handle_key(Key::ArrowDown);
        assert_eq!(container.focused_index(), Some(0));
        container.handle_key(Key::ArrowUp);
        assert_eq!(container.focused_index(), Some(4));
    }

    #[test]
    fn enter_activates_and_closes() {
        let (container, _, closes) = setup(edit_menu());
        container.handle_key(Key::ArrowDown);
        assert!(container.handle_key(Key::Enter));
        assert_eq!(closes.get(), 1);
    }

    #[test]
    fn mnemonic_activates_matching_item() {
        let (container, _, closes) = setup(edit_menu());
        assert!(container.handle_key(Key::Char('c')));
        assert_eq!(container.focused_index(), Some(3));
        assert_eq!(closes.get(), 1);
        // disabled item's mnemonic does nothing
        assert!(!container.handle_key(Key::Char('t')));
    }

    #[test]
    fn submenu_opens_and_closes_with_keyboard() {
        let (container, ctx, closes) = setup(edit_menu());
        container.focus_item(4);
        assert!(container.handle_key(Key::ArrowRight));
        let child = container.child().expect("submenu open");
        let child_root = child.root().unwrap();
        assert!(ctx.dom.borrow().has_class(child_root, "submenu"));
        assert_eq!(child.focused_index(), Some(0));

        assert!(container.handle_key(Key::ArrowDown));
        assert_eq!(child.focused_index(), Some(1));

        assert!(container.handle_key(Key::ArrowLeft));
        assert!(container.child().is_none());
        assert!(child.is_disposed());
        assert!(!ctx.dom.borrow().is_attached(child_root));
        assert_eq!(closes.get(), 0);
        assert!(!container.handle_key(Key::Escape));
    }

    #[test]
    fn hover_opens_submenu_and_switches_away() {
        let (container, ctx, _) = setup(edit_menu());
        let submenu_li = container.item(4).unwrap().container().unwrap();
        dispatch_event(&ctx.dom, submenu_li, DomEvent::new(EventType::MouseOver));
        assert!(container.child().is_some());
        assert_eq!(container.focused_index(), Some(4));

        let copy_li = container.item(3).unwrap().container().unwrap();
        dispatch_event(&ctx.dom, copy_li, DomEvent::new(EventType::MouseOver));
        assert!(container.child().is_none());
        assert_eq!(container.focused_index(), Some(3));
    }

    #[test]
    fn disabled_nested_item_keeps_events_to_itself() {
        let menu = Menu::new(vec![MenuItemDescriptor::submenu(
            "&&More",
            Menu::new(vec![
                MenuItemDescriptor::normal("&&First"),
                MenuItemDescriptor::normal("&&Second"),
                MenuItemDescriptor::normal("&&Gray").enabled(false),
            ]),
        )]);
        let (container, ctx, closes) = setup(menu);
        container.focus_item(0);
        assert!(container.handle_key(Key::ArrowRight));
        assert!(container.handle_key(Key::ArrowDown));
        let child = container.child().expect("submenu open");
        assert_eq!(child.focused_index(), Some(1));

        let parent_li = container.item(0).unwrap().container().unwrap();
        let gray_li = child.item(2).unwrap().container().unwrap();
        let down = dispatch_event(&ctx.dom, gray_li, DomEvent::mouse(EventType::MouseDown, 0));
        assert!(down.is_propagation_stopped());
        assert!(!ctx.dom.borrow().has_class(parent_li, "active"));
        assert!(!ctx.dom.borrow().has_class(gray_li, "active"));

        let click = dispatch_event(&ctx.dom, gray_li, DomEvent::click());
        assert!(click.is_propagation_stopped());
        assert_eq!(child.focused_index(), Some(1));
        assert!(container.child().is_some_and(|c| !c.is_disposed()));
        assert_eq!(closes.get(), 0);
    }

    #[test]
    fn closed_submenus_and_disposal_free_nodes() {
        let dom_baseline = Document::new().node_count();
        let (container, ctx, _) = setup(edit_menu());
        let rendered = ctx.dom.borrow().node_count();
        for _ in 0..3 {
            container.focus_item(4);
            container.handle_key(Key::ArrowRight);
            assert!(container.child().is_some());
            container.handle_key(Key::ArrowLeft);
            assert_eq!(ctx.dom.borrow().node_count(), rendered);
        }
        container.dispose();
        assert_eq!(ctx.dom.borrow().node_count(), dom_baseline);
    }

    #[test]
    fn clicking_submenu_entry_opens_child() {
        let (container, ctx, closes) = setup(edit_menu());
        let submenu_li = container.item(4).unwrap().container().unwrap();
        dispatch_event(&ctx.dom, submenu_li, DomEvent::click());
        assert!(container.child().is_some());
        assert_eq!(closes.get(), 0);

        let child = container.child().unwrap();
        let next_li = child.item(0).unwrap().container().unwrap();
        dispatch_event(&ctx.dom, next_li, DomEvent::click());
        assert_eq!(closes.get(), 1);
    }

    #[test]
    fn dispose_releases_everything() {
        let (container, ctx, _) = setup(edit_menu());
        container.focus_item(4);
        container.handle_key(Key::ArrowRight);
        let root = container.root().unwrap();
        container.dispose();
        container.dispose();
        let doc = ctx.dom.borrow();
        assert_eq!(doc.listener_count(None), 0);
        assert!(!doc.is_attached(root));
        assert!(container.items().is_empty());
    }
}
