//! Menu descriptors
//!
//! The menu tree is owned by the host application. Items are shared through
//! [`MenuItemRef`] so the host can flip `checked`/`enabled`/`visible` between
//! renders; the titlebar re-reads them on every reconciliation.

use std::cell::RefCell;
use std::fmt;
use std::rc::{Rc, Weak};

use crate::host::HostWindow;
use crate::menu::radio::RadioGroup;

/// Shared handle to a menu item
pub type MenuItemRef = Rc<RefCell<MenuItemDescriptor>>;

/// Callback run when an item is activated
pub type ClickHandler = Rc<dyn Fn(&MenuItemRef, &dyn HostWindow, &MenuClickEvent)>;

/// Kind of menu entry, fixed once the item exists
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MenuItemType {
    Normal,
    Separator,
    Checkbox,
    Radio,
    Submenu,
}

/// Modifier state handed to click handlers
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MenuClickEvent {
    pub alt_key: bool,
    pub shift_key: bool,
    pub ctrl_key: bool,
    pub meta_key: bool,
    pub triggered_by_accelerator: bool,
}

/// One entry of a menu
pub struct MenuItemDescriptor {
    pub id: Option<String>,
    /// Label, possibly with a `&&` mnemonic marker
    pub label: String,
    /// Secondary text, shown as tooltip
    pub sublabel: Option<String>,
    /// Semantic action (`copy`, `undo`, ...) that implies a default accelerator
    pub role: Option<String>,
    pub accelerator: Option<String>,
    pub icon: Option<String>,
    pub enabled: bool,
    pub checked: bool,
    pub visible: bool,
    submenu: Option<Menu>,
    kind: MenuItemType,
    click: Option<ClickHandler>,
    radio_peers: Vec<Weak<RefCell<MenuItemDescriptor>>>,
}

impl MenuItemDescriptor {
    fn with_kind(kind: MenuItemType, label: impl Into<String>) -> Self {
        Self {
            id: None,
            label: label.into(),
            sublabel: None,
            role: None,
            accelerator: None,
            icon: None,
            enabled: true,
            checked: false,
            visible: true,
            submenu: None,
            kind,
            click: None,
            radio_peers: Vec::new(),
        }
    }

    /// Plain command item
    pub fn normal(label: impl Into<String>) -> Self {
        Self::with_kind(MenuItemType::Normal, label)
    }

    pub fn separator() -> Self {
        Self::with_kind(MenuItemType::Separator, "")
    }

    pub fn checkbox(label: impl Into<String>, checked: bool) -> Self {
        Self {
            checked,
            ..Self::with_kind(MenuItemType::Checkbox, label)
        }
    }

    pub fn radio(label: impl Into<String>, checked: bool) -> Self {
        Self {
            checked,
            ..Self::with_kind(MenuItemType::Radio, label)
        }
    }

    pub fn submenu(label: impl Into<String>, menu: Menu) -> Self {
        Self {
            submenu: Some(menu),
            ..Self::with_kind(MenuItemType::Submenu, label)
        }
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn with_role(mut self, role: impl Into<String>) -> Self {
        self.role = Some(role.into());
        self
    }

    pub fn with_accelerator(mut self, accelerator: impl Into<String>) -> Self {
        self.accelerator = Some(accelerator.into());
        self
    }

    pub fn with_icon(mut self, icon: impl Into<String>) -> Self {
        self.icon = Some(icon.into());
        self
    }

    pub fn with_sublabel(mut self, sublabel: impl Into<String>) -> Self {
        self.sublabel = Some(sublabel.into());
        self
    }

    pub fn enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }

    pub fn visible(mut self, visible: bool) -> Self {
        self.visible = visible;
        self
    }

    pub fn on_click(
        mut self,
        handler: impl Fn(&MenuItemRef, &dyn HostWindow, &MenuClickEvent) + 'static,
    ) -> Self {
        self.click = Some(Rc::new(handler));
        self
    }

    /// Child menu; only submenu entries have one
    pub fn child_menu(&self) -> Option<&Menu> {
        self.submenu.as_ref()
    }

    pub fn into_ref(self) -> MenuItemRef {
        Rc::new(RefCell::new(self))
    }

    pub fn kind(&self) -> MenuItemType {
        self.kind
    }

    pub fn is_separator(&self) -> bool {
        self.kind == MenuItemType::Separator
    }
}

impl fmt::Debug for MenuItemDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MenuItemDescriptor")
            .field("id", &self.id)
            .field("label", &self.label)
            .field("kind", &self.kind)
            .field("enabled", &self.enabled)
            .field("checked", &self.checked)
            .field("visible", &self.visible)
            .field("submenu", &self.submenu)
            .finish_non_exhaustive()
    }
}

/// Ordered list of menu items
#[derive(Debug, Clone, Default)]
pub struct Menu {
    items: Vec<MenuItemRef>,
}

impl Menu {
    /// Build a menu, linking radio items that share a separator-delimited run
    pub fn new(items: Vec<MenuItemDescriptor>) -> Self {
        Self::from_refs(items.into_iter().map(MenuItemDescriptor::into_ref).collect())
    }

    pub fn from_refs(items: Vec<MenuItemRef>) -> Self {
        for (index, item) in items.iter().enumerate() {
            if item.borrow().kind != MenuItemType::Radio {
                continue;
            }
            let group = RadioGroup::resolve(&items, index, |i| i.borrow().is_separator());
            let peers = items[group.range()]
                .iter()
                .filter(|peer| !Rc::ptr_eq(peer, item))
                .filter(|peer| peer.borrow().kind == MenuItemType::Radio)
                .map(Rc::downgrade)
                .collect();
            item.borrow_mut().radio_peers = peers;
        }
        Self { items }
    }

    pub fn items(&self) -> &[MenuItemRef] {
        &self.items
    }

    pub fn get(&self, index: usize) -> Option<&MenuItemRef> {
        self.items.get(index)
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Depth-first lookup by item id
    pub fn find_by_id(&self, id: &str) -> Option<MenuItemRef> {
        for item in &self.items {
            let descriptor = item.borrow();
            if descriptor.id.as_deref() == Some(id) {
                return Some(item.clone());
            }
            if let Some(found) = descriptor.submenu.as_ref().and_then(|m| m.find_by_id(id)) {
                return Some(found);
            }
        }
        None
    }
}

/// Activate an item the way the host menu toolkit does
///
/// Checkboxes flip, radio items become the only checked member of their run,
/// then the item's click handler runs. No borrow of the item is held while the
/// handler executes.
pub fn activate_item(item: &MenuItemRef, window: &dyn HostWindow, event: &MenuClickEvent) {
    let handler = {
        let mut descriptor = item.borrow_mut();
        match descriptor.kind {
            MenuItemType::Checkbox => descriptor.checked = !descriptor.checked,
            MenuItemType::Radio => {
                for peer in descriptor.radio_peers.iter().filter_map(Weak::upgrade) {
                    peer.borrow_mut().checked = false;
                }
                descriptor.checked = true;
            }
            MenuItemType::Normal | MenuItemType::Separator | MenuItemType::Submenu => {}
        }
        descriptor.click.clone()
    };
    if let Some(handler) = handler {
        handler(item, window, event);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::HeadlessWindow;
    use std::cell::Cell;

    fn checked(menu: &Menu) -> Vec<bool> {
        menu.items().iter().map(|i| i.borrow().checked).collect()
    }

    #[test]
    fn checkbox_toggles_and_calls_handler() {
        let calls = Rc::new(Cell::new(0));
        let c = calls.clone();
        let item = MenuItemDescriptor::checkbox("Word Wrap", false)
            .on_click(move |item, _, _| {
                assert!(item.borrow().checked);
                c.set(c.get() + 1);
            })
            .into_ref();
        let window = HeadlessWindow::new();
        activate_item(&item, &window, &MenuClickEvent::default());
        assert!(item.borrow().checked);
        assert_eq!(calls.get(), 1);
    }

    #[test]
    fn radio_unchecks_peers_in_same_run_only() {
        let menu = Menu::new(vec![
            MenuItemDescriptor::radio("A", true),
            MenuItemDescriptor::radio("B", true),
            MenuItemDescriptor::separator(),
            MenuItemDescriptor::radio("C", true),
        ]);
        let window = HeadlessWindow::new();
        activate_item(&menu.items()[1], &window, &MenuClickEvent::default());
        assert_eq!(checked(&menu), vec![false, true, false, true]);
    }

    #[test]
    fn only_submenu_entries_carry_a_child_menu() {
        let child = Menu::new(vec![MenuItemDescriptor::normal("Inner")]);
        let entry = MenuItemDescriptor::submenu("Outer", child);
        assert_eq!(entry.kind(), MenuItemType::Submenu);
        assert_eq!(entry.child_menu().map(Menu::len), Some(1));

        for item in [
            MenuItemDescriptor::normal("Plain"),
            MenuItemDescriptor::checkbox("Check", true),
            MenuItemDescriptor::radio("Pick", false),
            MenuItemDescriptor::separator(),
        ] {
            assert!(item.child_menu().is_none());
        }
    }

    #[test]
    fn find_by_id_descends_into_submenus() {
        let menu = Menu::new(vec![MenuItemDescriptor::submenu(
            "&&View",
            Menu::new(vec![MenuItemDescriptor::normal("Zoom In").with_id("zoom-in")]),
        )]);
        let found = menu.find_by_id("zoom-in").expect("nested item");
        assert_eq!(found.borrow().label, "Zoom In");
        assert!(menu.find_by_id("missing").is_none());
    }

    #[test]
    fn builder_defaults() {
        let item = MenuItemDescriptor::normal("Open");
        assert!(item.enabled && item.visible && !item.checked);
        assert_eq!(item.kind(), MenuItemType::Normal);
        assert!(MenuItemDescriptor::separator().is_separator());
    }
}
