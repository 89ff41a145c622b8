//! Menu item controller
//!
//! One controller per rendered menu entry. It owns the entry's DOM subtree and
//! reconciles each visual facet (label, icon, tooltip, enabled, checked,
//! visibility) against the shared descriptor, which the host may mutate at any
//! time between calls.

use log::{debug, trace};
use std::cell::RefCell;
use std::rc::{Rc, Weak};

use crate::dom::{add_disposable_listener, Document, DomEvent, EventType, NodeId};
use crate::lifecycle::{Disposable, DisposableStore};
use crate::menu::accelerator::{item_accelerator, parse_accelerator};
use crate::menu::mnemonic::{parse_label, KeyCode};
use crate::menu::model::{activate_item, MenuClickEvent, MenuItemRef, MenuItemType};
use crate::menu::radio::RadioGroup;
use crate::menu::MenuContext;
use crate::theme::MenuStyle;

/// Sibling list shared by the controllers of one menu
pub type Siblings = Rc<RefCell<Vec<MenuItemController>>>;

/// Callbacks supplied by the owning menu
#[derive(Clone)]
pub struct ItemHooks {
    /// Close the menu this item lives in
    pub close_submenu: Rc<dyn Fn()>,
    /// Open the child menu of a submenu entry
    pub open_submenu: Option<Rc<dyn Fn()>>,
}

impl Default for ItemHooks {
    fn default() -> Self {
        Self {
            close_submenu: Rc::new(|| {}),
            open_submenu: None,
        }
    }
}

/// Outcome of activating an item
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Activation {
    /// Checkbox state flipped and re-rendered
    Toggled,
    /// Radio item selected, its group re-rendered
    RadioSelected,
    /// Command ran and the menu was asked to close
    Closed,
    /// Submenu entry asked its menu to open the child
    OpenSubmenu,
    /// Disabled, separator or disposed
    Ignored,
}

#[derive(Debug, Clone, Copy)]
struct ItemNodes {
    container: NodeId,
    item: NodeId,
    check: Option<NodeId>,
    icon: Option<NodeId>,
    label: Option<NodeId>,
}

struct ItemState {
    item: MenuItemRef,
    ctx: Rc<MenuContext>,
    siblings: Weak<RefCell<Vec<MenuItemController>>>,
    index: usize,
    hooks: ItemHooks,
    mnemonic: Option<KeyCode>,
    radio_group: Option<RadioGroup>,
    click_event: MenuClickEvent,
    nodes: Option<ItemNodes>,
    style: Option<MenuStyle>,
    listeners: DisposableStore,
    disposed: bool,
}

/// Controller of a single rendered menu entry
#[derive(Clone)]
pub struct MenuItemController {
    kind: MenuItemType,
    inner: Rc<RefCell<ItemState>>,
}

impl MenuItemController {
    pub fn new(
        item: MenuItemRef,
        ctx: Rc<MenuContext>,
        siblings: Weak<RefCell<Vec<MenuItemController>>>,
        index: usize,
        hooks: ItemHooks,
    ) -> Self {
        let (kind, mnemonic) = {
            let descriptor = item.borrow();
            let mnemonic = if ctx.enable_mnemonics && !descriptor.label.is_empty() {
                parse_label(&descriptor.label, true).key_code
            } else {
                None
            };
            (descriptor.kind(), mnemonic)
        };
        Self {
            kind,
            inner: Rc::new(RefCell::new(ItemState {
                item,
                ctx,
                siblings,
                index,
                hooks,
                mnemonic,
                radio_group: None,
                click_event: MenuClickEvent::default(),
                nodes: None,
                style: None,
                listeners: DisposableStore::new(),
                disposed: false,
            })),
        }
    }

    fn from_weak(kind: MenuItemType, weak: &Weak<RefCell<ItemState>>) -> Option<Self> {
        weak.upgrade().map(|inner| Self { kind, inner })
    }

    /// Build the DOM subtree inside `container` and run a full reconciliation
    pub fn render(&self, container: NodeId) {
        let dom = {
            let state = self.inner.borrow();
            if state.disposed || state.nodes.is_some() {
                debug!("Menu item already rendered or disposed, skipping render");
                return;
            }
            state.ctx.dom.clone()
        };

        let nodes = self.build_nodes(container);
        self.inner.borrow_mut().nodes = Some(nodes);

        let weak = Rc::downgrade(&self.inner);
        let kind = self.kind;
        let mut listeners = Vec::new();

        let w = weak.clone();
        let d = Rc::downgrade(&dom);
        listeners.push(add_disposable_listener(&dom, container, EventType::MouseDown, move |e| {
            e.stop(true);
            let (Some(this), Some(dom)) = (Self::from_weak(kind, &w), d.upgrade()) else {
                return;
            };
            if this.is_enabled() && e.button == 0 {
                dom.borrow_mut().add_class(container, "active");
            }
        }));

        let w = weak.clone();
        listeners.push(add_disposable_listener(&dom, container, EventType::Click, move |e| {
            // Never let a click reach an enclosing submenu entry
            e.stop(true);
            if let Some(this) = Self::from_weak(kind, &w) {
                if this.is_enabled() && e.button == 0 {
                    this.on_click(e);
                }
            }
        }));

        listeners.push(add_disposable_listener(&dom, container, EventType::DblClick, |e| {
            e.stop(true)
        }));

        for event_type in [EventType::MouseUp, EventType::MouseOut] {
            let d = Rc::downgrade(&dom);
            listeners.push(add_disposable_listener(&dom, container, event_type, move |e| {
                e.stop(false);
                if let Some(dom) = d.upgrade() {
                    dom.borrow_mut().remove_class(container, "active");
                }
            }));
        }

        {
            let mut state = self.inner.borrow_mut();
            for listener in listeners {
                state.listeners.add(listener);
            }
        }

        self.update_label();
        self.update_icon();
        self.update_tooltip();
        self.update_enabled();
        self.update_checked();
        self.update_visibility();
    }

    fn build_nodes(&self, container: NodeId) -> ItemNodes {
        let state = self.inner.borrow();
        let descriptor = state.item.borrow();
        let mut doc = state.ctx.dom.borrow_mut();

        if self.kind == MenuItemType::Separator {
            let item = doc.append_new(container, "a.action-label.separator");
            doc.set_attribute(item, "role", "separator");
            return ItemNodes {
                container,
                item,
                check: None,
                icon: None,
                label: None,
            };
        }

        let item = doc.append_new(container, "a.action-menu-item");
        doc.set_attribute(item, "role", "menuitem");
        if let Some(code) = state.mnemonic {
            doc.set_attribute(item, "aria-keyshortcuts", &code.to_string());
        }

        let check = doc.append_new(item, "span.menu-item-check");
        doc.set_attribute(check, "role", "none");
        let icon = doc.append_new(item, "span.menu-item-icon");
        doc.set_attribute(icon, "role", "none");
        let label = doc.append_new(item, "span.action-label");

        let accelerator = item_accelerator(
            descriptor.role.as_deref(),
            &descriptor.label,
            descriptor.accelerator.as_deref(),
        );
        if let Some(accelerator) = accelerator {
            let keybinding = doc.append_new(item, "span.keybinding");
            doc.set_text(keybinding, &parse_accelerator(accelerator, state.ctx.platform));
        }

        if self.kind == MenuItemType::Submenu {
            doc.set_attribute(item, "aria-haspopup", "true");
            doc.add_class(container, "submenu-item");
            doc.append_new(item, "span.submenu-indicator");
        }

        ItemNodes {
            container,
            item,
            check: Some(check),
            icon: Some(icon),
            label: Some(label),
        }
    }

    /// Activate the item in response to `event`
    ///
    /// Runs the host action, then re-renders checkbox state, synchronizes the
    /// radio group, opens the child menu, or closes the menu, by item type.
    pub fn on_click(&self, event: &mut DomEvent) -> Activation {
        event.stop(true);
        if self.kind == MenuItemType::Separator || !self.is_enabled() || self.is_disposed() {
            return Activation::Ignored;
        }

        let activation = match self.kind {
            MenuItemType::Checkbox => Activation::Toggled,
            MenuItemType::Radio => Activation::RadioSelected,
            MenuItemType::Submenu => Activation::OpenSubmenu,
            MenuItemType::Normal => Activation::Closed,
            MenuItemType::Separator => Activation::Ignored,
        };

        let (item, window, click_event, hooks) = {
            let mut state = self.inner.borrow_mut();
            state.click_event = MenuClickEvent {
                alt_key: event.alt_key,
                shift_key: event.shift_key,
                ctrl_key: event.ctrl_key,
                meta_key: event.meta_key,
                triggered_by_accelerator: false,
            };
            (
                state.item.clone(),
                state.ctx.window.clone(),
                state.click_event,
                state.hooks.clone(),
            )
        };

        if self.kind != MenuItemType::Submenu {
            activate_item(&item, window.as_ref(), &click_event);
        }

        // The action may have replaced the whole menu
        if self.is_disposed() {
            return activation;
        }

        match activation {
            Activation::Toggled => self.update_checked(),
            Activation::RadioSelected => self.update_radio_group(),
            Activation::OpenSubmenu => {
                if let Some(open) = hooks.open_submenu {
                    open();
                }
            }
            Activation::Closed => (hooks.close_submenu)(),
            Activation::Ignored => {}
        }
        activation
    }

    /// Keyboard activation, equivalent to a primary-button click
    pub fn activate(&self) -> Activation {
        self.on_click(&mut DomEvent::click())
    }

    pub fn focus(&self) {
        self.with_nodes(|_, nodes, doc| {
            doc.focus(nodes.container);
            doc.add_class(nodes.container, "focused");
        });
        self.apply_style();
    }

    pub fn blur(&self) {
        self.with_nodes(|_, nodes, doc| {
            doc.blur(nodes.container);
            doc.remove_class(nodes.container, "focused");
        });
        self.apply_style();
    }

    /// Store the palette and repaint
    pub fn style(&self, style: MenuStyle) {
        self.inner.borrow_mut().style = Some(style);
        self.apply_style();
    }

    fn apply_style(&self) {
        self.with_nodes(|state, nodes, doc| {
            let Some(style) = state.style else {
                return;
            };
            if self.kind == MenuItemType::Separator {
                doc.set_style(nodes.item, "border-bottom-color", &style.separator.to_css());
                return;
            }
            let selected = doc.has_class(nodes.container, "focused");
            let (fg, bg) = if selected {
                (style.selection_foreground, style.selection_background)
            } else {
                (style.foreground, style.background)
            };
            if let Some(check) = nodes.check {
                doc.set_style(check, "background-color", &fg.to_css());
            }
            doc.set_style(nodes.item, "color", &fg.to_css());
            doc.set_style(nodes.item, "background-color", &bg.to_css());
        });
    }

    pub fn update_label(&self) {
        self.with_nodes(|state, nodes, doc| {
            let Some(label_node) = nodes.label else {
                return;
            };
            let descriptor = state.item.borrow();
            if descriptor.label.is_empty() {
                doc.set_inner_html(label_node, "");
                doc.remove_attribute(label_node, "aria-label");
                doc.remove_attribute(nodes.item, "aria-keyshortcuts");
                return;
            }
            let parsed = parse_label(&descriptor.label, state.ctx.enable_mnemonics);
            doc.set_attribute(label_node, "aria-label", &parsed.clean);
            doc.set_inner_html(label_node, &parsed.markup);
            match parsed.shortcut() {
                Some(shortcut) => doc.set_attribute(nodes.item, "aria-keyshortcuts", &shortcut),
                None => doc.remove_attribute(nodes.item, "aria-keyshortcuts"),
            }
        });
    }

    pub fn update_icon(&self) {
        self.with_nodes(|state, nodes, doc| {
            let Some(icon_node) = nodes.icon else {
                return;
            };
            doc.clear_children(icon_node);
            let descriptor = state.item.borrow();
            if let Some(icon) = descriptor.icon.as_deref().filter(|i| !i.is_empty()) {
                let img = doc.append_new(icon_node, "img");
                doc.set_attribute(img, "src", icon);
            }
        });
    }

    pub fn update_tooltip(&self) {
        self.with_nodes(|state, nodes, doc| {
            let descriptor = state.item.borrow();
            let title = match descriptor.sublabel.as_deref() {
                Some(sublabel) if !sublabel.is_empty() => Some(sublabel.to_string()),
                _ if descriptor.label.is_empty() && descriptor.icon.is_some() => descriptor
                    .accelerator
                    .as_deref()
                    .map(|a| parse_accelerator(a, state.ctx.platform)),
                _ => None,
            };
            match title {
                Some(title) => doc.set_attribute(nodes.item, "title", &title),
                None => doc.remove_attribute(nodes.item, "title"),
            }
        });
    }

    pub fn update_enabled(&self) {
        self.with_nodes(|state, nodes, doc| {
            let enabled = state.item.borrow().enabled && self.kind != MenuItemType::Separator;
            doc.toggle_class(nodes.container, "disabled", !enabled);
            doc.set_tab_index(nodes.container, enabled.then_some(0));
            if enabled {
                doc.remove_attribute(nodes.item, "aria-disabled");
            } else {
                doc.set_attribute(nodes.item, "aria-disabled", "true");
            }
        });
    }

    /// Remove the item element when the descriptor is hidden
    ///
    /// The element is not re-attached if the item becomes visible again.
    pub fn update_visibility(&self) {
        self.with_nodes(|state, nodes, doc| {
            if !state.item.borrow().visible && doc.parent(nodes.item).is_some() {
                trace!("Removing hidden menu item {:?}", nodes.item);
                doc.remove_node(nodes.item);
            }
        });
    }

    pub fn update_checked(&self) {
        if self.kind == MenuItemType::Separator {
            return;
        }
        self.with_nodes(|state, nodes, doc| {
            let checked = state.item.borrow().checked;
            let checked_role = match self.kind {
                MenuItemType::Radio => "menuitemradio",
                _ => "menuitemcheckbox",
            };
            doc.toggle_class(nodes.item, "checked", checked);
            doc.set_attribute(nodes.item, "role", if checked { checked_role } else { "menuitem" });
            doc.set_attribute(nodes.item, "aria-checked", if checked { "true" } else { "false" });
        });
    }

    /// Re-render every radio item of this item's group and share the range
    pub fn update_radio_group(&self) {
        let Some(group) = self.radio_group() else {
            return;
        };
        let siblings = self.siblings();
        let end = group.end.min(siblings.len());
        for member in siblings.get(group.start..end).unwrap_or_default() {
            if member.kind != MenuItemType::Radio {
                continue;
            }
            member.update_checked();
            if !member.ptr_eq(self) {
                member.set_radio_group(group);
            }
        }
    }

    /// The radio group of this item, resolved on first use
    pub fn radio_group(&self) -> Option<RadioGroup> {
        if let Some(group) = self.inner.borrow().radio_group {
            return Some(group);
        }
        let index = self.inner.borrow().index;
        let siblings = self.siblings();
        if index >= siblings.len() {
            return None;
        }
        let group = RadioGroup::resolve(&siblings, index, MenuItemController::is_separator);
        debug!("Resolved radio group {}..{} for item {}", group.start, group.end, index);
        self.inner.borrow_mut().radio_group = Some(group);
        Some(group)
    }

    /// Cached radio group, without resolving
    pub fn cached_radio_group(&self) -> Option<RadioGroup> {
        self.inner.borrow().radio_group
    }

    pub fn set_radio_group(&self, group: RadioGroup) {
        self.inner.borrow_mut().radio_group = Some(group);
    }

    fn siblings(&self) -> Vec<MenuItemController> {
        let weak = self.inner.borrow().siblings.clone();
        weak.upgrade()
            .map(|list| list.borrow().clone())
            .unwrap_or_default()
    }

    /// Destroy the item element and release listeners. Repeated calls do nothing.
    pub fn dispose(&self) {
        let (listeners, nodes, dom) = {
            let mut state = self.inner.borrow_mut();
            if state.disposed {
                return;
            }
            state.disposed = true;
            (
                std::mem::take(&mut state.listeners),
                state.nodes,
                state.ctx.dom.clone(),
            )
        };
        let mut listeners = listeners;
        listeners.dispose();
        if let Some(nodes) = nodes {
            dom.borrow_mut().destroy_node(nodes.item);
        }
    }

    fn with_nodes(&self, f: impl FnOnce(&ItemState, ItemNodes, &mut Document)) {
        let state = self.inner.borrow();
        let Some(nodes) = state.nodes else {
            return;
        };
        let dom = state.ctx.dom.clone();
        let mut doc = dom.borrow_mut();
        f(&state, nodes, &mut doc);
    }

    pub fn kind(&self) -> MenuItemType {
        self.kind
    }

    pub fn is_separator(&self) -> bool {
        self.kind == MenuItemType::Separator
    }

    pub fn has_submenu(&self) -> bool {
        self.kind == MenuItemType::Submenu
    }

    pub fn is_enabled(&self) -> bool {
        self.inner.borrow().item.borrow().enabled
    }

    /// Visible in the menu: descriptor visible and element still attached
    pub fn is_visible(&self) -> bool {
        let state = self.inner.borrow();
        let Some(nodes) = state.nodes else {
            return false;
        };
        let attached = state.ctx.dom.borrow().parent(nodes.item).is_some();
        attached && state.item.borrow().visible
    }

    pub fn is_disposed(&self) -> bool {
        self.inner.borrow().disposed
    }

    pub fn mnemonic(&self) -> Option<KeyCode> {
        self.inner.borrow().mnemonic
    }

    pub fn item(&self) -> MenuItemRef {
        self.inner.borrow().item.clone()
    }

    pub fn index(&self) -> usize {
        self.inner.borrow().index
    }

    pub fn container(&self) -> Option<NodeId> {
        self.inner.borrow().nodes.map(|n| n.container)
    }

    pub fn item_element(&self) -> Option<NodeId> {
        self.inner.borrow().nodes.map(|n| n.item)
    }

    pub fn label_element(&self) -> Option<NodeId> {
        self.inner.borrow().nodes.and_then(|n| n.label)
    }

    pub fn ptr_eq(&self, other: &MenuItemController) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }
}
