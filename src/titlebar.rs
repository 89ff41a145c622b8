//! Titlebar controller
//!
//! Builds the titlebar scaffold (drag region, icon, menubar mount, title,
//! window controls, resizers), mirrors the host window's focus, maximize and
//! fullscreen state into classes and styles, and exposes the update commands.
//! Every color change goes through [`Titlebar::update_styles`].

use log::{debug, info, warn};
use std::cell::{Cell, RefCell};
use std::rc::{Rc, Weak};
use std::time::Duration;

use crate::config::{MenuPosition, TitleAlignment, TitlebarOptions};
use crate::dom::{add_disposable_listener, Document, Dom, EventType, NodeId};
use crate::host::{HostWindow, SubscriptionId, WindowEvent};
use crate::lifecycle::{Disposable, DisposableStore};
use crate::menu::{Menu, MenuContext};
use crate::menubar::Menubar;
use crate::platform::{Platform, BOTTOM_TITLEBAR_HEIGHT};
use crate::scheduler::{Scheduler, TaskId};
use crate::theme::{Color, TitlebarPalette};

/// Delay before the drag region comes back after a menu opens
pub const DRAG_REGION_RESHOW_DELAY: Duration = Duration::from_millis(50);

const SHADOW: &str =
    "0 2px 1px -1px rgba(0, 0, 0, .2), 0 1px 1px 0 rgba(0, 0, 0, .14), 0 1px 3px 0 rgba(0, 0, 0, .12)";

/// Nodes of the titlebar scaffold
#[derive(Debug, Clone, Copy)]
pub struct TitlebarNodes {
    pub titlebar: NodeId,
    /// Receives the original body content
    pub content: NodeId,
    pub drag_region: NodeId,
    pub app_icon: Option<NodeId>,
    pub menubar: NodeId,
    pub title: NodeId,
    pub window_controls: Option<NodeId>,
    pub minimize: Option<NodeId>,
    pub max_restore: Option<NodeId>,
    pub close: Option<NodeId>,
    pub resizer_top: Option<NodeId>,
    pub resizer_left: Option<NodeId>,
}

struct TitlebarState {
    dom: Dom,
    window: Rc<dyn HostWindow>,
    scheduler: Rc<dyn Scheduler>,
    platform: Platform,
    options: TitlebarOptions,
    nodes: Option<TitlebarNodes>,
    menubar: Option<Menubar>,
    menubar_subscriptions: DisposableStore,
    listeners: DisposableStore,
    window_listeners: Vec<SubscriptionId>,
    drag_region_task: Rc<Cell<Option<TaskId>>>,
    is_inactive: bool,
    is_maximized: bool,
    is_fullscreen: bool,
    disposed: bool,
}

#[derive(Clone)]
struct Core(Rc<RefCell<TitlebarState>>);

/// Builder for [`Titlebar`]
pub struct TitlebarBuilder {
    dom: Dom,
    window: Rc<dyn HostWindow>,
    scheduler: Rc<dyn Scheduler>,
    platform: Platform,
    options: TitlebarOptions,
}

impl TitlebarBuilder {
    pub fn new(dom: Dom, window: Rc<dyn HostWindow>, scheduler: Rc<dyn Scheduler>) -> Self {
        Self {
            dom,
            window,
            scheduler,
            platform: Platform::current(),
            options: TitlebarOptions::default(),
        }
    }

    pub fn platform(mut self, platform: Platform) -> Self {
        self.platform = platform;
        self
    }

    pub fn options(mut self, options: TitlebarOptions) -> Self {
        self.options = options;
        self
    }

    /// Create the titlebar, insert it into the document and start listening
    pub fn build(self) -> Titlebar {
        let core = Core(Rc::new(RefCell::new(TitlebarState {
            dom: self.dom,
            window: self.window,
            scheduler: self.scheduler,
            platform: self.platform,
            options: self.options,
            nodes: None,
            menubar: None,
            menubar_subscriptions: DisposableStore::new(),
            listeners: DisposableStore::new(),
            window_listeners: Vec::new(),
            drag_region_task: Rc::new(Cell::new(None)),
            is_inactive: false,
            is_maximized: false,
            is_fullscreen: false,
            disposed: false,
        })));
        core.register_listeners();
        core.create_titlebar();
        core.update_styles();
        info!("Titlebar created for {:?}", self.platform);
        Titlebar { core }
    }
}

/// Custom titlebar bound to one host window
pub struct Titlebar {
    core: Core,
}

impl Titlebar {
    pub fn builder(dom: Dom, window: Rc<dyn HostWindow>, scheduler: Rc<dyn Scheduler>) -> TitlebarBuilder {
        TitlebarBuilder::new(dom, window, scheduler)
    }

    pub fn on_did_change_window_focus(&self, has_focus: bool) {
        self.core.on_did_change_window_focus(has_focus);
    }

    pub fn on_did_change_maximized(&self, maximized: bool) {
        self.core.on_did_change_maximized(maximized);
    }

    pub fn on_did_change_fullscreen(&self, fullscreen: bool) {
        self.core.on_did_change_fullscreen(fullscreen);
    }

    /// Recompute every color from the options and the focus state
    pub fn update_styles(&self) {
        self.core.update_styles();
    }

    pub fn update_background(&self, color: Color) {
        self.core.state_mut().options.background_color = color;
        self.core.update_styles();
    }

    pub fn update_item_bg_color(&self, color: Option<Color>) {
        self.core.state_mut().options.item_background_color = color;
        self.core.update_styles();
    }

    /// Set the title text; `None` shows the document title
    pub fn update_title(&self, title: Option<&str>) {
        self.core.update_title(title);
    }

    /// Set the app icon. Empty paths are ignored.
    pub fn update_icon(&self, path: &str) {
        self.core.update_icon(path);
    }

    /// Replace the menu; `None` removes the menubar
    pub fn update_menu(&self, menu: Option<Menu>) {
        self.core.update_menu(menu);
    }

    pub fn update_menu_position(&self, position: MenuPosition) {
        self.core.update_menu_position(position);
    }

    pub fn set_horizontal_alignment(&self, side: TitleAlignment) {
        self.core.set_horizontal_alignment(side);
    }

    /// Current options
    pub fn options(&self) -> TitlebarOptions {
        self.core.state().options.clone()
    }

    pub fn nodes(&self) -> Option<TitlebarNodes> {
        self.core.state().nodes
    }

    pub fn menubar(&self) -> Option<Menubar> {
        self.core.state().menubar.clone()
    }

    pub fn platform(&self) -> Platform {
        self.core.state().platform
    }

    pub fn is_inactive(&self) -> bool {
        self.core.state().is_inactive
    }

    pub fn is_maximized(&self) -> bool {
        self.core.state().is_maximized
    }

    pub fn is_fullscreen(&self) -> bool {
        self.core.state().is_fullscreen
    }

    pub fn is_disposed(&self) -> bool {
        self.core.state().disposed
    }

    /// Remove the titlebar, restore the page content and release all listeners
    pub fn dispose(&self) {
        self.core.dispose();
    }
}

impl Drop for Titlebar {
    fn drop(&mut self) {
        self.core.dispose();
    }
}

/// What the menubar event handlers need to toggle the drag region
#[derive(Clone)]
struct DragRegion {
    dom: Weak<RefCell<Document>>,
    node: NodeId,
    scheduler: Rc<dyn Scheduler>,
    pending: Rc<Cell<Option<TaskId>>>,
}

impl DragRegion {
    fn set_visible(&self, visible: bool) {
        if let Some(dom) = self.dom.upgrade() {
            let mut doc = dom.borrow_mut();
            if visible {
                doc.show(self.node);
            } else {
                doc.hide(self.node);
            }
        }
    }

    /// Hide now, show again after a short delay
    fn flash(&self) {
        self.set_visible(false);
        if let Some(previous) = self.pending.take() {
            self.scheduler.cancel(previous);
        }
        let region = self.clone();
        let id = self.scheduler.schedule(
            DRAG_REGION_RESHOW_DELAY,
            Box::new(move || {
                region.pending.set(None);
                region.set_visible(true);
            }),
        );
        self.pending.set(Some(id));
    }

    fn on_menubar_visibility_changed(&self, visible: bool) {
        if visible {
            self.flash();
        }
    }

    fn on_menubar_focus_changed(&self, focused: bool) {
        self.set_visible(!focused);
    }
}

impl Core {
    fn state(&self) -> std::cell::Ref<'_, TitlebarState> {
        self.0.borrow()
    }

    fn state_mut(&self) -> std::cell::RefMut<'_, TitlebarState> {
        self.0.borrow_mut()
    }

    fn weak(&self) -> Weak<RefCell<TitlebarState>> {
        Rc::downgrade(&self.0)
    }

    fn upgrade(weak: &Weak<RefCell<TitlebarState>>) -> Option<Core> {
        weak.upgrade().map(Core)
    }

    fn register_listeners(&self) {
        let window = self.state().window.clone();
        let weak = self.weak();
        let ids = WindowEvent::ALL
            .iter()
            .map(|&event| {
                let w = weak.clone();
                let callback: Rc<dyn Fn()> = Rc::new(move || {
                    if let Some(core) = Core::upgrade(&w) {
                        core.on_window_event(event);
                    }
                });
                window.on(event, callback)
            })
            .collect();
        self.state_mut().window_listeners = ids;
    }

    fn on_window_event(&self, event: WindowEvent) {
        debug!("Titlebar received {:?}", event);
        match event {
            WindowEvent::Focus => self.on_did_change_window_focus(true),
            WindowEvent::Blur => self.on_did_change_window_focus(false),
            WindowEvent::Maximize => self.on_did_change_maximized(true),
            WindowEvent::Unmaximize => self.on_did_change_maximized(false),
            WindowEvent::EnterFullScreen => self.on_did_change_fullscreen(true),
            WindowEvent::LeaveFullScreen => self.on_did_change_fullscreen(false),
        }
    }

    fn create_titlebar(&self) {
        let (dom, platform, options) = {
            let state = self.state();
            (state.dom.clone(), state.platform, state.options.clone())
        };
        let is_mac = platform.is_macintosh();

        let nodes = {
            let mut doc = dom.borrow_mut();
            let body = doc.body();

            let content = doc.create_element("div.container-after-titlebar");
            doc.set_style(content, "bottom", "0px");
            doc.set_style(content, "right", "0");
            doc.set_style(content, "left", "0");
            doc.set_style(content, "position", "absolute");
            doc.set_style(content, "overflow", &options.overflow);
            for child in doc.children(body) {
                doc.append(content, child);
            }
            doc.append(body, content);
            doc.set_style(body, "overflow", "hidden");
            doc.set_style(body, "margin", "0");

            let titlebar = doc.create_element("div.titlebar");
            doc.add_class(titlebar, platform.css_class());
            if let Some(order) = options.order {
                doc.add_class(titlebar, order.css_class());
            }
            if options.shadow {
                doc.set_style(titlebar, "box-shadow", SHADOW);
            }

            let drag_region = doc.append_new(titlebar, "div.titlebar-drag-region");

            let app_icon = (!is_mac && options.icon.is_some())
                .then(|| doc.append_new(titlebar, "div.window-appicon"));

            let menubar = doc.append_new(titlebar, "div.menubar");
            doc.set_attribute(menubar, "role", "menubar");

            let title = doc.append_new(titlebar, "div.window-title");
            if !is_mac {
                doc.set_style(title, "cursor", "default");
            }
            if matches!(platform, Platform::Macintosh { big_sur_or_later: true }) {
                doc.set_style(title, "font-weight", "600");
                doc.set_style(title, "font-size", "13px");
            }

            let mut nodes = TitlebarNodes {
                titlebar,
                content,
                drag_region,
                app_icon,
                menubar,
                title,
                window_controls: None,
                minimize: None,
                max_restore: None,
                close: None,
                resizer_top: None,
                resizer_left: None,
            };

            if !is_mac {
                let controls = doc.append_new(titlebar, "div.window-controls-container");

                let minimize_bg = doc.append_new(controls, "div.window-icon-bg");
                doc.set_attribute(minimize_bg, "title", "Minimize");
                let minimize = doc.append_new(minimize_bg, "div.window-icon.window-minimize");
                if !options.minimizable {
                    doc.add_class(minimize_bg, "inactive");
                }

                let restore_bg = doc.append_new(controls, "div.window-icon-bg");
                let max_restore = doc.append_new(restore_bg, "div.window-icon.window-max-restore");
                if !options.maximizable {
                    doc.add_class(restore_bg, "inactive");
                }

                let close_bg = doc.append_new(controls, "div.window-icon-bg.window-close-bg");
                doc.set_attribute(close_bg, "title", "Close");
                let close = doc.append_new(close_bg, "div.window-icon.window-close");
                if !options.closeable {
                    doc.add_class(close_bg, "inactive");
                }

                nodes.window_controls = Some(controls);
                nodes.minimize = Some(minimize);
                nodes.max_restore = Some(max_restore);
                nodes.close = Some(close);
                nodes.resizer_top = Some(doc.append_new(titlebar, "div.resizer.top"));
                nodes.resizer_left = Some(doc.append_new(titlebar, "div.resizer.left"));
            }

            doc.prepend(body, titlebar);
            nodes
        };
        self.state_mut().nodes = Some(nodes);

        self.register_dom_listeners(&dom, &nodes, &options, is_mac);

        if options.menu.is_some() {
            self.update_menu(options.menu.clone());
        }
        self.update_menu_position(options.menu_position);
        self.update_title(None);
        self.set_horizontal_alignment(options.title_horizontal_alignment);
        if let Some(icon) = options.icon.as_deref() {
            self.update_icon(icon);
        }
        if !is_mac {
            let maximized = self.state().window.is_maximized();
            self.on_did_change_maximized(maximized);
        }
    }

    fn register_dom_listeners(&self, dom: &Dom, nodes: &TitlebarNodes, options: &TitlebarOptions, is_mac: bool) {
        let window = self.state().window.clone();
        let weak = self.weak();
        let mut listeners = Vec::new();

        if is_mac {
            let (w, win) = (weak.clone(), window.clone());
            listeners.push(add_disposable_listener(dom, nodes.titlebar, EventType::DblClick, move |_| {
                let maximized = !win.is_maximized();
                if maximized {
                    win.maximize();
                } else {
                    win.unmaximize();
                }
                if let Some(core) = Core::upgrade(&w) {
                    core.on_did_change_maximized(maximized);
                }
            }));
        }

        if let (Some(minimize), true) = (nodes.minimize, options.minimizable) {
            let win = window.clone();
            listeners.push(add_disposable_listener(dom, minimize, EventType::Click, move |_| {
                win.minimize();
            }));
        }

        if let (Some(max_restore), true) = (nodes.max_restore, options.maximizable) {
            let (w, win) = (weak.clone(), window.clone());
            listeners.push(add_disposable_listener(dom, max_restore, EventType::Click, move |_| {
                let maximized = !win.is_maximized();
                if maximized {
                    win.maximize();
                } else {
                    win.unmaximize();
                }
                if let Some(core) = Core::upgrade(&w) {
                    core.on_did_change_maximized(maximized);
                }
            }));
        }

        if let (Some(close), true) = (nodes.close, options.closeable) {
            let (w, win) = (weak.clone(), window.clone());
            listeners.push(add_disposable_listener(dom, close, EventType::Click, move |_| {
                if Core::upgrade(&w).is_some_and(|core| core.hides_on_close()) {
                    win.hide();
                } else {
                    win.close();
                }
            }));
        }

        let mut state = self.state_mut();
        for listener in listeners {
            state.listeners.add(listener);
        }
    }

    fn hides_on_close(&self) -> bool {
        let state = self.state();
        state.options.hide_when_clicking_close
    }

    fn close_menu(&self) {
        let menubar = self.state().menubar.clone();
        if let Some(menubar) = menubar {
            menubar.blur();
        }
    }

    fn on_did_change_window_focus(&self, has_focus: bool) {
        let Some(nodes) = self.live_nodes() else {
            return;
        };
        {
            let mut state = self.state_mut();
            state.is_inactive = !has_focus;
            state.dom.borrow_mut().toggle_class(nodes.titlebar, "inactive", !has_focus);
        }
        if !has_focus {
            self.close_menu();
        }
        self.update_styles();
    }

    fn on_did_change_maximized(&self, maximized: bool) {
        let Some(nodes) = self.live_nodes() else {
            return;
        };
        let mut state = self.state_mut();
        state.is_maximized = maximized;
        let mut doc = state.dom.borrow_mut();
        if let Some(control) = nodes.max_restore {
            doc.toggle_class(control, "window-maximize", !maximized);
            doc.toggle_class(control, "window-unmaximize", maximized);
            doc.set_attribute(control, "title", if maximized { "Restore Down" } else { "Maximize" });
        }
        for resizer in [nodes.resizer_top, nodes.resizer_left].into_iter().flatten() {
            if maximized {
                doc.hide(resizer);
            } else {
                doc.show(resizer);
            }
        }
    }

    fn on_did_change_fullscreen(&self, fullscreen: bool) {
        let Some(nodes) = self.live_nodes() else {
            return;
        };
        let mut state = self.state_mut();
        state.is_fullscreen = fullscreen;
        if state.platform.is_macintosh() {
            return;
        }
        let mut doc = state.dom.borrow_mut();
        let targets = [nodes.app_icon, Some(nodes.title), nodes.window_controls];
        for node in targets.into_iter().flatten() {
            if fullscreen {
                doc.hide(node);
            } else {
                doc.show(node);
            }
        }
    }

    /// The single style routine behind focus changes and color updates
    fn update_styles(&self) {
        let Some(nodes) = self.live_nodes() else {
            return;
        };
        let (palette, menubar) = {
            let state = self.state();
            let palette = TitlebarPalette::derive(
                state.options.background_color,
                state.options.item_background_color,
                state.is_inactive,
                state.options.unfocus_effect,
            );
            let mut doc = state.dom.borrow_mut();
            doc.toggle_class(nodes.titlebar, "inactive", state.is_inactive);
            doc.set_style(nodes.titlebar, "background-color", &palette.background.to_css());
            doc.toggle_class(nodes.titlebar, "light", palette.is_light);
            doc.set_style(nodes.titlebar, "color", &palette.foreground.to_css());
            (palette, state.menubar.clone())
        };
        if let Some(menubar) = menubar {
            menubar.set_styles(palette.menu);
        }
    }

    fn update_title(&self, title: Option<&str>) {
        let Some(nodes) = self.live_nodes() else {
            return;
        };
        let state = self.state();
        let mut doc = state.dom.borrow_mut();
        let text = match title {
            Some(title) => {
                doc.set_title(title);
                title.to_string()
            }
            None => doc.title().to_string(),
        };
        doc.set_text(nodes.title, &text);
    }

    fn update_icon(&self, path: &str) {
        if path.is_empty() {
            return;
        }
        let Some(nodes) = self.live_nodes() else {
            return;
        };
        let mut state = self.state_mut();
        state.options.icon = Some(path.to_string());
        if let Some(icon) = nodes.app_icon {
            state
                .dom
                .borrow_mut()
                .set_style(icon, "background-image", &format!("url(\"{}\")", path));
        }
    }

    fn update_menu(&self, menu: Option<Menu>) {
        let Some(nodes) = self.live_nodes() else {
            warn!("update_menu on a disposed titlebar ignored");
            return;
        };
        let (platform, window) = {
            let state = self.state();
            (state.platform, state.window.clone())
        };

        if platform.is_macintosh() {
            window.set_application_menu(menu.as_ref());
            self.state_mut().options.menu = menu;
            return;
        }

        let previous = {
            let mut state = self.state_mut();
            state.menubar_subscriptions.clear();
            state.menubar.take()
        };
        if let Some(previous) = previous {
            previous.dispose();
        }

        let Some(menu) = menu else {
            self.state_mut().options.menu = None;
            info!("Menubar removed");
            return;
        };

        let (ctx, region) = {
            let mut state = self.state_mut();
            state.options.menu = Some(menu.clone());
            let ctx = Rc::new(MenuContext {
                dom: state.dom.clone(),
                window: state.window.clone(),
                platform: state.platform,
                enable_mnemonics: state.options.enable_mnemonics,
            });
            let region = DragRegion {
                dom: Rc::downgrade(&state.dom),
                node: nodes.drag_region,
                scheduler: state.scheduler.clone(),
                pending: state.drag_region_task.clone(),
            };
            (ctx, region)
        };

        let menubar = Menubar::new(ctx, nodes.menubar, menu.clone());
        menubar.setup_menubar();

        let r = region.clone();
        let visibility = menubar.on_visibility_change(move |visible| r.on_menubar_visibility_changed(*visible));
        let focus = menubar.on_focus_state_change(move |focused| region.on_menubar_focus_changed(*focused));
        {
            let mut state = self.state_mut();
            state.menubar_subscriptions.add(visibility);
            state.menubar_subscriptions.add(focus);
            state.menubar = Some(menubar);
        }
        info!("Menubar installed with {} top-level menu(s)", menu.len());
        self.update_styles();
    }

    fn update_menu_position(&self, position: MenuPosition) {
        let Some(nodes) = self.live_nodes() else {
            return;
        };
        let mut state = self.state_mut();
        state.options.menu_position = position;
        let bottom = state.options.is_bottom_menu();
        let height = if bottom {
            BOTTOM_TITLEBAR_HEIGHT
        } else {
            state.platform.top_titlebar_height()
        };
        let mut doc = state.dom.borrow_mut();
        doc.set_style(nodes.titlebar, "height", height);
        doc.set_style(nodes.content, "top", height);
        if bottom {
            doc.set_style(nodes.titlebar, "flex-wrap", "wrap");
        } else {
            doc.remove_style(nodes.titlebar, "flex-wrap");
        }
        doc.toggle_class(nodes.menubar, "bottom", bottom);
    }

    fn set_horizontal_alignment(&self, side: TitleAlignment) {
        let Some(nodes) = self.live_nodes() else {
            return;
        };
        let mut state = self.state_mut();
        state.options.title_horizontal_alignment = side;
        let side = match (side, state.options.is_inverted()) {
            (TitleAlignment::Left, true) => TitleAlignment::Right,
            (TitleAlignment::Right, true) => TitleAlignment::Left,
            (side, _) => side,
        };
        let (left, right) = match side {
            TitleAlignment::Left => ("8px", "auto"),
            TitleAlignment::Right => ("auto", "8px"),
            TitleAlignment::Center => ("auto", "auto"),
        };
        let mut doc = state.dom.borrow_mut();
        doc.set_style(nodes.title, "margin-left", left);
        doc.set_style(nodes.title, "margin-right", right);
    }

    /// Scaffold nodes, unless disposed
    fn live_nodes(&self) -> Option<TitlebarNodes> {
        let state = self.state();
        if state.disposed {
            return None;
        }
        state.nodes
    }

    fn dispose(&self) {
        let (menubar, window, window_listeners, scheduler, pending, nodes, dom, listeners, subscriptions) = {
            let mut state = self.state_mut();
            if state.disposed {
                return;
            }
            state.disposed = true;
            (
                state.menubar.take(),
                state.window.clone(),
                std::mem::take(&mut state.window_listeners),
                state.scheduler.clone(),
                state.drag_region_task.take(),
                state.nodes,
                state.dom.clone(),
                std::mem::take(&mut state.listeners),
                std::mem::take(&mut state.menubar_subscriptions),
            )
        };

        if let Some(task) = pending {
            scheduler.cancel(task);
        }
        let (mut subscriptions, mut listeners) = (subscriptions, listeners);
        subscriptions.dispose();
        if let Some(menubar) = menubar {
            menubar.dispose();
        }
        listeners.dispose();
        for id in window_listeners {
            window.remove_listener(id);
        }

        if let Some(nodes) = nodes {
            let mut doc = dom.borrow_mut();
            let body = doc.body();
            doc.destroy_node(nodes.titlebar);
            for child in doc.children(nodes.content) {
                doc.append(body, child);
            }
            doc.destroy_node(nodes.content);
        }
        info!("Titlebar disposed");
    }
}
