//! Custom titlebar
//!
//! An OS-native looking titlebar for frameless windows: drag region, app icon,
//! title, window controls and a keyboard-navigable menubar with mnemonics,
//! accelerators, checkbox and radio items. Rendering targets an in-memory
//! [`dom::Document`]; the host window and timers are injected through the
//! [`host::HostWindow`] and [`scheduler::Scheduler`] traits.

pub mod config;
pub mod dom;
pub mod error;
pub mod event;
pub mod host;
pub mod lifecycle;
pub mod menu;
pub mod menubar;
pub mod platform;
pub mod scheduler;
pub mod theme;
pub mod titlebar;

pub use config::{MenuPosition, Order, TitleAlignment, TitlebarOptions};
pub use error::{TitlebarError, TitlebarResult};
pub use menu::{Menu, MenuItemDescriptor};
pub use platform::Platform;
pub use theme::Color;
pub use titlebar::{Titlebar, TitlebarBuilder};
