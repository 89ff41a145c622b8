//! Menu model, label parsing and the rendered menu controllers

pub mod accelerator;
pub mod container;
pub mod item;
pub mod mnemonic;
pub mod model;
pub mod radio;

use std::rc::Rc;

use crate::dom::Dom;
use crate::host::HostWindow;
use crate::platform::Platform;

pub use accelerator::{parse_accelerator, role_accelerator};
pub use container::MenuContainer;
pub use item::{Activation, ItemHooks, MenuItemController};
pub use mnemonic::{clean_mnemonic, parse_label, KeyCode, MnemonicLabel};
pub use model::{activate_item, Menu, MenuClickEvent, MenuItemDescriptor, MenuItemRef, MenuItemType};
pub use radio::RadioGroup;

/// Everything a rendered menu needs from its surroundings
pub struct MenuContext {
    pub dom: Dom,
    /// Window handed to item click handlers
    pub window: Rc<dyn HostWindow>,
    pub platform: Platform,
    pub enable_mnemonics: bool,
}
