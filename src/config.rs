//! Titlebar options
//!
//! Construction-time options, loadable from a TOML file. The menu itself is a
//! runtime object and never serialized.

use anyhow::Result;
use log::{info, warn};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{TitlebarError, TitlebarResult};
use crate::menu::Menu;
use crate::theme::Color;

/// Default titlebar background
pub const DEFAULT_BACKGROUND: Color = Color::rgb(0x44, 0x44, 0x44);

/// Where the menubar sits
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MenuPosition {
    /// Next to the title
    #[default]
    Left,
    /// Wrapped below the title
    Bottom,
}

/// Horizontal placement of the window title
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TitleAlignment {
    Left,
    #[default]
    Center,
    Right,
}

/// Layout order of the titlebar children
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Order {
    #[default]
    Normal,
    /// Mirrored: controls on the left, icon on the right
    Inverted,
}

impl Order {
    pub fn css_class(&self) -> &'static str {
        match self {
            Order::Normal => "normal",
            Order::Inverted => "inverted",
        }
    }
}

/// Options of a titlebar
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TitlebarOptions {
    /// Base titlebar color
    pub background_color: Color,
    /// Overrides the computed hover/selection color of menu items
    #[serde(skip_serializing_if = "Option::is_none")]
    pub item_background_color: Option<Color>,
    /// App icon path (Windows/Linux only)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
    /// Root menu; no menubar is rendered without one
    #[serde(skip)]
    pub menu: Option<Menu>,
    pub menu_position: MenuPosition,
    pub minimizable: bool,
    pub maximizable: bool,
    pub closeable: bool,
    pub enable_mnemonics: bool,
    /// Close button hides the window instead of closing it
    pub hide_when_clicking_close: bool,
    /// Dim the titlebar while the window is unfocused
    pub unfocus_effect: bool,
    pub title_horizontal_alignment: TitleAlignment,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub order: Option<Order>,
    /// CSS overflow of the content container
    pub overflow: String,
    /// Drop shadow under the titlebar
    pub shadow: bool,
}

impl Default for TitlebarOptions {
    fn default() -> Self {
        Self {
            background_color: DEFAULT_BACKGROUND,
            item_background_color: None,
            icon: None,
            menu: None,
            menu_position: MenuPosition::Left,
            minimizable: true,
            maximizable: true,
            closeable: true,
            enable_mnemonics: true,
            hide_when_clicking_close: false,
            unfocus_effect: true,
            title_horizontal_alignment: TitleAlignment::Center,
            order: None,
            overflow: "auto".to_string(),
            shadow: false,
        }
    }
}

impl TitlebarOptions {
    /// Get the options file path
    pub fn config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("custom-titlebar")
            .join("titlebar.toml")
    }

    /// Load options from the default file, writing the defaults when it is missing
    pub fn load_or_default() -> Result<Self> {
        let config_path = Self::config_path();

        if config_path.exists() {
            info!("Loading titlebar options from: {:?}", config_path);
            match Self::load_from(&config_path) {
                Ok(options) => return Ok(options),
                Err(e) => {
                    warn!("Failed to parse titlebar options, using defaults: {}", e);
                    return Ok(Self::default());
                }
            }
        }

        let options = Self::default();
        options.save()?;
        Ok(options)
    }

    /// Save options to the default file
    pub fn save(&self) -> Result<()> {
        let config_path = Self::config_path();
        self.save_to(&config_path)?;
        info!("Titlebar options saved to: {:?}", config_path);
        Ok(())
    }

    pub fn load_from(path: &Path) -> TitlebarResult<Self> {
        let content = std::fs::read_to_string(path)?;
        let options: Self = toml::from_str(&content)?;
        options.validate()?;
        Ok(options)
    }

    /// Reject values the titlebar cannot render
    pub fn validate(&self) -> TitlebarResult<()> {
        const OVERFLOW: [&str; 5] = ["auto", "hidden", "scroll", "visible", "clip"];
        if !OVERFLOW.contains(&self.overflow.as_str()) {
            return Err(TitlebarError::Config(format!("unsupported overflow '{}'", self.overflow)));
        }
        if self.icon.as_deref() == Some("") {
            return Err(TitlebarError::Config("icon path is empty".to_string()));
        }
        Ok(())
    }

    pub fn save_to(&self, path: &Path) -> TitlebarResult<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    pub fn with_menu(mut self, menu: Menu) -> Self {
        self.menu = Some(menu);
        self
    }

    pub fn is_bottom_menu(&self) -> bool {
        self.menu_position == MenuPosition::Bottom
    }

    pub fn is_inverted(&self) -> bool {
        self.order == Some(Order::Inverted)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::menu::MenuItemDescriptor;
    use std::fs;

    #[test]
    fn defaults() {
        let options = TitlebarOptions::default();
        assert_eq!(options.background_color, Color::rgb(0x44, 0x44, 0x44));
        assert_eq!(options.menu_position, MenuPosition::Left);
        assert_eq!(options.title_horizontal_alignment, TitleAlignment::Center);
        assert!(options.minimizable && options.maximizable && options.closeable);
        assert!(options.enable_mnemonics && options.unfocus_effect);
        assert!(!options.hide_when_clicking_close && !options.shadow);
        assert_eq!(options.overflow, "auto");
        assert!(options.menu.is_none());
    }

    #[test]
    fn partial_toml_fills_defaults() {
        let options: TitlebarOptions = toml::from_str(
            r##"
background_color = "#2f3241"
item_background_color = "#121212"
menu_position = "bottom"
order = "inverted"
title_horizontal_alignment = "left"
"##,
        )
        .expect("parse");
        assert_eq!(options.background_color, Color::rgb(0x2f, 0x32, 0x41));
        assert_eq!(options.item_background_color, Some(Color::rgb(0x12, 0x12, 0x12)));
        assert!(options.is_bottom_menu());
        assert!(options.is_inverted());
        assert_eq!(options.title_horizontal_alignment, TitleAlignment::Left);
        assert!(options.closeable);
    }

    #[test]
    fn bad_color_is_an_error() {
        let err = toml::from_str::<TitlebarOptions>("background_color = \"blue\"").unwrap_err();
        assert!(err.to_string().contains("Invalid color"));
    }

    #[test]
    fn save_to_and_load_from() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("nested").join("titlebar.toml");
        let mut options = TitlebarOptions::default()
            .with_menu(Menu::new(vec![MenuItemDescriptor::normal("&&File")]));
        options.icon = Some("icon.png".to_string());
        options.shadow = true;
        options.save_to(&path).expect("save");

        let text = fs::read_to_string(&path).expect("read");
        assert!(text.contains("background_color = \"#444444\""));

        let loaded = TitlebarOptions::load_from(&path).expect("load");
        assert_eq!(loaded.icon.as_deref(), Some("icon.png"));
        assert!(loaded.shadow);
        assert!(loaded.menu.is_none());
    }

    #[test]
    fn load_from_missing_file_is_io_error() {
        let dir = tempfile::tempdir().expect("tempdir");
        let result = TitlebarOptions::load_from(&dir.path().join("missing.toml"));
        assert!(matches!(result, Err(TitlebarError::Io(_))));
    }

    #[test]
    fn load_from_rejects_unknown_overflow() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("titlebar.toml");
        fs::write(&path, "overflow = \"sideways\"\n").expect("write");
        let result = TitlebarOptions::load_from(&path);
        assert!(matches!(result, Err(TitlebarError::Config(_))));
    }

    #[test]
    fn config_path_ends_with_file_name() {
        let p = TitlebarOptions::config_path();
        let s = p.to_string_lossy();
        assert!(
            s.ends_with("custom-titlebar/titlebar.toml") || s.ends_with("custom-titlebar\\titlebar.toml"),
            "unexpected options path: {}",
            s
        );
    }
}
