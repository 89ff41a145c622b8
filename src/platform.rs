//! Platform detection and the layout constants that depend on it

/// Titlebar height when the menubar wraps below the title
pub const BOTTOM_TITLEBAR_HEIGHT: &str = "60px";
/// Titlebar height on Windows and Linux
pub const TOP_TITLEBAR_HEIGHT_WIN: &str = "30px";
/// Titlebar height on macOS 11 (Big Sur) and later
pub const TOP_TITLEBAR_HEIGHT_MAC: &str = "28px";
/// Titlebar height on macOS before Big Sur
pub const TOP_TITLEBAR_HEIGHT_MAC_LEGACY: &str = "22px";

/// The desktop platform the titlebar is rendered for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Platform {
    Windows,
    Linux,
    Macintosh { big_sur_or_later: bool },
}

impl Platform {
    /// Platform of the running binary
    pub const fn current() -> Self {
        if cfg!(target_os = "macos") {
            Platform::Macintosh {
                big_sur_or_later: true,
            }
        } else if cfg!(target_os = "windows") {
            Platform::Windows
        } else {
            Platform::Linux
        }
    }

    pub fn is_macintosh(&self) -> bool {
        matches!(self, Platform::Macintosh { .. })
    }

    /// Class added to the titlebar root
    pub fn css_class(&self) -> &'static str {
        match self {
            Platform::Windows => "cet-windows",
            Platform::Linux => "cet-linux",
            Platform::Macintosh { .. } => "cet-mac",
        }
    }

    /// Height of the titlebar when the menubar sits next to the title
    pub fn top_titlebar_height(&self) -> &'static str {
        match self {
            Platform::Windows | Platform::Linux => TOP_TITLEBAR_HEIGHT_WIN,
            Platform::Macintosh {
                big_sur_or_later: true,
            } => TOP_TITLEBAR_HEIGHT_MAC,
            Platform::Macintosh {
                big_sur_or_later: false,
            } => TOP_TITLEBAR_HEIGHT_MAC_LEGACY,
        }
    }
}

impl Default for Platform {
    fn default() -> Self {
        Self::current()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn top_height_depends_on_platform() {
        assert_eq!(Platform::Windows.top_titlebar_height(), "30px");
        assert_eq!(Platform::Linux.top_titlebar_height(), "30px");
        assert_eq!(
            Platform::Macintosh {
                big_sur_or_later: true
            }
            .top_titlebar_height(),
            "28px"
        );
        assert_eq!(
            Platform::Macintosh {
                big_sur_or_later: false
            }
            .top_titlebar_height(),
            "22px"
        );
    }

    #[test]
    fn css_class_per_platform() {
        assert_eq!(Platform::Windows.css_class(), "cet-windows");
        assert_eq!(Platform::Linux.css_class(), "cet-linux");
        assert!(Platform::Macintosh {
            big_sur_or_later: false
        }
        .is_macintosh());
    }
}
