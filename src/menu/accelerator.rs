//! Accelerator display strings
//!
//! Accelerators arrive in the cross-platform form (`CmdOrCtrl+Shift+I`). For
//! display, modifier words that do not exist on the current platform are
//! dropped along with the `Or` connective. Only `+`-separated segments that
//! consist entirely of modifier words are rewritten; keys are left alone.

use crate::platform::Platform;

/// Modifier vocabulary, longest first where one word prefixes another
const MODIFIER_WORDS: [&str; 11] = [
    "command", "control", "option", "altgr", "super", "shift", "meta", "ctrl", "cmd", "alt", "or",
];

/// Normalize an accelerator for display on `platform`
pub fn parse_accelerator(accelerator: &str, platform: Platform) -> String {
    accelerator
        .split('+')
        .map(|segment| normalize_segment(segment, platform))
        .collect::<Vec<_>>()
        .join("+")
}

fn normalize_segment(segment: &str, platform: Platform) -> String {
    let Some(words) = split_modifier_words(segment) else {
        return segment.to_string();
    };
    words
        .into_iter()
        .filter(|word| keep_word(&word.to_ascii_lowercase(), platform))
        .collect()
}

fn keep_word(word: &str, platform: Platform) -> bool {
    match word {
        "or" => false,
        "cmd" | "command" => platform.is_macintosh(),
        "ctrl" | "control" => !platform.is_macintosh(),
        _ => true,
    }
}

/// Split `segment` into modifier words, or `None` if anything else is in it
fn split_modifier_words(segment: &str) -> Option<Vec<&str>> {
    if segment.is_empty() || !segment.is_ascii() {
        return None;
    }
    let lower = segment.to_ascii_lowercase();
    let mut words = Vec::new();
    let mut pos = 0;
    while pos < lower.len() {
        let word = MODIFIER_WORDS
            .iter()
            .find(|word| lower[pos..].starts_with(*word))?;
        words.push(&segment[pos..pos + word.len()]);
        pos += word.len();
    }
    Some(words)
}

/// Default accelerator implied by a menu role
pub fn role_accelerator(role: &str) -> Option<&'static str> {
    let accelerator = match role.to_ascii_lowercase().as_str() {
        "undo" => "CtrlOrCmd+Z",
        "redo" => "CtrlOrCmd+Y",
        "cut" => "CtrlOrCmd+X",
        "copy" => "CtrlOrCmd+C",
        "paste" => "CtrlOrCmd+V",
        "selectall" => "CtrlOrCmd+A",
        "minimize" => "CtrlOrCmd+M",
        "close" => "CtrlOrCmd+W",
        "reload" => "CtrlOrCmd+R",
        "forcereload" => "CtrlOrCmd+Shift+R",
        "toggledevtools" => "CtrlOrCmd+Shift+I",
        "togglefullscreen" => "F11",
        "resetzoom" => "CtrlOrCmd+0",
        "zoomin" => "CtrlOrCmd+Shift+=",
        "zoomout" => "CtrlOrCmd+-",
        _ => return None,
    };
    Some(accelerator)
}

/// Accelerator shown for an item: an explicit one wins over the role default
/// when the item has a label
pub fn item_accelerator<'a>(
    role: Option<&str>,
    label: &str,
    accelerator: Option<&'a str>,
) -> Option<&'a str> {
    match accelerator {
        Some(explicit) if !label.is_empty() => Some(explicit),
        _ => role.and_then(role_accelerator),
    }
}
