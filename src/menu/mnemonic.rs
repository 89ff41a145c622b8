//! Mnemonic markers in menu labels
//!
//! `&&X` marks `X` as the mnemonic of a label. Any other run of `n` ampersands
//! renders as `ceil(n / 2)` literal ampersands, so `&&` before a space or at the
//! end of the label is an escaped `&`. Only the first marker counts.

use std::fmt;

/// Virtual key code of a mnemonic (`A`-`Z`, `0`-`9`)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct KeyCode(pub u32);

impl KeyCode {
    pub fn from_char(c: char) -> Option<Self> {
        let upper = c.to_ascii_uppercase();
        upper.is_ascii_alphanumeric().then(|| KeyCode(upper as u32))
    }

    pub fn to_char(self) -> Option<char> {
        char::from_u32(self.0)
    }
}

impl fmt::Display for KeyCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.to_char() {
            Some(c) => write!(f, "{}", c),
            None => write!(f, "{:#x}", self.0),
        }
    }
}

/// Result of parsing a label
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct MnemonicLabel {
    /// Label with markers removed and escapes collapsed
    pub clean: String,
    /// HTML for the label element, mnemonic underlined when enabled
    pub markup: String,
    /// Marked character as written in the label
    pub mnemonic: Option<char>,
    pub key_code: Option<KeyCode>,
}

impl MnemonicLabel {
    /// Lowercase shortcut for `aria-keyshortcuts`
    pub fn shortcut(&self) -> Option<String> {
        self.mnemonic.map(|c| c.to_lowercase().collect())
    }
}

const UNDERLINE_OPEN: &str = "<u aria-hidden=\"true\">";
const UNDERLINE_CLOSE: &str = "</u>";

/// Parse `label`, resolving its mnemonic only when `enable_mnemonics` is set
pub fn parse_label(label: &str, enable_mnemonics: bool) -> MnemonicLabel {
    let chars: Vec<char> = label.chars().collect();
    let mut clean = String::with_capacity(label.len());
    let mut markup = String::with_capacity(label.len());
    let mut marker = None;

    let mut i = 0;
    while i < chars.len() {
        let c = chars[i];
        if c != '&' {
            clean.push(c);
            push_escaped(&mut markup, c);
            i += 1;
            continue;
        }

        let run = chars[i..].iter().take_while(|c| **c == '&').count();
        match chars.get(i + run) {
            Some(&x) if run == 2 && marker.is_none() && !x.is_whitespace() => {
                marker = Some(x);
                markup.push_str(UNDERLINE_OPEN);
                push_escaped(&mut markup, x);
                markup.push_str(UNDERLINE_CLOSE);
                i += run + 1;

                // "Open (&&O)" drops the whole parenthesized marker from the clean text
                let parenthesized =
                    i >= 4 && chars[i - 4] == '(' && chars.get(i) == Some(&')');
                if parenthesized {
                    clean.pop();
                    let trimmed = clean.trim_end().len();
                    clean.truncate(trimmed);
                    markup.push(')');
                    i += 1;
                } else {
                    clean.push(x);
                }
            }
            _ => {
                for _ in 0..(run + 1) / 2 {
                    clean.push('&');
                    markup.push_str("&amp;");
                }
                i += run;
            }
        }
    }

    let clean = clean.trim().to_string();
    match marker {
        Some(c) if enable_mnemonics => MnemonicLabel {
            clean,
            markup: markup.trim().to_string(),
            mnemonic: Some(c),
            key_code: KeyCode::from_char(c),
        },
        _ => MnemonicLabel {
            markup: escape_html(&clean),
            clean,
            mnemonic: None,
            key_code: None,
        },
    }
}

/// Label text with markers removed
pub fn clean_mnemonic(label: &str) -> String {
    parse_label(label, false).clean
}

/// Mnemonic key of a label, if it has a marker
pub fn extract_mnemonic(label: &str) -> Option<KeyCode> {
    parse_label(label, true).key_code
}

pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        push_escaped(&mut out, c);
    }
    out
}

fn push_escaped(out: &mut String, c: char) {
    match c {
        '&' => out.push_str("&amp;"),
        '<' => out.push_str("&lt;"),
        '>' => out.push_str("&gt;"),
        '"' => out.push_str("&quot;"),
        '\'' => out.push_str("&#39;"),
        _ => out.push(c),
    }
}
