//! Typed key input and the captured-combo set.
//!
//! Hosts forward raw key events; the engine classifies them into a
//! disposition. A small set of combos has its default behavior suppressed;
//! of those, only Enter carries a structural meaning today, and its
//! content-splitting algorithm is deliberately left to the host.

use smol_str::{format_smolstr, SmolStr};

/// One key event with its modifier state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyInput {
    /// Key name as reported by the host, e.g. `"Enter"`, `"o"`, `"I"`.
    pub key: SmolStr,
    pub ctrl: bool,
    pub shift: bool,
    pub alt: bool,
    pub meta: bool,
}

impl KeyInput {
    pub fn plain(key: impl Into<SmolStr>) -> Self {
        Self {
            key: key.into(),
            ctrl: false,
            shift: false,
            alt: false,
            meta: false,
        }
    }

    pub fn ctrl(mut self) -> Self {
        self.ctrl = true;
        self
    }

    pub fn shift(mut self) -> Self {
        self.shift = true;
        self
    }

    /// Lowercase composed form, modifiers first: `"ctrl+shift+i"`.
    pub fn combo(&self) -> SmolStr {
        let composed = format_smolstr!(
            "{}{}{}{}{}",
            if self.ctrl { "ctrl+" } else { "" },
            if self.shift { "shift+" } else { "" },
            if self.alt { "alt+" } else { "" },
            if self.meta { "meta+" } else { "" },
            self.key
        );
        composed.to_lowercase().into()
    }
}

/// Combos whose default host behavior is suppressed while editing.
pub const CAPTURED_COMBOS: [&str; 4] = ["ctrl+shift+i", "ctrl+o", "enter", "shift+enter"];

/// Disposition of a key event routed through the session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyCapture {
    /// Not ours; the host handles it normally.
    Pass,
    /// Suppress the default behavior; no structural action.
    Suppress,
    /// Suppress the default and split the line at the caret. The splitting
    /// algorithm is an extension point owned by the host.
    SplitLine,
}

/// Classify a key event against the captured set.
pub fn classify(input: &KeyInput) -> KeyCapture {
    let combo = input.combo();
    if !CAPTURED_COMBOS.contains(&combo.as_str()) {
        return KeyCapture::Pass;
    }
    match combo.as_str() {
        "enter" | "shift+enter" => KeyCapture::SplitLine,
        _ => KeyCapture::Suppress,
    }
}
