//! Keybinding configuration for the TUI.

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use serde::Deserialize;

use crate::tui::event::Action;

/// Configuration for all keybindings.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct KeybindingConfig {
    pub quit: Vec<String>,
    pub move_up: Vec<String>,
    pub move_down: Vec<String>,
    pub next_page: Vec<String>,
    pub prev_page: Vec<String>,
    pub next_pane: Vec<String>,
    pub prev_pane: Vec<String>,
    pub select: Vec<String>,
    pub search: Vec<String>,
    pub switch_tab: Vec<String>,
    pub refresh: Vec<String>,
    pub open_in_browser: Vec<String>,
    pub toggle_maximize: Vec<String>,
    pub toggle_nsfw: Vec<String>,
}

fn keys(list: &[&str]) -> Vec<String> {
    list.iter().map(|k| k.to_string()).collect()
}

impl Default for KeybindingConfig {
    fn default() -> Self {
        Self {
            quit: keys(&["q", "Ctrl+c"]),
            move_up: keys(&["k", "Up"]),
            move_down: keys(&["j", "Down"]),
            next_page: keys(&["n", "PageDown"]),
            prev_page: keys(&["p", "PageUp"]),
            next_pane: keys(&["Tab"]),
            prev_pane: keys(&["BackTab", "Shift+Tab"]),
            select: keys(&["Enter"]),
            search: keys(&["/"]),
            switch_tab: keys(&["t"]),
            refresh: keys(&["R"]),
            open_in_browser: keys(&["o"]),
            toggle_maximize: keys(&["m"]),
            toggle_nsfw: keys(&["N"]),
        }
    }
}

impl KeybindingConfig {
    /// Get the action for a key event.
    pub fn get_action(&self, key: &KeyEvent) -> Action {
        let table: [(&[String], Action); 14] = [
            (self.quit.as_slice(), Action::Quit),
            (self.move_up.as_slice(), Action::MoveUp),
            (self.move_down.as_slice(), Action::MoveDown),
            (self.next_page.as_slice(), Action::NextPage),
            (self.prev_page.as_slice(), Action::PrevPage),
            (self.next_pane.as_slice(), Action::NextPane),
            (self.prev_pane.as_slice(), Action::PrevPane),
            (self.select.as_slice(), Action::Select),
            (self.search.as_slice(), Action::Search),
            (self.switch_tab.as_slice(), Action::SwitchTab),
            (self.refresh.as_slice(), Action::Refresh),
            (self.open_in_browser.as_slice(), Action::OpenInBrowser),
            (self.toggle_maximize.as_slice(), Action::ToggleMaximize),
            (self.toggle_nsfw.as_slice(), Action::ToggleNsfw),
        ];

        table
            .iter()
            .find(|(bindings, _)| matches_key(key, bindings))
            .map(|(_, action)| *action)
            .unwrap_or(Action::None)
    }
}

fn matches_key(key: &KeyEvent, bindings: &[String]) -> bool {
    bindings.iter().any(|binding| {
        parse_key_string(binding)
            .map(|parsed| parsed.matches(key))
            .unwrap_or(false)
    })
}

/// A parsed key binding with code and modifiers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyBinding {
    pub code: KeyCode,
    pub modifiers: KeyModifiers,
}

impl KeyBinding {
    /// Check if this binding matches a key event.
    pub fn matches(&self, key: &KeyEvent) -> bool {
        self.code == key.code
            && (self.modifiers == key.modifiers
                || self.modifiers == (key.modifiers & !KeyModifiers::SHIFT))
    }
}

/// Parse a key string into a KeyBinding.
///
/// Supported formats:
/// - Single characters: "a", "A", "1", "/"
/// - Special keys: "Enter", "Tab", "BackTab", "Backspace", "Delete", "Home", "End",
///   "PageUp", "PageDown", "Up", "Down", "Left", "Right", "Esc", "Space", "F1"-"F12"
/// - With modifiers: "Ctrl+c", "Shift+Tab", "Alt+Enter", "Ctrl+Shift+a"
pub fn parse_key_string(s: &str) -> Result<KeyBinding, String> {
    let s = s.trim();
    // A lone "+" is the plus key, not a separator.
    if s == "+" {
        return Ok(KeyBinding {
            code: KeyCode::Char('+'),
            modifiers: KeyModifiers::NONE,
        });
    }
    let parts: Vec<&str> = s.split('+').collect();

    let mut modifiers = KeyModifiers::NONE;
    let key_part = match parts.split_last() {
        Some((key, mods)) if !mods.is_empty() => {
            for part in mods {
                match part.to_lowercase().as_str() {
                    "ctrl" | "control" => modifiers |= KeyModifiers::CONTROL,
                    "shift" => modifiers |= KeyModifiers::SHIFT,
                    "alt" => modifiers |= KeyModifiers::ALT,
                    _ => return Err(format!("Unknown modifier: {}", part)),
                }
            }
            *key
        }
        _ => s,
    };

    let code = parse_key_code(key_part)?;

    Ok(KeyBinding { code, modifiers })
}

fn parse_key_code(s: &str) -> Result<KeyCode, String> {
    let mut chars = s.chars();
    if let (Some(c), None) = (chars.next(), chars.next()) {
        return Ok(KeyCode::Char(c));
    }

    match s.to_lowercase().as_str() {
        "enter" | "return" => Ok(KeyCode::Enter),
        "tab" => Ok(KeyCode::Tab),
        "backtab" => Ok(KeyCode::BackTab),
        "backspace" | "bs" => Ok(KeyCode::Backspace),
        "delete" | "del" => Ok(KeyCode::Delete),
        "home" => Ok(KeyCode::Home),
        "end" => Ok(KeyCode::End),
        "pageup" | "pgup" => Ok(KeyCode::PageUp),
        "pagedown" | "pgdn" => Ok(KeyCode::PageDown),
        "up" => Ok(KeyCode::Up),
        "down" => Ok(KeyCode::Down),
        "left" => Ok(KeyCode::Left),
        "right" => Ok(KeyCode::Right),
        "esc" | "escape" => Ok(KeyCode::Esc),
        "space" => Ok(KeyCode::Char(' ')),
        other => match other.strip_prefix('f').and_then(|n| n.parse::<u8>().ok()) {
            Some(n @ 1..=12) => Ok(KeyCode::F(n)),
            _ => Err(format!("Unknown key: {}", s)),
        },
    }
}
