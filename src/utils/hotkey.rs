use regex::Regex;
use std::sync::OnceLock;

pub const INVALID_KEY_PLACEHOLDER: &str = "Invalid key, please retry";

/// A single keydown as seen by the hotkey field.
#[derive(Clone, Debug, PartialEq, Default)]
pub struct KeyPress {
    pub key: String,
    pub ctrl: bool,
    pub alt: bool,
    pub shift: bool,
}

impl KeyPress {
    pub fn new(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            ..Default::default()
        }
    }
}

#[cfg(test)]
impl KeyPress {
    pub fn ctrl(mut self) -> Self {
        self.ctrl = true;
        self
    }

    pub fn alt(mut self) -> Self {
        self.alt = true;
        self
    }

    pub fn shift(mut self) -> Self {
        self.shift = true;
        self
    }
}

/// Keyboard chord capture for the hotkey field.
///
/// `display` mirrors what the input shows, `committed` is the chord that
/// "save" will send, and stays empty until a modifier and a base key were
/// pressed together.
#[derive(Clone, Debug, PartialEq, Default)]
pub struct HotkeyCapture {
    pub display: String,
    pub placeholder: Option<String>,
    pub committed: String,
}

impl HotkeyCapture {
    /// Start from the chord currently stored in settings.
    pub fn showing(current: impl Into<String>) -> Self {
        Self {
            display: current.into(),
            placeholder: None,
            committed: String::new(),
        }
    }

    pub fn handle(&mut self, press: &KeyPress) {
        let mut parts: Vec<String> = Vec::new();
        if press.ctrl {
            parts.push("ctrl".to_string());
        }
        if press.alt {
            parts.push("alt".to_string());
        }
        if press.shift {
            parts.push("shift".to_string());
        }

        let key = press.key.to_lowercase();
        if is_base_key(&key) {
            parts.push(key);
        } else if !is_modifier_key(&key) {
            self.display.clear();
            self.placeholder = Some(INVALID_KEY_PLACEHOLDER.to_string());
            return;
        }

        let has_base = parts.iter().any(|p| p.chars().count() == 1);
        if parts.len() > 1 && has_base {
            self.committed = parts.join("+");
            self.display = self.committed.clone();
        } else {
            self.display = if parts.is_empty() {
                String::new()
            } else {
                format!("{}+", parts.join("+"))
            };
            self.committed.clear();
        }
    }
}

fn is_base_key(key: &str) -> bool {
    let mut chars = key.chars();
    matches!(
        (chars.next(), chars.next()),
        (Some(c), None) if c.is_ascii_lowercase() || c.is_ascii_digit()
    )
}

fn is_modifier_key(key: &str) -> bool {
    matches!(key, "control" | "alt" | "shift")
}

fn chord_regex() -> Option<&'static Regex> {
    static RE: OnceLock<Option<Regex>> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^(ctrl\+)?(alt\+)?(shift\+)?[a-z0-9]$").ok())
        .as_ref()
}

/// Whether `chord` is a well-formed hotkey: ordered modifiers, at least one, then one base key.
pub fn is_valid_chord(chord: &str) -> bool {
    chord_regex().is_some_and(|re| re.is_match(chord)) && chord.contains('+')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ctrl_a_commits_chord() {
        let mut capture = HotkeyCapture::default();
        capture.handle(&KeyPress::new("Control").ctrl());
        capture.handle(&KeyPress::new("a").ctrl());
        assert_eq!(capture.committed, "ctrl+a");
        assert_eq!(capture.display, "ctrl+a");
    }

    #[test]
    fn test_modifier_alone_is_partial() {
        let mut capture = HotkeyCapture::default();
        capture.handle(&KeyPress::new("Control").ctrl());
        assert_eq!(capture.display, "ctrl+");
        assert!(capture.committed.is_empty());
    }

    #[test]
    fn test_partial_press_clears_previous_commit() {
        let mut capture = HotkeyCapture::default();
        capture.handle(&KeyPress::new("a").ctrl());
        assert_eq!(capture.committed, "ctrl+a");
        capture.handle(&KeyPress::new("Shift").shift());
        assert_eq!(capture.display, "shift+");
        assert!(capture.committed.is_empty());
    }

    #[test]
    fn test_modifier_order_is_fixed() {
        let mut capture = HotkeyCapture::default();
        capture.handle(&KeyPress::new("A").shift().alt().ctrl());
        assert_eq!(capture.committed, "ctrl+alt+shift+a");
    }

    #[test]
    fn test_base_key_without_modifier_is_not_committed() {
        let mut capture = HotkeyCapture::default();
        capture.handle(&KeyPress::new("k"));
        assert_eq!(capture.display, "k+");
        assert!(capture.committed.is_empty());
    }

    #[test]
    fn test_invalid_key_shows_placeholder() {
        let mut capture = HotkeyCapture::showing("ctrl+shift+a");
        capture.handle(&KeyPress::new("F5").ctrl());
        assert!(capture.display.is_empty());
        assert_eq!(capture.placeholder.as_deref(), Some(INVALID_KEY_PLACEHOLDER));
    }

    #[test]
    fn test_chord_validation() {
        assert!(is_valid_chord("ctrl+shift+a"));
        assert!(is_valid_chord("alt+7"));
        assert!(!is_valid_chord("a"));
        assert!(!is_valid_chord("shift+ctrl+a"));
        assert!(!is_valid_chord("ctrl+"));
        assert!(!is_valid_chord("ctrl+f5"));
    }
}
