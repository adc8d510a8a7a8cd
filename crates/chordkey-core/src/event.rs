#![forbid(unsafe_code)]

//! Canonical keystroke types consumed by the dispatcher.
//!
//! A [`KeyEvent`] is one physical keystroke as reported by the host UI: the
//! key code, held modifiers, press/repeat/release kind, the [`EventTarget`]
//! that had focus when it arrived, and a `default_prevented` flag the
//! dispatcher sets when it consumes the keystroke.
//!
//! # Design Notes
//!
//! - `KeyEventKind` defaults to `Press` when not available from the host
//! - `Modifiers` use bitflags for easy combination
//! - Key names follow the DOM `KeyboardEvent.key` spelling (`"Delete"`,
//!   `"ArrowUp"`, `"F5"`) so command tables read the same on every host

use bitflags::bitflags;

/// A keyboard event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyEvent {
    /// The key code that was pressed.
    pub code: KeyCode,

    /// Modifier keys held during the event.
    pub modifiers: Modifiers,

    /// The type of key event (press, repeat, or release).
    pub kind: KeyEventKind,

    /// The element that had focus when the key was pressed.
    pub target: EventTarget,

    default_prevented: bool,
}

impl KeyEvent {
    /// Create a new press event with no modifiers, targeting the document body.
    #[must_use]
    pub const fn new(code: KeyCode) -> Self {
        Self {
            code,
            modifiers: Modifiers::NONE,
            kind: KeyEventKind::Press,
            target: EventTarget::Body,
            default_prevented: false,
        }
    }

    /// Create a key event with modifiers.
    #[must_use]
    pub const fn with_modifiers(mut self, modifiers: Modifiers) -> Self {
        self.modifiers = modifiers;
        self
    }

    /// Create a key event with a specific kind.
    #[must_use]
    pub const fn with_kind(mut self, kind: KeyEventKind) -> Self {
        self.kind = kind;
        self
    }

    /// Create a key event delivered to a specific focus target.
    #[must_use]
    pub const fn with_target(mut self, target: EventTarget) -> Self {
        self.target = target;
        self
    }

    /// Check if this is a specific character key.
    #[must_use]
    pub fn is_char(&self, c: char) -> bool {
        matches!(self.code, KeyCode::Char(ch) if ch == c)
    }

    /// Check if Ctrl modifier is held.
    #[must_use]
    pub const fn ctrl(&self) -> bool {
        self.modifiers.contains(Modifiers::CTRL)
    }

    /// Check if Alt modifier is held.
    #[must_use]
    pub const fn alt(&self) -> bool {
        self.modifiers.contains(Modifiers::ALT)
    }

    /// Check if Shift modifier is held.
    #[must_use]
    pub const fn shift(&self) -> bool {
        self.modifiers.contains(Modifiers::SHIFT)
    }

    /// Check if Super/Meta/Cmd modifier is held.
    #[must_use]
    pub const fn super_key(&self) -> bool {
        self.modifiers.contains(Modifiers::SUPER)
    }

    /// Suppress the host's default handling of this keystroke.
    pub fn prevent_default(&mut self) {
        self.default_prevented = true;
    }

    /// Whether [`prevent_default`](Self::prevent_default) was called.
    #[must_use]
    pub const fn is_default_prevented(&self) -> bool {
        self.default_prevented
    }

    /// Logical key name including modifier prefixes.
    ///
    /// Printable characters spell as themselves (`"m"`, `"."`); Shift is
    /// already folded into the character. Named keys spell with their held
    /// modifiers concatenated in front, in Ctrl, Alt, Meta, Shift order:
    /// Shift+Delete is `"ShiftDelete"`, Ctrl+m is `"Ctrlm"`.
    #[must_use]
    pub fn key_name(&self) -> String {
        let mut name = String::new();
        if self.ctrl() {
            name.push_str("Ctrl");
        }
        if self.alt() {
            name.push_str("Alt");
        }
        if self.super_key() {
            name.push_str("Meta");
        }
        if self.shift() && !matches!(self.code, KeyCode::Char(_)) {
            name.push_str("Shift");
        }
        self.code.push_name(&mut name);
        name
    }

    /// Convert a crossterm key event delivered to `target`.
    ///
    /// Returns `None` for keys with no logical name here (modifier-only
    /// presses, lock keys, keypad begin).
    #[cfg(all(not(target_arch = "wasm32"), feature = "crossterm"))]
    #[must_use]
    pub fn from_crossterm(event: crossterm::event::KeyEvent, target: EventTarget) -> Option<Self> {
        use crossterm::event as cte;

        let code = match event.code {
            cte::KeyCode::Char(c) => KeyCode::Char(c),
            cte::KeyCode::Enter => KeyCode::Enter,
            cte::KeyCode::Esc => KeyCode::Escape,
            cte::KeyCode::Backspace => KeyCode::Backspace,
            cte::KeyCode::Tab => KeyCode::Tab,
            cte::KeyCode::BackTab => KeyCode::BackTab,
            cte::KeyCode::Delete => KeyCode::Delete,
            cte::KeyCode::Insert => KeyCode::Insert,
            cte::KeyCode::Home => KeyCode::Home,
            cte::KeyCode::End => KeyCode::End,
            cte::KeyCode::PageUp => KeyCode::PageUp,
            cte::KeyCode::PageDown => KeyCode::PageDown,
            cte::KeyCode::Up => KeyCode::Up,
            cte::KeyCode::Down => KeyCode::Down,
            cte::KeyCode::Left => KeyCode::Left,
            cte::KeyCode::Right => KeyCode::Right,
            cte::KeyCode::F(n) => KeyCode::F(n),
            cte::KeyCode::Null => KeyCode::Null,
            cte::KeyCode::Media(cte::MediaKeyCode::PlayPause) => KeyCode::MediaPlayPause,
            cte::KeyCode::Media(cte::MediaKeyCode::Stop) => KeyCode::MediaStop,
            cte::KeyCode::Media(cte::MediaKeyCode::TrackNext) => KeyCode::MediaNextTrack,
            cte::KeyCode::Media(cte::MediaKeyCode::TrackPrevious) => KeyCode::MediaPrevTrack,
            _ => return None,
        };

        let mut modifiers = Modifiers::NONE;
        if event.modifiers.contains(cte::KeyModifiers::SHIFT) {
            modifiers |= Modifiers::SHIFT;
        }
        if event.modifiers.contains(cte::KeyModifiers::ALT) {
            modifiers |= Modifiers::ALT;
        }
        if event.modifiers.contains(cte::KeyModifiers::CONTROL) {
            modifiers |= Modifiers::CTRL;
        }
        if event
            .modifiers
            .intersects(cte::KeyModifiers::SUPER | cte::KeyModifiers::META)
        {
            modifiers |= Modifiers::SUPER;
        }

        let kind = match event.kind {
            cte::KeyEventKind::Press => KeyEventKind::Press,
            cte::KeyEventKind::Repeat => KeyEventKind::Repeat,
            cte::KeyEventKind::Release => KeyEventKind::Release,
        };

        Some(
            Self::new(code)
                .with_modifiers(modifiers)
                .with_kind(kind)
                .with_target(target),
        )
    }
}

/// Key codes for keyboard events.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyCode {
    /// A regular character key.
    Char(char),

    /// Enter/Return key.
    Enter,

    /// Escape key.
    Escape,

    /// Backspace key.
    Backspace,

    /// Tab key.
    Tab,

    /// Shift+Tab (back-tab).
    BackTab,

    /// Delete key.
    Delete,

    /// Insert key.
    Insert,

    /// Home key.
    Home,

    /// End key.
    End,

    /// Page Up key.
    PageUp,

    /// Page Down key.
    PageDown,

    /// Up arrow key.
    Up,

    /// Down arrow key.
    Down,

    /// Left arrow key.
    Left,

    /// Right arrow key.
    Right,

    /// Function key (F1-F24).
    F(u8),

    /// Null character (Ctrl+Space or Ctrl+@).
    Null,

    /// Media key: Play/Pause.
    MediaPlayPause,

    /// Media key: Stop.
    MediaStop,

    /// Media key: Next track.
    MediaNextTrack,

    /// Media key: Previous track.
    MediaPrevTrack,
}

impl KeyCode {
    /// Whether this is a printable character rather than a named key.
    #[must_use]
    pub const fn is_char(&self) -> bool {
        matches!(self, Self::Char(_))
    }

    /// Parse a named-key spelling as produced by [`KeyEvent::key_name`].
    ///
    /// Only named keys are recognized; single characters return `None`.
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        let code = match name {
            "Enter" => Self::Enter,
            "Escape" => Self::Escape,
            "Backspace" => Self::Backspace,
            "Tab" => Self::Tab,
            "BackTab" => Self::BackTab,
            "Delete" => Self::Delete,
            "Insert" => Self::Insert,
            "Home" => Self::Home,
            "End" => Self::End,
            "PageUp" => Self::PageUp,
            "PageDown" => Self::PageDown,
            "ArrowUp" => Self::Up,
            "ArrowDown" => Self::Down,
            "ArrowLeft" => Self::Left,
            "ArrowRight" => Self::Right,
            "Null" => Self::Null,
            "MediaPlayPause" => Self::MediaPlayPause,
            "MediaStop" => Self::MediaStop,
            "MediaTrackNext" => Self::MediaNextTrack,
            "MediaTrackPrevious" => Self::MediaPrevTrack,
            other => {
                let n = other.strip_prefix('F')?.parse::<u8>().ok()?;
                if !(1..=24).contains(&n) {
                    return None;
                }
                Self::F(n)
            }
        };
        Some(code)
    }

    fn push_name(&self, out: &mut String) {
        match self {
            Self::Char(c) => out.push(*c),
            Self::F(n) => {
                out.push('F');
                out.push_str(&n.to_string());
            }
            other => out.push_str(other.static_name()),
        }
    }

    fn static_name(&self) -> &'static str {
        match self {
            Self::Enter => "Enter",
            Self::Escape => "Escape",
            Self::Backspace => "Backspace",
            Self::Tab => "Tab",
            Self::BackTab => "BackTab",
            Self::Delete => "Delete",
            Self::Insert => "Insert",
            Self::Home => "Home",
            Self::End => "End",
            Self::PageUp => "PageUp",
            Self::PageDown => "PageDown",
            Self::Up => "ArrowUp",
            Self::Down => "ArrowDown",
            Self::Left => "ArrowLeft",
            Self::Right => "ArrowRight",
            Self::Null => "Null",
            Self::MediaPlayPause => "MediaPlayPause",
            Self::MediaStop => "MediaStop",
            Self::MediaNextTrack => "MediaTrackNext",
            Self::MediaPrevTrack => "MediaTrackPrevious",
            Self::Char(_) | Self::F(_) => "",
        }
    }
}

/// The type of key event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum KeyEventKind {
    /// Key was pressed (default when not distinguishable).
    #[default]
    Press,

    /// Key is being held (repeat event).
    Repeat,

    /// Key was released.
    Release,
}

bitflags! {
    /// Modifier keys that can be held during a key event.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct Modifiers: u8 {
        /// No modifiers.
        const NONE  = 0b0000;
        /// Shift key.
        const SHIFT = 0b0001;
        /// Alt/Option key.
        const ALT   = 0b0010;
        /// Control key.
        const CTRL  = 0b0100;
        /// Super/Meta/Command key.
        const SUPER = 0b1000;
    }
}

impl Default for Modifiers {
    fn default() -> Self {
        Self::NONE
    }
}

/// The element that had keyboard focus when a key was pressed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum EventTarget {
    /// No particular element; the document itself.
    #[default]
    Body,

    /// A list of items (message list, folder list).
    List,

    /// A reading pane or detail view.
    Detail,

    /// Single-line text input.
    TextInput,

    /// Multi-line text area.
    TextArea,

    /// An element with content-editable focus (rich-text composer).
    ContentEditable,
}

impl EventTarget {
    /// Whether keystrokes on this target are text entry.
    #[must_use]
    pub const fn is_editable(&self) -> bool {
        matches!(
            self,
            Self::TextInput | Self::TextArea | Self::ContentEditable
        )
    }
}
