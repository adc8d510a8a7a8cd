#![forbid(unsafe_code)]

//! Key tokens and the chord buffer.
//!
//! Every keystroke the dispatcher accepts becomes one [`KeyToken`]. Tokens
//! split the alphabet in two:
//!
//! - [`KeyToken::Char`]: an unmodified printable character. Only these take
//!   part in tier lookups and can extend a chord.
//! - [`KeyToken::Named`]: a named key (Delete, Enter, arrows) or any key held
//!   with Ctrl/Alt/Meta. These always terminate the chord they land in.
//!
//! A [`Sequence`] is the ordered list of tokens typed since the last commit,
//! kept alongside its spelling so table lookups never re-render the string.

use std::fmt;

use crate::event::{KeyCode, KeyEvent, Modifiers};

/// One keystroke as seen by the chord buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyToken {
    /// Unmodified printable character.
    Char(char),

    /// Named key or modified key; spelled via [`KeyEvent::key_name`].
    Named {
        /// The key code.
        code: KeyCode,
        /// Modifiers held with it.
        modifiers: Modifiers,
    },
}

impl KeyToken {
    /// Token for a named key with modifiers.
    #[must_use]
    pub const fn named(code: KeyCode, modifiers: Modifiers) -> Self {
        Self::Named { code, modifiers }
    }

    /// Token for the given key event.
    ///
    /// Shift is part of a character's case, so `Shift+m` is `Char('M')`.
    #[must_use]
    pub fn from_event(event: &KeyEvent) -> Self {
        let chord_modifiers = Modifiers::CTRL | Modifiers::ALT | Modifiers::SUPER;
        match event.code {
            KeyCode::Char(c) if !event.modifiers.intersects(chord_modifiers) => Self::Char(c),
            code => Self::Named {
                code,
                modifiers: event.modifiers,
            },
        }
    }

    /// Whether this token ends a chord no matter where it appears.
    #[must_use]
    pub const fn is_terminal(&self) -> bool {
        matches!(self, Self::Named { .. })
    }

    /// Parse a whole spelling as a single named or modified key.
    ///
    /// Accepts the spellings [`KeyEvent::key_name`] produces for named keys
    /// (`"Delete"`, `"ShiftDelete"`, `"F5"`) and modified characters
    /// (`"Ctrlm"`). Plain character runs such as `"mr"` return `None`.
    #[must_use]
    pub fn parse_named(spelling: &str) -> Option<Self> {
        const PREFIXES: [(&str, Modifiers); 4] = [
            ("Ctrl", Modifiers::CTRL),
            ("Alt", Modifiers::ALT),
            ("Meta", Modifiers::SUPER),
            ("Shift", Modifiers::SHIFT),
        ];

        let mut rest = spelling;
        let mut modifiers = Modifiers::NONE;
        for (prefix, modifier) in PREFIXES {
            if let Some(stripped) = rest.strip_prefix(prefix)
                && !stripped.is_empty()
            {
                rest = stripped;
                modifiers |= modifier;
            }
        }

        let mut chars = rest.chars();
        if let (Some(c), None) = (chars.next(), chars.next()) {
            let chord_modifiers = Modifiers::CTRL | Modifiers::ALT | Modifiers::SUPER;
            return modifiers
                .intersects(chord_modifiers)
                .then_some(Self::named(KeyCode::Char(c), modifiers));
        }

        KeyCode::from_name(rest).map(|code| Self::named(code, modifiers))
    }

    fn write_name(&self, out: &mut String) {
        match self {
            Self::Char(c) => out.push(*c),
            Self::Named { code, modifiers } => {
                let name = KeyEvent::new(*code).with_modifiers(*modifiers).key_name();
                out.push_str(&name);
            }
        }
    }
}

impl fmt::Display for KeyToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut name = String::new();
        self.write_name(&mut name);
        f.write_str(&name)
    }
}

impl From<char> for KeyToken {
    fn from(c: char) -> Self {
        Self::Char(c)
    }
}

/// Keys typed since the last commit or reset.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Sequence {
    keys: Vec<KeyToken>,
    spelling: String,
}

impl Sequence {
    /// Create an empty sequence.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            keys: Vec::new(),
            spelling: String::new(),
        }
    }

    /// Parse a command-table spelling back into tokens.
    ///
    /// A spelling naming one key (`"Delete"`, `"ShiftDelete"`) becomes a
    /// single named token; anything else is one character token per char.
    #[must_use]
    pub fn parse(spelling: &str) -> Self {
        match KeyToken::parse_named(spelling) {
            Some(token) => std::iter::once(token).collect(),
            None => spelling.chars().map(KeyToken::Char).collect(),
        }
    }

    /// Append a token.
    pub fn push(&mut self, key: KeyToken) {
        key.write_name(&mut self.spelling);
        self.keys.push(key);
    }

    /// Number of keystrokes in the sequence.
    #[must_use]
    pub fn len(&self) -> usize {
        self.keys.len()
    }

    /// Whether no keystrokes are buffered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    /// The most recently appended token.
    #[must_use]
    pub fn last(&self) -> Option<&KeyToken> {
        self.keys.last()
    }

    /// The buffered tokens in typing order.
    #[must_use]
    pub fn keys(&self) -> &[KeyToken] {
        &self.keys
    }

    /// Concatenated key names; the command table lookup key.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.spelling
    }

    /// Whether `spelling` names exactly these keys.
    ///
    /// Spellings alone are ambiguous across the two alphabets: typing `F`
    /// then `5` spells `"F5"`, which a table reads as the F5 key. The parsed
    /// spelling must split into named and character tokens the same way.
    #[must_use]
    pub fn is_spelled_by(&self, spelling: &str) -> bool {
        if self.spelling != spelling {
            return false;
        }
        let parsed = Self::parse(spelling);
        parsed.len() == self.len()
            && parsed
                .keys
                .iter()
                .zip(&self.keys)
                .all(|(a, b)| a.is_terminal() == b.is_terminal())
    }

    /// Empty the sequence, keeping its allocation.
    pub fn clear(&mut self) {
        self.keys.clear();
        self.spelling.clear();
    }

    /// Move the contents out, leaving the sequence empty.
    pub fn take(&mut self) -> Self {
        std::mem::take(self)
    }
}

impl fmt::Display for Sequence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.spelling)
    }
}

impl FromIterator<KeyToken> for Sequence {
    fn from_iter<I: IntoIterator<Item = KeyToken>>(iter: I) -> Self {
        let mut sequence = Self::new();
        for key in iter {
            sequence.push(key);
        }
        sequence
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_char_is_char_token() {
        let event = KeyEvent::new(KeyCode::Char('m'));
        assert_eq!(KeyToken::from_event(&event), KeyToken::Char('m'));
    }

    #[test]
    fn shifted_char_stays_char_token() {
        let event = KeyEvent::new(KeyCode::Char('M')).with_modifiers(Modifiers::SHIFT);
        assert_eq!(KeyToken::from_event(&event), KeyToken::Char('M'));
        assert!(!KeyToken::from_event(&event).is_terminal());
    }

    #[test]
    fn ctrl_char_is_named_token() {
        let event = KeyEvent::new(KeyCode::Char('m')).with_modifiers(Modifiers::CTRL);
        let token = KeyToken::from_event(&event);
        assert!(token.is_terminal());
        assert_eq!(token.to_string(), "Ctrlm");
    }

    #[test]
    fn named_token_spelling() {
        let token = KeyToken::named(KeyCode::Delete, Modifiers::SHIFT);
        assert_eq!(token.to_string(), "ShiftDelete");
        assert!(token.is_terminal());
    }

    #[test]
    fn sequence_spelling_tracks_pushes() {
        let mut seq = Sequence::new();
        assert!(seq.is_empty());
        seq.push('m'.into());
        seq.push('r'.into());
        assert_eq!(seq.as_str(), "mr");
        assert_eq!(seq.len(), 2);
        assert_eq!(seq.last(), Some(&KeyToken::Char('r')));
    }

    #[test]
    fn sequence_take_leaves_empty() {
        let mut seq: Sequence = ['.', 't'].into_iter().map(KeyToken::from).collect();
        let taken = seq.take();
        assert_eq!(taken.as_str(), ".t");
        assert!(seq.is_empty());
        assert_eq!(seq.as_str(), "");
    }

    #[test]
    fn parse_round_trips_named_keys() {
        let seq = Sequence::parse("ShiftDelete");
        assert_eq!(
            seq.keys(),
            &[KeyToken::named(KeyCode::Delete, Modifiers::SHIFT)]
        );
        assert_eq!(seq.as_str(), "ShiftDelete");

        let ctrl = Sequence::parse("Ctrlm");
        assert_eq!(ctrl.len(), 1);
        assert!(ctrl.keys()[0].is_terminal());
    }

    #[test]
    fn parse_splits_plain_chords() {
        let seq = Sequence::parse("mr");
        assert_eq!(seq.keys(), &[KeyToken::Char('m'), KeyToken::Char('r')]);

        let dot = Sequence::parse(".t");
        assert_eq!(dot.len(), 2);

        // A bare modifier name is not a key on its own.
        let shift = Sequence::parse("Shift");
        assert_eq!(shift.len(), 5);
        assert!(shift.keys().iter().all(|k| !k.is_terminal()));
    }

    #[test]
    fn spelled_by_respects_the_alphabet() {
        let typed: Sequence = ['F', '5'].into_iter().map(KeyToken::from).collect();
        assert_eq!(typed.as_str(), "F5");
        assert!(!typed.is_spelled_by("F5"));

        let key = Sequence::from_iter([KeyToken::named(KeyCode::F(5), Modifiers::NONE)]);
        assert!(key.is_spelled_by("F5"));
        assert!(!key.is_spelled_by("F6"));

        let chord: Sequence = ['m', 'r'].into_iter().map(KeyToken::from).collect();
        assert!(chord.is_spelled_by("mr"));

        // Shift is dropped from a modified character's spelling.
        let ctrl_shift = Sequence::from_iter([KeyToken::named(
            KeyCode::Char('m'),
            Modifiers::CTRL | Modifiers::SHIFT,
        )]);
        assert!(ctrl_shift.is_spelled_by("Ctrlm"));
    }

    #[test]
    fn sequence_with_named_key() {
        let mut seq = Sequence::new();
        seq.push(KeyToken::named(KeyCode::Delete, Modifiers::NONE));
        assert_eq!(seq.as_str(), "Delete");
        assert_eq!(seq.len(), 1);
    }
}
