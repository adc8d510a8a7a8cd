#![forbid(unsafe_code)]

//! Disambiguation tiers: which keys may still grow into a longer chord.
//!
//! Tier *i* holds the keys that are valid, still-ambiguous prefixes when the
//! buffer is *i* keys long. After each keystroke the dispatcher asks
//! [`DisambiguationTiers::should_commit`]:
//!
//! | Buffer length | Last key | Decision |
//! |---------------|----------|----------|
//! | any | named / modified key | commit now |
//! | `i <= depth` | not in tier *i* | commit now |
//! | `i <= depth` | in tier *i* | wait for more input or timeout |
//! | `i > depth` | in final tier | commit now |
//! | `i > depth` | otherwise | wait for more input or timeout |
//!
//! An empty tier is meaningful: every key at that position commits. Tiers can
//! be written out as constants or derived from the chord spellings of a
//! command table.

use ahash::AHashSet;

use crate::sequence::{KeyToken, Sequence};

/// Ordered prefix sets plus the final (terminal) tier.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DisambiguationTiers {
    tiers: Vec<AHashSet<KeyToken>>,
    final_tier: AHashSet<KeyToken>,
}

impl DisambiguationTiers {
    /// No tiers: every key commits immediately as a single-key sequence.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Build tiers from per-position character sets.
    ///
    /// `from_chars(&[&['m', '.'], &[]])` makes `m` and `.` ambiguous as first
    /// keys and commits every second key.
    #[must_use]
    pub fn from_chars(tiers: &[&[char]]) -> Self {
        tiers
            .iter()
            .fold(Self::new(), |acc, keys| acc.with_tier(keys.iter().copied()))
    }

    /// Append the next tier.
    #[must_use]
    pub fn with_tier<K>(mut self, keys: impl IntoIterator<Item = K>) -> Self
    where
        K: Into<KeyToken>,
    {
        self.tiers.push(keys.into_iter().map(Into::into).collect());
        self
    }

    /// Set the final tier: keys that commit at once past the last tier.
    #[must_use]
    pub fn with_final<K>(mut self, keys: impl IntoIterator<Item = K>) -> Self
    where
        K: Into<KeyToken>,
    {
        self.final_tier = keys.into_iter().map(Into::into).collect();
        self
    }

    /// Derive the tightest tiers that keep every spelling reachable.
    ///
    /// Tier *i* receives the *i*-th key of every chord longer than *i*, so a
    /// key commits early exactly when no chord can continue through it. There
    /// is one tier per position of the longest chord; the last one is empty,
    /// so completing keys never wait for the timer.
    #[must_use]
    pub fn derive<'a>(spellings: impl IntoIterator<Item = &'a str>) -> Self {
        let mut tiers: Vec<AHashSet<KeyToken>> = Vec::new();
        for spelling in spellings {
            let sequence = Sequence::parse(spelling);
            let keys = sequence.keys();
            if tiers.len() < keys.len() {
                tiers.resize_with(keys.len(), AHashSet::new);
            }
            let prefix_len = keys.len().saturating_sub(1);
            for (tier, key) in tiers.iter_mut().zip(&keys[..prefix_len]) {
                tier.insert(*key);
            }
        }
        Self {
            tiers,
            final_tier: AHashSet::new(),
        }
    }

    /// Number of explicit tiers.
    #[must_use]
    pub fn depth(&self) -> usize {
        self.tiers.len()
    }

    /// Tier for a buffer of `len` keys (1-based), if defined.
    #[must_use]
    pub fn tier(&self, len: usize) -> Option<&AHashSet<KeyToken>> {
        len.checked_sub(1).and_then(|idx| self.tiers.get(idx))
    }

    /// The final tier.
    #[must_use]
    pub fn final_tier(&self) -> &AHashSet<KeyToken> {
        &self.final_tier
    }

    /// Whether the buffer can no longer grow and must commit now.
    ///
    /// An empty buffer never commits.
    #[must_use]
    pub fn should_commit(&self, sequence: &Sequence) -> bool {
        let Some(last) = sequence.last() else {
            return false;
        };
        if last.is_terminal() {
            return true;
        }
        match self.tier(sequence.len()) {
            Some(tier) => !tier.contains(last),
            None => self.final_tier.contains(last),
        }
    }

    /// Spellings these tiers can never produce as a complete buffer.
    ///
    /// A chord is unreachable when one of its non-final keys forces an early
    /// commit (named key, missing from its tier, or in the final tier past the
    /// last tier).
    #[must_use]
    pub fn unreachable_sequences<'a>(
        &self,
        spellings: impl IntoIterator<Item = &'a str>,
    ) -> Vec<String> {
        let mut unreachable: Vec<String> = spellings
            .into_iter()
            .filter(|spelling| !self.reaches(&Sequence::parse(spelling)))
            .map(str::to_owned)
            .collect();
        unreachable.sort();
        unreachable
    }

    fn reaches(&self, target: &Sequence) -> bool {
        let mut prefix = Sequence::new();
        let keys = target.keys();
        for key in &keys[..keys.len().saturating_sub(1)] {
            prefix.push(*key);
            if self.should_commit(&prefix) {
                return false;
            }
        }
        true
    }
}
