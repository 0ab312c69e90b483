use std::fmt;

use crate::event::codes;

/// The modifier bits that are reported, in the order they are printed.
static MODIFIERS: [(u64, &str); 8] = [
    (codes::FLAG_MASK_SHIFT, "Shift"),
    (codes::FLAG_MASK_CONTROL, "Ctrl"),
    (codes::FLAG_MASK_ALTERNATE, "Alt"),
    (codes::FLAG_MASK_COMMAND, "Cmd"),
    (codes::FLAG_MASK_ALPHA_SHIFT, "CapsLock"),
    (codes::FLAG_MASK_HELP, "Help"),
    (codes::FLAG_MASK_SECONDARY_FN, "Fn"),
    (codes::FLAG_MASK_NUMERIC_PAD, "NumPad"),
];

/// The set of modifiers held during an event.
///
/// Only the eight known modifier bits are kept; any other bit of the flag mask (device-dependent
/// bits, the non-coalesced bit, ...) is ignored.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ModifierSet(u64);

impl ModifierSet {
    pub fn from_flags(flags: u64) -> Self {
        let known = MODIFIERS.iter().fold(0u64, |acc, (mask, _)| acc | mask);

        Self(flags & known)
    }

    pub fn is_empty(&self) -> bool {
        self.0 == 0
    }

    pub fn contains(&self, mask: u64) -> bool {
        self.0 & mask == mask
    }

    /// The names of the modifiers in the set, in canonical order.
    pub fn names(&self) -> impl Iterator<Item = &'static str> + '_ {
        MODIFIERS
            .iter()
            .filter(move |(mask, _)| self.0 & mask != 0)
            .map(|(_, name)| *name)
    }
}

impl fmt::Display for ModifierSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_empty() {
            return f.write_str("None");
        }

        for (i, name) in self.names().enumerate() {
            if i > 0 {
                f.write_str("+")?;
            }
            f.write_str(name)?;
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_set_renders_none() {
        assert_eq!(ModifierSet::from_flags(0).to_string(), "None");
    }

    #[test]
    fn unknown_bits_are_ignored() {
        // 0x100 is a device-dependent bit, 0x2000_0000 the non-coalesced bit.
        let set = ModifierSet::from_flags(0x100 | 0x2000_0000);

        assert!(set.is_empty());
        assert_eq!(set.to_string(), "None");
    }

    #[test]
    fn order_is_canonical() {
        let set = ModifierSet::from_flags(codes::FLAG_MASK_COMMAND | codes::FLAG_MASK_SHIFT);

        assert_eq!(set.to_string(), "Shift+Cmd");
    }

    #[test]
    fn every_modifier() {
        let all = MODIFIERS.iter().fold(0u64, |acc, (mask, _)| acc | mask);

        assert_eq!(
            ModifierSet::from_flags(all).to_string(),
            "Shift+Ctrl+Alt+Cmd+CapsLock+Help+Fn+NumPad"
        );
    }

    #[test]
    fn contains_single_modifier() {
        let set = ModifierSet::from_flags(codes::FLAG_MASK_CONTROL | codes::FLAG_MASK_NUMERIC_PAD);

        assert!(set.contains(codes::FLAG_MASK_CONTROL));
        assert!(!set.contains(codes::FLAG_MASK_SHIFT));
        assert_eq!(set.names().collect::<Vec<_>>(), ["Ctrl", "NumPad"]);
    }
}
