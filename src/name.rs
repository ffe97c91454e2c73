//! Packed 64-bit account/action/table identifiers.
//!
//! A name is up to 13 symbols drawn from the alphabet
//! `.12345abcdefghijklmnopqrstuvwxyz`. Symbols 0 through 11 occupy five
//! bits each, packed from the top of the word down; symbol 12 is squeezed
//! into the low four bits, so only the first sixteen alphabet entries can
//! appear there. Characters outside the alphabet pack as `.` (zero), and
//! symbols beyond the thirteenth are ignored, mirroring the packing rules
//! of the ledger this wire format belongs to.

use serde::{Deserialize, Deserializer, Serialize, Serializer};

const CHARMAP: &[u8; 32] = b".12345abcdefghijklmnopqrstuvwxyz";

fn char_to_symbol(c: u8) -> u64 {
    match c {
        b'a'..=b'z' => u64::from(c - b'a') + 6,
        b'1'..=b'5' => u64::from(c - b'1') + 1,
        _ => 0,
    }
}

/// Packs a textual name into its 64-bit form.
pub fn string_to_name(s: &str) -> u64 {
    let bytes = s.as_bytes();
    let mut value: u64 = 0;
    for (i, &c) in bytes.iter().take(12).enumerate() {
        value |= (char_to_symbol(c) & 0x1f) << (64 - 5 * (i + 1));
    }
    if let Some(&c) = bytes.get(12) {
        value |= char_to_symbol(c) & 0x0f;
    }
    value
}

/// Unpacks a 64-bit name into its textual form, trimming trailing dots.
///
/// The all-zero name unpacks to thirteen dots: with no non-dot symbol to
/// anchor the trim, the raw form is returned as is.
pub fn name_to_string(value: u64) -> String {
    let mut chars = [b'.'; 13];
    let mut tmp = value;
    for i in 0..=12 {
        let mask = if i == 0 { 0x0f } else { 0x1f };
        chars[12 - i] = CHARMAP[(tmp & mask) as usize];
        tmp >>= if i == 0 { 4 } else { 5 };
    }
    let s = std::str::from_utf8(&chars).unwrap();
    match s.rfind(|c| c != '.') {
        Some(last) => s[..=last].to_owned(),
        None => s.to_owned(),
    }
}

/// A name in its packed 64-bit form.
///
/// `Ord` follows the numeric value, which is how action and table names are
/// keyed on chain.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Name(u64);

impl Name {
    /// Wraps an already-packed value.
    pub const fn new(value: u64) -> Self {
        Name(value)
    }

    /// The packed 64-bit value.
    pub const fn value(self) -> u64 {
        self.0
    }
}

impl From<&str> for Name {
    fn from(s: &str) -> Self {
        Name(string_to_name(s))
    }
}

impl std::fmt::Display for Name {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&name_to_string(self.0))
    }
}

impl Serialize for Name {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&name_to_string(self.0))
    }
}

impl<'de> Deserialize<'de> for Name {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Ok(Name::from(s.as_str()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn packs_known_value() {
        assert_eq!(string_to_name("eosio.token"), 0x5530_EA03_36B1_1BA4);
        assert_eq!(name_to_string(0x5530_EA03_36B1_1BA4), "eosio.token");
    }

    #[test]
    fn trims_trailing_dots() {
        assert_eq!(name_to_string(string_to_name("eosio..")), "eosio");
        assert_eq!(name_to_string(string_to_name("a.b.c")), "a.b.c");
    }

    #[test]
    fn all_dots_survive() {
        assert_eq!(name_to_string(0), ".............");
    }

    #[test]
    fn thirteenth_symbol_uses_four_bits() {
        // 'j' is alphabet index 15, the last value the final slot can hold
        assert_eq!(name_to_string(string_to_name("aaaaaaaaaaaaj")), "aaaaaaaaaaaaj");
    }

    #[test]
    fn overlong_input_is_truncated() {
        assert_eq!(
            string_to_name("aaaaaaaaaaaajzzzz"),
            string_to_name("aaaaaaaaaaaaj")
        );
    }

    #[test]
    fn display_round_trip() {
        let n = Name::from("useraaaaaaab");
        assert_eq!(Name::from(n.to_string().as_str()), n);
    }
}
