//! Polish tax identification number (NIP).

use serde::{Deserialize, Serialize};

use crate::error::{DomainError, DomainResult};
use crate::value_object::ValueObject;

const WEIGHTS: [u32; 9] = [6, 5, 7, 2, 3, 4, 5, 6, 7];

/// Validated NIP, stored as 10 bare digits.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Nip(String);

impl ValueObject for Nip {}

/// Strip an optional `PL` prefix, dashes and spaces.
pub fn normalize(raw: &str) -> String {
    let trimmed = raw.trim();
    let without_prefix = match trimmed.get(..2) {
        Some(prefix) if prefix.eq_ignore_ascii_case("PL") => &trimmed[2..],
        _ => trimmed,
    };
    without_prefix
        .chars()
        .filter(|c| *c != '-' && !c.is_whitespace())
        .collect()
}

/// Weighted mod-11 checksum over the first nine digits must equal the tenth.
pub fn is_valid(raw: &str) -> bool {
    let digits = normalize(raw);
    if digits.len() != 10 || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return false;
    }
    let d: Vec<u32> = digits.bytes().map(|b| u32::from(b - b'0')).collect();
    let sum: u32 = WEIGHTS.iter().zip(&d).map(|(w, x)| w * x).sum();
    let checksum = sum % 11;
    checksum != 10 && checksum == d[9]
}

impl Nip {
    pub fn parse(raw: &str) -> DomainResult<Self> {
        if !is_valid(raw) {
            return Err(DomainError::validation("nip", "invalid NIP"));
        }
        Ok(Self(normalize(raw)))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl core::fmt::Display for Nip {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn checksum(first9: &[u32]) -> u32 {
        WEIGHTS.iter().zip(first9).map(|(w, x)| w * x).sum::<u32>() % 11
    }

    #[test]
    fn accepts_known_valid_numbers() {
        assert!(is_valid("5260250274"));
        assert!(is_valid("526-025-02-74"));
        assert!(is_valid("PL 526 025 02 74"));
        assert!(is_valid("pl5260250274"));
    }

    #[test]
    fn rejects_bad_checksum_length_and_letters() {
        assert!(!is_valid("5260250275"));
        assert!(!is_valid("526025027"));
        assert!(!is_valid("52602502741"));
        assert!(!is_valid("52602502a4"));
        assert!(!is_valid(""));
        assert!(!is_valid("DE5260250274"));
    }

    #[test]
    fn parse_normalizes() {
        let nip = Nip::parse("PL526-025-02-74").unwrap();
        assert_eq!(nip.as_str(), "5260250274");
        assert!(matches!(Nip::parse("123"), Err(DomainError::Validation(_))));
    }

    proptest! {
        #[test]
        fn checksum_rule_holds(digits in proptest::collection::vec(0u32..10, 10)) {
            let s: String = digits.iter().map(|d| char::from_digit(*d, 10).unwrap()).collect();
            let c = checksum(&digits[..9]);
            prop_assert_eq!(is_valid(&s), c != 10 && c == digits[9]);
        }

        #[test]
        fn non_digit_input_is_rejected(s in "[0-9]{0,9}[a-zA-Z][0-9]{0,9}") {
            prop_assert!(!is_valid(&s));
        }
    }
}
