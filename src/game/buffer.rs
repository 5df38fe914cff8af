//! Answer input buffer
//!
//! Holds the digits typed for the current problem:
//! - At most 3 digits (every answer is <= 100)
//! - No leading zeros: a lone "0" is replaced by the next non-zero digit

/// Maximum number of digits in an answer
pub const MAX_DIGITS: usize = 3;

/// Digits entered for the current problem
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AnswerBuffer {
    digits: String,
}

impl AnswerBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a decimal digit. Returns false when the input was rejected.
    pub fn push(&mut self, digit: char) -> bool {
        if !digit.is_ascii_digit() || self.digits.len() >= MAX_DIGITS {
            return false;
        }
        if self.digits == "0" {
            if digit == '0' {
                return false;
            }
            self.digits.clear();
        }
        self.digits.push(digit);
        true
    }

    /// Remove the last digit, if any.
    pub fn pop(&mut self) -> Option<char> {
        self.digits.pop()
    }

    pub fn clear(&mut self) {
        self.digits.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.digits.is_empty()
    }

    pub fn as_str(&self) -> &str {
        &self.digits
    }

    /// Parsed value, `None` when empty.
    pub fn value(&self) -> Option<u32> {
        // Only ASCII digits are ever stored and at most 3 of them
        self.digits.parse().ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn typed(keys: &str) -> AnswerBuffer {
        let mut buffer = AnswerBuffer::new();
        for c in keys.chars() {
            buffer.push(c);
        }
        buffer
    }

    #[test]
    fn test_second_zero_rejected() {
        let mut buffer = typed("0");
        assert!(!buffer.push('0'));
        assert_eq!(buffer.as_str(), "0");
    }

    #[test]
    fn test_digit_replaces_lone_zero() {
        assert_eq!(typed("05").as_str(), "5");
        assert_eq!(typed("005").as_str(), "5");
    }

    #[test]
    fn test_zero_after_other_digits_allowed() {
        assert_eq!(typed("100").as_str(), "100");
        assert_eq!(typed("10").value(), Some(10));
    }

    #[test]
    fn test_fourth_digit_rejected() {
        let mut buffer = typed("123");
        assert!(!buffer.push('4'));
        assert_eq!(buffer.as_str(), "123");
    }

    #[test]
    fn test_non_digit_rejected() {
        let mut buffer = AnswerBuffer::new();
        assert!(!buffer.push('a'));
        assert!(!buffer.push('-'));
        assert!(buffer.is_empty());
    }

    #[test]
    fn test_pop_and_clear() {
        let mut buffer = typed("42");
        assert_eq!(buffer.pop(), Some('2'));
        assert_eq!(buffer.as_str(), "4");
        buffer.clear();
        assert!(buffer.is_empty());
        assert_eq!(buffer.pop(), None);
        assert_eq!(buffer.value(), None);
    }
}
