//! FILENAME: core/dictionary/src/value.rs
//! PURPOSE: The atom stored in a case: a number or a fixed-width byte string.
//! CONTEXT: Equality, hashing and ordering are parameterized by the width of
//! the variable the value belongs to (0 = numeric, >0 = string of that many
//! bytes). Values also implement Eq/Hash/Ord directly so they can be used as
//! interning keys; those impls treat all NaNs as equal, like OrderedFloat.

use rustc_hash::FxHasher;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::hash::{Hash, Hasher};

/// The system-missing numeric value.
pub const SYSMIS: f64 = -f64::MAX;

/// A datum held by a case for one variable.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Value {
    Number(f64),
    String(Vec<u8>),
}

impl Value {
    /// The system-missing value.
    pub const fn sysmis() -> Self {
        Value::Number(SYSMIS)
    }

    /// Creates a string value of exactly `width` bytes, padding with spaces or
    /// truncating as needed.
    pub fn string(s: &str, width: usize) -> Self {
        let mut bytes = s.as_bytes().to_vec();
        bytes.resize(width, b' ');
        Value::String(bytes)
    }

    /// Creates an appropriate "empty" value for a variable of `width`:
    /// system-missing for numeric, all spaces for string.
    pub fn empty(width: usize) -> Self {
        if width == 0 {
            Value::sysmis()
        } else {
            Value::String(vec![b' '; width])
        }
    }

    pub fn is_sysmis(&self) -> bool {
        matches!(self, Value::Number(x) if *x == SYSMIS)
    }

    pub fn as_number(&self) -> Option<f64> {
        match self {
            Value::Number(x) => Some(*x),
            Value::String(_) => None,
        }
    }

    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            Value::Number(_) => None,
            Value::String(s) => Some(s),
        }
    }

    /// Semantic width of this value: 0 for numbers, byte length for strings.
    pub fn width(&self) -> usize {
        match self {
            Value::Number(_) => 0,
            Value::String(s) => s.len(),
        }
    }

    /// Returns the string contents with trailing padding removed.
    pub fn trimmed_str(&self) -> Option<String> {
        self.as_bytes().map(|b| {
            let end = b.iter().rposition(|&c| c != b' ').map_or(0, |i| i + 1);
            String::from_utf8_lossy(&b[..end]).into_owned()
        })
    }

    /// Tests equality of two values of the given `width`.
    pub fn equal(&self, other: &Value, width: usize) -> bool {
        self.compare_3way(other, width) == Ordering::Equal
    }

    /// Three-way comparison of two values of the given `width`.
    /// Strings compare as if padded with spaces to `width`.
    pub fn compare_3way(&self, other: &Value, width: usize) -> Ordering {
        match (self, other) {
            (Value::Number(a), Value::Number(b)) => compare_numbers(*a, *b),
            (Value::String(a), Value::String(b)) => {
                let width = if width == 0 { a.len().max(b.len()) } else { width };
                for i in 0..width {
                    let ca = a.get(i).copied().unwrap_or(b' ');
                    let cb = b.get(i).copied().unwrap_or(b' ');
                    match ca.cmp(&cb) {
                        Ordering::Equal => continue,
                        other => return other,
                    }
                }
                Ordering::Equal
            }
            (Value::Number(_), Value::String(_)) => Ordering::Less,
            (Value::String(_), Value::Number(_)) => Ordering::Greater,
        }
    }

    /// Hashes this value of the given `width`, combining it with `seed`.
    pub fn hash_with(&self, width: usize, seed: u64) -> u64 {
        let mut hasher = FxHasher::default();
        seed.hash(&mut hasher);
        match self {
            Value::Number(x) => number_bits(*x).hash(&mut hasher),
            Value::String(s) => {
                let width = if width == 0 { s.len() } else { width };
                for i in 0..width {
                    s.get(i).copied().unwrap_or(b' ').hash(&mut hasher);
                }
            }
        }
        hasher.finish()
    }
}

fn compare_numbers(a: f64, b: f64) -> Ordering {
    match a.partial_cmp(&b) {
        Some(ordering) => ordering,
        // NaNs sort after every number and equal to each other
        None => match (a.is_nan(), b.is_nan()) {
            (true, true) => Ordering::Equal,
            (true, false) => Ordering::Greater,
            _ => Ordering::Less,
        },
    }
}

fn number_bits(x: f64) -> u64 {
    if x.is_nan() {
        u64::MAX
    } else if x == 0.0 {
        // +0 and -0 compare equal so they must hash equal
        0
    } else {
        x.to_bits()
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        self.compare_3way(other, 0) == Ordering::Equal
    }
}

impl Eq for Value {}

impl PartialOrd for Value {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Value {
    fn cmp(&self, other: &Self) -> Ordering {
        self.compare_3way(other, 0)
    }
}

impl Hash for Value {
    fn hash<H: Hasher>(&self, state: &mut H) {
        match self {
            Value::Number(x) => {
                0u8.hash(state);
                number_bits(*x).hash(state);
            }
            Value::String(s) => {
                1u8.hash(state);
                let end = s.iter().rposition(|&c| c != b' ').map_or(0, |i| i + 1);
                s[..end].hash(state);
            }
        }
    }
}

impl From<f64> for Value {
    fn from(x: f64) -> Self {
        Value::Number(x)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_string_padding() {
        let v = Value::string("ab", 4);
        assert_eq!(v.as_bytes(), Some(&b"ab  "[..]));
        assert_eq!(v.width(), 4);
        assert_eq!(v.trimmed_str().as_deref(), Some("ab"));

        let truncated = Value::string("abcdef", 3);
        assert_eq!(truncated.as_bytes(), Some(&b"abc"[..]));
    }

    #[test]
    fn test_compare_numbers() {
        let a = Value::Number(1.0);
        let b = Value::Number(2.0);
        assert_eq!(a.compare_3way(&b, 0), Ordering::Less);
        assert_eq!(b.compare_3way(&a, 0), Ordering::Greater);
        assert!(a.equal(&Value::Number(1.0), 0));
        assert!(Value::sysmis() < a);
    }

    #[test]
    fn test_compare_strings_with_padding() {
        let a = Value::String(b"ab".to_vec());
        let b = Value::String(b"ab  ".to_vec());
        assert!(a.equal(&b, 4));
        assert_eq!(a, b);
        assert_eq!(a.hash_with(4, 7), b.hash_with(4, 7));
        assert_eq!(
            Value::string("abc", 3).compare_3way(&Value::string("abd", 3), 3),
            Ordering::Less
        );
    }

    #[test]
    fn test_hash_is_seeded() {
        let v = Value::Number(3.0);
        assert_ne!(v.hash_with(0, 1), v.hash_with(0, 2));
        assert_eq!(Value::Number(0.0).hash_with(0, 0), Value::Number(-0.0).hash_with(0, 0));
    }

    #[test]
    fn test_nan_equality() {
        let a = Value::Number(f64::NAN);
        assert_eq!(a, Value::Number(f64::NAN));
        assert!(Value::Number(1.0e300) < a);
    }
}
