//! Ordering of sequence names for report output.
//!
//! Names whose leading token (up to the first space) is a plain integer sort
//! numerically first, everything else sorts after them; ties fall back to the
//! full name. If any name cannot be keyed, the whole collection is sorted
//! lexicographically instead.

use std::cmp::Ordering;
use std::fmt;

/// Primary ordering key of a sequence name.
///
/// A numeric key holds the digits of the leading token without leading zeros,
/// so integers of any length compare by value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortKey<'a> {
    Numeric(&'a str),
    NonNumeric,
}

impl Ord for SortKey<'_> {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self, other) {
            (SortKey::Numeric(a), SortKey::Numeric(b)) => {
                a.len().cmp(&b.len()).then_with(|| a.cmp(b))
            }
            (SortKey::Numeric(_), SortKey::NonNumeric) => Ordering::Less,
            (SortKey::NonNumeric, SortKey::Numeric(_)) => Ordering::Greater,
            (SortKey::NonNumeric, SortKey::NonNumeric) => Ordering::Equal,
        }
    }
}

impl PartialOrd for SortKey<'_> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SortKeyError {
    Empty,
    /// Starts with a digit, but the leading token is not an integer (e.g. `1_random`)
    InvalidNumber(String),
}

impl fmt::Display for SortKeyError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SortKeyError::Empty => write!(f, "Empty sequence name"),
            SortKeyError::InvalidNumber(name) => {
                write!(f, "Sequence name '{}' has a non-integer numeric prefix", name)
            }
        }
    }
}

impl std::error::Error for SortKeyError {}

pub fn sort_key(name: &str) -> Result<SortKey<'_>, SortKeyError> {
    let first = name.chars().next().ok_or(SortKeyError::Empty)?;
    if !first.is_ascii_digit() {
        return Ok(SortKey::NonNumeric);
    }

    let prefix = name.split(' ').next().unwrap_or(name);
    if !prefix.bytes().all(|b| b.is_ascii_digit()) {
        return Err(SortKeyError::InvalidNumber(name.to_string()));
    }
    Ok(SortKey::Numeric(prefix.trim_start_matches('0')))
}

/// Sort names in place, numeric-aware when every name yields a key.
pub fn natural_sort<S: AsRef<str>>(names: &mut [S]) {
    let keys: Result<Vec<SortKey>, SortKeyError> =
        names.iter().map(|n| sort_key(n.as_ref())).collect();

    match keys {
        Ok(keys) => {
            let mut order: Vec<usize> = (0..names.len()).collect();
            order.sort_by(|&a, &b| {
                keys[a]
                    .cmp(&keys[b])
                    .then_with(|| names[a].as_ref().cmp(names[b].as_ref()))
            });
            apply_order(names, order);
        }
        Err(e) => {
            log::debug!("Falling back to lexicographic order: {}", e);
            names.sort_by(|a, b| a.as_ref().cmp(b.as_ref()));
        }
    }
}

// Rearrange `items` so that position i holds the element previously at `order[i]`
fn apply_order<T>(items: &mut [T], mut order: Vec<usize>) {
    for i in 0..items.len() {
        let mut current = i;
        while order[current] != i {
            let next = order[current];
            items.swap(current, next);
            order[current] = current;
            current = next;
        }
        order[current] = current;
    }
}

/// Sorted copy of the given names.
pub fn sorted_names<'a, I>(names: I) -> Vec<&'a str>
where
    I: IntoIterator<Item = &'a str>,
{
    let mut names: Vec<&str> = names.into_iter().collect();
    natural_sort(&mut names);
    names
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_numeric_before_names() {
        let mut names = vec!["10", "2", "1", "X"];
        natural_sort(&mut names);
        assert_eq!(names, vec!["1", "2", "10", "X"]);
    }

    #[test]
    fn test_grc_style_names() {
        let names = sorted_names(["MT", "Y", "22", "X", "3", "1", "HSCHR1_CTG1_UNLOCALIZED"]);
        assert_eq!(
            names,
            vec!["1", "3", "22", "HSCHR1_CTG1_UNLOCALIZED", "MT", "X", "Y"]
        );
    }

    #[test]
    fn test_space_separated_prefix() {
        let mut names = vec!["2 b".to_string(), "10 a".to_string(), "2 a".to_string()];
        natural_sort(&mut names);
        assert_eq!(names, vec!["2 a", "2 b", "10 a"]);
    }

    #[test]
    fn test_global_lexicographic_fallback() {
        // "1_random" cannot be keyed, so nothing is ordered numerically
        let mut names = vec!["2", "1_random", "10", "1", "X"];
        natural_sort(&mut names);
        assert_eq!(names, vec!["1", "10", "1_random", "2", "X"]);

        let mut with_empty = vec!["3", "", "20"];
        natural_sort(&mut with_empty);
        assert_eq!(with_empty, vec!["", "20", "3"]);
    }

    #[test]
    fn test_long_numeric_prefix() {
        let mut names = vec!["99999999999999999999999", "10", "2"];
        natural_sort(&mut names);
        assert_eq!(names, vec!["2", "10", "99999999999999999999999"]);

        // Leading zeros do not change the value; the full name breaks the tie
        let names = sorted_names(["10", "007", "7", "100000000000000000000 x", "X"]);
        assert_eq!(names, vec!["007", "7", "10", "100000000000000000000 x", "X"]);
    }

    #[test]
    fn test_apply_order() {
        let mut items = vec!['a', 'b', 'c', 'd'];
        apply_order(&mut items, vec![2, 0, 3, 1]);
        assert_eq!(items, vec!['c', 'a', 'd', 'b']);
    }

    #[test]
    fn test_sort_key() {
        assert_eq!(sort_key("12"), Ok(SortKey::Numeric("12")));
        assert_eq!(sort_key("7 extra"), Ok(SortKey::Numeric("7")));
        assert_eq!(sort_key("0042"), Ok(SortKey::Numeric("42")));
        assert_eq!(sort_key("chrUn"), Ok(SortKey::NonNumeric));
        assert_eq!(sort_key(""), Err(SortKeyError::Empty));
        assert!(sort_key("1_random").is_err());
        assert_eq!(
            sort_key("99999999999999999999999"),
            Ok(SortKey::Numeric("99999999999999999999999"))
        );
        assert!(SortKey::Numeric("9") < SortKey::Numeric("10"));
        assert!(SortKey::Numeric("99999999999999999999999") < SortKey::NonNumeric);
    }
}
