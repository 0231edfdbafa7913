//! User-configured cycle order
//!
//! Persisted as catalog indices joined by `|`, e.g. `"2|3|0"`. Entries are
//! kept as written; an index outside the catalog is only clamped when the
//! cycler lands on it.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Separator between entries in the persisted order text
pub const SEPARATOR: char = '|';

/// Malformed persisted order text
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid order entry {token:?} at position {position}")]
pub struct OrderParseError {
    pub token: String,
    pub position: usize,
}

/// Ordered catalog indices the cycler steps through
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Order(Vec<i32>);

impl Order {
    pub fn new(entries: Vec<i32>) -> Self {
        Self(entries)
    }

    /// Parse persisted order text.
    ///
    /// Missing or blank text gives the identity order. Trailing separators are
    /// ignored; any other entry that is not an integer fails the whole parse.
    pub fn parse(raw: Option<&str>) -> Result<Self, OrderParseError> {
        let raw = raw
            .map(|raw| raw.trim().trim_end_matches(SEPARATOR))
            .unwrap_or_default();
        if raw.trim().is_empty() {
            return Ok(Self::default());
        }

        raw.split(SEPARATOR)
            .enumerate()
            .map(|(position, token)| {
                token.trim().parse::<i32>().map_err(|_| OrderParseError {
                    token: token.to_string(),
                    position,
                })
            })
            .collect::<Result<Vec<_>, _>>()
            .map(Self)
    }

    pub fn entries(&self) -> &[i32] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn get(&self, position: usize) -> Option<i32> {
        self.0.get(position).copied()
    }

    /// First position holding `catalog_index`
    pub fn position_of(&self, catalog_index: usize) -> Option<usize> {
        let wanted = i32::try_from(catalog_index).ok()?;
        self.0.iter().position(|&entry| entry == wanted)
    }
}

impl Default for Order {
    fn default() -> Self {
        Self(vec![0, 1, 2, 3])
    }
}

impl std::fmt::Display for Order {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for (i, entry) in self.0.iter().enumerate() {
            if i > 0 {
                write!(f, "{}", SEPARATOR)?;
            }
            write!(f, "{}", entry)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_and_blank_give_identity() {
        assert_eq!(Order::parse(None).unwrap(), Order::default());
        assert_eq!(Order::parse(Some("")).unwrap().entries(), &[0, 1, 2, 3]);
        assert_eq!(Order::parse(Some("   ")).unwrap(), Order::default());
    }

    #[test]
    fn test_parse_entries() {
        let order = Order::parse(Some("2|3|0|1")).unwrap();
        assert_eq!(order.entries(), &[2, 3, 0, 1]);

        let order = Order::parse(Some(" 3 | 1 ")).unwrap();
        assert_eq!(order.entries(), &[3, 1]);
    }

    #[test]
    fn test_out_of_range_entries_are_kept() {
        let order = Order::parse(Some("7|2")).unwrap();
        assert_eq!(order.entries(), &[7, 2]);
    }

    #[test]
    fn test_trailing_separator_ignored() {
        let order = Order::parse(Some("0|1|")).unwrap();
        assert_eq!(order.entries(), &[0, 1]);
        assert_eq!(Order::parse(Some("|")).unwrap(), Order::default());
    }

    #[test]
    fn test_malformed_token_rejected() {
        let err = Order::parse(Some("2,x,1")).unwrap_err();
        assert_eq!(err.token, "2,x,1");
        assert_eq!(err.position, 0);

        let err = Order::parse(Some("2|x|1")).unwrap_err();
        assert_eq!(err.token, "x");
        assert_eq!(err.position, 1);
    }

    #[test]
    fn test_interior_empty_token_rejected() {
        assert!(Order::parse(Some("0||1")).is_err());
    }

    #[test]
    fn test_position_of() {
        let order = Order::new(vec![2, 3, 0]);
        assert_eq!(order.position_of(3), Some(1));
        assert_eq!(order.position_of(1), None);
    }

    #[test]
    fn test_display_uses_separator() {
        assert_eq!(Order::new(vec![2, 0]).to_string(), "2|0");
    }
}
