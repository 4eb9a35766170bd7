use regex::bytes::Regex;

use crate::client::Api;
use crate::common::{debug, Result};
use crate::Key;

/// Regular expression filter applied to key names.
///
/// Without an expression every key passes. An invalid expression is rejected
/// when the filter is built.
#[derive(Debug, Clone, Default)]
pub struct KeyFilter {
    regex: Option<Regex>,
    // keep keys that do not match.
    invert: bool,
}

impl KeyFilter {
    pub fn new(regex: Option<&str>, invert: bool) -> Result<Self> {
        let regex = match regex {
            Some(regex) if !regex.is_empty() => Some(Regex::new(regex)?),
            _ => None,
        };

        Ok(Self { regex, invert })
    }

    pub fn matches(&self, key: &[u8]) -> bool {
        match &self.regex {
            Some(regex) => regex.is_match(key) != self.invert,
            None => true,
        }
    }
}

/// Selector enumerates keys by store glob pattern, then narrows them with a [`KeyFilter`].
#[derive(Debug, Clone)]
pub struct Selector {
    pattern: String,
    filter: KeyFilter,
}

impl Selector {
    pub fn new(pattern: impl Into<String>, filter: KeyFilter) -> Self {
        Self {
            pattern: pattern.into(),
            filter,
        }
    }

    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    // Keys are returned in store order.
    pub async fn select<A: Api + ?Sized>(&self, api: &mut A) -> Result<Vec<Key>> {
        let keys = api.keys(&self.pattern).await?;
        let total = keys.len();

        let selected: Vec<Key> = keys
            .into_iter()
            .filter(|key| self.filter.matches(key))
            .collect();

        debug!(
            pattern = %self.pattern,
            total,
            selected = selected.len(),
            "Select keys"
        );

        Ok(selected)
    }
}

/// Select keys matching `pattern` and the optional `regex`.
pub async fn select_keys<A: Api + ?Sized>(
    api: &mut A,
    pattern: &str,
    regex: Option<&str>,
    invert: bool,
) -> Result<Vec<Key>> {
    let filter = KeyFilter::new(regex, invert)?;
    Selector::new(pattern, filter).select(api).await
}
