//! Argument-body decoding per transform kind.
//!
//! Body grammars:
//!   - plain string (positional)
//!   - `key=value` lines (split on the first `=` only)
//!   - positional first line followed by `key=value` lines

use crate::log_info;

/// Ordered string-to-string mapping with unique keys.
///
/// Insertion order is preserved; inserting an existing key replaces its
/// value in place (last occurrence of a duplicate wins).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ArgumentSet {
    pairs: Vec<(String, String)>,
}

impl ArgumentSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        let key = key.into();
        let value = value.into();
        if let Some(slot) = self.pairs.iter_mut().find(|(k, _)| *k == key) {
            slot.1 = value;
        } else {
            self.pairs.push((key, value));
        }
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.pairs
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.pairs.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

/// Decode `key=value` body lines into an `ArgumentSet`.
///
/// Each line is split on the first `=`; key and value are trimmed. Lines
/// without `=` are logged and skipped, never a failure.
pub fn decode_keywords(body: &str) -> ArgumentSet {
    let mut args = ArgumentSet::new();
    for line in body.split('\n') {
        match line.split_once('=') {
            Some((k, v)) => args.insert(k.trim(), v.trim()),
            None => log_info!("No = in {line}, not processing as arg"),
        }
    }
    args
}

/// Decode a query-args body: the first line is the positional `query`
/// value, remaining lines are decoded as keyword arguments.
///
/// The positional value is carried under the `query` key; a later
/// `query=...` line overrides it (last occurrence wins).
pub fn decode_query_args(body: &str) -> ArgumentSet {
    let mut args = ArgumentSet::new();
    let (first, rest) = match body.split_once('\n') {
        Some((f, r)) => (f, Some(r)),
        None => (body, None),
    };
    args.insert("query", first);
    if let Some(rest) = rest {
        for line in rest.split('\n') {
            match line.split_once('=') {
                Some((k, v)) => args.insert(k.trim(), v.trim()),
                None => log_info!("No = in {line}, not processing as arg"),
            }
        }
    }
    args
}

/// Strip literal single quotes from a body. Guards `iris_enrich` against
/// users pasting quoted, comma-separated domain lists.
pub fn strip_single_quotes(body: &str) -> String {
    body.replace('\'', "")
}
