//! `application/x-www-form-urlencoded` decoding.
//!
//! Used for both the query string and posted bodies. Keys may carry bracket
//! suffixes that build nested maps:
//!
//! ```text
//! a=1&b[x]=2&b[y]=3&c[]=4&c[]=5
//!
//! a => "1"
//! b => { x => "2", y => "3" }
//! c => { 0 => "4", 1 => "5" }
//! ```
//!
//! In the base name (before the first `[`) spaces and dots become `_`.
//! A `[` that is never closed is kept as part of the name, also turned into `_`.
//! Pairs nested deeper than [`MAX_NESTING`] levels are dropped.

use indexmap::IndexMap;
use serde::Serialize;
use url::form_urlencoded;

/// Deepest bracket path a key may carry; deeper pairs are skipped.
pub const MAX_NESTING: usize = 64;

/// Ordered map of decoded form fields.
pub type FormMap = IndexMap<String, FormValue>;

/// A decoded form field: either a plain string or a nested map.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum FormValue {
    Text(String),
    Map(FormMap),
}

impl FormValue {
    pub fn as_text(&self) -> Option<&str> {
        match self {
            FormValue::Text(s) => Some(s),
            FormValue::Map(_) => None,
        }
    }

    pub fn as_map(&self) -> Option<&FormMap> {
        match self {
            FormValue::Text(_) => None,
            FormValue::Map(m) => Some(m),
        }
    }

    /// Looks up a nested entry; `None` for text values.
    pub fn get(&self, key: &str) -> Option<&FormValue> {
        self.as_map().and_then(|m| m.get(key))
    }

    /// `true` for `Text("")`.
    pub fn is_empty_text(&self) -> bool {
        matches!(self, FormValue::Text(s) if s.is_empty())
    }
}

impl From<&str> for FormValue {
    fn from(s: &str) -> Self {
        FormValue::Text(s.to_string())
    }
}

impl From<String> for FormValue {
    fn from(s: String) -> Self {
        FormValue::Text(s)
    }
}

/// Decodes a raw query string or urlencoded body into a [`FormMap`].
///
/// A pair without `=` decodes to an empty string, exactly like `key=`.
/// Later occurrences of a key overwrite earlier ones in place.
///
/// ```
/// # use portico::http::form::{parse_query, FormValue};
/// let map = parse_query("q=rust+lang&tags[]=a&tags[]=b");
/// assert_eq!(map["q"], FormValue::from("rust lang"));
/// assert_eq!(map["tags"].get("1"), Some(&FormValue::from("b")));
/// ```
pub fn parse_query(raw: &str) -> FormMap {
    let mut map = FormMap::new();

    for (key, value) in form_urlencoded::parse(raw.as_bytes()) {
        let Some((base, path)) = split_key(&key) else {
            continue;
        };
        assign(&mut map, base, &path, value.into_owned());
    }

    map
}

/// Splits `a.b[x][]` into `("a_b", [Some("x"), None])`.
///
/// Returns `None` when the base name ends up empty or the path is deeper
/// than [`MAX_NESTING`].
fn split_key(raw: &str) -> Option<(String, Vec<Option<String>>)> {
    let raw = raw.trim_start_matches(' ');

    let Some(open) = raw.find('[') else {
        let base = sanitize_base(raw);
        return (!base.is_empty()).then_some((base, Vec::new()));
    };

    let head = &raw[..open];
    if head.is_empty() {
        return None;
    }

    let mut rest = &raw[open..];
    if !rest[1..].contains(']') {
        // never closed: the bracket is just part of the name
        let base = format!("{}_{}", sanitize_base(head), &rest[1..]);
        return Some((base, Vec::new()));
    }

    let mut path = Vec::new();
    while let Some(inner) = rest.strip_prefix('[') {
        let Some(close) = inner.find(']') else {
            break;
        };
        if path.len() == MAX_NESTING {
            return None;
        }
        let index = &inner[..close];
        path.push((!index.is_empty()).then(|| index.to_string()));
        rest = &inner[close + 1..];
    }

    Some((sanitize_base(head), path))
}

/// Percent-decodes a single component, treating `+` as a space.
pub(crate) fn decode_component(raw: &str) -> String {
    let escaped = raw.replace('&', "%26").replace('=', "%3D");
    form_urlencoded::parse(escaped.as_bytes())
        .next()
        .map(|(key, _)| key.into_owned())
        .unwrap_or_default()
}

fn sanitize_base(name: &str) -> String {
    name.chars()
        .map(|c| if c == ' ' || c == '.' { '_' } else { c })
        .collect()
}

fn assign(map: &mut FormMap, key: String, path: &[Option<String>], value: String) {
    let Some((first, rest)) = path.split_first() else {
        map.insert(key, FormValue::Text(value));
        return;
    };

    let slot = map
        .entry(key)
        .or_insert_with(|| FormValue::Map(FormMap::new()));
    if let FormValue::Text(_) = slot {
        *slot = FormValue::Map(FormMap::new());
    }
    if let FormValue::Map(inner) = slot {
        let next_key = match first {
            Some(k) => k.clone(),
            None => next_index(inner).to_string(),
        };
        assign(inner, next_key, rest, value);
    }
}

/// Next free integer key: one past the largest non-negative integer key.
fn next_index(map: &FormMap) -> u64 {
    map.keys()
        .filter(|k| k.as_str() == "0" || !k.starts_with('0'))
        .filter_map(|k| k.parse::<u64>().ok())
        .max()
        .map_or(0, |max| max + 1)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn split_plain_and_sanitized() {
        assert_eq!(split_key("a.b c"), Some(("a_b_c".into(), vec![])));
        assert_eq!(split_key("  lead"), Some(("lead".into(), vec![])));
        assert_eq!(split_key(""), None);
        assert_eq!(split_key("[x]"), None);
    }

    #[test]
    fn split_brackets() {
        assert_eq!(
            split_key("a.b[x.y][]"),
            Some(("a_b".into(), vec![Some("x.y".into()), None]))
        );
        // trailing garbage after the last index is dropped
        assert_eq!(
            split_key("a[x]junk[y]"),
            Some(("a".into(), vec![Some("x".into())]))
        );
    }

    #[test]
    fn split_unclosed_bracket() {
        assert_eq!(split_key("a[b"), Some(("a_b".into(), vec![])));
        assert_eq!(split_key("a.c[b.d"), Some(("a_c_b.d".into(), vec![])));
    }

    #[test]
    fn split_rejects_paths_past_nesting_limit() {
        let at_limit = format!("a{}", "[]".repeat(MAX_NESTING));
        assert_eq!(split_key(&at_limit).map(|(_, p)| p.len()), Some(MAX_NESTING));

        let past_limit = format!("a{}", "[]".repeat(MAX_NESTING + 1));
        assert_eq!(split_key(&past_limit), None);
    }

    #[test]
    fn deep_pairs_are_dropped_others_kept() {
        let query = format!("keep=1&deep{}=x&after=2", "[k]".repeat(10_000));
        let map = parse_query(&query);

        assert_eq!(map.keys().collect::<Vec<_>>(), vec!["keep", "after"]);
    }

    #[test]
    fn decode_single_component() {
        assert_eq!(decode_component("a%20b+c"), "a b c");
        assert_eq!(decode_component("x=y&z"), "x=y&z");
        assert_eq!(decode_component(""), "");
    }

    #[test]
    fn next_index_skips_non_numeric_keys() {
        let mut map = FormMap::new();
        assert_eq!(next_index(&map), 0);
        map.insert("name".into(), "x".into());
        map.insert("07".into(), "x".into());
        assert_eq!(next_index(&map), 0);
        map.insert("4".into(), "x".into());
        assert_eq!(next_index(&map), 5);
    }
}
