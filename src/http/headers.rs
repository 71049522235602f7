//! Header-name normalization and cookie header parsing.

use indexmap::IndexMap;

use super::form::decode_component;

/// Prefix CGI-style transports put in front of request header variables.
pub const HEADER_PREFIX: &str = "HTTP_";

/// Normalizes a raw header name to `Title-Case-With-Hyphens`.
///
/// The transport prefix is stripped when present. `_` and `-` both count as
/// word separators; each word is lowercased and then capitalized.
///
/// ```
/// # use portico::http::headers::normalize_header_name;
/// assert_eq!(normalize_header_name("HTTP_USER_AGENT"), "User-Agent");
/// assert_eq!(normalize_header_name("x-forwarded-for"), "X-Forwarded-For");
/// ```
pub fn normalize_header_name(raw: &str) -> String {
    let name = raw.strip_prefix(HEADER_PREFIX).unwrap_or(raw);

    let mut out = String::with_capacity(name.len());
    let mut word_start = true;
    for c in name.chars() {
        if c == '_' || c == '-' || c == ' ' {
            out.push('-');
            word_start = true;
        } else if word_start {
            out.extend(c.to_uppercase());
            word_start = false;
        } else {
            out.extend(c.to_lowercase());
        }
    }
    out
}

/// Normalizes every name of a raw header mapping. Later duplicates win.
pub fn normalize_headers<I, K, V>(raw: I) -> IndexMap<String, String>
where
    I: IntoIterator<Item = (K, V)>,
    K: AsRef<str>,
    V: Into<String>,
{
    raw.into_iter()
        .map(|(k, v)| (normalize_header_name(k.as_ref()), v.into()))
        .collect()
}

/// Parses a `Cookie:` header value into an ordered name/value map.
///
/// Values are URL-decoded. When a name repeats, the first occurrence wins.
/// Names are kept verbatim: no `.`/space mangling and no bracket nesting.
pub fn parse_cookie_header(raw: &str) -> IndexMap<String, String> {
    let mut cookies = IndexMap::new();

    for pair in raw.split(';') {
        let pair = pair.trim();
        let (name, value) = pair.split_once('=').unwrap_or((pair, ""));
        let name = name.trim();
        if name.is_empty() {
            continue;
        }
        cookies
            .entry(name.to_string())
            .or_insert_with(|| decode_component(value.trim()));
    }

    cookies
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_prefix_and_title_cases() {
        assert_eq!(normalize_header_name("HTTP_ACCEPT"), "Accept");
        assert_eq!(normalize_header_name("HTTP_X_REQUESTED_WITH"), "X-Requested-With");
        assert_eq!(normalize_header_name("CONTENT_TYPE"), "Content-Type");
    }

    #[test]
    fn keeps_repeated_separators() {
        assert_eq!(normalize_header_name("HTTP_A__B"), "A--B");
    }

    #[test]
    fn prefix_is_case_sensitive() {
        assert_eq!(normalize_header_name("http_host"), "Http-Host");
    }

    #[test]
    fn cookies_decode_and_first_wins() {
        let cookies = parse_cookie_header("sid=abc; theme=dark%20mode; sid=zzz; ;flag");
        assert_eq!(cookies.get("sid").map(String::as_str), Some("abc"));
        assert_eq!(cookies.get("theme").map(String::as_str), Some("dark mode"));
        assert_eq!(cookies.get("flag").map(String::as_str), Some(""));
        assert_eq!(cookies.len(), 3);
    }

    #[test]
    fn cookie_names_are_not_mangled() {
        let cookies = parse_cookie_header("a.b=1; c d=2; e[x]=3");
        let names: Vec<&str> = cookies.keys().map(String::as_str).collect();
        assert_eq!(names, vec!["a.b", "c d", "e[x]"]);
    }
}
