//! Text cleanup applied to scraped article text and model output.

use std::borrow::Cow;

use serde_json::Value;

/// U+00AD, invisible unless a line breaks at it.
pub const SOFT_HYPHEN: char = '\u{00AD}';

/// Removes soft hyphens from `s`, borrowing when there are none.
pub fn remove_soft_hyphens(s: &str) -> Cow<'_, str> {
    if s.contains(SOFT_HYPHEN) {
        Cow::Owned(s.replace(SOFT_HYPHEN, ""))
    } else {
        Cow::Borrowed(s)
    }
}

/// Removes soft hyphens from every string inside `value`.
///
/// Arrays and object values are walked recursively. Object keys and
/// non-string scalars are left as they are.
pub fn strip_soft_hyphens(value: Value) -> Value {
    match value {
        Value::String(s) => match remove_soft_hyphens(&s) {
            Cow::Borrowed(_) => Value::String(s),
            Cow::Owned(clean) => Value::String(clean),
        },
        Value::Array(items) => Value::Array(items.into_iter().map(strip_soft_hyphens).collect()),
        Value::Object(map) => Value::Object(
            map.into_iter()
                .map(|(k, v)| (k, strip_soft_hyphens(v)))
                .collect(),
        ),
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn removes_every_soft_hyphen() {
        assert_eq!(remove_soft_hyphens("stor\u{ad}tings\u{ad}valg"), "stortingsvalg");
    }

    #[test]
    fn clean_text_is_borrowed() {
        assert!(matches!(remove_soft_hyphens("valg"), Cow::Borrowed("valg")));
    }

    #[test]
    fn walks_nested_values() {
        let input = json!({
            "tit\u{ad}tel": "Regje\u{ad}ringen",
            "tema": ["Poli\u{ad}tikk", {"navn": "Oslo\u{ad}"}],
            "score": 0.5,
            "flag": true,
            "none": null
        });
        let out = strip_soft_hyphens(input);
        assert_eq!(
            out,
            json!({
                "tit\u{ad}tel": "Regjeringen",
                "tema": ["Politikk", {"navn": "Oslo"}],
                "score": 0.5,
                "flag": true,
                "none": null
            })
        );
    }
}
