//! Abstract cleaning and tokenization.
//!
//! Crossref abstracts arrive as JATS-flavoured markup with arbitrary whitespace
//! and, frequently, a leading "Abstract" heading. [`clean`] turns them into a
//! lowercase, whitespace-normalized token string suitable for lexical or
//! embedding-based indexing:
//!
//! ```
//! use econrag::text::clean;
//!
//! assert_eq!(
//!   clean("<jats:p>Abstract:  We study\n\nprices.</jats:p>", true),
//!   ": we study prices ."
//! );
//! assert_eq!(clean("  hello  world  ", false), "hello world");
//! ```

use super::*;

/// The heading word optionally removed from the front of an abstract.
pub const LEADING_LABEL: &str = "abstract";

lazy_static! {
  /// Any `<...>` tag.
  static ref MARKUP: Regex = Regex::new(r"<[^>]+>").unwrap();
  /// Word runs (allowing internal `-`, `'` and `.`), or any single other non-space character.
  static ref TOKEN: Regex = Regex::new(r"\w+(?:[-'.]\w+)*|[^\w\s]").unwrap();
  /// A leading "Abstract" heading, with trailing separator, as it appears in display text.
  static ref DISPLAY_LABEL: Regex = Regex::new(r"^\s*(?:Abstract|ABSTRACT)\s*[:.]?\s*").unwrap();
}

/// Removes every `<...>` tag from `text`.
pub fn strip_markup(text: &str) -> String { MARKUP.replace_all(text, "").into_owned() }

/// Splits `text` into word and punctuation tokens.
///
/// Whitespace only separates tokens and never appears in one.
pub fn tokenize(text: &str) -> Vec<String> {
  TOKEN.find_iter(text).map(|m| m.as_str().to_string()).collect()
}

/// Cleans abstract text into a single-spaced lowercase token string.
///
/// Markup is stripped, the text lowercased and tokenized, and the tokens
/// re-joined with single spaces, collapsing newlines, tabs and runs of spaces.
/// With `strip_leading_label`, a first token equal to [`LEADING_LABEL`] is
/// dropped, and a first token merely starting with it loses that prefix.
pub fn clean(text: &str, strip_leading_label: bool) -> String {
  let mut tokens = tokenize(&strip_markup(text).to_lowercase());
  if tokens.is_empty() {
    return String::new();
  }

  if strip_leading_label {
    if tokens[0] == LEADING_LABEL {
      tokens.remove(0);
    } else if let Some(rest) = tokens[0].strip_prefix(LEADING_LABEL) {
      tokens[0] = rest.to_string();
    }
  }

  tokens.join(" ")
}

/// Cleans a dynamically typed value, which must be a JSON string.
///
/// # Errors
///
/// Returns [`EconragError::InvalidInput`] for anything other than a string,
/// including `null`.
pub fn clean_value(value: &Value, strip_leading_label: bool) -> Result<String> {
  match value {
    Value::String(text) => Ok(clean(text, strip_leading_label)),
    other => Err(EconragError::InvalidInput(format!("expected text, got {}", value_kind(other)))),
  }
}

/// Human-readable abstract: markup removed, trimmed, leading heading dropped.
///
/// Unlike [`clean`], case and inner whitespace are preserved.
pub fn strip_leading_label(text: &str) -> String {
  let stripped = strip_markup(text);
  DISPLAY_LABEL.replace(stripped.trim(), "").trim_end().to_string()
}

/// Name of a JSON value's type, for error messages.
fn value_kind(value: &Value) -> &'static str {
  match value {
    Value::Null => "null",
    Value::Bool(_) => "a boolean",
    Value::Number(_) => "a number",
    Value::String(_) => "a string",
    Value::Array(_) => "an array",
    Value::Object(_) => "an object",
  }
}

#[cfg(test)]
mod tests {
  use serde_json::json;

  use super::*;

  #[test]
  fn test_clean_collapses_whitespace() {
    assert_eq!(clean("  hello  world  ", false), "hello world");
    assert_eq!(clean("hello\nworld", false), "hello world");
    assert_eq!(clean("hello\tworld", false), "hello world");
    assert_eq!(clean("hello    world\n\n\n", false), "hello world");
    assert_eq!(clean("hello\n\n\nworld", false), "hello world");
  }

  #[test]
  fn test_clean_empty() {
    assert_eq!(clean("", false), "");
    assert_eq!(clean("   \n\t", true), "");
    assert_eq!(clean("<jats:p></jats:p>", true), "");
  }

  #[test]
  fn test_clean_keeps_compound_words() {
    assert_eq!(clean("hello-world", false), "hello-world");
    assert_eq!(clean("Rates rose 3.5 percent.", false), "rates rose 3.5 percent .");
  }

  #[test]
  fn test_clean_strips_markup_and_lowercases() {
    assert_eq!(
      clean("<jats:title>Abstract</jats:title><jats:p>We Study X.</jats:p>", false),
      "abstractwe study x ."
    );
    assert_eq!(clean("<p>Prices, <i>Wages</i></p>", false), "prices , wages");
  }

  #[test]
  fn test_clean_leading_label() {
    assert_eq!(clean("Abstract: we study X.", true), ": we study x .");
    assert_eq!(clean("Abstract we study X.", true), "we study x .");
    assert_eq!(
      clean("<jats:title>Abstract</jats:title><jats:p>We study X.</jats:p>", true),
      "we study x ."
    );
    assert_eq!(clean("We study abstract art.", true), "we study abstract art .");
    assert_eq!(clean("Abstract: we study X.", false), "abstract : we study x .");
  }

  #[test]
  fn test_clean_value_rejects_non_text() {
    assert_eq!(clean_value(&json!("Hello  World"), false).unwrap(), "hello world");
    assert!(matches!(clean_value(&Value::Null, false), Err(EconragError::InvalidInput(_))));
    assert!(matches!(clean_value(&json!(123), false), Err(EconragError::InvalidInput(_))));
  }

  #[test]
  fn test_strip_leading_label() {
    assert_eq!(strip_leading_label("<jats:p>Abstract: We study X.</jats:p>"), "We study X.");
    assert_eq!(strip_leading_label("  ABSTRACT  We study X. "), "We study X.");
    assert_eq!(strip_leading_label("We study X."), "We study X.");
  }
}
