//! Purpose: Provide the internal runtime JSON decode entrypoints.
//! Exports: `from_str`, `ParseFailureCategory`, `categorize_error`, `categorize_message`, `hint_for_error`.
//! Role: Parser boundary that centralizes simd-json usage details.
//! Invariants: Decoding uses simd-json; input buffers are copied once for its mutable-slice API.
//! Invariants: Hints name a category and a context label, never the offending input bytes.
//! Notes: Error mapping to domain errors is done by callsites so context stays explicit.

use serde::de::DeserializeOwned;

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub(crate) enum ParseFailureCategory {
    Syntax,
    Utf8,
    NumericRange,
    DepthLimit,
    Eof,
    Unknown,
}

impl ParseFailureCategory {
    pub(crate) fn label(self) -> &'static str {
        match self {
            ParseFailureCategory::Syntax => "syntax",
            ParseFailureCategory::Utf8 => "utf8",
            ParseFailureCategory::NumericRange => "numeric-range",
            ParseFailureCategory::DepthLimit => "depth-limit",
            ParseFailureCategory::Eof => "eof",
            ParseFailureCategory::Unknown => "unknown",
        }
    }
}

pub(crate) fn from_str<T: DeserializeOwned>(input: &str) -> Result<T, simd_json::Error> {
    let mut bytes = input.as_bytes().to_vec();
    simd_json::serde::from_slice(&mut bytes)
}

pub(crate) fn categorize_error(err: &simd_json::Error) -> ParseFailureCategory {
    categorize_message(&err.to_string())
}

pub(crate) fn categorize_message(message: &str) -> ParseFailureCategory {
    let lower = message.to_ascii_lowercase();
    if lower.contains("utf8") || lower.contains("utf-8") {
        ParseFailureCategory::Utf8
    } else if lower.contains("number") || lower.contains("overflow") || lower.contains("exponent")
    {
        ParseFailureCategory::NumericRange
    } else if lower.contains("recursion") || lower.contains("depth") {
        ParseFailureCategory::DepthLimit
    } else if lower.contains("eof") || lower.contains("end of") {
        ParseFailureCategory::Eof
    } else if lower.contains("syntax")
        || lower.contains("expected")
        || lower.contains("unexpected")
        || lower.contains("invalid")
    {
        ParseFailureCategory::Syntax
    } else {
        ParseFailureCategory::Unknown
    }
}

pub(crate) fn hint_for_error(err: &simd_json::Error, context: &str) -> String {
    let category = categorize_error(err);
    format!(
        "Input is not valid JSON (parse category: {}; context: {context}).",
        category.label()
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::Value;

    #[test]
    fn decodes_object_into_value() {
        let value: Value = from_str(r#"{"lc":1,"type":"secret","id":["K"]}"#).expect("json");
        assert_eq!(value["id"][0], "K");
    }

    #[test]
    fn message_categories_are_stable() {
        assert_eq!(
            categorize_message("InvalidUTF8 at character 0"),
            ParseFailureCategory::Utf8
        );
        assert_eq!(
            categorize_message("InvalidNumber at character 5"),
            ParseFailureCategory::NumericRange
        );
        assert_eq!(
            categorize_message("Eof at character 1"),
            ParseFailureCategory::Eof
        );
        assert_eq!(
            categorize_message("ExpectedMap at character 0"),
            ParseFailureCategory::Syntax
        );
    }
}
