//! Best-effort decoding of JSON objects embedded in model output.
//!
//! Models are told to reply with bare JSON but regularly wrap it in a
//! Markdown code fence. Decoding never fails loudly: callers get `None` and
//! pick their own fallback.

use serde::de::DeserializeOwned;

/// Remove a surrounding Markdown code fence, if present.
///
/// The opening fence line (including any language tag such as `json`) is
/// dropped along with everything after the last closing fence. Text that does
/// not start with a fence is returned trimmed.
pub fn strip_code_fence(raw: &str) -> &str {
    let trimmed = raw.trim();
    let Some(after_open) = trimmed.strip_prefix("```") else {
        return trimmed;
    };

    // A fence with nothing after its opening line has no body.
    let body = after_open.split_once('\n').map_or("", |(_, body)| body);
    let body = body.rfind("```").map_or(body, |close| &body[..close]);
    body.trim()
}

/// Decode `raw` model output into `T`, tolerating a code fence.
pub fn decode_structured<T: DeserializeOwned>(raw: &str) -> Option<T> {
    match serde_json::from_str(strip_code_fence(raw)) {
        Ok(value) => Some(value),
        Err(error) => {
            tracing::debug!("Model output is not the expected JSON shape: {error}");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Debug, Deserialize, PartialEq)]
    struct Keywords {
        keywords: String,
    }

    #[test]
    fn strip_code_fence_passes_plain_text_through() {
        assert_eq!(strip_code_fence("  {\"a\":1}\n"), "{\"a\":1}");
    }

    #[test]
    fn strip_code_fence_removes_language_tagged_fence() {
        assert_eq!(
            strip_code_fence("```json\n{\"a\":1}\n```"),
            "{\"a\":1}"
        );
    }

    #[test]
    fn strip_code_fence_removes_bare_fence() {
        assert_eq!(strip_code_fence("```\n{\"a\":1}\n```\n"), "{\"a\":1}");
    }

    #[test]
    fn strip_code_fence_tolerates_missing_closing_fence() {
        assert_eq!(strip_code_fence("```json\n{\"a\":1}"), "{\"a\":1}");
    }

    #[test]
    fn strip_code_fence_single_line_fence_has_no_body() {
        assert_eq!(strip_code_fence("```{\"a\":1}```"), "");
    }

    #[test]
    fn decode_structured_reads_fenced_json() {
        let decoded: Option<Keywords> =
            decode_structured("```json\n{\"keywords\": \"rust 1.80\"}\n```");
        assert_eq!(
            decoded,
            Some(Keywords {
                keywords: "rust 1.80".into()
            })
        );
    }

    #[test]
    fn decode_structured_returns_none_on_prose() {
        let decoded: Option<Keywords> = decode_structured("Sure! The keywords are rust 1.80");
        assert!(decoded.is_none());
    }

    #[test]
    fn decode_structured_returns_none_on_wrong_shape() {
        let decoded: Option<Keywords> = decode_structured("[\"rust\"]");
        assert!(decoded.is_none());
    }
}
