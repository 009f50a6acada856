//! Completion backends.
//!
//! The research agent only sees the [`Provider`] trait. The production
//! implementation is [`OpenAiCompatibleProvider`], which speaks the
//! `/v1/chat/completions` wire format used by the Zeabur AI Hub and most
//! other hosted model gateways.

pub mod compatible;
pub mod traits;

pub use compatible::OpenAiCompatibleProvider;
pub use traits::{ChatMessage, Provider, ProviderError, Role};

use crate::config::ProviderConfig;

const MAX_API_ERROR_CHARS: usize = 200;

/// Build the configured completion backend.
pub fn create_provider(config: &ProviderConfig) -> anyhow::Result<OpenAiCompatibleProvider> {
    OpenAiCompatibleProvider::new(
        &config.api_url,
        config.api_key.as_deref(),
        &config.model,
        config.timeout_secs,
    )
}

const REDACTED: &str = "[REDACTED]";

/// A place where a credential can surface in upstream error text, and the
/// shortest token after it that is treated as a real secret.
struct CredentialMarker {
    marker: &'static str,
    min_len: usize,
}

/// Zeabur AI Hub keys are `sk-` prefixed. Both the hub and BrightData take
/// their token as `Authorization: Bearer <token>`, and proxies in front of
/// them have been seen echoing that header or a JSON/query field back in
/// error bodies.
const CREDENTIAL_MARKERS: [CredentialMarker; 10] = [
    CredentialMarker { marker: "sk-", min_len: 1 },
    CredentialMarker { marker: "Bearer ", min_len: 16 },
    CredentialMarker { marker: "bearer ", min_len: 16 },
    CredentialMarker { marker: "Authorization: ", min_len: 16 },
    CredentialMarker { marker: "\"api_key\":\"", min_len: 8 },
    CredentialMarker { marker: "\"token\":\"", min_len: 8 },
    CredentialMarker { marker: "\"access_token\":\"", min_len: 8 },
    CredentialMarker { marker: "api_key=", min_len: 8 },
    CredentialMarker { marker: "token=", min_len: 8 },
    CredentialMarker { marker: "access_token=", min_len: 8 },
];

/// Byte length of the credential-shaped run at the start of `rest`.
fn credential_len(rest: &str) -> usize {
    rest.chars()
        .take_while(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.' | ':'))
        .map(char::len_utf8)
        .sum()
}

/// Redact Zeabur and BrightData credentials from backend error text.
///
/// Error bodies end up in logs and, on synthesis failure, in the answer
/// returned to the caller.
pub fn scrub_secret_patterns(input: &str) -> String {
    let mut scrubbed = input.to_string();

    for CredentialMarker { marker, min_len } in &CREDENTIAL_MARKERS {
        let mut cursor = 0;
        while let Some(offset) = scrubbed[cursor..].find(marker) {
            let marker_start = cursor + offset;
            let token_start = marker_start + marker.len();
            let token_len = credential_len(&scrubbed[token_start..]);

            // "sk-" in prose is not a key.
            if token_len < *min_len {
                cursor = token_start;
                continue;
            }

            scrubbed.replace_range(marker_start..token_start + token_len, REDACTED);
            cursor = marker_start + REDACTED.len();
        }
    }

    scrubbed
}

/// Scrub secrets from backend error text and cap its length.
pub fn sanitize_api_error(input: &str) -> String {
    let scrubbed = scrub_secret_patterns(input);

    match scrubbed.char_indices().nth(MAX_API_ERROR_CHARS) {
        Some((end, _)) => format!("{}...", &scrubbed[..end]),
        None => scrubbed,
    }
}
