use serde::{Deserialize, Serialize};

/// Error body returned by the validation service alongside a non-2xx status.
///
/// The service reports rejected uploads (wrong file type, unreadable CSV)
/// as `{"detail": "..."}`. Any other body shape is treated as "no detail".
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceErrorBody {
    #[serde(default)]
    pub detail: Option<String>,
}

impl ServiceErrorBody {
    /// Extracts a non-empty `detail` string from a raw response body.
    pub fn detail_from_slice(body: &[u8]) -> Option<String> {
        let parsed: ServiceErrorBody = serde_json::from_slice(body).ok()?;
        parsed
            .detail
            .map(|detail| detail.trim().to_string())
            .filter(|detail| !detail.is_empty())
    }
}
