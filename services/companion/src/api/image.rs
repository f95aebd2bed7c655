//! services/companion/src/api/image.rs
//!
//! Helpers for preparing image payloads. No network interaction.

use base64::{engine::general_purpose::STANDARD, Engine as _};

/// Encodes raw image bytes as standard base64 text.
pub fn encode_image_base64(bytes: &[u8]) -> String {
    STANDARD.encode(bytes)
}

/// Drops a `data:<mime>;base64,` prefix if present, returning the payload.
pub fn strip_data_url_prefix(data: &str) -> &str {
    if data.starts_with("data:") {
        if let Some((_, payload)) = data.split_once(',') {
            return payload;
        }
    }
    data
}
