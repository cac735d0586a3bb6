use base64::{engine::general_purpose::STANDARD, Engine as _};
use error_common::{Result, SkribeError};
use serde::{Deserialize, Serialize};

const PNG_DATA_URL_PREFIX: &str = "data:image/png;base64,";

/// QR code issued for the patient summary page of a session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QrCode {
    pub qr_code_url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub qr_code_image: Option<String>,
    #[serde(default)]
    pub session_id: String,
}

impl QrCode {
    /// Decode the embedded `data:image/png;base64,...` image
    pub fn png_bytes(&self) -> Result<Option<Vec<u8>>> {
        let Some(image) = self.qr_code_image.as_deref() else {
            return Ok(None);
        };
        let encoded = image.strip_prefix(PNG_DATA_URL_PREFIX).ok_or_else(|| {
            SkribeError::SerializationError("QR image is not a base64 PNG data URL".to_string())
        })?;
        STANDARD
            .decode(encoded.trim())
            .map(Some)
            .map_err(|e| SkribeError::SerializationError(format!("invalid QR image payload: {}", e)))
    }
}
