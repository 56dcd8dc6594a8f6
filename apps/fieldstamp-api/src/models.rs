//! Data models for the Fieldstamp API

use serde::{Deserialize, Serialize};

use fieldstamp_core::Field;

/// Request to stamp field marks onto a document
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SignRequest {
    #[serde(rename = "pdfBase64", default)]
    pub pdf_base64: String,
    #[serde(default)]
    pub fields: Vec<Field>,
}

/// Response from a stamp operation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SignResponse {
    pub success: bool,
    /// Data URI holding the stamped document
    pub url: String,
    #[serde(rename = "originalHash")]
    pub original_hash: String,
    #[serde(rename = "signedHash")]
    pub signed_hash: String,
}
