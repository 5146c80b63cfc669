use std::path::Path;

use base64::Engine;

use crate::error::CertificateError;
use crate::pdf::RasterImage;

/// Loads an image referenced by a file path or a `data:<mime>;base64,<payload>` URI.
pub fn load_asset(name: &str, reference: &str) -> Result<RasterImage, CertificateError> {
    let asset_err = |reason: String| CertificateError::Asset {
        name: name.to_string(),
        reason,
    };

    let bytes = if let Some(rest) = reference.strip_prefix("data:") {
        let (meta, payload) = rest
            .split_once(',')
            .ok_or_else(|| asset_err("malformed data URI".to_string()))?;
        if !meta.ends_with(";base64") {
            return Err(asset_err("data URI is not base64 encoded".to_string()));
        }
        base64::engine::general_purpose::STANDARD
            .decode(payload.trim())
            .map_err(|e| asset_err(e.to_string()))?
    } else {
        std::fs::read(Path::new(reference))
            .map_err(|e| asset_err(format!("{}: {}", reference, e)))?
    };

    RasterImage::decode(&bytes).map_err(|e| asset_err(e.to_string()))
}

/// Loads an optional asset; an unset reference yields `None`.
pub fn load_optional(
    name: &str,
    reference: Option<&str>,
) -> Result<Option<RasterImage>, CertificateError> {
    match reference.map(str::trim).filter(|r| !r.is_empty()) {
        Some(r) => load_asset(name, r).map(Some),
        None => Ok(None),
    }
}
