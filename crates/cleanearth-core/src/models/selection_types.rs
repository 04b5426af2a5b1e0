use crate::error::AppError;
use serde::{Deserialize, Serialize};

pub const IMAGE_EXTENSIONS: [&str; 5] = ["png", "jpg", "jpeg", "gif", "webp"];

/// Outcome of a handshake: `None` means no selection, otherwise exactly one locator.
pub type FileSelection = Option<Vec<String>>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SelectionTicket(pub u64);

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SelectionParams {
    /// Accept filters as written in an `<input accept>` attribute: MIME types,
    /// wildcards like `image/*`, or `.ext` suffixes.
    pub accept_types: Vec<String>,
}

impl SelectionParams {
    pub fn images() -> Self {
        Self {
            accept_types: vec!["image/*".to_string()],
        }
    }

    /// Resolves the accept filters into file extensions.
    ///
    /// An empty filter list means any file and yields no extensions. A
    /// non-empty list that maps to nothing is an error, so callers can fall
    /// back to the default picker.
    pub fn extensions(&self) -> Result<Vec<String>, AppError> {
        let mut extensions: Vec<String> = Vec::new();
        for accept in self.accept_types.iter().map(|a| a.trim().to_ascii_lowercase()) {
            for ext in extensions_for(&accept) {
                if !extensions.iter().any(|e| e == &ext) {
                    extensions.push(ext);
                }
            }
        }

        if extensions.is_empty() && !self.accept_types.is_empty() {
            return Err(format!(
                "No file handler for accept types: {}",
                self.accept_types.join(", ")
            )
            .into());
        }
        Ok(extensions)
    }
}

fn extensions_for(accept: &str) -> Vec<String> {
    if let Some(ext) = accept.strip_prefix('.') {
        if ext.is_empty() || !ext.chars().all(|c| c.is_ascii_alphanumeric()) {
            return Vec::new();
        }
        return vec![ext.to_string()];
    }

    let owned = |exts: &[&str]| exts.iter().map(|e| e.to_string()).collect();
    match accept {
        "image/*" => owned(&IMAGE_EXTENSIONS),
        "image/png" => owned(&["png"]),
        "image/jpeg" | "image/jpg" => owned(&["jpg", "jpeg"]),
        "image/gif" => owned(&["gif"]),
        "image/webp" => owned(&["webp"]),
        _ => Vec::new(),
    }
}
