//! Document loading from various sources.
//!
//! Handles loading OpenAPI documents from files, strings, and HTTP URLs.
//! Both JSON and YAML are accepted; JSON is tried first.

use std::path::Path;

use serde_json::Value;

use crate::error::LoadError;
use crate::types::json_type_name;

#[cfg(feature = "remote")]
use std::time::Duration;

/// Default timeout for HTTP requests (10 seconds).
#[cfg(feature = "remote")]
const HTTP_TIMEOUT: Duration = Duration::from_secs(10);

/// Load a document from a file path.
///
/// # Errors
///
/// Returns `LoadError::FileNotFound` if the file doesn't exist,
/// or `LoadError::InvalidDocument` if it is neither JSON nor YAML.
pub fn load_document(path: &Path) -> Result<Value, LoadError> {
    if !path.exists() {
        return Err(LoadError::FileNotFound {
            path: path.to_path_buf(),
        });
    }

    let content = std::fs::read_to_string(path).map_err(|source| LoadError::ReadError {
        path: path.to_path_buf(),
        source,
    })?;

    load_document_str(&content)
}

/// Load a document from a JSON or YAML string.
///
/// # Errors
///
/// Returns `LoadError::InvalidDocument` if the string parses as neither,
/// or `LoadError::NotAMapping` if the top level is not an object.
pub fn load_document_str(content: &str) -> Result<Value, LoadError> {
    let value = match serde_json::from_str::<Value>(content) {
        Ok(value) => value,
        Err(json) => serde_yaml::from_str::<Value>(content)
            .map_err(|yaml| LoadError::InvalidDocument { json, yaml })?,
    };

    if !value.is_object() {
        return Err(LoadError::NotAMapping {
            actual: json_type_name(&value),
        });
    }
    Ok(value)
}

/// Load a document from an HTTP/HTTPS URL.
///
/// Requires the `remote` feature (enabled by default).
///
/// # Errors
///
/// Returns `LoadError::NetworkError` if the request fails,
/// or `LoadError::InvalidDocument` if the body is neither JSON nor YAML.
#[cfg(feature = "remote")]
pub fn load_document_url(url: &str) -> Result<Value, LoadError> {
    let network_error = |source| LoadError::NetworkError {
        url: url.to_string(),
        source,
    };

    let client = reqwest::blocking::Client::builder()
        .timeout(HTTP_TIMEOUT)
        .build()
        .map_err(network_error)?;

    let body = client
        .get(url)
        .send()
        .and_then(|response| response.error_for_status())
        .and_then(|response| response.text())
        .map_err(network_error)?;

    load_document_str(&body)
}

/// Check if a string looks like a URL (starts with http:// or https://).
pub fn is_url(s: &str) -> bool {
    s.starts_with("http://") || s.starts_with("https://")
}

/// Load a document from a file path or URL.
///
/// Automatically detects whether the source is a URL or file path.
/// URL loading requires the `remote` feature.
///
/// # Errors
///
/// Returns appropriate errors based on the source type.
pub fn load_document_auto(source: &str) -> Result<Value, LoadError> {
    if is_url(source) {
        #[cfg(feature = "remote")]
        {
            load_document_url(source)
        }
        #[cfg(not(feature = "remote"))]
        {
            Err(LoadError::FileNotFound {
                path: std::path::PathBuf::from(source),
            })
        }
    } else {
        load_document(Path::new(source))
    }
}
