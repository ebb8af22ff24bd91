//! Source document module
//!
//! Loads the JSON file served at `/`. Every call reads and parses the file
//! from scratch; nothing is kept between requests.
//!
//! Numbers keep their source text (`arbitrary_precision`), so integers wider
//! than 64 bits and exponents outside the `f64` range are served unchanged.
//! Nesting is capped at [`MAX_NESTING`] levels.

mod error;

pub use error::DocumentError;

use serde::Deserialize;
use serde_json::Value;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio::fs;

/// Deepest array/object nesting accepted in the source document
pub const MAX_NESTING: usize = 512;

/// Handle to the on-disk JSON document
#[derive(Debug, Clone)]
pub struct JsonDocument {
    path: PathBuf,
    read_timeout: Duration,
}

impl JsonDocument {
    pub fn new(path: impl AsRef<Path>, read_timeout: Duration) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            read_timeout,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the whole file and parse it as an untyped JSON value
    pub async fn load(&self) -> Result<Value, DocumentError> {
        let raw = self.read().await?;
        if exceeds_nesting(&raw, MAX_NESTING) {
            return Err(DocumentError::TooDeep {
                path: self.path.clone(),
                limit: MAX_NESTING,
            });
        }
        parse(&raw).map_err(|source| DocumentError::Parse {
            path: self.path.clone(),
            source,
        })
    }

    /// Load and serialize in one step: compact JSON plus a trailing newline
    pub async fn render(&self) -> Result<Vec<u8>, DocumentError> {
        let value = self.load().await?;
        let mut body = serde_json::to_vec(&value).map_err(|source| DocumentError::Encode {
            path: self.path.clone(),
            source,
        })?;
        body.push(b'\n');
        Ok(body)
    }

    async fn read(&self) -> Result<Vec<u8>, DocumentError> {
        match tokio::time::timeout(self.read_timeout, fs::read(&self.path)).await {
            Ok(Ok(raw)) => Ok(raw),
            Ok(Err(source)) => Err(DocumentError::Io {
                path: self.path.clone(),
                source,
            }),
            Err(_) => Err(DocumentError::Timeout {
                path: self.path.clone(),
                after: self.read_timeout,
            }),
        }
    }
}

/// Parse without serde_json's fixed recursion limit, growing the stack on demand
fn parse(raw: &[u8]) -> Result<Value, serde_json::Error> {
    let mut de = serde_json::Deserializer::from_slice(raw);
    de.disable_recursion_limit();
    let value = Value::deserialize(serde_stacker::Deserializer::new(&mut de))?;
    de.end()?;
    Ok(value)
}

/// Whether any bracket nesting in `raw` goes deeper than `limit`.
/// Brackets inside string literals are skipped.
fn exceeds_nesting(raw: &[u8], limit: usize) -> bool {
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    for &byte in raw {
        if in_string {
            match byte {
                _ if escaped => escaped = false,
                b'\\' => escaped = true,
                b'"' => in_string = false,
                _ => {}
            }
            continue;
        }
        match byte {
            b'"' => in_string = true,
            b'[' | b'{' => {
                depth += 1;
                if depth > limit {
                    return true;
                }
            }
            b']' | b'}' => depth = depth.saturating_sub(1),
            _ => {}
        }
    }
    false
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::io::Write;

    const TIMEOUT: Duration = Duration::from_secs(5);

    fn write_temp(contents: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    #[tokio::test]
    async fn test_load_object() {
        let file = write_temp(r#"{"a": 1, "b": [2,3]}"#);
        let doc = JsonDocument::new(file.path(), TIMEOUT);
        assert_eq!(doc.load().await.unwrap(), json!({"a": 1, "b": [2, 3]}));
    }

    #[tokio::test]
    async fn test_load_scalars_and_arrays() {
        for (raw, expected) in [
            ("[1, \"two\", null]", json!([1, "two", null])),
            ("42", json!(42)),
            ("\"text\"", json!("text")),
            ("true", json!(true)),
            ("null", Value::Null),
        ] {
            let file = write_temp(raw);
            let doc = JsonDocument::new(file.path(), TIMEOUT);
            assert_eq!(doc.load().await.unwrap(), expected, "input: {raw}");
        }
    }

    #[tokio::test]
    async fn test_render_is_compact_with_newline() {
        let file = write_temp("{\n  \"b\": [2, 3],\n  \"a\": 1\n}\n");
        let doc = JsonDocument::new(file.path(), TIMEOUT);
        let body = doc.render().await.unwrap();
        assert_eq!(body, b"{\"a\":1,\"b\":[2,3]}\n");
    }

    #[tokio::test]
    async fn test_missing_file_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let doc = JsonDocument::new(dir.path().join("scraped_data.json"), TIMEOUT);
        let err = doc.load().await.unwrap_err();
        assert_eq!(err.kind(), "io");
        assert_eq!(err.status_code(), hyper::StatusCode::INTERNAL_SERVER_ERROR);
        assert!(err.to_string().contains("scraped_data.json"));
    }

    #[tokio::test]
    async fn test_directory_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let doc = JsonDocument::new(dir.path(), TIMEOUT);
        assert_eq!(doc.load().await.unwrap_err().kind(), "io");
    }

    #[tokio::test]
    async fn test_truncated_json_is_parse_error() {
        let file = write_temp(r#"{"a": 1, "b": [2,"#);
        let doc = JsonDocument::new(file.path(), TIMEOUT);
        let err = doc.render().await.unwrap_err();
        assert_eq!(err.kind(), "parse");
        assert_eq!(err.status_code(), hyper::StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[tokio::test]
    async fn test_empty_file_is_parse_error() {
        let file = write_temp("");
        let doc = JsonDocument::new(file.path(), TIMEOUT);
        assert_eq!(doc.load().await.unwrap_err().kind(), "parse");
    }

    #[tokio::test]
    async fn test_wide_integers_keep_their_digits() {
        let file = write_temp(r#"{"id": 123456789012345678901234567890, "neg": -18446744073709551617}"#);
        let doc = JsonDocument::new(file.path(), TIMEOUT);
        let body = doc.render().await.unwrap();
        assert_eq!(
            body,
            b"{\"id\":123456789012345678901234567890,\"neg\":-18446744073709551617}\n"
        );
    }

    #[tokio::test]
    async fn test_exponent_beyond_f64_is_served() {
        let file = write_temp("[1e400, -2.5E-400]");
        let doc = JsonDocument::new(file.path(), TIMEOUT);
        assert_eq!(doc.render().await.unwrap(), b"[1e400,-2.5E-400]\n");
    }

    #[tokio::test]
    async fn test_deep_nesting_within_limit() {
        let depth = 200;
        let raw = format!("{}{}", "[".repeat(depth), "]".repeat(depth));
        let file = write_temp(&raw);
        let doc = JsonDocument::new(file.path(), TIMEOUT);

        let mut expected = raw.into_bytes();
        expected.push(b'\n');
        assert_eq!(doc.render().await.unwrap(), expected);
    }

    #[tokio::test]
    async fn test_nesting_past_limit_is_rejected() {
        let depth = MAX_NESTING + 1;
        let file = write_temp(&format!("{}{}", "[".repeat(depth), "]".repeat(depth)));
        let doc = JsonDocument::new(file.path(), TIMEOUT);

        let err = doc.load().await.unwrap_err();
        assert_eq!(err.kind(), "depth");
        assert_eq!(err.status_code(), hyper::StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn test_nesting_scan_skips_strings() {
        assert!(!exceeds_nesting(br#"{"a": "[[[[[", "b": "\"{{{{"}"#, 1));
        assert!(exceeds_nesting(br#"{"a": [{}]}"#, 2));
        assert!(!exceeds_nesting(br#"{"a": [{}]}"#, 3));
    }

    /// A named pipe whose read blocks until something opens it for writing
    #[cfg(unix)]
    fn stalled_fifo(dir: &Path) -> PathBuf {
        let fifo = dir.join("scraped_data.json");
        let status = std::process::Command::new("mkfifo").arg(&fifo).status().unwrap();
        assert!(status.success());
        fifo
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_stalled_read_is_timeout_error() {
        let dir = tempfile::tempdir().unwrap();
        let fifo = stalled_fifo(dir.path());
        let doc = JsonDocument::new(&fifo, Duration::from_millis(50));

        let err = doc.load().await.unwrap_err();
        assert_eq!(err.kind(), "timeout");
        assert_eq!(err.status_code(), hyper::StatusCode::INTERNAL_SERVER_ERROR);
        assert!(err.to_string().contains("50ms"));

        // Release the blocked reader so the runtime can shut down
        std::fs::write(&fifo, "{}").unwrap();
    }

    #[tokio::test]
    async fn test_reads_fresh_contents_each_time() {
        let file = write_temp(r#"{"v": 1}"#);
        let doc = JsonDocument::new(file.path(), TIMEOUT);
        assert_eq!(doc.load().await.unwrap(), json!({"v": 1}));

        std::fs::write(file.path(), r#"{"v": 2}"#).unwrap();
        assert_eq!(doc.load().await.unwrap(), json!({"v": 2}));
    }
}
