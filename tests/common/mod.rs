/*!
 * Common test utilities for the coze2draft test suite
 */

use anyhow::Result;
use async_trait::async_trait;
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

use coze2draft::errors::FetchError;
use coze2draft::fetch::Fetcher;

/// Creates a temporary directory for test files
pub fn create_temp_dir() -> Result<TempDir> {
    Ok(TempDir::new()?)
}

/// Creates a test file with the given content in the specified directory
pub fn create_test_file(dir: &Path, filename: &str, content: &str) -> Result<PathBuf> {
    let file_path = dir.join(filename);
    fs::write(&file_path, content)?;
    Ok(file_path)
}

/// Creates a minimal template directory usable by the pipeline
pub fn create_template_dir(dir: &Path) -> Result<PathBuf> {
    let template = dir.join("template");
    fs::create_dir_all(&template)?;
    create_test_file(
        &template,
        "platform_config.json",
        r#"{"platform": {"os": "mac", "app_version": "4.0.0"}, "fps": 30.0}"#,
    )?;
    create_test_file(&template, "draft_meta_info.json", r#"{"draft_name": ""}"#)?;
    create_test_file(&template, "draft_biz_config.json", "{}")?;
    Ok(template)
}

/// In-memory fetcher honoring the Fetcher contract: configured URLs write
/// their bytes to the destination, anything else fails, and a destination
/// that is already populated is a no-op success.
#[derive(Debug, Default)]
pub struct MockFetcher {
    responses: HashMap<String, Vec<u8>>,
}

impl MockFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a successful response body for a URL
    pub fn with_response(mut self, url: &str, body: &[u8]) -> Self {
        self.responses.insert(url.to_string(), body.to_vec());
        self
    }
}

#[async_trait]
impl Fetcher for MockFetcher {
    async fn fetch(&self, url: &str, dest: &Path) -> Result<(), FetchError> {
        let already_populated = fs::metadata(dest)
            .map(|m| m.is_file() && m.len() > 0)
            .unwrap_or(false);
        if already_populated {
            return Ok(());
        }

        match self.responses.get(url) {
            Some(body) if !body.is_empty() => {
                if let Some(parent) = dest.parent() {
                    fs::create_dir_all(parent).map_err(|e| FetchError::WriteFailed {
                        path: dest.to_path_buf(),
                        message: e.to_string(),
                    })?;
                }
                fs::write(dest, body).map_err(|e| FetchError::WriteFailed {
                    path: dest.to_path_buf(),
                    message: e.to_string(),
                })?;
                Ok(())
            }
            Some(_) => Err(FetchError::EmptyBody(dest.to_path_buf())),
            None => Err(FetchError::RequestFailed(format!(
                "no mock response for {}",
                url
            ))),
        }
    }
}
