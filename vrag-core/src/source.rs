//! Document acquisition and text cleaning.

use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use async_trait::async_trait;
use regex::Regex;
use tracing::{debug, info, warn};

use crate::document::Document;
use crate::error::{RagError, Result};

static CITATION_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\[\d+\]").expect("citation regex is valid"));

static NEWLINES_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\n+").expect("newline regex is valid"));

/// Page separator inside plain-text files.
const FORM_FEED: char = '\u{0C}';

/// File extensions read by [`LocalDirectorySource`].
const TEXT_EXTENSIONS: &[&str] = &["txt", "md"];

/// Normalise extracted text.
///
/// Removes bracketed numeric citations such as `[12]`, joins single line
/// breaks into spaces, collapses longer runs of line breaks into one blank
/// line, and trims the result.
pub fn clean_text(text: &str) -> String {
    let text = text.replace("\r\n", "\n");
    let text = CITATION_RE.replace_all(&text, "");
    let text = NEWLINES_RE.replace_all(&text, |caps: &regex::Captures<'_>| {
        if caps[0].len() == 1 { " " } else { "\n\n" }
    });
    text.trim().to_string()
}

/// A source of documents addressed by a locator string.
#[async_trait]
pub trait DocumentSource: Send + Sync {
    /// Load every document found at `locator`.
    ///
    /// # Errors
    ///
    /// Returns [`RagError::SourceUnavailable`] if the locator cannot be read.
    async fn list_documents(&self, locator: &str) -> Result<Vec<Document>>;
}

/// Reads `.txt` and `.md` files from one local directory.
///
/// Files are visited in file-name order without descending into
/// subdirectories. Each form-feed separated page becomes one [`Document`]
/// with `source` set to the file name and a 1-based `page`. Pages that are
/// empty after [`clean_text`] are skipped, as are files that cannot be read.
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalDirectorySource;

impl LocalDirectorySource {
    pub fn new() -> Self {
        Self
    }

    async fn text_files(&self, dir: &Path) -> Result<Vec<PathBuf>> {
        let unavailable = |e: std::io::Error| RagError::SourceUnavailable {
            locator: dir.display().to_string(),
            message: e.to_string(),
        };

        let mut entries = tokio::fs::read_dir(dir).await.map_err(unavailable)?;
        let mut files = Vec::new();
        while let Some(entry) = entries.next_entry().await.map_err(unavailable)? {
            let path = entry.path();
            let is_text = path
                .extension()
                .and_then(|ext| ext.to_str())
                .is_some_and(|ext| TEXT_EXTENSIONS.iter().any(|t| ext.eq_ignore_ascii_case(t)));
            if is_text && entry.file_type().await.map(|t| t.is_file()).unwrap_or(false) {
                files.push(path);
            }
        }
        files.sort_by(|a, b| a.file_name().cmp(&b.file_name()));
        Ok(files)
    }
}

#[async_trait]
impl DocumentSource for LocalDirectorySource {
    async fn list_documents(&self, locator: &str) -> Result<Vec<Document>> {
        let dir = Path::new(locator);
        let files = self.text_files(dir).await?;

        let mut documents = Vec::new();
        for path in files {
            let raw = match tokio::fs::read_to_string(&path).await {
                Ok(raw) => raw,
                Err(e) => {
                    warn!(path = %path.display(), error = %e, "skipping unreadable file");
                    continue;
                }
            };
            let file_name = path.file_name().map(|n| n.to_string_lossy().into_owned()).unwrap_or_default();

            let before = documents.len();
            for (i, page) in raw.split(FORM_FEED).enumerate() {
                let text = clean_text(page);
                if text.is_empty() {
                    continue;
                }
                let mut document = Document::new(file_name.clone(), i + 1, text);
                document.source_uri = Some(path.display().to_string());
                documents.push(document);
            }
            debug!(file = %file_name, pages = documents.len() - before, "loaded file");
        }

        info!(locator, document_count = documents.len(), "loaded documents");
        Ok(documents)
    }
}
