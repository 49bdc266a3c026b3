//! Text source loading.
//!
//! Outlines and source articles are plain UTF-8 text files.

use std::path::{Path, PathBuf};

use crate::error::PodcastError;

/// A loaded text source.
#[derive(Debug, Clone)]
pub struct Source {
    /// File contents.
    pub text: String,
    /// Where the text came from.
    pub path: PathBuf,
}

impl Source {
    /// Read a single text file.
    pub async fn load<P: AsRef<Path>>(path: P) -> Result<Self, PodcastError> {
        let text = tokio::fs::read_to_string(path.as_ref()).await?;
        Ok(Self {
            text,
            path: path.as_ref().to_path_buf(),
        })
    }

    /// Read several text files, in the order given.
    pub async fn load_all<P: AsRef<Path>>(paths: &[P]) -> Result<Vec<Self>, PodcastError> {
        let mut sources = Vec::with_capacity(paths.len());
        for path in paths {
            sources.push(Self::load(path).await?);
        }
        Ok(sources)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_load_reads_file_contents() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("article.txt");
        std::fs::write(&path, "Body text.").unwrap();

        let source = Source::load(&path).await.unwrap();
        assert_eq!(source.text, "Body text.");
        assert_eq!(source.path, path);
    }

    #[tokio::test]
    async fn test_load_all_preserves_order() {
        let dir = tempfile::tempdir().unwrap();
        let a = dir.path().join("a.txt");
        let b = dir.path().join("b.txt");
        std::fs::write(&a, "first").unwrap();
        std::fs::write(&b, "second").unwrap();

        let sources = Source::load_all(&[&b, &a]).await.unwrap();
        assert_eq!(sources[0].text, "second");
        assert_eq!(sources[1].text, "first");
    }

    #[tokio::test]
    async fn test_load_missing_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let result = Source::load(dir.path().join("absent.txt")).await;
        assert!(matches!(result, Err(PodcastError::Io(_))));
    }
}
