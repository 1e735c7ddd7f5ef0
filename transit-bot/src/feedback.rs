//! Append-only suggestion and report logs.

use std::path::PathBuf;

use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;

/// Errors writing a feedback entry.
#[derive(Debug, thiserror::Error)]
pub enum FeedbackError {
    #[error("feedback I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Which log an entry goes to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeedbackKind {
    Suggestion,
    Report,
}

impl FeedbackKind {
    fn file_name(self) -> &'static str {
        match self {
            FeedbackKind::Suggestion => "suggestions.txt",
            FeedbackKind::Report => "reports.txt",
        }
    }
}

/// Writes each entry followed by a blank line.
#[derive(Debug)]
pub struct FeedbackLog {
    dir: PathBuf,
    // Keeps entries from interleaving.
    lock: Mutex<()>,
}

impl FeedbackLog {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            lock: Mutex::new(()),
        }
    }

    pub fn path(&self, kind: FeedbackKind) -> PathBuf {
        self.dir.join(kind.file_name())
    }

    pub async fn append(&self, kind: FeedbackKind, text: &str) -> Result<(), FeedbackError> {
        let _guard = self.lock.lock().await;
        if !self.dir.as_os_str().is_empty() {
            tokio::fs::create_dir_all(&self.dir).await?;
        }
        let mut file = tokio::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(self.path(kind))
            .await?;
        file.write_all(format!("{text}\n\n").as_bytes()).await?;
        file.flush().await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[tokio::test]
    async fn entries_separated_by_blank_line() {
        let dir = tempdir().unwrap();
        let log = FeedbackLog::new(dir.path());

        log.append(FeedbackKind::Suggestion, "más líneas").await.unwrap();
        log.append(FeedbackKind::Suggestion, "modo oscuro").await.unwrap();
        log.append(FeedbackKind::Report, "Sol no aparece").await.unwrap();

        let suggestions = std::fs::read_to_string(dir.path().join("suggestions.txt")).unwrap();
        assert_eq!(suggestions, "más líneas\n\nmodo oscuro\n\n");
        let reports = std::fs::read_to_string(dir.path().join("reports.txt")).unwrap();
        assert_eq!(reports, "Sol no aparece\n\n");
    }
}
