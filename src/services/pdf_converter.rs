//! HTML-to-PDF conversion.
//!
//! Conversion is delegated to a headless Chromium-compatible browser started
//! as a child process. The converter is a trait so the HTTP layer can be
//! exercised without a browser installed.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::process::Command;
use uuid::Uuid;

use crate::error::AppError;

#[async_trait]
pub trait PdfConverter: Send + Sync {
    async fn convert(&self, html: &str) -> Result<Vec<u8>, AppError>;
}

/// Runs `<binary> --headless --print-to-pdf=<out> file://<in>`.
///
/// Each conversion uses its own pair of files in the system temp directory,
/// removed once the PDF has been read back. The child is killed if the
/// request is dropped (e.g. by the request timeout).
#[derive(Debug, Clone)]
pub struct ChromiumConverter {
    binary: String,
}

impl ChromiumConverter {
    pub fn new(binary: impl Into<String>) -> Self {
        Self {
            binary: binary.into(),
        }
    }

    async fn print(&self, html_path: &Path, pdf_path: &Path) -> Result<Vec<u8>, AppError> {
        let output = Command::new(&self.binary)
            .arg("--headless")
            .arg("--disable-gpu")
            .arg("--no-sandbox")
            .arg("--no-pdf-header-footer")
            .arg(format!("--print-to-pdf={}", pdf_path.display()))
            .arg(format!("file://{}", html_path.display()))
            .kill_on_drop(true)
            .output()
            .await
            .map_err(|e| AppError::PdfConversion(format!("failed to start {}: {e}", self.binary)))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(AppError::PdfConversion(format!(
                "{} exited with {}: {}",
                self.binary,
                output.status,
                stderr.trim()
            )));
        }

        tokio::fs::read(pdf_path)
            .await
            .map_err(|e| AppError::PdfConversion(format!("no PDF produced: {e}")))
    }
}

fn job_paths() -> (PathBuf, PathBuf) {
    let job = Uuid::new_v4();
    let dir = std::env::temp_dir();
    (
        dir.join(format!("invoice-{job}.html")),
        dir.join(format!("invoice-{job}.pdf")),
    )
}

#[async_trait]
impl PdfConverter for ChromiumConverter {
    async fn convert(&self, html: &str) -> Result<Vec<u8>, AppError> {
        let (html_path, pdf_path) = job_paths();

        tokio::fs::write(&html_path, html)
            .await
            .map_err(|e| AppError::PdfConversion(format!("cannot write HTML: {e}")))?;

        let result = self.print(&html_path, &pdf_path).await;

        // Best effort; the PDF file may not exist if the browser failed
        let _ = tokio::fs::remove_file(&html_path).await;
        let _ = tokio::fs::remove_file(&pdf_path).await;

        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn missing_binary_is_a_conversion_error() {
        let converter = ChromiumConverter::new("definitely-not-a-browser-binary");

        let result = converter.convert("<html></html>").await;
        assert!(matches!(result, Err(AppError::PdfConversion(msg)) if msg.contains("failed to start")));
    }

    #[test]
    fn job_paths_are_unique() {
        let (html_a, pdf_a) = job_paths();
        let (html_b, _) = job_paths();
        assert_ne!(html_a, html_b);
        assert_eq!(html_a.with_extension("pdf"), pdf_a);
    }
}
