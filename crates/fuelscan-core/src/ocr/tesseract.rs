//! OCR through the `tesseract` command-line tool.

use std::process::Command;

use image::{DynamicImage, ImageFormat};
use tracing::{debug, info};

use super::OcrEngine;
use crate::error::OcrError;
use crate::models::config::{LanguageModel, OcrConfig};

/// Runs the tesseract executable on a temporary PNG.
#[derive(Debug, Clone)]
pub struct TesseractEngine {
    path: String,
    /// Installed traineddata codes; `None` if tesseract could not list them.
    languages: Option<Vec<String>>,
}

impl TesseractEngine {
    /// Check the executable at `config.tesseract_path` and list its languages.
    pub fn new(config: &OcrConfig) -> Result<Self, OcrError> {
        let path = config.tesseract_path.clone();
        if !is_tesseract_available(&path) {
            return Err(OcrError::Unavailable(format!(
                "tesseract not found (path='{}')",
                path
            )));
        }

        let languages = list_languages(&path);
        info!(
            "Using tesseract at '{}' (languages: {:?})",
            path, languages
        );
        Ok(Self { path, languages })
    }
}

impl OcrEngine for TesseractEngine {
    fn name(&self) -> &'static str {
        "tesseract"
    }

    fn supports(&self, language: &LanguageModel) -> bool {
        self.languages
            .as_ref()
            .is_none_or(|langs| langs.iter().any(|l| *l == language.code))
    }

    fn recognize(&self, image: &DynamicImage, language: &LanguageModel) -> Result<String, OcrError> {
        if !self.supports(language) {
            return Err(OcrError::Unavailable(format!(
                "tesseract has no '{}' language data",
                language.code
            )));
        }

        let input = tempfile::Builder::new()
            .prefix("fuelscan-ocr-")
            .suffix(".png")
            .tempfile()?;
        image
            .save_with_format(input.path(), ImageFormat::Png)
            .map_err(|e| OcrError::Recognition(format!("failed to write OCR input: {}", e)))?;

        // tesseract input.png stdout -l por
        let output = Command::new(&self.path)
            .arg(input.path())
            .arg("stdout")
            .arg("-l")
            .arg(&language.code)
            .output()?;

        if !output.status.success() {
            return Err(OcrError::Recognition(format!(
                "tesseract failed (exit code {}): {}",
                output.status.code().unwrap_or(-1),
                String::from_utf8_lossy(&output.stderr).trim()
            )));
        }

        let text = String::from_utf8_lossy(&output.stdout).into_owned();
        debug!("tesseract returned {} bytes", text.len());
        Ok(text)
    }
}

/// Check if tesseract is available on the system.
pub fn is_tesseract_available(tesseract_path: &str) -> bool {
    Command::new(tesseract_path)
        .arg("--version")
        .output()
        .map(|o| o.status.success())
        .unwrap_or(false)
}

/// Installed language codes from `tesseract --list-langs`.
fn list_languages(tesseract_path: &str) -> Option<Vec<String>> {
    let output = Command::new(tesseract_path)
        .arg("--list-langs")
        .output()
        .ok()
        .filter(|o| o.status.success())?;

    Some(parse_language_list(&String::from_utf8_lossy(&output.stdout)))
}

/// The first line is a header ("List of available languages ...").
fn parse_language_list(stdout: &str) -> Vec<String> {
    stdout
        .lines()
        .skip(1)
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_is_tesseract_available_invalid_path() {
        assert!(!is_tesseract_available("/nonexistent/tesseract"));
    }

    #[test]
    fn test_new_fails_without_executable() {
        let config = OcrConfig {
            tesseract_path: "/nonexistent/tesseract".to_string(),
            ..OcrConfig::default()
        };
        assert!(matches!(
            TesseractEngine::new(&config),
            Err(OcrError::Unavailable(_))
        ));
    }

    #[test]
    fn test_parse_language_list() {
        let stdout = "List of available languages in \"/usr/share/tessdata/\" (3):\neng\nosd\npor\n";
        assert_eq!(parse_language_list(stdout), vec!["eng", "osd", "por"]);
    }

    #[test]
    fn test_supports_listed_languages_only() {
        let engine = TesseractEngine {
            path: "tesseract".to_string(),
            languages: Some(vec!["eng".to_string()]),
        };
        let config = OcrConfig::default();
        assert!(!engine.supports(&config.primary));
        assert!(engine.supports(&config.fallback));

        let unknown = TesseractEngine {
            languages: None,
            ..engine.clone()
        };
        assert!(unknown.supports(&config.primary));
    }

    #[test]
    fn test_unsupported_language_is_unavailable() {
        let engine = TesseractEngine {
            path: "/nonexistent/tesseract".to_string(),
            languages: Some(Vec::new()),
        };
        let image = DynamicImage::new_luma8(8, 8);
        assert!(matches!(
            engine.recognize(&image, &OcrConfig::default().primary),
            Err(OcrError::Unavailable(_))
        ));
    }
}
