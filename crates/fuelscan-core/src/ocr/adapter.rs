//! Primary/fallback language handling around an [`OcrEngine`].

use image::DynamicImage;
use tracing::{debug, info, warn};

use super::{create_engine, OcrEngine};
use crate::error::OcrError;
use crate::models::config::{LanguageModel, OcrConfig, ScanConfig};

/// Characters of recognized text shown at debug level.
const PREVIEW_CHARS: usize = 500;

/// Text recognized by the adapter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OcrOutput {
    pub text: String,
    /// Code of the language model that produced `text`.
    pub language: String,
}

/// Runs OCR with the primary language and retries once with the fallback.
pub struct OcrAdapter {
    engine: Option<Box<dyn OcrEngine>>,
    primary: LanguageModel,
    fallback: LanguageModel,
}

impl OcrAdapter {
    pub fn new(engine: Option<Box<dyn OcrEngine>>, config: &OcrConfig) -> Self {
        Self {
            engine,
            primary: config.primary.clone(),
            fallback: config.fallback.clone(),
        }
    }

    /// Resolve the backend from configuration.
    pub fn from_config(config: &ScanConfig) -> Self {
        Self::new(create_engine(config), &config.ocr)
    }

    pub fn is_available(&self) -> bool {
        self.engine.is_some()
    }

    pub fn engine_name(&self) -> Option<&'static str> {
        self.engine.as_ref().map(|e| e.name())
    }

    /// Language codes the engine has models for, primary first.
    pub fn languages(&self) -> Vec<String> {
        let Some(engine) = &self.engine else {
            return Vec::new();
        };
        [&self.primary, &self.fallback]
            .into_iter()
            .filter(|lang| engine.supports(lang))
            .map(|lang| lang.code.clone())
            .collect()
    }

    /// Recognize `image`; an engine error with the primary language is
    /// retried once with the fallback language.
    pub fn recognize(&self, image: &DynamicImage) -> Result<OcrOutput, OcrError> {
        let engine = self
            .engine
            .as_ref()
            .ok_or_else(|| OcrError::Unavailable("no OCR engine configured".to_string()))?;

        let (text, language) = match engine.recognize(image, &self.primary) {
            Ok(text) => (text, &self.primary),
            Err(e) => {
                warn!(
                    "OCR with '{}' failed, retrying with '{}': {}",
                    self.primary.code, self.fallback.code, e
                );
                (engine.recognize(image, &self.fallback)?, &self.fallback)
            }
        };

        info!(
            "OCR complete ({}, {}): {} characters",
            engine.name(),
            language.code,
            text.chars().count()
        );
        debug!(
            "OCR text preview:\n{}",
            text.chars().take(PREVIEW_CHARS).collect::<String>()
        );

        Ok(OcrOutput {
            text,
            language: language.code.clone(),
        })
    }
}

impl std::fmt::Debug for OcrAdapter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OcrAdapter")
            .field("engine", &self.engine_name())
            .field("languages", &[&self.primary.code, &self.fallback.code])
            .finish()
    }
}

#[cfg(test)]
pub(crate) mod testing {
    //! Scripted engines for tests.

    use super::*;
    use std::sync::{Arc, Mutex};

    /// Answers per language code: recognized text, or an engine error message.
    pub type Script = Vec<(&'static str, std::result::Result<&'static str, &'static str>)>;

    /// Engine answering from a fixed script per language code.
    pub struct ScriptedEngine {
        answers: Script,
        calls: Mutex<Vec<String>>,
    }

    impl ScriptedEngine {
        pub fn new(answers: Script) -> Self {
            Self {
                answers,
                calls: Mutex::new(Vec::new()),
            }
        }

        /// Language codes recognized so far, in call order.
        pub fn calls(&self) -> Vec<String> {
            self.calls.lock().unwrap().clone()
        }
    }

    impl OcrEngine for ScriptedEngine {
        fn name(&self) -> &'static str {
            "scripted"
        }

        fn supports(&self, language: &LanguageModel) -> bool {
            self.answers.iter().any(|(code, _)| *code == language.code)
        }

        fn recognize(&self, _image: &DynamicImage, language: &LanguageModel) -> Result<String, OcrError> {
            self.calls.lock().unwrap().push(language.code.clone());
            match self.answers.iter().find(|(code, _)| *code == language.code) {
                Some((_, Ok(text))) => Ok(text.to_string()),
                Some((_, Err(message))) => Err(OcrError::Recognition(message.to_string())),
                None => Err(OcrError::Unavailable(format!("no model for {}", language.code))),
            }
        }
    }

    /// Boxable handle that lets a test inspect the engine afterwards.
    pub struct Shared(pub Arc<ScriptedEngine>);

    impl OcrEngine for Shared {
        fn name(&self) -> &'static str {
            self.0.name()
        }

        fn supports(&self, language: &LanguageModel) -> bool {
            self.0.supports(language)
        }

        fn recognize(&self, image: &DynamicImage, language: &LanguageModel) -> Result<String, OcrError> {
            self.0.recognize(image, language)
        }
    }

    /// Engine that fails the test if it is ever called.
    pub struct PanickingEngine;

    impl OcrEngine for PanickingEngine {
        fn name(&self) -> &'static str {
            "panicking"
        }

        fn supports(&self, _language: &LanguageModel) -> bool {
            true
        }

        fn recognize(&self, _image: &DynamicImage, _language: &LanguageModel) -> Result<String, OcrError> {
            panic!("OCR must not be invoked");
        }
    }
}
