//! Reading distances from activity screenshots.

pub mod distance;
pub mod ollama_client;
pub mod prompts;

pub use distance::{distance_from_lines, number_before_km};
pub use ollama_client::OllamaClient;
pub use prompts::PromptBuilder;

use async_trait::async_trait;
use base64::Engine;
use rust_decimal::Decimal;
use serde::Deserialize;
use tracing::debug;

use crate::Result;
use crate::traits::DistanceExtractor;

/// Turns an image into its text lines, in reading order.
#[async_trait]
pub trait TextRecognizer: Send + Sync {
    async fn recognize_lines(&self, image: &[u8]) -> Result<Vec<String>>;
}

#[derive(Debug, Deserialize)]
struct RecognizedText {
    #[serde(default)]
    lines: Vec<String>,
}

#[async_trait]
impl TextRecognizer for OllamaClient {
    async fn recognize_lines(&self, image: &[u8]) -> Result<Vec<String>> {
        let image_base64 = base64::engine::general_purpose::STANDARD.encode(image);
        let response = self
            .generate_json_from_image(
                &PromptBuilder::system_prompt(),
                &PromptBuilder::user_prompt_image(),
                &image_base64,
                None,
            )
            .await?;

        let recognized: RecognizedText = serde_json::from_str(&response)?;
        Ok(recognized.lines)
    }
}

/// [`DistanceExtractor`] that recognises text first and then looks for the
/// one `km` figure in it.
pub struct OcrDistanceExtractor<R> {
    recognizer: R,
}

impl<R: TextRecognizer> OcrDistanceExtractor<R> {
    pub fn new(recognizer: R) -> Self {
        Self { recognizer }
    }
}

#[async_trait]
impl<R: TextRecognizer> DistanceExtractor for OcrDistanceExtractor<R> {
    async fn extract_distance(&self, image: &[u8]) -> Result<Decimal> {
        let lines = self.recognizer.recognize_lines(image).await?;
        let distance = distance_from_lines(&lines);
        debug!(
            "Recognised {} text lines, distance {}",
            lines.len(),
            distance
        );
        Ok(distance)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct CannedText(Vec<&'static str>);

    #[async_trait]
    impl TextRecognizer for CannedText {
        async fn recognize_lines(&self, _image: &[u8]) -> Result<Vec<String>> {
            Ok(self.0.iter().map(|s| s.to_string()).collect())
        }
    }

    #[tokio::test]
    async fn test_extracts_distance_from_recognized_text() {
        let extractor = OcrDistanceExtractor::new(CannedText(vec!["Run", "7.5 km", "6:10 /km"]));
        let distance = extractor.extract_distance(b"png").await.unwrap();
        assert_eq!(distance.to_string(), "7.5");
    }

    #[tokio::test]
    async fn test_no_text_means_zero() {
        let extractor = OcrDistanceExtractor::new(CannedText(vec![]));
        assert!(extractor.extract_distance(b"png").await.unwrap().is_zero());
    }

    #[test]
    fn test_recognized_text_tolerates_missing_lines() {
        let parsed: RecognizedText = serde_json::from_str("{}").unwrap();
        assert!(parsed.lines.is_empty());
    }
}
