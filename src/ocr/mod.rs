//! Formula OCR seam.
//!
//! The recognizer itself (pix2tex or anything else) lives outside this
//! crate; it plugs in through [`LatexOcr`]. This module owns the part the
//! client needs: fetching a part's formula images with bounded fan-out and
//! mapping each image URL to its recognized LaTeX, wrapped in `$...$`.

mod error;

pub use error::OcrError;

use std::collections::HashMap;

use async_trait::async_trait;
use futures_util::TryStreamExt;
use futures_util::stream::{self, StreamExt};
use tracing::debug;

/// How many formula images are fetched in flight at once.
const FETCH_CONCURRENCY: usize = 4;

/// External LaTeX OCR collaborator.
///
/// Implementations receive raw image bytes (the site serves formulas as
/// SVG) and return the recognized LaTeX without surrounding dollar signs.
///
/// # Object Safety
///
/// Uses `async_trait` so the client can take `&dyn LatexOcr`.
#[async_trait]
pub trait LatexOcr: Send + Sync {
    /// Recognizes the formula on `image`.
    ///
    /// # Errors
    ///
    /// Returns [`OcrError`] when recognition fails; use
    /// [`OcrError::model`] to wrap implementation-specific failures.
    async fn recognize(&self, image: &[u8]) -> Result<String, OcrError>;
}

/// Fetches every formula image in `urls` and recognizes it through `ocr`.
///
/// Fetches run concurrently (bounded); recognition runs sequentially in
/// document order. Each result is wrapped as `$...$` and keyed by the
/// image URL.
///
/// # Errors
///
/// Fails on the first fetch or recognition error.
pub(crate) async fn recognize_formulas(
    http: &reqwest::Client,
    urls: &[String],
    ocr: &dyn LatexOcr,
) -> Result<HashMap<String, String>, OcrError> {
    let images: Vec<(String, Vec<u8>)> = stream::iter(urls.iter().cloned())
        .map(|url| async move { fetch_image(http, url).await })
        .buffered(FETCH_CONCURRENCY)
        .try_collect()
        .await?;

    let mut latex_by_url = HashMap::with_capacity(images.len());
    for (url, bytes) in images {
        debug!(%url, bytes = bytes.len(), "recognizing formula image");
        let latex = ocr.recognize(&bytes).await?;
        latex_by_url.insert(url, format!("${latex}$"));
    }
    Ok(latex_by_url)
}

async fn fetch_image(http: &reqwest::Client, url: String) -> Result<(String, Vec<u8>), OcrError> {
    let response = http
        .get(&url)
        .send()
        .await
        .map_err(|e| OcrError::fetch(&url, e))?;
    let status = response.status();
    if !status.is_success() {
        return Err(OcrError::http_status(url, status.as_u16()));
    }
    let bytes = response
        .bytes()
        .await
        .map_err(|e| OcrError::fetch(&url, e))?;
    Ok((url, bytes.to_vec()))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    /// Recognizer that echoes the image length, for plumbing tests.
    struct LengthOcr;

    #[async_trait]
    impl LatexOcr for LengthOcr {
        async fn recognize(&self, image: &[u8]) -> Result<String, OcrError> {
            Ok(format!("len_{}", image.len()))
        }
    }

    /// Recognizer that always fails.
    struct FailingOcr;

    #[async_trait]
    impl LatexOcr for FailingOcr {
        async fn recognize(&self, _image: &[u8]) -> Result<String, OcrError> {
            Err(OcrError::model("model not loaded"))
        }
    }

    #[tokio::test]
    async fn test_recognize_formulas_empty_url_list() {
        let http = reqwest::Client::new();
        let map = recognize_formulas(&http, &[], &LengthOcr).await.unwrap();
        assert!(map.is_empty());
    }

    #[tokio::test]
    async fn test_recognize_formulas_fetch_failure_fails_whole_call() {
        // Unroutable per RFC 5737; the fetch must error, not hang.
        let urls = vec!["http://192.0.2.1:9/formula.svg".to_string()];
        let http = reqwest::Client::builder()
            .timeout(std::time::Duration::from_millis(500))
            .build()
            .unwrap();
        let result = recognize_formulas(&http, &urls, &LengthOcr).await;
        assert!(result.is_err());
    }

    #[test]
    fn test_model_error_display() {
        let error = OcrError::model("model not loaded");
        assert!(error.to_string().contains("model not loaded"));
    }
}
