//! Sdamgia Client Library
//!
//! An async client for the sdamgia.ru educational problem bank. It fetches
//! problem, listing, and catalog pages, extracts structured records from
//! their HTML, optionally recognizes formula images as LaTeX through a
//! pluggable OCR collaborator, and renders problems as LaTeX/HTML export
//! documents.
//!
//! # Architecture
//!
//! - [`client`] - the HTTP client and all site operations
//! - [`extract`] - pure HTML-to-record extraction
//! - [`ocr`] - the formula OCR seam and image fan-out
//! - [`export`] - LaTeX/HTML document rendering
//! - [`types`] - value records and wire enums
//!
//! # Example
//!
//! ```no_run
//! use sdamgia::{GiaType, SdamgiaClient, Subject};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let client = SdamgiaClient::new(GiaType::Ege, Subject::Math)?;
//! let ids = client.search("клетчатой бумаге").await?;
//! for id in ids.iter().take(3) {
//!     let problem = client.get_problem(*id).await?;
//!     println!("{}: {}", id, problem.answer);
//! }
//! # Ok(())
//! # }
//! ```

// Clippy lints - strict for library code
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod client;
pub mod export;
pub mod extract;
pub mod ocr;
pub mod types;

// Re-export commonly used types
pub use client::{ClientError, Scope, SdamgiaClient};
pub use export::{ExportError, problem_to_html, problem_to_latex, write_html, write_latex};
pub use extract::ExtractError;
pub use ocr::{LatexOcr, OcrError};
pub use types::{
    BASE_DOMAIN, Category, GiaType, PdfOptions, PdfVariant, Problem, ProblemPart, Subject,
    TestSpec, Topic,
};
