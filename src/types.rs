//! Value records and wire enums for the sdamgia problem bank.
//!
//! Every record here is an immutable snapshot populated by a single page
//! fetch. The enums carry the exact slugs the site uses in its subdomains
//! and query parameters.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Apex domain shared by all subject/exam subdomains.
pub const BASE_DOMAIN: &str = "sdamgia.ru";

/// GIA exam category (state graduation exam level).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GiaType {
    /// Basic state exam (9th grade).
    Oge,
    /// Unified state exam (11th grade).
    Ege,
}

impl GiaType {
    /// Returns the subdomain slug (`"oge"` / `"ege"`).
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Oge => "oge",
            Self::Ege => "ege",
        }
    }
}

impl fmt::Display for GiaType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for GiaType {
    type Err = UnknownSlug;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "oge" => Ok(Self::Oge),
            "ege" => Ok(Self::Ege),
            other => Err(UnknownSlug::new("gia type", other)),
        }
    }
}

/// Subject site selector. Each variant maps to one subject subdomain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Subject {
    Math,
    /// Basic-level mathematics (EGE only on the live site).
    #[serde(rename = "mathb")]
    MathBase,
    #[serde(rename = "phys")]
    Physics,
    #[serde(rename = "inf")]
    Informatics,
    #[serde(rename = "bio")]
    Biology,
    #[serde(rename = "lit")]
    Literature,
    #[serde(rename = "hist")]
    History,
    #[serde(rename = "chem")]
    Chemistry,
    #[serde(rename = "geo")]
    Geography,
    #[serde(rename = "soc")]
    SocialScience,
    #[serde(rename = "rus")]
    Russian,
    #[serde(rename = "en")]
    English,
    #[serde(rename = "de")]
    German,
    #[serde(rename = "fr")]
    French,
    #[serde(rename = "sp")]
    Spanish,
}

impl Subject {
    /// Returns the subdomain slug used by the site (e.g. `"math"`, `"phys"`).
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Math => "math",
            Self::MathBase => "mathb",
            Self::Physics => "phys",
            Self::Informatics => "inf",
            Self::Biology => "bio",
            Self::Literature => "lit",
            Self::History => "hist",
            Self::Chemistry => "chem",
            Self::Geography => "geo",
            Self::SocialScience => "soc",
            Self::Russian => "rus",
            Self::English => "en",
            Self::German => "de",
            Self::French => "fr",
            Self::Spanish => "sp",
        }
    }
}

impl fmt::Display for Subject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Subject {
    type Err = UnknownSlug;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "math" => Ok(Self::Math),
            "mathb" => Ok(Self::MathBase),
            "phys" => Ok(Self::Physics),
            "inf" => Ok(Self::Informatics),
            "bio" => Ok(Self::Biology),
            "lit" => Ok(Self::Literature),
            "hist" => Ok(Self::History),
            "chem" => Ok(Self::Chemistry),
            "geo" => Ok(Self::Geography),
            "soc" => Ok(Self::SocialScience),
            "rus" => Ok(Self::Russian),
            "en" => Ok(Self::English),
            "de" => Ok(Self::German),
            "fr" => Ok(Self::French),
            "sp" => Ok(Self::Spanish),
            other => Err(UnknownSlug::new("subject", other)),
        }
    }
}

/// Error returned when parsing an unrecognized slug into [`GiaType`] or [`Subject`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown {kind} slug: {slug}")]
pub struct UnknownSlug {
    kind: &'static str,
    slug: String,
}

impl UnknownSlug {
    fn new(kind: &'static str, slug: &str) -> Self {
        Self {
            kind,
            slug: slug.to_string(),
        }
    }
}

/// One half of a problem: either the condition or the solution.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProblemPart {
    /// Plain text with formula images substituted by recognized LaTeX.
    /// Empty unless OCR was requested for the fetch.
    pub text: String,
    /// Raw HTML fragment with all image URLs absolutized.
    pub html: String,
    /// Formula image URLs first, then the remaining image URLs.
    pub image_urls: Vec<String>,
}

/// A single problem-bank entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Problem {
    pub gia_type: GiaType,
    pub subject: Subject,
    pub problem_id: u64,
    /// Absent when the page carries no condition block.
    pub condition: Option<ProblemPart>,
    /// Absent when the page carries no solution block.
    pub solution: Option<ProblemPart>,
    /// Answer line with the site's label stripped; empty when not published.
    pub answer: String,
    /// Topic (task number) this problem is filed under, when shown.
    pub topic_id: Option<u64>,
    /// Ids of analogous problems linked from the page.
    pub analog_ids: Vec<u64>,
}

impl Problem {
    /// Canonical URL of the problem on the live site.
    #[must_use]
    pub fn url(&self) -> String {
        format!(
            "https://{}-{}.{}/problem?id={}",
            self.subject, self.gia_type, BASE_DOMAIN, self.problem_id
        )
    }
}

/// A category inside a catalog topic.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub category_id: u64,
    pub category_name: String,
}

/// A catalog topic (task number) with its categories.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Topic {
    pub topic_id: u64,
    pub topic_name: String,
    /// True for supplementary topics (the site marks their number with "Д").
    pub additional: bool,
    pub categories: Vec<Category>,
}

/// Page layout of a site-generated PDF.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum PdfVariant {
    /// Standard vertical layout.
    #[default]
    Normal,
    /// Large margins.
    LargeMargins,
    /// Large font.
    LargeFont,
    /// Horizontal layout.
    Horizontal,
}

impl PdfVariant {
    /// Value of the `pdf` query parameter for this layout.
    #[must_use]
    pub fn as_param(self) -> &'static str {
        match self {
            Self::Normal => "true",
            Self::LargeMargins => "h",
            Self::LargeFont => "z",
            Self::Horizontal => "m",
        }
    }
}

/// Options for [`generate_pdf`](crate::SdamgiaClient::generate_pdf).
///
/// Field names mirror the checkboxes on the site's print page.
#[derive(Debug, Clone, Default)]
pub struct PdfOptions {
    /// Include solutions.
    pub solutions: bool,
    /// Include problem numbers.
    pub problem_ids: bool,
    /// Include answers.
    pub answers: bool,
    /// Include the answer key table.
    pub answers_table: bool,
    /// Include grading criteria.
    pub criteria: bool,
    /// Include the exam instruction page.
    pub instruction: bool,
    /// Footer text.
    pub footer: String,
    /// Document title.
    pub title: String,
    pub variant: PdfVariant,
}

/// How many problems `generate_test` draws from each category.
#[derive(Debug, Clone)]
pub enum TestSpec {
    /// The same count from every topic in the subject catalog.
    Uniform(u32),
    /// Explicit per-topic counts: `(topic number, count)`.
    PerTopic(Vec<(u32, u32)>),
}

impl Default for TestSpec {
    fn default() -> Self {
        Self::Uniform(1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_subject_slug_round_trip() {
        let subjects = [
            Subject::Math,
            Subject::MathBase,
            Subject::Physics,
            Subject::Informatics,
            Subject::Biology,
            Subject::Literature,
            Subject::History,
            Subject::Chemistry,
            Subject::Geography,
            Subject::SocialScience,
            Subject::Russian,
            Subject::English,
            Subject::German,
            Subject::French,
            Subject::Spanish,
        ];
        for subject in subjects {
            let parsed: Subject = subject.as_str().parse().unwrap_or_else(|_| {
                panic!("slug '{}' must parse back", subject.as_str());
            });
            assert_eq!(parsed, subject);
        }
    }

    #[test]
    fn test_gia_type_slug_round_trip() {
        assert_eq!("oge".parse::<GiaType>(), Ok(GiaType::Oge));
        assert_eq!("ege".parse::<GiaType>(), Ok(GiaType::Ege));
        assert!("gve".parse::<GiaType>().is_err());
    }

    #[test]
    fn test_subject_serde_uses_slug() {
        let json = serde_json::to_string(&Subject::MathBase).unwrap_or_default();
        assert_eq!(json, "\"mathb\"");
        let json = serde_json::to_string(&Subject::SocialScience).unwrap_or_default();
        assert_eq!(json, "\"soc\"");
    }

    #[test]
    fn test_problem_url() {
        let problem = Problem {
            gia_type: GiaType::Ege,
            subject: Subject::Math,
            problem_id: 26596,
            condition: None,
            solution: None,
            answer: String::new(),
            topic_id: None,
            analog_ids: Vec::new(),
        };
        assert_eq!(problem.url(), "https://math-ege.sdamgia.ru/problem?id=26596");
    }

    #[test]
    fn test_pdf_variant_params() {
        assert_eq!(PdfVariant::Normal.as_param(), "true");
        assert_eq!(PdfVariant::LargeMargins.as_param(), "h");
        assert_eq!(PdfVariant::LargeFont.as_param(), "z");
        assert_eq!(PdfVariant::Horizontal.as_param(), "m");
    }
}
