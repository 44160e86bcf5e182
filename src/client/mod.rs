//! Async client for the sdamgia problem bank.
//!
//! A [`SdamgiaClient`] is bound to a default [`GiaType`] + [`Subject`] pair
//! (which select the site subdomain) and issues plain HTTP GETs against it.
//! Page HTML is handed to the [`extract`](crate::extract) module; nothing
//! here holds a parsed document across an await point.
//!
//! # Example
//!
//! ```no_run
//! use sdamgia::{GiaType, SdamgiaClient, Subject};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let client = SdamgiaClient::new(GiaType::Ege, Subject::Math)?;
//! let problem = client.get_problem(26596).await?;
//! println!("answer: {}", problem.answer);
//! # Ok(())
//! # }
//! ```

mod error;
mod http;

pub use error::ClientError;

use reqwest::header::LOCATION;
use tracing::debug;
use url::Url;

use crate::extract::{self, PartFragment};
use crate::ocr::LatexOcr;
use crate::types::{
    BASE_DOMAIN, Category, GiaType, PdfOptions, Problem, ProblemPart, Subject, TestSpec, Topic,
};

/// Per-call override of the client's default GIA type and subject.
///
/// Replaces mutating client defaults around a call: build a scoped clone
/// instead and the original client stays untouched.
#[derive(Debug, Clone, Copy, Default)]
pub struct Scope {
    pub gia_type: Option<GiaType>,
    pub subject: Option<Subject>,
}

impl Scope {
    /// Scope overriding only the GIA type.
    #[must_use]
    pub fn gia(gia_type: GiaType) -> Self {
        Self {
            gia_type: Some(gia_type),
            subject: None,
        }
    }

    /// Scope overriding only the subject.
    #[must_use]
    pub fn subject(subject: Subject) -> Self {
        Self {
            gia_type: None,
            subject: Some(subject),
        }
    }

    /// Scope overriding both.
    #[must_use]
    pub fn new(gia_type: GiaType, subject: Subject) -> Self {
        Self {
            gia_type: Some(gia_type),
            subject: Some(subject),
        }
    }
}

/// Client for one problem-bank site.
///
/// Cheap to clone; clones share the underlying connection pool.
#[derive(Debug, Clone)]
pub struct SdamgiaClient {
    gia_type: GiaType,
    subject: Subject,
    /// Full scheme://host override used by tests; `None` means the
    /// canonical `https://{subject}-{gia}.sdamgia.ru`.
    base_url_override: Option<Url>,
    http: reqwest::Client,
}

impl SdamgiaClient {
    /// Creates a client for the given GIA type and subject.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Build`] when HTTP client construction fails.
    pub fn new(gia_type: GiaType, subject: Subject) -> Result<Self, ClientError> {
        Ok(Self {
            gia_type,
            subject,
            base_url_override: None,
            http: http::build_http_client()?,
        })
    }

    /// Creates a client pointed at a custom base URL (for tests against a
    /// mock server).
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Build`] on HTTP client construction failure
    /// or [`ClientError::InvalidBaseUrl`] when `base_url` does not parse.
    pub fn with_base_url(
        gia_type: GiaType,
        subject: Subject,
        base_url: &str,
    ) -> Result<Self, ClientError> {
        let base = Url::parse(base_url).map_err(|_| ClientError::invalid_base_url(base_url))?;
        Ok(Self {
            gia_type,
            subject,
            base_url_override: Some(base),
            http: http::build_http_client()?,
        })
    }

    /// Returns a clone of this client with defaults overridden by `scope`.
    #[must_use]
    pub fn scoped(&self, scope: Scope) -> Self {
        let mut client = self.clone();
        if let Some(gia_type) = scope.gia_type {
            client.gia_type = gia_type;
        }
        if let Some(subject) = scope.subject {
            client.subject = subject;
        }
        client
    }

    /// The client's default GIA type.
    #[must_use]
    pub fn gia_type(&self) -> GiaType {
        self.gia_type
    }

    /// The client's default subject.
    #[must_use]
    pub fn subject(&self) -> Subject {
        self.subject
    }

    /// Base site URL for the current GIA type and subject.
    #[must_use]
    pub fn base_url(&self) -> String {
        match &self.base_url_override {
            Some(url) => url.as_str().trim_end_matches('/').to_string(),
            None => format!("https://{}-{}.{}", self.subject, self.gia_type, BASE_DOMAIN),
        }
    }

    fn base(&self) -> Result<Url, ClientError> {
        let base_url = self.base_url();
        Url::parse(&base_url).map_err(|_| ClientError::invalid_base_url(base_url))
    }

    /// Fetches a problem by id, without formula OCR (`text` fields stay
    /// empty).
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Extract`] when the page carries no problem
    /// container (unknown id), or a network/status error.
    #[tracing::instrument(skip(self), fields(subject = %self.subject, gia = %self.gia_type))]
    pub async fn get_problem(&self, problem_id: u64) -> Result<Problem, ClientError> {
        let fields = self.fetch_problem_fields(problem_id).await?;
        Ok(self.assemble_problem(
            problem_id,
            fields,
            |fragment| ProblemPart {
                text: String::new(),
                html: fragment.html,
                image_urls: fragment.image_urls,
            },
        ))
    }

    /// Fetches a problem by id and runs formula OCR through `ocr`,
    /// producing plain-text condition/solution with `$...$` LaTeX
    /// substituted for each formula image.
    ///
    /// # Errors
    ///
    /// In addition to the [`get_problem`](Self::get_problem) errors,
    /// returns [`ClientError::Ocr`] when an image fetch or the recognizer
    /// fails.
    #[tracing::instrument(skip(self, ocr), fields(subject = %self.subject, gia = %self.gia_type))]
    pub async fn get_problem_with_ocr(
        &self,
        problem_id: u64,
        ocr: &dyn LatexOcr,
    ) -> Result<Problem, ClientError> {
        let page_url = self.problem_url(problem_id);
        let fields = self.fetch_problem_fields(problem_id).await?;

        let condition = match &fields.condition {
            Some(fragment) => Some(self.ocr_part(fragment, ocr, &page_url).await?),
            None => None,
        };
        let solution = match &fields.solution {
            Some(fragment) => Some(self.ocr_part(fragment, ocr, &page_url).await?),
            None => None,
        };

        Ok(Problem {
            gia_type: self.gia_type,
            subject: self.subject,
            problem_id,
            condition,
            solution,
            answer: fields.answer,
            topic_id: fields.topic_id,
            analog_ids: fields.analog_ids,
        })
    }

    /// Searches problems by a free-text query, walking all result pages.
    ///
    /// # Errors
    ///
    /// Returns a network or HTTP status error from any page fetch.
    #[tracing::instrument(skip(self), fields(subject = %self.subject, gia = %self.gia_type))]
    pub async fn search(&self, query: &str) -> Result<Vec<u64>, ClientError> {
        self.paginate("/search", &[("search", query.to_string())])
            .await
    }

    /// Lists all problem ids filed under a category theme.
    ///
    /// # Errors
    ///
    /// Returns a network or HTTP status error from any page fetch.
    #[tracing::instrument(skip(self), fields(subject = %self.subject, gia = %self.gia_type))]
    pub async fn get_theme(&self, theme_id: u64) -> Result<Vec<u64>, ClientError> {
        self.paginate("/test", &[("theme", theme_id.to_string())])
            .await
    }

    /// Lists the problem ids included in a test.
    ///
    /// # Errors
    ///
    /// Returns a network or HTTP status error.
    #[tracing::instrument(skip(self), fields(subject = %self.subject, gia = %self.gia_type))]
    pub async fn get_test(&self, test_id: u64) -> Result<Vec<u64>, ClientError> {
        let (_, html) = self
            .get_html("/test", &[("id", test_id.to_string())])
            .await?;
        Ok(extract::extract_problem_ids(&html))
    }

    /// Fetches the subject's topic/category catalog.
    ///
    /// # Errors
    ///
    /// Returns a network or HTTP status error.
    #[tracing::instrument(skip(self), fields(subject = %self.subject, gia = %self.gia_type))]
    pub async fn get_catalog(&self) -> Result<Vec<Topic>, ClientError> {
        let (_, html) = self.get_html("/prob_catalog", &[]).await?;
        Ok(extract::extract_catalog(&html)
            .into_iter()
            .map(|topic| Topic {
                topic_id: topic.topic_id,
                topic_name: topic.topic_name,
                additional: topic.additional,
                categories: topic
                    .categories
                    .into_iter()
                    .map(|(category_id, category_name)| Category {
                        category_id,
                        category_name,
                    })
                    .collect(),
            })
            .collect())
    }

    /// Generates a test on the site and returns its id.
    ///
    /// [`TestSpec::Uniform`] draws the same number of problems from every
    /// topic of the catalog (one extra catalog fetch);
    /// [`TestSpec::PerTopic`] passes explicit per-topic counts.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::MissingLocation`] /
    /// [`ClientError::InvalidLocation`] when the site does not answer with
    /// a redirect to the new test.
    #[tracing::instrument(skip(self), fields(subject = %self.subject, gia = %self.gia_type))]
    pub async fn generate_test(&self, spec: &TestSpec) -> Result<u64, ClientError> {
        let mut query: Vec<(String, String)> = vec![("a".to_string(), "generate".to_string())];
        match spec {
            TestSpec::Uniform(count) => {
                let topics = self.get_catalog().await?.len();
                for i in 1..=topics {
                    query.push((format!("prob{i}"), count.to_string()));
                }
            }
            TestSpec::PerTopic(counts) => {
                for (topic, count) in counts {
                    query.push((format!("prob{topic}"), count.to_string()));
                }
            }
        }

        let (url, location) = self.get_redirect_location("/test", &query).await?;
        extract::problem_id_from_href(&location)
            .ok_or_else(|| ClientError::invalid_location(url, location))
    }

    /// Asks the site to render a test as PDF and returns the document URL.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::MissingLocation`] when the site does not
    /// answer with a redirect to the rendered document.
    #[tracing::instrument(skip(self, options), fields(subject = %self.subject, gia = %self.gia_type))]
    pub async fn generate_pdf(
        &self,
        test_id: u64,
        options: &PdfOptions,
    ) -> Result<String, ClientError> {
        let mut query: Vec<(String, String)> = vec![
            ("id".to_string(), test_id.to_string()),
            ("print".to_string(), "true".to_string()),
            ("pdf".to_string(), options.variant.as_param().to_string()),
        ];
        let flags = [
            ("sol", options.solutions),
            ("num", options.problem_ids),
            ("ans", options.answers),
            ("key", options.answers_table),
            ("crit", options.criteria),
            ("pre", options.instruction),
        ];
        for (name, enabled) in flags {
            if enabled {
                query.push((name.to_string(), "true".to_string()));
            }
        }
        if !options.footer.is_empty() {
            query.push(("dcol".to_string(), options.footer.clone()));
        }
        if !options.title.is_empty() {
            query.push(("tt".to_string(), options.title.clone()));
        }

        let (url, location) = self.get_redirect_location("/test", &query).await?;
        let base = self.base()?;
        base.join(&location)
            .map(|joined| joined.to_string())
            .map_err(|_| ClientError::invalid_location(url, location))
    }

    fn problem_url(&self, problem_id: u64) -> String {
        format!("{}/problem?id={problem_id}", self.base_url())
    }

    async fn ocr_part(
        &self,
        fragment: &PartFragment,
        ocr: &dyn LatexOcr,
        page_url: &str,
    ) -> Result<ProblemPart, ClientError> {
        let latex = crate::ocr::recognize_formulas(&self.http, &fragment.formula_urls, ocr)
            .await
            .map_err(|e| ClientError::ocr(page_url, e))?;
        Ok(ProblemPart {
            text: extract::render_part_text(&fragment.html, &latex),
            html: fragment.html.clone(),
            image_urls: fragment.image_urls.clone(),
        })
    }

    async fn fetch_problem_fields(
        &self,
        problem_id: u64,
    ) -> Result<extract::ProblemFields, ClientError> {
        let (url, html) = self
            .get_html("/problem", &[("id", problem_id.to_string())])
            .await?;
        let base = self.base()?;
        extract::extract_problem(&html, &base).map_err(|e| ClientError::extract(url, e))
    }

    fn assemble_problem(
        &self,
        problem_id: u64,
        fields: extract::ProblemFields,
        mut to_part: impl FnMut(PartFragment) -> ProblemPart,
    ) -> Problem {
        Problem {
            gia_type: self.gia_type,
            subject: self.subject,
            problem_id,
            condition: fields.condition.map(&mut to_part),
            solution: fields.solution.map(&mut to_part),
            answer: fields.answer,
            topic_id: fields.topic_id,
            analog_ids: fields.analog_ids,
        }
    }

    /// Walks numbered listing pages until one comes back empty or repeats
    /// an id. The repeat guard matters: past the last page the site keeps
    /// serving the final results page instead of an empty one.
    async fn paginate(
        &self,
        path: &str,
        params: &[(&str, String)],
    ) -> Result<Vec<u64>, ClientError> {
        let mut collected: Vec<u64> = Vec::new();
        let mut page: u32 = 1;
        loop {
            let mut query: Vec<(&str, String)> = params.to_vec();
            query.push(("page", page.to_string()));
            let (url, html) = self.get_html(path, &query).await?;

            let ids = extract::extract_problem_ids(&html);
            if ids.is_empty() {
                debug!(page, total = collected.len(), %url, "pagination done: empty page");
                return Ok(collected);
            }
            for id in ids {
                if collected.contains(&id) {
                    debug!(page, total = collected.len(), %url, "pagination done: repeated id");
                    return Ok(collected);
                }
                collected.push(id);
            }
            page += 1;
        }
    }

    /// GETs a page and returns `(final url, body)`. Non-2xx statuses are
    /// errors here; redirect-observing callers use
    /// [`get_redirect_location`](Self::get_redirect_location) instead.
    async fn get_html(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<(String, String), ClientError> {
        let request = self
            .http
            .get(format!("{}{path}", self.base_url()))
            .query(query)
            .build()
            .map_err(ClientError::build)?;
        let url = request.url().to_string();

        let response = self
            .http
            .execute(request)
            .await
            .map_err(|e| ClientError::network(&url, e))?;
        let status = response.status();
        debug!(%url, status = status.as_u16(), "GET");
        if !status.is_success() {
            return Err(ClientError::http_status(url, status.as_u16()));
        }

        let body = response
            .text()
            .await
            .map_err(|e| ClientError::network(&url, e))?;
        Ok((url, body))
    }

    /// GETs with redirects disabled and returns `(url, Location header)`.
    async fn get_redirect_location(
        &self,
        path: &str,
        query: &[(String, String)],
    ) -> Result<(String, String), ClientError> {
        let request = self
            .http
            .get(format!("{}{path}", self.base_url()))
            .query(query)
            .build()
            .map_err(ClientError::build)?;
        let url = request.url().to_string();

        let response = self
            .http
            .execute(request)
            .await
            .map_err(|e| ClientError::network(&url, e))?;
        debug!(%url, status = response.status().as_u16(), "GET (expecting redirect)");

        let location = response
            .headers()
            .get(LOCATION)
            .and_then(|value| value.to_str().ok())
            .map(ToString::to_string)
            .ok_or_else(|| ClientError::missing_location(&url))?;
        Ok((url, location))
    }
}
