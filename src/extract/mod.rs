//! HTML extraction for sdamgia pages.
//!
//! Everything here is a pure function from fetched HTML to owned records:
//! `scraper::Html` is not `Send`, so parsing must never straddle an await
//! point in the client. Selectors are compiled once at first use.
//!
//! Extraction is defensive: only the problem container itself is required,
//! every other node maps to `None` or an empty value when absent.

mod error;

pub use error::ExtractError;

use std::collections::HashMap;
use std::sync::LazyLock;

use regex::Regex;
use scraper::{ElementRef, Html, Selector};
use url::Url;

/// Compiles a selector at static init; panics on an invalid pattern.
fn compile_static_selector(pattern: &str) -> Selector {
    Selector::parse(pattern)
        .unwrap_or_else(|e| panic!("invalid static selector '{pattern}': {e}"))
}

/// Compiles a regex at static init; panics on an invalid pattern.
fn compile_static_regex(pattern: &str) -> Regex {
    Regex::new(pattern).unwrap_or_else(|e| panic!("invalid static regex '{pattern}': {e}"))
}

static PROB_MAINDIV: LazyLock<Selector> =
    LazyLock::new(|| compile_static_selector("div.prob_maindiv"));
static PBODY: LazyLock<Selector> = LazyLock::new(|| compile_static_selector("div.pbody"));
static SOLUTION: LazyLock<Selector> = LazyLock::new(|| compile_static_selector("div.solution"));
static ANSWER: LazyLock<Selector> = LazyLock::new(|| compile_static_selector("div.answer"));
static PROB_NUMS: LazyLock<Selector> = LazyLock::new(|| compile_static_selector("span.prob_nums"));
static MINOR_LINKS: LazyLock<Selector> =
    LazyLock::new(|| compile_static_selector("div.minor a"));
static ANCHOR: LazyLock<Selector> = LazyLock::new(|| compile_static_selector("a"));
static IMG: LazyLock<Selector> = LazyLock::new(|| compile_static_selector("img"));
static IMG_TEX: LazyLock<Selector> = LazyLock::new(|| compile_static_selector("img.tex"));
static CAT_CATEGORY: LazyLock<Selector> =
    LazyLock::new(|| compile_static_selector("div.cat_category"));
static CAT_TOPIC_NAME: LazyLock<Selector> = LazyLock::new(|| compile_static_selector("b.cat_name"));
static CAT_CHILD_NAME: LazyLock<Selector> = LazyLock::new(|| compile_static_selector("a.cat_name"));
static CAT_CHILDREN: LazyLock<Selector> =
    LazyLock::new(|| compile_static_selector("div.cat_children"));

static PROBLEM_ID_IN_HREF: LazyLock<Regex> = LazyLock::new(|| compile_static_regex(r"id=(\d+)"));
static LEADING_DIGITS: LazyLock<Regex> = LazyLock::new(|| compile_static_regex(r"\d+"));
static IMG_SRC_ATTR: LazyLock<Regex> = LazyLock::new(|| {
    compile_static_regex(r#"(?is)(<img\b[^>]*?\bsrc\s*=\s*["'])([^"']+)(["'])"#)
});

/// One extracted condition/solution fragment, before OCR text rendering.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PartFragment {
    /// Outer HTML of the fragment with image URLs absolutized.
    pub html: String,
    /// `img.tex` formula URLs in document order (absolutized).
    pub formula_urls: Vec<String>,
    /// Formula URLs first, then the remaining image URLs.
    pub image_urls: Vec<String>,
}

/// Structured fields pulled out of a `/problem?id=` page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProblemFields {
    pub condition: Option<PartFragment>,
    pub solution: Option<PartFragment>,
    pub answer: String,
    pub topic_id: Option<u64>,
    pub analog_ids: Vec<u64>,
}

/// Normalizes text pulled out of site HTML.
///
/// The site pads text with NBSPs and soft hyphens and renders minus as
/// U+2212; downstream consumers (LaTeX export in particular) want plain
/// ASCII forms.
#[must_use]
pub fn clean_text(text: &str) -> String {
    text.chars()
        .filter_map(|c| match c {
            '\u{00a0}' => Some(' '),
            '\u{00ad}' => None,
            '\u{2212}' => Some('-'),
            other => Some(other),
        })
        .collect()
}

/// Rewrites every `img src` in `fragment` to an absolute URL.
///
/// Already-absolute URLs are kept as-is; anything relative is joined
/// against `base`. Unjoinable srcs are left untouched.
#[must_use]
pub fn absolutize_images(fragment: &str, base: &Url) -> String {
    IMG_SRC_ATTR
        .replace_all(fragment, |caps: &regex::Captures<'_>| {
            format!("{}{}{}", &caps[1], absolutize_url(&caps[2], base), &caps[3])
        })
        .into_owned()
}

fn absolutize_url(src: &str, base: &Url) -> String {
    if Url::parse(src).is_ok() {
        return src.to_string();
    }
    match base.join(src) {
        Ok(joined) => joined.to_string(),
        Err(_) => src.to_string(),
    }
}

/// Extracts the structured problem fields from a `/problem?id=` page.
///
/// # Errors
///
/// Returns [`ExtractError::MissingNode`] when the page has no
/// `div.prob_maindiv` container, which is how the site renders an unknown
/// problem id.
pub fn extract_problem(html: &str, base: &Url) -> Result<ProblemFields, ExtractError> {
    let document = Html::parse_document(html);

    let problem_node = document
        .select(&PROB_MAINDIV)
        .next()
        .ok_or_else(|| ExtractError::missing_node("div.prob_maindiv"))?;

    // Condition is the first pbody of the whole page; the solution lives
    // inside the problem container, as div.solution on newer pages and as
    // the second pbody on older ones.
    let condition = document
        .select(&PBODY)
        .next()
        .map(|node| extract_part(node, base));
    let solution = problem_node
        .select(&SOLUTION)
        .next()
        .or_else(|| problem_node.select(&PBODY).nth(1))
        .map(|node| extract_part(node, base));

    let answer = problem_node
        .select(&ANSWER)
        .next()
        .map(|node| {
            let text = clean_text(&collect_text(node));
            text.trim()
                .trim_start_matches("Ответ:")
                .trim()
                .to_string()
        })
        .unwrap_or_default();

    let topic_id = problem_node
        .select(&PROB_NUMS)
        .next()
        .and_then(|node| parse_topic_id(&collect_text(node)));

    let analog_ids = problem_node
        .select(&MINOR_LINKS)
        .filter_map(|link| link.value().attr("href"))
        .filter_map(|href| problem_id_from_href(href))
        .collect();

    Ok(ProblemFields {
        condition,
        solution,
        answer,
        topic_id,
        analog_ids,
    })
}

/// Second whitespace token of the `span.prob_nums` text, e.g.
/// "Задание 14 № 27329" → 14.
fn parse_topic_id(text: &str) -> Option<u64> {
    text.split_whitespace().nth(1)?.parse().ok()
}

/// Pulls a problem/test id out of an `id=` query parameter in a href or
/// Location header.
pub(crate) fn problem_id_from_href(href: &str) -> Option<u64> {
    PROBLEM_ID_IN_HREF
        .captures(href)
        .and_then(|caps| caps.get(1))
        .and_then(|m| m.as_str().parse().ok())
}

fn extract_part(node: ElementRef<'_>, base: &Url) -> PartFragment {
    let formula_urls: Vec<String> = node
        .select(&IMG_TEX)
        .filter_map(|img| img.value().attr("src"))
        .map(|src| absolutize_url(src, base))
        .collect();

    let mut image_urls = formula_urls.clone();
    for img in node.select(&IMG) {
        if let Some(src) = img.value().attr("src") {
            let absolute = absolutize_url(src, base);
            if !image_urls.contains(&absolute) {
                image_urls.push(absolute);
            }
        }
    }

    PartFragment {
        html: absolutize_images(&node.html(), base),
        formula_urls,
        image_urls,
    }
}

/// Collects problem ids from a listing page (search results, test pages,
/// theme pages): the first link inside each `span.prob_nums`.
#[must_use]
pub fn extract_problem_ids(html: &str) -> Vec<u64> {
    let document = Html::parse_document(html);
    document
        .select(&PROB_NUMS)
        .filter_map(|span| span.select(&ANCHOR).next())
        .filter_map(|link| collect_text(link).trim().parse().ok())
        .collect()
}

/// Raw catalog topic as parsed from `/prob_catalog`, before the client
/// attaches enum context.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogTopic {
    pub topic_id: u64,
    pub topic_name: String,
    pub additional: bool,
    pub categories: Vec<(u64, String)>,
}

/// Extracts the topic/category tree from a `/prob_catalog` page.
///
/// Topics are the `div.cat_category` nodes without a `data-id` attribute;
/// the first of those is the page header and is skipped. Topics whose
/// name line does not follow the `"N. Name"` shape are skipped rather
/// than failing the whole catalog.
#[must_use]
pub fn extract_catalog(html: &str) -> Vec<CatalogTopic> {
    let document = Html::parse_document(html);
    document
        .select(&CAT_CATEGORY)
        .filter(|node| node.value().attr("data-id").is_none())
        .skip(1)
        .filter_map(extract_topic)
        .collect()
}

fn extract_topic(node: ElementRef<'_>) -> Option<CatalogTopic> {
    let name_line = clean_text(&collect_text(node.select(&CAT_TOPIC_NAME).next()?));
    let (number, topic_name) = name_line.trim().split_once(". ")?;
    let topic_id = LEADING_DIGITS
        .find(number)
        .and_then(|m| m.as_str().parse().ok())?;
    let additional = number.to_lowercase().contains('д');

    let categories = node
        .select(&CAT_CHILDREN)
        .next()
        .map(|children| {
            children
                .select(&CAT_CATEGORY)
                .filter_map(|cat| {
                    let id = cat.value().attr("data-id")?.parse().ok()?;
                    let name = cat.select(&CAT_CHILD_NAME).next()?;
                    Some((id, clean_text(collect_text(name).trim())))
                })
                .collect()
        })
        .unwrap_or_default();

    Some(CatalogTopic {
        topic_id,
        topic_name: topic_name.trim().to_string(),
        additional,
        categories,
    })
}

/// Renders a fragment's plain text, substituting recognized LaTeX for each
/// formula image in document order.
///
/// Non-formula images contribute nothing to the text. The result is
/// cleaned via [`clean_text`] and whitespace-collapsed.
#[must_use]
pub fn render_part_text(fragment_html: &str, latex_by_url: &HashMap<String, String>) -> String {
    let fragment = Html::parse_fragment(fragment_html);
    let mut out = String::new();

    for node in fragment.tree.nodes() {
        match node.value() {
            scraper::Node::Text(text) => out.push_str(text),
            scraper::Node::Element(element) if element.name() == "img" => {
                let is_formula = element
                    .attr("class")
                    .is_some_and(|c| c.split_whitespace().any(|class| class == "tex"));
                if is_formula
                    && let Some(latex) = element.attr("src").and_then(|src| latex_by_url.get(src))
                {
                    out.push_str(latex);
                }
            }
            _ => {}
        }
    }

    collapse_whitespace(&clean_text(&out))
}

/// Concatenated text of all descendant text nodes.
fn collect_text(node: ElementRef<'_>) -> String {
    node.text().collect()
}

fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn base() -> Url {
        Url::parse("https://math-ege.sdamgia.ru").unwrap()
    }

    const PROBLEM_PAGE: &str = r#"
        <html><body>
        <div class="prob_maindiv">
          <span class="prob_nums">Задание 14 № <a href="/problem?id=27329">27329</a></span>
          <div class="pbody">
            <p>Найдите корень уравнения
            <img class="tex" src="/formula/ab.svg" alt="x^2">.</p>
            <img src="/get_file?id=555">
          </div>
          <div class="solution">
            <p>Решение. Возведём в квадрат:
            <img class="tex" src="/formula/cd.svg" alt="x=4">.</p>
          </div>
          <div class="answer">Ответ: −4.</div>
          <div class="minor">
            Аналоги: <a href="/problem?id=27330">27330</a>
            <a href="/problem?id=27331">27331</a>
            <a href="/test?filter=all">Все</a>
          </div>
        </div>
        </body></html>
    "#;

    #[test]
    fn test_extract_problem_full_page() {
        let fields = extract_problem(PROBLEM_PAGE, &base()).unwrap();

        let condition = fields.condition.unwrap();
        assert_eq!(
            condition.formula_urls,
            vec!["https://math-ege.sdamgia.ru/formula/ab.svg"]
        );
        assert_eq!(
            condition.image_urls,
            vec![
                "https://math-ege.sdamgia.ru/formula/ab.svg",
                "https://math-ege.sdamgia.ru/get_file?id=555",
            ]
        );
        assert!(
            condition
                .html
                .contains(r#"src="https://math-ege.sdamgia.ru/formula/ab.svg""#),
            "condition html must carry absolutized srcs: {}",
            condition.html
        );

        let solution = fields.solution.unwrap();
        assert_eq!(
            solution.formula_urls,
            vec!["https://math-ege.sdamgia.ru/formula/cd.svg"]
        );

        assert_eq!(fields.answer, "-4.");
        assert_eq!(fields.topic_id, Some(14));
        assert_eq!(fields.analog_ids, vec![27330, 27331]);
    }

    #[test]
    fn test_extract_problem_missing_container() {
        let err = extract_problem("<html><body>404</body></html>", &base()).unwrap_err();
        assert!(err.to_string().contains("prob_maindiv"), "got: {err}");
    }

    #[test]
    fn test_extract_problem_without_solution_or_answer() {
        let html = r#"
            <div class="prob_maindiv">
              <div class="pbody"><p>Условие.</p></div>
            </div>
        "#;
        let fields = extract_problem(html, &base()).unwrap();
        assert!(fields.condition.is_some());
        assert!(fields.solution.is_none());
        assert_eq!(fields.answer, "");
        assert_eq!(fields.topic_id, None);
        assert!(fields.analog_ids.is_empty());
    }

    #[test]
    fn test_extract_problem_solution_pbody_fallback() {
        let html = r#"
            <div class="prob_maindiv">
              <div class="pbody"><p>Условие.</p></div>
              <div class="pbody"><p>Решение.</p></div>
            </div>
        "#;
        let fields = extract_problem(html, &base()).unwrap();
        let solution = fields.solution.unwrap();
        assert!(solution.html.contains("Решение"));
    }

    #[test]
    fn test_extract_problem_keeps_absolute_image_urls() {
        let html = r#"
            <div class="prob_maindiv">
              <div class="pbody">
                <img src="https://cdn.sdamgia.ru/img/1.png">
              </div>
            </div>
        "#;
        let fields = extract_problem(html, &base()).unwrap();
        let condition = fields.condition.unwrap();
        assert_eq!(condition.image_urls, vec!["https://cdn.sdamgia.ru/img/1.png"]);
    }

    #[test]
    fn test_extract_problem_ids_from_listing() {
        let html = r#"
            <span class="prob_nums"><a href="/problem?id=101">101</a></span>
            <span class="prob_nums"><a href="/problem?id=102">102</a></span>
            <span class="prob_nums">no link here</span>
        "#;
        assert_eq!(extract_problem_ids(html), vec![101, 102]);
    }

    #[test]
    fn test_extract_problem_ids_empty_page() {
        assert!(extract_problem_ids("<html><body></body></html>").is_empty());
    }

    #[test]
    fn test_extract_catalog() {
        let html = r#"
            <div class="cat_category"><b class="cat_name">Каталог заданий</b></div>
            <div class="cat_category">
              <b class="cat_name">1. Простейшие уравнения</b>
              <div class="cat_children">
                <div class="cat_category" data-id="174">
                  <a class="cat_name">Линейные уравнения</a>
                </div>
                <div class="cat_category" data-id="175">
                  <a class="cat_name">Квадратные уравнения</a>
                </div>
              </div>
            </div>
            <div class="cat_category">
              <b class="cat_name">Д2. Дополнительные задачи</b>
              <div class="cat_children">
                <div class="cat_category" data-id="300">
                  <a class="cat_name">Разное</a>
                </div>
              </div>
            </div>
        "#;
        let catalog = extract_catalog(html);
        assert_eq!(catalog.len(), 2);

        assert_eq!(catalog[0].topic_id, 1);
        assert_eq!(catalog[0].topic_name, "Простейшие уравнения");
        assert!(!catalog[0].additional);
        assert_eq!(
            catalog[0].categories,
            vec![
                (174, "Линейные уравнения".to_string()),
                (175, "Квадратные уравнения".to_string()),
            ]
        );

        assert_eq!(catalog[1].topic_id, 2);
        assert!(catalog[1].additional);
    }

    #[test]
    fn test_render_part_text_substitutes_formulas_in_order() {
        let mut latex = HashMap::new();
        latex.insert(
            "https://math-ege.sdamgia.ru/formula/ab.svg".to_string(),
            "$x^2=16$".to_string(),
        );
        let fragment = r#"<div class="pbody">Найдите
            <img class="tex" src="https://math-ege.sdamgia.ru/formula/ab.svg">
            и запишите ответ.<img src="https://math-ege.sdamgia.ru/get_file?id=5"></div>"#;
        let text = render_part_text(fragment, &latex);
        assert_eq!(text, "Найдите $x^2=16$ и запишите ответ.");
    }

    #[test]
    fn test_clean_text_site_artifacts() {
        assert_eq!(clean_text("x\u{00a0}=\u{00a0}\u{2212}5"), "x = -5");
        assert_eq!(clean_text("урав\u{00ad}нение"), "уравнение");
    }

    #[test]
    fn test_absolutize_images_rewrites_relative_only() {
        let html = r#"<img src="/a.png"><img src='https://other.site/b.png'>"#;
        let rewritten = absolutize_images(html, &base());
        assert!(rewritten.contains(r#"src="https://math-ege.sdamgia.ru/a.png""#));
        assert!(rewritten.contains("https://other.site/b.png"));
    }
}
