//! Problem export documents.
//!
//! Renders a fetched [`Problem`] as a standalone LaTeX article (from the
//! OCR'd plain text) or as a minimal HTML document (from the raw
//! fragments). Rendering only produces strings; compiling them to PDF
//! with an external tool is the caller's business.

mod error;

pub use error::ExportError;

use std::fmt::Write as _;
use std::path::Path;

use crate::types::Problem;

/// File stem the original tooling used for exported documents,
/// e.g. `math-ege-26596`.
#[must_use]
pub fn file_stem(problem: &Problem) -> String {
    format!(
        "{}-{}-{}",
        problem.subject, problem.gia_type, problem.problem_id
    )
}

/// Renders a problem as a standalone LaTeX article.
///
/// Uses the `text` of the condition/solution parts, so the output is only
/// complete for problems fetched with OCR; parts without text render as
/// empty sections.
#[must_use]
pub fn problem_to_latex(problem: &Problem) -> String {
    let condition = part_text(problem.condition.as_ref().map(|p| p.text.as_str()));
    let solution = part_text(problem.solution.as_ref().map(|p| p.text.as_str()));
    let url = problem.url();

    let mut out = String::new();
    out.push_str("\\documentclass{article}\n");
    out.push_str("\\usepackage[T2A]{fontenc}\n\\usepackage[utf8]{inputenc}\n");
    out.push_str("\\usepackage[russian,english]{babel}\n");
    out.push_str("\\usepackage{amsmath}\n\\usepackage{amssymb}\n");
    out.push_str("\\usepackage{hyperref}\n\\hypersetup{colorlinks=true,urlcolor=blue}\n\n");
    out.push_str("\\begin{document}\n");
    let _ = writeln!(
        out,
        "\\section{{\\href{{{url}}}{{Задача {}}}}}\n",
        problem.problem_id
    );
    let _ = writeln!(out, "\\subsection{{Условие:}}\n\n{condition}\n");
    let _ = writeln!(out, "\\subsection{{Решение:}}\n\n{solution}\n");
    if !problem.answer.is_empty() {
        let _ = writeln!(out, "\\subsection{{Ответ:}}\n\n{}\n", problem.answer);
    }
    out.push_str("\\end{document}\n");
    out
}

/// Renders a problem as a minimal HTML document from the raw fragments.
#[must_use]
pub fn problem_to_html(problem: &Problem) -> String {
    let condition = part_text(problem.condition.as_ref().map(|p| p.html.as_str()));
    let solution = part_text(problem.solution.as_ref().map(|p| p.html.as_str()));
    format!("<html><body><b>Условие:</b>{condition}{solution}</body></html>")
}

fn part_text(text: Option<&str>) -> &str {
    text.unwrap_or_default()
}

/// Writes the LaTeX rendering of `problem` to `path`.
///
/// # Errors
///
/// Returns [`ExportError::Io`] when the file cannot be written.
pub fn write_latex(problem: &Problem, path: impl AsRef<Path>) -> Result<(), ExportError> {
    let path = path.as_ref();
    std::fs::write(path, problem_to_latex(problem)).map_err(|e| ExportError::io(path, e))
}

/// Writes the HTML rendering of `problem` to `path`.
///
/// # Errors
///
/// Returns [`ExportError::Io`] when the file cannot be written.
pub fn write_html(problem: &Problem, path: impl AsRef<Path>) -> Result<(), ExportError> {
    let path = path.as_ref();
    std::fs::write(path, problem_to_html(problem)).map_err(|e| ExportError::io(path, e))
}
