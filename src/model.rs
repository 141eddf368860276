use serde::Serialize;
use thiserror::Error;

/// Publisher/edition metadata parsed from one "Publisher Information" cell.
///
/// `name` is always present (empty string means "unknown"); the remaining
/// fields only appear when the source fragment carried their delimiter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PublisherInfo {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub plate: Option<String>,
    /// Edition-level title override from the `<br>`-separated two-part form.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
}

/// One downloadable score found on an IMSLP work page.
///
/// `file_size` and `pages` stay as display strings ("1.57MB", "24 pp.") —
/// the source formatting varies too much to parse numerically.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScoreEntry {
    /// Numeric IMSLP file id, digits only.
    pub id: String,
    pub title: String,
    /// Download link; always ends in `.pdf` (non-PDF links are filtered out
    /// before construction).
    pub url: String,
    pub file_size: String,
    pub pages: String,
    pub publisher: PublisherInfo,
    pub is_urtext: bool,
}

/// Why a single entry or edition block was dropped during a parse pass.
///
/// Skips are diagnostics, not errors: one malformed entry never aborts the
/// rest of the page.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SkipReason {
    /// File label missing its `-` or `,` delimiter ("#1234 - 1MB, 12 pp.").
    #[error("malformed file label: {label:?}")]
    MalformedLabel { label: String },
    /// File label yielded no digits for the id.
    #[error("no download id in label: {label:?}")]
    MissingDownloadId { label: String },
    /// Publisher fragment with a `Plate` token but nothing usable around it.
    /// Unlike a missing city or title, this rejects the whole fragment.
    #[error("dangling Plate token in publisher fragment: {fragment:?}")]
    DanglingPlate { fragment: String },
    /// Edition block without a publisher-information cell.
    #[error("edition block has no publisher cell")]
    MissingPublisherCell,
}

/// Result of one parse pass over an IMSLP work page: the surviving entries
/// plus a record of everything that was dropped and why.
#[derive(Debug, Default)]
pub struct ScoreScrape {
    pub entries: Vec<ScoreEntry>,
    pub skips: Vec<SkipReason>,
}

/// JSON output for the `pdf-url` command.
#[derive(Debug, Serialize)]
pub struct PdfUrlResult {
    pub index_url: String,
    pub pdf_url: Option<String>,
}

/// JSON output for the `scores` command.
#[derive(Debug, Serialize)]
pub struct ScoresResult {
    pub wiki_url: String,
    pub scores: Vec<ScoreEntry>,
}
