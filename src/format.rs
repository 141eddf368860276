//! Markdown output formatters for CLI commands

use crate::model::{PdfUrlResult, ScoresResult};

/// Format a ScoresResult as markdown
pub fn scores(result: &ScoresResult) -> String {
    let mut md = String::new();

    md.push_str(&format!("# Scores for {}\n\n", result.wiki_url));

    if result.scores.is_empty() {
        md.push_str("No scores found. The piece may have no IMSLP presence, or the page\n");
        md.push_str("could not be fetched; enter a score URL manually instead.\n");
        return md;
    }

    for entry in &result.scores {
        let marker = if entry.is_urtext { " [Urtext]" } else { "" };
        md.push_str(&format!("## {}{}\n\n", entry.title, marker));
        md.push_str(&format!(
            "- File: `#{}` ({}, {})\n",
            entry.id, entry.file_size, entry.pages
        ));

        let mut publisher = entry.publisher.name.clone();
        if let Some(city) = &entry.publisher.city {
            publisher = format!("{city}: {publisher}");
        }
        if let Some(date) = &entry.publisher.date {
            publisher.push_str(&format!(", {date}"));
        }
        if !publisher.is_empty() {
            md.push_str(&format!("- Publisher: {publisher}\n"));
        }
        if let Some(plate) = &entry.publisher.plate {
            md.push_str(&format!("- Plate: {plate}\n"));
        }
        md.push_str(&format!("- URL: {}\n\n", entry.url));
    }

    md
}

/// Format a PdfUrlResult as markdown
pub fn pdf_url(result: &PdfUrlResult) -> String {
    match &result.pdf_url {
        Some(url) => format!("{url}\n"),
        None => format!(
            "No download available for {} (button missing or link expired).\n",
            result.index_url
        ),
    }
}
