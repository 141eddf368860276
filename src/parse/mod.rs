pub mod publisher;
pub mod sort;

use crate::model::{PublisherInfo, ScoreEntry, ScoreScrape, SkipReason};
use scraper::{ElementRef, Html, Selector};

/// Name of the generic score label IMSLP uses when an edition has no more
/// specific title. A block-level title override substitutes for this literal.
const GENERIC_TITLE: &str = "Complete Score";

/// Parse a complete IMSLP work page into score entries plus skip diagnostics.
///
/// One malformed entry or edition block is recorded in `skips` and dropped;
/// it never aborts the rest of the page. An unparseable or empty document
/// simply yields no entries.
pub fn parse_scores(html: &str) -> ScoreScrape {
    let document = Html::parse_document(html);
    let block_selector = Selector::parse("div.we").unwrap();

    let mut scrape = ScoreScrape::default();
    for block in document.select(&block_selector) {
        parse_edition_block(&block, &mut scrape);
    }
    scrape
}

/// One `div.we` edition block: a nested info table (publisher metadata,
/// urtext marker) followed by one `<p>` per downloadable file.
fn parse_edition_block(block: &ElementRef, scrape: &mut ScoreScrape) {
    let table_selector = Selector::parse("table").unwrap();
    let Some(info_table) = block.select(&table_selector).next() else {
        scrape.skips.push(SkipReason::MissingPublisherCell);
        return;
    };

    // The urtext flag is computed from the whole info table, independently of
    // the publisher-text parse (which strips its own urtext annotation).
    let is_urtext = info_table
        .text()
        .collect::<String>()
        .to_lowercase()
        .contains("urtext");

    let Some(fragment) = publisher_fragment(&info_table) else {
        scrape.skips.push(SkipReason::MissingPublisherCell);
        return;
    };
    let publisher = match publisher::parse_publisher(&fragment) {
        Ok(info) => info,
        Err(reason) => {
            // A rejected publisher fragment drops the whole block: its file
            // entries would carry corrupted metadata.
            scrape.skips.push(reason);
            return;
        }
    };

    // File entries are direct children of the block; the nested info table
    // is excluded so its internal links are never mistaken for downloads.
    for child in block.children() {
        let Some(element) = ElementRef::wrap(child) else {
            continue;
        };
        if element.value().name() == "table" {
            continue;
        }
        match parse_file_entry(&element, &publisher, is_urtext) {
            Ok(Some(entry)) => scrape.entries.push(entry),
            Ok(None) => {} // no PDF download link: filtered, not a skip
            Err(reason) => scrape.skips.push(reason),
        }
    }
}

/// Locate the "Publisher Information" cell inside an edition's info table and
/// return its raw inner HTML. The header text varies ("Publisher", "Publisher
/// Info.", "Publisher Information"), so only the prefix is matched.
fn publisher_fragment(info_table: &ElementRef) -> Option<String> {
    let th_selector = Selector::parse("th").unwrap();
    for th in info_table.select(&th_selector) {
        let header = th.text().collect::<String>();
        if !header.trim_start().starts_with("Pub") {
            continue;
        }
        let mut sibling = th.next_sibling();
        while let Some(node) = sibling {
            if let Some(cell) = ElementRef::wrap(node) {
                if cell.value().name() == "td" {
                    return Some(cell.inner_html());
                }
            }
            sibling = node.next_sibling();
        }
    }
    None
}

/// Parse one candidate file element into a `ScoreEntry`.
///
/// Returns `Ok(None)` when the element holds no `.pdf` download link (the
/// filter case), `Err` when it does but its label is malformed (the skip
/// case). The distinction matters: skips are diagnostics, filters are not.
fn parse_file_entry(
    element: &ElementRef,
    publisher: &PublisherInfo,
    is_urtext: bool,
) -> Result<Option<ScoreEntry>, SkipReason> {
    let link_selector = Selector::parse("a[href]").unwrap();
    let mut pdf_link = None;
    for anchor in element.select(&link_selector) {
        if let Some(href) = anchor.value().attr("href") {
            if href.ends_with(".pdf") {
                pdf_link = Some((anchor, href.to_string()));
                break;
            }
        }
    }
    let Some((link, url)) = pdf_link else {
        return Ok(None);
    };

    // The compound label has the shape "#01234 - 1.57MB, 24 pp.". Both
    // delimiters must be present before any of the pieces are trusted.
    let label_selector = Selector::parse("span.we_file_info").unwrap();
    let label = element
        .select(&label_selector)
        .next()
        .map(|span| span.text().collect::<String>())
        .unwrap_or_default();

    let Some((id_part, rest)) = label.split_once('-') else {
        return Err(SkipReason::MalformedLabel { label });
    };
    let Some((size_part, pages_part)) = rest.split_once(',') else {
        return Err(SkipReason::MalformedLabel {
            label: label.clone(),
        });
    };

    let id: String = id_part.chars().filter(|c| c.is_ascii_digit()).collect();
    if id.is_empty() {
        return Err(SkipReason::MissingDownloadId {
            label: label.clone(),
        });
    }

    let title_selector = Selector::parse("b span").unwrap();
    let raw_title = link
        .select(&title_selector)
        .next()
        .map(|span| span.text().collect::<String>())
        .unwrap_or_else(|| GENERIC_TITLE.to_string());

    // Block-level title overrides replace only the literal generic label,
    // first occurrence; anything else in the title is left alone.
    let title = match &publisher.title {
        Some(override_title) => raw_title.replacen(GENERIC_TITLE, override_title, 1),
        None => raw_title,
    };

    Ok(Some(ScoreEntry {
        id,
        title,
        url,
        file_size: size_part.trim().to_string(),
        pages: pages_part.trim().to_string(),
        publisher: publisher.clone(),
        is_urtext,
    }))
}
