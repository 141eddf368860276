//! Publisher-fragment text parser.
//!
//! IMSLP encodes publisher/edition metadata as loosely structured markup
//! inside one table cell, e.g.
//!
//! ```text
//! Leipzig: Breitkopf & Härtel, 1862. Plate B. 123.
//! ```
//!
//! sometimes preceded by an edition title and a `<br>`. The extraction steps
//! run in a fixed order (title, city, plate, name/date) because each step
//! consumes part of the text and hands the remainder to the next.

use crate::model::{PublisherInfo, SkipReason};
use regex::Regex;
use std::sync::LazyLock;

/// Any HTML tag. Used to reduce fragment parts to plain text.
static TAG_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"<[^>]*>").unwrap());

/// `<br>` in the variants IMSLP emits (`<br>`, `<br/>`, `<br />`).
static BR_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?i)<br\s*/?>").unwrap());

/// First occurrence of "urtext", any case. Everything from there on is
/// redundant with the separately computed urtext flag.
static URTEXT_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?i)urtext").unwrap());

/// Captures a trailing `, <date>.` suffix; `name` is everything before it.
/// The trailing `[\s,]*` swallows a dangling comma left behind by the plate
/// split, so the optional date group is the only way to keep a comma tail.
static NAME_DATE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)^(?P<name>.*?)(?:,\s*(?P<date>[^,]*?)\s*\.)?[\s,]*$").unwrap());

fn strip_tags(html: &str) -> String {
    TAG_RE.replace_all(html, "").to_string()
}

/// Parse one raw "Publisher Information" HTML fragment.
///
/// Absent city/title/date simply leave their field `None`. A `Plate` token
/// with nothing on one side rejects the whole fragment: a dangling plate
/// means the markup has a shape this parser does not understand, and
/// downstream consumers should not receive guessed values.
pub fn parse_publisher(fragment: &str) -> Result<PublisherInfo, SkipReason> {
    // Normalize: only the first line, only the part before any urtext
    // annotation, only the part before any embedded <div> widget.
    let text = fragment.split('\n').next().unwrap_or("");
    let text = match URTEXT_RE.find(text) {
        Some(m) => &text[..m.start()],
        None => text,
    };
    let text = match text.find("<div") {
        Some(idx) => &text[..idx],
        None => text,
    };

    // Two-part form: "<title><br><publisher info>". Without a <br> the whole
    // fragment is publisher info.
    let (title, working) = match BR_RE.find(text) {
        Some(m) => {
            let title = strip_tags(&text[..m.start()]).trim().to_string();
            let rest = strip_tags(&text[m.end()..]);
            ((!title.is_empty()).then_some(title), rest)
        }
        None => (None, strip_tags(text)),
    };

    // City prefix: split on the FIRST colon only, so colons inside the
    // remainder survive.
    let (city, working) = match working.split_once(':') {
        Some((before, after)) => (Some(before.trim().to_string()), after.to_string()),
        None => (None, working),
    };

    // Plate number: "… Plate 6544." — the value follows the literal token.
    let (plate, working) = match working.split_once("Plate") {
        Some((before, after)) => {
            if before.is_empty() || after.is_empty() {
                return Err(SkipReason::DanglingPlate {
                    fragment: fragment.to_string(),
                });
            }
            let value = after.trim();
            let value = value.strip_suffix('.').unwrap_or(value).trim_end();
            if value.is_empty() {
                return Err(SkipReason::DanglingPlate {
                    fragment: fragment.to_string(),
                });
            }
            (Some(value.to_string()), before.to_string())
        }
        None => (None, working),
    };

    // What remains is "<name>" or "<name>, <date>.".
    let (name, date) = match NAME_DATE_RE.captures(&working) {
        Some(caps) => (
            caps.name("name").map_or("", |m| m.as_str()).trim().to_string(),
            caps.name("date").map(|m| m.as_str().trim().to_string()),
        ),
        // Unreachable with the catch-all pattern, but the fallback keeps the
        // contract: no date, whole remainder is the name.
        None => (working.trim().to_string(), None),
    };

    Ok(PublisherInfo {
        name,
        date,
        city,
        plate,
        title,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_city_plate_and_urtext_annotation() {
        let info = parse_publisher("Leipzig: Breitkopf &amp; Härtel, Plate B. 123. Urtext");
        // &amp; is left as-is: the fragment is inner HTML, entity decoding is
        // the DOM layer's job and this parser only sees what it is handed.
        let info = info.unwrap();
        assert_eq!(info.city.as_deref(), Some("Leipzig"));
        assert_eq!(info.plate.as_deref(), Some("B. 123"));
        assert_eq!(info.name, "Breitkopf &amp; Härtel");
        assert_eq!(info.date, None);
        assert_eq!(info.title, None);
    }

    #[test]
    fn test_city_name_date_plate() {
        let info = parse_publisher("Leipzig: C.F. Peters, 1879. Plate 6544.").unwrap();
        assert_eq!(info.city.as_deref(), Some("Leipzig"));
        assert_eq!(info.name, "C.F. Peters");
        assert_eq!(info.date.as_deref(), Some("1879"));
        assert_eq!(info.plate.as_deref(), Some("6544"));
    }

    #[test]
    fn test_name_only() {
        let info = parse_publisher("Bote &amp; Bock").unwrap();
        assert_eq!(info.name, "Bote &amp; Bock");
        assert_eq!(info.city, None);
        assert_eq!(info.plate, None);
        assert_eq!(info.date, None);
    }

    #[test]
    fn test_name_and_date_without_city() {
        let info = parse_publisher("G. Schirmer, 1895.").unwrap();
        assert_eq!(info.name, "G. Schirmer");
        assert_eq!(info.date.as_deref(), Some("1895"));
        assert_eq!(info.city, None);
    }

    #[test]
    fn test_no_trailing_period_means_no_date() {
        // The date pattern requires the closing period; without it the comma
        // stays part of the name.
        let info = parse_publisher("G. Schirmer, 1895").unwrap();
        assert_eq!(info.name, "G. Schirmer, 1895");
        assert_eq!(info.date, None);
    }

    #[test]
    fn test_nd_date() {
        let info = parse_publisher("Muzgiz, n.d.").unwrap();
        assert_eq!(info.name, "Muzgiz");
        assert_eq!(info.date.as_deref(), Some("n.d"));
    }

    #[test]
    fn test_comma_inside_name_with_trailing_date() {
        let info = parse_publisher("Augener, Ltd., 1901.").unwrap();
        assert_eq!(info.name, "Augener, Ltd.");
        assert_eq!(info.date.as_deref(), Some("1901"));
    }

    #[test]
    fn test_title_override_via_br() {
        let info =
            parse_publisher("<b>Nocturne Op. 9 No. 2</b><br>Leipzig: C.F. Peters, 1879. Plate 6544.")
                .unwrap();
        assert_eq!(info.title.as_deref(), Some("Nocturne Op. 9 No. 2"));
        assert_eq!(info.city.as_deref(), Some("Leipzig"));
        assert_eq!(info.name, "C.F. Peters");
        assert_eq!(info.date.as_deref(), Some("1879"));
        assert_eq!(info.plate.as_deref(), Some("6544"));
    }

    #[test]
    fn test_self_closing_br_variants() {
        for br in ["<br/>", "<br />", "<BR>"] {
            let info = parse_publisher(&format!("Etudes{br}Durand")).unwrap();
            assert_eq!(info.title.as_deref(), Some("Etudes"), "separator {br}");
            assert_eq!(info.name, "Durand");
        }
    }

    #[test]
    fn test_tags_stripped_without_br() {
        let info = parse_publisher("<a href=\"/x\">Ricordi</a>, 1888.").unwrap();
        assert_eq!(info.name, "Ricordi");
        assert_eq!(info.date.as_deref(), Some("1888"));
    }

    #[test]
    fn test_only_first_colon_splits_city() {
        let info = parse_publisher("New York: Carl Fischer: No. 3, 1910.").unwrap();
        assert_eq!(info.city.as_deref(), Some("New York"));
        assert_eq!(info.name, "Carl Fischer: No. 3");
        assert_eq!(info.date.as_deref(), Some("1910"));
    }

    #[test]
    fn test_multiline_fragment_keeps_first_line() {
        let info = parse_publisher("Henle\nsecond line: noise, 2001.").unwrap();
        assert_eq!(info.name, "Henle");
        assert_eq!(info.city, None);
        assert_eq!(info.date, None);
    }

    #[test]
    fn test_nested_div_truncated() {
        let info = parse_publisher("Durand, 1905.<div class=\"box\">widget</div>").unwrap();
        assert_eq!(info.name, "Durand");
        assert_eq!(info.date.as_deref(), Some("1905"));
    }

    #[test]
    fn test_urtext_annotation_removed_case_insensitively() {
        let info = parse_publisher("Henle URTEXT edition").unwrap();
        assert_eq!(info.name, "Henle");
    }

    #[test]
    fn test_dangling_plate_is_fatal() {
        let err = parse_publisher("Leipzig: Peters Plate").unwrap_err();
        assert!(matches!(err, SkipReason::DanglingPlate { .. }));

        let err = parse_publisher("Leipzig: Peters Plate .").unwrap_err();
        assert!(matches!(err, SkipReason::DanglingPlate { .. }));
    }

    #[test]
    fn test_plate_with_nothing_before_is_fatal() {
        let err = parse_publisher("Plate 123.").unwrap_err();
        assert!(matches!(err, SkipReason::DanglingPlate { .. }));
    }

    #[test]
    fn test_empty_fragment_yields_unknown_publisher() {
        let info = parse_publisher("").unwrap();
        assert_eq!(info.name, "");
        assert_eq!(info.city, None);
        assert_eq!(info.plate, None);
        assert_eq!(info.date, None);
        assert_eq!(info.title, None);
    }

    #[test]
    fn test_idempotent_on_same_input() {
        let a = parse_publisher("Leipzig: C.F. Peters, 1879. Plate 6544.").unwrap();
        let b = parse_publisher("Leipzig: C.F. Peters, 1879. Plate 6544.").unwrap();
        assert_eq!(a, b);
    }
}
