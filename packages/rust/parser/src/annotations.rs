//! Raw-text passes over a sample: the metadata block and annotated sections.
//!
//! Samples document themselves with HTML comments. A leading `<!---{...}--->`
//! block carries JSON metadata; every other comment in the body annotates the
//! markup that follows it.

use std::sync::LazyLock;

use regex::Regex;

use sampledocs_shared::Section;

/// Split off the leading metadata block.
///
/// Returns the raw JSON text (if a block is present) and the remaining document.
pub(crate) fn split_metadata(html: &str) -> (Option<&str>, &str) {
    static META_RE: LazyLock<Regex> = LazyLock::new(|| {
        Regex::new(r"(?s)\A\s*<!---(.*?)--->").expect("valid regex")
    });

    match META_RE.captures(html).and_then(|c| Some((c.get(0)?, c.get(1)?))) {
        Some((whole, json)) => (Some(json.as_str().trim()), &html[whole.end()..]),
        None => (None, html),
    }
}

/// The inner markup of `<body>`, or the whole document if there is none.
pub(crate) fn body_markup(html: &str) -> &str {
    static BODY_RE: LazyLock<Regex> = LazyLock::new(|| {
        Regex::new(r"(?is)<body[^>]*>(.*)</body>").expect("valid regex")
    });

    BODY_RE
        .captures(html)
        .and_then(|c| c.get(1))
        .map_or(html, |m| m.as_str())
}

/// Cut body markup into sections at each annotation comment.
///
/// Markup before the first comment becomes a section with an empty `doc`,
/// unless it is blank.
pub(crate) fn split_sections(body: &str) -> Vec<Section> {
    static COMMENT_RE: LazyLock<Regex> = LazyLock::new(|| {
        Regex::new(r"(?s)<!--(.*?)-->").expect("valid regex")
    });

    let mut sections = Vec::new();
    let mut pending_doc: Option<String> = None;
    let mut cursor = 0;

    for caps in COMMENT_RE.captures_iter(body) {
        let Some(whole) = caps.get(0) else { continue };
        push_section(&mut sections, pending_doc.take(), &body[cursor..whole.start()]);
        pending_doc = Some(caps[1].trim().to_string());
        cursor = whole.end();
    }
    push_section(&mut sections, pending_doc, &body[cursor..]);

    sections
}

fn push_section(sections: &mut Vec<Section>, doc: Option<String>, code: &str) {
    let code = code.trim();
    match doc {
        Some(doc) => sections.push(Section {
            doc,
            code: code.to_string(),
        }),
        None if !code.is_empty() => sections.push(Section {
            doc: String::new(),
            code: code.to_string(),
        }),
        None => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn metadata_block_is_split_off() {
        let html = "<!---{\"experiments\": [\"x\"]}--->\n<!doctype html><html></html>";
        let (meta, rest) = split_metadata(html);
        assert_eq!(meta, Some("{\"experiments\": [\"x\"]}"));
        assert!(rest.trim_start().starts_with("<!doctype html>"));
    }

    #[test]
    fn ordinary_comment_is_not_metadata() {
        let html = "<!-- hello --><html></html>";
        let (meta, rest) = split_metadata(html);
        assert!(meta.is_none());
        assert_eq!(rest, html);
    }

    #[test]
    fn body_is_extracted() {
        let html = "<html><head><title>T</title></head><BODY class=\"x\">\n<p>hi</p>\n</BODY></html>";
        assert_eq!(body_markup(html).trim(), "<p>hi</p>");
        assert_eq!(body_markup("<p>bare</p>"), "<p>bare</p>");
    }

    #[test]
    fn sections_follow_comments() {
        let body = r#"
            <header>intro</header>
            <!-- First, a heading. -->
            <h1>Hello</h1>
            <!--
              Then a paragraph.
            -->
            <p>World</p>
        "#;
        let sections = split_sections(body);
        assert_eq!(sections.len(), 3);
        assert_eq!(sections[0].doc, "");
        assert_eq!(sections[0].code, "<header>intro</header>");
        assert_eq!(sections[1].doc, "First, a heading.");
        assert_eq!(sections[1].code, "<h1>Hello</h1>");
        assert_eq!(sections[2].doc, "Then a paragraph.");
        assert_eq!(sections[2].code, "<p>World</p>");
    }

    #[test]
    fn trailing_comment_yields_empty_code() {
        let sections = split_sections("<p>a</p><!-- the end -->");
        assert_eq!(sections.len(), 2);
        assert_eq!(sections[1].doc, "the end");
        assert!(sections[1].code.is_empty());
    }

    #[test]
    fn blank_body_has_no_sections() {
        assert!(split_sections("   \n  ").is_empty());
    }
}
