use std::io::{Cursor, Read};
use std::sync::OnceLock;

use regex::Regex;
use zip::ZipArchive;

use super::DocumentError;

const DOCUMENT_PART: &str = "word/document.xml";

fn markup() -> &'static Regex {
    static MARKUP: OnceLock<Regex> = OnceLock::new();
    MARKUP.get_or_init(|| {
        Regex::new(r"<w:t(?:\s[^>]*)?>([^<]*)</w:t>|</w:p>|<w:tab/>|<w:br/>")
            .expect("docx markup pattern is valid")
    })
}

/// Paragraph text of a DOCX file, one paragraph per line.
pub fn extract_text(bytes: &[u8]) -> Result<String, DocumentError> {
    let mut archive = ZipArchive::new(Cursor::new(bytes))
        .map_err(|e| DocumentError::Extraction(format!("not a DOCX archive: {e}")))?;

    let mut xml = String::new();
    archive
        .by_name(DOCUMENT_PART)
        .map_err(|e| DocumentError::Extraction(format!("missing {DOCUMENT_PART}: {e}")))?
        .read_to_string(&mut xml)
        .map_err(|e| DocumentError::Extraction(e.to_string()))?;

    Ok(document_xml_to_text(&xml))
}

fn document_xml_to_text(xml: &str) -> String {
    let mut text = String::new();
    for caps in markup().captures_iter(xml) {
        match caps.get(1) {
            Some(run) => text.push_str(&unescape(run.as_str())),
            None => match &caps[0] {
                "</w:p>" | "<w:br/>" => text.push('\n'),
                _ => text.push('\t'),
            },
        }
    }
    text
}

fn unescape(s: &str) -> String {
    s.replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&apos;", "'")
        .replace("&amp;", "&")
}
