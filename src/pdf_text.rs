use std::collections::BTreeMap;

use lopdf::content::Content;
use lopdf::{Document, Object};

use crate::error::AuditError;
use crate::model::PageText;

/// Read every page's text from an in-memory PDF, in document order.
///
/// The content stream walk is the primary source; `lopdf`'s own text
/// extraction and a whole-document `pdf-extract` pass (split on form feeds)
/// serve as fallbacks for pages the walk leaves empty. The `Document` is
/// dropped before this function returns, so no extraction can happen after
/// the byte source goes away.
pub(crate) fn read_pages(bytes: &[u8]) -> Result<Vec<PageText>, AuditError> {
    let document = Document::load_mem(bytes)?;
    let pages_map = document.get_pages();

    let fallback_pages = pdf_extract::extract_text_from_mem(bytes)
        .ok()
        .map(|text| split_form_feed_pages(&text))
        .filter(|pages| pages.len() == pages_map.len());

    let mut pages = Vec::with_capacity(pages_map.len());
    for (index, (page_no, page_id)) in pages_map.iter().enumerate() {
        let mut text = page_text_from_content(&document, *page_id).unwrap_or_default();

        if text.trim().is_empty() {
            if let Ok(extracted) = document.extract_text(&[*page_no]) {
                text = extracted;
            }
        }

        if text.trim().is_empty() {
            if let Some(fallback) = fallback_pages
                .as_ref()
                .and_then(|fallback| fallback.get(index))
            {
                text = fallback.clone();
            }
        }

        pages.push(PageText {
            page_number: *page_no,
            text,
        });
    }

    Ok(pages)
}

/// Page-ordered transcript: each page's text (if any) followed by a newline.
#[must_use]
pub(crate) fn build_transcript(pages: &[PageText]) -> String {
    let mut transcript = String::new();
    for page in pages {
        if !page.text.trim().is_empty() {
            transcript.push_str(&page.text);
            transcript.push('\n');
        }
    }
    transcript
}

fn split_form_feed_pages(raw_text: &str) -> Vec<String> {
    let mut pages = raw_text
        .split('\u{000C}')
        .map(str::to_string)
        .collect::<Vec<_>>();
    if pages.last().is_some_and(String::is_empty) {
        pages.pop();
    }
    pages
}

/// Walk a page's content stream and reassemble its text lines.
///
/// Text-showing operators append to the current line; positioning operators
/// and `ET` terminate it. Large negative kerning values inside `TJ` arrays
/// are treated as cell gaps and become spaces.
fn page_text_from_content(document: &Document, page_id: lopdf::ObjectId) -> Option<String> {
    fn append_operands(text: &mut String, encoding: Option<&str>, operands: &[Object]) {
        for operand in operands {
            match operand {
                Object::String(bytes, _) => {
                    text.push_str(&Document::decode_text(encoding, bytes));
                }
                Object::Array(items) => {
                    append_operands(text, encoding, items);
                    text.push(' ');
                }
                Object::Integer(kerning) => {
                    if *kerning < -100 {
                        text.push(' ');
                    }
                }
                _ => {}
            }
        }
    }

    let raw_content = document.get_page_content(page_id).ok()?;
    let content = Content::decode(&raw_content).ok()?;
    let font_encodings = document
        .get_page_fonts(page_id)
        .into_iter()
        .map(|(name, font)| (name, font.get_font_encoding()))
        .collect::<BTreeMap<Vec<u8>, &str>>();

    let mut lines = Vec::new();
    let mut current = String::new();
    let mut current_encoding = None;
    for operation in content.operations {
        match operation.operator.as_str() {
            "Tf" => {
                if let Some(font_name) = operation
                    .operands
                    .first()
                    .and_then(|operand| operand.as_name().ok())
                {
                    current_encoding = font_encodings.get(font_name).copied();
                }
            }
            "Tj" | "TJ" | "'" | "\"" => {
                append_operands(&mut current, current_encoding, &operation.operands);
            }
            "T*" | "Td" | "TD" | "ET" => {
                if !current.trim().is_empty() {
                    lines.push(std::mem::take(&mut current));
                }
            }
            _ => {}
        }
    }

    if !current.trim().is_empty() {
        lines.push(current);
    }

    if lines.is_empty() {
        None
    } else {
        Some(lines.join("\n"))
    }
}
