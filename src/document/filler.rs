//! Placeholder substitution for payslip templates.
//!
//! A paragraph containing `{Field}` tokens is rewritten as a single run: the
//! substituted text, formatted like the paragraph's first run, followed by
//! every drawing the original runs carried. Paragraphs without tokens are
//! left exactly as they were.

use lazy_static::lazy_static;
use regex::{Captures, Regex};

use super::docx::DocxDocument;
use super::xml::{XmlElement, XmlNode};
use crate::payroll::{fields, keys_match, Record};

lazy_static! {
    static ref PLACEHOLDER: Regex = Regex::new(r"\{([^{}]*?)\}").expect("placeholder regex");
}

/// Run properties carried over from the first original run, in schema order.
const INHERITED_PROPERTIES: [&str; 6] = ["w:rFonts", "w:b", "w:i", "w:color", "w:sz", "w:u"];

/// Fill every body and table-cell paragraph of `document` from `record`.
pub fn fill_document(document: &mut DocxDocument, record: &Record) {
    if let Some(body) = document.body_mut() {
        fill_block(body, record);
    }
}

/// Fill the paragraphs of a block container (`w:body` or `w:tc`), descending
/// into tables.
pub fn fill_block(container: &mut XmlElement, record: &Record) {
    for child in container.elements_mut() {
        match child.name.as_str() {
            "w:p" => {
                fill_paragraph(child, record);
            }
            "w:tbl" => {
                for row in child.elements_mut().filter(|e| e.is("w:tr")) {
                    for cell in row.elements_mut().filter(|e| e.is("w:tc")) {
                        fill_block(cell, record);
                    }
                }
            }
            _ => {}
        }
    }
}

/// Substitute placeholders in one `w:p` element. Returns whether it changed.
pub fn fill_paragraph(paragraph: &mut XmlElement, record: &Record) -> bool {
    let runs: Vec<&XmlElement> = paragraph.elements().filter(|e| e.is("w:r")).collect();
    let full_text: String = runs.iter().map(|r| run_text(r)).collect();

    if !PLACEHOLDER.is_match(&full_text) {
        return false;
    }

    let substituted = substitute(&full_text, record);
    let mut new_run = text_run(&substituted, runs.first().copied());
    for run in &runs {
        for drawing in run.elements().filter(|e| is_drawing(e)) {
            new_run.push(drawing.clone());
        }
    }

    paragraph
        .children
        .retain(|node| matches!(node, XmlNode::Element(e) if e.is("w:pPr")));
    paragraph.push(new_run);
    true
}

/// Replace every `{key}` in `text` with the record's value for `key`.
pub fn substitute(text: &str, record: &Record) -> String {
    PLACEHOLDER
        .replace_all(text, |caps: &Captures<'_>| placeholder_value(&caps[1], record))
        .into_owned()
}

fn placeholder_value(key: &str, record: &Record) -> String {
    let value = record.text(key).unwrap_or_default();
    if keys_match(key, fields::NAME) {
        value.to_uppercase()
    } else {
        value
    }
}

/// Visible text of a run: text nodes, tabs and line breaks.
fn run_text(run: &XmlElement) -> String {
    let mut out = String::new();
    for child in run.elements() {
        match child.name.as_str() {
            "w:t" => out.push_str(&child.text()),
            "w:tab" | "w:ptab" => out.push('\t'),
            "w:br" | "w:cr" => out.push('\n'),
            "w:noBreakHyphen" => out.push('-'),
            _ => {}
        }
    }
    out
}

fn is_drawing(element: &XmlElement) -> bool {
    matches!(element.local_name(), "drawing" | "pict")
}

fn text_run(text: &str, template: Option<&XmlElement>) -> XmlElement {
    let mut run = XmlElement::new("w:r");
    if let Some(props) = template.and_then(inherited_properties) {
        run.push(props);
    }

    let mut segment = String::new();
    for ch in text.chars() {
        match ch {
            '\t' | '\n' | '\r' => {
                flush_text(&mut run, &mut segment);
                run.push(XmlElement::new(if ch == '\t' { "w:tab" } else { "w:br" }));
            }
            _ => segment.push(ch),
        }
    }
    flush_text(&mut run, &mut segment);
    run
}

fn flush_text(run: &mut XmlElement, segment: &mut String) {
    if segment.is_empty() {
        return;
    }
    run.push(
        XmlElement::new("w:t")
            .with_attr("xml:space", "preserve")
            .with_text(segment),
    );
    segment.clear();
}

fn inherited_properties(run: &XmlElement) -> Option<XmlElement> {
    let source = run.child("w:rPr")?;
    let mut props = XmlElement::new("w:rPr");

    for name in INHERITED_PROPERTIES {
        let Some(prop) = source.child(name) else {
            continue;
        };
        match name {
            "w:rFonts" => {
                if let Some(font) = prop.attr("w:ascii").or_else(|| prop.attr("w:hAnsi")) {
                    props.push(
                        XmlElement::new("w:rFonts")
                            .with_attr("w:ascii", font)
                            .with_attr("w:hAnsi", font),
                    );
                }
            }
            "w:color" => {
                if prop.attr("w:val").is_some_and(|v| !v.eq_ignore_ascii_case("auto")) {
                    props.push(prop.clone());
                }
            }
            _ => props.push(prop.clone()),
        }
    }

    if props.children.is_empty() {
        None
    } else {
        Some(props)
    }
}
