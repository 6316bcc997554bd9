//! XLIFF 1.2 format adapter.
//!
//! The parser keeps the document as a sequence of verbatim text segments with
//! one placeholder per `<trans-unit>`; each unit carries its own layout
//! ([`UnitMarkup`]). Serializing an untouched document reproduces the input
//! byte-for-byte, and edits made through [`XliffDocument::units_mut`] only
//! change the bytes of the units they touch.
//!
//! Layout rules for edited units:
//! - a target set on a unit without `<target>` is written right after
//!   `<source>`, with the same indentation as `<source>`;
//! - a unit whose target is `None` is written without `<target>`;
//! - a removed unit disappears together with its leading indentation;
//! - units added in code are appended at the end of the last `<body>`.

use std::collections::HashSet;

use quick_xml::escape::escape;
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;

use crate::error::FormatError;
use crate::types::{TranslationUnit, UnitCollection};

const ROOT_TAG: &[u8] = b"xliff";
const BODY_TAG: &[u8] = b"body";
const UNIT_TAG: &[u8] = b"trans-unit";
const SOURCE_TAG: &[u8] = b"source";
const TARGET_TAG: &[u8] = b"target";

/// Indentation used for units that have no captured layout.
const BOM: &str = "\u{feff}";

const DEFAULT_UNIT_INDENT: &str = "\n      ";

// ---------------------------------------------------------------------------
// Document model
// ---------------------------------------------------------------------------

/// Pass-through layout of a parsed `<trans-unit>`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnitMarkup {
    /// Whitespace preceding `<trans-unit`.
    indent: String,
    /// Raw start-tag content between `<` and `>`.
    open: String,
    /// Qualified element name, for the end tag.
    name: String,
    children: Vec<Child>,
    /// Whitespace preceding `</trans-unit>`.
    closing: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Child {
    Source(Slot),
    Target(Slot),
    /// Anything else (notes, context groups, comments), verbatim.
    Other(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct Slot {
    ws: String,
    open: String,
    name: String,
    /// Written as `<source/>` in the input.
    empty: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Raw(String),
    Unit(String),
    /// Insertion point at the end of a `<body>`.
    BodyEnd,
}

/// A parsed XLIFF file: its envelope plus the unit collection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct XliffDocument {
    segments: Vec<Segment>,
    units: UnitCollection,
}

impl XliffDocument {
    pub fn units(&self) -> &UnitCollection {
        &self.units
    }

    pub fn units_mut(&mut self) -> &mut UnitCollection {
        &mut self.units
    }

    pub fn into_units(self) -> UnitCollection {
        self.units
    }
}

// ---------------------------------------------------------------------------
// Parse
// ---------------------------------------------------------------------------

/// Parse XLIFF text into a document.
pub fn parse(raw: &str) -> Result<XliffDocument, FormatError> {
    // The reader skips a byte-order mark without counting it in its offsets.
    let (bom, raw) = match raw.strip_prefix(BOM) {
        Some(rest) => (BOM, rest),
        None => ("", raw),
    };
    let mut reader = Reader::from_str(raw);
    let mut segments = Vec::new();
    push_raw(&mut segments, bom);
    let mut units = UnitCollection::new();
    let mut raw_start = 0;
    let mut depth = 0usize;
    let mut saw_root = false;

    loop {
        let event = next_event(&mut reader)?;
        let after = reader.buffer_position();
        match event {
            Event::Start(e) if e.local_name().as_ref() == UNIT_TAG => {
                let tag_start = tag_offset(raw, after);
                let (head, indent) = split_trailing_ws(&raw[raw_start..tag_start]);
                push_raw(&mut segments, head);

                let unit = parse_unit(&mut reader, raw, &e, tag_start, indent)?;
                if units.contains(&unit.id) {
                    return Err(FormatError::DuplicateId { id: unit.id });
                }
                segments.push(Segment::Unit(unit.id.clone()));
                units.insert(unit);
                raw_start = reader.buffer_position();
            }
            Event::Empty(e) if e.local_name().as_ref() == UNIT_TAG => {
                let id = unit_id(&e, tag_offset(raw, after))?;
                return Err(FormatError::MissingSource { id });
            }
            Event::Start(e) => {
                if depth == 0 && e.local_name().as_ref() == ROOT_TAG {
                    saw_root = true;
                }
                depth += 1;
            }
            Event::Empty(e) => {
                if depth == 0 && e.local_name().as_ref() == ROOT_TAG {
                    saw_root = true;
                }
            }
            Event::End(e) => {
                depth = depth.saturating_sub(1);
                if e.local_name().as_ref() == BODY_TAG {
                    let tag_start = tag_offset(raw, after);
                    let (head, ws) = split_trailing_ws(&raw[raw_start..tag_start]);
                    push_raw(&mut segments, head);
                    segments.push(Segment::BodyEnd);
                    raw_start = tag_start - ws.len();
                }
            }
            Event::Eof => break,
            _ => {}
        }
    }

    if depth != 0 {
        return Err(FormatError::Unbalanced { open: depth });
    }
    if !saw_root {
        return Err(FormatError::NotXliff);
    }
    push_raw(&mut segments, &raw[raw_start..]);

    tracing::debug!(units = units.len(), "parsed XLIFF document");
    Ok(XliffDocument { segments, units })
}

fn parse_unit(
    reader: &mut Reader<&[u8]>,
    raw: &str,
    start: &BytesStart<'_>,
    tag_start: usize,
    indent: &str,
) -> Result<TranslationUnit, FormatError> {
    let id = unit_id(start, tag_start)?;
    let open_end = reader.buffer_position();
    let mut markup = UnitMarkup {
        indent: indent.to_owned(),
        open: raw[tag_start + 1..open_end - 1].to_owned(),
        name: qualified_name(start),
        children: Vec::new(),
        closing: String::new(),
    };
    let mut source: Option<String> = None;
    let mut target: Option<String> = None;
    let mut chunk_start = open_end;
    let mut depth = 0usize;

    loop {
        let event = next_event(reader)?;
        let after = reader.buffer_position();
        let empty = matches!(event, Event::Empty(_));
        match event {
            Event::Start(e) | Event::Empty(e) if depth == 0 && is_slot(&e, &source, &target) => {
                let tag_start = tag_offset(raw, after);
                let (head, ws) = split_trailing_ws(&raw[chunk_start..tag_start]);
                if !head.is_empty() {
                    markup.children.push(Child::Other(head.to_owned()));
                }

                let (open, text) = if empty {
                    (&raw[tag_start + 1..after - 2], String::new())
                } else {
                    let inner_end = skip_to_end(reader, raw)?;
                    (&raw[tag_start + 1..after - 1], raw[after..inner_end].to_owned())
                };
                let slot = Slot {
                    ws: ws.to_owned(),
                    open: open.to_owned(),
                    name: qualified_name(&e),
                    empty,
                };

                if e.local_name().as_ref() == SOURCE_TAG {
                    check_fragment(&text)
                        .map_err(|detail| invalid_fragment(&id, "source", detail))?;
                    source = Some(text);
                    markup.children.push(Child::Source(slot));
                } else {
                    check_fragment(&text)
                        .map_err(|detail| invalid_fragment(&id, "target", detail))?;
                    target = Some(text);
                    markup.children.push(Child::Target(slot));
                }
                chunk_start = reader.buffer_position();
            }
            Event::Start(_) => depth += 1,
            Event::End(_) if depth == 0 => {
                let tag_start = tag_offset(raw, after);
                let (head, ws) = split_trailing_ws(&raw[chunk_start..tag_start]);
                if !head.is_empty() {
                    markup.children.push(Child::Other(head.to_owned()));
                }
                markup.closing = ws.to_owned();
                break;
            }
            Event::End(_) => depth -= 1,
            Event::Eof => return Err(FormatError::Unbalanced { open: depth + 1 }),
            _ => {}
        }
    }

    let source = source.ok_or_else(|| FormatError::MissingSource { id: id.clone() })?;
    Ok(TranslationUnit {
        id,
        source,
        target,
        markup: Some(markup),
    })
}

/// `true` for the first `<source>` / `<target>` child of a unit.
fn is_slot(e: &BytesStart<'_>, source: &Option<String>, target: &Option<String>) -> bool {
    match e.local_name().as_ref() {
        SOURCE_TAG => source.is_none(),
        TARGET_TAG => target.is_none(),
        _ => false,
    }
}

/// Consume events up to the end tag closing the current element and return
/// the byte offset where that end tag starts.
fn skip_to_end(reader: &mut Reader<&[u8]>, raw: &str) -> Result<usize, FormatError> {
    let mut depth = 0usize;
    loop {
        match next_event(reader)? {
            Event::Start(_) => depth += 1,
            Event::End(_) if depth == 0 => return Ok(tag_offset(raw, reader.buffer_position())),
            Event::End(_) => depth -= 1,
            Event::Eof => return Err(FormatError::Unbalanced { open: depth + 1 }),
            _ => {}
        }
    }
}

fn next_event<'a>(reader: &mut Reader<&'a [u8]>) -> Result<Event<'a>, FormatError> {
    reader.read_event().map_err(|source| FormatError::Xml {
        position: reader.buffer_position(),
        source,
    })
}

fn unit_id(start: &BytesStart<'_>, position: usize) -> Result<String, FormatError> {
    let attr = start
        .try_get_attribute("id")
        .map_err(|e| FormatError::Xml {
            position,
            source: e.into(),
        })?
        .ok_or(FormatError::MissingId { position })?;
    attr.unescape_value()
        .map(|v| v.into_owned())
        .map_err(|source| FormatError::Xml { position, source })
}

fn qualified_name(e: &BytesStart<'_>) -> String {
    String::from_utf8_lossy(e.name().as_ref()).into_owned()
}

/// Offset of the `<` opening the tag that ends just before `after`.
///
/// `<` cannot appear unescaped inside a well-formed tag, so the last one
/// before the tag's `>` is its start.
fn tag_offset(raw: &str, after: usize) -> usize {
    raw[..after].rfind('<').unwrap_or(0)
}

fn split_trailing_ws(s: &str) -> (&str, &str) {
    let head = s.trim_end_matches(|c: char| c.is_ascii_whitespace());
    (head, &s[head.len()..])
}

fn push_raw(segments: &mut Vec<Segment>, text: &str) {
    if text.is_empty() {
        return;
    }
    if let Some(Segment::Raw(prev)) = segments.last_mut() {
        prev.push_str(text);
    } else {
        segments.push(Segment::Raw(text.to_owned()));
    }
}

/// Check that inline content re-parses as XML element content.
fn check_fragment(text: &str) -> Result<(), String> {
    let wrapped = format!("<f>{text}</f>");
    let mut reader = Reader::from_str(&wrapped);
    let mut depth = 0usize;
    loop {
        match reader.read_event().map_err(|e| e.to_string())? {
            Event::Start(_) => depth += 1,
            Event::End(_) => depth = depth.saturating_sub(1),
            Event::Text(t) => {
                t.unescape().map_err(|e| e.to_string())?;
            }
            Event::Eof if depth == 0 => return Ok(()),
            Event::Eof => return Err("unclosed inline element".to_string()),
            _ => {}
        }
    }
}

fn invalid_fragment(id: &str, field: &'static str, detail: String) -> FormatError {
    FormatError::InvalidFragment {
        id: id.to_owned(),
        field,
        detail,
    }
}

// ---------------------------------------------------------------------------
// Serialize
// ---------------------------------------------------------------------------

/// Serialize a document back to XLIFF text.
pub fn serialize(doc: &XliffDocument) -> Result<String, FormatError> {
    for unit in doc.units.iter() {
        check_fragment(&unit.source).map_err(|d| invalid_fragment(&unit.id, "source", d))?;
        if let Some(target) = &unit.target {
            check_fragment(target).map_err(|d| invalid_fragment(&unit.id, "target", d))?;
        }
    }

    let placed: HashSet<&str> = doc
        .segments
        .iter()
        .filter_map(|s| match s {
            Segment::Unit(id) => Some(id.as_str()),
            _ => None,
        })
        .collect();
    let appended: Vec<&TranslationUnit> = doc
        .units
        .iter()
        .filter(|u| !placed.contains(u.id.as_str()))
        .collect();
    let insert_at = doc
        .segments
        .iter()
        .rposition(|s| matches!(s, Segment::BodyEnd));
    if !appended.is_empty() && insert_at.is_none() {
        return Err(FormatError::NoBody {
            count: appended.len(),
        });
    }

    let mut out = String::new();
    let mut last_indent: &str = DEFAULT_UNIT_INDENT;
    for (index, segment) in doc.segments.iter().enumerate() {
        match segment {
            Segment::Raw(text) => out.push_str(text),
            Segment::Unit(id) => {
                if let Some(unit) = doc.units.get(id) {
                    if let Some(markup) = &unit.markup {
                        last_indent = markup.indent.as_str();
                    }
                    write_unit(&mut out, unit, last_indent);
                }
            }
            Segment::BodyEnd if Some(index) == insert_at => {
                for unit in &appended {
                    write_unit(&mut out, unit, last_indent);
                }
            }
            Segment::BodyEnd => {}
        }
    }
    Ok(out)
}

fn write_unit(out: &mut String, unit: &TranslationUnit, fallback_indent: &str) {
    let Some(markup) = &unit.markup else {
        let inner = format!("{fallback_indent}  ");
        out.push_str(fallback_indent);
        out.push_str(&format!(
            "<trans-unit id=\"{}\" datatype=\"html\">",
            escape(unit.id.as_str())
        ));
        out.push_str(&format!("{inner}<source>{}</source>", unit.source));
        if let Some(target) = &unit.target {
            out.push_str(&format!("{inner}<target>{target}</target>"));
        }
        out.push_str(fallback_indent);
        out.push_str("</trans-unit>");
        return;
    };

    let has_target_slot = markup
        .children
        .iter()
        .any(|c| matches!(c, Child::Target(_)));

    out.push_str(&markup.indent);
    out.push('<');
    out.push_str(&markup.open);
    out.push('>');
    for child in &markup.children {
        match child {
            Child::Other(text) => out.push_str(text),
            Child::Source(slot) => {
                write_slot(out, slot, &unit.source);
                if let (false, Some(target)) = (has_target_slot, &unit.target) {
                    let name = sibling_name(&slot.name, "target");
                    out.push_str(&format!("{}<{name}>{target}</{name}>", slot.ws));
                }
            }
            Child::Target(slot) => {
                if let Some(target) = &unit.target {
                    write_slot(out, slot, target);
                }
            }
        }
    }
    out.push_str(&markup.closing);
    out.push_str("</");
    out.push_str(&markup.name);
    out.push('>');
}

fn write_slot(out: &mut String, slot: &Slot, text: &str) {
    out.push_str(&slot.ws);
    if slot.empty && text.is_empty() {
        out.push_str(&format!("<{}/>", slot.open));
    } else {
        out.push_str(&format!("<{}>{text}</{}>", slot.open, slot.name));
    }
}

/// `xlf:source` → `xlf:target`; keeps the namespace prefix of `name`.
fn sibling_name(name: &str, local: &str) -> String {
    match name.rsplit_once(':') {
        Some((prefix, _)) => format!("{prefix}:{local}"),
        None => local.to_owned(),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"<?xml version="1.0" encoding="UTF-8" ?>
<xliff version="1.2" xmlns="urn:oasis:names:tc:xliff:document:1.2">
  <file source-language="en" datatype="plaintext" original="ng2.template">
    <body>
      <trans-unit id="greeting" datatype="html">
        <source>Hello <x id="INTERPOLATION" equiv-text="{{ name }}"/> &amp; welcome</source>
        <target state="translated">Bonjour <x id="INTERPOLATION" equiv-text="{{ name }}"/> &amp; bienvenue</target>
        <context-group purpose="location">
          <context context-type="sourcefile">src/app/app.component.html</context>
          <context context-type="linenumber">3</context>
        </context-group>
      </trans-unit>
      <trans-unit id="farewell" datatype="html">
        <source>Goodbye</source>
        <note priority="1" from="description">Shown on logout</note>
      </trans-unit>
      <!-- keep me -->
      <trans-unit id="empty" datatype="html">
        <source>Empty</source>
        <target/>
      </trans-unit>
    </body>
  </file>
</xliff>
"#;

    #[test]
    fn untouched_document_roundtrips_byte_for_byte() {
        let doc = parse(SAMPLE).expect("parse");
        assert_eq!(serialize(&doc).expect("serialize"), SAMPLE);
    }

    #[test]
    fn byte_order_mark_is_kept_and_offsets_stay_aligned() {
        let raw = format!("\u{feff}{SAMPLE}");
        let mut doc = parse(&raw).expect("parse");
        assert_eq!(serialize(&doc).expect("serialize"), raw);

        if let Some(unit) = doc.units_mut().get_mut("farewell") {
            unit.target = Some("Au revoir".to_string());
        }
        doc.units_mut().remove("empty");
        let out = serialize(&doc).expect("serialize");
        assert!(out.starts_with('\u{feff}'));
        assert!(out.contains("<target>Au revoir</target>"));
        let reparsed = parse(&out).expect("re-parse");
        assert_eq!(reparsed.units().ids().collect::<Vec<_>>(), vec!["greeting", "farewell"]);
        assert_eq!(
            reparsed.units().get("greeting").map(|u| u.source.as_str()),
            doc.units().get("greeting").map(|u| u.source.as_str())
        );
    }

    #[test]
    fn parse_extracts_units_in_document_order() {
        let doc = parse(SAMPLE).expect("parse");
        let units = doc.units();
        assert_eq!(
            units.ids().collect::<Vec<_>>(),
            vec!["greeting", "farewell", "empty"]
        );
        let greeting = units.get("greeting").expect("greeting");
        assert_eq!(
            greeting.source,
            r#"Hello <x id="INTERPOLATION" equiv-text="{{ name }}"/> &amp; welcome"#
        );
        assert!(greeting.target.as_deref().is_some_and(|t| t.starts_with("Bonjour")));
        assert_eq!(units.get("farewell").and_then(|u| u.target.clone()), None);
        assert_eq!(units.get("empty").and_then(|u| u.target.as_deref()), Some(""));
    }

    #[test]
    fn inserted_target_follows_source_with_same_indent() {
        let mut doc = parse(SAMPLE).expect("parse");
        if let Some(unit) = doc.units_mut().get_mut("farewell") {
            unit.target = Some("Au revoir".to_string());
        }
        let out = serialize(&doc).expect("serialize");
        assert!(out.contains(
            "        <source>Goodbye</source>\n        <target>Au revoir</target>\n        <note"
        ));
    }

    #[test]
    fn removed_unit_takes_its_indent_along() {
        let mut doc = parse(SAMPLE).expect("parse");
        doc.units_mut().remove("farewell");
        let out = serialize(&doc).expect("serialize");
        assert!(!out.contains("farewell"));
        assert!(out.contains("      </trans-unit>\n      <!-- keep me -->"));
        assert!(parse(&out).is_ok(), "output must re-parse");
    }

    #[test]
    fn cleared_target_is_omitted() {
        let mut doc = parse(SAMPLE).expect("parse");
        if let Some(unit) = doc.units_mut().get_mut("greeting") {
            unit.target = None;
        }
        let out = serialize(&doc).expect("serialize");
        assert!(!out.contains("Bonjour"));
        assert!(!out.contains("state=\"translated\""));
    }

    #[test]
    fn empty_target_element_survives_with_new_text() {
        let mut doc = parse(SAMPLE).expect("parse");
        if let Some(unit) = doc.units_mut().get_mut("empty") {
            unit.target = Some("Vide".to_string());
        }
        let out = serialize(&doc).expect("serialize");
        assert!(out.contains("<target>Vide</target>"));
    }

    #[test]
    fn units_added_in_code_land_at_end_of_body() {
        let mut doc = parse(SAMPLE).expect("parse");
        doc.units_mut()
            .insert(TranslationUnit::new("new", "Fresh").with_target("Frais"));
        let out = serialize(&doc).expect("serialize");
        let expected = "      </trans-unit>\n      <trans-unit id=\"new\" datatype=\"html\">\n        <source>Fresh</source>\n        <target>Frais</target>\n      </trans-unit>\n    </body>";
        assert!(out.contains(expected), "got:\n{out}");
        let reparsed = parse(&out).expect("reparse");
        assert_eq!(reparsed.units().len(), 4);
    }

    #[test]
    fn new_units_without_body_are_rejected() {
        let mut doc = parse(r#"<xliff version="1.2"><file/></xliff>"#).expect("parse");
        doc.units_mut().insert(TranslationUnit::new("a", "A"));
        assert!(matches!(
            serialize(&doc),
            Err(FormatError::NoBody { count: 1 })
        ));
    }

    #[test]
    fn malformed_target_text_is_rejected_on_serialize() {
        let mut doc = parse(SAMPLE).expect("parse");
        if let Some(unit) = doc.units_mut().get_mut("farewell") {
            unit.target = Some("Tom & Jerry".to_string());
        }
        assert!(matches!(
            serialize(&doc),
            Err(FormatError::InvalidFragment { field: "target", .. })
        ));
    }

    #[test]
    fn rejects_non_xliff_documents() {
        assert!(matches!(parse("just text"), Err(FormatError::NotXliff)));
        assert!(matches!(
            parse("<resources><string/></resources>"),
            Err(FormatError::NotXliff)
        ));
    }

    #[test]
    fn rejects_malformed_xml() {
        assert!(parse("<xliff><file></xliff>").is_err());
        assert!(parse("<xliff><file>").is_err());
    }

    #[test]
    fn rejects_units_without_id_or_source() {
        let no_id = r#"<xliff><file><body><trans-unit><source>a</source></trans-unit></body></file></xliff>"#;
        assert!(matches!(parse(no_id), Err(FormatError::MissingId { .. })));

        let no_source = r#"<xliff><file><body><trans-unit id="a"><target>b</target></trans-unit></body></file></xliff>"#;
        assert!(matches!(
            parse(no_source),
            Err(FormatError::MissingSource { id }) if id == "a"
        ));
    }

    #[test]
    fn rejects_duplicate_ids() {
        let dup = r#"<xliff><file><body><trans-unit id="a"><source>1</source></trans-unit><trans-unit id="a"><source>2</source></trans-unit></body></file></xliff>"#;
        assert!(matches!(parse(dup), Err(FormatError::DuplicateId { id }) if id == "a"));
    }
}
