//! Renders plain text into a paginated PDF with `lopdf`.
//!
//! Each input line is a paragraph cell: wrapped to the text width, one line
//! cell per wrapped line, new page when the next cell would cross the bottom
//! margin. Every printed line gets its own BT/ET block so text extractors see
//! a line break between cells.

use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Document, Object, ObjectId, Stream};
use tracing::debug;

use crate::export::font_metrics::{FontMetricTable, PageConfig, HELVETICA};
use crate::export::winansi;
use crate::export::ExportError;

const FONT_RESOURCE: &str = "F1";

/// Renders `text` to PDF bytes using the given page geometry and Helvetica.
pub fn render_pdf(text: &str, config: &PageConfig) -> Result<Vec<u8>, ExportError> {
    let lines = layout_lines(text, &HELVETICA, config)?;
    let pages: Vec<&[Vec<u8>]> = lines.chunks(config.lines_per_page()).collect();
    debug!(
        "Exporting {} printed lines across {} page(s)",
        lines.len(),
        pages.len()
    );

    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();

    let font_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => HELVETICA.base_font,
        "Encoding" => "WinAnsiEncoding",
    });
    let resources_id = doc.add_object(dictionary! {
        "Font" => dictionary! {
            FONT_RESOURCE => font_id,
        },
    });

    let mut kids: Vec<Object> = Vec::with_capacity(pages.len());
    for page_lines in pages {
        let page_id = add_page(&mut doc, pages_id, resources_id, page_lines, config)?;
        kids.push(page_id.into());
    }

    let page_count = kids.len() as i64;
    let media_box: Vec<Object> = vec![
        0.into(),
        0.into(),
        config.page_width_pt.into(),
        config.page_height_pt.into(),
    ];
    let pages_dict = dictionary! {
        "Type" => "Pages",
        "Kids" => kids,
        "Count" => page_count,
        "MediaBox" => media_box,
    };
    doc.objects.insert(pages_id, Object::Dictionary(pages_dict));

    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);
    doc.compress();

    let mut buffer = Vec::new();
    doc.save_to(&mut buffer)
        .map_err(|e| ExportError::Render(format!("failed to serialize PDF: {e}")))?;
    Ok(buffer)
}

/// Splits, validates, wraps, and encodes the text into printed lines.
///
/// Blank printed lines are kept as empty byte strings so they still take a slot.
fn layout_lines(
    text: &str,
    metrics: &FontMetricTable,
    config: &PageConfig,
) -> Result<Vec<Vec<u8>>, ExportError> {
    let max_width_em = config.text_width_em();
    let mut printed = Vec::new();

    for (index, raw) in text.split('\n').enumerate() {
        let paragraph = raw.strip_suffix('\r').unwrap_or(raw).replace('\t', " ");

        if let Some(character) = paragraph.chars().find(|&c| winansi::encode_char(c).is_none()) {
            return Err(ExportError::UnsupportedCharacter {
                character,
                line: index + 1,
            });
        }

        for line in metrics.wrap(&paragraph, max_width_em) {
            let encoded = winansi::encode_str(&line).map_err(|character| {
                ExportError::UnsupportedCharacter {
                    character,
                    line: index + 1,
                }
            })?;
            printed.push(encoded);
        }
    }

    Ok(printed)
}

fn add_page(
    doc: &mut Document,
    pages_id: ObjectId,
    resources_id: ObjectId,
    lines: &[Vec<u8>],
    config: &PageConfig,
) -> Result<ObjectId, ExportError> {
    let mut operations = Vec::new();

    for (slot, line) in lines.iter().enumerate() {
        if line.is_empty() {
            continue;
        }
        operations.push(Operation::new("BT", vec![]));
        operations.push(Operation::new(
            "Tf",
            vec![FONT_RESOURCE.into(), config.font_size_pt.into()],
        ));
        operations.push(Operation::new(
            "Td",
            vec![config.text_x().into(), config.baseline_y(slot).into()],
        ));
        operations.push(Operation::new(
            "Tj",
            vec![Object::string_literal(line.clone())],
        ));
        operations.push(Operation::new("ET", vec![]));
    }

    let content = Content { operations };
    let encoded = content
        .encode()
        .map_err(|e| ExportError::Render(format!("failed to encode page content: {e}")))?;
    let content_id = doc.add_object(Stream::new(dictionary! {}, encoded));

    Ok(doc.add_object(dictionary! {
        "Type" => "Page",
        "Parent" => pages_id,
        "Contents" => content_id,
        "Resources" => resources_id,
    }))
}
