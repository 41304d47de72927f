//! Transcript export to a paginated A4 PDF.
//!
//! The transcript is first laid out as one tall column of fixed-width text
//! lines, then cut into page-sized windows: the first page shows the column
//! at offset 0, every further page shifts it up by one page height until no
//! height is left.

use chrono::NaiveDate;
use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Document, Object, ObjectId, Stream};

use super::{markdown, ChatMessage, Sender};
use crate::error::AppError;

/// A4 portrait in PostScript points.
pub const PAGE_WIDTH: f32 = 595.0;
pub const PAGE_HEIGHT: f32 = 842.0;

const MARGIN: f32 = 40.0;
const FONT_SIZE: f32 = 10.0;
pub const LINE_HEIGHT: f32 = 14.0;
/// Courier advance width is 600/1000 em.
const CHAR_WIDTH: f32 = FONT_SIZE * 0.6;

/// Characters that fit between the side margins.
pub fn columns() -> usize {
    ((PAGE_WIDTH - 2.0 * MARGIN) / CHAR_WIDTH).floor() as usize
}

/// Lines per page; the page window is a whole number of lines so no line is
/// ever cut in half.
pub fn lines_per_page() -> usize {
    ((PAGE_HEIGHT - 2.0 * MARGIN) / LINE_HEIGHT).floor() as usize
}

/// One rendered row of the transcript column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Line {
    pub text: String,
    /// Sender label rows are set in bold.
    pub label: bool,
}

impl Line {
    fn label(text: impl Into<String>) -> Self {
        Self { text: text.into(), label: true }
    }

    fn body(text: impl Into<String>) -> Self {
        Self { text: text.into(), label: false }
    }
}

/// Lay out `messages` into rows at most `columns` characters wide.
///
/// Each message is a sender label, its wrapped text, then one blank row.
pub fn layout(messages: &[ChatMessage], assistant: &str, columns: usize) -> Vec<Line> {
    let columns = columns.max(1);
    let mut lines = Vec::new();
    for m in messages {
        let who = match m.sender {
            Sender::Visitor => "You",
            Sender::Assistant => assistant,
        };
        lines.push(Line::label(format!("{who}:")));
        for paragraph in markdown::to_plain(&m.text).split('\n') {
            for row in wrap(paragraph, columns) {
                lines.push(Line::body(row));
            }
        }
        lines.push(Line::body(""));
    }
    lines
}

/// Greedy word wrap; words longer than a row are hard-split.
fn wrap(text: &str, columns: usize) -> Vec<String> {
    let mut rows = Vec::new();
    let mut current = String::new();
    let mut width = 0usize;

    for word in text.split_whitespace() {
        let mut chars: Vec<char> = word.chars().collect();
        let needed = chars.len() + usize::from(width > 0);
        if width > 0 && width + needed > columns {
            rows.push(std::mem::take(&mut current));
            width = 0;
        }
        while chars.len() > columns {
            if width > 0 {
                rows.push(std::mem::take(&mut current));
                width = 0;
            }
            let rest = chars.split_off(columns);
            rows.push(chars.into_iter().collect());
            chars = rest;
        }
        if width > 0 {
            current.push(' ');
            width += 1;
        }
        width += chars.len();
        current.extend(chars);
    }
    if !current.is_empty() || rows.is_empty() {
        rows.push(current);
    }
    rows
}

/// Vertical offsets of the content column on each page.
///
/// The first page is always emitted, even for empty content.
pub fn paginate(total_height: f32, page_height: f32) -> Vec<f32> {
    let mut positions = vec![0.0];
    if page_height <= 0.0 {
        return positions;
    }
    let mut height_left = total_height - page_height;
    let mut position = 0.0;
    while height_left > 0.0 {
        position -= page_height;
        positions.push(position);
        height_left -= page_height;
    }
    positions
}

/// `AI-Chat-{Owner-Name}-{YYYY-MM-DD}.pdf`
pub fn export_filename(owner: &str, date: NaiveDate) -> String {
    let owner: Vec<&str> = owner.split_whitespace().collect();
    format!("AI-Chat-{}-{}.pdf", owner.join("-"), date.format("%Y-%m-%d"))
}

/// Render the transcript to PDF bytes.
pub fn render_pdf(messages: &[ChatMessage], title: &str, assistant: &str) -> Result<Vec<u8>, AppError> {
    let mut lines = vec![Line::label(title), Line::body("")];
    lines.extend(layout(messages, assistant, columns()));

    let per_page = lines_per_page();
    let page_height = per_page as f32 * LINE_HEIGHT;
    let offsets = paginate(lines.len() as f32 * LINE_HEIGHT, page_height);

    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();
    let regular = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Courier",
    });
    let bold = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Courier-Bold",
    });
    let resources_id = doc.add_object(dictionary! {
        "Font" => dictionary! {
            "F1" => regular,
            "F2" => bold,
        },
    });

    let mut kids: Vec<Object> = Vec::with_capacity(offsets.len());
    for offset in &offsets {
        // Page k shows the rows whose top lies in [k*h, (k+1)*h).
        let first = ((-offset) / LINE_HEIGHT).round() as usize;
        let window = lines.iter().skip(first).take(per_page);
        let page_id = add_page(&mut doc, pages_id, window)?;
        kids.push(page_id.into());
    }

    let count = kids.len() as i64;
    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => count,
            "Resources" => resources_id,
            "MediaBox" => vec![0.into(), 0.into(), PAGE_WIDTH.into(), PAGE_HEIGHT.into()],
        }),
    );
    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);
    doc.compress();

    let mut out = Vec::new();
    doc.save_to(&mut out)
        .map_err(|e| AppError::Export(format!("failed to write PDF: {e}")))?;
    Ok(out)
}

fn add_page<'a>(
    doc: &mut Document,
    parent: ObjectId,
    rows: impl Iterator<Item = &'a Line>,
) -> Result<ObjectId, AppError> {
    let mut ops = vec![
        Operation::new("BT", vec![]),
        Operation::new("TL", vec![LINE_HEIGHT.into()]),
        Operation::new("Td", vec![MARGIN.into(), (PAGE_HEIGHT - MARGIN - FONT_SIZE).into()]),
    ];
    let mut font: Option<bool> = None;
    for line in rows {
        if font != Some(line.label) {
            let name = if line.label { "F2" } else { "F1" };
            ops.push(Operation::new("Tf", vec![name.into(), FONT_SIZE.into()]));
            font = Some(line.label);
        }
        ops.push(Operation::new("Tj", vec![Object::string_literal(win_ansi(&line.text))]));
        ops.push(Operation::new("T*", vec![]));
    }
    ops.push(Operation::new("ET", vec![]));

    let encoded = Content { operations: ops }
        .encode()
        .map_err(|e| AppError::Export(format!("failed to encode page: {e}")))?;
    let content_id = doc.add_object(Stream::new(dictionary! {}, encoded));
    Ok(doc.add_object(dictionary! {
        "Type" => "Page",
        "Parent" => parent,
        "Contents" => content_id,
    }))
}

/// The standard 14 fonts only cover Latin-1; anything else becomes `?`.
fn win_ansi(text: &str) -> Vec<u8> {
    text.chars()
        .map(|c| match c {
            '\u{2018}' | '\u{2019}' => b'\'',
            '\u{201C}' | '\u{201D}' => b'"',
            '\u{2013}' | '\u{2014}' => b'-',
            '\u{2022}' => b'*',
            c if (c as u32) < 0x100 && !c.is_control() => c as u32 as u8,
            _ => b'?',
        })
        .collect()
}
