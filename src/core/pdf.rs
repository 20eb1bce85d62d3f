//! Minimal PDF 1.4 writer: A4 portrait pages, Helvetica text, raster images.

use crate::core::raster::{RasterEncoding, RasterImage, BITS_PER_COMPONENT};
use chrono::{DateTime, Utc};
use std::fmt::Write as _;

pub const PAGE_WIDTH: f32 = 595.28;
pub const PAGE_HEIGHT: f32 = 841.89;
/// Half an inch.
pub const MARGIN: f32 = 36.0;

const CONTENT_WIDTH: f32 = PAGE_WIDTH - 2.0 * MARGIN;
const CONTENT_HEIGHT: f32 = PAGE_HEIGHT - 2.0 * MARGIN;
const BLOCK_GAP: f32 = 8.0;

/// Advance widths in 1/1000 em for WinAnsi codes 32..=126, from the
/// standard Helvetica AFM.
const HELVETICA_WIDTHS: [u16; 95] = [
    278, 278, 355, 556, 556, 889, 667, 191, 333, 333, 389, 584, 278, 333, 278, 278, // ' '..'/'
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556, // digits
    278, 278, 584, 584, 584, 556, 1015, // ':'..'@'
    667, 667, 722, 722, 667, 611, 778, 722, 278, 500, 667, 556, 833, // A-M
    722, 778, 667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611, // N-Z
    278, 278, 278, 469, 556, 333, // '['..'`'
    556, 556, 500, 556, 556, 278, 556, 556, 222, 222, 500, 222, 833, // a-m
    556, 556, 556, 556, 333, 500, 278, 556, 500, 722, 500, 500, 500, // n-z
    334, 260, 334, 584, // '{'..'~'
];

/// Same range from the Helvetica-Bold AFM.
const HELVETICA_BOLD_WIDTHS: [u16; 95] = [
    278, 333, 474, 556, 556, 889, 722, 238, 333, 333, 389, 584, 278, 333, 278, 278,
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556,
    333, 333, 584, 584, 584, 611, 975,
    722, 722, 722, 722, 667, 611, 778, 722, 278, 556, 722, 611, 833,
    722, 778, 667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611,
    333, 278, 333, 584, 556, 333,
    556, 611, 556, 611, 556, 333, 611, 611, 278, 278, 556, 278, 889,
    611, 611, 611, 611, 389, 556, 333, 611, 556, 778, 556, 556, 500,
    389, 280, 389, 584,
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Font {
    Regular,
    Bold,
}

impl Font {
    fn resource(self) -> &'static str {
        match self {
            Font::Regular => "F1",
            Font::Bold => "F2",
        }
    }

    /// Advance width of one WinAnsi code in 1/1000 em. Codes outside the
    /// ASCII table get the widest glyph of their class so lines never overrun.
    fn glyph_width(self, code: u8) -> u16 {
        let table = match self {
            Font::Regular => &HELVETICA_WIDTHS,
            Font::Bold => &HELVETICA_BOLD_WIDTHS,
        };
        match code {
            32..=126 => table[(code - 32) as usize],
            0xA0 => 278,
            0xC0..=0xDE => 778,
            0xDF..=0xFF => 611,
            _ => 1000,
        }
    }

    fn text_width(self, text: &str, size: f32) -> f32 {
        let units: u32 = text
            .chars()
            .map(|c| self.glyph_width(win_ansi(c)) as u32)
            .sum();
        units as f32 * size / 1000.0
    }
}

pub enum Element<'a> {
    Title(&'a str),
    Heading(&'a str),
    Paragraph(&'a str),
    Image {
        image: &'a RasterImage,
        max_width: f32,
    },
    Placeholder {
        label: &'a str,
        max_width: f32,
    },
}

pub struct DocumentInfo<'a> {
    pub title: &'a str,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug)]
pub struct RenderedPdf {
    pub bytes: Vec<u8>,
    pub page_count: usize,
}

struct Layout<'a> {
    pages: Vec<Vec<u8>>,
    images: Vec<&'a RasterImage>,
    y: f32,
}

impl<'a> Layout<'a> {
    fn new() -> Self {
        Self {
            pages: vec![Vec::new()],
            images: Vec::new(),
            y: PAGE_HEIGHT - MARGIN,
        }
    }

    fn at_page_top(&self) -> bool {
        self.y >= PAGE_HEIGHT - MARGIN
    }

    fn ensure_space(&mut self, height: f32) {
        if self.y - height < MARGIN && !self.at_page_top() {
            self.pages.push(Vec::new());
            self.y = PAGE_HEIGHT - MARGIN;
        }
    }

    fn page(&mut self) -> &mut Vec<u8> {
        // a layout always holds at least one page
        let last = self.pages.len() - 1;
        &mut self.pages[last]
    }

    fn text(&mut self, text: &str, font: Font, size: f32) {
        let leading = size * 1.3;
        for line in wrap(text, font, size) {
            self.ensure_space(leading);
            self.y -= leading;
            let y = self.y + (leading - size);
            let mut op = format!(
                "BT /{} {} Tf {} {} Td (",
                font.resource(),
                fmt_num(size),
                fmt_num(MARGIN),
                fmt_num(y)
            )
            .into_bytes();
            op.extend(encode_text(&line));
            op.extend_from_slice(b") Tj ET\n");
            self.page().extend(op);
        }
        self.y -= size * 0.5;
    }

    fn image(&mut self, image: &'a RasterImage, max_width: f32) {
        let (width, height) = fit(image.width as f32, image.height as f32, max_width);
        self.ensure_space(height);
        self.y -= height;

        self.images.push(image);
        let name = self.images.len();
        let op = format!(
            "q {} 0 0 {} {} {} cm /Im{} Do Q\n",
            fmt_num(width),
            fmt_num(height),
            fmt_num(MARGIN),
            fmt_num(self.y),
            name
        );
        self.page().extend_from_slice(op.as_bytes());
        self.y -= BLOCK_GAP;
    }

    fn placeholder(&mut self, label: &str, max_width: f32) {
        let width = max_width.min(CONTENT_WIDTH);
        let height = width * 0.6;
        self.ensure_space(height);
        self.y -= height;

        let mut op = format!(
            "q 0.9 g {x} {y} {w} {h} re f 0.6 G {x} {y} {w} {h} re S Q\nBT /F1 9 Tf {tx} {ty} Td (",
            x = fmt_num(MARGIN),
            y = fmt_num(self.y),
            w = fmt_num(width),
            h = fmt_num(height),
            tx = fmt_num(MARGIN + 6.0),
            ty = fmt_num(self.y + height / 2.0 - 3.0),
        )
        .into_bytes();
        op.extend(encode_text(label));
        op.extend_from_slice(b") Tj ET\n");
        self.page().extend(op);
        self.y -= BLOCK_GAP;
    }
}

/// Scales to `max_width` (never wider than the content box) and keeps the
/// result within one page.
fn fit(width: f32, height: f32, max_width: f32) -> (f32, f32) {
    let target = max_width.min(CONTENT_WIDTH).min(width.max(1.0));
    let mut scaled = (target, target * height / width.max(1.0));
    if scaled.1 > CONTENT_HEIGHT {
        let ratio = CONTENT_HEIGHT / scaled.1;
        scaled = (scaled.0 * ratio, CONTENT_HEIGHT);
    }
    scaled
}

/// Greedy word wrap against the content width, measured with the font's
/// glyph widths. Words wider than a full line are split between characters.
fn wrap(text: &str, font: Font, size: f32) -> Vec<String> {
    let fits = |candidate: &str| font.text_width(candidate, size) <= CONTENT_WIDTH;
    let mut lines = Vec::new();

    for paragraph in text.lines() {
        let mut line = String::new();
        for word in paragraph.split_whitespace() {
            let candidate = if line.is_empty() {
                word.to_string()
            } else {
                format!("{} {}", line, word)
            };
            if fits(&candidate) {
                line = candidate;
                continue;
            }

            if !line.is_empty() {
                lines.push(std::mem::take(&mut line));
            }
            for c in word.chars() {
                line.push(c);
                if !fits(&line) && line.chars().count() > 1 {
                    line.pop();
                    lines.push(std::mem::replace(&mut line, c.to_string()));
                }
            }
        }
        if !line.is_empty() {
            lines.push(line);
        }
    }
    lines
}

fn win_ansi(c: char) -> u8 {
    match c {
        ' '..='~' => c as u8,
        '\u{a0}'..='\u{ff}' => c as u32 as u8,
        '€' => 0x80,
        '…' => 0x85,
        '‘' => 0x91,
        '’' => 0x92,
        '“' => 0x93,
        '”' => 0x94,
        '•' => 0x95,
        '–' => 0x96,
        '—' => 0x97,
        '\t' => b' ',
        _ => b'?',
    }
}

/// WinAnsi bytes for the standard Helvetica encoding, string-escaped.
fn encode_text(text: &str) -> Vec<u8> {
    let mut out = Vec::with_capacity(text.len());
    for c in text.chars() {
        if matches!(c, '(' | ')' | '\\') {
            out.push(b'\\');
        }
        out.push(win_ansi(c));
    }
    out
}

fn fmt_num(value: f32) -> String {
    let rounded = (value * 100.0).round() / 100.0;
    if rounded.fract() == 0.0 {
        format!("{}", rounded as i64)
    } else {
        format!("{:.2}", rounded)
    }
}

struct ObjectWriter {
    bytes: Vec<u8>,
    offsets: Vec<usize>,
}

impl ObjectWriter {
    fn new() -> Self {
        let mut bytes = b"%PDF-1.4\n".to_vec();
        bytes.extend_from_slice(&[b'%', 0xE2, 0xE3, 0xCF, 0xD3, b'\n']);
        Self {
            bytes,
            offsets: Vec::new(),
        }
    }

    fn object(&mut self, id: usize, body: &[u8]) {
        self.record_offset(id);
        self.bytes.extend_from_slice(format!("{} 0 obj\n", id).as_bytes());
        self.bytes.extend_from_slice(body);
        self.bytes.extend_from_slice(b"\nendobj\n");
    }

    fn stream(&mut self, id: usize, dict: &str, data: &[u8]) {
        self.record_offset(id);
        self.bytes.extend_from_slice(
            format!("{} 0 obj\n<< {} /Length {} >>\nstream\n", id, dict, data.len()).as_bytes(),
        );
        self.bytes.extend_from_slice(data);
        self.bytes.extend_from_slice(b"\nendstream\nendobj\n");
    }

    fn record_offset(&mut self, id: usize) {
        if self.offsets.len() < id {
            self.offsets.resize(id, 0);
        }
        self.offsets[id - 1] = self.bytes.len();
    }

    fn finish(mut self, trailer: &str) -> Vec<u8> {
        let xref_offset = self.bytes.len();
        let mut xref = format!("xref\n0 {}\n0000000000 65535 f \n", self.offsets.len() + 1);
        for offset in &self.offsets {
            let _ = writeln!(xref, "{:010} 00000 n ", offset);
        }
        let _ = write!(
            xref,
            "trailer\n<< /Size {} {} >>\nstartxref\n{}\n%%EOF\n",
            self.offsets.len() + 1,
            trailer,
            xref_offset
        );
        self.bytes.extend_from_slice(xref.as_bytes());
        self.bytes
    }
}

const CATALOG_ID: usize = 1;
const PAGES_ID: usize = 2;
const FONT_REGULAR_ID: usize = 3;
const FONT_BOLD_ID: usize = 4;
const INFO_ID: usize = 5;
const FIRST_IMAGE_ID: usize = 6;

pub fn render(elements: &[Element<'_>], info: &DocumentInfo<'_>) -> RenderedPdf {
    let mut layout = Layout::new();
    for element in elements {
        match element {
            Element::Title(text) => layout.text(text, Font::Bold, 20.0),
            Element::Heading(text) => layout.text(text, Font::Bold, 14.0),
            Element::Paragraph(text) => layout.text(text, Font::Regular, 10.0),
            Element::Image { image, max_width } => layout.image(*image, *max_width),
            Element::Placeholder { label, max_width } => layout.placeholder(label, *max_width),
        }
    }

    let first_page_id = FIRST_IMAGE_ID + layout.images.len();
    let page_ids: Vec<usize> = (0..layout.pages.len())
        .map(|i| first_page_id + 2 * i)
        .collect();

    let mut writer = ObjectWriter::new();
    writer.object(
        CATALOG_ID,
        format!("<< /Type /Catalog /Pages {} 0 R >>", PAGES_ID).as_bytes(),
    );
    let kids: Vec<String> = page_ids.iter().map(|id| format!("{} 0 R", id)).collect();
    writer.object(
        PAGES_ID,
        format!(
            "<< /Type /Pages /Kids [{}] /Count {} >>",
            kids.join(" "),
            page_ids.len()
        )
        .as_bytes(),
    );
    writer.object(
        FONT_REGULAR_ID,
        b"<< /Type /Font /Subtype /Type1 /BaseFont /Helvetica /Encoding /WinAnsiEncoding >>",
    );
    writer.object(
        FONT_BOLD_ID,
        b"<< /Type /Font /Subtype /Type1 /BaseFont /Helvetica-Bold /Encoding /WinAnsiEncoding >>",
    );

    let mut info_dict = b"<< /Title (".to_vec();
    info_dict.extend(encode_text(info.title));
    info_dict.extend_from_slice(
        format!(
            ") /Producer (menufy) /CreationDate (D:{}Z) >>",
            info.created_at.format("%Y%m%d%H%M%S")
        )
        .as_bytes(),
    );
    writer.object(INFO_ID, &info_dict);

    for (index, image) in layout.images.iter().enumerate() {
        let filter = match image.encoding {
            RasterEncoding::Jpeg => "/Filter /DCTDecode".to_string(),
            RasterEncoding::Png => format!(
                "/Filter /FlateDecode /DecodeParms << /Predictor 15 /Colors {} /BitsPerComponent {} /Columns {} >>",
                image.color_space.components(),
                BITS_PER_COMPONENT,
                image.width
            ),
        };
        let dict = format!(
            "/Type /XObject /Subtype /Image /Width {} /Height {} /ColorSpace {} /BitsPerComponent {} {}",
            image.width,
            image.height,
            image.color_space.pdf_name(),
            BITS_PER_COMPONENT,
            filter
        );
        writer.stream(FIRST_IMAGE_ID + index, &dict, &image.data);
    }

    let xobjects: String = (0..layout.images.len())
        .map(|i| format!("/Im{} {} 0 R", i + 1, FIRST_IMAGE_ID + i))
        .collect::<Vec<_>>()
        .join(" ");
    for (content, page_id) in layout.pages.iter().zip(&page_ids) {
        writer.object(
            *page_id,
            format!(
                "<< /Type /Page /Parent {} 0 R /MediaBox [0 0 {} {}] /Resources << /Font << /F1 {} 0 R /F2 {} 0 R >> /XObject << {} >> >> /Contents {} 0 R >>",
                PAGES_ID,
                fmt_num(PAGE_WIDTH),
                fmt_num(PAGE_HEIGHT),
                FONT_REGULAR_ID,
                FONT_BOLD_ID,
                xobjects,
                page_id + 1
            )
            .as_bytes(),
        );
        writer.stream(page_id + 1, "", content);
    }

    let nanos = info.created_at.timestamp_nanos_opt().unwrap_or_default();
    let document_id = format!("{:016x}{:016x}", nanos, info.title.len());
    let trailer = format!(
        "/Root {} 0 R /Info {} 0 R /ID [<{id}> <{id}>]",
        CATALOG_ID,
        INFO_ID,
        id = document_id
    );

    RenderedPdf {
        page_count: layout.pages.len(),
        bytes: writer.finish(&trailer),
    }
}
