use std::panic::{AssertUnwindSafe, catch_unwind};

use printpdf::{
    BuiltinFont, IndirectFontRef, Mm, PdfDocument, PdfDocumentReference, PdfLayerReference,
};

use crate::error::{AppError, Result};

const PAGE_WIDTH_MM: f32 = 210.0;
const PAGE_HEIGHT_MM: f32 = 297.0;
const MARGIN_MM: f32 = 15.0;
const BODY_SIZE_PT: f32 = 12.0;
const BODY_LINE_MM: f32 = 8.0;
const HEADING_SIZE_PT: f32 = 16.0;
const HEADING_LINE_MM: f32 = 10.0;
const PT_PER_MM: f32 = 72.0 / 25.4;
// Helvetica advance width as a fraction of the em, rounded up.
const AVG_CHAR_EM: f32 = 0.55;
const LAYER_NAME: &str = "Layer 1";

/// Maps typographic punctuation to ASCII and drops anything outside Latin-1.
pub fn sanitize_text(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '\u{2018}' | '\u{2019}' => out.push('\''),
            '\u{201C}' | '\u{201D}' => out.push('"'),
            '\u{2013}' | '\u{2014}' => out.push('-'),
            '\u{2026}' => out.push_str("..."),
            '\u{00E9}' => out.push('e'),
            '\u{00F1}' => out.push('n'),
            '\u{00B0}' => out.push_str(" degrees"),
            c if (c as u32) <= 0xFF => out.push(c),
            _ => {}
        }
    }
    out
}

pub fn render_pdf(text: &str) -> Result<Vec<u8>> {
    let cleaned = sanitize_text(text);
    match catch_unwind(AssertUnwindSafe(|| render_document(&cleaned))) {
        Ok(result) => result,
        Err(_) => Err(AppError::ReportGeneration("PDF renderer panicked".to_string())),
    }
}

struct PageCursor {
    layer: PdfLayerReference,
    y: f32,
}

impl PageCursor {
    fn advance(&mut self, doc: &PdfDocumentReference, line_mm: f32) {
        if self.y - line_mm < MARGIN_MM {
            let (page, layer) = doc.add_page(Mm(PAGE_WIDTH_MM), Mm(PAGE_HEIGHT_MM), LAYER_NAME);
            self.layer = doc.get_page(page).get_layer(layer);
            self.y = PAGE_HEIGHT_MM - MARGIN_MM;
        }
        self.y -= line_mm;
    }

    fn write(
        &mut self,
        doc: &PdfDocumentReference,
        text: &str,
        size: f32,
        line_mm: f32,
        font: &IndirectFontRef,
    ) {
        for chunk in wrap_line(text, max_chars(size)) {
            self.advance(doc, line_mm);
            self.layer.use_text(chunk, size, Mm(MARGIN_MM), Mm(self.y), font);
        }
    }
}

fn render_document(text: &str) -> Result<Vec<u8>> {
    let (doc, page, layer) = PdfDocument::new(
        "Clinical Report",
        Mm(PAGE_WIDTH_MM),
        Mm(PAGE_HEIGHT_MM),
        LAYER_NAME,
    );
    let regular = doc
        .add_builtin_font(BuiltinFont::Helvetica)
        .map_err(pdf_error)?;
    let bold = doc
        .add_builtin_font(BuiltinFont::HelveticaBold)
        .map_err(pdf_error)?;

    let mut cursor = PageCursor {
        layer: doc.get_page(page).get_layer(layer),
        y: PAGE_HEIGHT_MM - MARGIN_MM,
    };

    for line in text.split('\n') {
        let line = line.trim_end_matches('\r');
        if let Some(heading) = line.strip_prefix("# ") {
            cursor.write(&doc, heading, HEADING_SIZE_PT, HEADING_LINE_MM, &bold);
        } else if line.trim().is_empty() {
            cursor.advance(&doc, BODY_LINE_MM);
        } else {
            cursor.write(&doc, line, BODY_SIZE_PT, BODY_LINE_MM, &regular);
        }
    }

    doc.save_to_bytes().map_err(pdf_error)
}

fn pdf_error<E: std::fmt::Debug>(err: E) -> AppError {
    AppError::ReportGeneration(format!("failed to generate PDF report: {err:?}"))
}

fn max_chars(size_pt: f32) -> usize {
    let usable_pt = (PAGE_WIDTH_MM - 2.0 * MARGIN_MM) * PT_PER_MM;
    ((usable_pt / (size_pt * AVG_CHAR_EM)) as usize).max(1)
}

/// Greedy word wrap; words longer than `width` are split.
pub fn wrap_line(line: &str, width: usize) -> Vec<String> {
    let mut lines = Vec::new();
    let mut current = String::new();
    let mut current_len = 0usize;

    for word in line.split_whitespace() {
        let mut word: Vec<char> = word.chars().collect();
        while word.len() > width {
            if current_len > 0 {
                lines.push(std::mem::take(&mut current));
                current_len = 0;
            }
            let rest = word.split_off(width);
            lines.push(word.into_iter().collect());
            word = rest;
        }
        if word.is_empty() {
            continue;
        }
        let extra = if current_len == 0 { word.len() } else { word.len() + 1 };
        if current_len + extra > width {
            lines.push(std::mem::take(&mut current));
            current_len = 0;
        }
        if current_len > 0 {
            current.push(' ');
            current_len += 1;
        }
        current.extend(word.iter());
        current_len += word.len();
    }
    if current_len > 0 {
        lines.push(current);
    }
    lines
}

#[cfg(test)]
#[path = "../../tests/src_inline/report/pdf.rs"]
mod tests;
