//! PDF backend.

use std::io::BufWriter;
use std::path::Path;

use printpdf::{BuiltinFont, Color, IndirectFontRef, Mm, PdfDocument, Rgb};
use tracing::{debug, info};

use crate::layout::{PAGE_HEIGHT_MM, PAGE_WIDTH_MM};
use crate::{Layout, RenderError, RenderResult};

const LAYER_NAME: &str = "Report";

/// Draws the layout and writes it to `path`.
///
/// The document is assembled in memory; the output file is only opened
/// once the bytes are ready.
///
/// # Errors
///
/// Returns [`RenderError::Pdf`] if the document cannot be assembled and
/// [`RenderError::Write`] if the file cannot be written.
pub fn write_pdf(layout: &Layout, path: impl AsRef<Path>) -> RenderResult<()> {
    let path = path.as_ref();
    let bytes = render_bytes(layout)?;

    std::fs::write(path, &bytes).map_err(|source| RenderError::Write {
        path: path.to_path_buf(),
        source,
    })?;

    info!(path = %path.display(), pages = layout.pages.len(), bytes = bytes.len(), "wrote report");
    Ok(())
}

fn render_bytes(layout: &Layout) -> RenderResult<Vec<u8>> {
    let (doc, first_page, first_layer) = PdfDocument::new(
        layout.title.as_str(),
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

    for (index, page) in layout.pages.iter().enumerate() {
        let (page_index, layer_index) = if index == 0 {
            (first_page, first_layer)
        } else {
            doc.add_page(Mm(PAGE_WIDTH_MM), Mm(PAGE_HEIGHT_MM), LAYER_NAME)
        };
        let layer = doc.get_page(page_index).get_layer(layer_index);

        for line in &page.lines {
            let font: &IndirectFontRef = if line.style.is_bold() { &bold } else { &regular };
            let (r, g, b) = line.style.rgb();
            layer.set_fill_color(Color::Rgb(Rgb::new(r, g, b, None)));
            layer.use_text(
                winansi_safe(&line.text),
                line.style.font_size(),
                Mm(line.x),
                Mm(line.y),
                font,
            );
        }
        debug!(page = index + 1, lines = page.lines.len(), "drew page");
    }

    let mut writer = BufWriter::new(Vec::new());
    doc.save(&mut writer).map_err(pdf_error)?;
    writer
        .into_inner()
        .map_err(|e| RenderError::Pdf(e.to_string()))
}

fn pdf_error(err: impl std::fmt::Display) -> RenderError {
    RenderError::Pdf(err.to_string())
}

/// Replaces characters the built-in fonts cannot show.
fn winansi_safe(text: &str) -> String {
    text.chars()
        .map(|c| if c == ' ' || c.is_ascii_graphic() { c } else { '?' })
        .collect()
}
