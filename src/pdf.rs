use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

use owned_ttf_parser::Face;
use printpdf::{
    Color, IndirectFontRef, Line, Mm, PdfDocument, PdfDocumentReference,
    PdfLayerReference, Point, Rgb,
};
use strum::IntoEnumIterator;
use strum_macros::{Display, EnumIter};
use tracing::{info, warn};

use crate::billing::{money, InvoicePosition};
use crate::error::InvoiceError;
use crate::invoices::InvoiceCreatedData;

const REGULAR_FONT: &[u8] = include_bytes!("../assets/fonts/DejaVuSans.ttf");
const BOLD_FONT: &[u8] = include_bytes!("../assets/fonts/DejaVuSans-Bold.ttf");

const PAGE_WIDTH: f32 = 210.0;
const PAGE_HEIGHT: f32 = 297.0;
const LEFT_MARGIN: f32 = 2.0;
const TOP_MARGIN: f32 = 10.0;
const RIGHT_MARGIN: f32 = 2.0;
const BOTTOM_MARGIN: f32 = 20.0;
const CONTENT_WIDTH: f32 = PAGE_WIDTH - LEFT_MARGIN - RIGHT_MARGIN;

const CELL_PADDING: f32 = 1.0;
const PT_TO_MM: f32 = 0.3528;
const LINE_WIDTH: f32 = 0.5;

const DETAILS_COLUMN: f32 = 95.0;
const ROW_HEIGHT: f32 = 10.0;
const NOTES_WIDTH: f32 = 150.0;
const NOTES_LINE_HEIGHT: f32 = 6.0;
const NOTES_MIN_HEIGHT: f32 = 20.0;

#[derive(Debug, Clone, Copy, PartialEq)]
enum Align {
    Left,
    Center,
    Right,
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Weight {
    Regular,
    Bold,
}

/// An embedded TrueType face: the document's handle to it plus the parsed
/// tables used to measure text set in it.
struct Typeface {
    reference: IndirectFontRef,
    face: Face<'static>,
}

impl Typeface {
    fn embed(doc: &PdfDocumentReference, data: &'static [u8]) -> Result<Self, String> {
        let face = Face::parse(data, 0).map_err(|e| e.to_string())?;
        let reference = doc.add_external_font(data).map_err(|e| e.to_string())?;
        Ok(Self { reference, face })
    }

    /// Width of `text` in mm. Characters without a glyph take no space.
    fn width(&self, text: &str, font_size: f32) -> f32 {
        let units: u32 = text
            .chars()
            .filter_map(|c| self.face.glyph_index(c))
            .filter_map(|glyph| self.face.glyph_hor_advance(glyph))
            .map(u32::from)
            .sum();
        units as f32 / f32::from(self.face.units_per_em()) * font_size * PT_TO_MM
    }

    /// Characters of `text` the face has no glyph for.
    fn missing(&self, text: &str) -> Vec<char> {
        text.chars()
            .filter(|c| self.face.glyph_index(*c).is_none())
            .collect()
    }
}

/// Greedy word wrap to lines no wider than `width`, as measured by
/// `measure`. Words longer than a line are left to overflow.
fn wrap_lines(text: &str, width: f32, measure: impl Fn(&str) -> f32) -> Vec<String> {
    let mut lines = Vec::new();

    for paragraph in text.split('\n') {
        let mut line = String::new();
        for word in paragraph.split_whitespace() {
            let candidate = if line.is_empty() {
                word.to_string()
            } else {
                format!("{} {}", line, word)
            };
            if !line.is_empty() && measure(&candidate) > width {
                lines.push(std::mem::replace(&mut line, word.to_string()));
            } else {
                line = candidate;
            }
        }
        lines.push(line);
    }

    lines
}

#[derive(Display, EnumIter, Debug, Clone, Copy, PartialEq)]
enum Column {
    #[strum(serialize = "No.")]
    ItemNo,
    #[strum(serialize = "Product / Service name")]
    Name,
    #[strum(serialize = "Symbol PKWiU")]
    Classification,
    Unit,
    #[strum(serialize = "Qt")]
    Quantity,
    #[strum(serialize = "Net price")]
    NetPrice,
    #[strum(serialize = "Net value")]
    NetValue,
    #[strum(serialize = "Tax rate")]
    TaxRate,
    #[strum(serialize = "Tax amount")]
    TaxAmount,
    #[strum(serialize = "Gross value")]
    GrossValue,
    Currency,
}

impl Column {
    fn width(self) -> f32 {
        match self {
            Column::ItemNo => 10.0,
            Column::Name => 50.0,
            Column::Classification => 24.0,
            Column::Unit | Column::Quantity => 8.0,
            Column::NetPrice
            | Column::NetValue
            | Column::TaxAmount
            | Column::GrossValue => 19.0,
            Column::TaxRate | Column::Currency => 15.0,
        }
    }

    fn value(self, position: &InvoicePosition) -> String {
        match self {
            Column::ItemNo => position.item_no.to_string(),
            Column::Name => position.product_or_service_name.clone(),
            Column::Classification => position.classification.clone(),
            Column::Unit => position.unit.clone(),
            Column::Quantity => position.quantity.to_string(),
            Column::NetPrice => money(position.net_price),
            Column::NetValue => money(position.net_value),
            Column::TaxRate => position.tax_rate.to_string(),
            Column::TaxAmount => money(position.tax_amount),
            Column::GrossValue => money(position.gross_value),
            Column::Currency => position.currency.clone(),
        }
    }
}

/// A cursor over the document, measured in mm from the top left corner of
/// the current page. Runs onto a new page when content would cross the
/// bottom margin.
struct Canvas {
    doc: PdfDocumentReference,
    layer: PdfLayerReference,
    regular: Typeface,
    bold: Typeface,
    weight: Weight,
    font_size: f32,
    x: f32,
    y: f32,
    pages: usize,
}

impl Canvas {
    fn new(title: &str) -> Result<Self, String> {
        let (doc, page, layer) =
            PdfDocument::new(title, Mm(PAGE_WIDTH), Mm(PAGE_HEIGHT), "Layer 1");
        let regular = Typeface::embed(&doc, REGULAR_FONT)?;
        let bold = Typeface::embed(&doc, BOLD_FONT)?;
        let layer = doc.get_page(page).get_layer(layer);

        let canvas = Self {
            doc,
            layer,
            regular,
            bold,
            weight: Weight::Bold,
            font_size: 16.0,
            x: LEFT_MARGIN,
            y: TOP_MARGIN,
            pages: 1,
        };
        canvas.setup_layer();
        Ok(canvas)
    }

    fn setup_layer(&self) {
        self.layer
            .set_outline_color(Color::Rgb(Rgb::new(0.0, 0.0, 0.0, None)));
        self.layer.set_outline_thickness(LINE_WIDTH);
    }

    fn add_page(&mut self) {
        self.pages += 1;
        let (page, layer) = self.doc.add_page(
            Mm(PAGE_WIDTH),
            Mm(PAGE_HEIGHT),
            format!("Layer {}", self.pages),
        );
        self.layer = self.doc.get_page(page).get_layer(layer);
        self.setup_layer();
        self.x = LEFT_MARGIN;
        self.y = TOP_MARGIN;
    }

    fn fits(&self, height: f32) -> bool {
        self.y + height <= PAGE_HEIGHT - BOTTOM_MARGIN
    }

    fn set_font(&mut self, weight: Weight, size: f32) {
        self.weight = weight;
        self.font_size = size;
    }

    fn font(&self) -> &Typeface {
        match self.weight {
            Weight::Regular => &self.regular,
            Weight::Bold => &self.bold,
        }
    }

    fn rect(&self, x: f32, y: f32, width: f32, height: f32) {
        let corner = |x: f32, y: f32| (Point::new(Mm(x), Mm(PAGE_HEIGHT - y)), false);
        self.layer.add_line(Line {
            points: vec![
                corner(x, y),
                corner(x + width, y),
                corner(x + width, y + height),
                corner(x, y + height),
            ],
            is_closed: true,
        });
    }

    fn text(&self, x: f32, y: f32, width: f32, height: f32, text: &str, align: Align) {
        if text.is_empty() {
            return;
        }
        let font = self.font();
        let missing = font.missing(text);
        if !missing.is_empty() {
            warn!("No glyphs for {:?} in '{}', they are left out", missing, text);
        }

        let text_width = font.width(text, self.font_size);
        let offset = match align {
            Align::Left => CELL_PADDING,
            Align::Center => (width - text_width) / 2.0,
            Align::Right => width - CELL_PADDING - text_width,
        };
        // baseline sits a third of the font size below the cell middle
        let baseline = y + height / 2.0 + self.font_size * PT_TO_MM / 3.0;
        self.layer.use_text(
            text,
            self.font_size,
            Mm(x + offset),
            Mm(PAGE_HEIGHT - baseline),
            &font.reference,
        );
    }

    /// Draws a cell at the cursor and moves right. A zero width runs to the
    /// right margin.
    fn cell(&mut self, width: f32, height: f32, text: &str, border: bool, align: Align) {
        if !self.fits(height) {
            self.add_page();
        }
        let width = if width > 0.0 {
            width
        } else {
            LEFT_MARGIN + CONTENT_WIDTH - self.x
        };

        if border {
            self.rect(self.x, self.y, width, height);
        }
        self.text(self.x, self.y, width, height, text, align);
        self.x += width;
    }

    fn ln(&mut self, height: f32) {
        self.x = LEFT_MARGIN;
        self.y += height;
    }

    /// Wrapped text inside one frame, ending on a new line.
    fn boxed_text(&mut self, width: f32, text: &str, align: Align) {
        let font_size = self.font_size;
        let font = self.font();
        let lines = wrap_lines(text, width - 2.0 * CELL_PADDING, |line| {
            font.width(line, font_size)
        });
        let height = (lines.len() as f32 * NOTES_LINE_HEIGHT).max(NOTES_MIN_HEIGHT);
        if !self.fits(height) {
            self.add_page();
        }

        self.rect(self.x, self.y, width, height);
        let top = self.y + (height - lines.len() as f32 * NOTES_LINE_HEIGHT) / 2.0;
        for (i, line) in lines.iter().enumerate() {
            let y = top + i as f32 * NOTES_LINE_HEIGHT;
            self.text(self.x, y, width, NOTES_LINE_HEIGHT, line, align);
        }
        self.ln(height);
    }

    fn save(self, path: &Path) -> Result<(), InvoiceError> {
        let file = File::create(path)?;
        self.doc
            .save(&mut BufWriter::new(file))
            .map_err(|e| InvoiceError::Pdf {
                path: path.to_path_buf(),
                reason: e.to_string(),
            })
    }
}

fn heading(canvas: &mut Canvas, title: &str) {
    canvas.set_font(Weight::Bold, 16.0);
    canvas.cell(0.0, 10.0, title, false, Align::Left);
}

fn header_section(canvas: &mut Canvas, invoice: &InvoiceCreatedData) {
    heading(canvas, "Invoice");
    canvas.ln(10.0);

    canvas.set_font(Weight::Regular, 12.0);
    let lines = [
        ("Invoice Number", &invoice.invoice_no),
        ("Date of Issue", &invoice.date_of_issue),
        ("Place of Issue", &invoice.place_of_issue),
        ("Service Start date", &invoice.service_start_date),
        ("Service End date", &invoice.service_end_date),
    ];
    for (label, value) in lines {
        canvas.cell(0.0, 10.0, &format!("{}: {}", label, value), false, Align::Left);
        canvas.ln(6.0);
    }
    canvas.ln(10.0);
}

fn details_section(canvas: &mut Canvas, invoice: &InvoiceCreatedData) {
    heading(canvas, "Details");
    canvas.ln(16.0);

    let from = &invoice.invoice_from;
    let to = &invoice.invoice_to;
    let rows = [
        (format!("Tax Number: {}", from.tax_number),
         format!("{}, {} - {}", to.address.city, to.address.state, to.address.zip_code)),
        (format!("Email: {}", from.email), String::new()),
        (format!("IBAN: {}", invoice.iban), String::new()),
        (format!("SWIFT: {}", invoice.swift), String::new()),
    ];

    canvas.set_font(Weight::Bold, 12.0);
    canvas.cell(DETAILS_COLUMN, 6.0, "From:", false, Align::Left);
    canvas.cell(DETAILS_COLUMN, 6.0, "To:", false, Align::Right);
    canvas.ln(6.0);

    canvas.set_font(Weight::Regular, 12.0);
    canvas.cell(DETAILS_COLUMN, 6.0, &from.full_name, false, Align::Left);
    canvas.cell(DETAILS_COLUMN, 6.0, &to.full_name, false, Align::Right);
    canvas.ln(6.0);
    canvas.cell(DETAILS_COLUMN, 6.0, &from.address, false, Align::Left);
    canvas.cell(
        DETAILS_COLUMN,
        6.0,
        &format!("{}, {}", to.address.street_address, to.address.number),
        false,
        Align::Right,
    );
    canvas.ln(6.0);

    for (left, right) in rows.iter() {
        canvas.cell(DETAILS_COLUMN, 6.0, left, false, Align::Left);
        canvas.cell(DETAILS_COLUMN, 6.0, right, false, Align::Right);
        canvas.ln(6.0);
    }
    canvas.ln(10.0);
}

fn table_header(canvas: &mut Canvas) {
    canvas.set_font(Weight::Bold, 8.0);
    for column in Column::iter() {
        canvas.cell(column.width(), ROW_HEIGHT, &column.to_string(), true, Align::Center);
    }
    canvas.ln(ROW_HEIGHT);
    canvas.set_font(Weight::Regular, 8.0);
}

fn positions_section(canvas: &mut Canvas, invoice: &InvoiceCreatedData) {
    heading(canvas, "Positions");
    canvas.ln(16.0);

    if !canvas.fits(2.0 * ROW_HEIGHT) {
        canvas.add_page();
    }
    table_header(canvas);

    for position in invoice.invoice_positions.iter() {
        if !canvas.fits(ROW_HEIGHT) {
            canvas.add_page();
            table_header(canvas);
        }
        for column in Column::iter() {
            canvas.cell(column.width(), ROW_HEIGHT, &column.value(position), true, Align::Center);
        }
        canvas.ln(ROW_HEIGHT);
    }
}

fn summary_section(canvas: &mut Canvas, invoice: &InvoiceCreatedData) {
    let currency = invoice.currency();
    let summary = &invoice.invoice_summary;

    canvas.ln(16.0);
    heading(canvas, "Summary");
    canvas.ln(8.0);

    canvas.set_font(Weight::Regular, 12.0);
    let lines = [
        format!("Total Amount: {} {}", money(summary.total_amount), currency),
        format!("Total Tax Amount: {} {}", money(summary.total_tax_amount), currency),
        format!("Total Gross Value: {} {}", money(summary.total_gross_value), currency),
    ];
    for line in lines.iter() {
        canvas.cell(0.0, 10.0, line, false, Align::Left);
        canvas.ln(8.0);
    }
    canvas.cell(
        0.0,
        10.0,
        &format!(
            "Issued An Invoice: {} {}",
            invoice.author_first_name, invoice.author_last_name
        ),
        false,
        Align::Left,
    );
    canvas.ln(20.0);

    if !canvas.fits(ROW_HEIGHT + NOTES_MIN_HEIGHT) {
        canvas.add_page();
    }
    canvas.cell(NOTES_WIDTH, ROW_HEIGHT, "Notes", true, Align::Center);
    canvas.ln(ROW_HEIGHT);

    canvas.set_font(Weight::Regular, 10.0);
    canvas.boxed_text(NOTES_WIDTH, &invoice.notes, Align::Center);
    canvas.ln(8.0);
}

fn layout(invoice: &InvoiceCreatedData) -> Result<Canvas, String> {
    let mut canvas = Canvas::new(&format!("Invoice {}", invoice.invoice_no))?;
    header_section(&mut canvas, invoice);
    details_section(&mut canvas, invoice);
    positions_section(&mut canvas, invoice);
    summary_section(&mut canvas, invoice);
    Ok(canvas)
}

/// Renders the invoice to a PDF file at `path`.
pub fn render(invoice: &InvoiceCreatedData, path: &Path) -> Result<(), InvoiceError> {
    let canvas = layout(invoice).map_err(|reason| InvoiceError::Pdf {
        path: path.to_path_buf(),
        reason,
    })?;
    let pages = canvas.pages;
    canvas.save(path)?;

    info!("Invoice PDF generated successfully at {} ({} pages)", path.display(), pages);
    Ok(())
}
