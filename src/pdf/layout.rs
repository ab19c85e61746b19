use printpdf::{
    BuiltinFont, Color, IndirectFontRef, Line, Mm, PdfDocument, PdfDocumentReference,
    PdfLayerReference, Point, Rgb,
};

use super::{
    DocumentBackend, DocumentLine, DocumentParty, InvoiceDocument, PdfError, format_inr,
    words::amount_in_words,
};

const PAGE_W: f32 = 210.0;
const PAGE_H: f32 = 297.0;
const MARGIN: f32 = 15.0;
const RIGHT: f32 = PAGE_W - MARGIN;
const PT_TO_MM: f32 = 0.3528;

fn ink() -> Color {
    Color::Rgb(Rgb::new(0.13, 0.13, 0.13, None))
}

fn accent() -> Color {
    Color::Rgb(Rgb::new(0.55, 0.10, 0.16, None))
}

fn muted() -> Color {
    Color::Rgb(Rgb::new(0.45, 0.45, 0.45, None))
}

/// Cursor-based writer over a printpdf document, top to bottom.
struct Canvas {
    doc: PdfDocumentReference,
    layer: PdfLayerReference,
    regular: IndirectFontRef,
    bold: IndirectFontRef,
    y: f32,
}

impl Canvas {
    fn new(title: &str) -> Result<Self, printpdf::Error> {
        let (doc, page, layer) = PdfDocument::new(title, Mm(PAGE_W), Mm(PAGE_H), "content");
        let regular = doc.add_builtin_font(BuiltinFont::Helvetica)?;
        let bold = doc.add_builtin_font(BuiltinFont::HelveticaBold)?;
        let layer = doc.get_page(page).get_layer(layer);
        Ok(Self {
            doc,
            layer,
            regular,
            bold,
            y: PAGE_H - MARGIN,
        })
    }

    fn text(&self, text: &str, size: f32, x: f32, y: f32, bold: bool) {
        let font = if bold { &self.bold } else { &self.regular };
        self.layer.use_text(text, size, Mm(x), Mm(y), font);
    }

    /// Right-aligned using an average Helvetica glyph width.
    fn text_right(&self, text: &str, size: f32, right: f32, y: f32, bold: bool) {
        let width = text.chars().count() as f32 * size * 0.5 * PT_TO_MM;
        self.text(text, size, right - width, y, bold);
    }

    fn color(&self, color: Color) {
        self.layer.set_fill_color(color.clone());
        self.layer.set_outline_color(color);
    }

    fn rule(&self, x1: f32, x2: f32, y: f32) {
        self.layer.set_outline_thickness(0.4);
        self.layer.add_line(Line {
            points: vec![
                (Point::new(Mm(x1), Mm(y)), false),
                (Point::new(Mm(x2), Mm(y)), false),
            ],
            is_closed: false,
        });
    }

    fn frame(&self, x1: f32, y1: f32, x2: f32, y2: f32) {
        self.layer.set_outline_thickness(0.4);
        self.layer.add_line(Line {
            points: vec![
                (Point::new(Mm(x1), Mm(y1)), false),
                (Point::new(Mm(x2), Mm(y1)), false),
                (Point::new(Mm(x2), Mm(y2)), false),
                (Point::new(Mm(x1), Mm(y2)), false),
            ],
            is_closed: true,
        });
    }

    fn advance(&mut self, mm: f32) {
        self.y -= mm;
    }

    /// Start a new page when fewer than `needed` mm remain.
    fn ensure_space(&mut self, needed: f32) -> bool {
        if self.y - needed >= MARGIN {
            return false;
        }
        let (page, layer) = self.doc.add_page(Mm(PAGE_W), Mm(PAGE_H), "content");
        self.layer = self.doc.get_page(page).get_layer(layer);
        self.y = PAGE_H - MARGIN;
        true
    }

    fn finish(self) -> Result<Vec<u8>, printpdf::Error> {
        self.doc.save_to_bytes()
    }
}

fn party_lines(party: &DocumentParty) -> Vec<String> {
    let mut lines = vec![party.name.clone()];
    lines.extend(party.address_lines.iter().cloned());
    if let Some(mobile) = &party.mobile {
        lines.push(format!("Mobile: {mobile}"));
    }
    if let Some(email) = &party.email {
        lines.push(format!("Email: {email}"));
    }
    if let Some(gstin) = &party.gstin {
        lines.push(format!("GSTIN: {gstin}"));
    }
    lines
}

fn line_detail(line: &DocumentLine) -> Option<String> {
    let mut detail = Vec::new();
    if let Some(style) = &line.style {
        detail.push(format!("Style: {style}"));
    }
    if let Some(fabric) = &line.fabric {
        detail.push(format!("{fabric} ({} m)", line.fabric_meters.normalize()));
    }
    (!detail.is_empty()).then(|| detail.join(" | "))
}

// Column anchors for the item table.
const COL_NO: f32 = MARGIN;
const COL_ITEM: f32 = MARGIN + 8.0;
const COL_QTY: f32 = 102.0;
const COL_RATE: f32 = 122.0;
const COL_ALT: f32 = 140.0;
const COL_HAND: f32 = 157.0;
const COL_OTHER: f32 = 174.0;

/// Letterhead, party blocks, itemised table with charges broken out, summary
/// box, amount in words and bank block.
pub struct FullLayout;

impl FullLayout {
    fn draw(document: &InvoiceDocument) -> Result<Vec<u8>, printpdf::Error> {
        let mut canvas = Canvas::new(&format!("{} {}", document.kind.title(), document.number))?;
        let company = &document.company;

        // Letterhead
        canvas.color(accent());
        canvas.text(&company.name, 18.0, MARGIN, canvas.y - 4.0, true);
        canvas.text_right(document.kind.title(), 14.0, RIGHT, canvas.y - 4.0, true);
        canvas.color(muted());
        let mut left_y = canvas.y - 11.0;
        for text in [&company.address, &company.phone, &company.email] {
            if !text.is_empty() {
                canvas.text(text, 9.0, MARGIN, left_y, false);
                left_y -= 4.5;
            }
        }
        if let Some(gstin) = &company.gstin {
            canvas.text(&format!("GSTIN: {gstin}"), 9.0, MARGIN, left_y, false);
            left_y -= 4.5;
        }

        canvas.color(ink());
        let mut right_y = canvas.y - 11.0;
        let mut meta = vec![
            format!("No: {}", document.number),
            format!("Date: {}", document.issued_on.format("%d-%m-%Y")),
        ];
        if let Some(due) = document.due_on {
            meta.push(format!("Due: {}", due.format("%d-%m-%Y")));
        }
        if let Some(order_number) = &document.order_number {
            meta.push(format!("Order: {order_number}"));
        }
        for text in &meta {
            canvas.text_right(text, 9.0, RIGHT, right_y, false);
            right_y -= 4.5;
        }

        canvas.y = left_y.min(right_y) - 2.0;
        canvas.color(accent());
        canvas.rule(MARGIN, RIGHT, canvas.y);
        canvas.advance(7.0);

        // Client and shipping blocks
        canvas.color(ink());
        canvas.text("Bill To", 10.0, MARGIN, canvas.y, true);
        if document.shipping.is_some() {
            canvas.text("Ship To", 10.0, PAGE_W / 2.0, canvas.y, true);
        }
        canvas.advance(5.0);
        let client_lines = party_lines(&document.client);
        let shipping_lines = document.shipping.as_ref().map(party_lines).unwrap_or_default();
        let rows = client_lines.len().max(shipping_lines.len());
        for idx in 0..rows {
            if let Some(text) = client_lines.get(idx) {
                canvas.text(text, 9.0, MARGIN, canvas.y, idx == 0);
            }
            if let Some(text) = shipping_lines.get(idx) {
                canvas.text(text, 9.0, PAGE_W / 2.0, canvas.y, idx == 0);
            }
            canvas.advance(4.5);
        }
        canvas.advance(4.0);

        // Item table
        Self::table_header(&canvas);
        canvas.advance(7.0);
        for (idx, line) in document.lines.iter().enumerate() {
            let detail = line_detail(line);
            let height = if detail.is_some() { 10.0 } else { 6.0 };
            if canvas.ensure_space(height + 4.0) {
                Self::table_header(&canvas);
                canvas.advance(7.0);
            }
            canvas.text(&(idx + 1).to_string(), 9.0, COL_NO, canvas.y, false);
            canvas.text(&line.description, 9.0, COL_ITEM, canvas.y, true);
            canvas.text_right(&line.quantity.to_string(), 9.0, COL_QTY + 8.0, canvas.y, false);
            canvas.text_right(&format_inr(line.unit_price), 9.0, COL_RATE + 15.0, canvas.y, false);
            canvas.text_right(&format_inr(line.alteration), 9.0, COL_ALT + 14.0, canvas.y, false);
            canvas.text_right(&format_inr(line.handwork), 9.0, COL_HAND + 14.0, canvas.y, false);
            canvas.text_right(&format_inr(line.other_charges), 9.0, COL_OTHER + 5.0, canvas.y, false);
            canvas.text_right(&format_inr(line.total), 9.0, RIGHT, canvas.y, true);
            if let Some(detail) = detail {
                canvas.color(muted());
                canvas.text(&detail, 7.5, COL_ITEM, canvas.y - 4.0, false);
                canvas.color(ink());
            }
            canvas.advance(height);
        }
        canvas.rule(MARGIN, RIGHT, canvas.y + 2.0);
        canvas.advance(4.0);

        // Summary box
        let totals = &document.totals;
        let mut summary = vec![
            ("Subtotal".to_string(), format_inr(totals.subtotal)),
            ("Discount".to_string(), format!("- {}", format_inr(totals.discount))),
            ("Taxable Amount".to_string(), format_inr(totals.taxable)),
            (
                format!("GST @ {}%", totals.tax_rate.normalize()),
                format_inr(totals.tax),
            ),
            ("Total".to_string(), format_inr(totals.total)),
        ];
        summary.push(("Paid".to_string(), format_inr(totals.paid)));
        summary.push(("Balance".to_string(), format_inr(totals.balance)));

        let box_height = summary.len() as f32 * 5.5 + 4.0;
        canvas.ensure_space(box_height + 30.0);
        let box_left = PAGE_W / 2.0 + 10.0;
        let box_top = canvas.y + 2.0;
        canvas.frame(box_left, box_top, RIGHT, box_top - box_height);
        canvas.advance(2.0);
        for (label, value) in &summary {
            let emphasis = label == "Total" || label == "Balance";
            canvas.text(label, 9.5, box_left + 3.0, canvas.y, emphasis);
            canvas.text_right(value, 9.5, RIGHT - 3.0, canvas.y, emphasis);
            canvas.advance(5.5);
        }

        // Amount in words sits under the box, full width.
        canvas.advance(4.0);
        canvas.text("Amount in words:", 9.0, MARGIN, canvas.y, true);
        canvas.advance(4.5);
        canvas.text(&amount_in_words(totals.total), 9.0, MARGIN, canvas.y, false);
        canvas.advance(8.0);

        // Bank block
        let bank: Vec<String> = [
            company.bank_name.as_ref().map(|v| format!("Bank: {v}")),
            company.bank_account.as_ref().map(|v| format!("A/C No: {v}")),
            company.bank_ifsc.as_ref().map(|v| format!("IFSC: {v}")),
            company.upi_id.as_ref().map(|v| format!("UPI: {v}")),
        ]
        .into_iter()
        .flatten()
        .collect();
        if !bank.is_empty() {
            canvas.ensure_space(bank.len() as f32 * 4.5 + 6.0);
            canvas.text("Payment Details", 9.5, MARGIN, canvas.y, true);
            canvas.advance(4.5);
            for text in &bank {
                canvas.text(text, 9.0, MARGIN, canvas.y, false);
                canvas.advance(4.5);
            }
            canvas.advance(3.0);
        }

        if let Some(notes) = &document.notes {
            canvas.ensure_space(10.0);
            canvas.text("Notes", 9.5, MARGIN, canvas.y, true);
            canvas.advance(4.5);
            canvas.text(notes, 9.0, MARGIN, canvas.y, false);
            canvas.advance(6.0);
        }

        canvas.color(muted());
        canvas.text(
            "This is a computer generated document and does not require a signature.",
            7.5,
            MARGIN,
            MARGIN - 5.0,
            false,
        );

        canvas.finish()
    }

    fn table_header(canvas: &Canvas) {
        canvas.color(accent());
        canvas.rule(MARGIN, RIGHT, canvas.y + 4.5);
        canvas.text("#", 9.0, COL_NO, canvas.y, true);
        canvas.text("Item", 9.0, COL_ITEM, canvas.y, true);
        canvas.text("Qty", 9.0, COL_QTY, canvas.y, true);
        canvas.text("Rate", 9.0, COL_RATE, canvas.y, true);
        canvas.text("Alter.", 9.0, COL_ALT, canvas.y, true);
        canvas.text("Handwork", 9.0, COL_HAND, canvas.y, true);
        canvas.text("Other", 9.0, COL_OTHER, canvas.y, true);
        canvas.text_right("Amount", 9.0, RIGHT, canvas.y, true);
        canvas.rule(MARGIN, RIGHT, canvas.y - 2.0);
        canvas.color(ink());
    }
}

impl DocumentBackend for FullLayout {
    fn name(&self) -> &'static str {
        "full"
    }

    fn render(&self, document: &InvoiceDocument) -> Result<Vec<u8>, PdfError> {
        Self::draw(document).map_err(|err| PdfError::backend("full", err))
    }
}

/// Text-only document: one font, no drawing, one row per line item.
pub struct SimplifiedLayout;

impl SimplifiedLayout {
    fn draw(document: &InvoiceDocument) -> Result<Vec<u8>, printpdf::Error> {
        let mut canvas = Canvas::new(&document.number)?;
        canvas.text(&document.company.name, 14.0, MARGIN, canvas.y, false);
        canvas.advance(8.0);
        canvas.text(
            &format!(
                "{} {}  {}",
                document.kind.title(),
                document.number,
                document.issued_on.format("%d-%m-%Y")
            ),
            10.0,
            MARGIN,
            canvas.y,
            false,
        );
        canvas.advance(6.0);
        canvas.text(&format!("Client: {}", document.client.name), 10.0, MARGIN, canvas.y, false);
        canvas.advance(8.0);

        for line in &document.lines {
            canvas.ensure_space(6.0);
            canvas.text(
                &format!(
                    "{} x {}  (alt {}, handwork {}, other {})",
                    line.description,
                    line.quantity,
                    format_inr(line.alteration),
                    format_inr(line.handwork),
                    format_inr(line.other_charges)
                ),
                9.0,
                MARGIN,
                canvas.y,
                false,
            );
            canvas.text_right(&format_inr(line.total), 9.0, RIGHT, canvas.y, false);
            canvas.advance(5.0);
        }

        let totals = &document.totals;
        canvas.ensure_space(40.0);
        canvas.advance(4.0);
        for (label, value) in [
            ("Subtotal", totals.subtotal),
            ("Discount", totals.discount),
            ("Tax", totals.tax),
            ("Total", totals.total),
            ("Paid", totals.paid),
            ("Balance", totals.balance),
        ] {
            canvas.text(label, 10.0, PAGE_W / 2.0, canvas.y, false);
            canvas.text_right(&format_inr(value), 10.0, RIGHT, canvas.y, false);
            canvas.advance(5.0);
        }
        canvas.advance(3.0);
        canvas.text(&amount_in_words(totals.total), 9.0, MARGIN, canvas.y, false);

        canvas.finish()
    }
}

impl DocumentBackend for SimplifiedLayout {
    fn name(&self) -> &'static str {
        "simplified"
    }

    fn render(&self, document: &InvoiceDocument) -> Result<Vec<u8>, PdfError> {
        Self::draw(document).map_err(|err| PdfError::backend("simplified", err))
    }
}
