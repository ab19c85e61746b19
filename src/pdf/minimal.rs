use std::fmt::Write as _;

use super::{DocumentBackend, InvoiceDocument, PdfError, format_inr, words::amount_in_words};

/// Last-resort single-page PDF written byte by byte with the standard
/// Helvetica font.
pub struct MinimalDocument;

/// PDF string literal body: ASCII only, with `\`, `(` and `)` escaped.
fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '\\' | '(' | ')' => {
                out.push('\\');
                out.push(ch);
            }
            ' '..='~' => out.push(ch),
            _ => out.push('?'),
        }
    }
    out
}

fn content_lines(document: &InvoiceDocument) -> Vec<String> {
    let mut lines = vec![
        document.company.name.clone(),
        format!("{} {}", document.kind.title(), document.number),
        format!("Date: {}", document.issued_on.format("%d-%m-%Y")),
        format!("Client: {}", document.client.name),
        String::new(),
    ];
    for (idx, line) in document.lines.iter().enumerate() {
        lines.push(format!(
            "{}. {} x{}  {}",
            idx + 1,
            line.description,
            line.quantity,
            format_inr(line.total)
        ));
    }
    let totals = &document.totals;
    lines.push(String::new());
    lines.push(format!("Subtotal: {}", format_inr(totals.subtotal)));
    lines.push(format!("Discount: {}", format_inr(totals.discount)));
    lines.push(format!("Tax: {}", format_inr(totals.tax)));
    lines.push(format!("Total: {}", format_inr(totals.total)));
    lines.push(format!("Paid: {}", format_inr(totals.paid)));
    lines.push(format!("Balance: {}", format_inr(totals.balance)));
    lines.push(amount_in_words(totals.total));
    lines
}

pub fn write_minimal_pdf(lines: &[String]) -> Vec<u8> {
    let mut stream = String::from("BT\n/F1 10 Tf\n14 TL\n50 800 Td\n");
    // A4 at 14pt leading fits 55 lines; anything after that is dropped.
    for line in lines.iter().take(55) {
        let _ = writeln!(stream, "({}) Tj T*", escape(line));
    }
    stream.push_str("ET\n");

    let objects = [
        "<< /Type /Catalog /Pages 2 0 R >>".to_string(),
        "<< /Type /Pages /Kids [3 0 R] /Count 1 >>".to_string(),
        "<< /Type /Page /Parent 2 0 R /MediaBox [0 0 595 842] \
         /Resources << /Font << /F1 4 0 R >> >> /Contents 5 0 R >>"
            .to_string(),
        "<< /Type /Font /Subtype /Type1 /BaseFont /Helvetica >>".to_string(),
        format!("<< /Length {} >>\nstream\n{}endstream", stream.len(), stream),
    ];

    let mut out = String::from("%PDF-1.4\n");
    let mut offsets = Vec::with_capacity(objects.len());
    for (idx, body) in objects.iter().enumerate() {
        offsets.push(out.len());
        let _ = write!(out, "{} 0 obj\n{}\nendobj\n", idx + 1, body);
    }

    let xref_at = out.len();
    let _ = write!(out, "xref\n0 {}\n0000000000 65535 f \n", objects.len() + 1);
    for offset in offsets {
        let _ = write!(out, "{offset:010} 00000 n \n");
    }
    let _ = write!(
        out,
        "trailer\n<< /Size {} /Root 1 0 R >>\nstartxref\n{}\n%%EOF\n",
        objects.len() + 1,
        xref_at
    );
    out.into_bytes()
}

impl DocumentBackend for MinimalDocument {
    fn name(&self) -> &'static str {
        "minimal"
    }

    fn render(&self, document: &InvoiceDocument) -> Result<Vec<u8>, PdfError> {
        Ok(write_minimal_pdf(&content_lines(document)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn minimal_pdf_has_header_xref_and_escaped_text() {
        let bytes = write_minimal_pdf(&["Total (incl. GST) \\ ₹".to_string()]);
        let text = String::from_utf8(bytes).unwrap();
        assert!(text.starts_with("%PDF-1.4\n"));
        assert!(text.contains("(Total \\(incl. GST\\) \\\\ ?) Tj"));
        assert!(text.trim_end().ends_with("%%EOF"));

        let xref_at: usize = text
            .split("startxref\n")
            .nth(1)
            .and_then(|rest| rest.lines().next())
            .and_then(|n| n.parse().ok())
            .unwrap();
        assert!(text[xref_at..].starts_with("xref"));
    }
}
