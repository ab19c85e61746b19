//! Bill, invoice and order-confirmation documents.
//!
//! [`PdfRenderer`] walks an ordered list of [`DocumentBackend`]s and returns
//! the first document that renders, so a billing flow always gets a valid PDF
//! unless every tier fails.

pub mod cache;
pub mod layout;
pub mod minimal;
pub mod words;

use std::sync::Arc;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config::CompanyProfile;

pub use cache::RenderCache;
pub use layout::{FullLayout, SimplifiedLayout};
pub use minimal::MinimalDocument;
pub use words::amount_in_words;

pub const PDF_CONTENT_TYPE: &str = "application/pdf";

#[derive(Debug, Error)]
pub enum PdfError {
    #[error("{backend} renderer failed: {message}")]
    Backend {
        backend: &'static str,
        message: String,
    },

    #[error("all renderers failed, last error: {0}")]
    Exhausted(Box<PdfError>),

    #[error("no renderers configured")]
    NoBackends,
}

impl PdfError {
    pub fn backend(backend: &'static str, err: impl std::fmt::Display) -> Self {
        PdfError::Backend {
            backend,
            message: err.to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DocumentKind {
    Bill,
    Invoice,
    OrderConfirmation,
}

impl DocumentKind {
    pub fn title(&self) -> &'static str {
        match self {
            DocumentKind::Bill => "BILL",
            DocumentKind::Invoice => "TAX INVOICE",
            DocumentKind::OrderConfirmation => "ORDER CONFIRMATION",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentParty {
    pub name: String,
    pub mobile: Option<String>,
    pub email: Option<String>,
    pub address_lines: Vec<String>,
    pub gstin: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentLine {
    pub description: String,
    pub style: Option<String>,
    pub fabric: Option<String>,
    pub fabric_meters: Decimal,
    pub quantity: i32,
    pub unit_price: Decimal,
    pub alteration: Decimal,
    pub handwork: Decimal,
    pub other_charges: Decimal,
    pub total: Decimal,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentTotals {
    pub subtotal: Decimal,
    pub discount: Decimal,
    pub taxable: Decimal,
    pub tax_rate: Decimal,
    pub tax: Decimal,
    pub total: Decimal,
    pub paid: Decimal,
    pub balance: Decimal,
}

/// Everything a renderer needs; no database handles.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InvoiceDocument {
    pub kind: DocumentKind,
    pub number: String,
    pub issued_on: NaiveDate,
    pub due_on: Option<NaiveDate>,
    pub order_number: Option<String>,
    pub company: CompanyProfile,
    pub client: DocumentParty,
    pub shipping: Option<DocumentParty>,
    pub lines: Vec<DocumentLine>,
    pub totals: DocumentTotals,
    pub notes: Option<String>,
}

impl InvoiceDocument {
    pub fn file_name(&self) -> String {
        format!("{}.pdf", self.number)
    }
}

pub trait DocumentBackend: Send + Sync {
    fn name(&self) -> &'static str;

    fn render(&self, document: &InvoiceDocument) -> Result<Vec<u8>, PdfError>;
}

pub struct PdfRenderer {
    backends: Vec<Box<dyn DocumentBackend>>,
    cache: RenderCache,
}

impl PdfRenderer {
    /// Full layout, then the simplified layout, then the hand-written document.
    pub fn new(cache_capacity: usize) -> Self {
        Self::with_backends(
            vec![
                Box::new(FullLayout),
                Box::new(SimplifiedLayout),
                Box::new(MinimalDocument),
            ],
            RenderCache::new(cache_capacity),
        )
    }

    pub fn with_backends(backends: Vec<Box<dyn DocumentBackend>>, cache: RenderCache) -> Self {
        Self { backends, cache }
    }

    pub fn cache(&self) -> &RenderCache {
        &self.cache
    }

    pub fn render(&self, document: &InvoiceDocument) -> Result<Arc<Vec<u8>>, PdfError> {
        let key = cache::fingerprint(document);
        if let Some(bytes) = self.cache.get(&key) {
            tracing::debug!(number = %document.number, "pdf cache hit");
            return Ok(bytes);
        }

        let mut last_error = None;
        for backend in &self.backends {
            match backend.render(document) {
                Ok(bytes) => {
                    tracing::debug!(
                        number = %document.number,
                        backend = backend.name(),
                        size = bytes.len(),
                        "pdf rendered"
                    );
                    let bytes = Arc::new(bytes);
                    self.cache.insert(key, bytes.clone());
                    return Ok(bytes);
                }
                Err(err) => {
                    tracing::warn!(
                        number = %document.number,
                        backend = backend.name(),
                        error = %err,
                        "pdf renderer failed, falling back"
                    );
                    last_error = Some(err);
                }
            }
        }

        match last_error {
            Some(err) => Err(PdfError::Exhausted(Box::new(err))),
            None => Err(PdfError::NoBackends),
        }
    }
}

/// `₹`-less money text used by every layout: `1,23,456.50`.
pub fn format_inr(amount: Decimal) -> String {
    let amount = crate::pricing::round_money(amount);
    let negative = amount.is_sign_negative() && !amount.is_zero();
    let text = format!("{:.2}", amount.abs());
    let (whole, fraction) = text.split_once('.').unwrap_or((text.as_str(), "00"));

    let mut grouped = String::new();
    let digits: Vec<char> = whole.chars().collect();
    let len = digits.len();
    for (idx, digit) in digits.iter().enumerate() {
        let remaining = len - idx;
        grouped.push(*digit);
        if remaining > 3 && (remaining - 3) % 2 == 1 {
            grouped.push(',');
        }
    }

    if negative {
        format!("-{grouped}.{fraction}")
    } else {
        format!("{grouped}.{fraction}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn inr_grouping_uses_lakh_and_crore_commas() {
        assert_eq!(format_inr(dec!(0)), "0.00");
        assert_eq!(format_inr(dec!(950)), "950.00");
        assert_eq!(format_inr(dec!(1062)), "1,062.00");
        assert_eq!(format_inr(dec!(123456.5)), "1,23,456.50");
        assert_eq!(format_inr(dec!(12345678.9)), "1,23,45,678.90");
    }
}
