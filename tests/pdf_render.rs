mod common;

use std::sync::{
    Arc,
    atomic::{AtomicUsize, Ordering},
};

use jmd_backoffice_api::pdf::{
    DocumentBackend, InvoiceDocument, MinimalDocument, PdfError, PdfRenderer, RenderCache,
    amount_in_words, format_inr,
};
use rust_decimal_macros::dec;

use common::sample_document;

struct Broken;

impl DocumentBackend for Broken {
    fn name(&self) -> &'static str {
        "broken"
    }

    fn render(&self, _document: &InvoiceDocument) -> Result<Vec<u8>, PdfError> {
        Err(PdfError::backend("broken", "layout engine unavailable"))
    }
}

struct Counting {
    calls: Arc<AtomicUsize>,
}

impl DocumentBackend for Counting {
    fn name(&self) -> &'static str {
        "counting"
    }

    fn render(&self, document: &InvoiceDocument) -> Result<Vec<u8>, PdfError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(format!("%PDF-1.4 {}", document.number).into_bytes())
    }
}

#[test]
fn falls_back_past_a_failing_backend() {
    let renderer = PdfRenderer::with_backends(
        vec![Box::new(Broken), Box::new(MinimalDocument)],
        RenderCache::new(4),
    );

    let pdf = renderer.render(&sample_document("JMD-BILL-0001")).unwrap();
    assert!(pdf.starts_with(b"%PDF"));
}

#[test]
fn default_chain_renders_a_pdf() {
    let renderer = PdfRenderer::new(4);
    let pdf = renderer.render(&sample_document("JMD-BILL-0002")).unwrap();
    assert!(pdf.starts_with(b"%PDF"));
    assert_eq!(renderer.cache().len(), 1);
}

#[test]
fn identical_documents_hit_the_cache() {
    let calls = Arc::new(AtomicUsize::new(0));
    let renderer = PdfRenderer::with_backends(
        vec![Box::new(Counting {
            calls: calls.clone(),
        })],
        RenderCache::new(4),
    );

    let first = renderer.render(&sample_document("JMD-BILL-0003")).unwrap();
    let second = renderer.render(&sample_document("JMD-BILL-0003")).unwrap();

    assert!(Arc::ptr_eq(&first, &second));
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

#[test]
fn any_field_change_misses_the_cache() {
    let calls = Arc::new(AtomicUsize::new(0));
    let renderer = PdfRenderer::with_backends(
        vec![Box::new(Counting {
            calls: calls.clone(),
        })],
        RenderCache::new(4),
    );

    let document = sample_document("JMD-BILL-0004");
    let mut paid_more = document.clone();
    paid_more.totals.paid = dec!(1062);
    paid_more.totals.balance = dec!(0);

    renderer.render(&document).unwrap();
    renderer.render(&paid_more).unwrap();

    assert_eq!(calls.load(Ordering::SeqCst), 2);
    assert_eq!(renderer.cache().len(), 2);
}

#[test]
fn cache_evicts_oldest_beyond_capacity() {
    let calls = Arc::new(AtomicUsize::new(0));
    let renderer = PdfRenderer::with_backends(
        vec![Box::new(Counting {
            calls: calls.clone(),
        })],
        RenderCache::new(2),
    );

    for number in ["A", "B", "C"] {
        renderer.render(&sample_document(number)).unwrap();
    }
    assert_eq!(renderer.cache().len(), 2);

    renderer.render(&sample_document("A")).unwrap();
    assert_eq!(calls.load(Ordering::SeqCst), 4);
}

#[test]
fn every_backend_failing_is_exhausted() {
    let renderer =
        PdfRenderer::with_backends(vec![Box::new(Broken), Box::new(Broken)], RenderCache::new(4));

    let err = renderer.render(&sample_document("JMD-BILL-0005")).unwrap_err();
    assert!(matches!(err, PdfError::Exhausted(_)));
    assert!(renderer.cache().is_empty());
}

#[test]
fn no_backends_is_an_error() {
    let renderer = PdfRenderer::with_backends(Vec::new(), RenderCache::new(4));
    let err = renderer.render(&sample_document("JMD-BILL-0006")).unwrap_err();
    assert!(matches!(err, PdfError::NoBackends));
}

#[test]
fn amounts_print_in_indian_words_and_grouping() {
    assert_eq!(format_inr(dec!(123456.5)), "1,23,456.50");
    let words = amount_in_words(dec!(1062));
    assert!(words.contains("One Thousand Sixty Two"), "{words}");
}
