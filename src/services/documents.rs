//! Projections from stored records onto the renderer's document model.

use std::sync::Arc;

use rust_decimal::Decimal;

use crate::{
    config::CompanyProfile,
    error::{AppError, AppResult},
    models::{Bill, ClientDetails, Invoice, InvoiceLine, Order, OrderItem, ShippingDetails},
    pdf::{DocumentKind, DocumentLine, DocumentParty, DocumentTotals, InvoiceDocument},
    pricing::settle,
    state::AppState,
};

/// Render off the async executor; layout is CPU bound.
pub async fn render(state: &AppState, document: InvoiceDocument) -> AppResult<Arc<Vec<u8>>> {
    let renderer = state.renderer.clone();
    let number = document.number.clone();
    let pdf = tokio::task::spawn_blocking(move || renderer.render(&document))
        .await
        .map_err(|err| AppError::Internal(err.into()))??;
    tracing::debug!(number = %number, size = pdf.len(), "document rendered");
    Ok(pdf)
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|s| !s.is_empty())
}

fn locality(city: &Option<String>, state: &Option<String>, pincode: &Option<String>) -> Option<String> {
    let parts: Vec<&str> = [city, state, pincode]
        .into_iter()
        .filter_map(non_empty)
        .collect();
    (!parts.is_empty()).then(|| parts.join(", "))
}

pub fn client_party(details: &ClientDetails) -> DocumentParty {
    let mut address_lines: Vec<String> = non_empty(&details.address)
        .map(str::to_string)
        .into_iter()
        .collect();
    address_lines.extend(locality(&details.city, &details.state, &details.pincode));

    DocumentParty {
        name: details.name.clone(),
        mobile: Some(details.mobile.clone()),
        email: details.email.clone(),
        address_lines,
        gstin: details.gstin.clone(),
    }
}

pub fn shipping_party(shipping: &ShippingDetails, client: &ClientDetails) -> DocumentParty {
    let mut address_lines = vec![shipping.address.clone()];
    address_lines.extend(locality(&shipping.city, &shipping.state, &shipping.pincode));

    DocumentParty {
        name: shipping
            .contact_name
            .clone()
            .unwrap_or_else(|| client.name.clone()),
        mobile: shipping
            .contact_mobile
            .clone()
            .or_else(|| Some(client.mobile.clone())),
        email: None,
        address_lines,
        gstin: None,
    }
}

fn order_lines(items: &[OrderItem]) -> Vec<DocumentLine> {
    items
        .iter()
        .map(|item| DocumentLine {
            description: item.item_name.clone(),
            style: item.style.as_ref().map(|s| s.style_name.clone()),
            fabric: item.fabric_name.clone(),
            fabric_meters: item.fabric_meters,
            quantity: item.quantity,
            unit_price: item.unit_price,
            alteration: item.alteration,
            handwork: item.handwork,
            other_charges: item.other_charges,
            total: item.total_price,
        })
        .collect()
}

fn invoice_lines(lines: &[InvoiceLine]) -> Vec<DocumentLine> {
    lines
        .iter()
        .map(|line| DocumentLine {
            description: line.item_name.clone(),
            style: line.style.as_ref().map(|s| s.style_name.clone()),
            fabric: line.fabric_name.clone(),
            fabric_meters: line.fabric_meters,
            quantity: line.quantity,
            unit_price: line.unit_price,
            alteration: line.alteration,
            handwork: line.handwork,
            other_charges: line.other_charges,
            total: line.total_price,
        })
        .collect()
}

fn order_totals(order: &Order, paid: Decimal, balance: Decimal) -> DocumentTotals {
    DocumentTotals {
        subtotal: order.subtotal,
        discount: order.discount_amount,
        taxable: order.taxable_amount,
        tax_rate: order.tax_rate,
        tax: order.tax_amount,
        total: order.total_amount,
        paid,
        balance,
    }
}

pub fn order_confirmation(
    company: &CompanyProfile,
    order: &Order,
    items: &[OrderItem],
    client: &ClientDetails,
) -> InvoiceDocument {
    let settlement = settle(order.total_amount, order.advance_payment);
    InvoiceDocument {
        kind: DocumentKind::OrderConfirmation,
        number: order.order_number.clone(),
        issued_on: order.created_at.date_naive(),
        due_on: order.expected_delivery_date,
        order_number: None,
        company: company.clone(),
        client: client_party(client),
        shipping: order
            .shipping_details
            .as_ref()
            .map(|s| shipping_party(s, client)),
        lines: order_lines(items),
        totals: order_totals(order, settlement.paid_amount, settlement.pending_amount),
        notes: order.notes.clone(),
    }
}

pub fn bill_document(
    company: &CompanyProfile,
    order: &Order,
    items: &[OrderItem],
    client: &ClientDetails,
    bill: &Bill,
) -> InvoiceDocument {
    InvoiceDocument {
        kind: DocumentKind::Bill,
        number: bill.bill_number.clone(),
        issued_on: bill.bill_date.date_naive(),
        due_on: bill.due_date,
        order_number: Some(order.order_number.clone()),
        company: company.clone(),
        client: client_party(client),
        shipping: order
            .shipping_details
            .as_ref()
            .map(|s| shipping_party(s, client)),
        lines: order_lines(items),
        totals: order_totals(order, bill.paid_amount, bill.pending_amount),
        notes: bill.notes.clone().or_else(|| order.notes.clone()),
    }
}

pub fn invoice_document(company: &CompanyProfile, invoice: &Invoice) -> InvoiceDocument {
    InvoiceDocument {
        kind: DocumentKind::Invoice,
        number: invoice.invoice_number.clone(),
        issued_on: invoice.created_at.date_naive(),
        due_on: None,
        order_number: None,
        company: company.clone(),
        client: client_party(&invoice.customer),
        shipping: None,
        lines: invoice_lines(&invoice.items),
        totals: DocumentTotals {
            subtotal: invoice.subtotal,
            discount: invoice.discount_amount,
            taxable: invoice.taxable_amount,
            tax_rate: invoice.tax_rate,
            tax: invoice.tax_amount,
            total: invoice.total_amount,
            paid: invoice.paid_amount,
            balance: invoice.balance_amount,
        },
        notes: invoice.notes.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn client_address_collapses_locality_parts() {
        let details = ClientDetails {
            name: "Asha".into(),
            mobile: "9876543210".into(),
            email: None,
            address: Some("12 MG Road".into()),
            city: Some("Pune".into()),
            state: None,
            pincode: Some("411001".into()),
            gstin: None,
        };
        let party = client_party(&details);
        assert_eq!(party.address_lines, vec!["12 MG Road", "Pune, 411001"]);
        assert_eq!(party.mobile.as_deref(), Some("9876543210"));
    }
}
