//! Data model: the database record and document entities.
//!
//! Everything here serializes with camelCase field names; the on-disk JSON
//! is part of the tool's external interface and is read by the rendering
//! and request layers.

use crate::error::{CoreError, CoreResult};
use crate::migration::{CURRENT_SCHEMA_VERSION, DEFAULT_NUMBER_FORMAT};
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use time::OffsetDateTime;
use uuid::Uuid;

/// A customer record stored in the database record, and also the shape of
/// the snapshot denormalized into each document at creation time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Customer {
    /// Stable customer identifier.
    pub id: String,
    /// Display name.
    pub name: String,
    /// Street and house number.
    #[serde(default)]
    pub street: Option<String>,
    /// Postal code.
    #[serde(default)]
    pub zip: Option<String>,
    /// City.
    #[serde(default)]
    pub city: Option<String>,
    /// Country.
    #[serde(default)]
    pub country: Option<String>,
    /// Contact email.
    #[serde(default)]
    pub email: Option<String>,
    /// Contact phone.
    #[serde(default)]
    pub phone: Option<String>,
}

impl Customer {
    /// Creates a customer with a fresh id and only a name set.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            name: name.into(),
            street: None,
            zip: None,
            city: None,
            country: None,
            email: None,
            phone: None,
        }
    }
}

/// The business profile of the tool's owner, printed on documents.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BusinessProfile {
    /// Company or trading name.
    pub name: String,
    /// Owner's name.
    #[serde(default)]
    pub owner: Option<String>,
    /// Street and house number.
    #[serde(default)]
    pub street: Option<String>,
    /// Postal code.
    #[serde(default)]
    pub zip: Option<String>,
    /// City.
    #[serde(default)]
    pub city: Option<String>,
    /// Contact email.
    #[serde(default)]
    pub email: Option<String>,
    /// Contact phone.
    #[serde(default)]
    pub phone: Option<String>,
    /// Tax identification number.
    #[serde(default)]
    pub tax_id: Option<String>,
    /// Bank account IBAN.
    #[serde(default)]
    pub iban: Option<String>,
    /// Bank identifier code.
    #[serde(default)]
    pub bic: Option<String>,
}

/// Customizable label text used by the rendering layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Labels {
    /// Heading printed on invoices.
    pub invoice_title: String,
    /// Heading printed on offers.
    pub offer_title: String,
    /// Greeting line above the item table.
    pub greeting: String,
    /// Closing line below the totals.
    pub closing: String,
    /// Payment terms paragraph on invoices.
    pub payment_terms: String,
}

impl Default for Labels {
    fn default() -> Self {
        Self {
            invoice_title: "Invoice".to_string(),
            offer_title: "Offer".to_string(),
            greeting: "Dear Sir or Madam,".to_string(),
            closing: "Thank you for your business.".to_string(),
            payment_terms: "Payable within 14 days without deduction.".to_string(),
        }
    }
}

/// A reusable catalog product (added at schema 1.2.0).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    /// Stable product identifier.
    pub id: String,
    /// Line description used when the product is added to a document.
    pub description: String,
    /// Net unit price.
    pub unit_price: Decimal,
}

/// Settings object of the database record: currency, tax defaults,
/// numbering configuration, counters, and presentation preferences.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Settings {
    /// ISO currency code.
    pub currency: String,
    /// Default tax rate in percent for new documents.
    pub default_tax_rate: Decimal,
    /// Prefix substituted for `{PREFIX}` in invoice numbers.
    pub invoice_prefix: String,
    /// Prefix substituted for `{PREFIX}` in offer numbers.
    pub offer_prefix: String,
    /// Invoice number template.
    pub invoice_number_format: String,
    /// Offer number template.
    pub offer_number_format: String,
    /// All-time invoice counter.
    pub invoice_counter: u64,
    /// All-time offer counter.
    pub offer_counter: u64,
    /// Per-calendar-year invoice counters.
    pub invoice_year_counters: BTreeMap<i32, u64>,
    /// Per-calendar-year offer counters.
    pub offer_year_counters: BTreeMap<i32, u64>,
    /// Reusable product catalog.
    #[serde(default)]
    pub products: Vec<Product>,
    /// Customizable label text.
    pub labels: Labels,
    /// UI locale, e.g. `"en"`.
    pub locale: String,
    /// UI theme name.
    pub theme: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            currency: "EUR".to_string(),
            default_tax_rate: Decimal::from(19),
            invoice_prefix: "INV".to_string(),
            offer_prefix: "OFF".to_string(),
            invoice_number_format: DEFAULT_NUMBER_FORMAT.to_string(),
            offer_number_format: DEFAULT_NUMBER_FORMAT.to_string(),
            invoice_counter: 0,
            offer_counter: 0,
            invoice_year_counters: BTreeMap::new(),
            offer_year_counters: BTreeMap::new(),
            products: Vec::new(),
            labels: Labels::default(),
            locale: "en".to_string(),
            theme: "light".to_string(),
        }
    }
}

/// The singleton database record: one per storage root.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DatabaseRecord {
    /// Schema version this record was written at.
    pub version: String,
    /// Customer master data.
    pub customers: Vec<Customer>,
    /// Business profile, absent until the user fills it in.
    #[serde(default)]
    pub business: Option<BusinessProfile>,
    /// Settings and counters.
    pub settings: Settings,
}

impl DatabaseRecord {
    /// A fresh record at the current schema version with default settings.
    #[must_use]
    pub fn new_default() -> Self {
        Self {
            version: CURRENT_SCHEMA_VERSION.to_string(),
            customers: Vec::new(),
            business: None,
            settings: Settings::default(),
        }
    }
}

/// Which entity archive a document belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DocumentKind {
    /// A quote that may later be converted to an invoice.
    Offer,
    /// A billable invoice.
    Invoice,
}

impl DocumentKind {
    /// Directory name of this kind's archive under the storage root.
    #[must_use]
    pub fn dir_name(self) -> &'static str {
        match self {
            Self::Offer => "offers",
            Self::Invoice => "invoices",
        }
    }
}

/// Lifecycle status of a document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DocumentStatus {
    /// Being edited, not yet sent.
    Draft,
    /// Sent to the customer.
    Sent,
    /// Offer accepted by the customer.
    Accepted,
    /// Offer rejected by the customer.
    Rejected,
    /// Invoice paid.
    Paid,
    /// Invoice past its due date.
    Overdue,
    /// Invoice cancelled.
    Cancelled,
}

/// One entry of the append-only status history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusChange {
    /// When the change happened.
    #[serde(with = "time::serde::rfc3339")]
    pub at: OffsetDateTime,
    /// Prior status; `None` only for the creation entry.
    #[serde(default)]
    pub from: Option<DocumentStatus>,
    /// New status.
    pub to: DocumentStatus,
    /// Optional free-text note.
    #[serde(default)]
    pub note: Option<String>,
}

/// One billed or offered position.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LineItem {
    /// Description shown on the document.
    pub description: String,
    /// Quantity.
    pub quantity: Decimal,
    /// Net price per unit.
    pub unit_price: Decimal,
    /// `quantity * unit_price`, kept in sync by [`Document::recompute_totals`].
    pub line_total: Decimal,
}

impl LineItem {
    /// Creates a line item with its total computed.
    #[must_use]
    pub fn new(description: impl Into<String>, quantity: Decimal, unit_price: Decimal) -> Self {
        Self {
            description: description.into(),
            quantity,
            unit_price,
            line_total: quantity * unit_price,
        }
    }
}

/// An offer or invoice entity, stored as one file per document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Document {
    /// Stable entity identifier.
    pub id: String,
    /// Offer or invoice.
    pub doc_type: DocumentKind,
    /// Human-meaningful document number, assigned once at creation.
    pub document_number: String,
    /// Customer snapshot taken at creation time; immune to later customer
    /// edits.
    pub customer: Customer,
    /// Ordered line items.
    pub items: Vec<LineItem>,
    /// Sum of line totals.
    pub subtotal: Decimal,
    /// Tax rate in percent.
    pub tax_rate: Decimal,
    /// `subtotal * tax_rate / 100`, rounded to two decimals.
    pub tax_amount: Decimal,
    /// `subtotal + tax_amount`.
    pub total: Decimal,
    /// Current lifecycle status.
    pub status: DocumentStatus,
    /// Append-only status history; the first entry always has `from: None`.
    pub status_history: Vec<StatusChange>,
    /// Free-text notes printed on the document.
    #[serde(default)]
    pub notes: Option<String>,
    /// Creation timestamp; also determines the year partition on disk.
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    /// Last modification timestamp.
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
    /// For invoices created by conversion: the source offer's id.
    #[serde(default)]
    pub converted_from_offer_id: Option<String>,
    /// For converted offers: the resulting invoice's id.
    #[serde(default)]
    pub converted_to_invoice_id: Option<String>,
}

impl Document {
    /// Creates a new document in `Draft` status with computed aggregates
    /// and a seeded status history.
    #[must_use]
    pub fn new(
        doc_type: DocumentKind,
        document_number: impl Into<String>,
        customer: Customer,
        items: Vec<LineItem>,
        tax_rate: Decimal,
        created_at: OffsetDateTime,
    ) -> Self {
        let mut doc = Self {
            id: Uuid::new_v4().to_string(),
            doc_type,
            document_number: document_number.into(),
            customer,
            items,
            subtotal: Decimal::ZERO,
            tax_rate,
            tax_amount: Decimal::ZERO,
            total: Decimal::ZERO,
            status: DocumentStatus::Draft,
            status_history: vec![StatusChange {
                at: created_at,
                from: None,
                to: DocumentStatus::Draft,
                note: None,
            }],
            notes: None,
            created_at,
            updated_at: created_at,
            converted_from_offer_id: None,
            converted_to_invoice_id: None,
        };
        doc.recompute_totals();
        doc
    }

    /// Recomputes line totals and aggregates from the items and tax rate.
    pub fn recompute_totals(&mut self) {
        for item in &mut self.items {
            item.line_total = item.quantity * item.unit_price;
        }
        self.subtotal = self.items.iter().map(|i| i.line_total).sum();
        // Commercial rounding, not the banker's rounding round_dp defaults to.
        self.tax_amount = (self.subtotal * self.tax_rate / Decimal::from(100))
            .round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
        self.total = self.subtotal + self.tax_amount;
    }

    /// Replaces the line items and recomputes aggregates.
    pub fn set_items(&mut self, items: Vec<LineItem>, at: OffsetDateTime) {
        self.items = items;
        self.recompute_totals();
        self.updated_at = at;
    }

    /// Transitions to a new status, appending a history entry.
    pub fn set_status(&mut self, to: DocumentStatus, note: Option<String>, at: OffsetDateTime) {
        self.status_history.push(StatusChange {
            at,
            from: Some(self.status),
            to,
            note,
        });
        self.status = to;
        self.updated_at = at;
    }

    /// The year partition this document is stored under.
    #[must_use]
    pub fn year(&self) -> i32 {
        self.created_at.year()
    }

    /// Creates the invoice resulting from converting this offer.
    ///
    /// The returned invoice is a new entity carrying the same customer
    /// snapshot, items, and tax rate, with a back-reference to this offer.
    /// The caller records the forward reference on the offer; the offer is
    /// otherwise never mutated by conversion.
    pub fn convert_to_invoice(
        &self,
        document_number: impl Into<String>,
        at: OffsetDateTime,
    ) -> CoreResult<Document> {
        if self.doc_type != DocumentKind::Offer {
            return Err(CoreError::invalid_operation(
                "only offers can be converted to invoices",
            ));
        }
        let mut invoice = Document::new(
            DocumentKind::Invoice,
            document_number,
            self.customer.clone(),
            self.items.clone(),
            self.tax_rate,
            at,
        );
        invoice.notes = self.notes.clone();
        invoice.converted_from_offer_id = Some(self.id.clone());
        Ok(invoice)
    }
}

/// On-disk wrapper for a document file: `{ "version": ..., "document": ... }`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentFile {
    /// Schema version the file was written at.
    pub version: String,
    /// The document entity.
    pub document: Document,
}

impl DocumentFile {
    /// Wraps a document at the current schema version.
    #[must_use]
    pub fn new(document: Document) -> Self {
        Self {
            version: CURRENT_SCHEMA_VERSION.to_string(),
            document,
        }
    }
}
