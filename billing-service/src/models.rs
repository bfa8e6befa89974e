use chrono::{DateTime, NaiveDate, Utc};
use database_layer::{generate_business_id, Collection, Entity};
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

fn today() -> NaiveDate {
    Utc::now().date_naive()
}

fn default_category() -> String {
    "general".to_string()
}

/// Ceiling for any single amount on an invoice or price list
pub fn max_amount() -> Decimal {
    Decimal::new(1_000_000_000_000, 0)
}

/// Round to currency precision
pub fn round_money(amount: Decimal) -> Decimal {
    amount.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

/// Invoice line
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InvoiceItem {
    pub description: String,
    /// consultation, pharmacy, laboratory, room, procedure, ...
    #[serde(default = "default_category")]
    pub category: String,
    pub quantity: u32,
    pub unit_price: Decimal,
}

impl InvoiceItem {
    /// `None` when the line total leaves the decimal range
    pub fn amount(&self) -> Option<Decimal> {
        Decimal::from(self.quantity).checked_mul(self.unit_price)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum InvoiceStatus {
    #[default]
    Unpaid,
    Partial,
    Paid,
    Overdue,
}

impl InvoiceStatus {
    /// The one place invoice status is decided.
    ///
    /// Fully paid wins (a zero-total invoice is paid), then any payment makes
    /// it partial; an untouched invoice is overdue once its due date has passed.
    pub fn derive(
        paid_amount: Decimal,
        total: Decimal,
        due_date: Option<NaiveDate>,
        today: NaiveDate,
    ) -> Self {
        if paid_amount >= total {
            InvoiceStatus::Paid
        } else if paid_amount > Decimal::ZERO {
            InvoiceStatus::Partial
        } else if due_date.is_some_and(|due| due < today) {
            InvoiceStatus::Overdue
        } else {
            InvoiceStatus::Unpaid
        }
    }

    /// Money is still owed
    pub fn is_outstanding(self) -> bool {
        !matches!(self, InvoiceStatus::Paid)
    }
}

impl fmt::Display for InvoiceStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            InvoiceStatus::Unpaid => "unpaid",
            InvoiceStatus::Partial => "partial",
            InvoiceStatus::Paid => "paid",
            InvoiceStatus::Overdue => "overdue",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PaymentMethod {
    Cash,
    Card,
    Upi,
    BankTransfer,
    Cheque,
    Insurance,
}

impl fmt::Display for PaymentMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            PaymentMethod::Cash => "cash",
            PaymentMethod::Card => "card",
            PaymentMethod::Upi => "upi",
            PaymentMethod::BankTransfer => "bank-transfer",
            PaymentMethod::Cheque => "cheque",
            PaymentMethod::Insurance => "insurance",
        };
        f.write_str(s)
    }
}

/// One payment applied to an invoice
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Payment {
    pub id: Uuid,
    pub amount: Decimal,
    pub method: PaymentMethod,
    pub reference: Option<String>,
    pub policy_id: Option<Uuid>,
    /// Claim raised for the insurer's share alongside this payment
    pub claim_id: Option<Uuid>,
    pub received_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Invoice {
    #[serde(default = "Uuid::new_v4")]
    pub id: Uuid,
    /// Business id, `INV-...`
    #[serde(default)]
    pub invoice_id: String,
    pub patient_id: Uuid,
    #[serde(default)]
    pub patient_name: String,
    #[serde(default)]
    pub items: Vec<InvoiceItem>,
    #[serde(default)]
    pub subtotal: Decimal,
    #[serde(default)]
    pub tax: Decimal,
    #[serde(default)]
    pub discount: Decimal,
    #[serde(default)]
    pub total: Decimal,
    #[serde(default)]
    pub paid_amount: Decimal,
    #[serde(default)]
    pub status: InvoiceStatus,
    #[serde(default = "today")]
    pub date: NaiveDate,
    pub due_date: Option<NaiveDate>,
    pub notes: Option<String>,
    /// Set on invoices generated by dispensing
    pub prescription_id: Option<Uuid>,
    #[serde(default)]
    pub payments: Vec<Payment>,
}

impl Invoice {
    /// `total - paidAmount`
    pub fn balance_due(&self) -> Decimal {
        self.total - self.paid_amount
    }

    /// Recompute subtotal and total from the line items
    pub fn recompute_totals(&mut self) -> Result<(), String> {
        let out_of_range = || "invoice amounts are out of range".to_string();
        if !self.items.is_empty() {
            let subtotal = self
                .items
                .iter()
                .try_fold(Decimal::ZERO, |sum, item| sum.checked_add(item.amount()?))
                .ok_or_else(out_of_range)?;
            self.subtotal = round_money(subtotal);
        }
        self.total = self
            .subtotal
            .checked_add(self.tax)
            .and_then(|gross| gross.checked_sub(self.discount))
            .ok_or_else(out_of_range)?;
        Ok(())
    }

    pub fn derive_status(&self, today: NaiveDate) -> InvoiceStatus {
        InvoiceStatus::derive(self.paid_amount, self.total, self.due_date, today)
    }
}

impl Entity for Invoice {
    const COLLECTION: Collection = Collection::Invoices;
    const READ_ONLY_FIELDS: &'static [&'static str] = &[
        "invoiceId",
        "subtotal",
        "total",
        "paidAmount",
        "status",
        "payments",
    ];
    const DATE_DERIVED_FIELDS: &'static [&'static str] = &["status"];

    fn id(&self) -> Uuid {
        self.id
    }

    fn business_id(&self) -> Option<&str> {
        Some(&self.invoice_id)
    }

    fn prepare_insert(&mut self) {
        if self.invoice_id.is_empty() {
            self.invoice_id = generate_business_id("INV");
        }
    }

    fn refresh_derived(&mut self) -> Result<(), String> {
        self.recompute_totals()?;
        self.refresh_for_date(today());
        Ok(())
    }

    fn refresh_for_date(&mut self, today: NaiveDate) {
        self.status = self.derive_status(today);
    }

    fn validate(&self) -> Result<(), String> {
        if self.items.iter().any(|item| item.quantity == 0) {
            return Err("item quantity must be at least 1".to_string());
        }
        if self.items.iter().any(|item| item.unit_price < Decimal::ZERO) {
            return Err("item unitPrice cannot be negative".to_string());
        }
        let limit = max_amount();
        if self.items.iter().any(|item| item.unit_price > limit)
            || [self.subtotal, self.tax, self.discount, self.total]
                .iter()
                .any(|amount| *amount > limit)
        {
            return Err(format!("invoice amounts cannot exceed {limit}"));
        }
        if self.subtotal < Decimal::ZERO || self.tax < Decimal::ZERO || self.discount < Decimal::ZERO {
            return Err("subtotal, tax and discount cannot be negative".to_string());
        }
        if self.total < Decimal::ZERO {
            return Err("discount exceeds subtotal plus tax".to_string());
        }
        if self.paid_amount < Decimal::ZERO || self.paid_amount > self.total {
            return Err("paidAmount must be between 0 and total".to_string());
        }
        Ok(())
    }
}
