// Revenue and receivables reporting over invoices
use crate::models::{AgingBuckets, ReportPeriod, RevenueReport};
use billing_service::Invoice;
use chrono::NaiveDate;
use itertools::Itertools;
use rust_decimal::Decimal;

/// Summarize the invoices dated within `period`.
///
/// Collections are split by payment method from each invoice's payment
/// history. Receivables age from the invoice date.
pub fn revenue_report(invoices: &[Invoice], period: ReportPeriod, today: NaiveDate) -> RevenueReport {
    let in_period = invoices
        .iter()
        .filter(|invoice| period.contains(invoice.date))
        .collect_vec();

    let by_payment_method = in_period
        .iter()
        .flat_map(|invoice| invoice.payments.iter())
        .map(|payment| (payment.method, payment.amount))
        .into_grouping_map()
        .sum()
        .into_iter()
        .collect();

    let by_category = in_period
        .iter()
        .flat_map(|invoice| invoice.items.iter())
        .map(|item| (item.category.clone(), item.amount().unwrap_or_default()))
        .into_grouping_map()
        .sum()
        .into_iter()
        .collect();

    let mut receivables = AgingBuckets::default();
    for invoice in in_period.iter().filter(|i| i.balance_due() > Decimal::ZERO) {
        receivables.add((today - invoice.date).num_days(), invoice.balance_due());
    }

    RevenueReport {
        period,
        invoice_count: in_period.len() as u64,
        billed: in_period.iter().map(|i| i.total).sum(),
        collected: in_period.iter().map(|i| i.paid_amount).sum(),
        outstanding: receivables.total(),
        by_payment_method,
        by_category,
        receivables,
    }
}
