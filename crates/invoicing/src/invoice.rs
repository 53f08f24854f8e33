use std::collections::BTreeMap;

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use wholesale_core::{CustomerId, DomainError, DomainResult, InvoiceId, UserId, saturating_sum};
use wholesale_sales::{OrderLine, PaymentStatus};

/// All lines of one invoice plus the fields they share.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InvoiceView {
    pub invoice_id: InvoiceId,
    pub user_id: UserId,
    pub customer_id: CustomerId,
    pub order_date: DateTime<Utc>,
    pub payment_status: PaymentStatus,
    pub due_date: Option<NaiveDate>,
    /// Sum of line totals.
    pub total: Decimal,
    pub lines: Vec<OrderLine>,
}

impl InvoiceView {
    /// Assemble an invoice from its lines.
    ///
    /// Fails if `lines` is empty or the lines disagree on any shared field.
    pub fn from_lines(lines: Vec<OrderLine>) -> DomainResult<Self> {
        let Some(first) = lines.first() else {
            return Err(DomainError::not_found("invoice has no lines"));
        };
        let (invoice_id, user_id, customer_id, order_date, payment_status, due_date) = (
            first.invoice_id,
            first.user_id,
            first.customer_id,
            first.order_date,
            first.payment_status,
            first.due_date,
        );

        if let Some(odd) = lines.iter().find(|l| {
            l.invoice_id != invoice_id
                || l.user_id != user_id
                || l.customer_id != customer_id
                || l.order_date != order_date
                || l.payment_status != payment_status
                || l.due_date != due_date
        }) {
            return Err(DomainError::invariant(format!(
                "order line {} disagrees with invoice {invoice_id}",
                odd.id
            )));
        }

        let total = saturating_sum(lines.iter().map(|l| l.total_amount));
        Ok(Self {
            invoice_id,
            user_id,
            customer_id,
            order_date,
            payment_status,
            due_date,
            total,
            lines,
        })
    }

    pub fn profit(&self) -> Decimal {
        saturating_sum(self.lines.iter().map(OrderLine::profit))
    }

    pub fn is_due(&self) -> bool {
        self.payment_status == PaymentStatus::Due
    }

    /// Mark every line paid. Returns whether anything changed.
    pub fn mark_paid(&mut self) -> bool {
        let mut changed = false;
        for line in &mut self.lines {
            changed |= line.mark_paid();
        }
        self.payment_status = PaymentStatus::Paid;
        self.due_date = None;
        changed
    }
}

/// Group order lines into invoices by `invoice_id`, newest invoice first.
///
/// Lines keep their input order inside each invoice.
pub fn group_by_invoice(
    lines: impl IntoIterator<Item = OrderLine>,
) -> DomainResult<Vec<InvoiceView>> {
    let mut groups: BTreeMap<InvoiceId, Vec<OrderLine>> = BTreeMap::new();
    for line in lines {
        groups.entry(line.invoice_id).or_default().push(line);
    }

    let mut invoices = groups
        .into_values()
        .map(InvoiceView::from_lines)
        .collect::<DomainResult<Vec<_>>>()?;
    invoices.sort_by(|a, b| {
        b.order_date
            .cmp(&a.order_date)
            .then(b.invoice_id.cmp(&a.invoice_id))
    });
    Ok(invoices)
}

/// Command: MarkInvoicePaid.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MarkInvoicePaid {
    pub invoice_id: InvoiceId,
    pub occurred_at: DateTime<Utc>,
}

impl MarkInvoicePaid {
    /// Apply to the full line set of the invoice.
    ///
    /// Every line must belong to the invoice, and there must be at least one.
    /// Returns whether any line changed; an already-paid invoice is a no-op.
    pub fn apply(&self, lines: &mut [OrderLine]) -> DomainResult<bool> {
        if lines.is_empty() {
            return Err(DomainError::not_found(format!("invoice {}", self.invoice_id)));
        }
        if lines.iter().any(|l| l.invoice_id != self.invoice_id) {
            return Err(DomainError::invariant("line set spans several invoices"));
        }
        let mut changed = false;
        for line in lines.iter_mut() {
            changed |= line.mark_paid();
        }
        Ok(changed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use proptest::prelude::*;
    use rust_decimal_macros::dec;
    use wholesale_core::{OrderLineId, ProductId};

    fn test_time() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 2, 1, 9, 0, 0).unwrap()
    }

    fn due_line(invoice_id: InvoiceId, customer_id: CustomerId, qty: i64, price: Decimal) -> OrderLine {
        OrderLine {
            id: OrderLineId::new(),
            invoice_id,
            user_id: seller(),
            customer_id,
            product_id: ProductId::new(),
            quantity_units: qty,
            unit_price: price,
            total_amount: Decimal::from(qty) * price,
            cost_per_unit_at_sale: dec!(1),
            payment_status: PaymentStatus::Due,
            due_date: NaiveDate::from_ymd_opt(2024, 2, 2),
            order_date: test_time(),
        }
    }

    fn seller() -> UserId {
        "0190a5b2-0000-7000-8000-000000000001".parse().unwrap()
    }

    #[test]
    fn mark_paid_updates_every_line() {
        let (inv, cust) = (InvoiceId::new(), CustomerId::new());
        let mut lines = vec![
            due_line(inv, cust, 1, dec!(10)),
            due_line(inv, cust, 2, dec!(10)),
            due_line(inv, cust, 3, dec!(10)),
        ];
        let cmd = MarkInvoicePaid {
            invoice_id: inv,
            occurred_at: test_time(),
        };

        assert!(cmd.apply(&mut lines).unwrap());
        assert!(lines.iter().all(|l| l.payment_status == PaymentStatus::Paid));
        assert!(lines.iter().all(|l| l.due_date.is_none()));

        // Second time is a no-op.
        assert!(!cmd.apply(&mut lines).unwrap());
    }

    #[test]
    fn mark_paid_needs_lines_of_that_invoice() {
        let cust = CustomerId::new();
        let cmd = MarkInvoicePaid {
            invoice_id: InvoiceId::new(),
            occurred_at: test_time(),
        };
        assert!(matches!(cmd.apply(&mut []), Err(DomainError::NotFound(_))));

        let mut foreign = vec![due_line(InvoiceId::new(), cust, 1, dec!(1))];
        assert!(matches!(cmd.apply(&mut foreign), Err(DomainError::InvariantViolation(_))));
        assert!(foreign[0].is_due());
    }

    #[test]
    fn grouping_uses_the_invoice_id_not_customer_and_day() {
        let cust = CustomerId::new();
        let (a, b) = (InvoiceId::new(), InvoiceId::new());
        // Same customer, same instant, two separate invoices.
        let lines = vec![
            due_line(a, cust, 1, dec!(5)),
            due_line(b, cust, 2, dec!(5)),
            due_line(a, cust, 3, dec!(5)),
        ];

        let invoices = group_by_invoice(lines).unwrap();
        assert_eq!(invoices.len(), 2);
        let inv_a = invoices.iter().find(|i| i.invoice_id == a).unwrap();
        assert_eq!(inv_a.lines.len(), 2);
        assert_eq!(inv_a.total, dec!(20));
        assert_eq!(inv_a.profit(), dec!(16));
    }

    #[test]
    fn inconsistent_lines_fail_closed() {
        let inv = InvoiceId::new();
        let mut other = due_line(inv, CustomerId::new(), 1, dec!(1));
        other.payment_status = PaymentStatus::Paid;
        other.due_date = None;
        let lines = vec![due_line(inv, CustomerId::new(), 1, dec!(1)), other];

        assert!(matches!(
            InvoiceView::from_lines(lines),
            Err(DomainError::InvariantViolation(_))
        ));
    }

    #[test]
    fn invoice_view_mark_paid() {
        let (inv, cust) = (InvoiceId::new(), CustomerId::new());
        let mut view =
            InvoiceView::from_lines(vec![due_line(inv, cust, 1, dec!(3)), due_line(inv, cust, 1, dec!(4))])
                .unwrap();
        assert!(view.is_due());
        assert!(view.mark_paid());
        assert!(!view.is_due());
        assert!(view.lines.iter().all(|l| !l.is_due()));
    }

    proptest! {
        #[test]
        fn grouping_preserves_lines_and_totals(assignments in proptest::collection::vec((0usize..4, 1i64..50), 1..30)) {
            let cust = CustomerId::new();
            let ids: Vec<InvoiceId> = (0..4).map(|_| InvoiceId::new()).collect();
            let lines: Vec<OrderLine> = assignments
                .iter()
                .map(|(k, qty)| due_line(ids[*k], cust, *qty, dec!(2)))
                .collect();
            let expected_total: Decimal = lines.iter().map(|l| l.total_amount).sum();

            let invoices = group_by_invoice(lines.clone()).unwrap();
            let count: usize = invoices.iter().map(|i| i.lines.len()).sum();
            prop_assert_eq!(count, lines.len());
            let total: Decimal = invoices.iter().map(|i| i.total).sum();
            prop_assert_eq!(total, expected_total);
            for inv in &invoices {
                prop_assert!(inv.lines.iter().all(|l| l.invoice_id == inv.invoice_id));
            }
        }
    }
}
