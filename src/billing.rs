use std::fmt;
use std::iter::Sum;
use std::ops::Add;

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

pub const FALLBACK_CURRENCY: &str = "PLN";

/// Two decimal places, as amounts are printed on the invoice.
pub fn money(amount: Decimal) -> String {
    let rounded =
        amount.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
    format!("{:.2}", rounded)
}

/// Tax due on `net` at `rate` percent, or `None` when it overflows.
pub fn tax_amount(net: Decimal, rate: u32) -> Option<Decimal> {
    if rate == 0 {
        return Some(Decimal::ZERO);
    }
    net.checked_mul(Decimal::from(rate))?
        .checked_div(Decimal::ONE_HUNDRED)
}

/// Operator supplied values of a line item, before anything is derived.
#[derive(Debug, PartialEq, Clone)]
pub struct PositionDraft {
    pub name: String,
    pub classification: String,
    pub unit: String,
    pub quantity: u32,
    pub net_price: Decimal,
    pub tax_rate: u32,
    pub currency: String,
}

#[derive(Serialize, Deserialize, Debug, PartialEq, Clone)]
#[serde(rename_all = "PascalCase")]
pub struct InvoicePosition {
    pub item_no: usize,
    pub product_or_service_name: String,
    #[serde(rename = "PolishClassificationOfGoodsAndServices")]
    pub classification: String,
    pub unit: String,
    pub quantity: u32,
    pub net_price: Decimal,
    pub net_value: Decimal,
    pub tax_rate: u32,
    pub tax_amount: Decimal,
    pub gross_value: Decimal,
    pub currency: String,
}

impl InvoicePosition {
    /// Derives net, tax and gross values. `None` if any of them does not
    /// fit in a `Decimal`.
    pub fn new(item_no: usize, draft: PositionDraft) -> Option<Self> {
        let net_value = draft.net_price.checked_mul(Decimal::from(draft.quantity))?;
        let tax_amount = tax_amount(net_value, draft.tax_rate)?;
        let gross_value = net_value.checked_add(tax_amount)?;
        Some(Self {
            item_no,
            product_or_service_name: draft.name,
            classification: draft.classification,
            unit: draft.unit,
            quantity: draft.quantity,
            net_price: draft.net_price,
            net_value,
            tax_rate: draft.tax_rate,
            tax_amount,
            gross_value,
            currency: draft.currency,
        })
    }
}

impl fmt::Display for InvoicePosition {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "{}. {} ({}), {} {} @ {}: net {} + {}% tax {} = {} {}",
            self.item_no,
            self.product_or_service_name,
            self.classification,
            self.quantity,
            self.unit,
            money(self.net_price),
            money(self.net_value),
            self.tax_rate,
            money(self.tax_amount),
            money(self.gross_value),
            self.currency,
        )
    }
}

#[derive(Serialize, Deserialize, Debug, PartialEq, Clone, Copy, Default)]
#[serde(rename_all = "PascalCase")]
pub struct InvoiceSummary {
    pub total_amount: Decimal,
    pub total_tax_amount: Decimal,
    pub total_gross_value: Decimal,
}

impl InvoiceSummary {
    pub fn from_positions(positions: &[InvoicePosition]) -> Self {
        positions.iter().map(Self::from).sum()
    }

    pub fn checked_add(self, other: Self) -> Option<Self> {
        Some(Self {
            total_amount: self.total_amount.checked_add(other.total_amount)?,
            total_tax_amount: self.total_tax_amount.checked_add(other.total_tax_amount)?,
            total_gross_value: self.total_gross_value.checked_add(other.total_gross_value)?,
        })
    }
}

impl From<&InvoicePosition> for InvoiceSummary {
    fn from(position: &InvoicePosition) -> Self {
        Self {
            total_amount: position.net_value,
            total_tax_amount: position.tax_amount,
            total_gross_value: position.gross_value,
        }
    }
}

impl Add for InvoiceSummary {
    type Output = Self;

    fn add(self, other: Self) -> Self {
        Self {
            total_amount: self.total_amount + other.total_amount,
            total_tax_amount: self.total_tax_amount + other.total_tax_amount,
            total_gross_value: self.total_gross_value + other.total_gross_value,
        }
    }
}

impl Sum for InvoiceSummary {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::default(), |acc, x| acc + x)
    }
}

/// Currency shown next to the totals: the first item's, unless it is blank.
pub fn summary_currency(positions: &[InvoicePosition]) -> &str {
    positions
        .first()
        .map(|p| p.currency.as_str())
        .filter(|c| !c.is_empty())
        .unwrap_or(FALLBACK_CURRENCY)
}

impl fmt::Display for InvoiceSummary {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        writeln!(f, "Total Amount: {}", money(self.total_amount))?;
        writeln!(f, "Total Tax Amount: {}", money(self.total_tax_amount))?;
        write!(f, "Total Gross Value: {}", money(self.total_gross_value))
    }
}
