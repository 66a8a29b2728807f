use std::fmt;

use chrono::{Days, NaiveDate};
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::billing::{summary_currency, InvoicePosition, InvoiceSummary};
use crate::calendar::{format_date, parse_date, DateBoundaries};
use crate::company::Company;
use crate::customers::{Customer, CustomerAddress};
use crate::error::InvoiceError;
use crate::input::{self, Prompter};

#[derive(Serialize, Deserialize, Debug, PartialEq, Clone)]
#[serde(rename_all = "PascalCase")]
pub struct InvoicePayment {
    pub deadline: String,
    pub method: String,
}

#[derive(Serialize, Deserialize, Debug, PartialEq, Clone)]
#[serde(rename_all = "PascalCase")]
pub struct InvoiceFrom {
    pub full_name: String,
    pub address: String,
    pub tax_number: String,
    pub email: String,
}

impl From<&Company> for InvoiceFrom {
    fn from(company: &Company) -> Self {
        let details = &company.company_details;
        Self {
            full_name: details.full_name.clone(),
            address: company.formatted_address(),
            tax_number: details.tax_number.clone(),
            email: details.email.clone(),
        }
    }
}

#[derive(Serialize, Deserialize, Debug, PartialEq, Clone)]
#[serde(rename_all = "PascalCase")]
pub struct InvoiceToAddress {
    pub street_address: String,
    pub state: String,
    pub number: String,
    pub zip_code: String,
    pub city: String,
}

impl From<&CustomerAddress> for InvoiceToAddress {
    fn from(address: &CustomerAddress) -> Self {
        Self {
            street_address: address.street_address.clone(),
            state: address.state.clone(),
            number: address.number.clone(),
            zip_code: address.zip_code.clone(),
            city: address.city.clone(),
        }
    }
}

#[derive(Serialize, Deserialize, Debug, PartialEq, Clone)]
#[serde(rename_all = "PascalCase")]
pub struct InvoiceTo {
    pub full_name: String,
    pub address: InvoiceToAddress,
}

impl From<&Customer> for InvoiceTo {
    fn from(customer: &Customer) -> Self {
        Self {
            full_name: customer.full_name.clone(),
            address: InvoiceToAddress::from(&customer.address),
        }
    }
}

/// Dates as they will be printed. Operator overrides are kept verbatim.
#[derive(Debug, PartialEq, Clone)]
pub struct Dates {
    pub issue: String,
    pub service_start: String,
    pub service_end: String,
    pub payment_deadline: String,
}

fn shifted(date: NaiveDate, day: i64) -> NaiveDate {
    date.with_day_of_month(day).unwrap_or(date)
}

/// Deadline proposed for an issue date. An unreadable issue date counts
/// from `today` instead.
pub fn proposed_deadline(issue: &str, period_in_days: i64, today: NaiveDate) -> NaiveDate {
    let issued = parse_date(issue).unwrap_or_else(|error| {
        warn!(
            "Could not read date of issue '{}' ({}), using current date to calculate deadline",
            issue, error
        );
        today
    });
    let days = Days::new(period_in_days.unsigned_abs());
    let deadline = if period_in_days >= 0 {
        issued.checked_add_days(days)
    } else {
        issued.checked_sub_days(days)
    };
    deadline.unwrap_or(issued)
}

impl Dates {
    pub fn resolve<P: Prompter + ?Sized>(
        prompter: &mut P,
        company: &Company,
        today: NaiveDate,
    ) -> Result<Self, InvoiceError> {
        let defaults = &company.invoice_defaults;

        let issue = input::text(prompter, "Date of issue:", &format_date(today))?;

        let start = today
            .previous_month()
            .map(|d| shifted(d, defaults.default_service_start_day))
            .unwrap_or(today);
        let service_start =
            input::text(prompter, "Service start date:", &format_date(start))?;

        let end = shifted(today, defaults.default_service_end_day);
        let service_end = input::text(prompter, "Service end date:", &format_date(end))?;

        let deadline = proposed_deadline(&issue, company.payment.period_in_days, today);
        let payment_deadline =
            input::text(prompter, "Payment deadline:", &format_date(deadline))?;

        Ok(Self {
            issue,
            service_start,
            service_end,
            payment_deadline,
        })
    }
}

/// A complete invoice. Company and customer details are copied in, so
/// later config edits do not change an invoice once built.
#[derive(Serialize, Deserialize, Debug, PartialEq, Clone)]
#[serde(rename_all = "PascalCase")]
pub struct InvoiceCreatedData {
    pub invoice_no: String,
    pub date_of_issue: String,
    pub place_of_issue: String,
    pub service_start_date: String,
    pub service_end_date: String,
    pub payment: InvoicePayment,
    pub invoice_from: InvoiceFrom,
    pub invoice_to: InvoiceTo,
    #[serde(rename = "IBAN")]
    pub iban: String,
    #[serde(rename = "SWIFT")]
    pub swift: String,
    pub invoice_positions: Vec<InvoicePosition>,
    pub invoice_summary: InvoiceSummary,
    pub notes: String,
    #[serde(rename = "IssuedAnInvoice")]
    pub issued_by: String,
    pub author_first_name: String,
    pub author_last_name: String,
}

impl InvoiceCreatedData {
    pub fn new(
        invoice_no: String,
        company: &Company,
        customer: &Customer,
        dates: Dates,
        positions: Vec<InvoicePosition>,
    ) -> Self {
        let invoice_summary = InvoiceSummary::from_positions(&positions);

        Self {
            invoice_no,
            date_of_issue: dates.issue,
            place_of_issue: company.invoice_defaults.default_place_of_issue.clone(),
            service_start_date: dates.service_start,
            service_end_date: dates.service_end,
            payment: InvoicePayment {
                deadline: dates.payment_deadline,
                method: company.payment_method(),
            },
            invoice_from: InvoiceFrom::from(company),
            invoice_to: InvoiceTo::from(customer),
            iban: company.company_details.iban.clone(),
            swift: company.company_details.swift.clone(),
            invoice_positions: positions,
            invoice_summary,
            notes: company.invoice_defaults.default_notes.join(", "),
            issued_by: company.author(),
            author_first_name: company.personal_details.first_name.clone(),
            author_last_name: company.personal_details.last_name.clone(),
        }
    }

    /// `<number>_<first>_<last>` with the number's slashes made file safe.
    pub fn file_stem(&self) -> String {
        format!(
            "{}_{}_{}",
            self.invoice_no.replace('/', "_"),
            self.author_first_name,
            self.author_last_name
        )
    }

    pub fn currency(&self) -> &str {
        summary_currency(&self.invoice_positions)
    }
}

/// Asks for dates and line items and builds the invoice numbered `invoice_no`.
pub fn create_invoice<P: Prompter + ?Sized>(
    prompter: &mut P,
    company: &Company,
    customer: &Customer,
    invoice_no: String,
    today: NaiveDate,
) -> Result<InvoiceCreatedData, InvoiceError> {
    let dates = Dates::resolve(prompter, company, today)?;
    let positions = input::positions(prompter, &company.position_defaults)?;

    Ok(InvoiceCreatedData::new(
        invoice_no, company, customer, dates, positions,
    ))
}

impl fmt::Display for InvoiceCreatedData {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "Invoice: {}\n\
             Date of issue: {} ({})\n\
             Service: {} - {}\n\
             Payment: {}, due {}\n\n\
             From: {}, {}\n\
             To: {}, {} {}, {} {}\n\n",
            self.invoice_no,
            self.date_of_issue,
            self.place_of_issue,
            self.service_start_date,
            self.service_end_date,
            self.payment.method,
            self.payment.deadline,
            self.invoice_from.full_name,
            self.invoice_from.address,
            self.invoice_to.full_name,
            self.invoice_to.address.street_address,
            self.invoice_to.address.number,
            self.invoice_to.address.zip_code,
            self.invoice_to.address.city,
        )?;

        for position in self.invoice_positions.iter() {
            writeln!(f, "{}", position)?;
        }

        write!(f, "\n{} ({})", self.invoice_summary, self.currency())
    }
}
