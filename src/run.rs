use std::path::PathBuf;

use chrono::{Local, NaiveDate};
use tracing::info;

use crate::cli::Opts;
use crate::company::{Company, COMPANY_FILE};
use crate::customers::{Customers, CUSTOMERS_FILE};
use crate::error::InvoiceError;
use crate::input::{InquirePrompter, Prompter};
use crate::invoices::{create_invoice, InvoiceCreatedData};
use crate::pdf;
use crate::storage::InvoiceStore;

/// Where one run finds its config and files its output.
#[derive(Debug, Clone)]
pub struct Settings {
    pub customer: String,
    pub config_dir: PathBuf,
    pub output_dir: PathBuf,
}

impl From<Opts> for Settings {
    fn from(opts: Opts) -> Self {
        Self {
            customer: opts.customer,
            config_dir: opts.config_dir,
            output_dir: opts.output_dir,
        }
    }
}

impl Settings {
    fn company_path(&self) -> PathBuf {
        self.config_dir.join(COMPANY_FILE)
    }

    fn customers_path(&self) -> PathBuf {
        self.config_dir.join(CUSTOMERS_FILE)
    }
}

#[derive(Debug)]
pub struct Generated {
    pub invoice: InvoiceCreatedData,
    pub json: PathBuf,
    pub pdf: PathBuf,
}

pub fn run(opts: Opts) -> Result<Generated, InvoiceError> {
    let today = Local::now().date_naive();
    generate(&Settings::from(opts), &mut InquirePrompter, today)
}

/// The whole pipeline: config, questions, numbering, then the JSON copy
/// followed by the PDF. A failed PDF leaves the JSON in place.
pub fn generate<P: Prompter + ?Sized>(
    settings: &Settings,
    prompter: &mut P,
    today: NaiveDate,
) -> Result<Generated, InvoiceError> {
    let company = Company::load(&settings.company_path())?;
    let customers = Customers::load(&settings.customers_path())?;
    let customer = customers.get(&settings.customer)?;
    info!("Preparing invoice for {}", customer.full_name);

    let store = InvoiceStore::new(&settings.output_dir);
    let number = store.next_number(today)?;
    let invoice = create_invoice(prompter, &company, customer, number, today)?;

    println!("\nInvoice data:\n\n{}\n", invoice);

    let json = store.save_raw(&invoice, today)?;
    let pdf = store.pdf_path(&invoice, today)?;
    pdf::render(&invoice, &pdf)?;

    Ok(Generated { invoice, json, pdf })
}
