/*
 * Moneybringer: prepare a new invoice
 *
 * Reads:
 *  - <config>/company.json: issuer, bank details, payment terms and the
 *    defaults offered for dates and line items
 *  - <config>/customers.json: customers by key
 *
 * To generate an invoice:
 *  - Confirm date of issue, service period and payment deadline
 *      - Default: today, day N of last month, day M of this month,
 *        issue date + payment period
 *  - Number it: files already in <invoices>/<year>/<Month>/ + 1
 *  - Enter line items until done
 *  - Calculate net, tax and gross for each item and in total
 *  - Save the invoice as JSON under raw/
 *  - Render the PDF next to it
 */

mod billing;
mod calendar;
mod cli;
mod company;
mod customers;
mod error;
mod input;
mod invoices;
mod pdf;
mod run;
mod storage;

use std::process::ExitCode;

use clap::Parser;
use tracing::error;
use tracing_subscriber::EnvFilter;

use crate::cli::Opts;

fn init_tracing() {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> ExitCode {
    let opts = Opts::parse();
    init_tracing();

    println!("Moneybringer - let's make some money! Prepare new invoice");

    match run::run(opts) {
        Ok(generated) => {
            println!(
                "Invoice {} saved:\n  {}\n  {}",
                generated.invoice.invoice_no,
                generated.json.display(),
                generated.pdf.display()
            );
            ExitCode::SUCCESS
        }
        Err(error) => {
            error!("{}", error);
            ExitCode::FAILURE
        }
    }
}
