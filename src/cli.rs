use clap::{Parser, ValueHint};
use std::path::PathBuf;

/* Argument Stucture
 *
 * moneybringer [--customer <key>] [--config-dir <dir>] [--output-dir <dir>]
 *
 * config-dir holds company.json and customers.json
 * output-dir receives <year>/<MonthName>/ with the PDF and a raw/ JSON copy
 */

/// Prepare a new invoice for a customer
#[derive(Parser)]
#[clap(name = "moneybringer", version)]
pub struct Opts {
    /// key name to identify the customer in customers.json
    #[clap(short, long, default_value = "default")]
    pub customer: String,

    /// Directory holding company.json and customers.json
    #[clap(long, default_value = "./config",
        value_hint = ValueHint::DirPath)]
    pub config_dir: PathBuf,

    /// Root directory of the generated invoices
    #[clap(long, default_value = "./invoices",
        value_hint = ValueHint::DirPath)]
    pub output_dir: PathBuf,
}
