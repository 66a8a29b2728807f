use std::fs::{self, DirBuilder, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use chrono::{Datelike, NaiveDate};
use tracing::info;

use crate::calendar::month_name;
use crate::error::InvoiceError;
use crate::invoices::InvoiceCreatedData;

pub const RAW_DIR: &str = "raw";

/// Creates `path` and any missing parents, world readable.
fn create_dirs(path: &Path) -> Result<(), InvoiceError> {
    if path.is_dir() {
        return Ok(());
    }

    let mut builder = DirBuilder::new();
    builder.recursive(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::DirBuilderExt;
        builder.mode(0o755);
    }
    builder.create(path)?;
    info!("Directory created: {}", path.display());
    Ok(())
}

/// The dated tree of generated invoices:
/// `<root>/<year>/<MonthName>/` for PDFs and `.../raw/` for JSON copies.
#[derive(Debug, Clone)]
pub struct InvoiceStore {
    root: PathBuf,
}

impl InvoiceStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn month_dir(&self, date: NaiveDate) -> Result<PathBuf, InvoiceError> {
        let dir = self
            .root
            .join(date.year().to_string())
            .join(month_name(date));
        create_dirs(&dir)?;
        Ok(dir)
    }

    /// `<n>/<month>/<year>` where n - 1 invoices were already filed this
    /// month. Only files count; the raw/ directory does not.
    ///
    /// Numbers are not reserved, so two runs at once can get the same one.
    pub fn next_number(&self, date: NaiveDate) -> Result<String, InvoiceError> {
        let dir = self.month_dir(date)?;

        let mut count = 0;
        for entry in fs::read_dir(&dir)? {
            if !entry?.file_type()?.is_dir() {
                count += 1;
            }
        }

        let number = format!("{}/{}/{}", count + 1, date.month(), date.year());
        info!("Next invoice number: {}", number);
        Ok(number)
    }

    pub fn raw_path(
        &self,
        invoice: &InvoiceCreatedData,
        date: NaiveDate,
    ) -> Result<PathBuf, InvoiceError> {
        let dir = self.month_dir(date)?.join(RAW_DIR);
        create_dirs(&dir)?;
        Ok(dir.join(format!("{}.json", invoice.file_stem())))
    }

    pub fn pdf_path(
        &self,
        invoice: &InvoiceCreatedData,
        date: NaiveDate,
    ) -> Result<PathBuf, InvoiceError> {
        Ok(self
            .month_dir(date)?
            .join(format!("{}.pdf", invoice.file_stem())))
    }

    /// Writes the invoice as indented JSON and returns where it went.
    pub fn save_raw(
        &self,
        invoice: &InvoiceCreatedData,
        date: NaiveDate,
    ) -> Result<PathBuf, InvoiceError> {
        let path = self.raw_path(invoice, date)?;
        let mut writer = BufWriter::new(File::create(&path)?);
        serde_json::to_writer_pretty(&mut writer, invoice)?;
        writer.flush()?;

        info!("JSON data successfully saved to {}", path.display());
        Ok(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::company::tests::company;
    use crate::customers::tests::customers;
    use crate::invoices::{Dates, InvoiceCreatedData};
    use tempfile::TempDir;

    fn ymd(year: i32, month: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(year, month, day).unwrap()
    }

    fn invoice(number: &str) -> InvoiceCreatedData {
        let dates = Dates {
            issue: "17-10-2024".to_string(),
            service_start: "01-09-2024".to_string(),
            service_end: "31-10-2024".to_string(),
            payment_deadline: "31-10-2024".to_string(),
        };
        InvoiceCreatedData::new(
            number.to_string(),
            &company(),
            customers().get("Acme").unwrap(),
            dates,
            Vec::new(),
        )
    }

    #[test]
    fn first_number_creates_directory() -> Result<(), InvoiceError> {
        let tmp = TempDir::new()?;
        let store = InvoiceStore::new(tmp.path().join("invoices"));

        assert_eq!(store.next_number(ymd(2024, 10, 17))?, "1/10/2024");
        assert!(tmp.path().join("invoices/2024/October").is_dir());
        Ok(())
    }

    #[test]
    fn counts_files_not_directories() -> Result<(), InvoiceError> {
        let tmp = TempDir::new()?;
        let store = InvoiceStore::new(tmp.path());
        let today = ymd(2024, 3, 2);
        let dir = store.month_dir(today)?;

        File::create(dir.join("1_3_2024_Jan_Kowalski.pdf"))?;
        File::create(dir.join("2_3_2024_Jan_Kowalski.pdf"))?;
        fs::create_dir(dir.join(RAW_DIR))?;
        fs::create_dir(dir.join("drafts"))?;

        assert_eq!(store.next_number(today)?, "3/3/2024");
        Ok(())
    }

    #[test]
    fn months_are_numbered_separately() -> Result<(), InvoiceError> {
        let tmp = TempDir::new()?;
        let store = InvoiceStore::new(tmp.path());
        File::create(store.month_dir(ymd(2024, 1, 31))?.join("a.pdf"))?;

        assert_eq!(store.next_number(ymd(2024, 1, 31))?, "2/1/2024");
        assert_eq!(store.next_number(ymd(2024, 2, 1))?, "1/2/2024");
        assert_eq!(store.next_number(ymd(2025, 1, 1))?, "1/1/2025");
        Ok(())
    }

    #[test]
    fn save_raw_json() -> Result<(), InvoiceError> {
        let tmp = TempDir::new()?;
        let store = InvoiceStore::new(tmp.path());
        let today = ymd(2024, 10, 17);
        let invoice = invoice("4/10/2024");

        let path = store.save_raw(&invoice, today)?;
        assert_eq!(
            path,
            tmp.path().join("2024/October/raw/4_10_2024_Jan_Kowalski.json")
        );

        let written = fs::read_to_string(&path)?;
        assert!(written.starts_with("{\n  \"InvoiceNo\": \"4/10/2024\""));
        let back: InvoiceCreatedData = serde_json::from_str(&written)?;
        assert_eq!(back, invoice);

        // the raw/ directory must not shift the numbering
        assert_eq!(store.next_number(today)?, "1/10/2024");
        Ok(())
    }

    #[test]
    fn pdf_path_naming() -> Result<(), InvoiceError> {
        let tmp = TempDir::new()?;
        let store = InvoiceStore::new(tmp.path());

        assert_eq!(
            store.pdf_path(&invoice("12/5/2024"), ymd(2024, 5, 30))?,
            tmp.path().join("2024/May/12_5_2024_Jan_Kowalski.pdf")
        );
        Ok(())
    }
}
