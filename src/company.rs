use std::fs;
use std::path::Path;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::InvoiceError;

pub const COMPANY_FILE: &str = "company.json";

#[derive(Serialize, Deserialize, Debug, PartialEq, Clone)]
#[serde(rename_all = "camelCase")]
pub struct Address {
    pub street: String,
    pub number: String,
    pub zip_code: String,
    pub city: String,
}

#[derive(Serialize, Deserialize, Debug, PartialEq, Clone)]
#[serde(rename_all = "camelCase")]
pub struct Payment {
    pub method: String,
    pub period_in_days: i64,
}

#[derive(Serialize, Deserialize, Debug, PartialEq, Clone)]
#[serde(rename_all = "camelCase")]
pub struct PersonalDetails {
    pub first_name: String,
    pub last_name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default, alias = "phome")]
    pub phone: String,
}

#[derive(Serialize, Deserialize, Debug, PartialEq, Clone)]
#[serde(rename_all = "camelCase")]
pub struct CompanyDetails {
    pub full_name: String,
    pub address: Address,
    pub tax_number: String,
    #[serde(default)]
    pub email: String,
    #[serde(default, alias = "phome")]
    pub phone: String,
    #[serde(default, rename = "IBAN")]
    pub iban: String,
    #[serde(default, rename = "SWIFT")]
    pub swift: String,
}

fn default_quantity() -> u32 {
    160
}

/// Values offered when the operator skips a line item field.
#[derive(Serialize, Deserialize, Debug, PartialEq, Clone)]
#[serde(rename_all = "camelCase")]
pub struct PositionDefaults {
    pub default_product: String,
    pub default_unit: String,
    pub default_net_price: Decimal,
    pub default_tax_rate: Decimal,
    #[serde(rename = "polishClassificationOfGoodsAndServices")]
    pub classification: String,
    pub default_currency: String,
    #[serde(default = "default_quantity")]
    pub default_quantity: u32,
}

#[derive(Serialize, Deserialize, Debug, PartialEq, Clone)]
#[serde(rename_all = "camelCase")]
pub struct InvoiceDefaults {
    #[serde(default)]
    pub default_notes: Vec<String>,
    #[serde(default)]
    pub default_service_start_day: i64,
    #[serde(default)]
    pub default_service_end_day: i64,
    pub default_place_of_issue: String,
}

/// The issuing company as described by `company.json`.
#[derive(Serialize, Deserialize, Debug, PartialEq, Clone)]
#[serde(rename_all = "camelCase")]
pub struct Company {
    pub payment: Payment,
    pub personal_details: PersonalDetails,
    pub company_details: CompanyDetails,
    #[serde(rename = "invoicePosition")]
    pub position_defaults: PositionDefaults,
    #[serde(rename = "invoiceDetails")]
    pub invoice_defaults: InvoiceDefaults,
}

impl Company {
    pub fn load(path: &Path) -> Result<Self, InvoiceError> {
        let raw = fs::read_to_string(path).map_err(|source| {
            InvoiceError::ConfigRead {
                path: path.to_path_buf(),
                source,
            }
        })?;
        serde_json::from_str(&raw).map_err(|source| InvoiceError::ConfigFormat {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn author(&self) -> String {
        format!(
            "{} {}",
            self.personal_details.first_name, self.personal_details.last_name
        )
    }

    pub fn payment_method(&self) -> String {
        format!("{} ({} days)", self.payment.method, self.payment.period_in_days)
    }

    pub fn formatted_address(&self) -> String {
        let a = &self.company_details.address;
        format!("{} {}, {} {}", a.street, a.number, a.zip_code, a.city)
    }
}

#[cfg(test)]
pub mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use std::io::Write;

    pub const COMPANY_JSON: &str = r#"{
        "payment": { "method": "Bank transfer", "periodInDays": 14 },
        "personalDetails": {
            "firstName": "Jan",
            "lastName": "Kowalski",
            "email": "jan@example.com",
            "phome": "+48 600 000 000"
        },
        "companyDetails": {
            "fullName": "Kowalski Software",
            "address": {
                "street": "Prosta",
                "number": "12",
                "zipCode": "00-850",
                "city": "Warszawa"
            },
            "taxNumber": "PL1234567890",
            "email": "office@example.com",
            "phone": "+48 22 000 00 00",
            "IBAN": "PL61109010140000071219812874",
            "SWIFT": "WBKPPLPP"
        },
        "invoicePosition": {
            "defaultProduct": "Software development",
            "defaultUnit": "h",
            "defaultNetPrice": 100.00,
            "defaultTaxRate": 12,
            "polishClassificationOfGoodsAndServices": "62.01.11.0",
            "defaultCurrency": "EUR"
        },
        "invoiceDetails": {
            "defaultNotes": ["Reverse charge", "Thank you"],
            "defaultServiceStartDay": 1,
            "defaultServiceEndDay": 31,
            "defaultPlaceOfIssue": "Warszawa"
        }
    }"#;

    pub fn company() -> Company {
        serde_json::from_str(COMPANY_JSON).unwrap()
    }

    #[test]
    fn deserialize() {
        let company = company();
        assert_eq!(company.payment.period_in_days, 14);
        assert_eq!(company.personal_details.phone, "+48 600 000 000");
        assert_eq!(company.company_details.iban, "PL61109010140000071219812874");
        assert_eq!(company.position_defaults.default_net_price, dec!(100));
        assert_eq!(company.position_defaults.default_tax_rate, dec!(12));
        assert_eq!(company.position_defaults.classification, "62.01.11.0");
        assert_eq!(company.position_defaults.default_quantity, 160);
        assert_eq!(company.invoice_defaults.default_notes.len(), 2);
    }

    #[test]
    fn optional_keys_default() -> Result<(), serde_json::Error> {
        let mut json: serde_json::Value = serde_json::from_str(COMPANY_JSON)?;
        let details = json["companyDetails"].as_object_mut().unwrap();
        details.remove("IBAN");
        details.remove("SWIFT");
        let invoice = json["invoiceDetails"].as_object_mut().unwrap();
        invoice.remove("defaultServiceStartDay");
        invoice.remove("defaultServiceEndDay");

        let company: Company = serde_json::from_value(json)?;
        assert_eq!(company.company_details.iban, "");
        assert_eq!(company.company_details.swift, "");
        assert_eq!(company.invoice_defaults.default_service_start_day, 0);
        assert_eq!(company.invoice_defaults.default_service_end_day, 0);
        Ok(())
    }

    #[test]
    fn derived_fields() {
        let company = company();
        assert_eq!(company.author(), "Jan Kowalski");
        assert_eq!(company.payment_method(), "Bank transfer (14 days)");
        assert_eq!(company.formatted_address(), "Prosta 12, 00-850 Warszawa");
    }

    #[test]
    fn load_from_file() -> Result<(), InvoiceError> {
        let mut file = tempfile::NamedTempFile::new()?;
        file.write_all(COMPANY_JSON.as_bytes())?;
        let company = Company::load(file.path())?;
        assert_eq!(company, self::company());
        Ok(())
    }

    #[test]
    fn missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let result = Company::load(&dir.path().join(COMPANY_FILE));
        assert!(matches!(result, Err(InvoiceError::ConfigRead { .. })));
    }

    #[test]
    fn malformed_file() -> Result<(), InvoiceError> {
        let mut file = tempfile::NamedTempFile::new()?;
        file.write_all(b"{ \"payment\": ")?;
        let result = Company::load(file.path());
        assert!(matches!(result, Err(InvoiceError::ConfigFormat { .. })));
        Ok(())
    }
}
