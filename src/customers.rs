use std::collections::BTreeMap;
use std::fmt;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::InvoiceError;

pub const CUSTOMERS_FILE: &str = "customers.json";

#[derive(Serialize, Deserialize, Debug, PartialEq, Clone)]
#[serde(rename_all = "camelCase")]
pub struct CustomerAddress {
    pub street_address: String,
    #[serde(default)]
    pub state: String,
    #[serde(default, alias = "country")]
    pub number: String,
    pub zip_code: String,
    pub city: String,
}

#[derive(Serialize, Deserialize, Debug, PartialEq, Clone)]
#[serde(rename_all = "camelCase")]
pub struct Customer {
    pub full_name: String,
    pub address: CustomerAddress,
}

impl fmt::Display for Customer {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let a = &self.address;
        write!(
            f,
            "{}\n{}, {}\n{}, {} - {}",
            self.full_name, a.street_address, a.number, a.city, a.state, a.zip_code
        )
    }
}

#[derive(Serialize, Deserialize, Debug, PartialEq, Clone)]
pub struct Customers {
    customers: BTreeMap<String, Customer>,
}

impl Customers {
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

    pub fn get(&self, key: &str) -> Result<&Customer, InvoiceError> {
        self.customers
            .get(key)
            .ok_or_else(|| InvoiceError::CustomerNotFound {
                key: key.to_string(),
            })
    }
}

#[cfg(test)]
pub mod tests {
    use super::*;

    pub const CUSTOMERS_JSON: &str = r#"{
        "customers": {
            "Acme": {
                "fullName": "Acme Corporation",
                "address": {
                    "streetAddress": "Road Runner Ave",
                    "state": "Arizona",
                    "country": "42",
                    "zipCode": "85001",
                    "city": "Phoenix"
                }
            },
            "default": {
                "fullName": "Default Customer",
                "address": {
                    "streetAddress": "Main St",
                    "number": "1",
                    "zipCode": "10001",
                    "city": "New York"
                }
            }
        }
    }"#;

    pub fn customers() -> Customers {
        serde_json::from_str(CUSTOMERS_JSON).unwrap()
    }

    #[test]
    fn lookup() -> Result<(), InvoiceError> {
        let customers = customers();
        let acme = customers.get("Acme")?;
        assert_eq!(acme.full_name, "Acme Corporation");
        assert_eq!(acme.address.number, "42");
        assert_eq!(customers.get("default")?.address.state, "");
        Ok(())
    }

    #[test]
    fn unknown_customer() {
        let customers = customers();
        match customers.get("acme") {
            Err(InvoiceError::CustomerNotFound { key }) => assert_eq!(key, "acme"),
            other => panic!("unexpected lookup result: {:?}", other),
        }
    }

    #[test]
    fn display() -> Result<(), InvoiceError> {
        let customers = customers();
        assert_eq!(
            customers.get("Acme")?.to_string(),
            "Acme Corporation\nRoad Runner Ave, 42\nPhoenix, Arizona - 85001"
        );
        Ok(())
    }
}
