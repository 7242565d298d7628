//! Turns the send form's recipient input into an ordered recipient list.

use crate::error::{AppError, Result};

/// Header names accepted for the address column.
const ADDRESS_HEADERS: [&str; 2] = ["address", "email"];
const NAME_HEADER: &str = "name";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Recipient {
    pub address: String,
    pub display_name: String,
}

impl Recipient {
    pub fn new(address: impl Into<String>, display_name: impl Into<String>) -> Self {
        Self {
            address: address.into(),
            display_name: display_name.into(),
        }
    }
}

/// Where the recipient list comes from.
#[derive(Debug)]
pub enum RecipientSource<'a> {
    Single(Option<&'a str>),
    /// Raw bytes of an uploaded CSV file, if one was sent.
    Bulk(Option<&'a [u8]>),
}

/// Accepted recipients plus how many data rows the source held.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolution {
    pub recipients: Vec<Recipient>,
    pub parsed_rows: usize,
}

impl Resolution {
    pub fn skipped_rows(&self) -> usize {
        self.parsed_rows - self.recipients.len()
    }
}

pub fn resolve(source: RecipientSource<'_>) -> Result<Resolution> {
    match source {
        RecipientSource::Single(address) => {
            let address = address
                .map(str::trim)
                .filter(|a| !a.is_empty())
                .ok_or_else(|| AppError::MissingInput("Recipient email required".to_string()))?;

            Ok(Resolution {
                recipients: vec![Recipient::new(address, "")],
                parsed_rows: 1,
            })
        }
        RecipientSource::Bulk(file) => {
            let file = file.ok_or_else(|| {
                AppError::MissingInput("CSV file required for bulk send".to_string())
            })?;
            parse_csv(file)
        }
    }
}

fn parse_csv(data: &[u8]) -> Result<Resolution> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(data);

    let headers: Vec<String> = reader
        .headers()
        .map_err(|e| AppError::validation_with("Invalid CSV file", e.to_string()))?
        .iter()
        .map(|h| h.trim().to_lowercase())
        .collect();

    let address_col = headers
        .iter()
        .position(|h| ADDRESS_HEADERS.contains(&h.as_str()))
        .ok_or_else(|| {
            AppError::validation_with(
                "Invalid CSV file",
                "CSV header must include an \"address\" column",
            )
        })?;
    let name_col = headers.iter().position(|h| h == NAME_HEADER);

    let mut recipients = Vec::new();
    let mut parsed_rows = 0;

    for (idx, record) in reader.records().enumerate() {
        let record = record.map_err(|e| {
            AppError::validation_with("Invalid CSV file", format!("row {}: {}", idx + 2, e))
        })?;
        parsed_rows += 1;

        let address = record.get(address_col).unwrap_or_default();
        if address.is_empty() {
            tracing::debug!(row = idx + 2, "Skipping CSV row without address");
            continue;
        }

        let name = name_col
            .and_then(|col| record.get(col))
            .unwrap_or_default();
        recipients.push(Recipient::new(address, name));
    }

    Ok(Resolution {
        recipients,
        parsed_rows,
    })
}
