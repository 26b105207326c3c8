//! Report rows and CSV export.
//!
//! The report is the only data this core exposes outward: one row per
//! tracked item, every stored price converted into the output currency,
//! and the cheapest region in the final column.

use std::fs::File;
use std::io::Write;
use std::path::Path;

use crate::domain::currency::Currency;
use crate::domain::price::Price;
use crate::error::HarvestError;
use crate::harvest::HarvestOutcome;
use crate::matrix::PriceMatrix;
use crate::rates::RateTable;

#[derive(Debug, Clone, PartialEq)]
pub struct ReportRow {
    pub name: String,
    /// One converted price per supported currency, in enumeration order.
    pub converted: Vec<Price>,
    pub cheapest: Currency,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PriceReport {
    pub output_currency: Currency,
    pub rows: Vec<ReportRow>,
}

impl PriceReport {
    pub fn build(matrix: &PriceMatrix, output_currency: Currency, rates: &RateTable) -> Self {
        let rows = matrix
            .items()
            .iter()
            .map(|item| ReportRow {
                name: item.name().to_owned(),
                converted: Currency::ALL
                    .into_iter()
                    .map(|currency| item.convert(currency, output_currency, rates))
                    .collect(),
                cheapest: item.cheapest_currency(output_currency, rates),
            })
            .collect();

        Self {
            output_currency,
            rows,
        }
    }

    pub fn from_outcome(outcome: &HarvestOutcome) -> Self {
        Self::build(&outcome.matrix, outcome.output_currency, &outcome.rates)
    }

    pub fn write_csv<W: Write>(&self, writer: W) -> Result<(), HarvestError> {
        let mut csv = csv::Writer::from_writer(writer);

        let mut header = Vec::with_capacity(Currency::ALL.len() + 2);
        header.push(format!(
            "Items with Regional Prices in {}",
            self.output_currency
        ));
        header.extend(Currency::ALL.into_iter().map(|c| c.as_str().to_owned()));
        header.push(String::from("Lowest Regional Price"));
        csv.write_record(&header)?;

        for row in &self.rows {
            let mut record = Vec::with_capacity(header.len());
            record.push(row.name.clone());
            record.extend(row.converted.iter().map(Price::to_string));
            record.push(row.cheapest.as_str().to_owned());
            csv.write_record(&record)?;
        }

        csv.flush()?;
        Ok(())
    }

    pub fn write_csv_file(&self, path: impl AsRef<Path>) -> Result<(), HarvestError> {
        let file = File::create(path)?;
        self.write_csv(file)
    }
}
