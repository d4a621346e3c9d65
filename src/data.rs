//! Offer and transaction records, CSV loading, joining, and the customer
//! pivot table.

use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;

use ndarray::Array2;
use serde::Deserialize;

use crate::error::{Error, Result};

/// One promotional offer, as loaded from the offers CSV.
///
/// The offer id is numeric in the wire format; typing it as `u32` makes the
/// canonical numeric-ascending column order of the pivot the natural integer
/// order.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Offer {
    pub offer_id: u32,
    pub campaign: String,
    pub varietal: String,
    pub minimum: f64,
    pub discount: f64,
    pub origin: String,
    pub last_peak: String,
}

/// One redemption event: a customer redeemed an offer.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Transaction {
    pub last_name: String,
    pub offer_id: u32,
}

/// Denormalized row produced by the inner join: offer attributes plus the
/// customer key.
#[derive(Debug, Clone)]
pub struct JoinedRecord {
    pub last_name: String,
    pub offer: Offer,
}

/// Load the offers table from a CSV file with header
/// `OfferId,Campaign,Varietal,Minimum,Discount,Origin,LastPeak`.
pub fn read_offers(path: &Path) -> Result<Vec<Offer>> {
    read_csv(path)
}

/// Load the transactions table from a CSV file with header
/// `LastName,OfferId`.
pub fn read_transactions(path: &Path) -> Result<Vec<Transaction>> {
    read_csv(path)
}

fn read_csv<T: serde::de::DeserializeOwned>(path: &Path) -> Result<Vec<T>> {
    let file = File::open(path).map_err(|source| Error::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .from_reader(BufReader::new(file));

    let mut rows = Vec::new();
    for record in reader.deserialize() {
        let row: T = record.map_err(|source| Error::MalformedRow {
            path: path.to_path_buf(),
            source,
        })?;
        rows.push(row);
    }
    Ok(rows)
}

/// Inner-join transactions with offers on the offer id.
///
/// Offers without transactions are dropped. A transaction referencing an
/// unknown offer id means the upstream data is corrupt and fails the whole
/// join with [`Error::UnknownOfferReference`]. Output order follows the
/// transaction input order.
pub fn join(offers: &[Offer], transactions: &[Transaction]) -> Result<Vec<JoinedRecord>> {
    let by_id: HashMap<u32, &Offer> = offers.iter().map(|o| (o.offer_id, o)).collect();

    let mut joined = Vec::with_capacity(transactions.len());
    for tx in transactions {
        let offer = by_id
            .get(&tx.offer_id)
            .ok_or_else(|| Error::UnknownOfferReference {
                offer_id: tx.offer_id,
                last_name: tx.last_name.clone(),
            })?;
        joined.push(JoinedRecord {
            last_name: tx.last_name.clone(),
            offer: (*offer).clone(),
        });
    }
    Ok(joined)
}

/// Per-customer redemption counts in a fixed column order.
///
/// Column `j` counts redemptions of `offer_ids[j]`; the ids are the distinct
/// offer ids of the whole joined dataset, sorted ascending, fixed once per
/// run. Rows are ordered by sorted customer key, so identical input
/// multisets always produce identical tables regardless of record order.
#[derive(Debug, Clone)]
pub struct PivotTable {
    /// Distinct offer ids, ascending; defines the column order.
    pub offer_ids: Vec<u32>,
    /// Customer keys, ascending; row `i` belongs to `customers[i]`.
    pub customers: Vec<String>,
    /// Redemption counts, shape `(customers, offer_ids)`.
    pub counts: Array2<f64>,
}

impl PivotTable {
    /// Aggregate joined records into one count vector per customer.
    pub fn from_records(records: &[JoinedRecord]) -> Self {
        let offer_ids: Vec<u32> = records
            .iter()
            .map(|r| r.offer.offer_id)
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();
        let column: HashMap<u32, usize> = offer_ids
            .iter()
            .enumerate()
            .map(|(j, &id)| (id, j))
            .collect();

        let mut per_customer: BTreeMap<&str, Vec<f64>> = BTreeMap::new();
        for record in records {
            let row = per_customer
                .entry(record.last_name.as_str())
                .or_insert_with(|| vec![0.0; offer_ids.len()]);
            row[column[&record.offer.offer_id]] += 1.0;
        }

        let customers: Vec<String> = per_customer.keys().map(|k| k.to_string()).collect();
        let mut counts = Array2::zeros((customers.len(), offer_ids.len()));
        for (i, row) in per_customer.values().enumerate() {
            for (j, &value) in row.iter().enumerate() {
                counts[[i, j]] = value;
            }
        }

        PivotTable {
            offer_ids,
            customers,
            counts,
        }
    }

    /// Number of feature columns (distinct offer ids).
    pub fn dimension(&self) -> usize {
        self.offer_ids.len()
    }

    /// Number of customers.
    pub fn len(&self) -> usize {
        self.customers.len()
    }

    /// True when the table holds no customers.
    pub fn is_empty(&self) -> bool {
        self.customers.is_empty()
    }

    /// Write the pivot as CSV: header `C1..CD,LastName`, one row per
    /// customer with the counts first and the customer key last. All D
    /// columns are written.
    pub fn save_csv(&self, path: &Path) -> Result<()> {
        let io_err = |source| Error::Io {
            path: path.to_path_buf(),
            source,
        };

        let file = File::create(path).map_err(io_err)?;
        let mut out = BufWriter::new(file);

        let mut header: Vec<String> = (1..=self.dimension()).map(|j| format!("C{j}")).collect();
        header.push("LastName".to_string());
        writeln!(out, "{}", header.join(",")).map_err(io_err)?;

        for (i, name) in self.customers.iter().enumerate() {
            let mut fields: Vec<String> =
                self.counts.row(i).iter().map(|v| format!("{v}")).collect();
            fields.push(name.clone());
            writeln!(out, "{}", fields.join(",")).map_err(io_err)?;
        }

        out.flush().map_err(io_err)?;
        Ok(())
    }
}
