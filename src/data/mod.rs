//! Reference population loading
//!
//! The reference dataset is a static CSV of raw applicant rows plus a
//! ground-truth `default` label. It feeds the Explanation Engine (as the
//! background distribution) and the Fairness Monitor (as the audited
//! population). Load failures are fatal at startup.

use ndarray::Array2;
use serde::Deserialize;
use std::path::Path;

use crate::encode::{encode, ApplicantRecord};
use crate::schema::FeatureSchema;
use crate::{Error, Result};

/// One reference row: an applicant plus the observed outcome
#[derive(Debug, Clone, PartialEq)]
pub struct LabeledRecord {
    /// Raw applicant fields
    pub record: ApplicantRecord,
    /// Whether the applicant defaulted
    pub default: bool,
}

/// CSV row layout of the reference dataset
#[derive(Debug, Deserialize)]
struct RawRow {
    #[serde(rename = "LIMIT_BAL")]
    limit_bal: f64,
    #[serde(rename = "AGE")]
    age: f64,
    #[serde(rename = "PAY_0")]
    pay_0: i32,
    avg_bill_amt: f64,
    avg_pay_amt: f64,
    #[serde(rename = "SEX")]
    sex: u8,
    #[serde(rename = "MARRIAGE")]
    marriage: u8,
    #[serde(rename = "EDUCATION")]
    education: u8,
    default: u8,
}

impl From<RawRow> for LabeledRecord {
    fn from(row: RawRow) -> Self {
        LabeledRecord {
            record: ApplicantRecord {
                limit_bal: row.limit_bal,
                age: row.age,
                pay_0: row.pay_0,
                avg_bill_amt: row.avg_bill_amt,
                avg_pay_amt: row.avg_pay_amt,
                sex: row.sex,
                marriage: row.marriage,
                education: row.education,
            },
            default: row.default != 0,
        }
    }
}

/// Load the reference population from a CSV file
pub fn load_reference_population(path: impl AsRef<Path>) -> Result<Vec<LabeledRecord>> {
    let path = path.as_ref();
    let mut reader = csv::Reader::from_path(path)
        .map_err(|e| Error::Dataset(format!("cannot open {}: {e}", path.display())))?;

    let mut population = Vec::new();
    for (i, row) in reader.deserialize::<RawRow>().enumerate() {
        let row = row.map_err(|e| {
            Error::Dataset(format!("row {} of {}: {e}", i + 1, path.display()))
        })?;
        population.push(LabeledRecord::from(row));
    }

    if population.is_empty() {
        return Err(Error::Dataset(format!(
            "{} contains no rows",
            path.display()
        )));
    }

    Ok(population)
}

/// Encode every record in a population onto the frozen schema
pub fn encode_population(
    population: &[LabeledRecord],
    schema: &FeatureSchema,
) -> Result<Array2<f64>> {
    if population.is_empty() {
        return Err(Error::Dataset("population is empty".to_string()));
    }

    let mut matrix = Array2::zeros((population.len(), schema.len()));
    for (i, labeled) in population.iter().enumerate() {
        let vector = encode(&labeled.record, schema)?;
        matrix.row_mut(i).assign(vector.values());
    }
    Ok(matrix)
}
