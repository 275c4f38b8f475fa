//! Feature Encoder
//!
//! Maps a raw applicant record onto the fixed-width numeric vector the
//! model expects. Encoding is a pure function of the record's fields and
//! the frozen [`FeatureSchema`]: the same record always produces the same
//! vector, with length and order matching the schema exactly.
//!
//! Engineered columns use the training-time formulas verbatim; changing
//! them here without retraining would silently skew every prediction.
//!
//! # Example
//!
//! ```
//! use riesgo::encode::{encode, ApplicantRecord};
//! use riesgo::schema::FeatureSchema;
//!
//! let schema = FeatureSchema::credit_default();
//! let record = ApplicantRecord::new(120_000.0, 35.0, 2, 100_000.0, 500_000.0);
//! let vector = encode(&record, &schema).unwrap();
//! assert_eq!(vector.len(), schema.len());
//! ```

use ndarray::Array1;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::schema::{names, FeatureSchema, SlotKind};
use crate::{Error, Result};


/// A raw loan applicant, immutable once constructed
///
/// Protected attributes (`sex`, `marriage`, `education`) are carried as
/// the integer codes of the UCI credit-default dataset. They remain model
/// inputs; fairness filtering happens at explanation time, never here.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApplicantRecord {
    /// Approved credit limit
    #[serde(rename = "LIMIT_BAL")]
    pub limit_bal: f64,
    /// Applicant age in years
    #[serde(rename = "AGE")]
    pub age: f64,
    /// Most recent payment delay code (months; <= 0 means on time)
    #[serde(rename = "PAY_0")]
    pub pay_0: i32,
    /// Average monthly bill amount
    pub avg_bill_amt: f64,
    /// Average monthly payment amount
    pub avg_pay_amt: f64,
    /// Sex code (1 = male, 2 = female)
    #[serde(rename = "SEX", default = "default_code")]
    pub sex: u8,
    /// Marital status code (1 = married, 2 = single, 3 = others)
    #[serde(rename = "MARRIAGE", default = "default_code")]
    pub marriage: u8,
    /// Education code (1 = graduate school, 2 = university, 3 = high school)
    #[serde(rename = "EDUCATION", default = "default_code")]
    pub education: u8,
}

fn default_code() -> u8 {
    0
}

impl ApplicantRecord {
    /// Create a record with unknown protected attribute codes
    pub fn new(limit_bal: f64, age: f64, pay_0: i32, avg_bill_amt: f64, avg_pay_amt: f64) -> Self {
        Self {
            limit_bal,
            age,
            pay_0,
            avg_bill_amt,
            avg_pay_amt,
            sex: 0,
            marriage: 0,
            education: 0,
        }
    }

    /// Set the protected attribute codes
    pub fn with_demographics(mut self, sex: u8, marriage: u8, education: u8) -> Self {
        self.sex = sex;
        self.marriage = marriage;
        self.education = education;
        self
    }
}

/// An encoded feature vector, aligned to the schema it was built from
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureVector {
    values: Array1<f64>,
}

impl FeatureVector {
    /// Values in frozen schema order
    pub fn values(&self) -> &Array1<f64> {
        &self.values
    }

    /// Number of features
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Whether the vector is empty
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// Encode a record onto the frozen schema
///
/// Every non-dummy slot must be producible from the record; a slot the
/// encoder cannot fill is a [`Error::SchemaMismatch`] and the request is
/// rejected without partial scoring. Dummy slots whose category is absent
/// from this record fill with 0, mirroring the training-time reindex.
pub fn encode(record: &ApplicantRecord, schema: &FeatureSchema) -> Result<FeatureVector> {
    let derived = derive_features(record);

    let mut values = Array1::zeros(schema.len());
    for (i, slot) in schema.iter().enumerate() {
        match derived.get(slot.name.as_str()) {
            Some(v) => values[i] = *v,
            None if slot.kind == SlotKind::Dummy => values[i] = 0.0,
            None => {
                return Err(Error::SchemaMismatch {
                    slot: slot.name.clone(),
                    detail: "required raw field cannot be derived from the record".to_string(),
                })
            }
        }
    }

    Ok(FeatureVector { values })
}

/// Derive the full name -> value map for a record
///
/// Must match the training-time feature engineering exactly:
/// - `payment_to_bill_ratio = avg_pay_amt / (avg_bill_amt + 1)`
/// - `high_utilization = 1 if avg_bill_amt > 0.7 * limit_bal`
/// - `has_delay = 1 if pay_0 > 0`
fn derive_features(record: &ApplicantRecord) -> HashMap<&'static str, f64> {
    let ratio = guard_finite(
        names::PAYMENT_TO_BILL_RATIO,
        record.avg_pay_amt / (record.avg_bill_amt + 1.0),
    );
    let high_utilization = f64::from(record.avg_bill_amt > 0.7 * record.limit_bal);
    let has_delay = f64::from(record.pay_0 > 0);

    let mut map = HashMap::with_capacity(11);
    map.insert(names::LIMIT_BAL, record.limit_bal);
    map.insert(names::AGE, record.age);
    map.insert(names::PAY_0, f64::from(record.pay_0));
    map.insert(names::AVG_BILL_AMT, record.avg_bill_amt);
    map.insert(names::AVG_PAY_AMT, record.avg_pay_amt);
    map.insert(names::SEX, f64::from(record.sex));
    map.insert(names::MARRIAGE, f64::from(record.marriage));
    map.insert(names::EDUCATION, f64::from(record.education));
    map.insert(names::PAYMENT_TO_BILL_RATIO, ratio);
    map.insert(names::HIGH_UTILIZATION, high_utilization);
    map.insert(names::HAS_DELAY, has_delay);
    map
}

/// Neutralize a non-finite engineered value to 0
///
/// Deliberate masking policy: scoring proceeds, but the substitution is
/// surfaced as a data-quality signal.
fn guard_finite(feature: &str, value: f64) -> f64 {
    if value.is_finite() {
        value
    } else {
        tracing::warn!(feature, value = %value, "non-finite engineered value masked to 0");
        0.0
    }
}
