//! Frozen feature schema shared by training and inference
//!
//! The schema is an explicit, ordered list of typed feature slots. It is
//! produced once at training time, stored alongside the model artifacts,
//! and treated as read-only thereafter. Both the encoder and the artifact
//! loader validate against it, so a column-order drift between training
//! and serving fails loudly instead of silently zero-filling.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use crate::{Error, Result};

/// Canonical feature names for the credit-default layout
pub mod names {
    pub const LIMIT_BAL: &str = "LIMIT_BAL";
    pub const AGE: &str = "AGE";
    pub const PAY_0: &str = "PAY_0";
    pub const AVG_BILL_AMT: &str = "avg_bill_amt";
    pub const AVG_PAY_AMT: &str = "avg_pay_amt";
    pub const SEX: &str = "SEX";
    pub const MARRIAGE: &str = "MARRIAGE";
    pub const EDUCATION: &str = "EDUCATION";
    pub const PAYMENT_TO_BILL_RATIO: &str = "payment_to_bill_ratio";
    pub const HIGH_UTILIZATION: &str = "high_utilization";
    pub const HAS_DELAY: &str = "has_delay";
}

/// How a slot's value is produced during encoding
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SlotKind {
    /// Taken directly from a raw applicant field
    Numeric,
    /// Derived deterministically from raw fields
    Engineered,
    /// One-hot/dummy expansion column; absent categories fill with 0
    Dummy,
}

/// One typed slot in the frozen feature layout
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeatureSlot {
    /// Column name, matched exactly during encoding
    pub name: String,
    /// Slot kind
    pub kind: SlotKind,
}

impl FeatureSlot {
    /// Create a new slot
    pub fn new(name: impl Into<String>, kind: SlotKind) -> Self {
        Self {
            name: name.into(),
            kind,
        }
    }
}

/// Ordered, frozen list of feature slots
///
/// Length and order define the feature vector the model was trained on.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeatureSchema {
    slots: Vec<FeatureSlot>,
}

impl FeatureSchema {
    /// Build a schema from slots, rejecting duplicates and empty layouts
    pub fn new(slots: Vec<FeatureSlot>) -> Result<Self> {
        if slots.is_empty() {
            return Err(Error::InvalidParameter(
                "feature schema must have at least one slot".to_string(),
            ));
        }

        let mut seen = HashSet::new();
        for slot in &slots {
            if !seen.insert(slot.name.as_str()) {
                return Err(Error::SchemaMismatch {
                    slot: slot.name.clone(),
                    detail: "duplicate slot name".to_string(),
                });
            }
        }

        Ok(Self { slots })
    }

    /// The frozen layout for the credit-default model
    ///
    /// Raw fields first, then the engineered columns, in the order the
    /// training pipeline emits them.
    pub fn credit_default() -> Self {
        let slots = vec![
            FeatureSlot::new(names::LIMIT_BAL, SlotKind::Numeric),
            FeatureSlot::new(names::AGE, SlotKind::Numeric),
            FeatureSlot::new(names::PAY_0, SlotKind::Numeric),
            FeatureSlot::new(names::AVG_BILL_AMT, SlotKind::Numeric),
            FeatureSlot::new(names::AVG_PAY_AMT, SlotKind::Numeric),
            FeatureSlot::new(names::SEX, SlotKind::Numeric),
            FeatureSlot::new(names::MARRIAGE, SlotKind::Numeric),
            FeatureSlot::new(names::EDUCATION, SlotKind::Numeric),
            FeatureSlot::new(names::PAYMENT_TO_BILL_RATIO, SlotKind::Engineered),
            FeatureSlot::new(names::HIGH_UTILIZATION, SlotKind::Engineered),
            FeatureSlot::new(names::HAS_DELAY, SlotKind::Engineered),
        ];

        Self { slots }
    }

    /// Number of slots
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    /// Whether the schema has no slots
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Iterate slots in frozen order
    pub fn iter(&self) -> impl Iterator<Item = &FeatureSlot> {
        self.slots.iter()
    }

    /// Slot names in frozen order
    pub fn feature_names(&self) -> Vec<&str> {
        self.slots.iter().map(|s| s.name.as_str()).collect()
    }

    /// Position of a named slot, if present
    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.slots.iter().position(|s| s.name == name)
    }

    /// Check that a vector of the given width fits this schema
    pub fn validate_width(&self, width: usize, what: &str) -> Result<()> {
        if width != self.slots.len() {
            return Err(Error::SchemaMismatch {
                slot: what.to_string(),
                detail: format!("expected {} columns, got {width}", self.slots.len()),
            });
        }
        Ok(())
    }
}
