//! Partition objects produced by the statistics utilities.
//!
//! A partition object is a plain `{partition, weights}` record. Categorical
//! partitions list one weight per category; continuous partitions list bin
//! edges, so they carry one more edge than weights. Estimation itself happens
//! outside this crate; only the record's validity rules live here.

use serde::{Deserialize, Serialize};
use serde_json::Value;

const WEIGHT_SUM_RTOL: f64 = 1e-5;
const WEIGHT_SUM_ATOL: f64 = 1e-8;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PartitionObject {
    pub partition: Vec<Value>,
    pub weights: Vec<f64>,
}

impl PartitionObject {
    pub fn new(partition: Vec<Value>, weights: Vec<f64>) -> Self {
        Self { partition, weights }
    }

    /// Read a record, returning `None` if either field is missing or mistyped.
    pub fn from_value(value: &Value) -> Option<Self> {
        Self::deserialize(value).ok()
    }

    /// Lengths are consistent with either shape and the weights sum to one.
    pub fn is_valid(&self) -> bool {
        let (edges, weights) = (self.partition.len(), self.weights.len());
        if edges != weights + 1 && edges != weights {
            return false;
        }
        let sum: f64 = self.weights.iter().sum();
        (sum - 1.0).abs() <= WEIGHT_SUM_ATOL + WEIGHT_SUM_RTOL
    }

    pub fn is_categorical(&self) -> bool {
        self.is_valid() && self.partition.len() == self.weights.len()
    }

    pub fn is_continuous(&self) -> bool {
        self.is_valid() && self.partition.len() == self.weights.len() + 1
    }
}
