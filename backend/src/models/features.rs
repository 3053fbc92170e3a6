//! Named feature vectors handed to predictors.

use std::sync::Arc;

/// An ordered set of named numeric features for one row.
///
/// The column names are shared between all rows built against the same schema,
/// so cloning a vector never copies the names.
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureVector {
    names: Arc<[String]>,
    values: Vec<f64>,
}

impl FeatureVector {
    /// Build a vector against a schema. Returns `None` when lengths differ.
    pub fn new(names: Arc<[String]>, values: Vec<f64>) -> Option<Self> {
        if names.len() != values.len() {
            return None;
        }
        Some(Self { names, values })
    }

    /// Used by the in-crate builders, which emit one value per schema column.
    pub(crate) fn from_schema(names: Arc<[String]>, values: Vec<f64>) -> Self {
        debug_assert_eq!(names.len(), values.len());
        Self { names, values }
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn values(&self) -> &[f64] {
        &self.values
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Look up a feature by name.
    pub fn get(&self, name: &str) -> Option<f64> {
        self.names
            .iter()
            .position(|n| n == name)
            .map(|idx| self.values[idx])
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> + '_ {
        self.names
            .iter()
            .map(String::as_str)
            .zip(self.values.iter().copied())
    }
}
