use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::etl::DataRecord;
use crate::quality::config::{ColumnExpectations, Expectation};
use crate::utils::error::{Result, StacksError};

/// Outcome of one expectation against one column.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExpectationResult {
    pub column_name: String,
    pub expectation_type: String,
    pub success: bool,
    pub unexpected_count: usize,
}

fn column_values<'a>(records: &'a [DataRecord], column: &str) -> Vec<Option<&'a str>> {
    records
        .iter()
        .map(|record| record.get(column).map(|value| value.as_str()))
        .collect()
}

fn kwarg_f64(expectation: &Expectation, key: &str) -> Option<f64> {
    expectation.expectation_kwargs.get(key).and_then(|v| v.as_f64())
}

fn evaluate_one(
    records: &[DataRecord],
    column: &str,
    expectation: &Expectation,
) -> Result<ExpectationResult> {
    let values = column_values(records, column);

    let unexpected_count = match expectation.expectation_type.as_str() {
        "expect_column_to_exist" => {
            let exists = records.is_empty() || records[0].contains_key(column);
            usize::from(!exists)
        }
        "expect_column_values_to_not_be_null" => values
            .iter()
            .filter(|value| value.is_none_or(|v| v.is_empty()))
            .count(),
        "expect_column_values_to_be_unique" => {
            let mut seen = HashSet::new();
            values
                .iter()
                .filter(|value| match value {
                    Some(v) => !seen.insert(*v),
                    None => false,
                })
                .count()
        }
        "expect_column_values_to_be_between" => {
            let min = kwarg_f64(expectation, "min_value");
            let max = kwarg_f64(expectation, "max_value");
            values
                .iter()
                .filter(|value| {
                    let Some(parsed) = value.and_then(|v| v.parse::<f64>().ok()) else {
                        return true;
                    };
                    min.is_some_and(|m| parsed < m) || max.is_some_and(|m| parsed > m)
                })
                .count()
        }
        "expect_column_values_to_be_in_set" => {
            let value_set: HashSet<String> = expectation
                .expectation_kwargs
                .get("value_set")
                .and_then(|v| v.as_array())
                .map(|values| {
                    values
                        .iter()
                        .map(|v| match v {
                            serde_json::Value::String(s) => s.clone(),
                            other => other.to_string(),
                        })
                        .collect()
                })
                .unwrap_or_default();
            values
                .iter()
                .filter(|value| !value.is_some_and(|v| value_set.contains(v)))
                .count()
        }
        other => {
            return Err(StacksError::ConfigError {
                message: format!("unsupported expectation type: {other}"),
            })
        }
    };

    Ok(ExpectationResult {
        column_name: column.to_string(),
        expectation_type: expectation.expectation_type.clone(),
        success: unexpected_count == 0,
        unexpected_count,
    })
}

/// Evaluates every configured expectation against the records.
pub fn execute_validations(
    records: &[DataRecord],
    validation_config: &[ColumnExpectations],
) -> Result<Vec<ExpectationResult>> {
    let mut results = Vec::new();
    for column_config in validation_config {
        for expectation in &column_config.expectations {
            results.push(evaluate_one(records, &column_config.column_name, expectation)?);
        }
    }
    Ok(results)
}
