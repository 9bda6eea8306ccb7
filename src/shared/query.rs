//! Generic structured queries over JSON documents.
//!
//! The list/search and stat operations accept open-ended query documents
//! rather than fixed filter schemas. This module defines that grammar
//! (`SearchQuery`, `StatQuery`) and evaluates it against serialized resource
//! records. Keys are dot-paths into the document (`protocol_id`,
//! `limit.day`, ...).

use std::cmp::Ordering;
use std::collections::{BTreeMap, HashSet};

use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use utoipa::ToSchema;

use crate::core::error::{AppError, Result};
use crate::shared::constants::{DEFAULT_PAGE_SIZE, MAX_PAGE_SIZE};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum FilterOperator {
    #[default]
    Eq,
    Not,
    In,
    NotIn,
    Contains,
    Gt,
    Gte,
    Lt,
    Lte,
    Exists,
}

/// A single filter condition against a document key
#[derive(Debug, Clone, Deserialize, Serialize, ToSchema)]
pub struct Filter {
    /// Dot-path into the document (e.g. "protocol_id", "limit.day")
    pub key: String,

    /// Comparison operand. For `in`/`not_in` this must be an array; for
    /// `exists` a boolean (default true).
    #[serde(default)]
    pub value: Value,

    #[serde(default)]
    pub operator: FilterOperator,
}

impl Filter {
    pub fn matches(&self, doc: &Value) -> bool {
        let found = lookup(doc, &self.key);

        if self.operator == FilterOperator::Exists {
            let expected = self.value.as_bool().unwrap_or(true);
            return found.is_some() == expected;
        }

        // An absent key fails every positive condition and passes the
        // negated ones.
        let Some(actual) = found else {
            return matches!(self.operator, FilterOperator::Not | FilterOperator::NotIn);
        };

        match self.operator {
            FilterOperator::Eq => values_equal(actual, &self.value),
            FilterOperator::Not => !values_equal(actual, &self.value),
            FilterOperator::In => self
                .value
                .as_array()
                .map(|candidates| candidates.iter().any(|v| values_equal(actual, v)))
                .unwrap_or(false),
            FilterOperator::NotIn => self
                .value
                .as_array()
                .map(|candidates| !candidates.iter().any(|v| values_equal(actual, v)))
                .unwrap_or(true),
            FilterOperator::Contains => match actual {
                Value::String(s) => self.value.as_str().map(|n| s.contains(n)).unwrap_or(false),
                Value::Array(items) => items.iter().any(|v| values_equal(v, &self.value)),
                _ => false,
            },
            FilterOperator::Gt => compare(actual, &self.value) == Some(Ordering::Greater),
            FilterOperator::Gte => matches!(
                compare(actual, &self.value),
                Some(Ordering::Greater | Ordering::Equal)
            ),
            FilterOperator::Lt => compare(actual, &self.value) == Some(Ordering::Less),
            FilterOperator::Lte => matches!(
                compare(actual, &self.value),
                Some(Ordering::Less | Ordering::Equal)
            ),
            FilterOperator::Exists => unreachable!(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize, ToSchema)]
pub struct Sort {
    pub key: String,

    #[serde(default)]
    pub desc: bool,
}

/// Pagination window. `start` is 1-based; omitting the page entirely returns
/// the full result set.
#[derive(Debug, Clone, Copy, Default, Deserialize, Serialize, ToSchema)]
pub struct Page {
    pub start: Option<i64>,
    pub limit: Option<i64>,
}

impl Page {
    /// (records to skip, records to take)
    fn window(&self) -> (usize, usize) {
        let start = self.start.unwrap_or(1).max(1) as usize - 1;
        let limit = self.limit.unwrap_or(DEFAULT_PAGE_SIZE).clamp(1, MAX_PAGE_SIZE) as usize;
        (start, limit)
    }
}

/// Filter/sort/page query for list-style operations
#[derive(Debug, Clone, Default, Deserialize, Serialize, ToSchema)]
pub struct SearchQuery {
    #[serde(default)]
    pub filter: Vec<Filter>,

    pub sort: Option<Sort>,

    pub page: Option<Page>,
}

impl SearchQuery {
    /// Evaluate the query against `docs`. Returns the selected indices in
    /// result order and the filtered-set size before pagination.
    pub fn select(&self, docs: &[Value]) -> (Vec<usize>, i64) {
        let mut selected: Vec<usize> = docs
            .iter()
            .enumerate()
            .filter(|(_, doc)| self.filter.iter().all(|f| f.matches(doc)))
            .map(|(i, _)| i)
            .collect();

        let total = selected.len() as i64;

        if let Some(sort) = &self.sort {
            selected.sort_by(|&a, &b| cmp_by_key(&docs[a], &docs[b], &sort.key, sort.desc));
        }

        if let Some(page) = &self.page {
            let (skip, take) = page.window();
            selected = selected.into_iter().skip(skip).take(take).collect();
        }

        (selected, total)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum StatOperator {
    Count,
    Sum,
    Average,
    Max,
    Min,
}

/// Grouping key for a stat query. `name` renames the key in result rows.
#[derive(Debug, Clone, Deserialize, Serialize, ToSchema)]
pub struct GroupKey {
    pub key: String,
    pub name: Option<String>,
}

/// Aggregated output field. Every operator except `count` requires `key`.
#[derive(Debug, Clone, Deserialize, Serialize, ToSchema)]
pub struct StatField {
    pub key: Option<String>,
    pub name: String,
    pub operator: StatOperator,
}

/// Aggregation query for stat-style operations. Exactly one of `distinct`
/// or `group_by`/`fields` must be used; the result row shape is determined
/// by the query itself.
#[derive(Debug, Clone, Default, Deserialize, Serialize, ToSchema)]
pub struct StatQuery {
    pub distinct: Option<String>,

    #[serde(default)]
    pub filter: Vec<Filter>,

    #[serde(default)]
    pub group_by: Vec<GroupKey>,

    #[serde(default)]
    pub fields: Vec<StatField>,

    pub sort: Option<Sort>,

    pub page: Option<Page>,
}

impl StatQuery {
    /// Evaluate the aggregation against `docs`. Returns a generic
    /// `{"results": [...], "total_count": n}` document; `total_count` is the
    /// row count before pagination.
    pub fn execute(&self, docs: &[Value]) -> Result<Value> {
        let filtered: Vec<&Value> = docs
            .iter()
            .filter(|doc| self.filter.iter().all(|f| f.matches(doc)))
            .collect();

        let mut rows = if let Some(path) = &self.distinct {
            if !self.group_by.is_empty() || !self.fields.is_empty() {
                return Err(AppError::Validation(
                    "distinct cannot be combined with group_by or fields".to_string(),
                ));
            }
            distinct_values(&filtered, path)
        } else {
            if self.group_by.is_empty() && self.fields.is_empty() {
                return Err(AppError::Validation(
                    "stat query requires distinct, group_by, or fields".to_string(),
                ));
            }
            for field in &self.fields {
                if field.operator != StatOperator::Count && field.key.is_none() {
                    return Err(AppError::Validation(format!(
                        "stat field '{}' requires a key for its operator",
                        field.name
                    )));
                }
            }
            self.grouped_rows(&filtered)
        };

        let total = rows.len() as i64;

        if let Some(sort) = &self.sort {
            rows.sort_by(|a, b| cmp_by_key(a, b, &sort.key, sort.desc));
        }

        if let Some(page) = &self.page {
            let (skip, take) = page.window();
            rows = rows.into_iter().skip(skip).take(take).collect();
        }

        Ok(json!({ "results": rows, "total_count": total }))
    }

    fn grouped_rows(&self, docs: &[&Value]) -> Vec<Value> {
        if self.group_by.is_empty() {
            // Global aggregation: a single row even over an empty set
            let mut row = Map::new();
            for field in &self.fields {
                row.insert(field.name.clone(), aggregate(field, docs));
            }
            return vec![Value::Object(row)];
        }

        // BTreeMap keyed on the serialized key tuple keeps group order
        // deterministic.
        let mut groups: BTreeMap<String, (Vec<Value>, Vec<&Value>)> = BTreeMap::new();
        for doc in docs {
            let keys: Vec<Value> = self
                .group_by
                .iter()
                .map(|g| lookup(doc, &g.key).cloned().unwrap_or(Value::Null))
                .collect();
            let map_key = serde_json::to_string(&keys).unwrap_or_default();
            groups
                .entry(map_key)
                .or_insert_with(|| (keys, Vec::new()))
                .1
                .push(*doc);
        }

        groups
            .into_values()
            .map(|(keys, members)| {
                let mut row = Map::new();
                for (group, key_value) in self.group_by.iter().zip(keys) {
                    let name = group.name.clone().unwrap_or_else(|| group.key.clone());
                    row.insert(name, key_value);
                }
                for field in &self.fields {
                    row.insert(field.name.clone(), aggregate(field, &members));
                }
                Value::Object(row)
            })
            .collect()
    }
}

/// Resolve a dot-path inside a document
pub fn lookup<'a>(doc: &'a Value, path: &str) -> Option<&'a Value> {
    let mut current = doc;
    for segment in path.split('.') {
        current = current.as_object()?.get(segment)?;
    }
    Some(current)
}

fn values_equal(a: &Value, b: &Value) -> bool {
    match (a.as_f64(), b.as_f64()) {
        (Some(x), Some(y)) => x == y,
        _ => a == b,
    }
}

fn compare(a: &Value, b: &Value) -> Option<Ordering> {
    match (a, b) {
        (Value::String(x), Value::String(y)) => Some(x.cmp(y)),
        (Value::Bool(x), Value::Bool(y)) => Some(x.cmp(y)),
        _ => match (a.as_f64(), b.as_f64()) {
            (Some(x), Some(y)) => x.partial_cmp(&y),
            _ => None,
        },
    }
}

/// Comparator for sorting: present values first, incomparable pairs keep
/// their relative order (stable sort).
fn cmp_by_key(a: &Value, b: &Value, key: &str, desc: bool) -> Ordering {
    let ordering = match (lookup(a, key), lookup(b, key)) {
        (Some(x), Some(y)) => compare(x, y).unwrap_or(Ordering::Equal),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    };
    if desc {
        ordering.reverse()
    } else {
        ordering
    }
}

fn distinct_values(docs: &[&Value], path: &str) -> Vec<Value> {
    let mut seen = HashSet::new();
    let mut out = Vec::new();
    for doc in docs {
        if let Some(value) = lookup(doc, path) {
            if !value.is_null() && seen.insert(value.to_string()) {
                out.push(value.clone());
            }
        }
    }
    out
}

fn aggregate(field: &StatField, members: &[&Value]) -> Value {
    if field.operator == StatOperator::Count {
        return json!(members.len());
    }

    // Key presence validated by the caller; non-numeric values are skipped.
    let key = field.key.as_deref().unwrap_or_default();
    let numbers: Vec<f64> = members
        .iter()
        .filter_map(|doc| lookup(doc, key))
        .filter_map(|value| value.as_f64())
        .collect();

    match field.operator {
        StatOperator::Sum => json!(numbers.iter().sum::<f64>()),
        StatOperator::Average => {
            if numbers.is_empty() {
                Value::Null
            } else {
                json!(numbers.iter().sum::<f64>() / numbers.len() as f64)
            }
        }
        StatOperator::Max => numbers
            .iter()
            .copied()
            .fold(None, |acc: Option<f64>, x| Some(acc.map_or(x, |a| a.max(x))))
            .map_or(Value::Null, |v| json!(v)),
        StatOperator::Min => numbers
            .iter()
            .copied()
            .fold(None, |acc: Option<f64>, x| Some(acc.map_or(x, |a| a.min(x))))
            .map_or(Value::Null, |v| json!(v)),
        StatOperator::Count => unreachable!(),
    }
}
