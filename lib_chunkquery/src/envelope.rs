//! # MSQL Page Envelope
//!
//! The endpoint wraps every page in a nested structure:
//!
//! ```text
//! body.ExecuteMSQLResult.Errors
//! body.ExecuteMSQLResult.ResultValue.ObjectSearchResult.Objects.MemberSuiteObject[]
//! ```
//!
//! `PageEnvelope::decode` walks that structure exactly once, at the fetch
//! boundary, and turns it into a tagged `Success` / `Failure`. A response that
//! cannot be navigated to the result set is a `Failure`, same as an explicit
//! endpoint error.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

const BODY: &str = "body";
const RESULT: &str = "ExecuteMSQLResult";
const ERRORS: &str = "Errors";
const RESULT_VALUE: &str = "ResultValue";
const SEARCH_RESULT: &str = "ObjectSearchResult";
const OBJECTS: &str = "Objects";
const OBJECT: &str = "MemberSuiteObject";
const FIELDS: &str = "Fields";
const KEY_VALUES: &str = "KeyValueOfstringanyType";

/// One record as returned by the endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RawRow(Value);

impl RawRow {
    /// Wraps a raw JSON value.
    pub fn new(value: Value) -> Self {
        Self(value)
    }

    /// The raw JSON value.
    pub fn as_value(&self) -> &Value {
        &self.0
    }

    /// Consumes the row, returning the raw JSON value.
    pub fn into_value(self) -> Value {
        self.0
    }

    /// Looks up a field by name.
    ///
    /// MemberSuite objects carry their fields as
    /// `Fields.KeyValueOfstringanyType[{Key, Value}]`; plain objects are
    /// looked up directly.
    pub fn field(&self, name: &str) -> Option<&Value> {
        if let Some(pairs) = self.0.get(FIELDS).and_then(|f| f.get(KEY_VALUES)) {
            return match pairs {
                Value::Array(items) => items.iter().find_map(|pair| key_value(pair, name)),
                single => key_value(single, name),
            };
        }
        self.0.get(name)
    }
}

fn key_value<'a>(pair: &'a Value, name: &str) -> Option<&'a Value> {
    match pair.get("Key") {
        Some(Value::String(key)) if key == name => pair.get("Value"),
        _ => None,
    }
}

impl From<Value> for RawRow {
    fn from(value: Value) -> Self {
        Self(value)
    }
}

/// Decoded outcome of one page request.
#[derive(Debug, Clone, PartialEq)]
pub enum PageEnvelope {
    /// The page was returned; `rows` may be empty.
    Success {
        /// Rows in server order.
        rows: Vec<RawRow>,
    },
    /// The endpoint reported an error, or the response was malformed.
    Failure {
        /// Raw envelope content, kept for diagnosis.
        detail: Value,
    },
}

impl PageEnvelope {
    /// Decodes a raw endpoint response.
    pub fn decode(mut raw: Value) -> Self {
        let result = match raw.get_mut(BODY).and_then(|body| body.get_mut(RESULT)) {
            Some(Value::Object(result)) => std::mem::take(result),
            _ => return Self::Failure { detail: raw },
        };

        if result.get(ERRORS).is_some_and(|errors| !is_empty(errors)) {
            return Self::Failure {
                detail: Value::Object(result),
            };
        }

        let objects = match result
            .get(RESULT_VALUE)
            .and_then(|value| value.get(SEARCH_RESULT))
        {
            Some(Value::Object(search)) => search.get(OBJECTS),
            _ => {
                return Self::Failure {
                    detail: Value::Object(result),
                };
            }
        };

        match extract_rows(objects) {
            Some(rows) => Self::Success { rows },
            None => Self::Failure {
                detail: Value::Object(result),
            },
        }
    }

    /// Returns `true` for the `Success` variant.
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success { .. })
    }
}

/// Rows under `Objects`, or `None` if the structure is not a result set.
fn extract_rows(objects: Option<&Value>) -> Option<Vec<RawRow>> {
    let objects = match objects {
        None | Some(Value::Null) => return Some(Vec::new()),
        Some(Value::Object(map)) if map.is_empty() => return Some(Vec::new()),
        Some(Value::Object(map)) => map,
        Some(_) => return None,
    };
    match objects.get(OBJECT) {
        None | Some(Value::Null) => Some(Vec::new()),
        Some(Value::Array(items)) => Some(items.iter().cloned().map(RawRow).collect()),
        Some(single @ Value::Object(_)) => Some(vec![RawRow(single.clone())]),
        Some(_) => None,
    }
}

/// `Errors` counts as empty when it holds nothing but falsy scalars or empty
/// containers.
fn is_empty(errors: &Value) -> bool {
    match errors {
        Value::Null => true,
        Value::Bool(flag) => !flag,
        Value::Number(n) => n.as_f64() == Some(0.0),
        Value::String(s) => s.is_empty(),
        Value::Array(items) => items.is_empty(),
        Value::Object(map) => all_empty(map),
    }
}

fn all_empty(map: &Map<String, Value>) -> bool {
    map.values().all(is_empty)
}
