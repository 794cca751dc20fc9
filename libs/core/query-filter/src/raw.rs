//! Raw, untyped query parameters as they arrive from the client.
//!
//! Values are kept as strings. A key written with bracket syntax
//! (`price[gte]=500`) becomes a nested map, a key repeated in the query
//! string (`category=hoodies&category=sweatshirt`) becomes a list.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use url::form_urlencoded;

use crate::error::{TranslationError, TranslationResult};

/// A single value in a [`RawQuery`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum QueryValue {
    Text(String),
    List(Vec<String>),
    Nested(BTreeMap<String, QueryValue>),
}

impl QueryValue {
    /// Build a nested value from `(operator, operand)` pairs.
    pub fn nested<K, V>(entries: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<QueryValue>,
    {
        Self::Nested(
            entries
                .into_iter()
                .map(|(key, value)| (key.into(), value.into()))
                .collect(),
        )
    }

    /// The scalar text of this value.
    ///
    /// A list yields its first element; a nested map has no scalar text.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(text) => Some(text),
            Self::List(items) => items.first().map(String::as_str),
            Self::Nested(_) => None,
        }
    }

    pub fn is_nested(&self) -> bool {
        matches!(self, Self::Nested(_))
    }
}

impl From<&str> for QueryValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for QueryValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<Vec<String>> for QueryValue {
    fn from(value: Vec<String>) -> Self {
        Self::List(value)
    }
}

impl From<Vec<&str>> for QueryValue {
    fn from(value: Vec<&str>) -> Self {
        Self::List(value.into_iter().map(str::to_string).collect())
    }
}

/// Client-supplied query parameters, keyed by field name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RawQuery(BTreeMap<String, QueryValue>);

impl RawQuery {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert, handy when assembling a query in code.
    pub fn with(mut self, key: impl Into<String>, value: impl Into<QueryValue>) -> Self {
        self.0.insert(key.into(), value.into());
        self
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<QueryValue>) -> Option<QueryValue> {
        self.0.insert(key.into(), value.into())
    }

    pub fn get(&self, key: &str) -> Option<&QueryValue> {
        self.0.get(key)
    }

    /// Scalar text stored under `key`, if any.
    pub fn text(&self, key: &str) -> Option<&str> {
        self.get(key).and_then(QueryValue::as_text)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &QueryValue)> {
        self.0.iter().map(|(key, value)| (key.as_str(), value))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Parse a URL query string (without the leading `?`).
    ///
    /// ```
    /// use query_filter::{QueryValue, RawQuery};
    ///
    /// let raw = RawQuery::parse("search=shirt&price[gte]=500").unwrap();
    /// assert_eq!(raw.text("search"), Some("shirt"));
    /// assert_eq!(
    ///     raw.get("price"),
    ///     Some(&QueryValue::nested([("gte", "500")]))
    /// );
    /// ```
    pub fn parse(query: &str) -> TranslationResult<Self> {
        let mut raw = Self::new();
        for (key, value) in form_urlencoded::parse(query.as_bytes()) {
            if key.is_empty() && value.is_empty() {
                continue;
            }
            let path = split_key(&key)?;
            insert_path(&mut raw.0, &path[0], &path, value.into_owned())?;
        }
        Ok(raw)
    }

    /// Build a query from a JSON object, e.g. a request body.
    ///
    /// Numbers and booleans are stringified; objects become nested values.
    pub fn from_json(value: &Value) -> TranslationResult<Self> {
        let Value::Object(entries) = value else {
            return Err(TranslationError::MalformedQuery(
                "query must be a JSON object".to_string(),
            ));
        };
        let mut raw = Self::new();
        for (key, value) in entries {
            if key.is_empty() {
                return Err(TranslationError::EmptyFieldName);
            }
            raw.0.insert(key.clone(), json_value(key, value)?);
        }
        Ok(raw)
    }
}

impl<K, V> FromIterator<(K, V)> for RawQuery
where
    K: Into<String>,
    V: Into<QueryValue>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .map(|(key, value)| (key.into(), value.into()))
                .collect(),
        )
    }
}

/// Split `price[gte]` into `["price", "gte"]`.
fn split_key(key: &str) -> TranslationResult<Vec<String>> {
    let Some(open) = key.find('[') else {
        return Ok(vec![key.to_string()]);
    };
    let field = &key[..open];
    if field.is_empty() {
        return Err(TranslationError::EmptyFieldName);
    }

    let mut path = vec![field.to_string()];
    let mut rest = &key[open..];
    while !rest.is_empty() {
        let Some(inner) = rest.strip_prefix('[') else {
            return Err(TranslationError::MalformedQuery(format!(
                "unexpected text after `]` in `{key}`"
            )));
        };
        let Some(close) = inner.find(']') else {
            return Err(TranslationError::MalformedQuery(format!(
                "unterminated bracket in `{key}`"
            )));
        };
        let segment = &inner[..close];
        if segment.is_empty() {
            return Err(TranslationError::MalformedQuery(format!(
                "empty bracket in `{key}`"
            )));
        }
        path.push(segment.to_string());
        rest = &inner[close + 1..];
    }
    Ok(path)
}

fn insert_path(
    map: &mut BTreeMap<String, QueryValue>,
    field: &str,
    path: &[String],
    value: String,
) -> TranslationResult<()> {
    let conflict = || TranslationError::ConflictingClause {
        field: field.to_string(),
    };

    let (key, rest) = match path {
        [key, rest @ ..] => (key, rest),
        [] => return Err(TranslationError::EmptyFieldName),
    };

    if rest.is_empty() {
        match map.remove(key) {
            None => {
                map.insert(key.clone(), QueryValue::Text(value));
            }
            Some(QueryValue::Text(previous)) => {
                map.insert(key.clone(), QueryValue::List(vec![previous, value]));
            }
            Some(QueryValue::List(mut items)) => {
                items.push(value);
                map.insert(key.clone(), QueryValue::List(items));
            }
            Some(QueryValue::Nested(_)) => return Err(conflict()),
        }
        return Ok(());
    }

    let entry = map
        .entry(key.clone())
        .or_insert_with(|| QueryValue::Nested(BTreeMap::new()));
    match entry {
        QueryValue::Nested(inner) => insert_path(inner, field, rest, value),
        QueryValue::Text(_) | QueryValue::List(_) => Err(conflict()),
    }
}

fn json_value(field: &str, value: &Value) -> TranslationResult<QueryValue> {
    match value {
        Value::Array(items) => items
            .iter()
            .map(|item| json_scalar(field, item))
            .collect::<TranslationResult<Vec<_>>>()
            .map(QueryValue::List),
        Value::Object(entries) => entries
            .iter()
            .map(|(key, value)| {
                if key.is_empty() {
                    return Err(TranslationError::MalformedQuery(format!(
                        "empty operator key under `{field}`"
                    )));
                }
                Ok((key.clone(), json_value(field, value)?))
            })
            .collect::<TranslationResult<BTreeMap<_, _>>>()
            .map(QueryValue::Nested),
        scalar => json_scalar(field, scalar).map(QueryValue::Text),
    }
}

fn json_scalar(field: &str, value: &Value) -> TranslationResult<String> {
    match value {
        Value::String(text) => Ok(text.clone()),
        Value::Number(number) => Ok(number.to_string()),
        Value::Bool(flag) => Ok(flag.to_string()),
        Value::Null | Value::Array(_) | Value::Object(_) => Err(TranslationError::MalformedQuery(
            format!("unsupported value for `{field}`"),
        )),
    }
}

#[cfg(feature = "axum")]
mod axum_integration {
    use super::*;
    use axum::{extract::FromRequestParts, http::request::Parts};
    use axum_helpers::AppError;

    /// Extracts a [`RawQuery`] from the request URI.
    ///
    /// Unlike `axum::extract::Query`, bracketed keys are kept as nested
    /// values instead of being rejected.
    impl<S> FromRequestParts<S> for RawQuery
    where
        S: Send + Sync,
    {
        type Rejection = AppError;

        async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
            let query = parts.uri.query().unwrap_or_default();
            RawQuery::parse(query).map_err(|e| AppError::InvalidQuery(e.to_string()))
        }
    }
}
