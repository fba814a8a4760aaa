//! Positional parameter parsing.
//!
//! Optional trailing parameters may be omitted or given as `null`; both
//! read as `None`.

use serde::de::DeserializeOwned;
use serde_json::Value;

use super::error::RpcError;

/// Positional parameters of one call.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Params {
    values: Vec<Value>,
}

impl Params {
    /// Accepts an array, or nothing at all.
    ///
    /// # Errors
    ///
    /// Returns [`RpcError::InvalidParams`] for named (object) parameters or
    /// any other non-array value.
    pub fn parse(params: Value) -> Result<Self, RpcError> {
        match params {
            Value::Null => Ok(Self::default()),
            Value::Array(values) => Ok(Self { values }),
            Value::Object(_) => Err(RpcError::invalid_params(
                "expected positional parameters",
            )),
            _ => Err(RpcError::invalid_params("expected an array of parameters")),
        }
    }

    /// Parses `params` and rejects more than `max` entries.
    ///
    /// # Errors
    ///
    /// See [`parse`](Self::parse); also fails on excess parameters.
    pub fn at_most(params: Value, max: usize) -> Result<Self, RpcError> {
        let params = Self::parse(params)?;
        if params.values.len() > max {
            return Err(RpcError::invalid_params(format!(
                "expected at most {max} parameters, got {}",
                params.values.len()
            )));
        }
        Ok(params)
    }

    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Reads the parameter at `index`.
    ///
    /// # Errors
    ///
    /// Fails if it is missing, `null`, or does not deserialize; the message
    /// names the parameter.
    pub fn required<T: DeserializeOwned>(&self, index: usize, name: &str) -> Result<T, RpcError> {
        self.optional(index, name)?
            .ok_or_else(|| RpcError::invalid_params(format!("missing parameter {name}")))
    }

    /// Reads the parameter at `index`, if present and not `null`.
    ///
    /// # Errors
    ///
    /// Fails if it does not deserialize; the message names the parameter.
    pub fn optional<T: DeserializeOwned>(
        &self,
        index: usize,
        name: &str,
    ) -> Result<Option<T>, RpcError> {
        match self.values.get(index) {
            None | Some(Value::Null) => Ok(None),
            Some(value) => T::deserialize(value)
                .map(Some)
                .map_err(|e| RpcError::invalid_params(format!("{name}: {e}"))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use serde_json::json;

    use crate::schema::wire;

    #[test]
    fn test_missing_and_null_are_none() {
        let params = Params::parse(json!([{"script": null}, null])).expect("parse");
        assert_eq!(params.optional::<String>(1, "order").expect("null"), None);
        assert_eq!(params.optional::<String>(5, "cursor").expect("missing"), None);
        assert_eq!(Params::parse(Value::Null).expect("parse").len(), 0);
    }

    #[test]
    fn test_required_missing() {
        let params = Params::parse(json!([])).expect("parse");
        let err = params.required::<String>(0, "tx_hash").unwrap_err();
        assert_eq!(err.to_string(), "Invalid params: missing parameter tx_hash");
        assert_eq!(err.code(), -32602);
    }

    #[test]
    fn test_bad_enum_names_parameter() {
        let params = Params::parse(json!(["ascending"])).expect("parse");
        let err = params.optional::<wire::Order>(0, "order").unwrap_err();
        assert!(err.to_string().starts_with("Invalid params: order:"));
    }

    #[test]
    fn test_named_params_rejected() {
        let err = Params::parse(json!({"tx_hash": "0x00"})).unwrap_err();
        assert_eq!(err.code(), -32602);
    }

    #[test]
    fn test_at_most() {
        assert!(Params::at_most(json!([1, 2]), 2).is_ok());
        let err = Params::at_most(json!([1, 2, 3]), 2).unwrap_err();
        assert!(err.to_string().contains("at most 2"));
    }
}
