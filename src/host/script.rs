//! Page-side functions evaluated against `window.client`.
//!
//! Arguments travel as one JSON object. The agent revives `$bigint` and
//! `$undefined` markers before invoking the function, and tags `BigInt`
//! results the same way on the way back.

use serde_json::{Value, json};

/// Calls `window.client[method](...args)`.
pub const CALL_CLIENT: &str = "async ({ method, args }) => window.client[method](...args)";

/// Reads the capacity for a search key together with the tip it was read at.
pub const CELLS_CAPACITY: &str = "async ({ searchKey }) => {
  const [capacity, tip] = await Promise.all([
    window.client.getCellsCapacity(searchKey),
    window.client.getTipHeader(),
  ]);
  return { capacity, blockHash: tip.hash, blockNumber: tip.number };
}";

/// Builds the argument object for [`CALL_CLIENT`].
#[must_use]
pub fn client_call(method: &str, args: Vec<Value>) -> Value {
    json!({ "method": method, "args": args })
}

/// Builds the argument object for [`CELLS_CAPACITY`].
#[must_use]
pub fn cells_capacity(search_key: Value) -> Value {
    json!({ "searchKey": search_key })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_call_shape() {
        let args = client_call("getHeader", vec![json!("0x00")]);
        assert_eq!(args, json!({"method": "getHeader", "args": ["0x00"]}));
    }

    #[test]
    fn test_scripts_reference_client() {
        assert!(CALL_CLIENT.contains("window.client[method]"));
        assert!(CELLS_CAPACITY.contains("getCellsCapacity"));
        assert_eq!(
            cells_capacity(json!({})),
            json!({"searchKey": {}})
        );
    }
}
