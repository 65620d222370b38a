//! Wire envelopes for the rdish display protocol.
//!
//! The transport carries one JSON envelope per message with at most one call
//! in flight, so requests and replies are matched purely by ordering: a call
//! is answered before the next one is read. This crate only defines the
//! envelope shapes and status codes; the display semantics live in
//! `rdish-display`.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// The only api namespace currently recognized.
pub const API_DISPLAY: &str = "display";

/// The call completed.
pub const STATUS_OK: i64 = 0;
/// The call failed; `status_msg` explains.
pub const STATUS_ERROR: i64 = 1;
/// The call never reached an operation (unknown api or unknown function).
pub const STATUS_BAD_ROUTE: i64 = 99;

/// Inbound envelope: `{ "api": ..., "msg": { "func", "args", "kwargs" } }`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CallEnvelope {
    pub api: String,
    pub msg: CallMsg,
}

/// One decoded remote call. `args` is positional, `kwargs` is by name;
/// callers may omit either.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CallMsg {
    pub func: String,
    #[serde(default)]
    pub args: Vec<Value>,
    #[serde(default)]
    pub kwargs: Map<String, Value>,
}

/// Outbound envelope: `{ "type": "display", "response": { ... } }`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReplyEnvelope {
    #[serde(rename = "type")]
    pub api: String,
    pub response: Reply,
}

/// The uniform reply shape every operation resolves to. `func` always echoes
/// the name from the request so the caller can sanity-check pairing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Reply {
    pub func: String,
    pub status: i64,
    pub status_msg: String,
    #[serde(default)]
    pub data: Map<String, Value>,
}

impl Reply {
    pub fn ok(func: &str, data: Map<String, Value>) -> Self {
        Self {
            func: func.to_owned(),
            status: STATUS_OK,
            status_msg: "success".to_owned(),
            data,
        }
    }

    pub fn ok_empty(func: &str) -> Self {
        Self::ok(func, Map::new())
    }

    pub fn error(func: &str, status_msg: impl Into<String>) -> Self {
        Self {
            func: func.to_owned(),
            status: STATUS_ERROR,
            status_msg: status_msg.into(),
            data: Map::new(),
        }
    }

    /// Routing failure for a function name outside the fixed dispatch set.
    pub fn unknown_function(func: &str) -> Self {
        Self {
            func: func.to_owned(),
            status: STATUS_BAD_ROUTE,
            status_msg: format!("Unknown Display API Function ({func}) called"),
            data: Map::new(),
        }
    }

    /// Routing failure for an envelope addressed to an unrecognized api.
    pub fn unexpected_api(func: &str, api: &str) -> Self {
        Self {
            func: func.to_owned(),
            status: STATUS_BAD_ROUTE,
            status_msg: format!("Unexpected api ({api})"),
            data: Map::new(),
        }
    }

    pub fn is_ok(&self) -> bool {
        self.status == STATUS_OK
    }

    pub fn into_envelope(self) -> ReplyEnvelope {
        ReplyEnvelope {
            api: API_DISPLAY.to_owned(),
            response: self,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn call_envelope_args_and_kwargs_default_to_empty() {
        let envelope: CallEnvelope =
            serde_json::from_value(json!({"api": "display", "msg": {"func": "clear"}})).unwrap();
        assert_eq!(envelope.api, "display");
        assert_eq!(envelope.msg.func, "clear");
        assert!(envelope.msg.args.is_empty());
        assert!(envelope.msg.kwargs.is_empty());
    }

    #[test]
    fn reply_envelope_wire_shape() {
        let mut data = Map::new();
        data.insert("id".to_owned(), json!(3));
        let envelope = Reply::ok("create_buffer", data).into_envelope();
        assert_eq!(
            serde_json::to_value(&envelope).unwrap(),
            json!({
                "type": "display",
                "response": {
                    "func": "create_buffer",
                    "status": 0,
                    "status_msg": "success",
                    "data": {"id": 3},
                }
            })
        );
    }

    #[test]
    fn unknown_function_message_echoes_the_name() {
        let reply = Reply::unknown_function("foo");
        assert_eq!(reply.status, STATUS_BAD_ROUTE);
        assert_eq!(reply.status_msg, "Unknown Display API Function (foo) called");
        assert_eq!(reply.func, "foo");
        assert!(reply.data.is_empty());
    }

    #[test]
    fn unexpected_api_message_echoes_the_namespace() {
        let reply = Reply::unexpected_api("x", "bogus");
        assert_eq!(reply.status, STATUS_BAD_ROUTE);
        assert_eq!(reply.status_msg, "Unexpected api (bogus)");
    }
}
