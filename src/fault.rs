//! Structured handler failures and their wire normalization
//!
//! Handlers fail with a [`Rejection`]: either a structured [`Fault`] carrying
//! a name, message, optional trace, and optional cause, or an arbitrary JSON
//! value. [`describe`] turns a rejection into the wire value callers receive
//! on a 500 response.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Upper bound on normalized cause-chain depth; anything deeper renders as null
pub const MAX_CAUSE_DEPTH: usize = 32;

/// A structured failure raised by a handler
#[derive(Debug, Clone)]
pub struct Fault {
    /// Classifying name, typically the error type
    pub name: String,

    /// Human-readable description
    pub message: String,

    /// Raw multi-line trace, if one was captured
    ///
    /// The first line is expected to repeat the name and message and is
    /// dropped during normalization.
    pub stack: Option<String>,

    /// What this fault was caused by, if anything
    pub cause: Option<Rejection>,
}

/// Any value a handler can fail with
#[derive(Debug, Clone)]
pub enum Rejection {
    /// Structured fault with an optional cause chain
    Fault(Box<Fault>),

    /// Arbitrary value; passes through normalization unchanged
    Value(Value),
}

impl Fault {
    /// Create a fault with no trace and no cause
    pub fn new(name: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            message: message.into(),
            stack: None,
            cause: None,
        }
    }

    /// Attach a raw multi-line trace
    pub fn with_stack(mut self, stack: impl Into<String>) -> Self {
        self.stack = Some(stack.into());
        self
    }

    /// Attach the rejection that caused this fault
    pub fn caused_by(mut self, cause: impl Into<Rejection>) -> Self {
        self.cause = Some(cause.into());
        self
    }

    /// Build a fault from a standard error, mirroring its `source()` chain
    /// as the cause chain
    pub fn from_error<E>(error: &E) -> Self
    where
        E: std::error::Error + ?Sized,
    {
        let mut fault = Self::new(short_type_name::<E>(), error.to_string());
        if let Some(source) = error.source() {
            fault.cause = Some(Rejection::Fault(Box::new(Self::from_source(source))));
        }
        fault
    }

    fn from_source(error: &(dyn std::error::Error + 'static)) -> Self {
        // concrete type names are gone behind `dyn` at this point
        let mut fault = Self::new("Error", error.to_string());
        if let Some(source) = error.source() {
            fault.cause = Some(Rejection::Fault(Box::new(Self::from_source(source))));
        }
        fault
    }
}

fn short_type_name<E: ?Sized>() -> &'static str {
    let full = std::any::type_name::<E>();
    full.rsplit("::").next().unwrap_or(full)
}

impl From<Fault> for Rejection {
    fn from(fault: Fault) -> Self {
        Rejection::Fault(Box::new(fault))
    }
}

impl From<Value> for Rejection {
    fn from(value: Value) -> Self {
        Rejection::Value(value)
    }
}

impl From<&str> for Rejection {
    fn from(message: &str) -> Self {
        Rejection::Value(Value::String(message.to_string()))
    }
}

impl From<String> for Rejection {
    fn from(message: String) -> Self {
        Rejection::Value(Value::String(message))
    }
}

/// Wire shape of a normalized fault
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FaultReport {
    /// Classifying name of the fault
    pub name: String,

    /// Human-readable description
    pub message: String,

    /// Trace lines with the leading name+message line dropped
    #[serde(default)]
    pub stack_lines: Vec<String>,

    /// Normalized cause: another report, a passed-through value, or null
    #[serde(default)]
    pub cause: Value,
}

impl From<FaultReport> for Value {
    fn from(report: FaultReport) -> Self {
        serde_json::json!({
            "name": report.name,
            "message": report.message,
            "stackLines": report.stack_lines,
            "cause": report.cause,
        })
    }
}

/// Normalize a rejection into its wire value
///
/// Faults become [`FaultReport`] objects with recursively normalized causes;
/// arbitrary values pass through unchanged. An absent cause renders as
/// `null`, and the `cause` field is present at every level. Chains deeper
/// than [`MAX_CAUSE_DEPTH`] are cut off at `null`.
pub fn describe(rejection: &Rejection) -> Value {
    describe_at(rejection, 0)
}

fn describe_at(rejection: &Rejection, depth: usize) -> Value {
    let fault = match rejection {
        Rejection::Value(value) => return value.clone(),
        Rejection::Fault(fault) => fault,
    };
    if depth >= MAX_CAUSE_DEPTH {
        return Value::Null;
    }
    FaultReport {
        name: fault.name.clone(),
        message: fault.message.clone(),
        stack_lines: stack_lines(fault.stack.as_deref()),
        cause: match &fault.cause {
            Some(cause) => describe_at(cause, depth + 1),
            None => Value::Null,
        },
    }
    .into()
}

fn stack_lines(stack: Option<&str>) -> Vec<String> {
    match stack {
        Some(stack) => stack.lines().skip(1).map(str::to_string).collect(),
        None => Vec::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_describe_fault_without_cause() {
        let rejection = Rejection::from(Fault::new("Error", "expected"));

        assert_eq!(
            describe(&rejection),
            json!({
                "name": "Error",
                "message": "expected",
                "stackLines": [],
                "cause": null,
            })
        );
    }

    #[test]
    fn test_describe_drops_first_stack_line() {
        let fault = Fault::new("Error", "boom")
            .with_stack("Error: boom\n  at handler (app.rs:10)\n  at dispatch (lib.rs:42)");

        let described = describe(&fault.into());
        assert_eq!(
            described["stackLines"],
            json!(["  at handler (app.rs:10)", "  at dispatch (lib.rs:42)"])
        );
    }

    #[test]
    fn test_describe_single_line_stack_yields_no_lines() {
        let fault = Fault::new("Error", "boom").with_stack("Error: boom");

        assert_eq!(describe(&fault.into())["stackLines"], json!([]));
    }

    #[test]
    fn test_describe_two_level_cause_chain() {
        let root = Fault::new("IoError", "connection reset");
        let outer = Fault::new("Error", "request failed").caused_by(root);

        let described = describe(&outer.into());
        assert_eq!(described["message"], "request failed");
        assert_eq!(described["cause"]["name"], "IoError");
        assert_eq!(described["cause"]["message"], "connection reset");
        // chain terminates in an explicit null, not a missing field
        assert_eq!(described["cause"]["cause"], Value::Null);
    }

    #[test]
    fn test_describe_value_cause_passes_through() {
        let fault = Fault::new("Error", "wrapper").caused_by(json!({"code": 42}));

        assert_eq!(describe(&fault.into())["cause"], json!({"code": 42}));
    }

    #[test]
    fn test_describe_bare_value_passes_through() {
        assert_eq!(describe(&Rejection::from("expected")), json!("expected"));
        assert_eq!(
            describe(&Rejection::from(json!([1, 2, 3]))),
            json!([1, 2, 3])
        );
    }

    #[test]
    fn test_describe_caps_pathological_chain_depth() {
        let chain = (0..MAX_CAUSE_DEPTH + 8).fold(Fault::new("Error", "leaf"), |inner, i| {
            Fault::new("Error", format!("level {i}")).caused_by(inner)
        });

        let described = describe(&chain.into());
        let mut depth = 0;
        let mut node = &described;
        while !node.is_null() {
            assert!(node["message"].is_string());
            node = &node["cause"];
            depth += 1;
        }
        assert_eq!(depth, MAX_CAUSE_DEPTH);
    }

    #[test]
    fn test_from_error_mirrors_source_chain() {
        #[derive(Debug, thiserror::Error)]
        #[error("config value is not a number")]
        struct ConfigError {
            #[source]
            source: std::num::ParseIntError,
        }

        let source = "123a".parse::<i32>().unwrap_err();
        let fault = Fault::from_error(&ConfigError { source });

        assert_eq!(fault.name, "ConfigError");
        assert_eq!(fault.message, "config value is not a number");

        let described = describe(&fault.into());
        assert_eq!(described["cause"]["name"], "Error");
        assert!(described["cause"]["message"]
            .as_str()
            .unwrap()
            .contains("invalid digit"));
        assert_eq!(described["cause"]["cause"], Value::Null);
    }

    #[test]
    fn test_report_deserializes_from_wire_value() {
        let fault = Fault::new("Error", "boom").with_stack("Error: boom\n  at x");
        let report: FaultReport = serde_json::from_value(describe(&fault.into())).unwrap();

        assert_eq!(report.name, "Error");
        assert_eq!(report.message, "boom");
        assert_eq!(report.stack_lines, vec!["  at x"]);
        assert_eq!(report.cause, Value::Null);
    }
}
