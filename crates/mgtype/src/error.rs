//! Structured errors reported by type construction and validation.
//!
//! Every error carries the data needed to render both a stable machine code
//! (used by callers to key diagnostics) and a human-readable message. Codes
//! are colon-separated, e.g. `param_bounds:entry:T:-int:real`.

use serde::Serialize;
use std::fmt;

/// Error produced when a type or function header fails validation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum TypeError {
    /// A type argument does not satisfy the declared bounds of a type
    /// parameter.
    ParamBounds {
        /// Name of the generic type definition.
        type_name: String,
        /// Name of the violated type parameter.
        param: String,
        /// Rendered bounds of the parameter, e.g. `-int`.
        bound: String,
        /// Rendered offending type argument.
        arg: String,
    },
    /// Wrong number of type arguments for a generic type definition.
    ArgCount {
        type_name: String,
        expected: usize,
        actual: usize,
    },
    /// A name used in a type description is not defined in the scope.
    UnknownType { name: String },
}

impl TypeError {
    /// Stable machine-readable code for this error.
    pub fn code(&self) -> String {
        match self {
            TypeError::ParamBounds { type_name, param, bound, arg } => {
                format!("param_bounds:{type_name}:{param}:{bound}:{arg}")
            }
            TypeError::ArgCount { type_name, expected, actual } => {
                format!("arg_count:{type_name}:{expected}:{actual}")
            }
            TypeError::UnknownType { name } => format!("unknown_type:{name}"),
        }
    }
}

impl fmt::Display for TypeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypeError::ParamBounds { type_name, param, arg, .. } => {
                write!(
                    f,
                    "type parameter '{param}' of type '{type_name}' does not allow '{arg}'"
                )
            }
            TypeError::ArgCount { type_name, expected, actual } => {
                write!(
                    f,
                    "wrong number of type arguments for '{type_name}': {actual} instead of {expected}"
                )
            }
            TypeError::UnknownType { name } => write!(f, "unknown type '{name}'"),
        }
    }
}

impl std::error::Error for TypeError {}
