//! Generic Type Model
//!
//! This crate implements a generic-type engine: a structural type model with
//! declaration-site variance, bounded type parameters, wildcard type
//! arguments and type-argument inference. It provides:
//!
//! - **Types and type sets**: immutable [`Type`] values and [`TypeSet`]
//!   wildcard arguments (`-B`, `+B`, `*`)
//! - **Subtyping**: handler-driven structural walkers, so the same
//!   decomposition serves checking and inference
//! - **Join / meet**: common supertype and subtype computation, with
//!   variance-aware handling of generic arguments
//! - **Capture conversion**: wildcard arguments become identity-unique
//!   capture types, expandable back to plain types per use direction
//! - **Function matching**: arity distribution, type-argument inference and
//!   per-argument conversions for call resolution

pub mod common;
pub mod def;
pub mod error;
pub mod function;
pub mod replace;
pub mod resolve;
pub mod scope;
pub mod subtype;
pub mod type_set;
pub mod types;

pub use common::Conversion;
pub use def::{GenericDef, GenericParent, TypeParam, TypeParamMap, Variance};
pub use error::TypeError;
pub use function::{
    FunctionHeader, FunctionHeaderMatch, FunctionParam, FunctionParamsMatch, ParamArity,
};
pub use replace::TypeRep;
pub use resolve::{MatchRelation, TypeParamMatch, TypeParamsResolver};
pub use scope::{Scope, ScopeBuilder, TypeArgDecl, TypeDecl};
pub use type_set::TypeSet;
pub use types::{CaptureType, FunctionType, GenericType, TupleField, TupleType, Type, TypeArgs};
