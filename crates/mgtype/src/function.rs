//! Function headers and call matching.
//!
//! A [`FunctionHeader`] is the callable signature of a function: type
//! parameters, parameters (with arity and match modifiers) and a result
//! type. Matching a call happens in two steps: [`FunctionHeader::match_params`]
//! distributes the argument count over the declared arities, then
//! [`FunctionParamsMatch::match_args`] infers type arguments from the actual
//! argument types, specializes the header and computes per-argument
//! conversions.

use crate::common::Conversion;
use crate::def::{TypeParam, TypeParamMap};
use crate::error::TypeError;
use crate::resolve::TypeParamsResolver;
use crate::type_set::TypeSet;
use crate::types::Type;
use indexmap::IndexMap;
use std::fmt;
use std::sync::Arc;
use tracing::trace;

/// How many arguments a declared parameter consumes.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum ParamArity {
    One,
    ZeroOne,
    ZeroMany,
    OneMany,
}

impl ParamArity {
    pub fn many(self) -> bool {
        matches!(self, ParamArity::ZeroMany | ParamArity::OneMany)
    }
}

impl fmt::Display for ParamArity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ParamArity::One => "ONE",
            ParamArity::ZeroOne => "ZERO_ONE",
            ParamArity::ZeroMany => "ZERO_MANY",
            ParamArity::OneMany => "ONE_MANY",
        };
        write!(f, "{s}")
    }
}

// ===========================================================================
// Parameters
// ===========================================================================

#[derive(Clone, PartialEq, Eq, Debug)]
pub struct FunctionParam {
    pub name: Option<String>,
    pub ty: Type,
    pub arity: ParamArity,
    /// The argument type must equal the parameter type, no conversions.
    pub exact: bool,
    /// The argument type must be nullable.
    pub nullable: bool,
}

impl FunctionParam {
    pub fn new(ty: Type) -> FunctionParam {
        FunctionParam { name: None, ty, arity: ParamArity::One, exact: false, nullable: false }
    }

    pub fn named(name: impl Into<String>, ty: Type) -> FunctionParam {
        FunctionParam { name: Some(name.into()), ..FunctionParam::new(ty) }
    }

    fn replace_type_params(&self, map: &TypeParamMap) -> FunctionParam {
        let ty = self.ty.replace_params(map, true).into_type();
        FunctionParam { ty, ..self.clone() }
    }

    /// The same parameter with arity `ONE`, used for the per-argument
    /// parameter list of a matched call.
    fn to_simple(&self) -> FunctionParam {
        match self.arity {
            ParamArity::One => self.clone(),
            _ => FunctionParam { arity: ParamArity::One, ..self.clone() },
        }
    }

    pub fn validate(&self) -> Result<(), TypeError> {
        self.ty.validate()
    }
}

impl fmt::Display for FunctionParam {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.nullable {
            write!(f, "@nullable ")?;
        }
        if self.exact {
            write!(f, "@exact ")?;
        }
        if self.arity != ParamArity::One {
            write!(f, "@arity({}) ", self.arity)?;
        }
        if let Some(name) = &self.name {
            write!(f, "{name}: ")?;
        }
        write!(f, "{}", self.ty)
    }
}

// ===========================================================================
// Headers
// ===========================================================================

#[derive(Clone, PartialEq, Eq, Debug)]
pub struct FunctionHeader {
    pub type_params: Vec<Arc<TypeParam>>,
    pub result_type: Type,
    pub params: Vec<FunctionParam>,
}

impl FunctionHeader {
    /// Panics when type parameter names clash, a type parameter's bounds
    /// reference a parameter declared after it, or a fixed-arity parameter
    /// follows a variadic one.
    pub fn new(
        type_params: Vec<Arc<TypeParam>>,
        result_type: Type,
        params: Vec<FunctionParam>,
    ) -> FunctionHeader {
        let header = FunctionHeader { type_params, result_type, params };
        header.check_type_params();
        header.check_params();
        header
    }

    fn check_type_params(&self) {
        let names: Vec<&str> = self.type_params.iter().map(|p| p.name.as_str()).collect();
        let unique: rustc_hash::FxHashSet<&str> = names.iter().copied().collect();
        assert!(
            unique.len() == self.type_params.len(),
            "type parameter names are not unique: {names:?}"
        );

        // A type parameter may only depend on parameters declared before it.
        let mut later: indexmap::IndexSet<Arc<TypeParam>> = indexmap::IndexSet::new();
        for tp in self.type_params.iter().rev() {
            later.insert(tp.clone());
            let mut refs = indexmap::IndexSet::new();
            tp.bounds.collect_type_params(&mut refs);
            for r in &refs {
                assert!(
                    !later.contains(r),
                    "type parameter {} depends on a parameter declared after it: {}",
                    tp.name,
                    r.name
                );
            }
        }
    }

    fn check_params(&self) {
        let mut prev = ParamArity::One;
        for param in &self.params {
            let ok = match param.arity {
                ParamArity::One => prev == ParamArity::One,
                _ => prev == ParamArity::One || prev == ParamArity::ZeroOne,
            };
            assert!(
                ok,
                "parameter with arity {} cannot follow a parameter with arity {}",
                param.arity, prev
            );
            prev = param.arity;
        }
    }

    pub fn validate(&self) -> Result<(), TypeError> {
        for tp in &self.type_params {
            tp.bounds.validate()?;
        }
        self.result_type.validate()?;
        for param in &self.params {
            param.validate()?;
        }
        Ok(())
    }

    /// Substitutes type parameters throughout the header. Parameters of the
    /// header itself that are not substituted but whose bounds change are
    /// replaced by fresh parameters, and occurrences are redirected to them.
    pub fn replace_type_params(&self, map: &TypeParamMap) -> FunctionHeader {
        let type_params2: Vec<Arc<TypeParam>> = self
            .type_params
            .iter()
            .map(|tp| tp.replace_type_params(map))
            .collect();

        let mut full_map = map.clone();
        for (old, new) in self.type_params.iter().zip(type_params2.iter()) {
            if !Arc::ptr_eq(old, new) && !map.contains_key(old) {
                full_map.insert(old.clone(), TypeSet::One(Type::param(new.clone())));
            }
        }

        let result_type = self.result_type.replace_params_out(&full_map);
        let params: Vec<FunctionParam> =
            self.params.iter().map(|p| p.replace_type_params(&full_map)).collect();

        if type_params2 == self.type_params
            && result_type == self.result_type
            && params == self.params
        {
            self.clone()
        } else {
            FunctionHeader::new(type_params2, result_type, params)
        }
    }

    /// Specializes a member function header for a receiver type, capturing
    /// the receiver's wildcard arguments first.
    pub fn bind_receiver(&self, receiver: &Type) -> FunctionHeader {
        let captured = receiver.capture_wildcards();
        match captured.type_args_map() {
            Some(map) => self.replace_type_params(&map),
            None => self.clone(),
        }
    }

    /// Distributes `n_args` arguments over the declared parameters, greedily
    /// filling variadic ones. `None` when the count cannot fit.
    pub fn match_params(&self, n_args: usize) -> Option<FunctionParamsMatch<'_>> {
        let param_indexes = self.match_args_count(n_args)?;
        let actual_params =
            param_indexes.iter().map(|&i| self.params[i].to_simple()).collect();
        Some(FunctionParamsMatch { header: self, param_indexes, actual_params })
    }

    fn match_args_count(&self, n_args: usize) -> Option<Vec<usize>> {
        let mut res = Vec::with_capacity(n_args);
        let mut args_left = n_args;

        for (index, param) in self.params.iter().enumerate() {
            match param.arity {
                ParamArity::One => {
                    if args_left == 0 {
                        return None;
                    }
                    args_left -= 1;
                    res.push(index);
                }
                ParamArity::ZeroOne => {
                    if args_left > 0 {
                        args_left -= 1;
                        res.push(index);
                    }
                }
                ParamArity::ZeroMany => {
                    while args_left > 0 {
                        args_left -= 1;
                        res.push(index);
                    }
                }
                ParamArity::OneMany => {
                    if args_left == 0 {
                        return None;
                    }
                    while args_left > 0 {
                        args_left -= 1;
                        res.push(index);
                    }
                }
            }
        }

        if args_left > 0 {
            return None;
        }
        debug_assert_eq!(res.len(), n_args);
        Some(res)
    }
}

impl fmt::Display for FunctionHeader {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if !self.type_params.is_empty() {
            write!(f, "<")?;
            for (i, tp) in self.type_params.iter().enumerate() {
                if i > 0 {
                    write!(f, ",")?;
                }
                write!(f, "{tp}")?;
            }
            write!(f, ">")?;
        }
        write!(f, "(")?;
        for (i, p) in self.params.iter().enumerate() {
            if i > 0 {
                write!(f, ",")?;
            }
            write!(f, "{p}")?;
        }
        write!(f, "):{}", self.result_type)
    }
}

// ===========================================================================
// Call matching
// ===========================================================================

/// A successful arity match: which declared parameter consumes each argument.
pub struct FunctionParamsMatch<'a> {
    header: &'a FunctionHeader,
    pub param_indexes: Vec<usize>,
    pub actual_params: Vec<FunctionParam>,
}

struct TypeParamsMatch {
    type_args: IndexMap<String, Type>,
    actual_header: FunctionHeader,
}

impl FunctionParamsMatch<'_> {
    /// Matches actual argument types against the header. Type arguments are
    /// inferred from the arguments; when that leaves parameters open and an
    /// expected result type is known, it is matched against the declared
    /// result type as well. Returns the specialized header and the
    /// per-argument conversions, or `None` when the call does not fit.
    pub fn match_args(
        &self,
        arg_types: &[Type],
        expected_result_type: Option<&Type>,
    ) -> Option<FunctionHeaderMatch> {
        debug_assert_eq!(arg_types.len(), self.param_indexes.len());
        trace!(header = %self.header, "matching call arguments");

        let cap_arg_types: Vec<Type> =
            arg_types.iter().map(|t| t.capture_wildcards()).collect();

        let m = if self.header.type_params.is_empty() {
            TypeParamsMatch {
                type_args: IndexMap::new(),
                actual_header: FunctionHeader::new(
                    Vec::new(),
                    self.header.result_type.clone(),
                    self.actual_params.clone(),
                ),
            }
        } else {
            self.match_replace_type_params(&cap_arg_types, expected_result_type)?
        };

        let mut conversions = Vec::with_capacity(m.actual_header.params.len());
        for (param, arg_type) in m.actual_header.params.iter().zip(cap_arg_types.iter()) {
            if param.exact && *arg_type != param.ty {
                return None;
            }
            if param.nullable && !matches!(arg_type, Type::Nullable(_)) {
                return None;
            }
            conversions.push(param.ty.get_conversion(arg_type)?);
        }

        Some(FunctionHeaderMatch {
            type_args: m.type_args,
            actual_header: m.actual_header,
            conversions,
        })
    }

    fn match_replace_type_params(
        &self,
        arg_types: &[Type],
        expected_result_type: Option<&Type>,
    ) -> Option<TypeParamsMatch> {
        let mut resolver = TypeParamsResolver::new(self.header.type_params.clone());

        for (param, arg_type) in self.actual_params.iter().zip(arg_types.iter()) {
            if !resolver.match_type_params_in(&param.ty, arg_type) {
                return None;
            }
        }

        if !resolver.all_params_matched() {
            if let Some(expected) = expected_result_type {
                resolver.match_type_params_out(&self.header.result_type, expected);
            }
        }

        let type_args = resolver.resolve()?;

        let type_sets: TypeParamMap = type_args
            .iter()
            .map(|(k, v)| (k.clone(), TypeSet::One(v.clone())))
            .collect();

        let replaced = self.header.replace_type_params(&type_sets);
        replaced.validate().ok()?;

        let full_params: Vec<FunctionParam> =
            self.param_indexes.iter().map(|&i| replaced.params[i].clone()).collect();
        let unresolved: Vec<Arc<TypeParam>> = self
            .header
            .type_params
            .iter()
            .filter(|p| !type_args.contains_key(*p))
            .cloned()
            .collect();

        let actual_header =
            FunctionHeader::new(unresolved, replaced.result_type.clone(), full_params);

        let res_type_args: IndexMap<String, Type> = type_args
            .iter()
            .map(|(k, v)| (k.name.clone(), v.clone()))
            .collect();

        Some(TypeParamsMatch { type_args: res_type_args, actual_header })
    }
}

/// A fully matched call: inferred type arguments by name, the specialized
/// header and one conversion per argument.
pub struct FunctionHeaderMatch {
    pub type_args: IndexMap<String, Type>,
    pub actual_header: FunctionHeader,
    pub conversions: Vec<Conversion>,
}
