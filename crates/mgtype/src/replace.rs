//! Type parameter substitution and capture expansion.
//!
//! Substituting a wildcard argument for a type parameter does not always
//! produce a plain type, so [`Type::replace_params`] returns a [`TypeRep`]:
//! either an exact type or a type set. Callers choose how to force a set rep
//! into a type: composite positions mint a fresh capture, function parameter
//! and result positions in raw mode take the canonical in/out type.
//!
//! [`Type::replace_params_in`] and [`Type::replace_params_out`] combine
//! substitution with capture expansion to answer the two questions call sites
//! actually ask: what can safely be passed in, and what is guaranteed to come
//! out.

use crate::def::{TypeParamMap, Variance};
use crate::type_set::TypeSet;
use crate::types::{TupleField, Type, TypeArgs};

/// Result of a substitution: an exact type or a set of types.
#[derive(Clone, PartialEq, Eq, Debug)]
pub enum TypeRep {
    Exact(Type),
    Set(TypeSet),
}

impl TypeRep {
    pub fn into_type_set(self) -> TypeSet {
        match self {
            TypeRep::Exact(t) => TypeSet::One(t),
            TypeRep::Set(s) => s,
        }
    }

    /// Forces the rep into a type, minting a fresh capture for a set rep.
    pub fn into_type(self) -> Type {
        match self {
            TypeRep::Exact(t) => t,
            TypeRep::Set(s) => s.capture_type(),
        }
    }
}

/// Direction of capture expansion: towards supertypes or subtypes.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub(crate) enum ExpandMode {
    Super,
    Sub,
}

impl ExpandMode {
    pub(crate) fn flip(self) -> ExpandMode {
        match self {
            ExpandMode::Super => ExpandMode::Sub,
            ExpandMode::Sub => ExpandMode::Super,
        }
    }

    /// The type every expansion trivially succeeds with.
    fn extreme(self) -> Type {
        match self {
            ExpandMode::Super => Type::Anything,
            ExpandMode::Sub => Type::Nothing,
        }
    }
}

// ===========================================================================
// Substitution
// ===========================================================================

impl Type {
    /// Substitutes type parameters according to `map`. With `capture` set,
    /// a parameter mapped to a wildcard becomes a fresh capture of that
    /// wildcard; otherwise the wildcard set itself is the result.
    pub fn replace_params(&self, map: &TypeParamMap, capture: bool) -> TypeRep {
        match self {
            Type::Anything | Type::Nothing | Type::Any | Type::Null | Type::Capture(_) => {
                TypeRep::Exact(self.clone())
            }
            Type::Param(p) => match map.get(p) {
                None => TypeRep::Exact(self.clone()),
                Some(set) => {
                    if capture {
                        TypeRep::Exact(set.capture_type())
                    } else {
                        TypeRep::Set(set.clone())
                    }
                }
            },
            Type::Nullable(v) => {
                let inner = v.replace_params(map, capture).into_type();
                if inner == **v {
                    TypeRep::Exact(self.clone())
                } else {
                    TypeRep::Exact(Type::nullable(inner))
                }
            }
            Type::Tuple(t) => {
                let fields: Vec<TupleField> = t
                    .fields
                    .iter()
                    .map(|f| TupleField {
                        name: f.name.clone(),
                        ty: f.ty.replace_params(map, capture).into_type(),
                    })
                    .collect();
                if fields == t.fields {
                    TypeRep::Exact(self.clone())
                } else {
                    TypeRep::Exact(Type::tuple(fields))
                }
            }
            Type::Function(f) => {
                let params: Vec<Type> = f
                    .params
                    .iter()
                    .map(|p| {
                        let rep = p.replace_params(map, capture);
                        match rep {
                            TypeRep::Exact(t) => t,
                            TypeRep::Set(s) if capture => s.capture_type(),
                            TypeRep::Set(s) => s.canonical_in_type(),
                        }
                    })
                    .collect();
                let result = {
                    let rep = f.result.replace_params(map, capture);
                    match rep {
                        TypeRep::Exact(t) => t,
                        TypeRep::Set(s) if capture => s.capture_type(),
                        TypeRep::Set(s) => s.canonical_out_type(),
                    }
                };
                if params == f.params && result == f.result {
                    TypeRep::Exact(self.clone())
                } else {
                    TypeRep::Exact(Type::function(params, result))
                }
            }
            Type::Generic(g) => {
                let args: TypeArgs =
                    g.args.iter().map(|a| a.replace_params(map, capture)).collect();
                if args == g.args {
                    TypeRep::Exact(self.clone())
                } else {
                    TypeRep::Exact(g.def.make_type(args))
                }
            }
        }
    }

    /// The most general type that can safely be passed where `self` appears,
    /// after substituting `map`. `nothing` when no type is safe.
    pub fn replace_params_in(&self, map: &TypeParamMap) -> Type {
        self.replace_params(map, true)
            .into_type()
            .expand_captures(ExpandMode::Sub)
            .unwrap_or(Type::Nothing)
    }

    /// The most specific type guaranteed where `self` appears, after
    /// substituting `map`. `anything` when nothing more specific holds.
    pub fn replace_params_out(&self, map: &TypeParamMap) -> Type {
        self.replace_params(map, true)
            .into_type()
            .expand_captures(ExpandMode::Super)
            .unwrap_or(Type::Anything)
    }
}

// ===========================================================================
// Capture expansion
// ===========================================================================

impl Type {
    /// Replaces captures by their bound in the given direction. `None` when
    /// the type cannot be expanded that way; for composite positions the
    /// caller substitutes the direction's extreme type instead.
    pub(crate) fn expand_captures(&self, mode: ExpandMode) -> Option<Type> {
        match self {
            Type::Capture(c) => {
                let bound = match mode {
                    ExpandMode::Super => c.bound.super_type().cloned(),
                    ExpandMode::Sub => c.bound.sub_type().cloned(),
                }?;
                bound.expand_captures(mode)
            }
            Type::Nullable(v) => {
                let inner = v.expand_captures(mode).unwrap_or_else(|| mode.extreme());
                Some(Type::nullable(inner))
            }
            Type::Tuple(t) => {
                let fields = t
                    .fields
                    .iter()
                    .map(|f| TupleField {
                        name: f.name.clone(),
                        ty: f.ty.expand_captures(mode).unwrap_or_else(|| mode.extreme()),
                    })
                    .collect();
                Some(Type::tuple(fields))
            }
            Type::Function(f) => {
                let params = f
                    .params
                    .iter()
                    .map(|p| {
                        p.expand_captures(mode.flip())
                            .unwrap_or_else(|| mode.flip().extreme())
                    })
                    .collect();
                let result = f.result.expand_captures(mode).unwrap_or_else(|| mode.extreme());
                Some(Type::function(params, result))
            }
            Type::Generic(g) => {
                let mut args = TypeArgs::new();
                for (param, a) in g.def.params.iter().zip(g.args.iter()) {
                    let set = match param.variance {
                        Variance::None => a.expand_captures(mode)?,
                        Variance::In => {
                            let x = a.exact_type()?;
                            let exp = x
                                .expand_captures(mode.flip())
                                .unwrap_or_else(|| mode.flip().extreme());
                            TypeSet::One(exp)
                        }
                        Variance::Out => {
                            let x = a.exact_type()?;
                            let exp =
                                x.expand_captures(mode).unwrap_or_else(|| mode.extreme());
                            TypeSet::One(exp)
                        }
                    };
                    args.push(set);
                }
                if args == g.args {
                    Some(self.clone())
                } else {
                    Some(g.def.make_type(args))
                }
            }
            _ => Some(self.clone()),
        }
    }
}
