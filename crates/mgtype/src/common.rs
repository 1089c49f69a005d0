//! Common supertype (join), common subtype (meet) and conversions.
//!
//! Joins and meets are partial: unrelated types may have no common type
//! expressible in the model, in which case `None` is returned. Generic types
//! join at the deepest definition the two parent chains share, combining each
//! argument position according to the declared variance of its parameter.

use crate::def::Variance;
use crate::type_set::TypeSet;
use crate::types::{Type, TypeArgs, TupleField};

/// How a source type is accepted where a target type is expected.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Conversion {
    /// The source is a subtype of the target; no conversion needed.
    Direct,
    /// The target's generic definition declares a conversion from the source.
    Generic,
}

impl Type {
    // =======================================================================
    // Join
    // =======================================================================

    /// The least common supertype of the two types, when one exists.
    pub fn common_super_type(&self, other: &Type) -> Option<Type> {
        if self.is_super_type_of(other) {
            return Some(self.clone());
        }
        if other.is_super_type_of(self) {
            return Some(other.clone());
        }

        if let Some(upper) = bound_upper(self) {
            return upper.common_super_type(other);
        }
        if let Some(upper) = bound_upper(other) {
            return self.common_super_type(&upper);
        }

        match (self, other) {
            (Type::Null, _) => Some(Type::nullable(other.clone())),
            (_, Type::Null) => Some(Type::nullable(self.clone())),
            (Type::Nullable(v1), Type::Nullable(v2)) => {
                v1.common_super_type(v2).map(Type::nullable)
            }
            (Type::Nullable(v1), _) => v1.common_super_type(other).map(Type::nullable),
            (_, Type::Nullable(v2)) => self.common_super_type(v2).map(Type::nullable),
            (Type::Tuple(t1), Type::Tuple(t2)) => {
                if t1.fields.len() != t2.fields.len() {
                    return None;
                }
                let mut fields = Vec::with_capacity(t1.fields.len());
                for (f1, f2) in t1.fields.iter().zip(t2.fields.iter()) {
                    if f1.name != f2.name {
                        return None;
                    }
                    let ty = f1.ty.common_super_type(&f2.ty)?;
                    fields.push(TupleField { name: f1.name.clone(), ty });
                }
                Some(Type::tuple(fields))
            }
            (Type::Function(f1), Type::Function(f2)) => {
                if f1.params.len() != f2.params.len() {
                    return None;
                }
                let result = f1.result.common_super_type(&f2.result)?;
                let params = f1
                    .params
                    .iter()
                    .zip(f2.params.iter())
                    .map(|(p1, p2)| p1.common_sub_type(p2).unwrap_or(Type::Nothing))
                    .collect();
                Some(Type::function(params, result))
            }
            (Type::Generic(_), Type::Generic(_)) => self.common_generic_super_type(other),
            _ => None,
        }
    }

    /// Joins two generic types at the deepest definition shared by their
    /// parent chains.
    fn common_generic_super_type(&self, other: &Type) -> Option<Type> {
        let chain1: Vec<Type> = self.parent_chain().into_iter().rev().collect();
        let chain2: Vec<Type> = other.parent_chain().into_iter().rev().collect();
        let n = chain1.len().min(chain2.len());
        for i in (0..n).rev() {
            let (Type::Generic(g1), Type::Generic(g2)) = (&chain1[i], &chain2[i]) else {
                continue;
            };
            if g1.def != g2.def {
                continue;
            }
            let mut args = TypeArgs::new();
            for (param, (a1, a2)) in g1.def.params.iter().zip(g1.args.iter().zip(g2.args.iter())) {
                let set = match param.variance {
                    Variance::None => a1.common_super_set(a2),
                    Variance::In => {
                        let (x1, x2) = (a1.exact_type()?, a2.exact_type()?);
                        TypeSet::One(x1.common_sub_type(x2).unwrap_or(Type::Nothing))
                    }
                    Variance::Out => {
                        let (x1, x2) = (a1.exact_type()?, a2.exact_type()?);
                        TypeSet::One(x1.common_super_type(x2).unwrap_or(Type::Anything))
                    }
                };
                args.push(set);
            }
            return Some(g1.def.make_type(args));
        }
        None
    }

    // =======================================================================
    // Meet
    // =======================================================================

    /// The greatest common subtype of the two types, when one exists.
    pub fn common_sub_type(&self, other: &Type) -> Option<Type> {
        if self.is_super_type_of(other) {
            return Some(other.clone());
        }
        if other.is_super_type_of(self) {
            return Some(self.clone());
        }

        if let Some(lower) = bound_lower(self) {
            return lower.common_sub_type(other);
        }
        if let Some(lower) = bound_lower(other) {
            return self.common_sub_type(&lower);
        }

        match (self, other) {
            (Type::Nullable(v1), Type::Nullable(v2)) => {
                v1.common_sub_type(v2).map(Type::nullable)
            }
            (Type::Nullable(v1), _) => v1.common_sub_type(other),
            (_, Type::Nullable(v2)) => self.common_sub_type(v2),
            (Type::Tuple(t1), Type::Tuple(t2)) => {
                if t1.fields.len() != t2.fields.len() {
                    return None;
                }
                let mut fields = Vec::with_capacity(t1.fields.len());
                for (f1, f2) in t1.fields.iter().zip(t2.fields.iter()) {
                    if f1.name != f2.name {
                        return None;
                    }
                    let ty = f1.ty.common_sub_type(&f2.ty)?;
                    fields.push(TupleField { name: f1.name.clone(), ty });
                }
                Some(Type::tuple(fields))
            }
            (Type::Function(f1), Type::Function(f2)) => {
                if f1.params.len() != f2.params.len() {
                    return None;
                }
                let result = f1.result.common_sub_type(&f2.result)?;
                let params = f1
                    .params
                    .iter()
                    .zip(f2.params.iter())
                    .map(|(p1, p2)| p1.common_super_type(p2).unwrap_or(Type::Anything))
                    .collect();
                Some(Type::function(params, result))
            }
            (Type::Generic(g1), Type::Generic(g2)) if g1.def == g2.def => {
                let mut args = TypeArgs::new();
                for (param, (a1, a2)) in
                    g1.def.params.iter().zip(g1.args.iter().zip(g2.args.iter()))
                {
                    let set = match param.variance {
                        Variance::None => a1.common_sub_set(a2)?,
                        Variance::In => {
                            let (x1, x2) = (a1.exact_type()?, a2.exact_type()?);
                            TypeSet::One(x1.common_super_type(x2)?)
                        }
                        Variance::Out => {
                            let (x1, x2) = (a1.exact_type()?, a2.exact_type()?);
                            TypeSet::One(x1.common_sub_type(x2)?)
                        }
                    };
                    args.push(set);
                }
                Some(g1.def.make_type(args))
            }
            _ => None,
        }
    }

    // =======================================================================
    // Conversions
    // =======================================================================

    /// How a value of type `source` can be accepted where `self` is expected,
    /// or `None` when it cannot.
    pub fn get_conversion(&self, source: &Type) -> Option<Conversion> {
        if self.is_super_type_of(source) {
            return Some(Conversion::Direct);
        }
        match self {
            Type::Nullable(v) => v.get_conversion(source.strip_nullable()),
            Type::Generic(g) => {
                if g.def.conversions.iter().any(|c| c == source) {
                    Some(Conversion::Generic)
                } else {
                    None
                }
            }
            _ => None,
        }
    }

    /// A type both types can be converted to: the join when one exists,
    /// otherwise one of the two when the other converts to it. Nullability
    /// of either side carries over to the result.
    pub fn common_conversion_type(&self, other: &Type) -> Option<Type> {
        let nullable =
            matches!(self, Type::Nullable(_) | Type::Null) || matches!(other, Type::Nullable(_) | Type::Null);
        let a = self.strip_nullable();
        let b = other.strip_nullable();
        let base = if let Some(sup) = a.common_super_type(b) {
            sup
        } else if a.get_conversion(b).is_some() {
            a.clone()
        } else if b.get_conversion(a).is_some() {
            b.clone()
        } else {
            return None;
        };
        Some(if nullable { Type::nullable(base) } else { base })
    }
}

/// The upper bound of a parameter or capture, when the type is one.
fn bound_upper(ty: &Type) -> Option<Type> {
    match ty {
        Type::Param(p) => Some(p.bounds.canonical_out_type()),
        Type::Capture(c) => Some(c.bound.canonical_out_type()),
        _ => None,
    }
}

/// The lower bound of a parameter or capture, when the type is one.
fn bound_lower(ty: &Type) -> Option<Type> {
    match ty {
        Type::Param(p) => p.bounds.sub_type().cloned(),
        Type::Capture(c) => c.bound.sub_type().cloned(),
        _ => None,
    }
}
