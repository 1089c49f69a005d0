//! Subtype and equality matching.
//!
//! The walkers in this module decompose two types one level at a time and
//! delegate every leaf comparison to a handler. The plain subtype check uses
//! [`SubtypeHandler`], which re-enters the walker; type-argument inference
//! plugs in a collecting handler instead (see [`crate::resolve`]) and
//! intercepts type parameters before they are compared.

use crate::def::Variance;
use crate::subtype::MatchSuperRel::{Equal, Sub, Super};
use crate::types::Type;

/// Relation requested from a [`TypeMatchSuperHandler`] at a leaf.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum MatchSuperRel {
    /// The two types must be the same type.
    Equal,
    /// The first type must be a supertype of the second.
    Super,
    /// The first type must be a subtype of the second.
    Sub,
}

impl MatchSuperRel {
    pub fn invert(self) -> MatchSuperRel {
        match self {
            Equal => Equal,
            Super => Sub,
            Sub => Super,
        }
    }
}

pub trait TypeMatchSuperHandler {
    fn handle(&mut self, t1: &Type, t2: &Type, rel: MatchSuperRel) -> bool;
}

pub trait TypeMatchEqualHandler {
    fn handle(&mut self, t1: &Type, t2: &Type) -> bool;
}

/// Pure subtype checking: every leaf relation re-enters the walker.
pub struct SubtypeHandler;

impl TypeMatchSuperHandler for SubtypeHandler {
    fn handle(&mut self, t1: &Type, t2: &Type, rel: MatchSuperRel) -> bool {
        match rel {
            Equal => t1 == t2,
            Super => t1.match_type_super(t2, self),
            Sub => t2.match_type_super(t1, self),
        }
    }
}

impl Type {
    pub fn is_super_type_of(&self, other: &Type) -> bool {
        self.match_type_super(other, &mut SubtypeHandler)
    }

    /// One-level supertype decomposition. Returns whether `self` is a
    /// supertype of `sub`, asking `h` for every component relation.
    ///
    /// Type parameters and captures relate to other types only through their
    /// bounds: on the left through the lower bound, on the right through the
    /// upper bound.
    pub(crate) fn match_type_super(&self, sub: &Type, h: &mut dyn TypeMatchSuperHandler) -> bool {
        if self == sub || *sub == Type::Nothing || *self == Type::Anything {
            return true;
        }
        if *self == Type::Nothing || *sub == Type::Anything {
            return false;
        }

        match self {
            Type::Param(p) => {
                return match p.bounds.sub_type() {
                    Some(lower) => h.handle(lower, sub, Super),
                    None => false,
                };
            }
            Type::Capture(c) => {
                return match c.bound.sub_type() {
                    Some(lower) => h.handle(lower, sub, Super),
                    None => false,
                };
            }
            _ => {}
        }

        match sub {
            Type::Param(p) => {
                return match p.bounds.super_type() {
                    Some(upper) => h.handle(self, upper, Super),
                    None => false,
                };
            }
            Type::Capture(c) => {
                return match c.bound.super_type() {
                    Some(upper) => h.handle(self, upper, Super),
                    None => false,
                };
            }
            _ => {}
        }

        match (self, sub) {
            (Type::Any, _) => !matches!(sub, Type::Any | Type::Null | Type::Nullable(_)),
            (Type::Nullable(_), Type::Null) => true,
            (Type::Nullable(v1), Type::Nullable(v2)) => h.handle(v1, v2, Super),
            (Type::Nullable(v1), _) => h.handle(v1, sub, Super),
            (Type::Tuple(t1), Type::Tuple(t2)) => {
                t1.fields.len() == t2.fields.len()
                    && t1
                        .fields
                        .iter()
                        .zip(t2.fields.iter())
                        .all(|(f1, f2)| f1.name == f2.name && h.handle(&f1.ty, &f2.ty, Super))
            }
            (Type::Function(f1), Type::Function(f2)) => {
                f1.params.len() == f2.params.len()
                    && h.handle(&f1.result, &f2.result, Super)
                    && f1
                        .params
                        .iter()
                        .zip(f2.params.iter())
                        .all(|(p1, p2)| h.handle(p1, p2, Sub))
            }
            (Type::Generic(g1), _) => {
                let sub2 = match sub.corresponding_super_type(&g1.def) {
                    Some(t) => t,
                    None => return false,
                };
                let g2 = match &sub2 {
                    Type::Generic(g) => g,
                    _ => return false,
                };
                g1.def
                    .params
                    .iter()
                    .zip(g1.args.iter().zip(g2.args.iter()))
                    .all(|(param, (a1, a2))| match param.variance {
                        Variance::None => a1.match_type_super(a2, h),
                        Variance::In => match (a1.exact_type(), a2.exact_type()) {
                            (Some(x1), Some(x2)) => h.handle(x1, x2, Sub),
                            _ => false,
                        },
                        Variance::Out => match (a1.exact_type(), a2.exact_type()) {
                            (Some(x1), Some(x2)) => h.handle(x1, x2, Super),
                            _ => false,
                        },
                    })
            }
            _ => false,
        }
    }

    /// One-level structural equality decomposition, asking `h` for every
    /// component comparison.
    pub(crate) fn match_type_equal(&self, other: &Type, h: &mut dyn TypeMatchEqualHandler) -> bool {
        match (self, other) {
            (Type::Nullable(v1), Type::Nullable(v2)) => h.handle(v1, v2),
            (Type::Tuple(t1), Type::Tuple(t2)) => {
                t1.fields.len() == t2.fields.len()
                    && t1
                        .fields
                        .iter()
                        .zip(t2.fields.iter())
                        .all(|(f1, f2)| f1.name == f2.name && h.handle(&f1.ty, &f2.ty))
            }
            (Type::Function(f1), Type::Function(f2)) => {
                f1.params.len() == f2.params.len()
                    && h.handle(&f1.result, &f2.result)
                    && f1
                        .params
                        .iter()
                        .zip(f2.params.iter())
                        .all(|(p1, p2)| h.handle(p1, p2))
            }
            (Type::Generic(g1), Type::Generic(g2)) if g1.def == g2.def => g1
                .args
                .iter()
                .zip(g2.args.iter())
                .all(|(a1, a2)| a1.match_type_equal(a2, h)),
            _ => self == other,
        }
    }
}
