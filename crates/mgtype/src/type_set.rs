//! Type sets: the shape of a type argument.
//!
//! A [`TypeSet`] denotes a set of types used as a generic type argument:
//!
//! | Variant      | Rendered | Denotes                          |
//! |--------------|----------|----------------------------------|
//! | `One(T)`     | `T`      | exactly `T`                      |
//! | `SubOf(B)`   | `-B`     | `B` and all its subtypes         |
//! | `SuperOf(B)` | `+B`     | `B` and all its supertypes       |
//! | `All`        | `*`      | every type                       |
//!
//! Construction folds degenerate bounds into simpler sets: `-anything` and
//! `+nothing` are `*`, `-nothing` is exactly `nothing`, `-null` is exactly
//! `null`, `+anything` is exactly `anything`.

use crate::def::TypeParam;
use crate::error::TypeError;
use crate::replace::{ExpandMode, TypeRep};
use crate::subtype::{
    MatchSuperRel, SubtypeHandler, TypeMatchEqualHandler, TypeMatchSuperHandler,
};
use crate::types::Type;
use indexmap::IndexSet;
use std::fmt;
use std::sync::Arc;

#[derive(Clone, PartialEq, Eq, Hash, Debug)]
pub enum TypeSet {
    One(Type),
    SubOf(Type),
    SuperOf(Type),
    All,
}

impl TypeSet {
    pub fn one(ty: Type) -> TypeSet {
        TypeSet::One(ty)
    }

    /// The set of `bound` and all its subtypes.
    pub fn sub_of(bound: Type) -> TypeSet {
        match bound {
            Type::Anything => TypeSet::All,
            Type::Nothing => TypeSet::One(Type::Nothing),
            Type::Null => TypeSet::One(Type::Null),
            _ => TypeSet::SubOf(bound),
        }
    }

    /// The set of `bound` and all its supertypes.
    pub fn super_of(bound: Type) -> TypeSet {
        match bound {
            Type::Anything => TypeSet::One(Type::Anything),
            Type::Nothing => TypeSet::All,
            _ => TypeSet::SuperOf(bound),
        }
    }

    // =======================================================================
    // Accessors
    // =======================================================================

    /// The exact type, for one-type sets.
    pub fn exact_type(&self) -> Option<&Type> {
        match self {
            TypeSet::One(t) => Some(t),
            _ => None,
        }
    }

    /// The least type of the set, when the set has one: its lower bound.
    pub fn sub_type(&self) -> Option<&Type> {
        match self {
            TypeSet::One(t) => Some(t),
            TypeSet::SuperOf(b) => Some(b),
            TypeSet::SubOf(_) | TypeSet::All => None,
        }
    }

    /// The greatest type of the set, when the set has one: its upper bound.
    pub fn super_type(&self) -> Option<&Type> {
        match self {
            TypeSet::One(t) => Some(t),
            TypeSet::SubOf(b) => Some(b),
            TypeSet::SuperOf(_) | TypeSet::All => None,
        }
    }

    /// The type to assume when the argument is used in an "in" (consuming)
    /// position.
    pub fn canonical_in_type(&self) -> Type {
        match self {
            TypeSet::One(t) => t.clone(),
            TypeSet::SubOf(_) | TypeSet::All => Type::Nothing,
            TypeSet::SuperOf(b) => b.clone(),
        }
    }

    /// The type to assume when the argument is used in an "out" (producing)
    /// position.
    pub fn canonical_out_type(&self) -> Type {
        match self {
            TypeSet::One(t) => t.clone(),
            TypeSet::SubOf(b) => b.clone(),
            TypeSet::SuperOf(_) | TypeSet::All => Type::Anything,
        }
    }

    /// The union of this set with all subtypes of its members.
    pub fn all_sub_types(&self) -> TypeSet {
        match self {
            TypeSet::One(t) => TypeSet::sub_of(t.clone()),
            TypeSet::SubOf(_) => self.clone(),
            TypeSet::SuperOf(_) | TypeSet::All => TypeSet::All,
        }
    }

    /// The union of this set with all supertypes of its members.
    pub fn all_super_types(&self) -> TypeSet {
        match self {
            TypeSet::One(t) => TypeSet::super_of(t.clone()),
            TypeSet::SuperOf(_) => self.clone(),
            TypeSet::SubOf(_) | TypeSet::All => TypeSet::All,
        }
    }

    pub fn contains(&self, ty: &Type) -> bool {
        match self {
            TypeSet::One(t) => t == ty,
            TypeSet::SubOf(b) => b.is_super_type_of(ty),
            TypeSet::SuperOf(b) => ty.is_super_type_of(b),
            TypeSet::All => true,
        }
    }

    // =======================================================================
    // Wildcard capture
    // =======================================================================

    /// The single type representing this set: the exact type for one-type
    /// sets, a fresh capture otherwise.
    pub fn capture_type(&self) -> Type {
        match self {
            TypeSet::One(t) => t.clone(),
            _ => Type::capture(self.clone()),
        }
    }

    /// This set with wildcards converted to a one-type set of a fresh
    /// capture.
    pub fn capture_type_set(&self) -> TypeSet {
        match self {
            TypeSet::One(_) => self.clone(),
            _ => TypeSet::One(self.capture_type()),
        }
    }

    /// The bound of a captured wildcard held as an exact argument.
    fn captured_set(&self) -> Option<TypeSet> {
        match self {
            TypeSet::One(Type::Capture(c)) => Some(c.bound.clone()),
            _ => None,
        }
    }

    // =======================================================================
    // Matching
    // =======================================================================

    pub fn is_super_set_of(&self, other: &TypeSet) -> bool {
        self.match_type_super(other, &mut SubtypeHandler)
    }

    /// Structural containment check, delegating type comparisons to `h`.
    /// Mixed sub/super wildcards only contain each other in the degenerate
    /// `anything`/`nothing` cases, expressed as equality obligations.
    pub(crate) fn match_type_super(
        &self,
        other: &TypeSet,
        h: &mut dyn TypeMatchSuperHandler,
    ) -> bool {
        match (self, other) {
            (TypeSet::All, _) => true,
            (TypeSet::One(t1), TypeSet::One(t2)) => h.handle(t1, t2, MatchSuperRel::Equal),
            (TypeSet::One(_), _) => false,
            (TypeSet::SubOf(b1), TypeSet::One(t2)) => h.handle(b1, t2, MatchSuperRel::Super),
            (TypeSet::SubOf(b1), TypeSet::SubOf(b2)) => h.handle(b1, b2, MatchSuperRel::Super),
            (TypeSet::SubOf(b1), TypeSet::SuperOf(b2)) => {
                h.handle(b1, &Type::Anything, MatchSuperRel::Equal)
                    || h.handle(b2, &Type::Nothing, MatchSuperRel::Equal)
            }
            (TypeSet::SubOf(b1), TypeSet::All) => {
                h.handle(b1, &Type::Anything, MatchSuperRel::Equal)
            }
            (TypeSet::SuperOf(b1), TypeSet::One(t2)) => h.handle(b1, t2, MatchSuperRel::Sub),
            (TypeSet::SuperOf(b1), TypeSet::SuperOf(b2)) => h.handle(b1, b2, MatchSuperRel::Sub),
            (TypeSet::SuperOf(b1), TypeSet::SubOf(b2)) => {
                h.handle(b1, &Type::Nothing, MatchSuperRel::Equal)
                    || h.handle(b2, &Type::Anything, MatchSuperRel::Equal)
            }
            (TypeSet::SuperOf(b1), TypeSet::All) => {
                h.handle(b1, &Type::Nothing, MatchSuperRel::Equal)
            }
        }
    }

    pub(crate) fn match_type_equal(
        &self,
        other: &TypeSet,
        h: &mut dyn TypeMatchEqualHandler,
    ) -> bool {
        match (self, other) {
            (TypeSet::All, TypeSet::All) => true,
            (TypeSet::One(t1), TypeSet::One(t2)) => h.handle(t1, t2),
            (TypeSet::SubOf(b1), TypeSet::SubOf(b2)) => h.handle(b1, b2),
            (TypeSet::SuperOf(b1), TypeSet::SuperOf(b2)) => h.handle(b1, b2),
            _ => false,
        }
    }

    // =======================================================================
    // Join / meet
    // =======================================================================

    /// The least set containing both sets. Total: falls back to `*`.
    /// Captured wildcards are resolved through their bounds first.
    pub fn common_super_set(&self, other: &TypeSet) -> TypeSet {
        let cap1 = self.captured_set();
        let cap2 = other.captured_set();
        if cap1.is_some() || cap2.is_some() {
            let s1 = cap1.as_ref().unwrap_or(self);
            let s2 = cap2.as_ref().unwrap_or(other);
            return s1.common_super_set(s2);
        }
        self.common_super_set0(other)
    }

    fn common_super_set0(&self, other: &TypeSet) -> TypeSet {
        match (self, other) {
            (TypeSet::All, _) | (_, TypeSet::All) => TypeSet::All,
            (TypeSet::One(t1), TypeSet::One(t2)) => {
                if t1 == t2 {
                    self.clone()
                } else if let Some(sup) = t1.common_super_type(t2) {
                    TypeSet::sub_of(sup)
                } else if let Some(sub) = t1.common_sub_type(t2) {
                    TypeSet::super_of(sub)
                } else {
                    TypeSet::All
                }
            }
            (TypeSet::One(t), TypeSet::SubOf(b)) | (TypeSet::SubOf(b), TypeSet::One(t)) => {
                match t.common_super_type(b) {
                    Some(sup) => TypeSet::sub_of(sup),
                    None => TypeSet::All,
                }
            }
            (TypeSet::One(t), TypeSet::SuperOf(b)) | (TypeSet::SuperOf(b), TypeSet::One(t)) => {
                match t.common_sub_type(b) {
                    Some(sub) => TypeSet::super_of(sub),
                    None => TypeSet::All,
                }
            }
            (TypeSet::SubOf(b1), TypeSet::SubOf(b2)) => match b1.common_super_type(b2) {
                Some(sup) => TypeSet::sub_of(sup),
                None => TypeSet::All,
            },
            (TypeSet::SuperOf(b1), TypeSet::SuperOf(b2)) => match b1.common_sub_type(b2) {
                Some(sub) => TypeSet::super_of(sub),
                None => TypeSet::All,
            },
            (TypeSet::SubOf(_), TypeSet::SuperOf(_)) | (TypeSet::SuperOf(_), TypeSet::SubOf(_)) => {
                TypeSet::All
            }
        }
    }

    /// The greatest set contained in both sets, or `None` when the
    /// intersection is not expressible.
    pub fn common_sub_set(&self, other: &TypeSet) -> Option<TypeSet> {
        let cap1 = self.captured_set();
        let cap2 = other.captured_set();
        if cap1.is_some() || cap2.is_some() {
            let s1 = cap1.as_ref().unwrap_or(self);
            let s2 = cap2.as_ref().unwrap_or(other);
            return s1.common_sub_set(s2);
        }
        self.common_sub_set0(other)
    }

    fn common_sub_set0(&self, other: &TypeSet) -> Option<TypeSet> {
        match (self, other) {
            (TypeSet::All, s) => Some(s.clone()),
            (s, TypeSet::All) => Some(s.clone()),
            (TypeSet::One(t), s) | (s, TypeSet::One(t)) => {
                if s.contains(t) {
                    Some(TypeSet::One(t.clone()))
                } else {
                    None
                }
            }
            (TypeSet::SubOf(b1), TypeSet::SubOf(b2)) => {
                b1.common_sub_type(b2).map(TypeSet::sub_of)
            }
            (TypeSet::SuperOf(b1), TypeSet::SuperOf(b2)) => {
                b1.common_super_type(b2).map(TypeSet::super_of)
            }
            (TypeSet::SubOf(_), TypeSet::SuperOf(_)) | (TypeSet::SuperOf(_), TypeSet::SubOf(_)) => {
                None
            }
        }
    }

    // =======================================================================
    // Substitution
    // =======================================================================

    pub fn replace_params(&self, map: &crate::def::TypeParamMap, capture: bool) -> TypeSet {
        match self {
            TypeSet::One(t) => t.replace_params(map, capture).into_type_set(),
            TypeSet::SubOf(b) => match b.replace_params(map, capture) {
                TypeRep::Exact(t) => TypeSet::sub_of(t),
                TypeRep::Set(s) => s.all_sub_types(),
            },
            TypeSet::SuperOf(b) => match b.replace_params(map, capture) {
                TypeRep::Exact(t) => TypeSet::super_of(t),
                TypeRep::Set(s) => s.all_super_types(),
            },
            TypeSet::All => TypeSet::All,
        }
    }

    /// Widens (`Super`) or narrows (`Sub`) captures inside the set.
    /// `None` means the set cannot be expanded in the requested direction;
    /// one-type sets in particular never narrow to a different type.
    pub(crate) fn expand_captures(&self, mode: ExpandMode) -> Option<TypeSet> {
        match self {
            TypeSet::All => Some(TypeSet::All),
            TypeSet::One(t) => match mode {
                ExpandMode::Super => match t.expand_captures(ExpandMode::Super) {
                    Some(t2) if t2 == *t => Some(self.clone()),
                    Some(t2) => Some(TypeSet::sub_of(t2)),
                    None => match t.expand_captures(ExpandMode::Sub) {
                        Some(t3) => Some(TypeSet::super_of(t3)),
                        None => Some(TypeSet::All),
                    },
                },
                ExpandMode::Sub => match t.expand_captures(ExpandMode::Sub) {
                    Some(t2) if t2 == *t => Some(self.clone()),
                    _ => None,
                },
            },
            TypeSet::SubOf(b) => {
                let exp = b.expand_captures(mode);
                if exp.as_ref() == Some(b) {
                    return Some(self.clone());
                }
                Some(match (mode, exp) {
                    (ExpandMode::Super, Some(t)) => TypeSet::sub_of(t),
                    (ExpandMode::Super, None) => TypeSet::All,
                    (ExpandMode::Sub, Some(t)) => TypeSet::sub_of(t),
                    (ExpandMode::Sub, None) => TypeSet::One(Type::Nothing),
                })
            }
            TypeSet::SuperOf(b) => {
                let exp = b.expand_captures(mode.flip());
                if exp.as_ref() == Some(b) {
                    return Some(self.clone());
                }
                Some(match (mode, exp) {
                    (ExpandMode::Super, Some(t)) => TypeSet::super_of(t),
                    (ExpandMode::Super, None) => TypeSet::All,
                    (ExpandMode::Sub, Some(t)) => TypeSet::super_of(t),
                    (ExpandMode::Sub, None) => TypeSet::One(Type::Anything),
                })
            }
        }
    }

    // =======================================================================
    // Misc
    // =======================================================================

    pub(crate) fn collect_type_params(&self, res: &mut IndexSet<Arc<TypeParam>>) {
        match self {
            TypeSet::One(t) | TypeSet::SubOf(t) | TypeSet::SuperOf(t) => {
                t.collect_type_params(res)
            }
            TypeSet::All => {}
        }
    }

    pub fn validate(&self) -> Result<(), TypeError> {
        match self {
            TypeSet::One(t) | TypeSet::SubOf(t) | TypeSet::SuperOf(t) => t.validate(),
            TypeSet::All => Ok(()),
        }
    }
}

impl fmt::Display for TypeSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypeSet::One(t) => write!(f, "{t}"),
            TypeSet::SubOf(b) => write!(f, "-{b}"),
            TypeSet::SuperOf(b) => write!(f, "+{b}"),
            TypeSet::All => write!(f, "*"),
        }
    }
}
