//! Generic type definitions and type parameters.
//!
//! A [`GenericDef`] is the declaration side of a generic type: its name, type
//! parameters (with variance and bounds), an optional parent declaration and
//! the set of source types it accepts by conversion. [`Type::Generic`]
//! instantiations point back at their definition.
//!
//! Definitions and parameters compare by identity. Two definitions with the
//! same name declared in different scopes are different types.

use crate::error::TypeError;
use crate::type_set::TypeSet;
use crate::types::{GenericType, Type, TypeArgs};
use indexmap::IndexMap;
use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

/// Substitution map from type parameters to type argument sets.
pub type TypeParamMap = IndexMap<Arc<TypeParam>, TypeSet>;

/// Declaration-site variance of a type parameter.
///
/// `In` parameters (`+T` in declarations) only occur in consuming positions,
/// so `c<int>` is a subtype of `c<num>` when `int` is a subtype of `num`.
/// `Out` parameters (`-T`) only occur in producing positions and subtype
/// covariantly.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum Variance {
    None,
    In,
    Out,
}

impl fmt::Display for Variance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Variance::None => Ok(()),
            Variance::In => write!(f, "+"),
            Variance::Out => write!(f, "-"),
        }
    }
}

// ===========================================================================
// Type parameters
// ===========================================================================

static NEXT_PARAM_ID: AtomicU64 = AtomicU64::new(1);

/// A declared type parameter. Identity-unique: equality and hashing use the
/// allocation id, never the name.
#[derive(Debug)]
pub struct TypeParam {
    id: u64,
    pub name: String,
    pub variance: Variance,
    pub bounds: TypeSet,
}

impl TypeParam {
    pub fn new(name: impl Into<String>, variance: Variance, bounds: TypeSet) -> Arc<TypeParam> {
        let id = NEXT_PARAM_ID.fetch_add(1, Ordering::Relaxed);
        Arc::new(TypeParam { id, name: name.into(), variance, bounds })
    }

    /// An unbounded invariant parameter.
    pub fn simple(name: impl Into<String>) -> Arc<TypeParam> {
        TypeParam::new(name, Variance::None, TypeSet::All)
    }

    /// Substitutes type parameters inside the bounds, producing a fresh
    /// parameter when anything changes.
    pub(crate) fn replace_type_params(
        self: &Arc<Self>,
        map: &TypeParamMap,
    ) -> Arc<TypeParam> {
        let bounds = self.bounds.replace_params(map, false);
        if bounds == self.bounds {
            self.clone()
        } else {
            TypeParam::new(self.name.clone(), self.variance, bounds)
        }
    }
}

impl PartialEq for TypeParam {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for TypeParam {}

impl std::hash::Hash for TypeParam {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl fmt::Display for TypeParam {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.variance, self.name)?;
        if self.bounds != TypeSet::All {
            write!(f, ":{}", self.bounds)?;
        }
        Ok(())
    }
}

// ===========================================================================
// Generic definitions
// ===========================================================================

/// The parent declaration of a generic definition, e.g.
/// `list<T>` extending `collection<T>`. Argument types may reference the
/// child's type parameters.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct GenericParent {
    pub def: Arc<GenericDef>,
    pub args: Vec<Type>,
}

static NEXT_DEF_ID: AtomicU64 = AtomicU64::new(1);

/// A generic (or plain, when `params` is empty) type definition.
/// Identity-unique, like [`TypeParam`].
#[derive(Debug)]
pub struct GenericDef {
    id: u64,
    pub name: String,
    pub params: Vec<Arc<TypeParam>>,
    pub parent: Option<GenericParent>,
    /// Types accepted by this definition via conversion, e.g. `int64`
    /// converting from `int32`.
    pub conversions: Vec<Type>,
}

impl GenericDef {
    pub fn new(
        name: impl Into<String>,
        params: Vec<Arc<TypeParam>>,
        parent: Option<GenericParent>,
        conversions: Vec<Type>,
    ) -> Arc<GenericDef> {
        let id = NEXT_DEF_ID.fetch_add(1, Ordering::Relaxed);
        Arc::new(GenericDef { id, name: name.into(), params, parent, conversions })
    }

    /// A definition with no parameters, parent or conversions.
    pub fn simple(name: impl Into<String>) -> Arc<GenericDef> {
        GenericDef::new(name, Vec::new(), None, Vec::new())
    }

    /// Builds the instantiation of this definition with the given arguments,
    /// assuming the argument count is right. Arguments of variance-declared
    /// parameters are canonicalized to their one relevant bound, so
    /// `supplier<-int>` and `supplier<int>` are the same type.
    pub fn make_type(self: &Arc<Self>, args: TypeArgs) -> Type {
        debug_assert_eq!(args.len(), self.params.len());
        let args: TypeArgs = self
            .params
            .iter()
            .zip(args)
            .map(|(p, a)| match p.variance {
                Variance::None => a,
                Variance::In => TypeSet::One(a.canonical_in_type()),
                Variance::Out => TypeSet::One(a.canonical_out_type()),
            })
            .collect();
        Type::Generic(Arc::new(GenericType { def: self.clone(), args }))
    }

    /// Checked instantiation: verifies the argument count and the parameter
    /// bounds through the whole parent chain.
    pub fn instantiate(self: &Arc<Self>, args: TypeArgs) -> Result<Type, TypeError> {
        if args.len() != self.params.len() {
            return Err(TypeError::ArgCount {
                type_name: self.name.clone(),
                expected: self.params.len(),
                actual: args.len(),
            });
        }
        let ty = self.make_type(args);
        ty.validate()?;
        Ok(ty)
    }

    /// Verifies that each argument satisfies the bounds of its parameter.
    /// The full wildcard is always accepted; it is implicitly intersected
    /// with the declared bounds.
    pub fn check_type_args(self: &Arc<Self>, args: &TypeArgs) -> Result<(), TypeError> {
        if args.len() != self.params.len() {
            return Err(TypeError::ArgCount {
                type_name: self.name.clone(),
                expected: self.params.len(),
                actual: args.len(),
            });
        }
        for (param, arg) in self.params.iter().zip(args.iter()) {
            if *arg == TypeSet::All {
                continue;
            }
            if !param.bounds.is_super_set_of(arg) {
                return Err(TypeError::ParamBounds {
                    type_name: self.name.clone(),
                    param: param.name.clone(),
                    bound: param.bounds.to_string(),
                    arg: arg.to_string(),
                });
            }
        }
        Ok(())
    }
}

impl PartialEq for GenericDef {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for GenericDef {}

impl std::hash::Hash for GenericDef {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl fmt::Display for GenericDef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)?;
        if !self.params.is_empty() {
            write!(f, "<")?;
            for (i, p) in self.params.iter().enumerate() {
                if i > 0 {
                    write!(f, ",")?;
                }
                write!(f, "{p}")?;
            }
            write!(f, ">")?;
        }
        Ok(())
    }
}
