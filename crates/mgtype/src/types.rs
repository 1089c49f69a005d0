//! The type model.
//!
//! A [`Type`] is an immutable value; composite types share their components
//! through [`Arc`]. The variants are:
//!
//! | Variant      | Rendered          | Meaning                                    |
//! |--------------|-------------------|--------------------------------------------|
//! | `Anything`   | `anything`        | top: supertype of every type               |
//! | `Nothing`    | `nothing`         | bottom: subtype of every type              |
//! | `Any`        | `any`             | supertype of all non-nullable value types  |
//! | `Null`       | `null`            | the type of the null value                 |
//! | `Nullable`   | `T?`              | `T` or null                                |
//! | `Tuple`      | `(a,b)`           | fixed fields, optionally named             |
//! | `Function`   | `(a,b)->r`        | contravariant params, covariant result     |
//! | `Generic`    | `list<int>`       | instantiation of a [`GenericDef`]          |
//! | `Param`      | `T`               | reference to a type parameter              |
//! | `Capture`    | `CAP<-int>`       | captured wildcard, identity-unique         |
//!
//! Equality is structural, except for `Param` and `Capture`, which compare by
//! identity (two separately created parameters with the same name are
//! different types).

use crate::def::{GenericDef, TypeParam, TypeParamMap};
use crate::error::TypeError;
use crate::type_set::TypeSet;
use indexmap::IndexSet;
use smallvec::SmallVec;
use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

/// Type arguments of a generic type instantiation.
pub type TypeArgs = SmallVec<[TypeSet; 2]>;

#[derive(Clone, PartialEq, Eq, Hash, Debug)]
pub enum Type {
    Anything,
    Nothing,
    Any,
    Null,
    Nullable(Arc<Type>),
    Tuple(Arc<TupleType>),
    Function(Arc<FunctionType>),
    Generic(Arc<GenericType>),
    Param(Arc<TypeParam>),
    Capture(Arc<CaptureType>),
}

#[derive(Clone, PartialEq, Eq, Hash, Debug)]
pub struct TupleField {
    pub name: Option<String>,
    pub ty: Type,
}

#[derive(Clone, PartialEq, Eq, Hash, Debug)]
pub struct TupleType {
    pub fields: Vec<TupleField>,
}

#[derive(Clone, PartialEq, Eq, Hash, Debug)]
pub struct FunctionType {
    pub params: Vec<Type>,
    pub result: Type,
}

#[derive(Clone, PartialEq, Eq, Hash, Debug)]
pub struct GenericType {
    pub def: Arc<GenericDef>,
    pub args: TypeArgs,
}

/// A captured wildcard. Each capture conversion mints a fresh instance;
/// captures are equal only to themselves.
#[derive(Debug)]
pub struct CaptureType {
    id: u64,
    pub bound: TypeSet,
}

static NEXT_CAPTURE_ID: AtomicU64 = AtomicU64::new(1);

impl CaptureType {
    pub(crate) fn fresh(bound: TypeSet) -> Arc<CaptureType> {
        let id = NEXT_CAPTURE_ID.fetch_add(1, Ordering::Relaxed);
        Arc::new(CaptureType { id, bound })
    }

    pub fn id(&self) -> u64 {
        self.id
    }
}

impl PartialEq for CaptureType {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for CaptureType {}

impl std::hash::Hash for CaptureType {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

// ===========================================================================
// Construction
// ===========================================================================

impl Type {
    /// The nullable counterpart of a type. Normalizes degenerate cases:
    /// `anything? == anything`, `null? == null`, `nothing? == null` and
    /// nullable types stay as they are.
    pub fn nullable(value: Type) -> Type {
        match value {
            Type::Anything => Type::Anything,
            Type::Nothing | Type::Null => Type::Null,
            Type::Nullable(_) => value,
            _ => Type::Nullable(Arc::new(value)),
        }
    }

    pub fn tuple(fields: Vec<TupleField>) -> Type {
        Type::Tuple(Arc::new(TupleType { fields }))
    }

    pub fn tuple_unnamed(types: Vec<Type>) -> Type {
        let fields = types.into_iter().map(|ty| TupleField { name: None, ty }).collect();
        Type::tuple(fields)
    }

    pub fn function(params: Vec<Type>, result: Type) -> Type {
        Type::Function(Arc::new(FunctionType { params, result }))
    }

    pub fn param(param: Arc<TypeParam>) -> Type {
        Type::Param(param)
    }

    /// Mints a fresh capture type with the given bound.
    pub fn capture(bound: TypeSet) -> Type {
        Type::Capture(CaptureType::fresh(bound))
    }

    /// The value type of a nullable type, or the type itself.
    pub fn strip_nullable(&self) -> &Type {
        match self {
            Type::Nullable(v) => v,
            _ => self,
        }
    }
}

// ===========================================================================
// Generic type internals
// ===========================================================================

impl GenericType {
    /// The direct supertype, computed by substituting this type's arguments
    /// into the parent declaration of the definition.
    pub fn parent_type(&self) -> Option<Type> {
        let parent = self.def.parent.as_ref()?;
        let map = self.type_args_map();
        let args: TypeArgs = parent
            .args
            .iter()
            .map(|a| a.replace_params(&map, false).into_type_set())
            .collect();
        Some(parent.def.make_type(args))
    }

    /// Maps the definition's parameters to this instantiation's arguments.
    pub fn type_args_map(&self) -> TypeParamMap {
        self.def
            .params
            .iter()
            .cloned()
            .zip(self.args.iter().cloned())
            .collect()
    }
}

impl Type {
    pub fn generic(&self) -> Option<&Arc<GenericType>> {
        match self {
            Type::Generic(g) => Some(g),
            _ => None,
        }
    }

    /// The direct supertype of a generic type, if its definition has a parent.
    pub fn parent_type(&self) -> Option<Type> {
        match self {
            Type::Generic(g) => g.parent_type(),
            _ => None,
        }
    }

    /// This type followed by all its ancestors, nearest first.
    /// Empty for non-generic types.
    pub(crate) fn parent_chain(&self) -> Vec<Type> {
        let mut res = Vec::new();
        if let Type::Generic(_) = self {
            let mut cur = self.clone();
            loop {
                let next = cur.parent_type();
                res.push(cur);
                match next {
                    Some(t) => cur = t,
                    None => break,
                }
            }
        }
        res
    }

    /// The instantiation of `def` that this generic type inherits (possibly
    /// itself), or `None` when `def` is not an ancestor.
    pub(crate) fn corresponding_super_type(&self, def: &Arc<GenericDef>) -> Option<Type> {
        self.parent_chain().into_iter().find(|t| match t {
            Type::Generic(g) => g.def == *def,
            _ => false,
        })
    }

    /// Maps type parameters to arguments for a generic type.
    pub fn type_args_map(&self) -> Option<TypeParamMap> {
        match self {
            Type::Generic(g) => Some(g.type_args_map()),
            _ => None,
        }
    }
}

// ===========================================================================
// Wildcard capture
// ===========================================================================

impl Type {
    /// Converts wildcard arguments of a generic type into fresh captures.
    /// Only top-level arguments are captured; nested wildcards are left
    /// intact. Non-generic types are returned unchanged (nullable types
    /// capture their value type).
    pub fn capture_wildcards(&self) -> Type {
        match self {
            Type::Generic(g) => {
                let args: TypeArgs = g.args.iter().map(|a| a.capture_type_set()).collect();
                if args == g.args {
                    self.clone()
                } else {
                    g.def.make_type(args)
                }
            }
            Type::Nullable(v) => Type::nullable(v.capture_wildcards()),
            _ => self.clone(),
        }
    }
}

// ===========================================================================
// Type parameter collection
// ===========================================================================

impl Type {
    /// All type parameters referenced by this type.
    pub fn type_params(&self) -> IndexSet<Arc<TypeParam>> {
        let mut res = IndexSet::new();
        self.collect_type_params(&mut res);
        res
    }

    pub(crate) fn collect_type_params(&self, res: &mut IndexSet<Arc<TypeParam>>) {
        match self {
            Type::Anything | Type::Nothing | Type::Any | Type::Null => {}
            Type::Nullable(v) => v.collect_type_params(res),
            Type::Tuple(t) => {
                for f in &t.fields {
                    f.ty.collect_type_params(res);
                }
            }
            Type::Function(f) => {
                for p in &f.params {
                    p.collect_type_params(res);
                }
                f.result.collect_type_params(res);
            }
            Type::Generic(g) => {
                for a in &g.args {
                    a.collect_type_params(res);
                }
            }
            Type::Param(p) => {
                res.insert(p.clone());
            }
            Type::Capture(c) => c.bound.collect_type_params(res),
        }
    }
}

// ===========================================================================
// Validation
// ===========================================================================

impl Type {
    /// Checks that every generic instantiation inside this type satisfies the
    /// parameter bounds of its definition, through the whole parent chain.
    pub fn validate(&self) -> Result<(), TypeError> {
        match self {
            Type::Anything | Type::Nothing | Type::Any | Type::Null => Ok(()),
            Type::Nullable(v) => v.validate(),
            Type::Tuple(t) => {
                for f in &t.fields {
                    f.ty.validate()?;
                }
                Ok(())
            }
            Type::Function(f) => {
                for p in &f.params {
                    p.validate()?;
                }
                f.result.validate()
            }
            Type::Generic(g) => {
                for level in self.parent_chain() {
                    if let Type::Generic(lg) = &level {
                        lg.def.check_type_args(&lg.args)?;
                    }
                }
                for a in &g.args {
                    a.validate()?;
                }
                Ok(())
            }
            Type::Param(p) => p.bounds.validate(),
            Type::Capture(c) => c.bound.validate(),
        }
    }
}

// ===========================================================================
// Rendering
// ===========================================================================

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Type::Anything => write!(f, "anything"),
            Type::Nothing => write!(f, "nothing"),
            Type::Any => write!(f, "any"),
            Type::Null => write!(f, "null"),
            Type::Nullable(v) => match &**v {
                Type::Function(_) => write!(f, "({v})?"),
                _ => write!(f, "{v}?"),
            },
            Type::Tuple(t) => {
                write!(f, "(")?;
                for (i, field) in t.fields.iter().enumerate() {
                    if i > 0 {
                        write!(f, ",")?;
                    }
                    if let Some(name) = &field.name {
                        write!(f, "{name}:")?;
                    }
                    write!(f, "{}", field.ty)?;
                }
                write!(f, ")")
            }
            Type::Function(ft) => {
                write!(f, "(")?;
                for (i, p) in ft.params.iter().enumerate() {
                    if i > 0 {
                        write!(f, ",")?;
                    }
                    write!(f, "{p}")?;
                }
                write!(f, ")->{}", ft.result)
            }
            Type::Generic(g) => {
                write!(f, "{}", g.def.name)?;
                if !g.args.is_empty() {
                    write!(f, "<")?;
                    for (i, a) in g.args.iter().enumerate() {
                        if i > 0 {
                            write!(f, ",")?;
                        }
                        write!(f, "{a}")?;
                    }
                    write!(f, ">")?;
                }
                Ok(())
            }
            Type::Param(p) => write!(f, "{}", p.name),
            Type::Capture(c) => write!(f, "CAP<{}>", c.bound),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn nullable_normalization() {
        assert_eq!(Type::nullable(Type::Anything), Type::Anything);
        assert_eq!(Type::nullable(Type::Nothing), Type::Null);
        assert_eq!(Type::nullable(Type::Null), Type::Null);

        let t = Type::nullable(Type::Any);
        assert_eq!(Type::nullable(t.clone()), t);
        assert_eq!(t.to_string(), "any?");
    }

    #[test]
    fn capture_identity() {
        let a = Type::capture(TypeSet::sub_of(Type::Any));
        let b = Type::capture(TypeSet::sub_of(Type::Any));
        assert_eq!(a, a);
        assert_ne!(a, b);
    }
}
