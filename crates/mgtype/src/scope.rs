//! Named type scopes and declarative type construction.
//!
//! A [`Scope`] maps names to generic definitions, type aliases and type
//! parameters. [`TypeDecl`] is a small declarative AST for describing types
//! against a scope, so callers can build `map<text,list<-int>>` without
//! threading definition handles around.

use crate::def::{GenericDef, TypeParam};
use crate::error::TypeError;
use crate::type_set::TypeSet;
use crate::types::{TupleField, Type, TypeArgs};
use rustc_hash::FxHashMap;
use std::sync::Arc;

/// Declarative description of a type, resolved against a [`Scope`].
#[derive(Clone, PartialEq, Eq, Debug)]
pub enum TypeDecl {
    /// A plain name: a type parameter, an alias or a zero-parameter
    /// definition.
    Name(String),
    Nullable(Box<TypeDecl>),
    Tuple(Vec<(Option<String>, TypeDecl)>),
    Function(Vec<TypeDecl>, Box<TypeDecl>),
    Generic(String, Vec<TypeArgDecl>),
}

/// Declarative description of a type argument.
#[derive(Clone, PartialEq, Eq, Debug)]
pub enum TypeArgDecl {
    Exact(TypeDecl),
    SubOf(TypeDecl),
    SuperOf(TypeDecl),
    Wildcard,
}

impl TypeDecl {
    pub fn name(name: impl Into<String>) -> TypeDecl {
        TypeDecl::Name(name.into())
    }
}

// ===========================================================================
// Scope
// ===========================================================================

#[derive(Clone, Default)]
pub struct Scope {
    defs: FxHashMap<String, Arc<GenericDef>>,
    aliases: FxHashMap<String, Type>,
    params: FxHashMap<String, Arc<TypeParam>>,
}

impl Scope {
    pub fn builder() -> ScopeBuilder {
        ScopeBuilder { scope: Scope::default() }
    }

    pub fn get_def(&self, name: &str) -> Option<&Arc<GenericDef>> {
        self.defs.get(name)
    }

    pub fn get_param(&self, name: &str) -> Option<&Arc<TypeParam>> {
        self.params.get(name)
    }

    /// Resolves a name the way [`TypeDecl::Name`] does: type parameters
    /// first, then aliases, then zero-parameter definitions.
    pub fn get_name_type(&self, name: &str) -> Result<Type, TypeError> {
        if let Some(p) = self.params.get(name) {
            return Ok(Type::param(p.clone()));
        }
        if let Some(t) = self.aliases.get(name) {
            return Ok(t.clone());
        }
        if let Some(def) = self.defs.get(name) {
            return def.instantiate(TypeArgs::new());
        }
        Err(TypeError::UnknownType { name: name.to_string() })
    }

    pub fn get_type(&self, decl: &TypeDecl) -> Result<Type, TypeError> {
        match decl {
            TypeDecl::Name(name) => self.get_name_type(name),
            TypeDecl::Nullable(inner) => Ok(Type::nullable(self.get_type(inner)?)),
            TypeDecl::Tuple(fields) => {
                let fields = fields
                    .iter()
                    .map(|(name, d)| {
                        Ok(TupleField { name: name.clone(), ty: self.get_type(d)? })
                    })
                    .collect::<Result<Vec<_>, TypeError>>()?;
                Ok(Type::tuple(fields))
            }
            TypeDecl::Function(params, result) => {
                let params = params
                    .iter()
                    .map(|d| self.get_type(d))
                    .collect::<Result<Vec<_>, TypeError>>()?;
                Ok(Type::function(params, self.get_type(result)?))
            }
            TypeDecl::Generic(name, args) => {
                let def = self
                    .defs
                    .get(name)
                    .ok_or_else(|| TypeError::UnknownType { name: name.clone() })?;
                let args = args
                    .iter()
                    .map(|a| self.get_type_set(a))
                    .collect::<Result<TypeArgs, TypeError>>()?;
                def.instantiate(args)
            }
        }
    }

    pub fn get_type_set(&self, decl: &TypeArgDecl) -> Result<TypeSet, TypeError> {
        Ok(match decl {
            TypeArgDecl::Exact(d) => TypeSet::One(self.get_type(d)?),
            TypeArgDecl::SubOf(d) => TypeSet::sub_of(self.get_type(d)?),
            TypeArgDecl::SuperOf(d) => TypeSet::super_of(self.get_type(d)?),
            TypeArgDecl::Wildcard => TypeSet::All,
        })
    }
}

// ===========================================================================
// Builder
// ===========================================================================

pub struct ScopeBuilder {
    scope: Scope,
}

impl ScopeBuilder {
    /// Declares a zero-parameter type and returns it.
    pub fn simple_type(&mut self, name: &str) -> Type {
        self.simple_type_ex(name, None, Vec::new())
    }

    /// Declares a zero-parameter type with an optional supertype and a list
    /// of types it accepts by conversion.
    pub fn simple_type_ex(
        &mut self,
        name: &str,
        parent: Option<&Type>,
        conversions: Vec<Type>,
    ) -> Type {
        let parent = parent.map(|p| match p {
            Type::Generic(g) => crate::def::GenericParent {
                def: g.def.clone(),
                args: g.args.iter().map(|a| a.canonical_out_type()).collect(),
            },
            _ => panic!("parent of '{name}' is not a generic type"),
        });
        let def = GenericDef::new(name, Vec::new(), parent, conversions);
        self.scope.defs.insert(name.to_string(), def.clone());
        def.make_type(TypeArgs::new())
    }

    /// Registers a generic definition under its name.
    pub fn generic_def(&mut self, def: Arc<GenericDef>) -> Arc<GenericDef> {
        self.scope.defs.insert(def.name.clone(), def.clone());
        def
    }

    /// Registers a type alias.
    pub fn alias(&mut self, name: &str, ty: Type) {
        self.scope.aliases.insert(name.to_string(), ty);
    }

    /// Makes a type parameter referable by name in declarations.
    pub fn type_param(&mut self, param: Arc<TypeParam>) -> Arc<TypeParam> {
        self.scope.params.insert(param.name.clone(), param.clone());
        param
    }

    /// A copy of the scope as declared so far, usable while later
    /// declarations still reference it.
    pub fn snapshot(&self) -> Scope {
        self.scope.clone()
    }

    pub fn build(self) -> Scope {
        self.scope
    }
}
