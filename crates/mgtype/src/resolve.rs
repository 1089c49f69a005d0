//! Type argument inference.
//!
//! Matching a declared parameter type against an actual argument type walks
//! both types in lockstep and records, for every type parameter encountered
//! on the declared side, what the corresponding actual type is and how the
//! two must relate. [`TypeParamsResolver`] gathers those constraints and then
//! solves each parameter in declaration order, so a parameter's bounds may
//! reference parameters declared before it.

use crate::def::{TypeParam, TypeParamMap};
use crate::subtype::{MatchSuperRel, TypeMatchEqualHandler, TypeMatchSuperHandler};
use crate::type_set::TypeSet;
use crate::types::Type;
use indexmap::{IndexMap, IndexSet};
use std::sync::Arc;
use tracing::trace;

/// How an inferred type argument must relate to a recorded actual type.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum MatchRelation {
    Equal,
    /// The argument must be a supertype of the recorded type.
    Super,
    /// The argument must be a subtype of the recorded type.
    Sub,
    /// The recorded type must be convertible to the argument.
    Convert,
}

/// One constraint recorded for a type parameter.
#[derive(Clone, PartialEq, Eq, Hash, Debug)]
pub struct TypeParamMatch {
    pub ty: Type,
    pub rel: MatchRelation,
}

type MatchSink<'a> = dyn FnMut(&Arc<TypeParam>, &Type, MatchRelation) + 'a;

// ===========================================================================
// Constraint collection
// ===========================================================================

/// Walk handler that intercepts type parameters on the declared (left) side
/// and records a constraint instead of comparing. Everything else re-enters
/// the walkers; `Sub` obligations flip the walk direction, so declared-side
/// parameters showing up on the right are flipped back before recording.
struct ParamCollectHandler<'a, 'b> {
    sink: &'a mut MatchSink<'b>,
}

impl TypeMatchSuperHandler for ParamCollectHandler<'_, '_> {
    fn handle(&mut self, t1: &Type, t2: &Type, rel: MatchSuperRel) -> bool {
        if let Type::Param(p) = t1 {
            let mrel = match rel {
                MatchSuperRel::Equal => MatchRelation::Equal,
                MatchSuperRel::Super => MatchRelation::Super,
                MatchSuperRel::Sub => MatchRelation::Sub,
            };
            (self.sink)(p, t2, mrel);
            return true;
        }
        match rel {
            MatchSuperRel::Equal => t1.match_type_equal(t2, &mut EqualAdapter(self)),
            MatchSuperRel::Super => t1.match_type_super(t2, self),
            MatchSuperRel::Sub => t2.match_type_super(t1, &mut FlipHandler(self)),
        }
    }
}

/// Swaps arguments and inverts the relation before delegating, keeping the
/// declared side logically on the left.
struct FlipHandler<'a>(&'a mut dyn TypeMatchSuperHandler);

impl TypeMatchSuperHandler for FlipHandler<'_> {
    fn handle(&mut self, t1: &Type, t2: &Type, rel: MatchSuperRel) -> bool {
        self.0.handle(t2, t1, rel.invert())
    }
}

/// Routes equality decomposition back into a super-match handler.
struct EqualAdapter<'a>(&'a mut dyn TypeMatchSuperHandler);

impl TypeMatchEqualHandler for EqualAdapter<'_> {
    fn handle(&mut self, t1: &Type, t2: &Type) -> bool {
        self.0.handle(t1, t2, MatchSuperRel::Equal)
    }
}

/// Matches a declared parameter type against an actual argument type,
/// reporting type parameter constraints to `sink`. A top-level parameter
/// accepts the argument by conversion; elsewhere the structural walk decides,
/// with a conversion check as the last resort.
fn match_type_params_in(decl: &Type, arg: &Type, sink: &mut MatchSink<'_>) -> bool {
    match decl {
        Type::Param(p) => {
            sink(p, arg, MatchRelation::Convert);
            true
        }
        Type::Nullable(inner) => {
            if *arg == Type::Null {
                if let Type::Param(p) = &**inner {
                    sink(p, &Type::Null, MatchRelation::Convert);
                }
                true
            } else {
                match_type_params_in(inner, arg.strip_nullable(), sink)
            }
        }
        _ => {
            let mut h = ParamCollectHandler { sink };
            if decl.match_type_super(arg, &mut h) {
                true
            } else {
                decl.get_conversion(arg).is_some()
            }
        }
    }
}

/// Matches a declared result type against an expected type, reporting
/// constraints: the declared type must be a subtype of what is expected.
fn match_type_params_out(decl: &Type, expected: &Type, sink: &mut MatchSink<'_>) -> bool {
    let mut h = ParamCollectHandler { sink };
    h.handle(decl, expected, MatchSuperRel::Sub)
}

// ===========================================================================
// Resolver
// ===========================================================================

/// Collects constraints for a set of type parameters and solves them.
pub struct TypeParamsResolver {
    params: Vec<Arc<TypeParam>>,
    refs: IndexMap<Arc<TypeParam>, IndexSet<TypeParamMatch>>,
}

impl TypeParamsResolver {
    pub fn new(params: Vec<Arc<TypeParam>>) -> TypeParamsResolver {
        let refs = params.iter().map(|p| (p.clone(), IndexSet::new())).collect();
        TypeParamsResolver { params, refs }
    }

    /// Convenience entry point: infers the parameters from a single
    /// pattern/actual type pair.
    pub fn resolve_type_params(
        type_params: Vec<Arc<TypeParam>>,
        pattern: &Type,
        actual: &Type,
    ) -> Option<IndexMap<Arc<TypeParam>, Type>> {
        let mut resolver = TypeParamsResolver::new(type_params);
        if !resolver.match_type_params_in(pattern, actual) {
            return None;
        }
        resolver.resolve()
    }

    pub fn all_params_matched(&self) -> bool {
        self.params
            .iter()
            .all(|p| self.refs.get(p).is_some_and(|s| !s.is_empty()))
    }

    pub fn match_type_params_in(&mut self, decl: &Type, arg: &Type) -> bool {
        let refs = &mut self.refs;
        let mut sink = |p: &Arc<TypeParam>, ty: &Type, rel: MatchRelation| {
            if let Some(set) = refs.get_mut(p) {
                set.insert(TypeParamMatch { ty: ty.clone(), rel });
            }
        };
        match_type_params_in(decl, arg, &mut sink)
    }

    /// Records a constraint directly, bypassing the structural walk.
    pub fn add_match(&mut self, param: &Arc<TypeParam>, ty: Type, rel: MatchRelation) {
        if let Some(set) = self.refs.get_mut(param) {
            set.insert(TypeParamMatch { ty, rel });
        }
    }

    pub fn match_type_params_out(&mut self, decl: &Type, expected: &Type) -> bool {
        let refs = &mut self.refs;
        let mut sink = |p: &Arc<TypeParam>, ty: &Type, rel: MatchRelation| {
            if let Some(set) = refs.get_mut(p) {
                set.insert(TypeParamMatch { ty: ty.clone(), rel });
            }
        };
        match_type_params_out(decl, expected, &mut sink)
    }

    /// Solves the collected constraints. Parameters with no constraints stay
    /// unresolved and are absent from the result; any contradiction fails the
    /// whole resolution.
    pub fn resolve(&self) -> Option<IndexMap<Arc<TypeParam>, Type>> {
        let mut resolved: IndexMap<Arc<TypeParam>, Type> = IndexMap::new();
        let mut resolved_sets = TypeParamMap::new();

        for param in &self.params {
            let refs = &self.refs[param];
            if refs.is_empty() {
                continue;
            }

            let bounds = param.bounds.replace_params(&resolved_sets, true);
            let ty = resolve_single_param(&bounds, refs)?;
            trace!(param = %param.name, ty = %ty, "resolved type parameter");

            resolved.insert(param.clone(), ty.clone());
            resolved_sets.insert(param.clone(), TypeSet::One(ty));
        }

        // Bounds may reference other type params (e.g. T:collection<R>), so
        // every binding is re-checked against the fully substituted bounds.
        let full_sets: TypeParamMap = resolved
            .iter()
            .map(|(k, v)| (k.clone(), TypeSet::One(v.clone())))
            .collect();
        for param in &self.params {
            if let Some(ty) = resolved.get(param) {
                let bounds = param.bounds.replace_params(&full_sets, false);
                if !bounds.contains(ty) {
                    return None;
                }
            }
        }

        Some(resolved)
    }
}

// ===========================================================================
// Single-parameter solver
// ===========================================================================

struct TypeBounds {
    lower: Option<Type>,
    upper: Option<Type>,
}

fn resolve_single_param(bound_set: &TypeSet, refs: &IndexSet<TypeParamMatch>) -> Option<Type> {
    let mut equals = Vec::new();
    let mut subs = Vec::new();
    let mut supers = Vec::new();
    let mut converts = Vec::new();

    for r in refs {
        let list = match r.rel {
            MatchRelation::Equal => &mut equals,
            MatchRelation::Sub => &mut subs,
            MatchRelation::Super => &mut supers,
            MatchRelation::Convert => &mut converts,
        };
        list.push(r.ty.clone());
    }

    let bounds = get_bounds(bound_set, &supers, &subs)?;

    if !equals.is_empty() {
        resolve_equal(&bounds, &equals, &converts)
    } else if !converts.is_empty() {
        resolve_convert(&bounds, &converts)
    } else {
        bounds.lower.or(bounds.upper)
    }
}

/// Combines the declared bound set with the super/sub constraints: all lower
/// bounds are joined, all upper bounds are met, and the two must agree.
fn get_bounds(bound_set: &TypeSet, supers: &[Type], subs: &[Type]) -> Option<TypeBounds> {
    let lower = common_type(bound_set.sub_type().cloned(), supers, |a, b| {
        a.common_super_type(b)
    })?;
    let upper = common_type(bound_set.super_type().cloned(), subs, |a, b| {
        a.common_sub_type(b)
    })?;

    if let (Some(l), Some(u)) = (&lower, &upper) {
        if !u.is_super_type_of(l) {
            return None;
        }
    }

    Some(TypeBounds { lower, upper })
}

fn resolve_equal(bounds: &TypeBounds, equals: &[Type], converts: &[Type]) -> Option<Type> {
    if equals.len() > 1 {
        return None;
    }
    let arg = &equals[0];
    if !in_bounds(arg, bounds) {
        return None;
    }
    for ty in converts {
        arg.get_conversion(ty)?;
    }
    Some(arg.clone())
}

fn resolve_convert(bounds: &TypeBounds, converts: &[Type]) -> Option<Type> {
    let common = common_type(bounds.lower.clone(), converts, |a, b| a.common_super_type(b));
    if let Some(Some(c)) = common {
        if in_bounds(&c, bounds) {
            return Some(c);
        }
    }

    let res = resolve_convert_search(bounds, converts)?;
    if in_bounds(&res, bounds) { Some(res) } else { None }
}

/// No common supertype exists, so look for a single type every constraint
/// converts to: among the constraints themselves, then the bounds, then
/// pairwise conversion types.
fn resolve_convert_search(bounds: &TypeBounds, converts: &[Type]) -> Option<Type> {
    let candidates: Vec<Type> = converts
        .iter()
        .filter(|t| is_convert_candidate(t, bounds, converts))
        .cloned()
        .collect();
    if candidates.len() == 1 {
        return Some(candidates[0].clone());
    } else if candidates.len() > 1 {
        return resolve_convert_common(bounds, None, &candidates);
    }

    let bounds_list: Vec<Type> = [bounds.lower.clone(), bounds.upper.clone()]
        .into_iter()
        .flatten()
        .collect();

    let mut res = bounds_list
        .iter()
        .find(|t| is_convert_candidate(t, bounds, converts))
        .cloned();

    if res.is_none() {
        res = resolve_convert_common(bounds, None, converts);
    }
    if res.is_none() {
        res = bounds_list
            .iter()
            .find_map(|t| resolve_convert_common(bounds, Some(t.clone()), converts));
    }

    res
}

fn is_convert_candidate(ty: &Type, bounds: &TypeBounds, converts: &[Type]) -> bool {
    in_bounds(ty, bounds) && converts.iter().all(|c| ty.get_conversion(c).is_some())
}

fn resolve_convert_common(bounds: &TypeBounds, first: Option<Type>, types: &[Type]) -> Option<Type> {
    let res = common_type(first, types, |a, b| a.common_conversion_type(b))
        .flatten()?;
    if in_bounds(&res, bounds) { Some(res) } else { None }
}

fn in_bounds(ty: &Type, bounds: &TypeBounds) -> bool {
    bounds.lower.as_ref().is_none_or(|l| ty.is_super_type_of(l))
        && bounds.upper.as_ref().is_none_or(|u| u.is_super_type_of(ty))
}

/// Folds `types` over `op`, starting from an optional seed. The outer
/// `Option` distinguishes failure from an empty fold.
fn common_type(
    first: Option<Type>,
    types: &[Type],
    op: impl Fn(&Type, &Type) -> Option<Type>,
) -> Option<Option<Type>> {
    let mut common = first;
    for ty in types {
        common = Some(match common {
            None => ty.clone(),
            Some(c) => op(&c, ty)?,
        });
    }
    Some(common)
}
