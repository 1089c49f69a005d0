//! Shared test scope and a small text syntax for types, sets and headers.
//!
//! The syntax mirrors the crate's rendering: `list<-int>`, `map<text,*>`,
//! `(int,text)`, `(a:int,b:text)`, `(int)->bool`, `int?`, and headers like
//! `<T:-num>(list<T>,@arity(ZERO_MANY) T):T`.

#![allow(dead_code)]

use indexmap::IndexMap;
use mgtype::{
    FunctionHeader, FunctionHeaderMatch, FunctionParam, GenericDef, GenericParent, ParamArity,
    Scope, ScopeBuilder, TupleField, Type, TypeArgs, TypeParam, TypeParamMap, TypeSet, Variance,
};
use std::sync::{Arc, Once};

// ===========================================================================
// Scope fixture
// ===========================================================================

static TRACING: Once = Once::new();

/// Routes the crate's `tracing` output to the test harness; filtered by
/// `RUST_LOG`.
fn init_tracing() {
    TRACING.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .with_test_writer()
            .try_init();
    });
}

pub fn full_scope_builder() -> ScopeBuilder {
    init_tracing();
    let mut b = Scope::builder();

    b.alias("anything", Type::Anything);
    b.alias("nothing", Type::Nothing);
    b.alias("any", Type::Any);
    b.alias("null", Type::Null);

    // machine numerics: num > int > int32/int64, num > real > real32/real64
    let num = b.simple_type("num");
    let int = b.simple_type_ex("int", Some(&num), vec![]);
    let real = b.simple_type_ex("real", Some(&num), vec![]);
    let int32 = b.simple_type_ex("int32", Some(&int), vec![]);
    let int64 = b.simple_type_ex("int64", Some(&int), vec![int32.clone()]);
    let real32 = b.simple_type_ex("real32", Some(&real), vec![int32.clone(), int64.clone()]);
    let _real64 = b.simple_type_ex("real64", Some(&real), vec![int32, int64, real32]);

    // language primitives with conversion-only relations
    b.simple_type("unit");
    b.simple_type("boolean");
    b.simple_type("text");
    b.simple_type("gtv");
    let integer = b.simple_type("integer");
    let big_integer = b.simple_type_ex("big_integer", None, vec![integer.clone()]);
    b.simple_type_ex("decimal", None, vec![integer, big_integer]);

    b.simple_type("str");
    b.simple_type("bool");
    let t_data = TypeParam::simple("T");
    b.generic_def(GenericDef::new("data", vec![t_data], None, vec![]));

    // collections: iterable > (array, collection), collection > (list, set)
    let t_it = TypeParam::simple("T");
    let iterable = b.generic_def(GenericDef::new("iterable", vec![t_it], None, vec![]));
    let t_ar = TypeParam::simple("T");
    b.generic_def(GenericDef::new(
        "array",
        vec![t_ar.clone()],
        Some(GenericParent { def: iterable.clone(), args: vec![Type::param(t_ar)] }),
        vec![],
    ));
    let t_co = TypeParam::simple("T");
    let collection = b.generic_def(GenericDef::new(
        "collection",
        vec![t_co.clone()],
        Some(GenericParent { def: iterable.clone(), args: vec![Type::param(t_co)] }),
        vec![],
    ));
    let t_li = TypeParam::simple("T");
    b.generic_def(GenericDef::new(
        "list",
        vec![t_li.clone()],
        Some(GenericParent { def: collection.clone(), args: vec![Type::param(t_li)] }),
        vec![],
    ));
    let t_se = TypeParam::simple("T");
    b.generic_def(GenericDef::new(
        "set",
        vec![t_se.clone()],
        Some(GenericParent { def: collection.clone(), args: vec![Type::param(t_se)] }),
        vec![],
    ));
    let k = TypeParam::simple("K");
    let v = TypeParam::simple("V");
    b.generic_def(GenericDef::new("map", vec![k, v], None, vec![]));

    // variance-declared definitions
    let t_su = TypeParam::new("T", Variance::Out, TypeSet::All);
    b.generic_def(GenericDef::new("supplier", vec![t_su], None, vec![]));
    let t_cn = TypeParam::new("T", Variance::In, TypeSet::All);
    b.generic_def(GenericDef::new("consumer", vec![t_cn], None, vec![]));

    b
}

pub fn full_scope() -> Scope {
    full_scope_builder().build()
}

/// A scope extended with type parameters declared as `"T"` or `"T:-int"`.
/// Bounds may reference parameters declared earlier in the list.
pub fn scope_with_params(decls: &[&str]) -> (Scope, Vec<Arc<TypeParam>>) {
    let mut b = full_scope_builder();
    let mut params = Vec::new();
    for d in decls {
        let (name, bounds) = match d.split_once(':') {
            Some((n, rest)) => (n, ts(&b.snapshot(), rest)),
            None => (*d, TypeSet::All),
        };
        let p = b.type_param(TypeParam::new(name, Variance::None, bounds));
        params.push(p);
    }
    (b.build(), params)
}

// ===========================================================================
// Parser
// ===========================================================================

pub struct Parser<'a> {
    scope: &'a Scope,
    locals: IndexMap<String, Arc<TypeParam>>,
    chars: Vec<char>,
    pos: usize,
}

impl<'a> Parser<'a> {
    pub fn new(scope: &'a Scope, text: &str) -> Parser<'a> {
        Parser { scope, locals: IndexMap::new(), chars: text.chars().collect(), pos: 0 }
    }

    pub fn with_locals(scope: &'a Scope, text: &str, params: &[Arc<TypeParam>]) -> Parser<'a> {
        let mut p = Parser::new(scope, text);
        for tp in params {
            p.locals.insert(tp.name.clone(), tp.clone());
        }
        p
    }

    fn skip_ws(&mut self) {
        while self.pos < self.chars.len() && self.chars[self.pos].is_whitespace() {
            self.pos += 1;
        }
    }

    fn peek(&mut self) -> Option<char> {
        self.skip_ws();
        self.chars.get(self.pos).copied()
    }

    fn eat(&mut self, c: char) -> bool {
        if self.peek() == Some(c) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn eat_str(&mut self, s: &str) -> bool {
        self.skip_ws();
        let chars: Vec<char> = s.chars().collect();
        if self.chars[self.pos..].starts_with(&chars) {
            self.pos += chars.len();
            true
        } else {
            false
        }
    }

    fn expect(&mut self, c: char) {
        assert!(self.eat(c), "expected '{c}' at {} in {:?}", self.pos, self.text());
    }

    fn text(&self) -> String {
        self.chars.iter().collect()
    }

    fn ident(&mut self) -> String {
        self.skip_ws();
        let start = self.pos;
        while self.pos < self.chars.len()
            && (self.chars[self.pos].is_alphanumeric() || self.chars[self.pos] == '_')
        {
            self.pos += 1;
        }
        assert!(self.pos > start, "expected identifier at {start} in {:?}", self.text());
        self.chars[start..self.pos].iter().collect()
    }

    pub fn parse_type(&mut self) -> Type {
        let mut ty = self.base_type();
        while self.eat('?') {
            ty = Type::nullable(ty);
        }
        ty
    }

    fn base_type(&mut self) -> Type {
        if self.eat('(') {
            let mut fields: Vec<TupleField> = Vec::new();
            if !self.eat(')') {
                loop {
                    let name = self.opt_name();
                    let ty = self.parse_type();
                    fields.push(TupleField { name, ty });
                    if !self.eat(',') {
                        break;
                    }
                }
                self.expect(')');
            }
            if self.eat_str("->") {
                let result = self.parse_type();
                let params = fields
                    .into_iter()
                    .map(|f| {
                        assert!(f.name.is_none(), "named function parameter in type");
                        f.ty
                    })
                    .collect();
                Type::function(params, result)
            } else if fields.len() == 1
                && fields[0].name.is_none()
                && matches!(fields[0].ty, Type::Function(_))
            {
                // `(F)` around a function type is grouping, as rendered for
                // nullable functions like `((int)->text)?`, not a one-field
                // tuple.
                fields.pop().unwrap().ty
            } else {
                Type::tuple(fields)
            }
        } else {
            let name = self.ident();
            if name == "CAP" {
                self.expect('<');
                let set = self.parse_type_set();
                self.expect('>');
                Type::capture(set)
            } else if self.peek() == Some('<') {
                self.expect('<');
                let mut args = TypeArgs::new();
                loop {
                    args.push(self.parse_type_set());
                    if !self.eat(',') {
                        break;
                    }
                }
                self.expect('>');
                let def = self
                    .scope
                    .get_def(&name)
                    .unwrap_or_else(|| panic!("unknown generic type '{name}'"))
                    .clone();
                def.instantiate(args).unwrap_or_else(|e| panic!("{e}"))
            } else if let Some(p) = self.locals.get(&name) {
                Type::param(p.clone())
            } else {
                self.scope.get_name_type(&name).unwrap_or_else(|e| panic!("{e}"))
            }
        }
    }

    /// `IDENT ':'` lookahead for named tuple fields and parameters.
    fn opt_name(&mut self) -> Option<String> {
        self.skip_ws();
        let save = self.pos;
        if self.chars.get(self.pos).is_some_and(|c| c.is_alphabetic() || *c == '_') {
            let id = self.ident();
            if self.eat(':') {
                return Some(id);
            }
            self.pos = save;
        }
        None
    }

    pub fn parse_type_set(&mut self) -> TypeSet {
        if self.eat('*') {
            TypeSet::All
        } else if self.eat('-') {
            TypeSet::sub_of(self.parse_type())
        } else if self.eat('+') {
            TypeSet::super_of(self.parse_type())
        } else {
            TypeSet::One(self.parse_type())
        }
    }

    pub fn parse_header(&mut self) -> FunctionHeader {
        let mut type_params = Vec::new();
        if self.eat('<') {
            loop {
                let name = self.ident();
                let bounds = if self.eat(':') { self.parse_type_set() } else { TypeSet::All };
                let p = TypeParam::new(name.clone(), Variance::None, bounds);
                self.locals.insert(name, p.clone());
                type_params.push(p);
                if !self.eat(',') {
                    break;
                }
            }
            self.expect('>');
        }
        self.expect('(');
        let mut params = Vec::new();
        if !self.eat(')') {
            loop {
                params.push(self.fn_param());
                if !self.eat(',') {
                    break;
                }
            }
            self.expect(')');
        }
        self.expect(':');
        let result = self.parse_type();
        FunctionHeader::new(type_params, result, params)
    }

    fn fn_param(&mut self) -> FunctionParam {
        let mut exact = false;
        let mut nullable = false;
        let mut arity = ParamArity::One;
        while self.eat('@') {
            match self.ident().as_str() {
                "exact" => exact = true,
                "nullable" => nullable = true,
                "arity" => {
                    self.expect('(');
                    arity = match self.ident().as_str() {
                        "ONE" => ParamArity::One,
                        "ZERO_ONE" => ParamArity::ZeroOne,
                        "ZERO_MANY" => ParamArity::ZeroMany,
                        "ONE_MANY" => ParamArity::OneMany,
                        other => panic!("unknown arity '{other}'"),
                    };
                    self.expect(')');
                }
                other => panic!("unknown parameter modifier '@{other}'"),
            }
        }
        let name = self.opt_name();
        let ty = self.parse_type();
        FunctionParam { name, ty, arity, exact, nullable }
    }
}

// ===========================================================================
// Shorthands
// ===========================================================================

pub fn t(scope: &Scope, s: &str) -> Type {
    Parser::new(scope, s).parse_type()
}

pub fn ts(scope: &Scope, s: &str) -> TypeSet {
    Parser::new(scope, s).parse_type_set()
}

pub fn fh(scope: &Scope, s: &str) -> FunctionHeader {
    Parser::new(scope, s).parse_header()
}

/// Parses a member function header with the definition's own type parameters
/// in scope.
pub fn member_fh(scope: &Scope, def: &Arc<GenericDef>, s: &str) -> FunctionHeader {
    Parser::with_locals(scope, s, &def.params).parse_header()
}

/// Splits on top-level commas, ignoring `<>`/`()` nesting and `->`.
pub fn split_top(s: &str) -> Vec<String> {
    let mut res = Vec::new();
    let mut depth = 0i32;
    let mut cur = String::new();
    let mut prev = '\0';
    for c in s.chars() {
        match c {
            '<' | '(' => depth += 1,
            '>' if prev != '-' => depth -= 1,
            ')' => depth -= 1,
            ',' if depth == 0 => {
                res.push(cur.trim().to_string());
                cur.clear();
                prev = c;
                continue;
            }
            _ => {}
        }
        cur.push(c);
        prev = c;
    }
    if !cur.trim().is_empty() {
        res.push(cur.trim().to_string());
    }
    res
}

// ===========================================================================
// Substitution helpers
// ===========================================================================

/// Parses `"T=-int,R=real"` into a substitution map over the given
/// parameters.
pub fn param_map(scope: &Scope, params: &[Arc<TypeParam>], s: &str) -> TypeParamMap {
    let mut map = TypeParamMap::new();
    for entry in split_top(s) {
        let (name, set) = entry.split_once('=').unwrap_or_else(|| panic!("bad entry {entry:?}"));
        let param = params
            .iter()
            .find(|p| p.name == name)
            .unwrap_or_else(|| panic!("unknown parameter '{name}'"));
        map.insert(param.clone(), ts(scope, set));
    }
    map
}

pub fn replace_raw(scope: &Scope, params: &[Arc<TypeParam>], ty: &str, map: &str) -> String {
    let m = param_map(scope, params, map);
    t(scope, ty).replace_params(&m, false).into_type().to_string()
}

pub fn replace_cap(scope: &Scope, params: &[Arc<TypeParam>], ty: &str, map: &str) -> String {
    let m = param_map(scope, params, map);
    t(scope, ty).replace_params(&m, true).into_type().to_string()
}

pub fn replace_in(scope: &Scope, params: &[Arc<TypeParam>], ty: &str, map: &str) -> String {
    let m = param_map(scope, params, map);
    t(scope, ty).replace_params_in(&m).to_string()
}

pub fn replace_out(scope: &Scope, params: &[Arc<TypeParam>], ty: &str, map: &str) -> String {
    let m = param_map(scope, params, map);
    t(scope, ty).replace_params_out(&m).to_string()
}

// ===========================================================================
// Assertions
// ===========================================================================

pub fn is_super(scope: &Scope, sup: &str, sub: &str) -> bool {
    t(scope, sup).is_super_type_of(&t(scope, sub))
}

/// Asserts that `sup` is a strict supertype of every listed type.
pub fn assert_super_of(scope: &Scope, sup: &str, subs: &[&str]) {
    for sub in subs {
        assert!(is_super(scope, sup, sub), "{sup} should be a supertype of {sub}");
        assert!(!is_super(scope, sub, sup), "{sub} should not be a supertype of {sup}");
    }
}

/// Asserts that every listed type is a strict supertype of `sub`.
pub fn assert_sub_of(scope: &Scope, sub: &str, supers: &[&str]) {
    for sup in supers {
        assert!(is_super(scope, sup, sub), "{sup} should be a supertype of {sub}");
        assert!(!is_super(scope, sub, sup), "{sub} should not be a supertype of {sup}");
    }
}

/// Asserts that `a` relates to none of the listed types in either direction.
pub fn assert_unrelated(scope: &Scope, a: &str, others: &[&str]) {
    for b in others {
        assert!(!is_super(scope, a, b), "{a} should not be a supertype of {b}");
        assert!(!is_super(scope, b, a), "{b} should not be a supertype of {a}");
    }
}

pub fn join(scope: &Scope, a: &str, b: &str) -> String {
    render_opt(t(scope, a).common_super_type(&t(scope, b)))
}

pub fn meet(scope: &Scope, a: &str, b: &str) -> String {
    render_opt(t(scope, a).common_sub_type(&t(scope, b)))
}

pub fn render_opt(ty: Option<Type>) -> String {
    match ty {
        Some(t) => t.to_string(),
        None => "n/a".to_string(),
    }
}

pub fn render_match(m: &FunctionHeaderMatch) -> String {
    let mut s = String::new();
    if !m.type_args.is_empty() {
        s.push('[');
        for (i, (name, ty)) in m.type_args.iter().enumerate() {
            if i > 0 {
                s.push(',');
            }
            s.push_str(&format!("{name}={ty}"));
        }
        s.push_str("] ");
    }
    s.push_str(&m.actual_header.to_string());
    s
}

/// Matches a call against a parsed header and renders the outcome:
/// `"n/a"` on no match, otherwise `"[T=...] (params):result"`.
pub fn match_call(
    scope: &Scope,
    header: &FunctionHeader,
    args: &str,
    expected_result: Option<&str>,
) -> String {
    let arg_types: Vec<Type> = split_top(args).iter().map(|a| t(scope, a)).collect();
    let Some(pm) = header.match_params(arg_types.len()) else {
        return "n/a".to_string();
    };
    let exp = expected_result.map(|s| t(scope, s));
    match pm.match_args(&arg_types, exp.as_ref()) {
        None => "n/a".to_string(),
        Some(m) => render_match(&m),
    }
}

pub fn check_global(scope: &Scope, header: &str, args: &str, expected: &str) {
    let h = fh(scope, header);
    assert_eq!(match_call(scope, &h, args, None), expected, "header: {header}, args: {args}");
}

pub fn check_global_res(scope: &Scope, header: &str, args: &str, res: &str, expected: &str) {
    let h = fh(scope, header);
    assert_eq!(
        match_call(scope, &h, args, Some(res)),
        expected,
        "header: {header}, args: {args}, expected result: {res}"
    );
}

/// Binds a member header to a receiver and matches a call against it.
pub fn check_member(scope: &Scope, receiver: &str, header: &str, args: &str, expected: &str) {
    let recv = t(scope, receiver);
    let def = recv
        .generic()
        .unwrap_or_else(|| panic!("receiver '{receiver}' is not generic"))
        .def
        .clone();
    let h = member_fh(scope, &def, header).bind_receiver(&recv);
    assert_eq!(
        match_call(scope, &h, args, None),
        expected,
        "receiver: {receiver}, header: {header}, args: {args}"
    );
}

/// Renders a member header bound to a receiver, without matching a call.
pub fn bound_member(scope: &Scope, receiver: &str, header: &str) -> String {
    let recv = t(scope, receiver);
    let def = recv
        .generic()
        .unwrap_or_else(|| panic!("receiver '{receiver}' is not generic"))
        .def
        .clone();
    member_fh(scope, &def, header).bind_receiver(&recv).to_string()
}
