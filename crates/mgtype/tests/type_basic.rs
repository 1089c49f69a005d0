//! Subtyping, join and meet over non-generic types.

mod common;

use common::*;

#[test]
fn rendering() {
    let scope = full_scope();
    for s in [
        "anything",
        "nothing",
        "any",
        "null",
        "int",
        "int?",
        "(int,text)",
        "(a:int,b:text)",
        "(int)->boolean",
        "()->unit",
        "(int,real)->num",
        "list<int>",
        "list<-int>",
        "list<+int>",
        "list<*>",
        "map<text,int>",
    ] {
        assert_eq!(t(&scope, s).to_string(), s);
    }
}

#[test]
fn nullable_function_rendering() {
    let scope = full_scope();
    assert_eq!(t(&scope, "((int)->unit)?").to_string(), "((int)->unit)?");
    assert_eq!(t(&scope, "list<int>?").to_string(), "list<int>?");
}

#[test]
fn unnamed_tuple_constructor() {
    let scope = full_scope();
    let ty = mgtype::Type::tuple_unnamed(vec![t(&scope, "int"), t(&scope, "text")]);
    assert_eq!(ty.to_string(), "(int,text)");
    assert_eq!(ty, t(&scope, "(int,text)"));
}

#[test]
fn super_type_of_basic() {
    let scope = full_scope();
    assert_super_of(&scope, "num", &["int", "int32", "int64", "real", "real32", "real64"]);
    assert_super_of(&scope, "int", &["int32", "int64"]);
    assert_super_of(&scope, "real", &["real32", "real64"]);

    let other = ["str", "bool", "list<num>", "list<int>"];
    for ty in ["num", "int", "real", "int32", "int64", "real32", "real64"] {
        assert_unrelated(&scope, ty, &other);
    }
}

#[test]
fn super_type_of_nothing() {
    let scope = full_scope();
    assert_sub_of(
        &scope,
        "nothing",
        &["num", "int", "real", "int32", "int64", "real32", "real64"],
    );
    assert_sub_of(
        &scope,
        "nothing",
        &["data<int>", "data<real>", "data<*>", "data<nothing>", "data<anything>"],
    );
    assert_sub_of(&scope, "nothing", &["(int)->real", "()->real", "(int,real)->num"]);
    assert_sub_of(&scope, "nothing", &["anything"]);
}

#[test]
fn super_type_of_param() {
    let (scope, _) = scope_with_params(&["A", "B:-int", "C:+int"]);

    assert_sub_of(&scope, "A", &["anything"]);
    assert_super_of(&scope, "A", &["nothing"]);
    assert_unrelated(&scope, "A", &["int", "int32", "real"]);

    assert_sub_of(&scope, "B", &["anything", "num", "int"]);
    assert_super_of(&scope, "B", &["nothing"]);
    assert_unrelated(&scope, "B", &["int32", "int64", "real"]);

    assert_sub_of(&scope, "C", &["anything"]);
    assert_super_of(&scope, "C", &["nothing", "int", "int32", "int64"]);
    assert_unrelated(&scope, "C", &["num", "real", "real32", "real64"]);
}

#[test]
fn super_type_of_any() {
    let (scope, _) = scope_with_params(&["A", "B:-int", "C:+int"]);

    assert_sub_of(&scope, "any", &["anything"]);
    assert_super_of(
        &scope,
        "any",
        &["num", "int", "real", "int32", "int64", "real32", "real64"],
    );
    assert_super_of(&scope, "any", &["CAP<-num>", "CAP<-int>", "CAP<-real>", "CAP<-any>"]);
    assert_sub_of(&scope, "any", &["CAP<+any>"]);
    assert_unrelated(&scope, "any", &["CAP<+num>", "CAP<+int>", "CAP<+int32>", "CAP<*>"]);
    assert_super_of(&scope, "any", &["B"]);
    assert_unrelated(&scope, "any", &["A", "C"]);

    assert_unrelated(&scope, "any", &["null", "int?"]);
    assert_sub_of(&scope, "any", &["any?"]);
}

#[test]
fn super_type_of_nullable() {
    let scope = full_scope();
    assert_super_of(&scope, "int?", &["int", "null", "int32?", "int32", "nothing"]);
    assert_sub_of(&scope, "int?", &["num?", "anything"]);
    assert_unrelated(&scope, "int?", &["num", "real?", "str?"]);
}

#[test]
fn super_type_of_tuple() {
    let scope = full_scope();
    assert_super_of(&scope, "(num,num)", &["(int,int)", "(int,real)", "(num,int)"]);
    assert_unrelated(&scope, "(num,num)", &["(int,int,int)", "(int)", "(a:int,b:int)"]);
    assert_super_of(&scope, "(a:num,b:num)", &["(a:int,b:int)"]);
}

#[test]
fn super_type_of_function() {
    let scope = full_scope();
    assert_super_of(
        &scope,
        "(int)->num",
        &["(int)->int", "(num)->num", "(num)->int", "(int)->nothing"],
    );
    assert_unrelated(&scope, "(int)->num", &["(int32)->num", "(int,int)->num", "()->num"]);
}

#[test]
fn common_super_type() {
    let scope = full_scope();
    assert_eq!(join(&scope, "int", "int"), "int");
    assert_eq!(join(&scope, "int", "num"), "num");
    assert_eq!(join(&scope, "int32", "num"), "num");
    assert_eq!(join(&scope, "int32", "real64"), "num");
    assert_eq!(join(&scope, "int", "str"), "n/a");
    assert_eq!(join(&scope, "int", "any"), "any");
}

#[test]
fn common_super_type_nullable() {
    let scope = full_scope();
    assert_eq!(join(&scope, "int", "null"), "int?");
    assert_eq!(join(&scope, "null", "int"), "int?");
    assert_eq!(join(&scope, "int?", "real"), "num?");
    assert_eq!(join(&scope, "int?", "real?"), "num?");
    assert_eq!(join(&scope, "int?", "str"), "n/a");
}

#[test]
fn common_super_type_tuple() {
    let scope = full_scope();
    assert_eq!(join(&scope, "(int,num)", "(num,int)"), "(num,num)");
    assert_eq!(join(&scope, "(int,str)", "(real,str)"), "(num,str)");
    assert_eq!(join(&scope, "(a:int)", "(a:real)"), "(a:num)");
    assert_eq!(join(&scope, "(a:int)", "(b:int)"), "n/a");
    assert_eq!(join(&scope, "(int)", "(int,int)"), "n/a");
}

#[test]
fn common_super_type_function() {
    let scope = full_scope();
    assert_eq!(join(&scope, "(int)->int", "(int)->num"), "(int)->num");
    assert_eq!(join(&scope, "(int)->int", "(int)->int32"), "(int)->int");
    assert_eq!(join(&scope, "(int)->int", "(num)->int"), "(int)->int");
    assert_eq!(join(&scope, "(int)->int", "(int32)->int"), "(int32)->int");
    assert_eq!(join(&scope, "(int64)->int", "(int32)->int"), "(nothing)->int");
    assert_eq!(join(&scope, "(int)->int", "(int)->str"), "n/a");
}

#[test]
fn common_sub_type() {
    let scope = full_scope();
    assert_eq!(meet(&scope, "int", "int"), "int");
    assert_eq!(meet(&scope, "num", "int"), "int");
    assert_eq!(meet(&scope, "int", "int64"), "int64");
    assert_eq!(meet(&scope, "num", "int64"), "int64");
    assert_eq!(meet(&scope, "int", "real"), "n/a");
    assert_eq!(meet(&scope, "int32", "real64"), "n/a");
}

#[test]
fn common_sub_type_nullable() {
    let scope = full_scope();
    assert_eq!(meet(&scope, "int?", "num?"), "int?");
    assert_eq!(meet(&scope, "int?", "num"), "int");
    assert_eq!(meet(&scope, "num", "int?"), "int");
    assert_eq!(meet(&scope, "int?", "real"), "n/a");
}

#[test]
fn common_sub_type_function() {
    let scope = full_scope();
    assert_eq!(meet(&scope, "(int)->int", "(num)->int"), "(num)->int");
    assert_eq!(meet(&scope, "(int)->num", "(int)->int"), "(int)->int");
    assert_eq!(meet(&scope, "(int32)->int", "(int64)->int"), "(int)->int");
    assert_eq!(meet(&scope, "(int)->int", "(int)->real"), "n/a");
}
