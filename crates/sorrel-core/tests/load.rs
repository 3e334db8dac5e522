use sorrel_core::ast::Node;
use sorrel_core::env::Env;
use sorrel_core::load_source;

fn load(src: &str) -> Node {
    let env = Env::session(false);
    load_source(src, &env).unwrap_or_else(|err| panic!("load failed for {:?}: {}", src, err))
}

#[test]
fn defs_resolve_out_of_source_order() {
    assert_eq!(
        load("(def a (+ b 1)) (+ a b) (def b 3)"),
        Node::number(7.0)
    );
}

#[test]
fn defns_participate_like_defs() {
    let src = "(defn add-two [x] (inc (inc x))) \
               (def seven (add-two five)) \
               (def five 5) \
               seven";
    assert_eq!(load(src), Node::number(7.0));
}

#[test]
fn a_macro_defined_later_unblocks_its_users() {
    let src = "(def result (yield-foo)) \
               (defmacro yield-foo [] \"foo\") \
               result";
    assert_eq!(load(src), Node::string("foo"));
}

#[test]
fn defs_alone_load_to_nil() {
    assert_eq!(load("(def a 1)"), Node::nil());
    assert_eq!(load(""), Node::nil());
}

#[test]
fn body_forms_run_in_source_order() {
    // Both defs are immediately ready; elimination keeps source order,
    // so the later one wins in a session that allows redefinition.
    let env = Env::session(true);
    assert_eq!(
        load_source("(def n 1) (def n 2) n", &env).unwrap(),
        Node::number(2.0)
    );
}

#[test]
fn cycles_name_every_stuck_def() {
    let env = Env::session(false);
    let err = load_source("(def a b) (def b a)", &env)
        .unwrap_err()
        .to_string();
    assert!(err.contains("cyclic dependency detected"), "got: {}", err);
    assert!(err.contains("a depends on [b]"), "got: {}", err);
    assert!(err.contains("b depends on [a]"), "got: {}", err);
}

#[test]
fn quoted_names_are_not_dependencies() {
    assert_eq!(load("(def a '(b c)) (count a)"), Node::number(2.0));
}

#[test]
fn fn_parameters_do_not_count_as_dependencies() {
    // `x` is only ever a parameter; nothing here is stuck on it.
    assert_eq!(
        load("(def f (fn [x] (+ x base))) (def base 10) (f 1)"),
        Node::number(11.0)
    );
}
