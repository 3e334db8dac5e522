use sorrel_core::ast::Node;
use sorrel_core::env::Env;
use sorrel_core::eval_source;

fn eval(src: &str) -> Node {
    let env = Env::session(false);
    eval_source(src, &env).unwrap_or_else(|err| panic!("eval failed for {:?}: {}", src, err))
}

fn check(src: &str, expected: &str) {
    assert_eq!(eval(src), eval(expected), "for {}", src);
}

#[test]
fn sequences_bind_positionally() {
    check("((fn [[a b]] [a b]) '(1 2))", "[1 2]");
    check("((fn [[a b]] [a b]) [1 2])", "[1 2]");
    check("((fn [[[a b] c]] [a b c]) '((1 2) 3))", "[1 2 3]");
}

#[test]
fn strings_destructure_into_characters() {
    check("((fn [[a b]] [a b]) \"abc\")", "[\"a\" \"b\"]");
}

#[test]
fn missing_positions_bind_nil_and_surplus_is_dropped() {
    check("((fn [[a b c]] [a b c]) '(1))", "[1 nil nil]");
    check("((fn [[a]] a) '(1 2 3))", "1");
}

#[test]
fn rest_collects_a_list() {
    check("((fn [[a & r]] [a r]) '(1 2 3))", "[1 '(2 3)]");
    check("((fn [[a & r]] r) '(1))", "'()");
    // The rest pattern may itself destructure.
    check("((fn [[a & [b c]]] [a b c]) '(1 2))", "[1 2 nil]");
}

#[test]
fn underscore_discards() {
    check("((fn [[_ b]] b) '(1 2))", "2");
    check("((fn [_ b] b) 1 2)", "2");
}

#[test]
fn as_names_the_whole_value() {
    check("((fn [[a :as all]] [a all]) [1 2])", "[1 [1 2]]");
    check(
        "((fn [[x _ & xs :as all-xs]] [x xs all-xs]) '(1 2 3 4))",
        "[1 '(3 4) '(1 2 3 4)]",
    );
}

#[test]
fn maps_bind_by_key() {
    check("((fn [{x :x}] x) {:x 1})", "1");
    check("((fn [{x :x}] x) {:y 1})", "nil");
    check("((fn [{x :x :as m}] [x m]) {:x 1})", "[1 {:x 1}]");
}

#[test]
fn keys_binds_symbols_by_their_keyword() {
    check("((fn [{:keys [a b]}] [a b]) {:a 1 :b 2})", "[1 2]");
    check("((fn [{:keys [a c]}] [a c]) {:a 1})", "[1 nil]");
    check(
        "((fn [{:keys [a] y :b :as m}] [a y m]) {:a 1 :b 2})",
        "[1 2 {:a 1 :b 2}]",
    );
}

#[test]
fn map_patterns_nest() {
    check(
        "((fn [{{x :x1} :x0 [_ _ y] :y}] [x y]) {:x0 {:x1 5} :y [1 2 6]})",
        "[5 6]",
    );
}

#[test]
fn sequences_reinterpret_as_pairs_for_map_patterns() {
    // The :as binding sees the pair view, not a promoted map, so the
    // expected value is a quoted literal that never gets promoted.
    check(
        "((fn [{x :x :as m}] [x m]) [:x 1 :y 2])",
        "[1 '{:x 1 :y 2}]",
    );
}

#[test]
fn unmatchable_values_report_both_sides() {
    let env = Env::session(false);
    let err = eval_source("((fn [[a]] a) 5)", &env).unwrap_err().to_string();
    assert!(err.contains("could not destructure"), "got: {}", err);
    assert!(err.contains("5"), "got: {}", err);
}
