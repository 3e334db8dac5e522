use sorrel_core::ast::Node;
use sorrel_core::env::Env;
use sorrel_core::{display_string, eval_source};

fn eval(src: &str) -> Node {
    let env = Env::session(false);
    eval_source(src, &env).unwrap_or_else(|err| panic!("eval failed for {:?}: {}", src, err))
}

fn eval_err(src: &str) -> String {
    let env = Env::session(false);
    eval_source(src, &env)
        .expect_err(&format!("expected an error for {:?}", src))
        .to_string()
}

#[test]
fn if_picks_the_branch() {
    assert_eq!(eval("(if true 1 2)"), Node::number(1.0));
    assert_eq!(eval("(if false 1 2)"), Node::number(2.0));
    assert_eq!(eval("(if false 1)"), Node::nil());
    // Only nil and false are falsy.
    assert_eq!(eval("(if 0 1 2)"), Node::number(1.0));
    assert_eq!(eval("(if \"\" 1 2)"), Node::number(1.0));
}

#[test]
fn def_then_use() {
    assert_eq!(eval("(def x 10) (+ x 5)"), Node::number(15.0));
}

#[test]
fn def_rejects_bad_calls() {
    assert!(eval_err("(def x)").contains("wrong number of arguments for def"));
    assert!(eval_err("(def \"x\" 1)").contains("symbol as the first argument"));
    assert!(eval_err("((fn [] (def y 1)))").contains("top level"));
    assert!(eval_err("(def x 1) (def x 2)").contains("must not redefine x"));
}

#[test]
fn redefinition_needs_a_loose_session() {
    let strict = Env::session(false);
    assert!(eval_source("(def x 1) (def x 2)", &strict).is_err());
    let loose = Env::session(true);
    assert_eq!(
        eval_source("(def x 1) (def x 2) x", &loose).unwrap(),
        Node::number(2.0)
    );
}

#[test]
fn unresolved_symbols_name_the_call() {
    let message = eval_err("(foo)");
    assert!(message.contains("could not resolve symbol 'foo'"));
    assert!(message.contains("(foo)"));
}

#[test]
fn non_callable_heads_error() {
    assert!(eval_err("(1 2)").contains("cannot use 1 as a function"));
}

#[test]
fn quote_returns_data() {
    assert_eq!(eval("'x"), Node::symbol("x"));
    assert_eq!(
        eval("'(+ 1 2)"),
        Node::list(vec![
            Node::symbol("+"),
            Node::number(1.0),
            Node::number(2.0)
        ])
    );
}

#[test]
fn arithmetic_and_comparisons() {
    assert_eq!(
        eval("(+ 10 (- 20 10) (* 5 2) (/ 20 2))"),
        Node::number(40.0)
    );
    assert_eq!(eval("(min 3 1 2)"), Node::number(1.0));
    assert_eq!(eval("(max 3 1 2)"), Node::number(3.0));
    assert_eq!(eval("(mod 10 3)"), Node::number(1.0));
    assert_eq!(eval("(< 1 2)"), Node::bool(true));
    assert_eq!(eval("(>= 2 3)"), Node::bool(false));
    assert_eq!(eval("(= [1 2] [1 2])"), Node::bool(true));
    assert_eq!(eval("(= 1 \"1\")"), Node::bool(false));
    assert!(eval_err("(mod 1 0)").contains("division by zero"));
    assert!(eval_err("(+ 1 \"a\")").contains("cannot convert \"a\" to number"));
}

#[test]
fn let_binds_in_order() {
    assert_eq!(eval("(let [x 1 y (+ x 1)] (+ x y))"), Node::number(3.0));
    assert_eq!(eval("(let [] 7)"), Node::number(7.0));
}

#[test]
fn let_accepts_patterns() {
    assert_eq!(
        eval("(let [[a b] '(1 2) {c :c} {:c 3}] (+ a b c))"),
        Node::number(6.0)
    );
}

#[test]
fn do_returns_the_last_form() {
    assert_eq!(eval("(do 1 2 3)"), Node::number(3.0));
    assert_eq!(eval("(do)"), Node::nil());
}

#[test]
fn when_and_cond() {
    assert_eq!(eval("(when true 1 2)"), Node::number(2.0));
    assert_eq!(eval("(when false 1)"), Node::nil());
    assert_eq!(eval("(cond false 1 nil 2 true 3)"), Node::number(3.0));
    assert_eq!(eval("(cond false 1)"), Node::nil());
    assert_eq!(eval("(cond)"), Node::nil());
}

#[test]
fn and_or_short_circuit() {
    assert_eq!(eval("(and)"), Node::bool(true));
    assert_eq!(eval("(and 1 2)"), Node::number(2.0));
    assert_eq!(eval("(and true false 3)"), Node::bool(false));
    assert_eq!(eval("(or)"), Node::nil());
    assert_eq!(eval("(or nil false 3)"), Node::number(3.0));
    // The unreached branch must never evaluate.
    assert_eq!(eval("(or 1 (throw \"no\"))"), Node::number(1.0));
    assert_eq!(eval("(and false (throw \"no\"))"), Node::bool(false));
}

#[test]
fn prelude_sequence_helpers() {
    assert_eq!(eval("(map inc '(1 2 3))"), eval("'(2 3 4)"));
    assert_eq!(eval("(filter (fn [x] (> x 1)) '(1 2 3))"), eval("'(2 3)"));
    assert_eq!(eval("(reduce + 0 '(1 2 3 4))"), Node::number(10.0));
    assert_eq!(eval("(vec '(1 2))"), eval("[1 2]"));
    assert_eq!(eval("(first [5 6])"), Node::number(5.0));
    assert_eq!(eval("(rest '(1))"), eval("'()"));
    assert_eq!(eval("(last [1 2 9])"), Node::number(9.0));
    assert_eq!(eval("(empty? [])"), Node::bool(true));
    assert_eq!(eval("(nil? nil)"), Node::bool(true));
    assert_eq!(eval("(not 0)"), Node::bool(false));
}

#[test]
fn collection_builtins() {
    assert_eq!(eval("(count \"abc\")"), Node::number(3.0));
    assert_eq!(eval("(get [10 20] 1)"), Node::number(20.0));
    assert_eq!(eval("(get {:a 1} :a)"), Node::number(1.0));
    assert_eq!(eval("(get {:a 1} :b)"), Node::nil());
    assert_eq!(eval("(get {:a 1} :b :missing)"), Node::keyword("missing"));
    assert_eq!(eval("(conj '(1 2) 0)"), eval("'(0 1 2)"));
    assert_eq!(eval("(conj [1 2] 3)"), eval("[1 2 3]"));
    assert_eq!(eval("(cons 0 '(1 2))"), eval("'(0 1 2)"));
    assert_eq!(eval("(concat '(1) [2] nil)"), eval("'(1 2)"));
    assert_eq!(eval("(slice [1 2 3 4] 1 3)"), eval("'(2 3)"));
    assert_eq!(eval("(seq \"ab\")"), eval("'(\"a\" \"b\")"));
    assert_eq!(eval("(hashmap :x 1 :y 2)"), eval("{:x 1 :y 2}"));
    assert_eq!(eval("(merge {:a 1 :b 1} {:b 2})"), eval("{:a 1 :b 2}"));
}

#[test]
fn type_names() {
    for (src, expected) in [
        ("(type nil)", "nil"),
        ("(type true)", "bool"),
        ("(type 1)", "number"),
        ("(type \"s\")", "string"),
        ("(type :k)", "keyword"),
        ("(type 'sym)", "symbol"),
        ("(type '())", "list"),
        ("(type [])", "vector"),
        ("(type {})", "map"),
        ("(type inc)", "fn"),
        ("(type defn)", "macro"),
        ("(type if)", "special"),
    ] {
        assert_eq!(eval(src), Node::string(expected), "for {}", src);
    }
}

#[test]
fn str_and_format() {
    assert_eq!(eval("(str \"a\" 1 :k)"), Node::string("a1:k"));
    assert_eq!(eval("(str)"), Node::string(""));
    assert_eq!(
        eval("(format \"x=%v y=%s, 100%%\" 1 \"a\")"),
        Node::string("x=1 y=a, 100%")
    );
    assert!(eval_err("(format \"%v\")").contains("wrong number of arguments"));
    assert!(eval_err("(format \"%z\" 1)").contains("unsupported format directive"));
}

#[test]
fn version_is_defined() {
    assert_eq!(eval("version"), Node::string("0.4.1"));
}

#[test]
fn try_returns_the_body_value_without_an_error() {
    assert_eq!(eval("(try 1 2 (catch e e))"), Node::number(2.0));
}

#[test]
fn try_binds_the_rendered_error() {
    assert_eq!(
        eval("(try (throw \"boo!\") (catch e [(str \"caught: \" e) :foobar]))"),
        eval("[\"caught: boo!: (throw \\\"boo!\\\")\" :foobar]")
    );
    assert_eq!(
        eval("(try undefined-thing (catch e \"saved\"))"),
        Node::string("saved")
    );
}

#[test]
fn throw_joins_its_arguments() {
    assert_eq!(
        eval("(try (throw \"a\" 1) (catch e e))"),
        Node::string("a 1: (throw \"a\" 1)")
    );
}

#[test]
fn try_rejects_malformed_clauses() {
    assert!(eval_err("(try 1)").contains("catch clause"));
    assert!(eval_err("(try 1 (catch))").contains("invalid catch clause"));
    assert!(eval_err("(try 1 (catch :k 2))").contains("symbol as its first element"));
}

#[test]
fn macroexpand_shows_the_rewrite() {
    assert_eq!(
        eval("(macroexpand '(defn foo [x & xs] x))"),
        eval("'(def foo (fn [x & xs] x))")
    );
    assert_eq!(
        eval("(macroexpand '(defmacro m [x] x))"),
        eval("'(def m (macro [x] x))")
    );
    assert_eq!(eval("(macroexpand '(do 1))"), eval("'((fn [] 1))"));
}

#[test]
fn parse_and_eval_natives() {
    assert_eq!(
        eval("(eval (first (parse \"(+ 1 2)\")))"),
        Node::number(3.0)
    );
    assert_eq!(eval("(count (parse \"1 2 3\"))"), Node::number(3.0));
}

#[test]
fn apply_spreads_a_sequence() {
    assert_eq!(eval("(apply + [1 2 3])"), Node::number(6.0));
    assert_eq!(eval("(apply conj ['(1) 2])"), eval("'(2 1)"));
}

#[test]
fn user_macros_run_on_forms() {
    let src = "(defmacro unless [test then else] `(if ~test ~else ~then)) \
               (unless false 1 2)";
    assert_eq!(eval(src), Node::number(1.0));
}

#[test]
fn tail_calls_run_at_constant_stack_depth() {
    let src = "(def spin (fn [n] (if (= n 0) :done (spin (- n 1))))) \
               (spin 100000)";
    assert_eq!(eval(src), Node::keyword("done"));
}

#[test]
fn mutual_tail_calls_bounce_through_the_trampoline() {
    let src = "(def even* (fn [n] (if (= n 0) true (odd* (- n 1))))) \
               (def odd* (fn [n] (if (= n 0) false (even* (- n 1))))) \
               (even* 100001)";
    assert_eq!(eval(src), Node::bool(false));
}

#[test]
fn strings_print_readably_but_display_plainly() {
    let node = eval("\"a\nb\"");
    assert_eq!(format!("{}", node), "\"a\\nb\"");
    assert_eq!(display_string(&node), "a\nb");
}

#[test]
fn spit_then_slurp_round_trips() {
    let path = std::env::temp_dir().join("sorrel-fs-test").join("note.txt");
    let path_str = path.to_string_lossy().into_owned();
    let env = Env::session(false);
    let src = format!("(spit \"{0}\" \"hello\") (slurp \"{0}\")", path_str);
    assert_eq!(eval_source(&src, &env).unwrap(), Node::string("hello"));
    let _ = std::fs::remove_file(&path);
}

#[test]
fn slurp_reports_missing_files() {
    assert!(eval_err("(slurp \"/no/such/sorrel/file\")").contains("error reading file"));
}
