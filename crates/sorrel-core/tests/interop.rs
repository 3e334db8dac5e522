use std::sync::Once;

use sorrel_core::ast::Node;
use sorrel_core::env::Env;
use sorrel_core::error::SorrelError;
use sorrel_core::{eval_source, register, register_type, ForeignValue, FromNode};

struct Point {
    x: f64,
    y: f64,
}

static POINT_MEMBERS: Once = Once::new();

fn install_point() {
    POINT_MEMBERS.call_once(|| {
        register_type("geom/point")
            .member("x", |point, _args| {
                Ok(Node::number(point.downcast::<Point>()?.x))
            })
            .member("len", |point, _args| {
                let p = point.downcast::<Point>()?;
                Ok(Node::number((p.x * p.x + p.y * p.y).sqrt()))
            })
            .member("scale", |point, args| {
                let factor = match args.first() {
                    Some(node) => f64::from_node(node)?,
                    None => return Err(SorrelError::arity("scale needs a factor")),
                };
                let p = point.downcast::<Point>()?;
                Ok(Node::foreign(ForeignValue::new(
                    "geom/point",
                    Point {
                        x: p.x * factor,
                        y: p.y * factor,
                    },
                )))
            })
            .install();
    });
}

fn session_with_point() -> sorrel_core::EnvRef {
    install_point();
    let env = Env::session(false);
    let point = Node::foreign(ForeignValue::new("geom/point", Point { x: 3.0, y: 4.0 }));
    env.write().unwrap().set("p", point).unwrap();
    env
}

#[test]
fn members_dispatch_on_the_receiver_tag() {
    let env = session_with_point();
    assert_eq!(eval_source("(.x p)", &env).unwrap(), Node::number(3.0));
    assert_eq!(eval_source("(.len p)", &env).unwrap(), Node::number(5.0));
}

#[test]
fn members_take_arguments_and_chain() {
    let env = session_with_point();
    assert_eq!(
        eval_source("(.len (.scale p 2))", &env).unwrap(),
        Node::number(10.0)
    );
}

#[test]
fn member_designators_are_values() {
    let env = session_with_point();
    // A designator can be passed around like any function.
    assert_eq!(
        eval_source("((fn [f] (f p)) .x)", &env).unwrap(),
        Node::number(3.0)
    );
    assert_eq!(format!("{}", eval_source(".x", &env).unwrap()), ".x");
    // Quoted, it is still a plain symbol.
    assert_eq!(eval_source("'.x", &env).unwrap(), Node::symbol(".x"));
}

#[test]
fn missing_members_and_receivers_error() {
    let env = session_with_point();
    let missing = eval_source("(.q p)", &env).unwrap_err().to_string();
    assert!(missing.contains("q is not a member of geom/point"), "got: {}", missing);

    let wrong = eval_source("(.x 1)", &env).unwrap_err().to_string();
    assert!(wrong.contains("x is not a member of number"), "got: {}", wrong);

    let none = eval_source("(.x)", &env).unwrap_err().to_string();
    assert!(none.contains("member call .x needs a receiver"), "got: {}", none);
}

#[test]
fn unregistered_tags_error() {
    let env = Env::session(false);
    let segment = Node::foreign(ForeignValue::new("geom/segment", ()));
    env.write().unwrap().set("s", segment).unwrap();
    let err = eval_source("(.x s)", &env).unwrap_err().to_string();
    assert!(err.contains("no members registered for geom/segment"), "got: {}", err);
}

#[test]
fn member_arguments_coerce_with_clear_errors() {
    let env = session_with_point();
    let err = eval_source("(.scale p \"a\")", &env).unwrap_err().to_string();
    assert!(err.contains("cannot convert \"a\" to number"), "got: {}", err);
}

#[test]
fn register_installs_bindings_and_runs_the_snippet() {
    register(
        vec![("answer".to_string(), Node::number(42.0))],
        Some("(def answer-plus-one (+ answer 1))"),
    )
    .unwrap();
    let env = Env::session(false);
    assert_eq!(eval_source("answer", &env).unwrap(), Node::number(42.0));
    assert_eq!(
        eval_source("answer-plus-one", &env).unwrap(),
        Node::number(43.0)
    );
}

#[test]
fn foreign_values_compare_by_identity() {
    let env = session_with_point();
    assert_eq!(eval_source("(= p p)", &env).unwrap(), Node::bool(true));
    assert_eq!(
        eval_source("(= p (.scale p 1))", &env).unwrap(),
        Node::bool(false)
    );
    assert_eq!(
        eval_source("(type p)", &env).unwrap(),
        Node::string("geom/point")
    );
}
