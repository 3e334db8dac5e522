use std::sync::Arc;

use crate::ast::{Callable, Lambda, Literal, Node, SpecialForm};
use crate::destructure::destructure;
use crate::env::{new_ref, Env, EnvRef};
use crate::error::SorrelError;
use crate::expand;
use crate::interop;
use crate::interrupt;

/// One turn of the trampoline: either a finished value or the next
/// form to evaluate in the environment to evaluate it in. Tail calls
/// return `Tail`, so recursion depth stays flat no matter how deep the
/// language-level recursion goes.
pub enum Step {
    Value(Node),
    Tail(Node, EnvRef),
}

pub fn eval(node: &Node, env: &EnvRef) -> Result<Node, SorrelError> {
    let mut node = node.clone();
    let mut env = env.clone();
    loop {
        interrupt::check()?;
        match &node {
            Node::Literal(_) | Node::Keyword(_) => return Ok(node.clone()),
            Node::Symbol(name) => {
                if let Some(member) = name.strip_prefix('.') {
                    return Ok(Node::Literal(Literal::Member(member.to_string())));
                }
                return match env.read().unwrap().get(name) {
                    Some(value) => Ok(value),
                    None => Err(SorrelError::unbound_symbol(format!(
                        "could not resolve symbol '{}'",
                        name
                    ))),
                };
            }
            Node::Vector(items) => {
                let mut out = Vec::with_capacity(items.len());
                for item in items {
                    out.push(eval(item, &env)?);
                }
                return Ok(Node::Vector(out));
            }
            // Promotion point: an array map literal becomes a real map
            // the first time it is evaluated, keys evaluated to values.
            Node::ArrayMap(items) => {
                let mut out = im::HashMap::new();
                for i in (0..items.len()).step_by(2) {
                    let key = eval(&items[i], &env)?;
                    let value = match items.get(i + 1) {
                        Some(form) => eval(form, &env)?,
                        None => {
                            return Err(SorrelError::eval(
                                "map literal must have an even number of elements",
                            ))
                        }
                    };
                    out.insert(key, value);
                }
                return Ok(Node::Map(out));
            }
            Node::Map(entries) => {
                let mut out = im::HashMap::new();
                for (key, value) in entries {
                    out.insert(eval(key, &env)?, eval(value, &env)?);
                }
                return Ok(Node::Map(out));
            }
            Node::List(items) => {
                if items.is_empty() {
                    return Ok(node.clone());
                }
                let step = eval_list(items, &env).map_err(|err| err.with_form(node.clone()))?;
                match step {
                    Step::Value(value) => return Ok(value),
                    Step::Tail(next, next_env) => {
                        node = next;
                        env = next_env;
                    }
                }
            }
        }
    }
}

fn eval_list(items: &[Node], env: &EnvRef) -> Result<Step, SorrelError> {
    let head = eval(&items[0], env)?;
    let args = &items[1..];
    match &head {
        Node::Literal(Literal::Callable(Callable::Special(form))) => (form.func)(args, env),
        // Macros run on the unevaluated argument forms; the expansion
        // goes back around the trampoline in the caller's scope.
        Node::Literal(Literal::Callable(Callable::Macro(lambda))) => {
            let expansion = expand_macro(lambda, args)?;
            Ok(Step::Tail(expansion, env.clone()))
        }
        Node::Literal(Literal::Callable(_)) | Node::Literal(Literal::Member(_)) => {
            let mut evaled = Vec::with_capacity(args.len());
            for arg in args {
                evaled.push(eval(arg, env)?);
            }
            apply_step(&head, &evaled, env)
        }
        _ => Err(SorrelError::not_callable(format!(
            "cannot use {} as a function",
            items[0]
        ))),
    }
}

/// Calls `target` with already evaluated arguments.
pub fn apply(target: &Node, args: &[Node], env: &EnvRef) -> Result<Node, SorrelError> {
    match apply_step(target, args, env)? {
        Step::Value(value) => Ok(value),
        Step::Tail(node, tail_env) => eval(&node, &tail_env),
    }
}

/// Like `apply`, but hands a tail call back to the caller's trampoline
/// instead of finishing it here.
pub fn apply_step(target: &Node, args: &[Node], env: &EnvRef) -> Result<Step, SorrelError> {
    match target {
        Node::Literal(Literal::Callable(Callable::Fn(lambda))) => lambda_step(lambda, args),
        Node::Literal(Literal::Callable(Callable::Native(native))) => native.call(args, env),
        Node::Literal(Literal::Member(name)) => {
            interop::call_member(name, args).map(Step::Value)
        }
        Node::Literal(Literal::Callable(Callable::Special(form))) => {
            Err(SorrelError::not_callable(format!(
                "cannot apply the special form {} to evaluated arguments",
                form.name
            )))
        }
        Node::Literal(Literal::Callable(Callable::Macro(_))) => Err(SorrelError::not_callable(
            "cannot apply a macro to evaluated arguments",
        )),
        other => Err(SorrelError::not_callable(format!(
            "cannot use {} as a function",
            other
        ))),
    }
}

/// Runs a macro body to completion on unevaluated forms and returns
/// the replacement form. Also used by the compile-time expander.
pub(crate) fn expand_macro(lambda: &Lambda, args: &[Node]) -> Result<Node, SorrelError> {
    match lambda_step(lambda, args)? {
        Step::Value(value) => Ok(value),
        Step::Tail(node, env) => eval(&node, &env),
    }
}

fn lambda_step(lambda: &Lambda, args: &[Node]) -> Result<Step, SorrelError> {
    let call_env = new_ref(Env::new_child(lambda.env.clone()));
    destructure(&lambda.params, &Node::Vector(args.to_vec()), &call_env)?;
    let (last, init) = match lambda.body.split_last() {
        Some(split) => split,
        None => return Ok(Step::Value(Node::nil())),
    };
    for form in init {
        eval(form, &call_env)?;
    }
    Ok(Step::Tail(last.clone(), call_env))
}

/// Evaluates forms in order and returns all results.
pub fn eval_forms(nodes: &[Node], env: &EnvRef) -> Result<Vec<Node>, SorrelError> {
    nodes.iter().map(|node| eval(node, env)).collect()
}

static IF_FORM: SpecialForm = SpecialForm {
    name: "if",
    func: if_form,
};
static DEF_FORM: SpecialForm = SpecialForm {
    name: "def",
    func: def_form,
};
static FN_FORM: SpecialForm = SpecialForm {
    name: "fn",
    func: fn_form,
};
static MACRO_FORM: SpecialForm = SpecialForm {
    name: "macro",
    func: macro_form,
};
static TRY_FORM: SpecialForm = SpecialForm {
    name: "try",
    func: try_form,
};
static QUOTE_FORM: SpecialForm = SpecialForm {
    name: "quote",
    func: quote_form,
};
static QUASIQUOTE_FORM: SpecialForm = SpecialForm {
    name: "quasiquote",
    func: quasiquote_form,
};

pub(crate) fn install(env: &mut Env) {
    for form in [
        &IF_FORM,
        &DEF_FORM,
        &FN_FORM,
        &MACRO_FORM,
        &TRY_FORM,
        &QUOTE_FORM,
        &QUASIQUOTE_FORM,
    ] {
        env.define(form.name, Node::Literal(Literal::Callable(Callable::Special(form))));
    }
}

fn if_form(args: &[Node], env: &EnvRef) -> Result<Step, SorrelError> {
    if args.len() < 2 {
        return Err(SorrelError::arity("wrong number of arguments for if"));
    }
    let child = new_ref(Env::new_child(env.clone()));
    let cond = eval(&args[0], &child)?;
    if cond.is_truthy() {
        Ok(Step::Tail(args[1].clone(), child))
    } else if args.len() == 3 {
        Ok(Step::Tail(args[2].clone(), child))
    } else {
        Ok(Step::Value(Node::nil()))
    }
}

fn def_form(args: &[Node], env: &EnvRef) -> Result<Step, SorrelError> {
    if !env.read().unwrap().is_top_level() {
        return Err(SorrelError::eval(
            "def must only be called from the top level",
        ));
    }
    if args.len() != 2 {
        return Err(SorrelError::arity("wrong number of arguments for def"));
    }
    let name = match &args[0] {
        Node::Symbol(name) => name.clone(),
        _ => {
            return Err(SorrelError::eval(
                "def must be called with a symbol as the first argument",
            ))
        }
    };
    let value = eval(&args[1], env)?;
    env.write().unwrap().set(&name, value)?;
    Ok(Step::Value(Node::nil()))
}

fn fn_form(args: &[Node], env: &EnvRef) -> Result<Step, SorrelError> {
    build_callable(args, env, false)
}

fn macro_form(args: &[Node], env: &EnvRef) -> Result<Step, SorrelError> {
    build_callable(args, env, true)
}

fn build_callable(args: &[Node], env: &EnvRef, is_macro: bool) -> Result<Step, SorrelError> {
    if args.is_empty() {
        return Err(SorrelError::arity("wrong number of arguments for fn"));
    }
    let (name, rest) = match &args[0] {
        Node::Symbol(name) => (Some(name.clone()), &args[1..]),
        _ => (None, args),
    };
    let params = match rest.first() {
        Some(params) => params.clone(),
        None => return Err(SorrelError::arity("fn needs a parameter pattern")),
    };
    let body = rest[1..].to_vec();
    let fn_env = new_ref(Env::new_child(env.clone()));
    let lambda = Arc::new(Lambda {
        name: name.clone(),
        params,
        body,
        env: fn_env.clone(),
    });
    let callable = if is_macro {
        Callable::Macro(lambda)
    } else {
        Callable::Fn(lambda)
    };
    let value = Node::Literal(Literal::Callable(callable));
    // A leading symbol names the closure inside its own scope.
    if let Some(name) = &name {
        fn_env.write().unwrap().set(name, value.clone())?;
    }
    Ok(Step::Value(value))
}

fn try_form(args: &[Node], env: &EnvRef) -> Result<Step, SorrelError> {
    let (catch, body) = match args.split_last() {
        Some(split) => split,
        None => return Err(SorrelError::arity("wrong number of arguments for try")),
    };
    let catch_items = match catch {
        Node::List(items) if catch.head_symbol() == Some("catch") => items,
        _ => {
            return Err(SorrelError::eval(
                "the last form of try must be a catch clause",
            ))
        }
    };
    if catch_items.len() < 2 {
        return Err(SorrelError::eval("invalid catch clause inside try"));
    }
    let catch_name = match &catch_items[1] {
        Node::Symbol(name) => name.clone(),
        _ => {
            return Err(SorrelError::eval(
                "a catch clause must have a symbol as its first element",
            ))
        }
    };
    let catch_body = &catch_items[2..];

    let child = new_ref(Env::new_child(env.clone()));
    let mut result = Node::nil();
    for form in body {
        match eval(form, &child) {
            Ok(value) => result = value,
            Err(err) => {
                // The handler runs in a fresh scope so partial
                // bindings from the failed body are not visible.
                let catch_env = new_ref(Env::new_child(env.clone()));
                catch_env
                    .write()
                    .unwrap()
                    .set(&catch_name, Node::string(err.to_string()))?;
                let mut caught = Node::nil();
                for form in catch_body {
                    caught = eval(form, &catch_env)?;
                }
                return Ok(Step::Value(caught));
            }
        }
    }
    Ok(Step::Value(result))
}

fn quote_form(args: &[Node], _env: &EnvRef) -> Result<Step, SorrelError> {
    if args.len() != 1 {
        return Err(SorrelError::arity("wrong number of arguments for quote"));
    }
    Ok(Step::Value(args[0].clone()))
}

/// Rewrites the template into calls on concat, list, vec and quote,
/// then lets the trampoline evaluate the rewrite.
fn quasiquote_form(args: &[Node], env: &EnvRef) -> Result<Step, SorrelError> {
    if args.len() != 1 {
        return Err(SorrelError::arity(
            "wrong number of arguments for quasiquote",
        ));
    }
    Ok(Step::Tail(expand::quasiquote(&args[0])?, env.clone()))
}
