use crate::ast::{Callable, Literal, Node};
use crate::destructure::destructure;
use crate::env::{new_ref, Env, EnvRef};
use crate::error::SorrelError;
use crate::eval::expand_macro;

/// Expands every macro call in `nodes`, leaving runtime forms alone.
/// Heads are resolved through `env`, so a rebound or shadowed name is
/// respected instead of being treated as a macro by spelling.
pub fn expand(nodes: &[Node], env: &EnvRef) -> Result<Vec<Node>, SorrelError> {
    nodes.iter().map(|node| expand_node(node, env)).collect()
}

fn expand_node(node: &Node, env: &EnvRef) -> Result<Node, SorrelError> {
    let mut node = node.clone();
    loop {
        match &node {
            Node::List(items) => {
                let head = match node.head_symbol() {
                    Some(name) => env.read().unwrap().get(name),
                    None => None,
                };
                match head {
                    Some(Node::Literal(Literal::Callable(Callable::Macro(lambda)))) => {
                        // Expansions are re-examined, so a macro may
                        // produce another macro call.
                        let expansion = expand_macro(&lambda, &items[1..])?;
                        node = expansion;
                        continue;
                    }
                    Some(Node::Literal(Literal::Callable(Callable::Special(form)))) => {
                        match form.name {
                            "quote" => return Ok(node.clone()),
                            "quasiquote" => {
                                if items.len() != 2 {
                                    return Err(SorrelError::arity(
                                        "wrong number of arguments for quasiquote",
                                    ));
                                }
                                let rewritten = quasiquote(&items[1])?;
                                node = rewritten;
                                continue;
                            }
                            "fn" | "macro" => return expand_callable(items, env),
                            _ => return expand_items(items, env),
                        }
                    }
                    _ => return expand_items(items, env),
                }
            }
            Node::Vector(items) => {
                let expanded = expand(items, env)?;
                return Ok(Node::Vector(expanded));
            }
            Node::ArrayMap(items) => {
                let expanded = expand(items, env)?;
                return Ok(Node::ArrayMap(expanded));
            }
            Node::Map(entries) => {
                let mut out = im::HashMap::new();
                for (key, value) in entries {
                    out.insert(expand_node(key, env)?, expand_node(value, env)?);
                }
                return Ok(Node::Map(out));
            }
            _ => return Ok(node.clone()),
        }
    }
}

fn expand_items(items: &[Node], env: &EnvRef) -> Result<Node, SorrelError> {
    Ok(Node::List(expand(items, env)?))
}

/// Expands a fn or macro body in a scope where the parameters (and a
/// self-name, if present) shadow outer bindings, so a parameter named
/// like a macro is not expanded as one.
fn expand_callable(items: &[Node], env: &EnvRef) -> Result<Node, SorrelError> {
    let shadow = new_ref(Env::new_child(env.clone()));
    let mut rest = &items[1..];
    let mut out = vec![items[0].clone()];
    if let (Some(Node::Symbol(_)), true) = (rest.first(), rest.len() > 1) {
        destructure(&rest[0], &Node::Vector(vec![]), &shadow)?;
        out.push(rest[0].clone());
        rest = &rest[1..];
    }
    if let Some(params) = rest.first() {
        destructure(params, &Node::Vector(vec![]), &shadow)?;
        out.push(params.clone());
        for form in &rest[1..] {
            out.push(expand_node(form, &shadow)?);
        }
    }
    Ok(Node::List(out))
}

/// Rewrites a quasiquote template into ordinary calls. Each sequence
/// becomes a `concat` of one-element `list`s, except that an
/// unquote-splicing payload joins the concat bare. Symbols quote
/// themselves until an unquote brings the level back to zero, and a
/// nested quasiquote raises it.
pub(crate) fn quasiquote(template: &Node) -> Result<Node, SorrelError> {
    let (out, spliced) = qq(template, 1)?;
    if spliced {
        return Err(SorrelError::eval(
            "cannot unquote-splice outside of a sequence",
        ));
    }
    Ok(out)
}

fn qq(node: &Node, level: i32) -> Result<(Node, bool), SorrelError> {
    match node {
        Node::Literal(_) | Node::Keyword(_) => Ok((node.clone(), false)),
        Node::Symbol(_) => {
            if level == 0 {
                Ok((node.clone(), false))
            } else {
                Ok((Node::call("quote", vec![node.clone()]), false))
            }
        }
        Node::Vector(items) => {
            let concat = qq_concat(items, level)?;
            Ok((Node::call("vec", vec![concat]), false))
        }
        Node::List(items) => {
            if level == 0 {
                return Ok((node.clone(), false));
            }
            match node.head_symbol() {
                Some("quasiquote") => {
                    if items.len() != 2 {
                        return Err(SorrelError::arity(
                            "wrong number of arguments for quasiquote",
                        ));
                    }
                    qq(&items[1], level + 1)
                }
                Some(name @ ("unquote" | "unquote-splicing")) => {
                    let level = level - 1;
                    if level < 0 {
                        return Err(SorrelError::eval(
                            "call to unquote outside of quasiquote",
                        ));
                    }
                    if items.len() != 2 {
                        return Err(SorrelError::arity(format!(
                            "wrong number of arguments for {}",
                            name
                        )));
                    }
                    let (out, inner_spliced) = qq(&items[1], level)?;
                    Ok((out, name == "unquote-splicing" || inner_spliced))
                }
                _ => Ok((qq_concat(items, level)?, false)),
            }
        }
        Node::Map(_) | Node::ArrayMap(_) => Err(SorrelError::eval(format!(
            "cannot quasiquote {}",
            node
        ))),
    }
}

fn qq_concat(items: &[Node], level: i32) -> Result<Node, SorrelError> {
    let mut out = vec![Node::symbol("concat")];
    for item in items {
        let (form, spliced) = qq(item, level)?;
        if spliced {
            out.push(form);
        } else {
            out.push(Node::call("list", vec![form]));
        }
    }
    Ok(Node::List(out))
}
