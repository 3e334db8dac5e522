use std::collections::HashSet;

use crate::ast::Node;
use crate::destructure::destructure;
use crate::env::{new_ref, Env, EnvRef};
use crate::error::SorrelError;
use crate::eval::{eval, eval_forms};
use crate::expand;

struct Def {
    node: Node,
    name: String,
    deps: HashSet<String>,
}

/// Evaluates a batch of top level forms, resolving `def`s in
/// dependency order instead of source order.
///
/// The batch is macro expanded first, then defs whose free symbols are
/// all satisfied are evaluated until a fixed point. Anything still
/// stuck is carried into a recursive pass together with the non-def
/// body, so a macro defined later in the file can unblock a def that
/// uses it. If a pass makes no progress at all the remaining defs form
/// a cycle and the error names every one of them with its missing
/// dependencies. The non-def body runs in source order once every def
/// is in place; the result is the last body form's value.
pub fn load(nodes: &[Node], env: &EnvRef) -> Result<Node, SorrelError> {
    if nodes.is_empty() {
        return Ok(Node::nil());
    }
    let nodes = expand::expand(nodes, env)?;

    let mut defs: Vec<Def> = vec![];
    let mut body: Vec<Node> = vec![];
    for node in nodes {
        if node.head_symbol() != Some("def") {
            body.push(node);
            continue;
        }
        let second = match &node {
            Node::List(items) => items.get(1).cloned(),
            _ => None,
        };
        let name = match second {
            Some(Node::Symbol(name)) => name,
            _ => {
                return Err(SorrelError::eval(
                    "def must be called with a symbol as the first argument",
                )
                .with_form(node.clone()))
            }
        };
        let mut free = vec![];
        collect_dependencies(std::slice::from_ref(&node), &mut free)?;
        let guard = env.read().unwrap();
        let deps: HashSet<String> = free
            .into_iter()
            .filter(|dep| guard.get(dep).is_none())
            .collect();
        drop(guard);
        defs.push(Def { node, name, deps });
    }

    if defs.is_empty() {
        let results = eval_forms(&body, env)?;
        return Ok(results.into_iter().last().unwrap_or_else(Node::nil));
    }

    let before = defs.len();
    loop {
        let ready = defs.iter().position(|def| def.deps.is_empty());
        let def = match ready {
            Some(index) => defs.remove(index),
            None => break,
        };
        eval(&def.node, env)?;
        for other in &mut defs {
            other.deps.remove(&def.name);
        }
    }

    if defs.len() == before {
        let mut lines: Vec<String> = defs
            .iter()
            .map(|def| {
                let mut deps: Vec<&str> = def.deps.iter().map(String::as_str).collect();
                deps.sort_unstable();
                format!("{} depends on [{}]", def.name, deps.join(" "))
            })
            .collect();
        lines.sort_unstable();
        return Err(SorrelError::cycle(format!(
            "cyclic dependency detected: {}",
            lines.join(", ")
        )));
    }

    // Progress was made; whatever is left may be waiting on a macro
    // that only just got defined, so expand and sort again.
    let mut rest = body;
    rest.extend(defs.into_iter().map(|def| def.node));
    load(&rest, env)
}

/// Collects the symbols a form refers to. Parameters of fn and macro
/// forms shadow, and so does a self-name; quoted forms contribute
/// nothing; a def contributes only its value form. Member symbols like
/// `.size` resolve without the environment and are not dependencies.
fn collect_dependencies(nodes: &[Node], out: &mut Vec<String>) -> Result<(), SorrelError> {
    for node in nodes {
        match node {
            Node::List(items) => match node.head_symbol() {
                Some("quote") => {}
                Some("fn") | Some("macro") => {
                    let scratch = new_ref(Env::detached());
                    let mut rest = &items[1..];
                    if let (Some(Node::Symbol(_)), true) = (rest.first(), rest.len() > 1) {
                        destructure(&rest[0], &Node::Vector(vec![]), &scratch)?;
                        rest = &rest[1..];
                    }
                    if let Some(params) = rest.first() {
                        destructure(params, &Node::Vector(vec![]), &scratch)?;
                        let mut inner = vec![];
                        collect_dependencies(&rest[1..], &mut inner)?;
                        let guard = scratch.read().unwrap();
                        out.extend(inner.into_iter().filter(|dep| !guard.contains_local(dep)));
                    }
                }
                Some("def") => {
                    if items.len() > 2 {
                        collect_dependencies(&items[2..], out)?;
                    }
                }
                _ => collect_dependencies(items, out)?,
            },
            Node::Vector(items) | Node::ArrayMap(items) => collect_dependencies(items, out)?,
            Node::Map(entries) => {
                for (key, value) in entries {
                    collect_dependencies(std::slice::from_ref(key), out)?;
                    collect_dependencies(std::slice::from_ref(value), out)?;
                }
            }
            Node::Symbol(name) => {
                if !name.starts_with('.') {
                    out.push(name.clone());
                }
            }
            Node::Literal(_) | Node::Keyword(_) => {}
        }
    }
    Ok(())
}
