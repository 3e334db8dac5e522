use crate::ast::Node;
use crate::env::EnvRef;
use crate::error::SorrelError;
use crate::seq;

/// Binds `pattern` against `value` in `env`.
///
/// Sequential patterns draw from the sequence view of the value, so
/// lists, vectors and strings all destructure; missing positions bind
/// nil, surplus elements are dropped. `&` collects the rest as a list
/// and `:as` names the whole value. Map patterns look entries up
/// through the associative view, with `:keys` and `:as` shorthands.
pub fn destructure(pattern: &Node, value: &Node, env: &EnvRef) -> Result<(), SorrelError> {
    bind(pattern, value, env).map_err(|err| {
        SorrelError::bind(format!(
            "could not destructure {} to {}: {}",
            pattern, value, err
        ))
    })
}

fn bind(pattern: &Node, value: &Node, env: &EnvRef) -> Result<(), SorrelError> {
    match pattern {
        Node::Symbol(name) => env.write().unwrap().set(name, value.clone()),
        Node::List(items) | Node::Vector(items) => bind_sequence(items, value, env),
        Node::Map(_) | Node::ArrayMap(_) => bind_assoc(pattern, value, env),
        other => Err(SorrelError::bind(format!(
            "cannot bind with pattern {}",
            other
        ))),
    }
}

fn bind_sequence(items: &[Node], value: &Node, env: &EnvRef) -> Result<(), SorrelError> {
    let elements = seq::seq(value)?;
    let mut cursor = 0usize;
    let mut i = 0usize;
    while i < items.len() {
        match &items[i] {
            Node::Symbol(name) if name == "&" => {
                i += 1;
                let pattern = items
                    .get(i)
                    .ok_or_else(|| SorrelError::bind("& needs a pattern after it"))?;
                let rest: Vec<Node> = elements.get(cursor..).map(<[Node]>::to_vec).unwrap_or_default();
                destructure(pattern, &Node::List(rest), env)?;
            }
            Node::Keyword(name) if name == "as" => {
                i += 1;
                let pattern = items
                    .get(i)
                    .ok_or_else(|| SorrelError::bind(":as needs a name after it"))?;
                destructure(pattern, value, env)?;
            }
            pattern => {
                let element = elements.get(cursor).cloned().unwrap_or_else(Node::nil);
                destructure(pattern, &element, env)?;
                cursor += 1;
            }
        }
        i += 1;
    }
    Ok(())
}

fn bind_assoc(pattern: &Node, value: &Node, env: &EnvRef) -> Result<(), SorrelError> {
    let assoc = seq::as_assoc(value)?;
    for entry in seq::seq(pattern)? {
        let (sub, key) = match &entry {
            Node::Vector(pair) if pair.len() == 2 => (&pair[0], &pair[1]),
            other => {
                return Err(SorrelError::bind(format!(
                    "bad entry {} in map pattern",
                    other
                )))
            }
        };
        match sub {
            Node::Keyword(name) if name == "as" => destructure(key, &assoc, env)?,
            Node::Keyword(name) if name == "keys" => {
                for item in seq::seq(key)? {
                    match &item {
                        Node::Symbol(name) => {
                            let found = seq::get(&assoc, &Node::keyword(name.clone()))?;
                            env.write().unwrap().set(name, found)?;
                        }
                        other => {
                            return Err(SorrelError::bind(format!(
                                ":keys takes symbols, got {}",
                                other
                            )))
                        }
                    }
                }
            }
            _ => {
                let found = seq::get(&assoc, key)?;
                destructure(sub, &found, env)?;
            }
        }
    }
    Ok(())
}
