use crate::ast::{Literal, Node};
use crate::error::SorrelError;

/// The sequence view of a value: lists and vectors give their
/// elements, maps give `[k v]` pairs, strings give one-character
/// strings and nil is empty.
pub fn seq(node: &Node) -> Result<Vec<Node>, SorrelError> {
    match node {
        Node::List(items) | Node::Vector(items) => Ok(items.clone()),
        Node::ArrayMap(items) => Ok((0..items.len())
            .step_by(2)
            .map(|i| {
                Node::Vector(vec![
                    items[i].clone(),
                    items.get(i + 1).cloned().unwrap_or_else(Node::nil),
                ])
            })
            .collect()),
        Node::Map(entries) => Ok(entries
            .iter()
            .map(|(k, v)| Node::Vector(vec![k.clone(), v.clone()]))
            .collect()),
        Node::Literal(Literal::Nil) => Ok(vec![]),
        Node::Literal(Literal::Str(value)) => Ok(value
            .chars()
            .map(|c| Node::string(c.to_string()))
            .collect()),
        other => Err(SorrelError::eval(format!(
            "cannot get a sequence from {}",
            other
        ))),
    }
}

pub fn count(node: &Node) -> Result<usize, SorrelError> {
    Ok(seq(node)?.len())
}

/// Indexed and keyed access. Out of range indexes and missing keys
/// give nil; a negative index is an error.
pub fn get(target: &Node, key: &Node) -> Result<Node, SorrelError> {
    match target {
        Node::List(items) | Node::Vector(items) => {
            let index = match key {
                Node::Literal(Literal::Number(n)) => *n as i64,
                other => return Err(SorrelError::coerce(other, "index")),
            };
            if index < 0 {
                return Err(SorrelError::eval(format!("index {} out of range", index)));
            }
            Ok(items
                .get(index as usize)
                .cloned()
                .unwrap_or_else(Node::nil))
        }
        Node::Map(entries) => Ok(entries.get(key).cloned().unwrap_or_else(Node::nil)),
        Node::ArrayMap(items) => {
            for i in (0..items.len()).step_by(2) {
                if items[i] == *key {
                    return Ok(items.get(i + 1).cloned().unwrap_or_else(Node::nil));
                }
            }
            Ok(Node::nil())
        }
        Node::Literal(Literal::Nil) => Ok(Node::nil()),
        other => Err(SorrelError::eval(format!(
            "could not get {} from {}",
            key, other
        ))),
    }
}

/// Prepends to lists, appends to vectors, inserts a `[k v]` pair into
/// maps. Conj onto nil starts a list.
pub fn conj(target: &Node, item: &Node) -> Result<Node, SorrelError> {
    match target {
        Node::List(items) => {
            let mut out = vec![item.clone()];
            out.extend(items.iter().cloned());
            Ok(Node::List(out))
        }
        Node::Vector(items) => {
            let mut out = items.clone();
            out.push(item.clone());
            Ok(Node::Vector(out))
        }
        Node::ArrayMap(items) => {
            let pair = pair_of(item)?;
            let mut out = items.clone();
            out.extend(pair);
            Ok(Node::ArrayMap(out))
        }
        Node::Map(entries) => {
            let pair = pair_of(item)?;
            let mut out = entries.clone();
            out.insert(pair[0].clone(), pair[1].clone());
            Ok(Node::Map(out))
        }
        Node::Literal(Literal::Nil) => Ok(Node::List(vec![item.clone()])),
        other => Err(SorrelError::eval(format!("cannot conj onto {}", other))),
    }
}

fn pair_of(item: &Node) -> Result<Vec<Node>, SorrelError> {
    let pair = seq(item)?;
    if pair.len() != 2 {
        return Err(SorrelError::eval(format!(
            "conj onto a map needs a [key value] pair, got {}",
            item
        )));
    }
    Ok(pair)
}

pub fn cons(item: &Node, target: &Node) -> Result<Node, SorrelError> {
    let mut out = vec![item.clone()];
    out.extend(seq(target)?);
    Ok(Node::List(out))
}

pub fn concat(parts: &[Node]) -> Result<Node, SorrelError> {
    let mut out = vec![];
    for part in parts {
        out.extend(seq(part)?);
    }
    Ok(Node::List(out))
}

pub fn slice(target: &Node, from: usize, to: usize) -> Result<Node, SorrelError> {
    let items = seq(target)?;
    if from > to || to > items.len() {
        return Err(SorrelError::eval(format!(
            "slice bounds {}..{} out of range for {} elements",
            from,
            to,
            items.len()
        )));
    }
    Ok(Node::List(items[from..to].to_vec()))
}

/// The associative view used by map destructuring: maps pass through,
/// sequences are reinterpreted as flat key-value pairs, nil is empty.
pub fn as_assoc(node: &Node) -> Result<Node, SorrelError> {
    match node {
        Node::Map(_) | Node::ArrayMap(_) => Ok(node.clone()),
        Node::List(items) | Node::Vector(items) => Ok(Node::ArrayMap(items.clone())),
        Node::Literal(Literal::Nil) => Ok(Node::ArrayMap(vec![])),
        other => Err(SorrelError::eval(format!(
            "cannot use {} as an associative value",
            other
        ))),
    }
}
