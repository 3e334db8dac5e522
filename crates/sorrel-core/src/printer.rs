use std::fmt::{self, Write};

use crate::ast::{Callable, Literal, Node};

/// `Display` renders the readable form: strings quoted and escaped so
/// the output parses back to an equivalent node, floats in their
/// shortest decimal spelling.
impl fmt::Display for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut out = String::new();
        write_node(&mut out, self, true)?;
        f.write_str(&out)
    }
}

/// The display rendering used by `print` and `str`: like `Display`
/// except strings appear without quotes or escapes.
pub fn display_string(node: &Node) -> String {
    let mut out = String::new();
    // Writing to a String cannot fail.
    let _ = write_node(&mut out, node, false);
    out
}

fn write_node(out: &mut String, node: &Node, readable: bool) -> fmt::Result {
    match node {
        Node::Literal(literal) => write_literal(out, literal, readable),
        Node::Symbol(name) => out.write_str(name),
        Node::Keyword(name) => write!(out, ":{}", name),
        Node::List(items) => write_seq(out, items, "(", ")", readable),
        Node::Vector(items) => write_seq(out, items, "[", "]", readable),
        Node::ArrayMap(items) => {
            let pairs: Vec<(&Node, Option<&Node>)> = (0..items.len())
                .step_by(2)
                .map(|i| (&items[i], items.get(i + 1)))
                .collect();
            out.write_str("{")?;
            for (i, (key, value)) in pairs.iter().enumerate() {
                if i > 0 {
                    out.write_str(", ")?;
                }
                write_node(out, key, readable)?;
                if let Some(value) = value {
                    out.write_str(" ")?;
                    write_node(out, value, readable)?;
                }
            }
            out.write_str("}")
        }
        Node::Map(entries) => {
            out.write_str("{")?;
            for (i, (key, value)) in entries.iter().enumerate() {
                if i > 0 {
                    out.write_str(", ")?;
                }
                write_node(out, key, readable)?;
                out.write_str(" ")?;
                write_node(out, value, readable)?;
            }
            out.write_str("}")
        }
    }
}

fn write_seq(
    out: &mut String,
    items: &[Node],
    open: &str,
    close: &str,
    readable: bool,
) -> fmt::Result {
    out.write_str(open)?;
    for (i, item) in items.iter().enumerate() {
        if i > 0 {
            out.write_str(" ")?;
        }
        write_node(out, item, readable)?;
    }
    out.write_str(close)
}

fn write_literal(out: &mut String, literal: &Literal, readable: bool) -> fmt::Result {
    match literal {
        Literal::Nil => out.write_str("nil"),
        Literal::Bool(value) => write!(out, "{}", value),
        Literal::Number(value) => write!(out, "{}", value),
        Literal::Str(value) => {
            if readable {
                write_escaped(out, value)
            } else {
                out.write_str(value)
            }
        }
        Literal::Callable(Callable::Special(form)) => write!(out, "<special {}>", form.name),
        Literal::Callable(Callable::Fn(lambda)) => match &lambda.name {
            Some(name) => write!(out, "<fn {}>", name),
            None => out.write_str("<fn>"),
        },
        Literal::Callable(Callable::Macro(lambda)) => match &lambda.name {
            Some(name) => write!(out, "<macro {}>", name),
            None => out.write_str("<macro>"),
        },
        Literal::Callable(Callable::Native(native)) => write!(out, "<native {}>", native.name()),
        // Prints as the symbol it came from, so it reads back.
        Literal::Member(name) => write!(out, ".{}", name),
        Literal::Foreign(value) => write!(out, "<foreign {}>", value.tag),
    }
}

fn write_escaped(out: &mut String, value: &str) -> fmt::Result {
    out.write_str("\"")?;
    for c in value.chars() {
        match c {
            '"' => out.write_str("\\\"")?,
            '\\' => out.write_str("\\\\")?,
            '\n' => out.write_str("\\n")?,
            '\t' => out.write_str("\\t")?,
            '\r' => out.write_str("\\r")?,
            other => out.write_char(other)?,
        }
    }
    out.write_str("\"")
}
