//! Core runtime for sorrel, a small homoiconic scripting language.
//!
//! The pipeline is reader -> expander -> trampoline evaluator, all
//! working on the same [`ast::Node`] values. [`load`] evaluates a
//! batch of top level forms with `def`s resolved in dependency order;
//! [`eval_source`] evaluates forms strictly in source order. Hosts
//! extend the language with [`register`] for plain bindings and
//! [`interop::register_type`] for member dispatch on foreign values.

pub mod ast;
pub mod builtins;
mod destructure;
pub mod env;
pub mod error;
pub mod eval;
pub mod expand;
pub mod interop;
pub mod interrupt;
mod lexer;
mod load;
mod printer;
pub mod reader;
pub mod seq;

pub use ast::{Literal, Node};
pub use env::{new_ref, root_env, Env, EnvRef};
pub use error::{format_error, SorrelError};
pub use eval::{apply, eval, eval_forms, Step};
pub use expand::expand;
pub use interop::{register_type, ForeignValue, FromNode, IntoNode};
pub use load::load;
pub use printer::display_string;
pub use reader::parse;

/// Parses and evaluates `src` in source order, returning the value of
/// the last form.
pub fn eval_source(src: &str, env: &EnvRef) -> Result<Node, SorrelError> {
    let nodes = parse(src)?;
    let results = eval_forms(&nodes, env)?;
    Ok(results.into_iter().last().unwrap_or_else(Node::nil))
}

/// Parses `src` and evaluates it as one top level batch: `def`s may
/// appear in any order as long as they do not form a cycle.
pub fn load_source(src: &str, env: &EnvRef) -> Result<Node, SorrelError> {
    let nodes = parse(src)?;
    load(&nodes, env)
}

/// Installs host bindings into the root scope, then evaluates an
/// optional setup snippet there. Everything registered becomes visible
/// to every session.
pub fn register(
    bindings: Vec<(String, Node)>,
    snippet: Option<&str>,
) -> Result<(), SorrelError> {
    let root = root_env();
    {
        let mut guard = root.write().unwrap();
        for (name, value) in bindings {
            guard.set(&name, value)?;
        }
    }
    if let Some(src) = snippet {
        let nodes = parse(src)?;
        eval_forms(&nodes, &root)?;
    }
    Ok(())
}
