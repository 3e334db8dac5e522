use std::slice;

use crate::ast::{Literal, Node};
use crate::builtins::err;
use crate::def_native;
use crate::env::Env;
use crate::error::SorrelError;
use crate::eval;
use crate::expand;
use crate::interop::FromNode;
use crate::printer::display_string;
use crate::reader;
use crate::seq;

pub(crate) fn install(env: &mut Env) {
    def_native!(env, "get", |args, _env| {
        if args.len() != 2 && args.len() != 3 {
            return Err(SorrelError::arity("wrong number of arguments for get"));
        }
        let found = seq::get(&args[0], &args[1])?;
        // A third argument is the default for a nil result.
        if found == Node::nil() && args.len() == 3 {
            return Ok(args[2].clone());
        }
        Ok(found)
    });

    def_native!(env, "seq", |args, _env| {
        exactly(1, "seq", args)?;
        Ok(Node::List(seq::seq(&args[0])?))
    });

    def_native!(env, "cons", |args, _env| {
        exactly(2, "cons", args)?;
        seq::cons(&args[0], &args[1])
    });

    def_native!(env, "conj", |args, _env| {
        exactly(2, "conj", args)?;
        seq::conj(&args[0], &args[1])
    });

    def_native!(env, "concat", |args, _env| seq::concat(args));

    def_native!(env, "count", |args, _env| {
        exactly(1, "count", args)?;
        Ok(Node::number(seq::count(&args[0])? as f64))
    });

    def_native!(env, "slice", |args, _env| {
        exactly(3, "slice", args)?;
        let from = usize::from_node(&args[1])?;
        let to = usize::from_node(&args[2])?;
        seq::slice(&args[0], from, to)
    });

    def_native!(env, "hashmap", |args, _env| {
        if args.len() % 2 != 0 {
            return err("hashmap must be called with an even number of kvs");
        }
        let mut out = im::HashMap::new();
        for pair in args.chunks_exact(2) {
            out.insert(pair[0].clone(), pair[1].clone());
        }
        Ok(Node::Map(out))
    });

    def_native!(env, "merge", |args, _env| {
        exactly(2, "merge", args)?;
        let mut out = as_map(&args[0])?;
        for (key, value) in as_map(&args[1])? {
            out.insert(key, value);
        }
        Ok(Node::Map(out))
    });

    def_native!(env, "type", |args, _env| {
        exactly(1, "type", args)?;
        Ok(Node::string(match &args[0] {
            Node::Literal(Literal::Foreign(foreign)) => foreign.tag.clone(),
            other => other.type_name().to_string(),
        }))
    });

    def_native!(env, "print", |args, _env| {
        let rendered: Vec<String> = args.iter().map(display_string).collect();
        println!("{}", rendered.join(" "));
        Ok(Node::nil())
    });

    def_native!(env, "throw", |args, _env| {
        if args.is_empty() {
            return Err(SorrelError::arity("wrong number of arguments for throw"));
        }
        let rendered: Vec<String> = args.iter().map(display_string).collect();
        Err(SorrelError::thrown(rendered.join(" ")))
    });

    def_native!(env, "parse", |args, _env| {
        exactly(1, "parse", args)?;
        let source = String::from_node(&args[0])?;
        Ok(Node::List(reader::parse(&source)?))
    });

    def_native!(env, "eval", |args, env| {
        exactly(1, "eval", args)?;
        eval::eval(&args[0], env)
    });

    def_native!(env, "macroexpand", |args, env| {
        exactly(1, "macroexpand", args)?;
        let expanded = expand::expand(slice::from_ref(&args[0]), env)?;
        Ok(expanded.into_iter().next().unwrap_or_else(Node::nil))
    });

    env.define(
        "apply",
        Node::native_tail_fn("apply", |args, env| {
            exactly(2, "apply", args)?;
            let items = seq::seq(&args[1])?;
            eval::apply_step(&args[0], &items, env)
        }),
    );
}

fn exactly(expected: usize, name: &str, args: &[Node]) -> Result<(), SorrelError> {
    if args.len() != expected {
        return Err(SorrelError::arity(format!(
            "wrong number of arguments for {}",
            name
        )));
    }
    Ok(())
}

fn as_map(node: &Node) -> Result<im::HashMap<Node, Node>, SorrelError> {
    match node {
        Node::Map(entries) => Ok(entries.clone()),
        Node::ArrayMap(items) => {
            let mut out = im::HashMap::new();
            for pair in items.chunks_exact(2) {
                out.insert(pair[0].clone(), pair[1].clone());
            }
            Ok(out)
        }
        Node::Literal(Literal::Nil) => Ok(im::HashMap::new()),
        other => Err(SorrelError::coerce(other, "map")),
    }
}
