use crate::ast::Node;
use crate::def_native;
use crate::env::Env;
use crate::error::SorrelError;
use crate::interop::from_nodes;

pub(crate) fn install(env: &mut Env) {
    def_native!(env, "+", |args, _env| fold(args, |x, y| x + y));
    def_native!(env, "-", |args, _env| fold(args, |x, y| x - y));
    def_native!(env, "*", |args, _env| fold(args, |x, y| x * y));
    def_native!(env, "/", |args, _env| fold(args, |x, y| x / y));
    def_native!(env, "min", |args, _env| fold(args, f64::min));
    def_native!(env, "max", |args, _env| fold(args, f64::max));

    def_native!(env, "mod", |args, _env| {
        let (x, y) = two_numbers("mod", args)?;
        if y as i64 == 0 {
            return Err(SorrelError::eval("division by zero in mod"));
        }
        Ok(Node::number((x as i64 % y as i64) as f64))
    });

    def_native!(env, "=", |args, _env| {
        if args.len() != 2 {
            return Err(SorrelError::arity("wrong number of arguments for ="));
        }
        Ok(Node::bool(args[0] == args[1]))
    });
    def_native!(env, "<", |args, _env| compare("<", args, |x, y| x < y));
    def_native!(env, ">", |args, _env| compare(">", args, |x, y| x > y));
    def_native!(env, "<=", |args, _env| compare("<=", args, |x, y| x <= y));
    def_native!(env, ">=", |args, _env| compare(">=", args, |x, y| x >= y));
}

/// Folds numbers left to right; one argument gives itself back, no
/// arguments is an error.
fn fold(args: &[Node], op: impl Fn(f64, f64) -> f64) -> Result<Node, SorrelError> {
    let numbers: Vec<f64> = from_nodes(args)?;
    let (first, rest) = match numbers.split_first() {
        Some(split) => split,
        None => {
            return Err(SorrelError::arity(
                "wrong number of arguments for an arithmetic op",
            ))
        }
    };
    Ok(Node::number(rest.iter().fold(*first, |acc, x| op(acc, *x))))
}

fn compare(
    name: &str,
    args: &[Node],
    op: impl Fn(f64, f64) -> bool,
) -> Result<Node, SorrelError> {
    let (x, y) = two_numbers(name, args)?;
    Ok(Node::bool(op(x, y)))
}

fn two_numbers(name: &str, args: &[Node]) -> Result<(f64, f64), SorrelError> {
    if args.len() != 2 {
        return Err(SorrelError::arity(format!(
            "wrong number of arguments for {}",
            name
        )));
    }
    let numbers: Vec<f64> = from_nodes(args)?;
    Ok((numbers[0], numbers[1]))
}
