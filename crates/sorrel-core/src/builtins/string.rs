use crate::ast::Node;
use crate::def_native;
use crate::env::Env;
use crate::error::SorrelError;
use crate::interop::FromNode;
use crate::printer::display_string;

pub(crate) fn install(env: &mut Env) {
    def_native!(env, "str", |args, _env| {
        let mut out = String::new();
        for arg in args {
            out.push_str(&display_string(arg));
        }
        Ok(Node::string(out))
    });

    def_native!(env, "format", |args, _env| {
        if args.is_empty() {
            return Err(SorrelError::arity("wrong number of arguments for format"));
        }
        let template = String::from_node(&args[0])?;
        format_template(&template, &args[1..])
    });
}

/// Substitutes `%v` and `%s` with the display rendering of the next
/// argument; `%%` is a literal percent sign.
fn format_template(template: &str, args: &[Node]) -> Result<Node, SorrelError> {
    let mut out = String::with_capacity(template.len());
    let mut rest = args.iter();
    let mut chars = template.chars();
    while let Some(c) = chars.next() {
        if c != '%' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('v') | Some('s') => match rest.next() {
                Some(arg) => out.push_str(&display_string(arg)),
                None => {
                    return Err(SorrelError::arity(format!(
                        "not enough arguments for format template {:?}",
                        template
                    )))
                }
            },
            Some('%') => out.push('%'),
            other => {
                return Err(SorrelError::eval(format!(
                    "unsupported format directive %{}",
                    other.map(String::from).unwrap_or_default()
                )))
            }
        }
    }
    Ok(Node::string(out))
}
