use std::fs;
use std::path::Path;

use crate::ast::Node;
use crate::def_native;
use crate::env::Env;
use crate::error::SorrelError;
use crate::interop::FromNode;

pub(crate) fn install(env: &mut Env) {
    def_native!(env, "slurp", |args, _env| {
        let path = one_path("slurp", args)?;
        match fs::read_to_string(&path) {
            Ok(content) => Ok(Node::string(content)),
            Err(io) => Err(SorrelError::interop(format!(
                "error reading file {}: {}",
                path, io
            ))),
        }
    });

    def_native!(env, "spit", |args, _env| {
        if args.len() != 2 {
            return Err(SorrelError::arity("wrong number of arguments for spit"));
        }
        let path = String::from_node(&args[0])?;
        let content = String::from_node(&args[1])?;
        if let Some(parent) = Path::new(&path).parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).map_err(|io| {
                    SorrelError::interop(format!(
                        "error creating directory for path {}: {}",
                        path, io
                    ))
                })?;
            }
        }
        fs::write(&path, content).map_err(|io| {
            SorrelError::interop(format!("error writing file {}: {}", path, io))
        })?;
        Ok(Node::nil())
    });
}

fn one_path(name: &str, args: &[Node]) -> Result<String, SorrelError> {
    if args.len() != 1 {
        return Err(SorrelError::arity(format!(
            "wrong number of arguments for {}",
            name
        )));
    }
    String::from_node(&args[0])
}
