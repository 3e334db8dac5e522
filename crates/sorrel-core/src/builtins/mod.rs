use crate::env::{Env, EnvRef};
use crate::error::SorrelError;
use crate::eval;
use crate::reader;

mod core;
mod fs;
mod math;
mod string;

#[macro_export]
macro_rules! def_native {

    ($env:expr, $name:expr, |$args:ident, $callenv:ident| $body:block) => {
        $env.define(
            $name,
            $crate::ast::Node::native_fn($name, move |$args: &[$crate::ast::Node], $callenv: &$crate::env::EnvRef| -> Result<$crate::ast::Node, $crate::error::SorrelError> {
                $body
            }),
        );
    };
    ($env:expr, $name:expr, |$args:ident, $callenv:ident| $body:expr) => {
        $env.define(
            $name,
            $crate::ast::Node::native_fn($name, move |$args: &[$crate::ast::Node], $callenv: &$crate::env::EnvRef| -> Result<$crate::ast::Node, $crate::error::SorrelError> {
                $body
            }),
        );
    };

}

pub use def_native;

pub(crate) fn install(env: &mut Env) {
    math::install(env);
    core::install(env);
    string::install(env);
    fs::install(env);
}

const PRELUDE: &str = include_str!("../../assets/prelude.sor");

/// Evaluates the embedded prelude into the root scope. The prelude is
/// part of the runtime; failing to load it is a build defect, not a
/// recoverable condition.
pub(crate) fn install_prelude(root: &EnvRef) {
    let forms = reader::parse(PRELUDE)
        .unwrap_or_else(|err| panic!("prelude does not parse: {}", err));
    for form in &forms {
        if let Err(err) = eval::eval(form, root) {
            panic!("prelude does not evaluate: {}", err);
        }
    }
}

pub fn err<T>(message: impl Into<String>) -> Result<T, SorrelError> {
    Err(SorrelError::eval(message))
}
