use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use once_cell::sync::Lazy;

use crate::ast::Node;
use crate::error::SorrelError;

pub type EnvRef = Arc<RwLock<Env>>;

pub fn new_ref(env: Env) -> EnvRef {
    Arc::new(RwLock::new(env))
}

/// One lexical scope. Lookup walks the `outer` chain; writes always
/// land in the innermost scope.
#[derive(Debug)]
pub struct Env {
    data: HashMap<String, Node>,
    outer: Option<EnvRef>,
    allow_redefine: bool,
}

/// The shared root scope. Seeded once with the special forms, the
/// native functions and the prelude; every session chains off it.
static ROOT: Lazy<EnvRef> = Lazy::new(|| {
    let mut env = Env {
        data: HashMap::new(),
        outer: None,
        allow_redefine: false,
    };
    env.define("nil", Node::nil());
    env.define("true", Node::bool(true));
    env.define("false", Node::bool(false));
    crate::eval::install(&mut env);
    crate::builtins::install(&mut env);
    let root = new_ref(env);
    crate::builtins::install_prelude(&root);
    root
});

pub fn root_env() -> EnvRef {
    ROOT.clone()
}

impl Env {
    /// A fresh top level scope under the root. Scripts run with
    /// `allow_redefine` off, the REPL with it on.
    pub fn session(allow_redefine: bool) -> EnvRef {
        new_ref(Env {
            data: HashMap::new(),
            outer: Some(root_env()),
            allow_redefine,
        })
    }

    pub fn new_child(outer: EnvRef) -> Env {
        let allow_redefine = outer.read().unwrap().allow_redefine;
        Env {
            data: HashMap::new(),
            outer: Some(outer),
            allow_redefine,
        }
    }

    /// A scope with no parent at all, used when a binder only needs to
    /// record which names a pattern would introduce.
    pub(crate) fn detached() -> Env {
        Env {
            data: HashMap::new(),
            outer: None,
            allow_redefine: false,
        }
    }

    pub fn get(&self, key: &str) -> Option<Node> {
        match self.data.get(key) {
            Some(node) => Some(node.clone()),
            None => match &self.outer {
                Some(outer) => outer.read().unwrap().get(key),
                None => None,
            },
        }
    }

    pub fn contains_local(&self, key: &str) -> bool {
        self.data.contains_key(key)
    }

    /// Binds `key` in this scope. `_` is a discard and binds nothing.
    /// Rebinding an existing name is refused unless the scope allows
    /// redefinition.
    pub fn set(&mut self, key: &str, value: Node) -> Result<(), SorrelError> {
        if key == "_" {
            return Ok(());
        }
        if !self.allow_redefine && self.data.contains_key(key) {
            return Err(SorrelError::redefine(format!("must not redefine {}", key)));
        }
        self.data.insert(key.to_string(), value);
        Ok(())
    }

    /// Installs a binding unconditionally, bypassing the redefinition
    /// policy. Only used while seeding the root scope.
    pub fn define(&mut self, key: &str, value: Node) {
        self.data.insert(key.to_string(), value);
    }

    /// `def` is only legal here: the root itself or a scope directly
    /// under it.
    pub fn is_top_level(&self) -> bool {
        match &self.outer {
            None => true,
            Some(outer) => outer.read().unwrap().outer.is_none(),
        }
    }
}
