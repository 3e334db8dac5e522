use std::collections::hash_map::DefaultHasher;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::mem;
use std::sync::Arc;

use crate::env::EnvRef;
use crate::error::SorrelError;
use crate::eval::Step;
use crate::interop::ForeignValue;

/// A parsed form. Code and data share this one representation: the
/// evaluator walks the same nodes the reader produced and the same
/// nodes macros rebuild.
#[derive(Debug, Clone)]
pub enum Node {
    Literal(Literal),
    Symbol(String),
    Keyword(String),
    List(Vec<Node>),
    Vector(Vec<Node>),
    /// Unevaluated map literal, flat `[k1 v1 k2 v2 ...]` pairs in
    /// source order. Promoted to `Map` the first time it is evaluated.
    ArrayMap(Vec<Node>),
    Map(im::HashMap<Node, Node>),
}

#[derive(Debug, Clone)]
pub enum Literal {
    Nil,
    Bool(bool),
    Number(f64),
    Str(String),
    Callable(Callable),
    /// Member designator produced by evaluating a `.name` symbol.
    /// Calling it dispatches on the tag of its first argument.
    Member(String),
    Foreign(ForeignValue),
}

#[derive(Debug, Clone)]
pub enum Callable {
    Special(&'static SpecialForm),
    Fn(Arc<Lambda>),
    Macro(Arc<Lambda>),
    Native(Arc<NativeFn>),
}

pub type SpecialFn = fn(&[Node], &EnvRef) -> Result<Step, SorrelError>;

/// A form evaluated with unevaluated arguments. Installed once as a
/// static, looked up through the environment like any other binding.
#[derive(Debug)]
pub struct SpecialForm {
    pub name: &'static str,
    pub func: SpecialFn,
}

/// A closure built by `fn` or `macro`. `env` is the child of the
/// defining environment the body closes over; a self-name is bound
/// there so the body can recurse without a top level definition.
pub struct Lambda {
    pub name: Option<String>,
    pub params: Node,
    pub body: Vec<Node>,
    pub env: EnvRef,
}

impl fmt::Debug for Lambda {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Lambda")
            .field("name", &self.name)
            .field("params", &self.params)
            .finish_non_exhaustive()
    }
}

type NativeFunc = Box<dyn Fn(&[Node], &EnvRef) -> Result<Step, SorrelError> + Send + Sync>;

/// A host function callable from the language. Most natives return a
/// plain value; `NativeFn::tail` builds the few that hand a form back
/// to the trampoline instead.
pub struct NativeFn {
    name: String,
    func: NativeFunc,
}

impl NativeFn {
    pub fn new(
        name: impl Into<String>,
        func: impl Fn(&[Node], &EnvRef) -> Result<Node, SorrelError> + Send + Sync + 'static,
    ) -> Self {
        NativeFn {
            name: name.into(),
            func: Box::new(move |args, env| func(args, env).map(Step::Value)),
        }
    }

    pub fn tail(
        name: impl Into<String>,
        func: impl Fn(&[Node], &EnvRef) -> Result<Step, SorrelError> + Send + Sync + 'static,
    ) -> Self {
        NativeFn {
            name: name.into(),
            func: Box::new(func),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn call(&self, args: &[Node], env: &EnvRef) -> Result<Step, SorrelError> {
        (self.func)(args, env)
    }
}

impl fmt::Debug for NativeFn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NativeFn")
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}

impl Node {
    pub fn nil() -> Node {
        Node::Literal(Literal::Nil)
    }

    pub fn bool(value: bool) -> Node {
        Node::Literal(Literal::Bool(value))
    }

    pub fn number(value: f64) -> Node {
        Node::Literal(Literal::Number(value))
    }

    pub fn string(value: impl Into<String>) -> Node {
        Node::Literal(Literal::Str(value.into()))
    }

    pub fn symbol(name: impl Into<String>) -> Node {
        Node::Symbol(name.into())
    }

    pub fn keyword(name: impl Into<String>) -> Node {
        Node::Keyword(name.into())
    }

    pub fn list(items: Vec<Node>) -> Node {
        Node::List(items)
    }

    pub fn foreign(value: ForeignValue) -> Node {
        Node::Literal(Literal::Foreign(value))
    }

    pub fn native_fn(
        name: &str,
        func: impl Fn(&[Node], &EnvRef) -> Result<Node, SorrelError> + Send + Sync + 'static,
    ) -> Node {
        Node::Literal(Literal::Callable(Callable::Native(Arc::new(NativeFn::new(
            name, func,
        )))))
    }

    pub fn native_tail_fn(
        name: &str,
        func: impl Fn(&[Node], &EnvRef) -> Result<Step, SorrelError> + Send + Sync + 'static,
    ) -> Node {
        Node::Literal(Literal::Callable(Callable::Native(Arc::new(
            NativeFn::tail(name, func),
        ))))
    }

    /// Builds `(name arg...)`.
    pub fn call(name: &str, args: Vec<Node>) -> Node {
        let mut items = vec![Node::symbol(name)];
        items.extend(args);
        Node::List(items)
    }

    /// Everything is truthy except `nil` and `false`.
    pub fn is_truthy(&self) -> bool {
        !matches!(self, Node::Literal(Literal::Nil) | Node::Literal(Literal::Bool(false)))
    }

    /// The head symbol of a call form, if there is one.
    pub fn head_symbol(&self) -> Option<&str> {
        match self {
            Node::List(items) => match items.first() {
                Some(Node::Symbol(name)) => Some(name.as_str()),
                _ => None,
            },
            _ => None,
        }
    }

    pub fn type_name(&self) -> &'static str {
        match self {
            Node::Literal(Literal::Nil) => "nil",
            Node::Literal(Literal::Bool(_)) => "bool",
            Node::Literal(Literal::Number(_)) => "number",
            Node::Literal(Literal::Str(_)) => "string",
            Node::Literal(Literal::Callable(Callable::Special(_))) => "special",
            Node::Literal(Literal::Callable(Callable::Macro(_))) => "macro",
            Node::Literal(Literal::Callable(_)) => "fn",
            Node::Literal(Literal::Member(_)) => "member",
            Node::Literal(Literal::Foreign(_)) => "foreign",
            Node::Symbol(_) => "symbol",
            Node::Keyword(_) => "keyword",
            Node::List(_) => "list",
            Node::Vector(_) => "vector",
            Node::ArrayMap(_) | Node::Map(_) => "map",
        }
    }
}

impl PartialEq for Node {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Node::Literal(a), Node::Literal(b)) => a == b,
            (Node::Symbol(a), Node::Symbol(b)) => a == b,
            (Node::Keyword(a), Node::Keyword(b)) => a == b,
            (Node::List(a), Node::List(b)) => a == b,
            (Node::Vector(a), Node::Vector(b)) => a == b,
            (Node::ArrayMap(a), Node::ArrayMap(b)) => a == b,
            (Node::Map(a), Node::Map(b)) => a == b,
            _ => false,
        }
    }
}

impl Eq for Node {}

impl Hash for Node {
    fn hash<H: Hasher>(&self, state: &mut H) {
        mem::discriminant(self).hash(state);
        match self {
            Node::Literal(literal) => literal.hash(state),
            Node::Symbol(name) | Node::Keyword(name) => name.hash(state),
            Node::List(items) | Node::Vector(items) | Node::ArrayMap(items) => {
                for item in items {
                    item.hash(state);
                }
            }
            // Iteration order of the backing map depends on its seed,
            // so fold per-entry hashes with xor to stay order blind.
            Node::Map(entries) => {
                let mut acc = 0u64;
                for entry in entries.iter() {
                    let mut hasher = DefaultHasher::new();
                    entry.hash(&mut hasher);
                    acc ^= hasher.finish();
                }
                acc.hash(state);
                entries.len().hash(state);
            }
        }
    }
}

impl PartialEq for Literal {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Literal::Nil, Literal::Nil) => true,
            (Literal::Bool(a), Literal::Bool(b)) => a == b,
            (Literal::Number(a), Literal::Number(b)) => a.to_bits() == b.to_bits(),
            (Literal::Str(a), Literal::Str(b)) => a == b,
            (Literal::Callable(a), Literal::Callable(b)) => a == b,
            (Literal::Member(a), Literal::Member(b)) => a == b,
            (Literal::Foreign(a), Literal::Foreign(b)) => a.same_value(b),
            _ => false,
        }
    }
}

impl Eq for Literal {}

impl Hash for Literal {
    fn hash<H: Hasher>(&self, state: &mut H) {
        mem::discriminant(self).hash(state);
        match self {
            Literal::Nil => {}
            Literal::Bool(value) => value.hash(state),
            Literal::Number(value) => value.to_bits().hash(state),
            Literal::Str(value) => value.hash(state),
            Literal::Callable(callable) => callable.hash(state),
            Literal::Member(name) => name.hash(state),
            Literal::Foreign(value) => value.identity().hash(state),
        }
    }
}

impl PartialEq for Callable {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Callable::Special(a), Callable::Special(b)) => std::ptr::eq(*a, *b),
            (Callable::Fn(a), Callable::Fn(b)) => Arc::ptr_eq(a, b),
            (Callable::Macro(a), Callable::Macro(b)) => Arc::ptr_eq(a, b),
            (Callable::Native(a), Callable::Native(b)) => Arc::ptr_eq(a, b),
            _ => false,
        }
    }
}

impl Eq for Callable {}

impl Hash for Callable {
    fn hash<H: Hasher>(&self, state: &mut H) {
        mem::discriminant(self).hash(state);
        match self {
            Callable::Special(form) => (*form as *const SpecialForm as usize).hash(state),
            Callable::Fn(lambda) | Callable::Macro(lambda) => {
                (Arc::as_ptr(lambda) as usize).hash(state)
            }
            Callable::Native(native) => (Arc::as_ptr(native) as usize).hash(state),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn equal_maps_hash_alike() {
        let a = Node::Map(im::hashmap! {
            Node::keyword("x") => Node::number(1.0),
            Node::keyword("y") => Node::number(2.0),
        });
        let b = Node::Map(im::hashmap! {
            Node::keyword("y") => Node::number(2.0),
            Node::keyword("x") => Node::number(1.0),
        });
        assert_eq!(a, b);
        let hash = |node: &Node| {
            let mut hasher = DefaultHasher::new();
            node.hash(&mut hasher);
            hasher.finish()
        };
        assert_eq!(hash(&a), hash(&b));
    }

    #[test]
    fn numbers_compare_by_bits() {
        assert_eq!(Node::number(1.0), Node::number(1.0));
        assert_ne!(Node::number(0.0), Node::number(-0.0));
    }

    #[test]
    fn truthiness() {
        assert!(!Node::nil().is_truthy());
        assert!(!Node::bool(false).is_truthy());
        assert!(Node::number(0.0).is_truthy());
        assert!(Node::string("").is_truthy());
        assert!(Node::List(vec![]).is_truthy());
    }
}
