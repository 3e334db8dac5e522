use std::any::Any;
use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, RwLock};

use once_cell::sync::Lazy;

use crate::ast::{Literal, Node};
use crate::error::SorrelError;
use crate::seq;

/// A host value carried through the language opaquely. The tag picks
/// the member table that `.name` calls dispatch on.
#[derive(Clone)]
pub struct ForeignValue {
    pub tag: String,
    data: Arc<dyn Any + Send + Sync>,
}

impl ForeignValue {
    pub fn new(tag: impl Into<String>, data: impl Any + Send + Sync) -> Self {
        ForeignValue {
            tag: tag.into(),
            data: Arc::new(data),
        }
    }

    pub fn downcast<T: Any>(&self) -> Result<&T, SorrelError> {
        self.data.downcast_ref::<T>().ok_or_else(|| {
            SorrelError::interop(format!("foreign value {} holds an unexpected type", self.tag))
        })
    }

    /// Identity, not structure: two foreign nodes are equal when they
    /// share the same allocation.
    pub(crate) fn same_value(&self, other: &ForeignValue) -> bool {
        Arc::ptr_eq(&self.data, &other.data)
    }

    pub(crate) fn identity(&self) -> usize {
        Arc::as_ptr(&self.data) as *const () as usize
    }
}

impl fmt::Debug for ForeignValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<foreign {}>", self.tag)
    }
}

type MemberFn = Arc<dyn Fn(&ForeignValue, &[Node]) -> Result<Node, SorrelError> + Send + Sync>;

#[derive(Default)]
struct MemberTable {
    members: HashMap<String, MemberFn>,
}

static REGISTRY: Lazy<RwLock<HashMap<String, MemberTable>>> =
    Lazy::new(|| RwLock::new(HashMap::new()));

/// Starts a member table for `tag`. Finish with `install`:
///
/// ```ignore
/// register_type("app/Counter")
///     .member("value", |counter, _args| { ... })
///     .member("add", |counter, args| { ... })
///     .install();
/// ```
pub fn register_type(tag: impl Into<String>) -> TypeBuilder {
    TypeBuilder {
        tag: tag.into(),
        table: MemberTable::default(),
    }
}

pub struct TypeBuilder {
    tag: String,
    table: MemberTable,
}

impl TypeBuilder {
    pub fn member(
        mut self,
        name: &str,
        func: impl Fn(&ForeignValue, &[Node]) -> Result<Node, SorrelError> + Send + Sync + 'static,
    ) -> Self {
        self.table.members.insert(name.to_string(), Arc::new(func));
        self
    }

    pub fn install(self) {
        REGISTRY.write().unwrap().insert(self.tag, self.table);
    }
}

/// Dispatches `(.name receiver arg...)`: the receiver must be a
/// foreign value whose tag has `name` in its member table.
pub(crate) fn call_member(name: &str, args: &[Node]) -> Result<Node, SorrelError> {
    let receiver = match args.first() {
        Some(receiver) => receiver,
        None => {
            return Err(SorrelError::interop(format!(
                "member call .{} needs a receiver",
                name
            )))
        }
    };
    let foreign = match receiver {
        Node::Literal(Literal::Foreign(foreign)) => foreign,
        other => {
            return Err(SorrelError::interop(format!(
                "{} is not a member of {}",
                name,
                other.type_name()
            )))
        }
    };
    let member = {
        let registry = REGISTRY.read().unwrap();
        let table = registry.get(&foreign.tag).ok_or_else(|| {
            SorrelError::interop(format!("no members registered for {}", foreign.tag))
        })?;
        let member = table.members.get(name).ok_or_else(|| {
            SorrelError::interop(format!("{} is not a member of {}", name, foreign.tag))
        })?;
        Arc::clone(member)
    };
    member(foreign, &args[1..])
}

/// Conversion from nodes into host values. Callers get a coercion
/// error naming the value and the target, never a panic.
pub trait FromNode: Sized {
    fn from_node(node: &Node) -> Result<Self, SorrelError>;
}

/// Conversion from host values into nodes.
pub trait IntoNode {
    fn into_node(self) -> Node;
}

/// Element-wise coercion for variadic argument tails.
pub fn from_nodes<T: FromNode>(nodes: &[Node]) -> Result<Vec<T>, SorrelError> {
    nodes.iter().map(T::from_node).collect()
}

impl FromNode for Node {
    fn from_node(node: &Node) -> Result<Self, SorrelError> {
        Ok(node.clone())
    }
}

impl FromNode for f64 {
    fn from_node(node: &Node) -> Result<Self, SorrelError> {
        match node {
            Node::Literal(Literal::Number(value)) => Ok(*value),
            other => Err(SorrelError::coerce(other, "number")),
        }
    }
}

impl FromNode for i64 {
    fn from_node(node: &Node) -> Result<Self, SorrelError> {
        Ok(f64::from_node(node)? as i64)
    }
}

impl FromNode for usize {
    fn from_node(node: &Node) -> Result<Self, SorrelError> {
        let value = f64::from_node(node)?;
        if value < 0.0 {
            return Err(SorrelError::coerce(node, "non-negative index"));
        }
        Ok(value as usize)
    }
}

impl FromNode for bool {
    fn from_node(node: &Node) -> Result<Self, SorrelError> {
        match node {
            Node::Literal(Literal::Bool(value)) => Ok(*value),
            other => Err(SorrelError::coerce(other, "bool")),
        }
    }
}

impl FromNode for String {
    fn from_node(node: &Node) -> Result<Self, SorrelError> {
        match node {
            Node::Literal(Literal::Str(value)) => Ok(value.clone()),
            other => Err(SorrelError::coerce(other, "string")),
        }
    }
}

impl<T: FromNode> FromNode for Option<T> {
    fn from_node(node: &Node) -> Result<Self, SorrelError> {
        match node {
            Node::Literal(Literal::Nil) => Ok(None),
            other => Ok(Some(T::from_node(other)?)),
        }
    }
}

impl<T: FromNode> FromNode for Vec<T> {
    fn from_node(node: &Node) -> Result<Self, SorrelError> {
        let items = seq::seq(node).map_err(|_| SorrelError::coerce(node, "sequence"))?;
        from_nodes(&items)
    }
}

impl IntoNode for Node {
    fn into_node(self) -> Node {
        self
    }
}

impl IntoNode for () {
    fn into_node(self) -> Node {
        Node::nil()
    }
}

impl IntoNode for bool {
    fn into_node(self) -> Node {
        Node::bool(self)
    }
}

impl IntoNode for f64 {
    fn into_node(self) -> Node {
        Node::number(self)
    }
}

impl IntoNode for i64 {
    fn into_node(self) -> Node {
        Node::number(self as f64)
    }
}

impl IntoNode for usize {
    fn into_node(self) -> Node {
        Node::number(self as f64)
    }
}

impl IntoNode for String {
    fn into_node(self) -> Node {
        Node::string(self)
    }
}

impl IntoNode for &str {
    fn into_node(self) -> Node {
        Node::string(self)
    }
}

impl<T: IntoNode> IntoNode for Option<T> {
    fn into_node(self) -> Node {
        match self {
            Some(value) => value.into_node(),
            None => Node::nil(),
        }
    }
}

impl<T: IntoNode> IntoNode for Vec<T> {
    fn into_node(self) -> Node {
        Node::List(self.into_iter().map(IntoNode::into_node).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn number_coercions() {
        assert_eq!(f64::from_node(&Node::number(1.5)).unwrap(), 1.5);
        assert_eq!(i64::from_node(&Node::number(4.0)).unwrap(), 4);
        assert!(usize::from_node(&Node::number(-1.0)).is_err());
        let err = f64::from_node(&Node::string("a")).unwrap_err();
        assert_eq!(err.to_string(), "cannot convert \"a\" to number");
    }

    #[test]
    fn option_maps_nil() {
        assert_eq!(Option::<f64>::from_node(&Node::nil()).unwrap(), None);
        assert_eq!(
            Option::<f64>::from_node(&Node::number(2.0)).unwrap(),
            Some(2.0)
        );
        assert_eq!(None::<f64>.into_node(), Node::nil());
    }

    #[test]
    fn sequences_coerce_element_wise() {
        let node = Node::Vector(vec![Node::number(1.0), Node::number(2.0)]);
        assert_eq!(Vec::<f64>::from_node(&node).unwrap(), vec![1.0, 2.0]);
        assert!(Vec::<f64>::from_node(&Node::Vector(vec![Node::string("x")])).is_err());
        assert_eq!(vec![1.0, 2.0].into_node().type_name(), "list");
    }

    #[test]
    fn foreign_identity() {
        let a = ForeignValue::new("t/X", 1u8);
        let b = a.clone();
        let c = ForeignValue::new("t/X", 1u8);
        assert!(a.same_value(&b));
        assert!(!a.same_value(&c));
        assert_eq!(a.downcast::<u8>().unwrap(), &1u8);
        assert!(a.downcast::<u16>().is_err());
    }
}
