//! Message Payloads
//!
//! A [`Message`] is an ordered, immutable sequence of tagged [`Value`]s.
//! Handlers pattern-match on the variants instead of downcasting opaque
//! payloads. The backing storage is an `Arc<[Value]>`, so cloning a message
//! (for example when an event is deferred and re-queued) never copies values.

use crate::reference::ActorRef;
use std::fmt;
use std::sync::Arc;

/// A single payload element
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Unit,
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
    Bytes(Vec<u8>),
    /// Handle to another actor, so references can travel inside messages
    Actor(ActorRef),
    List(Vec<Value>),
}

impl Value {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Str(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            Value::Int(i) => Some(*i),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_float(&self) -> Option<f64> {
        match self {
            Value::Float(f) => Some(*f),
            _ => None,
        }
    }

    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            Value::Bytes(b) => Some(b),
            _ => None,
        }
    }

    pub fn as_actor(&self) -> Option<&ActorRef> {
        match self {
            Value::Actor(actor) => Some(actor),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[Value]> {
        match self {
            Value::List(values) => Some(values),
            _ => None,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Unit => write!(f, "()"),
            Value::Bool(b) => write!(f, "{}", b),
            Value::Int(i) => write!(f, "{}", i),
            Value::Float(x) => write!(f, "{}", x),
            Value::Str(s) => write!(f, "{}", s),
            Value::Bytes(bytes) => {
                write!(f, "0x")?;
                for byte in bytes {
                    write!(f, "{:02x}", byte)?;
                }
                Ok(())
            }
            Value::Actor(actor) => write!(f, "{}", actor),
            Value::List(values) => write_sequence(f, values),
        }
    }
}

impl From<()> for Value {
    fn from(_: ()) -> Self {
        Value::Unit
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Value::Int(i)
    }
}

impl From<i32> for Value {
    fn from(i: i32) -> Self {
        Value::Int(i64::from(i))
    }
}

impl From<u32> for Value {
    fn from(i: u32) -> Self {
        Value::Int(i64::from(i))
    }
}

impl From<f64> for Value {
    fn from(x: f64) -> Self {
        Value::Float(x)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Str(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Str(s)
    }
}

impl From<Vec<u8>> for Value {
    fn from(bytes: Vec<u8>) -> Self {
        Value::Bytes(bytes)
    }
}

impl From<ActorRef> for Value {
    fn from(actor: ActorRef) -> Self {
        Value::Actor(actor)
    }
}

impl From<&ActorRef> for Value {
    fn from(actor: &ActorRef) -> Self {
        Value::Actor(actor.clone())
    }
}

impl From<Vec<Value>> for Value {
    fn from(values: Vec<Value>) -> Self {
        Value::List(values)
    }
}

/// Ordered, immutable payload carried by an event
#[derive(Debug, Clone, PartialEq)]
pub struct Message {
    values: Arc<[Value]>,
}

impl Message {
    /// Create a message with no values
    pub fn empty() -> Self {
        Self {
            values: Arc::from(Vec::new()),
        }
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Value> {
        self.values.get(index)
    }

    pub fn first(&self) -> Option<&Value> {
        self.values.first()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Value> {
        self.values.iter()
    }

    pub fn as_slice(&self) -> &[Value] {
        &self.values
    }

    /// Iterate over the string elements only, skipping other variants
    pub fn strings(&self) -> impl Iterator<Item = &str> {
        self.values.iter().filter_map(Value::as_str)
    }
}

impl Default for Message {
    fn default() -> Self {
        Self::empty()
    }
}

impl From<Vec<Value>> for Message {
    fn from(values: Vec<Value>) -> Self {
        Self {
            values: Arc::from(values),
        }
    }
}

impl From<Value> for Message {
    fn from(value: Value) -> Self {
        Self::from(vec![value])
    }
}

impl FromIterator<Value> for Message {
    fn from_iter<I: IntoIterator<Item = Value>>(iter: I) -> Self {
        Self::from(iter.into_iter().collect::<Vec<_>>())
    }
}

impl<'a> IntoIterator for &'a Message {
    type Item = &'a Value;
    type IntoIter = std::slice::Iter<'a, Value>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl fmt::Display for Message {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_sequence(f, &self.values)
    }
}

fn write_sequence(f: &mut fmt::Formatter<'_>, values: &[Value]) -> fmt::Result {
    write!(f, "[ ")?;
    for value in values {
        write!(f, "{} ", value)?;
    }
    write!(f, "]")
}

/// Build a [`Message`] from values convertible into [`Value`]
///
/// ```rust
/// use actor_runtime::{message, Value};
///
/// let msg = message!["foo", 42, true];
/// assert_eq!(msg.len(), 3);
/// assert_eq!(msg.get(1), Some(&Value::Int(42)));
/// ```
#[macro_export]
macro_rules! message {
    () => {
        $crate::Message::empty()
    };
    ($($value:expr),+ $(,)?) => {
        $crate::Message::from(vec![$($crate::Value::from($value)),+])
    };
}
