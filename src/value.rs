//! Dynamic values storable in record fields.

use std::{
    fmt,
    hash::{Hash, Hasher},
    mem,
};

use ordered_float::OrderedFloat;

use crate::{
    err::RecordError,
    gc::Gc,
    records::{self, Record, fmt_record, record_eq, record_eql},
    symbols::Symbol,
};

#[derive(Debug, Clone, Default, derive_more::From)]
pub enum Value {
    #[default]
    #[from(ignore)]
    Nil,
    Boolean(bool),
    Integer(i64),
    Float(OrderedFloat<f64>),
    String(String),
    Symbol(Symbol),
    List(Vec<Value>),
    Map(ValueMap),
    Record(Gc<Record>),
}

impl Value {
    pub fn is_nil(&self) -> bool {
        matches!(self, Self::Nil)
    }

    pub fn type_name(&self) -> &'static str {
        match self {
            Self::Nil => "nil",
            Self::Boolean(_) => "bool",
            Self::Integer(_) => "integer",
            Self::Float(_) => "float",
            Self::String(_) => "string",
            Self::Symbol(_) => "symbol",
            Self::List(_) => "list",
            Self::Map(_) => "map",
            Self::Record(_) => "record",
        }
    }

    /// Strict equivalence. Numeric values of different kinds are never
    /// equivalent; records compare structurally through [`record_eql`].
    pub fn eqv(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Nil, Self::Nil) => true,
            (Self::Boolean(a), Self::Boolean(b)) => a == b,
            (Self::Integer(a), Self::Integer(b)) => a == b,
            (Self::Float(a), Self::Float(b)) => a == b,
            (Self::String(a), Self::String(b)) => a == b,
            (Self::Symbol(a), Self::Symbol(b)) => a == b,
            (Self::List(a), Self::List(b)) => {
                a.len() == b.len() && a.iter().zip(b).all(|(x, y)| x.eqv(y))
            }
            (Self::Map(a), Self::Map(b)) => a.equal_by(b, Value::eqv),
            (Self::Record(a), Self::Record(b)) => record_eql(a, b),
            _ => false,
        }
    }

    /// General equality: like [`Value::eqv`], except that integers compare
    /// equal to floats of the same magnitude and records go through the loose
    /// comparison.
    pub fn loose_eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Integer(a), Self::Float(b)) | (Self::Float(b), Self::Integer(a)) => {
                *a as f64 == b.into_inner()
            }
            (Self::List(a), Self::List(b)) => {
                a.len() == b.len() && a.iter().zip(b).all(|(x, y)| x.loose_eq(y))
            }
            (Self::Map(a), Self::Map(b)) => a.equal_by(b, Value::loose_eq),
            (Self::Record(a), Self::Record(b)) => record_eq(a, b),
            _ => self.eqv(other),
        }
    }

    /// Field identifier form of the value, if it has one. Strings and symbols
    /// normalize to the same interned symbol.
    pub(crate) fn as_field(&self) -> Option<Symbol> {
        match self {
            Self::Symbol(sym) => Some(*sym),
            Self::String(s) => Some(Symbol::intern(s)),
            _ => None,
        }
    }

    pub(crate) fn hash_u64(&self) -> u64 {
        let mut hasher = std::hash::DefaultHasher::new();
        self.hash_into(&mut hasher);
        hasher.finish()
    }

    fn hash_into<H: Hasher>(&self, hasher: &mut H) {
        mem::discriminant(self).hash(hasher);
        match self {
            Self::Nil => {}
            Self::Boolean(b) => b.hash(hasher),
            Self::Integer(i) => i.hash(hasher),
            Self::Float(f) => f.hash(hasher),
            Self::String(s) => s.hash(hasher),
            Self::Symbol(sym) => sym.to_str().hash(hasher),
            Self::List(items) => {
                items.len().hash(hasher);
                for item in items {
                    item.hash_into(hasher);
                }
            }
            Self::Map(map) => {
                map.len().hash(hasher);
                for (key, value) in map.iter() {
                    key.hash_into(hasher);
                    value.hash_into(hasher);
                }
            }
            Self::Record(rec) => records::numeric_hash(rec).hash(hasher),
        }
    }

    /// One step of a nested lookup. Maps look up by key equivalence, lists by
    /// integer index (negative counts from the end), records by field name.
    /// Anything else is not diggable.
    pub(crate) fn dig_step(&self, key: &Value) -> Result<Value, RecordError> {
        match self {
            Self::Nil => Ok(Value::Nil),
            Self::Map(map) => Ok(map.get(key).cloned().unwrap_or(Value::Nil)),
            Self::List(items) => {
                let Value::Integer(i) = key else {
                    return Err(RecordError::invalid_type("integer", key.type_name()));
                };
                let idx = if *i < 0 {
                    items.len().checked_sub(i.unsigned_abs() as usize)
                } else {
                    Some(*i as usize)
                };
                Ok(idx
                    .and_then(|idx| items.get(idx))
                    .cloned()
                    .unwrap_or(Value::Nil))
            }
            Self::Record(rec) => Ok(rec.read().dig_get(key)),
            _ => Err(RecordError::invalid_type(
                "diggable value",
                self.type_name(),
            )),
        }
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Self::String(s.to_string())
    }
}

impl From<f64> for Value {
    fn from(f: f64) -> Self {
        Self::Float(OrderedFloat(f))
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Nil => write!(f, "nil"),
            Self::Boolean(b) => write!(f, "{b}"),
            Self::Integer(i) => write!(f, "{i}"),
            Self::Float(x) => write!(f, "{x}"),
            Self::String(s) => write!(f, "\"{s}\""),
            Self::Symbol(sym) => write!(f, "{sym}"),
            Self::List(items) => {
                write!(f, "[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{item}")?;
                }
                write!(f, "]")
            }
            Self::Map(map) => {
                write!(f, "{{")?;
                for (i, (key, value)) in map.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{key} => {value}")?;
                }
                write!(f, "}}")
            }
            Self::Record(rec) => write!(f, "{}", fmt_record(rec)),
        }
    }
}

/// An ordered map keyed by value equivalence.
///
/// The std maps are unusable here: `Value` has no coherent `Eq`/`Hash` (float
/// and reference-identity cases), so lookup goes through [`Value::eqv`]
/// instead. Entries keep insertion order.
#[derive(Debug, Clone, Default)]
pub struct ValueMap {
    entries: Vec<(Value, Value)>,
}

impl ValueMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Inserts or replaces the entry whose key is equivalent to `key`. A
    /// replaced entry keeps its original position.
    pub fn insert(&mut self, key: Value, value: Value) {
        match self.entries.iter_mut().find(|(k, _)| k.eqv(&key)) {
            Some(entry) => entry.1 = value,
            None => self.entries.push((key, value)),
        }
    }

    pub fn get(&self, key: &Value) -> Option<&Value> {
        self.entries
            .iter()
            .find(|(k, _)| k.eqv(key))
            .map(|(_, v)| v)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, (Value, Value)> {
        self.entries.iter()
    }

    /// Nested lookup: the first segment indexes this map, later segments
    /// delegate to whatever the found value supports. `Nil` along the way
    /// short-circuits to `Nil`.
    pub fn dig(&self, path: &[Value]) -> Result<Value, RecordError> {
        let Some((first, rest)) = path.split_first() else {
            return Err(RecordError::WrongNumberOfArguments {
                expected: 1,
                provided: 0,
            });
        };
        let mut current = self.get(first).cloned().unwrap_or(Value::Nil);
        for segment in rest {
            if current.is_nil() {
                return Ok(Value::Nil);
            }
            current = current.dig_step(segment)?;
        }
        Ok(current)
    }

    fn equal_by(&self, other: &ValueMap, values_equal: fn(&Value, &Value) -> bool) -> bool {
        self.len() == other.len()
            && self
                .entries
                .iter()
                .all(|(k, v)| other.get(k).is_some_and(|ov| values_equal(v, ov)))
    }
}

impl FromIterator<(Value, Value)> for ValueMap {
    fn from_iter<I: IntoIterator<Item = (Value, Value)>>(iter: I) -> Self {
        let mut map = ValueMap::new();
        for (key, value) in iter {
            map.insert(key, value);
        }
        map
    }
}

impl<'a> IntoIterator for &'a ValueMap {
    type Item = &'a (Value, Value);
    type IntoIter = std::slice::Iter<'a, (Value, Value)>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
