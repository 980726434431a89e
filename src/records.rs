//! Runtime record types and their instances.
//!
//! A [`RecordType`] is a schema created at runtime: an ordered field list, an
//! optional registered name and an initialization style fixed at creation.
//! [`RecordType::construct`] is the only way to build a [`Record`] conforming
//! to it. Equality, hashing and display are structural and explicitly handle
//! the one graph cycle the contract admits: a field holding the record itself.

use std::{
    fmt,
    hash::{DefaultHasher, Hash, Hasher},
    sync::Arc,
};

use indexmap::IndexMap;

use crate::{
    err::RecordError,
    gc::Gc,
    symbols::Symbol,
    value::{Value, ValueMap},
};

/// Host profile the library is running under. Read at the two call sites it
/// affects (type-name validation and hashing), never ambient state.
#[derive(Debug, Default, Copy, Clone, PartialEq, Eq, Hash)]
pub enum Engine {
    /// Reject lowercase type names; hash to an integer.
    #[default]
    Strict,
    /// Treat a lowercase type name as an ordinary field (such hosts cannot
    /// tell name strings from field strings); hash to a string digest.
    Relaxed,
}

/// Construction protocol, fixed once per type.
#[derive(Debug, Default, Copy, Clone, PartialEq, Eq, Hash)]
pub enum InitStyle {
    #[default]
    Positional,
    Keyword,
}

/// Type declaration for a record: ordered fields, optional name, init style.
/// Immutable after creation.
#[derive(Debug)]
pub struct RecordType {
    name: Option<String>,
    fields: Vec<Symbol>,
    init: InitStyle,
}

impl RecordType {
    /// Validates factory arguments and builds the type descriptor.
    ///
    /// The first argument doubles as the type name when it is a string with an
    /// uppercase first letter. Registration of named types is the registry's
    /// job; see [`crate::registry::Registry::define`].
    pub(crate) fn parse(
        args: &[Value],
        init: InitStyle,
        engine: Engine,
    ) -> Result<Self, RecordError> {
        if args.is_empty() {
            return Err(RecordError::MissingFields);
        }
        if args.iter().any(Value::is_nil) {
            return Err(RecordError::NilArgument);
        }
        let (name, field_args) = match &args[0] {
            Value::String(s) => {
                if s.chars().next().is_some_and(|c| c.is_ascii_uppercase()) {
                    (Some(s.clone()), &args[1..])
                } else if engine == Engine::Relaxed {
                    (None, args)
                } else {
                    return Err(RecordError::InvalidIdentifier(s.clone()));
                }
            }
            _ => (None, args),
        };
        if field_args.is_empty() {
            return Err(RecordError::MissingFields);
        }
        let mut fields = Vec::with_capacity(field_args.len());
        for arg in field_args {
            let field = arg.as_field().ok_or_else(|| {
                RecordError::invalid_type("symbol or string", arg.type_name())
            })?;
            fields.push(field);
        }
        Ok(Self { name, fields, init })
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn init(&self) -> InitStyle {
        self.init
    }

    /// Field identifiers in declaration order. Always a fresh copy; the type's
    /// own list is never handed out.
    pub fn fields(&self) -> Vec<Symbol> {
        self.fields.clone()
    }

    pub fn has_field(&self, field: Symbol) -> bool {
        self.fields.contains(&field)
    }

    /// Named read accessor for a declared field.
    pub fn accessor(&self, field: impl Into<Symbol>) -> Result<FieldRef, RecordError> {
        let field = field.into();
        if !self.has_field(field) {
            return Err(RecordError::unknown_member(field));
        }
        Ok(FieldRef { field })
    }

    /// Named write accessor for a declared field.
    pub fn mutator(&self, field: impl Into<Symbol>) -> Result<FieldSet, RecordError> {
        let field = field.into();
        if !self.has_field(field) {
            return Err(RecordError::unknown_member(field));
        }
        Ok(FieldSet { field })
    }

    /// Builds an instance of this type. The argument shape follows the init
    /// style chosen at type creation:
    ///
    /// - `Positional`: the i-th argument is assigned to the i-th field. Excess
    ///   arguments are ignored; missing trailing fields stay unset.
    /// - `Keyword`: zero arguments or a single map from field name to value.
    ///   All keys are validated before anything is assigned, so a failed
    ///   construction is never observable.
    pub fn construct(self: &Arc<Self>, args: &[Value]) -> Result<Gc<Record>, RecordError> {
        let mut record = Record {
            record_type: self.clone(),
            values: IndexMap::new(),
        };
        match self.init {
            InitStyle::Positional => {
                for (field, value) in self.fields.iter().copied().zip(args.iter().cloned()) {
                    record.values.insert(field, value);
                }
            }
            InitStyle::Keyword => {
                let entries = match args {
                    [] => return Ok(Gc::new(record)),
                    [Value::Map(map)] => map,
                    [other] => {
                        return Err(RecordError::invalid_type("map", other.type_name()));
                    }
                    _ => {
                        return Err(RecordError::WrongNumberOfArguments {
                            expected: 1,
                            provided: args.len(),
                        });
                    }
                };
                let mut pairs = Vec::with_capacity(entries.len());
                for (key, value) in entries {
                    let field = key.as_field().ok_or_else(|| {
                        RecordError::invalid_type("symbol or string", key.type_name())
                    })?;
                    if !self.has_field(field) {
                        return Err(RecordError::unknown_member(field));
                    }
                    pairs.push((field, value.clone()));
                }
                for (field, value) in pairs {
                    record.values.insert(field, value);
                }
            }
        }
        Ok(Gc::new(record))
    }

    fn type_hash(&self) -> u64 {
        let mut hasher = DefaultHasher::new();
        self.name.hash(&mut hasher);
        for field in &self.fields {
            field.to_str().hash(&mut hasher);
        }
        self.init.hash(&mut hasher);
        hasher.finish()
    }
}

impl fmt::Display for RecordType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#<record-type")?;
        if let Some(name) = &self.name {
            write!(f, " {name}")?;
        }
        if self.init == InitStyle::Keyword {
            write!(f, " (keyword-init)")?;
        }
        write!(f, ">")
    }
}

/// An instance of a [`RecordType`]. The value store holds only the fields
/// that have been assigned, in assignment order; unset fields read as `Nil`.
#[derive(Debug)]
pub struct Record {
    record_type: Arc<RecordType>,
    values: IndexMap<Symbol, Value>,
}

impl Record {
    pub fn record_type(&self) -> &Arc<RecordType> {
        &self.record_type
    }

    /// Field identifiers in declaration order, as a fresh copy.
    pub fn members(&self) -> Vec<Symbol> {
        self.record_type.fields()
    }

    /// Number of declared fields, set or not.
    pub fn len(&self) -> usize {
        self.record_type.fields.len()
    }

    /// Always false: the factory rejects empty field lists. Present as the
    /// conventional companion to [`Record::len`].
    pub fn is_empty(&self) -> bool {
        self.record_type.fields.is_empty()
    }

    pub fn get(&self, field: impl Into<Symbol>) -> Result<Value, RecordError> {
        let field = field.into();
        self.check_member(field)?;
        Ok(self.value_of(field))
    }

    pub fn set(&mut self, field: impl Into<Symbol>, value: Value) -> Result<(), RecordError> {
        let field = field.into();
        self.check_member(field)?;
        self.values.insert(field, value);
        Ok(())
    }

    /// Field values in declaration order; unset fields yield `Nil`.
    pub fn to_vec(&self) -> Vec<Value> {
        self.record_type
            .fields
            .iter()
            .map(|&field| self.value_of(field))
            .collect()
    }

    /// Copy of the value store. Entry order is assignment order, which is not
    /// necessarily field order.
    pub fn to_map(&self) -> ValueMap {
        self.values
            .iter()
            .map(|(&field, value)| (Value::Symbol(field), value.clone()))
            .collect()
    }

    /// Values for which the predicate holds, in field order.
    pub fn select<P>(&self, mut predicate: P) -> Vec<Value>
    where
        P: FnMut(&Value) -> bool,
    {
        self.to_vec().into_iter().filter(|v| predicate(v)).collect()
    }

    /// Nested lookup rooted at the value store. An unknown or unset first
    /// segment yields `Nil` rather than an error, matching the underlying
    /// mapping's lookup rules; later segments delegate to the found value.
    pub fn dig(&self, path: &[Value]) -> Result<Value, RecordError> {
        let Some((first, rest)) = path.split_first() else {
            return Err(RecordError::WrongNumberOfArguments {
                expected: 1,
                provided: 0,
            });
        };
        let mut current = self.dig_get(first);
        for segment in rest {
            if current.is_nil() {
                return Ok(Value::Nil);
            }
            current = current.dig_step(segment)?;
        }
        Ok(current)
    }

    pub(crate) fn dig_get(&self, key: &Value) -> Value {
        key.as_field()
            .and_then(|field| self.values.get(&field).cloned())
            .unwrap_or(Value::Nil)
    }

    fn value_of(&self, field: Symbol) -> Value {
        self.values.get(&field).cloned().unwrap_or(Value::Nil)
    }

    fn check_member(&self, field: Symbol) -> Result<(), RecordError> {
        if self.record_type.has_field(field) {
            Ok(())
        } else {
            Err(RecordError::unknown_member(field))
        }
    }
}

/// Read half of a generated per-field accessor pair. Routes through the same
/// validated path as [`Record::get`].
#[derive(Debug, Copy, Clone)]
pub struct FieldRef {
    field: Symbol,
}

impl FieldRef {
    pub fn field(&self) -> Symbol {
        self.field
    }

    pub fn get(&self, rec: &Gc<Record>) -> Result<Value, RecordError> {
        rec.read().get(self.field)
    }
}

/// Write half of a generated per-field accessor pair.
#[derive(Debug, Copy, Clone)]
pub struct FieldSet {
    field: Symbol,
}

impl FieldSet {
    pub fn field(&self) -> Symbol {
        self.field
    }

    pub fn set(&self, rec: &Gc<Record>, value: Value) -> Result<(), RecordError> {
        rec.write().set(self.field, value)
    }
}

/// Lazy iterator over field values in declaration order. Restartable by
/// calling [`values`] again; independent iterators never disturb each other.
pub struct Values {
    rec: Gc<Record>,
    idx: usize,
}

impl Iterator for Values {
    type Item = Value;

    fn next(&mut self) -> Option<Value> {
        let rec = self.rec.read();
        let field = *rec.record_type.fields.get(self.idx)?;
        self.idx += 1;
        Some(rec.value_of(field))
    }
}

/// Lazy iterator over `(field, value)` pairs in declaration order.
pub struct Pairs {
    rec: Gc<Record>,
    idx: usize,
}

impl Iterator for Pairs {
    type Item = (Symbol, Value);

    fn next(&mut self) -> Option<(Symbol, Value)> {
        let rec = self.rec.read();
        let field = *rec.record_type.fields.get(self.idx)?;
        self.idx += 1;
        Some((field, rec.value_of(field)))
    }
}

pub fn values(rec: &Gc<Record>) -> Values {
    Values {
        rec: rec.clone(),
        idx: 0,
    }
}

pub fn pairs(rec: &Gc<Record>) -> Pairs {
    Pairs {
        rec: rec.clone(),
        idx: 0,
    }
}

/// Snapshot the type and field values so no lock is held during the recursive
/// parts of equality, hashing and display.
fn snapshot(rec: &Gc<Record>) -> (Arc<RecordType>, Vec<Value>) {
    let r = rec.read();
    (r.record_type.clone(), r.to_vec())
}

fn is_self_ref(value: &Value, owner: &Gc<Record>) -> bool {
    matches!(value, Value::Record(r) if Gc::ptr_eq(r, owner))
}

fn record_equal(
    lhs: &Gc<Record>,
    rhs: &Gc<Record>,
    values_equal: fn(&Value, &Value) -> bool,
) -> bool {
    if Gc::ptr_eq(lhs, rhs) {
        return true;
    }
    let (type_a, values_a) = snapshot(lhs);
    let (type_b, values_b) = snapshot(rhs);
    if !Arc::ptr_eq(&type_a, &type_b) {
        return false;
    }
    values_a.iter().zip(&values_b).all(|(a, b)| {
        (is_self_ref(a, lhs) && is_self_ref(b, rhs)) || values_equal(a, b)
    })
}

/// Strict structural equality: exact same type and, field by field, either
/// both sides reference their own operand (a cycle, compared without
/// recursing) or the values are [`Value::eqv`]-equal.
pub fn record_eql(lhs: &Gc<Record>, rhs: &Gc<Record>) -> bool {
    record_equal(lhs, rhs, Value::eqv)
}

/// Loose structural equality: same self-reference rule, values compared with
/// [`Value::loose_eq`]. The factory creates no subtypes, so type
/// compatibility is type identity.
pub fn record_eq(lhs: &Gc<Record>, rhs: &Gc<Record>) -> bool {
    record_equal(lhs, rhs, Value::loose_eq)
}

/// A record's hash. The digest kind is fixed by the engine; within one kind,
/// `record_eql(a, b)` implies equal hashes.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum RecordHash {
    Numeric(u64),
    Digest(String),
}

/// Combined hash of the record's type and its field values in order. A
/// self-referential field contributes the type's hash in place of its own,
/// breaking the cycle.
pub fn record_hash(rec: &Gc<Record>, engine: Engine) -> RecordHash {
    match engine {
        Engine::Strict => RecordHash::Numeric(numeric_hash(rec)),
        Engine::Relaxed => RecordHash::Digest(digest_hash(rec)),
    }
}

pub(crate) fn numeric_hash(rec: &Gc<Record>) -> u64 {
    let (record_type, field_values) = snapshot(rec);
    let type_hash = record_type.type_hash();
    let mut hash = type_hash;
    for (i, value) in field_values.iter().enumerate() {
        let value_hash = if is_self_ref(value, rec) {
            type_hash
        } else {
            value.hash_u64()
        };
        hash = hash.wrapping_add((i as u64 + 1).wrapping_mul(value_hash));
    }
    hash
}

/// String digest built from the same inputs as [`numeric_hash`] by
/// concatenation, for hosts that cannot guarantee integer hashing everywhere.
fn digest_hash(rec: &Gc<Record>) -> String {
    let (record_type, field_values) = snapshot(rec);
    let type_hash = record_type.type_hash().to_string();
    let mut digest = type_hash.clone();
    for (i, value) in field_values.iter().enumerate() {
        digest.push_str(&(i + 1).to_string());
        let value_hash = if is_self_ref(value, rec) {
            type_hash.clone()
        } else if let Value::Record(nested) = value {
            digest_hash(nested)
        } else {
            value.hash_u64().to_string()
        };
        digest.push_str(&value_hash);
    }
    digest
}

/// Canonical textual form: `#<record Name field=value, ...>` in field order.
/// A self-referential field renders as a truncation marker instead of
/// recursing; unset fields render as `nil`.
pub fn fmt_record(rec: &Gc<Record>) -> String {
    let (record_type, field_values) = snapshot(rec);
    let mut output = String::from("#<record ");
    if let Some(name) = record_type.name() {
        output.push_str(name);
        output.push(' ');
    }
    for (i, (field, value)) in record_type.fields.iter().zip(&field_values).enumerate() {
        if i > 0 {
            output.push_str(", ");
        }
        output.push_str(&field.to_str());
        output.push('=');
        if is_self_ref(value, rec) {
            match record_type.name() {
                Some(name) => output.push_str(&format!("#<record {name}:...>")),
                None => output.push_str("#<record:...>"),
            }
        } else {
            output.push_str(&value.to_string());
        }
    }
    output.push('>');
    output
}
