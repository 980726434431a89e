//! Runtime-defined record types for dynamic value models.
//!
//! A [`Registry`] turns an ordered list of field names (and optionally a type
//! name) into a [`RecordType`] whose instances hold exactly those fields,
//! with validated accessors, structural equality, a stable hash and a
//! canonical textual form:
//!
//! ```
//! use record_rs::{Engine, InitStyle, Registry, Value, ValueMap, fmt_record};
//!
//! let registry = Registry::new();
//! let person = registry
//!     .define(
//!         &[Value::from("Person"), "full_name".into(), "age".into()],
//!         InitStyle::Keyword,
//!         Engine::Strict,
//!     )
//!     .unwrap();
//!
//! let args: ValueMap = [
//!     ("full_name".into(), "Sean Hux".into()),
//!     ("age".into(), Value::Integer(48)),
//! ]
//! .into_iter()
//! .collect();
//! let sean = person.construct(&[Value::Map(args)]).unwrap();
//!
//! assert_eq!(
//!     fmt_record(&sean),
//!     "#<record Person full_name=\"Sean Hux\", age=48>"
//! );
//! ```

pub mod err;
pub mod gc;
pub mod records;
pub mod registry;
pub mod symbols;
pub mod value;

pub use err::RecordError;
pub use gc::Gc;
pub use records::{
    Engine, FieldRef, FieldSet, InitStyle, Pairs, Record, RecordHash, RecordType, Values,
    fmt_record, pairs, record_eq, record_eql, record_hash, values,
};
pub use registry::Registry;
pub use symbols::Symbol;
pub use value::{Value, ValueMap};
