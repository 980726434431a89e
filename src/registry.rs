//! Shared namespace of named record types.

use std::{collections::HashMap, sync::Arc};

use parking_lot::RwLock;

use crate::{
    err::RecordError,
    records::{Engine, InitStyle, RecordType},
    value::Value,
};

/// The record type factory and the namespace it registers named types into.
///
/// Defining a second type under an existing name overwrites the earlier
/// binding; anonymous types never touch the namespace.
#[derive(Debug, Default)]
pub struct Registry {
    types: RwLock<HashMap<String, Arc<RecordType>>>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a record type from factory arguments.
    ///
    /// The first argument is consumed as the type name when it is a string
    /// with an uppercase first letter (under [`Engine::Relaxed`], a lowercase
    /// string becomes an ordinary field instead of an error); the rest are
    /// field identifiers, given as symbols or strings. A named type is
    /// registered before it is returned.
    pub fn define(
        &self,
        args: &[Value],
        init: InitStyle,
        engine: Engine,
    ) -> Result<Arc<RecordType>, RecordError> {
        let record_type = Arc::new(RecordType::parse(args, init, engine)?);
        if let Some(name) = record_type.name() {
            self.types
                .write()
                .insert(name.to_string(), record_type.clone());
        }
        Ok(record_type)
    }

    /// Looks up a previously registered type. The returned handle is the
    /// exact type the name was last bound to.
    pub fn resolve(&self, name: &str) -> Option<Arc<RecordType>> {
        self.types.read().get(name).cloned()
    }
}
