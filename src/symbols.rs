//! Interned symbols.
//!
//! Field identifiers are normalized to symbols, so a field named with the
//! string `"age"` and one named with the symbol `age` are the same field.

use std::{
    fmt,
    sync::{Arc, LazyLock},
};

use indexmap::IndexSet;
use parking_lot::RwLock;

#[derive(Copy, Clone, PartialEq, Eq, Hash)]
pub struct Symbol(pub(crate) u32);

static SYMTAB: LazyLock<RwLock<IndexSet<Arc<str>>>> =
    LazyLock::new(|| RwLock::new(IndexSet::new()));

impl Symbol {
    pub fn intern(s: &str) -> Self {
        let mut symtab = SYMTAB.write();
        let id = if let Some(id) = symtab.get_index_of(s) {
            id
        } else {
            let (id, _) = symtab.insert_full(Arc::from(s));
            id
        };
        Self(id.try_into().expect("symbol table overflow"))
    }

    pub fn to_str(self) -> Arc<str> {
        let symtab = SYMTAB.read();
        symtab[self.0 as usize].clone()
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_str())
    }
}

impl fmt::Debug for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_str())
    }
}

impl From<&str> for Symbol {
    fn from(s: &str) -> Self {
        Symbol::intern(s)
    }
}

impl PartialEq<&'_ str> for Symbol {
    fn eq(&self, rhs: &&str) -> bool {
        self.to_str().as_ref() == *rhs
    }
}
