//! Error conditions raised by record type construction and field access.

use thiserror::Error;

use crate::symbols::Symbol;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RecordError {
    #[error("arguments cannot be nil")]
    NilArgument,
    #[error("record type requires at least one field")]
    MissingFields,
    #[error("identifier name `{0}` needs to be constant")]
    InvalidIdentifier(String),
    #[error("no member `{0}` in record")]
    UnknownMember(Symbol),
    #[error("expected value of type {expected}, provided {provided}")]
    InvalidType {
        expected: &'static str,
        provided: &'static str,
    },
    #[error("expected {expected} arguments, provided {provided}")]
    WrongNumberOfArguments { expected: usize, provided: usize },
}

impl RecordError {
    pub fn invalid_type(expected: &'static str, provided: &'static str) -> Self {
        Self::InvalidType { expected, provided }
    }

    pub fn unknown_member(member: Symbol) -> Self {
        Self::UnknownMember(member)
    }
}
