//! Lambda term nodes: a plain tagged variant referencing children by
//! [`TermId`] rather than a dedicated tree type — each term is a cell
//! with a reference count, not a node in an inheritance hierarchy.

use serde::{Deserialize, Serialize};

pub use super::pool::TermId;

/// A lambda-calculus term node.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Term {
    Variable(i32),
    Abstraction { var_id: i32, body: TermId },
    Application { function: TermId, argument: TermId },
}

impl Term {
    pub fn variable(var_id: i32) -> Self {
        Term::Variable(var_id)
    }

    pub fn abstraction(var_id: i32, body: TermId) -> Self {
        Term::Abstraction { var_id, body }
    }

    pub fn application(function: TermId, argument: TermId) -> Self {
        Term::Application { function, argument }
    }

    pub fn as_variable(&self) -> Option<i32> {
        match self {
            Term::Variable(id) => Some(*id),
            _ => None,
        }
    }
}
