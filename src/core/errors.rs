/*!
# Error System for PHP Modernity

Typed errors of the classification engine. Taxonomy errors are setup or
programming errors and abort the current unit; parse errors are recoverable
at the directory level.
*/

use std::path::PathBuf;
use thiserror::Error;

use crate::core::position::Position;
use crate::language_level::LanguageLevel;

/// Errors raised by the node information registry and the slot counters
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TaxonomyError {
    #[error("Information of type \"{info}\" on node \"{kind}\" has already been registered!")]
    AlreadyRegistered {
        kind: &'static str,
        info: &'static str,
    },

    #[error("Information of type \"{info}\" on node \"{kind}\" has not been registered!")]
    NotRegistered {
        kind: &'static str,
        info: &'static str,
    },

    #[error("Information of type \"{info}\" on node \"{kind}\" has not been registered (sub node \"{parent}\".\"{slot}\")!")]
    NotRegisteredInSlot {
        kind: &'static str,
        info: &'static str,
        parent: &'static str,
        slot: &'static str,
    },

    #[error("Sub node definition is already defined for sub node \"{slot}\" of node \"{kind}\"!")]
    DuplicateSlot {
        kind: &'static str,
        slot: &'static str,
    },

    #[error("An array of sub nodes was provided, but this is not allowed by the sub node definition for \"{kind}\".\"{slot}\"")]
    UnexpectedArray {
        kind: &'static str,
        slot: &'static str,
    },

    #[error("Sub node definition for \"{kind}\".\"{slot}\" does not accept a sub node of class {class} ({concrete}) - valid classes are [{accepted}]")]
    UnacceptedOccupant {
        kind: &'static str,
        slot: &'static str,
        class: &'static str,
        concrete: &'static str,
        accepted: String,
    },

    #[error("Node \"{kind}\" has not been annotated with a language level")]
    NotAnnotated { kind: &'static str },
}

/// Syntax error reported by the PHP parser
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message} at {position}")]
pub struct ParseError {
    pub message: String,
    pub position: Position,
}

impl ParseError {
    pub fn new(message: impl Into<String>, position: Position) -> Self {
        Self {
            message: message.into(),
            position,
        }
    }

    pub fn line(&self) -> usize {
        self.position.line
    }

    pub fn column(&self) -> usize {
        self.position.column
    }
}

/// Top-level error of the library API
#[derive(Debug, Error)]
pub enum ModernityError {
    #[error("First language level {start} is newer than second language level {end}")]
    InvalidRange {
        start: LanguageLevel,
        end: LanguageLevel,
    },

    #[error(transparent)]
    Taxonomy(#[from] TaxonomyError),

    #[error("Parse error in {origin}: {source}")]
    Parse {
        origin: String,
        #[source]
        source: ParseError,
    },

    #[error("Could not read from file \"{}\": {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to load PHP grammar: {0}")]
    Grammar(String),

    #[error("Failed to build worker pool: {0}")]
    WorkerPool(String),
}

impl ModernityError {
    /// Ошибки, после которых обход директории может продолжаться
    pub fn is_recoverable(&self) -> bool {
        matches!(self, ModernityError::Parse { .. } | ModernityError::Io { .. })
    }
}

pub type Result<T> = std::result::Result<T, ModernityError>;
