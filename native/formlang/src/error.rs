//! Error types for parsing and for capabilities that are not implemented yet.

use thiserror::Error;

/// Errors raised while reading a textual automaton or grammar definition.
///
/// Line numbers are 1-based and refer to the definition text as given.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ParseError {
    /// A required header line is absent.
    #[error("line {line}: missing {what} line")]
    MissingLine { line: usize, what: &'static str },

    /// A required field (or an item inside a comma separated list) is empty.
    #[error("line {line}: empty {what}")]
    EmptyField { line: usize, what: &'static str },

    /// A record does not have the expected number of fields.
    #[error("line {line}: expected {expected} fields, found {found}")]
    FieldCount {
        line: usize,
        expected: usize,
        found: usize,
    },

    /// The same state is declared twice on the states line.
    #[error("line {line}: state {state:?} is declared more than once")]
    DuplicateState { line: usize, state: String },

    /// A reserved token is used where an input symbol is required.
    #[error("line {line}: {symbol:?} is reserved and cannot be used as an input symbol")]
    ReservedSymbol { line: usize, symbol: String },

    /// The states line declares no states at all.
    #[error("line 1: an automaton needs at least one state")]
    EmptyStates,
}

/// A structural problem found by `validate`.
///
/// This is a diagnostic, not a failure: `validate` reports it as `false` and
/// `check` hands it back so callers can tell which invariant broke.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum Violation {
    #[error("start state {0:?} is not a declared state")]
    UndeclaredStart(String),

    #[error("accept state {0:?} is not a declared state")]
    UndeclaredAccept(String),

    #[error("transition references undeclared state {0:?}")]
    UndeclaredState(String),

    #[error("transition symbol {0:?} is not in the alphabet")]
    UndeclaredSymbol(String),

    #[error("start variable {0:?} is not a declared variable")]
    UndeclaredStartVariable(String),

    #[error("production head {0:?} is not a declared variable")]
    UndeclaredHead(String),

    #[error("production symbol {0:?} is neither a variable nor a terminal")]
    UnknownGrammarSymbol(String),
}

/// Operations that exist on the interface but have no implementation.
///
/// Returned instead of a plain `false` so that "not supported" can never be
/// mistaken for a genuine rejection.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum Unsupported {
    #[error("context-free grammar membership testing is not implemented")]
    CfgMembership,

    #[error("pushdown automaton simulation is not implemented")]
    PdaSimulation,

    #[error("pushdown automaton to grammar conversion is not implemented")]
    PdaToCfg,
}

/// Any error the engine can surface to a caller.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum EngineError {
    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error(transparent)]
    Unsupported(#[from] Unsupported),
}

/// A specialized `Result` type for definition parsing.
pub type Result<T> = std::result::Result<T, ParseError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_error_messages() {
        let err = ParseError::FieldCount {
            line: 7,
            expected: 3,
            found: 2,
        };
        assert_eq!(err.to_string(), "line 7: expected 3 fields, found 2");

        let err = ParseError::MissingLine {
            line: 4,
            what: "accept states",
        };
        assert_eq!(err.to_string(), "line 4: missing accept states line");
    }

    #[test]
    fn test_engine_error_wraps_both_kinds() {
        let parse: EngineError = ParseError::EmptyStates.into();
        assert!(matches!(parse, EngineError::Parse(ParseError::EmptyStates)));

        let unsupported: EngineError = Unsupported::PdaToCfg.into();
        assert_eq!(
            unsupported.to_string(),
            "pushdown automaton to grammar conversion is not implemented"
        );
    }
}
