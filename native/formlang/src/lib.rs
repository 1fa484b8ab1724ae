//! Finite automata and grammars for formal-language tooling.
//!
//! Definitions are read from a small line-oriented text format: DFAs and
//! NFAs can be validated, simulated and written back out, and an NFA can be
//! turned into an equivalent DFA by subset construction. Grammars and
//! pushdown automata are modelled, but membership testing, PDA simulation
//! and PDA to grammar conversion report [`Unsupported`].
//!
//! ```
//! let nfa = formlang::parse_nfa("q0,q1,q2\na,b\nq0\nq2\nq0,a,q0\nq0,a,q1\nq1,b,q2\n")?;
//! let dfa = nfa.to_dfa();
//! assert!(dfa.accepts("aab"));
//! assert!(!dfa.accepts("ba"));
//! # Ok::<(), formlang::ParseError>(())
//! ```

pub mod automaton;
pub mod endpoints;
pub mod error;
pub mod grammar;

pub use automaton::{Automaton, DFA, EpsilonNFA, PDA};
pub use error::{EngineError, ParseError, Unsupported, Violation};
pub use grammar::{CFG, Grammar};

/// Nondeterministic automata always allow epsilon moves.
pub type NFA = EpsilonNFA;

/// Parse a DFA definition.
///
/// Only the shape of the text is checked here. A start state, accepting
/// state or transition that names an undeclared state or symbol still
/// parses, and is reported by [`DFA::validate`].
pub fn parse_dfa(definition: &str) -> Result<DFA, ParseError> {
    definition.parse()
}

/// Parse an NFA definition.
///
/// The format is the one [`parse_dfa`] reads, except that a state may have
/// several moves on one symbol and the symbol `e` marks an epsilon move.
pub fn parse_nfa(definition: &str) -> Result<NFA, ParseError> {
    definition.parse()
}
