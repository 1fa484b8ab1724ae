//! Finite-state machines over named states and symbols.
//!
//! This module provides DFA, epsilon-NFA and PDA implementations with:
//! - Parsing and serialization of the line-oriented definition format
//! - Structural validation
//! - Epsilon closure computation
//! - Subset construction (NFA to DFA conversion)
//! - Hopcroft's DFA minimization algorithm

mod dfa;
mod epsilon_nfa;
mod model;
mod names;
mod pda;
mod state;
mod subset_construction;
mod symbol;
pub(crate) mod text;

pub use dfa::DFA;
pub use epsilon_nfa::EpsilonNFA;
pub use model::Automaton;
pub use pda::{PDA, PdaTransition};
pub use state::{StateId, StateSet};
pub use subset_construction::subset_construction;
pub use symbol::{EPSILON, EPSILON_TOKEN, SymbolId};
