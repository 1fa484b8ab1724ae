//! Grammars over the same line-oriented definition format as the automata.

mod cfg;

pub use cfg::CFG;

use crate::error::Unsupported;

/// Capabilities common to every grammar.
pub trait Grammar {
    fn validate(&self) -> bool;

    /// Whether the grammar derives `input`. Grammars without a membership
    /// test report [`Unsupported`].
    fn generates(&self, input: &str) -> Result<bool, Unsupported>;

    fn serialize(&self) -> String;
}
