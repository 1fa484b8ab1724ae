//! The shape every finite-state machine shares: states, alphabet, start and
//! accepting states.

use crate::automaton::names::NameTable;
use crate::automaton::state::{StateId, StateSet};
use crate::automaton::symbol::{EPSILON_TOKEN, SymbolId};
use crate::automaton::text::{self, Line, Reader, Writer};
use crate::error::{ParseError, Result, Unsupported, Violation};
use std::collections::BTreeSet;

/// Capabilities common to every automaton variant.
pub trait Automaton {
    /// Check the structural invariants; `false` is an answer, not an error.
    fn validate(&self) -> bool;

    /// Run the automaton on `input`, one `char` per symbol.
    ///
    /// Variants whose simulation is not implemented report
    /// [`Unsupported`] instead of rejecting.
    fn try_accepts(&self, input: &str) -> std::result::Result<bool, Unsupported>;

    /// The canonical text form, which parses back to an equal automaton.
    fn serialize(&self) -> String;
}

/// States, alphabet, start state and accepting states.
#[derive(Debug, Clone)]
pub struct Header {
    pub(crate) states: NameTable,
    pub(crate) alphabet: NameTable,
    pub(crate) start: StateId,
    pub(crate) accept: StateSet,
}

impl Header {
    /// A header with a single declared state that is also the start state.
    pub(crate) fn new(alphabet: NameTable, start: &str) -> Self {
        let mut header = Self {
            states: NameTable::new(),
            alphabet,
            start: 0,
            accept: StateSet::with_capacity(1),
        };
        header.start = header.add_state(start);
        header
    }

    /// Reads the four header lines of a DFA or NFA definition.
    ///
    /// With `reserve_epsilon` the epsilon token is refused on the alphabet
    /// line.
    pub(crate) fn parse(reader: &mut Reader<'_>, reserve_epsilon: bool) -> Result<Self> {
        let states = read_states(reader.header("states")?)?;
        let alphabet = read_alphabet(reader.header("alphabet")?, reserve_epsilon)?;
        Self::finish(
            states,
            alphabet,
            reader.header("start state")?,
            reader.optional_header(),
        )
    }

    /// Completes a header from the start and accept lines.
    pub(crate) fn finish(
        mut states: NameTable,
        alphabet: NameTable,
        start_line: Line<'_>,
        accept_line: Line<'_>,
    ) -> Result<Self> {
        let start = states.intern(text::single(start_line, "start state")?);
        let mut accept = StateSet::with_capacity(states.len());
        for name in text::list(accept_line, "accept state")? {
            accept.insert(states.intern(name));
        }
        Ok(Self {
            states,
            alphabet,
            start,
            accept,
        })
    }

    /// Invariants 1 and 2: the start and accepting states are declared.
    pub(crate) fn check(&self) -> std::result::Result<(), Violation> {
        if !self.states.is_declared(self.start) {
            return Err(Violation::UndeclaredStart(self.state_name(self.start).into()));
        }
        if let Some(state) = self.accept.iter().find(|&s| !self.states.is_declared(s)) {
            return Err(Violation::UndeclaredAccept(self.state_name(state).into()));
        }
        Ok(())
    }

    pub(crate) fn check_state(&self, state: StateId) -> std::result::Result<(), Violation> {
        if self.states.is_declared(state) {
            Ok(())
        } else {
            Err(Violation::UndeclaredState(self.state_name(state).into()))
        }
    }

    pub(crate) fn check_symbol(&self, symbol: SymbolId) -> std::result::Result<(), Violation> {
        if self.alphabet.is_declared(symbol) {
            Ok(())
        } else {
            Err(Violation::UndeclaredSymbol(self.symbol_name(symbol).into()))
        }
    }

    pub(crate) fn add_state(&mut self, name: &str) -> StateId {
        let id = self.states.intern(name);
        self.states.declare(name);
        id
    }

    /// A fresh symbol table holding only the declared symbols.
    pub(crate) fn declared_alphabet(&self) -> NameTable {
        let mut alphabet = NameTable::new();
        for symbol in self.declared_symbols() {
            alphabet.declare(symbol);
        }
        alphabet
    }

    /// Ids of the declared symbols, in declaration order.
    pub(crate) fn input_symbols(&self) -> Vec<SymbolId> {
        self.alphabet.declared().map(|(id, _)| id).collect()
    }

    pub(crate) fn num_states(&self) -> usize {
        self.states.len()
    }

    pub(crate) fn state_name(&self, state: StateId) -> &str {
        self.states.name(state)
    }

    pub(crate) fn symbol_name(&self, symbol: SymbolId) -> &str {
        self.alphabet.name(symbol)
    }

    /// Maps input symbols to ids; `None` for symbols outside the alphabet.
    pub(crate) fn input_symbol(&self, symbol: &str) -> Option<SymbolId> {
        self.alphabet.declared_id(symbol)
    }

    pub(crate) fn declared_states(&self) -> impl Iterator<Item = &str> + '_ {
        self.states.declared().map(|(_, name)| name)
    }

    pub(crate) fn declared_symbols(&self) -> impl Iterator<Item = &str> + '_ {
        self.alphabet.declared().map(|(_, name)| name)
    }

    pub(crate) fn accept_names(&self) -> impl Iterator<Item = &str> + '_ {
        self.accept.iter().map(|state| self.state_name(state))
    }

    /// Writes the states, alphabet, start and accept lines.
    pub(crate) fn write(&self, writer: &mut Writer) {
        writer.list(self.declared_states());
        writer.list(self.declared_symbols());
        writer.line(self.state_name(self.start));
        writer.list(self.accept_names());
    }
}

/// Two headers are equal when they name the same states, symbols, start and
/// accepting states, whatever the declaration order.
impl PartialEq for Header {
    fn eq(&self, other: &Self) -> bool {
        fn set<'a>(names: impl Iterator<Item = &'a str>) -> BTreeSet<&'a str> {
            names.collect()
        }
        set(self.declared_states()) == set(other.declared_states())
            && set(self.declared_symbols()) == set(other.declared_symbols())
            && self.state_name(self.start) == other.state_name(other.start)
            && set(self.accept_names()) == set(other.accept_names())
    }
}

impl Eq for Header {}

/// Reads the states line: at least one state, no duplicates.
pub(crate) fn read_states(line: Line<'_>) -> Result<NameTable> {
    let mut states = NameTable::new();
    for name in text::list(line, "state")? {
        if states.declare(name).is_none() {
            return Err(ParseError::DuplicateState {
                line: line.number,
                state: name.to_owned(),
            });
        }
    }
    if states.is_empty() {
        return Err(ParseError::EmptyStates);
    }
    Ok(states)
}

/// Reads the alphabet line. Repeated symbols collapse into one.
pub(crate) fn read_alphabet(line: Line<'_>, reserve_epsilon: bool) -> Result<NameTable> {
    let mut alphabet = NameTable::new();
    for symbol in text::list(line, "symbol")? {
        if reserve_epsilon && symbol == EPSILON_TOKEN {
            return Err(ParseError::ReservedSymbol {
                line: line.number,
                symbol: symbol.to_owned(),
            });
        }
        alphabet.declare(symbol);
    }
    Ok(alphabet)
}
