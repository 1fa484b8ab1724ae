//! Epsilon Non-deterministic Finite Automaton (ε-NFA) implementation.

use crate::automaton::dfa::DFA;
use crate::automaton::model::{Automaton, Header};
use crate::automaton::names::NameTable;
use crate::automaton::state::{StateId, StateSet};
use crate::automaton::subset_construction::subset_construction;
use crate::automaton::symbol::{EPSILON, EPSILON_TOKEN, SymbolId, is_epsilon};
use crate::automaton::text::{self, Reader, Writer};
use crate::error::{ParseError, Unsupported, Violation};
use indexmap::IndexMap;
use log::{debug, trace};
use std::collections::{BTreeSet, VecDeque};
use std::str::FromStr;

/// An Epsilon Non-deterministic Finite Automaton.
#[derive(Debug, Clone)]
pub struct EpsilonNFA {
    header: Header,
    /// Transitions: (source, symbol) -> set of destination states
    /// For epsilon transitions, symbol == EPSILON
    transitions: IndexMap<(StateId, SymbolId), StateSet>,
    /// Epsilon closure of every state, indexed by state id
    epsilon_closures: Vec<StateSet>,
}

impl EpsilonNFA {
    /// Add a transition from source to destination on the given symbol.
    fn add_transition(&mut self, source: StateId, symbol: SymbolId, destination: StateId) {
        let capacity = self.header.num_states();
        self.transitions
            .entry((source, symbol))
            .or_insert_with(|| StateSet::with_capacity(capacity))
            .insert(destination);
    }

    /// Compute the epsilon closure of a single state using BFS.
    fn epsilon_closure_single(&self, state: StateId) -> StateSet {
        let mut closure = StateSet::singleton(state, self.num_states());
        let mut queue = VecDeque::from([state]);

        while let Some(s) = queue.pop_front() {
            // Follow epsilon transitions
            if let Some(destinations) = self.transitions.get(&(s, EPSILON)) {
                for dest in destinations.iter() {
                    if !closure.contains(dest) {
                        closure.insert(dest);
                        queue.push_back(dest);
                    }
                }
            }
        }

        closure
    }

    /// Compute epsilon closures for all states, once, at construction.
    fn compute_epsilon_closures(&mut self) {
        self.epsilon_closures = (0..self.num_states() as StateId)
            .map(|state| self.epsilon_closure_single(state))
            .collect();
    }

    /// Get the number of states, including referenced but undeclared ones.
    pub fn num_states(&self) -> usize {
        self.header.num_states()
    }

    /// Declared states, in declaration order.
    pub fn states(&self) -> impl Iterator<Item = &str> + '_ {
        self.header.declared_states()
    }

    /// Declared input symbols (never epsilon), in declaration order.
    pub fn alphabet(&self) -> impl Iterator<Item = &str> + '_ {
        self.header.declared_symbols()
    }

    pub fn start(&self) -> &str {
        self.header.state_name(self.header.start)
    }

    /// Accepting states.
    pub fn accept(&self) -> impl Iterator<Item = &str> + '_ {
        self.header.accept_names()
    }

    pub fn start_state(&self) -> StateId {
        self.header.start
    }

    pub fn final_states(&self) -> &StateSet {
        &self.header.accept
    }

    pub fn state_id(&self, name: &str) -> Option<StateId> {
        self.header.states.id(name)
    }

    pub fn state_name(&self, state: StateId) -> &str {
        self.header.state_name(state)
    }

    /// Id of a declared input symbol.
    pub fn symbol_id(&self, symbol: &str) -> Option<SymbolId> {
        self.header.input_symbol(symbol)
    }

    /// Names of the states in `states`, in id order.
    pub fn state_names(&self, states: &StateSet) -> Vec<&str> {
        states.iter().map(|state| self.state_name(state)).collect()
    }

    /// Declared symbols with their ids, sorted by name.
    pub(crate) fn sorted_symbols(&self) -> Vec<(SymbolId, &str)> {
        let mut symbols: Vec<(SymbolId, &str)> = self.header.alphabet.declared().collect();
        symbols.sort_unstable_by(|a, b| a.1.cmp(b.1));
        symbols
    }

    pub(crate) fn declared_alphabet(&self) -> NameTable {
        self.header.declared_alphabet()
    }

    /// The states reachable from `state` through epsilon moves alone,
    /// `state` included.
    pub fn epsilon_closure_of(&self, state: StateId) -> StateSet {
        match self.epsilon_closures.get(state as usize) {
            Some(closure) => closure.clone(),
            None => StateSet::singleton(state, self.num_states()),
        }
    }

    /// Get the epsilon closure of a set of states.
    pub fn epsilon_closure(&self, states: &StateSet) -> StateSet {
        let mut closure = StateSet::with_capacity(self.num_states());
        for state in states.iter() {
            match self.epsilon_closures.get(state as usize) {
                Some(cached) => closure.union_with(cached),
                None => closure.insert(state),
            }
        }
        closure
    }

    /// Get the states reachable from a set of states on a single non-epsilon
    /// symbol, without taking epsilon moves afterwards.
    pub fn next_states(&self, states: &StateSet, symbol: SymbolId) -> StateSet {
        let mut reached = StateSet::with_capacity(self.num_states());
        if is_epsilon(symbol) {
            return reached;
        }

        for state in states.iter() {
            if let Some(destinations) = self.transitions.get(&(state, symbol)) {
                reached.union_with(destinations);
            }
        }

        reached
    }

    /// Get the states reachable from a set of states on a given symbol.
    /// Returns the epsilon closure of the reached states.
    pub fn move_on_symbol(&self, states: &StateSet, symbol: SymbolId) -> StateSet {
        self.epsilon_closure(&self.next_states(states, symbol))
    }

    /// Check invariants 1-4; epsilon moves are exempt from the alphabet check.
    pub fn check(&self) -> Result<(), Violation> {
        self.header.check()?;
        for (&(source, symbol), destinations) in &self.transitions {
            self.header.check_state(source)?;
            if !is_epsilon(symbol) {
                self.header.check_symbol(symbol)?;
            }
            for destination in destinations.iter() {
                self.header.check_state(destination)?;
            }
        }
        Ok(())
    }

    /// Check the structural invariants.
    pub fn validate(&self) -> bool {
        match self.check() {
            Ok(()) => true,
            Err(violation) => {
                debug!("invalid NFA: {violation}");
                false
            }
        }
    }

    /// Run the NFA on `input`, reading one `char` per symbol.
    pub fn accepts(&self, input: &str) -> bool {
        self.run(
            input
                .chars()
                .map(|c| self.header.input_symbol(c.encode_utf8(&mut [0; 4]))),
        )
    }

    /// Run the NFA on a sequence of (possibly multi-character) symbols.
    pub fn accepts_symbols<'a>(&self, input: impl IntoIterator<Item = &'a str>) -> bool {
        self.run(
            input
                .into_iter()
                .map(|symbol| self.header.input_symbol(symbol)),
        )
    }

    fn run(&self, symbols: impl Iterator<Item = Option<SymbolId>>) -> bool {
        let mut current = self.epsilon_closure_of(self.header.start);
        for symbol in symbols {
            // Symbols outside the alphabet reject immediately.
            let Some(symbol) = symbol else {
                return false;
            };
            current = self.move_on_symbol(&current, symbol);
            trace!(
                "NFA on {}: {:?}",
                self.header.symbol_name(symbol),
                self.state_names(&current)
            );
            if current.is_empty() {
                return false;
            }
        }
        current.intersects(&self.header.accept)
    }

    /// Serialize to the line-oriented definition format, spelling epsilon
    /// moves with the `e` token.
    pub fn serialize(&self) -> String {
        let mut writer = Writer::new();
        self.header.write(&mut writer);
        for (source, symbol, destination) in self.transitions() {
            writer.list([source, symbol.unwrap_or(EPSILON_TOKEN), destination]);
        }
        writer.finish()
    }

    /// Convert to an equivalent DFA by subset construction.
    pub fn to_dfa(&self) -> DFA {
        subset_construction(self)
    }

    /// Check if the NFA accepts no string at all.
    /// Uses BFS from the start closure following all alphabet transitions.
    pub fn is_empty(&self) -> bool {
        let symbols = self.header.input_symbols();
        let mut visited = StateSet::with_capacity(self.num_states());
        let mut queue: VecDeque<StateId> = self.epsilon_closure_of(self.header.start).iter().collect();

        while let Some(state) = queue.pop_front() {
            if visited.contains(state) {
                continue;
            }
            visited.insert(state);

            // Check if we reached a final state
            if self.header.accept.contains(state) {
                return false;
            }

            // Explore all transitions
            for &symbol in &symbols {
                if let Some(destinations) = self.transitions.get(&(state, symbol)) {
                    let closure = self.epsilon_closure(destinations);
                    queue.extend(closure.iter().filter(|&dest| !visited.contains(dest)));
                }
            }
        }

        true
    }

    /// Get all transitions as `(source, symbol, destination)` names; the
    /// symbol is `None` for epsilon moves.
    pub fn transitions(&self) -> impl Iterator<Item = (&str, Option<&str>, &str)> + '_ {
        self.transitions.iter().flat_map(move |(&(src, sym), dests)| {
            let symbol = (!is_epsilon(sym)).then(|| self.header.symbol_name(sym));
            dests
                .iter()
                .map(move |dst| (self.header.state_name(src), symbol, self.header.state_name(dst)))
        })
    }

    fn named_transitions(&self) -> BTreeSet<(&str, Option<&str>, &str)> {
        self.transitions().collect()
    }
}

impl FromStr for EpsilonNFA {
    type Err = ParseError;

    /// Parse an NFA definition. The symbol `e` in a transition record is an
    /// epsilon move and may not appear on the alphabet line.
    fn from_str(definition: &str) -> Result<Self, ParseError> {
        let mut reader = Reader::new(definition);
        let header = Header::parse(&mut reader, true)?;
        let mut nfa = EpsilonNFA {
            header,
            transitions: IndexMap::new(),
            epsilon_closures: Vec::new(),
        };

        for line in reader.records() {
            let [source, symbol, destination] = text::record(line, "transition field")?;
            let source = nfa.header.states.intern(source);
            let symbol = if symbol == EPSILON_TOKEN {
                EPSILON
            } else {
                nfa.header.alphabet.intern(symbol)
            };
            let destination = nfa.header.states.intern(destination);
            nfa.add_transition(source, symbol, destination);
        }

        nfa.compute_epsilon_closures();
        debug!(
            "parsed NFA: {} states, {} symbols, {} transition keys",
            nfa.num_states(),
            nfa.header.alphabet.len(),
            nfa.transitions.len()
        );
        Ok(nfa)
    }
}

/// Structural equality: same states, alphabet, start, accepting states and
/// transition relation, regardless of listing order.
impl PartialEq for EpsilonNFA {
    fn eq(&self, other: &Self) -> bool {
        self.header == other.header && self.named_transitions() == other.named_transitions()
    }
}

impl Eq for EpsilonNFA {}

impl Automaton for EpsilonNFA {
    fn validate(&self) -> bool {
        EpsilonNFA::validate(self)
    }

    fn try_accepts(&self, input: &str) -> Result<bool, Unsupported> {
        Ok(self.accepts(input))
    }

    fn serialize(&self) -> String {
        EpsilonNFA::serialize(self)
    }
}
