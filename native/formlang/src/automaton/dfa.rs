//! Deterministic Finite Automaton (DFA) implementation with Hopcroft minimization.

use crate::automaton::model::{Automaton, Header};
use crate::automaton::names::NameTable;
use crate::automaton::state::{StateId, StateSet};
use crate::automaton::symbol::SymbolId;
use crate::automaton::text::{self, Reader, Writer};
use crate::error::{ParseError, Unsupported, Violation};
use indexmap::IndexMap;
use log::{debug, trace};
use std::collections::{BTreeSet, HashMap, VecDeque};
use std::str::FromStr;

/// A Deterministic Finite Automaton.
///
/// The transition function may be partial: a missing `(state, symbol)`
/// entry rejects the input. When a definition lists the same
/// `(state, symbol)` twice the last destination wins.
#[derive(Debug, Clone)]
pub struct DFA {
    header: Header,
    /// Transitions: (source, symbol) -> destination, in first-declared order
    transitions: IndexMap<(StateId, SymbolId), StateId>,
    /// Reverse transitions: (destination, symbol) -> set of sources
    reverse_transitions: HashMap<(StateId, SymbolId), StateSet>,
    /// NFA states each DFA state stands for (if created via subset construction)
    state_mapping: Option<HashMap<StateId, Vec<String>>>,
}

impl DFA {
    /// Create a DFA over `alphabet` with a single, non-accepting start state.
    pub(crate) fn new(alphabet: NameTable, start: &str) -> Self {
        Self::from_header(Header::new(alphabet, start))
    }

    fn from_header(header: Header) -> Self {
        Self {
            header,
            transitions: IndexMap::new(),
            reverse_transitions: HashMap::new(),
            state_mapping: None,
        }
    }

    /// Add a declared state (or return the existing one) by name.
    pub(crate) fn add_state(&mut self, name: &str) -> StateId {
        self.header.add_state(name)
    }

    /// Add a final (accepting) state.
    pub(crate) fn add_final_state(&mut self, state: StateId) {
        self.header.accept.insert(state);
    }

    /// Add a transition, replacing any earlier one for `(source, symbol)`.
    pub(crate) fn add_transition(&mut self, source: StateId, symbol: SymbolId, destination: StateId) {
        if let Some(previous) = self.transitions.insert((source, symbol), destination) {
            if previous == destination {
                return;
            }
            trace!(
                "DFA transition ({}, {}) redefined: {} -> {}",
                self.header.state_name(source),
                self.header.symbol_name(symbol),
                self.header.state_name(previous),
                self.header.state_name(destination)
            );
            if let Some(sources) = self.reverse_transitions.get_mut(&(previous, symbol)) {
                sources.remove(source);
            }
        }

        let capacity = self.header.num_states();
        self.reverse_transitions
            .entry((destination, symbol))
            .or_insert_with(|| StateSet::with_capacity(capacity))
            .insert(source);
    }

    /// Record which NFA states each DFA state was built from.
    pub(crate) fn set_state_mapping(&mut self, mapping: HashMap<StateId, Vec<String>>) {
        self.state_mapping = Some(mapping);
    }

    pub(crate) fn declared_symbol(&self, name: &str) -> Option<SymbolId> {
        self.header.input_symbol(name)
    }

    fn transition_id(&self, source: StateId, symbol: SymbolId) -> Option<StateId> {
        self.transitions.get(&(source, symbol)).copied()
    }

    /// Declared states, in declaration order.
    pub fn states(&self) -> impl Iterator<Item = &str> + '_ {
        self.header.declared_states()
    }

    /// Declared input symbols, in declaration order.
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

    pub fn is_accepting(&self, state: &str) -> bool {
        self.header
            .states
            .id(state)
            .is_some_and(|id| self.header.accept.contains(id))
    }

    /// Get the destination of `state` on `symbol`, if any.
    pub fn transition(&self, state: &str, symbol: &str) -> Option<&str> {
        let source = self.header.states.id(state)?;
        let symbol = self.header.alphabet.id(symbol)?;
        self.transition_id(source, symbol)
            .map(|destination| self.header.state_name(destination))
    }

    /// Get all transitions as `(source, symbol, destination)` names.
    pub fn transitions(&self) -> impl Iterator<Item = (&str, &str, &str)> + '_ {
        self.transitions.iter().map(|(&(src, sym), &dst)| {
            (
                self.header.state_name(src),
                self.header.symbol_name(sym),
                self.header.state_name(dst),
            )
        })
    }

    /// Get the number of states, including referenced but undeclared ones.
    pub fn num_states(&self) -> usize {
        self.header.num_states()
    }

    /// The sorted NFA states a state of a converted DFA stands for.
    pub fn subset_of(&self, state: &str) -> Option<&[String]> {
        let id = self.header.states.id(state)?;
        self.state_mapping.as_ref()?.get(&id).map(Vec::as_slice)
    }

    /// Check invariants 1-4, reporting the first one that fails.
    pub fn check(&self) -> Result<(), Violation> {
        self.header.check()?;
        for (&(source, symbol), &destination) in &self.transitions {
            self.header.check_state(source)?;
            self.header.check_symbol(symbol)?;
            self.header.check_state(destination)?;
        }
        Ok(())
    }

    /// Check the structural invariants.
    pub fn validate(&self) -> bool {
        match self.check() {
            Ok(()) => true,
            Err(violation) => {
                debug!("invalid DFA: {violation}");
                false
            }
        }
    }

    /// Run the DFA on `input`, reading one `char` per symbol.
    pub fn accepts(&self, input: &str) -> bool {
        self.run(
            input
                .chars()
                .map(|c| self.header.input_symbol(c.encode_utf8(&mut [0; 4]))),
        )
    }

    /// Run the DFA on a sequence of (possibly multi-character) symbols.
    pub fn accepts_symbols<'a>(&self, input: impl IntoIterator<Item = &'a str>) -> bool {
        self.run(
            input
                .into_iter()
                .map(|symbol| self.header.input_symbol(symbol)),
        )
    }

    fn run(&self, symbols: impl Iterator<Item = Option<SymbolId>>) -> bool {
        let mut current = self.header.start;
        for symbol in symbols {
            // Symbols outside the alphabet reject immediately.
            let Some(symbol) = symbol else {
                return false;
            };
            match self.transition_id(current, symbol) {
                Some(next) => {
                    trace!(
                        "DFA {} --{}--> {}",
                        self.header.state_name(current),
                        self.header.symbol_name(symbol),
                        self.header.state_name(next)
                    );
                    current = next;
                }
                None => return false,
            }
        }
        self.header.accept.contains(current)
    }

    /// Serialize to the line-oriented definition format.
    pub fn serialize(&self) -> String {
        let mut writer = Writer::new();
        self.header.write(&mut writer);
        for (source, symbol, destination) in self.transitions() {
            writer.list([source, symbol, destination]);
        }
        writer.finish()
    }

    /// Check if the DFA is empty (accepts no strings).
    pub fn is_empty(&self) -> bool {
        !self.find_reachable_states().intersects(&self.header.accept)
    }

    /// Minimize the DFA using Hopcroft's algorithm.
    ///
    /// States that are unreachable, or from which no accepting state can be
    /// reached, are dropped first. Each state of the result is named after
    /// the smallest name among the states it merges.
    ///
    /// A DFA that fails [`DFA::check`] is returned unchanged, so an invalid
    /// definition stays invalid.
    pub fn minimize(&self) -> DFA {
        if let Err(violation) = self.check() {
            debug!("not minimizing invalid DFA: {violation}");
            return self.clone();
        }

        let live = self
            .find_reachable_states()
            .intersection(&self.find_productive_states());

        if !live.contains(self.header.start) {
            // Empty language: a lone, non-accepting start state.
            return DFA::new(self.header.declared_alphabet(), self.start());
        }

        let symbols = self.header.input_symbols();

        // Initial partition: final states and non-final states
        let final_live = self.header.accept.intersection(&live);
        let non_final_live = live.difference(&self.header.accept);

        let mut partitions: Vec<StateSet> = [final_live, non_final_live]
            .into_iter()
            .filter(|partition| !partition.is_empty())
            .collect();

        // Worklist of (partition_index, symbol) pairs to process
        let mut worklist: VecDeque<(usize, SymbolId)> = VecDeque::new();
        for idx in 0..partitions.len() {
            for &symbol in &symbols {
                worklist.push_back((idx, symbol));
            }
        }

        // Main refinement loop
        while let Some((splitter_idx, symbol)) = worklist.pop_front() {
            let predecessors = self.find_predecessors(&partitions[splitter_idx], symbol);

            if predecessors.is_empty() {
                continue;
            }

            // Try to split each partition
            let mut new_partitions = Vec::new();

            for (part_idx, partition) in partitions.iter().enumerate() {
                let intersection = partition.intersection(&predecessors);
                let difference = partition.difference(&predecessors);

                if !intersection.is_empty() && !difference.is_empty() {
                    new_partitions.push((part_idx, intersection, difference));
                }
            }

            // Apply splits. The transition function is partial, so both
            // halves have to be revisited as splitters.
            for (part_idx, keep, add) in new_partitions {
                let new_idx = partitions.len();
                partitions[part_idx] = keep;
                partitions.push(add);

                for &sym in &symbols {
                    worklist.push_back((part_idx, sym));
                    worklist.push_back((new_idx, sym));
                }
            }
        }

        // Build minimized DFA from partitions
        self.build_minimized_dfa(&partitions, &symbols)
    }

    /// Find all states reachable from the start state over the alphabet.
    fn find_reachable_states(&self) -> StateSet {
        let symbols = self.header.input_symbols();
        let mut reachable = StateSet::with_capacity(self.num_states());

        let mut queue = VecDeque::new();
        queue.push_back(self.header.start);

        while let Some(state) = queue.pop_front() {
            if reachable.contains(state) {
                continue;
            }
            reachable.insert(state);

            for &symbol in &symbols {
                if let Some(next) = self.transition_id(state, symbol) {
                    if !reachable.contains(next) {
                        queue.push_back(next);
                    }
                }
            }
        }

        reachable
    }

    /// Find all states from which an accepting state can be reached.
    fn find_productive_states(&self) -> StateSet {
        let symbols = self.header.input_symbols();
        let mut productive = StateSet::with_capacity(self.num_states());
        let mut queue: VecDeque<StateId> = self.header.accept.iter().collect();

        while let Some(state) = queue.pop_front() {
            if productive.contains(state) {
                continue;
            }
            productive.insert(state);

            for &symbol in &symbols {
                if let Some(sources) = self.reverse_transitions.get(&(state, symbol)) {
                    queue.extend(sources.iter().filter(|&source| !productive.contains(source)));
                }
            }
        }

        productive
    }

    /// Find all states that can reach the target set on a given symbol.
    fn find_predecessors(&self, targets: &StateSet, symbol: SymbolId) -> StateSet {
        let mut predecessors = StateSet::with_capacity(self.num_states());

        for target in targets.iter() {
            if let Some(sources) = self.reverse_transitions.get(&(target, symbol)) {
                predecessors.union_with(sources);
            }
        }

        predecessors
    }

    /// Build a minimized DFA from partitions.
    fn build_minimized_dfa(&self, partitions: &[StateSet], symbols: &[SymbolId]) -> DFA {
        // Map old states to their partition (new state)
        let mut state_to_partition: HashMap<StateId, usize> = HashMap::new();
        for (part_idx, partition) in partitions.iter().enumerate() {
            for state in partition.iter() {
                state_to_partition.insert(state, part_idx);
            }
        }

        let names: Vec<&str> = partitions
            .iter()
            .map(|partition| {
                partition
                    .iter()
                    .map(|state| self.header.state_name(state))
                    .min()
                    .unwrap_or_default()
            })
            .collect();

        let start_name = state_to_partition
            .get(&self.header.start)
            .map_or(self.start(), |&part_idx| names[part_idx]);
        let mut minimized = DFA::new(self.header.declared_alphabet(), start_name);
        let ids: Vec<StateId> = names.iter().map(|name| minimized.add_state(name)).collect();

        for (part_idx, partition) in partitions.iter().enumerate() {
            if partition.intersects(&self.header.accept) {
                minimized.add_final_state(ids[part_idx]);
            }

            // Every member agrees on where each symbol leads; use any representative.
            let Some(representative) = partition.iter().next() else {
                continue;
            };
            for &symbol in symbols {
                let Some(dest) = self.transition_id(representative, symbol) else {
                    continue;
                };
                if let Some(&dest_idx) = state_to_partition.get(&dest) {
                    let new_symbol = minimized
                        .header
                        .alphabet
                        .intern(self.header.symbol_name(symbol));
                    minimized.add_transition(ids[part_idx], new_symbol, ids[dest_idx]);
                }
            }
        }

        // Carry the NFA provenance over to the merged states
        if let Some(orig_mapping) = &self.state_mapping {
            let mut new_mapping: HashMap<StateId, Vec<String>> = HashMap::new();
            for (part_idx, partition) in partitions.iter().enumerate() {
                let mut nfa_states: Vec<String> = partition
                    .iter()
                    .filter_map(|state| orig_mapping.get(&state))
                    .flatten()
                    .cloned()
                    .collect();
                nfa_states.sort_unstable();
                nfa_states.dedup();
                new_mapping.insert(ids[part_idx], nfa_states);
            }
            minimized.set_state_mapping(new_mapping);
        }

        debug!(
            "minimized DFA: {} -> {} states",
            self.num_states(),
            minimized.num_states()
        );
        minimized
    }

    fn named_transitions(&self) -> BTreeSet<(&str, &str, &str)> {
        self.transitions().collect()
    }
}

impl FromStr for DFA {
    type Err = ParseError;

    /// Parse a DFA definition. Structural problems such as undeclared
    /// states are left for [`DFA::validate`]; only malformed text fails.
    fn from_str(definition: &str) -> Result<Self, ParseError> {
        let mut reader = Reader::new(definition);
        let header = Header::parse(&mut reader, false)?;
        let mut dfa = DFA::from_header(header);

        for line in reader.records() {
            let [source, symbol, destination] = text::record(line, "transition field")?;
            let source = dfa.header.states.intern(source);
            let symbol = dfa.header.alphabet.intern(symbol);
            let destination = dfa.header.states.intern(destination);
            dfa.add_transition(source, symbol, destination);
        }

        debug!(
            "parsed DFA: {} states, {} symbols, {} transitions",
            dfa.header.num_states(),
            dfa.header.alphabet.len(),
            dfa.transitions.len()
        );
        Ok(dfa)
    }
}

/// Structural equality: same states, alphabet, start, accepting states and
/// transitions, regardless of the order they were listed in.
impl PartialEq for DFA {
    fn eq(&self, other: &Self) -> bool {
        self.header == other.header && self.named_transitions() == other.named_transitions()
    }
}

impl Eq for DFA {}

impl Automaton for DFA {
    fn validate(&self) -> bool {
        DFA::validate(self)
    }

    fn try_accepts(&self, input: &str) -> Result<bool, Unsupported> {
        Ok(self.accepts(input))
    }

    fn serialize(&self) -> String {
        DFA::serialize(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PARITY: &str = "q0,q1\n0,1\nq0\nq1\nq0,0,q0\nq0,1,q1\nq1,0,q1\nq1,1,q0\n";

    fn dfa(definition: &str) -> DFA {
        definition.parse().unwrap()
    }

    #[test]
    fn test_dfa_basic() {
        let dfa = dfa(PARITY);

        assert_eq!(dfa.num_states(), 2);
        assert_eq!(dfa.start(), "q0");
        assert_eq!(dfa.accept().collect::<Vec<_>>(), ["q1"]);
        assert_eq!(dfa.transition("q0", "1"), Some("q1"));
        assert!(dfa.validate());
        assert!(!dfa.is_empty());
    }

    #[test]
    fn test_parity_acceptance() {
        let dfa = dfa(PARITY);
        assert!(dfa.accepts("1"));
        assert!(!dfa.accepts("11"));
        assert!(!dfa.accepts(""));
        assert!(dfa.accepts("0100"));
        assert!(dfa.accepts_symbols(["1", "0", "1", "1"]));
    }

    #[test]
    fn test_out_of_alphabet_and_missing_transition_reject() {
        let dfa = dfa(PARITY);
        assert!(!dfa.accepts("12"));
        assert!(!dfa.accepts("a"));

        let partial = self::dfa("q0,q1\na,b\nq0\nq1\nq0,a,q1\n");
        assert!(partial.accepts("a"));
        assert!(!partial.accepts("ab"));
        assert!(!partial.accepts("b"));
    }

    #[test]
    fn test_last_write_wins() {
        let dfa = dfa("q0,q1,q2\na\nq0\nq2\nq0,a,q1\nq0,a,q2\n");
        assert_eq!(dfa.transition("q0", "a"), Some("q2"));
        assert_eq!(dfa.transitions().count(), 1);
        assert!(dfa.accepts("a"));

        // The overwritten edge no longer counts as a way into q1.
        assert!(dfa.find_predecessors(&StateSet::singleton(1, 3), 0).is_empty());
    }

    #[test]
    fn test_validation_failures() {
        let undeclared_symbol = dfa("q0,q1\n0\nq0\nq1\nq0,1,q1\n");
        assert_eq!(
            undeclared_symbol.check(),
            Err(Violation::UndeclaredSymbol("1".into()))
        );
        assert!(!undeclared_symbol.validate());
        // Simulation still works mechanically.
        assert!(!undeclared_symbol.accepts("1"));

        let dangling = dfa("q0\n0\nq0\nq0\nq0,0,q9\n");
        assert_eq!(dangling.check(), Err(Violation::UndeclaredState("q9".into())));
        assert!(!dangling.accepts("0"));

        let bad_start = dfa("q0\n0\nqx\n\n");
        assert!(!bad_start.validate());
        assert!(!bad_start.accepts(""));
    }

    #[test]
    fn test_parse_errors() {
        assert_eq!(
            "q0\n0\nq0\nq0\nq0,0\n".parse::<DFA>(),
            Err(ParseError::FieldCount {
                line: 5,
                expected: 3,
                found: 2
            })
        );
        assert!(matches!(
            "q0\n0\n".parse::<DFA>(),
            Err(ParseError::MissingLine { line: 3, .. })
        ));
        assert!(matches!(
            "q0\n0\nq0\nq0\nq0,0,q0,q0\n".parse::<DFA>(),
            Err(ParseError::FieldCount { found: 4, .. })
        ));
    }

    #[test]
    fn test_serialize_round_trip() {
        let original = dfa(PARITY);
        let text = original.serialize();
        assert_eq!(text, PARITY);
        assert_eq!(dfa(&text), original);

        let empty_accept = dfa("q0\na\nq0\n\nq0,a,q0\n");
        assert_eq!(empty_accept.serialize(), "q0\na\nq0\n\nq0,a,q0\n");
        assert_eq!(dfa(&empty_accept.serialize()), empty_accept);
    }

    #[test]
    fn test_equality_ignores_listing_order() {
        let reordered = dfa("q1,q0\n1,0\nq0\nq1\nq1,1,q0\nq1,0,q1\nq0,1,q1\nq0,0,q0\n");
        assert_eq!(reordered, dfa(PARITY));
    }

    #[test]
    fn test_dfa_minimization() {
        // 0 -a-> 1 -b-> 3(final)
        // 0 -b-> 2 -b-> 4(final)
        // States 1 and 2 should be merged, as should 3 and 4
        let dfa = dfa("s0,s1,s2,s3,s4\na,b\ns0\ns3,s4\ns0,a,s1\ns0,b,s2\ns1,b,s3\ns2,b,s4\n");

        let minimized = dfa.minimize();

        assert_eq!(minimized.num_states(), 3);
        assert_eq!(minimized.start(), "s0");
        assert_eq!(minimized.transition("s0", "a"), Some("s1"));
        assert_eq!(minimized.transition("s0", "b"), Some("s1"));
        assert_eq!(minimized.transition("s1", "b"), Some("s3"));
        assert!(minimized.validate());
        for input in ["ab", "bb", "a", "b", "", "abb"] {
            assert_eq!(minimized.accepts(input), dfa.accepts(input), "{input:?}");
        }
    }

    #[test]
    fn test_minimization_drops_dead_states() {
        let dfa = dfa("q0,q1,dead\na,b\nq0\nq1\nq0,a,q1\nq0,b,dead\ndead,a,dead\ndead,b,dead\n");
        let minimized = dfa.minimize();
        assert_eq!(minimized.num_states(), 2);
        assert_eq!(minimized.transition("q0", "b"), None);
        assert!(minimized.accepts("a"));
        assert!(!minimized.accepts("b"));
    }

    #[test]
    fn test_invalid_dfa_is_not_minimized() {
        let undeclared_start = dfa("q0\na\nqx\nqx\nqx,a,qx\n");
        let minimized = undeclared_start.minimize();
        assert!(!minimized.validate());
        assert_eq!(minimized, undeclared_start);
        assert_eq!(minimized.serialize(), "q0\na\nqx\nqx\nqx,a,qx\n");
    }

    #[test]
    fn test_empty_dfa() {
        let no_accept = dfa("q0\na\nq0\n\nq0,a,q0\n");
        assert!(no_accept.is_empty());
        let minimized = no_accept.minimize();
        assert_eq!(minimized.num_states(), 1);
        assert!(minimized.is_empty());

        let unreachable = dfa("q0,q1\na\nq0\nq1\n");
        assert!(unreachable.is_empty());
    }
}
