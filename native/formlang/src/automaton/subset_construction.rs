//! Subset construction algorithm for converting ε-NFA to DFA.

use crate::automaton::dfa::DFA;
use crate::automaton::epsilon_nfa::EpsilonNFA;
use crate::automaton::state::{StateId, StateSet};
use indexmap::IndexMap;
use log::{debug, trace};
use std::collections::{HashMap, HashSet, VecDeque};

/// Convert an epsilon-NFA to a DFA using the powerset construction algorithm.
///
/// Each DFA state stands for one reachable set of NFA states and is named by
/// concatenating the member names in sorted order, so equal sets always get
/// equal names. If two different sets spell the same name, the later one
/// gets `'` appended until the name is unique. Symbols are explored in
/// alphabetical order, so the output is reproducible.
pub fn subset_construction(nfa: &EpsilonNFA) -> DFA {
    let symbols = nfa.sorted_symbols();
    let mut names = SubsetNames::default();

    // Each DFA state corresponds to a set of NFA states
    // We map sets of NFA states to DFA state IDs
    let mut state_mapping: IndexMap<StateSet, StateId> = IndexMap::new();
    let mut provenance: HashMap<StateId, Vec<String>> = HashMap::new();

    // Initial DFA state is the epsilon closure of the NFA start state
    let initial_set = nfa.epsilon_closure_of(nfa.start_state());
    let initial_members = sorted_members(nfa, &initial_set);
    let initial_name = names.allocate(&initial_members);

    let mut dfa = DFA::new(nfa.declared_alphabet(), &initial_name);
    let initial_dfa_state = dfa.add_state(&initial_name);
    state_mapping.insert(initial_set.clone(), initial_dfa_state);
    provenance.insert(initial_dfa_state, to_owned(&initial_members));

    // Queue of DFA states to process (as NFA state sets)
    let mut worklist: VecDeque<(StateSet, StateId)> = VecDeque::new();
    worklist.push_back((initial_set, initial_dfa_state));

    while let Some((current_nfa_set, current_dfa_state)) = worklist.pop_front() {
        if current_nfa_set.intersects(nfa.final_states()) {
            dfa.add_final_state(current_dfa_state);
        }

        for &(symbol, symbol_name) in &symbols {
            // Compute the set of NFA states reachable on this symbol
            let next_nfa_set = nfa.move_on_symbol(&current_nfa_set, symbol);

            if next_nfa_set.is_empty() {
                // No transition on this symbol - skip (DFA will have no transition)
                continue;
            }

            // Check if we've seen this DFA state before
            let next_dfa_state = if let Some(&existing) = state_mapping.get(&next_nfa_set) {
                existing
            } else {
                let members = sorted_members(nfa, &next_nfa_set);
                let name = names.allocate(&members);
                let new_state = dfa.add_state(&name);
                trace!("subset {members:?} becomes DFA state {name}");

                state_mapping.insert(next_nfa_set.clone(), new_state);
                provenance.insert(new_state, to_owned(&members));
                worklist.push_back((next_nfa_set, new_state));
                new_state
            };

            if let Some(dfa_symbol) = dfa.declared_symbol(symbol_name) {
                dfa.add_transition(current_dfa_state, dfa_symbol, next_dfa_state);
            }
        }
    }

    debug!(
        "subset construction: {} NFA states -> {} DFA states",
        nfa.num_states(),
        state_mapping.len()
    );

    // Store the NFA-to-DFA state mapping in the DFA for later use
    dfa.set_state_mapping(provenance);
    dfa
}

/// Member names of a state set, sorted.
fn sorted_members<'a>(nfa: &'a EpsilonNFA, states: &StateSet) -> Vec<&'a str> {
    let mut members = nfa.state_names(states);
    members.sort_unstable();
    members
}

fn to_owned(members: &[&str]) -> Vec<String> {
    members.iter().map(|member| (*member).to_owned()).collect()
}

/// Hands out unique DFA state names.
#[derive(Default)]
struct SubsetNames {
    used: HashSet<String>,
}

impl SubsetNames {
    fn allocate(&mut self, members: &[&str]) -> String {
        let mut name = members.concat();
        while !self.used.insert(name.clone()) {
            name.push('\'');
        }
        name
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn nfa(definition: &str) -> EpsilonNFA {
        definition.parse().unwrap()
    }

    #[test]
    fn test_subset_construction_basic() {
        // NFA: 0 -a-> 1, 0 -a-> 2, 1 -b-> 3(final), 2 -b-> 3(final)
        let nfa = nfa("s0,s1,s2,s3\na,b\ns0\ns3\ns0,a,s1\ns0,a,s2\ns1,b,s3\ns2,b,s3\n");

        let dfa = subset_construction(&nfa);

        assert_eq!(dfa.start(), "s0");
        assert_eq!(dfa.states().collect::<Vec<_>>(), ["s0", "s1s2", "s3"]);
        assert_eq!(dfa.transition("s0", "a"), Some("s1s2"));
        assert_eq!(dfa.transition("s1s2", "b"), Some("s3"));
        assert_eq!(dfa.transition("s0", "b"), None);
        assert_eq!(dfa.accept().collect::<Vec<_>>(), ["s3"]);
        assert!(dfa.validate());
    }

    #[test]
    fn test_subset_construction_with_epsilon() {
        // NFA: 0 -ε-> 1 -a-> 2(final)
        let nfa = nfa("s0,s1,s2\na\ns0\ns2\ns0,e,s1\ns1,a,s2\n");

        let dfa = subset_construction(&nfa);

        // Initial DFA state is {s0, s1}, the epsilon closure of s0
        assert_eq!(dfa.start(), "s0s1");
        assert_eq!(dfa.subset_of("s0s1").unwrap(), ["s0", "s1"]);
        assert_eq!(dfa.transition("s0s1", "a"), Some("s2"));
        assert!(dfa.accepts("a"));
        assert!(!dfa.accepts(""));
        assert!(!dfa.accepts("aa"));
    }

    #[test]
    fn test_a_plus_b_agrees() {
        let nfa = nfa("q0,q1,q2\na,b\nq0\nq2\nq0,a,q0\nq0,a,q1\nq1,b,q2\n");
        let dfa = nfa.to_dfa();

        for (input, expected) in [("aab", true), ("ab", true), ("ba", false), ("", false)] {
            assert_eq!(nfa.accepts(input), expected, "NFA on {input:?}");
            assert_eq!(dfa.accepts(input), expected, "DFA on {input:?}");
        }
        assert_eq!(dfa.alphabet().collect::<Vec<_>>(), ["a", "b"]);
    }

    #[test]
    fn test_accepting_start_closure() {
        let nfa = nfa("q0,q1\na\nq0\nq1\nq0,e,q1\n");
        let dfa = nfa.to_dfa();
        assert!(dfa.accepts(""));
        assert!(dfa.is_accepting("q0q1"));
        assert_eq!(dfa.num_states(), 1);
    }

    #[test]
    fn test_names_are_order_independent() {
        // The same subset is reached through differently ordered moves.
        let nfa = nfa("z,y,x\na,b\nz\nx\nz,a,y\nz,a,x\nz,b,x\nz,b,y\n");
        let dfa = nfa.to_dfa();
        assert_eq!(dfa.transition("z", "a"), Some("xy"));
        assert_eq!(dfa.transition("z", "b"), Some("xy"));
        assert_eq!(dfa.num_states(), 2);
    }

    #[test]
    fn test_colliding_names_are_disambiguated() {
        let nfa = nfa("s,a,bc,ab,c\nx,y\ns\nc\ns,x,a\ns,x,bc\ns,y,ab\ns,y,c\n");
        let dfa = nfa.to_dfa();

        assert_eq!(dfa.num_states(), 3);
        assert_eq!(dfa.transition("s", "x"), Some("abc"));
        assert_eq!(dfa.transition("s", "y"), Some("abc'"));
        assert_eq!(dfa.subset_of("abc'").unwrap(), ["ab", "c"]);
        assert!(dfa.accepts("y"));
        assert!(!dfa.accepts("x"));
    }

    #[test]
    fn test_unreachable_states_and_unused_symbols() {
        let nfa = nfa("q0,q1,orphan\na,b,c\nq0\nq1\nq0,a,q1\norphan,b,q1\n");
        let dfa = nfa.to_dfa();
        assert_eq!(dfa.states().collect::<Vec<_>>(), ["q0", "q1"]);
        assert_eq!(dfa.transitions().count(), 1);
        assert_eq!(dfa.alphabet().collect::<Vec<_>>(), ["a", "b", "c"]);
    }

    #[test]
    fn test_converted_dfa_round_trips() {
        let nfa = nfa("q0,q1,q2\na,b\nq0\nq2\nq0,e,q1\nq0,a,q0\nq1,b,q2\nq2,e,q0\n");
        let dfa = nfa.to_dfa();
        let reparsed: DFA = dfa.serialize().parse().unwrap();
        assert_eq!(reparsed, dfa);
        assert!(reparsed.validate());
        for input in ["", "b", "ab", "abb", "ba", "bab"] {
            assert_eq!(reparsed.accepts(input), nfa.accepts(input), "{input:?}");
        }
    }
}
