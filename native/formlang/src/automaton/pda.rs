//! Pushdown automaton definitions.
//!
//! Only the data model is implemented: a PDA can be parsed, checked and
//! written back out. Simulation and conversion to a grammar report
//! [`Unsupported`].

use crate::automaton::model::{Automaton, Header, read_alphabet, read_states};
use crate::automaton::text::{self, Reader, Writer};
use crate::error::{ParseError, Unsupported, Violation};
use crate::grammar::CFG;
use log::debug;
use std::collections::BTreeSet;
use std::str::FromStr;

/// One move: in `source`, reading `input` with `pop` on top of the stack,
/// go to `target` and replace the top with `push`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PdaTransition {
    pub source: String,
    pub input: String,
    pub pop: String,
    pub target: String,
    pub push: String,
}

/// A Pushdown Automaton.
#[derive(Debug, Clone)]
pub struct PDA {
    header: Header,
    stack_start: String,
    transitions: Vec<PdaTransition>,
}

impl PDA {
    /// Declared states, in declaration order.
    pub fn states(&self) -> impl Iterator<Item = &str> + '_ {
        self.header.declared_states()
    }

    pub fn alphabet(&self) -> impl Iterator<Item = &str> + '_ {
        self.header.declared_symbols()
    }

    /// The symbol on the stack before the first move.
    pub fn stack_start(&self) -> &str {
        &self.stack_start
    }

    pub fn start(&self) -> &str {
        self.header.state_name(self.header.start)
    }

    pub fn accept(&self) -> impl Iterator<Item = &str> + '_ {
        self.header.accept_names()
    }

    /// Transitions in the order they were listed.
    pub fn transitions(&self) -> &[PdaTransition] {
        &self.transitions
    }

    /// Check that the start and accepting states are declared.
    pub fn check(&self) -> Result<(), Violation> {
        self.header.check()
    }

    pub fn validate(&self) -> bool {
        match self.check() {
            Ok(()) => true,
            Err(violation) => {
                debug!("invalid PDA: {violation}");
                false
            }
        }
    }

    /// Stack-based simulation is not implemented.
    pub fn accepts(&self, _input: &str) -> Result<bool, Unsupported> {
        Err(Unsupported::PdaSimulation)
    }

    /// Conversion to an equivalent grammar is not implemented.
    pub fn to_cfg(&self) -> Result<CFG, Unsupported> {
        Err(Unsupported::PdaToCfg)
    }

    pub fn serialize(&self) -> String {
        let mut writer = Writer::new();
        writer.list(self.header.declared_states());
        writer.list(self.header.declared_symbols());
        writer.line(&self.stack_start);
        writer.line(self.start());
        writer.list(self.header.accept_names());
        for t in &self.transitions {
            writer.spaced([
                t.source.as_str(),
                t.input.as_str(),
                t.pop.as_str(),
                t.target.as_str(),
                t.push.as_str(),
            ]);
        }
        writer.finish()
    }
}

impl FromStr for PDA {
    type Err = ParseError;

    fn from_str(definition: &str) -> Result<Self, ParseError> {
        let mut reader = Reader::new(definition);
        let states = read_states(reader.header("states")?)?;
        let alphabet = read_alphabet(reader.header("alphabet")?, false)?;
        let stack_start = text::single(reader.header("stack start")?, "stack start symbol")?;
        let header = Header::finish(
            states,
            alphabet,
            reader.header("start state")?,
            reader.optional_header(),
        )?;

        let mut transitions = Vec::new();
        for line in reader.records() {
            let [source, input, pop, target, push] =
                text::spaced_record(line, "transition field")?;
            transitions.push(PdaTransition {
                source: source.to_owned(),
                input: input.to_owned(),
                pop: pop.to_owned(),
                target: target.to_owned(),
                push: push.to_owned(),
            });
        }

        debug!(
            "parsed PDA: {} states, {} transitions",
            header.num_states(),
            transitions.len()
        );
        Ok(PDA {
            header,
            stack_start: stack_start.to_owned(),
            transitions,
        })
    }
}

impl PartialEq for PDA {
    fn eq(&self, other: &Self) -> bool {
        fn set(transitions: &[PdaTransition]) -> BTreeSet<&PdaTransition> {
            transitions.iter().collect()
        }
        self.header == other.header
            && self.stack_start == other.stack_start
            && set(&self.transitions) == set(&other.transitions)
    }
}

impl Eq for PDA {}

impl Automaton for PDA {
    fn validate(&self) -> bool {
        PDA::validate(self)
    }

    fn try_accepts(&self, input: &str) -> Result<bool, Unsupported> {
        self.accepts(input)
    }

    fn serialize(&self) -> String {
        PDA::serialize(self)
    }
}
