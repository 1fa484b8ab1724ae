//! Context-free grammar definitions.

use crate::automaton::text::{self, Reader, Writer};
use crate::error::{ParseError, Unsupported, Violation};
use crate::grammar::Grammar;
use indexmap::{IndexMap, IndexSet};
use log::debug;
use std::str::FromStr;

/// A Context-Free Grammar.
///
/// The definition lists the variables, the terminals and the start variable
/// on the first three lines, then one production per line: the head, then
/// the body symbols, all separated by whitespace. A production with no body
/// symbols derives the empty string.
///
/// Equality ignores the order in which variables, terminals and heads were
/// listed, but not the order of one head's alternatives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CFG {
    variables: IndexSet<String>,
    terminals: IndexSet<String>,
    start: String,
    productions: IndexMap<String, Vec<Vec<String>>>,
}

impl CFG {
    pub fn variables(&self) -> impl Iterator<Item = &str> + '_ {
        self.variables.iter().map(String::as_str)
    }

    pub fn terminals(&self) -> impl Iterator<Item = &str> + '_ {
        self.terminals.iter().map(String::as_str)
    }

    pub fn start(&self) -> &str {
        &self.start
    }

    /// Every production as `(head, body)`, grouped by head.
    pub fn productions(&self) -> impl Iterator<Item = (&str, &[String])> + '_ {
        self.productions.iter().flat_map(|(head, bodies)| {
            bodies
                .iter()
                .map(move |body| (head.as_str(), body.as_slice()))
        })
    }

    pub fn is_variable(&self, symbol: &str) -> bool {
        self.variables.contains(symbol)
    }

    pub fn is_terminal(&self, symbol: &str) -> bool {
        self.terminals.contains(symbol)
    }

    /// Check that the start variable and every head are declared
    /// variables, and that every body symbol is a variable or a terminal.
    pub fn check(&self) -> Result<(), Violation> {
        if !self.is_variable(&self.start) {
            return Err(Violation::UndeclaredStartVariable(self.start.clone()));
        }
        for (head, body) in self.productions() {
            if !self.is_variable(head) {
                return Err(Violation::UndeclaredHead(head.to_owned()));
            }
            if let Some(symbol) = body
                .iter()
                .find(|symbol| !self.is_variable(symbol) && !self.is_terminal(symbol))
            {
                return Err(Violation::UnknownGrammarSymbol(symbol.clone()));
            }
        }
        Ok(())
    }

    pub fn validate(&self) -> bool {
        match self.check() {
            Ok(()) => true,
            Err(violation) => {
                debug!("invalid CFG: {violation}");
                false
            }
        }
    }

    /// Membership testing is not implemented.
    pub fn generates(&self, _input: &str) -> Result<bool, Unsupported> {
        Err(Unsupported::CfgMembership)
    }

    pub fn serialize(&self) -> String {
        let mut writer = Writer::new();
        writer.list(self.variables());
        writer.list(self.terminals());
        writer.line(&self.start);
        for (head, body) in self.productions() {
            writer.spaced(std::iter::once(head).chain(body.iter().map(String::as_str)));
        }
        writer.finish()
    }
}

impl FromStr for CFG {
    type Err = ParseError;

    fn from_str(definition: &str) -> Result<Self, ParseError> {
        let mut reader = Reader::new(definition);
        let variables = text::list(reader.header("variables")?, "variable")?;
        let terminals = text::list(reader.header("terminals")?, "terminal")?;
        let start = text::single(reader.header("start variable")?, "start variable")?;

        let mut productions: IndexMap<String, Vec<Vec<String>>> = IndexMap::new();
        for line in reader.records() {
            let mut symbols = line.text.split_whitespace();
            // Records are never blank, so there is always a head.
            let Some(head) = symbols.next() else {
                continue;
            };
            productions
                .entry(head.to_owned())
                .or_default()
                .push(symbols.map(str::to_owned).collect());
        }

        let cfg = CFG {
            variables: variables.into_iter().map(str::to_owned).collect(),
            terminals: terminals.into_iter().map(str::to_owned).collect(),
            start: start.to_owned(),
            productions,
        };
        debug!(
            "parsed CFG: {} variables, {} terminals, {} productions",
            cfg.variables.len(),
            cfg.terminals.len(),
            cfg.productions().count()
        );
        Ok(cfg)
    }
}

impl Grammar for CFG {
    fn validate(&self) -> bool {
        CFG::validate(self)
    }

    fn generates(&self, input: &str) -> Result<bool, Unsupported> {
        CFG::generates(self, input)
    }

    fn serialize(&self) -> String {
        CFG::serialize(self)
    }
}
