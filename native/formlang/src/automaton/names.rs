//! Interning of state and symbol names.

use indexmap::IndexMap;

/// Maps names to dense ids, in first-seen order.
///
/// Every entry remembers whether it was declared (listed on the states or
/// alphabet line) or only referenced later. References to undeclared names
/// are kept so that a malformed definition still parses; `validate` is what
/// reports them.
#[derive(Debug, Clone, Default)]
pub struct NameTable {
    entries: IndexMap<String, bool>,
}

impl NameTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Declare a name. Returns `None` if it was already declared.
    pub fn declare(&mut self, name: &str) -> Option<u32> {
        if let Some((idx, _, declared)) = self.entries.get_full_mut(name) {
            if *declared {
                return None;
            }
            *declared = true;
            return Some(idx as u32);
        }
        let (idx, _) = self.entries.insert_full(name.to_owned(), true);
        Some(idx as u32)
    }

    /// Look up a name, adding it as undeclared if it is new.
    pub fn intern(&mut self, name: &str) -> u32 {
        match self.entries.get_index_of(name) {
            Some(idx) => idx as u32,
            None => self.entries.insert_full(name.to_owned(), false).0 as u32,
        }
    }

    pub fn id(&self, name: &str) -> Option<u32> {
        self.entries.get_index_of(name).map(|idx| idx as u32)
    }

    /// The id of `name`, but only if it was declared.
    pub fn declared_id(&self, name: &str) -> Option<u32> {
        match self.entries.get_full(name) {
            Some((idx, _, &true)) => Some(idx as u32),
            _ => None,
        }
    }

    /// The name behind `id`; empty for ids this table never handed out.
    pub fn name(&self, id: u32) -> &str {
        self.entries
            .get_index(id as usize)
            .map_or("", |(name, _)| name.as_str())
    }

    pub fn is_declared(&self, id: u32) -> bool {
        self.entries
            .get_index(id as usize)
            .is_some_and(|(_, declared)| *declared)
    }

    /// Number of names known, declared or not.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Declared names with their ids, in declaration order.
    pub fn declared(&self) -> impl Iterator<Item = (u32, &str)> + '_ {
        self.entries
            .iter()
            .enumerate()
            .filter(|(_, (_, declared))| **declared)
            .map(|(idx, (name, _))| (idx as u32, name.as_str()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_declare_and_intern() {
        let mut table = NameTable::new();
        assert_eq!(table.declare("q0"), Some(0));
        assert_eq!(table.declare("q1"), Some(1));
        assert_eq!(table.declare("q0"), None);

        assert_eq!(table.intern("q1"), 1);
        assert_eq!(table.intern("q9"), 2);
        assert!(table.is_declared(1));
        assert!(!table.is_declared(2));
        assert_eq!(table.declared_id("q9"), None);
        assert_eq!(table.id("q9"), Some(2));
        assert_eq!(table.name(2), "q9");
        assert_eq!(table.name(42), "");
    }

    #[test]
    fn test_late_declaration_keeps_id() {
        let mut table = NameTable::new();
        assert_eq!(table.intern("a"), 0);
        assert_eq!(table.declare("a"), Some(0));
        assert_eq!(table.declared().collect::<Vec<_>>(), vec![(0, "a")]);
    }
}
