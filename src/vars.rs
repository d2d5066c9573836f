use std::collections::HashMap;

use varisat::Var;

use crate::grid::CorridorId;

/// Role a boolean variable plays in the CNF encoding.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub(crate) enum VarKey {
    /// The corridor carries exactly one bridge.
    Single(CorridorId),
    /// The corridor carries exactly two bridges.
    Double(CorridorId),
    /// The corridor carries at least one bridge; the disjunction of the other two.
    Active(CorridorId),
}

/// Lazy bidirectional map from [`VarKey`]s to dense solver variables.
///
/// Ids are stable for the registry's lifetime. The cardinality generator
/// mints its own auxiliary variables past [`Self::watermark`]; callers must
/// [`Self::advance_to`] the returned watermark afterward so later lazy
/// allocations cannot collide.
pub(crate) struct VariableRegistry {
    forward: HashMap<VarKey, Var>,
    reverse: HashMap<Var, VarKey>,
    next_index: usize,
}

impl VariableRegistry {
    pub(crate) fn new() -> Self {
        Self {
            forward: HashMap::new(),
            reverse: HashMap::new(),
            next_index: 0,
        }
    }

    /// The variable for `key`, allocated on first use.
    pub(crate) fn var(&mut self, key: VarKey) -> Var {
        match self.forward.get(&key) {
            Some(&var) => var,
            None => {
                let var = Var::from_index(self.next_index);
                self.next_index += 1;
                self.forward.insert(key, var);
                self.reverse.insert(var, key);
                var
            }
        }
    }

    /// The key a variable was allocated for, if it came from this registry.
    /// Auxiliary variables minted by the cardinality generator have no key.
    pub(crate) fn lookup(&self, var: Var) -> Option<VarKey> {
        self.reverse.get(&var).copied()
    }

    /// Index of the next variable this registry would allocate.
    pub(crate) fn watermark(&self) -> usize {
        self.next_index
    }

    /// Move the allocator past ids minted externally.
    pub(crate) fn advance_to(&mut self, index: usize) {
        if index > self.next_index {
            self.next_index = index;
        }
    }
}
