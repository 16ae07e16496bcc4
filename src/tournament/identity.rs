//! Player numbering

use crate::game::policy::Archetype;

/// Hands out player numbers in two partitions: one counter for the first
/// archetype seen, a second shared by every other archetype. Both start at 1.
#[derive(Debug, Clone, Default)]
pub struct IdAssigner {
    first: Option<Archetype>,
    primary: u32,
    secondary: u32,
}

impl IdAssigner {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn next_id(&mut self, archetype: Archetype) -> u32 {
        let first = *self.first.get_or_insert(archetype);
        if first == archetype {
            self.primary += 1;
            self.primary
        } else {
            self.secondary += 1;
            self.secondary
        }
    }
}
