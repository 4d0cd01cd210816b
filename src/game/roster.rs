//! Roster Partitioning
//!
//! Splits the connected participants into hunters and hiders.

use std::collections::BTreeSet;
use serde::{Serialize, Deserialize};

use crate::core::rng::{shuffle, RandomSource};
use crate::game::state::ParticipantId;

/// Result of a partition. The two sets are disjoint and together hold
/// every participant of the roster exactly once.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoleAssignment {
    /// Seekers
    pub hunters: BTreeSet<ParticipantId>,
    /// Participants that may disguise
    pub hiders: BTreeSet<ParticipantId>,
}

impl RoleAssignment {
    /// Whether `id` was made a hunter.
    pub fn is_hunter(&self, id: &ParticipantId) -> bool {
        self.hunters.contains(id)
    }

    /// Whether `id` was made a hider.
    pub fn is_hider(&self, id: &ParticipantId) -> bool {
        self.hiders.contains(id)
    }
}

/// Randomly assign roles.
///
/// The roster is shuffled uniformly, then walked in order: the owner always
/// hides, everyone else fills the hunter quota first and hides once it is
/// full. A quota at or above the roster size makes every non-owner a
/// hunter. Duplicate ids in `participants` are counted once.
pub fn partition<R: RandomSource + ?Sized>(
    participants: &[ParticipantId],
    owner: Option<&ParticipantId>,
    hunter_quota: usize,
    rng: &mut R,
) -> RoleAssignment {
    let mut seen = BTreeSet::new();
    let mut shuffled: Vec<&ParticipantId> = participants
        .iter()
        .filter(|id| seen.insert(*id))
        .collect();
    shuffle(rng, &mut shuffled);

    let mut assignment = RoleAssignment::default();
    for id in shuffled {
        if Some(id) == owner {
            assignment.hiders.insert(id.clone());
        } else if assignment.hunters.len() < hunter_quota {
            assignment.hunters.insert(id.clone());
        } else {
            assignment.hiders.insert(id.clone());
        }
    }

    assignment
}
