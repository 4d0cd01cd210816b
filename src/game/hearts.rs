//! Hearts (extension point)
//!
//! Every hider starts with a number of hearts, but no rule consumes them
//! yet. This module is the seam where such a rule would plug in; it is only
//! compiled with the `hearts` feature, and the only policy shipped,
//! [`NoElimination`], leaves hearts untouched.

use tracing::debug;

use crate::game::disguise::HiderRegistry;
use crate::game::state::ParticipantId;

/// What a hearts policy decided for one hit.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum HeartsVerdict {
    /// Hearts unchanged
    Unchanged,
    /// Hearts reduced, hider still in the game
    Wounded {
        /// Hearts left
        remaining: u32,
    },
    /// Hider is out
    Eliminated,
}

/// Rule deciding what a hunter's hit does to a hider's hearts.
pub trait HeartsPolicy {
    /// Apply one hit to `hearts` and report the verdict.
    fn on_hit(&mut self, hearts: &mut u32) -> HeartsVerdict;
}

/// Policy that never consumes hearts.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoElimination;

impl HeartsPolicy for NoElimination {
    fn on_hit(&mut self, _hearts: &mut u32) -> HeartsVerdict {
        HeartsVerdict::Unchanged
    }
}

/// Route a hit on `hider` through `policy`. `None` if `hider` is not
/// registered.
pub fn apply_hit<P: HeartsPolicy + ?Sized>(
    registry: &mut HiderRegistry,
    policy: &mut P,
    hider: &ParticipantId,
) -> Option<HeartsVerdict> {
    let record = registry.get_mut(hider)?;
    let verdict = policy.on_hit(record.hearts_mut());
    debug!("Hit on {}: {:?}", hider, verdict);
    Some(verdict)
}

#[cfg(test)]
mod tests {
    use super::*;

    struct OneHeartPerHit;

    impl HeartsPolicy for OneHeartPerHit {
        fn on_hit(&mut self, hearts: &mut u32) -> HeartsVerdict {
            *hearts = hearts.saturating_sub(1);
            if *hearts == 0 {
                HeartsVerdict::Eliminated
            } else {
                HeartsVerdict::Wounded { remaining: *hearts }
            }
        }
    }

    #[test]
    fn test_default_policy_keeps_hearts() {
        let mut registry = HiderRegistry::new();
        let id = ParticipantId::from("Alice");
        registry.enroll(id.clone(), 3);

        assert_eq!(apply_hit(&mut registry, &mut NoElimination, &id), Some(HeartsVerdict::Unchanged));
        assert_eq!(registry.get(&id).unwrap().hearts_remaining(), 3);
    }

    #[test]
    fn test_custom_policy_sees_record_hearts() {
        let mut registry = HiderRegistry::new();
        let id = ParticipantId::from("Alice");
        registry.enroll(id.clone(), 2);

        let mut policy = OneHeartPerHit;
        assert_eq!(apply_hit(&mut registry, &mut policy, &id), Some(HeartsVerdict::Wounded { remaining: 1 }));
        assert_eq!(apply_hit(&mut registry, &mut policy, &id), Some(HeartsVerdict::Eliminated));
        assert_eq!(apply_hit(&mut registry, &mut policy, &"Nobody".into()), None);
    }
}
