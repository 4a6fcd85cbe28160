//! Decision policies consulted at the points where enemy archetypes differ

use crate::agent::Agent;
use crate::context::TargetInfo;
use nemesis_combat::AttackOutcome;
use nemesis_core::{BehaviorKind, StateId};

/// Policy hooks. Returning `None` keeps the state's default behavior.
pub trait BehaviorStrategy: Send {
    fn name(&self) -> &'static str;

    /// The idle timer ran out. `None` restarts the idle timer.
    fn on_idle_elapsed(&self, agent: &Agent) -> Option<StateId>;

    /// A strike finished its windup and was resolved
    fn on_attack_finished(
        &self,
        agent: &Agent,
        outcome: AttackOutcome,
        target: Option<TargetInfo>,
    ) -> Option<StateId>;

    /// The target got further than the return radius during a chase.
    /// `None` keeps chasing.
    fn on_target_lost(&self, agent: &Agent) -> Option<StateId>;
}

fn target_gone(target: Option<TargetInfo>) -> bool {
    target.map_or(true, |t| !t.alive)
}

/// Patrols when it has a route, gives up a chase beyond the return radius
#[derive(Debug, Default, Clone, Copy)]
pub struct PatrolAndLoseInterest;

impl BehaviorStrategy for PatrolAndLoseInterest {
    fn name(&self) -> &'static str {
        "patrol_and_lose_interest"
    }

    fn on_idle_elapsed(&self, agent: &Agent) -> Option<StateId> {
        agent.patrol.has_route().then_some(StateId::Patrol)
    }

    fn on_attack_finished(
        &self,
        _agent: &Agent,
        _outcome: AttackOutcome,
        target: Option<TargetInfo>,
    ) -> Option<StateId> {
        target_gone(target).then_some(StateId::Return)
    }

    fn on_target_lost(&self, _agent: &Agent) -> Option<StateId> {
        Some(StateId::Return)
    }
}

/// Keeps chasing regardless of distance; only the trace timeout stops it
#[derive(Debug, Default, Clone, Copy)]
pub struct RelentlessChase;

impl BehaviorStrategy for RelentlessChase {
    fn name(&self) -> &'static str {
        "relentless_chase"
    }

    fn on_idle_elapsed(&self, agent: &Agent) -> Option<StateId> {
        agent.patrol.has_route().then_some(StateId::Patrol)
    }

    fn on_attack_finished(
        &self,
        _agent: &Agent,
        outcome: AttackOutcome,
        target: Option<TargetInfo>,
    ) -> Option<StateId> {
        if target_gone(target) {
            Some(StateId::Return)
        } else if !outcome.landed() {
            // Missed: close the gap again
            Some(StateId::Trace)
        } else {
            None
        }
    }

    fn on_target_lost(&self, _agent: &Agent) -> Option<StateId> {
        None
    }
}

/// Guards its post: never patrols, walks home once the target escapes
#[derive(Debug, Default, Clone, Copy)]
pub struct Sentry;

impl BehaviorStrategy for Sentry {
    fn name(&self) -> &'static str {
        "sentry"
    }

    fn on_idle_elapsed(&self, _agent: &Agent) -> Option<StateId> {
        None
    }

    fn on_attack_finished(
        &self,
        _agent: &Agent,
        _outcome: AttackOutcome,
        target: Option<TargetInfo>,
    ) -> Option<StateId> {
        target_gone(target).then_some(StateId::Return)
    }

    fn on_target_lost(&self, _agent: &Agent) -> Option<StateId> {
        Some(StateId::Return)
    }
}

/// Built-in strategy for a configured kind
pub fn strategy_for(kind: BehaviorKind) -> Box<dyn BehaviorStrategy> {
    match kind {
        BehaviorKind::PatrolAndLoseInterest => Box::new(PatrolAndLoseInterest),
        BehaviorKind::RelentlessChase => Box::new(RelentlessChase),
        BehaviorKind::Sentry => Box::new(Sentry),
    }
}
