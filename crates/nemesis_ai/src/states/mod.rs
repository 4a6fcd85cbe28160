//! The six enemy state behaviors

mod attack;
mod die;
mod idle;
mod patrol;
mod returning;
mod trace;

pub use attack::AttackState;
pub use die::DieState;
pub use idle::IdleState;
pub use patrol::PatrolState;
pub use returning::ReturnState;
pub use trace::TraceState;

use crate::agent::Agent;
use crate::context::{Environment, TargetInfo};
use crate::state_machine::StateBehavior;

/// A fresh table holding every built-in state
pub fn default_states() -> Vec<Box<dyn StateBehavior>> {
    vec![
        Box::new(IdleState::default()),
        Box::new(PatrolState::default()),
        Box::new(TraceState::default()),
        Box::new(AttackState::default()),
        Box::new(ReturnState::default()),
        Box::new(DieState::default()),
    ]
}

/// The live target, if it is within `range`, inside the cone and unobstructed
pub(crate) fn visible_target(
    agent: &Agent,
    env: &Environment<'_>,
    range: f32,
    view_angle_deg: f32,
) -> Option<TargetInfo> {
    let target = env.live_target()?;
    agent
        .perception
        .can_see(&agent.body.pose(), target.position, range, view_angle_deg, env.raycaster)
        .then_some(target)
}

/// Regular detection: find radius and normal view cone
pub(crate) fn detects_target(agent: &Agent, env: &Environment<'_>) -> bool {
    let detection = &agent.config.detection;
    visible_target(agent, env, detection.find_radius, detection.view_angle_deg).is_some()
}
