use super::detects_target;
use crate::agent::Agent;
use crate::context::Environment;
use crate::patrol::PatrolStatus;
use crate::state_machine::StateBehavior;
use nemesis_core::StateId;

/// Walk the patrol route through the [`PatrolController`](crate::patrol::PatrolController)
#[derive(Debug, Default)]
pub struct PatrolState {
    failed: bool,
}

impl StateBehavior for PatrolState {
    fn id(&self) -> StateId {
        StateId::Patrol
    }

    fn enter(&mut self, agent: &mut Agent, env: &mut Environment<'_>) {
        self.failed = false;
        let speed = agent.config.speeds.patrol;
        if let Err(err) = agent.patrol.start(&mut agent.body, env.navigation, speed, None) {
            log::warn!("Agent {} cannot patrol: {err}", agent.id());
            self.failed = true;
        }
    }

    fn exit(&mut self, agent: &mut Agent, _env: &mut Environment<'_>) {
        agent.patrol.stop(&mut agent.body);
    }

    fn update(&mut self, agent: &mut Agent, env: &mut Environment<'_>, delta_time: f32) {
        // A held body makes no progress, so the stuck timer must not run
        if self.failed || agent.is_staggered() {
            return;
        }
        if agent.patrol.update(&mut agent.body, env.navigation, delta_time) == PatrolStatus::Degenerate {
            self.failed = true;
            return;
        }
        agent.body.step(delta_time, &mut *env.locomotion);
        agent.body.face_velocity(agent.config.speeds.rotation_deg, delta_time);
    }

    fn check_transitions(&mut self, agent: &mut Agent, env: &mut Environment<'_>) -> Option<StateId> {
        if detects_target(agent, env) {
            return Some(StateId::Trace);
        }
        if self.failed || !env.navigation.is_agent_valid(&agent.body) {
            return Some(StateId::Idle);
        }
        None
    }

    fn resume(&mut self, agent: &mut Agent, env: &mut Environment<'_>) {
        agent.patrol.refresh(&mut agent.body, env.navigation);
    }
}
