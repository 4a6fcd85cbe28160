use super::detects_target;
use crate::agent::Agent;
use crate::context::Environment;
use crate::state_machine::StateBehavior;
use nemesis_core::{EnemyEvent, StateId};

/// Walk back to the spawn point, snapping there if the walk takes too long
#[derive(Debug, Default)]
pub struct ReturnState {
    elapsed: f32,
    refresh_timer: f32,
    path_failed: bool,
    timed_out: bool,
}

impl ReturnState {
    fn repath(&mut self, agent: &mut Agent, env: &mut Environment<'_>) {
        let home = agent.start_pose().position;
        if !env.navigation.try_set_destination(&mut agent.body, home) {
            log::warn!("Agent {} has no path back to {home}", agent.id());
            self.path_failed = true;
        }
    }
}

impl StateBehavior for ReturnState {
    fn id(&self) -> StateId {
        StateId::Return
    }

    fn enter(&mut self, agent: &mut Agent, env: &mut Environment<'_>) {
        self.elapsed = 0.0;
        self.refresh_timer = 0.0;
        self.path_failed = false;
        self.timed_out = false;
        agent.body.set_speed(agent.config.speeds.return_);
        agent.body.resume();
        self.repath(agent, env);
    }

    fn exit(&mut self, agent: &mut Agent, _env: &mut Environment<'_>) {
        if self.timed_out {
            let home = agent.start_pose();
            agent.body.warp(home);
            log::info!("Agent {} warped home to {}", agent.id(), home.position);
            agent.notify(EnemyEvent::ReturnTimedOut {
                agent: agent.id(),
                position: home.position,
            });
            self.timed_out = false;
        }
        agent.body.clear_path();
    }

    fn update(&mut self, agent: &mut Agent, env: &mut Environment<'_>, delta_time: f32) {
        self.elapsed += delta_time;
        self.refresh_timer += delta_time;
        if agent.is_staggered() {
            return;
        }

        if self.refresh_timer >= agent.config.timers.return_path_refresh {
            self.refresh_timer = 0.0;
            self.repath(agent, env);
        }
        agent.body.step(delta_time, &mut *env.locomotion);
        agent.body.face_velocity(agent.config.speeds.rotation_deg, delta_time);
    }

    fn check_transitions(&mut self, agent: &mut Agent, env: &mut Environment<'_>) -> Option<StateId> {
        if self.elapsed >= agent.config.timers.max_return_duration {
            log::warn!(
                "Agent {} could not get home within {:.1}s",
                agent.id(),
                agent.config.timers.max_return_duration
            );
            self.timed_out = true;
            return Some(StateId::Idle);
        }

        let home = agent.start_pose().position;
        if env
            .navigation
            .has_reached(&agent.body, home, agent.config.stopping_distance)
            && agent.body.is_grounded()
        {
            return Some(StateId::Idle);
        }

        if detects_target(agent, env) {
            return Some(StateId::Trace);
        }

        if self.path_failed || !env.navigation.is_agent_valid(&agent.body) {
            self.timed_out = true;
            return Some(StateId::Idle);
        }
        None
    }

    fn resume(&mut self, agent: &mut Agent, env: &mut Environment<'_>) {
        self.refresh_timer = 0.0;
        self.repath(agent, env);
    }
}
