use super::visible_target;
use crate::agent::Agent;
use crate::context::Environment;
use crate::state_machine::StateBehavior;
use nemesis_core::StateId;

/// Chase the target, refreshing the path at a fixed interval
#[derive(Debug, Default)]
pub struct TraceState {
    elapsed: f32,
    repath_timer: f32,
    path_failed: bool,
}

impl TraceState {
    fn repath(&mut self, agent: &mut Agent, env: &mut Environment<'_>) {
        let Some(target) = env.live_target() else {
            return;
        };
        if !env.navigation.try_set_destination(&mut agent.body, target.position) {
            log::warn!("Agent {} has no path to its target", agent.id());
            self.path_failed = true;
        }
    }
}

impl StateBehavior for TraceState {
    fn id(&self) -> StateId {
        StateId::Trace
    }

    fn enter(&mut self, agent: &mut Agent, env: &mut Environment<'_>) {
        self.elapsed = 0.0;
        self.repath_timer = 0.0;
        self.path_failed = false;
        agent.body.set_speed(agent.config.speeds.trace);
        agent.body.resume();
        self.repath(agent, env);
    }

    fn exit(&mut self, agent: &mut Agent, _env: &mut Environment<'_>) {
        agent.body.clear_path();
    }

    fn update(&mut self, agent: &mut Agent, env: &mut Environment<'_>, delta_time: f32) {
        self.elapsed += delta_time;
        self.repath_timer += delta_time;
        if agent.is_staggered() {
            return;
        }

        if self.repath_timer >= agent.config.timers.path_update_interval {
            self.repath_timer = 0.0;
            self.repath(agent, env);
        }
        agent.body.step(delta_time, &mut *env.locomotion);
        agent.body.face_velocity(agent.config.speeds.rotation_deg, delta_time);
    }

    fn check_transitions(&mut self, agent: &mut Agent, env: &mut Environment<'_>) -> Option<StateId> {
        let Some(target) = env.live_target() else {
            log::debug!("Agent {} lost its target reference", agent.id());
            return Some(StateId::Return);
        };
        if self.elapsed >= agent.config.timers.max_trace_duration {
            log::warn!(
                "Agent {} chased for {:.1}s without reaching its target",
                agent.id(),
                self.elapsed
            );
            return Some(StateId::Return);
        }
        if self.path_failed || !env.navigation.is_agent_valid(&agent.body) {
            return Some(StateId::Return);
        }

        let detection = &agent.config.detection;
        let straight = agent.body.position().distance(target.position);
        if straight < detection.attack_radius
            && visible_target(agent, env, detection.attack_radius, detection.attack_view_angle_deg).is_some()
        {
            return Some(StateId::Attack);
        }

        let distance = env.navigation.distance_to(&agent.body, target.position, true);
        if distance > detection.return_radius {
            return agent.strategy().on_target_lost(agent);
        }
        None
    }

    fn resume(&mut self, agent: &mut Agent, env: &mut Environment<'_>) {
        self.repath_timer = 0.0;
        self.repath(agent, env);
    }
}
