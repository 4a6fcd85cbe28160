use super::detects_target;
use crate::agent::Agent;
use crate::context::Environment;
use crate::state_machine::StateBehavior;
use glam::Vec3;
use nemesis_core::StateId;
use nemesis_nav::ArcSample;

/// Width of the arc in front of the agent that look-around points are drawn from
const LOOK_ARC_DEG: f32 = 180.0;
const LOOK_MIN_DISTANCE: f32 = 2.0;
const LOOK_MAX_DISTANCE: f32 = 6.0;

/// Wait in place, glancing around, until the idle timer runs out
#[derive(Debug, Default)]
pub struct IdleState {
    elapsed: f32,
    look_timer: f32,
    look_at: Option<Vec3>,
}

impl IdleState {
    fn pick_look_point(&mut self, agent: &Agent, env: &mut Environment<'_>) {
        let arc = ArcSample {
            center: agent.body.position(),
            facing: agent.body.forward(),
            angle_range_deg: LOOK_ARC_DEG,
            min_distance: LOOK_MIN_DISTANCE,
            max_distance: LOOK_MAX_DISTANCE,
            eye_height: agent.perception.eye_height,
        };
        self.look_at = env.navigation.random_visible_point_around(
            &mut *env.rng,
            &arc,
            env.raycaster,
            agent.perception.obstruction_mask,
        );
    }
}

impl StateBehavior for IdleState {
    fn id(&self) -> StateId {
        StateId::Idle
    }

    fn enter(&mut self, agent: &mut Agent, _env: &mut Environment<'_>) {
        self.elapsed = 0.0;
        self.look_timer = 0.0;
        self.look_at = None;
        agent.body.clear_path();
    }

    fn update(&mut self, agent: &mut Agent, env: &mut Environment<'_>, delta_time: f32) {
        self.elapsed += delta_time;
        self.look_timer += delta_time;
        if agent.is_staggered() {
            return;
        }

        if self.look_timer >= agent.config.timers.look_around_interval {
            self.look_timer = 0.0;
            self.pick_look_point(agent, env);
        }
        if let Some(point) = self.look_at {
            // Glances turn at half the normal rate
            let rate = agent.config.speeds.rotation_deg * 0.5;
            if agent.body.face_point(point, rate, delta_time) {
                self.look_at = None;
            }
        }
    }

    fn check_transitions(&mut self, agent: &mut Agent, env: &mut Environment<'_>) -> Option<StateId> {
        if detects_target(agent, env) {
            return Some(StateId::Trace);
        }
        if self.elapsed >= agent.config.timers.idle_duration {
            match agent.strategy().on_idle_elapsed(agent) {
                Some(next) if next != StateId::Idle => return Some(next),
                _ => {
                    self.elapsed = 0.0;
                }
            }
        }
        None
    }
}
