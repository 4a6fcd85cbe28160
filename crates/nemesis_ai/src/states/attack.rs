use crate::agent::Agent;
use crate::context::Environment;
use crate::state_machine::StateBehavior;
use glam::Vec3;
use nemesis_core::{EnemyEvent, StateId};
use std::f32::consts::TAU;

/// How far from a ring sample the surface may be
const RING_SNAP_RADIUS: f32 = 0.5;

/// Smallest drop in remaining path distance that counts as progress
const PROGRESS_EPSILON: f32 = 0.1;

/// Face the target and strike whenever the cooldown allows
#[derive(Debug, Default)]
pub struct AttackState {
    /// Spot the agent is walking to for a better angle
    repositioning: Option<Vec3>,
    /// Closest the agent got to the reposition spot, by path distance
    best_remaining: f32,
    /// Seconds without progress toward the reposition spot
    stuck_timer: f32,
    /// Seconds before another reposition may be tried
    retry_timer: f32,
    sight_lost: bool,
}

impl AttackState {
    /// Best spot on a ring of `optimal_distance` around the target: reachable,
    /// with a clear line to the target, shortest path first.
    fn find_reposition(agent: &Agent, env: &Environment<'_>, target: Vec3) -> Option<Vec3> {
        let samples = agent.config.attack.reposition_samples.max(1);
        let radius = agent.config.attack.optimal_distance;
        let start = agent.body.position();

        // Start the ring on the agent's side of the target
        let to_agent = start - target;
        let base = to_agent.x.atan2(to_agent.z);

        let mut best: Option<(Vec3, f32)> = None;
        for i in 0..samples {
            let angle = base + TAU * i as f32 / samples as f32;
            let candidate = target + Vec3::new(angle.sin(), 0.0, angle.cos()) * radius;
            let Some(spot) = env.navigation.snap_to_surface(candidate, RING_SNAP_RADIUS) else {
                continue;
            };
            let query = env.navigation.can_reach(start, spot);
            if !query.reachable {
                continue;
            }
            if agent.perception.is_obstructed(spot, target, env.raycaster) {
                continue;
            }
            if best.map_or(true, |(_, length)| query.length < length) {
                best = Some((spot, query.length));
            }
        }
        best.map(|(spot, _)| spot)
    }

    fn start_repositioning(&mut self, spot: Vec3, agent: &Agent) {
        self.repositioning = Some(spot);
        self.best_remaining = agent.body.remaining_distance();
        self.stuck_timer = 0.0;
    }

    fn abandon_repositioning(&mut self, agent: &mut Agent) {
        agent.body.clear_path();
        self.repositioning = None;
        self.stuck_timer = 0.0;
    }
}

impl StateBehavior for AttackState {
    fn id(&self) -> StateId {
        StateId::Attack
    }

    fn enter(&mut self, agent: &mut Agent, _env: &mut Environment<'_>) {
        self.repositioning = None;
        self.stuck_timer = 0.0;
        self.retry_timer = 0.0;
        self.sight_lost = false;
        agent.body.clear_path();
        agent.body.set_speed(agent.config.speeds.trace);
    }

    fn exit(&mut self, agent: &mut Agent, _env: &mut Environment<'_>) {
        agent.combat.cancel_attack();
        agent.body.clear_path();
        self.repositioning = None;
    }

    fn update(&mut self, agent: &mut Agent, env: &mut Environment<'_>, delta_time: f32) {
        let Some(target) = env.live_target() else {
            return;
        };
        if agent.is_staggered() {
            return;
        }
        let rotation = agent.config.speeds.rotation_deg;
        self.retry_timer = (self.retry_timer - delta_time).max(0.0);

        if let Some(spot) = self.repositioning {
            agent.body.step(delta_time, &mut *env.locomotion);
            agent.body.face_velocity(rotation, delta_time);
            let arrived = env
                .navigation
                .has_reached(&agent.body, spot, agent.config.stopping_distance);
            if arrived || !agent.body.has_path() {
                self.abandon_repositioning(agent);
                return;
            }

            let remaining = agent.body.remaining_distance();
            if remaining < self.best_remaining - PROGRESS_EPSILON {
                self.best_remaining = remaining;
                self.stuck_timer = 0.0;
            } else {
                self.stuck_timer += delta_time;
                let budget = agent.config.patrol.stuck_timeout;
                if self.stuck_timer >= budget {
                    log::warn!(
                        "Agent {} made no progress repositioning for {:.1}s, holding ground",
                        agent.id(),
                        self.stuck_timer
                    );
                    self.abandon_repositioning(agent);
                    self.retry_timer = budget;
                    let position = agent.body.position();
                    if agent.perception.is_obstructed(position, target.position, env.raycaster) {
                        self.sight_lost = true;
                    }
                }
            }
            return;
        }

        agent.body.face_point(target.position, rotation, delta_time);

        let detection = &agent.config.detection;
        let position = agent.body.position();
        let distance = position.distance(target.position);
        let exit_range = detection.attack_radius * detection.attack_exit_margin;
        let obstructed = agent
            .perception
            .is_obstructed(position, target.position, env.raycaster);
        let in_cone = agent.perception.in_view_cone(
            &agent.body.pose(),
            target.position,
            detection.attack_view_angle_deg,
        );

        if distance <= detection.attack_radius
            && !obstructed
            && in_cone
            && agent.combat.try_attack(target.id)
        {
            log::debug!("Agent {} strikes at {}", agent.id(), target.id);
            agent.notify(EnemyEvent::AttackPerformed {
                agent: agent.id(),
                target: target.id,
            });
        }

        let too_close = distance < agent.config.attack.optimal_distance * 0.5;
        if (obstructed || too_close)
            && distance <= exit_range
            && self.retry_timer <= 0.0
            && !agent.combat.is_attacking()
        {
            let spot = Self::find_reposition(agent, env, target.position)
                .filter(|&spot| env.navigation.try_set_destination(&mut agent.body, spot));
            match spot {
                Some(spot) => {
                    log::debug!("Agent {} repositions to {spot}", agent.id());
                    self.start_repositioning(spot, agent);
                }
                None if obstructed => self.sight_lost = true,
                None => {}
            }
        }
    }

    fn check_transitions(&mut self, agent: &mut Agent, env: &mut Environment<'_>) -> Option<StateId> {
        let Some(target) = env.live_target() else {
            return Some(StateId::Return);
        };
        let detection = &agent.config.detection;
        let distance = agent.body.position().distance(target.position);
        if distance > detection.attack_radius * detection.attack_exit_margin {
            return Some(StateId::Trace);
        }
        if self.sight_lost {
            return Some(StateId::Trace);
        }
        None
    }

    fn resume(&mut self, agent: &mut Agent, env: &mut Environment<'_>) {
        if let Some(spot) = self.repositioning {
            if env.navigation.try_set_destination(&mut agent.body, spot) {
                self.start_repositioning(spot, agent);
            } else {
                self.repositioning = None;
            }
        }
    }
}
