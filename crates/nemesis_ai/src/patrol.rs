//! Waypoint cycling with pauses, or patrolling in place at a fallback point

use crate::error::PatrolError;
use glam::Vec3;
use nemesis_core::PatrolSettings;
use nemesis_nav::{AgentBody, NavigationProvider};

/// Radius used to snap patrol points onto the navigable surface
const SNAP_RADIUS: f32 = 2.0;

/// Minimum improvement of the remaining distance that counts as progress
const PROGRESS_EPSILON: f32 = 0.1;

#[derive(Debug, Clone, Copy, PartialEq)]
enum Phase {
    Inactive,
    Moving,
    Waiting(f32),
}

/// What the controller is doing after an update
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PatrolStatus {
    Inactive,
    Moving,
    Waiting,
    /// No stop of the route accepts a path anymore
    Degenerate,
}

/// Drives an agent body around a fixed route
#[derive(Debug, Clone)]
pub struct PatrolController {
    waypoints: Vec<Vec3>,
    fallback: Option<Vec3>,
    wait_time: f32,
    stuck_timeout: f32,
    arrival_tolerance: f32,
    /// Stops snapped onto the surface at start
    route: Vec<Vec3>,
    index: usize,
    phase: Phase,
    best_remaining: f32,
    stuck_timer: f32,
}

impl PatrolController {
    pub fn new(waypoints: Vec<Vec3>, fallback: Option<Vec3>, wait_time: f32, stuck_timeout: f32) -> Self {
        Self {
            waypoints,
            fallback,
            wait_time: wait_time.max(0.0),
            stuck_timeout: stuck_timeout.max(0.0),
            arrival_tolerance: 0.5,
            route: Vec::new(),
            index: 0,
            phase: Phase::Inactive,
            best_remaining: f32::INFINITY,
            stuck_timer: 0.0,
        }
    }

    pub fn from_settings(settings: &PatrolSettings) -> Self {
        Self::new(
            settings.waypoints.clone(),
            settings.fallback_point,
            settings.wait_time,
            settings.stuck_timeout,
        )
    }

    pub fn with_arrival_tolerance(mut self, tolerance: f32) -> Self {
        self.arrival_tolerance = tolerance.max(0.0);
        self
    }

    pub fn waypoints(&self) -> &[Vec3] {
        &self.waypoints
    }

    /// Whether a start could find something to patrol
    pub fn has_route(&self) -> bool {
        !self.waypoints.is_empty() || self.fallback.is_some()
    }

    pub fn is_active(&self) -> bool {
        self.phase != Phase::Inactive
    }

    pub fn is_waiting(&self) -> bool {
        matches!(self.phase, Phase::Waiting(_))
    }

    /// The stop currently walked to or waited at
    pub fn current_target(&self) -> Option<Vec3> {
        if self.phase == Phase::Inactive {
            return None;
        }
        self.route.get(self.index).copied()
    }

    /// Begin patrolling at `speed`.
    ///
    /// Without waypoints the agent patrols in place at `fallback_override`, or
    /// the configured fallback point. Stops that are not on the surface are skipped.
    pub fn start(
        &mut self,
        body: &mut AgentBody,
        nav: &dyn NavigationProvider,
        speed: f32,
        fallback_override: Option<Vec3>,
    ) -> Result<(), PatrolError> {
        self.phase = Phase::Inactive;

        let candidates: Vec<Vec3> = if !self.waypoints.is_empty() {
            self.waypoints.clone()
        } else if let Some(point) = fallback_override.or(self.fallback) {
            vec![point]
        } else {
            return Err(PatrolError::NoRoute);
        };

        let total = candidates.len();
        let route: Vec<Vec3> = candidates
            .into_iter()
            .filter_map(|point| {
                let snapped = nav.snap_to_surface(point, SNAP_RADIUS);
                if snapped.is_none() {
                    log::warn!("Patrol point {point} is off the navigable surface, skipping");
                }
                snapped
            })
            .collect();
        if route.is_empty() {
            return Err(PatrolError::NoValidWaypoint(total));
        }

        if route != self.route {
            self.index = 0;
            self.route = route;
        }
        body.set_speed(speed);
        body.resume();

        if self.head_to_next_valid(body, nav, self.index) {
            Ok(())
        } else {
            Err(PatrolError::NoValidWaypoint(total))
        }
    }

    /// Try `from` and each following stop until a path is accepted
    fn head_to_next_valid(&mut self, body: &mut AgentBody, nav: &dyn NavigationProvider, from: usize) -> bool {
        let len = self.route.len();
        for offset in 0..len {
            let index = (from + offset) % len;
            if nav.try_set_destination(body, self.route[index]) {
                self.index = index;
                self.phase = Phase::Moving;
                self.best_remaining = f32::INFINITY;
                self.stuck_timer = 0.0;
                return true;
            }
            log::debug!("No path to patrol stop {index}, trying the next one");
        }
        self.phase = Phase::Inactive;
        false
    }

    /// Advance arrival, pause and stuck bookkeeping
    pub fn update(&mut self, body: &mut AgentBody, nav: &dyn NavigationProvider, delta_time: f32) -> PatrolStatus {
        match self.phase {
            Phase::Inactive => PatrolStatus::Inactive,
            Phase::Moving => {
                let Some(stop) = self.route.get(self.index).copied() else {
                    self.phase = Phase::Inactive;
                    return PatrolStatus::Degenerate;
                };
                if nav.has_reached(body, stop, self.arrival_tolerance) || !body.has_path() {
                    self.arrive(body);
                    return PatrolStatus::Waiting;
                }

                let remaining = body.remaining_distance();
                if remaining < self.best_remaining - PROGRESS_EPSILON {
                    self.best_remaining = remaining;
                    self.stuck_timer = 0.0;
                } else {
                    self.stuck_timer += delta_time;
                    if self.stuck_timer >= self.stuck_timeout {
                        log::warn!("Patrol made no progress for {:.1}s, skipping stop {}", self.stuck_timer, self.index);
                        self.arrive(body);
                        return PatrolStatus::Waiting;
                    }
                }
                PatrolStatus::Moving
            }
            Phase::Waiting(waited) => {
                let waited = waited + delta_time;
                if waited < self.wait_time {
                    self.phase = Phase::Waiting(waited);
                    return PatrolStatus::Waiting;
                }
                let next = (self.index + 1) % self.route.len().max(1);
                if self.head_to_next_valid(body, nav, next) {
                    PatrolStatus::Moving
                } else {
                    log::warn!("Patrol route has no reachable stop left");
                    PatrolStatus::Degenerate
                }
            }
        }
    }

    fn arrive(&mut self, body: &mut AgentBody) {
        body.clear_path();
        self.phase = Phase::Waiting(0.0);
    }

    /// Re-request the path to the current stop, after a stagger
    pub fn refresh(&mut self, body: &mut AgentBody, nav: &dyn NavigationProvider) {
        if self.phase == Phase::Moving {
            if let Some(stop) = self.route.get(self.index).copied() {
                nav.try_set_destination(body, stop);
            }
        }
    }

    /// Halt and drop the path. Safe to call repeatedly.
    pub fn stop(&mut self, body: &mut AgentBody) {
        if self.phase != Phase::Inactive {
            body.clear_path();
        }
        self.phase = Phase::Inactive;
        self.stuck_timer = 0.0;
    }

    /// Forget progress along the route
    pub fn reset(&mut self) {
        self.phase = Phase::Inactive;
        self.route.clear();
        self.index = 0;
        self.stuck_timer = 0.0;
        self.best_remaining = f32::INFINITY;
    }
}
