//! Per-enemy data the states act on

use crate::hit_reaction::HitReaction;
use crate::patrol::PatrolController;
use crate::perception::Perception;
use crate::strategy::{strategy_for, BehaviorStrategy};
use nemesis_combat::CombatModule;
use nemesis_core::{EffectSink, EnemyConfig, EnemyEvent, EntityId, Pose, StateId};
use nemesis_nav::AgentBody;

/// One hostile entity: body, combat, reactions and decision policy
pub struct Agent {
    id: EntityId,
    pub config: EnemyConfig,
    pub body: AgentBody,
    pub combat: CombatModule,
    pub hit_reaction: HitReaction,
    pub patrol: PatrolController,
    pub perception: Perception,
    start_pose: Pose,
    strategy: Box<dyn BehaviorStrategy>,
    state: StateId,
    is_dead: bool,
    deactivated: bool,
    /// Transition requested outside of `check_transitions`
    pending: Option<StateId>,
    /// Events raised since the last flush
    outbox: Vec<EnemyEvent>,
}

impl Agent {
    /// Build an agent standing at `start_pose`. The config is trusted to be validated.
    pub fn new(id: EntityId, config: EnemyConfig, start_pose: Pose) -> Self {
        let body = Self::fresh_body(&config, start_pose);
        let combat = CombatModule::from_config(&config);
        let hit_reaction = HitReaction::new(config.hit_reaction.clone());
        let patrol = PatrolController::from_settings(&config.patrol)
            .with_arrival_tolerance(config.stopping_distance);
        let perception = Perception::new(config.detection.eye_height);
        let strategy = strategy_for(config.behavior);
        Self {
            id,
            config,
            body,
            combat,
            hit_reaction,
            patrol,
            perception,
            start_pose,
            strategy,
            state: StateId::Idle,
            is_dead: false,
            deactivated: false,
            pending: None,
            outbox: Vec::new(),
        }
    }

    fn fresh_body(config: &EnemyConfig, pose: Pose) -> AgentBody {
        AgentBody::new(pose).with_speed(config.speeds.patrol)
    }

    pub fn id(&self) -> EntityId {
        self.id
    }

    pub fn start_pose(&self) -> Pose {
        self.start_pose
    }

    pub fn state(&self) -> StateId {
        self.state
    }

    pub(crate) fn set_state(&mut self, state: StateId) {
        self.state = state;
    }

    pub fn strategy(&self) -> &dyn BehaviorStrategy {
        self.strategy.as_ref()
    }

    pub fn set_strategy(&mut self, strategy: Box<dyn BehaviorStrategy>) {
        self.strategy = strategy;
    }

    pub fn is_dead(&self) -> bool {
        self.is_dead
    }

    pub(crate) fn mark_dead(&mut self) {
        self.is_dead = true;
    }

    pub fn is_staggered(&self) -> bool {
        self.hit_reaction.is_staggered()
    }

    pub fn is_deactivated(&self) -> bool {
        self.deactivated
    }

    pub(crate) fn mark_deactivated(&mut self) {
        self.deactivated = true;
    }

    /// Ask for a transition on the next machine step. A pending Die is never overridden.
    pub fn request_transition(&mut self, state: StateId) {
        if self.pending == Some(StateId::Die) {
            return;
        }
        self.pending = Some(state);
    }

    pub(crate) fn take_pending(&mut self) -> Option<StateId> {
        self.pending.take()
    }

    pub fn pending(&self) -> Option<StateId> {
        self.pending
    }

    /// Queue a notification for the next flush
    pub fn notify(&mut self, event: EnemyEvent) {
        self.outbox.push(event);
    }

    /// Hand queued notifications to `sink`
    pub fn flush(&mut self, sink: &mut dyn EffectSink) {
        for event in self.outbox.drain(..) {
            sink.emit(event);
        }
    }

    /// Bring a pooled agent back to life at `pose` under a new id
    pub fn reset(&mut self, id: EntityId, pose: Pose) {
        self.id = id;
        self.start_pose = pose;
        self.body = Self::fresh_body(&self.config, pose);
        self.combat.reset();
        self.hit_reaction.cancel(&mut self.body);
        self.patrol.reset();
        self.state = StateId::Idle;
        self.is_dead = false;
        self.deactivated = false;
        self.pending = None;
        self.outbox.clear();
    }
}

impl std::fmt::Debug for Agent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Agent")
            .field("id", &self.id)
            .field("state", &self.state)
            .field("health", &self.combat.health())
            .field("position", &self.body.position())
            .field("strategy", &self.strategy.name())
            .field("is_dead", &self.is_dead)
            .finish()
    }
}
