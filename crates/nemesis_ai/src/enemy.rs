//! The enemy facade: one agent driven by one state machine

use crate::agent::Agent;
use crate::context::Environment;
use crate::error::Result;
use crate::state_machine::{EnemyStateMachine, StateBehavior};
use crate::states::default_states;
use crate::strategy::BehaviorStrategy;
use nemesis_combat::{DamageOutcome, DamageReceiver, DamageSource, StrikeDue};
use nemesis_core::{EnemyConfig, EnemyEvent, EntityId, Pose, StateId};

/// A hostile entity ready to be ticked
#[derive(Debug)]
pub struct Enemy {
    agent: Agent,
    machine: EnemyStateMachine,
}

impl Enemy {
    /// Validate `config` and build an enemy idling at `pose`
    pub fn new(id: EntityId, config: EnemyConfig, pose: Pose) -> Result<Self> {
        config.validate()?;
        let machine = EnemyStateMachine::new(StateId::Idle, default_states())?;
        Ok(Self {
            agent: Agent::new(id, config, pose),
            machine,
        })
    }

    /// Replace the decision policy
    pub fn with_strategy(mut self, strategy: Box<dyn BehaviorStrategy>) -> Self {
        self.agent.set_strategy(strategy);
        self
    }

    /// Replace the state table. It must contain Idle.
    pub fn with_states(mut self, states: Vec<Box<dyn StateBehavior>>) -> Result<Self> {
        self.machine = EnemyStateMachine::new(StateId::Idle, states)?;
        Ok(self)
    }

    pub fn id(&self) -> EntityId {
        self.agent.id()
    }

    pub fn state(&self) -> StateId {
        self.machine.current()
    }

    pub fn agent(&self) -> &Agent {
        &self.agent
    }

    pub fn agent_mut(&mut self) -> &mut Agent {
        &mut self.agent
    }

    pub fn is_dead(&self) -> bool {
        self.agent.is_dead()
    }

    /// Dead and done with the death timer
    pub fn is_deactivated(&self) -> bool {
        self.agent.is_deactivated()
    }

    /// Advance the enemy by `delta_time` seconds
    pub fn tick(&mut self, env: &mut Environment<'_>, delta_time: f32) {
        self.agent.flush(env.events);
        if self.agent.is_deactivated() {
            return;
        }

        let agent = &mut self.agent;
        if let Some(release) =
            agent
                .hit_reaction
                .update(delta_time, &mut agent.body, &mut *env.locomotion)
        {
            log::debug!("Agent {} recovered from stagger", agent.id());
            if release.was_navigating {
                self.machine.resume(agent, env);
            }
        }

        if let Some(due) = self.agent.combat.update(delta_time) {
            self.resolve_strike(due, env);
        }

        self.machine.tick(&mut self.agent, env, delta_time);
        self.agent.flush(env.events);
    }

    /// The windup is over: hit the target if it is still there to be hit
    fn resolve_strike(&mut self, due: StrikeDue, env: &mut Environment<'_>) {
        let agent = &mut self.agent;
        let position = agent.body.position();
        let target = env.target();
        let valid = !agent.is_dead()
            && target.is_some_and(|t| {
                t.id == due.target
                    && t.alive
                    && position.distance(t.position) <= agent.config.detection.attack_radius
                    && !agent.perception.is_obstructed(position, t.position, env.raycaster)
            });

        let source = DamageSource::new(agent.id(), position);
        let outcome = agent
            .combat
            .resolve_strike(due, valid, env.target.as_deref_mut(), source);
        log::debug!("Agent {} strike on {}: {:?}", agent.id(), due.target, outcome);
        agent.notify(EnemyEvent::AttackResolved {
            agent: agent.id(),
            target: due.target,
            damage: due.damage,
            landed: outcome.landed(),
        });

        // Snapshot after the hit so the policy sees a kill
        let after = env.target();
        if let Some(next) = agent.strategy().on_attack_finished(agent, outcome, after) {
            agent.request_transition(next);
        }
    }

    /// Swap the tunables of a pooled enemy. The strategy goes back to the configured kind.
    pub fn reconfigure(&mut self, config: EnemyConfig) -> Result<()> {
        config.validate()?;
        self.agent = Agent::new(self.agent.id(), config, self.agent.start_pose());
        self.machine.reset(StateId::Idle)
    }

    /// Bring a deactivated enemy back at `pose` under a new id
    pub fn respawn(&mut self, id: EntityId, pose: Pose) -> Result<()> {
        self.agent.reset(id, pose);
        self.machine.reset(StateId::Idle)
    }
}

impl DamageReceiver for Enemy {
    fn take_damage(&mut self, amount: i32, source: DamageSource) {
        let agent = &mut self.agent;
        if agent.is_dead() || agent.is_deactivated() {
            return;
        }
        let staggered = agent.is_staggered();
        match agent.combat.take_damage(amount, staggered) {
            DamageOutcome::Ignored => {
                log::trace!("Agent {} ignored {amount} damage", agent.id());
            }
            DamageOutcome::Damaged { current, max } => {
                agent.notify(EnemyEvent::HealthChanged {
                    agent: agent.id(),
                    current,
                    max,
                });
                agent.combat.cancel_attack();
                agent.hit_reaction.begin(source.position, &mut agent.body);
                agent.notify(EnemyEvent::Staggered {
                    agent: agent.id(),
                    source: source.entity,
                });
            }
            DamageOutcome::Killed { max } => {
                agent.notify(EnemyEvent::HealthChanged {
                    agent: agent.id(),
                    current: 0,
                    max,
                });
                agent.mark_dead();
                agent.request_transition(StateId::Die);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::Fixture;
    use glam::Vec3;

    fn enemy(config: EnemyConfig) -> Enemy {
        match Enemy::new(EntityId::new(1, 0), config, Pose::looking(Vec3::ZERO, Vec3::Z)) {
            Ok(enemy) => enemy,
            Err(e) => panic!("enemy should build: {e}"),
        }
    }

    fn hit(enemy: &mut Enemy, amount: i32) {
        enemy.take_damage(amount, DamageSource::new(EntityId::new(99, 0), Vec3::new(0.0, 0.0, 3.0)));
    }

    #[test]
    fn test_invalid_config_is_rejected() {
        let mut config = EnemyConfig::default();
        config.health = 0;
        assert!(Enemy::new(EntityId::new(1, 0), config, Pose::default()).is_err());
    }

    #[test]
    fn test_first_tick_enters_idle() {
        let mut fixture = Fixture::open();
        let mut enemy = enemy(EnemyConfig::default());
        enemy.tick(&mut fixture.env(), 0.1);
        assert_eq!(enemy.state(), StateId::Idle);
    }

    #[test]
    fn test_damage_staggers_and_reports_health() {
        let mut fixture = Fixture::open();
        let mut enemy = enemy(EnemyConfig::default());
        hit(&mut enemy, 30);
        assert!(enemy.agent().is_staggered());
        assert_eq!(enemy.agent().combat.health().current(), 70);

        // Second hit while staggered is ignored
        hit(&mut enemy, 30);
        assert_eq!(enemy.agent().combat.health().current(), 70);

        enemy.tick(&mut fixture.env(), 0.1);
        assert_eq!(
            fixture.log.count(|e| matches!(e, EnemyEvent::HealthChanged { .. })),
            1
        );
        assert_eq!(fixture.log.count(|e| matches!(e, EnemyEvent::Staggered { .. })), 1);
    }

    #[test]
    fn test_lethal_damage_dies_next_tick() {
        let mut fixture = Fixture::open();
        let mut config = EnemyConfig::default();
        config.health = 10;
        let mut enemy = enemy(config);
        enemy.tick(&mut fixture.env(), 0.1);
        hit(&mut enemy, 15);
        assert!(enemy.is_dead());
        enemy.tick(&mut fixture.env(), 0.1);
        assert_eq!(enemy.state(), StateId::Die);
        assert!(enemy.agent().body.is_disabled());

        hit(&mut enemy, 5);
        assert_eq!(enemy.agent().combat.health().current(), 0);
    }

    #[test]
    fn test_strike_lands_on_target_in_range() {
        let mut fixture = Fixture::open().with_target(Vec3::new(0.0, 0.0, 1.5));
        let mut enemy = enemy(EnemyConfig::default());
        // Idle -> Trace -> Attack, then the windup
        for _ in 0..10 {
            enemy.tick(&mut fixture.env(), 0.1);
        }
        let received = fixture.target.as_ref().map_or(0, |t| t.received);
        assert_eq!(received, 10);
        assert!(fixture
            .log
            .events()
            .iter()
            .any(|e| matches!(e, EnemyEvent::AttackResolved { landed: true, .. })));
    }

    #[test]
    fn test_respawn() {
        let mut fixture = Fixture::open();
        let mut config = EnemyConfig::default();
        config.timers.death_duration = 0.1;
        let mut enemy = enemy(config);
        hit(&mut enemy, 500);
        for _ in 0..3 {
            enemy.tick(&mut fixture.env(), 0.1);
        }
        assert!(enemy.is_deactivated());

        let pose = Pose::looking(Vec3::new(4.0, 0.0, 4.0), Vec3::X);
        assert!(enemy.respawn(EntityId::new(1, 1), pose).is_ok());
        assert!(!enemy.is_dead());
        enemy.tick(&mut fixture.env(), 0.1);
        assert_eq!(enemy.state(), StateId::Idle);
        assert_eq!(enemy.agent().body.position(), Vec3::new(4.0, 0.0, 4.0));
    }

    #[test]
    fn test_reconfigure() {
        let mut enemy = enemy(EnemyConfig::default());
        let mut config = EnemyConfig::default();
        config.health = 40;
        assert!(enemy.reconfigure(config).is_ok());
        assert_eq!(enemy.agent().combat.health().max(), 40);

        let mut broken = EnemyConfig::default();
        broken.health = 0;
        assert!(enemy.reconfigure(broken).is_err());
        assert_eq!(enemy.agent().combat.health().max(), 40);
    }
}
