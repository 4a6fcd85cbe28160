//! Enemy finite state machine
//!
//! Each tick runs the active state's `update` and then its `check_transitions`.
//! A transition runs `exit` on the old state and `enter` on the new one before
//! the next `update`, so every occupancy is bracketed by exactly one pair.

use crate::agent::Agent;
use crate::context::Environment;
use crate::error::{AiError, Result};
use nemesis_core::{EnemyEvent, StateId};

/// One state's behavior. Every method must be total: faults become transitions.
pub trait StateBehavior: Send {
    /// Which state this behavior implements
    fn id(&self) -> StateId;

    /// Called when entering this state
    fn enter(&mut self, agent: &mut Agent, env: &mut Environment<'_>);

    /// Called when leaving this state
    fn exit(&mut self, _agent: &mut Agent, _env: &mut Environment<'_>) {}

    /// Called every tick while in this state
    fn update(&mut self, agent: &mut Agent, env: &mut Environment<'_>, delta_time: f32);

    /// Called after `update`; returns the state to move to, if any
    fn check_transitions(&mut self, agent: &mut Agent, env: &mut Environment<'_>) -> Option<StateId>;

    /// Called when a stagger ends while the body was navigating
    fn resume(&mut self, _agent: &mut Agent, _env: &mut Environment<'_>) {}
}

/// State machine over a table of [`StateBehavior`]s
pub struct EnemyStateMachine {
    states: Vec<Box<dyn StateBehavior>>,
    current: usize,
    entered: bool,
}

impl EnemyStateMachine {
    /// Create a machine that starts in `initial`. The initial state is entered on the first tick.
    pub fn new(initial: StateId, states: Vec<Box<dyn StateBehavior>>) -> Result<Self> {
        for (i, state) in states.iter().enumerate() {
            if states[..i].iter().any(|other| other.id() == state.id()) {
                return Err(AiError::DuplicateState(state.id()));
            }
        }
        let current = states
            .iter()
            .position(|s| s.id() == initial)
            .ok_or(AiError::UnregisteredState(initial))?;
        Ok(Self {
            states,
            current,
            entered: false,
        })
    }

    /// Get current state
    pub fn current(&self) -> StateId {
        self.states[self.current].id()
    }

    /// Check if in a specific state
    pub fn is_in(&self, state: StateId) -> bool {
        self.current() == state
    }

    pub fn is_registered(&self, state: StateId) -> bool {
        self.index_of(state).is_some()
    }

    fn index_of(&self, state: StateId) -> Option<usize> {
        self.states.iter().position(|s| s.id() == state)
    }

    fn ensure_entered(&mut self, agent: &mut Agent, env: &mut Environment<'_>) {
        if !self.entered {
            self.entered = true;
            agent.set_state(self.current());
            self.states[self.current].enter(agent, env);
        }
    }

    /// Run one tick
    pub fn tick(&mut self, agent: &mut Agent, env: &mut Environment<'_>, delta_time: f32) {
        self.ensure_entered(agent, env);
        self.apply_pending(agent, env);

        self.states[self.current].update(agent, env, delta_time);

        let requested = if agent.is_dead() {
            agent.take_pending();
            Some(StateId::Die)
        } else {
            match agent.take_pending() {
                Some(pending) => Some(pending),
                None => self.states[self.current].check_transitions(agent, env),
            }
        };
        if let Some(next) = requested {
            self.request_transition(next, agent, env);
        }
    }

    /// Apply a request made outside the tick, such as death from damage
    fn apply_pending(&mut self, agent: &mut Agent, env: &mut Environment<'_>) {
        if agent.is_dead() && !self.is_in(StateId::Die) {
            agent.take_pending();
            self.request_transition(StateId::Die, agent, env);
        } else if let Some(pending) = agent.take_pending() {
            self.request_transition(pending, agent, env);
        }
    }

    /// Switch to `next`. Returns true if a transition happened.
    ///
    /// Unregistered states are rejected and logged; the current state stays.
    /// Nothing leaves Die.
    pub fn request_transition(&mut self, next: StateId, agent: &mut Agent, env: &mut Environment<'_>) -> bool {
        let from = self.current();
        if self.entered && from.is_terminal() {
            return false;
        }
        let Some(index) = self.index_of(next) else {
            log::warn!("Agent {} requested unregistered state {next}, staying in {from}", agent.id());
            return false;
        };
        if index == self.current && self.entered {
            return false;
        }

        if self.entered {
            self.states[self.current].exit(agent, env);
        }
        self.current = index;
        self.entered = true;
        agent.set_state(next);
        agent.notify(EnemyEvent::StateChanged {
            agent: agent.id(),
            from,
            to: next,
        });
        log::debug!("Agent {}: {from} -> {next}", agent.id());
        self.states[self.current].enter(agent, env);
        true
    }

    /// Forward a stagger release to the active state
    pub fn resume(&mut self, agent: &mut Agent, env: &mut Environment<'_>) {
        if self.entered {
            self.states[self.current].resume(agent, env);
        }
    }

    /// Go back to `initial` without running any exit, for pooled reuse
    pub fn reset(&mut self, initial: StateId) -> Result<()> {
        self.current = self.index_of(initial).ok_or(AiError::UnregisteredState(initial))?;
        self.entered = false;
        Ok(())
    }
}

impl std::fmt::Debug for EnemyStateMachine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EnemyStateMachine")
            .field("current", &self.current())
            .field("states", &self.states.iter().map(|s| s.id()).collect::<Vec<_>>())
            .field("entered", &self.entered)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::Fixture;
    use nemesis_core::{EnemyConfig, EntityId, Pose};
    use std::sync::Arc;
    use parking_lot::Mutex;

    type Journal = Arc<Mutex<Vec<String>>>;

    struct Scripted {
        id: StateId,
        next: Option<StateId>,
        journal: Journal,
    }

    impl Scripted {
        fn boxed(id: StateId, next: Option<StateId>, journal: &Journal) -> Box<dyn StateBehavior> {
            Box::new(Self {
                id,
                next,
                journal: journal.clone(),
            })
        }

        fn log(&self, what: &str) {
            self.journal.lock().push(format!("{what} {:?}", self.id));
        }
    }

    impl StateBehavior for Scripted {
        fn id(&self) -> StateId {
            self.id
        }

        fn enter(&mut self, _agent: &mut Agent, _env: &mut Environment<'_>) {
            self.log("enter");
        }

        fn exit(&mut self, _agent: &mut Agent, _env: &mut Environment<'_>) {
            self.log("exit");
        }

        fn update(&mut self, _agent: &mut Agent, _env: &mut Environment<'_>, _dt: f32) {
            self.log("update");
        }

        fn check_transitions(&mut self, _agent: &mut Agent, _env: &mut Environment<'_>) -> Option<StateId> {
            self.next.take()
        }
    }

    fn agent() -> Agent {
        Agent::new(EntityId::new(1, 0), EnemyConfig::default(), Pose::default())
    }

    #[test]
    fn test_rejects_bad_tables() {
        let journal = Journal::default();
        let missing = EnemyStateMachine::new(StateId::Idle, vec![Scripted::boxed(StateId::Trace, None, &journal)]);
        assert!(matches!(missing, Err(AiError::UnregisteredState(StateId::Idle))));

        let duplicate = EnemyStateMachine::new(
            StateId::Idle,
            vec![
                Scripted::boxed(StateId::Idle, None, &journal),
                Scripted::boxed(StateId::Idle, None, &journal),
            ],
        );
        assert!(matches!(duplicate, Err(AiError::DuplicateState(StateId::Idle))));
    }

    #[test]
    fn test_enter_exit_bracket_each_occupancy() {
        let journal = Journal::default();
        let mut machine = EnemyStateMachine::new(
            StateId::Idle,
            vec![
                Scripted::boxed(StateId::Idle, Some(StateId::Trace), &journal),
                Scripted::boxed(StateId::Trace, None, &journal),
            ],
        )
        .unwrap();
        let mut fixture = Fixture::open();
        let mut agent = agent();

        machine.tick(&mut agent, &mut fixture.env(), 0.1);
        machine.tick(&mut agent, &mut fixture.env(), 0.1);

        assert_eq!(
            *journal.lock(),
            vec!["enter Idle", "update Idle", "exit Idle", "enter Trace", "update Trace"]
        );
        assert_eq!(agent.state(), StateId::Trace);
    }

    #[test]
    fn test_unregistered_request_keeps_state() {
        let journal = Journal::default();
        let mut machine =
            EnemyStateMachine::new(StateId::Idle, vec![Scripted::boxed(StateId::Idle, None, &journal)]).unwrap();
        let mut fixture = Fixture::open();
        let mut agent = agent();
        machine.tick(&mut agent, &mut fixture.env(), 0.1);

        assert!(!machine.request_transition(StateId::Attack, &mut agent, &mut fixture.env()));
        assert!(machine.is_in(StateId::Idle));
        // Same-state request is a no-op
        assert!(!machine.request_transition(StateId::Idle, &mut agent, &mut fixture.env()));
        assert_eq!(journal.lock().iter().filter(|l| l.starts_with("enter")).count(), 1);
    }

    #[test]
    fn test_die_is_terminal() {
        let journal = Journal::default();
        let mut machine = EnemyStateMachine::new(
            StateId::Idle,
            vec![
                Scripted::boxed(StateId::Idle, None, &journal),
                Scripted::boxed(StateId::Die, Some(StateId::Idle), &journal),
            ],
        )
        .unwrap();
        let mut fixture = Fixture::open();
        let mut agent = agent();
        machine.tick(&mut agent, &mut fixture.env(), 0.1);
        agent.mark_dead();
        machine.tick(&mut agent, &mut fixture.env(), 0.1);
        assert!(machine.is_in(StateId::Die));

        for _ in 0..5 {
            machine.tick(&mut agent, &mut fixture.env(), 0.1);
            assert!(machine.is_in(StateId::Die));
        }
        assert!(!machine.request_transition(StateId::Idle, &mut agent, &mut fixture.env()));
    }

    #[test]
    fn test_pending_request_applies_before_update() {
        let journal = Journal::default();
        let mut machine = EnemyStateMachine::new(
            StateId::Idle,
            vec![
                Scripted::boxed(StateId::Idle, None, &journal),
                Scripted::boxed(StateId::Return, None, &journal),
            ],
        )
        .unwrap();
        let mut fixture = Fixture::open();
        let mut agent = agent();
        machine.tick(&mut agent, &mut fixture.env(), 0.1);
        agent.request_transition(StateId::Return);
        machine.tick(&mut agent, &mut fixture.env(), 0.1);
        assert_eq!(journal.lock().last().map(String::as_str), Some("update Return"));
    }
}
