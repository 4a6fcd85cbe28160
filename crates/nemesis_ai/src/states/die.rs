use crate::agent::Agent;
use crate::context::Environment;
use crate::state_machine::StateBehavior;
use nemesis_core::{EnemyEvent, StateId};

/// Terminal state: shut everything down, then deactivate after the death timer
#[derive(Debug, Default)]
pub struct DieState {
    elapsed: f32,
}

impl StateBehavior for DieState {
    fn id(&self) -> StateId {
        StateId::Die
    }

    fn enter(&mut self, agent: &mut Agent, _env: &mut Environment<'_>) {
        self.elapsed = 0.0;
        agent.mark_dead();
        agent.hit_reaction.cancel(&mut agent.body);
        agent.combat.cancel_attack();
        agent.patrol.stop(&mut agent.body);
        agent.body.disable();

        let position = agent.body.position();
        log::info!("Agent {} died at {position}", agent.id());
        agent.notify(EnemyEvent::DeathEffect {
            agent: agent.id(),
            position,
        });
    }

    fn update(&mut self, agent: &mut Agent, _env: &mut Environment<'_>, delta_time: f32) {
        if agent.is_deactivated() {
            return;
        }
        self.elapsed += delta_time;
        if self.elapsed >= agent.config.timers.death_duration {
            agent.mark_deactivated();
            log::info!("Agent {} deactivated", agent.id());
            agent.notify(EnemyEvent::Deactivated { agent: agent.id() });
        }
    }

    fn check_transitions(&mut self, _agent: &mut Agent, _env: &mut Environment<'_>) -> Option<StateId> {
        None
    }
}
