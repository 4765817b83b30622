//! Match rules: scoring, kickoff sequencing and the restart pause

use rand::Rng;
use tracing::{debug, info};

use crate::physics::PhysicsError;
use crate::util::time::ticks_in;

use super::field::{self, PAUSE_TIME, SCORE_LIMIT};
use super::registry::Registry;
use super::teams::placement;
use super::world::FieldWorld;
use super::Team;

/// Match phase
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchPhase {
    /// Players have control
    Playing,
    /// Control frozen after a kickoff; `ticks` physics ticks remain
    Paused { ticks: u32 },
}

/// Outcome of a scoring tick
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Goal {
    pub scorer: Team,
    /// Score right after the goal, before any limit reset
    pub score: [u32; 2],
    pub limit_reset: bool,
    /// Team taking the following kickoff
    pub kickoff: Team,
}

/// Score pair and restart countdown
#[derive(Debug, Clone)]
pub struct MatchState {
    score: [u32; 2],
    phase: MatchPhase,
    pause_ticks: u32,
}

impl Default for MatchState {
    fn default() -> Self {
        Self::new()
    }
}

impl MatchState {
    pub fn new() -> Self {
        Self::with_pause(ticks_in(PAUSE_TIME))
    }

    /// Match with a custom kickoff pause length
    pub fn with_pause(pause_ticks: u32) -> Self {
        Self {
            score: [0, 0],
            phase: MatchPhase::Playing,
            pause_ticks,
        }
    }

    pub fn score(&self) -> [u32; 2] {
        self.score
    }

    #[cfg(test)]
    pub fn phase(&self) -> MatchPhase {
        self.phase
    }

    pub fn is_paused(&self) -> bool {
        matches!(self.phase, MatchPhase::Paused { .. })
    }

    /// Rules step, run right after the physics step
    pub fn tick<R: Rng + ?Sized>(
        &mut self,
        world: &mut FieldWorld,
        registry: &mut Registry,
        rng: &mut R,
    ) -> Result<Option<Goal>, PhysicsError> {
        self.advance_pause(world, registry)?;

        let Some(scorer) = goal_scored_by(world) else {
            return Ok(None);
        };
        self.score[scorer.index()] += 1;
        let score = self.score;

        let limit_reset = score.iter().any(|&s| s >= SCORE_LIMIT);
        let kickoff = if limit_reset {
            self.score = [0, 0];
            if rng.gen_bool(0.5) {
                Team::Left
            } else {
                Team::Right
            }
        } else {
            scorer.opponent()
        };

        self.kickoff(world, registry, kickoff, rng)?;

        Ok(Some(Goal {
            scorer,
            score,
            limit_reset,
            kickoff,
        }))
    }

    /// Countdown transition. Control comes back on the tick that takes the
    /// countdown from 1 to 0, and only then.
    fn advance_pause(&mut self, world: &mut FieldWorld, registry: &mut Registry) -> Result<(), PhysicsError> {
        let MatchPhase::Paused { ticks } = self.phase else {
            return Ok(());
        };

        if ticks <= 1 {
            registry.set_control(world, true)?;
            self.phase = MatchPhase::Playing;
            debug!("Kickoff pause over, control enabled");
        } else {
            self.phase = MatchPhase::Paused { ticks: ticks - 1 };
        }
        Ok(())
    }

    /// Reset ball and players for a restart taken by `team`
    pub fn kickoff<R: Rng + ?Sized>(
        &mut self,
        world: &mut FieldWorld,
        registry: &mut Registry,
        team: Team,
        rng: &mut R,
    ) -> Result<(), PhysicsError> {
        world.reset_ball()?;

        for player in registry.iter_mut() {
            let spot = placement(player.team, rng);
            player.place(world.space_mut(), spot)?;
            player.set_control(world.space_mut(), false)?;
        }

        if registry.len() >= 2 {
            world.arm_gate(team.opponent())?;
        } else {
            world.release_gate()?;
        }

        if self.pause_ticks == 0 {
            registry.set_control(world, true)?;
            self.phase = MatchPhase::Playing;
        } else {
            self.phase = MatchPhase::Paused {
                ticks: self.pause_ticks,
            };
        }

        info!(kickoff = %team, score = ?self.score, "Kickoff");
        Ok(())
    }
}

/// Team credited when the ball is past an end line
fn goal_scored_by(world: &FieldWorld) -> Option<Team> {
    let x = world.ball_position().x;
    if x.abs() <= field::half_width() {
        None
    } else if x < 0.0 {
        Some(Team::Right)
    } else {
        Some(Team::Left)
    }
}
