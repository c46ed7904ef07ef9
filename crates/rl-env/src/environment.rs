//! RL Environment trait and AzulEnv implementation

use azul_engine::{
    AzulGame, GameConfig, GameState, NoEffect, StepOutcome, WallVariant, MAX_PLAYERS,
};
use rand::rngs::StdRng;
use rand::Rng;

#[cfg(feature = "profiling")]
use crate::profiling::{Timer, PROF};
#[cfg(feature = "profiling")]
use std::sync::atomic::Ordering;

use super::{
    ActionEncoder, ActionId, EnvConfig, EnvStep, FeatureExtractor, Observation, Reward,
    RewardScheme, StepError, StepInfo, ACTION_SPACE_SIZE,
};

/// Generic environment interface for RL
pub trait Environment {
    /// Type used to represent observations
    type ObservationType;

    /// Type used to represent actions
    type ActionType;

    /// Type used to represent rewards
    type RewardType;

    /// Reset the environment to a fresh episode (new game).
    ///
    /// Returns the first EnvStep, representing the initial state prior
    /// to any actions.
    fn reset(&mut self) -> Result<EnvStep<Self::ObservationType, Self::RewardType>, StepError>;

    /// Apply an action for the current player, advance the environment
    /// by one step, and return the resulting EnvStep.
    fn step(
        &mut self,
        action: Self::ActionType,
    ) -> Result<EnvStep<Self::ObservationType, Self::RewardType>, StepError>;
}

/// Azul RL Environment
pub struct AzulEnv<F: FeatureExtractor, R: Rng = StdRng> {
    /// Underlying engine, owning the dealing RNG
    game: AzulGame<R>,

    /// Environment configuration
    pub config: EnvConfig,

    /// Feature extractor for building observations
    pub features: F,

    /// Last action applied (ActionId), if any
    pub last_action: Option<ActionId>,

    /// Whether this episode has ended
    pub done: bool,
}

impl<F: FeatureExtractor, R: Rng> AzulEnv<F, R> {
    /// Create a new AzulEnv with the given configuration, feature extractor
    /// and dealing RNG.
    ///
    /// The episode does not start until reset() is called.
    pub fn new(config: EnvConfig, features: F, rng: R) -> Result<Self, StepError> {
        if features.num_players() != config.num_players {
            return Err(StepError::ExtractorMismatch {
                game: config.num_players,
                extractor: features.num_players(),
            });
        }
        let game_config = GameConfig {
            num_players: config.num_players,
            variant: WallVariant::Fixed,
        };
        let mut game = AzulGame::new(game_config, rng)?;
        game.reset(config.starting_player)?;

        Ok(Self {
            game,
            config,
            features,
            last_action: None,
            done: true, // Not started until reset
        })
    }

    pub fn state(&self) -> &GameState {
        self.game.state()
    }

    /// Build the legal action mask for the current state
    pub fn build_legal_action_mask(&self) -> Vec<bool> {
        let mut mask = vec![false; ACTION_SPACE_SIZE];
        for action in self.game.legal_actions() {
            mask[ActionEncoder::encode(&action) as usize] = true;
        }
        mask
    }

    /// Legal action ids, ascending
    pub fn legal_action_ids(&self) -> Vec<ActionId> {
        self.game
            .legal_actions()
            .iter()
            .map(ActionEncoder::encode)
            .collect()
    }

    /// Build observations for all players
    fn build_observations(&self) -> [Observation; MAX_PLAYERS] {
        let state = self.game.state();
        std::array::from_fn(|idx| {
            if (idx as u8) < state.num_players {
                self.features.encode(state, idx as u8)
            } else {
                Observation::zeros(&self.features.obs_shape())
            }
        })
    }

    fn is_truncated(&self) -> bool {
        self.game.turn_number() > self.config.max_turns
    }

    /// Game over, turn limit reached, or nothing left to play
    fn is_done(&self) -> bool {
        self.game.is_game_over() || self.is_truncated() || self.game.legal_actions().is_empty()
    }

    fn build_step(
        &self,
        rewards: [Reward; MAX_PLAYERS],
        info: Option<StepInfo>,
    ) -> EnvStep<Observation, Reward> {
        let legal_action_mask = if self.done {
            vec![false; ACTION_SPACE_SIZE]
        } else {
            self.build_legal_action_mask()
        };

        let state = self
            .config
            .include_full_state_in_step
            .then(|| self.game.state().clone());

        EnvStep {
            observations: self.build_observations(),
            rewards,
            done: self.done,
            truncated: self.done && !self.game.is_game_over() && self.is_truncated(),
            current_player: self.game.current_player(),
            legal_action_mask,
            last_action: self.last_action,
            info,
            state,
        }
    }

    /// Zero-sum terminal rewards: each player's points minus the mean
    fn terminal_rewards(&self) -> [Reward; MAX_PLAYERS] {
        let scores = self.game.state().scores();
        let mean = scores.iter().map(|&s| s as f32).sum::<f32>() / scores.len() as f32;

        let mut rewards = [0.0; MAX_PLAYERS];
        for (reward, &score) in rewards.iter_mut().zip(&scores) {
            *reward = score as f32 - mean;
        }
        rewards
    }
}

impl<F: FeatureExtractor, R: Rng> Environment for AzulEnv<F, R> {
    type ObservationType = Observation;
    type ActionType = ActionId;
    type RewardType = Reward;

    fn reset(&mut self) -> Result<EnvStep<Self::ObservationType, Self::RewardType>, StepError> {
        #[cfg(feature = "profiling")]
        let _t = Timer::new(&PROF.time_env_reset_ns);

        self.game.reset(self.config.starting_player)?;
        #[cfg(feature = "profiling")]
        PROF.env_resets.fetch_add(1, Ordering::Relaxed);
        self.last_action = None;
        self.done = self.is_done();

        Ok(self.build_step([0.0; MAX_PLAYERS], None))
    }

    fn step(
        &mut self,
        action_id: Self::ActionType,
    ) -> Result<EnvStep<Self::ObservationType, Self::RewardType>, StepError> {
        #[cfg(feature = "profiling")]
        let _t = Timer::new(&PROF.time_env_step_ns);

        // 1. Check if episode is done
        if self.done {
            return Err(StepError::EpisodeDone);
        }

        // 2. Decode action
        let action =
            ActionEncoder::decode(action_id).ok_or(StepError::InvalidActionId(action_id))?;

        let turn = self.game.turn_number();
        let round = self.game.round_number();
        let player = self.game.current_player();

        // 3. Apply action via engine
        let (reward, move_info) = match self.game.apply_action(action) {
            StepOutcome::Applied { reward, info } => (reward, info),
            StepOutcome::NoEffect(NoEffect::EmptyDraw) => {
                return Err(StepError::IllegalAction(action_id));
            }
            StepOutcome::NoEffect(NoEffect::GameOver) => {
                self.done = true;
                return Err(StepError::EpisodeDone);
            }
        };

        #[cfg(feature = "profiling")]
        PROF.env_steps.fetch_add(1, Ordering::Relaxed);

        // 4. Update done flag and last action
        self.done = self.is_done();
        self.last_action = Some(action_id);

        // 5. Compute rewards based on RewardScheme
        let rewards = match self.config.reward_scheme {
            RewardScheme::DenseScoreDelta => {
                let mut rewards = [0.0; MAX_PLAYERS];
                rewards[player as usize] = reward;
                rewards
            }
            RewardScheme::TerminalOnly if self.done => self.terminal_rewards(),
            RewardScheme::TerminalOnly => [0.0; MAX_PLAYERS],
        };

        // The game was live before this move, so game over means the final
        // settlement just ran without advancing the round.
        let round_settled = self.game.round_number() != round || self.game.is_game_over();

        #[cfg(feature = "profiling")]
        {
            if self.game.is_game_over() {
                PROF.games_finished.fetch_add(1, Ordering::Relaxed);
            }
            if round_settled {
                PROF.rounds_settled.fetch_add(1, Ordering::Relaxed);
            }
        }

        let info = StepInfo {
            turn,
            round,
            player,
            reward: move_info,
            next_turn: self.game.turn_number(),
            next_round: self.game.round_number(),
            next_player: self.game.current_player(),
            round_settled,
        };

        Ok(self.build_step(rewards, Some(info)))
    }
}
