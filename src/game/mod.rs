//! Levels and the progression engine
//!
//! Level definitions are immutable data validated once at load; runtime
//! progress (level index, step index, attempts, XP) lives in the
//! [`LevelEngine`] and is the only mutable part.

pub mod catalog;
pub mod pattern;

pub use pattern::CommandPattern;

use crate::shell::{normalize_line, CommandResult, OutputOverrides};
use crate::sim::{SimEnv, StateChange};
use crate::DataError;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// What a step grants when satisfied.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StepReward {
    pub message: String,
    pub xp: u32,
    #[serde(default)]
    pub state_changes: Vec<StateChange>,
}

/// One objective within a level.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Step {
    /// What the player is asked to do.
    pub task: String,
    /// Accepted command forms; any match satisfies the step.
    pub expected: Vec<CommandPattern>,
    pub on_success: StepReward,
    /// Shown after repeated failed attempts on this step.
    pub hint_on_fail: String,
    /// Forced output per normalized command line, for narrative realism.
    #[serde(default)]
    pub output_overrides: OutputOverrides,
}

/// One troubleshooting scenario. Steps are strictly ordered; a step is
/// only evaluated once every earlier step is satisfied.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Level {
    pub id: String,
    pub title: String,
    pub description: String,
    pub steps: Vec<Step>,
}

/// A validated, immutable sequence of levels.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LevelSet {
    levels: Vec<Level>,
}

impl LevelSet {
    /// Validate authored levels. This is the only place a fatal error
    /// can originate; everything after load is total.
    pub fn new(levels: Vec<Level>) -> Result<Self, DataError> {
        if levels.is_empty() {
            return Err(DataError::NoLevels);
        }
        let mut seen = HashSet::new();
        for level in &levels {
            if !seen.insert(level.id.clone()) {
                return Err(DataError::DuplicateLevelId(level.id.clone()));
            }
            if level.steps.is_empty() {
                return Err(DataError::EmptyLevel(level.id.clone()));
            }
            for (i, step) in level.steps.iter().enumerate() {
                if step.expected.is_empty() {
                    return Err(DataError::EmptyStep {
                        level: level.id.clone(),
                        step: i,
                    });
                }
            }
        }
        Ok(Self { levels })
    }

    /// The built-in campaign.
    pub fn builtin() -> Self {
        Self::new(catalog::levels()).expect("built-in levels are valid")
    }

    /// Load author-supplied levels from JSON, with the same validation.
    pub fn from_json(text: &str) -> Result<Self, DataError> {
        let levels: Vec<Level> = serde_json::from_str(text)?;
        Self::new(levels)
    }

    pub fn len(&self) -> usize {
        self.levels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.levels.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Level> {
        self.levels.get(index)
    }
}

/// Engine tuning knobs.
#[derive(Debug, Clone, Copy)]
pub struct EngineConfig {
    /// Failed attempts on a step before its hint starts appearing.
    pub hint_threshold: u32,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self { hint_threshold: 2 }
    }
}

/// Mutable session progress, separate from the immutable level data.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Progress {
    pub level_index: usize,
    pub step_index: usize,
    pub attempts_on_current_step: u32,
    pub xp: u32,
}

/// The engine's verdict on one submitted command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Judgement {
    /// The current step was satisfied.
    Advanced {
        message: String,
        xp_awarded: u32,
        /// Which expected pattern was credited (most specific match).
        matched_pattern: usize,
        level_complete: bool,
        game_complete: bool,
    },
    /// Not satisfied; try again.
    Retry {
        /// True when the command itself failed (unknown, bad args,
        /// missing target); false when it ran fine but was not the
        /// command this task wants.
        command_failed: bool,
        message: String,
        hint: Option<String>,
    },
    /// The campaign is already over; nothing changes anymore.
    AlreadyComplete,
}

/// Tracks progression through a [`LevelSet`] and judges interpreter
/// results against the current step.
#[derive(Debug)]
pub struct LevelEngine {
    levels: LevelSet,
    config: EngineConfig,
    progress: Progress,
}

impl LevelEngine {
    pub fn new(levels: LevelSet) -> Self {
        Self::with_config(levels, EngineConfig::default())
    }

    pub fn with_config(levels: LevelSet, config: EngineConfig) -> Self {
        Self {
            levels,
            config,
            progress: Progress::default(),
        }
    }

    pub fn progress(&self) -> &Progress {
        &self.progress
    }

    pub fn xp(&self) -> u32 {
        self.progress.xp
    }

    /// Absorbing terminal state: every level finished.
    pub fn is_complete(&self) -> bool {
        self.progress.level_index >= self.levels.len()
    }

    pub fn current_level(&self) -> Option<&Level> {
        self.levels.get(self.progress.level_index)
    }

    pub fn current_step(&self) -> Option<&Step> {
        self.current_level()?.steps.get(self.progress.step_index)
    }

    /// Output overrides of the active step, for the interpreter.
    pub fn active_overrides(&self) -> Option<&OutputOverrides> {
        self.current_step().map(|s| &s.output_overrides)
    }

    /// Judge one command: the raw line the player typed plus the
    /// interpreter's result for it. Applies the step's state changes to
    /// `env` and advances progress on satisfaction.
    pub fn submit(&mut self, raw: &str, result: &CommandResult, env: &mut SimEnv) -> Judgement {
        if self.is_complete() {
            return Judgement::AlreadyComplete;
        }
        let Some(step) = self.current_step() else {
            return Judgement::AlreadyComplete;
        };

        let matched = if result.success {
            pattern::best_match(&step.expected, &normalize_line(raw))
        } else {
            None
        };

        match matched {
            Some(matched_pattern) => {
                let reward = step.on_success.clone();
                let steps_in_level = self.current_level().map(|l| l.steps.len()).unwrap_or(0);

                for change in &reward.state_changes {
                    env.apply(change);
                }
                self.progress.xp += reward.xp;
                self.progress.attempts_on_current_step = 0;
                self.progress.step_index += 1;

                let level_complete = self.progress.step_index >= steps_in_level;
                if level_complete {
                    self.progress.level_index += 1;
                    self.progress.step_index = 0;
                }

                Judgement::Advanced {
                    message: reward.message,
                    xp_awarded: reward.xp,
                    matched_pattern,
                    level_complete,
                    game_complete: self.is_complete(),
                }
            }
            None => {
                let hint_text = step.hint_on_fail.clone();
                self.progress.attempts_on_current_step += 1;

                // hint is idempotent: once past the threshold it comes
                // back on every subsequent failure
                let hint = (self.progress.attempts_on_current_step > self.config.hint_threshold)
                    .then_some(hint_text);

                let (command_failed, message) = if result.success {
                    (
                        false,
                        "that command ran, but it's not the one this task needs".to_string(),
                    )
                } else if result.message.is_empty() {
                    (true, "command failed".to_string())
                } else {
                    (true, result.message.clone())
                };

                Judgement::Retry {
                    command_failed,
                    message,
                    hint,
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shell::Interpreter;

    fn tiny_level(id: &str) -> Level {
        Level {
            id: id.to_string(),
            title: "t".into(),
            description: "d".into(),
            steps: vec![Step {
                task: "list the logs".into(),
                expected: vec![CommandPattern::new("ls /var/log")],
                on_success: StepReward {
                    message: "done".into(),
                    xp: 10,
                    state_changes: vec![],
                },
                hint_on_fail: "try ls".into(),
                output_overrides: OutputOverrides::new(),
            }],
        }
    }

    fn engine_with(levels: Vec<Level>) -> LevelEngine {
        LevelEngine::new(LevelSet::new(levels).unwrap())
    }

    fn play(engine: &mut LevelEngine, env: &mut SimEnv, line: &str) -> Judgement {
        let result = Interpreter::new().execute(env, line, engine.active_overrides().cloned().as_ref());
        engine.submit(line, &result, env)
    }

    #[test]
    fn validation_rejects_malformed_data() {
        assert!(matches!(LevelSet::new(vec![]), Err(DataError::NoLevels)));

        let mut empty_steps = tiny_level("a");
        empty_steps.steps.clear();
        assert!(matches!(
            LevelSet::new(vec![empty_steps]),
            Err(DataError::EmptyLevel(_))
        ));

        let mut no_expected = tiny_level("a");
        no_expected.steps[0].expected.clear();
        assert!(matches!(
            LevelSet::new(vec![no_expected]),
            Err(DataError::EmptyStep { .. })
        ));

        assert!(matches!(
            LevelSet::new(vec![tiny_level("a"), tiny_level("a")]),
            Err(DataError::DuplicateLevelId(_))
        ));
    }

    #[test]
    fn builtin_catalog_is_valid() {
        let set = LevelSet::builtin();
        assert!(set.len() >= 4);
    }

    #[test]
    fn satisfying_the_only_step_completes_level_and_game() {
        let mut engine = engine_with(vec![tiny_level("a")]);
        let mut env = SimEnv::baseline();

        match play(&mut engine, &mut env, "ls /var/log") {
            Judgement::Advanced {
                xp_awarded,
                level_complete,
                game_complete,
                ..
            } => {
                assert_eq!(xp_awarded, 10);
                assert!(level_complete);
                assert!(game_complete);
            }
            other => panic!("expected Advanced, got {:?}", other),
        }
        assert_eq!(engine.xp(), 10);
        assert!(engine.is_complete());
    }

    #[test]
    fn wrong_command_increments_attempts_and_hints_repeat() {
        let mut engine = engine_with(vec![tiny_level("a")]);
        let mut env = SimEnv::baseline();

        // threshold is 2: first two failures come without a hint
        for _ in 0..2 {
            match play(&mut engine, &mut env, "cat /etc/passwd") {
                Judgement::Retry { hint, command_failed, .. } => {
                    assert!(hint.is_none());
                    assert!(!command_failed); // valid command, wrong task
                }
                other => panic!("expected Retry, got {:?}", other),
            }
        }
        // from the third failed attempt on, the hint appears every time
        for _ in 0..3 {
            match play(&mut engine, &mut env, "cat /etc/passwd") {
                Judgement::Retry { hint, .. } => assert_eq!(hint.as_deref(), Some("try ls")),
                other => panic!("expected Retry, got {:?}", other),
            }
        }
    }

    #[test]
    fn failed_command_does_not_satisfy_even_when_pattern_matches() {
        let mut level = tiny_level("a");
        level.steps[0].expected = vec![CommandPattern::new("cat /ghost")];
        let mut engine = engine_with(vec![level]);
        let mut env = SimEnv::baseline();

        match play(&mut engine, &mut env, "cat /ghost") {
            Judgement::Retry { command_failed, message, .. } => {
                assert!(command_failed);
                assert_eq!(message, "target not found: /ghost");
            }
            other => panic!("expected Retry, got {:?}", other),
        }
        assert_eq!(engine.progress().step_index, 0);
    }

    #[test]
    fn resubmitting_a_satisfied_steps_command_does_not_regress() {
        let mut second = tiny_level("b");
        second.steps[0].expected = vec![CommandPattern::new("ps aux")];
        let mut engine = engine_with(vec![tiny_level("a"), second]);
        let mut env = SimEnv::baseline();

        play(&mut engine, &mut env, "ls /var/log");
        assert_eq!(engine.progress().level_index, 1);

        // step one's command again: judged against level two, a miss
        let judgement = play(&mut engine, &mut env, "ls /var/log");
        assert!(matches!(judgement, Judgement::Retry { .. }));
        assert_eq!(engine.progress().level_index, 1);
        assert_eq!(engine.progress().step_index, 0);
    }

    #[test]
    fn game_complete_is_absorbing() {
        let mut engine = engine_with(vec![tiny_level("a")]);
        let mut env = SimEnv::baseline();
        play(&mut engine, &mut env, "ls /var/log");
        assert!(engine.is_complete());

        let xp = engine.xp();
        for line in ["ls /var/log", "ps aux", "nonsense"] {
            assert_eq!(play(&mut engine, &mut env, line), Judgement::AlreadyComplete);
        }
        assert_eq!(engine.xp(), xp);
        assert_eq!(engine.progress().level_index, 1);
    }

    #[test]
    fn state_changes_apply_on_satisfaction() {
        let mut level = tiny_level("a");
        level.steps[0].on_success.state_changes = vec![StateChange::SetMetric {
            name: "disk_usage_pct".into(),
            value: 40,
        }];
        let mut engine = engine_with(vec![level]);
        let mut env = SimEnv::baseline();

        assert_eq!(env.metric("disk_usage_pct"), Some(95));
        play(&mut engine, &mut env, "ls /var/log");
        assert_eq!(env.metric("disk_usage_pct"), Some(40));
    }

    #[test]
    fn multi_step_levels_enforce_order() {
        let mut level = tiny_level("a");
        level.steps.push(Step {
            task: "now restart apache".into(),
            expected: vec![CommandPattern::new("systemctl restart apache2")],
            on_success: StepReward {
                message: "fixed".into(),
                xp: 50,
                state_changes: vec![],
            },
            hint_on_fail: "systemctl".into(),
            output_overrides: OutputOverrides::new(),
        });
        let mut engine = engine_with(vec![level]);
        let mut env = SimEnv::baseline();

        // step two's command first: rejected, still on step one
        assert!(matches!(
            play(&mut engine, &mut env, "systemctl restart apache2"),
            Judgement::Retry { .. }
        ));
        assert_eq!(engine.progress().step_index, 0);

        play(&mut engine, &mut env, "ls /var/log");
        assert_eq!(engine.progress().step_index, 1);

        match play(&mut engine, &mut env, "systemctl restart apache2") {
            Judgement::Advanced { level_complete, .. } => assert!(level_complete),
            other => panic!("expected Advanced, got {:?}", other),
        }
    }

    #[test]
    fn levels_round_trip_through_json() {
        let set = LevelSet::new(vec![tiny_level("a")]).unwrap();
        let text = serde_json::to_string(&set.levels).unwrap();
        let reloaded = LevelSet::from_json(&text).unwrap();
        assert_eq!(reloaded.len(), 1);
        assert_eq!(reloaded.get(0).unwrap().id, "a");
    }
}
