use anyhow::{bail, Result};
use reinforge_core::{
    error::ReinforgeError,
    evaluator::{DefaultEvaluator, Evaluator},
    record::{BufferedRecorder, NullRecorder, Record, RecordValue},
    Act, ActionTable, Agent, Env, EpisodeRunner, EpsilonSchedule, Obs, Policy, RangeNormalizer,
    Step, Trainer, TrainerConfig, Trajectory,
};
use std::path::Path;
use tempdir::TempDir;

#[derive(Clone)]
struct ScriptedConfig {
    /// Terminates the episode after this many steps.
    done_after: Option<usize>,
    /// Episodes (1-based, counted by resets) whose second step fails.
    failing_episodes: Vec<usize>,
}

struct ScriptedEnv {
    config: ScriptedConfig,
    table: ActionTable,
    episode: usize,
    t: usize,
}

impl Env for ScriptedEnv {
    type Config = ScriptedConfig;
    type Info = ();

    fn build(config: &Self::Config, _seed: i64) -> Result<Self> {
        Ok(Self {
            config: config.clone(),
            table: ActionTable::new(["append_section", "add_imports", "pad_overlay"])?,
            episode: 0,
            t: 0,
        })
    }

    fn reset(&mut self) -> Result<Obs> {
        self.episode += 1;
        self.t = 0;
        Ok(Obs(vec![0.0, 1.0, 2.0, 3.0]))
    }

    fn step(&mut self, act: &Act) -> Result<Step<Self>> {
        self.t += 1;
        if self.t == 2 && self.config.failing_episodes.contains(&self.episode) {
            bail!("scoring oracle crashed");
        }
        let done = self.config.done_after.map_or(false, |n| self.t >= n);
        let obs = Obs(vec![self.t as f32, 1.0, 2.0, 3.0]);
        Ok(Step::new(obs, *act, 1.0, done, false, ()))
    }

    fn action_table(&self) -> &ActionTable {
        &self.table
    }

    fn obs_dim(&self) -> usize {
        4
    }
}

/// Deterministic agent that cycles through actions and records every other
/// step as an exploration step.
#[derive(Default)]
struct CyclingAgent {
    calls: usize,
    updates: usize,
    trajectory_lens: Vec<usize>,
    fail_on_update: Option<usize>,
    train: bool,
    seen_obs: Vec<Obs>,
}

impl Policy<ScriptedEnv> for CyclingAgent {
    fn sample(&mut self, _obs: &Obs) -> Result<Act> {
        Ok(Act(0))
    }
}

impl Agent<ScriptedEnv> for CyclingAgent {
    type LogProb = f32;

    fn train(&mut self) {
        self.train = true;
    }

    fn eval(&mut self) {
        self.train = false;
    }

    fn is_train(&self) -> bool {
        self.train
    }

    fn select_action(
        &mut self,
        obs: &Obs,
        epsilon: f64,
        trajectory: &mut Trajectory<f32>,
    ) -> Result<Act> {
        assert!((0.0..=1.0).contains(&epsilon));
        self.seen_obs.push(obs.clone());
        self.calls += 1;
        let log_prob = match self.calls % 2 {
            0 => None,
            _ => Some(-1.0),
        };
        trajectory.push_log_prob(log_prob);
        Ok(Act(self.calls % 3))
    }

    fn opt_with_record(&mut self, trajectory: &mut Trajectory<f32>) -> Result<Record> {
        assert!(trajectory.is_aligned());
        self.updates += 1;
        if self.fail_on_update == Some(self.updates) {
            bail!("shape mismatch in loss");
        }
        self.trajectory_lens.push(trajectory.len());
        trajectory.clear();
        Ok(Record::from_scalar("loss", 0.0))
    }

    fn save_params(&self, path: &Path) -> Result<()> {
        std::fs::write(path, format!("{}", self.updates))?;
        Ok(())
    }

    fn load_params(&mut self, path: &Path) -> Result<()> {
        self.updates = std::fs::read_to_string(path)?.parse()?;
        Ok(())
    }
}

fn scripted_env(done_after: Option<usize>, failing_episodes: Vec<usize>) -> ScriptedEnv {
    ScriptedEnv::build(
        &ScriptedConfig {
            done_after,
            failing_episodes,
        },
        0,
    )
    .unwrap()
}

#[test]
fn test_runner_stops_on_done() -> Result<()> {
    let mut env = scripted_env(Some(3), vec![]);
    let mut agent = CyclingAgent::default();
    let runner = EpisodeRunner::new(80, RangeNormalizer::default());

    let episode = runner.run(&mut env, &mut agent, 1, 0.0)?;

    assert_eq!(episode.trajectory.rewards(), &[1.0, 1.0, 1.0]);
    assert_eq!(episode.trajectory.log_probs().len(), 3);
    assert_eq!(episode.steps, 3);
    assert!(episode.is_done);
    assert_eq!(episode.total_reward, 3.0);
    Ok(())
}

#[test]
fn test_runner_respects_step_budget() -> Result<()> {
    let mut env = scripted_env(None, vec![]);
    let mut agent = CyclingAgent::default();
    let runner = EpisodeRunner::new(5, RangeNormalizer::default());

    let episode = runner.run(&mut env, &mut agent, 1, 0.5)?;

    assert_eq!(episode.steps, 5);
    assert_eq!(episode.trajectory.len(), 5);
    assert!(episode.trajectory.is_aligned());
    assert!(!episode.is_done);
    Ok(())
}

#[test]
fn test_runner_normalizes_every_observation() -> Result<()> {
    let mut env = scripted_env(Some(4), vec![]);
    let mut agent = CyclingAgent::default();
    let runner = EpisodeRunner::new(80, RangeNormalizer::default());

    runner.run(&mut env, &mut agent, 1, 0.0)?;

    assert_eq!(agent.seen_obs.len(), 4);
    for obs in agent.seen_obs.iter() {
        let lo = obs.as_slice().iter().cloned().fold(f32::INFINITY, f32::min);
        let hi = obs.as_slice().iter().cloned().fold(f32::NEG_INFINITY, f32::max);
        assert!((lo + 0.5).abs() < 1e-6 && (hi - 0.5).abs() < 1e-6);
    }
    // Raw observations differ after the first step, so do normalized ones.
    assert_ne!(agent.seen_obs[0], agent.seen_obs[2]);
    Ok(())
}

#[test]
fn test_runner_reports_environment_fault() {
    let mut env = scripted_env(None, vec![1]);
    let mut agent = CyclingAgent::default();
    let runner = EpisodeRunner::new(10, RangeNormalizer::default());

    let err = runner.run(&mut env, &mut agent, 7, 0.0).unwrap_err();
    assert!(err.is_environment_fault());
    assert!(matches!(err, ReinforgeError::Environment { episode: 7, .. }));
}

#[test]
fn test_environment_faults_do_not_stop_training() -> Result<()> {
    let mut env = scripted_env(Some(4), vec![2, 3, 5]);
    let mut agent = CyclingAgent::default();
    let mut recorder = BufferedRecorder::new();
    let config = TrainerConfig::default()
        .max_episodes(6)
        .save_interval(0)
        .epsilon(EpsilonSchedule::greedy());
    let mut trainer = Trainer::build(config);

    let summary = trainer.train(&mut env, &mut agent, &mut recorder)?;

    assert_eq!(summary.episodes, 6);
    assert_eq!(summary.failed_episodes, 3);
    assert_eq!(agent.updates, 3);
    assert_eq!(agent.trajectory_lens, vec![4, 4, 4]);
    assert_eq!(summary.last_episode_reward, Some(4.0));

    let episodes: Vec<f32> = recorder
        .with_key("episode_reward")
        .map(|r| r.get_scalar("episode").unwrap())
        .collect();
    assert_eq!(episodes, vec![1.0, 4.0, 6.0]);
    Ok(())
}

#[test]
fn test_agent_errors_stop_training() {
    let mut env = scripted_env(Some(2), vec![]);
    let mut agent = CyclingAgent {
        fail_on_update: Some(2),
        ..CyclingAgent::default()
    };
    let config = TrainerConfig::default().max_episodes(10).save_interval(0);
    let mut trainer = Trainer::build(config);

    let err = trainer
        .train(&mut env, &mut agent, &mut NullRecorder::new())
        .unwrap_err();

    assert_eq!(agent.updates, 2);
    assert!(matches!(
        err.downcast_ref::<ReinforgeError>(),
        Some(ReinforgeError::Agent(_))
    ));
}

#[test]
fn test_checkpoint_cadence() -> Result<()> {
    let dir = TempDir::new("checkpoint_cadence")?;
    let model_dir = dir.path().join("rl_models");
    let mut env = scripted_env(Some(1), vec![]);
    let mut agent = CyclingAgent::default();
    let mut recorder = BufferedRecorder::new();
    let config = TrainerConfig::default()
        .max_episodes(1000)
        .save_interval(500)
        .model_dir(model_dir.to_string_lossy());
    let mut trainer = Trainer::build(config);

    let summary = trainer.train(&mut env, &mut agent, &mut recorder)?;

    assert_eq!(summary.checkpoints.len(), 2);
    let mut files: Vec<String> = std::fs::read_dir(&model_dir)?
        .map(|e| e.map(|e| e.file_name().to_string_lossy().into_owned()))
        .collect::<std::io::Result<_>>()?;
    files.sort();
    assert_eq!(files.len(), 2);
    assert!(files[0].starts_with("rl-model-1000-"));
    assert!(files[1].starts_with("rl-model-500-"));
    assert!(files.iter().all(|f| f.ends_with(".safetensors")));

    // The checkpoint at episode 500 holds the parameters after 500 updates.
    let mut restored = CyclingAgent::default();
    restored.load_params(&summary.checkpoints[0])?;
    assert_eq!(restored.updates, 500);

    let checkpoint_events: Vec<(f32, String)> = recorder
        .with_key("checkpoint")
        .map(|r| {
            (
                r.get_scalar("episode").unwrap(),
                r.get_string("checkpoint").unwrap(),
            )
        })
        .collect();
    assert_eq!(checkpoint_events.len(), 2);
    assert_eq!(checkpoint_events[0].0, 500.0);
    assert_eq!(checkpoint_events[1].0, 1000.0);

    // The file name carries the date of the save time in the record.
    for r in recorder.with_key("checkpoint") {
        let date = r.get_datetime("datetime")?.format("%Y-%m-%d").to_string();
        assert!(r.get_string("checkpoint")?.ends_with(&format!("-{}.safetensors", date)));
    }
    Ok(())
}

#[test]
fn test_checkpoint_failure_is_not_fatal() -> Result<()> {
    let dir = TempDir::new("checkpoint_failure")?;
    // A regular file where the model directory should be.
    let model_dir = dir.path().join("not_a_dir");
    std::fs::write(&model_dir, b"")?;
    let mut env = scripted_env(Some(1), vec![]);
    let mut agent = CyclingAgent::default();
    let config = TrainerConfig::default()
        .max_episodes(4)
        .save_interval(2)
        .model_dir(model_dir.to_string_lossy());
    let mut trainer = Trainer::build(config);

    let summary = trainer.train(&mut env, &mut agent, &mut NullRecorder::new())?;

    assert_eq!(summary.episodes, 4);
    assert_eq!(agent.updates, 4);
    assert!(summary.checkpoints.is_empty());
    assert_eq!(summary.failed_checkpoints, 2);
    Ok(())
}

#[test]
fn test_episode_records() -> Result<()> {
    let mut env = scripted_env(Some(2), vec![]);
    let mut agent = CyclingAgent::default();
    let mut recorder = BufferedRecorder::new();
    let config = TrainerConfig::default().max_episodes(3).save_interval(0);
    let mut trainer = Trainer::build(config);

    let summary = trainer.train(&mut env, &mut agent, &mut recorder)?;

    assert_eq!(recorder.len(), 3);
    let record = recorder.iter().last().unwrap();
    assert_eq!(record.get_scalar("episode")?, 3.0);
    assert_eq!(record.get_scalar("episode_reward")?, 2.0);
    assert_eq!(record.get_scalar("episode_steps")?, 2.0);
    assert_eq!(record.get_scalar("loss")?, 0.0);
    assert!((record.get_scalar("epsilon")? - 0.997).abs() < 1e-6);
    assert_eq!(
        record.get("running_reward"),
        Some(&RecordValue::Scalar(summary.running_reward))
    );
    // 10.0 -> 9.6 -> 9.22 -> 8.859
    assert!((summary.running_reward - 8.859).abs() < 1e-4);
    assert!(agent.is_train());
    Ok(())
}

#[test]
fn test_default_evaluator() -> Result<()> {
    let env = scripted_env(Some(2), vec![]);
    let runner = EpisodeRunner::new(80, RangeNormalizer::default());
    let mut evaluator = DefaultEvaluator::from_env(env, 3, runner)?;
    let mut agent = CyclingAgent::default();

    let record = evaluator.evaluate(&mut agent)?;

    assert_eq!(record.get_scalar("eval_reward")?, 2.0);
    // Evaluation samples actions without recording anything.
    assert_eq!(agent.calls, 0);
    Ok(())
}

#[test]
fn test_evaluator_needs_episodes() {
    let env = scripted_env(Some(2), vec![]);
    let runner = EpisodeRunner::new(80, RangeNormalizer::default());
    assert!(DefaultEvaluator::from_env(env, 0, runner).is_err());
}
