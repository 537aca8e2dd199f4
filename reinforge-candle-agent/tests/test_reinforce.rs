use anyhow::Result;
use candle_core::Tensor;
use reinforge_candle_agent::{
    mlp::{Mlp, MlpConfig},
    opt::OptimizerConfig,
    reinforce::{Reinforce, ReinforceConfig},
};
use reinforge_core::{
    record::RecordValue, Act, ActionTable, Agent, Configurable, Env, EpisodeRunner, Obs, Policy,
    RangeNormalizer, Step, Trajectory,
};
use tempdir::TempDir;

const OBS_DIM: usize = 4;
const N_ACTIONS: usize = 3;
const BEST: usize = 2;

/// Stateless environment in which action `BEST` is rewarded.
struct BanditEnv {
    table: ActionTable,
    t: usize,
    episode_len: usize,
}

impl Env for BanditEnv {
    type Config = usize;
    type Info = ();

    fn build(episode_len: &usize, _seed: i64) -> Result<Self> {
        Ok(Self {
            table: ActionTable::numbered(N_ACTIONS)?,
            t: 0,
            episode_len: *episode_len,
        })
    }

    fn reset(&mut self) -> Result<Obs> {
        self.t = 0;
        Ok(obs())
    }

    fn step(&mut self, act: &Act) -> Result<Step<Self>> {
        self.t += 1;
        let reward = if act.index() == BEST { 1.0 } else { 0.0 };
        let done = self.t >= self.episode_len;
        Ok(Step::new(obs(), *act, reward, done, false, ()))
    }

    fn action_table(&self) -> &ActionTable {
        &self.table
    }

    fn obs_dim(&self) -> usize {
        OBS_DIM
    }
}

fn obs() -> Obs {
    Obs(vec![0.1, -0.2, 0.3, 0.4])
}

type BanditAgent = Reinforce<BanditEnv, Mlp>;

fn agent(seed: u64) -> Result<BanditAgent> {
    let config = ReinforceConfig::default()
        .policy_config(MlpConfig::new(OBS_DIM as _, vec![32, 32], N_ACTIONS as _).dropout(0.0))
        .opt_config(OptimizerConfig::Adam { lr: 1e-2 })
        .discount_factor(0.9)
        .seed(seed);
    BanditAgent::build(config)
}

#[test]
fn test_full_exploration_is_uniform() -> Result<()> {
    let mut agent = agent(0)?;
    let mut trajectory = Trajectory::<Tensor>::new();
    let mut counts = [0usize; N_ACTIONS];
    for _ in 0..6000 {
        let a = agent.select_action(&obs(), 1.0, &mut trajectory)?;
        counts[a.index()] += 1;
    }
    assert_eq!(trajectory.log_probs().len(), 6000);
    assert_eq!(trajectory.n_sampled(), 0);
    for c in counts {
        assert!((1700..2300).contains(&c), "counts {:?}", counts);
    }
    Ok(())
}

#[test]
fn test_greedy_selection_records_log_probs() -> Result<()> {
    let mut agent = agent(1)?;
    let mut trajectory = Trajectory::<Tensor>::new();
    for _ in 0..10 {
        let a = agent.select_action(&obs(), 0.0, &mut trajectory)?;
        assert!(a.index() < N_ACTIONS);
    }
    assert_eq!(trajectory.n_sampled(), 10);
    for lp in trajectory.log_probs() {
        let v = lp.as_ref().unwrap().to_scalar::<f32>()?;
        assert!(v.is_finite() && v <= 0.0);
    }
    Ok(())
}

#[test]
fn test_degenerate_distribution_acts_uniformly() -> Result<()> {
    let mut agent = agent(4)?;
    let nan_obs = Obs(vec![f32::NAN; OBS_DIM]);
    assert!(agent.action_probs(&nan_obs)?.iter().all(|p| p.is_nan()));

    let mut trajectory = Trajectory::<Tensor>::new();
    let mut counts = [0usize; N_ACTIONS];
    for _ in 0..300 {
        let a = agent.select_action(&nan_obs, 0.0, &mut trajectory)?;
        counts[a.index()] += 1;
    }
    // Every step keeps its slot, none of them with a log-probability.
    assert_eq!(trajectory.log_probs().len(), 300);
    assert_eq!(trajectory.n_sampled(), 0);
    for c in counts {
        assert!((50..150).contains(&c), "counts {:?}", counts);
    }
    Ok(())
}

#[test]
fn test_update_without_sampled_actions_is_skipped() -> Result<()> {
    let mut agent = agent(2)?;
    let before = agent.action_probs(&obs())?;
    let mut trajectory = Trajectory::<Tensor>::new();
    for r in [1.0, 0.0, 2.0] {
        agent.select_action(&obs(), 1.0, &mut trajectory)?;
        trajectory.push_reward(r);
    }

    let record = agent.opt_with_record(&mut trajectory)?;

    assert!(trajectory.is_empty());
    assert_eq!(record.get_scalar("skipped")?, 1.0);
    assert_eq!(record.get_scalar("n_sampled")?, 0.0);
    assert_eq!(record.get_scalar("loss")?, 0.0);
    assert_eq!(agent.n_opts(), 0);
    assert_eq!(agent.action_probs(&obs())?, before);
    Ok(())
}

#[test]
fn test_update_changes_policy() -> Result<()> {
    let mut agent = agent(3)?;
    let before = agent.action_probs(&obs())?;
    let mut trajectory = Trajectory::<Tensor>::new();
    for r in [1.0, 0.0, 0.0, 1.0] {
        agent.select_action(&obs(), 0.0, &mut trajectory)?;
        trajectory.push_reward(r);
    }

    let record = agent.opt_with_record(&mut trajectory)?;

    assert!(trajectory.is_empty());
    assert_eq!(record.get_scalar("skipped")?, 0.0);
    assert_eq!(record.get_scalar("n_sampled")?, 4.0);
    assert!(matches!(record.get("loss"), Some(RecordValue::Scalar(v)) if v.is_finite()));
    assert_eq!(agent.n_opts(), 1);
    assert_ne!(agent.action_probs(&obs())?, before);
    Ok(())
}

#[test]
fn test_misaligned_trajectory_is_rejected() -> Result<()> {
    let mut agent = agent(4)?;
    let mut trajectory = Trajectory::<Tensor>::new();
    agent.select_action(&obs(), 0.0, &mut trajectory)?;
    trajectory.push_reward(1.0);
    trajectory.push_reward(1.0);

    assert!(agent.opt_with_record(&mut trajectory).is_err());
    assert!(trajectory.is_empty());
    Ok(())
}

#[test]
fn test_learns_rewarded_action() -> Result<()> {
    let mut env = BanditEnv::build(&10, 0)?;
    let mut agent = agent(5)?;
    let runner = EpisodeRunner::new(10, RangeNormalizer::default());
    let normalized = RangeNormalizer::default().normalize(&obs())?;
    let before = agent.action_probs(&normalized)?[BEST];

    for episode in 1..=300 {
        let mut ep = runner.run(&mut env, &mut agent, episode, 0.0)?;
        agent.opt_with_record(&mut ep.trajectory)?;
    }

    let after = agent.action_probs(&normalized)?[BEST];
    assert!(after > before, "p(best) {} -> {}", before, after);
    assert!(after > 0.6, "p(best) {} -> {}", before, after);

    agent.eval();
    assert_eq!(agent.sample(&normalized)?, Act(BEST));
    Ok(())
}

#[test]
fn test_save_and_load() -> Result<()> {
    let dir = TempDir::new("reinforce_params")?;
    let path = dir.path().join("rl-model-1-2024-01-01.safetensors");

    let mut agent1 = agent(6)?;
    let mut trajectory = Trajectory::<Tensor>::new();
    for r in [0.0, 1.0, 1.0] {
        agent1.select_action(&obs(), 0.0, &mut trajectory)?;
        trajectory.push_reward(r);
    }
    agent1.opt_with_record(&mut trajectory)?;
    agent1.save_params(&path)?;

    let mut agent2 = agent(7)?;
    agent2.load_params(&path)?;
    assert_eq!(agent1.action_probs(&obs())?, agent2.action_probs(&obs())?);
    Ok(())
}
