//! Synthetic environment with a fixed scoring oracle.
use anyhow::{ensure, Result};
use log::trace;
use rand::{rngs::SmallRng, Rng, SeedableRng};
use reinforge_core::{Act, ActionTable, Env, Info, Obs, Step};
use serde::{Deserialize, Serialize};
use std::{
    fs::File,
    io::{BufReader, Write},
    path::Path,
};

/// Configuration of [`ScoreThresholdEnv`].
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct ScoreThresholdConfig {
    /// Length of the feature vector of an artifact.
    pub n_features: usize,

    /// Names of the transformations. Each one gets a random feature delta.
    pub actions: Vec<String>,

    /// An episode succeeds when the score reaches this value.
    pub threshold: f32,

    /// Reward added on success.
    pub success_bonus: f32,

    /// Fraction of features each transformation changes.
    pub density: f64,
}

impl Default for ScoreThresholdConfig {
    fn default() -> Self {
        Self {
            n_features: 16,
            actions: [
                "append_block",
                "remove_block",
                "pad_tail",
                "trim_tail",
                "reorder_blocks",
                "merge_blocks",
                "split_block",
                "rename_symbols",
            ]
            .iter()
            .map(|s| s.to_string())
            .collect(),
            threshold: 0.9,
            success_bonus: 10.0,
            density: 0.25,
        }
    }
}

impl ScoreThresholdConfig {
    /// Sets the number of features.
    pub fn n_features(mut self, v: usize) -> Self {
        self.n_features = v;
        self
    }

    /// Sets the names of the transformations.
    pub fn actions<S: Into<String>>(mut self, v: impl IntoIterator<Item = S>) -> Self {
        self.actions = v.into_iter().map(Into::into).collect();
        self
    }

    /// Sets the success threshold of the score.
    pub fn threshold(mut self, v: f32) -> Self {
        self.threshold = v;
        self
    }

    /// Sets the success bonus.
    pub fn success_bonus(mut self, v: f32) -> Self {
        self.success_bonus = v;
        self
    }

    /// Constructs [`ScoreThresholdConfig`] from YAML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let file = File::open(path)?;
        let rdr = BufReader::new(file);
        let b = serde_yaml::from_reader(rdr)?;
        Ok(b)
    }

    /// Saves [`ScoreThresholdConfig`] as a YAML file.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let mut file = File::create(path)?;
        file.write_all(serde_yaml::to_string(&self)?.as_bytes())?;
        Ok(())
    }
}

/// Score of the artifact after a step.
#[derive(Debug, Clone, PartialEq)]
pub struct ScoreInfo {
    /// Oracle output in `(0, 1)`.
    pub score: f32,

    /// `true` if the score reached the threshold.
    pub success: bool,
}

impl Info for ScoreInfo {}

/// Seeded synthetic environment.
///
/// An artifact is a feature vector drawn at every reset. Each action adds a
/// fixed sparse delta to the features; the oracle scores the artifact with
/// `sigmoid(w . x + b)`. The reward of a step is the change of the score, plus
/// [`ScoreThresholdConfig::success_bonus`] when the score reaches the
/// threshold, which also ends the episode.
///
/// The oracle, the deltas and the sequence of artifacts are all determined by
/// the seed given to [`Env::build`].
pub struct ScoreThresholdEnv {
    config: ScoreThresholdConfig,
    table: ActionTable,
    weights: Vec<f32>,
    bias: f32,
    deltas: Vec<Vec<f32>>,
    features: Vec<f32>,
    score: f32,
    rng: SmallRng,
}

fn sigmoid(x: f32) -> f32 {
    1.0 / (1.0 + (-x).exp())
}

impl ScoreThresholdEnv {
    /// Oracle output for the given features.
    pub fn score_of(&self, features: &[f32]) -> f32 {
        let z: f32 = self
            .weights
            .iter()
            .zip(features.iter())
            .map(|(w, x)| w * x)
            .sum();
        sigmoid(z + self.bias)
    }

    /// Score of the current artifact.
    pub fn score(&self) -> f32 {
        self.score
    }
}

impl Env for ScoreThresholdEnv {
    type Config = ScoreThresholdConfig;
    type Info = ScoreInfo;

    fn build(config: &Self::Config, seed: i64) -> Result<Self> {
        ensure!(config.n_features > 0, "n_features must be positive");
        ensure!(
            (0.0..=1.0).contains(&config.density),
            "density must be in [0, 1], got {}",
            config.density
        );
        let table = ActionTable::new(config.actions.clone())?;
        let mut rng = SmallRng::seed_from_u64(seed as u64);
        let n = config.n_features;

        let weights: Vec<f32> = (0..n).map(|_| rng.gen_range(-1.0..1.0)).collect();
        let bias = -1.0;
        let deltas = (0..table.len())
            .map(|_| {
                (0..n)
                    .map(|_| match rng.gen_bool(config.density) {
                        true => rng.gen_range(-0.5..0.5),
                        false => 0.0,
                    })
                    .collect()
            })
            .collect();

        Ok(Self {
            config: config.clone(),
            table,
            weights,
            bias,
            deltas,
            features: vec![0.0; n],
            score: 0.0,
            rng,
        })
    }

    fn reset(&mut self) -> Result<Obs> {
        self.features = (0..self.config.n_features)
            .map(|_| self.rng.gen_range(0.0..1.0))
            .collect();
        self.score = self.score_of(&self.features);
        trace!("Reset artifact with score {}", self.score);
        Ok(Obs(self.features.clone()))
    }

    fn step(&mut self, act: &Act) -> Result<Step<Self>> {
        let delta = self.deltas.get(act.index()).ok_or_else(|| {
            anyhow::anyhow!("action {} is out of range", act.index())
        })?;
        for (x, d) in self.features.iter_mut().zip(delta.iter()) {
            *x += d;
        }
        let score = self.score_of(&self.features);
        let success = score >= self.config.threshold;
        let mut reward = score - self.score;
        if success {
            reward += self.config.success_bonus;
        }
        self.score = score;

        Ok(Step::new(
            Obs(self.features.clone()),
            *act,
            reward,
            success,
            false,
            ScoreInfo { score, success },
        ))
    }

    fn action_table(&self) -> &ActionTable {
        &self.table
    }

    fn obs_dim(&self) -> usize {
        self.config.n_features
    }
}
