//! REINFORCE agent implemented with candle.
use super::{explorer, PolicyModel, ReinforceConfig};
use crate::{
    model::SubModel1,
    util::{log_softmax, obs_to_tensor, OutDim},
};
use anyhow::{ensure, Result};
use candle_core::{shape::D, Tensor};
use log::{debug, warn};
use rand::{rngs::SmallRng, SeedableRng};
use reinforge_core::{
    discounted_returns, normalize_returns,
    record::{Record, RecordValue},
    Act, Agent, Configurable, Env, Obs, Policy, Trajectory, RETURN_NORM_EPS,
};
use serde::{de::DeserializeOwned, Serialize};
use std::{marker::PhantomData, path::Path};

/// REINFORCE agent with an epsilon-gated categorical policy.
///
/// Actions sampled from the policy keep their log-probability as a tensor
/// attached to the computation graph; exploration actions keep nothing. At
/// the end of an episode, [`Agent::opt_with_record`] minimizes
/// `-sum_t log_prob_t * R_t` over the sampled steps, where `R_t` are the
/// discounted returns of the episode normalized to zero mean and unit variance.
pub struct Reinforce<E, P>
where
    E: Env,
    P: SubModel1<Input = Tensor, Output = Tensor>,
    P::Config: DeserializeOwned + Serialize + OutDim + std::fmt::Debug + PartialEq + Clone,
{
    policy: PolicyModel<P>,
    discount_factor: f64,
    n_actions: usize,
    train: bool,
    n_opts: usize,
    rng: SmallRng,
    phantom: PhantomData<E>,
}

impl<E, P> Reinforce<E, P>
where
    E: Env,
    P: SubModel1<Input = Tensor, Output = Tensor>,
    P::Config: DeserializeOwned + Serialize + OutDim + std::fmt::Debug + PartialEq + Clone,
{
    /// Log-probabilities of all actions, shape `[n_actions]`.
    fn log_probs(&self, obs: &Obs, train: bool) -> Result<Tensor> {
        let obs = obs_to_tensor(obs, self.policy.device())?;
        let logits = self.policy.forward_t(&obs, train)?;
        ensure!(
            logits.dims() == [1, self.n_actions],
            "policy output has shape {:?}, expected [1, {}]",
            logits.dims(),
            self.n_actions
        );
        Ok(log_softmax(&logits)?.squeeze(0)?)
    }

    /// Action probabilities of the policy in evaluation mode.
    pub fn action_probs(&self, obs: &Obs) -> Result<Vec<f32>> {
        Ok(self.log_probs(obs, false)?.exp()?.to_vec1::<f32>()?)
    }

    /// Number of optimizer steps applied so far.
    pub fn n_opts(&self) -> usize {
        self.n_opts
    }

    fn update(&mut self, trajectory: &Trajectory<Tensor>) -> Result<Record> {
        ensure!(
            trajectory.is_aligned(),
            "trajectory has {} rewards but {} log-probabilities",
            trajectory.rewards().len(),
            trajectory.log_probs().len()
        );
        let n_sampled = trajectory.n_sampled();
        let mut record = Record::from_scalar("n_sampled", n_sampled as f32);

        let returns = normalize_returns(
            &discounted_returns(trajectory.rewards(), self.discount_factor),
            RETURN_NORM_EPS,
        );
        let terms = trajectory
            .log_probs()
            .iter()
            .zip(returns.iter())
            .filter_map(|(lp, &r)| lp.as_ref().map(|lp| lp.affine(-(r as f64), 0.0)))
            .collect::<candle_core::Result<Vec<_>>>()?;

        if terms.is_empty() {
            debug!("No sampled actions in the episode, skip the update");
            record.insert("loss", RecordValue::Scalar(0.0));
            record.insert("skipped", RecordValue::Scalar(1.0));
            return Ok(record);
        }

        let loss = Tensor::stack(&terms, 0)?.sum_all()?;
        let loss_value = loss.to_scalar::<f32>()?;
        if !loss_value.is_finite() {
            warn!("Non-finite policy loss {}, skip the update", loss_value);
            record.insert("loss", RecordValue::Scalar(0.0));
            record.insert("skipped", RecordValue::Scalar(1.0));
            return Ok(record);
        }

        self.policy.backward_step(&loss)?;
        self.n_opts += 1;
        record.insert("loss", RecordValue::Scalar(loss_value));
        record.insert("skipped", RecordValue::Scalar(0.0));
        Ok(record)
    }
}

impl<E, P> Configurable for Reinforce<E, P>
where
    E: Env,
    P: SubModel1<Input = Tensor, Output = Tensor>,
    P::Config: DeserializeOwned + Serialize + OutDim + std::fmt::Debug + PartialEq + Clone,
{
    type Config = ReinforceConfig<P::Config>;

    /// Constructs REINFORCE agent.
    fn build(config: Self::Config) -> Result<Self> {
        let device = config.device.unwrap_or_default().to_candle()?;
        let policy = PolicyModel::build(config.model_config, device)?;
        let n_actions = policy.out_dim();
        ensure!(n_actions > 0, "the number of actions must be positive");

        Ok(Self {
            policy,
            discount_factor: config.discount_factor,
            n_actions: n_actions as usize,
            train: config.train,
            n_opts: 0,
            rng: SmallRng::seed_from_u64(config.seed),
            phantom: PhantomData,
        })
    }
}

impl<E, P> Policy<E> for Reinforce<E, P>
where
    E: Env,
    P: SubModel1<Input = Tensor, Output = Tensor>,
    P::Config: DeserializeOwned + Serialize + OutDim + std::fmt::Debug + PartialEq + Clone,
{
    /// Samples from the policy in training mode, takes the most probable action otherwise.
    fn sample(&mut self, obs: &Obs) -> Result<Act> {
        let log_probs = self.log_probs(obs, self.train)?;
        if self.train {
            let probs = log_probs.exp()?.to_vec1::<f32>()?;
            let a = explorer::sample_categorical(&probs, &mut self.rng)
                .unwrap_or_else(|| explorer::uniform(self.n_actions, &mut self.rng));
            Ok(Act(a))
        } else {
            let a = log_probs.argmax(D::Minus1)?.to_scalar::<u32>()?;
            Ok(Act(a as usize))
        }
    }
}

impl<E, P> Agent<E> for Reinforce<E, P>
where
    E: Env,
    P: SubModel1<Input = Tensor, Output = Tensor>,
    P::Config: DeserializeOwned + Serialize + OutDim + std::fmt::Debug + PartialEq + Clone,
{
    type LogProb = Tensor;

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
        trajectory: &mut Trajectory<Tensor>,
    ) -> Result<Act> {
        if explorer::explores(epsilon, &mut self.rng) {
            trajectory.push_log_prob(None);
            return Ok(Act(explorer::uniform(self.n_actions, &mut self.rng)));
        }

        let log_probs = self.log_probs(obs, self.train)?;
        let probs = log_probs.exp()?.to_vec1::<f32>()?;
        match explorer::sample_categorical(&probs, &mut self.rng) {
            Some(a) => {
                trajectory.push_log_prob(Some(log_probs.get(a)?));
                Ok(Act(a))
            }
            None => {
                warn!("Degenerate action distribution {:?}, act uniformly", probs);
                trajectory.push_log_prob(None);
                Ok(Act(explorer::uniform(self.n_actions, &mut self.rng)))
            }
        }
    }

    fn opt_with_record(&mut self, trajectory: &mut Trajectory<Tensor>) -> Result<Record> {
        let record = self.update(trajectory);
        trajectory.clear();
        record
    }

    fn save_params(&self, path: &Path) -> Result<()> {
        self.policy.save(path)
    }

    fn load_params(&mut self, path: &Path) -> Result<()> {
        self.policy.load(path)
    }
}
