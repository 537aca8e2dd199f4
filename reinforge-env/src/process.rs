//! Environment running in a child process.
//!
//! Requests and responses are single-line JSON objects:
//!
//! | request | response |
//! |---|---|
//! | `{"op":"init","seed":s}` | `{"actions":["name",..],"obs_dim":F}` |
//! | `{"op":"reset"}` | `{"obs":[..]}` |
//! | `{"op":"step","action":i}` | `{"obs":[..],"reward":r,"done":b,"info":{..}}` |
//!
//! Any request may be answered with `{"error":"message"}`.
use anyhow::{bail, Context, Result};
use log::{debug, info, warn};
use reinforge_core::{Act, ActionTable, Env, Info, Obs, Step};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use std::{
    fs::File,
    io::{BufRead, BufReader, BufWriter, Write},
    path::Path,
    process::{Child, ChildStdin, ChildStdout, Command, Stdio},
};

/// Configuration of [`ProcessEnv`].
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Default)]
pub struct ProcessEnvConfig {
    /// Program to run.
    pub command: String,

    /// Arguments of the program.
    #[serde(default)]
    pub args: Vec<String>,
}

impl ProcessEnvConfig {
    /// Creates a configuration running `command` without arguments.
    pub fn new(command: impl Into<String>) -> Self {
        Self {
            command: command.into(),
            args: vec![],
        }
    }

    /// Sets arguments of the program.
    pub fn args<S: Into<String>>(mut self, args: impl IntoIterator<Item = S>) -> Self {
        self.args = args.into_iter().map(Into::into).collect();
        self
    }

    /// Parses a shell-like command line into program and arguments,
    /// splitting on whitespace.
    pub fn from_command_line(line: &str) -> Result<Self> {
        let mut words = line.split_whitespace();
        let command = words.next().context("empty environment command")?;
        Ok(Self::new(command).args(words))
    }

    /// Constructs [`ProcessEnvConfig`] from YAML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let file = File::open(path)?;
        let rdr = BufReader::new(file);
        let b = serde_yaml::from_reader(rdr)?;
        Ok(b)
    }

    /// Saves [`ProcessEnvConfig`] as a YAML file.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let mut file = File::create(path)?;
        file.write_all(serde_yaml::to_string(&self)?.as_bytes())?;
        Ok(())
    }
}

#[derive(Serialize)]
#[serde(tag = "op", rename_all = "lowercase")]
enum Request {
    Init { seed: i64 },
    Reset,
    Step { action: usize },
}

#[derive(Deserialize)]
struct InitResponse {
    actions: Vec<String>,
    obs_dim: usize,
}

#[derive(Deserialize)]
struct ResetResponse {
    obs: Vec<f32>,
}

#[derive(Deserialize)]
struct StepResponse {
    obs: Vec<f32>,
    reward: f32,
    done: bool,
    #[serde(default)]
    truncated: bool,
    #[serde(default)]
    info: serde_json::Value,
}

/// Information returned by the environment process with each step.
#[derive(Debug, Clone, PartialEq)]
pub struct ProcessInfo(pub serde_json::Value);

impl Info for ProcessInfo {}

/// Environment served by a child process over its stdin and stdout.
///
/// The child's stderr is inherited. The child is killed when the environment
/// is dropped.
pub struct ProcessEnv {
    child: Child,
    stdin: BufWriter<ChildStdin>,
    stdout: BufReader<ChildStdout>,
    table: ActionTable,
    obs_dim: usize,
}

impl ProcessEnv {
    fn request<T: DeserializeOwned>(&mut self, request: &Request) -> Result<T> {
        send(&mut self.stdin, request)?;
        receive(&mut self.stdout)
    }
}

fn send(stdin: &mut BufWriter<ChildStdin>, request: &Request) -> Result<()> {
    let line = serde_json::to_string(request)?;
    writeln!(stdin, "{}", line).context("failed to write to the environment process")?;
    stdin.flush()?;
    Ok(())
}

fn receive<T: DeserializeOwned>(stdout: &mut BufReader<ChildStdout>) -> Result<T> {
    let mut line = String::new();
    if stdout.read_line(&mut line)? == 0 {
        bail!("environment process closed its output");
    }
    let value: serde_json::Value = serde_json::from_str(line.trim())
        .with_context(|| format!("malformed response {:?}", line.trim()))?;
    if let Some(msg) = value.get("error") {
        bail!("environment process reported an error: {}", msg);
    }
    serde_json::from_value(value).with_context(|| format!("unexpected response {:?}", line.trim()))
}

impl Env for ProcessEnv {
    type Config = ProcessEnvConfig;
    type Info = ProcessInfo;

    fn build(config: &Self::Config, seed: i64) -> Result<Self> {
        let mut child = Command::new(&config.command)
            .args(&config.args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::inherit())
            .spawn()
            .with_context(|| format!("failed to spawn {:?}", config.command))?;
        let mut stdin = BufWriter::new(child.stdin.take().context("no stdin of the child")?);
        let mut stdout = BufReader::new(child.stdout.take().context("no stdout of the child")?);

        let init = send(&mut stdin, &Request::Init { seed })
            .and_then(|_| receive::<InitResponse>(&mut stdout))
            .and_then(|init| Ok((ActionTable::new(init.actions)?, init.obs_dim)));
        let (table, obs_dim) = match init {
            Ok(v) => v,
            Err(e) => {
                let _ = child.kill();
                let _ = child.wait();
                return Err(e.context(format!("handshake with {:?} failed", config.command)));
            }
        };
        info!(
            "Started environment process {:?} (pid {}) with {} actions and {} features",
            config.command,
            child.id(),
            table.len(),
            obs_dim
        );

        Ok(Self {
            child,
            stdin,
            stdout,
            table,
            obs_dim,
        })
    }

    fn reset(&mut self) -> Result<Obs> {
        let res: ResetResponse = self.request(&Request::Reset)?;
        Ok(Obs(res.obs))
    }

    fn step(&mut self, act: &Act) -> Result<Step<Self>> {
        if act.index() >= self.table.len() {
            bail!("action {} is out of range", act.index());
        }
        let res: StepResponse = self.request(&Request::Step {
            action: act.index(),
        })?;
        Ok(Step::new(
            Obs(res.obs),
            *act,
            res.reward,
            res.done,
            res.truncated,
            ProcessInfo(res.info),
        ))
    }

    fn action_table(&self) -> &ActionTable {
        &self.table
    }

    fn obs_dim(&self) -> usize {
        self.obs_dim
    }
}

impl Drop for ProcessEnv {
    fn drop(&mut self) {
        match self.child.kill() {
            Ok(()) => {
                let _ = self.child.wait();
                debug!("Killed environment process {}", self.child.id());
            }
            Err(e) => warn!("Failed to kill environment process: {}", e),
        }
    }
}
