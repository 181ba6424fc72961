use serde::{Deserialize, Serialize};
use std::io::Read;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use std::str::FromStr;
use std::thread;
use std::time::Duration;
use thiserror::Error;
use tracing::debug;
use wait_timeout::ChildExt;

pub const DEFAULT_BINARY: &str = "TMalign";
pub const DEFAULT_EXTENSION: &str = "pdb";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);

/// How the aligner's raw score maps onto `[0, 1]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ScoreScale {
    /// Scores already lie in `[0, 1]`.
    #[default]
    Unit,
    /// Scores lie in `[-1, 1]` and are rescaled by `(v + 1) / 2`.
    Signed,
}

impl ScoreScale {
    pub fn normalize(&self, raw: f64) -> Option<f64> {
        let (lo, hi) = match self {
            Self::Unit => (0.0, 1.0),
            Self::Signed => (-1.0, 1.0),
        };
        if !(lo..=hi).contains(&raw) {
            return None;
        }
        Some(match self {
            Self::Unit => raw,
            Self::Signed => (raw + 1.0) / 2.0,
        })
    }
}

impl FromStr for ScoreScale {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "unit" => Ok(Self::Unit),
            "signed" => Ok(Self::Signed),
            other => Err(format!("unknown score scale '{other}' (expected 'unit' or 'signed')")),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TmAlignOptions {
    /// Binary name looked up on `PATH`, or an explicit path.
    pub binary: String,
    pub structure_dir: Option<PathBuf>,
    pub extension: String,
    pub timeout: Duration,
    pub scale: ScoreScale,
}

impl Default for TmAlignOptions {
    fn default() -> Self {
        Self {
            binary: DEFAULT_BINARY.to_string(),
            structure_dir: None,
            extension: DEFAULT_EXTENSION.to_string(),
            timeout: DEFAULT_TIMEOUT,
            scale: ScoreScale::Unit,
        }
    }
}

#[derive(Debug, Error)]
pub enum TmAlignError {
    #[error("structure file not found: {0}")]
    StructureMissing(PathBuf),
    #[error("failed to launch '{binary}': {source}")]
    Spawn {
        binary: String,
        source: std::io::Error,
    },
    #[error("aligner exceeded the {0:?} timeout and was killed")]
    Timeout(Duration),
    #[error("aligner exited with status {0}")]
    ExitStatus(String),
    #[error("no usable TM-score in aligner output")]
    Unparsable,
}

/// Resolves the aligner binary: explicit paths must point at a file, bare
/// names are searched on `PATH`.
pub fn locate_binary(binary: &str) -> Option<PathBuf> {
    let candidate = Path::new(binary);
    if candidate.components().count() > 1 || candidate.is_absolute() {
        return candidate.is_file().then(|| candidate.to_path_buf());
    }
    which::which(binary).ok()
}

/// Runs an external structural aligner on pairs of structure files.
#[derive(Debug, Clone, PartialEq)]
pub struct TmAlignScorer {
    binary: PathBuf,
    structure_dir: PathBuf,
    extension: String,
    timeout: Duration,
    scale: ScoreScale,
}

impl TmAlignScorer {
    pub fn new(binary: PathBuf, structure_dir: PathBuf) -> Self {
        Self {
            binary,
            structure_dir,
            extension: DEFAULT_EXTENSION.to_string(),
            timeout: DEFAULT_TIMEOUT,
            scale: ScoreScale::Unit,
        }
    }

    pub fn with_extension(mut self, extension: &str) -> Self {
        self.extension = extension.trim_start_matches('.').to_string();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_scale(mut self, scale: ScoreScale) -> Self {
        self.scale = scale;
        self
    }

    pub fn binary(&self) -> &Path {
        &self.binary
    }

    pub fn structure_path(&self, structure_id: &str) -> PathBuf {
        self.structure_dir
            .join(format!("{}.{}", structure_id.to_lowercase(), self.extension))
    }

    pub fn score(&self, structure_a: &str, structure_b: &str) -> Result<f64, TmAlignError> {
        let path_a = self.structure_path(structure_a);
        let path_b = self.structure_path(structure_b);
        for path in [&path_a, &path_b] {
            if !path.is_file() {
                return Err(TmAlignError::StructureMissing(path.clone()));
            }
        }

        let output = self.run(&path_a, &path_b)?;
        let raw = parse_tm_score(&output).ok_or(TmAlignError::Unparsable)?;
        self.scale.normalize(raw).ok_or(TmAlignError::Unparsable)
    }

    fn run(&self, path_a: &Path, path_b: &Path) -> Result<String, TmAlignError> {
        debug!(
            binary = %self.binary.display(),
            a = %path_a.display(),
            b = %path_b.display(),
            "Invoking structural aligner."
        );
        let mut child = Command::new(&self.binary)
            .arg(path_a)
            .arg(path_b)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .spawn()
            .map_err(|e| TmAlignError::Spawn {
                binary: self.binary.display().to_string(),
                source: e,
            })?;

        // Drained concurrently: the child stalls once the pipe buffer fills.
        let pipe = child.stdout.take();
        let reader = thread::spawn(move || -> std::io::Result<String> {
            let mut stdout = String::new();
            if let Some(mut pipe) = pipe {
                pipe.read_to_string(&mut stdout)?;
            }
            Ok(stdout)
        });

        let status = match child.wait_timeout(self.timeout) {
            Ok(Some(status)) => status,
            Ok(None) => {
                let _ = child.kill();
                let _ = child.wait();
                return Err(TmAlignError::Timeout(self.timeout));
            }
            Err(e) => {
                let _ = child.kill();
                let _ = child.wait();
                return Err(TmAlignError::Spawn {
                    binary: self.binary.display().to_string(),
                    source: e,
                });
            }
        };

        let stdout = reader
            .join()
            .map_err(|_| TmAlignError::Unparsable)?
            .map_err(|_| TmAlignError::Unparsable)?;
        if !status.success() {
            return Err(TmAlignError::ExitStatus(status.to_string()));
        }
        Ok(stdout)
    }
}

/// Extracts the TM-score from aligner output, preferring the value
/// normalized by the length of the first chain.
pub fn parse_tm_score(output: &str) -> Option<f64> {
    let scores: Vec<(&str, f64)> = output
        .lines()
        .filter_map(|line| {
            let (_, rest) = line.split_once("TM-score=")?;
            let value = rest.split_whitespace().next()?.parse::<f64>().ok()?;
            value.is_finite().then_some((line, value))
        })
        .collect();

    scores
        .iter()
        .find(|(line, _)| line.contains("Chain_1"))
        .or_else(|| scores.first())
        .map(|&(_, value)| value)
}
