//! The routability evaluator contract and its process backend.

use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::process::Command;

use fabex_config::EvaluatorConfig;

use crate::error::EvalError;

/// One evaluator invocation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EvalRequest<'a> {
    /// Routing-resource graph dumped by the router for the architecture.
    pub rr_graph: &'a Path,
    /// Demand multiplier; `None` lets the evaluator pick its own.
    pub demand: Option<f64>,
    /// Input connection-block flexibility.
    pub fc_in: f64,
    /// Output connection-block flexibility.
    pub fc_out: f64,
}

/// A routability evaluator: takes a request, returns the evaluator's text output.
///
/// Implementations block until the evaluation finishes.
pub trait Evaluator: Send + Sync {
    /// Runs one evaluation.
    ///
    /// # Errors
    ///
    /// Any failure, including a non-zero exit, is fatal for the point.
    fn evaluate(&self, request: &EvalRequest<'_>) -> Result<String, EvalError>;
}

/// Formats a number the way the tools were always fed (`5.0`, `0.3`).
pub(crate) fn number(v: f64) -> String {
    format!("{v:?}")
}

/// Runs the evaluator executable once per request.
#[derive(Debug, Clone)]
pub struct ProcessEvaluator {
    program: PathBuf,
    settings: EvaluatorConfig,
}

impl ProcessEvaluator {
    /// Creates an evaluator backend for the given executable and fixed options.
    pub fn new(program: impl Into<PathBuf>, settings: EvaluatorConfig) -> Self {
        Self {
            program: program.into(),
            settings,
        }
    }

    /// Returns the command-line arguments for a request.
    pub fn args(&self, request: &EvalRequest<'_>) -> Vec<OsString> {
        let mut args: Vec<OsString> = vec![
            "-rr_graph_file".into(),
            request.rr_graph.into(),
            "-threads".into(),
            self.settings.threads.to_string().into(),
        ];
        if let Some(demand) = request.demand {
            args.push("-demand_multiplier".into());
            args.push(number(demand).into());
        }
        args.push("-max_connection_length".into());
        args.push(self.settings.max_connection_length.to_string().into());
        if self.settings.nodisp {
            args.push("-nodisp".into());
        }
        args.push("-fc_in".into());
        args.push(number(request.fc_in).into());
        args.push("-fc_out".into());
        args.push(number(request.fc_out).into());
        args
    }
}

impl Evaluator for ProcessEvaluator {
    fn evaluate(&self, request: &EvalRequest<'_>) -> Result<String, EvalError> {
        let output = run_program(&self.program, &self.args(request), None)?;
        if output.status != 0 {
            return Err(EvalError::Failed {
                program: self.program.clone(),
                status: output.status,
                stderr: output.stderr,
            });
        }
        Ok(output.stdout)
    }
}

/// Captured result of an external program run.
#[derive(Debug, Clone)]
pub(crate) struct ProgramOutput {
    pub status: i32,
    pub stdout: String,
    pub stderr: String,
}

/// Runs `program` to completion, optionally inside `cwd`.
pub(crate) fn run_program(
    program: &Path,
    args: &[OsString],
    cwd: Option<&Path>,
) -> Result<ProgramOutput, EvalError> {
    tracing::debug!(program = %program.display(), ?args, "running");
    let mut command = Command::new(program);
    command.args(args);
    if let Some(dir) = cwd {
        command.current_dir(dir);
    }
    let output = command.output().map_err(|source| EvalError::Spawn {
        program: program.to_path_buf(),
        source,
    })?;
    Ok(ProgramOutput {
        status: output.status.code().unwrap_or(-1),
        stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
        stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strings(args: Vec<OsString>) -> Vec<String> {
        args.into_iter()
            .map(|a| a.to_string_lossy().into_owned())
            .collect()
    }

    #[test]
    fn arguments_with_demand() {
        let eval = ProcessEvaluator::new("wotan", EvaluatorConfig::default());
        let req = EvalRequest {
            rr_graph: Path::new("/w/run0/dumped_rr_graph.xml"),
            demand: Some(5.0),
            fc_in: 0.3,
            fc_out: 0.6,
        };
        assert_eq!(
            strings(eval.args(&req)),
            [
                "-rr_graph_file",
                "/w/run0/dumped_rr_graph.xml",
                "-threads",
                "1",
                "-demand_multiplier",
                "5.0",
                "-max_connection_length",
                "2",
                "-nodisp",
                "-fc_in",
                "0.3",
                "-fc_out",
                "0.6",
            ]
        );
    }

    #[test]
    fn arguments_without_demand_or_nodisp() {
        let settings = EvaluatorConfig {
            threads: 4,
            max_connection_length: 3,
            nodisp: false,
        };
        let eval = ProcessEvaluator::new("wotan", settings);
        let req = EvalRequest {
            rr_graph: Path::new("rr.xml"),
            demand: None,
            fc_in: 1.0,
            fc_out: 0.05,
        };
        let args = strings(eval.args(&req));
        assert!(!args.iter().any(|a| a == "-demand_multiplier" || a == "-nodisp"));
        assert_eq!(args[3], "4");
        assert_eq!(&args[args.len() - 4..], ["-fc_in", "1.0", "-fc_out", "0.05"]);
    }

    #[test]
    fn missing_executable_is_a_spawn_error() {
        let eval = ProcessEvaluator::new("/nonexistent/wotan", EvaluatorConfig::default());
        let req = EvalRequest {
            rr_graph: Path::new("rr.xml"),
            demand: Some(1.0),
            fc_in: 0.1,
            fc_out: 0.1,
        };
        assert!(matches!(eval.evaluate(&req), Err(EvalError::Spawn { .. })));
    }
}
