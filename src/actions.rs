//! What the plugins do once a resource has been picked.

use std::io::Write;
use std::process::Stdio;

use k8s_openapi::api::core::v1::{ConfigMap, Secret};
use kube::ResourceExt;
use regex::{Regex, RegexBuilder};
use tokio::process::Command as TokioCommand;
use tracing::debug;

use crate::error::ActionError;

pub const RULE: &str = "-------------------------------------------";

pub fn write_config_map(
    out: &mut impl Write,
    namespace: &str,
    configmap: &ConfigMap,
) -> std::io::Result<()> {
    writeln!(
        out,
        "Contents of ConfigMap {} in namespace {namespace}:",
        configmap.name_any()
    )?;
    writeln!(out, "{RULE}")?;

    for (key, value) in configmap.data.iter().flatten() {
        writeln!(out, "{key}: {value}")?;
    }
    for (key, value) in configmap.binary_data.iter().flatten() {
        writeln!(out, "{key}: <binary, {} bytes>", value.0.len())?;
    }
    Ok(())
}

pub fn write_secret(
    out: &mut impl Write,
    namespace: &str,
    secret: &Secret,
) -> std::io::Result<()> {
    writeln!(
        out,
        "Contents of secret {} in namespace {namespace}:",
        secret.name_any()
    )?;
    writeln!(out, "{RULE}")?;

    for (key, value) in secret.data.iter().flatten() {
        writeln!(out, "{key}: {}", String::from_utf8_lossy(&value.0))?;
    }
    Ok(())
}

/// A `kubectl exec` invocation against one pod.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KubectlExec {
    pub kubectl: String,
    pub namespace: String,
    pub pod: String,
    pub container: Option<String>,
    pub interactive: bool,
    pub command: Vec<String>,
}

impl KubectlExec {
    pub fn args(&self) -> Vec<String> {
        let mut args = vec!["exec".to_string(), "-n".to_string(), self.namespace.clone()];
        if self.interactive {
            args.push("-it".to_string());
        }
        args.push(self.pod.clone());
        if let Some(container) = &self.container {
            args.push("-c".to_string());
            args.push(container.clone());
        }
        args.push("--".to_string());
        args.extend(self.command.iter().cloned());
        args
    }

    pub fn command_line(&self) -> String {
        std::iter::once(self.kubectl.clone())
            .chain(self.args())
            .collect::<Vec<_>>()
            .join(" ")
    }

    fn command(&self) -> TokioCommand {
        let mut cmd = TokioCommand::new(&self.kubectl);
        cmd.args(self.args());
        cmd
    }

    /// Runs with the operator's terminal attached.
    pub async fn run_attached(&self) -> Result<(), ActionError> {
        debug!(command = %self.command_line(), "running attached");
        let status = self
            .command()
            .stdin(Stdio::inherit())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit())
            .status()
            .await
            .map_err(|source| ActionError::Spawn {
                program: self.kubectl.clone(),
                source,
            })?;

        if status.success() {
            Ok(())
        } else {
            Err(ActionError::Exit {
                command: self.command_line(),
                status,
            })
        }
    }

    /// Runs to completion and returns stdout; stderr passes through.
    pub async fn capture(&self) -> Result<String, ActionError> {
        debug!(command = %self.command_line(), "capturing output");
        let output = self
            .command()
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::inherit())
            .output()
            .await
            .map_err(|source| ActionError::Spawn {
                program: self.kubectl.clone(),
                source,
            })?;

        if output.status.success() {
            Ok(String::from_utf8_lossy(&output.stdout).into_owned())
        } else {
            Err(ActionError::Exit {
                command: self.command_line(),
                status: output.status,
            })
        }
    }
}

/// Line filter for environment output, grep style.
#[derive(Debug, Clone)]
pub struct EnvPattern {
    pub source: String,
    pub ignore_case: bool,
    regex: Regex,
}

impl EnvPattern {
    pub fn new(source: &str, ignore_case: bool) -> Result<Self, ActionError> {
        let regex = RegexBuilder::new(source)
            .case_insensitive(ignore_case)
            .build()?;
        Ok(Self {
            source: source.to_string(),
            ignore_case,
            regex,
        })
    }

    /// `--igrep` wins when both are given.
    pub fn from_flags(
        grep: Option<&str>,
        igrep: Option<&str>,
    ) -> Result<Option<Self>, ActionError> {
        match (grep, igrep) {
            (_, Some(pattern)) => Self::new(pattern, true).map(Some),
            (Some(pattern), None) => Self::new(pattern, false).map(Some),
            (None, None) => Ok(None),
        }
    }

    pub fn flag_name(&self) -> &'static str {
        if self.ignore_case { "igrep" } else { "grep" }
    }

    pub fn is_match(&self, line: &str) -> bool {
        self.regex.is_match(line)
    }
}

pub fn filter_env<'a>(output: &'a str, pattern: Option<&EnvPattern>) -> Vec<&'a str> {
    output
        .lines()
        .filter(|line| pattern.is_none_or(|pattern| pattern.is_match(line)))
        .collect()
}
