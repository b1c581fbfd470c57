use std::io::{self, Write};

use clap::Args;
use k8s_openapi::api::core::v1::{ConfigMap, Pod, Secret};
use kube::ResourceExt;

use crate::actions::{self, EnvPattern, KubectlExec, RULE};
use crate::cli::NoArgs;
use crate::config::PluginConfig;
use crate::error::{ActionError, ClusterError};
use crate::k8s::ClusterClient;
use crate::plugin::Plugin;

/// `kubectl cat-configmap`
#[derive(Debug)]
pub struct CatConfigMap;

impl Plugin for CatConfigMap {
    type Args = NoArgs;
    type Resource = ConfigMap;

    const NAME: &'static str = "cat-configmap";
    const ABOUT: &'static str =
        "Fuzzy-select a namespace and ConfigMap, then print its data to stdout.";
    const NOUN: &'static str = "ConfigMap";
    const PLURAL: &'static str = "ConfigMaps";

    fn new(_args: NoArgs, _config: &PluginConfig) -> Result<Self, ActionError> {
        Ok(Self)
    }

    async fn list<C: ClusterClient>(
        cluster: &C,
        namespace: &str,
    ) -> Result<Vec<ConfigMap>, ClusterError> {
        cluster.list_config_maps(namespace).await
    }

    async fn act(&self, namespace: &str, resource: ConfigMap) -> Result<(), ActionError> {
        let mut out = io::stdout().lock();
        actions::write_config_map(&mut out, namespace, &resource)?;
        out.flush()?;
        Ok(())
    }
}

/// `kubectl cat-secret`
#[derive(Debug)]
pub struct CatSecret;

impl Plugin for CatSecret {
    type Args = NoArgs;
    type Resource = Secret;

    const NAME: &'static str = "cat-secret";
    const ABOUT: &'static str =
        "Fuzzy-select a namespace and secret, then print its decoded data to stdout.";
    const NOUN: &'static str = "secret";
    const PLURAL: &'static str = "secrets";

    fn new(_args: NoArgs, _config: &PluginConfig) -> Result<Self, ActionError> {
        Ok(Self)
    }

    async fn list<C: ClusterClient>(
        cluster: &C,
        namespace: &str,
    ) -> Result<Vec<Secret>, ClusterError> {
        cluster.list_secrets(namespace).await
    }

    async fn act(&self, namespace: &str, resource: Secret) -> Result<(), ActionError> {
        let mut out = io::stdout().lock();
        actions::write_secret(&mut out, namespace, &resource)?;
        out.flush()?;
        Ok(())
    }
}

#[derive(Debug, Clone, Default, Args)]
pub struct PodExecArgs {
    /// Shell to start in the pod (defaults to the configured shell, /bin/sh)
    #[arg(long)]
    pub shell: Option<String>,

    /// Container to exec into; kubectl picks the default container when unset
    #[arg(short, long)]
    pub container: Option<String>,
}

/// `kubectl pod-exec`
#[derive(Debug)]
pub struct PodExec {
    kubectl: String,
    shell: String,
    container: Option<String>,
}

impl PodExec {
    pub fn exec_for(&self, namespace: &str, pod: &str) -> KubectlExec {
        KubectlExec {
            kubectl: self.kubectl.clone(),
            namespace: namespace.to_string(),
            pod: pod.to_string(),
            container: self.container.clone(),
            interactive: true,
            command: vec![self.shell.clone()],
        }
    }
}

impl Plugin for PodExec {
    type Args = PodExecArgs;
    type Resource = Pod;

    const NAME: &'static str = "pod-exec";
    const ABOUT: &'static str = "Fuzzy-select a namespace and pod, then exec into the pod.";
    const NOUN: &'static str = "pod";
    const PLURAL: &'static str = "pods";

    fn new(args: PodExecArgs, config: &PluginConfig) -> Result<Self, ActionError> {
        Ok(Self {
            kubectl: config.kubectl.clone(),
            shell: args.shell.unwrap_or_else(|| config.shell.clone()),
            container: args.container,
        })
    }

    async fn list<C: ClusterClient>(
        cluster: &C,
        namespace: &str,
    ) -> Result<Vec<Pod>, ClusterError> {
        cluster.list_pods(namespace).await
    }

    async fn act(&self, namespace: &str, resource: Pod) -> Result<(), ActionError> {
        let pod = resource.name_any();
        println!("Executing shell in pod {namespace}/{pod}...");
        self.exec_for(namespace, &pod).run_attached().await
    }
}

#[derive(Debug, Clone, Default, Args)]
pub struct PodPrintEnvsArgs {
    /// Filter output by pattern
    #[arg(long)]
    pub grep: Option<String>,

    /// Filter output by pattern case insensitive
    #[arg(long)]
    pub igrep: Option<String>,

    /// Container to read the environment from
    #[arg(short, long)]
    pub container: Option<String>,
}

/// `kubectl pod-print-envs`
#[derive(Debug)]
pub struct PodPrintEnvs {
    kubectl: String,
    container: Option<String>,
    pattern: Option<EnvPattern>,
}

impl PodPrintEnvs {
    pub fn exec_for(&self, namespace: &str, pod: &str) -> KubectlExec {
        KubectlExec {
            kubectl: self.kubectl.clone(),
            namespace: namespace.to_string(),
            pod: pod.to_string(),
            container: self.container.clone(),
            interactive: false,
            command: vec!["env".to_string()],
        }
    }

    pub fn write_report(
        &self,
        out: &mut impl Write,
        exec: &KubectlExec,
        env_output: &str,
    ) -> io::Result<()> {
        writeln!(out, "Kubectl Command: {}", exec.command_line())?;
        writeln!(
            out,
            "Environment variables in the pod {}/{}:",
            exec.namespace, exec.pod
        )?;
        writeln!(out, "{RULE}")?;
        for line in actions::filter_env(env_output, self.pattern.as_ref()) {
            writeln!(out, "{line}")?;
        }
        Ok(())
    }
}

impl Plugin for PodPrintEnvs {
    type Args = PodPrintEnvsArgs;
    type Resource = Pod;

    const NAME: &'static str = "pod-print-envs";
    const ABOUT: &'static str =
        "Fuzzy-select a namespace and pod, then print its environment variables.";
    const NOUN: &'static str = "pod";
    const PLURAL: &'static str = "pods";

    fn new(args: PodPrintEnvsArgs, config: &PluginConfig) -> Result<Self, ActionError> {
        let pattern = EnvPattern::from_flags(args.grep.as_deref(), args.igrep.as_deref())?;
        Ok(Self {
            kubectl: config.kubectl.clone(),
            container: args.container,
            pattern,
        })
    }

    async fn list<C: ClusterClient>(
        cluster: &C,
        namespace: &str,
    ) -> Result<Vec<Pod>, ClusterError> {
        cluster.list_pods(namespace).await
    }

    fn announce(&self, out: &mut impl Write) -> io::Result<()> {
        if let Some(pattern) = &self.pattern {
            writeln!(
                out,
                "Filtering with {}: '{}'",
                pattern.flag_name(),
                pattern.source
            )?;
        }
        out.flush()
    }

    async fn act(&self, namespace: &str, resource: Pod) -> Result<(), ActionError> {
        let exec = self.exec_for(namespace, &resource.name_any());
        let env_output = exec.capture().await?;
        let mut out = io::stdout().lock();
        self.write_report(&mut out, &exec, &env_output)?;
        out.flush()?;
        Ok(())
    }
}
