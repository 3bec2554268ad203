//! Command handlers
//!
//! Every handler validates its parameters and resolves the network profile
//! before it opens a connection, so bad input never reaches the node.

mod deploy;
mod verify;

use anyhow::Context;
use deploy_core::{
    resolve_profile, NetworkProfile, ProcessEnv, ProfileRequirements, RetryConfig, RuntimeConfig,
};
use deploy_pipeline::{confirmation_policy, Orchestrator, RpcChain, RunReport};
use evm_tx::ArtifactStore;
use explorer_verify::{EtherscanClient, RetryPolicy, Verifier};

use crate::cli::{Cli, Command, GlobalArgs};

/// Run the selected command and return the process exit code
pub async fn dispatch(cli: Cli) -> anyhow::Result<i32> {
    let global = cli.global;
    match cli.command {
        Command::Token(args) => deploy::token(&global, &args).await,
        Command::TokenWeth { token, fund } => deploy::token_weth(&global, &token, &fund).await,
        Command::Presale(args) => deploy::presale(&global, &args).await,
        Command::Verify(command) => verify::verify(&global, command).await,
        Command::Status { address } => verify::status(&global, &address).await,
    }
}

fn runtime_config(global: &GlobalArgs) -> RuntimeConfig {
    RuntimeConfig {
        confirmation_timeout_secs: global.timeout_secs,
        confirmations: global.confirmations,
        retry: RetryConfig {
            max_attempts: global.verify_attempts,
            ..RetryConfig::default()
        },
        ..RuntimeConfig::default()
    }
}

/// Resolved profile, live connection and optional verifier for one run
pub(crate) struct Session {
    profile: NetworkProfile,
    chain: RpcChain,
    artifacts: ArtifactStore,
    verifier: Option<Verifier<EtherscanClient>>,
}

impl Session {
    async fn open(global: &GlobalArgs, requirements: ProfileRequirements) -> anyhow::Result<Self> {
        let runtime = runtime_config(global);
        let profile = resolve_profile(&global.network, &ProcessEnv, requirements)?;

        let verifier = if requirements.explorer {
            Verifier::for_profile(&profile, RetryPolicy::from(&runtime.retry))?
        } else {
            None
        };

        let chain = RpcChain::connect(&profile, confirmation_policy(&profile, &runtime))
            .await
            .with_context(|| format!("connecting to {} at {}", profile.name, profile.rpc_url))?;

        Ok(Self {
            profile,
            chain,
            artifacts: ArtifactStore::new(&global.artifacts),
            verifier,
        })
    }

    fn orchestrator(&self) -> Orchestrator<'_, RpcChain, EtherscanClient> {
        Orchestrator::new(
            &self.profile,
            &self.chain,
            &self.artifacts,
            self.verifier.as_ref(),
        )
    }
}

/// Print the run record on stdout and the fatal errors on stderr
fn emit(report: &RunReport) -> anyhow::Result<i32> {
    println!("{}", report.to_json()?);
    for error in &report.errors {
        eprintln!("error: {}", error.message);
    }
    Ok(report.exit_code())
}
