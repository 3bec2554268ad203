//! Network profiles and runtime configuration
//!
//! Profiles come from a static table and are resolved exactly once at process
//! start. Everything that depends on the environment (signing identity,
//! explorer credentials, RPC overrides) is read here through [`Environment`]
//! and nowhere else.

use std::collections::HashMap;

use alloy_primitives::Address;
use serde::{Deserialize, Serialize};
use url::Url;

use crate::errors::{Error, Result};
use crate::types::{parse_address, PrivateKey};

/// Environment variable holding the hex private key that signs deployments
pub const DEPLOYER_PRIVATE_KEY_VAR: &str = "DEPLOYER_PRIVATE_KEY";

/// Environment variable selecting an unlocked node account on local networks
pub const DEPLOYER_ADDRESS_VAR: &str = "DEPLOYER_ADDRESS";

/// Environment variable holding the block-explorer API key
pub const EXPLORER_API_KEY_VAR: &str = "ETHERSCAN_API_KEY";

/// Source of configuration values.
pub trait Environment {
    /// Look up `key`. Unset and blank values are both `None`.
    fn var(&self, key: &str) -> Option<String>;

    fn require(&self, key: &str) -> Result<String> {
        self.var(key).ok_or_else(|| Error::missing(key))
    }
}

/// The process environment
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessEnv;

impl Environment for ProcessEnv {
    fn var(&self, key: &str) -> Option<String> {
        std::env::var(key).ok().filter(|v| !v.trim().is_empty())
    }
}

/// In-memory environment, used by tests and embedding callers
#[derive(Debug, Clone, Default)]
pub struct MapEnv(HashMap<String, String>);

impl MapEnv {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, key: &str, value: &str) -> Self {
        self.0.insert(key.to_string(), value.to_string());
        self
    }
}

impl Environment for MapEnv {
    fn var(&self, key: &str) -> Option<String> {
        self.0.get(key).filter(|v| !v.trim().is_empty()).cloned()
    }
}

/// Block-explorer endpoints for a network
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExplorerEndpoints {
    /// Verification API (e.g., "https://api.etherscan.io/v2/api")
    pub api_url: Url,
    /// Human-facing explorer (e.g., "https://holesky.etherscan.io")
    pub browser_url: Url,
}

impl ExplorerEndpoints {
    /// Browser link for a deployed address
    pub fn address_url(&self, address: &Address) -> String {
        format!(
            "{}/address/{}",
            self.browser_url.as_str().trim_end_matches('/'),
            address
        )
    }
}

/// Which account signs the transactions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SignerSource {
    /// Transactions are signed in-process and sent raw
    LocalKey(PrivateKey),
    /// An unlocked account on an ephemeral node, which signs for it
    Account(Address),
    /// The node's first unlocked account (ephemeral development nodes only)
    NodeDefault,
}

/// Which credentials the selected command needs before touching the network.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ProfileRequirements {
    pub signer: bool,
    pub explorer: bool,
}

/// A fully resolved network: endpoints plus the credentials the run needs.
/// Immutable once built.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NetworkProfile {
    pub name: String,
    pub chain_id: u64,
    pub rpc_url: Url,
    pub explorer: Option<ExplorerEndpoints>,
    /// Local/ephemeral node usable without external configuration
    pub ephemeral: bool,
    /// Blocks on top of the inclusion block before a tx counts as confirmed
    pub confirmations: u64,
    #[serde(skip)]
    pub signer: Option<SignerSource>,
    #[serde(skip_serializing)]
    pub explorer_api_key: Option<String>,
}

struct ProfileTemplate {
    name: &'static str,
    chain_id: u64,
    rpc_url: &'static str,
    explorer: Option<(&'static str, &'static str)>,
    ephemeral: bool,
    confirmations: u64,
}

/// Single multichain endpoint; requests select the network with `chainid`
const ETHERSCAN_V2_API: &str = "https://api.etherscan.io/v2/api";

const PROFILES: &[ProfileTemplate] = &[
    ProfileTemplate {
        name: "localhost",
        chain_id: 31337,
        rpc_url: "http://127.0.0.1:8545",
        explorer: None,
        ephemeral: true,
        confirmations: 1,
    },
    ProfileTemplate {
        name: "holesky",
        chain_id: 17000,
        rpc_url: "https://ethereum-holesky-rpc.publicnode.com",
        explorer: Some((ETHERSCAN_V2_API, "https://holesky.etherscan.io")),
        ephemeral: false,
        confirmations: 2,
    },
    ProfileTemplate {
        name: "sepolia",
        chain_id: 11155111,
        rpc_url: "https://ethereum-sepolia-rpc.publicnode.com",
        explorer: Some((ETHERSCAN_V2_API, "https://sepolia.etherscan.io")),
        ephemeral: false,
        confirmations: 2,
    },
    ProfileTemplate {
        name: "mainnet",
        chain_id: 1,
        rpc_url: "https://ethereum-rpc.publicnode.com",
        explorer: Some((ETHERSCAN_V2_API, "https://etherscan.io")),
        ephemeral: false,
        confirmations: 3,
    },
];

/// Names of all built-in profiles
pub fn known_networks() -> Vec<&'static str> {
    PROFILES.iter().map(|p| p.name).collect()
}

/// Environment variable that overrides a profile's RPC endpoint
pub fn rpc_override_var(network: &str) -> String {
    format!("{}_RPC_URL", network.to_ascii_uppercase())
}

/// Resolve `name` to its profile. Matching is exact; there is no fallback.
///
/// Credentials named in `requirements` must be present, otherwise this fails
/// with `MissingConfiguration` before anything talks to the network.
pub fn resolve_profile(
    name: &str,
    env: &impl Environment,
    requirements: ProfileRequirements,
) -> Result<NetworkProfile> {
    let template = PROFILES
        .iter()
        .find(|p| p.name == name)
        .ok_or_else(|| Error::UnknownNetwork {
            name: name.to_string(),
            known: known_networks().join(", "),
        })?;

    let override_var = rpc_override_var(template.name);
    let rpc_url = match env.var(&override_var) {
        Some(custom) => parse_endpoint(&override_var, &custom)?,
        None => parse_endpoint("rpc_url", template.rpc_url)?,
    };

    let explorer = match template.explorer {
        Some((api, browser)) => Some(ExplorerEndpoints {
            api_url: parse_endpoint("explorer.api_url", api)?,
            browser_url: parse_endpoint("explorer.browser_url", browser)?,
        }),
        None => None,
    };

    let signer = if requirements.signer {
        Some(resolve_signer(template.ephemeral, env)?)
    } else {
        None
    };

    let explorer_api_key = if requirements.explorer && explorer.is_some() {
        Some(env.require(EXPLORER_API_KEY_VAR)?)
    } else {
        env.var(EXPLORER_API_KEY_VAR)
    };

    Ok(NetworkProfile {
        name: template.name.to_string(),
        chain_id: template.chain_id,
        rpc_url,
        explorer,
        ephemeral: template.ephemeral,
        confirmations: template.confirmations,
        signer,
        explorer_api_key,
    })
}

/// A private key wins everywhere. Without one, only ephemeral nodes can sign,
/// for `DEPLOYER_ADDRESS` or their first unlocked account.
fn resolve_signer(ephemeral: bool, env: &impl Environment) -> Result<SignerSource> {
    if let Some(raw) = env.var(DEPLOYER_PRIVATE_KEY_VAR) {
        return Ok(SignerSource::LocalKey(PrivateKey::parse(
            DEPLOYER_PRIVATE_KEY_VAR,
            &raw,
        )?));
    }
    if !ephemeral {
        return Err(Error::missing(DEPLOYER_PRIVATE_KEY_VAR));
    }
    match env.var(DEPLOYER_ADDRESS_VAR) {
        Some(value) => Ok(SignerSource::Account(parse_address(
            DEPLOYER_ADDRESS_VAR,
            &value,
        )?)),
        None => Ok(SignerSource::NodeDefault),
    }
}

/// Validate that a URL is well-formed and uses HTTP or HTTPS.
fn parse_endpoint(field: &str, raw: &str) -> Result<Url> {
    let url = Url::parse(raw).map_err(|e| Error::invalid(field, format!("{}: {}", raw, e)))?;
    match url.scheme() {
        "http" | "https" if url.host().is_some() => Ok(url),
        _ => Err(Error::invalid(
            field,
            format!("{} must be an http(s) URL", raw),
        )),
    }
}

/// Retry policy for explorer verification
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetryConfig {
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,
    #[serde(default = "default_initial_delay_ms")]
    pub initial_delay_ms: u64,
    #[serde(default = "default_max_delay_ms")]
    pub max_delay_ms: u64,
}

fn default_max_attempts() -> u32 {
    10
}

fn default_initial_delay_ms() -> u64 {
    5_000
}

fn default_max_delay_ms() -> u64 {
    30_000
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: default_max_attempts(),
            initial_delay_ms: default_initial_delay_ms(),
            max_delay_ms: default_max_delay_ms(),
        }
    }
}

/// Timing knobs for a run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RuntimeConfig {
    /// How often to poll for receipts (milliseconds)
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,

    /// How long to wait for a transaction before giving up on it (seconds)
    #[serde(default = "default_confirmation_timeout_secs")]
    pub confirmation_timeout_secs: u64,

    /// Overrides the profile's confirmation depth
    #[serde(default)]
    pub confirmations: Option<u64>,

    #[serde(default)]
    pub retry: RetryConfig,
}

fn default_poll_interval_ms() -> u64 {
    2_000
}

fn default_confirmation_timeout_secs() -> u64 {
    300
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            poll_interval_ms: default_poll_interval_ms(),
            confirmation_timeout_secs: default_confirmation_timeout_secs(),
            confirmations: None,
            retry: RetryConfig::default(),
        }
    }
}
