//! Command-line surface

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(name = "deployer", version, about = "Deploy and verify KingToken, WETH9 and PreSale")]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalArgs,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Args, Debug, Clone)]
pub struct GlobalArgs {
    /// Network profile: localhost, holesky, sepolia or mainnet
    #[arg(
        long,
        short,
        global = true,
        env = "DEPLOY_NETWORK",
        default_value = "localhost",
        help_heading = "Network"
    )]
    pub network: String,

    /// Hardhat artifacts directory
    #[arg(
        long,
        global = true,
        env = "DEPLOY_ARTIFACTS",
        default_value = "artifacts",
        value_name = "PATH"
    )]
    pub artifacts: PathBuf,

    /// Skip explorer verification
    #[arg(long, global = true)]
    pub no_verify: bool,

    /// Blocks to wait for, overriding the profile default
    #[arg(long, global = true, value_name = "BLOCKS", help_heading = "Network")]
    pub confirmations: Option<u64>,

    /// Give up waiting for a transaction after this long
    #[arg(
        long,
        global = true,
        default_value_t = 300,
        value_name = "SECONDS",
        help_heading = "Network"
    )]
    pub timeout_secs: u64,

    /// Explorer submit/poll attempts before verification is abandoned
    #[arg(long, global = true, default_value_t = 10, value_name = "N")]
    pub verify_attempts: u32,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Deploy KingToken
    Token(TokenArgs),

    /// Deploy KingToken and WETH9, then wrap native currency into WETH9
    TokenWeth {
        #[command(flatten)]
        token: TokenArgs,

        /// Native amount to deposit into WETH9, e.g. 0.5 (0 skips funding)
        #[arg(long, default_value = "0.01", value_name = "AMOUNT")]
        fund: String,
    },

    /// Deploy PreSale against existing weth, token and router contracts
    Presale(PresaleArgs),

    /// Verify a contract deployed earlier
    #[command(subcommand)]
    Verify(VerifyCommand),

    /// Check whether contract code exists at an address
    Status {
        #[arg(long)]
        address: String,
    },
}

#[derive(Subcommand, Debug)]
pub enum VerifyCommand {
    Token {
        #[arg(long)]
        address: String,
        #[command(flatten)]
        params: TokenArgs,
    },
    Weth {
        #[arg(long)]
        address: String,
    },
    Presale {
        #[arg(long)]
        address: String,
        #[command(flatten)]
        params: PresaleArgs,
    },
}

#[derive(Args, Debug, Clone)]
pub struct TokenArgs {
    #[arg(long, default_value = token::constants::DEFAULT_NAME, help_heading = "Token")]
    pub name: String,

    #[arg(long, default_value = token::constants::DEFAULT_SYMBOL, help_heading = "Token")]
    pub symbol: String,

    /// Whole tokens; the contract applies the decimals
    #[arg(long, default_value = token::constants::DEFAULT_TOTAL_SUPPLY, help_heading = "Token")]
    pub total_supply: String,

    #[arg(long, default_value_t = token::constants::DEFAULT_DECIMALS, help_heading = "Token")]
    pub decimals: u8,
}

impl TokenArgs {
    pub fn to_raw(&self) -> token::RawTokenParams {
        token::RawTokenParams {
            name: self.name.clone(),
            symbol: self.symbol.clone(),
            total_supply: self.total_supply.clone(),
            decimals: self.decimals,
        }
    }
}

#[derive(Args, Debug, Clone)]
pub struct PresaleArgs {
    /// Existing WETH contract
    #[arg(long, env = "PRESALE_WETH", help_heading = "Dependencies")]
    pub weth: String,

    /// Existing sale token contract
    #[arg(long, env = "PRESALE_TOKEN", help_heading = "Dependencies")]
    pub token: String,

    /// Existing AMM router contract
    #[arg(long, env = "PRESALE_ROUTER", help_heading = "Dependencies")]
    pub router: String,

    /// Decimals of the sale token, used to scale the deposit and rate
    #[arg(long, default_value_t = 18, help_heading = "Sale")]
    pub token_decimals: u8,

    /// Tokens deposited for sale and liquidity
    #[arg(long, default_value = presale::constants::DEFAULT_TOKEN_DEPOSIT, help_heading = "Sale")]
    pub token_deposit: String,

    #[arg(long, default_value = presale::constants::DEFAULT_HARD_CAP, help_heading = "Sale")]
    pub hard_cap: String,

    #[arg(long, default_value = presale::constants::DEFAULT_SOFT_CAP, help_heading = "Sale")]
    pub soft_cap: String,

    #[arg(long, default_value = presale::constants::DEFAULT_MAX_CONTRIBUTION, help_heading = "Sale")]
    pub max_contribution: String,

    #[arg(long, default_value = presale::constants::DEFAULT_MIN_CONTRIBUTION, help_heading = "Sale")]
    pub min_contribution: String,

    /// Sale opens (unix seconds)
    #[arg(long, help_heading = "Sale")]
    pub start: u64,

    /// Sale closes (unix seconds)
    #[arg(long, help_heading = "Sale")]
    pub end: u64,

    /// Share of the raise paired into liquidity, in basis points
    #[arg(long, default_value_t = presale::constants::DEFAULT_LIQUIDITY_BPS, help_heading = "Sale")]
    pub liquidity_bps: u32,

    /// Tokens per whole native unit; checks the deposit covers the sale
    #[arg(long, help_heading = "Sale")]
    pub rate: Option<String>,
}

impl PresaleArgs {
    pub fn to_raw(&self) -> presale::RawPresaleParams {
        presale::RawPresaleParams {
            token_deposit: self.token_deposit.clone(),
            hard_cap: self.hard_cap.clone(),
            soft_cap: self.soft_cap.clone(),
            max_contribution: self.max_contribution.clone(),
            min_contribution: self.min_contribution.clone(),
            start_timestamp: self.start,
            end_timestamp: self.end,
            liquidity_bps: self.liquidity_bps,
            rate: self.rate.clone(),
        }
    }
}
