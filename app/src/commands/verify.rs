//! verify and status: operate on contracts that already exist

use anyhow::bail;
use deploy_core::{parse_address, parse_contract_address, ProfileRequirements};
use presale::{PresaleDependencies, PresaleParameters};
use token::TokenParams;
use weth::WethParams;

use super::{emit, Session};
use crate::cli::{GlobalArgs, VerifyCommand};

pub async fn verify(global: &GlobalArgs, command: VerifyCommand) -> anyhow::Result<i32> {
    if global.no_verify {
        bail!("--no-verify cannot be combined with the verify command");
    }

    let (spec, address) = match command {
        VerifyCommand::Token { address, params } => (
            TokenParams::build(&params.to_raw())?,
            parse_contract_address("address", &address)?,
        ),
        VerifyCommand::Weth { address } => (
            WethParams::build(),
            parse_contract_address("address", &address)?,
        ),
        VerifyCommand::Presale { address, params } => {
            let deps = PresaleDependencies::parse(&params.weth, &params.token, &params.router)?;
            let spec = PresaleParameters::from_raw(&params.to_raw(), params.token_decimals)?
                .into_spec(&deps);
            (spec, parse_contract_address("address", &address)?)
        }
    };

    let requirements = ProfileRequirements {
        signer: false,
        explorer: true,
    };
    let session = Session::open(global, requirements).await?;
    let report = session.orchestrator().verify_existing(spec, address).await;
    emit(&report)
}

pub async fn status(global: &GlobalArgs, address: &str) -> anyhow::Result<i32> {
    let address = parse_address("address", address)?;

    let session = Session::open(global, ProfileRequirements::default()).await?;
    let status = session.orchestrator().check_status(address).await?;
    println!("{}", serde_json::to_string_pretty(&status)?);
    Ok(status.exit_code())
}
