//! token, token-weth and presale pipelines

use deploy_core::ProfileRequirements;
use presale::{PresaleDependencies, PresaleParameters};
use token::TokenParams;
use weth::{funding_calls, parse_funding_amount, WethParams};

use super::{emit, Session};
use crate::cli::{GlobalArgs, PresaleArgs, TokenArgs};

fn requirements(global: &GlobalArgs) -> ProfileRequirements {
    ProfileRequirements {
        signer: true,
        explorer: !global.no_verify,
    }
}

pub async fn token(global: &GlobalArgs, args: &TokenArgs) -> anyhow::Result<i32> {
    let spec = TokenParams::build(&args.to_raw())?;

    let session = Session::open(global, requirements(global)).await?;
    let report = session.orchestrator().run_token(spec).await;
    emit(&report)
}

pub async fn token_weth(global: &GlobalArgs, args: &TokenArgs, fund: &str) -> anyhow::Result<i32> {
    let token = TokenParams::build(&args.to_raw())?;
    let funding = funding_calls(parse_funding_amount(fund)?);

    let session = Session::open(global, requirements(global)).await?;
    let report = session
        .orchestrator()
        .run_token_weth(token, WethParams::build(), funding)
        .await;
    emit(&report)
}

pub async fn presale(global: &GlobalArgs, args: &PresaleArgs) -> anyhow::Result<i32> {
    let deps = PresaleDependencies::parse(&args.weth, &args.token, &args.router)?;
    let spec = PresaleParameters::from_raw(&args.to_raw(), args.token_decimals)?.into_spec(&deps);

    let session = Session::open(global, requirements(global)).await?;
    let report = session.orchestrator().run_presale(spec).await;
    emit(&report)
}
