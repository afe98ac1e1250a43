use napi::Result as NapiResult;
use napi_derive::napi;
use serde::de::DeserializeOwned;
use serde::Serialize;

use risk_engine_core::paths::summary::{run_gbm_simulation, GbmInput};
use risk_engine_core::portfolio::risk::{run_portfolio_risk, PortfolioRiskInput};
use risk_engine_core::portfolio::sensitivity::{run_correlation_sweep, CorrelationSweepInput};
use risk_engine_core::risk::var::{run_value_at_risk, VarInput};
use risk_engine_core::EngineResult;

/// Convert any Display error into a napi::Error.
fn to_napi_error(e: impl std::fmt::Display) -> napi::Error {
    napi::Error::from_reason(e.to_string())
}

/// Parse `input_json`, run `f` and serialise its envelope.
fn json_call<I, O>(input_json: &str, f: impl FnOnce(&I) -> EngineResult<O>) -> NapiResult<String>
where
    I: DeserializeOwned,
    O: Serialize,
{
    let input: I = serde_json::from_str(input_json).map_err(to_napi_error)?;
    let output = f(&input).map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}

#[napi]
pub fn value_at_risk(input_json: String) -> NapiResult<String> {
    json_call::<VarInput, _>(&input_json, run_value_at_risk)
}

#[napi]
pub fn portfolio_risk(input_json: String) -> NapiResult<String> {
    json_call::<PortfolioRiskInput, _>(&input_json, run_portfolio_risk)
}

#[napi]
pub fn gbm_simulation(input_json: String) -> NapiResult<String> {
    json_call::<GbmInput, _>(&input_json, run_gbm_simulation)
}

#[napi]
pub fn correlation_sweep(input_json: String) -> NapiResult<String> {
    json_call::<CorrelationSweepInput, _>(&input_json, run_correlation_sweep)
}
