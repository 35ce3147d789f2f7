//! Outcome handling for `try_` calls into collaborators.
//!
//! Every failure publishes [`ExternalCallFailed`] before the typed error is
//! returned, so indexers can tell a manager veto from a local invariant.

use soroban_sdk::{Address, Env, InvokeError, Symbol};

use crate::errors::LendingError;
use crate::events::ExternalCallFailed;

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum CallErrorKind {
    ContractRevert,
    Conversion,
    HostError,
}

impl CallErrorKind {
    pub fn as_code(&self) -> u32 {
        match self {
            CallErrorKind::ContractRevert => 0,
            CallErrorKind::Conversion => 1,
            CallErrorKind::HostError => 2,
        }
    }
}

pub fn emit_external_call_failure(env: &Env, contract: &Address, function: &str, kind: CallErrorKind) {
    ExternalCallFailed {
        contract: contract.clone(),
        function: Symbol::new(env, function),
        failure_kind: kind.as_code(),
    }
    .publish(env);
}

/// Admission gate: any failure of the collaborator is a veto.
pub fn admit<T, C, E>(
    env: &Env,
    contract: &Address,
    function: &str,
    outcome: Result<Result<T, C>, E>,
) -> Result<T, LendingError> {
    match outcome {
        Ok(Ok(value)) => Ok(value),
        Ok(Err(_)) => {
            emit_external_call_failure(env, contract, function, CallErrorKind::Conversion);
            Err(LendingError::AdmissionDenied)
        }
        Err(_) => {
            emit_external_call_failure(env, contract, function, CallErrorKind::ContractRevert);
            Err(LendingError::AdmissionDenied)
        }
    }
}

/// Calls into sibling markets and adapters: their typed errors pass through.
pub fn forward<T, C>(
    env: &Env,
    contract: &Address,
    function: &str,
    outcome: Result<Result<T, C>, Result<LendingError, InvokeError>>,
) -> Result<T, LendingError> {
    match outcome {
        Ok(Ok(value)) => Ok(value),
        Ok(Err(_)) => {
            emit_external_call_failure(env, contract, function, CallErrorKind::Conversion);
            Err(LendingError::ExternalCallFailed)
        }
        Err(Ok(error)) => Err(error),
        Err(Err(_)) => {
            emit_external_call_failure(env, contract, function, CallErrorKind::HostError);
            Err(LendingError::ExternalCallFailed)
        }
    }
}
