use soroban_sdk::{contracttype, Env};

use crate::errors::LendingError;

#[contracttype]
#[derive(Clone)]
enum GuardKey {
    Locked,
}

/// Mutual exclusion over the state-mutating entry points of one contract.
///
/// The lock is taken in [`ReentrancyGuard::acquire`] and released when the
/// guard drops, on success and on early `?` returns alike.
pub struct ReentrancyGuard<'a> {
    env: &'a Env,
}

impl<'a> ReentrancyGuard<'a> {
    pub fn acquire(env: &'a Env) -> Result<Self, LendingError> {
        let temporary = env.storage().temporary();
        if temporary.has(&GuardKey::Locked) {
            return Err(LendingError::Reentrancy);
        }
        temporary.set(&GuardKey::Locked, &true);
        Ok(Self { env })
    }

    pub fn is_locked(env: &Env) -> bool {
        env.storage().temporary().has(&GuardKey::Locked)
    }
}

impl Drop for ReentrancyGuard<'_> {
    fn drop(&mut self) {
        self.env.storage().temporary().remove(&GuardKey::Locked);
    }
}
