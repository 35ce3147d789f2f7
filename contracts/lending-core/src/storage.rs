//! Persistent storage access with TTL bumps on every touch.

use soroban_sdk::{Env, IntoVal, TryFromVal, Val};

use crate::constants::{TTL_EXTEND_TO, TTL_THRESHOLD};
use crate::errors::LendingError;

pub fn bump<K>(env: &Env, key: &K)
where
    K: IntoVal<Env, Val>,
{
    let persistent = env.storage().persistent();
    if persistent.has(key) {
        persistent.extend_ttl(key, TTL_THRESHOLD, TTL_EXTEND_TO);
    }
}

pub fn load<K, V>(env: &Env, key: &K) -> Option<V>
where
    K: IntoVal<Env, Val>,
    V: TryFromVal<Env, Val>,
{
    let value = env.storage().persistent().get(key);
    if value.is_some() {
        bump(env, key);
    }
    value
}

pub fn load_or<K, V>(env: &Env, key: &K, default: V) -> V
where
    K: IntoVal<Env, Val>,
    V: TryFromVal<Env, Val>,
{
    load(env, key).unwrap_or(default)
}

/// Reads configuration that must exist once the contract is initialized.
pub fn require<K, V>(env: &Env, key: &K) -> Result<V, LendingError>
where
    K: IntoVal<Env, Val>,
    V: TryFromVal<Env, Val>,
{
    load(env, key).ok_or(LendingError::NotInitialized)
}

pub fn store<K, V>(env: &Env, key: &K, value: &V)
where
    K: IntoVal<Env, Val>,
    V: IntoVal<Env, Val>,
{
    env.storage().persistent().set(key, value);
    env.storage()
        .persistent()
        .extend_ttl(key, TTL_THRESHOLD, TTL_EXTEND_TO);
}
