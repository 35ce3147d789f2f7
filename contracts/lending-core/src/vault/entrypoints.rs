//! Contract entry points common to every share vault flavor.

/// Expands to a `#[contractimpl]` block carrying the vault and SEP-41 share
/// token surface of `$contract`.
///
/// `$build` assembles the `$vault` (a `ShareVault<H>`) from the contract's
/// own storage. The invoking module must have `Address`, `Bytes`, `Env` and
/// `String` from `soroban_sdk`, `LendingError` and `VaultConfig` in scope.
///
/// Every mutating entry point holds the market's reentrancy guard.
#[macro_export]
macro_rules! share_vault_entrypoints {
    ($contract:ident, $vault:ty, $build:ident) => {
        use $crate::vault::Vault as _;

        #[soroban_sdk::contractimpl]
        impl $contract {
            pub fn start_market(env: Env, initializer: Address) -> Result<(), LendingError> {
                let _guard = $crate::guard::ReentrancyGuard::acquire(&env)?;
                $build(&env)?.start_market(&env, &initializer)
            }

            pub fn deposit(
                env: Env,
                caller: Address,
                assets: u128,
                receiver: Address,
            ) -> Result<u128, LendingError> {
                let _guard = $crate::guard::ReentrancyGuard::acquire(&env)?;
                $build(&env)?.deposit(&env, &caller, assets, &receiver)
            }

            pub fn deposit_as_collateral(
                env: Env,
                caller: Address,
                assets: u128,
            ) -> Result<u128, LendingError> {
                let _guard = $crate::guard::ReentrancyGuard::acquire(&env)?;
                $build(&env)?.deposit_as_collateral(&env, &caller, assets)
            }

            pub fn mint(
                env: Env,
                caller: Address,
                shares: u128,
                receiver: Address,
            ) -> Result<u128, LendingError> {
                let _guard = $crate::guard::ReentrancyGuard::acquire(&env)?;
                $build(&env)?.mint(&env, &caller, shares, &receiver)
            }

            /// Returns the shares burned. Fails if the shares are posted as
            /// collateral.
            pub fn withdraw(
                env: Env,
                caller: Address,
                assets: u128,
                receiver: Address,
                owner: Address,
            ) -> Result<u128, LendingError> {
                let _guard = $crate::guard::ReentrancyGuard::acquire(&env)?;
                $build(&env)?.withdraw(&env, &caller, assets, &receiver, &owner, false)
            }

            /// Returns the assets paid out, net of the exit fee.
            pub fn redeem(
                env: Env,
                caller: Address,
                shares: u128,
                receiver: Address,
                owner: Address,
            ) -> Result<u128, LendingError> {
                let _guard = $crate::guard::ReentrancyGuard::acquire(&env)?;
                $build(&env)?.redeem(&env, &caller, shares, &receiver, &owner, false)
            }

            /// Like `withdraw`, but releases posted collateral as needed.
            pub fn withdraw_collateral(
                env: Env,
                caller: Address,
                assets: u128,
                receiver: Address,
                owner: Address,
            ) -> Result<u128, LendingError> {
                let _guard = $crate::guard::ReentrancyGuard::acquire(&env)?;
                $build(&env)?.withdraw(&env, &caller, assets, &receiver, &owner, true)
            }

            pub fn redeem_collateral(
                env: Env,
                caller: Address,
                shares: u128,
                receiver: Address,
                owner: Address,
            ) -> Result<u128, LendingError> {
                let _guard = $crate::guard::ReentrancyGuard::acquire(&env)?;
                $build(&env)?.redeem(&env, &caller, shares, &receiver, &owner, true)
            }

            pub fn redeem_for_position_folding(
                env: Env,
                position_folding: Address,
                account: Address,
                shares: u128,
                params: Bytes,
            ) -> Result<u128, LendingError> {
                let _guard = $crate::guard::ReentrancyGuard::acquire(&env)?;
                $build(&env)?.redeem_for_position_folding(
                    &env,
                    &position_folding,
                    &account,
                    shares,
                    &params,
                )
            }

            pub fn seize(
                env: Env,
                debt_market: Address,
                liquidator: Address,
                account: Address,
                liquidated_shares: u128,
                protocol_shares: u128,
            ) -> Result<(), LendingError> {
                let _guard = $crate::guard::ReentrancyGuard::acquire(&env)?;
                $build(&env)?.seize(
                    &env,
                    &debt_market,
                    &liquidator,
                    &account,
                    liquidated_shares,
                    protocol_shares,
                )
            }

            pub fn seize_account_liquidation(
                env: Env,
                liquidator: Address,
                account: Address,
                shares: u128,
            ) -> Result<(), LendingError> {
                let _guard = $crate::guard::ReentrancyGuard::acquire(&env)?;
                $build(&env)?.seize_account_liquidation(&env, &liquidator, &account, shares)
            }

            /// Folds vested rewards into the stored total and returns them.
            pub fn accrue(env: Env) -> Result<u128, LendingError> {
                let _guard = $crate::guard::ReentrancyGuard::acquire(&env)?;
                $build(&env)?.accrue(&env)
            }

            pub fn accrual_timestamp(env: Env) -> Result<u64, LendingError> {
                Ok($build(&env)?.accrual_timestamp(&env))
            }

            // views

            pub fn config(env: Env) -> Result<VaultConfig, LendingError> {
                <$vault>::config(&env)
            }

            pub fn asset(env: Env) -> Result<Address, LendingError> {
                Ok(<$vault>::config(&env)?.asset)
            }

            pub fn is_started(env: Env) -> bool {
                $crate::vault::storage::started(&env)
            }

            pub fn total_assets(env: Env) -> Result<u128, LendingError> {
                $build(&env)?.total_assets(&env)
            }

            pub fn stored_total_assets(env: Env) -> u128 {
                <$vault>::stored_total_assets(&env)
            }

            pub fn position_balance(env: Env) -> Result<u128, LendingError> {
                Ok($build(&env)?.position_balance(&env))
            }

            /// WAD scaled assets per share.
            pub fn exchange_rate(env: Env) -> Result<u128, LendingError> {
                $build(&env)?.exchange_rate(&env)
            }

            pub fn convert_to_shares(env: Env, assets: u128) -> Result<u128, LendingError> {
                $build(&env)?.convert_to_shares(&env, assets)
            }

            pub fn convert_to_assets(env: Env, shares: u128) -> Result<u128, LendingError> {
                $build(&env)?.convert_to_assets(&env, shares)
            }

            pub fn preview_deposit(env: Env, assets: u128) -> Result<u128, LendingError> {
                $build(&env)?.preview_deposit(&env, assets)
            }

            pub fn preview_mint(env: Env, shares: u128) -> Result<u128, LendingError> {
                $build(&env)?.preview_mint(&env, shares)
            }

            pub fn preview_withdraw(env: Env, assets: u128) -> Result<u128, LendingError> {
                $build(&env)?.preview_withdraw(&env, assets)
            }

            pub fn preview_redeem(env: Env, shares: u128) -> Result<u128, LendingError> {
                $build(&env)?.preview_redeem(&env, shares)
            }

            pub fn max_deposit(env: Env) -> Result<u128, LendingError> {
                $build(&env)?.max_deposit(&env)
            }

            pub fn max_withdraw(env: Env, owner: Address) -> Result<u128, LendingError> {
                $build(&env)?.max_withdraw(&env, &owner)
            }

            pub fn max_redeem(env: Env, owner: Address) -> Result<u128, LendingError> {
                Ok($build(&env)?.max_redeem(&env, &owner))
            }

            // share token

            pub fn balance(env: Env, id: Address) -> i128 {
                stellar_tokens::fungible::Base::balance(&env, &id)
            }

            pub fn total_supply(env: Env) -> i128 {
                stellar_tokens::fungible::Base::total_supply(&env)
            }

            pub fn allowance(env: Env, owner: Address, spender: Address) -> i128 {
                stellar_tokens::fungible::Base::allowance(&env, &owner, &spender)
            }

            pub fn approve(
                env: Env,
                owner: Address,
                spender: Address,
                amount: u128,
                live_until_ledger: u32,
            ) -> Result<(), LendingError> {
                let amount = $crate::math::to_i128(amount)?;
                stellar_tokens::fungible::Base::approve(
                    &env,
                    &owner,
                    &spender,
                    amount,
                    live_until_ledger,
                );
                Ok(())
            }

            /// Collateral posted with the manager is released as far as needed.
            pub fn transfer(
                env: Env,
                from: Address,
                to: Address,
                amount: u128,
            ) -> Result<(), LendingError> {
                let _guard = $crate::guard::ReentrancyGuard::acquire(&env)?;
                <$vault>::transfer(&env, None, &from, &to, amount)
            }

            pub fn transfer_from(
                env: Env,
                spender: Address,
                from: Address,
                to: Address,
                amount: u128,
            ) -> Result<(), LendingError> {
                let _guard = $crate::guard::ReentrancyGuard::acquire(&env)?;
                <$vault>::transfer(&env, Some(&spender), &from, &to, amount)
            }

            pub fn decimals(env: Env) -> u32 {
                stellar_tokens::fungible::Base::decimals(&env)
            }

            pub fn name(env: Env) -> String {
                stellar_tokens::fungible::Base::name(&env)
            }

            pub fn symbol(env: Env) -> String {
                stellar_tokens::fungible::Base::symbol(&env)
            }
        }
    };
}
