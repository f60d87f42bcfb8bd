//! Scripted collaborator implementations for tests.
//!
//! Each mock records the calls it receives and returns values scripted by
//! the test, so component behavior can be asserted without a network.

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use alloy::primitives::{Address, Bytes, B256, U256};
use anyhow::anyhow;
use async_trait::async_trait;
use chrono::Utc;
use rust_decimal::Decimal;

use aave_liquidator_chain::{
    aave_v3_signatures, ChainClient, ChainError, ConfirmationPolicy, Erc20, FlashLoanVehicle,
    LendingPool, RawLog, ReceiptInfo, UserAccountData,
};

use crate::position::LiquidationOpportunity;

/// Millisecond-scale confirmation policy so timeout paths run fast.
pub fn fast_confirmation() -> ConfirmationPolicy {
    ConfirmationPolicy {
        poll_interval: Duration::from_millis(5),
        timeout: Duration::from_millis(40),
    }
}

/// `mantissa * 10^exponent` as a U256 (e.g. `ray(9, 26)` = 0.9 in ray).
pub fn ray(mantissa: u64, exponent: u64) -> U256 {
    U256::from(mantissa) * U256::from(10u64).pow(U256::from(exponent))
}

/// Account data with the given collateral, debt, and raw health factor.
pub fn account_data(collateral: u64, debt: u64, health_factor: U256) -> UserAccountData {
    UserAccountData {
        total_collateral_base: U256::from(collateral),
        total_debt_base: U256::from(debt),
        available_borrows_base: U256::ZERO,
        current_liquidation_threshold: U256::from(8000u64),
        ltv: U256::from(7500u64),
        health_factor,
    }
}

/// A minimal opportunity for executor tests.
pub fn opportunity_for(user: Address, total_debt: u64) -> LiquidationOpportunity {
    LiquidationOpportunity {
        user,
        health_factor: Decimal::new(9, 1),
        total_collateral_base: U256::from(total_debt * 2),
        total_debt_base: U256::from(total_debt),
        available_borrows_base: U256::ZERO,
        current_liquidation_threshold: U256::from(8000u64),
        block_number: 100,
        detected_at: Utc::now(),
    }
}

/// A Supply log carrying `user` in the data section.
pub fn supply_log(user: Address, block_number: u64) -> RawLog {
    let mut data = vec![0u8; 64];
    data[12..32].copy_from_slice(user.as_slice());
    RawLog {
        address: Address::repeat_byte(0xB0),
        topics: vec![aave_v3_signatures::SUPPLY, B256::ZERO],
        data: Bytes::from(data),
        block_number,
    }
}

/// A Withdraw log carrying `user` as topic 1.
pub fn withdraw_log(user: Address, block_number: u64) -> RawLog {
    let mut topic = [0u8; 32];
    topic[12..].copy_from_slice(user.as_slice());
    RawLog {
        address: Address::repeat_byte(0xB0),
        topics: vec![aave_v3_signatures::WITHDRAW, B256::new(topic)],
        data: Bytes::from(vec![0u8; 32]),
        block_number,
    }
}

/// Scripted [`ChainClient`].
#[derive(Default)]
pub struct MockChainClient {
    height: AtomicU64,
    gas_price: Mutex<u128>,
    logs: Mutex<Vec<RawLog>>,
    log_queries: Mutex<Vec<(u64, u64)>>,
    fail_logs: AtomicBool,
    receipts: Mutex<HashMap<B256, ReceiptInfo>>,
}

impl MockChainClient {
    pub fn with_height(height: u64) -> Self {
        let client = Self::default();
        client.height.store(height, Ordering::SeqCst);
        *client.gas_price.lock().unwrap() = 1_000_000_000;
        client
    }

    pub fn set_height(&self, height: u64) {
        self.height.store(height, Ordering::SeqCst);
    }

    pub fn set_gas_price(&self, wei: u128) {
        *self.gas_price.lock().unwrap() = wei;
    }

    pub fn push_log(&self, log: RawLog) {
        self.logs.lock().unwrap().push(log);
    }

    pub fn fail_log_queries(&self) {
        self.fail_logs.store(true, Ordering::SeqCst);
    }

    /// Ranges passed to `get_logs`, in call order.
    pub fn log_queries(&self) -> Vec<(u64, u64)> {
        self.log_queries.lock().unwrap().clone()
    }

    pub fn set_receipt(&self, hash: B256, status: bool, block_number: u64) {
        self.receipts.lock().unwrap().insert(
            hash,
            ReceiptInfo {
                tx_hash: hash,
                block_number,
                gas_used: 350_000,
                status,
            },
        );
    }
}

#[async_trait]
impl ChainClient for MockChainClient {
    async fn block_number(&self) -> Result<u64, ChainError> {
        Ok(self.height.load(Ordering::SeqCst))
    }

    async fn chain_id(&self) -> Result<u64, ChainError> {
        Ok(1)
    }

    async fn get_logs(
        &self,
        from_block: u64,
        to_block: u64,
        _address: Address,
        _signatures: Vec<B256>,
    ) -> Result<Vec<RawLog>, ChainError> {
        self.log_queries.lock().unwrap().push((from_block, to_block));

        if self.fail_logs.load(Ordering::SeqCst) {
            return Err(ChainError::rpc(anyhow!("scripted log query failure")));
        }

        Ok(self
            .logs
            .lock()
            .unwrap()
            .iter()
            .filter(|log| log.block_number >= from_block && log.block_number <= to_block)
            .cloned()
            .collect())
    }

    async fn pending_nonce(&self, _account: Address) -> Result<u64, ChainError> {
        Ok(7)
    }

    async fn gas_price(&self) -> Result<u128, ChainError> {
        Ok(*self.gas_price.lock().unwrap())
    }

    async fn transaction_receipt(&self, hash: B256) -> Result<Option<ReceiptInfo>, ChainError> {
        Ok(self.receipts.lock().unwrap().get(&hash).cloned())
    }
}

/// Scripted [`LendingPool`].
pub struct MockPool {
    address: Address,
    account_data: Mutex<HashMap<Address, UserAccountData>>,
    failing_accounts: Mutex<HashSet<Address>>,
    reserve_configuration: Mutex<Option<U256>>,
    liquidation_hash: Mutex<B256>,
    liquidation_calls: Mutex<Vec<(Address, Address, Address, U256, bool)>>,
}

impl MockPool {
    pub fn new(address: Address) -> Self {
        Self {
            address,
            account_data: Mutex::new(HashMap::new()),
            failing_accounts: Mutex::new(HashSet::new()),
            // Bonus 500 bps planted at the Aave V3 offset
            reserve_configuration: Mutex::new(Some(U256::from(500u64) << 32)),
            liquidation_hash: Mutex::new(B256::repeat_byte(0xF1)),
            liquidation_calls: Mutex::new(Vec::new()),
        }
    }

    pub fn set_account_data(&self, user: Address, data: UserAccountData) {
        self.account_data.lock().unwrap().insert(user, data);
    }

    pub fn fail_account(&self, user: Address) {
        self.failing_accounts.lock().unwrap().insert(user);
    }

    pub fn set_reserve_configuration(&self, configuration: Option<U256>) {
        *self.reserve_configuration.lock().unwrap() = configuration;
    }

    pub fn set_liquidation_hash(&self, hash: B256) {
        *self.liquidation_hash.lock().unwrap() = hash;
    }

    /// Recorded `liquidationCall` submissions:
    /// (collateral, debt, user, debt_to_cover, receive_atoken).
    pub fn liquidation_calls(&self) -> Vec<(Address, Address, Address, U256, bool)> {
        self.liquidation_calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl LendingPool for MockPool {
    fn address(&self) -> Address {
        self.address
    }

    async fn get_user_account_data(&self, user: Address) -> Result<UserAccountData, ChainError> {
        if self.failing_accounts.lock().unwrap().contains(&user) {
            return Err(ChainError::rpc(anyhow!("scripted account data failure")));
        }
        self.account_data
            .lock()
            .unwrap()
            .get(&user)
            .cloned()
            .ok_or_else(|| ChainError::rpc(anyhow!("no scripted data for {user}")))
    }

    async fn get_reserve_configuration(&self, _asset: Address) -> Result<U256, ChainError> {
        self.reserve_configuration
            .lock()
            .unwrap()
            .ok_or_else(|| ChainError::rpc(anyhow!("scripted reserve configuration failure")))
    }

    async fn liquidation_call(
        &self,
        collateral_asset: Address,
        debt_asset: Address,
        user: Address,
        debt_to_cover: U256,
        receive_atoken: bool,
    ) -> Result<B256, ChainError> {
        self.liquidation_calls.lock().unwrap().push((
            collateral_asset,
            debt_asset,
            user,
            debt_to_cover,
            receive_atoken,
        ));
        Ok(*self.liquidation_hash.lock().unwrap())
    }
}

/// Scripted [`Erc20`].
pub struct MockToken {
    balance: Mutex<U256>,
    allowance: Mutex<U256>,
    approve_hash: Mutex<B256>,
    approvals: Mutex<Vec<(Address, U256)>>,
}

impl MockToken {
    #[allow(clippy::new_without_default)]
    pub fn new() -> Self {
        Self {
            balance: Mutex::new(U256::ZERO),
            allowance: Mutex::new(U256::ZERO),
            approve_hash: Mutex::new(B256::repeat_byte(0xF2)),
            approvals: Mutex::new(Vec::new()),
        }
    }

    pub fn set_balance(&self, balance: U256) {
        *self.balance.lock().unwrap() = balance;
    }

    pub fn set_allowance(&self, allowance: U256) {
        *self.allowance.lock().unwrap() = allowance;
    }

    pub fn set_approve_hash(&self, hash: B256) {
        *self.approve_hash.lock().unwrap() = hash;
    }

    /// Recorded approvals: (spender, amount).
    pub fn approvals(&self) -> Vec<(Address, U256)> {
        self.approvals.lock().unwrap().clone()
    }
}

#[async_trait]
impl Erc20 for MockToken {
    async fn balance_of(&self, _owner: Address) -> Result<U256, ChainError> {
        Ok(*self.balance.lock().unwrap())
    }

    async fn allowance(&self, _owner: Address, _spender: Address) -> Result<U256, ChainError> {
        Ok(*self.allowance.lock().unwrap())
    }

    async fn approve(&self, spender: Address, amount: U256) -> Result<B256, ChainError> {
        self.approvals.lock().unwrap().push((spender, amount));
        Ok(*self.approve_hash.lock().unwrap())
    }
}

/// Scripted [`FlashLoanVehicle`].
pub struct MockFlashLoanVehicle {
    address: Address,
    owner: Mutex<Address>,
    balances: Mutex<HashMap<Address, U256>>,
    request_hash: Mutex<B256>,
    withdraw_hash: Mutex<B256>,
    fail_interest_bearing: AtomicBool,
    fail_underlying: Mutex<HashSet<Address>>,
    liquidation_requests: Mutex<Vec<(Address, U256, Address, Address)>>,
    atoken_withdrawals: Mutex<Vec<Address>>,
    underlying_withdrawals: Mutex<Vec<Address>>,
}

impl MockFlashLoanVehicle {
    pub fn new(address: Address) -> Self {
        Self {
            address,
            owner: Mutex::new(Address::repeat_byte(0x01)),
            balances: Mutex::new(HashMap::new()),
            request_hash: Mutex::new(B256::repeat_byte(0xF3)),
            withdraw_hash: Mutex::new(B256::repeat_byte(0xF4)),
            fail_interest_bearing: AtomicBool::new(false),
            fail_underlying: Mutex::new(HashSet::new()),
            liquidation_requests: Mutex::new(Vec::new()),
            atoken_withdrawals: Mutex::new(Vec::new()),
            underlying_withdrawals: Mutex::new(Vec::new()),
        }
    }

    pub fn set_owner(&self, owner: Address) {
        *self.owner.lock().unwrap() = owner;
    }

    pub fn set_balance(&self, token: Address, balance: U256) {
        self.balances.lock().unwrap().insert(token, balance);
    }

    pub fn set_request_hash(&self, hash: B256) {
        *self.request_hash.lock().unwrap() = hash;
    }

    pub fn set_withdraw_hash(&self, hash: B256) {
        *self.withdraw_hash.lock().unwrap() = hash;
    }

    /// Make every `withdraw_interest_bearing` call fail.
    pub fn fail_interest_bearing(&self) {
        self.fail_interest_bearing.store(true, Ordering::SeqCst);
    }

    /// Make `withdraw_underlying` fail for one token.
    pub fn fail_underlying_for(&self, token: Address) {
        self.fail_underlying.lock().unwrap().insert(token);
    }

    /// Recorded requests: (debt_asset, amount, borrower, collateral_asset).
    pub fn liquidation_requests(&self) -> Vec<(Address, U256, Address, Address)> {
        self.liquidation_requests.lock().unwrap().clone()
    }

    pub fn atoken_withdrawals(&self) -> Vec<Address> {
        self.atoken_withdrawals.lock().unwrap().clone()
    }

    pub fn underlying_withdrawals(&self) -> Vec<Address> {
        self.underlying_withdrawals.lock().unwrap().clone()
    }
}

#[async_trait]
impl FlashLoanVehicle for MockFlashLoanVehicle {
    fn address(&self) -> Address {
        self.address
    }

    async fn request_liquidation(
        &self,
        debt_asset: Address,
        amount: U256,
        borrower: Address,
        collateral_asset: Address,
    ) -> Result<B256, ChainError> {
        self.liquidation_requests
            .lock()
            .unwrap()
            .push((debt_asset, amount, borrower, collateral_asset));
        Ok(*self.request_hash.lock().unwrap())
    }

    async fn balance_of(&self, token: Address) -> Result<U256, ChainError> {
        Ok(self
            .balances
            .lock()
            .unwrap()
            .get(&token)
            .copied()
            .unwrap_or(U256::ZERO))
    }

    async fn withdraw_underlying(&self, token: Address) -> Result<B256, ChainError> {
        if self.fail_underlying.lock().unwrap().contains(&token) {
            return Err(ChainError::submission(anyhow!(
                "scripted underlying withdrawal failure"
            )));
        }
        self.underlying_withdrawals.lock().unwrap().push(token);
        Ok(*self.withdraw_hash.lock().unwrap())
    }

    async fn withdraw_interest_bearing(&self, token: Address) -> Result<B256, ChainError> {
        if self.fail_interest_bearing.load(Ordering::SeqCst) {
            return Err(ChainError::submission(anyhow!(
                "scripted aToken withdrawal failure"
            )));
        }
        self.atoken_withdrawals.lock().unwrap().push(token);
        Ok(*self.withdraw_hash.lock().unwrap())
    }

    async fn owner(&self) -> Result<Address, ChainError> {
        Ok(*self.owner.lock().unwrap())
    }
}
