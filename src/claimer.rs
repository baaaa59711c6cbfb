use std::{fmt, sync::Arc, time::Duration};

use rand::seq::SliceRandom;
use serde_json::json;
use tokio::task::JoinSet;

use crate::{
    address::SuiAddress,
    config::Config,
    constants::{
        CLAIM_FUNCTION, CLAIM_MODULE, CLAIM_OBJECT_ID, CLAIM_PACKAGE_ID, CLOCK_OBJECT_ID,
        OCEAN_COIN_TYPE, OCEAN_DECIMALS, SUI_COIN_TYPE, SUI_DECIMALS, SUI_EXPLORER_URL,
    },
    projection::{project, AccountState, GameConfig, ProjectionResult},
    rpc::{SuiClient, TransactionBytes},
    scaling::{balance_to_decimal, to_decimal},
    utils::now_millis,
    wallet::SuiWallet,
};

/// Result of pushing one transaction through dry-run and execution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TxOutcome {
    /// `None` when the dry-run already failed and nothing was executed.
    pub digest: Option<String>,
    pub status: String,
    pub error: Option<String>,
}

impl TxOutcome {
    pub fn is_success(&self) -> bool {
        self.status == "success"
    }

    /// `status` or `status: error`, for log lines.
    pub fn reason(&self) -> String {
        match &self.error {
            Some(error) => format!("{}: {error}", self.status),
            None => self.status.clone(),
        }
    }
}

pub async fn send_transaction(
    client: &SuiClient,
    wallet: &SuiWallet,
    tx: TransactionBytes,
) -> eyre::Result<TxOutcome> {
    let signature = wallet.sign_transaction(&tx.decode()?);

    let dry_run = client.dry_run(&tx).await?;
    if !dry_run.effects.status.is_success() {
        tracing::warn!(
            "Dry run failed for {}: {}",
            wallet.address(),
            dry_run.effects.status.error.as_deref().unwrap_or("unknown error")
        );
        return Ok(TxOutcome {
            digest: None,
            status: dry_run.effects.status.status,
            error: dry_run.effects.status.error,
        });
    }

    let response = client.execute(&tx, signature).await?;
    let status = response
        .effects
        .ok_or_else(|| eyre::eyre!("Transaction {} returned no effects", response.digest))?
        .status;

    let url = format!("{SUI_EXPLORER_URL}/tx/{}", response.digest);

    if status.is_success() {
        tracing::info!("Transaction successful: {}", url);
    } else {
        tracing::error!("Transaction failed: {}", url);
    }

    Ok(TxOutcome {
        digest: Some(response.digest),
        status: status.status,
        error: status.error,
    })
}

pub async fn claim(
    client: &SuiClient,
    wallet: &SuiWallet,
    gas_budget: u64,
) -> eyre::Result<TxOutcome> {
    let tx = client
        .move_call(
            wallet.address(),
            CLAIM_PACKAGE_ID.parse()?,
            CLAIM_MODULE,
            CLAIM_FUNCTION,
            vec![json!(CLAIM_OBJECT_ID), json!(CLOCK_OBJECT_ID)],
            gas_budget,
        )
        .await?;

    send_transaction(client, wallet, tx).await
}

/// Sends `amount` raw OCEAN out of every OCEAN coin the wallet holds.
pub async fn transfer_ocean(
    client: &SuiClient,
    wallet: &SuiWallet,
    to: SuiAddress,
    amount: u64,
    gas_budget: u64,
) -> eyre::Result<TxOutcome> {
    let address = wallet.address();
    tracing::info!(
        "Sending {} OCEAN from {address} to {to}",
        to_decimal(amount, OCEAN_DECIMALS)
    );

    let coins: Vec<SuiAddress> = client
        .get_coins(address, OCEAN_COIN_TYPE)
        .await?
        .into_iter()
        .map(|coin| coin.coin_object_id)
        .collect();

    if coins.is_empty() {
        eyre::bail!("No OCEAN coins owned by {address}");
    }

    let tx = client
        .pay(address, coins, vec![to], vec![amount], gas_budget)
        .await?;

    send_transaction(client, wallet, tx).await
}

pub async fn get_account_state(
    client: &SuiClient,
    owner: SuiAddress,
) -> eyre::Result<Option<AccountState>> {
    let fields = client
        .get_account_state(CLAIM_OBJECT_ID.parse()?, owner)
        .await?;

    fields
        .map(|fields| serde_json::from_value(fields).map_err(eyre::Report::from))
        .transpose()
}

/// One status line per account and pass. A balance that could not be queried is `None`.
#[derive(Debug, Clone)]
pub struct AccountStatus {
    pub address: SuiAddress,
    pub sui_balance: Option<u128>,
    pub ocean_balance: Option<u128>,
    pub projection: ProjectionResult,
}

impl fmt::Display for AccountStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let balance = |raw: Option<u128>, decimals: u32, symbol: &str| {
            match raw.and_then(|raw| balance_to_decimal(raw, decimals)) {
                Some(amount) => format!("{} {symbol}", amount.normalize()),
                None => format!("0 {symbol} (unavailable)"),
            }
        };

        write!(
            f,
            "[Address: {}] P {:.2}% {} {} UNCL {:.5} OCEAN ±{:.2}m",
            self.address,
            self.projection.progress.round_dp(2),
            balance(self.sui_balance, SUI_DECIMALS, "SUI"),
            balance(self.ocean_balance, OCEAN_DECIMALS, "OCEAN"),
            self.projection.unclaimed_amount,
            self.projection.minutes_to_claim().round_dp(2),
        )
    }
}

/// Shared, read-only inputs for every account task.
#[derive(Debug)]
pub struct ClaimContext {
    pub config: Config,
    pub game: GameConfig,
    pub destination: Option<SuiAddress>,
}

async fn forward_ocean(
    ctx: &ClaimContext,
    client: &SuiClient,
    wallet: &SuiWallet,
    status: &AccountStatus,
    destination: SuiAddress,
) -> eyre::Result<()> {
    tokio::time::sleep(Duration::from_millis(ctx.config.transfer_delay)).await;
    tracing::info!("{status} - Transferring...");

    if status.ocean_balance.is_none() {
        tracing::error!("{status} - Transfer Failed. [Failed to get balance]");
        return Ok(());
    }

    let balance = client.get_balance(wallet.address(), OCEAN_COIN_TYPE).await?;
    if balance == 0 {
        tracing::warn!("{status} - Nothing to transfer");
        return Ok(());
    }

    let result = match u64::try_from(balance) {
        Ok(amount) => {
            transfer_ocean(client, wallet, destination, amount, ctx.config.gas_budget).await
        }
        Err(_) => Err(eyre::eyre!("Balance {balance} exceeds a single payment")),
    };

    match result {
        Ok(outcome) if outcome.is_success() => tracing::info!("{status} - Transferred"),
        Ok(outcome) => tracing::error!("{status} - Transfer Failed. [{}]", outcome.reason()),
        Err(e) => tracing::error!("{status} - Transfer Failed. [{e}]"),
    }

    Ok(())
}

/// One polling pass for a single account: report progress, claim when the cycle is done and
/// optionally forward the whole OCEAN balance.
pub async fn claim_and_transfer(
    ctx: Arc<ClaimContext>,
    client: Arc<SuiClient>,
    wallet: Arc<SuiWallet>,
    now_ms: i64,
) -> eyre::Result<()> {
    let address = wallet.address();

    let sui_balance = client
        .get_balance(address, SUI_COIN_TYPE)
        .await
        .inspect_err(|e| tracing::warn!("Failed to get SUI balance of {address}: {e}"))
        .ok();
    let ocean_balance = client
        .get_balance(address, OCEAN_COIN_TYPE)
        .await
        .inspect_err(|e| tracing::warn!("Failed to get OCEAN balance of {address}: {e}"))
        .ok();

    let state = get_account_state(&client, address)
        .await
        .map_err(|e| eyre::eyre!("Failed to fetch claim info: {e}"))?;

    let projection = project(Some(&ctx.game), state.as_ref(), now_ms)?;
    let status = AccountStatus {
        address,
        sui_balance,
        ocean_balance,
        projection,
    };

    tracing::info!("{status}");

    if !status.projection.is_claimable() {
        return Ok(());
    }

    tracing::info!("{status} - Claiming...");

    let outcome = match claim(&client, &wallet, ctx.config.gas_budget).await {
        Ok(outcome) => outcome,
        Err(e) => {
            tracing::error!("{status} - Claim Failed. [{e}]");
            return Ok(());
        }
    };

    if !outcome.is_success() {
        tracing::error!("{status} - Claim Failed. [{}]", outcome.reason());
        return Ok(());
    }

    tracing::info!("{status} - Claimed");

    if let Some(destination) = ctx.destination {
        forward_ocean(&ctx, &client, &wallet, &status, destination).await?;
    }

    Ok(())
}

fn init_clients(rpc_urls: &[String]) -> eyre::Result<Vec<Arc<SuiClient>>> {
    rpc_urls
        .iter()
        .map(|rpc_url| SuiClient::new(rpc_url).map(Arc::new))
        .collect()
}

pub async fn claim_for_all(
    config: Config,
    game: GameConfig,
    wallets: Vec<Arc<SuiWallet>>,
) -> eyre::Result<()> {
    let clients = init_clients(&config.rpc_urls)?;
    let poll_interval = Duration::from_millis(config.poll_interval);
    let destination = config.transfer_destination()?;

    if let Some(destination) = destination {
        tracing::info!("Claimed OCEAN will be forwarded to {destination}");
    }
    tracing::info!("Watching {} accounts", wallets.len());

    let ctx = Arc::new(ClaimContext {
        config,
        game,
        destination,
    });

    loop {
        let now_ms = now_millis()?;
        let mut handles = JoinSet::new();

        for wallet in &wallets {
            let client = clients
                .choose(&mut rand::thread_rng())
                .ok_or_else(|| eyre::eyre!("No RPC clients configured"))?
                .clone();
            let ctx = ctx.clone();
            let wallet = wallet.clone();

            handles.spawn(async move {
                let address = wallet.address();
                let task_result = claim_and_transfer(ctx, client, wallet, now_ms).await;
                (address, task_result)
            });
        }

        while let Some(res) = handles.join_next().await {
            match res {
                Ok((_, Ok(()))) => {}
                Ok((address, Err(e))) => tracing::error!("[Address: {address}] {e}"),
                Err(e) => tracing::error!("Account task panicked: {e}"),
            }
        }

        tokio::time::sleep(poll_interval).await;
    }
}
