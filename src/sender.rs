use std::{str::FromStr, sync::Arc};

use rand::seq::SliceRandom;
use rust_decimal::{prelude::ToPrimitive, Decimal, RoundingStrategy};

use crate::{
    address::SuiAddress,
    claimer::{send_transaction, TxOutcome},
    config::Config,
    constants::{SUI_COIN_TYPE, SUI_DECIMALS},
    rpc::SuiClient,
    scaling::{balance_to_decimal, to_raw},
    wallet::SuiWallet,
};

/// One `address,amount` line of the recipients file. The amount is in SUI, not MIST.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransferEntry {
    pub recipient: SuiAddress,
    pub amount: Decimal,
}

impl FromStr for TransferEntry {
    type Err = eyre::Report;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (recipient, amount) = s
            .split_once(',')
            .ok_or_else(|| eyre::eyre!("Expected `address,amount`, got `{s}`"))?;

        let amount = amount.trim();
        Ok(Self {
            recipient: recipient.parse()?,
            amount: Decimal::from_str(amount)
                .map_err(|e| eyre::eyre!("Invalid amount `{amount}`: {e}"))?,
        })
    }
}

impl TransferEntry {
    /// Amount in MIST, rounded half-up to a whole MIST.
    pub fn raw_amount(&self) -> eyre::Result<u64> {
        if self.amount <= Decimal::ZERO || self.amount > Decimal::from(u64::MAX) {
            eyre::bail!("Amount {} SUI is out of range", self.amount);
        }

        to_raw(self.amount, SUI_DECIMALS)
            .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
            .to_u64()
            .filter(|raw| *raw > 0)
            .ok_or_else(|| eyre::eyre!("Amount {} SUI is below 1 MIST", self.amount))
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SendSummary {
    pub succeeded: usize,
    pub failed: usize,
}

pub async fn transfer_sui(
    client: &SuiClient,
    wallet: &SuiWallet,
    entry: &TransferEntry,
    gas_budget: u64,
) -> eyre::Result<TxOutcome> {
    let raw_amount = entry.raw_amount()?;
    let address = wallet.address();

    let coins: Vec<SuiAddress> = client
        .get_coins(address, SUI_COIN_TYPE)
        .await?
        .into_iter()
        .map(|coin| coin.coin_object_id)
        .collect();

    if coins.is_empty() {
        eyre::bail!("No SUI coins owned by {address}");
    }

    let tx = client
        .pay_sui(address, coins, vec![entry.recipient], vec![raw_amount], gas_budget)
        .await?;

    send_transaction(client, wallet, tx).await
}

/// Sends every entry from `sender`, one transaction at a time. Every transfer spends the
/// sender's SUI coins, so two in flight would lock the same objects.
pub async fn send_to_all(
    config: Config,
    sender: Arc<SuiWallet>,
    entries: Vec<TransferEntry>,
) -> eyre::Result<SendSummary> {
    let rpc_url = config
        .rpc_urls
        .choose(&mut rand::thread_rng())
        .ok_or_else(|| eyre::eyre!("No RPC urls configured"))?;
    let client = SuiClient::new(rpc_url)?;

    let address = sender.address();
    let balance = client.get_balance(address, SUI_COIN_TYPE).await?;
    let formatted = balance_to_decimal(balance, SUI_DECIMALS)
        .map_or_else(|| balance.to_string(), |balance| balance.normalize().to_string());

    if balance < 1 {
        tracing::warn!("{address} You have {formatted} SUI");
        return Ok(SendSummary::default());
    }

    tracing::info!("{address} | You have {formatted} SUI");

    let mut summary = SendSummary::default();

    for entry in &entries {
        let TransferEntry { recipient, amount } = entry;

        match transfer_sui(&client, &sender, entry, config.gas_budget).await {
            Ok(outcome) if outcome.is_success() => {
                summary.succeeded += 1;
                tracing::info!("Transfer {amount} SUI to {recipient} - Success");
            }
            Ok(outcome) => {
                summary.failed += 1;
                tracing::error!(
                    "Transfer {amount} SUI to {recipient} - Failed [{}]",
                    outcome.reason()
                );
            }
            Err(e) => {
                summary.failed += 1;
                tracing::error!("Transfer {amount} SUI to {recipient} - Failed [{e}]");
            }
        }
    }

    tracing::info!(
        "Done: {} succeeded, {} failed",
        summary.succeeded,
        summary.failed
    );

    Ok(summary)
}
