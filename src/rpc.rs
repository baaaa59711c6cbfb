//! Thin Sui full node JSON-RPC client.
//!
//! Transactions are assembled by the node's `unsafe_*` builder methods, which return BCS
//! bytes ready to be signed locally.

use alloy::{
    rpc::client::{ClientBuilder, RpcClient},
    transports::http::Http,
};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use serde::Deserialize;
use serde_json::{json, Value};

use crate::address::SuiAddress;

const DYNAMIC_FIELD_NOT_FOUND: &str = "dynamicFieldNotFound";
const COINS_PAGE_LIMIT: usize = 50;

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Balance {
    #[serde(deserialize_with = "u128_from_str")]
    total_balance: u128,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Coin {
    pub coin_object_id: SuiAddress,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CoinPage {
    data: Vec<Coin>,
    next_cursor: Option<String>,
    has_next_page: bool,
}

#[derive(Debug, Clone, Deserialize)]
struct DynamicFieldResponse {
    data: Option<ObjectData>,
    error: Option<Value>,
}

#[derive(Debug, Clone, Deserialize)]
struct ObjectData {
    content: Option<Value>,
}

/// Unsigned transaction as returned by the `unsafe_*` builders.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionBytes {
    pub tx_bytes: String,
}

impl TransactionBytes {
    pub fn decode(&self) -> eyre::Result<Vec<u8>> {
        Ok(STANDARD.decode(&self.tx_bytes)?)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ExecutionStatus {
    pub status: String,
    pub error: Option<String>,
}

impl ExecutionStatus {
    pub fn is_success(&self) -> bool {
        self.status == "success"
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct TransactionEffects {
    pub status: ExecutionStatus,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DryRunResponse {
    pub effects: TransactionEffects,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TransactionResponse {
    pub digest: String,
    pub effects: Option<TransactionEffects>,
}

fn u128_from_str<'de, D>(deserializer: D) -> Result<u128, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let s = String::deserialize(deserializer)?;
    s.parse().map_err(serde::de::Error::custom)
}

/// Pulls the Move struct fields out of a dynamic field object. Fields wrapping a struct
/// keep it under `value.fields`.
fn extract_fields(content: Value) -> Option<Value> {
    let mut fields = match content {
        Value::Object(mut content) => content.remove("fields")?,
        _ => return None,
    };

    let inner = fields
        .get_mut("value")
        .and_then(|value| value.get_mut("fields"))
        .map(Value::take);

    Some(inner.unwrap_or(fields))
}

pub struct SuiClient {
    client: RpcClient<Http<reqwest::Client>>,
}

impl SuiClient {
    pub fn new(rpc_url: &str) -> eyre::Result<Self> {
        Self::with_http_client(reqwest::Client::new(), rpc_url)
    }

    pub fn with_http_client(http: reqwest::Client, rpc_url: &str) -> eyre::Result<Self> {
        let url: reqwest::Url = rpc_url
            .parse()
            .map_err(|e| eyre::eyre!("Invalid RPC url {rpc_url}: {e}"))?;
        let client = ClientBuilder::default().transport(Http::with_client(http, url), false);

        Ok(Self { client })
    }

    /// Total balance across all coins of `coin_type`.
    pub async fn get_balance(&self, owner: SuiAddress, coin_type: &str) -> eyre::Result<u128> {
        let balance: Balance = self
            .client
            .request("suix_getBalance", (owner, coin_type.to_string()))
            .await?;

        Ok(balance.total_balance)
    }

    pub async fn get_coins(&self, owner: SuiAddress, coin_type: &str) -> eyre::Result<Vec<Coin>> {
        let mut coins = vec![];
        let mut cursor: Option<String> = None;

        loop {
            let page: CoinPage = self
                .client
                .request(
                    "suix_getCoins",
                    (owner, coin_type.to_string(), cursor.clone(), COINS_PAGE_LIMIT),
                )
                .await?;

            coins.extend(page.data);

            match page.next_cursor {
                Some(next) if page.has_next_page => cursor = Some(next),
                _ => break,
            }
        }

        Ok(coins)
    }

    /// Reads the dynamic field of `parent` keyed by `owner`. `None` when the field does not exist.
    pub async fn get_account_state(
        &self,
        parent: SuiAddress,
        owner: SuiAddress,
    ) -> eyre::Result<Option<Value>> {
        let response: DynamicFieldResponse = self
            .client
            .request(
                "suix_getDynamicFieldObject",
                (parent, json!({ "type": "address", "value": owner })),
            )
            .await?;

        if let Some(error) = response.error {
            if error.get("code").and_then(Value::as_str) == Some(DYNAMIC_FIELD_NOT_FOUND) {
                return Ok(None);
            }
            eyre::bail!("Failed to read dynamic field for {owner}: {error}");
        }

        let content = response
            .data
            .and_then(|data| data.content)
            .ok_or_else(|| eyre::eyre!("Dynamic field for {owner} has no content"))?;

        extract_fields(content)
            .map(Some)
            .ok_or_else(|| eyre::eyre!("Dynamic field for {owner} is not a Move object"))
    }

    pub async fn move_call(
        &self,
        signer: SuiAddress,
        package: SuiAddress,
        module: &str,
        function: &str,
        arguments: Vec<Value>,
        gas_budget: u64,
    ) -> eyre::Result<TransactionBytes> {
        let type_arguments: Vec<String> = vec![];
        let gas: Option<SuiAddress> = None;

        Ok(self
            .client
            .request(
                "unsafe_moveCall",
                (
                    signer,
                    package,
                    module.to_string(),
                    function.to_string(),
                    type_arguments,
                    arguments,
                    gas,
                    gas_budget.to_string(),
                ),
            )
            .await?)
    }

    /// Sends non-SUI coins; gas is picked by the node from the signer's SUI coins.
    pub async fn pay(
        &self,
        signer: SuiAddress,
        input_coins: Vec<SuiAddress>,
        recipients: Vec<SuiAddress>,
        amounts: Vec<u64>,
        gas_budget: u64,
    ) -> eyre::Result<TransactionBytes> {
        let amounts: Vec<String> = amounts.iter().map(u64::to_string).collect();
        let gas: Option<SuiAddress> = None;

        Ok(self
            .client
            .request(
                "unsafe_pay",
                (
                    signer,
                    input_coins,
                    recipients,
                    amounts,
                    gas,
                    gas_budget.to_string(),
                ),
            )
            .await?)
    }

    /// Sends SUI; the first input coin also pays for gas.
    pub async fn pay_sui(
        &self,
        signer: SuiAddress,
        input_coins: Vec<SuiAddress>,
        recipients: Vec<SuiAddress>,
        amounts: Vec<u64>,
        gas_budget: u64,
    ) -> eyre::Result<TransactionBytes> {
        let amounts: Vec<String> = amounts.iter().map(u64::to_string).collect();

        Ok(self
            .client
            .request(
                "unsafe_paySui",
                (
                    signer,
                    input_coins,
                    recipients,
                    amounts,
                    gas_budget.to_string(),
                ),
            )
            .await?)
    }

    pub async fn dry_run(&self, tx: &TransactionBytes) -> eyre::Result<DryRunResponse> {
        Ok(self
            .client
            .request("sui_dryRunTransactionBlock", (tx.tx_bytes.clone(),))
            .await?)
    }

    pub async fn execute(
        &self,
        tx: &TransactionBytes,
        signature: String,
    ) -> eyre::Result<TransactionResponse> {
        Ok(self
            .client
            .request(
                "sui_executeTransactionBlock",
                (
                    tx.tx_bytes.clone(),
                    vec![signature],
                    json!({ "showEffects": true }),
                    "WaitForLocalExecution",
                ),
            )
            .await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_balance() {
        let balance: Balance = serde_json::from_value(json!({
            "coinType": "0x2::sui::SUI",
            "coinObjectCount": 3,
            "totalBalance": "1250000000",
            "lockedBalance": {}
        }))
        .unwrap();

        assert_eq!(balance.total_balance, 1_250_000_000);
    }

    #[test]
    fn parses_balance_beyond_u64() {
        let balance: Balance = serde_json::from_value(json!({
            "coinType": "0x2::sui::SUI",
            "coinObjectCount": 2,
            "totalBalance": "36893488147419103230"
        }))
        .unwrap();

        assert_eq!(balance.total_balance, u128::from(u64::MAX) * 2);
    }

    #[test]
    fn parses_coin_page() {
        let page: CoinPage = serde_json::from_value(json!({
            "data": [{
                "coinType": "0x2::sui::SUI",
                "coinObjectId": "0x5d3f9a7e1f3c",
                "version": "1042",
                "digest": "5q5zKX9cKZbqFm2dKpZ3h2ZrqFHyV3QvqxGU4zG6DMBy",
                "balance": "42",
                "previousTransaction": "9k8H2b7qBbiaxPkDZWLv1WQ5mWxQ1nkDdP8vkD4Wq3aB"
            }],
            "nextCursor": "0x5d3f9a7e1f3c",
            "hasNextPage": false
        }))
        .unwrap();

        assert_eq!(page.data.len(), 1);
        assert_eq!(
            page.data[0].coin_object_id,
            "0x5d3f9a7e1f3c".parse::<SuiAddress>().unwrap()
        );
        assert!(!page.has_next_page);
    }

    #[test]
    fn parses_transaction_responses() {
        let dry_run: DryRunResponse = serde_json::from_value(json!({
            "effects": { "status": { "status": "failure", "error": "InsufficientGas" } },
            "events": [],
            "objectChanges": [],
            "balanceChanges": []
        }))
        .unwrap();
        assert!(!dry_run.effects.status.is_success());
        assert_eq!(dry_run.effects.status.error.as_deref(), Some("InsufficientGas"));

        let executed: TransactionResponse = serde_json::from_value(json!({
            "digest": "3ZQ8qbmFkJvYc1VjY7K4o5s2Q7n1rB6x9a8dD3fE2gH1",
            "effects": { "status": { "status": "success" } }
        }))
        .unwrap();
        assert!(executed.effects.unwrap().status.is_success());
    }

    #[test]
    fn decodes_transaction_bytes() {
        let tx = TransactionBytes {
            tx_bytes: STANDARD.encode([1u8, 2, 3]),
        };
        assert_eq!(tx.decode().unwrap(), vec![1, 2, 3]);

        let broken = TransactionBytes {
            tx_bytes: "not base64!".to_string(),
        };
        assert!(broken.decode().is_err());
    }

    #[test]
    fn extracts_flat_fields() {
        let content = json!({
            "dataType": "moveObject",
            "type": "0x1::game::ClaimInfo",
            "fields": { "boat": "1", "mesh": "2" }
        });

        let fields = extract_fields(content).unwrap();
        assert_eq!(fields, json!({ "boat": "1", "mesh": "2" }));
    }

    #[test]
    fn extracts_wrapped_fields() {
        let content = json!({
            "dataType": "moveObject",
            "fields": {
                "id": { "id": "0x1" },
                "name": "0x2",
                "value": { "type": "0x1::game::ClaimInfo", "fields": { "boat": "3" } }
            }
        });

        let fields = extract_fields(content).unwrap();
        assert_eq!(fields, json!({ "boat": "3" }));
    }

    #[test]
    fn rejects_content_without_fields() {
        assert!(extract_fields(json!({ "dataType": "package" })).is_none());
        assert!(extract_fields(json!("nope")).is_none());
    }

    #[test]
    fn parses_missing_dynamic_field() {
        let response: DynamicFieldResponse = serde_json::from_value(json!({
            "error": { "code": "dynamicFieldNotFound", "parent_object_id": "0x1" }
        }))
        .unwrap();

        assert!(response.data.is_none());
        assert_eq!(
            response.error.unwrap()["code"].as_str(),
            Some(DYNAMIC_FIELD_NOT_FOUND)
        );
    }

    #[test]
    fn rejects_invalid_url() {
        assert!(SuiClient::new("not a url").is_err());
    }
}
