use std::{
    path::Path,
    sync::Arc,
    time::{SystemTime, UNIX_EPOCH},
};

use tokio::io::AsyncBufReadExt;

use crate::{
    constants::{
        GAME_INFO_FILE_PATH, MNEMONICS_FILE_PATH, RECIPIENTS_FILE_PATH, SENDER_MNEMONIC_FILE_PATH,
    },
    projection::GameConfig,
    sender::TransferEntry,
    wallet::SuiWallet,
};

/// Non-empty lines of a file, trimmed, skipping `#` comments.
pub async fn read_file_lines(path: impl AsRef<Path>) -> eyre::Result<Vec<String>> {
    let file = tokio::fs::File::open(path).await?;
    let mut lines = tokio::io::BufReader::new(file).lines();

    let mut contents = vec![];
    while let Some(line) = lines.next_line().await? {
        let line = line.trim();
        if !line.is_empty() && !line.starts_with('#') {
            contents.push(line.to_string());
        }
    }

    Ok(contents)
}

async fn read_required_lines(path: &str) -> eyre::Result<Vec<String>> {
    read_file_lines(path)
        .await
        .map_err(|e| eyre::eyre!("Failed to read {path}: {e}"))
}

fn wallets_from_lines(lines: &[String]) -> eyre::Result<Vec<Arc<SuiWallet>>> {
    lines
        .iter()
        .enumerate()
        .map(|(index, phrase)| {
            SuiWallet::from_mnemonic(phrase)
                .map(Arc::new)
                .map_err(|e| eyre::eyre!("Mnemonic #{}: {e}", index + 1))
        })
        .collect()
}

pub async fn read_mnemonics() -> eyre::Result<Vec<Arc<SuiWallet>>> {
    let lines = read_required_lines(MNEMONICS_FILE_PATH).await?;
    wallets_from_lines(&lines)
}

pub async fn read_sender_wallet() -> eyre::Result<Arc<SuiWallet>> {
    let lines = read_required_lines(SENDER_MNEMONIC_FILE_PATH).await?;

    wallets_from_lines(&lines[..lines.len().min(1)])?
        .pop()
        .ok_or_else(|| eyre::eyre!("{SENDER_MNEMONIC_FILE_PATH} holds no mnemonic"))
}

pub async fn read_recipients() -> eyre::Result<Vec<TransferEntry>> {
    read_required_lines(RECIPIENTS_FILE_PATH)
        .await?
        .iter()
        .enumerate()
        .map(|(index, line)| {
            line.parse()
                .map_err(|e| eyre::eyre!("{RECIPIENTS_FILE_PATH} line {}: {e}", index + 1))
        })
        .collect()
}

pub async fn read_game_info() -> eyre::Result<GameConfig> {
    let json = tokio::fs::read_to_string(GAME_INFO_FILE_PATH)
        .await
        .map_err(|e| eyre::eyre!("Failed to read {GAME_INFO_FILE_PATH}: {e}"))?;

    Ok(serde_json::from_str(&json)?)
}

pub fn now_millis() -> eyre::Result<i64> {
    let elapsed = SystemTime::now().duration_since(UNIX_EPOCH)?;
    Ok(i64::try_from(elapsed.as_millis())?)
}

#[cfg(test)]
mod tests {
    use super::*;

    const PHRASE: &str = "abandon abandon abandon abandon abandon abandon \
                          abandon abandon abandon abandon abandon about";

    #[tokio::test]
    async fn reads_trimmed_lines_without_comments() {
        let path = std::env::temp_dir()
            .join(format!("ocean-claimer-lines-{}.txt", std::process::id()));
        tokio::fs::write(&path, "# accounts\n  first  \n\nsecond\n   \n# done\n")
            .await
            .unwrap();

        let lines = read_file_lines(&path).await.unwrap();
        tokio::fs::remove_file(&path).await.unwrap();

        assert_eq!(lines, vec!["first".to_string(), "second".to_string()]);
    }

    #[tokio::test]
    async fn missing_file_is_an_error() {
        let path = std::env::temp_dir().join("ocean-claimer-does-not-exist.txt");
        assert!(read_file_lines(path).await.is_err());
    }

    #[test]
    fn wallet_errors_name_the_line() {
        let lines = vec![PHRASE.to_string(), "broken words".to_string()];
        let err = wallets_from_lines(&lines).unwrap_err();

        assert!(err.to_string().starts_with("Mnemonic #2"));
    }

    #[test]
    fn builds_one_wallet_per_line() {
        let wallets = wallets_from_lines(&[PHRASE.to_string(), PHRASE.to_string()]).unwrap();

        assert_eq!(wallets.len(), 2);
        assert_eq!(wallets[0].address(), wallets[1].address());
    }

    #[test]
    fn clock_is_past_2024() {
        assert!(now_millis().unwrap() > 1_704_067_200_000);
    }
}
