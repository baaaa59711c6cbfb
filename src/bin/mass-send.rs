use ocean_claimer::{
    config::Config,
    logger::init_default_logger,
    sender::send_to_all,
    utils::{read_recipients, read_sender_wallet},
};

#[tokio::main]
async fn main() -> eyre::Result<()> {
    let _guard = init_default_logger();

    let config = Config::read_default().await?;
    let sender = read_sender_wallet().await?;
    let recipients = read_recipients().await?;

    let summary = send_to_all(config, sender, recipients).await?;

    if summary.failed > 0 {
        eyre::bail!("{} transfers failed", summary.failed);
    }

    Ok(())
}
