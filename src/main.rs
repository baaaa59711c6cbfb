use ocean_claimer::{
    claimer::claim_for_all,
    config::Config,
    logger::init_default_logger,
    utils::{read_game_info, read_mnemonics},
};

#[tokio::main]
async fn main() -> eyre::Result<()> {
    let _guard = init_default_logger();

    let config = Config::read_default().await?;
    let game = read_game_info().await?;
    let wallets = read_mnemonics().await?;

    claim_for_all(config, game, wallets).await
}
