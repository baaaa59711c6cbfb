// OCEAN game on Sui mainnet
pub const CLAIM_PACKAGE_ID: &str =
    "0x1efaf509c9b7e986ee724596f526a22b474b15c376136772c00b8452f204d2d1";
pub const CLAIM_OBJECT_ID: &str =
    "0x4846a1f1030deffd9dea59016402d832588cf7e0c27b9e4c1a63d2b5e152873a";
pub const CLAIM_MODULE: &str = "game";
pub const CLAIM_FUNCTION: &str = "claim";
pub const OCEAN_COIN_TYPE: &str =
    "0xa8816d3a6e3136e86bc2873b1f94a15cadc8af2703c075f2d546c2ae367f4df9::ocean::OCEAN";

pub const SUI_COIN_TYPE: &str = "0x2::sui::SUI";
pub const CLOCK_OBJECT_ID: &str = "0x6";

pub const SUI_DECIMALS: u32 = 9;
pub const OCEAN_DECIMALS: u32 = 9;

pub const SUI_EXPLORER_URL: &str = "https://suiscan.xyz/mainnet";

// FILES
pub const CONFIG_FILE_PATH: &str = "data/config.toml";
pub const MNEMONICS_FILE_PATH: &str = "data/mnemonics.txt";
pub const SENDER_MNEMONIC_FILE_PATH: &str = "data/sender_mnemonic.txt";
pub const RECIPIENTS_FILE_PATH: &str = "data/recipients.txt";
pub const GAME_INFO_FILE_PATH: &str = "data/game_info.json";

pub const LOG_DIR: &str = "logs";
pub const LOG_FILE_NAME: &str = "logs.txt";
