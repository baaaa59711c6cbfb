pub mod address;
pub mod claimer;
pub mod config;
pub mod constants;
pub mod logger;
pub mod projection;
pub mod rpc;
pub mod scaling;
pub mod sender;
pub mod utils;
pub mod wallet;
