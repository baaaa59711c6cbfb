use std::{fmt, str::FromStr};

use alloy::{hex, primitives::B256};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Sui account or object id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SuiAddress(B256);

impl SuiAddress {
    pub const LENGTH: usize = 32;

    pub fn new(bytes: [u8; Self::LENGTH]) -> Self {
        Self(B256::new(bytes))
    }
}

impl FromStr for SuiAddress {
    type Err = eyre::Report;

    /// Accepts short forms such as `0x6`, which are left-padded with zeros.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let digits = s
            .strip_prefix("0x")
            .or_else(|| s.strip_prefix("0X"))
            .unwrap_or(s);

        if digits.is_empty() || digits.len() > Self::LENGTH * 2 {
            eyre::bail!("Invalid Sui address length: {s}");
        }

        let padded = format!("{digits:0>64}");
        let bytes = hex::decode(padded).map_err(|e| eyre::eyre!("Invalid Sui address {s}: {e}"))?;

        Ok(Self(B256::from_slice(&bytes)))
    }
}

impl fmt::Display for SuiAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", hex::encode(self.0))
    }
}

impl Serialize for SuiAddress {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for SuiAddress {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_full_address() {
        let s = "0x4846a1f1030deffd9dea59016402d832588cf7e0c27b9e4c1a63d2b5e152873a";
        let address: SuiAddress = s.parse().unwrap();

        assert_eq!(address.to_string(), s);
    }

    #[test]
    fn pads_short_address() {
        let clock: SuiAddress = "0x6".parse().unwrap();

        let mut expected = [0u8; 32];
        expected[31] = 6;
        assert_eq!(clock, SuiAddress::new(expected));
        assert_eq!(
            clock.to_string(),
            "0x0000000000000000000000000000000000000000000000000000000000000006"
        );
    }

    #[test]
    fn accepts_missing_prefix_and_uppercase() {
        let lower: SuiAddress = "0xabcdef".parse().unwrap();
        let upper: SuiAddress = "ABCDEF".parse().unwrap();
        assert_eq!(lower, upper);
    }

    #[test]
    fn rejects_invalid_addresses() {
        assert!("".parse::<SuiAddress>().is_err());
        assert!("0x".parse::<SuiAddress>().is_err());
        assert!("0xzz".parse::<SuiAddress>().is_err());
        assert!(format!("0x{}", "1".repeat(65)).parse::<SuiAddress>().is_err());
    }

    #[test]
    fn serde_as_string() {
        let address: SuiAddress = "0x2".parse().unwrap();
        let json = serde_json::to_string(&address).unwrap();

        assert_eq!(
            json,
            "\"0x0000000000000000000000000000000000000000000000000000000000000002\""
        );
        assert_eq!(serde_json::from_str::<SuiAddress>(&json).unwrap(), address);
    }
}
