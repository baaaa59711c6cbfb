//! Projection of unclaimed fishing yield.
//!
//! Static game data ([`GameConfig`]) is combined with a point-in-time snapshot of an account's
//! on-chain state ([`AccountState`]) to work out how far the current fishing cycle has
//! progressed and how much OCEAN is waiting to be claimed. Every level multiplier is
//! basis-point scaled, i.e. `10_000` means `1.0`.
//!
//! All arithmetic is done on integers and [`Decimal`]s, never on floats, so the result matches
//! the on-chain rounding at the fifth fractional digit.

use std::collections::BTreeMap;

use rust_decimal::{Decimal, RoundingStrategy};
use serde::Deserialize;

use crate::scaling::to_decimal;

pub const BASIS_POINTS: i64 = 10_000;
pub const INIT_REWARD_DECIMALS: u32 = 9;

const MILLIS_PER_HOUR: i64 = 3_600_000;
const UNCLAIMED_DECIMAL_PLACES: u32 = 5;

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ProjectionError {
    #[error("no {table} entry with id {id} in game data")]
    ConfigLookup { table: &'static str, id: u64 },
    #[error("invalid input: {0}")]
    InvalidInput(String),
}

#[derive(Debug, thiserror::Error)]
pub enum GameDataError {
    #[error("unknown special boost type {0}")]
    UnknownBoostType(u8),
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct BoatLevel {
    /// Hours to finish a cycle, basis-point scaled.
    #[serde(deserialize_with = "de::number")]
    pub fishing_time: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct MeshLevel {
    #[serde(deserialize_with = "de::number")]
    pub speed: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct FishTypeLevel {
    #[serde(deserialize_with = "de::number")]
    pub rate: i64,
}

#[derive(Debug, Clone, Deserialize)]
struct RawSpecialBoost {
    #[serde(rename = "type", deserialize_with = "de::number")]
    kind: u8,
    #[serde(deserialize_with = "de::number")]
    rate: i64,
    #[serde(default, deserialize_with = "de::optional_number")]
    start_time: Option<i64>,
    #[serde(deserialize_with = "de::number")]
    duration: i64,
}

/// A time-limited yield multiplier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(try_from = "RawSpecialBoost")]
pub enum SpecialBoost {
    /// Active for everyone holding it during `[start_time, start_time + duration]`. Never active
    /// without a `start_time`.
    GlobalWindow {
        rate: i64,
        start_time: Option<i64>,
        duration: i64,
    },
    /// Active for `duration` ms starting at the account's own `special_boost_start_time`.
    PerAccountWindow { rate: i64, duration: i64 },
}

impl TryFrom<RawSpecialBoost> for SpecialBoost {
    type Error = GameDataError;

    fn try_from(raw: RawSpecialBoost) -> Result<Self, Self::Error> {
        match raw.kind {
            0 => Ok(Self::GlobalWindow {
                rate: raw.rate,
                start_time: raw.start_time,
                duration: raw.duration,
            }),
            1 => Ok(Self::PerAccountWindow {
                rate: raw.rate,
                duration: raw.duration,
            }),
            other => Err(GameDataError::UnknownBoostType(other)),
        }
    }
}

impl SpecialBoost {
    pub fn rate(&self) -> i64 {
        match *self {
            Self::GlobalWindow { rate, .. } | Self::PerAccountWindow { rate, .. } => rate,
        }
    }

    /// Both window ends are inclusive.
    pub fn is_active(&self, now_ms: i64, state: &AccountState) -> bool {
        let window = match *self {
            Self::GlobalWindow {
                start_time,
                duration,
                ..
            } => start_time.map(|start_time| (start_time, duration)),
            Self::PerAccountWindow { duration, .. } => state
                .special_boost_start_time
                .map(|start_time| (start_time, duration)),
        };

        window.is_some_and(|(start_time, duration)| {
            now_ms >= start_time && now_ms <= start_time.saturating_add(duration)
        })
    }
}

/// Static game data, loaded once at startup.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GameConfig {
    #[serde(deserialize_with = "de::number")]
    pub init_reward: u64,
    #[serde(deserialize_with = "de::table")]
    pub boat_level: BTreeMap<u64, BoatLevel>,
    #[serde(deserialize_with = "de::table")]
    pub mesh_level: BTreeMap<u64, MeshLevel>,
    #[serde(deserialize_with = "de::table")]
    pub fish_type_level: BTreeMap<u64, FishTypeLevel>,
    #[serde(default, deserialize_with = "de::table")]
    pub special_boost: BTreeMap<u64, SpecialBoost>,
}

/// Per-account claim state as stored in the game's dynamic field.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct AccountState {
    #[serde(deserialize_with = "de::number")]
    pub boat: u64,
    #[serde(deserialize_with = "de::number")]
    pub mesh: u64,
    #[serde(deserialize_with = "de::number")]
    pub seafood: u64,
    /// Milliseconds since the unix epoch.
    #[serde(deserialize_with = "de::number")]
    pub last_claim: i64,
    /// `None` and `Some(0)` both mean no boost.
    #[serde(default, deserialize_with = "de::optional_number")]
    pub special_boost: Option<u64>,
    #[serde(default, deserialize_with = "de::optional_number")]
    pub special_boost_start_time: Option<i64>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProjectionResult {
    /// Milliseconds until the current cycle completes, `0` once it has.
    pub time_to_claim_ms: u64,
    /// Claimable OCEAN, rounded half-up to 5 fractional digits.
    pub unclaimed_amount: Decimal,
    /// Percentage of the cycle that has elapsed. Not clamped.
    pub progress: Decimal,
}

impl ProjectionResult {
    pub fn is_claimable(&self) -> bool {
        self.progress >= Decimal::ONE_HUNDRED
    }

    pub fn minutes_to_claim(&self) -> Decimal {
        Decimal::from(self.time_to_claim_ms) / Decimal::from(60_000)
    }
}

fn lookup<'a, T>(
    table: &'a BTreeMap<u64, T>,
    name: &'static str,
    id: u64,
) -> Result<&'a T, ProjectionError> {
    table
        .get(&id)
        .ok_or(ProjectionError::ConfigLookup { table: name, id })
}

/// Projects the unclaimed yield of one account at `now_ms`.
///
/// Without game data there is nothing to project and an all-zero result is returned. An
/// account without claim state is entitled to the initial reward right away.
pub fn project(
    config: Option<&GameConfig>,
    state: Option<&AccountState>,
    now_ms: i64,
) -> Result<ProjectionResult, ProjectionError> {
    let Some(config) = config else {
        return Ok(ProjectionResult::default());
    };

    let Some(state) = state else {
        return Ok(ProjectionResult {
            time_to_claim_ms: 0,
            unclaimed_amount: to_decimal(config.init_reward, INIT_REWARD_DECIMALS),
            progress: Decimal::ONE_HUNDRED,
        });
    };

    let boat = lookup(&config.boat_level, "boat level", state.boat)?;
    let mesh = lookup(&config.mesh_level, "mesh level", state.mesh)?;
    let fish_type = lookup(&config.fish_type_level, "fish type level", state.seafood)?;

    let fishing_time_ms = boat
        .fishing_time
        .checked_mul(MILLIS_PER_HOUR)
        .map(|scaled| scaled / BASIS_POINTS)
        .filter(|ms| *ms > 0)
        .ok_or_else(|| {
            ProjectionError::InvalidInput(format!(
                "boat level {} has fishing time {}, cycle length must be positive",
                state.boat, boat.fishing_time
            ))
        })?;

    let cycle_end = state
        .last_claim
        .checked_add(fishing_time_ms)
        .ok_or_else(|| {
            ProjectionError::InvalidInput(format!("last claim {} overflows", state.last_claim))
        })?;
    let time_to_claim = cycle_end.saturating_sub(now_ms).max(0);

    let cycle = Decimal::from(fishing_time_ms);
    let elapsed = Decimal::from(fishing_time_ms) - Decimal::from(time_to_claim);
    let overflow = |what: &str| {
        ProjectionError::InvalidInput(format!(
            "{what} overflows for boat {} mesh {} seafood {}",
            state.boat, state.mesh, state.seafood
        ))
    };

    let mut amount = elapsed
        .checked_div(cycle)
        .and_then(|fraction| apply_basis_points(fraction, boat.fishing_time))
        .and_then(|amount| apply_basis_points(amount, mesh.speed))
        .and_then(|amount| apply_basis_points(amount, fish_type.rate))
        .ok_or_else(|| overflow("yield"))?;

    if let Some(boost_id) = state.special_boost.filter(|id| *id != 0) {
        let boost = lookup(&config.special_boost, "special boost", boost_id)?;
        if boost.is_active(now_ms, state) {
            amount = apply_basis_points(amount, boost.rate())
                .ok_or_else(|| overflow("boosted yield"))?;
        }
    }

    let progress = elapsed
        .checked_mul(Decimal::ONE_HUNDRED)
        .and_then(|scaled| scaled.checked_div(cycle))
        .ok_or_else(|| overflow("progress"))?;

    Ok(ProjectionResult {
        time_to_claim_ms: time_to_claim.unsigned_abs(),
        unclaimed_amount: amount.round_dp_with_strategy(
            UNCLAIMED_DECIMAL_PLACES,
            RoundingStrategy::MidpointAwayFromZero,
        ),
        progress,
    })
}

/// `amount * factor / 10_000`, `None` on overflow.
fn apply_basis_points(amount: Decimal, factor: i64) -> Option<Decimal> {
    amount
        .checked_mul(Decimal::from(factor))?
        .checked_div(Decimal::from(BASIS_POINTS))
}

/// Sui renders `u64` fields as JSON strings, while hand-written game data uses plain numbers.
mod de {
    use std::{collections::BTreeMap, fmt::Display, str::FromStr};

    use serde::{de::Error, Deserialize, Deserializer};

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum NumberOrString<T> {
        Number(T),
        String(String),
    }

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Table<T> {
        List(Vec<T>),
        Map(BTreeMap<String, T>),
    }

    pub fn number<'de, D, T>(deserializer: D) -> Result<T, D::Error>
    where
        D: Deserializer<'de>,
        T: Deserialize<'de> + FromStr,
        T::Err: Display,
    {
        match NumberOrString::<T>::deserialize(deserializer)? {
            NumberOrString::Number(number) => Ok(number),
            NumberOrString::String(s) => s.trim().parse().map_err(D::Error::custom),
        }
    }

    /// Move's `Option<T>` as older nodes render it: a vector of at most one element.
    #[derive(Deserialize)]
    struct MoveOption<T> {
        vec: Vec<NumberOrString<T>>,
    }

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum MaybeNumber<T> {
        Plain(NumberOrString<T>),
        Wrapped(MoveOption<T>),
        Struct { fields: MoveOption<T> },
    }

    /// Accepts `null`, a number, a numeric string (empty means `None`), `{"vec": [..]}` and
    /// `{"fields": {"vec": [..]}}`.
    pub fn optional_number<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
    where
        D: Deserializer<'de>,
        T: Deserialize<'de> + FromStr,
        T::Err: Display,
    {
        let value = match Option::<MaybeNumber<T>>::deserialize(deserializer)? {
            None => return Ok(None),
            Some(MaybeNumber::Plain(value)) => value,
            Some(
                MaybeNumber::Wrapped(MoveOption { vec })
                | MaybeNumber::Struct {
                    fields: MoveOption { vec },
                },
            ) => match vec.into_iter().next() {
                Some(value) => value,
                None => return Ok(None),
            },
        };

        match value {
            NumberOrString::Number(number) => Ok(Some(number)),
            NumberOrString::String(s) if s.trim().is_empty() => Ok(None),
            NumberOrString::String(s) => s.trim().parse().map(Some).map_err(D::Error::custom),
        }
    }

    /// Level tables come either as arrays indexed by id or as objects keyed by id.
    pub fn table<'de, D, T>(deserializer: D) -> Result<BTreeMap<u64, T>, D::Error>
    where
        D: Deserializer<'de>,
        T: Deserialize<'de>,
    {
        match Table::<T>::deserialize(deserializer)? {
            Table::List(entries) => Ok((0u64..).zip(entries).collect()),
            Table::Map(entries) => entries
                .into_iter()
                .map(|(id, entry)| {
                    id.trim()
                        .parse::<u64>()
                        .map(|id| (id, entry))
                        .map_err(D::Error::custom)
                })
                .collect(),
        }
    }
}
