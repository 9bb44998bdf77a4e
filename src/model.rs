use chrono::{DateTime, Local, NaiveDateTime, TimeZone};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use std::time::Duration;

pub(crate) const METER_MAX: u32 = 100;
pub(crate) const EXP_PER_LEVEL: u32 = 100;

/// Below this, hunger or energy dominates the mood.
pub(crate) const LOW_METER: u32 = 30;

pub(crate) const FEED_AMOUNT: u32 = 20;
pub(crate) const NAP_SECS: i64 = 6;
pub(crate) const WAKE_BONUS: u32 = 30;
pub(crate) const DEFEAT_ENERGY_LOSS: u32 = 15;
pub(crate) const EXP_GAIN_MIN: u32 = 15;
pub(crate) const EXP_GAIN_MAX: u32 = 30;

/// Relative weights of [win, lose].
pub(crate) const FIGHT_WEIGHTS: [f64; 2] = [0.7, 0.3];
pub(crate) const ENEMIES: [&str; 4] = ["slime", "goblin", "shadow being", "your ex"];

pub(crate) const TEEN_LEVEL: u32 = 3;
pub(crate) const ELDRITCH_LEVEL: u32 = 6;

#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord)]
#[serde(rename_all = "snake_case")]
pub(crate) enum Stage {
    #[default]
    Baby,
    Teen,
    #[serde(alias = "eldritch abomination")]
    Eldritch,
}

#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub(crate) enum Mood {
    #[default]
    Neutral,
    Hungry,
    Tired,
    Happy,
    Ecstatic,
    Bored,
    Energetic,
    #[serde(alias = "cosmically unstable")]
    CosmicallyUnstable,
}

/// Moods `pet` can leave behind.
pub(crate) const PETTED_MOODS: [Mood; 3] = [Mood::Happy, Mood::Ecstatic, Mood::Bored];

/// Moods a content pet drifts between.
pub(crate) const IDLE_MOODS: [Mood; 4] = [Mood::Happy, Mood::Neutral, Mood::Bored, Mood::Energetic];

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(from = "PetRecord")]
pub(crate) struct Pet {
    pub(crate) name: String,
    pub(crate) stage: Stage,
    pub(crate) hunger: u32,
    pub(crate) energy: u32,
    pub(crate) mood: Mood,
    pub(crate) level: u32,
    pub(crate) exp: u32,
    pub(crate) nap_until: Option<DateTime<Local>>,
    pub(crate) nap_ended: bool,
}

impl Pet {
    pub(crate) fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            stage: Stage::Baby,
            hunger: 50,
            energy: 50,
            mood: Mood::Neutral,
            level: 1,
            exp: 0,
            nap_until: None,
            nap_ended: false,
        }
    }

    /// Pull hand-edited or legacy values back inside the invariants.
    pub(crate) fn normalize(&mut self) {
        self.hunger = self.hunger.min(METER_MAX);
        self.energy = self.energy.min(METER_MAX);
        self.level = self.level.max(1);
        self.exp = self.exp.min(EXP_PER_LEVEL - 1);
    }
}

/// What the driver is allowed to show each turn.
#[derive(Clone, Debug, PartialEq)]
pub(crate) struct Snapshot {
    pub(crate) stage: Stage,
    pub(crate) mood: Mood,
    pub(crate) hunger: u32,
    pub(crate) energy: u32,
    pub(crate) level: u32,
    pub(crate) exp: u32,
    pub(crate) nap_remaining: Option<Duration>,
}

/// On-disk shape of a pet. Every field but the name is optional so that
/// older or damaged saves still load with constructor defaults.
#[derive(Deserialize)]
struct PetRecord {
    name: String,
    #[serde(default, deserialize_with = "lenient")]
    stage: Option<Stage>,
    #[serde(default, deserialize_with = "lenient")]
    hunger: Option<u32>,
    #[serde(default, deserialize_with = "lenient")]
    energy: Option<u32>,
    #[serde(default, deserialize_with = "lenient")]
    mood: Option<Mood>,
    #[serde(default, deserialize_with = "lenient")]
    level: Option<u32>,
    #[serde(default, deserialize_with = "lenient")]
    exp: Option<u32>,
    #[serde(default, deserialize_with = "nap_timestamp")]
    nap_until: Option<DateTime<Local>>,
    #[serde(default, deserialize_with = "lenient")]
    nap_ended: Option<bool>,
}

impl From<PetRecord> for Pet {
    fn from(r: PetRecord) -> Self {
        let fresh = Pet::new(r.name);
        let mut pet = Pet {
            stage: r.stage.unwrap_or(fresh.stage),
            hunger: r.hunger.unwrap_or(fresh.hunger),
            energy: r.energy.unwrap_or(fresh.energy),
            mood: r.mood.unwrap_or(fresh.mood),
            level: r.level.unwrap_or(fresh.level),
            exp: r.exp.unwrap_or(fresh.exp),
            nap_until: r.nap_until,
            nap_ended: r.nap_ended.unwrap_or(fresh.nap_ended),
            name: fresh.name,
        };
        pet.normalize();
        pet
    }
}

fn lenient<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned + Default,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    Ok(T::deserialize(value).unwrap_or_default())
}

/// Accepts RFC 3339 as well as the naive local `isoformat()` strings old
/// saves carry. Anything else means "not napping".
fn nap_timestamp<'de, D>(deserializer: D) -> Result<Option<DateTime<Local>>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    Ok(value.as_str().and_then(parse_timestamp))
}

pub(crate) fn parse_timestamp(s: &str) -> Option<DateTime<Local>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Local));
    }
    let naive = NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%.f").ok()?;
    Local.from_local_datetime(&naive).earliest()
}
