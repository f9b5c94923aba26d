//! Result classification for repricing outcomes.
//!
//! The decision engine reports what it did as free text in `explained`.
//! [`classify`] maps that text, plus the `isRepriced` and `active` flags, to a
//! closed [`ResultCode`]. Markers are matched as exact, case-sensitive
//! substrings and the rules run in a fixed precedence order.

use serde::{Deserialize, Deserializer, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ResultCode {
    #[serde(rename = "SPECIAL_422")]
    Special422,
    ChangeUp,
    ChangeDown,
    IgnoreFloor,
    IgnoreLowest,
    IgnoreSister,
    IgnoreSettings,
    Default,
}

impl ResultCode {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            ResultCode::Special422 => "SPECIAL_422",
            ResultCode::ChangeUp => "CHANGE_UP",
            ResultCode::ChangeDown => "CHANGE_DOWN",
            ResultCode::IgnoreFloor => "IGNORE_FLOOR",
            ResultCode::IgnoreLowest => "IGNORE_LOWEST",
            ResultCode::IgnoreSister => "IGNORE_SISTER",
            ResultCode::IgnoreSettings => "IGNORE_SETTINGS",
            ResultCode::Default => "DEFAULT",
        }
    }
}

impl std::fmt::Display for ResultCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ClassificationError {
    #[error("reprice outcome is missing")]
    MissingOutcome,

    #[error("reprice outcome has neither a detail nor per-tier details")]
    MissingDetail,

    #[error("reprice detail has no explanation text")]
    MissingExplanation,
}

/// The decision engine's report for one price point.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RepriceDetail {
    #[serde(default, deserialize_with = "deserialize_flag")]
    pub is_repriced: bool,
    pub explained: Option<String>,
    /// `Some(false)` when the engine deactivated the price break.
    #[serde(default, deserialize_with = "deserialize_optional_flag")]
    pub active: Option<bool>,
}

impl RepriceDetail {
    fn explained(&self) -> Result<&str, ClassificationError> {
        self.explained
            .as_deref()
            .ok_or(ClassificationError::MissingExplanation)
    }
}

/// A repricing outcome: a single detail, per-tier details, or both.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RepriceOutcome {
    pub reprice_details: Option<RepriceDetail>,
    #[serde(default)]
    pub list_of_reprice_details: Vec<RepriceDetail>,
}

impl RepriceOutcome {
    /// The detail the outcome is judged by: the first repriced tier, else the
    /// first tier, else the single detail.
    fn context_detail(&self) -> Option<&RepriceDetail> {
        if self.list_of_reprice_details.is_empty() {
            self.reprice_details.as_ref()
        } else {
            self.list_of_reprice_details
                .iter()
                .find(|d| d.is_repriced)
                .or_else(|| self.list_of_reprice_details.first())
        }
    }
}

const MARKER_422: &str = "ERROR:422";
const MARKER_FLOOR: &str = "#HitFloor";
const MARKERS_LOWEST: &[&str] = &[
    "IGNORE:#Lowest",
    "IGNORE: #Lowest",
    "#HasBuyBox",
    "IGNORED: Price down only #UP",
];
const MARKERS_SISTER: &[&str] = &["IGNORE:#Sister", "IGNORE: #Sister"];
const MARKER_SETTINGS: &str = "DUMMY";
const MARKER_DOWN: &str = "$DOWN";
const MARKER_UP: &str = "$UP";

/// Classify a repricing outcome. First matching rule wins.
///
/// The per-tier list is scanned for `ERROR:422` only when it is non-empty;
/// an empty list does not fall back to anything beyond the single detail.
/// A deactivated price break in a per-tier outcome is reported as
/// [`ResultCode::ChangeUp`].
///
/// # Errors
///
/// - [`ClassificationError::MissingOutcome`] when `outcome` is `None`.
/// - [`ClassificationError::MissingDetail`] when there is nothing to judge.
/// - [`ClassificationError::MissingExplanation`] when an inspected detail
///   carries no `explained` text.
pub fn classify(outcome: Option<&RepriceOutcome>) -> Result<ResultCode, ClassificationError> {
    let outcome = outcome.ok_or(ClassificationError::MissingOutcome)?;

    if let Some(single) = &outcome.reprice_details {
        if single.explained()?.contains(MARKER_422) {
            return Ok(ResultCode::Special422);
        }
    }
    if !outcome.list_of_reprice_details.is_empty() {
        for detail in &outcome.list_of_reprice_details {
            if detail.explained()?.contains(MARKER_422) {
                return Ok(ResultCode::Special422);
            }
        }
    }

    let context = outcome
        .context_detail()
        .ok_or(ClassificationError::MissingDetail)?;

    if !outcome.list_of_reprice_details.is_empty() && context.active == Some(false) {
        return Ok(ResultCode::ChangeUp);
    }

    let explained = context.explained()?;
    let code = if context.is_repriced {
        if explained.contains(MARKER_DOWN) {
            ResultCode::ChangeDown
        } else if explained.contains(MARKER_UP) {
            ResultCode::ChangeUp
        } else if explained.contains(MARKER_FLOOR) {
            ResultCode::IgnoreFloor
        } else {
            ResultCode::Default
        }
    } else if explained.contains(MARKER_FLOOR) {
        ResultCode::IgnoreFloor
    } else if contains_any(explained, MARKERS_LOWEST) {
        ResultCode::IgnoreLowest
    } else if contains_any(explained, MARKERS_SISTER) {
        ResultCode::IgnoreSister
    } else if explained.contains(MARKER_SETTINGS) {
        ResultCode::IgnoreSettings
    } else {
        ResultCode::Default
    };

    Ok(code)
}

fn contains_any(haystack: &str, needles: &[&str]) -> bool {
    needles.iter().any(|needle| haystack.contains(needle))
}

/// Accepts `true`/`false` or a numeric `0`/`1` as emitted by older engines.
#[derive(Deserialize)]
#[serde(untagged)]
enum Flag {
    Bool(bool),
    Number(i64),
}

impl From<Flag> for bool {
    fn from(flag: Flag) -> Self {
        match flag {
            Flag::Bool(b) => b,
            Flag::Number(n) => n != 0,
        }
    }
}

fn deserialize_flag<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    Option::<Flag>::deserialize(deserializer).map(|flag| flag.is_some_and(bool::from))
}

fn deserialize_optional_flag<'de, D>(deserializer: D) -> Result<Option<bool>, D::Error>
where
    D: Deserializer<'de>,
{
    Option::<Flag>::deserialize(deserializer).map(|flag| flag.map(bool::from))
}

#[cfg(test)]
#[path = "classify_test.rs"]
mod tests;
