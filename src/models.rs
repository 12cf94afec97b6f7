//! Data models for the Fee Engine.
//!
//! The `models` module defines the serialisable structs and enums
//! representing tariff rules ("fee models"), parking sessions and the
//! request/response envelopes of the HTTP API.  These data types derive
//! `Serialize` and `Deserialize` so that they can be persisted as JSON
//! configuration files or transmitted over a network.  The `FeeRule`
//! field names are the de facto storage schema for existing tariff
//! configuration data and must not be renamed.

use anyhow::Result;
use chrono::{NaiveDateTime, Weekday};
use serde::{Deserialize, Serialize};

/// Day selector of a fee rule.
///
/// `PH` (public holiday) is a distinguished pseudo-day: when the
/// calendar date is listed in the holiday calendar, `PH` rules replace
/// the weekday rules for that date entirely.  A `PH` rule never matches
/// by weekday name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DaySelector {
    Mon,
    Tue,
    Wed,
    Thu,
    Fri,
    Sat,
    Sun,
    #[serde(rename = "PH")]
    PublicHoliday,
}

impl DaySelector {
    /// Maps a chrono weekday to its selector.  Never produces
    /// [`DaySelector::PublicHoliday`]; holiday override is decided by
    /// the calendar, not by the weekday.
    pub fn from_weekday(weekday: Weekday) -> Self {
        match weekday {
            Weekday::Mon => DaySelector::Mon,
            Weekday::Tue => DaySelector::Tue,
            Weekday::Wed => DaySelector::Wed,
            Weekday::Thu => DaySelector::Thu,
            Weekday::Fri => DaySelector::Fri,
            Weekday::Sat => DaySelector::Sat,
            Weekday::Sun => DaySelector::Sun,
        }
    }
}

/// Billing mode of a fee rule.
///
/// Only `Hourly` is computed today.  The other tags are recognised so
/// that existing configuration rows deserialize cleanly; they bill as
/// zero and are flagged with a warning when encountered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RateType {
    Hourly,
    PerEntry,
    HourlyOverlap,
    PerEntryOverlap,
}

/// One configured billing block of a tariff.
///
/// A rule applies to a single vehicle type, on a single day selector,
/// within a time-of-day window that never spans midnight (a multi-block
/// day is the mechanism for covering 24 hours).  All monetary amounts
/// are integers in minor currency units.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeeRule {
    /// Vehicle category, matched by exact equality (e.g. `"Car/Van"`,
    /// `"Motorcycle"`, `"Lorry"`).
    pub vehicle_type: String,
    /// Day this block applies to, or `PH` for public holidays.
    pub day_of_week: DaySelector,
    /// Start of the block's window within a day, `"HH:MM"` or
    /// `"HH:MM:SS"` wall-clock.  Unparseable values fail the
    /// computation; they are never silently defaulted.
    pub from_time: String,
    /// End of the block's window, same format as `from_time`.
    pub to_time: String,
    /// Billing mode; see [`RateType`].
    pub rate_type: RateType,
    /// Minutes per billing unit (60 = hourly).  Billed duration is
    /// always rounded up to the next whole unit.
    pub every: u32,
    /// Charge per billing unit.
    pub min_fee: u32,
    /// Minutes of free parking, evaluated once against the whole
    /// entry-to-exit duration, never per day or per block.
    pub grace_time: u32,
    /// Floor applied to this block's computed fee before it is added to
    /// the day total.  Zero means no floor.
    #[serde(default)]
    pub min_charge: u32,
    /// Daily ceiling.  The smallest positive `max_charge` among a day's
    /// applicable rules caps that day's total fee.  Zero means this
    /// rule contributes no cap.
    #[serde(default)]
    pub max_charge: u32,
    /// Inclusive start of the rule's validity window; `None` means
    /// unbounded in that direction.
    #[serde(default)]
    pub effective_start: Option<NaiveDateTime>,
    /// Inclusive end of the rule's validity window.
    #[serde(default)]
    pub effective_end: Option<NaiveDateTime>,
}

/// One parking session to be billed.  The engine never persists
/// sessions; they are pure computation input.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
    pub entry_datetime: NaiveDateTime,
    pub exit_datetime: NaiveDateTime,
    pub vehicle_type: String,
}

/// Input to `POST /api/fees/compute`.
///
/// `fee_rules` and `public_holidays` may be supplied inline; when
/// omitted the server falls back to the configuration loaded at
/// startup.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeeRequest {
    pub entry_datetime: NaiveDateTime,
    pub exit_datetime: NaiveDateTime,
    pub vehicle_type: String,
    #[serde(default)]
    pub fee_rules: Option<Vec<FeeRule>>,
    /// Holiday dates as strings; full datetimes are accepted and
    /// truncated to their date component.
    #[serde(default)]
    pub public_holidays: Option<Vec<String>>,
}

/// Output of a single fee computation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeeResponse {
    /// Total fee in minor currency units, always `>= 0`.
    pub fee: i64,
}

/// Input to `POST /api/fees/compute-batch`, used by settlement and
/// reconciliation runs over many closed sessions.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchFeeRequest {
    pub sessions: Vec<Session>,
    #[serde(default)]
    pub fee_rules: Option<Vec<FeeRule>>,
    #[serde(default)]
    pub public_holidays: Option<Vec<String>>,
}

/// Per-session outcome of a batch run.  A session that failed
/// validation carries its error message instead of a fee; one bad
/// session never fails the whole batch.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionFeeResult {
    pub session: Session,
    pub fee: Option<i64>,
    pub error: Option<String>,
}

/// Aggregate result of a batch run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchFeeResponse {
    pub results: Vec<SessionFeeResult>,
}

/// A fee model configuration document: the set of billing blocks
/// configured for one vehicle type, stored as a versioned JSON file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeeModel {
    /// Vehicle category these rules belong to, e.g. `"Car/Van"`.
    pub vehicle_type: String,
    /// Version string, e.g. `"2025"` or `"2025-Q4"`.
    pub version: String,
    /// The billing blocks of this model.
    pub rules: Vec<FeeRule>,
}

/// Load all fee model definitions from a directory.
///
/// Scans the directory for `.json` files and parses each as a
/// [`FeeModel`].  The `holidays.json` calendar file is skipped; it is
/// loaded separately.  Files that fail to parse are logged and skipped
/// so one malformed document does not take the service down.
pub fn load_fee_models_from_dir(path: &std::path::Path) -> Result<Vec<FeeModel>> {
    let mut models = Vec::new();
    if path.is_dir() {
        for entry in std::fs::read_dir(path)? {
            let entry = entry?;
            if !entry.file_type()?.is_file() {
                continue;
            }
            if entry.file_name() == "holidays.json" {
                continue;
            }
            let file_path = entry.path();
            if file_path.extension().map_or(true, |ext| ext != "json") {
                continue;
            }
            let data = std::fs::read_to_string(&file_path)?;
            match serde_json::from_str::<FeeModel>(&data) {
                Ok(model) => models.push(model),
                Err(err) => {
                    tracing::warn!(file = ?file_path, %err, "failed to parse fee model, skipping");
                }
            }
        }
    }
    Ok(models)
}
