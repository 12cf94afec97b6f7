//! Parking fee computation engine.
//!
//! The `engine` module turns a parking session (entry time, exit time,
//! vehicle type) plus a set of [`FeeRule`]s and a holiday calendar into
//! a total fee in minor currency units.  The computation is a pure
//! function of its arguments: no I/O, no shared state, deterministic
//! and therefore safe to re-run for reconciliation or audit.  Batch
//! settlement runs use the [`rayon`] crate to fan per-session
//! computations out across CPU cores.
//!
//! The algorithm, in brief: a single grace-period check against the
//! entry day's rules, then a day-by-day walk from entry to exit.  Each
//! calendar day selects its own rules (public holidays override the
//! weekday), bills every matching time block on its overlap with the
//! day's occupied segment, floors each block at its minimum charge,
//! sums the blocks, and clips the day at the smallest configured daily
//! maximum.  Per-day totals add up to the session fee.

use crate::calendar::{day_selector_for, end_of_day_time, parse_time_of_day, HolidaySet};
use crate::error::{FeeError, Result};
use crate::models::{FeeRule, RateType, Session, SessionFeeResult};
use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use rayon::prelude::*;
use tracing::{debug, warn};

/// Sanity ceiling on the day loop (about five years).  The algorithm
/// itself iterates one step per calendar day spanned, so callers at a
/// service boundary reject longer sessions via [`check_session_span`]
/// before computing.
pub const MAX_SESSION_DAYS: i64 = 366 * 5;

/// Validates the caller contract for a session at a service boundary:
/// `exit >= entry` and the span is under [`MAX_SESSION_DAYS`].
pub fn check_session_span(entry: NaiveDateTime, exit: NaiveDateTime) -> Result<()> {
    if exit < entry {
        return Err(FeeError::ExitBeforeEntry { entry, exit });
    }
    let days = (exit - entry).num_days();
    if days > MAX_SESSION_DAYS {
        return Err(FeeError::SessionTooLong {
            days,
            limit: MAX_SESSION_DAYS,
        });
    }
    Ok(())
}

/// Computes the total parking fee for one session.
///
/// `rules` may be unsorted and may contain rules for other vehicle
/// types, day selectors and validity windows; filtering happens here.
/// A day with no matching rules simply contributes zero, so an empty
/// rule list yields a zero fee rather than an error.
///
/// Returns an error for `exit < entry` and for configuration problems
/// surfaced during the walk (unparseable block times, zero billing
/// units).
pub fn compute_fee(
    entry: NaiveDateTime,
    exit: NaiveDateTime,
    vehicle_type: &str,
    rules: &[FeeRule],
    holidays: &HolidaySet,
) -> Result<i64> {
    if exit < entry {
        return Err(FeeError::ExitBeforeEntry { entry, exit });
    }

    let total_minutes = (exit - entry).num_minutes();

    // Grace is granted once against the whole session, judged solely by
    // the entry day's selector.  It overrides every other rule,
    // including minimum charges.
    let entry_selector = day_selector_for(entry.date(), holidays);
    let max_grace = rules
        .iter()
        .filter(|r| r.vehicle_type == vehicle_type && r.day_of_week == entry_selector)
        .map(|r| i64::from(r.grace_time))
        .max()
        .unwrap_or(0);
    if total_minutes <= max_grace {
        debug!(total_minutes, max_grace, "session within grace period");
        return Ok(0);
    }

    let day_end_time = end_of_day_time();
    let mut total_fee: i64 = 0;
    let mut day = entry.date();

    while day.and_time(NaiveTime::MIN) <= exit {
        let day_start = day.and_time(NaiveTime::MIN);
        let day_end = day.and_time(day_end_time);
        let segment_start = entry.max(day_start);
        let segment_end = exit.min(day_end);

        // The day after a midnight exit produces an inverted segment;
        // it contributes nothing.
        if segment_start <= segment_end {
            let selector = day_selector_for(day, holidays);
            let daily_rules: Vec<&FeeRule> = rules
                .iter()
                .filter(|r| {
                    r.vehicle_type == vehicle_type
                        && r.day_of_week == selector
                        && r.effective_start.map_or(true, |s| s <= segment_end)
                        && r.effective_end.map_or(true, |e| e >= segment_start)
                })
                .collect();

            // Smallest positive max_charge among the day's rules caps
            // the whole day, not individual blocks.
            let daily_cap = daily_rules
                .iter()
                .filter(|r| r.max_charge > 0)
                .map(|r| i64::from(r.max_charge))
                .min();

            let mut daily_fee: i64 = 0;
            for rule in &daily_rules {
                daily_fee += block_fee(rule, day, segment_start, segment_end)?;
            }
            if let Some(cap) = daily_cap {
                daily_fee = daily_fee.min(cap);
            }
            debug!(date = %day, ?selector, daily_fee, "billed day segment");
            total_fee += daily_fee;
        }

        day = match day.succ_opt() {
            Some(next) => next,
            None => break,
        };
    }

    Ok(total_fee)
}

/// Fee contributed by one rule's block on one calendar day.
///
/// The block window is the rule's `from_time`/`to_time` applied to
/// `day`, intersected with the occupied segment of that day.  An empty
/// intersection contributes nothing.  Blocks are additive: overlapping
/// rules each bill their own overlap, and only the daily cap limits the
/// sum.
fn block_fee(
    rule: &FeeRule,
    day: NaiveDate,
    segment_start: NaiveDateTime,
    segment_end: NaiveDateTime,
) -> Result<i64> {
    let from = parse_time_of_day(&rule.from_time)?;
    let to = parse_time_of_day(&rule.to_time)?;

    let block_start = day.and_time(from).max(segment_start);
    let block_end = day.and_time(to).min(segment_end);
    if block_start >= block_end {
        return Ok(0);
    }

    let fee = match rule.rate_type {
        RateType::Hourly => {
            if rule.every == 0 {
                return Err(FeeError::ZeroBillingUnit);
            }
            let duration_minutes = (block_end - block_start).num_minutes();
            let every = i64::from(rule.every);
            let billed_units = (duration_minutes + every - 1) / every;
            billed_units * i64::from(rule.min_fee)
        }
        other => {
            // Reserved billing modes pass through as zero, skipping the
            // block floor as well.
            warn!(rate_type = ?other, vehicle_type = %rule.vehicle_type, "unsupported rate type billed as zero");
            return Ok(0);
        }
    };

    if rule.min_charge > 0 {
        Ok(fee.max(i64::from(rule.min_charge)))
    } else {
        Ok(fee)
    }
}

/// Computes fees for a batch of closed sessions in parallel.
///
/// Used by settlement and reconciliation runs.  Each session is
/// validated and computed independently; a failing session carries its
/// error message in the result instead of aborting the batch.
pub fn run_batch(
    sessions: Vec<Session>,
    rules: &[FeeRule],
    holidays: &HolidaySet,
) -> Vec<SessionFeeResult> {
    sessions
        .into_par_iter()
        .map(|session| {
            let outcome = check_session_span(session.entry_datetime, session.exit_datetime)
                .and_then(|_| {
                    compute_fee(
                        session.entry_datetime,
                        session.exit_datetime,
                        &session.vehicle_type,
                        rules,
                        holidays,
                    )
                });
            match outcome {
                Ok(fee) => SessionFeeResult {
                    session,
                    fee: Some(fee),
                    error: None,
                },
                Err(err) => SessionFeeResult {
                    session,
                    fee: None,
                    error: Some(err.to_string()),
                },
            }
        })
        .collect()
}
