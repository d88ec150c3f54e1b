//! Trading Calendar
//!
//! Turns a number of trading periods into a calendar date range.
//! Quotes only exist for weekdays, so weekends are skipped when counting.
//! Exchange holidays are not modelled; the lookback multiplier leaves
//! enough slack for them.

use chrono::{Datelike, NaiveDate, Weekday};
use serde::{Deserialize, Serialize};

use super::error::AnalysisError;

/// Default number of window lengths of history to request
pub const DEFAULT_LOOKBACK_MULTIPLIER: usize = 2;

/// Inclusive date range to request quotes for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TradingRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl TradingRange {
    pub fn contains(&self, date: NaiveDate) -> bool {
        date >= self.start && date <= self.end
    }
}

pub fn is_weekend(date: NaiveDate) -> bool {
    matches!(date.weekday(), Weekday::Sat | Weekday::Sun)
}

/// Latest weekday on or before `date`
pub fn last_trading_day(date: NaiveDate) -> NaiveDate {
    let mut day = date;
    while is_weekend(day) {
        match day.pred_opt() {
            Some(prev) => day = prev,
            None => break,
        }
    }
    day
}

/// Date range covering `periods * multiplier` weekdays before the last trading day
pub fn trading_range(
    periods: usize,
    as_of: NaiveDate,
    multiplier: usize,
) -> Result<TradingRange, AnalysisError> {
    if periods == 0 {
        return Err(AnalysisError::invalid("periods must be > 0"));
    }
    if multiplier == 0 {
        return Err(AnalysisError::invalid("lookback multiplier must be > 0"));
    }

    let wanted = periods
        .checked_mul(multiplier)
        .ok_or_else(|| AnalysisError::invalid("lookback length overflows"))?;

    let end = last_trading_day(as_of);
    let mut start = end;
    let mut counted = 0;
    while counted < wanted {
        start = start
            .pred_opt()
            .ok_or_else(|| AnalysisError::invalid("lookback reaches before the earliest date"))?;
        if !is_weekend(start) {
            counted += 1;
        }
    }

    Ok(TradingRange { start, end })
}
