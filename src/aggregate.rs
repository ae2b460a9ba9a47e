use std::collections::BTreeMap;

use crate::error::DashboardError;
use crate::models::{ChallengePoint, SignupActivityPoint, Track, UserRecord};

pub const DEFAULT_SMOOTHING_WINDOW: usize = 7;

/// Sign-ups per calendar date, ascending, one point per date that occurs.
pub fn signup_activity(roster: &[UserRecord]) -> Vec<SignupActivityPoint> {
    let mut counts: BTreeMap<chrono::NaiveDate, usize> = BTreeMap::new();
    for user in roster {
        *counts.entry(user.signup_date).or_insert(0) += 1;
    }

    counts
        .into_iter()
        .map(|(date, count)| SignupActivityPoint { date, count })
        .collect()
}

/// Running total per track, starting from the first day's value.
pub fn cumulative_sum(daily: &[ChallengePoint<u32>]) -> Vec<ChallengePoint<u64>> {
    let mut totals = [0u64; 3];
    daily
        .iter()
        .map(|point| {
            for track in Track::ALL {
                totals[track as usize] += u64::from(point.get(track));
            }
            ChallengePoint::from_fn(point.date, |track| totals[track as usize])
        })
        .collect()
}

/// Trailing moving average per track. Positions without a full window are
/// dropped; each output carries the date of its window's last day.
pub fn smooth(
    daily: &[ChallengePoint<u32>],
    window: usize,
) -> Result<Vec<ChallengePoint<f64>>, DashboardError> {
    if window == 0 {
        return Err(DashboardError::InvalidParameter(
            "smoothing window must be at least 1".to_string(),
        ));
    }

    Ok(daily
        .windows(window)
        .map(|slice| {
            let last = &slice[slice.len() - 1];
            ChallengePoint::from_fn(last.date, |track| {
                let sum: f64 = slice.iter().map(|point| f64::from(point.get(track))).sum();
                sum / window as f64
            })
        })
        .collect())
}
