//! Heuristic quality score for a set of planned routes.
//!
//! The score blends two views of a plan, each in `0..=100`:
//!
//! - *efficiency*: stops served per kilometre driven, times ten, capped at
//!   100;
//! - *balance*: how close the longest leg is to the average leg. A plan whose
//!   longest leg is three times the average scores zero here.
//!
//! Legs are the distances from the previous point to each stop, so return
//! legs do not count.

use crate::{VehicleRoute, fuel::round_to};

/// Score `routes` in `0..=100`, rounded to two decimals.
///
/// Plans with no stops score zero.
///
/// # Examples
/// ```
/// use sahayog_core::quality_score;
///
/// assert_eq!(quality_score(&[]), 0.0);
/// ```
#[must_use]
pub fn quality_score(routes: &[VehicleRoute]) -> f64 {
    let legs: Vec<u64> = routes
        .iter()
        .flat_map(|route| route.stops.iter())
        .map(|stop| stop.distance_from_previous_m)
        .collect();
    score_legs(&legs)
}

fn score_legs(legs: &[u64]) -> f64 {
    let Some(longest) = legs.iter().max().copied() else {
        return 0.0;
    };
    let stops = legs.len() as f64;
    let total_m = legs.iter().map(|leg| *leg as f64).sum::<f64>();

    let efficiency = (stops / (total_m / 1_000.0).max(1.0) * 10.0).min(100.0);

    let average = total_m / stops;
    let balance = if average > 0.0 {
        (100.0 - (longest as f64 - average) / average * 50.0).max(0.0)
    } else {
        100.0
    };

    round_to((efficiency + balance) / 2.0, 2).clamp(0.0, 100.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    fn empty_plan_scores_zero() {
        assert!(score_legs(&[]).abs() < f64::EPSILON);
    }

    #[rstest]
    fn co_located_stops_have_perfect_balance() {
        // 3 stops over less than 1 km: efficiency 30, balance 100.
        assert!((score_legs(&[0, 0, 0]) - 65.0).abs() < 1e-9);
    }

    #[rstest]
    fn even_legs_have_perfect_balance() {
        // 4 stops over 4 km: efficiency 10, balance 100.
        assert!((score_legs(&[1_000; 4]) - 55.0).abs() < 1e-9);
    }

    #[rstest]
    fn one_long_leg_drags_balance_down() {
        // 2 stops over 4 km: efficiency 5; average 2 km, longest 3 km so
        // balance is 100 - 0.5 * 50 = 75.
        assert!((score_legs(&[1_000, 3_000]) - 40.0).abs() < 1e-9);
    }

    #[rstest]
    #[case(&[10, 50_000, 5])]
    #[case(&[1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1])]
    #[case(&[u64::from(u32::MAX), 3])]
    fn score_stays_in_range(#[case] legs: &[u64]) {
        let score = score_legs(legs);
        assert!((0.0..=100.0).contains(&score), "score {score} out of range");
    }
}
