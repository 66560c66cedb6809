//! Ordering of score reports

use std::cmp::Ordering;

use super::ScoreReport;

/// Qualifying candidates first, best first; disqualified ones after them
/// in their input order
#[must_use]
pub fn rank(reports: Vec<ScoreReport>) -> Vec<ScoreReport> {
    let (mut qualified, disqualified): (Vec<_>, Vec<_>) =
        reports.into_iter().partition(|r| r.qualifies);

    qualified.sort_by(compare_qualified);
    qualified.extend(disqualified);
    qualified
}

/// Higher composite score wins; ties fall to lower P95, then lower CV
///
/// Absent P95 or CV sort as +infinity. The sort is stable, so full ties keep
/// input order.
#[must_use]
pub fn compare_qualified(a: &ScoreReport, b: &ScoreReport) -> Ordering {
    b.composite_score
        .total_cmp(&a.composite_score)
        .then_with(|| or_inf(a.stats.basic.p95).total_cmp(&or_inf(b.stats.basic.p95)))
        .then_with(|| {
            or_inf(a.stats.variability.coefficient_of_variation)
                .total_cmp(&or_inf(b.stats.variability.coefficient_of_variation))
        })
}

#[inline]
fn or_inf(value: Option<f64>) -> f64 {
    value.unwrap_or(f64::INFINITY)
}
