use std::time::{Duration, Instant};
use crate::data::TimeCalc;

/// Records the time spent in `l_step` since the `elapsed` mark and returns the new mark.
pub(crate) fn trace(timings: &mut TimeCalc, l_step: &'static str, start: Instant, elapsed: Duration) -> Duration {
    let now = start.elapsed();
    let step = now.saturating_sub(elapsed);
    timings.add_or_push(l_step, step);
    log::trace!("TIME | Total={:.2?} | {}={:.2?}", now, l_step, step);
    now
}
