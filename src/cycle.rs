use chrono::{DateTime, Duration, Utc};

use crate::domain::QuantizePolicy;

/// Snaps `time` to a cycle boundary, i.e. a multiple of `interval` on the
/// UTC epoch grid. Pure and total: a non-positive interval returns the
/// input unchanged. With `QuantizePolicy::Nearest` the exact midpoint
/// between two boundaries snaps to the later one.
pub fn quantize(time: DateTime<Utc>, interval: Duration, policy: QuantizePolicy) -> DateTime<Utc> {
    let step = interval.num_seconds();
    if step <= 0 {
        return time;
    }

    let secs = time.timestamp();
    let boundary = match policy {
        QuantizePolicy::Floor => secs.div_euclid(step),
        QuantizePolicy::Nearest => (secs + step / 2).div_euclid(step),
    } * step;

    let from_boundary =
        Duration::seconds(secs - boundary) + Duration::nanoseconds(time.timestamp_subsec_nanos() as i64);
    time - from_boundary
}
