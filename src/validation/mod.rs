//! Admission rules for reservations.
//!
//! - `overlap`: half-open span intersection
//! - `schedule`: per-room weekly operating hours
//! - `private_policy`: night blackout and quotas for private reservations
//! - `pipeline`: the ordered composition of all of the above

pub mod overlap;
pub mod pipeline;
pub mod private_policy;
pub mod schedule;

pub use overlap::Span;
pub use pipeline::AdmissionPipeline;
pub use private_policy::PrivatePolicy;
pub use schedule::{RoomSchedule, ScheduleTable, Window};

use chrono::{TimeDelta, Timelike};

use crate::models::Timestamp;

/// Midnight at the start of `at`'s local day, in the same offset.
pub(crate) fn local_midnight(at: &Timestamp) -> Timestamp {
    let elapsed = TimeDelta::seconds(at.num_seconds_from_midnight().into())
        + TimeDelta::nanoseconds(at.nanosecond().into());
    *at - elapsed
}
