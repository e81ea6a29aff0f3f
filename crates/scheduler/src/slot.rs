use chrono::{Duration, NaiveDateTime, Timelike};
use serde::{Deserialize, Serialize};
use tracing::debug;

use rp_core::{MachineId, MachineRegistry, Order};

use crate::{Result, ScheduleError, SchedulingConfig};

/// A half-open `[start, end)` booking window on one machine.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct Slot {
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
}

impl Slot {
    pub fn duration(&self) -> Duration {
        self.end - self.start
    }
}

/// Round down to the start of the hour.
pub fn truncate_to_hour(t: NaiveDateTime) -> NaiveDateTime {
    t.date().and_hms_opt(t.hour(), 0, 0).unwrap_or(t)
}

/// Earliest window of `duration_minutes` on `machine_id` that clears every
/// booked order, scanning forward from the top of the current hour.
///
/// The scan is greedy: orders are visited once in start order and the first
/// gap long enough is taken. A gap is only ever checked against the order
/// that closes it, so no buffer is required before an already-booked order.
pub fn find_next_slot<'a, I>(
    machine_id: MachineId,
    duration_minutes: u32,
    machines: &MachineRegistry,
    orders: I,
    now: NaiveDateTime,
    cfg: &SchedulingConfig,
) -> Result<Slot>
where
    I: IntoIterator<Item = &'a Order>,
{
    match machines.get(machine_id) {
        Some(machine) if machine.accepts_orders() => {}
        _ => return Err(ScheduleError::MachineUnavailable(machine_id)),
    }

    let mut booked: Vec<&Order> = orders
        .into_iter()
        .filter(|o| o.machine_id == machine_id)
        .collect();
    booked.sort_by_key(|o| (o.start_time, o.id));

    let slot = first_fit(
        &booked,
        Duration::minutes(i64::from(duration_minutes)),
        cfg.buffer(),
        now,
    );
    debug!(
        machine_id,
        duration_minutes,
        booked = booked.len(),
        start = %slot.start,
        end = %slot.end,
        "slot found"
    );
    Ok(slot)
}

/// `booked` must be sorted by start time.
fn first_fit(booked: &[&Order], duration: Duration, buffer: Duration, now: NaiveDateTime) -> Slot {
    let mut candidate = truncate_to_hour(now);
    for order in booked {
        if candidate + duration <= order.start_time {
            break;
        }
        // Never step backwards: an order that finished before the candidate
        // (or is nested inside an earlier one) must not pull it into the past.
        candidate = candidate.max(order.end_time + buffer);
    }
    Slot {
        start: candidate,
        end: candidate + duration,
    }
}
