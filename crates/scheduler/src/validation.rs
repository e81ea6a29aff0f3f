use std::collections::BTreeMap;
use std::fmt;

use chrono::Duration;
use serde::{Deserialize, Serialize};

use rp_core::{MachineId, Order, OrderId};

use crate::{Result, ScheduleError};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ConflictKind {
    /// The order ends at or before it starts.
    EmptyWindow,
    /// Two orders on the same machine share time.
    Overlap,
    /// Back-to-back orders with less idle time than the buffer.
    BufferShortfall,
}

/// A violation found between `first` and `second` (the same order for
/// [`ConflictKind::EmptyWindow`]).
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct Conflict {
    pub machine_id: MachineId,
    pub first: OrderId,
    pub second: OrderId,
    pub kind: ConflictKind,
}

impl Conflict {
    /// Overlaps and empty windows break the schedule; a short buffer only
    /// warrants a warning because first-fit may book right up to an
    /// existing order.
    pub fn is_hard(&self) -> bool {
        !matches!(self.kind, ConflictKind::BufferShortfall)
    }
}

impl fmt::Display for Conflict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            ConflictKind::EmptyWindow => write!(
                f,
                "order {} on machine {} has an empty time window",
                self.first, self.machine_id
            ),
            ConflictKind::Overlap => write!(
                f,
                "orders {} and {} overlap on machine {}",
                self.first, self.second, self.machine_id
            ),
            ConflictKind::BufferShortfall => write!(
                f,
                "orders {} and {} on machine {} are closer than the buffer",
                self.first, self.second, self.machine_id
            ),
        }
    }
}

/// Audit an order set machine by machine.
///
/// Each order is compared with the latest-ending order before it on the same
/// machine, so an order nested inside a long one is still caught.
pub fn find_conflicts<'a, I>(orders: I, buffer: Duration) -> Vec<Conflict>
where
    I: IntoIterator<Item = &'a Order>,
{
    let mut by_machine: BTreeMap<MachineId, Vec<&Order>> = BTreeMap::new();
    for order in orders {
        by_machine.entry(order.machine_id).or_default().push(order);
    }

    let mut conflicts = Vec::new();
    for (machine_id, mut booked) in by_machine {
        booked.sort_by_key(|o| (o.start_time, o.id));

        let mut latest: Option<&Order> = None;
        for order in booked {
            if order.end_time <= order.start_time {
                conflicts.push(Conflict {
                    machine_id,
                    first: order.id,
                    second: order.id,
                    kind: ConflictKind::EmptyWindow,
                });
                continue;
            }
            if let Some(prev) = latest {
                let kind = if prev.end_time > order.start_time {
                    Some(ConflictKind::Overlap)
                } else if prev.end_time + buffer > order.start_time {
                    Some(ConflictKind::BufferShortfall)
                } else {
                    None
                };
                if let Some(kind) = kind {
                    conflicts.push(Conflict {
                        machine_id,
                        first: prev.id,
                        second: order.id,
                        kind,
                    });
                }
            }
            if latest.map_or(true, |prev| order.end_time > prev.end_time) {
                latest = Some(order);
            }
        }
    }
    conflicts
}

/// Fails on the first overlap or empty window.
pub fn check_schedule<'a, I>(orders: I, buffer: Duration) -> Result<()>
where
    I: IntoIterator<Item = &'a Order>,
{
    match find_conflicts(orders, buffer).into_iter().find(Conflict::is_hard) {
        Some(conflict) => Err(ScheduleError::Conflict(conflict)),
        None => Ok(()),
    }
}
