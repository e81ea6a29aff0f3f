use chrono::{Duration, NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};

use rp_core::{Machine, MachineId, MachineStatus, Order, OrderId, OrderStatus};

/// Visible hours of a timeline chart, `[start_hour, end_hour)` in local time.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct TimelineWindow {
    pub start_hour: u32,
    pub end_hour: u32,
}

impl Default for TimelineWindow {
    fn default() -> Self {
        Self {
            start_hour: 8,
            end_hour: 18,
        }
    }
}

impl TimelineWindow {
    pub fn bounds(&self, day: NaiveDate) -> (NaiveDateTime, NaiveDateTime) {
        let midnight = day.and_time(NaiveTime::MIN);
        let start = self.start_hour.min(24);
        let end = self.end_hour.clamp(start, 24);
        (
            midnight + Duration::hours(i64::from(start)),
            midnight + Duration::hours(i64::from(end)),
        )
    }

    /// Axis labels, one per hour including the closing one.
    pub fn hour_labels(&self) -> Vec<String> {
        let start = self.start_hour.min(24);
        let end = self.end_hour.clamp(start, 24);
        (start..=end).map(|h| format!("{h:02}:00")).collect()
    }
}

/// One order drawn on a lane. `offset` and `width` are fractions of the
/// window, clipped so the bar never spills past either edge.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct TimelineBar {
    pub order_id: OrderId,
    pub client_name: String,
    pub bean_type: String,
    pub status: OrderStatus,
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
    pub offset: f64,
    pub width: f64,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct MachineLane {
    pub machine_id: MachineId,
    pub machine_name: String,
    pub status: MachineStatus,
    pub bars: Vec<TimelineBar>,
}

/// Per-machine lanes of the orders that start on one day.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct MachineTimeline {
    pub day: NaiveDate,
    pub window: TimelineWindow,
    pub lanes: Vec<MachineLane>,
}

impl MachineTimeline {
    pub fn for_day<'m, 'o, M, O>(machines: M, orders: O, day: NaiveDate, window: TimelineWindow) -> Self
    where
        M: IntoIterator<Item = &'m Machine>,
        O: IntoIterator<Item = &'o Order>,
    {
        let (window_start, window_end) = window.bounds(day);
        let span = (window_end - window_start).num_seconds().max(1) as f64;

        let todays: Vec<&Order> = if window_end > window_start {
            orders
                .into_iter()
                .filter(|o| o.start_time.date() == day)
                .collect()
        } else {
            Vec::new()
        };

        let lanes = machines
            .into_iter()
            .map(|machine| {
                let mut booked: Vec<&Order> = todays
                    .iter()
                    .copied()
                    .filter(|o| o.machine_id == machine.id)
                    .collect();
                booked.sort_by_key(|o| (o.start_time, o.id));

                let bars = booked
                    .into_iter()
                    .filter_map(|order| {
                        let left = (order.start_time - window_start).num_seconds() as f64 / span;
                        let right = (order.end_time - window_start).num_seconds() as f64 / span;
                        let offset = left.clamp(0.0, 1.0);
                        let width = right.clamp(0.0, 1.0) - offset;
                        (width > 0.0).then(|| TimelineBar {
                            order_id: order.id,
                            client_name: order.client_name.clone(),
                            bean_type: order.bean_type.clone(),
                            status: order.status,
                            start: order.start_time,
                            end: order.end_time,
                            offset,
                            width,
                        })
                    })
                    .collect();

                MachineLane {
                    machine_id: machine.id,
                    machine_name: machine.name.clone(),
                    status: machine.status,
                    bars,
                }
            })
            .collect();

        Self { day, window, lanes }
    }
}
