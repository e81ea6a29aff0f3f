use std::fmt;

use chrono::{Duration, NaiveDateTime};
use serde::{Deserialize, Serialize};

use crate::{Kilograms, MachineId, OrderId};

/// Order lifecycle. Variants are declared in lifecycle order so the derived
/// `Ord` doubles as the "has advanced past" relation.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "kebab-case")]
pub enum OrderStatus {
    Scheduled,
    InProgress,
    Completed,
}

impl OrderStatus {
    /// Transitions only move forward; skipping `InProgress` is allowed.
    pub fn can_advance_to(&self, next: OrderStatus) -> bool {
        next > *self
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed)
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Scheduled => write!(f, "scheduled"),
            Self::InProgress => write!(f, "in-progress"),
            Self::Completed => write!(f, "completed"),
        }
    }
}

impl std::str::FromStr for OrderStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "scheduled" => Ok(Self::Scheduled),
            "in-progress" => Ok(Self::InProgress),
            "completed" => Ok(Self::Completed),
            _ => Err(format!("Invalid order status: {s}")),
        }
    }
}

/// A roasting batch booked on one machine for a fixed `[start_time, end_time)` window.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Order {
    pub id: OrderId,
    pub client_name: String,
    pub bean_type: String,
    pub weight: Kilograms,
    pub machine_id: MachineId,
    pub start_time: NaiveDateTime,
    pub end_time: NaiveDateTime,
    pub status: OrderStatus,
}

impl Order {
    pub fn duration(&self) -> Duration {
        self.end_time - self.start_time
    }

    /// Half-open interval test: an order ending exactly when another starts
    /// does not overlap it.
    pub fn overlaps(&self, other: &Order) -> bool {
        self.start_time < other.end_time && other.start_time < self.end_time
    }

    pub fn is_running_at(&self, now: NaiveDateTime) -> bool {
        self.start_time <= now && now < self.end_time
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn at(h: u32, m: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2025, 6, 13)
            .unwrap()
            .and_hms_opt(h, m, 0)
            .unwrap()
    }

    fn order(id: OrderId, start: NaiveDateTime, end: NaiveDateTime) -> Order {
        Order {
            id,
            client_name: "Blue Bottle Coffee".into(),
            bean_type: "Ethiopian Yirgacheffe".into(),
            weight: 10.0,
            machine_id: 1,
            start_time: start,
            end_time: end,
            status: OrderStatus::Scheduled,
        }
    }

    #[test]
    fn status_only_moves_forward() {
        use OrderStatus::*;
        assert!(Scheduled.can_advance_to(InProgress));
        assert!(Scheduled.can_advance_to(Completed));
        assert!(InProgress.can_advance_to(Completed));
        assert!(!InProgress.can_advance_to(Scheduled));
        assert!(!Completed.can_advance_to(InProgress));
        assert!(!Scheduled.can_advance_to(Scheduled));
        assert!(Completed.is_terminal());
    }

    #[test]
    fn in_progress_uses_hyphenated_name() {
        assert_eq!(OrderStatus::InProgress.to_string(), "in-progress");
        assert_eq!("in-progress".parse::<OrderStatus>(), Ok(OrderStatus::InProgress));
    }

    #[test]
    fn abutting_orders_do_not_overlap() {
        let a = order(1, at(8, 0), at(9, 0));
        let b = order(2, at(9, 0), at(10, 30));
        let c = order(3, at(10, 0), at(11, 0));
        assert!(!a.overlaps(&b));
        assert!(b.overlaps(&c));
        assert!(c.overlaps(&b));
        assert_eq!(b.duration(), Duration::minutes(90));
    }

    #[test]
    fn running_window_is_half_open() {
        let o = order(1, at(9, 0), at(10, 30));
        assert!(o.is_running_at(at(9, 0)));
        assert!(o.is_running_at(at(10, 29)));
        assert!(!o.is_running_at(at(10, 30)));
        assert!(!o.is_running_at(at(8, 59)));
    }
}
