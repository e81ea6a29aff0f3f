//! Roast scheduling: batch duration model, first-fit slot search and the
//! planner state that commits new orders.

use rp_core::{CoreError, MachineId, OrderId, OrderStatus};

pub mod book;
pub mod config;
pub mod duration;
pub mod planner;
pub mod request;
pub mod slot;
pub mod validation;

pub use book::OrderBook;
pub use config::SchedulingConfig;
pub use duration::compute_duration;
pub use planner::{Planner, SharedPlanner};
pub use request::{schedule_order, NewOrderRequest};
pub use slot::{find_next_slot, truncate_to_hour, Slot};
pub use validation::{check_schedule, find_conflicts, Conflict, ConflictKind};

#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum ScheduleError {
    #[error("batch weight must be a positive number of kilograms, got {0}")]
    InvalidWeight(f64),
    #[error("invalid order: {0}")]
    Validation(String),
    #[error("machine {0} is unknown or under maintenance")]
    MachineUnavailable(MachineId),
    #[error("invalid scheduling config: {0}")]
    InvalidConfig(String),
    #[error("unknown order {0}")]
    UnknownOrder(OrderId),
    #[error("order {0} already exists")]
    DuplicateOrder(OrderId),
    #[error("order {order_id} cannot move from {from} to {to}")]
    InvalidTransition {
        order_id: OrderId,
        from: OrderStatus,
        to: OrderStatus,
    },
    #[error("machine {machine_id} still has {outstanding} outstanding order(s)")]
    MachineInUse {
        machine_id: MachineId,
        outstanding: usize,
    },
    #[error("schedule conflict: {0}")]
    Conflict(Conflict),
    #[error(transparent)]
    Core(#[from] CoreError),
}

pub type Result<T> = std::result::Result<T, ScheduleError>;
