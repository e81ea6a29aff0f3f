//! Core types for Roast Planner: machines, orders and the machine registry.

pub type MachineId = u64;
pub type OrderId = u64;

/// Kilograms of green coffee, for both batch weight and machine capacity.
pub type Kilograms = f64;

#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum CoreError {
    #[error("unknown machine {0}")]
    UnknownMachine(MachineId),
    #[error("duplicate machine id {0}")]
    DuplicateMachine(MachineId),
    #[error("machine ids exhausted")]
    IdsExhausted,
    #[error("machine name must not be empty")]
    EmptyName,
    #[error("machine capacity must be positive, got {0}")]
    InvalidCapacity(Kilograms),
}

pub type Result<T> = std::result::Result<T, CoreError>;

pub mod machine;
pub mod order;
pub mod registry;

pub use machine::{Machine, MachineStatus};
pub use order::{Order, OrderStatus};
pub use registry::MachineRegistry;
