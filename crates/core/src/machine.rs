use std::fmt;

use serde::{Deserialize, Serialize};

use crate::{Kilograms, MachineId};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "snake_case")]
pub enum MachineStatus {
    #[default]
    Available,
    Roasting,
    Maintenance,
}

impl MachineStatus {
    /// Whether new orders may be placed on a machine in this state.
    ///
    /// A roasting machine still accepts future batches; only maintenance
    /// takes it out of rotation.
    pub fn accepts_orders(&self) -> bool {
        !matches!(self, Self::Maintenance)
    }
}

impl fmt::Display for MachineStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Available => write!(f, "available"),
            Self::Roasting => write!(f, "roasting"),
            Self::Maintenance => write!(f, "maintenance"),
        }
    }
}

impl std::str::FromStr for MachineStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "available" => Ok(Self::Available),
            "roasting" => Ok(Self::Roasting),
            "maintenance" => Ok(Self::Maintenance),
            _ => Err(format!("Invalid machine status: {s}")),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Machine {
    pub id: MachineId,
    pub name: String,
    /// Batch capacity in kilograms. Informational only; order weights are
    /// not checked against it.
    pub capacity: Kilograms,
    pub status: MachineStatus,
}

impl Machine {
    pub fn accepts_orders(&self) -> bool {
        self.status.accepts_orders()
    }
}
