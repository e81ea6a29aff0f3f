use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::{CoreError, Kilograms, Machine, MachineId, MachineStatus, Result};

/// Owns the roasting machines and hands out their ids.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MachineRegistry {
    next_id: MachineId,
    machines: BTreeMap<MachineId, Machine>,
}

impl MachineRegistry {
    pub fn new() -> Self {
        Self {
            next_id: 1,
            machines: BTreeMap::new(),
        }
    }

    /// Build a registry from existing records, keeping their ids. Each record
    /// is validated like a registration and ids must be unique. Later
    /// registrations continue after the highest seeded id.
    pub fn with_machines<I>(machines: I) -> Result<Self>
    where
        I: IntoIterator<Item = Machine>,
    {
        let mut registry = Self::new();
        for mut machine in machines {
            machine.name = validate_name(&machine.name)?;
            validate_capacity(machine.capacity)?;
            if registry.machines.contains_key(&machine.id) {
                return Err(CoreError::DuplicateMachine(machine.id));
            }
            registry.machines.insert(machine.id, machine);
        }
        Ok(registry)
    }

    pub fn register(&mut self, name: &str, capacity: Kilograms) -> Result<Machine> {
        let name = validate_name(name)?;
        validate_capacity(capacity)?;

        let id = self.allocate_id()?;
        let machine = Machine {
            id,
            name,
            capacity,
            status: MachineStatus::Available,
        };
        info!(machine_id = id, name = %machine.name, capacity, "machine registered");
        self.machines.insert(id, machine.clone());
        Ok(machine)
    }

    pub fn get(&self, id: MachineId) -> Option<&Machine> {
        self.machines.get(&id)
    }

    pub fn contains(&self, id: MachineId) -> bool {
        self.machines.contains_key(&id)
    }

    /// Machines in id order.
    pub fn iter(&self) -> impl Iterator<Item = &Machine> {
        self.machines.values()
    }

    /// Machines that may receive new orders.
    pub fn eligible(&self) -> impl Iterator<Item = &Machine> {
        self.machines.values().filter(|m| m.accepts_orders())
    }

    pub fn len(&self) -> usize {
        self.machines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.machines.is_empty()
    }

    pub fn set_status(&mut self, id: MachineId, status: MachineStatus) -> Result<&Machine> {
        let machine = self.get_mut(id)?;
        if machine.status != status {
            debug!(machine_id = id, from = %machine.status, to = %status, "machine status changed");
            machine.status = status;
        }
        Ok(&*machine)
    }

    pub fn rename(&mut self, id: MachineId, name: &str) -> Result<&Machine> {
        let name = validate_name(name)?;
        let machine = self.get_mut(id)?;
        machine.name = name;
        Ok(&*machine)
    }

    pub fn set_capacity(&mut self, id: MachineId, capacity: Kilograms) -> Result<&Machine> {
        validate_capacity(capacity)?;
        let machine = self.get_mut(id)?;
        machine.capacity = capacity;
        Ok(&*machine)
    }

    /// Replace a whole machine record, as an edit form would.
    pub fn update(&mut self, mut machine: Machine) -> Result<&Machine> {
        machine.name = validate_name(&machine.name)?;
        validate_capacity(machine.capacity)?;
        let slot = self.get_mut(machine.id)?;
        *slot = machine;
        Ok(&*slot)
    }

    /// Drop a machine. Orders that still reference it are the caller's concern.
    pub fn remove(&mut self, id: MachineId) -> Result<Machine> {
        let machine = self
            .machines
            .remove(&id)
            .ok_or(CoreError::UnknownMachine(id))?;
        info!(machine_id = id, name = %machine.name, "machine removed");
        Ok(machine)
    }

    /// Next unused id, never below one past the highest held id so a stale
    /// counter cannot hand out an id that is already taken.
    fn allocate_id(&mut self) -> Result<MachineId> {
        let after_last = match self.machines.keys().next_back() {
            Some(last) => last.checked_add(1).ok_or(CoreError::IdsExhausted)?,
            None => 1,
        };
        let id = self.next_id.max(after_last);
        self.next_id = id.checked_add(1).ok_or(CoreError::IdsExhausted)?;
        Ok(id)
    }

    fn get_mut(&mut self, id: MachineId) -> Result<&mut Machine> {
        self.machines
            .get_mut(&id)
            .ok_or(CoreError::UnknownMachine(id))
    }
}

fn validate_name(name: &str) -> Result<String> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(CoreError::EmptyName);
    }
    Ok(trimmed.to_string())
}

fn validate_capacity(capacity: Kilograms) -> Result<()> {
    if capacity.is_finite() && capacity > 0.0 {
        Ok(())
    } else {
        Err(CoreError::InvalidCapacity(capacity))
    }
}
