use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use rp_core::{Kilograms, MachineId, MachineRegistry, Order, OrderId, OrderStatus};

use crate::{compute_duration, find_next_slot, Result, ScheduleError, SchedulingConfig};

/// What a client asks for; the time window is decided by the scheduler.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NewOrderRequest {
    pub client_name: String,
    pub bean_type: String,
    pub weight: Kilograms,
    pub machine_id: MachineId,
}

impl NewOrderRequest {
    pub fn new(
        client_name: impl Into<String>,
        bean_type: impl Into<String>,
        weight: Kilograms,
        machine_id: MachineId,
    ) -> Self {
        Self {
            client_name: client_name.into(),
            bean_type: bean_type.into(),
            weight,
            machine_id,
        }
    }

    fn validate(&self) -> Result<()> {
        if self.client_name.trim().is_empty() {
            return Err(ScheduleError::Validation("client name is required".into()));
        }
        if self.bean_type.trim().is_empty() {
            return Err(ScheduleError::Validation("bean type is required".into()));
        }
        Ok(())
    }
}

/// Build a `Scheduled` order for `request` in the first free slot on its
/// machine. Nothing is committed: the caller merges the returned order into
/// its own order set.
pub fn schedule_order<'a, I>(
    id: OrderId,
    request: &NewOrderRequest,
    machines: &MachineRegistry,
    existing: I,
    now: NaiveDateTime,
    cfg: &SchedulingConfig,
) -> Result<Order>
where
    I: IntoIterator<Item = &'a Order>,
{
    let outcome = build_order(id, request, machines, existing, now, cfg);
    if let Err(err) = &outcome {
        warn!(machine_id = request.machine_id, error = %err, "order rejected");
    }
    outcome
}

fn build_order<'a, I>(
    id: OrderId,
    request: &NewOrderRequest,
    machines: &MachineRegistry,
    existing: I,
    now: NaiveDateTime,
    cfg: &SchedulingConfig,
) -> Result<Order>
where
    I: IntoIterator<Item = &'a Order>,
{
    request.validate()?;
    let minutes = compute_duration(request.weight, cfg)?;
    let slot = find_next_slot(request.machine_id, minutes, machines, existing, now, cfg)?;

    debug!(order_id = id, minutes, start = %slot.start, "order built");
    Ok(Order {
        id,
        client_name: request.client_name.trim().to_string(),
        bean_type: request.bean_type.trim().to_string(),
        weight: request.weight,
        machine_id: request.machine_id,
        start_time: slot.start,
        end_time: slot.end,
        status: OrderStatus::Scheduled,
    })
}
