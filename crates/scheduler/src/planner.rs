use std::sync::Arc;

use chrono::NaiveDateTime;
use parking_lot::Mutex;

use rp_core::{Kilograms, Machine, MachineId, MachineRegistry, MachineStatus, Order, OrderId, OrderStatus};

use crate::{
    find_conflicts, schedule_order, Conflict, NewOrderRequest, OrderBook, Result, ScheduleError,
    SchedulingConfig,
};

/// Machines, committed orders and the scheduling settings, owned together.
///
/// `schedule` computes against the current book and commits in one step, so
/// a rejected request leaves the book untouched.
#[derive(Debug, Clone)]
pub struct Planner {
    cfg: SchedulingConfig,
    machines: MachineRegistry,
    orders: OrderBook,
}

impl Planner {
    pub fn new(cfg: SchedulingConfig, machines: MachineRegistry, orders: OrderBook) -> Result<Self> {
        cfg.validate()?;
        Ok(Self {
            cfg,
            machines,
            orders,
        })
    }

    pub fn config(&self) -> &SchedulingConfig {
        &self.cfg
    }

    pub fn machines(&self) -> &MachineRegistry {
        &self.machines
    }

    pub fn orders(&self) -> &OrderBook {
        &self.orders
    }

    /// Price out a batch without booking it.
    pub fn preview(&self, request: &NewOrderRequest, now: NaiveDateTime) -> Result<Order> {
        schedule_order(
            self.orders.next_id(),
            request,
            &self.machines,
            self.orders.iter(),
            now,
            &self.cfg,
        )
    }

    pub fn schedule(&mut self, request: &NewOrderRequest, now: NaiveDateTime) -> Result<Order> {
        let order = self.preview(request, now)?;
        self.orders.commit(order.clone())?;
        Ok(order)
    }

    pub fn register_machine(&mut self, name: &str, capacity: Kilograms) -> Result<Machine> {
        Ok(self.machines.register(name, capacity)?)
    }

    pub fn set_machine_status(&mut self, id: MachineId, status: MachineStatus) -> Result<&Machine> {
        Ok(self.machines.set_status(id, status)?)
    }

    pub fn update_machine(&mut self, machine: Machine) -> Result<&Machine> {
        Ok(self.machines.update(machine)?)
    }

    /// Remove a machine once nothing is left to roast on it. Completed orders
    /// stay in the book as history.
    pub fn remove_machine(&mut self, id: MachineId) -> Result<Machine> {
        let outstanding = self.orders.outstanding_for(id);
        if outstanding > 0 {
            return Err(ScheduleError::MachineInUse {
                machine_id: id,
                outstanding,
            });
        }
        Ok(self.machines.remove(id)?)
    }

    pub fn advance_order(&mut self, id: OrderId, status: OrderStatus) -> Result<&Order> {
        self.orders.advance(id, status)
    }

    pub fn sync_with_clock(&mut self, now: NaiveDateTime) -> Vec<(OrderId, OrderStatus)> {
        self.orders.sync_with_clock(now)
    }

    pub fn remove_order(&mut self, id: OrderId) -> Result<Order> {
        self.orders.remove(id)
    }

    pub fn conflicts(&self) -> Vec<Conflict> {
        find_conflicts(self.orders.iter(), self.cfg.buffer())
    }
}

/// A [`Planner`] behind a lock for callers on several threads. Slot search
/// and commit happen under the same guard so concurrent requests cannot book
/// against the same stale order set.
#[derive(Debug, Clone)]
pub struct SharedPlanner {
    inner: Arc<Mutex<Planner>>,
}

impl SharedPlanner {
    pub fn new(planner: Planner) -> Self {
        Self {
            inner: Arc::new(Mutex::new(planner)),
        }
    }

    pub fn schedule(&self, request: &NewOrderRequest, now: NaiveDateTime) -> Result<Order> {
        self.inner.lock().schedule(request, now)
    }

    /// Run `f` against a consistent view of the planner.
    pub fn read<R>(&self, f: impl FnOnce(&Planner) -> R) -> R {
        f(&self.inner.lock())
    }

    pub fn update<R>(&self, f: impl FnOnce(&mut Planner) -> R) -> R {
        f(&mut self.inner.lock())
    }

    pub fn into_inner(self) -> std::result::Result<Planner, Self> {
        Arc::try_unwrap(self.inner)
            .map(Mutex::into_inner)
            .map_err(|inner| Self { inner })
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

    fn planner() -> Planner {
        let mut machines = MachineRegistry::new();
        machines.register("Probat L12", 12.0).unwrap();
        machines.register("Diedrich IR-12", 12.0).unwrap();
        Planner::new(SchedulingConfig::default(), machines, OrderBook::new()).unwrap()
    }

    #[test]
    fn schedule_commits_and_chains_with_buffer() {
        let mut planner = planner();
        let first = planner
            .schedule(&NewOrderRequest::new("Blue Bottle Coffee", "Ethiopian", 10.0, 1), at(9, 15))
            .unwrap();
        let second = planner
            .schedule(&NewOrderRequest::new("Stumptown Coffee", "Colombian", 4.0, 1), at(9, 15))
            .unwrap();
        assert_eq!((first.id, second.id), (1, 2));
        assert_eq!(first.start_time, at(9, 0));
        assert_eq!(second.start_time, at(11, 30));
        assert_eq!(second.end_time, at(12, 30));
        assert_eq!(planner.orders().len(), 2);
        assert!(planner.conflicts().is_empty());
    }

    #[test]
    fn rejected_request_leaves_book_unchanged() {
        let mut planner = planner();
        planner.set_machine_status(2, MachineStatus::Maintenance).unwrap();
        let err = planner
            .schedule(&NewOrderRequest::new("Blue Bottle Coffee", "Ethiopian", 10.0, 2), at(9, 0))
            .unwrap_err();
        assert_eq!(err, ScheduleError::MachineUnavailable(2));
        assert!(planner.orders().is_empty());
        assert_eq!(planner.orders().next_id(), 1);
    }

    #[test]
    fn preview_does_not_commit() {
        let planner = planner();
        let order = planner
            .preview(&NewOrderRequest::new("Blue Bottle Coffee", "Ethiopian", 1.0, 1), at(9, 0))
            .unwrap();
        assert_eq!(order.end_time, at(9, 30));
        assert!(planner.orders().is_empty());
    }

    #[test]
    fn machine_with_outstanding_orders_cannot_be_removed() {
        let mut planner = planner();
        let order = planner
            .schedule(&NewOrderRequest::new("Blue Bottle Coffee", "Ethiopian", 2.0, 1), at(9, 0))
            .unwrap();
        assert_eq!(
            planner.remove_machine(1).unwrap_err(),
            ScheduleError::MachineInUse { machine_id: 1, outstanding: 1 }
        );
        planner.advance_order(order.id, OrderStatus::Completed).unwrap();
        assert_eq!(planner.remove_machine(1).unwrap().id, 1);
        assert!(planner.orders().get(order.id).is_some());
    }

    #[test]
    fn unknown_machine_removal_surfaces_core_error() {
        let mut planner = planner();
        assert!(matches!(
            planner.remove_machine(9),
            Err(ScheduleError::Core(rp_core::CoreError::UnknownMachine(9)))
        ));
    }

    #[test]
    fn invalid_config_is_refused() {
        let cfg = SchedulingConfig {
            base_minutes: -1.0,
            ..Default::default()
        };
        assert!(Planner::new(cfg, MachineRegistry::new(), OrderBook::new()).is_err());
    }
}
