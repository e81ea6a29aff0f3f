use std::collections::BTreeMap;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use rp_core::{MachineId, Order, OrderId, OrderStatus};

use crate::{Result, ScheduleError};

/// The committed order set. Time windows are fixed once an order is in the
/// book; only its status moves.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OrderBook {
    next_id: OrderId,
    orders: BTreeMap<OrderId, Order>,
}

impl OrderBook {
    pub fn new() -> Self {
        Self {
            next_id: 1,
            orders: BTreeMap::new(),
        }
    }

    pub fn with_orders<I>(orders: I) -> Result<Self>
    where
        I: IntoIterator<Item = Order>,
    {
        let mut book = Self::new();
        for order in orders {
            book.commit(order)?;
        }
        Ok(book)
    }

    /// Id the next committed order should carry. Never below one past the
    /// highest committed id, even if the stored counter is stale.
    pub fn next_id(&self) -> OrderId {
        let after_last = self
            .orders
            .keys()
            .next_back()
            .map_or(1, |last| last.saturating_add(1));
        self.next_id.max(after_last)
    }

    pub fn commit(&mut self, order: Order) -> Result<OrderId> {
        let id = order.id;
        if self.orders.contains_key(&id) {
            return Err(ScheduleError::DuplicateOrder(id));
        }
        self.next_id = self.next_id().max(id.saturating_add(1));
        info!(
            order_id = id,
            machine_id = order.machine_id,
            start = %order.start_time,
            end = %order.end_time,
            "order committed"
        );
        self.orders.insert(id, order);
        Ok(id)
    }

    pub fn get(&self, id: OrderId) -> Option<&Order> {
        self.orders.get(&id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Order> {
        self.orders.values()
    }

    pub fn len(&self) -> usize {
        self.orders.len()
    }

    pub fn is_empty(&self) -> bool {
        self.orders.is_empty()
    }

    /// Orders booked on `machine_id`, earliest first.
    pub fn for_machine(&self, machine_id: MachineId) -> Vec<&Order> {
        let mut booked: Vec<&Order> = self
            .orders
            .values()
            .filter(|o| o.machine_id == machine_id)
            .collect();
        booked.sort_by_key(|o| (o.start_time, o.id));
        booked
    }

    /// Orders on `machine_id` that have not completed yet.
    pub fn outstanding_for(&self, machine_id: MachineId) -> usize {
        self.orders
            .values()
            .filter(|o| o.machine_id == machine_id && !o.status.is_terminal())
            .count()
    }

    pub fn advance(&mut self, id: OrderId, status: OrderStatus) -> Result<&Order> {
        let order = self
            .orders
            .get_mut(&id)
            .ok_or(ScheduleError::UnknownOrder(id))?;
        if !order.status.can_advance_to(status) {
            return Err(ScheduleError::InvalidTransition {
                order_id: id,
                from: order.status,
                to: status,
            });
        }
        debug!(order_id = id, from = %order.status, to = %status, "order advanced");
        order.status = status;
        Ok(&*order)
    }

    /// Move orders along with the clock: running windows become in-progress
    /// and finished ones completed. Statuses never move backwards.
    pub fn sync_with_clock(&mut self, now: NaiveDateTime) -> Vec<(OrderId, OrderStatus)> {
        let mut changed = Vec::new();
        for order in self.orders.values_mut() {
            let due = if now >= order.end_time {
                OrderStatus::Completed
            } else if now >= order.start_time {
                OrderStatus::InProgress
            } else {
                continue;
            };
            if order.status.can_advance_to(due) {
                order.status = due;
                changed.push((order.id, due));
            }
        }
        if !changed.is_empty() {
            debug!(changed = changed.len(), %now, "order statuses synced");
        }
        changed
    }

    pub fn remove(&mut self, id: OrderId) -> Result<Order> {
        let order = self
            .orders
            .remove(&id)
            .ok_or(ScheduleError::UnknownOrder(id))?;
        info!(order_id = id, machine_id = order.machine_id, "order removed");
        Ok(order)
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

    fn order(id: OrderId, machine_id: MachineId, start: NaiveDateTime, end: NaiveDateTime) -> Order {
        Order {
            id,
            client_name: "Blue Bottle Coffee".into(),
            bean_type: "Guatemalan Antigua".into(),
            weight: 6.0,
            machine_id,
            start_time: start,
            end_time: end,
            status: OrderStatus::Scheduled,
        }
    }

    fn book() -> OrderBook {
        OrderBook::with_orders(vec![
            order(1, 1, at(9, 0), at(10, 30)),
            order(2, 2, at(11, 0), at(12, 20)),
            order(3, 1, at(7, 0), at(8, 0)),
        ])
        .unwrap()
    }

    #[test]
    fn commit_tracks_next_id_and_rejects_duplicates() {
        let mut book = book();
        assert_eq!(book.next_id(), 4);
        assert_eq!(
            book.commit(order(2, 1, at(13, 0), at(14, 0))),
            Err(ScheduleError::DuplicateOrder(2))
        );
        assert_eq!(book.len(), 3);
        assert_eq!(OrderBook::new().next_id(), 1);
    }

    #[test]
    fn stale_counter_still_hands_out_a_fresh_id() {
        let saved = OrderBook::with_orders(vec![order(1, 1, at(9, 0), at(10, 30))]).unwrap();
        let mut value = serde_json::to_value(&saved).unwrap();
        value["next_id"] = 1.into();
        let mut book: OrderBook = serde_json::from_str(&value.to_string()).unwrap();
        assert_eq!(book.next_id(), 2);
        let id = book.next_id();
        book.commit(order(id, 1, at(11, 0), at(12, 0))).unwrap();
        assert_eq!(book.next_id(), 3);
    }

    #[test]
    fn for_machine_is_sorted_by_start() {
        let book = book();
        let ids: Vec<_> = book.for_machine(1).iter().map(|o| o.id).collect();
        assert_eq!(ids, vec![3, 1]);
        assert!(book.for_machine(9).is_empty());
    }

    #[test]
    fn advance_moves_forward_only() {
        let mut book = book();
        book.advance(1, OrderStatus::InProgress).unwrap();
        assert_eq!(
            book.advance(1, OrderStatus::Scheduled).err(),
            Some(ScheduleError::InvalidTransition {
                order_id: 1,
                from: OrderStatus::InProgress,
                to: OrderStatus::Scheduled,
            })
        );
        book.advance(1, OrderStatus::Completed).unwrap();
        assert!(book.advance(1, OrderStatus::Completed).is_err());
        assert_eq!(
            book.advance(99, OrderStatus::Completed).err(),
            Some(ScheduleError::UnknownOrder(99))
        );
    }

    #[test]
    fn clock_sync_advances_running_and_finished_orders() {
        let mut book = book();
        let changed = book.sync_with_clock(at(9, 30));
        assert_eq!(
            changed,
            vec![(1, OrderStatus::InProgress), (3, OrderStatus::Completed)]
        );
        assert_eq!(book.get(2).unwrap().status, OrderStatus::Scheduled);
        assert!(book.sync_with_clock(at(9, 45)).is_empty());
    }

    #[test]
    fn clock_sync_never_regresses_manual_completion() {
        let mut book = book();
        book.advance(2, OrderStatus::Completed).unwrap();
        book.sync_with_clock(at(11, 30));
        assert_eq!(book.get(2).unwrap().status, OrderStatus::Completed);
    }

    #[test]
    fn outstanding_ignores_completed_orders() {
        let mut book = book();
        assert_eq!(book.outstanding_for(1), 2);
        book.advance(3, OrderStatus::Completed).unwrap();
        assert_eq!(book.outstanding_for(1), 1);
        book.remove(1).unwrap();
        assert_eq!(book.outstanding_for(1), 0);
        assert!(book.remove(1).is_err());
    }
}
