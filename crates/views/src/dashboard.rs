use chrono::NaiveDate;
use serde::Serialize;

use rp_core::{Machine, MachineStatus, Order, OrderStatus};

/// Headline numbers for the shop floor plus the day's orders.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct DashboardSummary {
    pub machines_total: usize,
    pub machines_roasting: usize,
    pub machines_in_maintenance: usize,
    pub orders_scheduled: usize,
    pub orders_in_progress: usize,
    pub orders_completed: usize,
    /// Orders starting on the requested day, earliest first.
    pub todays_orders: Vec<Order>,
}

impl DashboardSummary {
    pub fn build<'m, 'o, M, O>(machines: M, orders: O, today: NaiveDate) -> Self
    where
        M: IntoIterator<Item = &'m Machine>,
        O: IntoIterator<Item = &'o Order>,
    {
        let mut summary = Self {
            machines_total: 0,
            machines_roasting: 0,
            machines_in_maintenance: 0,
            orders_scheduled: 0,
            orders_in_progress: 0,
            orders_completed: 0,
            todays_orders: Vec::new(),
        };

        for machine in machines {
            summary.machines_total += 1;
            match machine.status {
                MachineStatus::Roasting => summary.machines_roasting += 1,
                MachineStatus::Maintenance => summary.machines_in_maintenance += 1,
                MachineStatus::Available => {}
            }
        }

        for order in orders {
            match order.status {
                OrderStatus::Scheduled => summary.orders_scheduled += 1,
                OrderStatus::InProgress => summary.orders_in_progress += 1,
                OrderStatus::Completed => summary.orders_completed += 1,
            }
            if order.start_time.date() == today {
                summary.todays_orders.push(order.clone());
            }
        }
        summary
            .todays_orders
            .sort_by_key(|o| (o.start_time, o.id));
        summary
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 6, d).unwrap()
    }

    fn machine(id: u64, status: MachineStatus) -> Machine {
        Machine {
            id,
            name: format!("Roaster {id}"),
            capacity: 12.0,
            status,
        }
    }

    fn order(id: u64, d: u32, h: u32, status: OrderStatus) -> Order {
        Order {
            id,
            client_name: "Stumptown Coffee".into(),
            bean_type: "Colombian Huila".into(),
            weight: 8.0,
            machine_id: 1,
            start_time: day(d).and_hms_opt(h, 0, 0).unwrap(),
            end_time: day(d).and_hms_opt(h + 1, 0, 0).unwrap(),
            status,
        }
    }

    #[test]
    fn counts_machines_and_orders_by_status() {
        let machines = vec![
            machine(1, MachineStatus::Available),
            machine(2, MachineStatus::Roasting),
            machine(3, MachineStatus::Maintenance),
        ];
        let orders = vec![
            order(1, 13, 11, OrderStatus::InProgress),
            order(2, 13, 9, OrderStatus::Scheduled),
            order(3, 12, 9, OrderStatus::Completed),
            order(4, 14, 9, OrderStatus::Scheduled),
        ];

        let summary = DashboardSummary::build(&machines, &orders, day(13));
        assert_eq!(summary.machines_total, 3);
        assert_eq!(summary.machines_roasting, 1);
        assert_eq!(summary.machines_in_maintenance, 1);
        assert_eq!(summary.orders_scheduled, 2);
        assert_eq!(summary.orders_in_progress, 1);
        assert_eq!(summary.orders_completed, 1);
        let today: Vec<_> = summary.todays_orders.iter().map(|o| o.id).collect();
        assert_eq!(today, vec![2, 1]);
    }

    #[test]
    fn empty_inputs_give_zeroes() {
        let summary = DashboardSummary::build(&Vec::<Machine>::new(), &Vec::<Order>::new(), day(13));
        assert_eq!(summary.machines_total, 0);
        assert!(summary.todays_orders.is_empty());
        assert!(serde_json::to_string(&summary).unwrap().contains("\"orders_completed\":0"));
    }
}
