use std::path::PathBuf;

use anyhow::{Context, Result};
use chrono::{Duration, NaiveDate, NaiveDateTime};
use clap::Parser;
use tracing::{info, warn};

use rp_core::{Machine, MachineRegistry, MachineStatus, Order, OrderStatus};
use rp_runtime::init_tracing;
use rp_runtime::metrics::MetricsRegistry;
use rp_scheduler::{check_schedule, NewOrderRequest, OrderBook, Planner, SchedulingConfig};
use rp_views::{DashboardSummary, MachineTimeline, TimelineWindow};

/// Books a day of synthetic roasting orders against the seed shop floor and
/// prints the resulting dashboard and timeline as JSON lines.
#[derive(Debug, Parser)]
struct Args {
    /// Wall-clock time the requests arrive at.
    #[arg(long, default_value = "2025-06-13T09:15:00")]
    now: NaiveDateTime,
    /// JSON file with scheduling settings.
    #[arg(long)]
    config: Option<PathBuf>,
    #[arg(long)]
    rate_minutes_per_kg: Option<f64>,
    #[arg(long)]
    base_minutes: Option<f64>,
    #[arg(long)]
    buffer_minutes: Option<i64>,
    /// Number of synthetic orders to request.
    #[arg(long, default_value_t = 12)]
    orders: u32,
    /// Minutes between successive requests.
    #[arg(long, default_value_t = 20)]
    interval_minutes: i64,
}

const CLIENTS: [&str; 4] = [
    "Blue Bottle Coffee",
    "Stumptown Coffee",
    "Counter Culture",
    "Intelligentsia",
];

const BEANS: [&str; 5] = [
    "Ethiopian Yirgacheffe",
    "Colombian Huila",
    "Brazilian Santos",
    "Guatemalan Antigua",
    "Kenya AA",
];

fn main() -> Result<()> {
    init_tracing();
    let args = Args::parse();
    info!(now = %args.now, orders = args.orders, "roastery_demo starting");

    let cfg = scheduling_config(&args)?;
    let metrics = MetricsRegistry::default();
    let day = args.now.date();

    let machines = seed_machines()?;
    metrics.inc_machines_registered(machines.len() as u64);
    let book = OrderBook::with_orders(seed_orders(day)?)?;
    let mut planner = Planner::new(cfg, machines, book)?;

    let machine_ids: Vec<u64> = planner.machines().iter().map(|m| m.id).collect();
    anyhow::ensure!(!machine_ids.is_empty(), "no machines registered");
    for i in 0..args.orders {
        let machine_id = machine_ids[i as usize % machine_ids.len()];
        let weight = 2.0 + f64::from(i % 6) * 1.5;
        let request = NewOrderRequest::new(
            CLIENTS[i as usize % CLIENTS.len()],
            BEANS[i as usize % BEANS.len()],
            weight,
            machine_id,
        );
        let now = request_time(args.now, args.interval_minutes, i)?;

        match planner.schedule(&request, now) {
            Ok(order) => {
                metrics.inc_orders_scheduled(1);
                metrics.record_queue_depth(planner.orders().outstanding_for(machine_id) as u64);
                info!(
                    order_id = order.id,
                    machine_id,
                    weight,
                    start = %order.start_time,
                    end = %order.end_time,
                    "order scheduled"
                );
            }
            Err(err) => {
                metrics.inc_orders_rejected(1);
                warn!(machine_id, weight, error = %err, "request rejected");
            }
        }
    }

    let conflicts = planner.conflicts();
    for conflict in &conflicts {
        warn!(%conflict, "schedule audit");
    }
    check_schedule(planner.orders().iter(), planner.config().buffer())
        .context("schedule failed its overlap audit")?;

    let close_of_day = day
        .and_hms_opt(18, 0, 0)
        .context("building close-of-day timestamp")?;
    let changed = planner.sync_with_clock(close_of_day);
    metrics.inc_status_transitions(changed.len() as u64);

    let summary = DashboardSummary::build(planner.machines().iter(), planner.orders().iter(), day);
    println!("{}", serde_json::to_string(&summary)?);

    let timeline = MachineTimeline::for_day(
        planner.machines().iter(),
        planner.orders().iter(),
        day,
        TimelineWindow::default(),
    );
    println!("{}", serde_json::to_string(&timeline)?);

    let final_snapshot = metrics.snapshot();
    println!("{}", final_snapshot.to_json_line("roastery_demo"));
    info!(?final_snapshot, "final metrics summary");
    Ok(())
}

fn scheduling_config(args: &Args) -> Result<SchedulingConfig> {
    let mut cfg: SchedulingConfig = match &args.config {
        Some(path) => rp_runtime::load_config(path)?,
        None => SchedulingConfig::default(),
    };
    if let Some(rate) = args.rate_minutes_per_kg {
        cfg.rate_minutes_per_kg = rate;
    }
    if let Some(base) = args.base_minutes {
        cfg.base_minutes = base;
    }
    if let Some(buffer) = args.buffer_minutes {
        cfg.buffer_minutes = buffer;
    }
    cfg.validate()?;
    Ok(cfg)
}

/// Arrival time of the `i`th synthetic request.
fn request_time(start: NaiveDateTime, interval_minutes: i64, i: u32) -> Result<NaiveDateTime> {
    let offset = interval_minutes
        .checked_mul(i64::from(i))
        .and_then(Duration::try_minutes)
        .with_context(|| format!("request offset {interval_minutes}m x {i} is out of range"))?;
    start
        .checked_add_signed(offset)
        .with_context(|| format!("request time {start} + {offset} is out of range"))
}

fn seed_machines() -> Result<MachineRegistry> {
    let registry = MachineRegistry::with_machines(vec![
        Machine {
            id: 1,
            name: "Probat L12".into(),
            capacity: 12.0,
            status: MachineStatus::Available,
        },
        Machine {
            id: 2,
            name: "Diedrich IR-12".into(),
            capacity: 12.0,
            status: MachineStatus::Roasting,
        },
        Machine {
            id: 3,
            name: "Loring S15".into(),
            capacity: 15.0,
            status: MachineStatus::Maintenance,
        },
    ])?;
    Ok(registry)
}

fn seed_orders(day: NaiveDate) -> Result<Vec<Order>> {
    let at = |h: u32, m: u32| {
        day.and_hms_opt(h, m, 0)
            .with_context(|| format!("building seed time {h:02}:{m:02}"))
    };
    Ok(vec![
        Order {
            id: 1,
            client_name: "Blue Bottle Coffee".into(),
            bean_type: "Ethiopian Yirgacheffe".into(),
            weight: 10.0,
            machine_id: 1,
            start_time: at(9, 0)?,
            end_time: at(10, 30)?,
            status: OrderStatus::Scheduled,
        },
        Order {
            id: 2,
            client_name: "Stumptown Coffee".into(),
            bean_type: "Colombian Huila".into(),
            weight: 8.0,
            machine_id: 2,
            start_time: at(11, 0)?,
            end_time: at(12, 20)?,
            status: OrderStatus::InProgress,
        },
    ])
}
