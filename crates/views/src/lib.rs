//! Read-side projections over machines and orders for dashboards and
//! timeline charts.

pub mod dashboard;
pub mod timeline;

pub use dashboard::DashboardSummary;
pub use timeline::{MachineLane, MachineTimeline, TimelineBar, TimelineWindow};
