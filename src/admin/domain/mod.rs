//! Read models for administrative reporting.

mod reports;

pub use reports::{
    AdminDashboard, LoginHistory, LoginHistoryStats, TaskTotals, TopUser, UserOverview, UserTasks,
};
