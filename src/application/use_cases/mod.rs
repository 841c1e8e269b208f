pub mod account_deletion;
pub mod analytics;
pub mod billing;
pub mod costs;
pub mod notification;
pub mod projections;
pub mod ratings;
pub mod subscription;
