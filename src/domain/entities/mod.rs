pub mod cost;
pub mod deletion_request;
pub mod notification;
pub mod profile;
pub mod rating;
pub mod subscription_plan;
pub mod transaction;
pub mod user_subscription;
