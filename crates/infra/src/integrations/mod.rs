//! External service integrations

pub mod marketing_cloud;
