pub mod auth;
pub mod calendar_service;
pub mod profitability_service;
pub mod route_service;
