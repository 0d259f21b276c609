pub mod calendar;
pub mod reports;
pub mod routes;
