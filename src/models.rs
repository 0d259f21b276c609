pub mod calendar;
pub mod clients;
pub mod finance;
pub mod jobs;
pub mod materials;
pub mod reports;
pub mod routes;
pub mod staff;
