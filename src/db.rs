pub mod client_repo;
pub use client_repo::ClientRepository;
pub mod staff_repo;
pub use staff_repo::StaffRepository;
pub mod finance_repo;
pub use finance_repo::FinanceRepository;
pub mod materials_repo;
pub use materials_repo::MaterialsRepository;
pub mod job_repo;
pub use job_repo::JobRepository;
pub mod route_repo;
pub use route_repo::RouteRepository;

pub mod stores;
pub use stores::{PgCalendarStore, PgProfitabilitySource, PgRouteStore};
