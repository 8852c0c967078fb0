pub mod client_repo;
pub mod company_repo;
pub mod criteria_set_repo;
pub mod parameter_repo;
pub mod parameter_value_repo;
pub mod portfolio_repo;
pub mod screening_result_repo;

pub use client_repo::ClientRepo;
pub use company_repo::CompanyRepo;
pub use criteria_set_repo::CriteriaSetRepo;
pub use parameter_repo::ParameterRepo;
pub use parameter_value_repo::ParameterValueRepo;
pub use portfolio_repo::PortfolioRepo;
pub use screening_result_repo::ScreeningResultRepo;
