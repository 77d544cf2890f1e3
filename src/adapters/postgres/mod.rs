//! PostgreSQL implementations of the repository ports.

pub mod interaction_repository;
pub mod match_repository;
pub mod plan_repository;
pub mod profile_directory;
pub mod subscription_repository;

pub use interaction_repository::PostgresInteractionRepository;
pub use match_repository::PostgresMatchRepository;
pub use plan_repository::PostgresPlanRepository;
pub use profile_directory::PostgresProfileDirectory;
pub use subscription_repository::PostgresSubscriptionRepository;
