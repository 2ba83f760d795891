/// Use cases module containing application business logic orchestration
mod analyze_migration;

pub use analyze_migration::AnalyzeMigrationUseCase;
