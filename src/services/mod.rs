mod account_store;
mod exporter;
mod identity;
mod repository;
mod workspace;

pub use account_store::AccountStore;
pub use exporter::Exporter;
pub use identity::IdentityGate;
pub use repository::{AccountRepository, FileAccountRepository, RedisAccountRepository};
#[cfg(test)]
pub use repository::MemoryAccountRepository;
pub use workspace::WorkspaceService;
