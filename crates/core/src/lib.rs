pub mod config;
pub mod domain;
pub mod errors;
pub mod observability;

pub use config::{AppConfig, ConfigError, ConfigOverrides, LlmProvider, LoadOptions, LogFormat};
pub use domain::interaction::{InteractionDraft, InteractionRecord, NO_TOOL, RETRIEVAL_TOOL};
pub use domain::order::{ContainerNumber, OrderId, ShipmentOrder};
pub use domain::outcome::{FailureKind, ToolOutcome};
pub use domain::session::{Session, SessionId};
pub use errors::{ApplicationError, DomainError};
pub use observability::{InteractionLog, InteractionObserver, LogError};
