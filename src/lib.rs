//! # Gatehouse
//!
//! Table-gateway record facade for PostgreSQL on the `may` runtime.
//!
//! One [`TableGateway`] fronts one logical table: dynamic [`Record`]s in,
//! sea-query statements out, executed over an externally owned connection
//! through the [`Executor`] seam. The gateway never opens, pools, or closes
//! connections; the surrounding application checks a handle out of its own
//! pool and lends it to the facade for the life of a request.

pub mod config;
pub mod connection;
pub mod executor;
pub mod gateway;
pub mod predicate;
pub mod record;
pub mod registry;
pub mod result_set;
#[cfg(any(test, feature = "mock"))]
pub mod test_helpers;
mod value_conversion;

pub use config::{DatabaseConfig, GatewayConfig};
pub use connection::{connect, ConnectionError};
pub use executor::{ExecError, Executor, MayPostgresExecutor};
pub use gateway::{GatewayError, TableGateway};
pub use predicate::Predicate;
pub use record::Record;
pub use registry::{GatewayDef, Registry, RegistryError};
pub use result_set::ResultSet;
