//! Default constants for proxy synthesis.

/// Default name of the in-memory module that owns synthesized types.
pub const DEFAULT_MODULE_NAME: &str = "Surrogate.Dynamic";

/// Suffix appended to a source type's full name to form its proxy type name.
pub const DEFAULT_PROXY_SUFFIX: &str = "$Proxy";

/// Name of the backing field holding the wrapped instance.
pub const BACKING_FIELD_NAME: &str = "_object";

/// Namespace of the generic wrapper contract.
pub const CONTRACT_NAMESPACE: &str = "Surrogate";

/// Simple name of the generic wrapper contract.
pub const CONTRACT_NAME: &str = "ObjectProxy";

/// Name of the accessor declared by the wrapper contract.
pub const CONTRACT_ACCESSOR: &str = "get_object";

/// Environment variable consulted for log filtering by the CLI.
pub const LOG_ENV_VAR: &str = "SURROGATE_LOG";
