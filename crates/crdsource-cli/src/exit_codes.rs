//! Standard exit codes for CLI operations
//!
//! These exit codes follow Unix conventions and sysexits.h where applicable.

/// General error - unspecified failure
pub const ERROR: i32 = 1;

/// Validation error - configuration rejected before rendering or reading
pub const VALIDATION_ERROR: i32 = 2;

/// Render error - manifest encoding or object transcription failed
pub const RENDER_ERROR: i32 = 3;

/// Catalog error - unknown data source type, invalid catalog or CRD
pub const CATALOG_ERROR: i32 = 4;

/// IO error - file not found, permission denied, unparsable input
pub const IO_ERROR: i32 = 5;

/// Cluster error - kubeconfig, transport, API or not found
pub const CLUSTER_ERROR: i32 = 6;
