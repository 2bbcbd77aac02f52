//! Constants shared across the crate.

pub const APP_NAME: &str = "edgestack";

/// Length of the truncated hash used for fingerprints.
pub const OBJ_HASH_PREFIX_LEN: usize = 20;

/// Version tags must start with a letter; this is the letter.
pub const VERSION_TAG_PREFIX: char = 'V';

/// Joins a function identifier and its version tag in the composite export.
pub const EXPORT_DELIMITER: &str = ":";

/// Edge functions can only be created in this region.
pub const EDGE_REGION: &str = "us-east-1";

/// Upper bound for an origin-request edge function timeout, in seconds.
pub const MAX_EDGE_TIMEOUT_SECS: u64 = 30;

pub const DEFAULT_API_PATH_PATTERN: &str = "api/*";

/// Managed policy granting log-write capability to the execution role.
pub const BASIC_EXECUTION_POLICY: &str = "service-role/AWSLambdaBasicExecutionRole";

pub const TRUSTED_PRINCIPALS: [&str; 2] = ["lambda.amazonaws.com", "edgelambda.amazonaws.com"];

/// Prefix of every identifier handed out by the local substrates.
pub const ID_SCHEME: &str = "urn:edgestack";
