// ABOUTME: Environment variable names and client defaults
// ABOUTME: Centralized definitions used by client and stack configuration

// Client Configuration
pub const STACK_MANAGEMENT_API_URL: &str = "STACK_MANAGEMENT_API_URL";
pub const STACK_MANAGEMENT_AUTHTOKEN: &str = "STACK_MANAGEMENT_AUTHTOKEN";
pub const STACK_MANAGEMENT_TIMEOUT_SECS: &str = "STACK_MANAGEMENT_TIMEOUT_SECS";
pub const STACK_MANAGEMENT_CONNECT_TIMEOUT_SECS: &str = "STACK_MANAGEMENT_CONNECT_TIMEOUT_SECS";
pub const STACK_MANAGEMENT_USER_AGENT: &str = "STACK_MANAGEMENT_USER_AGENT";

// Stack Configuration
pub const STACK_API_KEY: &str = "STACK_API_KEY";
pub const STACK_MANAGEMENT_TOKEN: &str = "STACK_MANAGEMENT_TOKEN";
pub const STACK_BRANCH: &str = "STACK_BRANCH";

// Defaults
pub const DEFAULT_API_URL: &str = "https://api.contentstack.io";
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 10;

// Header names
pub const HEADER_API_KEY: &str = "api_key";
pub const HEADER_AUTHTOKEN: &str = "authtoken";
pub const HEADER_BRANCH: &str = "branch";
