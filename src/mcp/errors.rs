pub const INVALID_INPUT: &str = "invalid_input";
pub const BACKEND_UNREACHABLE: &str = "backend_unreachable";
pub const BACKEND_ERROR: &str = "backend_error";
pub const PRECONDITION_FAILED: &str = "precondition_failed";
pub const INTERNAL_ERROR: &str = "internal_error";

// JSON-RPC error codes used for protocol-level failures.
pub const RPC_METHOD_NOT_FOUND: i64 = -32601;
pub const RPC_INVALID_PARAMS: i64 = -32602;
pub const RPC_INTERNAL_ERROR: i64 = -32603;
