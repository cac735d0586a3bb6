// Error codes implementation
// Standardized error codes for the Skribe client

pub mod validation {
    pub const INVALID_INPUT: &str = "VALIDATION_1001";
    pub const INVALID_FORMAT: &str = "VALIDATION_1003";
}

pub mod transport {
    pub const REQUEST_FAILED: &str = "TRANSPORT_2001";
    pub const WEBSOCKET_FAILED: &str = "TRANSPORT_2002";
}

pub mod backend {
    pub const REQUEST_REJECTED: &str = "BACKEND_3001";
    pub const NOT_FOUND: &str = "BACKEND_3004";
    pub const SERVER_ERROR: &str = "BACKEND_3005";
}

pub mod recording {
    pub const CAPTURE_FAILED: &str = "RECORDING_4001";
}

pub mod config {
    pub const INVALID_CONFIG: &str = "CONFIG_5001";
}

pub mod internal {
    pub const UNEXPECTED: &str = "INTERNAL_9001";
}
