pub mod authenticate;
pub mod cors;
pub mod guard_chain;
pub mod rate_limit;
pub mod request_trace;
pub mod security_headers;
pub mod structured_logger;
pub mod trace_span;
