/*!
 * Monitoring
 * Structured logging setup for binaries and tests
 */

mod tracer;

pub use tracer::{init_tracing, try_init_tracing, ENV_TRACE_JSON};
