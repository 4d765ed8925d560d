pub mod fixtures;
pub mod reader;
pub mod relay;
pub mod users;
pub mod writer;

pub use clearsig_constants::test_utils as test_constants;

/// Install a test tracing subscriber honoring `RUST_LOG`. Safe to call more
/// than once.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}
