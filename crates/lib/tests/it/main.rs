/*! Integration tests for Rankboard.
 *
 * This test suite is organized as a single integration test binary
 * following the pattern described by matklad in
 * https://matklad.github.io/2021/02/27/delete-cargo-integration-tests.html
 *
 * The module structure mirrors the main library structure:
 * - rank: Tests for the rank engine through the public API (ordering properties, config)
 * - store: Tests for the OrderStore trait and the in-memory store, including save/load
 * - coordinator: Tests for moves, rebalances, concurrency and the background worker
 */

use tracing_subscriber::EnvFilter;

#[ctor::ctor]
fn init_test_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::from_default_env().add_directive("rankboard=info".parse().unwrap()),
        )
        .with_test_writer()
        .try_init();
}

mod coordinator;
mod helpers;
