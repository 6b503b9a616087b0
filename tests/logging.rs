//! Exercises `Store::with_logger` against a real terminal drain instead of the
//! `slog::Discard` logger the unit tests use, so the `slog-term` dev-dependency has an
//! actual caller. Mirrors the standard `slog-term` setup (a `TermDecorator` wrapped in
//! `FullFormat`, serialized through a `Mutex` since there's no `slog-async` dependency
//! here to hand it an async drain).

use std::sync::Mutex;

use factdb::{Store, StoreConfig};
use slog::{o, Drain, Logger};

fn term_logger() -> Logger {
    let decorator = slog_term::TermDecorator::new().build();
    let drain = slog_term::FullFormat::new(decorator).build().fuse();
    let drain = Mutex::new(drain).fuse();
    Logger::root(drain, o!("component" => "factdb-test"))
}

#[test]
fn store_operations_log_through_a_real_drain_without_panicking() {
    let mut store: Store<Vec<u8>> = Store::with_logger(StoreConfig::default(), term_logger());
    store.add_fact("Alice", "knows", "Bob").unwrap();
    store.add_fact("Alice", "knows", "Carol").unwrap();
    assert_eq!(store.count(), 2);
    assert!(store.remove_fact("Alice", "knows", "Bob").unwrap());
    assert_eq!(store.count(), 1);
}
