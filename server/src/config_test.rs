use std::sync::{Mutex, MutexGuard, PoisonError};

use super::*;

/// Serializes the tests in this file; they all mutate the same variables.
static ENV_LOCK: Mutex<()> = Mutex::new(());

fn env_lock() -> MutexGuard<'static, ()> {
    ENV_LOCK.lock().unwrap_or_else(PoisonError::into_inner)
}

/// # Safety
/// Callers must hold [`env_lock`].
unsafe fn clear_server_env() {
    unsafe {
        std::env::remove_var("PORT");
        std::env::remove_var("BIND_ADDR");
        std::env::remove_var("YOUTUBE_BASE_URL");
        std::env::remove_var("UPSTREAM_REQUEST_TIMEOUT_SECS");
        std::env::remove_var("UPSTREAM_CONNECT_TIMEOUT_SECS");
    }
}

#[test]
fn from_env_uses_defaults() {
    let _guard = env_lock();
    unsafe { clear_server_env() };

    let cfg = ServerConfig::from_env().unwrap();
    assert_eq!(cfg.port, DEFAULT_PORT);
    assert_eq!(cfg.socket_addr().to_string(), "0.0.0.0:3000");
    assert_eq!(cfg.youtube_base_url, DEFAULT_YOUTUBE_BASE_URL);
    assert_eq!(cfg.timeouts, UpstreamTimeouts::default());
}

#[test]
fn from_env_parses_overrides() {
    let _guard = env_lock();
    unsafe {
        clear_server_env();
        std::env::set_var("PORT", "8088");
        std::env::set_var("BIND_ADDR", "127.0.0.1");
        std::env::set_var("YOUTUBE_BASE_URL", "http://127.0.0.1:9000/");
        std::env::set_var("UPSTREAM_REQUEST_TIMEOUT_SECS", "5");
        std::env::set_var("UPSTREAM_CONNECT_TIMEOUT_SECS", "2");
    }

    let cfg = ServerConfig::from_env().unwrap();
    assert_eq!(cfg.socket_addr().to_string(), "127.0.0.1:8088");
    assert_eq!(cfg.youtube_base_url, "http://127.0.0.1:9000");
    assert_eq!(cfg.timeouts, UpstreamTimeouts { request_secs: 5, connect_secs: 2 });
    assert_eq!(cfg.timeouts.request(), Duration::from_secs(5));

    unsafe { clear_server_env() };
}

#[test]
fn from_env_rejects_bad_port() {
    let _guard = env_lock();
    unsafe {
        clear_server_env();
        std::env::set_var("PORT", "eighty");
    }

    let err = ServerConfig::from_env().unwrap_err();
    assert_eq!(err.to_string(), "invalid PORT: eighty");

    unsafe { clear_server_env() };
}

#[test]
fn bad_timeouts_fall_back_to_defaults() {
    let _guard = env_lock();
    unsafe {
        clear_server_env();
        std::env::set_var("UPSTREAM_REQUEST_TIMEOUT_SECS", "soon");
        std::env::set_var("UPSTREAM_CONNECT_TIMEOUT_SECS", "0");
    }

    let cfg = ServerConfig::from_env().unwrap();
    assert_eq!(cfg.timeouts, UpstreamTimeouts::default());

    unsafe { clear_server_env() };
}
