use homeserve_portal::{
    AppConfig, ConfigError,
    config::{Env, StaleRedirectPolicy},
};
use serial_test::serial;
use std::{env, panic, time::Duration};

// --- Setup/Teardown Utilities ---

const CONFIG_VARS: [&str; 7] = [
    "APP_ENV",
    "BIND_ADDR",
    "REDIRECT_DELAY_MS",
    "NOTICE_DURATION_MS",
    "AUTH_ENTRY_PATH",
    "STALE_REDIRECTS",
    "MAX_REDIRECT_HOPS",
];

/// Utility to run a test function and restore environment variables afterward
fn run_with_env<T, R>(test: T) -> R
where
    T: FnOnce() -> R + panic::UnwindSafe,
{
    // Save current environment variables, then start from a clean slate.
    let originals: Vec<(String, Option<String>)> = CONFIG_VARS
        .iter()
        .map(|&var| (var.to_string(), env::var(var).ok()))
        .collect();
    unsafe {
        for var in CONFIG_VARS {
            env::remove_var(var);
        }
    }

    let result = panic::catch_unwind(test);

    // Restore original environment variables
    for (key, original_value) in originals.into_iter().rev() {
        unsafe {
            if let Some(val) = original_value {
                env::set_var(&key, val);
            } else {
                env::remove_var(&key);
            }
        }
    }

    // Re-panic if the test failed
    match result {
        Ok(value) => value,
        Err(e) => panic::resume_unwind(e),
    }
}

// --- Tests ---

#[test]
#[serial]
fn test_app_config_local_env_defaults() {
    let config = run_with_env(|| {
        unsafe {
            env::set_var("APP_ENV", "local");
        }
        AppConfig::load()
    })
    .unwrap();

    assert_eq!(config.env, Env::Local);
    assert_eq!(config.bind_addr, "0.0.0.0:3000");
    assert_eq!(config.redirect_delay, Duration::from_millis(1500));
    assert_eq!(config.notice_duration, Duration::from_millis(3000));
    assert_eq!(config.auth_entry_path, "/auth");
    assert_eq!(config.stale_redirects, StaleRedirectPolicy::Cancel);
    assert_eq!(config.max_redirect_hops, 10);
}

#[test]
#[serial]
fn test_app_config_production_fail_fast() {
    let result = run_with_env(|| {
        unsafe {
            env::set_var("APP_ENV", "production");
        }
        // BIND_ADDR is missing
        AppConfig::load()
    });

    assert_eq!(result.err(), Some(ConfigError::Missing("BIND_ADDR")));
}

#[test]
#[serial]
fn test_app_config_overrides() {
    let config = run_with_env(|| {
        unsafe {
            env::set_var("APP_ENV", "production");
            env::set_var("BIND_ADDR", "127.0.0.1:8080");
            env::set_var("REDIRECT_DELAY_MS", "250");
            env::set_var("NOTICE_DURATION_MS", " 5000 ");
            env::set_var("AUTH_ENTRY_PATH", "/auth/login");
            env::set_var("STALE_REDIRECTS", "preserve");
            env::set_var("MAX_REDIRECT_HOPS", "4");
        }
        AppConfig::load()
    })
    .unwrap();

    assert_eq!(config.env, Env::Production);
    assert_eq!(config.bind_addr, "127.0.0.1:8080");
    assert_eq!(config.redirect_delay, Duration::from_millis(250));
    assert_eq!(config.notice_duration, Duration::from_millis(5000));
    assert_eq!(config.auth_entry_path, "/auth/login");
    assert_eq!(config.stale_redirects, StaleRedirectPolicy::Preserve);
    assert_eq!(config.max_redirect_hops, 4);
}

#[test]
#[serial]
fn test_app_config_rejects_bad_values() {
    let cases = [
        ("REDIRECT_DELAY_MS", "soon"),
        ("MAX_REDIRECT_HOPS", "-1"),
        ("STALE_REDIRECTS", "ignore"),
        ("AUTH_ENTRY_PATH", "auth"),
    ];

    for (var, value) in cases {
        let result = run_with_env(|| {
            unsafe {
                env::set_var(var, value);
            }
            AppConfig::load()
        });

        assert_eq!(
            result.err(),
            Some(ConfigError::Invalid {
                var,
                value: value.to_string()
            }),
            "{}={}",
            var,
            value
        );
    }
}
