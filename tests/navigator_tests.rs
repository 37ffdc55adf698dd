use homeserve_portal::{
    AppConfig, Guard, NavigationError, NavigationOutcome, Navigator, RealmPolicy, RouteTable,
    config::StaleRedirectPolicy,
    guard::LOGIN_REQUIRED,
    models::{Notice, Severity},
    notifier::ChannelNotifier,
    routes::{self, RouteDef},
    session::{SessionReader, SessionStore},
};
use std::{sync::Arc, time::Duration};
use tokio::sync::mpsc::UnboundedReceiver;

// --- Setup Utilities ---

struct Harness {
    navigator: Navigator,
    store: Arc<SessionStore>,
    notices: UnboundedReceiver<Notice>,
}

fn harness_with(config: AppConfig, table: RouteTable) -> Harness {
    let store = Arc::new(SessionStore::new());
    let (notifier, notices) = ChannelNotifier::new();
    let guard = Guard::from_config(RealmPolicy::default(), &config);
    let navigator = Navigator::new(
        Arc::new(guard),
        Arc::new(table),
        store.clone(),
        Arc::new(notifier),
        &config,
    );
    Harness {
        navigator,
        store,
        notices,
    }
}

fn harness(policy: StaleRedirectPolicy) -> Harness {
    let config = AppConfig {
        stale_redirects: policy,
        ..AppConfig::default()
    };
    harness_with(config, routes::load_routes().unwrap())
}

/// Lets time run past the fixed delay so spawned redirects get to fire.
async fn wait_past_delay() {
    tokio::time::sleep(Duration::from_millis(1600)).await;
}

// --- Tests ---

#[tokio::test(start_paused = true)]
async fn test_public_navigation_arrives_immediately() {
    let h = harness(StaleRedirectPolicy::Cancel);

    let outcome = h.navigator.navigate("/unauthorized").unwrap();
    match outcome {
        NavigationOutcome::Arrived {
            path,
            screen,
            redirected_from,
        } => {
            assert_eq!(path, "/unauthorized");
            assert_eq!(screen.as_deref(), Some("Unauthorized"));
            assert!(redirected_from.is_none());
        }
        other => panic!("expected arrival, got {:?}", other),
    }
    assert_eq!(h.navigator.location(), "/unauthorized");
}

#[tokio::test(start_paused = true)]
async fn test_root_shortcut_follows_role_home_and_route_redirect() {
    let h = harness(StaleRedirectPolicy::Cancel);
    h.store.sign_in("t", "admin");

    let outcome = h.navigator.navigate("/").unwrap();
    match outcome {
        NavigationOutcome::Arrived {
            path,
            redirected_from,
            ..
        } => {
            assert_eq!(path, "/admin/dashboard");
            assert_eq!(redirected_from.as_deref(), Some("/"));
        }
        other => panic!("expected arrival, got {:?}", other),
    }
}

#[tokio::test(start_paused = true)]
async fn test_denied_navigation_shows_notice_then_redirects() {
    let mut h = harness(StaleRedirectPolicy::Cancel);

    let outcome = h.navigator.navigate("/admin/users").unwrap();
    let pending = match outcome {
        NavigationOutcome::Deferred {
            target,
            notice,
            pending,
        } => {
            assert_eq!(target, "/auth");
            assert_eq!(notice.message, LOGIN_REQUIRED);
            assert_eq!(notice.severity, Severity::Warning);
            assert_eq!(notice.duration_ms, 3000);
            pending
        }
        other => panic!("expected deferral, got {:?}", other),
    };

    // The notice went out synchronously; the screen has not changed yet.
    let shown = h.notices.try_recv().unwrap();
    assert_eq!(shown.message, LOGIN_REQUIRED);
    assert_eq!(h.navigator.location(), "/");
    assert_eq!(h.navigator.pending_redirects().len(), 1);

    wait_past_delay().await;

    assert_eq!(h.navigator.location(), "/auth/login");
    assert!(h.navigator.pending_redirects().is_empty());
    assert!(!pending.is_cancelled());
}

#[tokio::test(start_paused = true)]
async fn test_redirect_waits_for_the_full_delay() {
    let h = harness(StaleRedirectPolicy::Cancel);
    h.navigator.navigate("/user/bookings").unwrap();

    tokio::time::sleep(Duration::from_millis(1400)).await;
    assert_eq!(h.navigator.location(), "/");

    tokio::time::sleep(Duration::from_millis(200)).await;
    assert_eq!(h.navigator.location(), "/auth/login");
}

#[tokio::test(start_paused = true)]
async fn test_newer_navigation_cancels_pending_redirect() {
    let h = harness(StaleRedirectPolicy::Cancel);

    let pending = match h.navigator.navigate("/professional/dashboard").unwrap() {
        NavigationOutcome::Deferred { pending, .. } => pending,
        other => panic!("expected deferral, got {:?}", other),
    };

    // The visitor moves on before the notice delay elapses.
    h.navigator.navigate("/unauthorized").unwrap();
    assert!(pending.is_cancelled());

    wait_past_delay().await;

    assert_eq!(h.navigator.location(), "/unauthorized");
    assert_eq!(h.navigator.history(), vec!["/unauthorized".to_string()]);
}

#[tokio::test(start_paused = true)]
async fn test_preserve_policy_lets_stale_redirect_override() {
    let h = harness(StaleRedirectPolicy::Preserve);

    h.navigator.navigate("/professional/dashboard").unwrap();
    h.navigator.navigate("/unauthorized").unwrap();
    assert_eq!(h.navigator.location(), "/unauthorized");

    wait_past_delay().await;

    // The stale redirect fired after the faster navigation.
    assert_eq!(h.navigator.location(), "/auth/login");
    assert_eq!(
        h.navigator.history(),
        vec!["/unauthorized".to_string(), "/auth/login".to_string()]
    );
}

#[tokio::test(start_paused = true)]
async fn test_manual_cancel_stops_redirect() {
    let h = harness(StaleRedirectPolicy::Preserve);

    h.navigator.navigate("/admin").unwrap();
    h.navigator.cancel_pending();

    wait_past_delay().await;
    assert_eq!(h.navigator.location(), "/");
}

#[tokio::test(start_paused = true)]
async fn test_session_is_read_fresh_on_each_attempt() {
    let mut h = harness(StaleRedirectPolicy::Cancel);
    h.store.sign_in("t", "user");

    let outcome = h.navigator.navigate("/user/profile").unwrap();
    assert!(matches!(outcome, NavigationOutcome::Arrived { .. }));

    // External logout between two attempts.
    h.store.sign_out();
    assert!(!h.store.read().is_authenticated());

    let outcome = h.navigator.navigate("/user/dashboard").unwrap();
    assert!(matches!(outcome, NavigationOutcome::Deferred { .. }));
    assert_eq!(h.notices.try_recv().unwrap().severity, Severity::Warning);
}

#[tokio::test(start_paused = true)]
async fn test_signed_in_visitor_bounced_from_login_lands_home() {
    let mut h = harness(StaleRedirectPolicy::Cancel);
    h.store.sign_in("t", "professional");

    let outcome = h.navigator.navigate("/auth").unwrap();
    assert!(matches!(
        outcome,
        NavigationOutcome::Deferred { ref target, .. } if target == "/professional"
    ));
    assert_eq!(h.notices.try_recv().unwrap().severity, Severity::Info);

    wait_past_delay().await;
    assert_eq!(h.navigator.location(), "/professional");
}

#[tokio::test(start_paused = true)]
async fn test_immediate_redirect_loop_is_reported() {
    // A home path that is itself the root makes the shortcut point back at itself.
    let config = AppConfig {
        max_redirect_hops: 3,
        ..AppConfig::default()
    };
    let store = Arc::new(SessionStore::new());
    store.sign_in("t", "user");
    let (notifier, _notices) = ChannelNotifier::new();
    let realms = RealmPolicy::new([homeserve_portal::policy::Realm {
        role: homeserve_portal::models::Role::User,
        home: "/".to_string(),
        prefixes: vec!["/user".to_string()],
    }])
    .unwrap();
    let guard = Guard::from_config(realms, &config);
    let table = RouteTable::compile(&[RouteDef::new("/").screen("Services")]);
    let navigator = Navigator::new(Arc::new(guard), Arc::new(table), store, Arc::new(notifier), &config);

    let result = navigator.navigate("/");
    assert_eq!(
        result.err(),
        Some(NavigationError::RedirectLoop {
            path: "/".to_string(),
            hops: 3
        })
    );
}

#[tokio::test(start_paused = true)]
async fn test_unknown_destination_renders_not_found() {
    let h = harness_with(AppConfig::default(), routes::load_routes().unwrap());

    match h.navigator.navigate("/definitely/missing").unwrap() {
        NavigationOutcome::Arrived { screen, .. } => {
            assert_eq!(screen.as_deref(), Some(routes::NOT_FOUND_SCREEN));
        }
        other => panic!("expected arrival, got {:?}", other),
    }
}

#[tokio::test(start_paused = true)]
async fn test_tracing_notifier_drives_the_same_flow() {
    let config = AppConfig::default();
    let store = Arc::new(SessionStore::new());
    store.sign_in("t", "user");
    let guard = Guard::from_config(RealmPolicy::default(), &config);
    let navigator = Navigator::new(
        Arc::new(guard),
        Arc::new(routes::load_routes().unwrap()),
        store,
        Arc::new(homeserve_portal::notifier::TracingNotifier),
        &config,
    );

    let outcome = navigator.navigate("/admin/dashboard").unwrap();
    assert!(matches!(
        outcome,
        NavigationOutcome::Deferred { ref notice, .. } if notice.severity == Severity::Error
    ));

    wait_past_delay().await;
    assert_eq!(navigator.location(), "/user");
}
