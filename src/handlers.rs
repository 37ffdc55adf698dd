use axum::{
    Json,
    extract::State,
    http::{HeaderMap, HeaderName, HeaderValue, StatusCode, Uri},
    response::{IntoResponse, Redirect, Response},
};
use chrono::Utc;

use crate::{
    AppState,
    guard::ROOT_PATH,
    models::{
        Decision, NavigateRequest, NavigateResponse, Notice, NoticeView, RouteMetadata,
        RouteSummary, ScreenView, Session, TransitionAttempt,
    },
    routes::{NOT_FOUND_SCREEN, normalize_path},
};

/// Request header naming the screen the visitor is navigating away from.
pub static NAV_ORIGIN_HEADER: HeaderName = HeaderName::from_static("x-nav-origin");

static REFRESH: HeaderName = HeaderName::from_static("refresh");

/// list_routes
///
/// [Public Route] Lists every compiled destination with its inherited policy
/// metadata.
#[utoipa::path(
    get,
    path = "/api/routes",
    responses((status = 200, description = "Route table", body = [RouteSummary]))
)]
pub async fn list_routes(State(state): State<AppState>) -> Json<Vec<RouteSummary>> {
    Json(state.routes.summaries())
}

/// navigate
///
/// [Public Route] Evaluates the guard for a requested destination and returns
/// the decision without applying it. Single-page shells call this on every
/// in-app transition and carry out the decision themselves.
#[utoipa::path(
    post,
    path = "/api/navigate",
    request_body = NavigateRequest,
    responses((status = 200, description = "Guard decision", body = NavigateResponse))
)]
pub async fn navigate(
    State(state): State<AppState>,
    session: Session,
    Json(payload): Json<NavigateRequest>,
) -> Json<NavigateResponse> {
    let (resolved_path, meta, screen) = match state.routes.resolve(&payload.to) {
        Some(resolved) => (resolved.path, resolved.entry.meta, resolved.entry.screen.clone()),
        None => (normalize_path(&payload.to), RouteMetadata::default(), None),
    };

    let attempt = TransitionAttempt::new(resolved_path.clone(), meta, normalize_path(&payload.from));
    let decision = state.guard.evaluate(&attempt, &session);

    Json(NavigateResponse {
        resolved_path,
        screen,
        decision,
    })
}

/// render_screen
///
/// [Fallback] Serves any screen path. The guard runs first; its decision is
/// mapped onto HTTP:
/// - proceed: 200 with the screen view (or 307 to the canonical path when a
///   route-level redirect was followed);
/// - immediate redirect: 307;
/// - redirect after notice: 200 with the notice and a `Refresh` header that
///   moves the browser on once the delay has passed.
pub async fn render_screen(
    State(state): State<AppState>,
    session: Session,
    headers: HeaderMap,
    uri: Uri,
) -> Response {
    // 1. Origin: the screen being left, when the shell says so.
    let origin = headers
        .get(&NAV_ORIGIN_HEADER)
        .and_then(|value| value.to_str().ok())
        .map(normalize_path)
        .unwrap_or_else(|| ROOT_PATH.to_string());

    // 2. Resolution: follow route-level redirects so the guard judges the
    // final destination. Only an unsettled redirect chain yields nothing.
    let Some(resolved) = state.routes.resolve(uri.path()) else {
        return StatusCode::NOT_FOUND.into_response();
    };

    let attempt = TransitionAttempt::new(resolved.path.clone(), resolved.entry.meta, origin);

    // 3. Guard decision mapped onto HTTP.
    match state.guard.evaluate(&attempt, &session) {
        // 3a. Allowed, but the requested path was an alias: send the browser
        // to the canonical path so relative links keep working.
        Decision::Proceed if resolved.redirected_from.is_some() => {
            Redirect::temporary(&resolved.path).into_response()
        }
        // 3b. Allowed: render the screen inside its layout chain.
        Decision::Proceed => Json(ScreenView {
            screen: resolved
                .entry
                .screen
                .clone()
                .unwrap_or_else(|| NOT_FOUND_SCREEN.to_string()),
            layouts: resolved.entry.layouts.clone(),
            params: resolved.params,
            path: resolved.path,
        })
        .into_response(),
        // 3c. Immediate redirect (signed-in visitor asking for the root).
        Decision::RedirectTo { path } => Redirect::temporary(&path).into_response(),
        // 3d. Denied: the notice is the body, and the browser moves on by itself
        // once the delay has passed.
        Decision::RedirectToAfterNotice {
            path,
            message,
            severity,
            delay_ms,
        } => {
            tracing::debug!(denied = %resolved.path, redirect = %path, ?severity, "screen denied");

            let refresh = format!("{}; url={}", format_seconds(delay_ms), path);
            let body = NoticeView {
                redirect_to: path,
                delay_ms,
                notice: Notice {
                    message,
                    severity,
                    duration_ms: u64::try_from(state.config.notice_duration.as_millis())
                        .unwrap_or(u64::MAX),
                    issued_at: Utc::now(),
                },
            };

            let mut response = Json(body).into_response();
            if let Ok(value) = HeaderValue::from_str(&refresh) {
                response.headers_mut().insert(REFRESH.clone(), value);
            }
            response
        }
    }
}

/// Renders milliseconds as seconds for the `Refresh` header ("1.5", "2").
fn format_seconds(ms: u64) -> String {
    let secs = ms / 1000;
    let frac = ms % 1000;
    if frac == 0 {
        secs.to_string()
    } else {
        format!("{}.{:03}", secs, frac)
            .trim_end_matches('0')
            .to_string()
    }
}
