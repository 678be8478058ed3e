//! C-ABI wrapper around `stats-core`.
//!
//! # Overview
//! Exposes the submission-stats client and the view controller through
//! `extern "C"` functions so the watch app can build the request, execute it
//! with its own HTTP stack, and feed the response back without linking to
//! serde or any Rust I/O.
//!
//! # Design
//! - Every `extern "C"` function wraps its body in `catch_unwind` so panics
//!   never cross the FFI boundary.
//! - The host loop is: `stats_controller_trigger_fetch` returns
//!   `InvokeClient`, the host executes `stats_build_request`, turns the
//!   reply into an outcome with `stats_parse_response` (or
//!   `stats_transport_failure` when no reply arrived) and hands it to
//!   `stats_controller_resolve`.
//! - The C caller owns all returned pointers and must call the matching
//!   `stats_free_*` function to release them. `stats_controller_resolve`
//!   consumes its outcome.

pub mod types;

use std::ffi::CStr;
use std::os::raw::c_char;
use std::panic::catch_unwind;

use stats_core::{ClientConfig, FetchOutcome, StatsClient, ViewController};

use types::*;

/// Read a nullable C string. Null and invalid UTF-8 yield `None`.
fn read_str(s: *const c_char) -> Option<String> {
    if s.is_null() {
        return None;
    }
    unsafe { CStr::from_ptr(s) }
        .to_str()
        .ok()
        .map(str::to_string)
}

// ---------------------------------------------------------------------------
// Client lifecycle
// ---------------------------------------------------------------------------

/// Create a new `StatsClient`.
///
/// `endpoint` and `username` are required. `user_agent` may be null and
/// `timeout_ms` may be 0 to keep the defaults. Returns null if a required
/// argument is null or not UTF-8.
/// The caller must free the returned pointer with `stats_client_free`.
#[unsafe(no_mangle)]
pub extern "C" fn stats_client_new(
    endpoint: *const c_char,
    username: *const c_char,
    user_agent: *const c_char,
    timeout_ms: u64,
) -> *mut FfiStatsClient {
    catch_unwind(|| {
        let (Some(endpoint), Some(username)) = (read_str(endpoint), read_str(username)) else {
            return std::ptr::null_mut();
        };
        let mut config = ClientConfig::new(endpoint, username);
        if let Some(user_agent) = read_str(user_agent) {
            config = config.with_user_agent(user_agent);
        }
        if timeout_ms > 0 {
            config = config.with_timeout_ms(timeout_ms);
        }
        let client = FfiStatsClient {
            inner: StatsClient::new(config),
        };
        Box::into_raw(Box::new(client))
    })
    .unwrap_or(std::ptr::null_mut())
}

/// Free a client created by `stats_client_new`. Safe to call with null.
#[unsafe(no_mangle)]
pub extern "C" fn stats_client_free(client: *mut FfiStatsClient) {
    if !client.is_null() {
        let _ = catch_unwind(|| {
            drop(unsafe { Box::from_raw(client) });
        });
    }
}

// ---------------------------------------------------------------------------
// Request / response
// ---------------------------------------------------------------------------

/// Build the submission-stats request.
///
/// Returns null if `client` is null or the body cannot be serialized.
/// The caller must free the returned pointer with `stats_free_request`.
#[unsafe(no_mangle)]
pub extern "C" fn stats_build_request(client: *const FfiStatsClient) -> *mut FfiHttpRequest {
    catch_unwind(|| {
        if client.is_null() {
            return std::ptr::null_mut();
        }
        let client = unsafe { &*client };
        match client.inner.build_submission_counts() {
            Ok(req) => FfiHttpRequest::from_core(req),
            Err(_) => std::ptr::null_mut(),
        }
    })
    .unwrap_or(std::ptr::null_mut())
}

/// Turn a host-executed response into an outcome.
///
/// Returns null if `client` or `response` is null.
/// The caller must free the result with `stats_free_outcome` or hand it to
/// `stats_controller_resolve`.
#[unsafe(no_mangle)]
pub extern "C" fn stats_parse_response(
    client: *const FfiStatsClient,
    response: *const FfiHttpResponse,
) -> *mut FfiFetchOutcome {
    catch_unwind(|| {
        if client.is_null() || response.is_null() {
            return std::ptr::null_mut();
        }
        let client = unsafe { &*client };
        let response = unsafe { &*response }.to_core();
        let outcome = FetchOutcome::from_result(client.inner.parse_submission_counts(response));
        FfiFetchOutcome::from_core(outcome)
    })
    .unwrap_or(std::ptr::null_mut())
}

/// The outcome to report when the host got no response at all (timeout,
/// DNS failure, refused connection). Always carries code 499.
#[unsafe(no_mangle)]
pub extern "C" fn stats_transport_failure() -> *mut FfiFetchOutcome {
    catch_unwind(|| FfiFetchOutcome::from_core(FetchOutcome::transport_failure()))
        .unwrap_or(std::ptr::null_mut())
}

// ---------------------------------------------------------------------------
// Controller
// ---------------------------------------------------------------------------

/// Create a controller in the `Idle` state.
/// The caller must free the returned pointer with `stats_controller_free`.
#[unsafe(no_mangle)]
pub extern "C" fn stats_controller_new() -> *mut FfiStatsController {
    catch_unwind(|| {
        Box::into_raw(Box::new(FfiStatsController {
            inner: ViewController::new(),
        }))
    })
    .unwrap_or(std::ptr::null_mut())
}

/// Free a controller created by `stats_controller_new`. Safe to call with null.
#[unsafe(no_mangle)]
pub extern "C" fn stats_controller_free(controller: *mut FfiStatsController) {
    if !controller.is_null() {
        let _ = catch_unwind(|| {
            drop(unsafe { Box::from_raw(controller) });
        });
    }
}

/// Idle -> Loading. Returns `InvokeClient` on success, `NotAllowed` otherwise.
#[unsafe(no_mangle)]
pub extern "C" fn stats_controller_trigger_fetch(controller: *mut FfiStatsController) -> FfiStatus {
    catch_unwind(|| {
        if controller.is_null() {
            return FfiStatus::NullArg;
        }
        let controller = unsafe { &mut *controller };
        controller.inner.trigger_fetch().into()
    })
    .unwrap_or(FfiStatus::Panic)
}

/// Error -> Loading. Returns `InvokeClient` on success, `NotAllowed` otherwise.
#[unsafe(no_mangle)]
pub extern "C" fn stats_controller_trigger_retry(controller: *mut FfiStatsController) -> FfiStatus {
    catch_unwind(|| {
        if controller.is_null() {
            return FfiStatus::NullArg;
        }
        let controller = unsafe { &mut *controller };
        controller.inner.trigger_retry().into()
    })
    .unwrap_or(FfiStatus::Panic)
}

/// Loading -> Success/Error.
///
/// Consumes `outcome` regardless of the result; do not free it afterwards.
/// Returns `NotAllowed` if no fetch is in flight.
#[unsafe(no_mangle)]
pub extern "C" fn stats_controller_resolve(
    controller: *mut FfiStatsController,
    outcome: *mut FfiFetchOutcome,
) -> FfiStatus {
    catch_unwind(|| {
        if outcome.is_null() {
            return FfiStatus::NullArg;
        }
        let outcome = unsafe { FfiFetchOutcome::into_core(outcome) };
        if controller.is_null() {
            return FfiStatus::NullArg;
        }
        let controller = unsafe { &mut *controller };
        controller.inner.resolve(outcome).into()
    })
    .unwrap_or(FfiStatus::Panic)
}

/// Which affordance the screen should show right now.
#[unsafe(no_mangle)]
pub extern "C" fn stats_controller_available_action(
    controller: *const FfiStatsController,
) -> FfiUserAction {
    catch_unwind(|| {
        if controller.is_null() {
            return FfiUserAction::None;
        }
        let controller = unsafe { &*controller };
        controller.inner.available_action().into()
    })
    .unwrap_or(FfiUserAction::None)
}

/// Snapshot the current state.
///
/// Returns null if `controller` is null.
/// The caller must free the returned pointer with `stats_free_snapshot`.
#[unsafe(no_mangle)]
pub extern "C" fn stats_controller_state(
    controller: *const FfiStatsController,
) -> *mut FfiViewSnapshot {
    catch_unwind(|| {
        if controller.is_null() {
            return std::ptr::null_mut();
        }
        let controller = unsafe { &*controller };
        FfiViewSnapshot::from_core(controller.inner.state())
    })
    .unwrap_or(std::ptr::null_mut())
}

/// The current state's name (`idle`, `loading`, `success`, `error`).
///
/// Returns null if `controller` is null.
/// The caller must free the returned string with `stats_free_string`.
#[unsafe(no_mangle)]
pub extern "C" fn stats_controller_state_label(controller: *const FfiStatsController) -> *mut c_char {
    catch_unwind(|| {
        if controller.is_null() {
            return std::ptr::null_mut();
        }
        let controller = unsafe { &*controller };
        c_string(controller.inner.state().label().to_string())
    })
    .unwrap_or(std::ptr::null_mut())
}

// ---------------------------------------------------------------------------
// Free functions
// ---------------------------------------------------------------------------

/// Free a request returned by `stats_build_request`. Safe to call with null.
#[unsafe(no_mangle)]
pub extern "C" fn stats_free_request(req: *mut FfiHttpRequest) {
    if !req.is_null() {
        let _ = catch_unwind(|| unsafe { FfiHttpRequest::free(req) });
    }
}

/// Free an outcome that was not passed to `stats_controller_resolve`.
/// Safe to call with null.
#[unsafe(no_mangle)]
pub extern "C" fn stats_free_outcome(outcome: *mut FfiFetchOutcome) {
    if !outcome.is_null() {
        let _ = catch_unwind(|| unsafe { FfiFetchOutcome::free(outcome) });
    }
}

/// Free a snapshot returned by `stats_controller_state`. Safe to call with null.
#[unsafe(no_mangle)]
pub extern "C" fn stats_free_snapshot(snapshot: *mut FfiViewSnapshot) {
    if !snapshot.is_null() {
        let _ = catch_unwind(|| unsafe { FfiViewSnapshot::free(snapshot) });
    }
}

/// Free a C string allocated by this library. Safe to call with null.
#[unsafe(no_mangle)]
pub extern "C" fn stats_free_string(s: *mut c_char) {
    if !s.is_null() {
        let _ = catch_unwind(|| unsafe { free_c_string(s) });
    }
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use std::ffi::CString;

    const SCENARIO_A: &str = r#"{"data":{"matchedUser":{"submitStats":{"acSubmissionNum":[{"difficulty":"Easy","count":120,"submissions":150},{"difficulty":"Medium","count":80,"submissions":200},{"difficulty":"Hard","count":10,"submissions":40}]}}}}"#;

    fn new_client(endpoint: &str) -> *mut FfiStatsClient {
        let endpoint = CString::new(endpoint).unwrap();
        let username = CString::new("tester").unwrap();
        stats_client_new(endpoint.as_ptr(), username.as_ptr(), std::ptr::null(), 0)
    }

    fn parse(client: *const FfiStatsClient, status: u16, body: &str) -> *mut FfiFetchOutcome {
        let body = CString::new(body).unwrap();
        let response = FfiHttpResponse {
            status,
            body: body.as_ptr(),
        };
        stats_parse_response(client, &response)
    }

    fn header(req: &FfiHttpRequest, i: usize) -> (String, String) {
        let h = unsafe { &*req.headers.add(i) };
        let key = unsafe { CStr::from_ptr(h.key) }.to_str().unwrap().to_string();
        let value = unsafe { CStr::from_ptr(h.value) }.to_str().unwrap().to_string();
        (key, value)
    }

    fn label(controller: *const FfiStatsController) -> String {
        let raw = stats_controller_state_label(controller);
        let text = unsafe { CStr::from_ptr(raw) }.to_str().unwrap().to_string();
        stats_free_string(raw);
        text
    }

    #[test]
    fn client_new_and_free() {
        let client = new_client("http://localhost:3000/graphql");
        assert!(!client.is_null());
        stats_client_free(client);
    }

    #[test]
    fn client_new_null_returns_null() {
        let username = CString::new("tester").unwrap();
        let client = stats_client_new(std::ptr::null(), username.as_ptr(), std::ptr::null(), 0);
        assert!(client.is_null());
    }

    #[test]
    fn null_handles_are_safe() {
        stats_client_free(std::ptr::null_mut());
        stats_controller_free(std::ptr::null_mut());
        stats_free_request(std::ptr::null_mut());
        stats_free_outcome(std::ptr::null_mut());
        stats_free_snapshot(std::ptr::null_mut());
        stats_free_string(std::ptr::null_mut());
        assert!(stats_build_request(std::ptr::null()).is_null());
        assert!(stats_controller_state(std::ptr::null()).is_null());
        assert_eq!(
            stats_controller_trigger_fetch(std::ptr::null_mut()),
            FfiStatus::NullArg
        );
        assert_eq!(
            stats_controller_available_action(std::ptr::null()),
            FfiUserAction::None
        );
    }

    #[test]
    fn build_request_is_post_with_headers_and_timeout() {
        let client = new_client("http://localhost:3000/graphql");
        let req = stats_build_request(client);
        assert!(!req.is_null());
        let req_ref = unsafe { &*req };
        assert_eq!(req_ref.method, FfiHttpMethod::Post);
        assert_eq!(req_ref.timeout_ms, 10_000);
        let url = unsafe { CStr::from_ptr(req_ref.url) }.to_str().unwrap();
        assert_eq!(url, "http://localhost:3000/graphql");
        assert_eq!(req_ref.headers_len, 2);
        assert_eq!(
            header(req_ref, 0),
            ("content-type".to_string(), "application/json".to_string())
        );
        assert_eq!(header(req_ref, 1).0, "user-agent");
        let body = unsafe { CStr::from_ptr(req_ref.body) }.to_str().unwrap();
        let body: serde_json::Value = serde_json::from_str(body).unwrap();
        assert!(body["query"]
            .as_str()
            .unwrap()
            .contains(r#"matchedUser(username: "tester")"#));
        stats_free_request(req);
        stats_client_free(client);
    }

    #[test]
    fn parse_success_exposes_counts_in_order() {
        let client = new_client("http://localhost:3000/graphql");
        let outcome = parse(client, 200, SCENARIO_A);
        let outcome_ref = unsafe { &*outcome };
        assert!(outcome_ref.success);
        assert_eq!(outcome_ref.counts_len, 3);
        let counts =
            unsafe { std::slice::from_raw_parts(outcome_ref.counts, outcome_ref.counts_len as usize) };
        let first = unsafe { CStr::from_ptr(counts[0].difficulty) }.to_str().unwrap();
        assert_eq!(first, "Easy");
        assert_eq!(counts[0].count, 120);
        assert_eq!(counts[2].count, 10);
        stats_free_outcome(outcome);
        stats_client_free(client);
    }

    #[test]
    fn parse_not_found_has_code_404() {
        let client = new_client("http://localhost:3000/graphql");
        let outcome = parse(client, 404, "");
        let outcome_ref = unsafe { &*outcome };
        assert!(!outcome_ref.success);
        assert_eq!(outcome_ref.code, 404);
        assert_eq!(outcome_ref.kind, FfiFailureKind::HttpStatus);
        assert!(outcome_ref.counts.is_null());
        stats_free_outcome(outcome);
        stats_client_free(client);
    }

    #[test]
    fn parse_malformed_body_is_decode_499() {
        let client = new_client("http://localhost:3000/graphql");
        let outcome = parse(client, 200, "{");
        let outcome_ref = unsafe { &*outcome };
        assert_eq!(outcome_ref.code, 499);
        assert_eq!(outcome_ref.kind, FfiFailureKind::Decode);
        stats_free_outcome(outcome);
        stats_client_free(client);
    }

    #[test]
    fn controller_follows_transition_table() {
        let client = new_client("http://localhost:3000/graphql");
        let controller = stats_controller_new();
        assert_eq!(label(controller), "idle");
        assert_eq!(
            stats_controller_available_action(controller),
            FfiUserAction::Fetch
        );

        assert_eq!(
            stats_controller_trigger_fetch(controller),
            FfiStatus::InvokeClient
        );
        assert_eq!(
            stats_controller_trigger_fetch(controller),
            FfiStatus::NotAllowed
        );
        assert_eq!(label(controller), "loading");

        let status = stats_controller_resolve(controller, stats_transport_failure());
        assert_eq!(status, FfiStatus::Ok);
        let snapshot = stats_controller_state(controller);
        let snapshot_ref = unsafe { &*snapshot };
        assert_eq!(snapshot_ref.tag, FfiViewStateTag::Error);
        assert_eq!(snapshot_ref.outcome.code, 499);
        assert_eq!(snapshot_ref.outcome.kind, FfiFailureKind::Transport);
        stats_free_snapshot(snapshot);

        assert_eq!(
            stats_controller_available_action(controller),
            FfiUserAction::Retry
        );
        assert_eq!(
            stats_controller_trigger_retry(controller),
            FfiStatus::InvokeClient
        );
        let status = stats_controller_resolve(controller, parse(client, 200, SCENARIO_A));
        assert_eq!(status, FfiStatus::Ok);
        let snapshot = stats_controller_state(controller);
        let snapshot_ref = unsafe { &*snapshot };
        assert_eq!(snapshot_ref.tag, FfiViewStateTag::Success);
        assert_eq!(snapshot_ref.outcome.counts_len, 3);
        stats_free_snapshot(snapshot);

        assert_eq!(
            stats_controller_trigger_retry(controller),
            FfiStatus::NotAllowed
        );
        assert_eq!(
            stats_controller_available_action(controller),
            FfiUserAction::None
        );
        stats_controller_free(controller);
        stats_client_free(client);
    }

    #[test]
    fn idle_and_loading_snapshots_carry_no_outcome() {
        let controller = stats_controller_new();
        for expected in [FfiViewStateTag::Idle, FfiViewStateTag::Loading] {
            let snapshot = stats_controller_state(controller);
            let snapshot_ref = unsafe { &*snapshot };
            assert_eq!(snapshot_ref.tag, expected);
            assert!(!snapshot_ref.outcome.success);
            assert_eq!(snapshot_ref.outcome.code, 0);
            assert_eq!(snapshot_ref.outcome.kind, FfiFailureKind::None);
            assert!(snapshot_ref.outcome.counts.is_null());
            stats_free_snapshot(snapshot);
            stats_controller_trigger_fetch(controller);
        }
        stats_controller_free(controller);
    }

    #[test]
    fn difficulty_with_nul_byte_is_stripped() {
        let client = new_client("http://localhost:3000/graphql");
        let body = r#"{"data":{"matchedUser":{"submitStats":{"acSubmissionNum":[{"difficulty":"Ea\u0000sy","count":3,"submissions":4}]}}}}"#;
        let outcome = parse(client, 200, body);
        let outcome_ref = unsafe { &*outcome };
        assert!(outcome_ref.success);
        assert_eq!(outcome_ref.counts_len, 1);
        let first = unsafe { &*outcome_ref.counts };
        let difficulty = unsafe { CStr::from_ptr(first.difficulty) }.to_str().unwrap();
        assert_eq!(difficulty, "Easy");
        assert_eq!(first.count, 3);
        stats_free_outcome(outcome);
        stats_client_free(client);
    }

    #[test]
    fn resolve_outside_loading_is_not_allowed() {
        let controller = stats_controller_new();
        let status = stats_controller_resolve(controller, stats_transport_failure());
        assert_eq!(status, FfiStatus::NotAllowed);
        assert_eq!(label(controller), "idle");
        stats_controller_free(controller);
    }

    /// Host loop over real HTTP: the test plays the watch app, executing the
    /// C request with ureq against the mock server.
    #[test]
    fn host_loop_against_mock_server() {
        let std_listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = std_listener.local_addr().unwrap();
        std_listener.set_nonblocking(true).unwrap();
        std::thread::spawn(move || {
            let rt = tokio::runtime::Builder::new_current_thread()
                .enable_all()
                .build()
                .unwrap();
            rt.block_on(async {
                let listener = tokio::net::TcpListener::from_std(std_listener).unwrap();
                mock_server::run(listener).await
            })
            .unwrap();
        });

        let endpoint = CString::new(format!("http://{addr}/graphql")).unwrap();
        let username = CString::new(mock_server::DEFAULT_USERNAME).unwrap();
        let client =
            stats_client_new(endpoint.as_ptr(), username.as_ptr(), std::ptr::null(), 0);
        let controller = stats_controller_new();
        assert_eq!(
            stats_controller_trigger_fetch(controller),
            FfiStatus::InvokeClient
        );

        let req = stats_build_request(client);
        let req_ref = unsafe { &*req };
        let url = unsafe { CStr::from_ptr(req_ref.url) }.to_str().unwrap();
        let body = unsafe { CStr::from_ptr(req_ref.body) }.to_str().unwrap();
        let agent: ureq::Agent = ureq::Agent::config_builder()
            .http_status_as_error(false)
            .build()
            .new_agent();
        let mut response = agent
            .post(url)
            .content_type("application/json")
            .send(body.as_bytes())
            .expect("HTTP transport error");
        let status = response.status().as_u16();
        let text = CString::new(response.body_mut().read_to_string().unwrap()).unwrap();
        stats_free_request(req);

        let reply = FfiHttpResponse {
            status,
            body: text.as_ptr(),
        };
        let outcome = stats_parse_response(client, &reply);
        assert_eq!(stats_controller_resolve(controller, outcome), FfiStatus::Ok);

        let snapshot = stats_controller_state(controller);
        let snapshot_ref = unsafe { &*snapshot };
        assert_eq!(snapshot_ref.tag, FfiViewStateTag::Success);
        assert_eq!(snapshot_ref.outcome.counts_len, 4);
        stats_free_snapshot(snapshot);
        stats_controller_free(controller);
        stats_client_free(client);
    }
}
