//! `#[repr(C)]` types for the FFI boundary.
//!
//! # Design
//! Each type mirrors a core type but uses C-compatible representations:
//! `*mut c_char` instead of `String`, raw pointers plus a length instead of
//! `Vec`, and enums with explicit discriminants. Conversion functions live
//! here to keep `lib.rs` focused on the `extern "C"` surface.

use std::ffi::{CStr, CString};
use std::os::raw::c_char;

use stats_core::{
    Failure, FailureKind, FetchOutcome, HttpMethod, SubmissionCount, UserAction, ViewState,
};

/// Opaque handle to a `StatsClient`.
pub struct FfiStatsClient {
    pub(crate) inner: stats_core::StatsClient,
}

/// Opaque handle to a `ViewController`. Must be used from one thread.
pub struct FfiStatsController {
    pub(crate) inner: stats_core::ViewController,
}

/// Interior NUL bytes cannot cross as a C string, so they are dropped.
pub(crate) fn c_string(s: String) -> *mut c_char {
    let c = CString::new(s).unwrap_or_else(|err| {
        let mut bytes = err.into_vec();
        bytes.retain(|&b| b != 0);
        CString::new(bytes).unwrap_or_default()
    });
    c.into_raw()
}

/// Hand a `Vec` to C as pointer + length. An empty vec becomes null.
fn into_raw_parts<T>(items: Vec<T>) -> (*mut T, u32) {
    if items.is_empty() {
        return (std::ptr::null_mut(), 0);
    }
    let mut items = items.into_boxed_slice();
    let len = items.len() as u32;
    let ptr = items.as_mut_ptr();
    std::mem::forget(items);
    (ptr, len)
}

/// Reclaim a pointer + length produced by `into_raw_parts`.
///
/// # Safety
/// `ptr`/`len` must come from `into_raw_parts` and not have been freed.
unsafe fn from_raw_parts<T>(ptr: *mut T, len: u32) -> Vec<T> {
    if ptr.is_null() || len == 0 {
        return Vec::new();
    }
    let slice = std::ptr::slice_from_raw_parts_mut(ptr, len as usize);
    Box::from_raw(slice).into_vec()
}

// ---------------------------------------------------------------------------
// Request types
// ---------------------------------------------------------------------------

/// HTTP method as a C enum.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FfiHttpMethod {
    Post = 0,
}

impl From<HttpMethod> for FfiHttpMethod {
    fn from(m: HttpMethod) -> Self {
        match m {
            HttpMethod::Post => FfiHttpMethod::Post,
        }
    }
}

/// A single HTTP header as a key-value pair of C strings.
#[repr(C)]
pub struct FfiHeader {
    pub key: *mut c_char,
    pub value: *mut c_char,
}

/// An HTTP request described as C-compatible plain data.
///
/// The host executes it, enforcing `timeout_ms`, and passes the response
/// to `stats_parse_response` or calls `stats_transport_failure`.
#[repr(C)]
pub struct FfiHttpRequest {
    pub method: FfiHttpMethod,
    pub url: *mut c_char,
    pub headers: *mut FfiHeader,
    pub headers_len: u32,
    pub body: *mut c_char,
    pub timeout_ms: u64,
}

impl FfiHttpRequest {
    pub(crate) fn from_core(req: stats_core::HttpRequest) -> *mut Self {
        let headers: Vec<FfiHeader> = req
            .headers
            .into_iter()
            .map(|(k, v)| FfiHeader {
                key: c_string(k),
                value: c_string(v),
            })
            .collect();
        let (headers, headers_len) = into_raw_parts(headers);

        Box::into_raw(Box::new(FfiHttpRequest {
            method: req.method.into(),
            url: c_string(req.url),
            headers,
            headers_len,
            body: req.body.map(c_string).unwrap_or(std::ptr::null_mut()),
            timeout_ms: req.timeout_ms,
        }))
    }

    /// # Safety
    /// `ptr` must come from `from_core` and not have been freed.
    pub(crate) unsafe fn free(ptr: *mut Self) {
        let req = Box::from_raw(ptr);
        free_c_string(req.url);
        free_c_string(req.body);
        for header in from_raw_parts(req.headers, req.headers_len) {
            free_c_string(header.key);
            free_c_string(header.value);
        }
    }
}

// ---------------------------------------------------------------------------
// Response input (caller-provided, not heap-allocated by us)
// ---------------------------------------------------------------------------

/// An HTTP response described as C-compatible plain data.
///
/// The C caller constructs this on the stack after executing a request. The
/// FFI layer reads but does not free these fields.
#[repr(C)]
pub struct FfiHttpResponse {
    pub status: u16,
    pub body: *const c_char,
}

impl FfiHttpResponse {
    pub(crate) fn to_core(&self) -> stats_core::HttpResponse {
        let body = if self.body.is_null() {
            String::new()
        } else {
            unsafe { CStr::from_ptr(self.body) }
                .to_string_lossy()
                .into_owned()
        };
        stats_core::HttpResponse {
            status: self.status,
            headers: Vec::new(),
            body,
        }
    }
}

// ---------------------------------------------------------------------------
// Outcome types
// ---------------------------------------------------------------------------

#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FfiFailureKind {
    None = 0,
    HttpStatus = 1,
    Transport = 2,
    Decode = 3,
}

impl From<FailureKind> for FfiFailureKind {
    fn from(kind: FailureKind) -> Self {
        match kind {
            FailureKind::HttpStatus => FfiFailureKind::HttpStatus,
            FailureKind::Transport => FfiFailureKind::Transport,
            FailureKind::Decode => FfiFailureKind::Decode,
        }
    }
}

/// One difficulty bucket exposed to C.
#[repr(C)]
pub struct FfiSubmissionCount {
    pub difficulty: *mut c_char,
    pub count: u64,
}

/// A fetch outcome exposed to C.
///
/// On success `success` is true, `code` is 0 and `counts` holds
/// `counts_len` buckets in server order. On failure `code` is the status
/// to display and `counts` is null.
#[repr(C)]
pub struct FfiFetchOutcome {
    pub success: bool,
    pub code: u16,
    pub kind: FfiFailureKind,
    pub counts: *mut FfiSubmissionCount,
    pub counts_len: u32,
}

impl FfiFetchOutcome {
    pub(crate) fn from_core(outcome: FetchOutcome) -> *mut Self {
        Box::into_raw(Box::new(Self::build(outcome)))
    }

    /// Placeholder for states with no outcome: not a success, code 0.
    fn empty() -> Self {
        FfiFetchOutcome {
            success: false,
            code: 0,
            kind: FfiFailureKind::None,
            counts: std::ptr::null_mut(),
            counts_len: 0,
        }
    }

    fn build(outcome: FetchOutcome) -> Self {
        match outcome {
            FetchOutcome::Success(counts) => {
                let counts: Vec<FfiSubmissionCount> = counts
                    .into_iter()
                    .map(|c| FfiSubmissionCount {
                        difficulty: c_string(c.difficulty),
                        count: c.count,
                    })
                    .collect();
                let (counts, counts_len) = into_raw_parts(counts);
                FfiFetchOutcome {
                    success: true,
                    code: 0,
                    kind: FfiFailureKind::None,
                    counts,
                    counts_len,
                }
            }
            FetchOutcome::Failure(failure) => FfiFetchOutcome {
                success: false,
                code: failure.code,
                kind: failure.kind.into(),
                counts: std::ptr::null_mut(),
                counts_len: 0,
            },
        }
    }

    /// Take ownership of a heap outcome and turn it back into a core value.
    ///
    /// # Safety
    /// `ptr` must come from `from_core` and not have been freed.
    pub(crate) unsafe fn into_core(ptr: *mut Self) -> FetchOutcome {
        let outcome = Box::from_raw(ptr);
        let counts = from_raw_parts(outcome.counts, outcome.counts_len);
        if !outcome.success {
            for c in counts {
                free_c_string(c.difficulty);
            }
            let kind = match outcome.kind {
                FfiFailureKind::HttpStatus => FailureKind::HttpStatus,
                FfiFailureKind::Decode => FailureKind::Decode,
                FfiFailureKind::Transport | FfiFailureKind::None => FailureKind::Transport,
            };
            return FetchOutcome::Failure(Failure {
                code: outcome.code,
                kind,
            });
        }
        let counts = counts
            .into_iter()
            .map(|c| SubmissionCount {
                difficulty: take_c_string(c.difficulty),
                count: c.count,
            })
            .collect();
        FetchOutcome::Success(counts)
    }

    /// # Safety
    /// `ptr` must come from `from_core` and not have been freed.
    pub(crate) unsafe fn free(ptr: *mut Self) {
        let outcome = Box::from_raw(ptr);
        outcome.free_fields();
    }

    unsafe fn free_fields(&self) {
        for c in from_raw_parts(self.counts, self.counts_len) {
            free_c_string(c.difficulty);
        }
    }
}

// ---------------------------------------------------------------------------
// Controller types
// ---------------------------------------------------------------------------

/// Status returned by controller calls.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FfiStatus {
    /// Transition applied, nothing further to do.
    Ok = 0,
    /// Transition applied; the host must now start one fetch.
    InvokeClient = 1,
    /// The event is not defined for the current state; nothing changed.
    NotAllowed = 2,
    NullArg = 3,
    Panic = 4,
}

impl From<Result<stats_core::Effect, stats_core::TransitionError>> for FfiStatus {
    fn from(result: Result<stats_core::Effect, stats_core::TransitionError>) -> Self {
        match result {
            Ok(stats_core::Effect::InvokeClient) => FfiStatus::InvokeClient,
            Ok(stats_core::Effect::None) => FfiStatus::Ok,
            Err(_) => FfiStatus::NotAllowed,
        }
    }
}

#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FfiUserAction {
    None = 0,
    Fetch = 1,
    Retry = 2,
}

impl From<Option<UserAction>> for FfiUserAction {
    fn from(action: Option<UserAction>) -> Self {
        match action {
            None => FfiUserAction::None,
            Some(UserAction::Fetch) => FfiUserAction::Fetch,
            Some(UserAction::Retry) => FfiUserAction::Retry,
        }
    }
}

#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FfiViewStateTag {
    Idle = 0,
    Loading = 1,
    Success = 2,
    Error = 3,
}

/// Copy of the controller's state at the time of the call.
///
/// `outcome` is embedded. For `Idle` and `Loading` it is empty: `success`
/// is false, `code` is 0 and `kind` is `None`.
#[repr(C)]
pub struct FfiViewSnapshot {
    pub tag: FfiViewStateTag,
    pub outcome: FfiFetchOutcome,
}

impl FfiViewSnapshot {
    pub(crate) fn from_core(state: &ViewState) -> *mut Self {
        let (tag, outcome) = match state {
            ViewState::Idle => (FfiViewStateTag::Idle, FfiFetchOutcome::empty()),
            ViewState::Loading => (FfiViewStateTag::Loading, FfiFetchOutcome::empty()),
            ViewState::Resolved(outcome @ FetchOutcome::Success(_)) => (
                FfiViewStateTag::Success,
                FfiFetchOutcome::build(outcome.clone()),
            ),
            ViewState::Resolved(outcome @ FetchOutcome::Failure(_)) => (
                FfiViewStateTag::Error,
                FfiFetchOutcome::build(outcome.clone()),
            ),
        };
        Box::into_raw(Box::new(FfiViewSnapshot { tag, outcome }))
    }

    /// # Safety
    /// `ptr` must come from `from_core` and not have been freed.
    pub(crate) unsafe fn free(ptr: *mut Self) {
        let snapshot = Box::from_raw(ptr);
        snapshot.outcome.free_fields();
    }
}

// ---------------------------------------------------------------------------
// Strings
// ---------------------------------------------------------------------------

/// # Safety
/// `s` must be null or come from `CString::into_raw`.
pub(crate) unsafe fn free_c_string(s: *mut c_char) {
    if !s.is_null() {
        drop(CString::from_raw(s));
    }
}

/// # Safety
/// `s` must be null or come from `CString::into_raw`.
unsafe fn take_c_string(s: *mut c_char) -> String {
    if s.is_null() {
        return String::new();
    }
    CString::from_raw(s).to_string_lossy().into_owned()
}
