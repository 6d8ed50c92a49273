//! FFI use-case API for Flutter-facing toast calls.
//!
//! # Responsibility
//! - Expose the process-wide toast center to Dart via FRB.
//! - Flatten core types into plain string/struct envelopes.
//!
//! # Invariants
//! - Exported functions must not panic across FFI boundary.
//! - Toast ids cross the boundary as hyphenated UUID strings.
//! - Unknown ids are no-ops; only malformed input reports `ok = false`.

use log::warn;
use toastline_core::global::{default_center, ensure_timer_pump};
use toastline_core::{
    core_version as core_version_inner, init_logging as init_logging_inner, ping as ping_inner,
    Toast, ToastId, ToastOptions, ToastPatch, ToastVariant,
};
use uuid::Uuid;

/// Minimal health-check API for FRB smoke integration.
///
/// # FFI contract
/// - Sync call, non-blocking.
/// - Never throws; always returns a UTF-8 string.
#[flutter_rust_bridge::frb(sync)]
pub fn ping() -> String {
    ping_inner().to_owned()
}

/// Expose core crate version through FFI.
#[flutter_rust_bridge::frb(sync)]
pub fn core_version() -> String {
    core_version_inner().to_owned()
}

/// Initializes Rust core logging once per process.
///
/// Input semantics:
/// - `level`: one of `trace|debug|info|warn|error` (case-insensitive).
/// - `log_dir`: absolute directory path where rolling logs are written.
///
/// # FFI contract
/// - Safe to call repeatedly with the same `level + log_dir`.
/// - Returns empty string on success and error message on failure.
#[flutter_rust_bridge::frb(sync)]
pub fn init_logging(level: String, log_dir: String) -> String {
    match init_logging_inner(level.as_str(), log_dir.as_str()) {
        Ok(()) => String::new(),
        Err(err) => err.to_string(),
    }
}

/// One toast as seen by the Dart renderer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToastItem {
    pub id: String,
    pub title: Option<String>,
    pub description: Option<String>,
    /// `default|success|destructive`.
    pub variant: String,
    pub action_label: Option<String>,
    pub open: bool,
    pub duration_ms: Option<u64>,
}

/// Snapshot envelope returned by `toast_snapshot`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToastSnapshotResponse {
    /// Newest first.
    pub items: Vec<ToastItem>,
    pub revision: u64,
}

/// Generic action envelope for toast commands.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToastActionResponse {
    pub ok: bool,
    pub toast_id: Option<String>,
    pub message: String,
}

impl ToastActionResponse {
    fn success(message: impl Into<String>, toast_id: Option<ToastId>) -> Self {
        Self {
            ok: true,
            toast_id: toast_id.map(|id| id.to_string()),
            message: message.into(),
        }
    }

    fn failure(message: impl Into<String>) -> Self {
        Self {
            ok: false,
            toast_id: None,
            message: message.into(),
        }
    }
}

/// Shows a toast on the process-wide center.
///
/// # FFI contract
/// - Starts the background timer pump on first use.
/// - Blank `title`/`description` are treated as absent.
/// - Returns the created toast id on success.
#[flutter_rust_bridge::frb(sync)]
pub fn toast_notify(
    title: Option<String>,
    description: Option<String>,
    variant: String,
    duration_ms: Option<u64>,
) -> ToastActionResponse {
    let variant = match parse_variant(&variant) {
        Ok(variant) => variant,
        Err(message) => return ToastActionResponse::failure(message),
    };
    if let Err(err) = ensure_timer_pump() {
        warn!("event=toast_notify module=ffi status=degraded reason=\"{err}\"");
    }

    let handle = default_center().notify(ToastOptions {
        title: non_blank(title),
        description: non_blank(description),
        variant,
        action: None,
        duration_ms,
    });
    ToastActionResponse::success("Toast shown.", Some(handle.id()))
}

/// Updates title/description/variant of an existing toast.
#[flutter_rust_bridge::frb(sync)]
pub fn toast_update(
    toast_id: String,
    title: Option<String>,
    description: Option<String>,
    variant: Option<String>,
) -> ToastActionResponse {
    let id = match parse_toast_id(&toast_id) {
        Ok(id) => id,
        Err(message) => return ToastActionResponse::failure(message),
    };
    let variant = match variant.as_deref().map(parse_variant).transpose() {
        Ok(variant) => variant,
        Err(message) => return ToastActionResponse::failure(message),
    };

    default_center().update(
        id,
        ToastPatch {
            title: non_blank(title),
            description: non_blank(description),
            variant,
            ..ToastPatch::default()
        },
    );
    ToastActionResponse::success("Toast updated.", Some(id))
}

/// Dismisses one toast, or every toast when `toast_id` is `None` or blank.
#[flutter_rust_bridge::frb(sync)]
pub fn toast_dismiss(toast_id: Option<String>) -> ToastActionResponse {
    let target = match non_blank(toast_id) {
        Some(raw) => match parse_toast_id(&raw) {
            Ok(id) => Some(id),
            Err(message) => return ToastActionResponse::failure(message),
        },
        None => None,
    };
    if let Err(err) = ensure_timer_pump() {
        warn!("event=toast_dismiss module=ffi status=degraded reason=\"{err}\"");
    }

    default_center().dismiss(target);
    let message = if target.is_some() {
        "Toast dismissed."
    } else {
        "All toasts dismissed."
    };
    ToastActionResponse::success(message, target)
}

/// Returns the current toast list for rendering.
#[flutter_rust_bridge::frb(sync)]
pub fn toast_snapshot() -> ToastSnapshotResponse {
    let state = default_center().snapshot();
    ToastSnapshotResponse {
        items: state.toasts.iter().map(to_toast_item).collect(),
        revision: state.revision,
    }
}

fn parse_toast_id(raw: &str) -> Result<ToastId, String> {
    Uuid::parse_str(raw.trim()).map_err(|err| format!("invalid toast id `{}`: {err}", raw.trim()))
}

fn parse_variant(raw: &str) -> Result<ToastVariant, String> {
    if raw.trim().is_empty() {
        return Ok(ToastVariant::Default);
    }
    raw.parse::<ToastVariant>().map_err(|err| err.to_string())
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|raw| raw.trim().to_string())
        .filter(|trimmed| !trimmed.is_empty())
}

fn to_toast_item(toast: &Toast) -> ToastItem {
    ToastItem {
        id: toast.id.to_string(),
        title: toast.title.clone(),
        description: toast.description.clone(),
        variant: toast.variant.as_str().to_string(),
        action_label: toast.action.as_ref().map(|action| action.label.clone()),
        open: toast.open,
        duration_ms: toast.duration_ms,
    }
}
