//! Toast domain model.
//!
//! # Responsibility
//! - Define the notification record tracked by the store.
//! - Define creation options and partial-update patches.
//!
//! # Invariants
//! - `id` is generated at creation and never reused for another toast.
//! - `open` starts as `true`; patches cannot reopen a dismissed toast.
//! - `title`/`description`/`action` are opaque payloads for renderers.

use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::str::FromStr;
use uuid::Uuid;

/// Stable identifier for one toast.
pub type ToastId = Uuid;

/// Presentation intent for a toast. Carries no behavior in the store.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ToastVariant {
    #[default]
    Default,
    Success,
    Destructive,
}

impl ToastVariant {
    /// Stable string id used across the bridge and in config.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Default => "default",
            Self::Success => "success",
            Self::Destructive => "destructive",
        }
    }
}

impl Display for ToastVariant {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ToastVariant {
    type Err = ToastVariantError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "default" => Ok(Self::Default),
            "success" => Ok(Self::Success),
            "destructive" => Ok(Self::Destructive),
            "" => Err(ToastVariantError::Empty),
            other => Err(ToastVariantError::Unsupported(other.to_string())),
        }
    }
}

/// Variant parse errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ToastVariantError {
    Empty,
    Unsupported(String),
}

impl Display for ToastVariantError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Empty => write!(f, "toast variant must not be empty"),
            Self::Unsupported(value) => write!(
                f,
                "toast variant is unsupported: {value} (expected default|success|destructive)"
            ),
        }
    }
}

impl Error for ToastVariantError {}

/// Call-to-action attached to a toast, rendered next to the message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToastAction {
    pub label: String,
    /// Accessible description of what the action does.
    pub alt_text: String,
}

/// One active notification record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Toast {
    pub id: ToastId,
    pub title: Option<String>,
    pub description: Option<String>,
    pub variant: ToastVariant,
    pub action: Option<ToastAction>,
    /// `true` until dismissal begins.
    pub open: bool,
    /// Auto-dismiss hint in milliseconds. Only acted on by the store when
    /// auto-dismiss is enabled in config.
    pub duration_ms: Option<u64>,
}

impl Toast {
    /// Builds an open toast with a fresh id.
    pub fn new(options: ToastOptions) -> Self {
        Self::with_id(Uuid::new_v4(), options)
    }

    /// Builds an open toast with a caller-provided id.
    pub fn with_id(id: ToastId, options: ToastOptions) -> Self {
        Self {
            id,
            title: options.title,
            description: options.description,
            variant: options.variant,
            action: options.action,
            open: true,
            duration_ms: options.duration_ms,
        }
    }

    /// Merges patch fields into this toast. `id` and `open` are untouched.
    pub fn apply_patch(&mut self, patch: &ToastPatch) {
        if let Some(title) = &patch.title {
            self.title = Some(title.clone());
        }
        if let Some(description) = &patch.description {
            self.description = Some(description.clone());
        }
        if let Some(variant) = patch.variant {
            self.variant = variant;
        }
        if let Some(action) = &patch.action {
            self.action = Some(action.clone());
        }
        if let Some(duration_ms) = patch.duration_ms {
            self.duration_ms = Some(duration_ms);
        }
    }
}

/// Caller input for creating a toast.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ToastOptions {
    pub title: Option<String>,
    pub description: Option<String>,
    pub variant: ToastVariant,
    pub action: Option<ToastAction>,
    pub duration_ms: Option<u64>,
}

impl ToastOptions {
    pub fn titled(title: impl Into<String>) -> Self {
        Self {
            title: Some(title.into()),
            ..Self::default()
        }
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn variant(mut self, variant: ToastVariant) -> Self {
        self.variant = variant;
        self
    }

    pub fn action(mut self, label: impl Into<String>, alt_text: impl Into<String>) -> Self {
        self.action = Some(ToastAction {
            label: label.into(),
            alt_text: alt_text.into(),
        });
        self
    }

    pub fn duration_ms(mut self, duration_ms: u64) -> Self {
        self.duration_ms = Some(duration_ms);
        self
    }
}

/// Partial update for an existing toast.
///
/// There is deliberately no `open` field: a dismissed toast stays dismissed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ToastPatch {
    pub title: Option<String>,
    pub description: Option<String>,
    pub variant: Option<ToastVariant>,
    pub action: Option<ToastAction>,
    pub duration_ms: Option<u64>,
}

impl ToastPatch {
    pub fn is_empty(&self) -> bool {
        self == &Self::default()
    }
}
