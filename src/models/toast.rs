// src/models/toast.rs

use chrono::{DateTime, Utc};
use serde::Serialize;

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ToastKind {
    Success,
    Error,
    Warning,
    Info,
    Loading,
}

// Notificação transitória, nunca persistida
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Toast {
    pub id: String,
    pub kind: ToastKind,
    pub title: String,
    pub message: Option<String>,
    // None = fica até ser removido
    pub duration_ms: Option<u64>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy)]
pub struct ToastConfig {
    pub max_toasts: usize,
    pub default_duration_ms: u64,
}

impl Default for ToastConfig {
    fn default() -> Self {
        Self {
            max_toasts: 5,
            default_duration_ms: 5000,
        }
    }
}

/// Títulos usados por `ToastStore::promise` em cada fase.
#[derive(Debug, Clone)]
pub struct PromiseMessages {
    pub loading: String,
    pub success: String,
    pub error: String,
}
