// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Unified error types for Pliego.

use thiserror::Error;

/// Top-level error type for all Pliego operations.
#[derive(Debug, Error)]
pub enum PliegoError {
    // -- Numeric input --
    /// Non-finite or out-of-domain value handed to formatting or words
    /// conversion. Fatal to the current report.
    #[error("invalid amount: {0}")]
    InvalidAmount(String),

    // -- Assets --
    /// Image fetch or decode failure. Recovered locally by omitting the image.
    #[error("asset unavailable: {0}")]
    MissingAsset(String),

    // -- Request / dataset --
    #[error("{0}")]
    EmptyDataset(String),

    #[error("{0}")]
    MissingResource(String),

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    InvalidRequest(String),

    // -- Rendering --
    /// A layout or pagination invariant was violated.
    #[error("render failure: {0}")]
    RenderFailure(String),

    #[error("PDF operation failed: {0}")]
    PdfError(String),

    // -- Collaborators --
    #[error("data source error: {0}")]
    Source(String),

    #[error("file I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Alias used throughout the codebase.
pub type Result<T> = std::result::Result<T, PliegoError>;
