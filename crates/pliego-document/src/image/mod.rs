// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Image module — fetch, decode, downscale and recompress catalog photos.

pub mod normalizer;

pub use normalizer::{ImageNormalizer, NormalizedImage};
