// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Configuration sections.

pub mod cache;
pub mod evaluator;
pub mod logging;

pub use cache::{CacheConfig, CacheConfigLayer};
pub use evaluator::{EvaluatorConfig, EvaluatorConfigLayer, Preference};
pub use logging::{LogFormat, LoggingConfig, LoggingConfigLayer};
