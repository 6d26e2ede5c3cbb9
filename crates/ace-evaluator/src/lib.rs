// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Policy evaluation for access requests.
//!
//! Ties the decision engine together: policy tree loading (through the
//! on-disk cache), attribute resolution, combining, and the merge of the
//! policy result with the user's preference.
//!
//! # Usage
//!
//! ```ignore
//! use ace_evaluator::{init_tracing, PolicyEvaluator};
//!
//! let config = ace_config::load_config()?;
//! init_tracing(&config.logging)?;
//! let evaluator = PolicyEvaluator::from_config(&config, "policy.xml", parse_policy, pip)?;
//! let result = evaluator.evaluate_request(&request);
//! ```

pub mod error;
pub mod evaluator;
pub mod logging;
pub mod result;

pub use ace_config::Preference;
pub use error::{EvaluatorError, Result};
pub use evaluator::{load_tree, Decision, PolicyEvaluator};
pub use logging::init_tracing;
pub use result::{effect_to_policy_result, most_restrictive, PolicyResult};
