// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Policy model and decision engine.
//!
//! This crate provides:
//! - The policy tree: [`PolicySet`], [`Policy`] and [`Rule`] under one
//!   [`TreeNode`] sum type
//! - Tri-state attribute matching ([`AttributeMatch`], [`Subject`], [`Condition`])
//! - The combiner producing one [`Effect`] per request ([`evaluate`], [`fold`])
//! - [`extract_attributes`], listing what the attribute resolver must fill in
//!
//! # Usage
//!
//! ```ignore
//! use ace_core::{evaluate, extract_attributes};
//!
//! let mut attributes = extract_attributes(&root);
//! pip.get_attributes_values(&request, &mut attributes);
//! let effect = evaluate(&root, &attributes);
//! ```

pub mod attribute;
pub mod combiner;
pub mod condition;
pub mod effect;
pub mod error;
pub mod extract;
pub mod matching;
pub mod policy;
pub mod rule;
pub mod subject;
pub mod target;

pub use attribute::{Attribute, AttributeKey, AttributeKind, AttributeSet, MatchResult};
pub use combiner::{evaluate, fold, Combiner};
pub use condition::{CombineType, Condition};
pub use effect::Effect;
pub use error::{Result, TreeError};
pub use extract::extract_attributes;
pub use matching::{AttributeMatch, MatchFunction, Modifier};
pub use policy::{CombineAlgorithm, NodeKind, Policy, PolicyElement, PolicySet, TreeNode};
pub use rule::Rule;
pub use subject::Subject;
pub use target::TargetMatch;
