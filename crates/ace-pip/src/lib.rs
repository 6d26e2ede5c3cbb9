// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Policy Information Point.
//!
//! Resolves the attributes a policy tree needs from four providers (subject,
//! resource, environment and the request's function parameters) and reports
//! provider failures as bits of a [`PipStatus`].

pub mod pip;
pub mod provider;
pub mod request;
pub mod status;

pub use pip::PolicyInformationPoint;
pub use provider::{AttributeProvider, AttributeQuery, FunctionParams, StaticProvider};
pub use request::{ExecutionPhase, Handle, Request};
pub use status::PipStatus;
