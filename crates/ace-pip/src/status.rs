// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Combined provider status.
//!
//! Each provider reports an 8-bit status. The PIP shifts it into its own
//! byte of a `u32` so callers can test one provider's bits without the
//! others getting in the way:
//!
//! ```text
//!  31        24 23        16 15         8 7          0
//! ┌────────────┬────────────┬────────────┬────────────┐
//! │ func param │ environ.   │ resource   │ subject    │
//! └────────────┴────────────┴────────────┴────────────┘
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{BitOr, BitOrAssign};

use ace_core::AttributeKind;
use tracing::warn;

pub const SHIFT_SUBJECT: u32 = 0;
pub const SHIFT_RESOURCE: u32 = 8;
pub const SHIFT_ENVIRONMENT: u32 = 16;
pub const SHIFT_FUNCTION_PARAM: u32 = 24;

const PROVIDER_MASK: u32 = 0xFF;

/// Bit offset of a provider's byte.
pub fn shift_for(kind: AttributeKind) -> u32 {
	match kind {
		AttributeKind::Subject => SHIFT_SUBJECT,
		AttributeKind::Resource => SHIFT_RESOURCE,
		AttributeKind::Environment => SHIFT_ENVIRONMENT,
		AttributeKind::FunctionParam => SHIFT_FUNCTION_PARAM,
	}
}

/// Status word returned by [`crate::PolicyInformationPoint::get_attributes_values`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PipStatus(pub u32);

impl PipStatus {
	pub const OK: PipStatus = PipStatus(0);

	/// Places a provider's raw status in its byte.
	///
	/// Bits above the low byte do not fit and are dropped with a warning.
	/// A status whose only set bits are dropped ones saturates the byte to
	/// `0xFF`, so a failing provider never reads as OK.
	pub fn from_provider(kind: AttributeKind, raw: u32) -> Self {
		let dropped = raw & !PROVIDER_MASK;
		let mut byte = raw & PROVIDER_MASK;
		if dropped != 0 {
			warn!(%kind, raw, "provider status does not fit in one byte");
			if byte == 0 {
				byte = PROVIDER_MASK;
			}
		}
		PipStatus(byte << shift_for(kind))
	}

	/// Extracts one provider's status byte.
	pub fn provider_bits(self, kind: AttributeKind) -> u8 {
		((self.0 >> shift_for(kind)) & PROVIDER_MASK) as u8
	}

	pub fn is_ok(self) -> bool {
		self.0 == 0
	}

	/// Providers that reported a non-zero status.
	pub fn failed_providers(self) -> impl Iterator<Item = AttributeKind> {
		AttributeKind::all()
			.iter()
			.copied()
			.filter(move |kind| self.provider_bits(*kind) != 0)
	}

	pub fn bits(self) -> u32 {
		self.0
	}
}

impl BitOr for PipStatus {
	type Output = PipStatus;

	fn bitor(self, rhs: PipStatus) -> PipStatus {
		PipStatus(self.0 | rhs.0)
	}
}

impl BitOrAssign for PipStatus {
	fn bitor_assign(&mut self, rhs: PipStatus) {
		self.0 |= rhs.0;
	}
}

impl fmt::Display for PipStatus {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{:#010x}", self.0)
	}
}
