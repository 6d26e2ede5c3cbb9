// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Tracing subscriber setup.

use ace_config::{LogFormat, LoggingConfig};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter, Layer, Registry};

use crate::error::Result;

/// Installs the global tracing subscriber.
///
/// `RUST_LOG` takes precedence over the configured level. Fails if a global
/// subscriber is already set.
pub fn init_tracing(config: &LoggingConfig) -> Result<()> {
	let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.level));

	let fmt_layer: Box<dyn Layer<Registry> + Send + Sync> = match config.format {
		LogFormat::Pretty => fmt::layer().pretty().boxed(),
		LogFormat::Compact => fmt::layer().compact().boxed(),
		LogFormat::Json => fmt::layer().json().boxed(),
	};

	tracing_subscriber::registry()
		.with(fmt_layer)
		.with(filter)
		.try_init()?;
	Ok(())
}
