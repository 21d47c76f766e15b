// Copyright 2023-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

//! Hostname detection for the `hostname` field of log entries.

use std::env;
use tracing::debug;

/// Resolves the hostname attached to log entries.
///
/// Tries, in order:
/// 1. `CHECKLOGS_HOSTNAME`
/// 2. `HOSTNAME`
/// 3. The OS hostname
///
/// Returns `None` when all of them fail; the entry is then sent without a
/// hostname.
#[must_use]
pub fn get_hostname() -> Option<String> {
    for var in ["CHECKLOGS_HOSTNAME", "HOSTNAME"] {
        if let Ok(hostname) = env::var(var) {
            if !hostname.is_empty() {
                return Some(hostname);
            }
        }
    }
    system_hostname()
}

#[cfg(unix)]
fn system_hostname() -> Option<String> {
    match nix::unistd::gethostname() {
        Ok(hostname) => hostname.into_string().ok().filter(|h| !h.is_empty()),
        Err(e) => {
            debug!("Failed to get system hostname: {}", e);
            None
        }
    }
}

#[cfg(not(unix))]
fn system_hostname() -> Option<String> {
    env::var("COMPUTERNAME")
        .ok()
        .filter(|h| !h.is_empty())
        .or_else(|| {
            debug!("Could not determine hostname");
            None
        })
}
