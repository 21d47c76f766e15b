// Copyright 2023-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

//! Construction of the pooled `reqwest` client used by
//! [`ReqwestTransport`](crate::transport::ReqwestTransport).
//!
//! TLS is rustls. Connections are kept alive between sends since a logger
//! usually ships many small entries to the same host. An HTTPS proxy is
//! honoured when configured; a proxy that cannot be parsed is reported and
//! the client falls back to a direct connection rather than failing.

use core::time::Duration;
use std::error::Error;

use tracing::error;

use crate::config::ClientConfig;
use crate::constants::USER_AGENT;

#[must_use]
pub fn get_client(config: &ClientConfig) -> reqwest::Client {
    match build_client(config, true) {
        Ok(client) => client,
        Err(e) => {
            error!(
                "Unable to parse proxy configuration: {}, falling back to direct connection",
                e
            );
            match build_client(config, false) {
                Ok(client) => client,
                Err(inner) => {
                    error!(
                        "Failed to build HTTP client without proxy: {}, using reqwest defaults",
                        inner
                    );
                    reqwest::Client::new()
                }
            }
        }
    }
}

fn build_client(
    config: &ClientConfig,
    allow_proxy: bool,
) -> Result<reqwest::Client, Box<dyn Error>> {
    let mut client = reqwest::Client::builder()
        .use_rustls_tls()
        .user_agent(USER_AGENT)
        .timeout(config.timeout)
        .pool_idle_timeout(Some(Duration::from_secs(90)))
        .tcp_keepalive(Some(Duration::from_secs(60)));

    if allow_proxy {
        if let Some(https_uri) = &config.https_proxy {
            client = client.proxy(reqwest::Proxy::https(https_uri.clone())?);
        }
    }

    Ok(client.build()?)
}
