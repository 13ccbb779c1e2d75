use colored::Colorize;
use reqwest::blocking::{Client, RequestBuilder, Response};
use reqwest::header::{ACCEPT, AUTHORIZATION, HeaderValue, USER_AGENT};
use reqwest::Method;
use std::sync::{Arc, OnceLock};
use tracing::debug;
use url::Url;

use crate::builders::io::IoStreams;
use crate::core::config::Config;
use crate::core::error::{Error, Result};
use crate::core::instance;

const PREVIEW_ACCEPT: &str = "application/vnd.github.merge-info-preview+json";
const ENTERPRISE_PREVIEWS: &str =
    "application/vnd.github.antiope-preview, application/vnd.github.shadow-cat-preview";

/// Builds authenticated HTTP clients.
pub struct ClientFactory;

impl ClientFactory {
    /// Wires a client to a configuration snapshot. Never fails: the
    /// underlying transport is created on the first request.
    ///
    /// `set_accept` adds the preview media types to every request.
    pub fn build(io: &IoStreams, config: Config, app_version: &str, set_accept: bool) -> HttpClient {
        HttpClient {
            config,
            user_agent: format!("GitHub CLI {app_version}"),
            set_accept,
            color: io.color_enabled(),
            transport: OnceLock::new(),
        }
    }
}

/// An HTTP client that authenticates each request with the token configured
/// for the request's host.
#[derive(Debug)]
pub struct HttpClient {
    config: Config,
    user_agent: String,
    set_accept: bool,
    color: bool,
    transport: OnceLock<std::result::Result<Client, Arc<reqwest::Error>>>,
}

impl HttpClient {
    pub fn user_agent(&self) -> &str {
        &self.user_agent
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Starts a request with the identifying and authentication headers set.
    pub fn request(&self, method: Method, url: Url) -> Result<RequestBuilder> {
        let host = url.host_str().unwrap_or_default().to_string();
        let mut request = self
            .transport()?
            .request(method, url)
            .header(USER_AGENT, &self.user_agent);

        if let Some((token, source)) = self.config.auth_token(&host) {
            debug!(%host, ?source, "authenticating request");
            let mut value = HeaderValue::from_str(&format!("token {token}"))
                .map_err(|_| Error::InvalidToken { host: host.clone() })?;
            value.set_sensitive(true);
            request = request.header(AUTHORIZATION, value);
        }

        if self.set_accept {
            request = request.header(ACCEPT, accept_for(&host));
        }
        Ok(request)
    }

    /// Starts a request against the REST API of `host`.
    pub fn rest(&self, method: Method, host: &str, path: &str) -> Result<RequestBuilder> {
        let base = instance::rest_prefix(host);
        let url = Url::parse(&base)
            .and_then(|base| base.join(path.trim_start_matches('/')))
            .map_err(Error::InvalidUrl)?;
        self.request(method, url)
    }

    /// Sends a request built by [`HttpClient::request`], logging the
    /// response at debug level.
    pub fn send(&self, request: RequestBuilder) -> std::result::Result<Response, reqwest::Error> {
        let response = request.send()?;
        debug!(
            url = %response.url(),
            status = %self.paint_status(response.status()),
            "* response"
        );
        Ok(response)
    }

    fn paint_status(&self, status: reqwest::StatusCode) -> String {
        let text = status.to_string();
        if !self.color {
            return text;
        }
        if status.is_success() {
            text.green().to_string()
        } else {
            text.red().to_string()
        }
    }

    fn transport(&self) -> Result<&Client> {
        self.transport
            .get_or_init(|| Client::builder().build().map_err(Arc::new))
            .as_ref()
            .map_err(|err| Error::HttpClient(Arc::clone(err)))
    }
}

fn accept_for(host: &str) -> String {
    if instance::is_enterprise(host) {
        format!("{PREVIEW_ACCEPT}, {ENTERPRISE_PREVIEWS}")
    } else {
        PREVIEW_ACCEPT.to_string()
    }
}
