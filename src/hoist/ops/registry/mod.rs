//! Operations that talk to a remote registry.

use anyhow::{bail, Context as _};
use curl::easy::Easy;
use url::Url;

use registry_api::Registry;

use crate::core::SourceId;
use crate::util::auth::{self, Secret};
use crate::util::{Config, HoistResult};

mod info;
mod login;
mod logout;
mod owners;
mod publish;
mod search;

pub use self::info::info;
pub use self::login::registry_login;
pub use self::logout::registry_logout;
pub use self::owners::{modify_owners, OwnersOptions};
pub use self::publish::{publish, PublishOpts};
pub use self::search::search;

/// Registry selected on the command line, either by configured name
/// (`--registry`) or by API URL (`--index`).
#[derive(Debug, Clone)]
pub enum RegistryOrIndex {
    Registry(String),
    Index(Url),
}

impl RegistryOrIndex {
    /// The configured registry name, if selected by name.
    pub fn name(&self) -> Option<&str> {
        match self {
            RegistryOrIndex::Registry(name) => Some(name),
            RegistryOrIndex::Index(_) => None,
        }
    }
}

/// The API host for the selected registry.
pub(crate) fn api_host(
    config: &Config,
    reg_or_index: Option<&RegistryOrIndex>,
) -> HoistResult<Url> {
    match reg_or_index {
        Some(RegistryOrIndex::Index(url)) => Ok(url.clone()),
        Some(RegistryOrIndex::Registry(name)) => config.registry_api(Some(name)),
        None => config.registry_api(None),
    }
}

/// The source ID for the selected registry.
pub(crate) fn registry_source_id(
    config: &Config,
    reg_or_index: Option<&RegistryOrIndex>,
) -> HoistResult<SourceId> {
    Ok(SourceId::for_registry(&api_host(config, reg_or_index)?))
}

/// Creates an API client for the selected registry.
///
/// `token` is a token passed on the command line, taking precedence over
/// anything in `credentials.toml`. When `token_required` is set and no token
/// can be found, this errors before any request is made.
pub(crate) fn registry(
    config: &Config,
    token: Option<Secret<String>>,
    reg_or_index: Option<&RegistryOrIndex>,
    token_required: bool,
) -> HoistResult<Registry> {
    let host = api_host(config, reg_or_index)?;
    let registry_name = reg_or_index.and_then(|r| r.name());

    let token = match token {
        Some(token) => Some(token),
        None => auth::registry_token(config, registry_name)?,
    };
    if token_required && token.is_none() {
        // Produce the actionable "run `hoist login`" message.
        auth::registry_token_required(config, registry_name)?;
    }

    let handle = http_handle(config)?;
    Ok(Registry::new_handle(
        host.to_string().trim_end_matches('/').to_string(),
        token.map(Secret::expose),
        handle,
    ))
}

/// Creates a new HTTP handle with the `[http]` configuration applied.
pub(crate) fn http_handle(config: &Config) -> HoistResult<Easy> {
    if config.frozen() {
        bail!(
            "attempting to make an HTTP request, but --frozen was \
             specified"
        )
    }
    if config.offline() {
        bail!(
            "attempting to make an HTTP request, but --offline was \
             specified"
        )
    }

    let http = config.http_config()?;
    let mut handle = Easy::new();
    let timeout = http_timeout(config)?;
    handle.connect_timeout(timeout)?;
    handle.low_speed_time(timeout)?;
    handle.low_speed_limit(http.low_speed_limit.unwrap_or(10))?;
    handle.useragent(&format!(
        "{} ({})",
        crate::version(),
        http.user_agent.as_deref().unwrap_or("hoist-pm")
    ))?;
    if let Some(proxy) = &http.proxy {
        handle.proxy(proxy)?;
    }
    Ok(handle)
}

fn http_timeout(config: &Config) -> HoistResult<std::time::Duration> {
    let seconds = match config.get_env("HTTP_TIMEOUT") {
        Some(raw) => raw
            .parse::<u64>()
            .with_context(|| format!("invalid HTTP_TIMEOUT value `{raw}`"))?,
        None => config.http_config()?.timeout.unwrap_or(30),
    };
    Ok(std::time::Duration::from_secs(seconds))
}
