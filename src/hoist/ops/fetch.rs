//! Downloads every locked registry package into the local cache.

use std::io::{Seek, SeekFrom};

use anyhow::{bail, Context as _};

use registry_api::Registry;

use crate::core::{LockedPackage, Workspace};
use crate::ops::lockfile::lockfile_required;
use crate::ops::registry::http_handle;
use crate::util::sha256::Sha256;
use crate::util::{paths, HoistResult};

/// Fetches all packages named in `Hoist.lock` into `$HOIST_HOME/cache`.
///
/// Already-cached archives whose checksum still matches are skipped, so a
/// second `hoist fetch` is a no-op and works offline.
pub fn fetch(ws: &Workspace<'_>) -> HoistResult<()> {
    let config = ws.config();
    let resolve = lockfile_required(ws)?;

    let cache = config.cache_dir();
    paths::create_dir_all(&cache)?;

    let mut to_download: Vec<(&LockedPackage, String)> = Vec::new();
    for package in resolve.iter() {
        let Some(source) = &package.source else {
            continue;
        };
        if !source.is_registry() {
            continue;
        }
        if is_cached(ws, package)? {
            continue;
        }
        let host = source.url().to_string().trim_end_matches('/').to_string();
        to_download.push((package, host));
    }

    if to_download.is_empty() {
        config
            .shell()
            .status("Fetched", "all packages are up to date")?;
        return Ok(());
    }
    if !config.network_allowed() {
        let flag = if config.frozen() { "--frozen" } else { "--offline" };
        bail!(
            "{} packages are missing from the cache, but {flag} was specified",
            to_download.len()
        );
    }

    // One client per registry host. Downloads are unauthenticated.
    let mut clients: Vec<(String, Registry)> = Vec::new();
    let mut fetched = 0;
    for (package, host) in to_download {
        if !clients.iter().any(|(h, _)| *h == host) {
            let client = Registry::new_handle(host.clone(), None, http_handle(config)?);
            clients.push((host.clone(), client));
        }
        let client = clients
            .iter_mut()
            .find(|(h, _)| *h == host)
            .map(|(_, c)| c)
            .expect("client was just inserted");

        config
            .shell()
            .status("Fetching", format!("{} v{}", package.name, package.version))?;
        download_one(ws, client, package)?;
        fetched += 1;
    }

    config
        .shell()
        .status("Fetched", format!("{fetched} packages"))?;
    Ok(())
}

/// The cache file for a locked package.
pub fn cache_path(ws: &Workspace<'_>, package: &LockedPackage) -> std::path::PathBuf {
    ws.config()
        .cache_dir()
        .join(format!("{}-{}.pkg", package.name, package.version))
}

/// Whether the package is cached with a matching checksum.
fn is_cached(ws: &Workspace<'_>, package: &LockedPackage) -> HoistResult<bool> {
    let path = cache_path(ws, package);
    if !path.exists() {
        return Ok(false);
    }
    let Some(expected) = &package.checksum else {
        return Ok(true);
    };
    let actual = Sha256::new().update_path(&path)?.finish_hex();
    Ok(actual == *expected)
}

fn download_one(
    ws: &Workspace<'_>,
    client: &mut Registry,
    package: &LockedPackage,
) -> HoistResult<()> {
    let dst = cache_path(ws, package);
    let dir = dst.parent().unwrap_or_else(|| std::path::Path::new("."));
    let mut tmp = tempfile::Builder::new()
        .prefix(".fetch")
        .tempfile_in(dir)
        .context("failed to create temporary download file")?;

    client
        .download(&package.name, &package.version.to_string(), tmp.as_file_mut())
        .with_context(|| {
            format!(
                "failed to download `{} v{}` from `{}`",
                package.name,
                package.version,
                client.host()
            )
        })?;

    if let Some(expected) = &package.checksum {
        tmp.as_file_mut().seek(SeekFrom::Start(0))?;
        let mut sha = Sha256::new();
        sha.update_file(tmp.as_file())
            .context("failed to hash downloaded archive")?;
        let actual = sha.finish_hex();
        if actual != *expected {
            bail!(
                "checksum for `{} v{}` changed between lock file and download\n\
                 expected: {expected}\n\
                 actual:   {actual}",
                package.name,
                package.version
            );
        }
    }

    tmp.persist(&dst)
        .with_context(|| format!("failed to move download into `{}`", dst.display()))?;
    Ok(())
}
