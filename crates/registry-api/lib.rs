//! Client for the registry web API.
//!
//! Every operation the `hoist` CLI performs against a registry (search,
//! package metadata, owner management, publishing, archive downloads) goes
//! through the [`Registry`] handle defined here. The wire format is JSON over
//! HTTP; publishing uses a framed binary body (see [`Registry::publish`]).

use std::collections::BTreeMap;
use std::fs::File;
use std::io::prelude::*;
use std::io::{Cursor, SeekFrom};

use curl::easy::{Easy, List};
use percent_encoding::{percent_encode, NON_ALPHANUMERIC};
use serde::{Deserialize, Serialize};
use url::Url;

pub type Result<T> = std::result::Result<T, Error>;

pub struct Registry {
    /// The base URL for issuing API requests.
    host: String,
    /// Optional authorization token.
    /// If None, commands requiring authorization will fail.
    token: Option<String>,
    /// Curl handle for issuing requests.
    handle: Easy,
}

#[derive(PartialEq, Clone, Copy)]
pub enum Auth {
    Authorized,
    Unauthorized,
}

/// A search result entry.
#[derive(Deserialize)]
pub struct Package {
    pub name: String,
    pub description: Option<String>,
    pub max_version: String,
}

/// Full metadata for one package, as returned by `GET /packages/{name}`.
#[derive(Deserialize)]
pub struct PackageDetail {
    pub name: String,
    pub description: Option<String>,
    pub max_version: String,
    pub homepage: Option<String>,
    pub repository: Option<String>,
    pub documentation: Option<String>,
    pub license: Option<String>,
    #[serde(default)]
    pub keywords: Vec<String>,
}

#[derive(Deserialize)]
pub struct PackageVersion {
    pub num: String,
    #[serde(default)]
    pub yanked: bool,
    /// Sha256 of the version's archive, as lowercase hex.
    #[serde(default)]
    pub checksum: Option<String>,
}

pub struct PackageInfo {
    pub package: PackageDetail,
    pub versions: Vec<PackageVersion>,
}

#[derive(Serialize)]
pub struct NewPackage {
    pub name: String,
    pub vers: String,
    pub deps: Vec<NewPackageDependency>,
    pub features: BTreeMap<String, Vec<String>>,
    pub authors: Vec<String>,
    pub description: Option<String>,
    pub documentation: Option<String>,
    pub homepage: Option<String>,
    pub readme: Option<String>,
    pub keywords: Vec<String>,
    pub categories: Vec<String>,
    pub license: Option<String>,
    pub license_file: Option<String>,
    pub repository: Option<String>,
}

#[derive(Serialize)]
pub struct NewPackageDependency {
    pub optional: bool,
    pub default_features: bool,
    pub name: String,
    pub features: Vec<String>,
    pub version_req: String,
    pub target: Option<String>,
    pub kind: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub registry: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub explicit_name_in_toml: Option<String>,
}

#[derive(Deserialize)]
pub struct User {
    pub id: u32,
    pub login: String,
    pub email: Option<String>,
    pub name: Option<String>,
}

pub struct Warnings {
    pub invalid_categories: Vec<String>,
    pub other: Vec<String>,
}

#[derive(Deserialize)]
struct OwnerResponse {
    ok: bool,
    msg: String,
}
#[derive(Deserialize)]
struct ApiErrorList {
    errors: Vec<ApiError>,
}
#[derive(Deserialize)]
struct ApiError {
    detail: String,
}
#[derive(Serialize)]
struct OwnersReq<'a> {
    users: &'a [&'a str],
}
#[derive(Deserialize)]
struct Users {
    users: Vec<User>,
}
#[derive(Deserialize)]
struct TotalPackages {
    total: u32,
}
#[derive(Deserialize)]
struct Packages {
    packages: Vec<Package>,
    meta: TotalPackages,
}
#[derive(Deserialize)]
struct PackageInfoResponse {
    package: PackageDetail,
    versions: Vec<PackageVersion>,
}

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error(transparent)]
    Curl(#[from] curl::Error),

    #[error("the remote server responded with an error{}: {}", status(*.code), .errors.join(", "))]
    Api { code: u32, errors: Vec<String> },

    #[error("failed to get a 200 OK response, got {code}\nheaders:\n\t{}\nbody:\n{body}", .headers.join("\n\t"))]
    Code {
        code: u32,
        headers: Vec<String>,
        body: String,
    },

    #[error("no authorization token found, run `hoist login` first")]
    MissingToken,

    #[error("invalid response from server: {0}")]
    Json(#[from] serde_json::Error),

    #[error("{0}")]
    Io(#[from] std::io::Error),
}

fn status(code: u32) -> String {
    if code == 200 {
        String::new()
    } else {
        format!(" (status {} {})", code, reason(code))
    }
}

impl Registry {
    /// Creates a new `Registry`.
    ///
    /// The handle should already carry global configuration (user-agent,
    /// timeouts, proxies); this type only manages per-request state.
    pub fn new_handle(host: String, token: Option<String>, handle: Easy) -> Registry {
        Registry {
            host,
            token,
            handle,
        }
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    pub fn add_owners(&mut self, package: &str, owners: &[&str]) -> Result<String> {
        let body = serde_json::to_string(&OwnersReq { users: owners })?;
        let body = self.put(&format!("/packages/{}/owners", package), body.as_bytes())?;
        let resp = serde_json::from_str::<OwnerResponse>(&body)?;
        debug_assert!(resp.ok);
        Ok(resp.msg)
    }

    pub fn remove_owners(&mut self, package: &str, owners: &[&str]) -> Result<()> {
        let body = serde_json::to_string(&OwnersReq { users: owners })?;
        let body = self.delete(&format!("/packages/{}/owners", package), Some(body.as_bytes()))?;
        debug_assert!(serde_json::from_str::<OwnerResponse>(&body)?.ok);
        Ok(())
    }

    pub fn list_owners(&mut self, package: &str) -> Result<Vec<User>> {
        let body = self.get(&format!("/packages/{}/owners", package))?;
        Ok(serde_json::from_str::<Users>(&body)?.users)
    }

    /// Uploads a new version of a package.
    ///
    /// The body layout is:
    ///
    /// ```text
    /// <le u32 of json>
    /// <json request> (metadata for the package)
    /// <le u32 of tarball>
    /// <source tarball>
    /// ```
    pub fn publish(&mut self, pkg: &NewPackage, mut tarball: &File) -> Result<Warnings> {
        let json = serde_json::to_string(pkg)?;

        // Length via seeking rather than metadata; on some filesystems the
        // metadata lookup fails after the archive was renamed into place.
        let tarball_len = tarball.seek(SeekFrom::End(0))?;
        tarball.seek(SeekFrom::Start(0))?;
        let header = {
            let mut w = Vec::new();
            w.extend(&(json.len() as u32).to_le_bytes());
            w.extend(json.as_bytes().iter().cloned());
            w.extend(&(tarball_len as u32).to_le_bytes());
            w
        };
        let size = tarball_len as usize + header.len();
        let mut body = Cursor::new(header).chain(tarball);

        let url = format!("{}/api/v1/packages/new", self.host);

        let token = self.token.as_ref().ok_or(Error::MissingToken)?;
        self.handle.put(true)?;
        self.handle.url(&url)?;
        self.handle.in_filesize(size as u64)?;
        let mut headers = List::new();
        headers.append("Accept: application/json")?;
        headers.append(&format!("Authorization: {}", token))?;
        self.handle.http_headers(headers)?;

        let body = self.handle(&mut |buf| body.read(buf).unwrap_or(0))?;

        let response = if body.is_empty() {
            "{}".parse()?
        } else {
            body.parse::<serde_json::Value>()?
        };

        let warning_list = |key: &str| -> Vec<String> {
            response
                .get("warnings")
                .and_then(|j| j.get(key))
                .and_then(|j| j.as_array())
                .map(|x| x.iter().flat_map(|j| j.as_str()).map(Into::into).collect())
                .unwrap_or_default()
        };

        Ok(Warnings {
            invalid_categories: warning_list("invalid_categories"),
            other: warning_list("other"),
        })
    }

    pub fn search(&mut self, query: &str, limit: u32) -> Result<(Vec<Package>, u32)> {
        let formatted_query = percent_encode(query.as_bytes(), NON_ALPHANUMERIC);
        let body = self.req(
            &format!("/packages?q={}&per_page={}", formatted_query, limit),
            None,
            Auth::Unauthorized,
        )?;

        let packages = serde_json::from_str::<Packages>(&body)?;
        Ok((packages.packages, packages.meta.total))
    }

    pub fn package_info(&mut self, package: &str) -> Result<PackageInfo> {
        let body = self.req(
            &format!("/packages/{}", package),
            None,
            Auth::Unauthorized,
        )?;
        let resp = serde_json::from_str::<PackageInfoResponse>(&body)?;
        Ok(PackageInfo {
            package: resp.package,
            versions: resp.versions,
        })
    }

    /// Downloads a package archive into `dst`, following redirects to the
    /// storage backend.
    pub fn download(&mut self, package: &str, version: &str, dst: &mut dyn Write) -> Result<()> {
        self.handle.get(true)?;
        self.handle.follow_location(true)?;
        self.handle.url(&format!(
            "{}/api/v1/packages/{}/{}/download",
            self.host, package, version
        ))?;
        self.handle.http_headers(List::new())?;
        let mut written = std::io::Result::Ok(());
        {
            let mut handle = self.handle.transfer();
            handle.write_function(|data| {
                if written.is_ok() {
                    written = dst.write_all(data);
                }
                Ok(data.len())
            })?;
            handle.perform()?;
        }
        written?;
        let code = self.handle.response_code()?;
        if code != 0 && code != 200 {
            return Err(Error::Code {
                code,
                headers: Vec::new(),
                body: String::new(),
            });
        }
        Ok(())
    }

    fn put(&mut self, path: &str, b: &[u8]) -> Result<String> {
        self.handle.put(true)?;
        self.req(path, Some(b), Auth::Authorized)
    }

    fn get(&mut self, path: &str) -> Result<String> {
        self.handle.get(true)?;
        self.req(path, None, Auth::Authorized)
    }

    fn delete(&mut self, path: &str, b: Option<&[u8]>) -> Result<String> {
        self.handle.custom_request("DELETE")?;
        self.req(path, b, Auth::Authorized)
    }

    fn req(&mut self, path: &str, body: Option<&[u8]>, authorized: Auth) -> Result<String> {
        self.handle.url(&format!("{}/api/v1{}", self.host, path))?;
        let mut headers = List::new();
        headers.append("Accept: application/json")?;
        headers.append("Content-Type: application/json")?;

        if authorized == Auth::Authorized {
            let token = self.token.as_ref().ok_or(Error::MissingToken)?;
            headers.append(&format!("Authorization: {}", token))?;
        }
        self.handle.http_headers(headers)?;
        match body {
            Some(mut body) => {
                self.handle.upload(true)?;
                self.handle.in_filesize(body.len() as u64)?;
                self.handle(&mut |buf| body.read(buf).unwrap_or(0))
            }
            None => self.handle(&mut |_| 0),
        }
    }

    fn handle(&mut self, read: &mut dyn FnMut(&mut [u8]) -> usize) -> Result<String> {
        let mut headers = Vec::new();
        let mut body = Vec::new();
        {
            let mut handle = self.handle.transfer();
            handle.read_function(|buf| Ok(read(buf)))?;
            handle.write_function(|data| {
                body.extend_from_slice(data);
                Ok(data.len())
            })?;
            handle.header_function(|data| {
                // Headers contain trailing \r\n, trim them to make it easier
                // to work with.
                let s = String::from_utf8_lossy(data).trim().to_string();
                headers.push(s);
                true
            })?;
            handle.perform()?;
        }

        let body = String::from_utf8_lossy(&body).into_owned();
        let errors = serde_json::from_str::<ApiErrorList>(&body)
            .ok()
            .map(|s| s.errors.into_iter().map(|s| s.detail).collect::<Vec<_>>());

        match (self.handle.response_code()?, errors) {
            (0, None) | (200, None) => Ok(body),
            (code, Some(errors)) => Err(Error::Api { code, errors }),
            (code, None) => Err(Error::Code {
                code,
                headers,
                body,
            }),
        }
    }
}

fn reason(code: u32) -> &'static str {
    match code {
        100 => "Continue",
        200 => "OK",
        201 => "Created",
        204 => "No Content",
        301 => "Moved Permanently",
        302 => "Found",
        304 => "Not Modified",
        307 => "Temporary Redirect",
        308 => "Permanent Redirect",
        400 => "Bad Request",
        401 => "Unauthorized",
        403 => "Forbidden",
        404 => "Not Found",
        405 => "Method Not Allowed",
        408 => "Request Timeout",
        409 => "Conflict",
        410 => "Gone",
        429 => "Too Many Requests",
        500 => "Internal Server Error",
        502 => "Bad Gateway",
        503 => "Service Unavailable",
        504 => "Gateway Timeout",
        _ => "<unknown>",
    }
}

/// Returns `true` if the host of the given URL is the default hoist registry.
pub fn is_default_host(url: &str) -> bool {
    Url::parse(url)
        .map(|u| u.host_str() == Some("hoisthub.io"))
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn version_payload_carries_optional_checksum() {
        let versions: Vec<PackageVersion> = serde_json::from_str(
            r#"[
                {"num": "1.0.0", "yanked": false,
                 "checksum": "2cf24dba5fb0a30e26e83b2ac5b9e29e1b161e5c1fa7425e73043362938b9824"},
                {"num": "0.9.0", "yanked": true}
            ]"#,
        )
        .unwrap();
        assert_eq!(
            versions[0].checksum.as_deref(),
            Some("2cf24dba5fb0a30e26e83b2ac5b9e29e1b161e5c1fa7425e73043362938b9824")
        );
        assert_eq!(versions[1].checksum, None);
        assert!(versions[1].yanked);
    }
}
