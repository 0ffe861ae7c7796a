use std::fs::File;
use std::io::Write;
use std::path::Path;
use std::time::Duration;

use hudpack_core::{Error, NetworkConfig, Result};
use reqwest::blocking::Client;

const USER_AGENT: &str = concat!("hudpack/", env!("CARGO_PKG_VERSION"));

/// Moves remote resources onto disk. Implementations must open the source
/// before touching the destination, so a failed request never truncates an
/// existing file.
pub trait Fetcher {
    /// Streams `url` into `destination`, creating or truncating it. Returns the
    /// number of bytes written.
    fn fetch_to_file(&self, url: &str, destination: &Path) -> Result<u64>;

    /// Reads a small text resource, such as a published version file.
    fn read_text(&self, url: &str) -> Result<String>;
}

impl<F: Fetcher + ?Sized> Fetcher for &F {
    fn fetch_to_file(&self, url: &str, destination: &Path) -> Result<u64> {
        (**self).fetch_to_file(url, destination)
    }

    fn read_text(&self, url: &str) -> Result<String> {
        (**self).read_text(url)
    }
}

/// Blocking HTTP fetcher. Version reads are always bounded by a timeout;
/// downloads are bounded only when configured.
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: Client,
    version_timeout: Duration,
    download_timeout: Option<Duration>,
}

impl HttpFetcher {
    pub fn new(network: &NetworkConfig) -> Result<Self> {
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .connect_timeout(network.connect_timeout())
            .timeout(None)
            .build()
            .map_err(|err| Error::network("failed to build http client", "client", err))?;
        Ok(Self::from_client(client, network))
    }

    pub(crate) fn from_client(client: Client, network: &NetworkConfig) -> Self {
        Self {
            client,
            version_timeout: network.version_timeout(),
            download_timeout: network.download_timeout(),
        }
    }
}

impl Fetcher for HttpFetcher {
    fn fetch_to_file(&self, url: &str, destination: &Path) -> Result<u64> {
        tracing::debug!(url, destination = %destination.display(), "starting download");

        let mut request = self.client.get(url);
        if let Some(timeout) = self.download_timeout {
            request = request.timeout(timeout);
        }
        let mut response = request
            .send()
            .and_then(|response| response.error_for_status())
            .map_err(|err| Error::fetch("failed to open download", url, destination, err))?;

        let mut file = File::create(destination).map_err(|err| {
            Error::fetch("failed to create download file", url, destination, err)
        })?;
        let written = response
            .copy_to(&mut file)
            .map_err(|err| Error::fetch("download interrupted", url, destination, err))?;
        file.flush()
            .map_err(|err| Error::fetch("failed to flush download", url, destination, err))?;

        tracing::debug!(url, bytes = written, "download complete");
        Ok(written)
    }

    fn read_text(&self, url: &str) -> Result<String> {
        self.client
            .get(url)
            .timeout(self.version_timeout)
            .send()
            .and_then(|response| response.error_for_status())
            .and_then(|response| response.text())
            .map_err(|err| Error::network("failed to read remote version", url, err))
    }
}
