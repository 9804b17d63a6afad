//! Interactive authorization: open the browser, paste the redirect back.
//!
//! After consent Google redirects to the registered URI with the token in
//! the fragment. Nothing listens there, so the user copies the address bar
//! into the terminal.

use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader};
use tracing::{debug, warn};

use contestcal_providers::google::AuthorizationFlow;
use contestcal_providers::{BoxFuture, ProviderError, ProviderResult};

/// Authorization flow driven from the terminal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BrowserFlow {
    open_browser: bool,
}

impl Default for BrowserFlow {
    fn default() -> Self {
        Self::new()
    }
}

impl BrowserFlow {
    pub fn new() -> Self {
        Self { open_browser: true }
    }

    /// Only print the URL; useful over SSH.
    pub fn without_browser(mut self) -> Self {
        self.open_browser = false;
        self
    }
}

impl AuthorizationFlow for BrowserFlow {
    fn authorize<'a>(&'a self, auth_url: &'a str) -> BoxFuture<'a, ProviderResult<Option<String>>> {
        Box::pin(async move {
            eprintln!("Open this URL to authorize contestcal:");
            eprintln!();
            eprintln!("  {}", auth_url);
            eprintln!();

            if self.open_browser {
                match open::that(auth_url) {
                    Ok(()) => debug!("opened browser"),
                    Err(e) => warn!(error = %e, "could not open browser"),
                }
            }

            eprintln!("After approving, paste the full address you were redirected to");
            eprint!("(empty line to cancel): ");

            let mut stdin = BufReader::new(tokio::io::stdin());
            read_redirect(&mut stdin).await.map_err(|e| {
                ProviderError::internal("failed to read redirect from terminal").with_source(e)
            })
        })
    }
}

/// Reads one line; an empty line or end of input means cancelled.
pub async fn read_redirect<R>(reader: &mut R) -> std::io::Result<Option<String>>
where
    R: AsyncBufRead + Unpin,
{
    let mut line = String::new();
    reader.read_line(&mut line).await?;
    let line = line.trim();
    if line.is_empty() {
        Ok(None)
    } else {
        Ok(Some(line.to_string()))
    }
}
