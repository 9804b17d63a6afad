//! Authentication commands.

use tracing::info;

use contestcal_server::{Request, Response};

use super::contests::unexpected;
use crate::app::App;
use crate::error::ClientResult;

/// Sign in to Google Calendar.
///
/// Skips the flow when the stored session is still accepted, unless
/// `force` is set.
pub async fn login(app: &App, force: bool) -> ClientResult<()> {
    if !force && authenticated(app).await? {
        println!("Already authenticated with Google Calendar.");
        println!("Use --force to re-authenticate.");
        return Ok(());
    }

    if !authenticated_from(app.request(Request::Authenticate).await?)? {
        return Err(unexpected(&Response::auth_status(false)));
    }

    info!("Google authentication successful");
    println!("Authentication successful!");
    println!("You can now add contests with `contestcal add <id>`.");
    Ok(())
}

/// Forget the stored session.
pub async fn logout(app: &App) -> ClientResult<()> {
    app.request(Request::Logout).await?;
    println!("Signed out of Google Calendar.");
    Ok(())
}

/// Report whether the stored session is accepted.
pub async fn status(app: &App, json: bool) -> ClientResult<()> {
    let authenticated = authenticated(app).await?;
    if json {
        println!("{}", serde_json::json!({ "authenticated": authenticated }));
    } else if authenticated {
        println!("Authenticated with Google Calendar.");
    } else {
        println!("Not authenticated. Run `contestcal auth login`.");
    }
    Ok(())
}

async fn authenticated(app: &App) -> ClientResult<bool> {
    authenticated_from(app.request(Request::CheckAuthStatus).await?)
}

fn authenticated_from(response: Response) -> ClientResult<bool> {
    match response {
        Response::AuthStatus { authenticated } => Ok(authenticated),
        other => Err(unexpected(&other)),
    }
}
