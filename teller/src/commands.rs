//! Handlers for the non-interactive subcommands.

use tracing::info;

use crate::cli::{LoginArgs, RegisterArgs, UsersArgs};
use crate::error::TellerError;
use crate::output;
use crate::{client, session};

/// Password precedence: flag, then `TELLER_PASSWORD`.
pub const PASSWORD_ENV: &str = "TELLER_PASSWORD";

fn resolve_password(flag: Option<String>) -> Result<String, TellerError> {
    flag.or_else(|| std::env::var(PASSWORD_ENV).ok())
        .ok_or_else(|| {
            TellerError::Config(format!(
                "password required: pass --password or set {PASSWORD_ENV}"
            ))
        })
}

pub async fn login(args: LoginArgs, api_url: Option<String>) -> Result<(), TellerError> {
    let password = resolve_password(args.password)?;
    let mut api = client::connect(api_url);
    let auth = api.login(&args.username, &password).await?;
    session::save(&auth)?;
    info!(operator = %auth.user.username, "logged in");
    println!("logged in as {} ({})", auth.user.username, auth.user.role);
    Ok(())
}

pub async fn logout() -> Result<(), TellerError> {
    if session::clear()? {
        println!("logged out");
    } else {
        println!("no active session");
    }
    Ok(())
}

pub async fn whoami(api_url: Option<String>) -> Result<(), TellerError> {
    let teller = client::connect_authenticated(api_url)?;
    // Refresh the record so the balance shown is current, not the one
    // captured at login.
    let user = teller.api.get_user(&teller.session.user.id).await?;
    println!(
        "{} ({}) balance {} {}",
        user.username,
        user.role,
        user.balance,
        user.currency.as_deref().unwrap_or("TND"),
    );
    Ok(())
}

pub async fn register(args: RegisterArgs, api_url: Option<String>) -> Result<(), TellerError> {
    let password = resolve_password(args.password)?;
    let teller = client::connect_authenticated(api_url)?;
    let creator = args
        .creator
        .unwrap_or_else(|| teller.session.user.id.clone());

    let response = teller
        .api
        .register(&args.username, &password, args.role, &creator)
        .await?;
    println!(
        "{}",
        response
            .message
            .unwrap_or_else(|| "user registered".to_string())
    );
    Ok(())
}

pub async fn users(args: UsersArgs, api_url: Option<String>) -> Result<(), TellerError> {
    let teller = client::connect_authenticated(api_url)?;
    let all = teller.api.all_users().await?;

    let mut filtered = output::filter_users(all, args.search.as_deref().unwrap_or(""));
    output::sort_users(&mut filtered, args.sort, args.desc);

    if args.json {
        println!("{}", serde_json::to_string_pretty(&filtered)?);
        return Ok(());
    }

    let total_count = filtered.len();
    let total_balance = filtered.iter().map(|u| u.balance).sum();
    let pages = output::total_pages(total_count, args.per_page);
    let page_rows = output::paginate(&filtered, args.page, args.per_page);

    let stdout = std::io::stdout();
    let mut handle = stdout.lock();
    output::write_users_table(
        &mut handle,
        page_rows,
        args.page,
        pages,
        total_count,
        total_balance,
    )
}
