//! LifeHub CLI - command line access to the LifeHub API.
//!
//! Wires the config, token storage, session, API client and router from
//! `lifehub-core` together and exposes them as subcommands.

use std::io::{self, Write};
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use serde_json::Value;
use tracing::{info, warn};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use lifehub_core::models::{Credentials, Registration};
use lifehub_core::router::REDIRECT_PARAM;
use lifehub_core::{ApiClient, Config, RouteTable, Router, SessionStore};

/// Environment variable pre-filling the login email
const EMAIL_ENV: &str = "LIFEHUB_EMAIL";

/// Environment variable holding the login password
const PASSWORD_ENV: &str = "LIFEHUB_PASSWORD";

#[derive(Parser)]
#[command(name = "lifehub", version, about = "Command line client for LifeHub")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Log in and store the session token
    Login {
        #[arg(long)]
        email: Option<String>,
    },
    /// Create an account
    Register {
        #[arg(long)]
        email: String,
        #[arg(long)]
        name: Option<String>,
    },
    /// Forget the stored session token
    Logout,
    /// Show the profile of the logged in user
    Whoami,
    /// Show configuration and session state without contacting the server
    Status,
    /// GET a path under the API base
    Get { path: String },
    /// POST a JSON body to a path under the API base
    Post { path: String, body: String },
    /// PATCH a path under the API base with a JSON body
    Patch { path: String, body: String },
    /// DELETE a path under the API base
    Delete { path: String },
    /// Navigate to an app route, running the login guard
    Open { route: String },
}

/// Initialize the tracing subscriber for logging
fn init_tracing() {
    // Use RUST_LOG env var to control log level (e.g., RUST_LOG=debug)
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(io::stderr))
        .with(filter)
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present (silently ignore if not found)
    let _ = dotenvy::dotenv();

    init_tracing();
    let cli = Cli::parse();

    let mut config = match Config::load() {
        Ok(c) => c,
        Err(e) => {
            warn!(error = %e, "Failed to load config, using defaults");
            Config::default()
        }
    };

    let storage = config.open_storage()?;
    let session = Arc::new(SessionStore::load(storage, &config.api_url())?);
    let api = ApiClient::new(session.clone());

    match cli.command {
        Command::Login { email } => login(&mut config, &api, email).await,
        Command::Register { email, name } => register(&api, email, name).await,
        Command::Logout => {
            session.logout();
            println!("Logged out.");
            Ok(())
        }
        Command::Whoami => {
            let user = session
                .verify()
                .await
                .context("Not logged in, run `lifehub login`")?;
            print_json(&serde_json::to_value(&user)?)
        }
        Command::Status => {
            println!("API:           {}", session.api_base());
            println!("Storage:       {:?}", config.storage);
            println!("Authenticated: {}", session.is_authenticated());
            Ok(())
        }
        Command::Get { path } => print_json(&api.get::<Value>(&path).await?),
        Command::Post { path, body } => {
            let body = parse_body(&body)?;
            print_json(&api.post::<Value, _>(&path, &body).await?)
        }
        Command::Patch { path, body } => {
            let body = parse_body(&body)?;
            print_json(&api.patch::<Value, _>(&path, &body).await?)
        }
        Command::Delete { path } => match api.delete::<Value>(&path).await? {
            Some(body) => print_json(&body),
            None => {
                println!("Deleted.");
                Ok(())
            }
        },
        Command::Open { route } => open(&session, &route).await,
    }
}

async fn login(config: &mut Config, api: &ApiClient, email: Option<String>) -> Result<()> {
    let email = match email
        .or_else(|| std::env::var(EMAIL_ENV).ok())
        .or_else(|| config.last_email.clone())
    {
        Some(email) => email,
        None => prompt("Email: ")?,
    };
    let password = match std::env::var(PASSWORD_ENV) {
        Ok(p) if !p.is_empty() => p,
        _ => rpassword::prompt_password("Password: ")?,
    };

    let token = api
        .login(&Credentials {
            email: email.clone(),
            password,
        })
        .await
        .context("Login failed")?;

    let session = api.session();
    session.set_token(Some(&token.access_token));

    config.last_email = Some(email);
    if let Err(e) = config.save() {
        warn!(error = %e, "Failed to save config");
    }

    match session.fetch_user().await {
        Some(user) => {
            info!(user_id = user.id, "Login successful");
            println!("Logged in as {}.", user.display_name());
            Ok(())
        }
        None => anyhow::bail!("Server issued a token but rejected it"),
    }
}

async fn register(api: &ApiClient, email: String, name: Option<String>) -> Result<()> {
    let password = rpassword::prompt_password("Password: ")?;
    let confirm = rpassword::prompt_password("Repeat password: ")?;
    if password != confirm {
        anyhow::bail!("Passwords do not match");
    }

    let user = api
        .register(&Registration {
            email,
            password,
            full_name: name,
        })
        .await
        .context("Registration failed")?;
    println!("Account created for {}. Run `lifehub login` next.", user.display_name());
    Ok(())
}

async fn open(session: &Arc<SessionStore>, route: &str) -> Result<()> {
    let router = Router::new(RouteTable::lifehub(), session.clone());
    let nav = router.navigate(route).await?;

    if let Some(from) = nav.redirected_from {
        println!("{} requires login; sent to {}.", from, nav.target.full_path);
        if let Some(back) = nav.target.query(REDIRECT_PARAM) {
            println!("Run `lifehub login`, then `lifehub open {}`.", back);
        }
        return Ok(());
    }

    let name = nav.target.name().unwrap_or("(unnamed)");
    match session.user() {
        Some(user) => println!("{} ({}) as {}", name, nav.target.path, user.display_name()),
        None => println!("{} ({})", name, nav.target.path),
    }
    Ok(())
}

fn parse_body(body: &str) -> Result<Value> {
    serde_json::from_str(body).context("Body is not valid JSON")
}

fn print_json(value: &Value) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn prompt(label: &str) -> Result<String> {
    print!("{}", label);
    io::stdout().flush()?;

    let mut line = String::new();
    io::stdin().read_line(&mut line)?;
    Ok(line.trim().to_string())
}
