//! `pimp` - CLI for the P.I.M.P Business Repository
//!
//! This binary runs the website and provides the maintenance commands used
//! to seed, inspect and moderate the directory.

#![warn(missing_debug_implementations)]
#![deny(unsafe_code)]

use anyhow::{bail, Context};
use chrono::Utc;
use clap::Parser;

use pimp::cli::{AccreditationCommand, ClaimsCommand, Cli, Command, ConfigCommand, ServeCommand};
use pimp::domain::{ApplicationStatus, ClaimStatus};
use pimp::storage::seed::seed_demo_data;
use pimp::web::{self, AppState, ROUTES};
use pimp::{init_logging, Config, Storage};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Initialize logging based on verbosity
    init_logging(cli.verbosity());

    let config_path = cli.config.clone();
    let load_config =
        || Config::load_from(config_path.clone()).context("failed to load configuration");

    // Execute the command
    match cli.command {
        Command::Serve(serve_cmd) => handle_serve(load_config()?, serve_cmd).await,
        Command::Routes(routes_cmd) => handle_routes(routes_cmd.json),
        Command::Render(render_cmd) => handle_render(load_config()?, &render_cmd.path).await,
        Command::Seed(seed_cmd) => handle_seed(&load_config()?, seed_cmd.reset),
        Command::Status(status_cmd) => handle_status(&load_config()?, status_cmd.json),
        Command::Claims(claims_cmd) => handle_claims(&load_config()?, claims_cmd),
        Command::Accreditation(accreditation_cmd) => {
            handle_accreditation(&load_config()?, accreditation_cmd)
        }
        Command::Config(config_cmd) => handle_config(cli.config, config_cmd),
    }
}

async fn handle_serve(mut config: Config, cmd: ServeCommand) -> anyhow::Result<()> {
    if let Some(host) = cmd.host {
        config.server.host = host;
    }
    if let Some(port) = cmd.port {
        config.server.port = port;
    }
    config.validate()?;
    web::serve(config).await?;
    Ok(())
}

fn handle_routes(json: bool) -> anyhow::Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(ROUTES)?);
    } else {
        let width = ROUTES.iter().map(|r| r.path.len()).max().unwrap_or(0);
        for route in ROUTES {
            println!("{:<8} {:<width$}  {}", route.method, route.path, route.page);
        }
    }
    Ok(())
}

async fn handle_render(config: Config, path: &str) -> anyhow::Result<()> {
    let storage = Storage::open_in_memory()?;
    seed_demo_data(&storage)?;
    let (status, body) = web::render(AppState::new(config, storage), path).await?;
    if !status.is_success() {
        eprintln!("{path}: {status}");
    }
    println!("{body}");
    Ok(())
}

fn handle_seed(config: &Config, reset: bool) -> anyhow::Result<()> {
    let storage = Storage::open(config.database_path())?;
    if reset {
        storage.wipe()?;
    } else if !storage.is_empty()? {
        println!(
            "Database at {} already has data; use --reset to replace it.",
            storage.path().display()
        );
        return Ok(());
    }
    let summary = seed_demo_data(&storage)?;
    println!(
        "Seeded {} businesses, {} reviews and {} users into {}",
        summary.businesses,
        summary.reviews,
        summary.users,
        storage.path().display()
    );
    Ok(())
}

fn handle_status(config: &Config, json: bool) -> anyhow::Result<()> {
    let storage = Storage::open(config.database_path())?;
    let stats = storage.stats()?;
    if json {
        let status = serde_json::json!({
            "database_path": storage.path(),
            "stats": stats,
        });
        println!("{}", serde_json::to_string_pretty(&status)?);
    } else {
        println!("pimp status");
        println!("-----------");
        println!("Database:              {}", storage.path().display());
        println!("Size:                  {} bytes", stats.db_size_bytes);
        println!("Businesses:            {}", stats.businesses);
        println!("  Accredited:          {}", stats.accredited);
        println!("  Claimed:             {}", stats.claimed);
        println!("Reviews:               {}", stats.reviews);
        println!("Users:                 {}", stats.users);
        println!("Active sessions:       {}", stats.active_sessions);
        println!("Pending claims:        {}", stats.pending_claims);
        println!("Pending applications:  {}", stats.pending_applications);
    }
    Ok(())
}

fn handle_claims(config: &Config, cmd: ClaimsCommand) -> anyhow::Result<()> {
    let storage = Storage::open(config.database_path())?;
    match cmd {
        ClaimsCommand::List { all } => {
            let status = if all { None } else { Some(ClaimStatus::Pending) };
            let rows = storage.list_claims(status)?;
            if rows.is_empty() {
                println!("No claims.");
            }
            for row in rows {
                println!(
                    "#{:<4} {:<9} {} ({}) by {} <{}>, {}, verify by {}",
                    row.claim.id,
                    row.claim.status,
                    row.business_name,
                    row.business_slug,
                    row.user_name,
                    row.user_email,
                    row.claim.position,
                    row.claim.method.label(),
                );
            }
        }
        ClaimsCommand::Approve { id } => {
            let claim = storage.approve_claim(id)?;
            println!("Approved claim #{} for business {}", claim.id, claim.business_id);
        }
        ClaimsCommand::Reject { id } => {
            let claim = storage.reject_claim(id)?;
            println!("Rejected claim #{}", claim.id);
        }
    }
    Ok(())
}

fn handle_accreditation(config: &Config, cmd: AccreditationCommand) -> anyhow::Result<()> {
    let storage = Storage::open(config.database_path())?;
    match cmd {
        AccreditationCommand::List { all } => {
            let status = if all {
                None
            } else {
                Some(ApplicationStatus::Pending)
            };
            let rows = storage.list_applications(status)?;
            if rows.is_empty() {
                println!("No applications.");
            }
            for row in rows {
                let app = &row.application;
                println!(
                    "#{:<4} {:<9} {} ({}): {} <{}>, {} years, {} employees",
                    app.id,
                    app.status,
                    row.business_name,
                    row.business_slug,
                    app.contact_name,
                    app.email,
                    app.years_in_business,
                    app.employees,
                );
            }
        }
        AccreditationCommand::Approve { id } => {
            let app = storage.approve_application(id, Utc::now().date_naive())?;
            println!("Accredited business {} (application #{})", app.business_id, app.id);
        }
        AccreditationCommand::Deny { id } => {
            let app = storage.deny_application(id)?;
            println!("Denied application #{}", app.id);
        }
    }
    Ok(())
}

fn handle_config(path: Option<std::path::PathBuf>, cmd: ConfigCommand) -> anyhow::Result<()> {
    match cmd {
        ConfigCommand::Show { json } => {
            let config = Config::load_from(path)?;
            if json {
                println!("{}", serde_json::to_string_pretty(&config)?);
            } else {
                println!("Current Configuration");
                println!("=====================");
                println!();
                println!("[Server]");
                println!("  Address:            {}:{}", config.server.host, config.server.port);
                println!("  Static files:       {}", config.server.static_dir.display());
                println!();
                println!("[Storage]");
                println!("  Database path:      {}", config.database_path().display());
                println!("  Seed demo data:     {}", config.storage.seed_demo_data);
                println!();
                println!("[Site]");
                println!("  Name:               {}", config.site.name);
                println!("  Support email:      {}", config.site.support_email);
                println!("  Per page:           {}", config.site.per_page);
                println!("  Reviews per page:   {}", config.site.reviews_per_page);
                println!();
                println!("[Auth]");
                println!("  Cookie name:        {}", config.auth.cookie_name);
                println!("  Session TTL (h):    {}", config.auth.session_ttl_hours);
                println!("  Min password:       {}", config.auth.min_password_length);
                println!("  Secure cookies:     {}", config.auth.secure_cookies);
            }
        }
        ConfigCommand::Path => {
            println!(
                "{}",
                path.unwrap_or_else(Config::default_config_path).display()
            );
        }
        ConfigCommand::Validate { file } => {
            let path = file.or(path).unwrap_or_else(Config::default_config_path);
            println!("Validating configuration: {}", path.display());
            match Config::load_from(Some(path)) {
                Ok(_) => println!("Configuration is valid."),
                Err(e) => bail!("configuration error: {e}"),
            }
        }
    }
    Ok(())
}
