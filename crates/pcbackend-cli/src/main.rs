//! pcbackend - command line access to Planning Center groups.
//!
//! A thin shell over `pcbackend-core`: store credentials once with
//! `pcbackend login`, then inspect and edit groups from scripts.

use std::io::{self, BufRead, Write};

use anyhow::{bail, Context, Result};
use serde::Serialize;
use tracing::info;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use pcbackend_core::auth::resolve_credentials;
use pcbackend_core::groups::TagRef;
use pcbackend_core::models::GroupId;
use pcbackend_core::{Backend, Config, CredentialStore, GroupProxy, MemberUpdate};

const USAGE: &str = "\
Usage: pcbackend <command> [args]

Commands:
  login [APP_ID]              Store a personal access token in the keychain
  logout                      Remove the stored token
  groups [NAME]               List groups, optionally filtered by name
  show [GROUP]                Show one group (defaults to default_group_id)
  rename GROUP NAME           Rename a group
  tags GROUP                  List a group's tags
  tag GROUP TAG               Add a tag (id or exact name)
  untag GROUP TAG             Remove a tag
  members GROUP               List a group's members
  promote GROUP PERSON_ID     Make a member a leader
  locations GROUP             List locations available to a group
  people NAME                 Search people by name
  default GROUP               Remember a default group id

Set RUST_LOG=debug for verbose logging.";

/// Log to stderr, plus a daily file under the cache directory when it exists.
fn init_tracing(config: &Config) -> Option<WorkerGuard> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

    let (file_layer, guard) = match config.log_dir() {
        Ok(dir) if std::fs::create_dir_all(&dir).is_ok() => {
            let appender = tracing_appender::rolling::daily(dir, "pcbackend.log");
            let (writer, guard) = tracing_appender::non_blocking(appender);
            (Some(fmt::layer().with_ansi(false).with_writer(writer)), Some(guard))
        }
        _ => (None, None),
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(io::stderr))
        .with(file_layer)
        .with(filter)
        .init();
    guard
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present (silently ignore if not found)
    let _ = dotenvy::dotenv();

    let mut config = Config::load().context("Failed to load configuration")?;
    let _log_guard = init_tracing(&config);

    let args: Vec<String> = std::env::args().skip(1).collect();
    let Some(command) = args.first() else {
        println!("{}", USAGE);
        return Ok(());
    };
    let rest = &args[1..];

    match command.as_str() {
        "-h" | "--help" | "help" => {
            println!("{}", USAGE);
            Ok(())
        }
        "login" => login(&mut config, rest.first().cloned()),
        "logout" => logout(&config),
        "default" => {
            let id = parse_group_id(rest.first())?;
            config.default_group_id = Some(id);
            config.save().context("Failed to save configuration")?;
            println!("Default group set to {}", id);
            Ok(())
        }
        _ => {
            let backend = connect(&config)?;
            run(&backend, &config, command, rest).await
        }
    }
}

fn connect(config: &Config) -> Result<Backend> {
    let credentials = resolve_credentials(config)?;
    Backend::connect(config, credentials).context("Failed to create HTTP session")
}

async fn run(backend: &Backend, config: &Config, command: &str, args: &[String]) -> Result<()> {
    match command {
        "groups" => {
            let groups = backend.groups().query(args.first().map(String::as_str)).await?;
            for group in &groups {
                println!("{}\t{}", group.id(), group.name());
            }
        }
        "show" => {
            let group = load_group(backend, config, args.first()).await?;
            print_json(group.record())?;
        }
        "rename" => {
            let name = args.get(1).context("rename needs a new name")?;
            let mut group = load_group(backend, config, args.first()).await?;
            group.set_name(name).await?;
            println!("Renamed group {} to {:?}", group.id(), group.name());
        }
        "tags" => {
            let group = load_group(backend, config, args.first()).await?;
            for tag in group.tags().await? {
                println!("{}\t{}", tag.id, tag.name);
            }
        }
        "tag" | "untag" => {
            let tag = args.get(1).context("missing tag")?;
            let mut group = load_group(backend, config, args.first()).await?;
            let reference = parse_tag(tag);
            if command == "tag" {
                group.tag_set().add(reference).await?;
            } else {
                group.tag_set().delete(reference, true).await?;
            }
            info!(group_id = group.id(), tag = %tag, command, "Tag command finished");
        }
        "members" => {
            let group = load_group(backend, config, args.first()).await?;
            for member in group.memberships().await? {
                let role = if member.leader { "leader" } else { "member" };
                println!("{}\t{}\t{}", member.person_id, role, member.full_name());
            }
        }
        "promote" => {
            let person_id: u64 = args
                .get(1)
                .context("promote needs a person id")?
                .parse()
                .context("person id must be a number")?;
            let mut group = load_group(backend, config, args.first()).await?;
            group
                .members()
                .update(person_id, MemberUpdate::new().leader(true))
                .await?;
            println!("Person {} now leads group {}", person_id, group.id());
        }
        "locations" => {
            let group = load_group(backend, config, args.first()).await?;
            for location in group.location_set().query().await? {
                let scope = if location.shared { "shared" } else { "group" };
                println!(
                    "{}\t{}\t{}\t{}",
                    location.id, scope, location.name, location.formatted_address
                );
            }
        }
        "people" => {
            let name = args.first().context("people needs a name")?;
            for person in backend.people().query(name.as_str()).await? {
                println!("{}\t{}", person.id, person.display_name());
            }
        }
        other => bail!("Unknown command {:?}\n\n{}", other, USAGE),
    }
    Ok(())
}

async fn load_group(
    backend: &Backend,
    config: &Config,
    arg: Option<&String>,
) -> Result<GroupProxy> {
    let id = match arg {
        Some(_) => parse_group_id(arg)?,
        None => config
            .default_group_id
            .context("No group given and no default group configured")?,
    };
    backend
        .groups()
        .get(id)
        .await
        .with_context(|| format!("Failed to load group {}", id))
}

fn parse_group_id(arg: Option<&String>) -> Result<GroupId> {
    arg.context("missing group id")?
        .parse()
        .context("group id must be a number")
}

/// Numeric arguments are tag ids, anything else a tag name
fn parse_tag(arg: &str) -> TagRef {
    match arg.parse::<u64>() {
        Ok(id) => TagRef::Id(id),
        Err(_) => TagRef::Name(arg.to_string()),
    }
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    let text = serde_json::to_string_pretty(value)?;
    println!("{}", text);
    Ok(())
}

fn login(config: &mut Config, app_id: Option<String>) -> Result<()> {
    let app_id = match app_id {
        Some(id) => id,
        None => {
            print!("Application ID: ");
            io::stdout().flush()?;
            let mut line = String::new();
            io::stdin().lock().read_line(&mut line)?;
            line.trim().to_string()
        }
    };
    if app_id.is_empty() {
        bail!("Application ID cannot be empty");
    }

    let secret = rpassword::prompt_password("Secret: ")?;
    if secret.is_empty() {
        bail!("Secret cannot be empty");
    }

    CredentialStore::store(&app_id, &secret)?;
    config.last_app_id = Some(app_id.clone());
    config.save().context("Failed to save configuration")?;
    info!(app_id = %app_id, "Credentials stored");
    println!("Stored credentials for {}", app_id);
    Ok(())
}

fn logout(config: &Config) -> Result<()> {
    let app_id = config
        .last_app_id
        .as_deref()
        .context("No stored application id")?;
    if CredentialStore::has_credentials(app_id) {
        CredentialStore::delete(app_id)?;
    }
    println!("Removed credentials for {}", app_id);
    Ok(())
}
