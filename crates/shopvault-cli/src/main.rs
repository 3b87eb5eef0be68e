//! shopvault command-line interface

use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use shopvault_accounts::{AccountEvents, AccountManager, TracingNotifier};
use shopvault_storage::{FileStore, ScopedStorage, Storage, StorageConfig};
use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

/// Inspect and edit an account-scoped shopvault store
#[derive(Debug, Parser)]
#[command(name = "shopvault", version, about)]
struct Cli {
    /// Store file
    #[arg(long, env = "SHOPVAULT_STORE", default_value = "shopvault-store.json")]
    store: PathBuf,

    /// TOML configuration file
    #[arg(long, env = "SHOPVAULT_CONFIG")]
    config: Option<PathBuf>,

    /// Log at debug level (overridden by RUST_LOG)
    #[arg(short, long)]
    verbose: bool,

    /// Emit logs as JSON
    #[arg(long)]
    log_json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Manage local accounts
    #[command(subcommand)]
    Accounts(AccountsCommand),
    /// Read a key in the active account
    Get { key: String },
    /// Write a key in the active account
    Set { key: String, value: String },
    /// Remove a key from the active account (and its legacy copy)
    Remove { key: String },
    /// List keys stored under an account namespace
    Keys(KeysArgs),
    /// List account namespaces present in the store, flagging orphans
    Namespaces,
}

#[derive(Debug, Subcommand)]
enum AccountsCommand {
    /// List accounts
    List {
        /// Most recently active first
        #[arg(long)]
        recent: bool,
    },
    /// Create an account and make it active
    Create { name: String },
    /// Rename an account
    Rename { id: String, name: String },
    /// Delete an account (its stored data is kept)
    Delete { id: String },
    /// Make an account active
    Switch { id: String },
    /// Print the active account id
    Active,
}

#[derive(Debug, Args)]
struct KeysArgs {
    /// Account to list (defaults to the active one)
    #[arg(long)]
    account: Option<String>,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose, cli.log_json);

    let config = match &cli.config {
        Some(path) => StorageConfig::load(path)
            .with_context(|| format!("loading config {}", path.display()))?,
        None => StorageConfig::default(),
    };

    let stdout = std::io::stdout();
    run(cli, &config, &mut stdout.lock())
}

fn default_level(verbose: bool) -> &'static str {
    if verbose {
        "debug"
    } else {
        "info"
    }
}

fn init_tracing(verbose: bool, json: bool) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_level(verbose)));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);
    if json {
        builder.json().init();
    } else {
        builder.init();
    }
}

fn run(cli: Cli, config: &StorageConfig, out: &mut impl Write) -> Result<()> {
    let backend = FileStore::open(&cli.store)
        .with_context(|| format!("opening store {}", cli.store.display()))?;
    let storage = Arc::new(ScopedStorage::from_config(Arc::new(backend), config));
    tracing::debug!(store = %cli.store.display(), "opened store");
    let manager = AccountManager::mount(
        storage.clone(),
        config,
        Arc::new(TracingNotifier),
        AccountEvents::default(),
    )
    .context("loading accounts")?;

    match cli.command {
        Command::Accounts(cmd) => run_accounts(cmd, &manager, out)?,
        Command::Get { key } => match storage.get(&key)? {
            Some(value) => writeln!(out, "{value}")?,
            None => bail!("key `{key}` not found"),
        },
        Command::Set { key, value } => storage.set(&key, &value)?,
        Command::Remove { key } => storage.remove(&key)?,
        Command::Keys(args) => {
            let account = args.account.unwrap_or_else(|| storage.active_account());
            for key in storage.account_keys(&account)? {
                writeln!(out, "{key}")?;
            }
        }
        Command::Namespaces => {
            for namespace in storage.namespaces()? {
                let marker = if manager.get(&namespace).is_some() {
                    ""
                } else {
                    "\t(orphaned)"
                };
                writeln!(out, "{namespace}{marker}")?;
            }
        }
    }
    Ok(())
}

fn run_accounts(cmd: AccountsCommand, manager: &AccountManager, out: &mut impl Write) -> Result<()> {
    match cmd {
        AccountsCommand::List { recent } => {
            let active = manager.active_account_id();
            let accounts = if recent {
                manager.accounts_by_recent()
            } else {
                manager.accounts()
            };
            for account in accounts {
                let marker = if account.id.as_str() == active { "*" } else { " " };
                writeln!(
                    out,
                    "{marker} {}\t{}\t{}",
                    account.id,
                    account.name,
                    account.last_active_at.to_rfc3339()
                )?;
            }
        }
        AccountsCommand::Create { name } => {
            let account = manager.create_account(&name)?;
            writeln!(out, "{}", account.id)?;
        }
        AccountsCommand::Rename { id, name } => {
            if !manager.rename_account(&id, &name)? {
                bail!("account `{id}` not renamed (unknown id or blank name)");
            }
        }
        AccountsCommand::Delete { id } => {
            if !manager.delete_account(&id)? {
                bail!("account `{id}` not found");
            }
        }
        AccountsCommand::Switch { id } => {
            if !manager.switch_account(&id)? {
                bail!("account `{id}` not found");
            }
        }
        AccountsCommand::Active => {
            let active = manager.active_account();
            match active {
                Some(account) => writeln!(out, "{}\t{}", account.id, account.name)?,
                None => writeln!(out, "{}", manager.active_account_id())?,
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    fn exec(store: &std::path::Path, args: &[&str]) -> Result<String> {
        let mut argv = vec!["shopvault", "--store", store.to_str().unwrap()];
        argv.extend_from_slice(args);
        let cli = Cli::try_parse_from(argv)?;
        let mut out = Vec::new();
        run(cli, &StorageConfig::default(), &mut out)?;
        Ok(String::from_utf8(out)?)
    }

    #[test]
    fn cli_definition_is_valid() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }

    #[test]
    fn default_level_shows_account_notices() {
        assert_eq!(default_level(false), "info");
        assert_eq!(default_level(true), "debug");
    }

    #[test]
    fn create_set_get_across_accounts() {
        let dir = TempDir::new().unwrap();
        let store = dir.path().join("store.json");

        let acme = exec(&store, &["accounts", "create", "Acme"]).unwrap();
        let acme = acme.trim();
        exec(&store, &["set", "customers", "[1]"]).unwrap();
        assert_eq!(exec(&store, &["get", "customers"]).unwrap(), "[1]\n");

        exec(&store, &["accounts", "create", "Beta"]).unwrap();
        assert!(exec(&store, &["get", "customers"]).is_err());

        exec(&store, &["accounts", "switch", acme]).unwrap();
        assert_eq!(exec(&store, &["get", "customers"]).unwrap(), "[1]\n");
        assert_eq!(exec(&store, &["keys"]).unwrap(), "customers\n");
    }

    #[test]
    fn switch_unknown_fails() {
        let dir = TempDir::new().unwrap();
        let store = dir.path().join("store.json");
        exec(&store, &["accounts", "create", "Acme"]).unwrap();

        let err = exec(&store, &["accounts", "switch", "acc_nope"]).unwrap_err();
        assert!(err.to_string().contains("not found"));
    }

    #[test]
    fn namespaces_flag_orphans() {
        let dir = TempDir::new().unwrap();
        let store = dir.path().join("store.json");

        let acme = exec(&store, &["accounts", "create", "Acme"]).unwrap();
        let acme = acme.trim().to_string();
        exec(&store, &["set", "invoices", "[]"]).unwrap();
        exec(&store, &["accounts", "delete", acme.as_str()]).unwrap();

        let listing = exec(&store, &["namespaces"]).unwrap();
        assert_eq!(listing, format!("{acme}\t(orphaned)\n"));
        assert_eq!(exec(&store, &["accounts", "active"]).unwrap(), "default\n");
    }

    #[test]
    fn list_marks_active() {
        let dir = TempDir::new().unwrap();
        let store = dir.path().join("store.json");
        exec(&store, &["accounts", "create", "Acme"]).unwrap();
        let beta = exec(&store, &["accounts", "create", "Beta"]).unwrap();

        let listing = exec(&store, &["accounts", "list"]).unwrap();
        let first = listing.lines().next().unwrap();
        assert!(first.starts_with(&format!("* {}", beta.trim())));
        assert_eq!(listing.lines().count(), 2);
    }
}
