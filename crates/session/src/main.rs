//! Command-line client for the back-office identity service.

use std::fs;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::{Parser, Subcommand};

use backoffice_access::{NavGroup, NavigationCatalog, PresentationMap};
use backoffice_auth::{PermissionSet, PermissionSpec};
use backoffice_core::NodeId;
use backoffice_session::{
    FileTokenStore, HttpIdentityClient, SessionConfig, SessionStore, ViewState,
};

#[derive(Parser, Debug)]
#[command(author, version, about = "back-office session client", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Sign in and store the session credential
    Login {
        #[arg(short, long)]
        username: String,
        #[arg(short, long, env = "BACKOFFICE_PASSWORD", hide_env_values = true)]
        password: String,
    },
    /// Show the signed-in actor and granted permissions
    Whoami,
    /// Sign out and forget the stored credential
    Logout,
    /// Print the navigation tree visible to the signed-in actor
    Menu {
        #[arg(long)]
        catalog: PathBuf,
        /// Optional node id → icon/badge map
        #[arg(long)]
        presentation: Option<PathBuf>,
    },
    /// Explain whether the signed-in actor passes a permission requirement
    Explain {
        #[arg(required = true)]
        permissions: Vec<String>,
        /// Require every listed permission instead of any one of them
        #[arg(long)]
        all: bool,
    },
    /// Send a single liveness signal
    Heartbeat,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();
    let config = SessionConfig::from_env().context("invalid configuration")?;
    backoffice_observability::init(config.log_format);

    let client = HttpIdentityClient::new(&config.api_url, config.request_timeout)
        .context("failed to build HTTP client")?;
    let tokens = FileTokenStore::new(&config.token_path);
    let store = SessionStore::new(Arc::new(client), Arc::new(tokens));

    match cli.command {
        Commands::Login { username, password } => {
            store.bootstrap().await;
            if store.snapshot().is_authenticated() {
                store.logout().await;
            }
            let outcome = store.login(&username, &password).await;
            if !outcome.success {
                anyhow::bail!(outcome.message.unwrap_or_else(|| "login failed".to_string()));
            }
            if let Some(actor) = store.actor() {
                println!("Signed in as {} ({})", actor.username, actor.role.name);
            }
        }
        Commands::Whoami => {
            let permissions = signed_in(&store).await?;
            let actor = store.actor().context("not signed in")?;
            let report = serde_json::json!({
                "actor": &*actor,
                "permissions": permissions.iter().map(|p| p.as_str()).collect::<Vec<_>>(),
                "authenticated_at": store.snapshot().authenticated_at,
            });
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
        Commands::Logout => {
            store.bootstrap().await;
            store.logout().await;
            println!("Signed out");
        }
        Commands::Menu {
            catalog,
            presentation,
        } => {
            let raw = fs::read_to_string(&catalog)
                .with_context(|| format!("failed to read {}", catalog.display()))?;
            let catalog = NavigationCatalog::from_json(&raw)?;
            let presentation = match presentation {
                Some(path) => {
                    let raw = fs::read_to_string(&path)
                        .with_context(|| format!("failed to read {}", path.display()))?;
                    PresentationMap::from_json(&raw)?
                }
                None => PresentationMap::new(),
            };

            store.bootstrap().await;
            match store.access_view().navigation(&catalog) {
                ViewState::Ready(groups) => print_menu(&groups, &presentation),
                ViewState::Loading | ViewState::Unauthenticated => {
                    anyhow::bail!("not signed in")
                }
            }
        }
        Commands::Explain { permissions, all } => {
            let granted = signed_in(&store).await?;
            let spec = if all {
                PermissionSpec::all_of(permissions)
            } else {
                PermissionSpec::any_of(permissions)
            };
            println!("{}", serde_json::to_string_pretty(&granted.explain(&spec))?);
        }
        Commands::Heartbeat => {
            signed_in(&store).await?;
            store.send_heartbeat().await.context("heartbeat failed")?;
            println!("Heartbeat sent");
        }
    }

    Ok(())
}

async fn signed_in(store: &SessionStore) -> anyhow::Result<PermissionSet> {
    store.bootstrap().await;
    match store.access_view().permissions() {
        ViewState::Ready(permissions) => Ok(permissions),
        _ => anyhow::bail!("not signed in"),
    }
}

fn print_menu(groups: &[NavGroup], presentation: &PresentationMap) {
    let decorate = |id: &NodeId, label: &str| match &presentation.resolve(id).icon {
        Some(icon) => format!("[{icon}] {label}"),
        None => label.to_string(),
    };

    for group in groups {
        let title = group.title.as_deref().unwrap_or("");
        println!("{}", decorate(&group.id, title));
        for item in &group.items {
            println!("  {} -> {}", decorate(&item.id, &item.label), item.target);
            for child in item.children.iter().flatten() {
                println!("    {} -> {}", decorate(&child.id, &child.label), child.target);
            }
        }
    }
}
