use anyhow::Context;
use clap::{Parser, Subcommand};
use signup_flow::api;
use signup_flow::registration::{
    FirebaseIdentityProvider, FirestoreDocumentStore, RegistrationConfig, RegistrationError,
    RegistrationForm, RegistrationOrchestrator,
};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
struct Args {
    #[clap(long, default_value = "signup.toml")]
    config: String,

    /// Overrides `api_key` from the config file.
    #[clap(long)]
    api_key: Option<String>,

    /// Overrides `project_id` from the config file.
    #[clap(long)]
    project_id: Option<String>,

    #[clap(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Serve the sign-up HTTP endpoints.
    Serve {
        #[clap(long)]
        listen: Option<String>,
    },
    /// Register one account and exit.
    Signup {
        #[clap(long)]
        first_name: String,
        #[clap(long)]
        last_name: String,
        #[clap(long)]
        email: String,
        #[clap(long)]
        password: String,
        #[clap(long)]
        confirm_password: String,
    },
}

fn load_config(args: &Args) -> anyhow::Result<RegistrationConfig> {
    let mut cfg = RegistrationConfig::load(&args.config).context("load config")?;

    if let Some(api_key) = &args.api_key {
        cfg.api_key = api_key.clone();
    }
    if let Some(project_id) = &args.project_id {
        cfg.project_id = project_id.clone();
    }

    cfg.validate().context("validate config")?;
    Ok(cfg)
}

fn build_orchestrator(cfg: &RegistrationConfig) -> RegistrationOrchestrator {
    RegistrationOrchestrator::from_config(
        cfg,
        Arc::new(FirebaseIdentityProvider::new(cfg)),
        Arc::new(FirestoreDocumentStore::new(cfg)),
    )
}

async fn serve(cfg: &RegistrationConfig, listen: Option<String>) -> anyhow::Result<()> {
    let addr: SocketAddr = listen
        .as_deref()
        .unwrap_or(&cfg.listen_addr)
        .parse()
        .context("parse listen address")?;

    let state = api::AppState {
        orchestrator: Arc::new(build_orchestrator(cfg)),
    };

    let listener = TcpListener::bind(addr).await.context("bind listener")?;
    info!("Sign-up service listening on {}", addr);
    axum::serve(listener, api::create_router(state)).await?;
    Ok(())
}

async fn signup_once(cfg: &RegistrationConfig, form: RegistrationForm) -> anyhow::Result<()> {
    let orchestrator = Arc::new(build_orchestrator(cfg));

    let mut states = orchestrator.subscribe();
    let watcher = tokio::spawn(async move {
        while states.changed().await.is_ok() {
            let state = states.borrow_and_update().clone();
            println!("state: {}", state);
        }
    });

    let result = orchestrator.submit(form).await;
    // Dropping the only sender ends the watcher loop.
    drop(orchestrator);
    if let Err(e) = watcher.await {
        warn!("State watcher stopped abnormally: {}", e);
    }

    match result {
        Ok(user_id) => {
            println!("Registered account {}", user_id);
            Ok(())
        }
        Err(RegistrationError::Validation(rejection)) => {
            for (field, reason) in &rejection.errors {
                println!("  {}: {}", field, reason);
            }
            anyhow::bail!("{}", rejection.message)
        }
        Err(e) => anyhow::bail!("{}", e.failure_message()),
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let args = Args::parse();
    let cfg = load_config(&args)?;

    match args.command {
        Command::Serve { listen } => serve(&cfg, listen).await,
        Command::Signup {
            first_name,
            last_name,
            email,
            password,
            confirm_password,
        } => {
            let form = RegistrationForm {
                first_name,
                last_name,
                email,
                password,
                confirm_password,
            };
            signup_once(&cfg, form).await
        }
    }
}
