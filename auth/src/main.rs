use std::process::ExitCode;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use petcare_auth::config::Config;
use petcare_auth::{
    FileStore, Notification, Notifier, RouteDecision, SessionEvent, SessionManager, Severity,
};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// PetCare dashboard identity shell
#[derive(Parser)]
#[command(name = "petcare", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Create an account and sign in with it
    Register {
        #[arg(long)]
        name: String,
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
    },
    /// Sign in with an existing account
    Login {
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
    },
    /// Sign out of the current session
    Logout,
    /// Show the signed-in user
    Whoami,
    /// Show what a route would render for the current session
    Route {
        /// Path such as `/dashboard`
        path: String,
    },
}

/// Prints outcome notifications the way the dashboard toasts them
struct ConsoleNotifier;

impl Notifier for ConsoleNotifier {
    fn notify(&self, notification: Notification) {
        match notification.severity {
            Severity::Info => println!("{}: {}", notification.title, notification.detail),
            Severity::Error => eprintln!("{}: {}", notification.title, notification.detail),
        }
    }
}

fn main() -> anyhow::Result<ExitCode> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "petcare=info,petcare_auth=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    // Load configuration from environment
    let config = Config::from_env();
    info!("Using data directory {:?}", config.storage.data_dir);

    let store = FileStore::open(&config.storage.data_dir)?;
    let mut manager = SessionManager::open(
        Arc::new(store),
        Arc::new(ConsoleNotifier),
        config.session_config(),
    );

    let ok = match cli.command {
        Command::Register {
            name,
            email,
            password,
        } => manager.register(&name, &email, &password),
        Command::Login { email, password } => manager.login(&email, &password),
        Command::Logout => {
            let SessionEvent::LoggedOut { redirect } = manager.logout();
            println!("-> {}", redirect);
            true
        }
        Command::Whoami => match manager.current_session() {
            Some(session) => {
                println!("{} <{}> [{}]", session.name, session.email, session.initials());
                true
            }
            None => {
                println!("Not logged in");
                false
            }
        },
        Command::Route { path } => {
            let route = path.parse()?;
            match manager.resolve_route(route) {
                RouteDecision::Render(route) => println!("render {}", route),
                RouteDecision::Redirect(route) => println!("redirect {}", route),
            }
            true
        }
    };

    Ok(if ok { ExitCode::SUCCESS } else { ExitCode::FAILURE })
}
