// Runs guarded navigations against a live gallery API from the terminal.

use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use web_session::{AppContext, Config, HistoryNavigator, Navigation, Navigator, Route};

#[derive(Parser, Debug)]
#[command(name = "session-probe", about = "Evaluate the navigation guard against a gallery API")]
struct Args {
    /// Paths to navigate to, in order
    paths: Vec<String>,

    /// Override API_BASE_URL
    #[arg(long)]
    api_url: Option<String>,

    /// Fetch the notification list after navigating
    #[arg(long)]
    notifications: bool,

    /// Bypass the notification cache
    #[arg(long)]
    force: bool,

    /// Log out at the end
    #[arg(long)]
    logout: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,web_session=debug,gallery_client=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let args = Args::parse();

    let mut config = Config::from_env().context("Failed to load configuration")?;
    if let Some(url) = args.api_url {
        config.api_base_url = url;
    }
    tracing::info!(api = %config.api_base_url, "Configuration loaded");

    let navigator = Arc::new(HistoryNavigator::new());
    let app = AppContext::from_config(&config, navigator.clone())?;

    for path in &args.paths {
        let outcome = app.guard.before_each_path(path).await;
        println!("{} -> {}", path, outcome);

        match outcome {
            Navigation::Proceed => {
                if let Some(route) = Route::from_path(path) {
                    navigator.push(route);
                }
            }
            Navigation::Redirect(route) => navigator.push(route),
        }
    }

    let session = app.session.snapshot();
    match session.identity() {
        Some(identity) => println!("session: {} <{}>", identity.display_name, identity.email),
        None if session.session_checked() => println!("session: anonymous"),
        None => println!("session: not checked"),
    }

    if args.notifications {
        match app.notifications.fetch_notifications(args.force).await {
            Ok(list) => println!(
                "notifications: {} ({} unread)",
                list.len(),
                app.notifications.unread_count()
            ),
            Err(e) => {
                app.toast.show_notification(e.to_string());
                println!("notifications: {}", app.toast.message());
            }
        }
    }

    if args.logout {
        app.session.logout().await;
        if let Some(route) = navigator.current() {
            println!("logged out, now at {}", route);
        }
    }

    Ok(())
}
