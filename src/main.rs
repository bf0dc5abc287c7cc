//! book-reviewer server entry point.

use book_reviewer::{
    auth::AuthService,
    config::{Cli, Command, Config, UserCommand},
    db::Database,
    server,
    validation::RegistrationForm,
};
use clap::Parser;
use std::io::{self, Write};
use std::path::PathBuf;
use tokio::net::TcpListener;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config_path = cli.config.clone().or_else(Config::find_config_file);

    let config = if let Some(ref path) = config_path {
        Config::load(path)?
    } else {
        Config::default()
    };

    match cli.command {
        Some(Command::Init { force }) => cmd_init(force),
        Some(Command::User { action }) => cmd_user(action, &config),
        Some(Command::Seed) => cmd_seed(config),
        Some(Command::Serve { bind }) => cmd_serve(config, bind).await,
        None => cmd_serve(config, None).await,
    }
}

/// Initialize config and database.
fn cmd_init(force: bool) -> anyhow::Result<()> {
    let config_path = PathBuf::from("config.toml");

    if config_path.exists() && !force {
        anyhow::bail!(
            "Config file already exists: {}. Use --force to overwrite.",
            config_path.display()
        );
    }

    std::fs::write(&config_path, Config::generate_default())?;
    println!("Created config file: {}", config_path.display());

    let config = Config::default();
    let _db = Database::open(&config.database.path)?;
    println!("Initialized database: {}", config.database.path.display());

    println!("\nEdit config.toml to configure your site.");
    println!("Then run: book-reviewer serve");

    Ok(())
}

/// Seed authors into an empty catalog.
fn cmd_seed(config: Config) -> anyhow::Result<()> {
    let db = Database::open(&config.database.path)?;
    let state = server::AppState::new_with_db(config, db);

    match state.seed()? {
        0 => println!("Catalog already has authors, nothing seeded."),
        created => println!("Seeded {} authors.", created),
    }

    Ok(())
}

/// User management commands.
fn cmd_user(action: UserCommand, config: &Config) -> anyhow::Result<()> {
    let db = Database::open(&config.database.path)?;
    let auth = AuthService::new(
        db,
        config.auth.session_days,
        config.auth.registration_enabled(),
    );

    match action {
        UserCommand::Add {
            first_name,
            last_name,
            email,
            password,
        } => {
            let password = match password {
                Some(p) => p,
                None => prompt_password("Password: ")?,
            };

            let form = RegistrationForm {
                first_name,
                last_name,
                email,
                confirm_password: password.clone(),
                password,
            };

            match auth.create_user(&form) {
                Ok(user) => println!(
                    "Created user: {} <{}> (id: {})",
                    user.full_name(),
                    user.email,
                    user.id
                ),
                Err(err) => match err.user_messages() {
                    Some(messages) => anyhow::bail!(messages.join("\n")),
                    None => return Err(err.into()),
                },
            }
        }

        UserCommand::Del { email } => {
            if auth.delete_user(&email)? {
                println!("Deleted user: {}", email);
            } else {
                println!("User not found: {}", email);
            }
        }

        UserCommand::List => {
            let users = auth.list_users()?;
            if users.is_empty() {
                println!("No users found.");
            } else {
                println!("{:<6} {:<30} {:<36} JOINED", "ID", "NAME", "EMAIL");
                println!("{}", "-".repeat(84));
                for user in users {
                    let joined = chrono::DateTime::from_timestamp(user.created_at, 0)
                        .map(|dt| dt.format("%Y-%m-%d %H:%M").to_string())
                        .unwrap_or_else(|| "unknown".to_string());
                    println!(
                        "{:<6} {:<30} {:<36} {}",
                        user.id,
                        user.full_name(),
                        user.email,
                        joined
                    );
                }
            }
        }
    }

    Ok(())
}

/// Start the server.
async fn cmd_serve(mut config: Config, bind: Option<std::net::SocketAddr>) -> anyhow::Result<()> {
    if let Some(addr) = bind {
        config.server.bind = addr;
    }

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "book_reviewer=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let db = Database::open(&config.database.path)?;

    tracing::info!(
        bind = %config.server.bind,
        database = %config.database.path.display(),
        "Starting book-reviewer"
    );

    let expired = db.cleanup_expired_sessions()?;
    if expired > 0 {
        tracing::info!(expired, "Removed expired sessions");
    }

    let state = server::AppState::new_with_db(config.clone(), db);
    if let Err(e) = state.seed() {
        tracing::warn!(error = %e, "Author seeding failed");
    }

    let app = server::create_router(state);

    let listener = TcpListener::bind(config.server.bind).await?;
    tracing::info!(address = %config.server.bind, "Server listening");

    axum::serve(listener, app).await?;

    Ok(())
}

/// Prompt for password input.
fn prompt_password(prompt: &str) -> anyhow::Result<String> {
    print!("{}", prompt);
    io::stdout().flush()?;

    let mut password = String::new();
    io::stdin().read_line(&mut password)?;

    Ok(password.trim().to_string())
}
