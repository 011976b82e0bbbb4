//! Terminal front end for the sales call review service

#![forbid(unsafe_code)]

use anyhow::{Context, bail};
use callreview_client::app::{App, Screen};
use callreview_client::components::ChatWidget;
use callreview_client::pages::LoginPage;
use callreview_client::{AppState, AuthPhase, Route};
use callreview_core::types::CallAnalysisSubmission;
use callreview_core::{ChatRole, Config};
use chrono::Utc;
use clap::{Parser, Subcommand};
use colored::Colorize;
use rustyline::DefaultEditor;
use rustyline::error::ReadlineError;
use std::io::IsTerminal;
use std::path::PathBuf;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

/// Command line interface for the call review client
#[derive(Parser)]
#[command(
    name = "callreview",
    version = env!("CARGO_PKG_VERSION"),
    about = "Review analysed sales calls from the terminal",
    long_about = "Sign in to the sales call review service, browse dashboards and call analyses, and chat with the AI sales coach."
)]
struct Cli {
    /// Configuration file path
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long)]
    log_level: Option<String>,

    /// Enable structured JSON logging
    #[arg(long)]
    json: bool,

    /// Backend base URL (overrides config)
    #[arg(long, value_name = "URL", env = "CALLREVIEW_BASE_URL")]
    base_url: Option<String>,

    /// Subcommand
    #[command(subcommand)]
    command: Commands,
}

/// Available subcommands
#[derive(Subcommand)]
enum Commands {
    /// Sign in and store the session token
    Login {
        /// Username
        #[arg(value_name = "USERNAME")]
        username: String,

        /// Password (prompted for when omitted)
        #[arg(long, env = "CALLREVIEW_PASSWORD", hide_env_values = true)]
        password: Option<String>,
    },

    /// Forget the stored session
    Logout,

    /// Show the signed-in user
    Whoami,

    /// Render any route, e.g. `/dashboard` or `/call/42`
    Open {
        /// Route path
        #[arg(value_name = "PATH")]
        path: String,
    },

    /// Show the dashboard for the signed-in role
    Dashboard {
        /// Filter a manager's call list to one rep
        #[arg(long, value_name = "REP_ID")]
        rep: Option<String>,
    },

    /// Show one call's analysis
    Call {
        /// Call identifier
        #[arg(value_name = "ID")]
        id: String,
    },

    /// Chat with the AI sales coach
    Chat {
        /// Ask about one call
        #[arg(long, value_name = "ID")]
        call: Option<String>,

        /// Send one message and exit (interactive when omitted)
        #[arg(value_name = "MESSAGE")]
        message: Option<String>,
    },

    /// Export the manager dashboard as a JSON report
    Export {
        /// Filter the exported calls to one rep
        #[arg(long, value_name = "REP_ID")]
        rep: Option<String>,

        /// Output directory
        #[arg(long, value_name = "DIR", default_value = ".")]
        out: PathBuf,
    },

    /// Submit an analysed call from a JSON file
    Ingest {
        /// Submission file
        #[arg(value_name = "FILE")]
        file: PathBuf,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => Config::load_from(path)?,
        None => Config::load()?,
    };
    if let Some(base_url) = cli.base_url {
        config.api.base_url = base_url;
        config.validate()?;
    }
    if let Some(level) = cli.log_level {
        config.logging.level = level;
    }
    if cli.json {
        config.logging.format = "json".to_string();
    }
    callreview_core::init_logging(&config.logging)?;

    let shutdown = CancellationToken::new();
    let app = App::new(AppState::new(config)?, shutdown.clone());

    tokio::select! {
        result = run(&app, cli.command) => result,
        _ = tokio::signal::ctrl_c() => {
            warn!("Interrupted; cancelling in-flight requests");
            app.shutdown();
            Ok(())
        }
    }
}

async fn run(app: &App, command: Commands) -> anyhow::Result<()> {
    match command {
        Commands::Login { username, password } => login(app, &username, password).await,
        Commands::Logout => {
            app.state().auth.logout();
            println!("Signed out");
            Ok(())
        }
        Commands::Whoami => {
            match app.start().await {
                AuthPhase::Authenticated(user) => {
                    println!("{} ({}) as {}", user.rep_name, user.role, user.username);
                }
                AuthPhase::Loading | AuthPhase::Unauthenticated => println!("Not signed in"),
            }
            Ok(())
        }
        Commands::Open { path } => render(app, Route::parse(&path)).await,
        Commands::Call { id } => render(app, Route::CallDetail(id)).await,
        Commands::Dashboard { rep } => {
            app.start().await;
            let mut mounted = app.open(Route::Dashboard).await;
            if let Some(rep_id) = rep {
                let cancel = mounted.cancel_token().clone();
                match mounted.screen_mut() {
                    Screen::ManagerDashboard(page) => {
                        page.select_rep(Some(rep_id), &app.state().api, &cancel).await;
                    }
                    _ => warn!("--rep only applies to the manager dashboard"),
                }
            }
            print!("{mounted}");
            Ok(())
        }
        Commands::Chat { call, message } => chat(app, call, message).await,
        Commands::Export { rep, out } => export(app, rep, out).await,
        Commands::Ingest { file } => ingest(app, file).await,
    }
}

async fn render(app: &App, route: Route) -> anyhow::Result<()> {
    app.start().await;
    let mounted = app.open(route).await;
    print!("{mounted}");
    Ok(())
}

async fn login(app: &App, username: &str, password: Option<String>) -> anyhow::Result<()> {
    let interactive = std::io::stdin().is_terminal();
    let password = tokio::task::block_in_place(|| {
        resolve_password(password, interactive, || {
            eprint!("Password: ");
            rpassword::read_password()
        })
    })?;

    let mut page = LoginPage::new();
    let cancel = app.child_token();
    match page.submit(&app.state().auth, username, &password, &cancel).await {
        Some(user) => {
            println!("Signed in as {} ({})", user.rep_name.bold(), user.role);
            Ok(())
        }
        None => {
            print!("{page}");
            bail!("login failed")
        }
    }
}

/// Password from the flag or environment, else read from the terminal without echo
fn resolve_password(
    password: Option<String>,
    interactive: bool,
    read: impl FnOnce() -> std::io::Result<String>,
) -> anyhow::Result<String> {
    if let Some(password) = password {
        return Ok(password);
    }
    if !interactive {
        bail!("no password given; pass --password or set CALLREVIEW_PASSWORD");
    }
    read().context("failed to read password")
}

async fn chat(app: &App, call: Option<String>, message: Option<String>) -> anyhow::Result<()> {
    if !matches!(app.start().await, AuthPhase::Authenticated(_)) {
        bail!("not signed in; run `callreview login <USERNAME>` first");
    }

    let api = &app.state().api;
    let cancel = app.child_token();
    let mut widget = ChatWidget::new(call).with_history_limit(app.state().config.chat.history_limit);
    widget.mount(api, &cancel).await;

    if let Some(message) = message {
        widget.set_input(message);
        widget.send(api, &cancel).await;
        print_reply(&widget);
        return Ok(());
    }

    print!("{widget}");
    println!("Type {} to exit, {} to show suggestions.\n", "/quit".yellow(), "/suggest".yellow());

    let mut editor = DefaultEditor::new().context("failed to initialize readline")?;
    let prompt = format!("{}> ", "you".cyan());
    loop {
        match tokio::task::block_in_place(|| editor.readline(&prompt)) {
            Ok(line) => {
                let trimmed = line.trim();
                match trimmed {
                    "/quit" | "/exit" => break,
                    "/toggle" => {
                        widget.toggle();
                        print!("{widget}");
                        continue;
                    }
                    "" => continue,
                    _ => {}
                }

                let _ = editor.add_history_entry(&line);

                if let Some(rest) = trimmed.strip_prefix("/suggest") {
                    match rest.trim().parse::<usize>() {
                        Ok(n) if n >= 1 => widget.use_suggestion(n - 1),
                        _ => {
                            for (i, question) in widget.suggested_questions().iter().enumerate() {
                                println!("  {}. {question}", i + 1);
                            }
                            continue;
                        }
                    }
                } else {
                    widget.set_input(trimmed);
                }

                if widget.send(api, &cancel).await {
                    print_reply(&widget);
                }
            }
            Err(ReadlineError::Interrupted | ReadlineError::Eof) => break,
            Err(e) => {
                eprintln!("{}: {e}", "error".red());
                break;
            }
        }
    }
    Ok(())
}

fn print_reply(widget: &ChatWidget) {
    if let Some(reply) = widget
        .messages()
        .last()
        .filter(|m| m.role == ChatRole::Assistant)
    {
        println!("{} {}", "Coach:".green(), reply.content);
    }
}

async fn export(app: &App, rep: Option<String>, out: PathBuf) -> anyhow::Result<()> {
    app.start().await;
    let mut mounted = app.open(Route::Dashboard).await;
    let cancel = mounted.cancel_token().clone();

    let Screen::ManagerDashboard(page) = mounted.screen_mut() else {
        bail!("export is only available on the manager dashboard");
    };
    if let Some(error) = page.error() {
        bail!("{error}");
    }
    if rep.is_some() {
        page.select_rep(rep, &app.state().api, &cancel).await;
    }

    let path = page.export_report(Utc::now()).write_to(&out).await?;
    println!("Report written to {}", path.display());
    Ok(())
}

async fn ingest(app: &App, file: PathBuf) -> anyhow::Result<()> {
    let text = tokio::fs::read_to_string(&file)
        .await
        .with_context(|| format!("failed to read {}", file.display()))?;
    let submission: CallAnalysisSubmission =
        serde_json::from_str(&text).with_context(|| format!("invalid submission in {}", file.display()))?;

    let receipt = app
        .state()
        .api
        .submit_call_analysis(&submission, &app.child_token())
        .await?;
    info!("Submitted call {} as {}", submission.call_id, receipt.id);
    println!("{} -> {}", receipt.message, Route::CallDetail(receipt.id));
    Ok(())
}
