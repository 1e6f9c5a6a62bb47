use anyhow::{Result, bail};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};

use name_picker::client::{ApiClient, HttpApiClient, Session};
use name_picker::models::{Gender, NameDetails, SwipeDirection};
use name_picker::session::{IdentityState, SessionFile, SessionProvider};
use name_picker::swipe::{AdvancePolicy, Gesture, SwipeMachine, SwipeOutcome, SwipeState};
use name_picker::views::{Resolution, Route, UploadPage, pages, resolve};
use name_picker::{ClientConfig, utils};

#[derive(Parser)]
#[command(name = "picker", about = "Swipe through last names together")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Sign in as joe or sam (username or email)
    Login {
        user: String,
        #[arg(long)]
        password: Option<String>,
    },
    Logout,
    Whoami,
    /// Open a page by path, e.g. /matches
    Open { path: String },
    Swipe {
        /// Resubmit swipes that failed on a network error, up to this many attempts
        #[arg(long)]
        retries: Option<u32>,
    },
    Matches,
    Analytics,
    /// Propose a single name
    Add {
        name: String,
        #[arg(long)]
        origin: Option<String>,
        #[arg(long)]
        meaning: Option<String>,
        #[arg(long)]
        gender: Option<String>,
    },
    /// Bulk upload from a .txt file, one name per line
    Upload { file: PathBuf },
}

#[tokio::main]
async fn main() -> Result<()> {
    utils::init_logging();
    let cli = Cli::parse();

    let config = ClientConfig::from_env()?;
    let client: Arc<dyn ApiClient> = Arc::new(HttpApiClient::new(&config)?);
    let provider = SessionProvider::new(client.clone(), SessionFile::new(&config.session_file));

    let identity = match provider.restore().await {
        Ok(identity) => identity,
        Err(e) => {
            tracing::warn!("Could not restore session: {}", e);
            IdentityState::SignedOut
        }
    };

    match cli.command {
        Commands::Login { user, password } => match provider.login(&user, password.as_deref()).await {
            Ok(session) => print!("{}", pages::render_home(&session.user)),
            Err(e) => bail!("{}", e),
        },
        Commands::Logout => {
            provider.logout().await?;
            println!("Signed out");
        }
        Commands::Whoami => match identity.session() {
            Some(session) => println!("{} ({})", session.user.display_name, session.user.email),
            None => println!("Not signed in"),
        },
        Commands::Open { path } => open(&client, &identity, &path).await?,
        Commands::Swipe { retries } => {
            let policy = match retries {
                Some(max_attempts) => AdvancePolicy::Retry { max_attempts },
                None => AdvancePolicy::Skip,
            };
            run_swipe(client, require(&identity)?, policy).await?;
        }
        Commands::Matches => open(&client, &identity, Route::Matches.path()).await?,
        Commands::Analytics => open(&client, &identity, Route::Analytics.path()).await?,
        Commands::Add {
            name,
            origin,
            meaning,
            gender,
        } => {
            let session = require(&identity)?;
            let gender = gender
                .map(|g| g.parse::<Gender>())
                .transpose()
                .map_err(anyhow::Error::msg)?;
            let details = NameDetails { origin, meaning, gender };

            let mut page = UploadPage::new();
            page.add_single(client.as_ref(), &session, &name, &details).await;
            print!("{}", pages::render_upload(&page));
        }
        Commands::Upload { file } => {
            let session = require(&identity)?;
            let mut page = UploadPage::new();
            page.upload_file(client.as_ref(), &session, &file).await;
            print!("{}", pages::render_upload(&page));
        }
    }

    Ok(())
}

fn require(identity: &IdentityState) -> Result<Session> {
    match identity.session() {
        Some(session) => Ok(session.clone()),
        None => bail!("Not signed in. Run `picker login joe` or `picker login sam` first."),
    }
}

async fn open(client: &Arc<dyn ApiClient>, identity: &IdentityState, path: &str) -> Result<()> {
    let mut path = path.to_string();

    // An unknown path goes home, and home may in turn send a signed-out user to login
    for _ in 0..3 {
        match resolve(&path, identity) {
            Resolution::Placeholder => {
                print!("{}", pages::render_placeholder());
                return Ok(());
            }
            Resolution::Redirect(route) => {
                tracing::debug!("Redirecting {} to {}", path, route.path());
                path = route.path().to_string();
            }
            Resolution::Render(route) => return render_route(client, identity, route).await,
        }
    }
    bail!("Too many redirects for {}", path)
}

async fn render_route(client: &Arc<dyn ApiClient>, identity: &IdentityState, route: Route) -> Result<()> {
    let session = identity.session();

    match (route, session) {
        (Route::Login, _) => print!("{}", pages::render_login()),
        (Route::Home, Some(session)) => print!("{}", pages::render_home(&session.user)),
        (Route::Swipe, Some(session)) => {
            run_swipe(client.clone(), session.clone(), AdvancePolicy::Skip).await?;
        }
        (Route::Matches, Some(session)) => {
            let matches = match client.get_matches(session, session.user_id()).await {
                Ok(matches) => matches,
                Err(e) => {
                    tracing::error!("Failed to load matches: {}", e);
                    Vec::new()
                }
            };
            print!("{}", pages::render_matches(&matches));
        }
        (Route::Analytics, Some(session)) => {
            let analytics = client.analytics_or_default(session, session.user_id()).await;
            print!("{}", pages::render_analytics(&analytics));
        }
        (Route::Upload, Some(_)) => {
            print!("{}", pages::render_upload(&UploadPage::new()));
            println!("Use `picker add <name>` or `picker upload <file.txt>`.");
        }
        (_, None) => print!("{}", pages::render_login()),
    }
    Ok(())
}

fn parse_gesture(line: &str) -> Option<Gesture> {
    let mut parts = line.split_whitespace();
    match parts.next()? {
        "l" | "left" => Some(Gesture::Button(SwipeDirection::Left)),
        "r" | "right" => Some(Gesture::Button(SwipeDirection::Right)),
        "d" | "drag" => {
            let offset_x = parts.next()?.parse().ok()?;
            let velocity_x = parts.next().map(str::parse::<f64>).transpose().ok()?.unwrap_or(0.0);
            Some(Gesture::Drag { offset_x, velocity_x })
        }
        _ => None,
    }
}

async fn run_swipe(client: Arc<dyn ApiClient>, session: Session, policy: AdvancePolicy) -> Result<()> {
    let mut machine = SwipeMachine::new(client, session).with_policy(policy);

    let mut states = machine.subscribe();
    let celebrations = tokio::spawn(async move {
        while states.changed().await.is_ok() {
            let state = states.borrow_and_update().clone();
            if let SwipeState::Celebrating(name) = state {
                println!("\n*** IT'S A MATCH! ***\n  {}\n", name.name);
            }
        }
    });

    machine.start().await?;
    print!("{}", pages::render_swipe(&machine.state(), machine.swipe_count()));

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        let line = line.trim();
        if line == "q" || line == "quit" {
            break;
        }

        let Some(gesture) = parse_gesture(line) else {
            println!("Unknown input '{}'", line);
            continue;
        };

        match machine.swipe(gesture).await {
            Ok(SwipeOutcome::Ignored) => println!("(card snaps back)"),
            Ok(SwipeOutcome::Skipped { error }) => println!("Swipe failed, moving on: {}", error),
            Ok(SwipeOutcome::Recorded { .. }) => {}
            Err(e) => {
                eprintln!("{}", e);
                if let Err(e) = machine.refresh().await {
                    eprintln!("{}", e);
                }
            }
        }

        print!("{}", pages::render_swipe(&machine.state(), machine.swipe_count()));
        if machine.state() == SwipeState::Exhausted {
            break;
        }
    }

    drop(machine);
    if let Err(e) = celebrations.await {
        tracing::debug!("Celebration watcher stopped: {}", e);
    }
    Ok(())
}
