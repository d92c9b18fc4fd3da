mod nav;
mod services;
mod state;

use std::sync::Arc;

use tokio::io::{AsyncBufReadExt, BufReader};

use nav::guard::{self, Decision};
use nav::resolver;
use nav::routes;
use services::session::SessionManager;
use services::store::FileStore;
use services::verifier::{HttpVerifier, VerifierConfig};
use state::AppState;

const DEFAULT_SESSION_FILE: &str = "gradeboard-session.json";

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt::init();

    let session_file =
        std::env::var("SESSION_FILE").unwrap_or_else(|_| DEFAULT_SESSION_FILE.into());
    let store = FileStore::new(session_file);

    let config = VerifierConfig::from_env().expect("VERIFIER_URL required");
    let verifier = HttpVerifier::new(config).expect("verifier client build failed");

    let session = Arc::new(SessionManager::new(Arc::new(store), Arc::new(verifier)));
    let app = AppState::new(session);

    // Print notices the way the UI toast layer would.
    let mut notices = app.session.notices();
    tokio::spawn(async move {
        while let Ok(notice) = notices.recv().await {
            println!("[{}] {}", notice.level, notice.message);
        }
    });

    app.session.restore();
    print_decision(routes::ROOT, resolver::dispatch_root(&app.session.snapshot()));

    println!("enter a PIN to sign in; commands: go <path>, whoami, logout, quit");
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Ok(Some(line)) = lines.next_line().await {
        let line = line.trim();
        if let Some(("go", path)) = line.split_once(' ') {
            let path = path.trim();
            print_decision(path, guard::evaluate_path(&app.session.snapshot(), path));
            continue;
        }
        match line {
            "" => {}
            "quit" => break,
            "logout" => app.session.logout(),
            "whoami" => match app.session.snapshot().user {
                Some(user) => println!("{} ({})", user.name, user.role),
                None => println!("signed out"),
            },
            pin => {
                if app.session.login(pin).await.is_ok() {
                    print_decision(routes::ROOT, resolver::dispatch_root(&app.session.snapshot()));
                }
            }
        }
    }
}

fn print_decision(path: &str, decision: Decision) {
    match decision {
        Decision::Wait => println!("{path}: waiting on session"),
        Decision::Redirect(to) => println!("{path}: redirect -> {to}"),
        Decision::Allow => println!("{path}: allowed"),
    }
}
