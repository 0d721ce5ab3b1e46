//! Sign-up form demo: a burst of username edits, of which only the last
//! one's verdict survives, followed by a full validation pass.

use std::error::Error;
use std::sync::Arc;
use std::time::Duration;

use email_address::EmailAddress;
use futures::future::join_all;
use log::info;
use regex::Regex;
use simplelog::{ColorChoice, Config, LevelFilter, TermLogger, TerminalMode};
use validity::prelude::*;

const TAKEN: &[&str] = &["admin", "root", "alice"];

struct SignupForm {
    surface: ValidationSurface,
    username: Property<String>,
    email: Property<String>,
}

impl SignupForm {
    fn new(surface: ValidationSurface) -> Result<Self, Box<dyn Error>> {
        let form = Self {
            username: surface.property("username", String::new())?,
            email: surface.property("email", String::new())?,
            surface,
        };
        form.register_validators()?;
        Ok(form)
    }

    fn register_validators(&self) -> Result<(), regex::Error> {
        let pattern = Regex::new(r"^[a-z][a-z0-9_]*$")?;
        let username = self.username.clone();
        self.surface.register_validator(
            self.username.name(),
            Validator::new(move || {
                let value = username.get();
                let pattern = pattern.clone();
                async move {
                    if value.trim().is_empty() {
                        return vec!["Username is required".to_string()];
                    }

                    let mut errors = Vec::new();
                    let len = value.chars().count();
                    if !(3..=16).contains(&len) {
                        errors.push(format!("Username must be 3 to 16 characters, got {}", len));
                    }
                    if !pattern.is_match(&value) {
                        errors.push(
                            "Username may only contain lowercase letters, digits and '_'"
                                .to_string(),
                        );
                    }
                    if errors.is_empty() && !is_available(&value).await {
                        errors.push(format!("Username '{}' is already taken", value));
                    }
                    errors
                }
            }),
        );

        let email = self.email.clone();
        self.surface.register_validator(
            self.email.name(),
            Validator::blocking(move || {
                let value = email.get();
                if value.trim().is_empty() {
                    vec!["Email is required".to_string()]
                } else if !EmailAddress::is_valid(&value) {
                    vec![format!("'{}' is not a valid email address", value)]
                } else {
                    vec![]
                }
            }),
        );

        Ok(())
    }

    fn report(&self, title: &str) {
        println!("== {}", title);
        println!("  username = {:?}", self.username.get());
        println!("  email    = {:?}", self.email.get());
        for error in self.surface.errors() {
            println!("  error: {}", error);
        }
        println!("  is_valid = {}", self.surface.is_valid());
    }
}

/// Pretend lookup against a remote user directory. Shorter names take
/// longer so early keystrokes finish after later ones.
async fn is_available(name: &str) -> bool {
    let latency = 400u64.saturating_sub(40 * name.len() as u64);
    tokio::time::sleep(Duration::from_millis(latency)).await;
    !TAKEN.contains(&name)
}

fn init_logging() {
    let level = std::env::var("VALIDITY_LOG")
        .ok()
        .and_then(|level| level.parse().ok())
        .unwrap_or(LevelFilter::Info);

    if let Err(e) = TermLogger::init(
        level,
        Config::default(),
        TerminalMode::Mixed,
        ColorChoice::Auto,
    ) {
        eprintln!("Failed to initialize logger: {}", e);
    }
}

async fn run() -> Result<(), Box<dyn Error>> {
    let config = ValidationConfig::new().with_distinct_errors(true);
    let dispatcher = ChannelDispatcher::from_config(&config)?;
    let surface = ValidationSurface::with_config(
        Arc::new(TokioExecutor::current()?),
        Arc::new(dispatcher.clone()),
        config,
    );
    let form = SignupForm::new(surface)?;

    form.surface.subscribe(|event| match event {
        ValidationEvent::IsValidatingChanged(busy) => info!("is_validating -> {}", busy),
        ValidationEvent::IsValidChanged(valid) => info!("is_valid -> {}", valid),
        ValidationEvent::ErrorsChanged { field } => info!("errors changed for '{}'", field),
        ValidationEvent::FieldChanged { field } => info!("'{}' edited", field),
    });

    let mut runs = Vec::new();
    for draft in ["a", "al", "ali", "alic", "alice", "alice_w"] {
        runs.extend(form.username.set(draft.to_string()));
    }
    runs.extend(form.email.set("alice.example.com".to_string()));
    join_all(runs).await;
    dispatcher.flush().await;
    form.report("after typing");

    if let Some(run) = form.email.set("alice@example.com".to_string()) {
        run.await;
    }
    join_all(form.surface.validate_all()).await;
    dispatcher.flush().await;
    form.report("after fixing the email");

    Ok(())
}

#[tokio::main]
async fn main() {
    init_logging();

    if let Err(e) = run().await {
        eprintln!("Error: {}", e);
    }
}
