//! `meal-train` command-line entry point.
//!
//! Each invocation opens the session, runs one command, and exits.
//! Listing commands print JSON on stdout.

use anyhow::Context;
use clap::Parser;
use serde::Serialize;

use meal_train_runtime::blob_store::FileBlobStore;
use meal_train_runtime::config::{Cli, Command};
use meal_train_runtime::session::Session;
use meal_train_runtime::telemetry::init_tracing;

fn main() -> anyhow::Result<()> {
    let _ = dotenvy::dotenv();
    let cli = Cli::parse();
    init_tracing();

    let blobs = FileBlobStore::open(&cli.data_dir)
        .with_context(|| format!("opening data dir {}", cli.data_dir.display()))?;
    let mut session = Session::open(blobs);
    if let Some(user) = &cli.user {
        session.act_as(user);
    }

    match cli.command {
        Command::Login { username } => {
            session.login(&username)?;
            println!("Logged in as {}", username.trim());
        }
        Command::Logout => session.logout()?,
        Command::Whoami => match session.current_user() {
            Some(user) => println!("{user}"),
            None => println!("Not logged in"),
        },
        Command::Create { name, ingredients } => {
            let ingredients = ingredients.join("\n");
            print_json(&session.create_meal_train(&name, &ingredients)?)?;
        }
        Command::Join { meal_id } => print_json(&session.request_to_join(meal_id)?)?,
        Command::Approve { request_id } => print_json(&session.approve_request(request_id)?)?,
        Command::Reject { request_id } => print_json(&session.reject_request(request_id)?)?,
        Command::Available => print_json(&session.available_meals()?)?,
        Command::Mine => print_json(&session.own_meals()?)?,
        Command::Requests => print_json(&session.pending_requests()?)?,
    }
    Ok(())
}

fn print_json<T: Serialize + ?Sized>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
