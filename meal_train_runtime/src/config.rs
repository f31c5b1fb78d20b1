use std::path::PathBuf;

use clap::{Parser, Subcommand};

use meal_train_kernel::EntityId;

/// Command-line configuration for the `meal-train` binary.
///
/// Every global option can also be supplied through the environment (or a
/// `.env` file in the working directory).
#[derive(Parser, Debug, Clone)]
#[command(
    name = "meal-train",
    version,
    about = "Create meal trains and manage who joins them"
)]
pub struct Cli {
    /// Directory holding the persisted blob file.
    ///
    /// Environment variable: `MEAL_TRAIN_DATA_DIR`
    #[arg(long, env = "MEAL_TRAIN_DATA_DIR", default_value = "meal-train-data")]
    pub data_dir: PathBuf,

    /// Act as this user for one invocation instead of the logged-in one.
    ///
    /// Environment variable: `MEAL_TRAIN_USER`
    #[arg(long, env = "MEAL_TRAIN_USER")]
    pub user: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Remember a username for later commands.
    Login { username: String },
    /// Forget the remembered username.
    Logout,
    /// Print the acting username.
    Whoami,
    /// Create a meal train owned by the acting user.
    Create {
        #[arg(long)]
        name: String,
        /// One ingredient; repeat the flag for more. Blank values are ignored.
        #[arg(long = "ingredient", value_name = "INGREDIENT")]
        ingredients: Vec<String>,
    },
    /// Ask to join someone else's meal train.
    Join { meal_id: EntityId },
    /// Approve a pending request on one of your meal trains.
    Approve { request_id: EntityId },
    /// Reject a pending request on one of your meal trains.
    Reject { request_id: EntityId },
    /// Meal trains created by others, with your join status.
    Available,
    /// Meal trains you created.
    Mine,
    /// Pending requests on your meal trains.
    Requests,
}
