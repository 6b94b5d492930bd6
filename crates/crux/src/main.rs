mod commands;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "crux",
    version,
    about = "A minimal cross-platform window abstraction"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create the default configuration file
    Init,
    /// Show the target platform and whether windows are supported
    Platform,
    /// Create a window and print its properties
    Create(commands::create::CreateArgs),
}

fn main() {
    let cli = Cli::parse();

    match cli.command {
        Commands::Init => commands::init::execute(),
        Commands::Platform => commands::platform::execute(),
        Commands::Create(args) => commands::create::execute(&args),
    }
}
