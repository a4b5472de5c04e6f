use clap::Parser;

use subtext::cli::{Cli, Commands};
use subtext::commands::library::{cmd_index, cmd_library, cmd_match};
use subtext::commands::unpack::{cmd_session, cmd_unpack};
use subtext::config::{resolve_library_path, Config};
use subtext::error::Result;

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        // Library inspection and matching read the filesystem and the
        // embedding service only; no generation credentials needed
        Commands::Library { library } => cmd_library(&resolve_library_path(library), cli.verbose),
        Commands::Index { library } => cmd_index(&resolve_library_path(library), cli.verbose),
        Commands::Match {
            query,
            library,
            threshold,
        } => cmd_match(&resolve_library_path(library), &query, threshold, cli.verbose),

        Commands::Unpack {
            statement,
            library,
            provider,
            model,
            temperature,
            threshold,
        } => {
            let config = Config::load(
                provider.as_deref(),
                model,
                library,
                temperature,
                threshold,
                subtext::session::DAILY_LIMIT,
            )?;
            cmd_unpack(&config, &statement, cli.verbose)
        }

        Commands::Session {
            library,
            provider,
            model,
            temperature,
            threshold,
            daily_limit,
        } => {
            let config = Config::load(
                provider.as_deref(),
                model,
                library,
                temperature,
                threshold,
                daily_limit,
            )?;
            cmd_session(&config, cli.verbose)
        }
    }
}
