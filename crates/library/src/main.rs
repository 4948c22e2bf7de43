use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Args, Parser, Subcommand};
use library::repository::SqliteRepository;
use library::{Backend, Book, Config, Error, LogFormat, docs, server, telemetry};

/// Book CRUD REST API with generated OpenAPI documentation
#[derive(Debug, Parser)]
#[command(name = "library", version, about, args_conflicts_with_subcommands = true)]
struct Cli {
    /// TOML configuration file
    #[arg(long, short, global = true, env = "LIBRARY_CONFIG")]
    config: Option<PathBuf>,

    #[command(flatten)]
    log: LogArgs,

    /// Server options when no subcommand is given
    #[command(flatten)]
    serve: ServeArgs,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Run the HTTP server (default)
    Serve(ServeArgs),

    /// Print the OpenAPI document
    Openapi {
        /// Write to a file instead of stdout
        #[arg(long, short)]
        output: Option<PathBuf>,
    },

    /// Create the database tables
    Migrate {
        /// SQLite URL, overriding the configuration
        #[arg(long, env = "LIBRARY_DATABASE_URL")]
        database_url: Option<String>,
    },
}

#[derive(Debug, Default, Args)]
struct ServeArgs {
    #[arg(long, env = "LIBRARY_HOST")]
    host: Option<String>,

    #[arg(long, env = "LIBRARY_PORT")]
    port: Option<u16>,

    /// SQLite URL; storage stays in memory when unset
    #[arg(long, env = "LIBRARY_DATABASE_URL")]
    database_url: Option<String>,
}

#[derive(Debug, Default, Args)]
struct LogArgs {
    /// `EnvFilter` directives
    #[arg(long, global = true, env = "LIBRARY_LOG")]
    log_filter: Option<String>,

    /// `pretty` or `json`
    #[arg(long, global = true, env = "LIBRARY_LOG_FORMAT")]
    log_format: Option<LogFormat>,
}

impl ServeArgs {
    fn apply(self, config: &mut Config) {
        if let Some(host) = self.host {
            config.server.host = host;
        }
        if let Some(port) = self.port {
            config.server.port = port;
        }
        if let Some(url) = self.database_url {
            config.database.use_sqlite(url);
        }
    }
}

impl LogArgs {
    fn apply(self, config: &mut Config) {
        if let Some(filter) = self.log_filter {
            config.log.filter = filter;
        }
        if let Some(format) = self.log_format {
            config.log.format = format;
        }
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    match run(Cli::parse()).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(error) => {
            eprintln!("error: {error}");
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<(), Error> {
    let mut config = Config::load(cli.config.as_deref())?;
    cli.log.apply(&mut config);

    match cli.command.unwrap_or(Command::Serve(cli.serve)) {
        Command::Serve(args) => {
            args.apply(&mut config);
            config.validate()?;

            telemetry::init(&config.log)?;
            server::serve(config).await
        }
        Command::Openapi { output } => {
            config.validate()?;
            let document = docs::openapi_document(&config.docs, &server::resources()?)?;
            let text = serde_json::to_string_pretty(&document)?;
            match output {
                Some(path) => std::fs::write(path, text + "\n")?,
                None => println!("{text}"),
            }
            Ok(())
        }
        Command::Migrate { database_url } => {
            if let Some(url) = database_url {
                config.database.use_sqlite(url);
            }
            config.validate()?;
            telemetry::init(&config.log)?;

            match (config.database.backend, config.database.url.as_deref()) {
                (Backend::Sqlite, Some(url)) => {
                    let repository =
                        SqliteRepository::<Book>::connect(url, config.database.max_connections)
                            .await?;
                    repository.migrate().await?;
                    tracing::info!(%url, "migrations applied");
                }
                _ => tracing::warn!("in-memory storage needs no migration"),
            }
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_flat_variables_are_declared() {
        let command = Cli::command();
        let env_of = |id: &str| {
            command
                .get_arguments()
                .find(|arg| arg.get_id() == id)
                .and_then(|arg| arg.get_env())
                .and_then(|env| env.to_str())
                .map(str::to_string)
        };

        assert_eq!(env_of("host").as_deref(), Some("LIBRARY_HOST"));
        assert_eq!(env_of("port").as_deref(), Some("LIBRARY_PORT"));
        assert_eq!(env_of("database_url").as_deref(), Some("LIBRARY_DATABASE_URL"));
        assert_eq!(env_of("log_filter").as_deref(), Some("LIBRARY_LOG"));
        assert_eq!(env_of("log_format").as_deref(), Some("LIBRARY_LOG_FORMAT"));
        Cli::command().debug_assert();
    }

    #[test]
    fn test_flags_override_config() {
        let cli = Cli::try_parse_from([
            "library",
            "--port",
            "8081",
            "--database-url",
            "sqlite::memory:",
            "--log-format",
            "json",
        ])
        .unwrap();
        assert!(cli.command.is_none());

        let mut config = Config::default();
        cli.log.apply(&mut config);
        cli.serve.apply(&mut config);

        assert_eq!(config.server.address(), "127.0.0.1:8081");
        assert_eq!(config.database.backend, Backend::Sqlite);
        assert_eq!(config.log.format, LogFormat::Json);
    }

    #[test]
    fn test_bad_flag_values_are_rejected() {
        assert!(Cli::try_parse_from(["library", "--port", "eighty"]).is_err());
        assert!(Cli::try_parse_from(["library", "--log-format", "xml"]).is_err());
    }
}
