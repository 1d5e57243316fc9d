use customer_directory::config::{self, Config};
use customer_directory::core::db::{self, ConnectionOptions, IN_MEMORY};
use customer_directory::demo::{self, DemoOptions};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::{error, info};

const USAGE: &str = "Usage: customer-directory [DB_PATH] [--config FILE] [--dump]";

/// Parsed command line arguments
#[derive(Debug, Default, PartialEq)]
struct Args {
    db_path: Option<String>,
    config_path: Option<PathBuf>,
    dump_tables: bool,
}

fn parse_args(args: &[String]) -> Result<Args, String> {
    let mut parsed = Args::default();
    let mut iter = args.iter();
    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "--config" => {
                let path = iter.next().ok_or("--config requires a file path")?;
                parsed.config_path = Some(PathBuf::from(path));
            }
            "--dump" => parsed.dump_tables = true,
            flag if flag.starts_with("--") => return Err(format!("Unknown option: {}", flag)),
            path if parsed.db_path.is_none() => parsed.db_path = Some(path.to_string()),
            extra => return Err(format!("Unexpected argument: {}", extra)),
        }
    }
    Ok(parsed)
}

fn main() -> ExitCode {
    // Initialize the logging system using tracing subscriber
    tracing_subscriber::fmt().with_writer(std::io::stderr).init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let args = match parse_args(&args) {
        Ok(args) => args,
        Err(e) => {
            eprintln!("{}\n{}", e, USAGE);
            return ExitCode::from(2);
        }
    };

    let config: Config = match config::load_or_default(args.config_path.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Failed to load configuration: {}", e);
            return ExitCode::FAILURE;
        }
    };

    let db_path = args
        .db_path
        .or_else(|| config.database.path.clone())
        .unwrap_or_else(|| IN_MEMORY.to_string());
    info!("Starting customer directory walkthrough on {}", db_path);

    let options = DemoOptions {
        policy: config.directory.validation,
        dump_tables: args.dump_tables,
    };
    let result = db::with_connection(&db_path, &ConnectionOptions::from(&config.database), |conn| {
        Ok(demo::run(conn, options))
    });

    match result {
        Ok(lines) => {
            for line in lines {
                println!("{}", line);
            }
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!("Walkthrough failed: {}", e);
            eprintln!("Failed to open database {}: {}", db_path, e);
            ExitCode::FAILURE
        }
    }
}
