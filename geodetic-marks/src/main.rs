use std::process::ExitCode;

use geodetic_marks::gdb::{DatabaseConfig, HttpSource, HttpSourceConfig, SourceError};
use geodetic_marks::images::{ImageFormat, MarkImage};
use geodetic_marks::{CacheMode, FileCacheConfig, MarkFetcher};
use tracing_subscriber::EnvFilter;

fn main() -> ExitCode {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("geodetic_marks=info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    if args.is_empty() {
        eprintln!("Usage: geodetic-marks <CODE | ID:number | image filename>...");
        eprintln!();
        eprintln!("Environment:");
        eprintln!("  GDB_URL                 mark service URL template with {{code}}");
        eprintln!("  GDB_CACHE_FILE          persistent cache file");
        eprintln!("  GDB_CACHE_EXPIRY_HOURS  persistent cache expiry (default 6)");
        eprintln!("  GDB_DB_HOST, GDB_DB_NAME, GDB_DB_USER, GDB_DB_PASSWORD");
        eprintln!("                          read marks from the database instead");
        return ExitCode::from(2);
    }

    let mut fetcher = match build_fetcher() {
        Ok(fetcher) => fetcher,
        Err(e) => {
            eprintln!("Error: {e}");
            return ExitCode::FAILURE;
        }
    };

    let mut failed = false;
    for arg in &args {
        let output = if looks_like_image(arg) {
            describe_image(arg)
        } else {
            fetcher
                .get(arg, CacheMode::Memory)
                .map_err(|e| e.to_string())
                .and_then(|record| {
                    serde_json::to_string_pretty(record.as_map()).map_err(|e| e.to_string())
                })
        };

        match output {
            Ok(text) => println!("{text}"),
            Err(e) => {
                eprintln!("Error: {e}");
                failed = true;
            }
        }
    }

    if failed {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    }
}

fn build_fetcher() -> Result<MarkFetcher, SourceError> {
    let mut http_config = HttpSourceConfig::new();
    if let Ok(url) = std::env::var("GDB_URL") {
        http_config = http_config.with_url_template(url);
    }
    let mut fetcher = MarkFetcher::with_source(Box::new(HttpSource::new(http_config)?));

    if let Ok(path) = std::env::var("GDB_CACHE_FILE") {
        let mut cache_config = FileCacheConfig::new(path);
        if let Some(hours) = env_parse::<u64>("GDB_CACHE_EXPIRY_HOURS") {
            cache_config = cache_config.with_expiry_hours(hours);
        }
        fetcher.set_cached(cache_config);
    }

    let host = std::env::var("GDB_DB_HOST").ok();
    let database = std::env::var("GDB_DB_NAME").ok();
    if host.is_some() || database.is_some() {
        let mut db_config = DatabaseConfig::new();
        if let Some(host) = host {
            db_config = db_config.with_host(host);
        }
        if let Some(database) = database {
            db_config = db_config.with_database(database);
        }
        if let Ok(user) = std::env::var("GDB_DB_USER") {
            db_config = db_config.with_user(user);
        }
        if let Ok(password) = std::env::var("GDB_DB_PASSWORD") {
            db_config = db_config.with_password(password);
        }
        fetcher.set_database(&db_config)?;
    }

    Ok(fetcher)
}

fn env_parse<T: std::str::FromStr>(name: &str) -> Option<T> {
    let value = std::env::var(name).ok()?;
    match value.parse() {
        Ok(parsed) => Some(parsed),
        Err(_) => {
            eprintln!("Warning: ignoring invalid {name}={value}");
            None
        }
    }
}

fn looks_like_image(arg: &str) -> bool {
    arg.rsplit_once('.')
        .is_some_and(|(_, ext)| ImageFormat::from_extension(ext).is_some())
}

fn describe_image(filename: &str) -> Result<String, String> {
    let image = MarkImage::parse(filename).map_err(|e| e.to_string())?;
    let mut json = serde_json::to_value(&image).map_err(|e| e.to_string())?;
    json["path"] = serde_json::Value::String(image.path());
    serde_json::to_string_pretty(&json).map_err(|e| e.to_string())
}
