use anyhow::{Context, Result};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;

use seed_photos::{
    corpus, logging, Config, DiskStore, ImageFetcher, ImageResolver, OverrideTable, Pipeline,
    UpdateEmitter, UreqTransport,
};

/// Command line overrides on top of the config file.
#[derive(Debug, Default)]
struct CliArgs {
    config_path: Option<PathBuf>,
    corpus_dir: Option<PathBuf>,
    upload_dir: Option<PathBuf>,
    output: Option<PathBuf>,
    delay_ms: Option<u64>,
    write_config: Option<PathBuf>,
}

impl CliArgs {
    fn apply(&self, config: &mut Config) {
        if let Some(dir) = &self.corpus_dir {
            config.corpus_dir = dir.clone();
        }
        if let Some(dir) = &self.upload_dir {
            config.upload_dir = dir.clone();
        }
        if let Some(path) = &self.output {
            config.output_sql = path.clone();
        }
        if let Some(delay) = self.delay_ms {
            config.pipeline.delay_ms = delay;
        }
    }
}

fn parse_args() -> CliArgs {
    let args: Vec<String> = std::env::args().collect();
    let mut cli = CliArgs::default();

    let mut i = 1;
    while i < args.len() {
        let flag = args[i].as_str();
        match flag {
            "--help" | "-h" => {
                print_help();
                std::process::exit(0);
            }
            "--version" | "-V" => {
                println!("seed-photos {}", env!("CARGO_PKG_VERSION"));
                std::process::exit(0);
            }
            "--config" | "-c" | "--corpus-dir" | "--upload-dir" | "--output" | "-o"
            | "--delay-ms" | "--write-config" => {
                let Some(value) = args.get(i + 1) else {
                    eprintln!("Error: {} requires an argument", flag);
                    std::process::exit(1);
                };
                match flag {
                    "--config" | "-c" => cli.config_path = Some(PathBuf::from(value)),
                    "--corpus-dir" => cli.corpus_dir = Some(PathBuf::from(value)),
                    "--upload-dir" => cli.upload_dir = Some(PathBuf::from(value)),
                    "--output" | "-o" => cli.output = Some(PathBuf::from(value)),
                    "--write-config" => cli.write_config = Some(PathBuf::from(value)),
                    _ => match value.parse() {
                        Ok(delay) => cli.delay_ms = Some(delay),
                        Err(_) => {
                            eprintln!("Error: --delay-ms expects milliseconds, got '{}'", value);
                            std::process::exit(1);
                        }
                    },
                }
                i += 1;
            }
            _ => {
                eprintln!("Unknown argument: {}", flag);
                print_help();
                std::process::exit(1);
            }
        }
        i += 1;
    }

    cli
}

fn print_help() {
    println!(
        r#"seed-photos - fetch encyclopedia photos for the persons seed data

USAGE:
    seed-photos [OPTIONS]

OPTIONS:
    --config, -c PATH       Path to config file
    --corpus-dir PATH       Directory with the seed *.sql files (default: init-db)
    --upload-dir PATH       Where photos are stored (default: backend/uploads/seed)
    --output, -o PATH       Generated UPDATE file (default: init-db/05-photo-updates.sql)
    --delay-ms N            Pause between looked-up persons (default: 500)
    --write-config PATH     Write the effective config to PATH and exit
    --version, -V           Show version
    --help, -h              Show this help message

ENVIRONMENT:
    SEED_PHOTOS_CONFIG      Path to config file (overrides default location)
    SEED_PHOTOS_LOG         Log filter (trace, debug, info, warn, error)

Config file location: $XDG_CONFIG_HOME/seed-photos/config.toml

Photos already present in the upload directory are kept and not downloaded
again, so the command can be re-run after an interruption."#
    );
}

fn main() -> Result<()> {
    let cli = parse_args();

    let mut config = match &cli.config_path {
        Some(path) => Config::load_from(path)?,
        None => Config::load()?,
    };
    cli.apply(&mut config);

    if let Some(path) = &cli.write_config {
        config.save_to(path)?;
        println!("Wrote {}", path.display());
        return Ok(());
    }

    logging::init(&config.logging)?;

    let persons = corpus::extract_persons(&config.corpus_dir, &config.excluded_corpora())
        .context("Cannot read input corpora")?;
    info!("Found {} persons in {}", persons.len(), config.corpus_dir.display());

    let store = DiskStore::new(&config.upload_dir);
    store
        .ensure_dir()
        .with_context(|| format!("Failed to create {}", config.upload_dir.display()))?;

    let transport = Arc::new(UreqTransport::new(&config.resolver.user_agent));
    let overrides = OverrideTable::from_config(&config.resolver);
    info!("{} curated name overrides loaded", overrides.len());

    let resolver = ImageResolver::new(transport.clone(), &config.resolver, overrides);
    let fetcher = ImageFetcher::new(transport, Arc::new(store), &config.fetcher);
    let pipeline = Pipeline::from_config(resolver, fetcher, &config);

    let mut emitter = UpdateEmitter::new(&config.output);
    let summary = pipeline.run(&persons, &mut emitter);

    if emitter.write_artifact(&config.output_sql)? {
        info!(
            "Generated {} with {} UPDATE statements",
            config.output_sql.display(),
            emitter.len()
        );
    } else {
        info!("No photos available, {} not written", config.output_sql.display());
    }

    println!("{}", summary);
    Ok(())
}
