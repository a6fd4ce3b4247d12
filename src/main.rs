mod cli;

use vidbatch::{
    batch::{self, BatchConverter, BatchReport, Conversion},
    config,
    listing::FsListing,
    notify::{ConsoleNotifier, Notifier},
    picker::{DirectoryPicker, FixedPicker, PromptPicker},
};
use vidbatch_av::FfmpegSession;

use anyhow::{Context, Result};
use clap::Parser;
use cli::{Cli, Commands};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

fn main() -> Result<ExitCode> {
    let cli = Cli::parse();

    // Initialize logging
    // Respect RUST_LOG env var if set, otherwise use defaults based on verbose flag
    let env_filter = std::env::var("RUST_LOG").unwrap_or_else(|_| {
        if cli.verbose {
            "vidbatch=debug,vidbatch_av=debug".to_string()
        } else {
            "vidbatch=info,vidbatch_av=info".to_string()
        }
    });

    tracing_subscriber::fmt()
        .with_env_filter(&env_filter)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Run {
            dir,
            dry_run,
            json,
            sorted,
        } => run_batch(cli.config.as_deref(), dir, dry_run, json, sorted),
        Commands::CheckTools => check_tools(cli.config.as_deref()).map(|()| ExitCode::SUCCESS),
        Commands::Validate {
            config: config_path,
        } => {
            let path = config_path.or(cli.config);
            validate_config(path.as_deref()).map(|()| ExitCode::SUCCESS)
        }
        Commands::ShowConfig => show_config(cli.config.as_deref()).map(|()| ExitCode::SUCCESS),
    }
}

fn run_batch(
    config_path: Option<&Path>,
    dir: Option<PathBuf>,
    dry_run: bool,
    json: bool,
    sorted: bool,
) -> Result<ExitCode> {
    let config = config::load_config_or_default(config_path)?;
    let conversion = Conversion::from_config(&config)?;

    let notifier = ConsoleNotifier::new().info_to_stderr(json);
    let listing = FsListing::new().sorted(sorted);

    let picker: Box<dyn DirectoryPicker> = match dir {
        Some(path) => Box::new(FixedPicker::new(path)),
        None => {
            notifier.info("Please select the video directory by selecting a file in it.");
            Box::new(PromptPicker::default())
        }
    };
    let dir = match picker.pick() {
        Ok(dir) => dir,
        Err(e) => {
            notifier.error(&e.to_string());
            return Ok(ExitCode::FAILURE);
        }
    };

    let report = if dry_run {
        match batch::plan(&dir, &conversion, &listing) {
            Ok(report) => {
                print_plan(&report, &notifier);
                report
            }
            Err(e) => {
                notifier.error(&e.to_string());
                return Ok(ExitCode::FAILURE);
            }
        }
    } else {
        let session = FfmpegSession::discover(
            config.tools.ffmpeg_path.as_deref(),
            config.tools.ffprobe_path.as_deref(),
        )
        .context("ffmpeg and ffprobe are required (see `vidbatch check-tools`)")?;

        // Fatal batch errors have already been sent to the notifier.
        match BatchConverter::new(&conversion, session, listing, notifier).run_in(&dir) {
            Ok(report) => report,
            Err(_) => return Ok(ExitCode::FAILURE),
        }
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    }

    Ok(ExitCode::SUCCESS)
}

fn print_plan(report: &BatchReport, notifier: &ConsoleNotifier) {
    for job in &report.converted {
        notifier.info(&format!(
            "{} -> {}, {}",
            job.source,
            job.video.display(),
            job.image.display()
        ));
    }
    for failed in &report.failed {
        notifier.error(&failed.error);
    }
    notifier.info(&report.summary());
}

fn check_tools(config_path: Option<&Path>) -> Result<()> {
    let config = config::load_config_or_default(config_path)?;

    println!("Checking external tools...\n");

    let tools = vidbatch_av::check_tools(
        config.tools.ffmpeg_path.as_deref(),
        config.tools.ffprobe_path.as_deref(),
    );
    let mut all_ok = true;

    for tool in &tools {
        let status = if tool.available {
            "✓"
        } else {
            all_ok = false;
            "✗"
        };

        print!("{} {}", status, tool.name);

        if let Some(ref version) = tool.version {
            print!(" ({})", version);
        }

        if let Some(ref path) = tool.path {
            print!(" - {}", path.display());
            if tool.configured {
                print!(" (configured)");
            }
        }

        println!();
    }

    println!();
    if all_ok {
        println!("All required tools are available!");
    } else {
        println!("Some tools are missing. Install ffmpeg to convert videos.");
    }

    Ok(())
}

fn validate_config(path: Option<&Path>) -> Result<()> {
    let config = match path {
        Some(p) => {
            println!("Validating config: {:?}", p);
            let config = config::load_config(p)?;
            println!("✓ Configuration is valid");
            config
        }
        None => {
            println!("No config file specified, using defaults");
            config::Config::default()
        }
    };

    let conversion = Conversion::from_config(&config)?;
    println!("  Source pattern: {}", conversion.source_pattern);
    println!(
        "  Outputs: {:?} (video), {:?} (image)",
        conversion.naming.video_suffix, conversion.naming.image_suffix
    );
    match &conversion.naming.image_rename {
        Some(rule) => println!(
            "  Image rename: {} -> {:?}",
            rule.pattern, rule.replacement
        ),
        None => println!("  Image rename: disabled"),
    }
    println!("  First frame: {}", conversion.first_frame);
    for filter in conversion.filters() {
        println!("  Filter: {}", filter);
    }
    println!("  Codec: {}", conversion.codec);
    println!("  Container: {}", conversion.container);

    Ok(())
}

fn show_config(config_path: Option<&Path>) -> Result<()> {
    let config = config::load_config_or_default(config_path)?;
    let text = toml::to_string_pretty(&config).context("Failed to serialize config")?;
    print!("{}", text);
    Ok(())
}
