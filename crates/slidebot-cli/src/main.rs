mod chrome;
mod console;
mod options;
mod setup;
mod simulate;

use anyhow::Result;
use chrome::{ChromePage, LaunchSettings};
use clap::Parser;
use console::ConsoleSink;
use options::Cli;
use simulate::SimulatedPage;
use slidebot_core::{Autoplay, AutoplayError, ErrorCategory, FrameSink, PageDriver, RunReport};
use std::process::ExitCode;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

fn main() -> ExitCode {
    init_tracing();
    let cli = Cli::parse();

    match run(&cli) {
        Ok(report) => {
            println!(
                "{:?} after {} moves: score {}, {} rotations, {} escapes, final order {}",
                report.reason,
                report.steps,
                report.final_score,
                report.rotations,
                report.escapes,
                slidebot_core::format_order(&report.final_order),
            );
            ExitCode::SUCCESS
        }
        Err(err) => {
            let category = err
                .downcast_ref::<AutoplayError>()
                .map(AutoplayError::category)
                .unwrap_or(ErrorCategory::Unexpected);
            error!(%category, "run failed");
            eprintln!("{}: {:#}", category, err);
            ExitCode::FAILURE
        }
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .compact()
        .init();
}

fn run(cli: &Cli) -> Result<RunReport> {
    let config = cli.run_config()?;
    config.validate()?;
    let mut sink = ConsoleSink::create(cli.frames_dir().as_deref(), !cli.quiet)?;
    sink.publish_log(&[format!("Loading: {}", config.url)]);

    let page: Box<dyn PageDriver> = if cli.simulate {
        info!(seed = cli.seed, "playing a simulated board");
        Box::new(SimulatedPage::new(cli.seed, config.selectors.clone()))
    } else {
        Box::new(open_page(cli, &config.url).map_err(|e| reported(&mut sink, e))?)
    };

    let report = {
        let mut autoplay = Autoplay::new(config, page, &mut sink)?;
        autoplay.run()?
    };
    info!(frames = sink.frame_count(), "frames captured");
    Ok(report)
}

/// Setup and launch, before the loop takes over the page
fn open_page(cli: &Cli, url: &str) -> Result<ChromePage, AutoplayError> {
    let executable = setup::locate_browser(cli.chrome.as_deref())?;
    let mut settings = LaunchSettings::new(executable);
    settings.headless = !cli.headful;
    Ok(ChromePage::launch(&settings, url)?)
}

fn reported(sink: &mut ConsoleSink, err: AutoplayError) -> AutoplayError {
    sink.report_error(err.category(), &err.to_string());
    err
}
