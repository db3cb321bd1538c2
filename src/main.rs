use clap::Parser;
use fauna_harvest::CategoryReport;
use std::process::ExitCode;

mod args;
use args::Args;

#[tokio::main]
async fn main() -> ExitCode {
    // Proxy credentials and WEBDRIVER_URL may live in a .env file
    let _ = dotenvy::dotenv();

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();
    let harvest = match args.into_harvest() {
        Ok(harvest) => harvest,
        Err(e) => {
            ::log::error!("Invalid configuration: {}", e);
            return ExitCode::FAILURE;
        }
    };

    println!("Note: harvesting requires a WebDriver server (e.g., ChromeDriver).");
    println!(
        "Set WEBDRIVER_URL if not using {}",
        harvest.config().webdriver_url
    );

    let start_time = std::time::Instant::now();
    let reports = match harvest.run().await {
        Ok(reports) => reports,
        Err(e) => {
            ::log::error!("Harvest failed: {}", e);
            return ExitCode::FAILURE;
        }
    };

    for report in &reports {
        print_summary(report);
    }
    ::log::info!(
        "Harvest complete - {} categories in {:.2} seconds",
        reports.len(),
        start_time.elapsed().as_secs_f64()
    );

    ExitCode::SUCCESS
}

fn print_summary(report: &CategoryReport) {
    match (&report.fetch, &report.error) {
        (_, Some(error)) => println!("{}: skipped ({})", report.category, error),
        (Some(fetch), None) => println!(
            "{}: {} found, {} saved, {} failed -> {}",
            report.category,
            report.discovered,
            fetch.saved_count(),
            fetch.failed_count(),
            fetch.directory.display()
        ),
        (None, None) => println!("{}: no images found", report.category),
    }
}
