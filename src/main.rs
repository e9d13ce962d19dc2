use clap::{Parser, Subcommand};
use colored::Colorize;
use std::path::PathBuf;

use fluxo_tester::driver::web::{BrowserType, WebDriver, WebDriverConfig};
use fluxo_tester::parser::{classify, collect_flow_files, parse_flow, read_flow_file};
use fluxo_tester::runner::{ConsoleEventListener, Session, TestRunner};
use fluxo_tester::utils::config::{ReportFormat, RunConfig};

#[derive(Parser)]
#[command(name = "fluxo-tester")]
#[command(version = "0.1.0")]
#[command(about = "Run browser tests written as Portuguese sentences", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run flow file(s) or a directory of flows
    Run {
        /// Path to a flow file or directory
        path: PathBuf,

        /// Page to open before the first step
        #[arg(short, long)]
        url: Option<String>,

        /// YAML/JSON file with run options
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Report format (json, html)
        #[arg(short, long)]
        format: Option<ReportFormat>,

        /// Directory for reports
        #[arg(long)]
        report_dir: Option<PathBuf>,

        /// Delay after each successful step (ms)
        #[arg(long)]
        delay: Option<u64>,

        /// Skip the rest of a group after a failed step
        #[arg(long, default_value = "false")]
        stop_on_failure: bool,

        /// Leave the browser open when done
        #[arg(long, default_value = "false")]
        keep_open: bool,

        /// Run the browser without a window
        #[arg(long, default_value = "false")]
        headless: bool,

        /// Browser engine (chromium, firefox, webkit)
        #[arg(short, long, default_value = "chromium")]
        browser: BrowserType,
    },

    /// Show how a flow file is grouped and classified without running it
    Parse {
        /// Path to a flow file
        path: PathBuf,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    let cli = Cli::parse();

    match cli.command {
        Commands::Run {
            path,
            url,
            config,
            format,
            report_dir,
            delay,
            stop_on_failure,
            keep_open,
            headless,
            browser,
        } => {
            let mut run_config = match config {
                Some(ref p) => RunConfig::from_file(p)?,
                None => RunConfig::default(),
            };
            if let Some(f) = format {
                run_config.report_format = f;
            }
            if let Some(dir) = report_dir {
                run_config.report_dir = dir;
            }
            if delay.is_some() {
                run_config.step_delay_ms = delay;
            }
            run_config.stop_on_failure |= stop_on_failure;
            run_config.keep_open |= keep_open;

            let files = collect_flow_files(&path)?;
            if files.is_empty() {
                anyhow::bail!("No flow files found in {}", path.display());
            }

            println!(
                "{} Running {} flow file(s) from: {}",
                "▶".green().bold(),
                files.len(),
                path.display()
            );
            if let Some(ref u) = url {
                println!("  URL: {}", u.cyan());
            }
            println!("  Reports: {}", run_config.report_dir.display().to_string().cyan());

            let mut driver_config = WebDriverConfig {
                browser_type: browser,
                screenshot_dir: run_config.report_dir.join("screenshots"),
                ..WebDriverConfig::default()
            };
            driver_config.headless |= headless;

            let runner = TestRunner::new(run_config);
            let listener = tokio::spawn(ConsoleEventListener::listen(runner.subscribe()));

            let mut failures = 0u32;
            for file in &files {
                println!("\n{} {}", "📄".blue(), file.display());
                let flow_text = read_flow_file(file)?;

                let driver = WebDriver::new(driver_config.clone()).await?;
                let mut session = Session::new(Box::new(driver)).await;
                if let Some(ref u) = url {
                    session.start(u).await?;
                }

                let results = runner.run(&mut session, &flow_text).await?;
                failures += results.failure_count();
            }

            drop(runner);
            let _ = listener.await;

            if failures > 0 {
                std::process::exit(1);
            }
        }

        Commands::Parse { path } => {
            let text = read_flow_file(&path)?;
            for group in parse_flow(&text) {
                println!("{} {}", "#".blue().bold(), group.name.white().bold());
                for step in &group.steps {
                    match classify(step.sentence()) {
                        Ok(action) => println!(
                            "  {} {} {}",
                            "✓".green(),
                            step.sentence(),
                            format!("[{}]", action).dimmed()
                        ),
                        Err(e) => println!("  {} {} {}", "✗".red(), step.sentence(), e.to_string().red()),
                    }
                }
            }
        }
    }

    Ok(())
}
