use anyhow::{Context as _, Result};
use clap::{Parser, Subcommand};
use daybreak::prelude::*;
use serde::Serialize;
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "daybreak")]
#[command(about = "A daily equity/etf signal backtester", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    //run a backtest
    Run {
        //path to csv panel (date,symbol,<fields>...)
        #[arg(long)]
        data: Option<PathBuf>,

        //path to json configuration (defaults are used when omitted)
        #[arg(long)]
        config: Option<PathBuf>,

        //initial cash, overrides the configuration
        #[arg(long)]
        initial_cash: Option<f64>,

        //output path for the order log csv
        #[arg(long)]
        output_orders: Option<PathBuf>,

        //output path for the daily snapshot csv
        #[arg(long)]
        output_snapshots: Option<PathBuf>,
    },

    //evaluate the registered signals and write every cell in long form
    Signals {
        #[arg(long)]
        data: Option<PathBuf>,

        #[arg(long)]
        config: Option<PathBuf>,

        #[arg(long)]
        output: PathBuf,
    },

    //write the default configuration as json
    InitConfig {
        #[arg(long)]
        output: PathBuf,
    },
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Run {
            data,
            config,
            initial_cash,
            output_orders,
            output_snapshots,
        } => {
            let mut config = load_config(config.as_deref(), data)?;
            if let Some(cash) = initial_cash {
                config.initial_cash = cash;
            }
            if output_orders.is_some() {
                config.output_orders_csv = output_orders;
            }
            if output_snapshots.is_some() {
                config.output_snapshots_csv = output_snapshots;
            }
            config.validate()?;
            run_backtest(config)?;
        }
        Commands::Signals {
            data,
            config,
            output,
        } => {
            let config = load_config(config.as_deref(), data)?;
            write_signals(&config, &output)?;
        }
        Commands::InitConfig { output } => {
            BacktestConfiguration::default()
                .to_json_file(&output)
                .with_context(|| format!("Failed to write config to {:?}", output))?;
            println!("Default configuration written to {:?}", output);
        }
    }

    Ok(())
}

fn load_config(path: Option<&Path>, data: Option<PathBuf>) -> Result<BacktestConfiguration> {
    let mut config = match path {
        Some(path) => BacktestConfiguration::from_json_file(path)
            .with_context(|| format!("Failed to load config from {:?}", path))?,
        None => BacktestConfiguration::default(),
    };
    if let Some(data) = data {
        config.data_path = data;
    }
    Ok(config)
}

fn load_panel(config: &BacktestConfiguration) -> Result<Panel> {
    let panel = load_panel_csv(&config.data_path)
        .with_context(|| format!("Failed to load data from {:?}", config.data_path))?;
    if panel.is_empty() {
        anyhow::bail!("No rows found in {:?}", config.data_path);
    }
    Ok(panel)
}

fn run_backtest(config: BacktestConfiguration) -> Result<()> {
    println!("Daybreak Signal Backtester");
    println!("==========================\n");

    let panel = load_panel(&config)?;
    println!(
        "Loaded {} dates x {} symbols from {:?}\n",
        panel.num_dates(),
        panel.symbols().len(),
        config.data_path
    );

    let mut strategy = DailySignalStrategy::from_config(&config);
    let engine = BacktestEngine::new(config.clone(), panel);
    let result = engine.run(&mut strategy)?;

    println!("Backtest Results");
    println!("================\n");
    RunSummary::from_run(
        &result.strategy,
        &result.snapshots,
        &result.orders,
        &result.portfolio,
    )
    .pretty_print_table();

    println!("\nPositions");
    print_positions_table(&result.portfolio);

    if let Some(path) = &config.output_orders_csv {
        write_csv(path, &result.orders)?;
        println!("\nOrders saved to {:?}", path);
    }

    if let Some(path) = &config.output_snapshots_csv {
        write_csv(path, &result.snapshots)?;
        println!("Snapshots saved to {:?}", path);
    }

    Ok(())
}

#[derive(Serialize)]
struct SignalCell<'a> {
    date: chrono::NaiveDate,
    signal: &'a str,
    symbol: &'a str,
    value: Option<bool>,
}

fn write_signals(config: &BacktestConfiguration, output: &Path) -> Result<()> {
    let panel = load_panel(config)?;

    let mut strategy = DailySignalStrategy::from_config(config);
    let mut ctx = BacktestContext::new(config.initial_cash, config.universe.lot_size);
    strategy.initialize(&mut ctx)?;
    let signals = ctx.evaluate_signals(&panel)?;

    let mut writer = csv::Writer::from_path(output)
        .with_context(|| format!("Failed to create {:?}", output))?;
    for (name, matrix) in &signals {
        for row in 0..matrix.num_rows() {
            let date = matrix.dates()[row];
            for (symbol, value) in matrix.row(row) {
                writer.serialize(SignalCell {
                    date,
                    signal: name,
                    symbol,
                    value: *value,
                })?;
            }
        }
    }
    writer.flush()?;

    println!(
        "Wrote {} signal channels over {} dates to {:?}",
        signals.len(),
        panel.num_dates(),
        output
    );
    Ok(())
}

fn write_csv<T: Serialize>(path: &Path, records: &[T]) -> Result<()> {
    let mut writer =
        csv::Writer::from_path(path).with_context(|| format!("Failed to create {:?}", path))?;
    for record in records {
        writer.serialize(record)?;
    }
    writer.flush()?;
    Ok(())
}
