extern crate pv_saving_sim;

use clap::{Args, Parser};
use pv_saving_sim::config::{
    ConsumptionSource, SavingsRate, SimulationConfig, DEFAULT_CURRENCY,
    DEFAULT_SAVINGS_RATE_PER_KWH,
};
use pv_saving_sim::output::{FileOutput, StdoutOutput};
use pv_saving_sim::{run_simulation, write_report, ReportFormat};
use std::path::PathBuf;
use tracing::{debug, Level};
use tracing_subscriber::fmt::format::FmtSpan;

#[derive(Parser, Debug)]
#[clap(
    author,
    version,
    about = "Simulates the yearly savings of a PV setup from PVGIS hourly data",
    long_about = None
)]
struct PvSavingSimArgs {
    #[arg(
        short = 'i',
        long = "pvgis-time-series",
        value_name = "FILE",
        required = true,
        help = "Hourly production data exported from PVGIS in json format; repeat for several orientations"
    )]
    pvgis_time_series: Vec<PathBuf>,
    #[arg(
        short = 'l',
        long,
        value_name = "WATTS",
        help = "Maximum power of the inverter (in Watt)"
    )]
    inverter_power_limit: u32,
    #[command(flatten)]
    consumption: ConsumptionArgs,
    #[command(flatten)]
    savings: SavingsArgs,
    #[arg(long, value_enum, default_value_t = ReportFormat::Text, help = "Report format")]
    format: ReportFormat,
    #[arg(
        short,
        long,
        value_name = "FILE",
        help = "Write the report to a file instead of stdout"
    )]
    output: Option<PathBuf>,
    #[arg(short, long, action = clap::ArgAction::Count, help = "Increase log verbosity")]
    verbose: u8,
    #[clap(long, default_value_t = false, help = "Whether to log out spans")]
    log_spans: bool,
}

#[derive(Args, Clone, Debug)]
struct ConsumptionArgs {
    #[arg(
        short = 'c',
        long,
        value_name = "WATTS",
        help = "The value of the constant consumption that should be assumed (in Watt)"
    )]
    constant_consumption: Option<u32>,
    #[arg(
        long,
        value_name = "FILE",
        help = "InfluxDB CSV export of per-phase power readings, used when no constant consumption is given"
    )]
    consumption_history: Option<PathBuf>,
    #[arg(
        long,
        value_name = "0-6",
        default_value_t = 0,
        help = "Weekday given to 1st January when laying out the consumption history (0 = Sunday)"
    )]
    first_weekday: u32,
}

#[derive(Args, Clone, Debug)]
struct SavingsArgs {
    #[arg(
        long,
        value_name = "RATE",
        default_value_t = DEFAULT_SAVINGS_RATE_PER_KWH,
        help = "Price of one kWh bought from the grid"
    )]
    savings_rate: f64,
    #[arg(long, default_value = DEFAULT_CURRENCY, help = "Currency symbol for the savings")]
    currency: String,
}

fn main() -> anyhow::Result<()> {
    let args = PvSavingSimArgs::parse();

    // set up basic tracing
    let tracing_subscriber = {
        let level = match args.verbose {
            0 => Level::WARN,
            1 => Level::INFO,
            2 => Level::DEBUG,
            _ => Level::TRACE,
        };
        let mut builder = tracing_subscriber::fmt::fmt()
            .with_max_level(level)
            .with_writer(std::io::stderr);

        if args.log_spans {
            builder = builder.with_span_events(FmtSpan::CLOSE);
        }

        builder.finish()
    };
    tracing::subscriber::set_global_default(tracing_subscriber)
        .expect("setting tracing subscriber failed");

    let consumption = ConsumptionSource::from_options(
        args.consumption.constant_consumption,
        args.consumption.consumption_history,
        args.consumption.first_weekday,
    )?;
    let config = SimulationConfig::new(
        args.pvgis_time_series,
        args.inverter_power_limit,
        consumption,
    )
    .with_savings_rate(SavingsRate {
        per_kwh: args.savings.savings_rate,
        currency: args.savings.currency,
    });
    debug!(?config, "running simulation");

    let report = run_simulation(&config)?;

    match args.output {
        Some(path) => write_report(FileOutput::new(path), &report, args.format),
        None => write_report(StdoutOutput, &report, args.format),
    }
}
