//! Crypto Trend Forecaster
//!
//! Command-line front end for the forecasting pipeline.

use anyhow::Context;
use clap::{Parser, Subcommand};
use crypto_forecast::{
    config::{Config, ReplyLanguage},
    market::{decode_klines, BinanceClient},
    pipeline::{ForecastService, PredictionPipeline, Report},
    sizing::KellyPositionSizer,
    types::{Candle, Horizon, HorizonPrediction, Trend},
};
use std::io::Read;
use std::path::{Path, PathBuf};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "crypto-forecast")]
#[command(about = "LLM-assisted crypto trend forecasts with Kelly position sizing")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Config file path
    #[arg(short, long, default_value = "config.toml")]
    config: String,
}

#[derive(Subcommand)]
enum Commands {
    /// Fetch candles, ask the forecaster and print recommendations
    Predict {
        /// Coin symbol, e.g. BTC or ETH
        #[arg(short, long, default_value = "BTC")]
        coin: String,
        /// Ask for a Chinese reply
        #[arg(long)]
        chinese: bool,
        /// Print the report as JSON
        #[arg(long)]
        json: bool,
    },
    /// Run the pipeline offline over saved candles and a saved reply
    Parse {
        /// Kline JSON file (Binance rows or serialized candles)
        #[arg(long)]
        candles: PathBuf,
        /// Forecast text file, or "-" for stdin
        forecast: PathBuf,
        #[arg(short, long, default_value = "BTCUSDT")]
        symbol: String,
        #[arg(long)]
        json: bool,
    },
    /// Size a single position from an up probability
    #[command(group(clap::ArgGroup::new("probability").required(true).args(["up", "up_pct"])))]
    Size {
        /// Up probability as a fraction, e.g. 0.65
        #[arg(long)]
        up: Option<f64>,
        /// Up probability in percent, e.g. 65
        #[arg(long)]
        up_pct: Option<f64>,
        /// Trend label, e.g. rising, falling, oscillating
        #[arg(long)]
        trend: Option<String>,
        #[arg(long, default_value = "10m")]
        horizon: Horizon,
    },
    /// Show the live price and 24h change
    Price {
        #[arg(short, long, default_value = "BTC")]
        coin: String,
    },
    /// Check connectivity to the market data API
    Ping,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();

    let config = Config::load(&cli.config)?;

    match cli.command {
        Commands::Predict { coin, chinese, json } => predict(config, &coin, chinese, json).await,
        Commands::Parse {
            candles,
            forecast,
            symbol,
            json,
        } => parse_offline(config, &candles, &forecast, &symbol, json),
        Commands::Size {
            up,
            up_pct,
            trend,
            horizon,
        } => size_one(config, up_probability(up, up_pct)?, trend.as_deref(), horizon),
        Commands::Price { coin } => show_price(config, &coin).await,
        Commands::Ping => ping(config).await,
    }
}

async fn predict(mut config: Config, coin: &str, chinese: bool, json: bool) -> anyhow::Result<()> {
    if chinese {
        config.pipeline.language = ReplyLanguage::Chinese;
    }
    if config.llm.api_key.is_empty() && config.llm.provider != "ollama" {
        tracing::warn!("No LLM API key configured (set FORECAST__LLM__API_KEY)");
    }

    let service = ForecastService::from_config(&config)?;
    let report = service
        .predict(coin)
        .await
        .with_context(|| format!("Forecast for {} failed", coin))?;

    print_report(&report, json)
}

fn parse_offline(
    config: Config,
    candles_path: &Path,
    forecast_path: &Path,
    symbol: &str,
    json: bool,
) -> anyhow::Result<()> {
    let raw = std::fs::read_to_string(candles_path)
        .with_context(|| format!("Cannot read {}", candles_path.display()))?;
    let value: serde_json::Value = serde_json::from_str(&raw)?;
    let candles: Vec<Candle> = match decode_klines(&value) {
        Ok(candles) => candles,
        Err(_) => serde_json::from_value(value).context("Unrecognized candle file format")?,
    };

    let text = if forecast_path == Path::new("-") {
        let mut buf = String::new();
        std::io::stdin().read_to_string(&mut buf)?;
        buf
    } else {
        std::fs::read_to_string(forecast_path)
            .with_context(|| format!("Cannot read {}", forecast_path.display()))?
    };

    let report = PredictionPipeline::from_config(&config).run(symbol, &candles, &text)?;
    print_report(&report, json)
}

/// `--up` takes a fraction, `--up-pct` a percentage
fn up_probability(up: Option<f64>, up_pct: Option<f64>) -> anyhow::Result<f64> {
    let p = match (up, up_pct) {
        (Some(p), None) => p,
        (None, Some(pct)) => pct / 100.0,
        _ => anyhow::bail!("Give exactly one of --up or --up-pct"),
    };
    anyhow::ensure!((0.0..=1.0).contains(&p), "Up probability must be within 0-1 (0-100%)");
    Ok(p)
}

fn size_one(config: Config, up: f64, trend: Option<&str>, horizon: Horizon) -> anyhow::Result<()> {
    let trend = match trend {
        Some(label) => Some(Trend::from_label(label).with_context(|| format!("Unknown trend: {}", label))?),
        None => None,
    };

    let prediction = HorizonPrediction {
        horizon,
        up_probability: Some(up),
        trend,
        target_range: None,
        rationale: None,
        line: String::new(),
    };
    let sizer = KellyPositionSizer::new(config.sizing);
    let (long, short) = sizer.side_fractions(up);

    println!("Long Kelly: {:.2}%  Short Kelly: {:.2}%", long * 100.0, short * 100.0);
    println!("{}", sizer.size(&prediction));
    Ok(())
}

async fn show_price(config: Config, coin: &str) -> anyhow::Result<()> {
    let client = BinanceClient::new(&config.binance, &config.proxy)?;
    let symbol = ForecastService::symbol_for(coin);
    let ticker = client.ticker_24h(&symbol).await?;

    println!("{}: {} USDT ({:+}% 24h)", ticker.symbol, ticker.last_price, ticker.price_change_percent);
    Ok(())
}

async fn ping(config: Config) -> anyhow::Result<()> {
    let client = BinanceClient::new(&config.binance, &config.proxy)?;
    match client.ping().await {
        Ok(()) => {
            println!("✅ {} reachable", client.base_url());
            Ok(())
        }
        Err(e) => {
            println!("❌ {} unreachable: {}", client.base_url(), e);
            Err(e.into())
        }
    }
}

fn print_report(report: &Report, json: bool) -> anyhow::Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(report)?);
    } else {
        print!("{}", report);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_up_fraction_is_not_rescaled() {
        assert_eq!(up_probability(Some(1.0), None).unwrap(), 1.0);
        assert_eq!(up_probability(Some(0.65), None).unwrap(), 0.65);
        assert!(up_probability(Some(65.0), None).is_err());
    }

    #[test]
    fn test_up_percent() {
        assert_eq!(up_probability(None, Some(1.0)).unwrap(), 0.01);
        assert_eq!(up_probability(None, Some(100.0)).unwrap(), 1.0);
        assert!(up_probability(None, Some(150.0)).is_err());
        assert!(up_probability(None, None).is_err());
    }

    #[test]
    fn test_size_flags_parse() {
        let cli = Cli::try_parse_from(["crypto-forecast", "size", "--up", "1"]).unwrap();
        match cli.command {
            Commands::Size { up, up_pct, .. } => {
                assert_eq!(up, Some(1.0));
                assert_eq!(up_pct, None);
            }
            _ => panic!("Expected size command"),
        }

        assert!(Cli::try_parse_from(["crypto-forecast", "size", "--up", "0.6", "--up-pct", "60"]).is_err());
        assert!(Cli::try_parse_from(["crypto-forecast", "size"]).is_err());
    }
}
