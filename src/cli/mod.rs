use anyhow::{Context, Result};
use chrono::{Local, NaiveDate};
use clap::{Parser, Subcommand};
use std::sync::Arc;

use crate::api::{self, ServerConfig};
use crate::application::{ChargeFilter, ChargeService, PaymentOutcome};
use crate::domain::{ChargeKey, ChargeRecord, ChargeStatus, Month, Period, format_cents};

/// Condoledger - common-expense charges for a condominium
#[derive(Parser)]
#[command(name = "condoledger")]
#[command(about = "Generate, collect and query monthly condominium charges")]
#[command(version)]
pub struct Cli {
    /// Database file path
    #[arg(short, long, env = "CONDOLEDGER_DATABASE", default_value = "condoledger.db")]
    pub database: String,

    /// Log filter (e.g. "info", "condoledger=debug")
    #[arg(long, env = "RUST_LOG", default_value = "info", global = true)]
    pub log_level: String,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Initialize a new database
    Init,

    /// Run the HTTP API
    Serve {
        /// Address to bind
        #[arg(long, env = "CONDOLEDGER_HOST", default_value = "127.0.0.1")]
        host: String,

        /// Port to bind
        #[arg(short, long, env = "CONDOLEDGER_PORT", default_value_t = 8000)]
        port: u16,
    },

    /// Generate monthly charges for apartments
    Generate {
        /// Year to bill
        #[arg(short, long)]
        year: i32,

        /// Month to bill (1-12); omit to bill the whole year
        #[arg(short, long, value_parser = parse_month)]
        month: Option<Month>,

        /// Apartment identifiers
        #[arg(required = true)]
        apartments: Vec<i64>,
    },

    /// Record the payment of a charge
    Pay {
        /// Apartment identifier
        apartment: i64,

        /// Period (YYYY-MM)
        period: String,

        /// Payment date (YYYY-MM-DD, defaults to today)
        #[arg(long)]
        date: Option<String>,
    },

    /// List charges
    List {
        /// Filter by apartment
        #[arg(short, long)]
        apartment: Option<i64>,

        /// Filter by period (YYYY-MM)
        #[arg(short, long)]
        period: Option<String>,

        /// Status: all, paid, unpaid
        #[arg(short, long, default_value = "all")]
        status: String,
    },

    /// Show paid/unpaid totals
    Summary {
        /// Filter by apartment
        #[arg(short, long)]
        apartment: Option<i64>,

        /// Filter by period (YYYY-MM)
        #[arg(short, long)]
        period: Option<String>,
    },

    /// Delete every charge
    Purge,

    /// Export charges to CSV or JSON
    Export {
        /// Format: csv, json
        #[arg(short, long, default_value = "csv")]
        format: String,

        /// Output file (stdout if omitted)
        #[arg(short, long)]
        output: Option<String>,

        /// Filter by apartment
        #[arg(short, long)]
        apartment: Option<i64>,

        /// Filter by period (YYYY-MM)
        #[arg(short, long)]
        period: Option<String>,

        /// Status: all, paid, unpaid
        #[arg(short, long, default_value = "all")]
        status: String,
    },
}

impl Cli {
    pub async fn run(self) -> Result<()> {
        match self.command {
            Commands::Init => {
                let service = ChargeService::init(&self.database).await?;
                service.close().await;
                println!("Database initialized: {}", self.database);
            }

            Commands::Serve { host, port } => {
                let service = Arc::new(ChargeService::init(&self.database).await?);
                tracing::info!(database = %self.database, "charge ledger ready");
                api::serve(service.clone(), &ServerConfig { host, port }).await?;
                service.close().await;
            }

            Commands::Generate {
                year,
                month,
                apartments,
            } => {
                let service = ChargeService::connect(&self.database).await?;
                let result = service.generate_charges(year, month, &apartments).await?;

                for charge in &result.generated {
                    println!(
                        "Generated: {} {}",
                        charge.key(),
                        format_cents(charge.amount_cents)
                    );
                }
                for key in &result.duplicates {
                    println!("Skipped (already exists): {}", key);
                }
                println!(
                    "{} generated, {} duplicates",
                    result.generated.len(),
                    result.duplicates.len()
                );
            }

            Commands::Pay {
                apartment,
                period,
                date,
            } => {
                let service = ChargeService::connect(&self.database).await?;
                let period: Period = period
                    .parse()
                    .with_context(|| format!("Invalid period '{}'. Use YYYY-MM", period))?;

                let payment_date = match date {
                    Some(date_str) => parse_date(&date_str).with_context(|| {
                        format!("Invalid date format '{}'. Use YYYY-MM-DD", date_str)
                    })?,
                    None => Local::now().date_naive(),
                };

                let key = ChargeKey::new(apartment, period.to_string());
                match service.record_payment(&key, payment_date).await? {
                    PaymentOutcome::Recorded(charge) => {
                        println!("Payment recorded: {} on {}", charge.key(), payment_date);
                    }
                    PaymentOutcome::AlreadyPaid(charge) => {
                        let paid_on = charge
                            .payment_date
                            .map(|d| d.to_string())
                            .unwrap_or_default();
                        println!("Already paid: {} on {}", charge.key(), paid_on);
                    }
                }
            }

            Commands::List {
                apartment,
                period,
                status,
            } => {
                let service = ChargeService::connect(&self.database).await?;
                let status = parse_status(&status)?;
                let charges = service
                    .list_charges(&ChargeFilter::new(apartment, period), status)
                    .await?;
                print_charges(&charges);
            }

            Commands::Summary { apartment, period } => {
                let service = ChargeService::connect(&self.database).await?;
                let summary = service
                    .summarize(&ChargeFilter::new(apartment, period))
                    .await?;

                println!("Charges:      {}", summary.total_count());
                println!("  Paid:       {}", summary.paid_count);
                println!("  Unpaid:     {}", summary.unpaid_count);
                println!("Collected:    {}", format_cents(summary.collected));
                println!("Outstanding:  {}", format_cents(summary.outstanding));
                println!("Collection:   {:.1}%", summary.collection_rate());
            }

            Commands::Purge => {
                let service = ChargeService::connect(&self.database).await?;
                let deleted = service.delete_all_charges().await?;
                println!("Deleted {} charges", deleted);
            }

            Commands::Export {
                format,
                output,
                apartment,
                period,
                status,
            } => {
                let service = ChargeService::connect(&self.database).await?;
                let status = parse_status(&status)?;
                let filter = ChargeFilter::new(apartment, period);
                run_export_command(&service, &format, output.as_deref(), &filter, status).await?;
            }
        }

        Ok(())
    }
}

fn parse_date(date_str: &str) -> Result<NaiveDate> {
    Ok(NaiveDate::parse_from_str(date_str, "%Y-%m-%d")?)
}

fn parse_month(s: &str) -> Result<Month, String> {
    let value: u32 = s.parse().map_err(|_| format!("'{}' is not a month number", s))?;
    Month::try_from(value).map_err(|e| e.to_string())
}

/// "all" maps to no status filter.
fn parse_status(s: &str) -> Result<Option<ChargeStatus>> {
    if s.eq_ignore_ascii_case("all") {
        return Ok(None);
    }
    ChargeStatus::from_str(s)
        .map(Some)
        .with_context(|| format!("Invalid status '{}'. Valid: all, paid, unpaid", s))
}

fn print_charges(charges: &[ChargeRecord]) {
    if charges.is_empty() {
        println!("No charges found.");
        return;
    }

    println!(
        "{:<12} {:<8} {:>10} {:<8} {:<10}",
        "APARTMENT", "PERIOD", "AMOUNT", "STATUS", "PAID ON"
    );
    println!("{}", "-".repeat(52));
    for charge in charges {
        println!(
            "{:<12} {:<8} {:>10} {:<8} {:<10}",
            charge.apartment_id,
            charge.period,
            format_cents(charge.amount_cents),
            charge.status(),
            charge
                .payment_date
                .map(|d| d.to_string())
                .unwrap_or_else(|| "-".to_string())
        );
    }
}

async fn run_export_command(
    service: &ChargeService,
    format: &str,
    output: Option<&str>,
    filter: &ChargeFilter,
    status: Option<ChargeStatus>,
) -> Result<()> {
    use crate::io::Exporter;
    use std::fs::File;
    use std::io::{Write, stdout};

    let exporter = Exporter::new(service);

    let writer: Box<dyn Write> = match output {
        Some(path) => {
            let file = File::create(path)
                .with_context(|| format!("Failed to create output file: {}", path))?;
            Box::new(file)
        }
        None => Box::new(stdout()),
    };

    let count = match format {
        "csv" => exporter.export_charges_csv(writer, filter, status).await?,
        "json" => {
            exporter
                .export_charges_json(writer, filter, status)
                .await?
                .charges
                .len()
        }
        _ => anyhow::bail!("Invalid export format '{}'. Valid formats: csv, json", format),
    };

    if output.is_some() {
        eprintln!("Exported {} charges", count);
    }

    Ok(())
}
