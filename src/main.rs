use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use st25dv_rs::logging::level_from_verbosity;
use st25dv_rs::util::{decode_hex, encode_hex, pretty_hex};
use st25dv_rs::{
    connect, init_logger_with_level, log_error, log_info, log_warn, DriverConfig,
    LinuxI2cTransport, Password, St25dvDriver, TransportConfig, UserArea, WriteOutcome,
};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "st25dv-cli")]
#[command(about = "CLI tool for ST25DV NFC tags on I2C")]
struct Cli {
    /// I2C connection URL (overrides ST25DV_I2C_URL)
    #[arg(long, global = true)]
    url: Option<String>,

    /// Bus clock in Hz (overrides ST25DV_I2C_FREQUENCY)
    #[arg(long, global = true)]
    frequency: Option<u32>,

    /// Driver configuration file (JSON)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show variant, UID and memory geometry
    Info,
    /// Present the I2C password and report the session state
    Unlock {
        /// 16 hex digits; defaults to the factory password
        #[arg(short, long)]
        password: Option<String>,
    },
    /// Show whether an I2C security session is open
    Session,
    ReadSys {
        #[arg(value_parser = parse_offset)]
        offset: u16,
        len: usize,
    },
    ReadUser {
        #[arg(value_parser = parse_offset)]
        offset: u16,
        len: usize,
    },
    WriteSys {
        #[arg(value_parser = parse_offset)]
        offset: u16,
        data: String,
        /// Acknowledgment polls after the write
        #[arg(long, default_value = "0")]
        poll: u32,
    },
    WriteUser {
        #[arg(value_parser = parse_offset)]
        offset: u16,
        data: String,
        #[arg(long, default_value = "0")]
        poll: u32,
    },
    /// Show the RF security status of all four areas
    Areas,
    LockCcFile,
    LockCfg,
    LockRfa1,
}

/// Offsets are hex with a `0x` prefix or decimal
fn parse_offset(input: &str) -> Result<u16, String> {
    let parsed = match input.strip_prefix("0x").or_else(|| input.strip_prefix("0X")) {
        Some(hex) => u16::from_str_radix(hex, 16),
        None => input.parse::<u16>(),
    };
    parsed.map_err(|e| format!("invalid offset '{input}': {e}"))
}

fn report(outcome: WriteOutcome) -> Result<()> {
    match outcome {
        WriteOutcome::Unconfirmed => log_info("Write sent"),
        WriteOutcome::Acknowledged { attempt } => {
            log_info(&format!("Write acknowledged after {attempt} poll(s)"))
        }
        WriteOutcome::TimedOut { attempts, .. } => {
            log_warn(&format!("Write not acknowledged after {attempts} poll(s)"));
            outcome.ensure_completed("st25dv-cli")?;
        }
    }
    Ok(())
}

fn run(driver: &mut St25dvDriver<LinuxI2cTransport>, command: Commands) -> Result<()> {
    match command {
        Commands::Info => {
            let info = driver.read_tag_info()?;
            println!("Variant:   {} (IC_REF 0x{:02X})", info.variant, info.ic_ref);
            println!("UID:       {}", info.uid_hex());
            if let Some(ctrl) = info.i2c_ctrl {
                println!("I2C_CTRL:  0x{ctrl:02X}");
            }
            println!(
                "Memory:    {} blocks x {} bytes = {} bytes",
                info.block_count,
                info.block_size,
                info.user_memory_bytes()
            );
        }
        Commands::Unlock { password } => {
            let password = match password {
                Some(hex) => Password::from_hex(&hex).context("invalid password")?,
                None => Password::default(),
            };
            if driver.unlock(&password)? {
                println!("I2C security session open");
            } else {
                log_warn("Tag rejected the I2C password");
                bail!("password rejected, I2C security session closed");
            }
        }
        Commands::Session => {
            let open = driver.read_security_session_state()?;
            println!("I2C security session: {}", if open { "open" } else { "closed" });
        }
        Commands::ReadSys { offset, len } => {
            let data = driver.read_system_memory(offset, len)?;
            print!("{}", pretty_hex(&data, offset));
        }
        Commands::ReadUser { offset, len } => {
            let data = driver.read_user_memory(offset, len)?;
            print!("{}", pretty_hex(&data, offset));
        }
        Commands::WriteSys { offset, data, poll } => {
            let bytes = decode_hex(&data).context("invalid data")?;
            report(driver.write_system_memory(offset, &bytes, poll)?)?;
        }
        Commands::WriteUser { offset, data, poll } => {
            let bytes = decode_hex(&data).context("invalid data")?;
            report(driver.write_user_memory(offset, &bytes, poll)?)?;
            log_info(&format!("Wrote {} at 0x{offset:04X}", encode_hex(&bytes)));
        }
        Commands::Areas => {
            for area in UserArea::ALL {
                let security = driver.read_area_security(area)?;
                println!(
                    "Area {}: 0x{:02X} ({:?}, {:?})",
                    area.number(),
                    security.encode(),
                    security.protection,
                    security.password
                );
            }
        }
        Commands::LockCcFile => report(driver.lock_config_area()?)?,
        Commands::LockCfg => report(driver.lock_cfg()?)?,
        Commands::LockRfa1 => report(driver.lock_rfa1_session()?)?,
    }
    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logger_with_level(level_from_verbosity(cli.verbose));

    let mut transport = TransportConfig::from_env()?;
    if let Some(url) = cli.url {
        transport.url = url;
    }
    if let Some(frequency) = cli.frequency {
        transport.clock_frequency_hz = frequency;
    }

    let config = match &cli.config {
        Some(path) => DriverConfig::from_json_file(path)
            .with_context(|| format!("loading {}", path.display()))?,
        None => DriverConfig::default(),
    };

    let mut driver = connect(&transport, config)
        .with_context(|| format!("opening {}", transport.url))?;
    run(&mut driver, cli.command).inspect_err(|e| log_error(&format!("{e:#}")))
}
