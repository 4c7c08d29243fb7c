//! CLI that plays the host's role against real LIFX lights.
//!
//! Run with: cargo run --example bridge_cli -- --config config.json list

use clap::{Parser, Subcommand, ValueEnum};
use lifx_bridge_rs::{Accessory, CharacteristicValue, Platform, PlatformConfig, Property};

#[derive(Parser)]
#[command(name = "lifx-bridge")]
#[command(about = "Drive bridged LIFX accessories from the command line", long_about = None)]
struct Cli {
    /// Platform configuration file (JSON)
    #[arg(short, long, default_value = "config.json")]
    config: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, ValueEnum)]
enum Prop {
    Power,
    Brightness,
    Hue,
    Saturation,
}

impl From<Prop> for Property {
    fn from(p: Prop) -> Self {
        match p {
            Prop::Power => Property::Power,
            Prop::Brightness => Property::Brightness,
            Prop::Hue => Property::Hue,
            Prop::Saturation => Property::Saturation,
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// List every light the cloud API knows about
    List,

    /// Read one property of a light
    Get {
        /// Light id (MAC as hex)
        id: String,
        #[arg(value_enum)]
        property: Prop,
    },

    /// Write one property of a light
    Set {
        /// Light id (MAC as hex)
        id: String,
        #[arg(value_enum)]
        property: Prop,
        /// 0/1 for power, percent for brightness and saturation, degrees for hue
        value: f64,
    },

    /// Flash a light green
    Identify {
        /// Light id (MAC as hex)
        id: String,
    },

    /// Print every characteristic pushed by the LAN client until Ctrl-C
    Watch,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let cli = Cli::parse();

    let config = PlatformConfig::from_file(&cli.config)?;
    let platform = Platform::new(config).await?;
    let accessories = platform.accessories().await?;

    match cli.command {
        Commands::List => {
            for accessory in &accessories {
                println!(
                    "{}  {:<24} {:<20} color={} lan={}",
                    accessory.id(),
                    accessory.name(),
                    accessory.model(),
                    accessory.has_color(),
                    accessory.is_subscribed(),
                );
            }
        }
        Commands::Get { id, property } => {
            let accessory = find(&accessories, &id)?;
            let value = accessory.get(property.into()).await?;
            println!("{value}");
        }
        Commands::Set {
            id,
            property,
            value,
        } => {
            let accessory = find(&accessories, &id)?;
            accessory
                .set(property.into(), CharacteristicValue::Float(value))
                .await?;
            println!("ok");
        }
        Commands::Identify { id } => {
            find(&accessories, &id)?.identify().await;
        }
        Commands::Watch => {
            let services: Vec<_> = accessories.iter().map(|a| (a, a.services())).collect();
            let mut ticker = tokio::time::interval(std::time::Duration::from_secs(1));
            loop {
                tokio::select! {
                    _ = tokio::signal::ctrl_c() => break,
                    _ = ticker.tick() => {
                        for (accessory, services) in &services {
                            let Some(bulb) = services.iter().find_map(|s| s.as_lightbulb()) else {
                                continue;
                            };
                            let values: Vec<String> = bulb
                                .characteristics
                                .iter()
                                .filter_map(|c| c.value().map(|v| format!("{}={v}", c.property())))
                                .collect();
                            if !values.is_empty() {
                                println!("{}: {}", accessory.name(), values.join(" "));
                            }
                        }
                    }
                }
            }
        }
    }

    platform.shutdown();
    Ok(())
}

fn find<'a>(
    accessories: &'a [Accessory],
    id: &str,
) -> Result<&'a Accessory, lifx_bridge_rs::Error> {
    accessories
        .iter()
        .find(|a| a.id() == id)
        .ok_or_else(|| lifx_bridge_rs::Error::DeviceNotFound(id.to_string()))
}
