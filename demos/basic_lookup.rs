//! Callsign lookup against QRZ.com with the async client.
//!
//! Usage:
//! ```
//! QRZ_USERNAME=your_username QRZ_PASSWORD=your_password cargo run --example basic_lookup -- AA7BQ
//! ```

use qrz_lookup::{Lookup, QrzClient, QrzError};
use std::env;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    let username = env::var("QRZ_USERNAME").expect("QRZ_USERNAME environment variable must be set");
    let password = env::var("QRZ_PASSWORD").expect("QRZ_PASSWORD environment variable must be set");

    let args: Vec<String> = env::args().collect();
    if args.len() != 2 {
        eprintln!("Usage: {} <callsign>", args[0]);
        std::process::exit(1);
    }
    let callsign = &args[1];

    let mut client = QrzClient::new(username, password)?;

    println!("Authenticating with QRZ.com...");
    match client.authenticate().await {
        Ok(()) => println!("Authentication successful"),
        Err(QrzError::Authorization { reason }) => {
            eprintln!("Account cannot use the XML service: {}", reason);
            std::process::exit(1);
        }
        Err(e) => {
            eprintln!("Authentication error: {}", e);
            std::process::exit(1);
        }
    }

    match client.lookup_callsign(callsign).await? {
        Lookup::Found(entry) => {
            println!("\n=== {} ===", entry.call);
            if let Some(name) = entry.name.full_name() {
                println!("Name: {}", name);
            }
            if !entry.address.line1.is_empty() {
                println!("Address: {}, {}", entry.address.line1, entry.address.line2);
            }
            println!("Country: {} (DXCC {})", entry.dxcc.name, entry.dxcc.id);
            if entry.has_location() {
                println!(
                    "Location: {:.4}, {:.4} [{}] via {}",
                    entry.location.lat, entry.location.lon, entry.grid, entry.geoloc
                );
            }
            println!("CQ zone {} / ITU zone {}", entry.cq_zone, entry.itu_zone);
            if !entry.aliases.is_empty() {
                println!("Aliases: {}", entry.aliases.join(", "));
            }
            println!(
                "QSL: eQSL={} LoTW={} mail={}",
                entry.eqsl, entry.lotw_qsl, entry.mail_qsl
            );
            println!("Profile: {}", entry.profile_url());

            if let Some(dxcc) = client.lookup_dxcc_entity(entry.dxcc.id).await?.found() {
                let continent = dxcc.continent.map(|c| c.to_string()).unwrap_or_default();
                println!("\nDXCC {}: {} ({}) {}", dxcc.id, dxcc.name, dxcc.cc3, continent);
            }
        }
        Lookup::NotFound { message, .. } => println!("{}", message),
    }

    let status = client.session_status();
    if let Some(count) = status.count {
        println!("\nLookups today: {}", count);
    }
    if let Some(sub_exp) = &status.sub_exp {
        println!("Subscription expires: {}", sub_exp);
    }

    Ok(())
}
