//! DXCC and biography lookups with the blocking client.
//!
//! Usage:
//! ```
//! QRZ_USERNAME=your_username QRZ_PASSWORD=your_password cargo run --example blocking_lookup -- W1AW
//! ```

use qrz_lookup::{BlockingQrzClient, Lookup};
use std::env;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    let username = env::var("QRZ_USERNAME").expect("QRZ_USERNAME environment variable must be set");
    let password = env::var("QRZ_PASSWORD").expect("QRZ_PASSWORD environment variable must be set");
    let callsign = env::args().nth(1).unwrap_or_else(|| "W1AW".to_string());

    let mut client = BlockingQrzClient::new(username, password)?;

    match client.lookup_dxcc_by_callsign(&callsign)? {
        Lookup::Found(dxcc) => {
            println!("{} is in DXCC {}: {}", callsign, dxcc.id, dxcc.name);
            if let Some(hours) = dxcc.utc_offset_hours() {
                println!("UTC offset: {:+} h", hours);
            }
        }
        Lookup::NotFound { message, .. } => println!("{}", message),
    }

    match client.lookup_biography(&callsign)? {
        Lookup::Found(bio) if !bio.is_empty() => {
            println!("\nBiography ({} bytes):\n{}", bio.html().len(), bio.html());
        }
        Lookup::Found(_) => println!("\nNo biography on file"),
        Lookup::NotFound { message, .. } => println!("\n{}", message),
    }

    Ok(())
}
