use std::time::Duration;

use paced::{Producer, Result};

#[tokio::main]
async fn main() -> Result {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .init();

    let names = ["James", "Raj", "Andrews", "Arun", "Aravinda", "Viki", "Mathi"];
    let producer = Producer::new(names, Duration::from_millis(5));

    // Each name is printed as soon as it is produced
    let mut seq = producer.produce();
    while let Some(name) = seq.pull().await {
        println!("{}", name?);
    }
    Ok(())
}
