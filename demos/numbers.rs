use std::time::Duration;

use futures_util::StreamExt;
use paced::{Producer, Result};

#[tokio::main]
async fn main() -> Result {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::INFO)
        .init();

    let producer = Producer::counting(10, Duration::from_millis(10));

    let mut numbers = producer.produce();
    while let Some(n) = numbers.next().await {
        println!("{}", n?);
    }

    // A fresh sequence starts over; stop it halfway through.
    let mut again = producer.produce();
    while let Some(n) = again.next().await {
        let n = n?;
        println!("again: {n}");
        if n == 4 {
            break;
        }
    }
    Ok(())
}
