use std::{sync::Arc, time::Duration};

use paced::{Config, Error, Pacing, Producer, Result};

#[tokio::main]
async fn main() -> Result {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::INFO)
        .init();

    // The fourth reading takes far longer than we are willing to wait.
    let config = Config::default()
        .with_pacing(Pacing::per_item(vec![
            Duration::from_millis(20),
            Duration::from_millis(20),
            Duration::from_millis(20),
            Duration::from_millis(500),
        ]))
        .with_max_wait(Duration::from_millis(100));
    let readings = Producer::with_config(vec![12.5, 13.1, 12.9, 14.0, 13.3], config)?;

    let mut feed = readings.feed();
    while let Some(reading) = feed.recv().await {
        match reading {
            Ok(value) => println!("reading: {value}"),
            Err(Error::Timeout(limit)) => println!("gave up waiting after {limit:?}"),
            Err(e) => return Err(e),
        }
    }
    feed.close().await?;

    // Shut the producer down while a consumer is still pulling.
    let ticks = Arc::new(Producer::counting(1_000, Duration::from_millis(50)));
    let mut seq = ticks.produce();
    let stopper = {
        let ticks = ticks.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(175)).await;
            ticks.shutdown();
        })
    };

    while let Some(tick) = seq.pull().await {
        match tick {
            Ok(n) => println!("tick {n}"),
            Err(e) if e.is_cancelled() => println!("stopped after {} ticks", seq.yielded()),
            Err(e) => return Err(e),
        }
    }
    stopper.await?;
    Ok(())
}
