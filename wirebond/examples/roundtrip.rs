//! Sends schema values over an in-memory stream and reads them back.
//!
//! Run with: `RUST_LOG=trace cargo run --example roundtrip`

use futures::{SinkExt, StreamExt};
use tokio_util::codec::Framed;
use wirebond::prelude::*;

#[derive(Debug, Clone, PartialEq)]
struct Quote {
    instrument: String,
    bid: f64,
    ask: f64,
    size: u32,
}

impl Encodable for Quote {
    fn encode(&self, out: &mut OutputBuffer) -> CoreResult<()> {
        out.write_str(&self.instrument)?;
        out.write_f64_le(self.bid);
        out.write_f64_le(self.ask);
        out.write_u32_le(self.size);
        Ok(())
    }
}

impl Decodable for Quote {
    fn decode(cursor: &mut DecodeCursor<'_>) -> CoreResult<Self> {
        Ok(Self {
            instrument: cursor.read_str()?.to_owned(),
            bid: cursor.read_f64_le()?,
            ask: cursor.read_f64_le()?,
            size: cursor.read_u32_le()?,
        })
    }
}

impl Schema for Quote {
    const NAME: &'static str = "Quote";
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let (client, server) = tokio::io::duplex(64 * 1024);
    let mut tx = Framed::new(client, PayloadFrameCodec::default());
    let mut rx = Framed::new(server, BondedFrameCodec::<Quote>::default());

    let quotes: Vec<Quote> = ["EURUSD", "GBPUSD", "USDJPY"]
        .iter()
        .enumerate()
        .map(|(i, instrument)| Quote {
            instrument: (*instrument).to_owned(),
            bid: 1.0 + i as f64 / 10.0,
            ask: 1.0001 + i as f64 / 10.0,
            size: 1_000 * (i as u32 + 1),
        })
        .collect();

    let codec = BondedCodec::<Quote>::default();
    for quote in &quotes {
        let (wire, _owned) = codec.serialize(&Bonded::new(quote.clone()))?;
        println!(
            "[Send] {} ({} bytes in {} slices)",
            quote.instrument,
            wire.len(),
            wire.slice_count()
        );
        tx.send(wire).await?;
    }
    drop(tx);

    let mut received = Vec::new();
    while let Some(bonded) = rx.next().await {
        let bonded = bonded?;

        // Echo the undecoded payload without copying it.
        let (echo, _) = rx.codec().codec().serialize(&bonded)?;
        let quote = bonded.into_value()?;
        println!(
            "[Recv] {} bid={} ask={} size={} (echo {} bytes)",
            quote.instrument,
            quote.bid,
            quote.ask,
            quote.size,
            echo.len()
        );
        received.push(quote);
    }

    anyhow::ensure!(received == quotes, "received quotes differ from sent quotes");

    tracing::info!(
        assembled = rx.codec().codec().assembler().stats().assembled(),
        "assembler stats"
    );
    let stats = codec.bridge().stats();
    tracing::info!(
        groups_created = stats.groups_created(),
        groups_destroyed = stats.groups_destroyed(),
        chunks_materialized = stats.chunks_materialized(),
        "bridge stats"
    );
    println!(
        "\nRound trip complete: {} quotes, {} live groups",
        received.len(),
        stats.live_groups()
    );

    Ok(())
}
