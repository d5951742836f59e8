//! Subscribe to a handful of streams and print what arrives.
//!
//! ```sh
//! cargo run --example stream
//! ```

use bybit_ws::{topic, BybitWsClient, Config, TESTNET_PUBLIC};
use std::sync::Arc;
use tracing::info;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt::init();
    bybit_ws::init_crypto();

    let config = Config {
        url: TESTNET_PUBLIC.to_string(),
        auto_reconnect: true,
        ..Default::default()
    };
    let client = Arc::new(BybitWsClient::new(config));

    client.subscribe(&topic::with_symbol(topic::ORDER_BOOK_25L1, "BTCUSD"))?;
    client.subscribe(topic::TRADE)?;
    client.subscribe(&topic::with_interval(topic::KLINE_V2, "1", "BTCUSD"))?;
    client.subscribe(topic::INSURANCE)?;
    client.subscribe(&topic::with_symbol(topic::INSTRUMENT, "BTCUSD"))?;

    client.on_order_book(|symbol, view| {
        info!(
            symbol,
            bid = ?view.best_bid().map(|e| e.price),
            ask = ?view.best_ask().map(|e| e.price),
            depth = view.len(),
            "book"
        );
    });
    client.on_trade(|symbol, trades| {
        for trade in trades {
            info!(symbol, side = %trade.side, price = %trade.price, size = trade.size, "trade");
        }
    });
    client.on_kline_v2(|symbol, bars| {
        for bar in bars {
            info!(symbol, interval = %bar.interval, close = %bar.close, "kline");
        }
    });
    client.on_insurance(|currency, events| {
        info!(currency, count = events.len(), "insurance");
    });
    client.on_instrument(|symbol, infos| {
        for i in infos {
            info!(symbol, mark = %i.mark_price, index = %i.index_price, "instrument");
        }
    });

    client.run().await?;
    Ok(())
}
