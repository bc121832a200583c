/*
[INPUT]:  REST snapshot, merged stream events
[OUTPUT]: Human-readable notification text
[POS]:    Output layer - message rendering
[UPDATE]: When changing notification wording or balance rounding
*/

use rust_decimal::Decimal;
use tracing::warn;
use woostream_adapter::ws::EXECUTION_REPORT_TOPIC;
use woostream_adapter::{HoldingResponse, OrderStatus, PublicInfoResponse, Side, Snapshot, StreamEvent};

const UNAVAILABLE: &str = "- unavailable";

/// Startup summary: open positions, then balances worth listing.
pub fn snapshot_text(snapshot: &Snapshot) -> String {
    let mut lines = vec!["Positions:".to_string()];
    match &snapshot.positions {
        Some(positions) => lines.extend(positions.open_positions().map(|position| {
            format!(
                "- {}: {} @ {}",
                position.symbol, position.holding, position.average_open_price
            )
        })),
        None => lines.push(UNAVAILABLE.to_string()),
    }

    lines.push("Balances:".to_string());
    match &snapshot.holding {
        Some(holding) => lines.extend(balance_lines(holding, snapshot.public_info.as_ref())),
        None => lines.push(UNAVAILABLE.to_string()),
    }

    lines.join("\n")
}

fn balance_lines(holding: &HoldingResponse, info: Option<&PublicInfoResponse>) -> Vec<String> {
    holding
        .holding
        .iter()
        .filter_map(|(asset, amount)| {
            let tick = info
                .and_then(|info| info.spot_market_for(asset))
                .map(|market| market.base_tick);
            balance_line(asset, *amount, tick)
        })
        .collect()
}

/// Balances at or below one tick are dust and skipped.
fn balance_line(asset: &str, amount: Decimal, base_tick: Option<Decimal>) -> Option<String> {
    let Some(tick) = base_tick else {
        return (amount > Decimal::ZERO).then(|| format!("- {asset}: {amount}"));
    };
    if amount <= tick {
        return None;
    }
    let shown = if tick < Decimal::ONE {
        amount.round_dp(tick.normalize().scale())
    } else {
        amount
    };
    Some(format!("- {asset}: {shown}"))
}

/// Notification for a stream event, if it warrants one.
///
/// Only fully filled execution reports produce text.
pub fn event_text(event: &StreamEvent) -> Option<String> {
    if event.topic != EXECUTION_REPORT_TOPIC {
        return None;
    }
    let report = match event.execution_report()? {
        Ok(report) => report,
        Err(err) => {
            warn!(topic = %event.topic, error = %err, "execution report not understood");
            return None;
        }
    };
    if report.status != OrderStatus::Filled {
        return None;
    }

    let verb = match report.side {
        Side::Buy => "Bought",
        Side::Sell => "Sold",
    };
    Some(format!(
        "{verb} {} {} @ {}",
        report.total_executed_quantity, report.symbol, report.avg_price
    ))
}
