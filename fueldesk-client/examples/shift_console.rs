//! Minimal console flow: verify, start a shift, record one entry,
//! close with reconciliation.
//!
//! Usage:
//!   FUELDESK_URL=http://localhost:8080 FUELDESK_TOKEN=... \
//!       cargo run --example shift_console

use std::sync::Arc;

use rust_decimal::Decimal;

use fueldesk_client::{
    AddEntriesOutcome, ClientConfig, HttpShiftApi, RefuelEntryDraft, ShiftClose, ShiftCoordinator,
    ShiftPointerCache, ShiftStart, ShiftState,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let base_url =
        std::env::var("FUELDESK_URL").unwrap_or_else(|_| "http://localhost:8080".to_string());
    let mut config = ClientConfig::new(base_url);
    if let Ok(token) = std::env::var("FUELDESK_TOKEN") {
        config = config.with_token(token);
    }

    let cache_dir = tempfile::tempdir()?;
    let cache = ShiftPointerCache::open(cache_dir.path().join("pointer.redb"))?;
    let api = HttpShiftApi::new(config.build_http_client()?);
    let coordinator = ShiftCoordinator::new(Arc::new(api), cache);

    let state = coordinator.verify(false).await?;
    println!("verified: {:?}", state_label(&state));

    if !state.is_open() {
        let state = coordinator
            .start_shift(ShiftStart {
                starting_stock: Decimal::from(100),
                fuel_intake: Decimal::from(50),
                station: Some("Pump 1".to_string()),
                operator_name: "Ana".to_string(),
                responsible_name: "Bruno".to_string(),
            })
            .await?;
        println!("started: {:?}", state_label(&state));
    }

    let outcome = coordinator
        .add_entries(vec![RefuelEntryDraft {
            equipment_id: 1,
            equipment_name: "Loader L-01".to_string(),
            asset_code: Some("FLT-0001".to_string()),
            quantity: Decimal::from(30),
            meter_reading: Some(Decimal::from(10524)),
            sign_off: None,
        }])
        .await?;
    match outcome {
        AddEntriesOutcome::Recorded(shift) => {
            println!("recorded, {} entries so far", shift.entries.len())
        }
        AddEntriesOutcome::StaleStateReloaded => println!("shift was closed elsewhere, reloaded"),
    }

    let state = coordinator
        .close_shift(ShiftClose {
            closing_stock: Decimal::from(120),
        })
        .await?;
    if let ShiftState::Closed { reconciliation, .. } = &state {
        println!(
            "closed: expected {} L, variance {} L",
            reconciliation.expected_closing, reconciliation.variance
        );
    }

    Ok(())
}

fn state_label(state: &ShiftState) -> &'static str {
    match state {
        ShiftState::Unknown => "unknown",
        ShiftState::Verifying => "verifying",
        ShiftState::NoOpenShift => "no open shift",
        ShiftState::Open(_) => "open shift",
        ShiftState::Closed { .. } => "closed",
    }
}
