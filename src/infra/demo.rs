//! Reproducible synthetic shipment batches for demos and smoke runs.

use rand::{rngs::StdRng, Rng, SeedableRng};
use time::{macros::date, Date, Duration};

use crate::domain::{LaneDirection, Shipment};

const FIRST_SHIP_DATE: Date = date!(2022 - 01 - 01);
const LAST_SHIP_DATE: Date = date!(2024 - 08 - 01);

/// Weights in percent.
const MAX_TRANSIT_DAYS: [(u32, u32); 6] = [(5, 10), (7, 15), (10, 25), (14, 20), (21, 20), (30, 10)];
const DIRECTIONS: [(LaneDirection, u32); 2] =
    [(LaneDirection::Inbound, 80), (LaneDirection::Outbound, 20)];

fn ship_date_grid() -> Vec<Date> {
    let mut dates = Vec::new();
    let mut current = FIRST_SHIP_DATE;
    while current <= LAST_SHIP_DATE {
        dates.push(current);
        current += Duration::days(7);
    }
    dates
}

fn pick_weighted<T: Copy>(rng: &mut StdRng, choices: &[(T, u32)]) -> T {
    let total: u32 = choices.iter().map(|(_, weight)| weight).sum();
    let mut roll = rng.gen_range(0..total);
    for (value, weight) in choices {
        if roll < *weight {
            return *value;
        }
        roll -= weight;
    }
    choices[choices.len() - 1].0
}

fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}

/// Generates `count` shipments; the same seed always yields the same batch.
pub fn generate(count: usize, seed: u64) -> Vec<Shipment> {
    let mut rng = StdRng::seed_from_u64(seed);
    let dates = ship_date_grid();

    (1..=count)
        .map(|i| Shipment {
            shipment_id: format!("S{i:04}"),
            ship_date: dates[rng.gen_range(0..dates.len())],
            incoterm: "FOB".to_string(),
            length_cm: rng.gen_range(20..120) as f64,
            width_cm: rng.gen_range(20..100) as f64,
            height_cm: rng.gen_range(10..90) as f64,
            pieces: rng.gen_range(1..8),
            actual_weight_kg: round_to(rng.gen_range(5.0..250.0), 1),
            max_transit_days: pick_weighted(&mut rng, &MAX_TRANSIT_DAYS),
            container_utilization: round_to(rng.gen_range(0.03..0.35), 3),
            direction: pick_weighted(&mut rng, &DIRECTIONS),
        })
        .collect()
}
