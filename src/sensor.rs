// src/sensor.rs
use std::f32::consts::PI;

use chrono::{DateTime, Duration, Utc};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rand_distr::StandardNormal;
use serde::Serialize;

/// One hourly reading from the simulated field sensors.
#[derive(Debug, Clone, Serialize)]
pub struct SensorReading {
    pub timestamp: DateTime<Utc>,
    pub temperature_c: f32,
    pub humidity_pct: f32,
    pub soil_moisture_pct: f32,
}

const TEMP_MIN: f32 = 18.0;
const TEMP_MAX: f32 = 35.0;
const HUMIDITY_MIN: f32 = 40.0;
const HUMIDITY_MAX: f32 = 90.0;
const INITIAL_MOISTURE: f32 = 75.0;
const MOISTURE_DECAY_PER_HOUR: f32 = -0.2;

fn round2(v: f32) -> f32 {
    (v * 100.0).round() / 100.0
}

/// Simulates an hourly environmental time series: temperature follows a
/// daily sinusoid peaking mid-afternoon, humidity runs in inverse phase
/// and soil moisture decays linearly, all with gaussian noise. Percentages
/// are clipped to [0, 100]. A fixed seed reproduces the same series.
pub fn generate_series(hours: u32, seed: Option<u64>) -> Vec<SensorReading> {
    let mut rng = match seed {
        Some(s) => StdRng::seed_from_u64(s),
        None => StdRng::from_entropy(),
    };
    let start = Utc::now();

    let temp_amplitude = (TEMP_MAX - TEMP_MIN) / 2.0;
    let temp_mean = TEMP_MIN + temp_amplitude;
    let humidity_amplitude = (HUMIDITY_MAX - HUMIDITY_MIN) / 2.0;
    let humidity_mean = HUMIDITY_MIN + humidity_amplitude;

    (0..hours)
        .map(|hour| {
            let t = hour as f32;
            // peak at 18:00, trough at 06:00 relative to the series start
            let day_phase = (2.0 * PI * (t - 6.0) / 24.0).sin();

            let temp_noise: f32 = rng.sample(StandardNormal);
            let humidity_noise: f32 = rng.sample(StandardNormal);
            let moisture_noise: f32 = rng.sample(StandardNormal);

            let temperature = temp_mean + temp_amplitude * day_phase + 0.1 * temp_noise;
            let humidity = (humidity_mean - humidity_amplitude * day_phase
                + 0.5 * humidity_noise)
                .clamp(0.0, 100.0);
            let moisture = (INITIAL_MOISTURE
                + MOISTURE_DECAY_PER_HOUR * t
                + 0.3 * moisture_noise)
                .clamp(0.0, 100.0);

            SensorReading {
                timestamp: start + Duration::hours(i64::from(hour)),
                temperature_c: round2(temperature),
                humidity_pct: round2(humidity),
                soil_moisture_pct: round2(moisture),
            }
        })
        .collect()
}
