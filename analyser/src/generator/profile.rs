use crate::generator::template::{date_header, fix_line};
use anyhow::ensure;
use glidecore::math::geo::EARTH_RADIUS_M;
use rand::{rngs::StdRng, Rng, SeedableRng};
use serde::{Deserialize, Serialize};

const SECONDS_PER_DAY: u64 = 86_400;

/// Shape of a synthetic flight: straight glides due north alternating with
/// climbing thermal circles.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneratorConfig {
    pub fixes: usize,
    pub interval_sec: u32,
    pub glide_ratio: f64,
    pub airspeed_kmh: f64,
    pub glide_sec: u32,
    pub thermal_sec: u32,
    pub climb_mps: f64,
    pub thermal_turn_deg_per_sec: f64,
    /// Uniform altitude jitter amplitude, metres.
    pub noise_m: f64,
    /// GNSS altitude sits this far above the barometric one.
    pub gnss_offset_m: i32,
    pub seed: u64,
    pub start_latitude: f64,
    pub start_longitude: f64,
    pub start_altitude_m: f64,
    pub start_time_sec: u32,
    pub day: u32,
    pub month: u32,
    pub year: u32,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            fixes: 900,
            interval_sec: 1,
            glide_ratio: 8.5,
            airspeed_kmh: 38.0,
            glide_sec: 120,
            thermal_sec: 60,
            climb_mps: 2.0,
            thermal_turn_deg_per_sec: 18.0,
            noise_m: 1.0,
            gnss_offset_m: 30,
            seed: 0,
            start_latitude: 46.0,
            start_longitude: 7.0,
            start_altitude_m: 2500.0,
            start_time_sec: 11 * 3600,
            day: 15,
            month: 7,
            year: 2022,
        }
    }
}

impl GeneratorConfig {
    fn validate(&self) -> anyhow::Result<()> {
        ensure!(self.fixes >= 2, "a flight needs at least two fixes");
        ensure!(self.interval_sec >= 1, "fix interval must be at least one second");
        ensure!(self.glide_ratio > 0.0, "glide ratio must be positive");
        ensure!(self.airspeed_kmh > 0.0, "airspeed must be positive");
        ensure!(
            self.glide_sec + self.thermal_sec > 0,
            "glide and thermal phases are both empty"
        );
        ensure!(self.noise_m >= 0.0, "noise amplitude must not be negative");
        // One date header covers the whole flight.
        let last_fix = self.start_time_sec as u64
            + (self.fixes as u64 - 1) * self.interval_sec as u64;
        ensure!(
            last_fix < SECONDS_PER_DAY,
            "flight must end before midnight (last fix at {} s)",
            last_fix
        );
        Ok(())
    }
}

/// Renders the configured flight as IGC text. The same config always
/// yields the same text.
pub fn generate_igc(config: &GeneratorConfig) -> anyhow::Result<String> {
    config.validate()?;
    let mut rng = StdRng::seed_from_u64(config.seed);

    let dt = config.interval_sec as f64;
    let speed = config.airspeed_kmh / 3.6;
    let sink = speed / config.glide_ratio;
    let cycle = config.glide_sec + config.thermal_sec;

    let mut text = String::with_capacity(64 + config.fixes * 36);
    text.push_str("AXXXSYN\n");
    text.push_str(&date_header(config.day, config.month, config.year));
    text.push('\n');
    text.push_str("HFPLTPILOTINCHARGE:Synthetic\n");

    let mut latitude = config.start_latitude;
    let mut longitude = config.start_longitude;
    let mut altitude = config.start_altitude_m;
    let mut heading_deg = 0.0_f64;

    for i in 0..config.fixes {
        let elapsed = i as u32 * config.interval_sec;
        let jitter = if config.noise_m > 0.0 {
            rng.gen_range(-config.noise_m..=config.noise_m)
        } else {
            0.0
        };
        let baro = (altitude + jitter).round() as i32;
        text.push_str(&fix_line(
            config.start_time_sec + elapsed,
            latitude,
            longitude,
            baro + config.gnss_offset_m,
            baro,
        ));
        text.push('\n');

        let gliding = elapsed % cycle < config.glide_sec;
        if gliding {
            heading_deg = 0.0;
            altitude -= sink * dt;
        } else {
            heading_deg = (heading_deg + config.thermal_turn_deg_per_sec * dt).rem_euclid(360.0);
            altitude += config.climb_mps * dt;
        }
        let step = speed * dt;
        let heading = heading_deg.to_radians();
        latitude += (step * heading.cos() / EARTH_RADIUS_M).to_degrees();
        longitude += (step * heading.sin() / (EARTH_RADIUS_M * latitude.to_radians().cos()))
            .to_degrees();
    }
    Ok(text)
}
