//! IGC line formatting for generated flights.

/// `HFDTE` header for a day, month and year.
pub fn date_header(day: u32, month: u32, year: u32) -> String {
    format!("HFDTE{:02}{:02}{:02}", day, month, year % 100)
}

/// A 35-byte `B` record. The clock wraps at midnight.
pub fn fix_line(
    seconds_of_day: u32,
    latitude: f64,
    longitude: f64,
    altitude_gnss: i32,
    altitude_baro: i32,
) -> String {
    let secs = seconds_of_day % 86_400;
    format!(
        "B{:02}{:02}{:02}{}{}A{}{}",
        secs / 3600,
        secs / 60 % 60,
        secs % 60,
        coordinate(latitude, 2, 'N', 'S'),
        coordinate(longitude, 3, 'E', 'W'),
        altitude(altitude_gnss),
        altitude(altitude_baro)
    )
}

/// Degrees, then minutes in thousandths, then the hemisphere letter.
fn coordinate(value: f64, degree_width: usize, positive: char, negative: char) -> String {
    let hemisphere = if value < 0.0 { negative } else { positive };
    let thousandths = (value.abs() * 60_000.0).round() as u64;
    format!(
        "{:0width$}{:05}{}",
        thousandths / 60_000,
        thousandths % 60_000,
        hemisphere,
        width = degree_width
    )
}

fn altitude(metres: i32) -> String {
    let metres = metres.clamp(-9_999, 99_999);
    if metres < 0 {
        format!("-{:04}", -metres)
    } else {
        format!("{:05}", metres)
    }
}
