use std::collections::HashMap;

use crate::{OutputId, OutputReading, StationStatus, TimeRemaining};

/// Round to the nearest integer, with halves going towards positive infinity.
///
/// `f64::round` sends halves away from zero, which differs for negative
/// sums such as `-2.5`.
pub(crate) fn round_half_up(value: f64) -> f64 {
    let floor = value.floor();
    if value - floor >= 0.5 {
        floor + 1.0
    } else {
        floor
    }
}

/// Round to one decimal place from the exact binary value, halves going
/// away from zero.
///
/// Scaling by 10 first would add a rounding error of its own and push values
/// just below a `.x5` tie over it. Thirty digits always separate a double
/// below 1e21 from such a tie.
pub(crate) fn round_to_tenths(value: f64) -> f64 {
    if !value.is_finite() || value.abs() >= 1e21 {
        return value;
    }

    let digits = format!("{:.30}", value.abs());
    let Some((integer, fraction)) = digits.split_once('.') else {
        return value;
    };
    let mut fraction = fraction.bytes();
    let tenth = fraction.next().unwrap_or(b'0');
    let next = fraction.next().unwrap_or(b'0');

    let Ok(mut tenths) = format!("{}{}", integer, tenth as char).parse::<u128>() else {
        return value;
    };
    if next >= b'5' {
        tenths += 1;
    }

    let sign = if value < 0.0 { "-" } else { "" };
    format!("{}{}.{}", sign, tenths / 10, tenths % 10)
        .parse()
        .unwrap_or(value)
}

/// Upper clamp only. A NaN `value` is returned unchanged, unlike `f64::min`.
pub(crate) fn cap(value: f64, ceiling: f64) -> f64 {
    if value > ceiling { ceiling } else { value }
}

pub(crate) fn total_output_power(
    outputs: &HashMap<OutputId, OutputReading>,
    maximum_output_w: f64,
) -> f64 {
    let raw: f64 = outputs.values().map(OutputReading::power_w).sum();
    cap(round_half_up(raw), maximum_output_w)
}

pub(crate) fn time_remaining(capacity_wh: f64, charge_wh: f64, net_power_w: f64) -> TimeRemaining {
    if net_power_w == 0.0 {
        return TimeRemaining::Indefinite;
    }

    let hours = if net_power_w > 0.0 {
        // Time to full
        (capacity_wh - charge_wh) / net_power_w
    } else {
        // Time to empty, NaN net power lands here too
        charge_wh / -net_power_w
    };

    if !hours.is_finite() || hours < 0.0 {
        return TimeRemaining::Indefinite;
    }

    // Saturates for estimates beyond u64 minutes
    let minutes = round_half_up(hours * 60.0) as u64;
    TimeRemaining::Finite { minutes }
}

pub(crate) fn classify(
    input_power_w: f64,
    total_output_power_w: f64,
    maximum_input_w: f64,
    maximum_output_w: f64,
) -> StationStatus {
    if input_power_w > maximum_input_w || total_output_power_w > maximum_output_w {
        StationStatus::Overload
    } else if input_power_w > total_output_power_w && input_power_w > 0.0 {
        StationStatus::Charging
    } else if total_output_power_w > input_power_w && total_output_power_w > 0.0 {
        StationStatus::Discharging
    } else {
        StationStatus::Idle
    }
}




#[cfg(test)]
mod test_classify {
    use super::*;

    #[test]
    fn test_precedence() {
        assert_eq!(classify(600.0, 0.0, 500.0, 500.0), StationStatus::Overload);
        assert_eq!(classify(0.0, 600.0, 500.0, 500.0), StationStatus::Overload);
        assert_eq!(classify(200.0, 50.0, 500.0, 500.0), StationStatus::Charging);
        assert_eq!(classify(50.0, 200.0, 500.0, 500.0), StationStatus::Discharging);
        assert_eq!(classify(0.0, 0.0, 500.0, 500.0), StationStatus::Idle);
        assert_eq!(classify(100.0, 100.0, 500.0, 500.0), StationStatus::Idle);
    }

    #[test]
    fn test_negative_flows() {
        // Input above output but not positive
        assert_eq!(classify(-10.0, -50.0, 500.0, 500.0), StationStatus::Idle);
        // Negative input with positive output
        assert_eq!(classify(-10.0, 20.0, 500.0, 500.0), StationStatus::Discharging);
    }
}
