// Vitals normalization: loosely typed caller input → canonical numbers + prompt summary.
// Never fails. Anything that cannot be read cleanly becomes "absent".

use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;
use serde_json::Value;

use super::types::RawVitals;

/// Summary text when no vital sign is present.
pub const VITALS_NOT_SPECIFIED: &str = "не указаны";

/// `<2-3 ASCII digits><sep><2-3 ASCII digits>` where sep is `/`, `\` or `-`,
/// with nothing in between. First match wins.
static BLOOD_PRESSURE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"([0-9]{2,3})[/\\-]([0-9]{2,3})").expect("blood pressure pattern compiles")
});

/// Canonical vitals. Every field is a clean number or `None`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct NormalizedVitals {
    pub bp_systolic: Option<i32>,
    pub bp_diastolic: Option<i32>,
    pub heart_rate: Option<i32>,
    pub spo2: Option<i32>,
    pub temperature: Option<f64>,
    pub respiratory_rate: Option<i32>,
    pub glasgow_coma_score: Option<i32>,
}

/// Normalize caller vitals. `None` yields all-absent vitals.
pub fn normalize_vitals(raw: Option<&RawVitals>) -> NormalizedVitals {
    let Some(raw) = raw else {
        return NormalizedVitals::default();
    };

    let (bp_systolic, bp_diastolic) = match parse_blood_pressure(raw.bp.as_ref()) {
        Some((sys, dia)) => (Some(sys), Some(dia)),
        None => (None, None),
    };

    NormalizedVitals {
        bp_systolic,
        bp_diastolic,
        heart_rate: parse_integer(raw.hr.as_ref()),
        spo2: parse_integer(raw.spo2.as_ref()),
        temperature: parse_number(raw.temp.as_ref()),
        respiratory_rate: parse_integer(raw.rr.as_ref()),
        glasgow_coma_score: parse_integer(raw.gcs.as_ref()),
    }
}

impl NormalizedVitals {
    /// Deterministic one-line summary used in the prompt.
    ///
    /// Fixed order: blood pressure, heart rate, SpO₂, temperature,
    /// respiratory rate, Glasgow score. Only present fields are emitted.
    pub fn summary(&self) -> String {
        let mut parts: Vec<String> = Vec::with_capacity(6);

        if let (Some(sys), Some(dia)) = (self.bp_systolic, self.bp_diastolic) {
            parts.push(format!("АД: {sys}/{dia}"));
        }
        if let Some(hr) = self.heart_rate {
            parts.push(format!("ЧСС: {hr}"));
        }
        if let Some(spo2) = self.spo2 {
            parts.push(format!("SpO₂: {spo2}%"));
        }
        if let Some(temp) = self.temperature {
            parts.push(format!("T: {}°C", format_decimal(temp)));
        }
        if let Some(rr) = self.respiratory_rate {
            parts.push(format!("ЧДД: {rr}"));
        }
        if let Some(gcs) = self.glasgow_coma_score {
            parts.push(format!("GCS: {gcs}"));
        }

        if parts.is_empty() {
            VITALS_NOT_SPECIFIED.to_string()
        } else {
            parts.join("; ")
        }
    }

    /// Number of absent vital groups (blood pressure counts once), out of 6.
    pub fn missing_count(&self) -> usize {
        let present = [
            self.bp_systolic.is_some() && self.bp_diastolic.is_some(),
            self.heart_rate.is_some(),
            self.spo2.is_some(),
            self.temperature.is_some(),
            self.respiratory_rate.is_some(),
            self.glasgow_coma_score.is_some(),
        ];
        present.iter().filter(|p| !**p).count()
    }
}

/// Extract `(systolic, diastolic)` from free text like "АД 180/110 мм рт. ст.".
/// No cross-check between the two halves.
pub fn parse_blood_pressure(value: Option<&Value>) -> Option<(i32, i32)> {
    let text = scalar_text(value?)?;
    let caps = BLOOD_PRESSURE.captures(&text)?;
    let sys = caps.get(1)?.as_str().parse().ok()?;
    let dia = caps.get(2)?.as_str().parse().ok()?;
    Some((sys, dia))
}

/// Read a JSON value as a float. Strings accept a comma decimal separator.
/// Empty, non-numeric and non-finite input gives `None`.
pub fn parse_number(value: Option<&Value>) -> Option<f64> {
    let number = match value? {
        Value::Number(n) => n.as_f64()?,
        Value::String(s) => {
            let trimmed = s.trim();
            if trimmed.is_empty() {
                return None;
            }
            trimmed.replace(',', ".").parse::<f64>().ok()?
        }
        _ => return None,
    };
    number.is_finite().then_some(number)
}

/// Float parse, then truncate toward zero. Values outside `i32` are absent.
pub fn parse_integer(value: Option<&Value>) -> Option<i32> {
    parse_number(value).and_then(|n| i32::try_from(n.trunc() as i64).ok())
}

/// Text form of a scalar JSON value; `None` for null, arrays and objects.
pub(crate) fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Null | Value::Array(_) | Value::Object(_) => None,
    }
}

/// `38.0` → "38.0", `36.6` → "36.6".
fn format_decimal(value: f64) -> String {
    if value.fract() == 0.0 {
        format!("{value:.1}")
    } else {
        format!("{value}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn raw(value: Value) -> RawVitals {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn absent_vitals_are_all_none() {
        let vitals = normalize_vitals(None);
        assert_eq!(vitals, NormalizedVitals::default());
        assert_eq!(vitals.summary(), "не указаны");
        assert_eq!(vitals.missing_count(), 6);
    }

    #[test]
    fn empty_object_renders_placeholder() {
        let vitals = normalize_vitals(Some(&RawVitals::default()));
        assert_eq!(vitals.summary(), VITALS_NOT_SPECIFIED);
    }

    #[test]
    fn blood_pressure_slash() {
        assert_eq!(parse_blood_pressure(Some(&json!("180/110"))), Some((180, 110)));
    }

    #[test]
    fn blood_pressure_backslash_and_dash() {
        assert_eq!(parse_blood_pressure(Some(&json!("120\\80"))), Some((120, 80)));
        assert_eq!(parse_blood_pressure(Some(&json!("130-85"))), Some((130, 85)));
    }

    #[test]
    fn blood_pressure_inside_text() {
        assert_eq!(
            parse_blood_pressure(Some(&json!("АД 140/90 мм рт. ст."))),
            Some((140, 90))
        );
    }

    #[test]
    fn blood_pressure_separator_must_be_adjacent() {
        assert_eq!(parse_blood_pressure(Some(&json!("120 / 80"))), None);
        assert_eq!(parse_blood_pressure(Some(&json!("120 /80"))), None);
    }

    #[test]
    fn blood_pressure_ignores_non_ascii_digits() {
        assert_eq!(parse_blood_pressure(Some(&json!("١٢٠/٨٠"))), None);
        assert_eq!(
            parse_blood_pressure(Some(&json!("١٢٠/٨٠ или 125/85"))),
            Some((125, 85))
        );
    }

    #[test]
    fn blood_pressure_first_match_wins() {
        assert_eq!(
            parse_blood_pressure(Some(&json!("утром 150/95, вечером 130/80"))),
            Some((150, 95))
        );
    }

    #[test]
    fn blood_pressure_no_match_is_absent() {
        assert_eq!(parse_blood_pressure(Some(&json!("abc"))), None);
        assert_eq!(parse_blood_pressure(Some(&json!("120"))), None);
        assert_eq!(parse_blood_pressure(Some(&json!(120))), None);
        assert_eq!(parse_blood_pressure(Some(&Value::Null)), None);
        assert_eq!(parse_blood_pressure(None), None);
    }

    #[test]
    fn blood_pressure_accepts_reversed_pair() {
        assert_eq!(parse_blood_pressure(Some(&json!("80/120"))), Some((80, 120)));
    }

    #[test]
    fn numbers_from_strings_and_numbers() {
        assert_eq!(parse_number(Some(&json!("98,6"))), Some(98.6));
        assert_eq!(parse_number(Some(&json!(" 37.2 "))), Some(37.2));
        assert_eq!(parse_number(Some(&json!(92))), Some(92.0));
        assert_eq!(parse_number(Some(&json!(""))), None);
        assert_eq!(parse_number(Some(&json!("высокая"))), None);
        assert_eq!(parse_number(Some(&json!("NaN"))), None);
        assert_eq!(parse_number(Some(&json!(true))), None);
        assert_eq!(parse_number(Some(&Value::Null)), None);
    }

    #[test]
    fn integers_truncate_toward_zero() {
        assert_eq!(parse_integer(Some(&json!("98,6"))), Some(98));
        assert_eq!(parse_integer(Some(&json!(110.9))), Some(110));
        assert_eq!(parse_integer(Some(&json!("-3.7"))), Some(-3));
    }

    #[test]
    fn integers_out_of_range_are_absent() {
        assert_eq!(parse_integer(Some(&json!("1e12"))), None);
        assert_eq!(parse_integer(Some(&json!(-3e9))), None);
        assert_eq!(parse_integer(Some(&json!(1e300))), None);
        assert_eq!(parse_integer(Some(&json!(2147483647))), Some(i32::MAX));
        let vitals = normalize_vitals(Some(&raw(json!({"hr": "1e12", "rr": 20}))));
        assert_eq!(vitals.heart_rate, None);
        assert_eq!(vitals.summary(), "ЧДД: 20");
    }

    #[test]
    fn temperature_keeps_float() {
        let vitals = normalize_vitals(Some(&raw(json!({"temp": "38,5"}))));
        assert_eq!(vitals.temperature, Some(38.5));
        assert_eq!(vitals.summary(), "T: 38.5°C");
    }

    #[test]
    fn whole_temperature_keeps_one_decimal() {
        let vitals = normalize_vitals(Some(&raw(json!({"temp": 38}))));
        assert_eq!(vitals.summary(), "T: 38.0°C");
    }

    #[test]
    fn chest_pain_scenario() {
        let vitals = normalize_vitals(Some(&raw(json!({
            "hr": "110",
            "bp": "180/110",
            "spo2": "92"
        }))));
        assert_eq!(vitals.heart_rate, Some(110));
        assert_eq!(vitals.bp_systolic, Some(180));
        assert_eq!(vitals.bp_diastolic, Some(110));
        assert_eq!(vitals.spo2, Some(92));
        assert_eq!(vitals.summary(), "АД: 180/110; ЧСС: 110; SpO₂: 92%");
        assert_eq!(vitals.missing_count(), 3);
    }

    #[test]
    fn full_summary_order() {
        let vitals = normalize_vitals(Some(&raw(json!({
            "gcs": 14,
            "rr": "24",
            "temp": "36,6",
            "spo2": 97,
            "hr": 88,
            "bp": "120/80"
        }))));
        assert_eq!(
            vitals.summary(),
            "АД: 120/80; ЧСС: 88; SpO₂: 97%; T: 36.6°C; ЧДД: 24; GCS: 14"
        );
        assert_eq!(vitals.missing_count(), 0);
    }

    #[test]
    fn malformed_fields_degrade_individually() {
        let vitals = normalize_vitals(Some(&raw(json!({
            "bp": "не измерено",
            "hr": "много",
            "spo2": {"value": 95},
            "rr": 18
        }))));
        assert_eq!(vitals.bp_systolic, None);
        assert_eq!(vitals.bp_diastolic, None);
        assert_eq!(vitals.heart_rate, None);
        assert_eq!(vitals.spo2, None);
        assert_eq!(vitals.respiratory_rate, Some(18));
        assert_eq!(vitals.summary(), "ЧДД: 18");
    }
}
