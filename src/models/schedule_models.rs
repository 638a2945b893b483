use serde::{Deserialize, Serialize};

// --------------------------------------------------------------------------------------------------------------
// Charging / discharging schedules, GET/PUT /v1/systems/{sn}/charging_schedule
// and /v1/systems/{sn}/discharging_schedule.
//
// Both carry up to two daily time windows as "HH:MM" strings plus one SOC
// threshold: the charging schedule stops at max_soc, the discharging
// schedule refuses to drain below min_soc. The API accepts whatever it is
// sent, so validation happens here before a PUT ever leaves the process.
// --------------------------------------------------------------------------------------------------------------

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct ChargingSchedule {
    pub enable:       bool,
    pub start_time_1: String,
    pub end_time_1:   String,
    pub start_time_2: String,
    pub end_time_2:   String,
    /// Stop charging at this state of charge (%).
    pub max_soc:      u8,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct DischargingSchedule {
    pub enable:       bool,
    pub start_time_1: String,
    pub end_time_1:   String,
    pub start_time_2: String,
    pub end_time_2:   String,
    /// Stop discharging at this state of charge (%).
    pub min_soc:      u8,
}

// --------------------------------------------------------------------------------------------------------------

/// Strict 24-hour "HH:MM" check. chrono alone is too lenient here: it
/// happily parses "4:00", which the vendor API rejects.
fn check_time_of_day(field: &str, value: &str) -> Result<(), String> {
    if value.len() != 5 {
        return Err(format!("{} must be HH:MM, got '{}'", field, value));
    }
    chrono::NaiveTime::parse_from_str(value, "%H:%M")
        .map(|_| ())
        .map_err(|_| format!("{} must be HH:MM, got '{}'", field, value))
}

fn check_soc(field: &str, value: u8) -> Result<(), String> {
    if value > 100 {
        return Err(format!("{} must be within 0-100, got {}", field, value));
    }
    Ok(())
}

impl ChargingSchedule {
    pub fn validate(&self) -> Result<(), String> {
        check_time_of_day("start_time_1", &self.start_time_1)?;
        check_time_of_day("end_time_1", &self.end_time_1)?;
        check_time_of_day("start_time_2", &self.start_time_2)?;
        check_time_of_day("end_time_2", &self.end_time_2)?;
        check_soc("max_soc", self.max_soc)
    }

    pub fn demo() -> Self {
        Self {
            enable:       false,
            start_time_1: "00:00".to_string(),
            end_time_1:   "00:00".to_string(),
            start_time_2: "00:00".to_string(),
            end_time_2:   "00:00".to_string(),
            max_soc:      100,
        }
    }
}

impl DischargingSchedule {
    pub fn validate(&self) -> Result<(), String> {
        check_time_of_day("start_time_1", &self.start_time_1)?;
        check_time_of_day("end_time_1", &self.end_time_1)?;
        check_time_of_day("start_time_2", &self.start_time_2)?;
        check_time_of_day("end_time_2", &self.end_time_2)?;
        check_soc("min_soc", self.min_soc)
    }

    pub fn demo() -> Self {
        Self {
            enable:       false,
            start_time_1: "00:00".to_string(),
            end_time_1:   "00:00".to_string(),
            start_time_2: "00:00".to_string(),
            end_time_2:   "00:00".to_string(),
            min_soc:      20,
        }
    }
}

// --------------------------------------------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn charging() -> ChargingSchedule {
        ChargingSchedule {
            enable:       true,
            start_time_1: "14:00".to_string(),
            end_time_1:   "16:00".to_string(),
            start_time_2: "20:00".to_string(),
            end_time_2:   "22:00".to_string(),
            max_soc:      95,
        }
    }

    #[test]
    fn well_formed_schedule_passes() {
        assert!(charging().validate().is_ok());
        assert!(DischargingSchedule::demo().validate().is_ok());
    }

    #[test]
    fn single_digit_hour_is_rejected() {
        let mut schedule = charging();
        schedule.start_time_1 = "4:00".to_string();
        assert!(schedule.validate().is_err());
    }

    #[test]
    fn out_of_range_times_are_rejected() {
        let mut schedule = charging();
        schedule.end_time_1 = "24:00".to_string();
        assert!(schedule.validate().is_err());

        let mut schedule = charging();
        schedule.end_time_2 = "14:60".to_string();
        assert!(schedule.validate().is_err());
    }

    #[test]
    fn soc_above_100_is_rejected() {
        let mut schedule = charging();
        schedule.max_soc = 101;
        assert!(schedule.validate().is_err());

        let discharging = DischargingSchedule { min_soc: 255, ..DischargingSchedule::demo() };
        assert!(discharging.validate().is_err());
    }

    #[test]
    fn schedule_serialization_round_trips() {
        let schedule = charging();
        let json = serde_json::to_string(&schedule).unwrap();
        let back: ChargingSchedule = serde_json::from_str(&json).unwrap();
        assert_eq!(schedule, back);
    }
}
