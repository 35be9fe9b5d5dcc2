use std::fmt::Write;

use avr_calc::uart::{achieved_baud, error_permille};
use avr_calc::{ClockConfig, TimerId, TimerSetting};
use log::{debug, warn};
use serde::Serialize;

use crate::TableError;

/// Rates from the AVR datasheet baud rate tables.
pub const DEFAULT_BAUD_RATES: [u32; 12] = [
    2400, 4800, 9600, 14400, 19200, 28800, 38400, 57600, 76800, 115200, 230400, 250000,
];

#[derive(Serialize, Debug, PartialEq)]
pub struct BaudRow {
    pub baud: u32,
    pub ubrr: Option<u16>,
    pub achieved: Option<u32>,
    pub error_permille: Option<u32>,
}

#[derive(Serialize, Debug, PartialEq)]
pub struct BaudTable {
    pub clock_hz: u32,
    pub double_speed: bool,
    pub max_error_permille: Option<u16>,
    pub rows: Vec<BaudRow>,
}

impl BaudTable {
    pub fn compute(config: &ClockConfig, double_speed: bool, rates: &[u32]) -> Self {
        let clock_hz = config.clock_hz();
        let rows = rates
            .iter()
            .map(|&baud| match config.solve_baud(baud, double_speed) {
                Ok(ubrr) => {
                    let ubrr = ubrr as u16;
                    let achieved = achieved_baud(clock_hz, ubrr, double_speed);
                    debug!("{} baud: UBRR {} gives {}", baud, ubrr, achieved);
                    BaudRow {
                        baud,
                        ubrr: Some(ubrr),
                        achieved: Some(achieved),
                        error_permille: Some(error_permille(achieved, baud)),
                    }
                }
                Err(e) => {
                    warn!("{} baud at {} Hz: {}", baud, clock_hz, e);
                    BaudRow {
                        baud,
                        ubrr: None,
                        achieved: None,
                        error_permille: None,
                    }
                }
            })
            .collect();

        Self {
            clock_hz,
            double_speed,
            max_error_permille: config.baud_margin().map(|margin| margin.permille()),
            rows,
        }
    }

    pub fn to_json(&self) -> Result<String, TableError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn to_rust(&self) -> String {
        let mut out = String::new();
        let _ = writeln!(
            out,
            "// UBRRn values for F_CPU = {} Hz, U2X {}",
            self.clock_hz,
            if self.double_speed { "on" } else { "off" }
        );
        for row in &self.rows {
            match (row.ubrr, row.achieved, row.error_permille) {
                (Some(ubrr), Some(achieved), Some(error)) => {
                    let _ = writeln!(
                        out,
                        "pub const UBRR_{}: u16 = {}; // {} baud, {}",
                        row.baud,
                        ubrr,
                        achieved,
                        percent(error)
                    );
                }
                _ => match self.max_error_permille {
                    Some(max) => {
                        let _ = writeln!(out, "// {} baud: no UBRRn within {}", row.baud, percent(u32::from(max)));
                    }
                    None => {
                        let _ = writeln!(out, "// {} baud: no UBRRn", row.baud);
                    }
                },
            }
        }
        out
    }
}

#[derive(Serialize, Debug, PartialEq)]
pub struct TimerRow {
    pub frequency: u32,
    pub setting: Option<TimerSetting>,
    pub cs_bits: Option<u8>,
    pub prescaler: Option<u16>,
    pub achieved: Option<u32>,
}

#[derive(Serialize, Debug, PartialEq)]
pub struct TimerTable {
    pub clock_hz: u32,
    pub timer: TimerId,
    pub rows: Vec<TimerRow>,
}

impl TimerTable {
    pub fn compute(config: &ClockConfig, timer: TimerId, frequencies: &[u32]) -> Self {
        let clock_hz = config.clock_hz();
        let rows = frequencies
            .iter()
            .map(|&frequency| {
                let setting = config.solve_timer(frequency, timer);
                match &setting {
                    Ok(s) => debug!("{:?} at {} Hz: {:?}", timer, frequency, s),
                    Err(e) => warn!("{:?} at {} Hz: {}", timer, frequency, e),
                }
                let setting = setting.ok();
                TimerRow {
                    frequency,
                    setting,
                    cs_bits: setting.map(|s| s.cs_bits()),
                    prescaler: setting.map(|s| s.prescaler()),
                    achieved: setting.map(|s| s.achieved_frequency(clock_hz)),
                }
            })
            .collect();

        Self {
            clock_hz,
            timer,
            rows,
        }
    }

    pub fn to_json(&self) -> Result<String, TableError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn to_rust(&self) -> String {
        let name = format!("{:?}", self.timer).to_uppercase();
        let mut out = String::new();
        let _ = writeln!(out, "// {:?} CTC settings for F_CPU = {} Hz", self.timer, self.clock_hz);
        for row in &self.rows {
            match (row.setting, row.achieved) {
                (Some(setting), Some(achieved)) => {
                    let _ = writeln!(
                        out,
                        "pub const {}_{}HZ_CS: u8 = {}; // clk/{}, {} Hz",
                        name,
                        row.frequency,
                        setting.cs_bits(),
                        setting.prescaler(),
                        achieved
                    );
                    let _ = writeln!(out, "pub const {}_{}HZ_OCR: u16 = {};", name, row.frequency, setting.counter);
                }
                _ => {
                    let _ = writeln!(out, "// {} Hz: out of range", row.frequency);
                }
            }
        }
        out
    }
}

/// Permille as a percentage with one decimal.
fn percent(permille: u32) -> String {
    format!("{}.{}%", permille / 10, permille % 10)
}
