use serde::Serialize;
use serde_json::{Map, Value};

use super::{DecodeError, Payload};

/// Wire keys of the `AllRd` payload.
mod key {
    pub const CLOCK: &str = "Clock";
    pub const CURRENT_SPEED: &str = "CurrentSpeed";
    pub const CURRENT_POWER: &str = "CurrentPower";
    pub const RUNNING_STATUS: &str = "RunningStatus";
    pub const FAULT_STATUS: &str = "FaultStatus";
    pub const FAULT_CODE: &str = "FaultCode";
    pub const SPEED_SELECTION: &str = "CurrentSpeedSel";
    /// Misspelled by the firmware. The device only knows this spelling.
    pub const TEMPERATURE: &str = "CurrentTemperture";
    pub const FREE_MODE: &str = "FreeMode";
    pub const SCHEDULE_SELECTION: &str = "CurrentSchSel";
    pub const CURRENT_FLOW: &str = "CurrentFlow";
    pub const SPEED_COUNT: &str = "SpeedNum";
    pub const SCHEDULE_COUNT: &str = "SchNum";
    pub const MODEL: &str = "Model";
}

/// Snapshot of the pump's live status, read with `AllRd`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct PumpState {
    /// Device clock as reported, e.g. "14:05".
    pub clock: String,
    pub current_speed: u32,
    /// Power draw in watts.
    pub current_power: u32,
    pub running: bool,
    pub fault: bool,
    pub fault_code: u32,
    /// Speed preset in use (1-4), or 0 when none is selected.
    pub speed_preset: u8,
    pub temperature: i32,
    pub free_mode: bool,
    /// Schedule slot in effect (1-4), or 0 when none is active.
    pub schedule: u8,
    pub current_flow: u32,
    pub speed_preset_count: u8,
    pub schedule_count: u8,
    pub model: String,
}

impl PumpState {
    pub fn from_payload(map: &Map<String, Value>) -> Result<Self, DecodeError> {
        let p = Payload::new(map);
        Ok(Self {
            clock: p.string(key::CLOCK)?,
            current_speed: p.int(key::CURRENT_SPEED)?,
            current_power: p.int(key::CURRENT_POWER)?,
            running: p.flag(key::RUNNING_STATUS)?,
            fault: p.flag(key::FAULT_STATUS)?,
            fault_code: p.int(key::FAULT_CODE)?,
            speed_preset: p.int(key::SPEED_SELECTION)?,
            temperature: p.int(key::TEMPERATURE)?,
            free_mode: p.flag(key::FREE_MODE)?,
            schedule: p.int(key::SCHEDULE_SELECTION)?,
            current_flow: p.int(key::CURRENT_FLOW)?,
            speed_preset_count: p.int(key::SPEED_COUNT)?,
            schedule_count: p.int(key::SCHEDULE_COUNT)?,
            model: p.string(key::MODEL)?,
        })
    }
}
