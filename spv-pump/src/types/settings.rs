use serde::Serialize;
use serde_json::{Map, Value};

use super::{DecodeError, Payload};
use crate::params::SLOTS;

/// Number of speed presets and of schedule slots.
pub const SLOT_COUNT: usize = SLOTS as usize;

/// Wire keys of the `AllWr` payload. Numbered keys (`Speed1`,
/// `Sch3OnHour`, ...) are built per slot by the types below.
mod key {
    pub const CLOCK_HOUR: &str = "ClockHour";
    pub const CLOCK_MINUTE: &str = "ClockMin";
    pub const RUN_STOP: &str = "RunStop";
    pub const SPEED: &str = "SetCurrentSpeed";
    pub const SPEED_SELECTION: &str = "SetCurrentSpeedSel";
    pub const LANGUAGE: &str = "Language";
    pub const LANGUAGE_CODE: &str = "LanguageCode";
    pub const FREEZE_ENABLE: &str = "FreezeEnable";
    pub const FREEZE_LASTING_TIME: &str = "FreezeLastTime";
    pub const FREEZE_SPEED: &str = "FreezeSpeed";
    pub const FREEZE_TEMPERATURE: &str = "FreezeTemp";
    pub const RESET_WIFI: &str = "ResetWifi";
    pub const FACTORY_RESET: &str = "FactoryReset";
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct TimeOfDay {
    pub hour: u8,
    pub minute: u8,
}

impl TimeOfDay {
    fn decode(p: &Payload<'_>, hour_key: &str, minute_key: &str) -> Result<Self, DecodeError> {
        Ok(Self {
            hour: p.bounded(hour_key, 0, 23)?,
            minute: p.bounded(minute_key, 0, 59)?,
        })
    }
}

/// One stored speed preset.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct SpeedPreset {
    pub speed: u32,
    pub title: String,
}

impl SpeedPreset {
    fn decode(p: &Payload<'_>, n: u8) -> Result<Self, DecodeError> {
        Ok(Self {
            speed: p.int(&format!("Speed{n}"))?,
            title: p.string(&format!("Speed{n}Title"))?,
        })
    }
}

/// One schedule slot.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Schedule {
    pub enabled: bool,
    pub on: TimeOfDay,
    pub off: TimeOfDay,
    /// Speed preset the pump runs at during this slot (1-4).
    pub speed_preset: u8,
    pub title: String,
}

impl Schedule {
    fn decode(p: &Payload<'_>, n: u8) -> Result<Self, DecodeError> {
        Ok(Self {
            enabled: p.flag(&format!("Sch{n}Enable"))?,
            on: TimeOfDay::decode(p, &format!("Sch{n}OnHour"), &format!("Sch{n}OnMin"))?,
            off: TimeOfDay::decode(p, &format!("Sch{n}OffHour"), &format!("Sch{n}OffMin"))?,
            speed_preset: p.bounded(&format!("Sch{n}SpeedSel"), 1, SLOTS.into())?,
            title: p.string(&format!("Sch{n}Title"))?,
        })
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Language {
    pub index: u8,
    /// Locale code, e.g. "en".
    pub code: String,
}

/// Freeze protection: run at `speed` for `lasting_hours` once the water
/// drops to `trigger_temperature`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct FreezeProtection {
    pub enabled: bool,
    pub lasting_hours: u8,
    pub speed: u32,
    pub trigger_temperature: i32,
}

/// The pump's writable configuration, read with `AllWr`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct PumpSettings {
    pub clock: TimeOfDay,
    pub running: bool,
    pub speed: u32,
    pub speed_preset: u8,
    /// Presets 1-4, in order.
    pub speed_presets: [SpeedPreset; SLOT_COUNT],
    /// Schedule slots 1-4, in order.
    pub schedules: [Schedule; SLOT_COUNT],
    pub language: Language,
    pub freeze_protection: FreezeProtection,
    pub reset_wifi: bool,
    pub factory_reset: bool,
}

impl PumpSettings {
    pub fn from_payload(map: &Map<String, Value>) -> Result<Self, DecodeError> {
        let p = Payload::new(map);
        Ok(Self {
            clock: TimeOfDay::decode(&p, key::CLOCK_HOUR, key::CLOCK_MINUTE)?,
            running: p.flag(key::RUN_STOP)?,
            speed: p.int(key::SPEED)?,
            speed_preset: p.int(key::SPEED_SELECTION)?,
            speed_presets: slots(|n| SpeedPreset::decode(&p, n))?,
            schedules: slots(|n| Schedule::decode(&p, n))?,
            language: Language {
                index: p.int(key::LANGUAGE)?,
                code: p.string(key::LANGUAGE_CODE)?,
            },
            freeze_protection: FreezeProtection {
                enabled: p.flag(key::FREEZE_ENABLE)?,
                lasting_hours: p.int(key::FREEZE_LASTING_TIME)?,
                speed: p.int(key::FREEZE_SPEED)?,
                trigger_temperature: p.int(key::FREEZE_TEMPERATURE)?,
            },
            reset_wifi: p.flag(key::RESET_WIFI)?,
            factory_reset: p.flag(key::FACTORY_RESET)?,
        })
    }
}

/// Decode slots 1 to 4 in order.
fn slots<T>(
    decode: impl Fn(u8) -> Result<T, DecodeError>,
) -> Result<[T; SLOT_COUNT], DecodeError> {
    Ok([decode(1)?, decode(2)?, decode(3)?, decode(4)?])
}
