//! The SPV parameter table.

use super::Domain;

/// Slowest and fastest speed the SPV drive accepts, in RPM.
const SPEED_MIN: i64 = 450;
const SPEED_MAX: i64 = 3450;

/// Speed presets and schedule slots are both numbered 1 to 4 on the wire.
pub(crate) const SLOTS: u8 = 4;

const LANGUAGE_CODES: [&str; 7] = ["en", "fr", "de", "es", "it", "nl", "pt"];

pub(super) fn spv_entries() -> Vec<(String, Domain)> {
    let speed = || Domain::range(SPEED_MIN, SPEED_MAX);
    let flag = || Domain::range(0, 1);
    let hour = || Domain::range(0, 23);
    let minute = || Domain::range(0, 59);
    let preset = || Domain::range(1, SLOTS.into());

    let mut entries = vec![
        ("SetCurrentSpeed".to_string(), speed()),
        ("SetCurrentSpeedSel".to_string(), preset()),
        // 1 = run, 2 = stop
        ("RunStop".to_string(), Domain::range(1, 2)),
        ("ClockHour".to_string(), hour()),
        ("ClockMin".to_string(), minute()),
        (
            "Language".to_string(),
            Domain::range(0, LANGUAGE_CODES.len() as i64 - 1),
        ),
        ("LanguageCode".to_string(), Domain::one_of(LANGUAGE_CODES)),
        ("FreezeEnable".to_string(), flag()),
        ("FreezeLastTime".to_string(), Domain::range(1, 24)),
        ("FreezeSpeed".to_string(), speed()),
        ("FreezeTemp".to_string(), Domain::range(0, 10)),
        // Listed upstream as a bare `1` rather than a range. Kept as a single
        // point until checked against the device documentation.
        ("ResetWifi".to_string(), Domain::SinglePoint(1)),
        ("FactoryReset".to_string(), flag()),
    ];

    for n in 1..=SLOTS {
        entries.push((format!("Speed{n}"), speed()));
        entries.push((format!("Speed{n}Title"), Domain::FreeString));

        entries.push((format!("Sch{n}Enable"), flag()));
        entries.push((format!("Sch{n}OnHour"), hour()));
        entries.push((format!("Sch{n}OnMin"), minute()));
        entries.push((format!("Sch{n}OffHour"), hour()));
        entries.push((format!("Sch{n}OffMin"), minute()));
        entries.push((format!("Sch{n}SpeedSel"), preset()));
        entries.push((format!("Sch{n}Title"), Domain::FreeString));
    }

    entries
}
