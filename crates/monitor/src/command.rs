//! Typed light-control commands.
//!
//! A sheet row carries an action name and a JSON parameter blob. Both are
//! resolved into a closed [`Action`] once, before dispatch, so malformed
//! operator input is rejected up front instead of halfway through a
//! service call.

use serde_json::Value;

use crate::error::CommandError;

/// Lifecycle states of the sheet's Status column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandStatus {
    /// Written by the operator; waiting to be processed.
    Pending,
    /// Terminal: the hub call succeeded.
    Completed,
    /// Terminal: the command was rejected or the hub call failed.
    Failed,
}

impl CommandStatus {
    /// The exact text written to the Status column.
    pub fn as_str(self) -> &'static str {
        match self {
            CommandStatus::Pending => "pending",
            CommandStatus::Completed => "completed",
            CommandStatus::Failed => "failed",
        }
    }

    /// Case-insensitive match against a raw status cell.
    pub fn matches(self, cell: &str) -> bool {
        cell.trim().eq_ignore_ascii_case(self.as_str())
    }
}

impl std::fmt::Display for CommandStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An RGB color decoded from a hex string.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    /// Opaque white, the default when no color parameter is given.
    pub const WHITE: Rgb = Rgb {
        r: 255,
        g: 255,
        b: 255,
    };

    /// Decode a `#RRGGBB` string; the `#` is optional, hex digits are
    /// case-insensitive, anything but exactly 6 of them is rejected.
    pub fn from_hex(hex: &str) -> Result<Self, CommandError> {
        let digits = hex.trim().trim_start_matches('#');
        if digits.len() != 6 || !digits.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(CommandError::InvalidColor(hex.to_string()));
        }
        let channel = |i: usize| {
            u8::from_str_radix(&digits[i..i + 2], 16)
                .map_err(|_| CommandError::InvalidColor(hex.to_string()))
        };
        Ok(Rgb {
            r: channel(0)?,
            g: channel(2)?,
            b: channel(4)?,
        })
    }
}

/// Rescale a 0-100 percentage onto the hub's 0-255 brightness scale.
pub fn percent_to_brightness(percent: u8) -> u8 {
    ((u32::from(percent) * 255 + 50) / 100) as u8
}

/// A light-control action with its parameters already validated.
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    On,
    Off,
    Brightness { percent: u8 },
    Color { rgb: Rgb },
    Scene { name: String },
}

impl Action {
    /// Parse an action name and its parameter blob.
    ///
    /// Brightness is clamped to the 0-100 scale here; color strings are
    /// decoded here. A failure means the row is marked failed without any
    /// hub call being made.
    pub fn parse(name: &str, params: &Value) -> Result<Self, CommandError> {
        match name.trim() {
            "on" => Ok(Action::On),
            "off" => Ok(Action::Off),
            "brightness" => {
                let percent = match params.get("brightness") {
                    None => 100,
                    Some(v) => v
                        .as_f64()
                        .ok_or_else(|| CommandError::InvalidBrightness(v.to_string()))?
                        .clamp(0.0, 100.0)
                        .round() as u8,
                };
                Ok(Action::Brightness { percent })
            }
            "color" => {
                let rgb = match params.get("color") {
                    None => Rgb::WHITE,
                    Some(v) => {
                        let hex = v
                            .as_str()
                            .ok_or_else(|| CommandError::InvalidColor(v.to_string()))?;
                        Rgb::from_hex(hex)?
                    }
                };
                Ok(Action::Color { rgb })
            }
            "scene" => {
                let name = params
                    .get("scene")
                    .and_then(Value::as_str)
                    .ok_or(CommandError::MissingScene)?;
                Ok(Action::Scene {
                    name: name.to_string(),
                })
            }
            other => Err(CommandError::UnknownAction(other.to_string())),
        }
    }
}

/// Dispatch target lifted from the parameter blob.
///
/// Resolution against the configured light mapping happens at dispatch
/// time; an explicit entity id always wins.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Target {
    pub entity_id: Option<String>,
    pub light_name: Option<String>,
}

impl Target {
    fn from_params(params: &Value) -> Self {
        let field = |key: &str| {
            params
                .get(key)
                .and_then(Value::as_str)
                .map(str::to_string)
        };
        Target {
            entity_id: field("entity_id"),
            light_name: field("light_name"),
        }
    }
}

/// A raw pending row read from the command sheet.
#[derive(Debug, Clone)]
pub struct CommandRow {
    /// Operator-chosen identifier; not required to be unique.
    pub id: String,

    /// Raw action name.
    pub action: String,

    /// Decoded parameter blob.
    pub params: Value,

    /// Informational only; never used for ordering or dedup.
    pub timestamp: String,

    /// Absolute 1-based sheet row, used to target the status write-back.
    pub source_row: u32,
}

/// A fully parsed command, ready for dispatch.
#[derive(Debug, Clone, PartialEq)]
pub struct Command {
    pub id: String,
    pub action: Action,
    pub target: Target,
    pub timestamp: String,
    pub source_row: u32,
}

impl Command {
    /// Parse a pending sheet row into a dispatchable command.
    pub fn from_row(row: &CommandRow) -> Result<Self, CommandError> {
        let action = Action::parse(&row.action, &row.params)?;
        Ok(Command {
            id: row.id.clone(),
            action,
            target: Target::from_params(&row.params),
            timestamp: row.timestamp.clone(),
            source_row: row.source_row,
        })
    }
}
