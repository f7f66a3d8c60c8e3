//! Scripted events: inventory objects of a reserved type that bind a script
//! to something happening to their container.
//!
//! The plugin id lives in the object's name, the script path in `race`, the
//! options in `slaying` and the event kind in `sub_type`.

use std::fmt;

use crate::diff::{attribute_str, attribute_value, line_key};

use super::archetype::Archetype;
use super::instance::Instance;

/// Type number reserved for scripted events.
pub const EVENT_TYPE: i32 = 118;

/// Plugin assumed when an event names none.
pub const DEFAULT_PLUGIN: &str = "Python";

/// What triggers an event, by `sub_type` number.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    Apply = 1,
    Attack,
    Death,
    Drop,
    Pickup,
    Say,
    Stop,
    Time,
    Throw,
    Trigger,
    Close,
    Timer,
}

impl EventKind {
    const ALL: [EventKind; 12] = [
        EventKind::Apply,
        EventKind::Attack,
        EventKind::Death,
        EventKind::Drop,
        EventKind::Pickup,
        EventKind::Say,
        EventKind::Stop,
        EventKind::Time,
        EventKind::Throw,
        EventKind::Trigger,
        EventKind::Close,
        EventKind::Timer,
    ];

    pub fn from_sub_type(sub_type: i32) -> Option<Self> {
        usize::try_from(sub_type - 1)
            .ok()
            .and_then(|i| Self::ALL.get(i).copied())
    }

    pub fn sub_type(self) -> i32 {
        self as i32
    }

    pub fn name(self) -> &'static str {
        match self {
            EventKind::Apply => "apply",
            EventKind::Attack => "attack",
            EventKind::Death => "death",
            EventKind::Drop => "drop",
            EventKind::Pickup => "pickup",
            EventKind::Say => "say",
            EventKind::Stop => "stop",
            EventKind::Time => "time",
            EventKind::Throw => "throw",
            EventKind::Trigger => "trigger",
            EventKind::Close => "close",
            EventKind::Timer => "timer",
        }
    }
}

/// Display name of a `sub_type` number.
pub fn event_kind_name(sub_type: i32) -> &'static str {
    EventKind::from_sub_type(sub_type).map_or("<invalid type>", EventKind::name)
}

/// Event data extracted from an event object.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScriptedEvent {
    pub plugin: String,
    pub path: String,
    pub options: String,
    pub sub_type: i32,
}

impl ScriptedEvent {
    /// Read event data from an instance, inheriting from its archetype.
    pub fn from_instance(inst: &Instance, arch: Option<&Archetype>) -> Self {
        let arch_lines: &[String] = arch.map_or(&[], |a| &a.attributes);
        let plugin = inst
            .name
            .as_deref()
            .or_else(|| arch.and_then(|a| a.object_name.as_deref()))
            .unwrap_or("");
        Self {
            plugin: plugin.to_string(),
            path: attribute_str(&inst.attributes, arch_lines, "race")
                .unwrap_or("")
                .to_string(),
            options: attribute_str(&inst.attributes, arch_lines, "slaying")
                .unwrap_or("")
                .to_string(),
            sub_type: attribute_value(&inst.attributes, arch_lines, "sub_type"),
        }
    }

    pub fn kind(&self) -> Option<EventKind> {
        EventKind::from_sub_type(self.sub_type)
    }

    /// An event needs a script path to do anything.
    pub fn is_valid(&self) -> bool {
        !self.path.trim().is_empty()
    }

    /// Fill in the plugin default and normalize path separators.
    pub fn normalize(&mut self) {
        if self.plugin.trim().is_empty() {
            self.plugin = DEFAULT_PLUGIN.to_string();
        }
        self.path = self.path.replace('\\', "/");
    }

    /// Write the event data back into an event object.
    ///
    /// Existing `race`, `slaying` and `sub_type` lines are rewritten in place;
    /// missing ones are appended. An empty option string removes `slaying`.
    pub fn write_into(&self, inst: &mut Instance) {
        if !self.plugin.is_empty() {
            inst.name = Some(self.plugin.clone());
        }
        set_line(&mut inst.attributes, "race", Some(&self.path));
        let options = (!self.options.is_empty()).then_some(self.options.as_str());
        set_line(&mut inst.attributes, "slaying", options);
        set_line(&mut inst.attributes, "sub_type", Some(&self.sub_type.to_string()));
    }
}

impl fmt::Display for ScriptedEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} event ({}: {})", event_kind_name(self.sub_type), self.plugin, self.path)
    }
}

fn set_line(lines: &mut Vec<String>, key: &str, value: Option<&str>) {
    let line = value.map(|v| format!("{} {}", key, v));
    match (lines.iter().position(|l| line_key(l) == key), line) {
        (Some(pos), Some(line)) => lines[pos] = line,
        (Some(pos), None) => {
            lines.remove(pos);
        }
        (None, Some(line)) => lines.push(line),
        (None, None) => {}
    }
}
