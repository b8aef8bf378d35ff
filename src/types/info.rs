use serde_json::{Map, Value};

const NOT_AVAILABLE: &str = "N/A";

// Key spellings differ between logger releases; earlier entries win.
const HOST_VERSION_KEYS: &[&str] = &["host version", "EVM version", "host_version"];
const FW_VERSION_KEYS: &[&str] = &["fw version", "fw_version"];
const LOGGER_VERSION_KEYS: &[&str] = &["logger version", "logger_version"];
const SERIAL_NUMBER_KEYS: &[&str] = &["serial number", "serial_number"];

/// Device/firmware metadata taken from the log's `info` entry
#[derive(Debug, Clone, Copy)]
pub struct DeviceInfo<'a> {
    fields: Option<&'a Map<String, Value>>,
}

impl<'a> DeviceInfo<'a> {
    pub fn new(fields: Option<&'a Map<String, Value>>) -> Self {
        Self { fields }
    }

    pub fn is_empty(&self) -> bool {
        self.fields.map(Map::is_empty).unwrap_or(true)
    }

    /// The mapping as a JSON object (empty object when there is none)
    pub fn to_value(&self) -> Value {
        Value::Object(self.fields.cloned().unwrap_or_default())
    }

    pub fn host_version(&self) -> String {
        self.version_of(HOST_VERSION_KEYS)
    }

    pub fn fw_version(&self) -> String {
        self.version_of(FW_VERSION_KEYS)
    }

    pub fn logger_version(&self) -> String {
        self.version_of(LOGGER_VERSION_KEYS)
    }

    pub fn serial_number(&self) -> String {
        self.version_of(SERIAL_NUMBER_KEYS)
    }

    /// One-line banner, e.g. `Host: 1.2 | FW: 3.4.5 | Logger: 3 | Serial: N/A`
    pub fn summary(&self) -> String {
        format!(
            "Host: {} | FW: {} | Logger: {} | Serial: {}",
            self.host_version(),
            self.fw_version(),
            self.logger_version(),
            self.serial_number()
        )
    }

    fn version_of(&self, keys: &[&str]) -> String {
        let Some(fields) = self.fields else {
            return NOT_AVAILABLE.to_string();
        };
        keys.iter()
            .filter_map(|key| fields.get(*key))
            .find(|value| is_present(value))
            .map(format_version)
            .unwrap_or_else(|| NOT_AVAILABLE.to_string())
    }
}

/// Null, `false`, zero and blank strings count as "not recorded"
fn is_present(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().map(|f| f != 0.0).unwrap_or(true),
        Value::String(s) => !s.trim().is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

fn format_version(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Array(parts) => parts
            .iter()
            .map(|part| match part {
                Value::String(s) => s.clone(),
                Value::Null => String::new(),
                other => other.to_string(),
            })
            .collect::<Vec<_>>()
            .join("."),
        other => other.to_string(),
    }
}
