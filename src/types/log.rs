use crate::types::{DeviceInfo, FrameView};
use serde_json::{Map, Value};

pub const RESULT_SET_KEY: &str = "Result_Set";
pub const CONFIGURATION_KEY: &str = "configuration";
pub const INFO_KEY: &str = "info";

/// A complete measurement log as read from disk.
///
/// The raw document is kept as-is so that keys this crate knows nothing about
/// survive a split unchanged. Typed access goes through borrowed views.
#[derive(Debug, Clone, PartialEq)]
pub struct MeasurementLog {
    document: Value,
}

impl MeasurementLog {
    pub fn from_value(document: Value) -> Self {
        Self { document }
    }

    pub fn as_value(&self) -> &Value {
        &self.document
    }

    /// Scalar settings recorded by the logger, in document order
    pub fn configuration(&self) -> Option<&Map<String, Value>> {
        self.document.get(CONFIGURATION_KEY)?.as_object()
    }

    /// Raw `info` entry: a list of mappings or a single mapping
    pub fn info(&self) -> Option<&Value> {
        self.document.get(INFO_KEY)
    }

    /// Device metadata: first element of an `info` list, the `info` mapping
    /// itself, or nothing.
    pub fn device_info(&self) -> DeviceInfo<'_> {
        let fields = match self.info() {
            Some(Value::Array(items)) => items.first().and_then(Value::as_object),
            Some(Value::Object(map)) => Some(map),
            _ => None,
        };
        DeviceInfo::new(fields)
    }

    /// Frames in acquisition order. Empty when `Result_Set` is absent.
    pub fn result_set(&self) -> &[Value] {
        self.document
            .get(RESULT_SET_KEY)
            .and_then(Value::as_array)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn frame_count(&self) -> usize {
        self.result_set().len()
    }

    pub fn frame(&self, index: usize) -> Option<FrameView<'_>> {
        self.result_set()
            .get(index)
            .map(|value| FrameView::new(index, value))
    }

    pub fn frames(&self) -> impl Iterator<Item = FrameView<'_>> {
        self.result_set()
            .iter()
            .enumerate()
            .map(|(index, value)| FrameView::new(index, value))
    }

    /// Shallow copy of this log with `Result_Set` replaced by `frames`.
    ///
    /// Every other top-level key is carried over in its original position.
    pub fn with_result_set(&self, frames: Vec<Value>) -> MeasurementLog {
        let mut frames = Some(Value::Array(frames));
        let mut copy = Map::new();

        if let Value::Object(map) = &self.document {
            for (key, value) in map {
                if key == RESULT_SET_KEY {
                    if let Some(frames) = frames.take() {
                        copy.insert(key.clone(), frames);
                    }
                } else {
                    copy.insert(key.clone(), value.clone());
                }
            }
        }
        if let Some(frames) = frames {
            copy.insert(RESULT_SET_KEY.to_string(), frames);
        }
        MeasurementLog::from_value(Value::Object(copy))
    }
}

impl From<Value> for MeasurementLog {
    fn from(document: Value) -> Self {
        Self::from_value(document)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_missing_result_set_is_empty() {
        let log = MeasurementLog::from_value(json!({"configuration": {"period": 10}}));
        assert_eq!(log.frame_count(), 0);
        assert_eq!(log.frames().count(), 0);
    }

    #[test]
    fn test_configuration_keeps_document_order() {
        let log = MeasurementLog::from_value(
            serde_json::from_str(r#"{"configuration":{"zeta":1,"alpha":2,"mid":3}}"#).unwrap(),
        );
        let keys: Vec<&str> = log
            .configuration()
            .unwrap()
            .keys()
            .map(String::as_str)
            .collect();
        assert_eq!(keys, vec!["zeta", "alpha", "mid"]);
    }

    #[test]
    fn test_with_result_set_replaces_only_frames() {
        let log: MeasurementLog = serde_json::from_str::<Value>(
            r#"{"configuration":{"period":10},"Result_Set":[{"a":1},{"a":2}],"info":[{"fw version":[1,2]}]}"#,
        )
        .unwrap()
        .into();

        let part = log.with_result_set(vec![json!({"a": 2})]);
        assert_eq!(part.frame_count(), 1);
        assert_eq!(part.configuration(), log.configuration());
        assert_eq!(part.info(), log.info());

        let keys: Vec<&str> = part
            .as_value()
            .as_object()
            .unwrap()
            .keys()
            .map(String::as_str)
            .collect();
        assert_eq!(keys, vec!["configuration", "Result_Set", "info"]);

        // Source document untouched
        assert_eq!(log.frame_count(), 2);
    }

    #[test]
    fn test_device_info_shapes() {
        let list = MeasurementLog::from_value(json!({"info": [{"serial number": "A1"}, {}]}));
        assert_eq!(list.device_info().serial_number(), "A1");

        let dict = MeasurementLog::from_value(json!({"info": {"serial_number": "B2"}}));
        assert_eq!(dict.device_info().serial_number(), "B2");

        let missing = MeasurementLog::from_value(json!({}));
        assert!(missing.device_info().is_empty());
    }
}
