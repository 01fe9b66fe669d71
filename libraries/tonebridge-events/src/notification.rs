//! Notification payload

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// One posted event.
///
/// `arg1`/`arg2` are plain integers or the IEEE-754 bit pattern of an
/// `f32`; which one is agreed per event id.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Notification {
    pub category: i32,
    pub event: i32,
    pub arg1: i32,
    pub arg2: i32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extras: Option<BTreeMap<String, String>>,
}

impl Notification {
    pub fn new(category: i32, event: i32) -> Self {
        Self {
            category,
            event,
            ..Self::default()
        }
    }

    pub fn with_arg1(mut self, arg1: i32) -> Self {
        self.arg1 = arg1;
        self
    }

    pub fn with_arg2(mut self, arg2: i32) -> Self {
        self.arg2 = arg2;
        self
    }

    /// Store `value` in `arg2` as its bit pattern
    pub fn with_arg2_f32(self, value: f32) -> Self {
        self.with_arg2(f32_to_arg(value))
    }

    pub fn with_extra(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.extras
            .get_or_insert_with(BTreeMap::new)
            .insert(key.into(), value.into());
        self
    }

    pub fn arg1_f32(&self) -> f32 {
        arg_to_f32(self.arg1)
    }

    pub fn arg2_f32(&self) -> f32 {
        arg_to_f32(self.arg2)
    }

    pub fn extra(&self, key: &str) -> Option<&str> {
        self.extras.as_ref()?.get(key).map(String::as_str)
    }
}

pub fn f32_to_arg(value: f32) -> i32 {
    value.to_bits() as i32
}

pub fn arg_to_f32(arg: i32) -> f32 {
    f32::from_bits(arg as u32)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_float_args_keep_their_bits() {
        let n = Notification::new(109, 1).with_arg2_f32(0.75);
        assert_eq!(n.arg2_f32(), 0.75);

        let negative = Notification::new(109, 1).with_arg2_f32(-0.0);
        assert!(negative.arg2_f32().is_sign_negative());
    }

    #[test]
    fn test_extras() {
        let n = Notification::new(200, 2)
            .with_extra("error_info_what", "1")
            .with_extra("error_info_extra", "-1004");

        assert_eq!(n.extra("error_info_extra"), Some("-1004"));
        assert_eq!(n.extra("missing"), None);
        assert_eq!(Notification::new(0, 0).extra("any"), None);
    }

    #[test]
    fn test_serde_omits_empty_extras() {
        let json = serde_json::to_string(&Notification::new(203, 1).with_arg1(4)).unwrap();
        assert_eq!(json, r#"{"category":203,"event":1,"arg1":4,"arg2":0}"#);
    }
}
