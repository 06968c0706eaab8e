use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HabitFrequency {
    Daily,
    Weekly,
    Monthly,
    Custom,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CustomFrequencyType {
    Interval,
    SpecificDays,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CustomFrequency {
    #[serde(rename = "type")]
    pub kind: CustomFrequencyType,
    pub value: serde_json::Value,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Habit {
    pub id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub frequency: HabitFrequency,
    pub target_count: u32,
    pub current_streak: u32,
    pub longest_streak: u32,
    pub total_completions: u32,
    pub completion_rate: f64,
    pub created_at: String,
    pub updated_at: String,
    pub user_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<String>>,
    pub is_active: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reminder_time: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reminder_days: Option<Vec<u8>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub custom_frequency: Option<CustomFrequency>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreateHabitRequest {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub frequency: HabitFrequency,
    pub target_count: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reminder_time: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reminder_days: Option<Vec<u8>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub custom_frequency: Option<CustomFrequency>,
}

impl CreateHabitRequest {
    pub fn new(name: impl Into<String>, frequency: HabitFrequency, target_count: u32) -> Self {
        Self {
            name: name.into(),
            description: None,
            frequency,
            target_count,
            category: None,
            tags: None,
            reminder_time: None,
            reminder_days: None,
            custom_frequency: None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UpdateHabitRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub frequency: Option<HabitFrequency>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_count: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reminder_time: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reminder_days: Option<Vec<u8>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub custom_frequency: Option<CustomFrequency>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_active: Option<bool>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HabitCompletion {
    pub id: String,
    pub habit_id: String,
    pub user_id: String,
    pub completed_at: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mood: Option<u8>,
    /// Minutes.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration: Option<u32>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn create_request_omits_unset_fields() {
        let request = CreateHabitRequest::new("Read", HabitFrequency::Daily, 1);
        assert_eq!(
            serde_json::to_value(&request).unwrap(),
            json!({"name": "Read", "frequency": "daily", "target_count": 1})
        );
    }

    #[test]
    fn custom_frequency_uses_type_key() {
        let freq = CustomFrequency {
            kind: CustomFrequencyType::SpecificDays,
            value: json!([1, 3, 5]),
        };
        assert_eq!(
            serde_json::to_value(&freq).unwrap(),
            json!({"type": "specific_days", "value": [1, 3, 5]})
        );
    }
}
