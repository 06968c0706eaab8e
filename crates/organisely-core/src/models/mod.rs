//! Wire types for the Organisely API.
//!
//! Field names follow the API's snake_case JSON; optional fields are
//! omitted when absent.

pub mod calendar;
pub mod email;
pub mod event;
pub mod habit;
pub mod integration;
pub mod pagination;
pub mod user;

pub use calendar::{
    AttendeeResponse, CalendarAttendee, CalendarEvent, CreateEventRequest, EventRecurrence,
    EventReminder, RecurrenceType, ReminderChannel, UpdateEventRequest,
};
pub use email::{Email, EmailAttachment, OutgoingAttachment, Recipients, SendEmailRequest};
pub use event::{BroadcastEventRequest, OrganiselyEvent, TrackEventRequest};
pub use habit::{
    CreateHabitRequest, CustomFrequency, CustomFrequencyType, Habit, HabitCompletion,
    HabitFrequency, UpdateHabitRequest,
};
pub use integration::{
    CreateIntegrationRequest, ExtensionConfig, Integration, IntegrationCategory,
    IntegrationDependency, IntegrationKind, IntegrationStatus, ResolvedIntegration,
};
pub use pagination::{PageInfo, PaginatedResponse, PaginationParams};
pub use user::{NotificationPreferences, PrivacyPreferences, Theme, User, UserPreferences, UserUpdate};

use serde::{Deserialize, Serialize};

/// Payload of `GET /health`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HealthStatus {
    pub status: String,
    pub timestamp: String,
}

/// Payload of `GET /version`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiVersion {
    pub version: String,
    #[serde(default)]
    pub features: Vec<String>,
}
