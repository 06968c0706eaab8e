//! Wire-level constants shared by the client, the resolver and the bot.

pub const API_BASE_URL: &str = "https://api.organisely.com/v1";
pub const OAUTH_BASE_URL: &str = "https://organisely.com/oauth";

pub const SDK_VERSION: &str = "1.0.0";

pub fn default_user_agent() -> String {
    format!("Organisely-SDK/{SDK_VERSION}")
}

/// API endpoint paths, relative to the base URL.
pub mod endpoints {
    pub const USERS: &str = "/users";
    pub const USER_PROFILE: &str = "/users/profile";
    pub const HABITS: &str = "/habits";
    pub const HABIT_COMPLETIONS: &str = "/habits/completions";
    pub const EMAILS: &str = "/emails";
    pub const EMAIL_SEND: &str = "/emails/send";
    pub const CALENDAR_EVENTS: &str = "/calendar/events";
    pub const EVENTS_TRACK: &str = "/events/track";
    pub const EVENTS_BROADCAST: &str = "/events/broadcast";
    pub const INTEGRATIONS: &str = "/integrations";
    pub const HEALTH: &str = "/health";
    pub const VERSION: &str = "/version";
}

/// Permission scopes.
pub mod scopes {
    pub const READ_HABITS: &str = "read:habits";
    pub const READ_EMAILS: &str = "read:emails";
    pub const READ_CALENDAR: &str = "read:calendar";
    pub const READ_EVENTS: &str = "read:events";
    pub const READ_PROFILE: &str = "read:profile";
    pub const READ_INTEGRATIONS: &str = "read:integrations";
    pub const READ_ANALYTICS: &str = "read:analytics";

    pub const WRITE_HABITS: &str = "write:habits";
    pub const WRITE_EMAILS: &str = "write:emails";
    pub const WRITE_CALENDAR: &str = "write:calendar";
    pub const WRITE_EVENTS: &str = "write:events";
    pub const WRITE_PROFILE: &str = "write:profile";
    pub const WRITE_INTEGRATIONS: &str = "write:integrations";

    pub const ADMIN: &str = "admin";
    pub const ADMIN_USERS: &str = "admin:users";
    pub const ADMIN_INTEGRATIONS: &str = "admin:integrations";
    pub const ADMIN_SYSTEM: &str = "admin:system";
}

/// Platform event types.
pub mod event_types {
    pub const USER_LOGIN: &str = "user.login";
    pub const USER_LOGOUT: &str = "user.logout";
    pub const USER_UPDATED: &str = "user.updated";

    pub const HABIT_CREATED: &str = "habit.created";
    pub const HABIT_UPDATED: &str = "habit.updated";
    pub const HABIT_DELETED: &str = "habit.deleted";
    pub const HABIT_COMPLETED: &str = "habit.completed";
    pub const HABIT_MISSED: &str = "habit.missed";
    pub const HABIT_STREAK_MILESTONE: &str = "habit.streak_milestone";

    pub const INTEGRATION_INSTALLED: &str = "integration.installed";
    pub const INTEGRATION_UNINSTALLED: &str = "integration.uninstalled";

    pub const EMAIL_RECEIVED: &str = "email.received";
    pub const EMAIL_SENT: &str = "email.sent";
    pub const EMAIL_IMPORTANT: &str = "email.important";

    pub const CALENDAR_EVENT_CREATED: &str = "calendar.event_created";
    pub const CALENDAR_EVENT_UPDATED: &str = "calendar.event_updated";
    pub const CALENDAR_EVENT_DELETED: &str = "calendar.event_deleted";
    pub const CALENDAR_EVENT_UPCOMING: &str = "calendar.event_upcoming";

    pub const BOT_TRIGGERED: &str = "bot.triggered";
    pub const BOT_ERROR: &str = "bot.error";
}

/// Request and response header names.
pub mod headers {
    pub const REQUEST_ID: &str = "X-Request-ID";
    pub const SDK_VERSION: &str = "X-SDK-Version";
    pub const RATE_LIMIT_LIMIT: &str = "X-RateLimit-Limit";
    pub const RATE_LIMIT_REMAINING: &str = "X-RateLimit-Remaining";
    pub const RATE_LIMIT_RESET: &str = "X-RateLimit-Reset";
    pub const RETRY_AFTER: &str = "Retry-After";
}
