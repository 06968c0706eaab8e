//! Domain methods over the request engine.

use serde::Serialize;
use serde_json::{Map, Value};
use url::form_urlencoded;

use crate::constants::endpoints;
use crate::error::{ApiError, ErrorCode};
use crate::models::{
    ApiVersion, BroadcastEventRequest, CalendarEvent, CreateEventRequest, CreateHabitRequest,
    Email, Habit, HealthStatus, Integration, PaginatedResponse, PaginationParams,
    SendEmailRequest, TrackEventRequest, UpdateEventRequest, UpdateHabitRequest, User, UserUpdate,
};
use crate::response::ApiResponse;
use crate::transport::Transport;

use super::{OrganiselyClient, RequestOptions};

type ApiResult<T> = Result<ApiResponse<T>, ApiError>;

impl<T: Transport> OrganiselyClient<T> {
    // Users

    pub async fn get_current_user(&self) -> ApiResult<User> {
        self.execute(endpoints::USER_PROFILE, RequestOptions::get()).await
    }

    pub async fn get_user(&self, user_id: &str) -> ApiResult<User> {
        self.execute(&item_path(endpoints::USERS, user_id), RequestOptions::get())
            .await
    }

    pub async fn update_user(&self, user_id: &str, updates: &UserUpdate) -> ApiResult<User> {
        self.execute(
            &item_path(endpoints::USERS, user_id),
            RequestOptions::patch(updates)?,
        )
        .await
    }

    // Habits

    /// Habits of `user_id`, or of the configured user.
    pub async fn get_habits(
        &self,
        user_id: Option<&str>,
        params: &PaginationParams,
    ) -> ApiResult<PaginatedResponse<Habit>> {
        let user_id = self.resolve_user_id(user_id)?;
        self.execute(&paged_path(endpoints::HABITS, &user_id, params), RequestOptions::get())
            .await
    }

    pub async fn get_habit(&self, habit_id: &str) -> ApiResult<Habit> {
        self.execute(&item_path(endpoints::HABITS, habit_id), RequestOptions::get())
            .await
    }

    pub async fn create_habit(
        &self,
        habit: &CreateHabitRequest,
        user_id: Option<&str>,
    ) -> ApiResult<Habit> {
        let user_id = self.resolve_user_id(user_id)?;
        let body = with_user_id(habit, &user_id)?;
        self.execute(endpoints::HABITS, RequestOptions::post(&body)?)
            .await
    }

    pub async fn update_habit(&self, habit_id: &str, updates: &UpdateHabitRequest) -> ApiResult<Habit> {
        self.execute(
            &item_path(endpoints::HABITS, habit_id),
            RequestOptions::patch(updates)?,
        )
        .await
    }

    pub async fn delete_habit(&self, habit_id: &str) -> ApiResult<()> {
        self.execute_void(&item_path(endpoints::HABITS, habit_id), RequestOptions::delete())
            .await
    }

    pub async fn complete_habit(&self, habit_id: &str, notes: Option<&str>) -> ApiResult<()> {
        #[derive(Serialize)]
        struct Completion<'a> {
            habit_id: &'a str,
            #[serde(skip_serializing_if = "Option::is_none")]
            notes: Option<&'a str>,
        }

        self.execute_void(
            endpoints::HABIT_COMPLETIONS,
            RequestOptions::post(&Completion { habit_id, notes })?,
        )
        .await
    }

    // Emails

    pub async fn get_emails(
        &self,
        user_id: Option<&str>,
        params: &PaginationParams,
    ) -> ApiResult<PaginatedResponse<Email>> {
        let user_id = self.resolve_user_id(user_id)?;
        self.execute(&paged_path(endpoints::EMAILS, &user_id, params), RequestOptions::get())
            .await
    }

    pub async fn get_email(&self, email_id: &str) -> ApiResult<Email> {
        self.execute(&item_path(endpoints::EMAILS, email_id), RequestOptions::get())
            .await
    }

    pub async fn send_email(&self, email: &SendEmailRequest, user_id: Option<&str>) -> ApiResult<Email> {
        let user_id = self.resolve_user_id(user_id)?;
        let body = with_user_id(email, &user_id)?;
        self.execute(endpoints::EMAIL_SEND, RequestOptions::post(&body)?)
            .await
    }

    // Calendar

    pub async fn get_calendar_events(
        &self,
        user_id: Option<&str>,
        params: &PaginationParams,
    ) -> ApiResult<PaginatedResponse<CalendarEvent>> {
        let user_id = self.resolve_user_id(user_id)?;
        self.execute(
            &paged_path(endpoints::CALENDAR_EVENTS, &user_id, params),
            RequestOptions::get(),
        )
        .await
    }

    pub async fn get_calendar_event(&self, event_id: &str) -> ApiResult<CalendarEvent> {
        self.execute(
            &item_path(endpoints::CALENDAR_EVENTS, event_id),
            RequestOptions::get(),
        )
        .await
    }

    pub async fn create_calendar_event(
        &self,
        event: &CreateEventRequest,
        user_id: Option<&str>,
    ) -> ApiResult<CalendarEvent> {
        let user_id = self.resolve_user_id(user_id)?;
        let body = with_user_id(event, &user_id)?;
        self.execute(endpoints::CALENDAR_EVENTS, RequestOptions::post(&body)?)
            .await
    }

    pub async fn update_calendar_event(
        &self,
        event_id: &str,
        updates: &UpdateEventRequest,
    ) -> ApiResult<CalendarEvent> {
        self.execute(
            &item_path(endpoints::CALENDAR_EVENTS, event_id),
            RequestOptions::patch(updates)?,
        )
        .await
    }

    pub async fn delete_calendar_event(&self, event_id: &str) -> ApiResult<()> {
        self.execute_void(
            &item_path(endpoints::CALENDAR_EVENTS, event_id),
            RequestOptions::delete(),
        )
        .await
    }

    // Events

    pub async fn track_event(&self, event: &TrackEventRequest, user_id: Option<&str>) -> ApiResult<()> {
        let user_id = self.resolve_user_id(user_id)?;
        let body = with_user_id(event, &user_id)?;
        self.execute_void(endpoints::EVENTS_TRACK, RequestOptions::post(&body)?)
            .await
    }

    /// Broadcast as the configured user; there is no per-call override.
    pub async fn broadcast_event(&self, event: &BroadcastEventRequest) -> ApiResult<()> {
        let user_id = self.resolve_user_id(None)?;
        let body = with_user_id(event, &user_id)?;
        self.execute_void(endpoints::EVENTS_BROADCAST, RequestOptions::post(&body)?)
            .await
    }

    // Integrations

    pub async fn get_integrations(&self, user_id: Option<&str>) -> ApiResult<Vec<Integration>> {
        let user_id = self.resolve_user_id(user_id)?;
        let query = form_urlencoded::Serializer::new(String::new())
            .append_pair("user_id", &user_id)
            .finish();
        self.execute(
            &format!("{}?{}", endpoints::INTEGRATIONS, query),
            RequestOptions::get(),
        )
        .await
    }

    pub async fn get_integration(&self, integration_id: &str) -> ApiResult<Integration> {
        self.execute(
            &item_path(endpoints::INTEGRATIONS, integration_id),
            RequestOptions::get(),
        )
        .await
    }

    // Utility

    pub async fn health_check(&self) -> ApiResult<HealthStatus> {
        self.execute(endpoints::HEALTH, RequestOptions::get()).await
    }

    pub async fn get_api_version(&self) -> ApiResult<ApiVersion> {
        self.execute(endpoints::VERSION, RequestOptions::get()).await
    }
}

/// `<collection>/<id>` with the id percent-encoded as one path segment.
fn item_path(collection: &str, id: &str) -> String {
    let encoded: String = form_urlencoded::byte_serialize(id.as_bytes()).collect();
    format!("{collection}/{}", encoded.replace('+', "%20"))
}

/// `<collection>?user_id=..&page=..&limit=..&cursor=..`
fn paged_path(collection: &str, user_id: &str, params: &PaginationParams) -> String {
    let mut query = form_urlencoded::Serializer::new(String::new());
    query.append_pair("user_id", user_id);
    for (key, value) in params.query_pairs() {
        query.append_pair(key, &value);
    }
    format!("{collection}?{}", query.finish())
}

/// Serialize `body` as a JSON object with `user_id` added.
fn with_user_id<B: Serialize>(body: &B, user_id: &str) -> Result<Value, ApiError> {
    let mut object = match serde_json::to_value(body) {
        Ok(Value::Object(map)) => map,
        Ok(_) => Map::new(),
        Err(e) => {
            return Err(ApiError::new(
                ErrorCode::InvalidRequest,
                format!("failed to serialize request body: {e}"),
            ))
        }
    };
    object.insert("user_id".to_string(), Value::String(user_id.to_string()));
    Ok(Value::Object(object))
}
