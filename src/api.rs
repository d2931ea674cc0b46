use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::Error;
use crate::types::{Booking, BookingId, FlightId, FlightOffer, SearchQuery, UserId, UserIdentity};

/// Nu-Dem backend configuration.
///
/// ```rust,ignore
/// use nudem_booking::ApiConfig;
///
/// let config = ApiConfig::new("https://staging.nu-dem.example".parse()?);
/// // Or pick up NUDEM_API_URL, falling back to the public backend:
/// let config = ApiConfig::from_env()?;
/// ```
#[derive(Debug, Clone)]
#[non_exhaustive]
pub struct ApiConfig {
    pub(crate) base_url: Url,
}

impl ApiConfig {
    /// Create a configuration for the given backend base URL.
    #[must_use]
    pub fn new(base_url: Url) -> Self {
        Self { base_url }
    }

    /// Read the base URL from `NUDEM_API_URL`, falling back to the public
    /// backend when unset.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] if `NUDEM_API_URL` is set but not a valid URL.
    pub fn from_env() -> Result<Self, Error> {
        match std::env::var("NUDEM_API_URL") {
            Ok(raw) => {
                let base_url = raw
                    .parse()
                    .map_err(|e| Error::Config(format!("NUDEM_API_URL is not a valid URL: {e}")))?;
                Ok(Self { base_url })
            }
            Err(_) => Ok(Self::default()),
        }
    }

    /// Backend base URL.
    #[must_use]
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn endpoint(&self, path: &str) -> Url {
        let mut url = self.base_url.clone();
        url.set_path(path);
        url
    }
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: "https://nu-dem-back.onrender.com"
                .parse()
                .expect("valid default URL"),
        }
    }
}

/// Successful auth payload: the signed-in user and a bearer token. Feed it
/// to [`SessionStore::login`](crate::SessionStore::login).
#[derive(Debug, Clone, Deserialize)]
#[non_exhaustive]
pub struct AuthResponse {
    pub user: UserIdentity,
    pub token: String,
}

/// Body for `POST /api/auth/inscription`.
#[derive(Debug, Clone, Serialize)]
pub struct RegisterRequest {
    #[serde(rename = "prenom")]
    pub first_name: String,
    #[serde(rename = "nom")]
    pub last_name: String,
    pub email: String,
    #[serde(rename = "motDePasse")]
    pub password: String,
}

/// Body for `POST /api/bookings`.
///
/// `user_id` serializes as an explicit `null` for guest bookings — the
/// backend records guest and signed-in bookings through the same shape.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BookingRequest {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    pub departure: String,
    pub arrival: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub flight_id: Option<FlightId>,
    pub user_id: Option<UserId>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

#[derive(Debug, Serialize)]
struct LoginRequest<'a> {
    email: &'a str,
    #[serde(rename = "motDePasse")]
    mot_de_passe: &'a str,
}

/// Error body the backend returns on 4xx. The auth routes say `message`,
/// the rest say `error`; accept both.
#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    #[serde(default)]
    error: Option<String>,
    #[serde(default)]
    message: Option<String>,
}

fn error_detail(body: &str) -> String {
    serde_json::from_str::<ApiErrorBody>(body)
        .ok()
        .and_then(|parsed| parsed.error.or(parsed.message))
        .unwrap_or_else(|| body.to_owned())
}

/// REST client for the Nu-Dem backend.
pub struct ApiClient {
    config: ApiConfig,
    http: reqwest::Client,
}

impl ApiClient {
    #[must_use]
    pub fn new(config: ApiConfig) -> Self {
        Self {
            config,
            http: reqwest::Client::new(),
        }
    }

    /// Use a custom HTTP client (for connection pool reuse or testing).
    #[must_use]
    pub fn with_http_client(mut self, client: reqwest::Client) -> Self {
        self.http = client;
        self
    }

    /// `POST /api/auth/connexion`.
    ///
    /// # Errors
    ///
    /// [`Error::Http`] on transport failure, [`Error::Api`] when the
    /// backend rejects the credentials.
    pub async fn login(&self, email: &str, password: &str) -> Result<AuthResponse, Error> {
        let response = self
            .http
            .post(self.config.endpoint("/api/auth/connexion"))
            .json(&LoginRequest {
                email,
                mot_de_passe: password,
            })
            .send()
            .await?;

        let response = Self::ensure_success(response, "login").await?;
        response.json::<AuthResponse>().await.map_err(Into::into)
    }

    /// `POST /api/auth/inscription`.
    ///
    /// # Errors
    ///
    /// [`Error::Http`] on transport failure, [`Error::Api`] when the
    /// backend rejects the registration.
    pub async fn register(&self, request: &RegisterRequest) -> Result<AuthResponse, Error> {
        let response = self
            .http
            .post(self.config.endpoint("/api/auth/inscription"))
            .json(request)
            .send()
            .await?;

        let response = Self::ensure_success(response, "registration").await?;
        response.json::<AuthResponse>().await.map_err(Into::into)
    }

    /// `GET /api/flights`. No auth; searching is open to visitors.
    ///
    /// # Errors
    ///
    /// [`Error::Http`] on transport failure, [`Error::Api`] on a rejected
    /// query.
    pub async fn search_flights(&self, query: &SearchQuery) -> Result<Vec<FlightOffer>, Error> {
        let response = self
            .http
            .get(self.config.endpoint("/api/flights"))
            .query(query)
            .send()
            .await?;

        let response = Self::ensure_success(response, "flight search").await?;
        response.json::<Vec<FlightOffer>>().await.map_err(Into::into)
    }

    /// `GET /api/bookings` with the bearer token.
    ///
    /// # Errors
    ///
    /// [`Error::Unauthorized`] on a 401 — the caller must route it through
    /// [`AuthGate::handle_api_error`](crate::AuthGate::handle_api_error).
    pub async fn list_bookings(&self, token: &str) -> Result<Vec<Booking>, Error> {
        let response = self
            .http
            .get(self.config.endpoint("/api/bookings"))
            .bearer_auth(token)
            .send()
            .await?;

        let response = Self::ensure_success(response, "bookings list").await?;
        response.json::<Vec<Booking>>().await.map_err(Into::into)
    }

    /// `POST /api/bookings`. The bearer is optional: guest bookings carry
    /// none and a null `userId`.
    ///
    /// # Errors
    ///
    /// [`Error::Http`], [`Error::Unauthorized`] or [`Error::Api`].
    pub async fn create_booking(
        &self,
        request: &BookingRequest,
        token: Option<&str>,
    ) -> Result<Booking, Error> {
        let mut builder = self.http.post(self.config.endpoint("/api/bookings"));
        if let Some(token) = token {
            builder = builder.bearer_auth(token);
        }
        let response = builder.json(request).send().await?;

        let response = Self::ensure_success(response, "booking creation").await?;
        response.json::<Booking>().await.map_err(Into::into)
    }

    /// `DELETE /api/bookings/:id`.
    ///
    /// # Errors
    ///
    /// [`Error::Http`], [`Error::Unauthorized`] or [`Error::Api`].
    pub async fn cancel_booking(&self, id: &BookingId, token: Option<&str>) -> Result<(), Error> {
        let mut builder = self
            .http
            .delete(self.config.endpoint(&format!("/api/bookings/{id}")));
        if let Some(token) = token {
            builder = builder.bearer_auth(token);
        }
        let response = builder.send().await?;

        Self::ensure_success(response, "booking cancellation").await?;
        Ok(())
    }

    /// Checks the response status: 401 maps to [`Error::Unauthorized`],
    /// any other non-2xx reads the body's error field into [`Error::Api`].
    async fn ensure_success(
        response: reqwest::Response,
        operation: &'static str,
    ) -> Result<reqwest::Response, Error> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        if status == reqwest::StatusCode::UNAUTHORIZED {
            return Err(Error::Unauthorized);
        }
        let body = response.text().await.unwrap_or_default();
        Err(Error::Api {
            operation,
            status: status.as_u16(),
            detail: error_detail(&body),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn endpoint_joins_onto_the_base() {
        let config = ApiConfig::new("https://staging.nu-dem.example".parse().unwrap());
        assert_eq!(
            config.endpoint("/api/auth/connexion").as_str(),
            "https://staging.nu-dem.example/api/auth/connexion"
        );
        assert_eq!(
            config.endpoint("/api/bookings/b001").as_str(),
            "https://staging.nu-dem.example/api/bookings/b001"
        );
    }

    #[test]
    fn default_config_points_at_the_public_backend() {
        let config = ApiConfig::default();
        assert_eq!(config.base_url().host_str(), Some("nu-dem-back.onrender.com"));
    }

    #[test]
    fn login_request_uses_backend_field_names() {
        let body = serde_json::to_value(LoginRequest {
            email: "awa@example.com",
            mot_de_passe: "secret",
        })
        .unwrap();
        assert_eq!(body["email"], "awa@example.com");
        assert_eq!(body["motDePasse"], "secret");
    }

    #[test]
    fn register_request_uses_backend_field_names() {
        let body = serde_json::to_value(RegisterRequest {
            first_name: "Awa".into(),
            last_name: "Diallo".into(),
            email: "awa@example.com".into(),
            password: "secret".into(),
        })
        .unwrap();
        assert_eq!(body["prenom"], "Awa");
        assert_eq!(body["nom"], "Diallo");
        assert_eq!(body["motDePasse"], "secret");
    }

    #[test]
    fn guest_booking_serializes_null_user_id() {
        let body = serde_json::to_value(BookingRequest {
            first_name: "Awa".into(),
            last_name: "Diallo".into(),
            email: "awa@example.com".into(),
            phone: None,
            departure: "DSS".into(),
            arrival: "CDG".into(),
            flight_id: Some("FL-42".to_string().into()),
            user_id: None,
            extra: serde_json::Map::new(),
        })
        .unwrap();
        assert!(body["userId"].is_null());
        assert!(body.get("phone").is_none());
        assert_eq!(body["flightId"], "FL-42");
    }

    #[test]
    fn error_detail_prefers_structured_fields() {
        assert_eq!(error_detail(r#"{"error":"Vol introuvable"}"#), "Vol introuvable");
        assert_eq!(
            error_detail(r#"{"message":"Email déjà utilisé"}"#),
            "Email déjà utilisé"
        );
        assert_eq!(error_detail("upstream blew up"), "upstream blew up");
    }

    #[test]
    fn auth_response_parses_wire_shape() {
        let json = r#"{
            "user": {"_id":"6613f2","prenom":"Awa","nom":"Diallo","email":"awa@example.com"},
            "token": "tok-1"
        }"#;
        let auth: AuthResponse = serde_json::from_str(json).unwrap();
        assert_eq!(auth.user.first_name, "Awa");
        assert_eq!(auth.token, "tok-1");
    }
}
