// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Cookie-backed browser sessions for the server.
//!
//! Each browser gets a random session id in the `wabs_sid` cookie. The id
//! names a `SessionData` entry in the in-memory `SessionStore`. An entry is
//! kept only while it holds data, and is dropped once it has been idle for
//! the store's TTL.

use axum::{
    extract::FromRequestParts,
    http::{
        HeaderMap, HeaderValue,
        header::{COOKIE, SET_COOKIE},
        request::Parts,
    },
    response::{IntoResponseParts, ResponseParts},
};
use std::collections::HashMap;
use std::convert::Infallible;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};
use water_abstraction_api::SessionData;

use crate::AppState;

/// Name of the session cookie.
pub const SESSION_COOKIE: &str = "wabs_sid";

/// Length of a session id in hex characters.
const SESSION_ID_LENGTH: usize = 32;

/// Default idle time after which a session is dropped.
pub const DEFAULT_SESSION_TTL: Duration = Duration::from_secs(2 * 60 * 60);

/// Shortest gap between two sweeps of idle sessions.
const SWEEP_INTERVAL: Duration = Duration::from_secs(60);

#[derive(Debug)]
struct StoredSession {
    data: SessionData,
    last_seen: Instant,
}

/// Session data for the browsers seen recently.
#[derive(Debug)]
pub struct SessionStore {
    sessions: HashMap<String, StoredSession>,
    idle_ttl: Duration,
    last_sweep: Instant,
}

impl Default for SessionStore {
    fn default() -> Self {
        Self::new(DEFAULT_SESSION_TTL)
    }
}

impl SessionStore {
    /// Creates an empty store whose sessions expire after `idle_ttl`
    /// without a request.
    #[must_use]
    pub fn new(idle_ttl: Duration) -> Self {
        Self {
            sessions: HashMap::new(),
            idle_ttl,
            last_sweep: Instant::now(),
        }
    }

    /// Runs `f` against the data for `id`.
    ///
    /// A session with no stored data starts empty. Data left empty after
    /// `f` is not kept, so requests that store nothing do not grow the
    /// store.
    pub fn with_session<T>(&mut self, id: &str, f: impl FnOnce(&mut SessionData) -> T) -> T {
        let now: Instant = Instant::now();
        if now.duration_since(self.last_sweep) >= SWEEP_INTERVAL {
            self.sweep_expired();
        }

        let mut data: SessionData = self
            .sessions
            .remove(id)
            .map(|stored| stored.data)
            .unwrap_or_default();
        let result: T = f(&mut data);
        if !data.is_empty() {
            self.sessions.insert(
                id.to_string(),
                StoredSession {
                    data,
                    last_seen: now,
                },
            );
        }
        result
    }

    /// Drops every session idle for the TTL or longer.
    ///
    /// Returns the number of sessions dropped.
    pub fn sweep_expired(&mut self) -> usize {
        let now: Instant = Instant::now();
        let before: usize = self.sessions.len();
        let ttl: Duration = self.idle_ttl;
        self.sessions
            .retain(|_, stored| now.duration_since(stored.last_seen) < ttl);
        self.last_sweep = now;

        let dropped: usize = before - self.sessions.len();
        if dropped > 0 {
            info!(dropped, remaining = self.sessions.len(), "Dropped idle sessions");
        }
        dropped
    }

    /// Returns true if data exists for `id`.
    #[must_use]
    pub fn contains(&self, id: &str) -> bool {
        self.sessions.contains_key(id)
    }

    /// Number of sessions holding data.
    #[must_use]
    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    /// Returns true if no session holds data.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }
}

/// Extractor for the requesting browser's session id.
///
/// A request without a usable `wabs_sid` cookie gets a fresh id, and the
/// response must then carry the cookie (see [`BrowserSession::cookie`]).
///
/// # Usage
///
/// ```ignore
/// async fn my_handler(
///     AxumState(app_state): AxumState<AppState>,
///     session: BrowserSession,
/// ) -> Result<(SessionCookie, Response), HttpError> {
///     let mut sessions = app_state.sessions.lock().await;
///     let outcome = sessions.with_session(&session.id, |data: &mut SessionData| {
///         // ...
///     });
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BrowserSession {
    /// The session id.
    pub id: String,
    /// True if the id was issued for this request.
    pub is_new: bool,
}

impl BrowserSession {
    /// Issues a new random session id.
    #[must_use]
    pub fn issue() -> Self {
        let id: String = format!(
            "{:016x}{:016x}",
            rand::random::<u64>(),
            rand::random::<u64>()
        );
        Self { id, is_new: true }
    }

    /// The `Set-Cookie` part to send, present only for a new session.
    #[must_use]
    pub fn cookie(&self) -> SessionCookie {
        if !self.is_new {
            return SessionCookie(None);
        }
        let value: String = format!(
            "{SESSION_COOKIE}={}; Path=/; HttpOnly; SameSite=Lax",
            self.id
        );
        SessionCookie(HeaderValue::from_str(&value).ok())
    }
}

impl FromRequestParts<AppState> for BrowserSession {
    type Rejection = Infallible;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let Some(id) = cookie_value(&parts.headers, SESSION_COOKIE) else {
            let session: Self = Self::issue();
            debug!(session_id = %session.id, "Starting new session");
            return Ok(session);
        };

        if !is_session_id(&id) {
            warn!("Ignoring malformed session cookie");
            return Ok(Self::issue());
        }

        if !state.sessions.lock().await.contains(&id) {
            // Sessions do not survive a restart; keep the browser's id.
            debug!(session_id = %id, "Resuming unknown session");
        }

        Ok(Self { id, is_new: false })
    }
}

/// Response part that sets the session cookie when one was issued.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionCookie(pub Option<HeaderValue>);

impl IntoResponseParts for SessionCookie {
    type Error = Infallible;

    fn into_response_parts(self, mut res: ResponseParts) -> Result<ResponseParts, Self::Error> {
        if let Some(value) = self.0 {
            res.headers_mut().insert(SET_COOKIE, value);
        }
        Ok(res)
    }
}

/// Reads a cookie value from the request headers.
#[must_use]
pub fn cookie_value(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get_all(COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(key, _)| *key == name)
        .map(|(_, value)| value.to_string())
}

fn is_session_id(value: &str) -> bool {
    value.len() == SESSION_ID_LENGTH && value.bytes().all(|b| b.is_ascii_hexdigit())
}
