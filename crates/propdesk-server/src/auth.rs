// crates/propdesk-server/src/auth.rs
// ============================================================================
// Module: Demo Authentication
// Description: Demo credential table and base64 JSON session cookie codec.
// Purpose: Gate tenant and landlord routes for the demo deployment.
// Dependencies: base64, serde, serde_json
// ============================================================================

//! ## Overview
//! Authentication is demo-grade by design: a fixed credential table and a
//! base64-encoded JSON session cookie, unsigned. The session carries the
//! user identity, role, and the tenant's property slug; handlers use the
//! role for route gating and the slug to scope ticket reads. A production
//! deployment would replace this module wholesale with a signed token
//! scheme; the `Session` shape is the seam.

// ============================================================================
// SECTION: Imports
// ============================================================================

use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64;
use serde::Deserialize;
use serde::Serialize;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Session cookie name.
pub const SESSION_COOKIE: &str = "propdesk_session";

/// Session cookie lifetime in seconds (seven days).
pub const SESSION_MAX_AGE_SECS: u64 = 60 * 60 * 24 * 7;

// ============================================================================
// SECTION: Roles & Sessions
// ============================================================================

/// Authenticated role.
///
/// # Invariants
/// - Variants are stable for serialization (`landlord`/`tenant`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Property owner; sees every ticket and approves repairs.
    Landlord,
    /// Reporting tenant; sees their own property's tickets.
    Tenant,
}

/// Decoded session carried by the cookie.
///
/// # Invariants
/// - `property_slug` is present exactly for tenant sessions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    /// Stable user identifier.
    pub user_id: String,
    /// Login email.
    pub email: String,
    /// Display name.
    pub name: String,
    /// Authenticated role.
    pub role: Role,
    /// Property slug for tenant sessions.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub property_slug: Option<String>,
}

/// One entry in the demo credential table.
struct DemoUser {
    /// Stable user identifier.
    id: &'static str,
    /// Login email.
    email: &'static str,
    /// Display name.
    name: &'static str,
    /// Assigned role.
    role: Role,
    /// Property slug for tenant users.
    property_slug: Option<&'static str>,
    /// Demo password.
    password: &'static str,
}

/// Fixed demo credential table.
const DEMO_USERS: &[DemoUser] = &[
    DemoUser {
        id: "user-landlord",
        email: "landlord@demo.com",
        name: "Alex Johnson",
        role: Role::Landlord,
        property_slug: None,
        password: "demo123",
    },
    DemoUser {
        id: "user-maria",
        email: "maria@demo.com",
        name: "Maria Lopez",
        role: Role::Tenant,
        property_slug: Some("portland-oak-st"),
        password: "demo123",
    },
    DemoUser {
        id: "user-james",
        email: "james@demo.com",
        name: "James Kim",
        role: Role::Tenant,
        property_slug: Some("chicago-pine-rd"),
        password: "demo123",
    },
];

// ============================================================================
// SECTION: Credential Validation
// ============================================================================

/// Validates demo credentials, returning the session on success.
#[must_use]
pub fn validate_credentials(email: &str, password: &str) -> Option<Session> {
    DEMO_USERS
        .iter()
        .find(|user| user.email == email && user.password == password)
        .map(|user| Session {
            user_id: user.id.to_string(),
            email: user.email.to_string(),
            name: user.name.to_string(),
            role: user.role,
            property_slug: user.property_slug.map(str::to_string),
        })
}

// ============================================================================
// SECTION: Cookie Codec
// ============================================================================

/// Encodes a session into the cookie value.
#[must_use]
pub fn encode_session(session: &Session) -> String {
    let json = serde_json::to_string(session).unwrap_or_default();
    BASE64.encode(json)
}

/// Decodes a cookie value into a session.
///
/// Malformed base64 or JSON yields `None`; callers treat that as an
/// unauthenticated request, never an error.
#[must_use]
pub fn decode_session(cookie: &str) -> Option<Session> {
    let bytes = BASE64.decode(cookie).ok()?;
    serde_json::from_slice(&bytes).ok()
}

/// Extracts the session cookie value from a `Cookie` header.
#[must_use]
pub fn session_cookie_value(header: &str) -> Option<&str> {
    header.split(';').map(str::trim).find_map(|pair| {
        let (name, value) = pair.split_once('=')?;
        (name == SESSION_COOKIE).then_some(value)
    })
}

/// Builds the `Set-Cookie` value for a freshly encoded session.
#[must_use]
pub fn session_set_cookie(encoded: &str) -> String {
    format!(
        "{SESSION_COOKIE}={encoded}; Path=/; HttpOnly; SameSite=Lax; Max-Age={SESSION_MAX_AGE_SECS}"
    )
}

// ============================================================================
// SECTION: Tests
// ============================================================================
