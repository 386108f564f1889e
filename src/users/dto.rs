use serde::{Deserialize, Serialize};

use super::repo_types::User;

/// Request body for login.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Request body for registration. Missing fields come through empty and are
/// rejected by the service, not by the JSON extractor.
#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RegisterRequest {
    pub name: String,
    pub email: String,
    pub password: String,
    pub mobile_no: String,
}

/// Self-service profile update.
#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct UpdateProfileRequest {
    pub name: Option<String>,
    pub email: Option<String>,
    pub mobile_no: Option<String>,
    pub password: Option<String>,
}

/// Admin update of another user.
#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct AdminUpdateRequest {
    pub name: Option<String>,
    pub email: Option<String>,
    pub mobile_no: Option<String>,
    pub is_admin: Option<bool>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserSummary {
    #[serde(rename = "_id")]
    pub id: String,
    pub name: String,
    pub email: String,
    pub mobile_no: String,
    pub is_admin: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthResponse {
    #[serde(flatten)]
    pub user: UserSummary,
    pub token: String,
}

/// Single-user view for admins; never carries the password hash.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserDetail {
    #[serde(flatten)]
    pub user: UserSummary,
    pub created_at: String,
    pub updated_at: String,
}

/// Full stored record as returned by the admin listing, hash included.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserRecord {
    #[serde(flatten)]
    pub detail: UserDetail,
    pub password: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct MessageResponse {
    pub message: String,
}

impl From<&User> for UserSummary {
    fn from(u: &User) -> Self {
        Self {
            id: u.id.to_hex(),
            name: u.name.clone(),
            email: u.email.clone(),
            mobile_no: u.mobile_no.clone(),
            is_admin: u.is_admin,
        }
    }
}

impl From<&User> for UserDetail {
    fn from(u: &User) -> Self {
        Self {
            user: UserSummary::from(u),
            created_at: u.created_at.try_to_rfc3339_string().unwrap_or_default(),
            updated_at: u.updated_at.try_to_rfc3339_string().unwrap_or_default(),
        }
    }
}

impl From<&User> for UserRecord {
    fn from(u: &User) -> Self {
        Self {
            detail: UserDetail::from(u),
            password: u.password_hash.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::users::repo_types::NewUser;

    fn sample() -> User {
        User::from_new(NewUser {
            name: "Jane".into(),
            email: "jane@example.com".into(),
            password_hash: "$argon2id$v=19$secret".into(),
            mobile_no: "5550100".into(),
        })
    }

    #[test]
    fn summary_uses_wire_field_names() {
        let user = sample();
        let json = serde_json::to_value(UserSummary::from(&user)).unwrap();
        assert_eq!(json["_id"], user.id.to_hex());
        assert_eq!(json["mobileNo"], "5550100");
        assert_eq!(json["isAdmin"], false);
        assert!(json.get("password").is_none());
    }

    #[test]
    fn detail_omits_hash_but_record_carries_it() {
        let user = sample();
        let detail = serde_json::to_value(UserDetail::from(&user)).unwrap();
        assert!(detail.get("password").is_none());
        assert!(detail["createdAt"].as_str().unwrap().contains('T'));

        let record = serde_json::to_value(UserRecord::from(&user)).unwrap();
        assert_eq!(record["password"], "$argon2id$v=19$secret");
        assert_eq!(record["email"], "jane@example.com");
    }

    #[test]
    fn register_request_tolerates_missing_fields() {
        let req: RegisterRequest = serde_json::from_str(r#"{"email":"a@b.co"}"#).unwrap();
        assert_eq!(req.email, "a@b.co");
        assert!(req.name.is_empty());
        assert!(req.mobile_no.is_empty());
    }
}
