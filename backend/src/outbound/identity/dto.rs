//! Wire shapes of the hosted users API.

use serde::{Deserialize, Serialize};

use crate::domain::{NewPatientUser, UserRecord, UserRecordId};

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct CreateUserRequestDto<'a> {
    pub(super) user_id: &'a str,
    pub(super) email: &'a str,
    pub(super) phone: &'a str,
    pub(super) name: &'a str,
}

impl<'a> CreateUserRequestDto<'a> {
    pub(super) fn new(id: &'a UserRecordId, user: &'a NewPatientUser) -> Self {
        Self {
            user_id: id.as_ref(),
            email: user.email().as_ref(),
            phone: user.phone().as_ref(),
            name: user.name().as_ref(),
        }
    }
}

#[derive(Debug, Deserialize)]
pub(super) struct UserDto {
    #[serde(rename = "$id")]
    pub(super) id: String,
    #[serde(default)]
    pub(super) name: String,
    #[serde(default)]
    pub(super) email: String,
    #[serde(default)]
    pub(super) phone: String,
}

impl UserDto {
    pub(super) fn into_domain(self) -> Result<UserRecord, String> {
        let id = UserRecordId::new(&self.id)
            .map_err(|error| format!("user id {:?} rejected: {error}", self.id))?;
        Ok(UserRecord {
            id,
            name: self.name,
            email: self.email,
            phone: self.phone,
        })
    }
}

#[derive(Debug, Deserialize)]
pub(super) struct UserListDto {
    #[serde(default)]
    pub(super) total: u64,
    #[serde(default)]
    pub(super) users: Vec<UserDto>,
}

impl UserListDto {
    pub(super) fn into_domain(self) -> Result<Vec<UserRecord>, String> {
        self.users.into_iter().map(UserDto::into_domain).collect()
    }
}

/// One query in the users list filter syntax.
#[derive(Debug, Serialize)]
pub(super) struct EqualQueryDto<'a> {
    pub(super) method: &'static str,
    pub(super) attribute: &'static str,
    pub(super) values: [&'a str; 1],
}

impl<'a> EqualQueryDto<'a> {
    pub(super) fn email(email: &'a str) -> Self {
        Self {
            method: "equal",
            attribute: "email",
            values: [email],
        }
    }
}
