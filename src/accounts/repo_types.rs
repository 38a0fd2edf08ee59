use std::{fmt, str::FromStr};

use serde::Serialize;
use sqlx::FromRow;
use thiserror::Error;

#[derive(Debug, Error)]
#[error("unknown {kind} value `{value}`")]
pub struct ParseEnumError {
    kind: &'static str,
    value: String,
}

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq, Default)]
pub enum Gender {
    #[serde(rename = "M")]
    Male,
    #[serde(rename = "F")]
    Female,
    #[default]
    #[serde(rename = "U")]
    Unknown,
}

impl Gender {
    pub fn as_code(self) -> &'static str {
        match self {
            Self::Male => "M",
            Self::Female => "F",
            Self::Unknown => "U",
        }
    }
}

impl FromStr for Gender {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "M" => Ok(Self::Male),
            "F" => Ok(Self::Female),
            "U" | "" => Ok(Self::Unknown),
            other => Err(ParseEnumError {
                kind: "gender",
                value: other.to_string(),
            }),
        }
    }
}

/// Provisioning state of an account, as stored in `admin.admin_status`.
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum AccountStatus {
    Ok,
    ToAdd,
    ToChange,
    /// The customer must pick a new password at next login.
    ToChangePwd,
    ToDelete,
    ToDisable,
    ToEnable,
    Disabled,
}

impl AccountStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Ok => "ok",
            Self::ToAdd => "toadd",
            Self::ToChange => "tochange",
            Self::ToChangePwd => "tochangepwd",
            Self::ToDelete => "todelete",
            Self::ToDisable => "todisable",
            Self::ToEnable => "toenable",
            Self::Disabled => "disabled",
        }
    }
}

impl fmt::Display for AccountStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AccountStatus {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s {
            "ok" => Self::Ok,
            "toadd" => Self::ToAdd,
            "tochange" => Self::ToChange,
            "tochangepwd" => Self::ToChangePwd,
            "todelete" => Self::ToDelete,
            "todisable" => Self::ToDisable,
            "toenable" => Self::ToEnable,
            "disabled" => Self::Disabled,
            other => {
                return Err(ParseEnumError {
                    kind: "account status",
                    value: other.to_string(),
                })
            }
        })
    }
}

/// Editable personal data of a customer.
#[derive(Debug, Clone, Serialize, PartialEq, Eq, Default)]
pub struct Profile {
    pub customer_id: String,
    pub first_name: String,
    pub last_name: String,
    pub company: String,
    pub email: String,
    pub phone: String,
    pub fax: String,
    pub gender: Gender,
    pub zip: String,
    pub city: String,
    pub state: String,
    pub country: String,
    pub street1: String,
    pub street2: String,
}

impl Profile {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
            .trim()
            .to_string()
    }
}

/// A customer account managed by a reseller.
#[derive(Debug, Clone, Serialize)]
pub struct CustomerAccount {
    pub admin_id: i64,
    pub created_by: i64,
    pub login_name: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub status: AccountStatus,
    pub profile: Profile,
}

/// Raw `admin` row; text columns are nullable in the schema.
#[derive(Debug, FromRow)]
pub struct AccountRow {
    pub admin_id: i64,
    pub created_by: i64,
    pub admin_name: String,
    pub admin_pass: String,
    pub admin_status: String,
    pub customer_id: Option<String>,
    pub fname: Option<String>,
    pub lname: Option<String>,
    pub firm: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub fax: Option<String>,
    pub gender: Option<String>,
    pub zip: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub country: Option<String>,
    pub street1: Option<String>,
    pub street2: Option<String>,
}

impl TryFrom<AccountRow> for CustomerAccount {
    type Error = ParseEnumError;

    fn try_from(r: AccountRow) -> Result<Self, Self::Error> {
        // Rows written by older tooling may carry any gender string.
        let gender = r
            .gender
            .as_deref()
            .map(|g| g.parse::<Gender>().unwrap_or_default())
            .unwrap_or_default();
        Ok(Self {
            admin_id: r.admin_id,
            created_by: r.created_by,
            login_name: r.admin_name,
            password_hash: r.admin_pass,
            status: r.admin_status.parse()?,
            profile: Profile {
                customer_id: r.customer_id.unwrap_or_default(),
                first_name: r.fname.unwrap_or_default(),
                last_name: r.lname.unwrap_or_default(),
                company: r.firm.unwrap_or_default(),
                email: r.email.unwrap_or_default(),
                phone: r.phone.unwrap_or_default(),
                fax: r.fax.unwrap_or_default(),
                gender,
                zip: r.zip.unwrap_or_default(),
                city: r.city.unwrap_or_default(),
                state: r.state.unwrap_or_default(),
                country: r.country.unwrap_or_default(),
                street1: r.street1.unwrap_or_default(),
                street2: r.street2.unwrap_or_default(),
            },
        })
    }
}

/// Sender identity for mails a reseller sends to its customers.
#[derive(Debug, Clone, FromRow)]
pub struct ResellerContact {
    pub admin_name: String,
    pub fname: Option<String>,
    pub lname: Option<String>,
    pub email: Option<String>,
}

impl ResellerContact {
    pub fn display_name(&self) -> String {
        let name = format!(
            "{} {}",
            self.fname.as_deref().unwrap_or_default(),
            self.lname.as_deref().unwrap_or_default()
        );
        let name = name.trim();
        if name.is_empty() {
            self.admin_name.clone()
        } else {
            name.to_string()
        }
    }
}
