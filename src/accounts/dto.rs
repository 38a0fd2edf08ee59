use axum::{extract::Query, http::Uri};
use serde::Deserialize;

/// Query string of the edit page.
#[derive(Debug, Deserialize)]
pub struct EditQuery {
    pub edit_id: Option<String>,
}

impl EditQuery {
    /// Positive numeric id, or `None` for anything else.
    pub fn admin_id(&self) -> Option<i64> {
        self.edit_id
            .as_deref()
            .and_then(|v| v.trim().parse::<i64>().ok())
            .filter(|id| *id > 0)
    }

    /// Target account of a request; `None` when the query string does not
    /// name exactly one valid id.
    pub fn admin_id_in(uri: &Uri) -> Option<i64> {
        let Query(query) = Query::<EditQuery>::try_from_uri(uri).ok()?;
        query.admin_id()
    }
}

/// Body posted by the edit form.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct UserEditForm {
    pub uaction: String,
    pub email: String,
    pub customer_id: String,
    pub fname: String,
    pub lname: String,
    pub firm: String,
    pub gender: String,
    pub zip: String,
    pub city: String,
    pub state: String,
    pub country: String,
    pub street1: String,
    pub street2: String,
    pub phone: String,
    pub fax: String,
    pub password: String,
    #[serde(rename = "passwordRepeat")]
    pub password_repeat: String,
    /// Checkbox; present means "mail the new credentials".
    pub send_data: Option<String>,
}

impl UserEditForm {
    pub fn wants_save(&self) -> bool {
        self.uaction == "save_changes"
    }

    pub fn wants_login_data_mail(&self) -> bool {
        self.send_data.is_some()
    }
}
