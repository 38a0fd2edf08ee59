//! Askama page templates.

use askama::Template;

use crate::{
    accounts::{dto::UserEditForm, repo_types::{CustomerAccount, Gender}},
    flash::PageMessage,
};

/// Generic page for malformed requests and records the caller may not see.
#[derive(Template)]
#[template(path = "bad_request.html")]
pub struct BadRequestTemplate;

/// Field values shown in the edit form. Passwords are never part of it.
#[derive(Debug, Clone, Default)]
pub struct AccountFormView {
    pub username: String,
    pub email: String,
    pub customer_id: String,
    pub first_name: String,
    pub last_name: String,
    pub company: String,
    pub zip: String,
    pub city: String,
    pub state: String,
    pub country: String,
    pub street1: String,
    pub street2: String,
    pub phone: String,
    pub fax: String,
    pub gender: Gender,
}

impl AccountFormView {
    pub fn from_account(account: &CustomerAccount) -> Self {
        let p = &account.profile;
        Self {
            username: account.login_name.clone(),
            email: p.email.clone(),
            customer_id: p.customer_id.clone(),
            first_name: p.first_name.clone(),
            last_name: p.last_name.clone(),
            company: p.company.clone(),
            zip: p.zip.clone(),
            city: p.city.clone(),
            state: p.state.clone(),
            country: p.country.clone(),
            street1: p.street1.clone(),
            street2: p.street2.clone(),
            phone: p.phone.clone(),
            fax: p.fax.clone(),
            gender: p.gender,
        }
    }

    /// Submitted values over the stored login name, for re-display after a
    /// rejected submission.
    pub fn from_submission(account: &CustomerAccount, form: &UserEditForm) -> Self {
        Self {
            username: account.login_name.clone(),
            email: form.email.clone(),
            customer_id: form.customer_id.clone(),
            first_name: form.fname.clone(),
            last_name: form.lname.clone(),
            company: form.firm.clone(),
            zip: form.zip.clone(),
            city: form.city.clone(),
            state: form.state.clone(),
            country: form.country.clone(),
            street1: form.street1.clone(),
            street2: form.street2.clone(),
            phone: form.phone.clone(),
            fax: form.fax.clone(),
            gender: form.gender.trim().parse().unwrap_or_default(),
        }
    }
}

#[derive(Template)]
#[template(path = "user_edit.html")]
pub struct UserEditTemplate {
    pub edit_id: i64,
    pub form: AccountFormView,
    pub messages: Vec<PageMessage>,
}

impl UserEditTemplate {
    pub fn is_male(&self) -> bool {
        self.form.gender == Gender::Male
    }

    pub fn is_female(&self) -> bool {
        self.form.gender == Gender::Female
    }

    pub fn is_unknown(&self) -> bool {
        self.form.gender == Gender::Unknown
    }
}
