use lazy_static::lazy_static;
use regex::Regex;
use tracing::{info, warn};

use super::dto::UserEditForm;
use super::repo_types::{CustomerAccount, Gender, Profile};
use crate::{
    auth::{password, AuthReseller},
    error::PageError,
    events::PanelEvent,
    flash::{MessageLevel, PageMessage},
    mail::{login_data_mail, LoginData, Party},
    state::AppState,
};

/// Longest value accepted for a free-text profile field.
const MAX_FIELD_CHARS: usize = 200;

pub const MSG_PASSWORDS_MISMATCH: &str = "Passwords do not match.";
pub const MSG_UPDATED: &str = "User data successfully updated";

pub(crate) fn is_valid_email(email: &str) -> bool {
    lazy_static! {
        static ref EMAIL_RE: Regex = Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").unwrap();
    }
    EMAIL_RE.is_match(email)
}

/// Who is editing what, for the lifetime of one request.
#[derive(Debug, Clone)]
pub struct EditContext {
    pub reseller: AuthReseller,
    pub admin_id: i64,
}

/// Result of a save attempt.
#[derive(Debug)]
pub enum UpdateOutcome {
    /// Persisted; messages are carried to the next page.
    Success(Vec<PageMessage>),
    /// Nothing written; the form is shown again with these messages.
    ValidationError(Vec<PageMessage>),
    /// The account vanished or changed owner since it was loaded.
    AuthorizationError,
}

/// Loads an account owned by the acting reseller.
///
/// Unknown ids and accounts of other resellers are both reported as
/// [`PageError::BadRequest`].
pub async fn load_account(
    state: &AppState,
    admin_id: i64,
    reseller_id: i64,
) -> Result<CustomerAccount, PageError> {
    match state.store.find_owned(admin_id, reseller_id).await? {
        Some(account) => Ok(account),
        None => {
            warn!(admin_id, reseller_id, "account not found or not owned");
            Err(PageError::BadRequest)
        }
    }
}

/// Trims and checks the posted profile fields.
pub fn validate_profile(form: &UserEditForm) -> Result<Profile, Vec<PageMessage>> {
    let mut errors = Vec::new();

    let email = form.email.trim().to_string();
    if email.chars().count() > MAX_FIELD_CHARS || !is_valid_email(&email) {
        errors.push(PageMessage::error("Incorrect email length or syntax."));
    }

    let gender = match form.gender.trim().parse::<Gender>() {
        Ok(g) => g,
        Err(_) => {
            errors.push(PageMessage::error("Unknown gender value."));
            Gender::Unknown
        }
    };

    let mut field = |label: &str, value: &str| -> String {
        let value = value.trim();
        if value.chars().count() > MAX_FIELD_CHARS {
            errors.push(PageMessage::error(format!(
                "{label} must not exceed {MAX_FIELD_CHARS} characters."
            )));
        }
        value.to_string()
    };

    let profile = Profile {
        customer_id: field("Customer ID", &form.customer_id),
        first_name: field("First name", &form.fname),
        last_name: field("Last name", &form.lname),
        company: field("Company", &form.firm),
        email,
        phone: field("Phone", &form.phone),
        fax: field("Fax", &form.fax),
        gender,
        zip: field("Zip", &form.zip),
        city: field("City", &form.city),
        state: field("State/Province", &form.state),
        country: field("Country", &form.country),
        street1: field("Street 1", &form.street1),
        street2: field("Street 2", &form.street2),
    };

    if errors.is_empty() {
        Ok(profile)
    } else {
        Err(errors)
    }
}

/// Applies a submitted edit form to `account`.
///
/// With both password fields empty only the profile is written. Otherwise the
/// password must be repeated identically and satisfy the policy; it is then
/// stored hashed, the account is flagged to change it at next login, and the
/// customer's open sessions are dropped. The session purge runs after the
/// update and outside of it, so a failure in between leaves old sessions alive.
///
/// `BeforeEditUser` announces every attempted write; `AfterEditUser` follows
/// only a write that changed the account.
pub async fn apply_update(
    state: &AppState,
    ctx: &EditContext,
    account: &CustomerAccount,
    form: &UserEditForm,
) -> anyhow::Result<UpdateOutcome> {
    let profile = match validate_profile(form) {
        Ok(p) => p,
        Err(errors) => return Ok(UpdateOutcome::ValidationError(errors)),
    };

    let new_password = if form.password.is_empty() && form.password_repeat.is_empty() {
        None
    } else {
        if form.password != form.password_repeat {
            return Ok(UpdateOutcome::ValidationError(vec![PageMessage::error(
                MSG_PASSWORDS_MISMATCH,
            )]));
        }
        if let Err(e) = password::check_password_syntax(&form.password, &state.config.password_policy) {
            return Ok(UpdateOutcome::ValidationError(vec![PageMessage::error(
                e.to_string(),
            )]));
        }
        Some(form.password.as_str())
    };

    let reseller_id = ctx.reseller.id;
    state.events.notify(PanelEvent::BeforeEditUser {
        user_id: ctx.admin_id,
    });

    let changed = match new_password {
        None => {
            state
                .store
                .update_profile(ctx.admin_id, reseller_id, &profile)
                .await?
        }
        Some(plain) => {
            let hash = password::hash_password(plain)?;
            state
                .store
                .update_profile_and_password(ctx.admin_id, reseller_id, &profile, &hash)
                .await?
        }
    };

    if changed == 0 {
        warn!(admin_id = ctx.admin_id, reseller_id, "update matched no owned account");
        return Ok(UpdateOutcome::AuthorizationError);
    }

    if new_password.is_some() {
        let dropped = state.store.delete_login_sessions(&account.login_name).await?;
        info!(admin_id = ctx.admin_id, sessions = dropped, "customer sessions invalidated");
    }

    state.events.notify(PanelEvent::AfterEditUser {
        user_id: ctx.admin_id,
    });

    let audit = format!(
        "{} updated data for {}.",
        ctx.reseller.name, account.login_name
    );
    state.store.write_log(&audit).await?;
    info!(target: "audit", admin_id = ctx.admin_id, reseller_id, "{audit}");

    let mut messages = vec![PageMessage::new(MessageLevel::Success, MSG_UPDATED)];

    if let Some(plain) = new_password {
        if form.wants_login_data_mail() {
            if let Err(e) = send_login_data(state, ctx, account, &profile, plain).await {
                warn!(error = %e, admin_id = ctx.admin_id, "login data mail failed");
                messages.push(PageMessage::new(
                    MessageLevel::Warning,
                    "The new login data could not be sent by email.",
                ));
            }
        }

        if let Err(e) = state.daemon.send_request().await {
            warn!(error = %e, "backend request failed");
            messages.push(PageMessage::new(
                MessageLevel::Warning,
                "The backend could not be notified; changes will be applied on its next run.",
            ));
        }
    }

    Ok(UpdateOutcome::Success(messages))
}

async fn send_login_data(
    state: &AppState,
    ctx: &EditContext,
    account: &CustomerAccount,
    profile: &Profile,
    plain: &str,
) -> anyhow::Result<()> {
    let reseller = state
        .store
        .reseller_contact(ctx.reseller.id)
        .await?
        .ok_or_else(|| anyhow::anyhow!("reseller {} has no contact record", ctx.reseller.id))?;
    let from = Party {
        name: reseller.display_name(),
        email: reseller.email.clone().unwrap_or_default(),
    };
    let to = Party {
        name: profile.full_name(),
        email: profile.email.clone(),
    };
    let mail = login_data_mail(
        from,
        to,
        &LoginData {
            username: &account.login_name,
            password: plain,
            user_type: "Customer",
            panel_url: &state.config.panel_base_url,
        },
    )?;
    state.mailer.send(mail).await?;
    Ok(())
}
