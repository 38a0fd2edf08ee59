use anyhow::Context;
use async_trait::async_trait;
use sqlx::PgPool;

use super::repo_types::{AccountRow, AccountStatus, CustomerAccount, Profile, ResellerContact};

/// Persistence used by the customer edit page.
#[async_trait]
pub trait AccountStore: Send + Sync {
    /// The account `admin_id` if it was created by `reseller_id`.
    async fn find_owned(
        &self,
        admin_id: i64,
        reseller_id: i64,
    ) -> anyhow::Result<Option<CustomerAccount>>;

    /// Returns the number of rows changed (0 when not owned).
    async fn update_profile(
        &self,
        admin_id: i64,
        reseller_id: i64,
        profile: &Profile,
    ) -> anyhow::Result<u64>;

    /// Also stores `password_hash` and flags the account `tochangepwd`.
    async fn update_profile_and_password(
        &self,
        admin_id: i64,
        reseller_id: i64,
        profile: &Profile,
        password_hash: &str,
    ) -> anyhow::Result<u64>;

    /// Drops every login session of `login_name`.
    async fn delete_login_sessions(&self, login_name: &str) -> anyhow::Result<u64>;

    async fn reseller_contact(&self, reseller_id: i64) -> anyhow::Result<Option<ResellerContact>>;

    /// Appends a line to the panel audit log.
    async fn write_log(&self, message: &str) -> anyhow::Result<()>;
}

#[derive(Clone)]
pub struct PgAccountStore {
    db: PgPool,
}

impl PgAccountStore {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

#[async_trait]
impl AccountStore for PgAccountStore {
    async fn find_owned(
        &self,
        admin_id: i64,
        reseller_id: i64,
    ) -> anyhow::Result<Option<CustomerAccount>> {
        let row = sqlx::query_as::<_, AccountRow>(
            r#"
            SELECT admin_id, created_by, admin_name, admin_pass, admin_status,
                   customer_id, fname, lname, firm, email, phone, fax, gender,
                   zip, city, state, country, street1, street2
              FROM admin
             WHERE admin_id = $1
               AND created_by = $2
            "#,
        )
        .bind(admin_id)
        .bind(reseller_id)
        .fetch_optional(&self.db)
        .await
        .context("select customer account")?;

        row.map(CustomerAccount::try_from)
            .transpose()
            .context("decode customer account")
    }

    async fn update_profile(
        &self,
        admin_id: i64,
        reseller_id: i64,
        p: &Profile,
    ) -> anyhow::Result<u64> {
        let res = sqlx::query(
            r#"
            UPDATE admin
               SET fname = $1, lname = $2, firm = $3, zip = $4, city = $5, state = $6,
                   country = $7, email = $8, phone = $9, fax = $10, street1 = $11,
                   street2 = $12, gender = $13, customer_id = $14
             WHERE admin_id = $15
               AND created_by = $16
            "#,
        )
        .bind(&p.first_name)
        .bind(&p.last_name)
        .bind(&p.company)
        .bind(&p.zip)
        .bind(&p.city)
        .bind(&p.state)
        .bind(&p.country)
        .bind(&p.email)
        .bind(&p.phone)
        .bind(&p.fax)
        .bind(&p.street1)
        .bind(&p.street2)
        .bind(p.gender.as_code())
        .bind(&p.customer_id)
        .bind(admin_id)
        .bind(reseller_id)
        .execute(&self.db)
        .await
        .context("update customer profile")?;
        Ok(res.rows_affected())
    }

    async fn update_profile_and_password(
        &self,
        admin_id: i64,
        reseller_id: i64,
        p: &Profile,
        password_hash: &str,
    ) -> anyhow::Result<u64> {
        let res = sqlx::query(
            r#"
            UPDATE admin
               SET admin_pass = $1, fname = $2, lname = $3, firm = $4, zip = $5, city = $6,
                   state = $7, country = $8, email = $9, phone = $10, fax = $11,
                   street1 = $12, street2 = $13, gender = $14, customer_id = $15,
                   admin_status = $16
             WHERE admin_id = $17
               AND created_by = $18
            "#,
        )
        .bind(password_hash)
        .bind(&p.first_name)
        .bind(&p.last_name)
        .bind(&p.company)
        .bind(&p.zip)
        .bind(&p.city)
        .bind(&p.state)
        .bind(&p.country)
        .bind(&p.email)
        .bind(&p.phone)
        .bind(&p.fax)
        .bind(&p.street1)
        .bind(&p.street2)
        .bind(p.gender.as_code())
        .bind(&p.customer_id)
        .bind(AccountStatus::ToChangePwd.as_str())
        .bind(admin_id)
        .bind(reseller_id)
        .execute(&self.db)
        .await
        .context("update customer profile and password")?;
        Ok(res.rows_affected())
    }

    async fn delete_login_sessions(&self, login_name: &str) -> anyhow::Result<u64> {
        let res = sqlx::query("DELETE FROM login WHERE user_name = $1")
            .bind(login_name)
            .execute(&self.db)
            .await
            .context("delete login sessions")?;
        Ok(res.rows_affected())
    }

    async fn reseller_contact(&self, reseller_id: i64) -> anyhow::Result<Option<ResellerContact>> {
        let contact = sqlx::query_as::<_, ResellerContact>(
            r#"
            SELECT admin_name, fname, lname, email
              FROM admin
             WHERE admin_id = $1
            "#,
        )
        .bind(reseller_id)
        .fetch_optional(&self.db)
        .await
        .context("select reseller contact")?;
        Ok(contact)
    }

    async fn write_log(&self, message: &str) -> anyhow::Result<()> {
        sqlx::query("INSERT INTO log (log_message) VALUES ($1)")
            .bind(message)
            .execute(&self.db)
            .await
            .context("insert audit log")?;
        Ok(())
    }
}
