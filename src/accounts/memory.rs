//! In-memory `AccountStore` backing the unit tests.

use std::{
    collections::HashMap,
    sync::{Mutex, MutexGuard},
};

use async_trait::async_trait;

use super::repo::AccountStore;
use super::repo_types::{AccountStatus, CustomerAccount, Gender, Profile, ResellerContact};

#[derive(Default)]
struct Tables {
    accounts: HashMap<i64, CustomerAccount>,
    resellers: HashMap<i64, ResellerContact>,
    /// (session id, user name)
    sessions: Vec<(String, String)>,
    log: Vec<String>,
    writes: usize,
}

#[derive(Default)]
pub struct InMemoryStore {
    tables: Mutex<Tables>,
}

pub const STORED_HASH: &str = "$argon2id$v=19$m=19456,t=2,p=1$c3RvcmVkc2FsdA$c3RvcmVkaGFzaHZhbHVl";

impl InMemoryStore {
    /// Reseller 1 owns customer 10 (`customer1`), reseller 2 owns customer 20.
    pub fn seeded() -> Self {
        let store = Self::default();
        {
            let mut t = store.lock();
            t.resellers.insert(
                1,
                ResellerContact {
                    admin_name: "reseller1".into(),
                    fname: Some("Rita".into()),
                    lname: Some("Seller".into()),
                    email: Some("rita@reseller.test".into()),
                },
            );
            t.accounts.insert(10, account(10, 1, "customer1"));
            t.accounts.insert(20, account(20, 2, "customer2"));
            t.sessions.push(("sess-a".into(), "customer1".into()));
            t.sessions.push(("sess-b".into(), "customer1".into()));
            t.sessions.push(("sess-c".into(), "customer2".into()));
        }
        store
    }

    fn lock(&self) -> MutexGuard<'_, Tables> {
        self.tables.lock().expect("store mutex poisoned")
    }

    pub fn account(&self, admin_id: i64) -> Option<CustomerAccount> {
        self.lock().accounts.get(&admin_id).cloned()
    }

    pub fn sessions_of(&self, login_name: &str) -> usize {
        self.lock()
            .sessions
            .iter()
            .filter(|(_, user)| user == login_name)
            .count()
    }

    pub fn log_lines(&self) -> Vec<String> {
        self.lock().log.clone()
    }

    /// Number of UPDATE statements that changed a row.
    pub fn writes(&self) -> usize {
        self.lock().writes
    }
}

fn account(admin_id: i64, created_by: i64, login_name: &str) -> CustomerAccount {
    CustomerAccount {
        admin_id,
        created_by,
        login_name: login_name.into(),
        password_hash: STORED_HASH.into(),
        status: AccountStatus::Ok,
        profile: Profile {
            customer_id: format!("C-{admin_id}"),
            first_name: "Ada".into(),
            last_name: "Lovelace".into(),
            company: "Analytical <Engines> & Co".into(),
            email: format!("{login_name}@example.com"),
            phone: "+44 20 0000".into(),
            fax: String::new(),
            gender: Gender::Female,
            zip: "W1".into(),
            city: "London".into(),
            state: String::new(),
            country: "UK".into(),
            street1: "1 Marylebone".into(),
            street2: String::new(),
        },
    }
}

#[async_trait]
impl AccountStore for InMemoryStore {
    async fn find_owned(
        &self,
        admin_id: i64,
        reseller_id: i64,
    ) -> anyhow::Result<Option<CustomerAccount>> {
        Ok(self
            .lock()
            .accounts
            .get(&admin_id)
            .filter(|a| a.created_by == reseller_id)
            .cloned())
    }

    async fn update_profile(
        &self,
        admin_id: i64,
        reseller_id: i64,
        profile: &Profile,
    ) -> anyhow::Result<u64> {
        let mut guard = self.lock();
        let t = &mut *guard;
        match t.accounts.get_mut(&admin_id) {
            Some(a) if a.created_by == reseller_id => {
                a.profile = profile.clone();
                t.writes += 1;
                Ok(1)
            }
            _ => Ok(0),
        }
    }

    async fn update_profile_and_password(
        &self,
        admin_id: i64,
        reseller_id: i64,
        profile: &Profile,
        password_hash: &str,
    ) -> anyhow::Result<u64> {
        let mut guard = self.lock();
        let t = &mut *guard;
        match t.accounts.get_mut(&admin_id) {
            Some(a) if a.created_by == reseller_id => {
                a.profile = profile.clone();
                a.password_hash = password_hash.to_string();
                a.status = AccountStatus::ToChangePwd;
                t.writes += 1;
                Ok(1)
            }
            _ => Ok(0),
        }
    }

    async fn delete_login_sessions(&self, login_name: &str) -> anyhow::Result<u64> {
        let mut t = self.lock();
        let before = t.sessions.len();
        t.sessions.retain(|(_, user)| user != login_name);
        Ok((before - t.sessions.len()) as u64)
    }

    async fn reseller_contact(&self, reseller_id: i64) -> anyhow::Result<Option<ResellerContact>> {
        Ok(self.lock().resellers.get(&reseller_id).cloned())
    }

    async fn write_log(&self, message: &str) -> anyhow::Result<()> {
        self.lock().log.push(message.to_string());
        Ok(())
    }
}
