// auth.rs — Accounts, roles and the authorization checks services enforce
//
// Identity proof (passwords, OTP) belongs to the external identity service;
// by the time a call reaches this module the caller has been identified by
// user id. What lives here is policy:
//   - which accounts are elevated to ADMIN (an explicit, configured allow-list)
//   - which account states may sign in
//   - which roles may issue, list and administer
//
// Checks are made inside the services, so any front end gets the same gate.

use std::collections::BTreeSet;

use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::AuthError;
use crate::store::UserStore;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Role {
    Admin,
    Institution,
    Student,
    Verifier,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AccountStatus {
    Pending,
    #[default]
    Active,
    Rejected,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InstitutionDetails {
    pub website: String,
    pub founded_year: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: String,
    pub name: String,
    pub email: String,
    pub role: Role,
    #[serde(default)]
    pub status: AccountStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub student_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mobile_number: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub institution_details: Option<InstitutionDetails>,
}

impl User {
    fn label(&self) -> String {
        format!("{} ({:?})", self.id, self.role)
    }
}

// ── Policy ──────────────────────────────────────────────────────────────────

/// Email addresses whose accounts are always treated as ADMIN/ACTIVE.
#[derive(Debug, Clone, Default)]
pub struct AdminAllowList {
    emails: BTreeSet<String>,
}

impl AdminAllowList {
    pub fn new<I, S>(emails: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        AdminAllowList {
            emails: emails
                .into_iter()
                .map(|e| normalize_email(e.as_ref()))
                .filter(|e| !e.is_empty())
                .collect(),
        }
    }

    pub fn contains(&self, email: &str) -> bool {
        self.emails.contains(&normalize_email(email))
    }
}

fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

#[derive(Debug, Clone, Default)]
pub struct Authorizer {
    super_admins: AdminAllowList,
}

impl Authorizer {
    pub fn new(super_admins: AdminAllowList) -> Self {
        Authorizer { super_admins }
    }

    /// Apply allow-list elevation. Returns true if `user` was changed.
    pub fn elevate(&self, user: &mut User) -> bool {
        if !self.super_admins.contains(&user.email) {
            return false;
        }
        let changed = user.role != Role::Admin || user.status != AccountStatus::Active;
        user.role = Role::Admin;
        user.status = AccountStatus::Active;
        changed
    }

    /// The account state gate applied at sign-in and before every privileged call.
    pub fn admit(&self, user: &User) -> Result<User, AuthError> {
        let mut effective = user.clone();
        self.elevate(&mut effective);
        match (effective.role, effective.status) {
            (_, AccountStatus::Rejected) => Err(AuthError::Deactivated),
            (Role::Institution, AccountStatus::Pending) => Err(AuthError::PendingApproval),
            _ => Ok(effective),
        }
    }

    pub fn require_issuer(&self, actor: &User) -> Result<User, AuthError> {
        let effective = self.admit(actor)?;
        match (effective.role, effective.status) {
            (Role::Institution | Role::Admin, AccountStatus::Active) => Ok(effective),
            _ => Err(forbidden(&effective, "issue certificates")),
        }
    }

    pub fn require_admin(&self, actor: &User) -> Result<User, AuthError> {
        let effective = self.admit(actor)?;
        if effective.role == Role::Admin && effective.status == AccountStatus::Active {
            Ok(effective)
        } else {
            Err(forbidden(&effective, "administer accounts"))
        }
    }

    /// Students may list their own certificates; admins may list anyone's.
    pub fn require_student_access(&self, actor: &User, student_id: &str) -> Result<User, AuthError> {
        let effective = self.admit(actor)?;
        let allowed = match effective.role {
            Role::Admin => true,
            Role::Student => effective.student_id.as_deref() == Some(student_id),
            Role::Institution | Role::Verifier => false,
        };
        if allowed {
            Ok(effective)
        } else {
            Err(forbidden(&effective, "list these certificates"))
        }
    }
}

fn forbidden(actor: &User, action: &'static str) -> AuthError {
    AuthError::Forbidden {
        actor: actor.label(),
        action,
    }
}

// ── Accounts ────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InstitutionRegistration {
    pub institution_name: String,
    pub email: String,
    #[serde(default)]
    pub website: String,
    #[serde(default)]
    pub founded_year: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StudentRegistration {
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub mobile_number: Option<String>,
}

/// Registration, sign-in admission and institution approval.
pub struct AccountService<'a> {
    users: &'a dyn UserStore,
    authorizer: &'a Authorizer,
}

impl<'a> AccountService<'a> {
    pub fn new(users: &'a dyn UserStore, authorizer: &'a Authorizer) -> Self {
        AccountService { users, authorizer }
    }

    /// Load an account by id, failing if it does not exist.
    pub fn load(&self, user_id: &str) -> Result<User, AuthError> {
        self.users
            .get_user(user_id)?
            .ok_or_else(|| AuthError::UnknownUser(user_id.to_string()))
    }

    pub fn register_institution(&self, reg: InstitutionRegistration) -> Result<User, AuthError> {
        self.ensure_email_free(&reg.email)?;
        let mut user = User {
            id: uuid::Uuid::new_v4().to_string(),
            name: reg.institution_name,
            email: reg.email,
            role: Role::Institution,
            status: AccountStatus::Pending,
            student_id: None,
            mobile_number: None,
            institution_details: Some(InstitutionDetails {
                website: reg.website,
                founded_year: reg.founded_year,
            }),
        };
        if self.authorizer.elevate(&mut user) {
            info!(user = %user.id, "allow-listed registration created as admin");
        }
        self.users.put_user(&user)?;
        info!(user = %user.id, role = ?user.role, status = ?user.status, "registered institution account");
        Ok(user)
    }

    pub fn register_student(&self, reg: StudentRegistration) -> Result<User, AuthError> {
        self.ensure_email_free(&reg.email)?;
        let student_no: u32 = rand::thread_rng().gen_range(0..100_000);
        let user = User {
            id: uuid::Uuid::new_v4().to_string(),
            name: reg.name,
            email: reg.email,
            role: Role::Student,
            status: AccountStatus::Active,
            student_id: Some(format!("STU-{}", student_no)),
            mobile_number: reg.mobile_number,
            institution_details: None,
        };
        self.users.put_user(&user)?;
        info!(user = %user.id, "registered student account");
        Ok(user)
    }

    /// Admit a caller the identity service has already authenticated.
    /// Allow-list elevation is written back to the profile.
    pub fn sign_in(&self, user_id: &str) -> Result<User, AuthError> {
        let mut user = self.load(user_id)?;
        if self.authorizer.elevate(&mut user) {
            self.users.put_user(&user)?;
            info!(user = %user.id, "elevated allow-listed account to admin");
        }
        self.authorizer.admit(&user)
    }

    pub fn pending_institutions(&self, actor: &User) -> Result<Vec<User>, AuthError> {
        self.authorizer.require_admin(actor)?;
        Ok(self.users.scan_users(&|u| {
            u.role == Role::Institution && u.status == AccountStatus::Pending
        })?)
    }

    pub fn approve_institution(&self, actor: &User, email: &str) -> Result<usize, AuthError> {
        self.set_status_by_email(actor, email, AccountStatus::Active)
    }

    pub fn reject_institution(&self, actor: &User, email: &str) -> Result<usize, AuthError> {
        self.set_status_by_email(actor, email, AccountStatus::Rejected)
    }

    fn set_status_by_email(
        &self,
        actor: &User,
        email: &str,
        status: AccountStatus,
    ) -> Result<usize, AuthError> {
        let admin = self.authorizer.require_admin(actor)?;
        let wanted = normalize_email(email);
        let matches = self
            .users
            .scan_users(&|u| normalize_email(&u.email) == wanted)?;
        if matches.is_empty() {
            return Err(AuthError::UnknownUser(email.to_string()));
        }
        for mut user in matches.iter().cloned() {
            user.status = status;
            self.users.put_user(&user)?;
            info!(admin = %admin.id, user = %user.id, ?status, "account status changed");
        }
        Ok(matches.len())
    }

    fn ensure_email_free(&self, email: &str) -> Result<(), AuthError> {
        let wanted = normalize_email(email);
        let taken = self
            .users
            .scan_users(&|u| normalize_email(&u.email) == wanted)?;
        if taken.is_empty() {
            Ok(())
        } else {
            Err(AuthError::EmailInUse(email.to_string()))
        }
    }
}
