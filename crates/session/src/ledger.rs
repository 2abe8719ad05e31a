//! Session ledger: per-user login history over a [`KeyValueStore`].
//!
//! Lifecycle of an entry:
//! - `register` writes it with tier `Nuevo`;
//! - every `record_login` classifies the stored last login, then moves it to
//!   `previousLogin` and stamps a new `lastLogin`;
//! - `clear` (logout) removes it.
//!
//! Entries are read field by field. Only `lastLogin` drives classification:
//! absent, `null` or empty reads as never logged in, anything else that is not
//! a timestamp reads as unreadable (and classifies as `Olvidado`).

use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value;

use tierbadge_classification::{ClassificationTier, LastLogin, RecencyThresholds};
use tierbadge_core::{Clock, UserId};

use crate::record::LoginRecord;
use crate::store::{KeyValueStore, StoreResult};

/// Session-derived capability consumed by recency classification.
pub trait SessionLookup {
    /// Most recent recorded login for `user_id`.
    fn previous_login(&self, user_id: &UserId) -> LastLogin;
}

/// Result of recording a login.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginOutcome {
    pub classification: ClassificationTier,
    pub last_login: DateTime<Utc>,
}

/// The parts of a stored entry a login carries forward.
#[derive(Debug, Default)]
struct StoredEntry {
    last_login: Option<LastLogin>,
    email: Option<String>,
    full_name: Option<String>,
    created_at: Option<DateTime<Utc>>,
}

impl StoredEntry {
    fn from_value(value: &Value) -> Self {
        let text = |field: &str| value.get(field).and_then(Value::as_str);
        Self {
            last_login: Some(last_login_from(value.get("lastLogin"))),
            email: text("email").map(str::to_owned),
            full_name: text("fullName").map(str::to_owned),
            created_at: text("createdAt").and_then(|raw| LastLogin::parse(raw).timestamp()),
        }
    }

    fn last_login(&self) -> LastLogin {
        self.last_login.unwrap_or(LastLogin::Never)
    }
}

/// Interpret a raw `lastLogin` field.
///
/// Strings are parsed as timestamps and numbers as epoch milliseconds;
/// `null`, `false` and a missing field mean no login yet.
fn last_login_from(raw: Option<&Value>) -> LastLogin {
    match raw {
        None | Some(Value::Null) | Some(Value::Bool(false)) => LastLogin::Never,
        Some(Value::String(s)) => LastLogin::parse(s),
        Some(Value::Number(n)) => match n.as_f64() {
            Some(ms) if ms.is_finite() => LastLogin::from_epoch_millis(ms.trunc() as i64),
            _ => LastLogin::Unreadable,
        },
        Some(_) => LastLogin::Unreadable,
    }
}

pub struct SessionLedger<S, C> {
    store: S,
    clock: C,
    thresholds: RecencyThresholds,
}

impl<S, C> SessionLedger<S, C>
where
    S: KeyValueStore,
    C: Clock,
{
    pub fn new(store: S, clock: C) -> Self {
        Self::with_thresholds(store, clock, RecencyThresholds::default())
    }

    pub fn with_thresholds(store: S, clock: C, thresholds: RecencyThresholds) -> Self {
        Self {
            store,
            clock,
            thresholds,
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Record a login for `user_id` and return the tier it earned.
    ///
    /// Never fails. An entry that is not a JSON object is treated as absent
    /// (and replaced); a store that cannot be read or written yields `Nuevo`.
    /// A `lastLogin` that cannot be read is not carried into `previousLogin`.
    pub fn record_login(&self, user_id: &UserId) -> LoginOutcome {
        let now = self.clock.now();
        match self.try_record_login(user_id, now) {
            Ok(outcome) => outcome,
            Err(e) => {
                tracing::error!(%user_id, error = %e, "failed to record login; falling back to Nuevo");
                LoginOutcome {
                    classification: ClassificationTier::Nuevo,
                    last_login: now,
                }
            }
        }
    }

    fn try_record_login(&self, user_id: &UserId, now: DateTime<Utc>) -> StoreResult<LoginOutcome> {
        let key = user_id.storage_key();
        let entry = self
            .read_raw(user_id, &key)?
            .map(|value| StoredEntry::from_value(&value))
            .unwrap_or_default();
        let previous = entry.last_login();
        if previous == LastLogin::Unreadable {
            tracing::warn!(%user_id, "stored lastLogin is not a timestamp");
        }
        let classification = self.thresholds.classify_last_login(previous, now);

        tracing::debug!(
            %user_id,
            previous_login = ?previous,
            %classification,
            "classified login by recency"
        );

        let record = LoginRecord {
            last_login: now,
            previous_login: Some(previous.timestamp().unwrap_or(now)),
            classification: Some(classification),
            updated_at: Some(now),
            email: entry.email,
            full_name: entry.full_name,
            created_at: entry.created_at,
        };
        self.store.set(&key, serde_json::to_string(&record)?)?;

        Ok(LoginOutcome {
            classification,
            last_login: now,
        })
    }

    /// Initialize the entry for a newly registered user.
    pub fn register(
        &self,
        user_id: &UserId,
        email: impl Into<String>,
        full_name: Option<String>,
    ) -> StoreResult<LoginRecord> {
        let record = LoginRecord::registered(email, full_name, self.clock.now());
        self.store
            .set(&user_id.storage_key(), serde_json::to_string(&record)?)?;
        tracing::info!(%user_id, "registered session entry");
        Ok(record)
    }

    /// Stored entry for `user_id`, or `None` when absent or when its
    /// `lastLogin` is not a timestamp.
    pub fn user_data(&self, user_id: &UserId) -> Option<LoginRecord> {
        let value = match self.read_raw(user_id, &user_id.storage_key()) {
            Ok(value) => value?,
            Err(e) => {
                tracing::error!(%user_id, error = %e, "failed to read session entry");
                return None;
            }
        };
        match serde_json::from_value::<LoginRecord>(value) {
            Ok(record) => Some(record),
            Err(e) => {
                tracing::warn!(%user_id, error = %e, "session entry has no usable lastLogin");
                None
            }
        }
    }

    /// Recency tier for the stored last login, without recording a new one.
    pub fn current_tier(&self, user_id: &UserId) -> ClassificationTier {
        self.thresholds
            .classify_last_login(self.previous_login(user_id), self.clock.now())
    }

    /// Drop the entry (logout).
    pub fn clear(&self, user_id: &UserId) -> StoreResult<()> {
        self.store.remove(&user_id.storage_key())?;
        tracing::info!(%user_id, "cleared session entry");
        Ok(())
    }

    /// Read an entry as a JSON object; anything else is logged and read as absent.
    fn read_raw(&self, user_id: &UserId, key: &str) -> StoreResult<Option<Value>> {
        let Some(raw) = self.store.get(key)? else {
            return Ok(None);
        };
        match serde_json::from_str::<Value>(&raw) {
            Ok(value @ Value::Object(_)) => Ok(Some(value)),
            Ok(_) => {
                tracing::warn!(%user_id, "ignoring session entry that is not an object");
                Ok(None)
            }
            Err(e) => {
                tracing::warn!(%user_id, error = %e, "ignoring unreadable session entry");
                Ok(None)
            }
        }
    }
}

impl<S, C> SessionLookup for SessionLedger<S, C>
where
    S: KeyValueStore,
    C: Clock,
{
    fn previous_login(&self, user_id: &UserId) -> LastLogin {
        match self.read_raw(user_id, &user_id.storage_key()) {
            Ok(entry) => entry.map_or(LastLogin::Never, |value| {
                StoredEntry::from_value(&value).last_login()
            }),
            Err(e) => {
                tracing::error!(%user_id, error = %e, "failed to read session entry");
                LastLogin::Never
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use chrono::{Duration, TimeZone};

    use super::*;
    use crate::store::{InMemoryStore, StoreError};

    /// Clock the test can move forward.
    #[derive(Debug, Clone)]
    struct ManualClock(Arc<Mutex<DateTime<Utc>>>);

    impl ManualClock {
        fn starting_at(at: DateTime<Utc>) -> Self {
            Self(Arc::new(Mutex::new(at)))
        }

        fn advance(&self, by: Duration) {
            let mut now = self.0.lock().unwrap();
            *now += by;
        }
    }

    impl Clock for ManualClock {
        fn now(&self) -> DateTime<Utc> {
            *self.0.lock().unwrap()
        }
    }

    /// Store whose every operation fails.
    struct BrokenStore;

    impl KeyValueStore for BrokenStore {
        fn get(&self, _key: &str) -> StoreResult<Option<String>> {
            Err(StoreError::Poisoned)
        }

        fn set(&self, _key: &str, _value: String) -> StoreResult<()> {
            Err(StoreError::Poisoned)
        }

        fn remove(&self, _key: &str) -> StoreResult<()> {
            Err(StoreError::Poisoned)
        }
    }

    fn start() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 15, 8, 0, 0).unwrap()
    }

    fn test_user_id() -> UserId {
        UserId::parse("0190f5a4-7c1e-7a3b-9d2e-123456789abc").unwrap()
    }

    fn ledger() -> (SessionLedger<Arc<InMemoryStore>, ManualClock>, ManualClock) {
        let clock = ManualClock::starting_at(start());
        (
            SessionLedger::new(Arc::new(InMemoryStore::new()), clock.clone()),
            clock,
        )
    }

    #[test]
    fn first_login_is_nuevo_and_second_is_hechicero() {
        let (ledger, clock) = ledger();
        let user = test_user_id();

        let first = ledger.record_login(&user);
        assert_eq!(first.classification, ClassificationTier::Nuevo);
        assert_eq!(first.last_login, start());

        let stored = ledger.user_data(&user).unwrap();
        assert_eq!(stored.previous_login, Some(start()));

        clock.advance(Duration::hours(1));
        let second = ledger.record_login(&user);
        assert_eq!(second.classification, ClassificationTier::Hechicero);
        assert_eq!(second.last_login, start() + Duration::hours(1));
    }

    #[test]
    fn previous_login_carries_the_prior_last_login() {
        let (ledger, clock) = ledger();
        let user = test_user_id();

        ledger.record_login(&user);
        clock.advance(Duration::hours(30));
        let outcome = ledger.record_login(&user);
        assert_eq!(outcome.classification, ClassificationTier::Luchador);

        let stored = ledger.user_data(&user).unwrap();
        assert_eq!(stored.previous_login, Some(start()));
        assert_eq!(stored.last_login, start() + Duration::hours(30));
        assert_eq!(stored.classification, Some(ClassificationTier::Luchador));
    }

    #[test]
    fn long_absence_is_olvidado() {
        let (ledger, clock) = ledger();
        let user = test_user_id();

        ledger.record_login(&user);
        clock.advance(Duration::days(8));
        assert_eq!(ledger.current_tier(&user), ClassificationTier::Olvidado);
        assert_eq!(ledger.record_login(&user).classification, ClassificationTier::Olvidado);
    }

    #[test]
    fn register_then_login_keeps_profile_fields() {
        let (ledger, clock) = ledger();
        let user = test_user_id();

        let registered = ledger
            .register(&user, "ana@gmail.com", Some("Ana Lopez".into()))
            .unwrap();
        assert_eq!(registered.classification, Some(ClassificationTier::Nuevo));
        assert_eq!(ledger.user_data(&user), Some(registered));

        clock.advance(Duration::days(3));
        let outcome = ledger.record_login(&user);
        assert_eq!(outcome.classification, ClassificationTier::Explorador);

        let stored = ledger.user_data(&user).unwrap();
        assert_eq!(stored.email.as_deref(), Some("ana@gmail.com"));
        assert_eq!(stored.full_name.as_deref(), Some("Ana Lopez"));
        assert_eq!(stored.created_at, Some(start()));
    }

    #[test]
    fn clear_removes_the_entry() {
        let (ledger, _clock) = ledger();
        let user = test_user_id();

        ledger.record_login(&user);
        ledger.clear(&user).unwrap();
        assert_eq!(ledger.user_data(&user), None);
        assert_eq!(ledger.previous_login(&user), LastLogin::Never);
        assert_eq!(ledger.current_tier(&user), ClassificationTier::Nuevo);
    }

    #[test]
    fn corrupt_entry_is_replaced_with_a_fresh_one() {
        let (ledger, _clock) = ledger();
        let user = test_user_id();
        ledger
            .store()
            .set(&user.storage_key(), "{\"lastLogin\": 42".into())
            .unwrap();

        assert_eq!(ledger.user_data(&user), None);
        let outcome = ledger.record_login(&user);
        assert_eq!(outcome.classification, ClassificationTier::Nuevo);
        assert!(ledger.user_data(&user).is_some());
    }

    fn seed(ledger: &SessionLedger<Arc<InMemoryStore>, ManualClock>, user: &UserId, raw: &str) {
        ledger.store().set(&user.storage_key(), raw.into()).unwrap();
    }

    #[test]
    fn unparseable_last_login_is_olvidado() {
        let (ledger, _clock) = ledger();
        let user = test_user_id();
        seed(&ledger, &user, r#"{"lastLogin":"garbage"}"#);

        assert_eq!(ledger.previous_login(&user), LastLogin::Unreadable);
        assert_eq!(ledger.current_tier(&user), ClassificationTier::Olvidado);
        assert_eq!(ledger.user_data(&user), None);

        let outcome = ledger.record_login(&user);
        assert_eq!(outcome.classification, ClassificationTier::Olvidado);

        let stored = ledger.user_data(&user).unwrap();
        assert_eq!(stored.last_login, start());
        assert_eq!(stored.previous_login, Some(start()));
    }

    #[test]
    fn entry_with_only_a_last_login_is_classified() {
        let (ledger, _clock) = ledger();
        let user = test_user_id();
        seed(&ledger, &user, r#"{"lastLogin":"2024-06-15T07:00:00.000Z"}"#);

        let stored = ledger.user_data(&user).unwrap();
        assert_eq!(stored.classification, None);
        assert_eq!(stored.updated_at, None);
        assert_eq!(ledger.current_tier(&user), ClassificationTier::Hechicero);

        let outcome = ledger.record_login(&user);
        assert_eq!(outcome.classification, ClassificationTier::Hechicero);
        let stored = ledger.user_data(&user).unwrap();
        assert_eq!(stored.previous_login, Some(start() - Duration::hours(1)));
        assert_eq!(stored.classification, Some(ClassificationTier::Hechicero));
    }

    #[test]
    fn missing_null_or_empty_last_login_is_nuevo() {
        for raw in [
            r#"{}"#,
            r#"{"lastLogin":null}"#,
            r#"{"lastLogin":""}"#,
            r#"{"email":"ana@gmail.com"}"#,
        ] {
            let (ledger, _clock) = ledger();
            let user = test_user_id();
            seed(&ledger, &user, raw);

            assert_eq!(ledger.previous_login(&user), LastLogin::Never, "{raw}");
            assert_eq!(
                ledger.record_login(&user).classification,
                ClassificationTier::Nuevo,
                "{raw}"
            );
        }
    }

    #[test]
    fn non_string_last_login_values() {
        let (ledger, _clock) = ledger();
        let user = test_user_id();

        // epoch millis, one hour before the clock
        let millis = (start() - Duration::hours(1)).timestamp_millis();
        seed(&ledger, &user, &format!(r#"{{"lastLogin":{millis}}}"#));
        assert_eq!(ledger.current_tier(&user), ClassificationTier::Hechicero);

        seed(&ledger, &user, r#"{"lastLogin":{"seconds":1}}"#);
        assert_eq!(ledger.current_tier(&user), ClassificationTier::Olvidado);

        seed(&ledger, &user, r#"["not","an","object"]"#);
        assert_eq!(ledger.current_tier(&user), ClassificationTier::Nuevo);
    }

    #[test]
    fn lenient_read_keeps_profile_fields_on_login() {
        let (ledger, _clock) = ledger();
        let user = test_user_id();
        seed(
            &ledger,
            &user,
            r#"{"lastLogin":"garbage","email":"ana@gmail.com","classification":"Mago","createdAt":"2024-01-02T00:00:00Z"}"#,
        );

        ledger.record_login(&user);
        let stored = ledger.user_data(&user).unwrap();
        assert_eq!(stored.email.as_deref(), Some("ana@gmail.com"));
        assert_eq!(
            stored.created_at,
            Some(Utc.with_ymd_and_hms(2024, 1, 2, 0, 0, 0).unwrap())
        );
        assert_eq!(stored.classification, Some(ClassificationTier::Olvidado));
    }

    #[test]
    fn provider_uids_key_their_own_entries() {
        let (ledger, clock) = ledger();
        let ana = UserId::parse("kF3xQ9mZ2bTnW7vR1cY8pL4sD6hA").unwrap();
        let bo = test_user_id();

        ledger.record_login(&ana);
        clock.advance(Duration::hours(2));
        assert_eq!(ledger.record_login(&bo).classification, ClassificationTier::Nuevo);
        assert_eq!(ledger.record_login(&ana).classification, ClassificationTier::Hechicero);
        assert!(ledger.store().get("user_kF3xQ9mZ2bTnW7vR1cY8pL4sD6hA").unwrap().is_some());
    }

    #[test]
    fn broken_store_never_fails_login() {
        let ledger = SessionLedger::new(BrokenStore, ManualClock::starting_at(start()));
        let user = test_user_id();

        let outcome = ledger.record_login(&user);
        assert_eq!(outcome.classification, ClassificationTier::Nuevo);
        assert_eq!(outcome.last_login, start());
        assert_eq!(ledger.user_data(&user), None);
        assert!(ledger.register(&user, "a@b.c", None).is_err());
        assert!(ledger.clear(&user).is_err());
    }

    #[test]
    fn custom_thresholds_apply_to_logins() {
        let clock = ManualClock::starting_at(start());
        let thresholds = RecencyThresholds::new(0.5, 1.0, 2.0).unwrap();
        let ledger =
            SessionLedger::with_thresholds(InMemoryStore::new(), clock.clone(), thresholds);
        let user = test_user_id();

        ledger.record_login(&user);
        clock.advance(Duration::minutes(90));
        assert_eq!(ledger.record_login(&user).classification, ClassificationTier::Explorador);
    }

    #[test]
    fn outcome_serializes_camel_case() {
        let outcome = LoginOutcome {
            classification: ClassificationTier::Luchador,
            last_login: start(),
        };
        let value = serde_json::to_value(outcome).unwrap();
        assert_eq!(value["classification"], "Luchador");
        assert!(value.get("lastLogin").is_some());
    }
}
