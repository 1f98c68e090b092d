use chrono::Utc;
use coursegate_common::{AccessCode, CodeId, CodePrefix, CodeStats, DocumentKey};
use serde_json::Value;

use crate::domain::error::CourseError;
use crate::domain::store::{self, DocumentStore, Modification, StoreError};

const CODES: DocumentKey = DocumentKey::CourseCodes;

/// Result of presenting an access code at login.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Redemption {
    NotFound,
    AlreadyUsed,
    Success(AccessCode),
}

/// Issued access codes, stored as one list under `courseCodes`.
#[derive(Clone, Debug)]
pub struct CodeRegistry<S> {
    store: S,
}

impl<S: DocumentStore> CodeRegistry<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub async fn list(&self) -> Result<Vec<AccessCode>, StoreError> {
        Ok(store::load(&self.store, CODES).await?.unwrap_or_default())
    }

    pub async fn stats(&self) -> Result<CodeStats, StoreError> {
        let codes = self.list().await?;
        Ok(CodeStats::from(codes.as_slice()))
    }

    /// Append a fresh `PREFIX-XXXXXX` code.
    pub async fn generate(&self, prefix: &CodePrefix) -> Result<AccessCode, StoreError> {
        let code = self
            .store
            .modify(CODES, |current| -> Result<_, StoreError> {
                let mut codes = decode_codes(current)?;
                let code = AccessCode::issue(prefix, &codes, Utc::now(), &mut rand::rng());
                codes.push(code.clone());
                Ok(Modification::Write(encode_codes(&codes)?, code))
            })
            .await?;

        tracing::info!(id = code.id.as_str(), "access code generated");
        Ok(code)
    }

    /// Returns whether anything was removed.
    pub async fn delete(&self, id: &CodeId) -> Result<bool, StoreError> {
        let removed = self
            .store
            .modify(CODES, |current| -> Result<_, StoreError> {
                let mut codes = decode_codes(current)?;
                let before = codes.len();
                codes.retain(|code| &code.id != id);
                if codes.len() == before {
                    return Ok(Modification::Keep(false));
                }
                Ok(Modification::Write(encode_codes(&codes)?, true))
            })
            .await?;

        if removed {
            tracing::info!(id = id.as_str(), "access code deleted");
        }
        Ok(removed)
    }

    /// Drop every code. Refused unless `confirmed`; returns how many were removed.
    pub async fn reset_all(&self, confirmed: bool) -> Result<usize, CourseError> {
        if !confirmed {
            return Err(CourseError::ConfirmationRequired);
        }

        let removed = self
            .store
            .modify(CODES, |current| -> Result<_, CourseError> {
                let codes = decode_codes(current)?;
                Ok(Modification::Write(Value::Array(Vec::new()), codes.len()))
            })
            .await?;

        tracing::warn!(removed, "all access codes deleted");
        Ok(removed)
    }

    /// Consume a code and open the learner session.
    ///
    /// Lookup is by exact value. The used flag is flipped inside one atomic
    /// update, so a code can succeed at most once.
    pub async fn redeem(&self, code: &str) -> Result<Redemption, StoreError> {
        let redemption = self
            .store
            .modify(CODES, |current| -> Result<_, StoreError> {
                let mut codes = decode_codes(current)?;
                let Some(found) = codes.iter().find(|c| c.code == code) else {
                    return Ok(Modification::Keep(Redemption::NotFound));
                };
                if found.used {
                    return Ok(Modification::Keep(Redemption::AlreadyUsed));
                }

                let now = Utc::now();
                for matching in codes.iter_mut().filter(|c| c.code == code) {
                    matching.mark_used(now);
                }
                let redeemed = codes
                    .iter()
                    .find(|c| c.code == code)
                    .cloned()
                    .map(Redemption::Success)
                    .unwrap_or(Redemption::NotFound);

                Ok(Modification::Write(encode_codes(&codes)?, redeemed))
            })
            .await?;

        match &redemption {
            Redemption::Success(redeemed) => {
                if let Err(err) = self.open_session(redeemed).await {
                    tracing::error!(id = redeemed.id.as_str(), "session write failed, releasing code");
                    self.release(redeemed).await?;
                    return Err(err);
                }
                tracing::info!(id = redeemed.id.as_str(), "access code redeemed");
            }
            Redemption::AlreadyUsed => tracing::info!("redemption refused: code already used"),
            Redemption::NotFound => tracing::info!("redemption refused: unknown code"),
        }

        Ok(redemption)
    }

    async fn open_session(&self, redeemed: &AccessCode) -> Result<(), StoreError> {
        store::save(&self.store, DocumentKey::UserLoggedIn, &true).await?;
        store::save(&self.store, DocumentKey::CurrentAccessCode, &redeemed.code).await
    }

    // Undo a redemption whose session never opened, so the learner can retry.
    async fn release(&self, redeemed: &AccessCode) -> Result<(), StoreError> {
        if let Err(err) = self.store.remove(DocumentKey::UserLoggedIn).await {
            tracing::warn!("failed to clear login flag: {}", err);
        }
        let Some(used_at) = redeemed.used_at else {
            return Ok(());
        };
        self.store
            .modify(CODES, |current| -> Result<_, StoreError> {
                let mut codes = decode_codes(current)?;
                for matching in codes.iter_mut().filter(|c| c.code == redeemed.code) {
                    matching.release(used_at);
                }
                Ok(Modification::Write(encode_codes(&codes)?, ()))
            })
            .await
    }
}

fn decode_codes(current: Option<Value>) -> Result<Vec<AccessCode>, StoreError> {
    Ok(store::decode(CODES, current)?.unwrap_or_default())
}

fn encode_codes(codes: &[AccessCode]) -> Result<Value, StoreError> {
    store::encode(CODES, &codes)
}

#[cfg(test)]
mod tests {
    use coursegate_common::test_utils::make_code;

    use super::*;
    use crate::infrastructure::store::memory::InMemoryStore;

    // `COURSE-` followed by six upper-case base-36 symbols.
    fn is_course_code(code: &str) -> bool {
        let Some(suffix) = code.strip_prefix("COURSE-") else {
            return false;
        };
        suffix.len() == 6
            && suffix
                .chars()
                .all(|c| c.is_ascii_digit() || c.is_ascii_uppercase())
    }

    fn registry() -> (CodeRegistry<InMemoryStore>, InMemoryStore) {
        let store = InMemoryStore::default();
        (CodeRegistry::new(store.clone()), store)
    }

    #[tokio::test]
    async fn unknown_code_is_not_found() {
        let (registry, store) = registry();
        registry.generate(&CodePrefix::default()).await.unwrap();

        assert_eq!(registry.redeem("COURSE-NOPE00").await.unwrap(), Redemption::NotFound);
        assert_eq!(store.get(DocumentKey::UserLoggedIn).await.unwrap(), None);
    }

    #[tokio::test]
    async fn code_redeems_exactly_once() {
        let (registry, store) = registry();
        let issued = registry.generate(&CodePrefix::default()).await.unwrap();

        let first = registry.redeem(&issued.code).await.unwrap();
        let second = registry.redeem(&issued.code).await.unwrap();

        let Redemption::Success(redeemed) = first else {
            panic!("expected the first redemption to succeed");
        };
        assert!(redeemed.used);
        assert!(redeemed.used_at.is_some());
        assert_eq!(second, Redemption::AlreadyUsed);

        let stored = registry.list().await.unwrap();
        assert!(stored[0].used);
        assert_eq!(stored[0].used_at, redeemed.used_at);

        let logged_in: Option<bool> = store::load(&store, DocumentKey::UserLoggedIn).await.unwrap();
        let current: Option<String> = store::load(&store, DocumentKey::CurrentAccessCode).await.unwrap();
        assert_eq!(logged_in, Some(true));
        assert_eq!(current, Some(issued.code));
    }

    #[tokio::test]
    async fn generated_code_matches_pattern() {
        let (registry, _) = registry();
        let code = registry.generate(&CodePrefix::try_new("course").unwrap()).await.unwrap();
        assert!(is_course_code(&code.code), "unexpected code {}", code.code);
    }

    #[tokio::test]
    async fn reset_then_generate_leaves_one_code() {
        let (registry, _) = registry();
        for _ in 0..3 {
            registry.generate(&CodePrefix::default()).await.unwrap();
        }

        assert_eq!(registry.reset_all(true).await.unwrap(), 3);
        registry.generate(&CodePrefix::default()).await.unwrap();

        assert_eq!(registry.list().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn reset_requires_confirmation() {
        let (registry, _) = registry();
        registry.generate(&CodePrefix::default()).await.unwrap();

        let err = registry.reset_all(false).await.unwrap_err();

        assert!(matches!(err, CourseError::ConfirmationRequired));
        assert_eq!(registry.list().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn delete_removes_only_the_matching_code() {
        let (registry, _) = registry();
        let first = registry.generate(&CodePrefix::default()).await.unwrap();
        let second = registry.generate(&CodePrefix::default()).await.unwrap();

        assert!(registry.delete(&first.id).await.unwrap());
        assert!(!registry.delete(&first.id).await.unwrap());

        let remaining = registry.list().await.unwrap();
        assert_eq!(remaining, vec![second]);
    }

    #[tokio::test]
    async fn duplicate_values_are_all_consumed() {
        let (registry, store) = registry();
        let codes = vec![make_code("1", "COURSE-AAAAAA"), make_code("2", "COURSE-AAAAAA")];
        store::save(&store, CODES, &codes).await.unwrap();

        assert!(matches!(
            registry.redeem("COURSE-AAAAAA").await.unwrap(),
            Redemption::Success(_)
        ));
        assert_eq!(registry.redeem("COURSE-AAAAAA").await.unwrap(), Redemption::AlreadyUsed);
        assert_eq!(registry.stats().await.unwrap(), CodeStats { total: 2, active: 0, used: 2 });
    }

    #[tokio::test]
    async fn concurrent_redemptions_succeed_once() {
        let (registry, _) = registry();
        let issued = registry.generate(&CodePrefix::default()).await.unwrap();

        let attempts = (0..8).map(|_| {
            let registry = registry.clone();
            let code = issued.code.clone();
            tokio::spawn(async move { registry.redeem(&code).await.unwrap() })
        });
        let results = futures::future::join_all(attempts).await;

        let successes = results
            .into_iter()
            .map(|r| r.unwrap())
            .filter(|r| matches!(r, Redemption::Success(_)))
            .count();
        assert_eq!(successes, 1);
    }

    #[tokio::test]
    async fn malformed_registry_surfaces_as_error() {
        let (registry, store) = registry();
        store.put(CODES, serde_json::json!("not a list")).await.unwrap();

        let err = registry.redeem("COURSE-AAAAAA").await.unwrap_err();
        assert!(matches!(err, StoreError::Malformed { .. }));
    }

    // Memory store that refuses to write the login flag.
    #[derive(Clone, Default)]
    struct SessionDownStore {
        inner: InMemoryStore,
    }

    impl DocumentStore for SessionDownStore {
        async fn get(&self, key: DocumentKey) -> Result<Option<Value>, StoreError> {
            self.inner.get(key).await
        }

        async fn put(&self, key: DocumentKey, value: Value) -> Result<(), StoreError> {
            if key == DocumentKey::UserLoggedIn {
                return Err(StoreError::Backend("down".to_string()));
            }
            self.inner.put(key, value).await
        }

        async fn remove(&self, key: DocumentKey) -> Result<(), StoreError> {
            self.inner.remove(key).await
        }

        async fn modify<T, E, F>(&self, key: DocumentKey, f: F) -> Result<T, E>
        where
            T: Send,
            E: From<StoreError> + Send,
            F: FnOnce(Option<Value>) -> Result<Modification<T>, E> + Send,
        {
            self.inner.modify(key, f).await
        }
    }

    #[tokio::test]
    async fn failed_session_write_releases_the_code() {
        let store = SessionDownStore::default();
        let registry = CodeRegistry::new(store.clone());
        let issued = registry.generate(&CodePrefix::default()).await.unwrap();

        let first = registry.redeem(&issued.code).await;
        assert!(matches!(first, Err(StoreError::Backend(_))));

        let stored = registry.list().await.unwrap();
        assert!(!stored[0].used);
        assert_eq!(stored[0].used_at, None);

        let second = registry.redeem(&issued.code).await;
        assert!(matches!(second, Err(StoreError::Backend(_))));
    }
}
