use async_trait::async_trait;
use metrics::{counter, histogram};
use sea_orm::{
    ActiveModelTrait, DatabaseConnection, EntityTrait, QueryOrder, TransactionTrait,
};
use std::{sync::Arc, time::Instant};

use crate::entities::account::{
    ActiveModel as AccountActiveModel, AccountPayload, Column, Entity as Account,
    Model as AccountModel,
};
use crate::errors::ServiceError;

use super::{BaseRepository, Repository};

/// Persistence gateway for account records.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AccountRepository: Send + Sync {
    async fn create(&self, payload: AccountPayload) -> Result<AccountModel, ServiceError>;

    async fn get(&self, id: i32) -> Result<AccountModel, ServiceError>;

    /// All accounts in ascending id order.
    async fn list(&self) -> Result<Vec<AccountModel>, ServiceError>;

    async fn update(&self, id: i32, payload: AccountPayload)
        -> Result<AccountModel, ServiceError>;

    /// Fails with `NotFound` when no row was removed.
    async fn delete(&self, id: i32) -> Result<(), ServiceError>;
}

fn not_found(id: i32) -> ServiceError {
    ServiceError::NotFound(format!("Account with id [{}] could not be found.", id))
}

fn record<T>(operation: &'static str, started: Instant, result: &Result<T, ServiceError>) {
    histogram!(
        "account_service_db_operation_duration_seconds",
        started.elapsed().as_secs_f64(),
        "operation" => operation
    );
    if let Err(ServiceError::DatabaseError(_)) = result {
        counter!("account_service_db_operation_errors_total", 1, "operation" => operation);
    }
}

/// [`AccountRepository`] backed by a sea-orm connection pool.
#[derive(Debug, Clone)]
pub struct SeaOrmAccountRepository {
    base: BaseRepository,
}

impl SeaOrmAccountRepository {
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self {
            base: BaseRepository::new(db),
        }
    }

    async fn update_in_transaction(
        &self,
        id: i32,
        payload: AccountPayload,
    ) -> Result<AccountModel, ServiceError> {
        let txn = self.get_db().begin().await?;

        let existing = Account::find_by_id(id)
            .one(&txn)
            .await?
            .ok_or_else(|| not_found(id))?;

        let mut active: AccountActiveModel = existing.into();
        payload.apply_to(&mut active);
        let updated = active.update(&txn).await?;

        txn.commit().await?;
        Ok(updated)
    }
}

impl Repository for SeaOrmAccountRepository {
    fn get_db(&self) -> &DatabaseConnection {
        self.base.get_db()
    }
}

#[async_trait]
impl AccountRepository for SeaOrmAccountRepository {
    async fn create(&self, payload: AccountPayload) -> Result<AccountModel, ServiceError> {
        let started = Instant::now();
        let result = payload
            .into_active_model()
            .insert(self.get_db())
            .await
            .map_err(ServiceError::from);
        record("create", started, &result);
        result
    }

    async fn get(&self, id: i32) -> Result<AccountModel, ServiceError> {
        let started = Instant::now();
        let result = match Account::find_by_id(id).one(self.get_db()).await {
            Ok(Some(account)) => Ok(account),
            Ok(None) => Err(not_found(id)),
            Err(e) => Err(ServiceError::from(e)),
        };
        record("get", started, &result);

        tracing::debug!(account_id = id, found = result.is_ok(), "account lookup");
        result
    }

    async fn list(&self) -> Result<Vec<AccountModel>, ServiceError> {
        let started = Instant::now();
        let result = Account::find()
            .order_by_asc(Column::Id)
            .all(self.get_db())
            .await
            .map_err(ServiceError::from);
        record("list", started, &result);

        if let Ok(accounts) = &result {
            tracing::debug!(count = accounts.len(), "accounts listed");
        }
        result
    }

    async fn update(
        &self,
        id: i32,
        payload: AccountPayload,
    ) -> Result<AccountModel, ServiceError> {
        let started = Instant::now();
        let result = self.update_in_transaction(id, payload).await;
        record("update", started, &result);

        tracing::debug!(account_id = id, updated = result.is_ok(), "account update");
        result
    }

    async fn delete(&self, id: i32) -> Result<(), ServiceError> {
        let started = Instant::now();
        let result = match Account::delete_by_id(id).exec(self.get_db()).await {
            Ok(res) if res.rows_affected == 0 => Err(not_found(id)),
            Ok(_) => Ok(()),
            Err(e) => Err(ServiceError::from(e)),
        };
        record("delete", started, &result);

        tracing::debug!(account_id = id, deleted = result.is_ok(), "account delete");
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::migrator::Migrator;
    use sea_orm::Database;
    use sea_orm_migration::MigratorTrait;
    use tempfile::TempDir;

    async fn repository() -> (SeaOrmAccountRepository, TempDir) {
        let dir = tempfile::tempdir().unwrap();
        let url = format!(
            "sqlite://{}?mode=rwc",
            dir.path().join("repo.db").display()
        );
        let db = Database::connect(&url).await.unwrap();
        Migrator::up(&db, None).await.unwrap();
        (SeaOrmAccountRepository::new(Arc::new(db)), dir)
    }

    fn payload(name: &str) -> AccountPayload {
        AccountPayload {
            name: name.to_string(),
            email: format!("{}@example.com", name.to_lowercase()),
            address: "1 Main St".to_string(),
            phone_number: "555-1234".to_string(),
            date_joined: None,
        }
    }

    #[tokio::test]
    async fn create_assigns_id_and_get_reads_it_back() {
        let (repo, _dir) = repository().await;

        let created = repo.create(payload("Jane")).await.unwrap();
        assert!(created.id > 0);
        assert_eq!(created.date_joined, chrono::Utc::now().date_naive());

        let fetched = repo.get(created.id).await.unwrap();
        assert_eq!(fetched, created);
    }

    #[tokio::test]
    async fn list_returns_accounts_in_id_order() {
        let (repo, _dir) = repository().await;
        assert!(repo.list().await.unwrap().is_empty());

        let first = repo.create(payload("Ann")).await.unwrap();
        let second = repo.create(payload("Bob")).await.unwrap();

        let ids: Vec<i32> = repo.list().await.unwrap().iter().map(|a| a.id).collect();
        assert_eq!(ids, vec![first.id, second.id]);
    }

    #[tokio::test]
    async fn update_replaces_fields_and_reports_missing_ids() {
        let (repo, _dir) = repository().await;
        let created = repo.create(payload("Jane")).await.unwrap();

        let mut changed = payload("Jane");
        changed.phone_number = "555-9999".to_string();
        let updated = repo.update(created.id, changed).await.unwrap();
        assert_eq!(updated.id, created.id);
        assert_eq!(updated.phone_number, "555-9999");

        let missing = repo.update(created.id + 100, payload("Ghost")).await;
        assert!(matches!(missing, Err(ServiceError::NotFound(_))));
    }

    #[tokio::test]
    async fn delete_removes_row_then_reports_not_found() {
        let (repo, _dir) = repository().await;
        let created = repo.create(payload("Jane")).await.unwrap();

        repo.delete(created.id).await.unwrap();
        assert!(matches!(
            repo.get(created.id).await,
            Err(ServiceError::NotFound(_))
        ));
        assert!(matches!(
            repo.delete(created.id).await,
            Err(ServiceError::NotFound(_))
        ));
    }
}
