use std::str::FromStr;

use chrono::{DateTime, NaiveDate, Utc};
use futures::future::{BoxFuture, FutureExt};
use sqlx::{MySql, MySqlPool, QueryBuilder, Transaction};

use super::{EmployeeDirectory, LeaveStore, SalaryStore, StoreError};
use crate::model::{
    employee::Employee,
    employee_stats::{EmployeeStatistics, StatsDelta},
    leave_request::{LeaveQuery, LeaveRequest, LeaveStatus, LeaveTransition},
    role::Role,
    salary_request::{SalaryApproval, SalaryRequest, SalaryRequestStatus},
};

#[derive(sqlx::FromRow)]
struct LeaveRow {
    id: String,
    email: String,
    from_date: NaiveDate,
    to_date: NaiveDate,
    reason: String,
    one_day: bool,
    status: String,
    decline_reason: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<LeaveRow> for LeaveRequest {
    type Error = StoreError;

    fn try_from(row: LeaveRow) -> Result<Self, Self::Error> {
        let status = LeaveStatus::from_str(&row.status)
            .map_err(|_| StoreError::Corrupt(format!("leave {} has status {:?}", row.id, row.status)))?;
        Ok(LeaveRequest {
            id: row.id,
            email: row.email,
            from_date: row.from_date,
            to_date: row.to_date,
            reason: row.reason,
            one_day: row.one_day,
            status,
            decline_reason: row.decline_reason,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

#[derive(sqlx::FromRow)]
struct EmployeeRow {
    id: String,
    name: String,
    email: String,
    role_id: u8,
    position: String,
    department: String,
    phone: String,
    password_hash: String,
    created_at: DateTime<Utc>,
}

impl TryFrom<EmployeeRow> for Employee {
    type Error = StoreError;

    fn try_from(row: EmployeeRow) -> Result<Self, Self::Error> {
        let role = Role::from_id(row.role_id)
            .ok_or_else(|| StoreError::Corrupt(format!("employee {} has role {}", row.id, row.role_id)))?;
        Ok(Employee {
            id: row.id,
            name: row.name,
            email: row.email,
            role,
            position: row.position,
            department: row.department,
            phone: row.phone,
            password_hash: row.password_hash,
            created_at: row.created_at,
        })
    }
}

#[derive(sqlx::FromRow)]
struct SalaryRequestRow {
    id: String,
    employee_email: String,
    status: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<SalaryRequestRow> for SalaryRequest {
    type Error = StoreError;

    fn try_from(row: SalaryRequestRow) -> Result<Self, Self::Error> {
        let status = SalaryRequestStatus::from_str(&row.status).map_err(|_| {
            StoreError::Corrupt(format!("salary request {} has status {:?}", row.id, row.status))
        })?;
        Ok(SalaryRequest {
            id: row.id,
            employee_email: row.employee_email,
            status,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

const SALARY_REQUEST_COLUMNS: &str = r#"
    SELECT id, employee_email, status, created_at, updated_at
    FROM salary_requests
"#;

const LEAVE_COLUMNS: &str = r#"
    SELECT id, email, from_date, to_date, reason, one_day, status,
           decline_reason, created_at, updated_at
    FROM leave_requests
"#;

const STATS_COLUMNS: &str = r#"
    SELECT email, display_name, approved_count, declined_count, pending_count, updated_at
    FROM employee_stats
"#;

/// MySQL-backed store. Leave writes and their statistics upsert share one
/// transaction.
#[derive(Clone)]
pub struct MySqlStore {
    pool: MySqlPool,
}

impl MySqlStore {
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }

    async fn upsert_stats(
        tx: &mut Transaction<'_, MySql>,
        email: &str,
        display_name: &str,
        delta: StatsDelta,
        at: DateTime<Utc>,
    ) -> Result<(), sqlx::Error> {
        sqlx::query(
            r#"
            INSERT INTO employee_stats
                (email, display_name, approved_count, declined_count, pending_count, updated_at)
            VALUES (?, ?, GREATEST(0, ?), GREATEST(0, ?), GREATEST(0, ?), ?)
            ON DUPLICATE KEY UPDATE
                display_name   = VALUES(display_name),
                approved_count = GREATEST(0, approved_count + ?),
                declined_count = GREATEST(0, declined_count + ?),
                pending_count  = GREATEST(0, pending_count + ?),
                updated_at     = VALUES(updated_at)
            "#,
        )
        .bind(email)
        .bind(display_name)
        .bind(delta.approved)
        .bind(delta.declined)
        .bind(delta.pending)
        .bind(at)
        .bind(delta.approved)
        .bind(delta.declined)
        .bind(delta.pending)
        .execute(&mut **tx)
        .await?;
        Ok(())
    }
}

impl LeaveStore for MySqlStore {
    fn insert_leave<'a>(
        &'a self,
        leave: &'a LeaveRequest,
        display_name: &'a str,
    ) -> BoxFuture<'a, Result<(), StoreError>> {
        async move {
            let mut tx = self.pool.begin().await?;

            sqlx::query(
                r#"
                INSERT INTO leave_requests
                    (id, email, from_date, to_date, reason, one_day, status,
                     decline_reason, created_at, updated_at)
                VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
                "#,
            )
            .bind(&leave.id)
            .bind(&leave.email)
            .bind(leave.from_date)
            .bind(leave.to_date)
            .bind(&leave.reason)
            .bind(leave.one_day)
            .bind(leave.status.as_str())
            .bind(&leave.decline_reason)
            .bind(leave.created_at)
            .bind(leave.updated_at)
            .execute(&mut *tx)
            .await?;

            Self::upsert_stats(
                &mut tx,
                &leave.email,
                display_name,
                StatsDelta::created(leave.status),
                leave.created_at,
            )
            .await?;

            tx.commit().await?;
            Ok(())
        }
        .boxed()
    }

    fn find_leave<'a>(
        &'a self,
        id: &'a str,
    ) -> BoxFuture<'a, Result<Option<LeaveRequest>, StoreError>> {
        async move {
            let sql = format!("{LEAVE_COLUMNS} WHERE id = ?");
            let row = sqlx::query_as::<_, LeaveRow>(&sql)
                .bind(id)
                .fetch_optional(&self.pool)
                .await?;
            row.map(LeaveRequest::try_from).transpose()
        }
        .boxed()
    }

    fn transition_leave<'a>(
        &'a self,
        change: &'a LeaveTransition,
    ) -> BoxFuture<'a, Result<bool, StoreError>> {
        async move {
            let mut tx = self.pool.begin().await?;

            let result = sqlx::query(
                r#"
                UPDATE leave_requests
                SET status = ?, decline_reason = ?, updated_at = ?
                WHERE id = ?
                AND status = ?
                "#,
            )
            .bind(change.to.as_str())
            .bind(&change.decline_reason)
            .bind(change.at)
            .bind(&change.id)
            .bind(change.from.as_str())
            .execute(&mut *tx)
            .await?;

            if result.rows_affected() == 0 {
                tx.rollback().await?;
                return Ok(false);
            }

            Self::upsert_stats(
                &mut tx,
                &change.email,
                &change.display_name,
                StatsDelta::transition(change.from, change.to),
                change.at,
            )
            .await?;

            tx.commit().await?;
            Ok(true)
        }
        .boxed()
    }

    fn list_leaves<'a>(
        &'a self,
        query: &'a LeaveQuery,
    ) -> BoxFuture<'a, Result<Vec<LeaveRequest>, StoreError>> {
        async move {
            let mut builder = QueryBuilder::<MySql>::new(LEAVE_COLUMNS);
            builder.push(" WHERE 1=1");
            if let Some(email) = &query.email {
                builder.push(" AND email = ").push_bind(email);
            }
            if let Some(status) = query.status {
                builder.push(" AND status = ").push_bind(status.as_str());
            }
            builder.push(" ORDER BY created_at DESC");

            let rows = builder
                .build_query_as::<LeaveRow>()
                .fetch_all(&self.pool)
                .await?;
            rows.into_iter().map(LeaveRequest::try_from).collect()
        }
        .boxed()
    }

    fn list_statistics(&self) -> BoxFuture<'_, Result<Vec<EmployeeStatistics>, StoreError>> {
        async move {
            let sql = format!("{STATS_COLUMNS} ORDER BY updated_at DESC, email");
            let stats = sqlx::query_as::<_, EmployeeStatistics>(&sql)
                .fetch_all(&self.pool)
                .await?;
            Ok(stats)
        }
        .boxed()
    }

    fn find_statistics<'a>(
        &'a self,
        email: &'a str,
    ) -> BoxFuture<'a, Result<Option<EmployeeStatistics>, StoreError>> {
        async move {
            let sql = format!("{STATS_COLUMNS} WHERE email = ?");
            let stats = sqlx::query_as::<_, EmployeeStatistics>(&sql)
                .bind(email)
                .fetch_optional(&self.pool)
                .await?;
            Ok(stats)
        }
        .boxed()
    }
}

impl EmployeeDirectory for MySqlStore {
    fn find_by_email<'a>(
        &'a self,
        email: &'a str,
    ) -> BoxFuture<'a, Result<Option<Employee>, StoreError>> {
        async move {
            let row = sqlx::query_as::<_, EmployeeRow>(
                r#"
                SELECT id, name, email, role_id, position, department, phone,
                       password_hash, created_at
                FROM employees
                WHERE email = ?
                "#,
            )
            .bind(email)
            .fetch_optional(&self.pool)
            .await?;
            row.map(Employee::try_from).transpose()
        }
        .boxed()
    }

    fn insert_employee<'a>(&'a self, employee: &'a Employee) -> BoxFuture<'a, Result<(), StoreError>> {
        async move {
            sqlx::query(
                r#"
                INSERT INTO employees
                    (id, name, email, role_id, position, department, phone, password_hash, created_at)
                VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
                "#,
            )
            .bind(&employee.id)
            .bind(&employee.name)
            .bind(&employee.email)
            .bind(employee.role.id())
            .bind(&employee.position)
            .bind(&employee.department)
            .bind(&employee.phone)
            .bind(&employee.password_hash)
            .bind(employee.created_at)
            .execute(&self.pool)
            .await?;
            Ok(())
        }
        .boxed()
    }
}

impl SalaryStore for MySqlStore {
    fn insert_salary_request<'a>(
        &'a self,
        request: &'a SalaryRequest,
    ) -> BoxFuture<'a, Result<(), StoreError>> {
        async move {
            // uq_salary_requests_pending turns a second pending row into 23000
            sqlx::query(
                r#"
                INSERT INTO salary_requests (id, employee_email, status, created_at, updated_at)
                VALUES (?, ?, ?, ?, ?)
                "#,
            )
            .bind(&request.id)
            .bind(&request.employee_email)
            .bind(request.status.as_str())
            .bind(request.created_at)
            .bind(request.updated_at)
            .execute(&self.pool)
            .await?;
            Ok(())
        }
        .boxed()
    }

    fn find_pending_salary_request<'a>(
        &'a self,
        email: &'a str,
    ) -> BoxFuture<'a, Result<Option<SalaryRequest>, StoreError>> {
        async move {
            let sql = format!("{SALARY_REQUEST_COLUMNS} WHERE employee_email = ? AND status = ?");
            let row = sqlx::query_as::<_, SalaryRequestRow>(&sql)
                .bind(email)
                .bind(SalaryRequestStatus::Pending.as_str())
                .fetch_optional(&self.pool)
                .await?;
            row.map(SalaryRequest::try_from).transpose()
        }
        .boxed()
    }

    fn list_salary_requests(
        &self,
        status: Option<SalaryRequestStatus>,
    ) -> BoxFuture<'_, Result<Vec<SalaryRequest>, StoreError>> {
        async move {
            let mut builder = QueryBuilder::<MySql>::new(SALARY_REQUEST_COLUMNS);
            if let Some(status) = status {
                builder.push(" WHERE status = ").push_bind(status.as_str());
            }
            builder.push(" ORDER BY created_at DESC");

            let rows = builder
                .build_query_as::<SalaryRequestRow>()
                .fetch_all(&self.pool)
                .await?;
            rows.into_iter().map(SalaryRequest::try_from).collect()
        }
        .boxed()
    }

    fn approve_salary_request<'a>(
        &'a self,
        approval: &'a SalaryApproval,
    ) -> BoxFuture<'a, Result<Option<SalaryRequest>, StoreError>> {
        async move {
            let mut tx = self.pool.begin().await?;

            let sql = format!("{SALARY_REQUEST_COLUMNS} WHERE id = ? FOR UPDATE");
            let Some(row) = sqlx::query_as::<_, SalaryRequestRow>(&sql)
                .bind(&approval.id)
                .fetch_optional(&mut *tx)
                .await?
            else {
                tx.rollback().await?;
                return Ok(None);
            };
            let mut request = SalaryRequest::try_from(row)?;

            sqlx::query("UPDATE salary_requests SET status = ?, updated_at = ? WHERE id = ?")
                .bind(SalaryRequestStatus::Approved.as_str())
                .bind(approval.at)
                .bind(&approval.id)
                .execute(&mut *tx)
                .await?;
            request.status = SalaryRequestStatus::Approved;
            request.updated_at = approval.at;

            if let Some(amount) = approval.base_salary {
                sqlx::query(
                    r#"
                    INSERT INTO employee_salaries (email, base_salary, updated_at)
                    VALUES (?, ?, ?)
                    ON DUPLICATE KEY UPDATE
                        base_salary = VALUES(base_salary),
                        updated_at  = VALUES(updated_at)
                    "#,
                )
                .bind(&request.employee_email)
                .bind(amount)
                .bind(approval.at)
                .execute(&mut *tx)
                .await?;
            }

            tx.commit().await?;
            Ok(Some(request))
        }
        .boxed()
    }

    fn salary_for<'a>(&'a self, email: &'a str) -> BoxFuture<'a, Result<Option<f64>, StoreError>> {
        async move {
            let salary = sqlx::query_scalar::<_, f64>(
                "SELECT base_salary FROM employee_salaries WHERE email = ?",
            )
            .bind(email)
            .fetch_optional(&self.pool)
            .await?;
            Ok(salary)
        }
        .boxed()
    }
}

#[cfg(test)]
mod tests {
    //! Runs against a live, migrated MySQL database:
    //! `DATABASE_URL=mysql://... cargo test -- --ignored`

    use super::*;
    use crate::db::init_db;
    use crate::model::employee::NOT_AVAILABLE;
    use chrono::{Duration, SubsecRound};
    use uuid::Uuid;

    async fn live_store() -> Option<MySqlStore> {
        dotenvy::dotenv().ok();
        let url = std::env::var("DATABASE_URL").ok()?;
        Some(MySqlStore::new(init_db(&url).await.unwrap()))
    }

    fn unique_email() -> String {
        format!("{}@roundtrip.test", Uuid::new_v4().to_simple())
    }

    fn transition(leave: &LeaveRequest, from: LeaveStatus, to: LeaveStatus, reason: &str) -> LeaveTransition {
        LeaveTransition {
            id: leave.id.clone(),
            email: leave.email.clone(),
            display_name: "Round Trip".into(),
            from,
            to,
            decline_reason: reason.into(),
            at: Utc::now().trunc_subsecs(6),
        }
    }

    #[actix_web::test]
    #[ignore = "needs DATABASE_URL pointing at a disposable MySQL database"]
    async fn leave_create_approve_decline_round_trip() {
        let Some(store) = live_store().await else {
            return;
        };
        let email = unique_email();
        let now = Utc::now().trunc_subsecs(6);

        store
            .insert_employee(&Employee {
                id: Uuid::new_v4().to_string(),
                name: "Round Trip".into(),
                email: email.clone(),
                role: Role::Employee,
                position: NOT_AVAILABLE.into(),
                department: NOT_AVAILABLE.into(),
                phone: NOT_AVAILABLE.into(),
                password_hash: "x".into(),
                created_at: now,
            })
            .await
            .unwrap();
        let employee = store.find_by_email(&email).await.unwrap().unwrap();
        assert_eq!(employee.phone, NOT_AVAILABLE);

        let leave = LeaveRequest {
            id: Uuid::new_v4().to_string(),
            email: email.clone(),
            from_date: now.date_naive(),
            to_date: now.date_naive() + Duration::days(2),
            reason: "family event".into(),
            one_day: false,
            status: LeaveStatus::Pending,
            decline_reason: String::new(),
            created_at: now,
            updated_at: now,
        };
        store.insert_leave(&leave, "Round Trip").await.unwrap();
        let stats = store.find_statistics(&email).await.unwrap().unwrap();
        assert_eq!((stats.approved_count, stats.declined_count, stats.pending_count), (0, 0, 1));

        let approve = transition(&leave, LeaveStatus::Pending, LeaveStatus::Approved, "");
        assert!(store.transition_leave(&approve).await.unwrap());
        // the row no longer holds Pending, so the guarded UPDATE matches nothing
        assert!(!store.transition_leave(&approve).await.unwrap());

        let decline = transition(&leave, LeaveStatus::Approved, LeaveStatus::Declined, "Release week");
        assert!(store.transition_leave(&decline).await.unwrap());

        let stored = store.find_leave(&leave.id).await.unwrap().unwrap();
        assert_eq!(stored.status, LeaveStatus::Declined);
        assert_eq!(stored.decline_reason, "Release week");

        let stats = store.find_statistics(&email).await.unwrap().unwrap();
        assert_eq!((stats.approved_count, stats.declined_count, stats.pending_count), (0, 1, 0));

        // counters never drop below zero
        let mut tx = store.pool.begin().await.unwrap();
        let drain = StatsDelta {
            approved: -3,
            declined: -1,
            pending: -2,
        };
        MySqlStore::upsert_stats(&mut tx, &email, "Round Trip", drain, Utc::now()).await.unwrap();
        tx.commit().await.unwrap();

        let stats = store.find_statistics(&email).await.unwrap().unwrap();
        assert_eq!((stats.approved_count, stats.declined_count, stats.pending_count), (0, 0, 0));
    }

    #[actix_web::test]
    #[ignore = "needs DATABASE_URL pointing at a disposable MySQL database"]
    async fn one_pending_salary_request_per_email() {
        let Some(store) = live_store().await else {
            return;
        };
        let email = unique_email();
        let at = Utc::now().trunc_subsecs(6);

        let first = SalaryRequest::pending(&email, at);
        store.insert_salary_request(&first).await.unwrap();
        let err = store
            .insert_salary_request(&SalaryRequest::pending(&email, at))
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::Duplicate));

        let approval = SalaryApproval {
            id: first.id.clone(),
            base_salary: Some(48_000.0),
            at,
        };
        let approved = store.approve_salary_request(&approval).await.unwrap().unwrap();
        assert_eq!(approved.status, SalaryRequestStatus::Approved);
        assert_eq!(store.salary_for(&email).await.unwrap(), Some(48_000.0));
        assert!(store.find_pending_salary_request(&email).await.unwrap().is_none());

        // approved rows drop out of the pending unique key
        store
            .insert_salary_request(&SalaryRequest::pending(&email, at))
            .await
            .unwrap();
    }
}
