use std::sync::Arc;
use std::time::Duration;

use futures::future::{BoxFuture, FutureExt};
use moka::future::Cache;

use crate::model::employee::Employee;
use crate::store::{EmployeeDirectory, StoreError};

/// Directory lookups keyed by email. Only hits are cached, so a newly
/// registered employee is visible on the next lookup.
pub struct CachedDirectory {
    inner: Arc<dyn EmployeeDirectory>,
    cache: Cache<String, Employee>,
}

impl CachedDirectory {
    pub fn new(inner: Arc<dyn EmployeeDirectory>, ttl: Duration) -> Self {
        Self {
            inner,
            cache: Cache::builder()
                .max_capacity(50_000) // tune based on memory
                .time_to_live(ttl)
                .build(),
        }
    }
}

impl EmployeeDirectory for CachedDirectory {
    fn find_by_email<'a>(
        &'a self,
        email: &'a str,
    ) -> BoxFuture<'a, Result<Option<Employee>, StoreError>> {
        async move {
            if let Some(hit) = self.cache.get(email).await {
                return Ok(Some(hit));
            }

            let found = self.inner.find_by_email(email).await?;
            if let Some(employee) = &found {
                self.cache.insert(email.to_string(), employee.clone()).await;
            }
            Ok(found)
        }
        .boxed()
    }

    fn insert_employee<'a>(&'a self, employee: &'a Employee) -> BoxFuture<'a, Result<(), StoreError>> {
        async move {
            self.inner.insert_employee(employee).await?;
            self.cache
                .insert(employee.email.clone(), employee.clone())
                .await;
            Ok(())
        }
        .boxed()
    }
}
