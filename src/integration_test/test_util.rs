use crate::{SharedData, app_env, db, persistence};
use dotenv::dotenv;
use rand::{Rng, thread_rng};
use sqlx::{Connection, PgConnection, PgPool};
use std::env;
use std::future::Future;
use std::panic;
use std::sync::Arc;

/// A throwaway database which lives for a single test
struct TestDatabase {
    base_url: String,
    db_name: String,
}

impl TestDatabase {
    async fn create(base_url: String) -> Result<Self, sqlx::Error> {
        let db_name = {
            let mut rng = thread_rng();
            let db_id: u32 = rng.gen_range(10_000..99_999);
            format!("test_db_{db_id}")
        };

        let mut conn = PgConnection::connect(&base_url).await?;
        let result = sqlx::query(&format!("CREATE DATABASE {db_name}"))
            .execute(&mut conn)
            .await;
        conn.close().await?;
        result?;

        Ok(Self { base_url, db_name })
    }

    fn url(&self) -> String {
        format!("{}/{}", self.base_url, self.db_name)
    }

    async fn drop_db(self) {
        let conn = PgConnection::connect(&self.base_url).await;
        let mut conn = match conn {
            Ok(conn) => conn,
            Err(error) => {
                println!(
                    "Warning: could not connect to drop test database {}, \
                     you may need to delete it manually. Error: {error}",
                    self.db_name
                );
                return;
            }
        };

        let drop_statement = format!("DROP DATABASE IF EXISTS {} WITH (FORCE)", self.db_name);
        let result = sqlx::query(&drop_statement).execute(&mut conn).await;
        if let Err(error) = result {
            println!(
                "Warning: failed to drop test database {}, \
                 you may need to do it manually. Error: {error}",
                self.db_name
            );
        }
        let _ = conn.close().await;
    }
}

/// Creates a migrated temp database for a test and drops it once the test finishes.
/// The test runs on its own task, so the database is dropped even when it panics.
///
/// Expects that the TEST_DB_URL environment variable is populated
pub async fn prepare_db_and_test<F, R>(test_fn: F)
where
    R: Future<Output = ()> + Send + 'static,
    F: FnOnce(PgPool) -> R,
{
    if dotenv().is_err() {
        println!("Test is running without .env file.");
    }

    let test_db = TestDatabase::create(test_db_base_url())
        .await
        .expect("Failed to create the test database");

    let pool = db::connect_sqlx(&test_db.url())
        .await
        .expect("Could not connect to the test database");
    db::migrate(&pool)
        .await
        .expect("Could not migrate the test database");

    let outcome = tokio::spawn(test_fn(pool.clone())).await;

    pool.close().await;
    test_db.drop_db().await;

    if let Err(join_error) = outcome {
        if join_error.is_panic() {
            panic::resume_unwind(join_error.into_panic());
        }
        panic!("Test task did not run to completion: {join_error}");
    }
}

fn test_db_base_url() -> String {
    env::var(app_env::test::TEST_DB_URL).expect(
        "You must provide the TEST_DB_URL environment variable as the base postgres connection string",
    )
}

/// Shared application state backed by the given test database
pub fn shared_data(pool: PgPool) -> Arc<SharedData> {
    Arc::new(SharedData {
        ext_cxn: persistence::ExternalConnectivity::new(pool),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    #[tokio::test]
    #[cfg_attr(not(feature = "integration_test"), ignore)]
    async fn drops_database_when_test_panics() {
        let seen_db_name = Arc::new(Mutex::new(None::<String>));
        let recorded_name = Arc::clone(&seen_db_name);

        let outcome = tokio::spawn(prepare_db_and_test(move |db| async move {
            let db_name: String = sqlx::query_scalar("SELECT current_database()")
                .fetch_one(&db)
                .await
                .expect("should read the database name");
            *recorded_name.lock().expect("name mutex poisoned") = Some(db_name);

            panic!("failing on purpose");
        }))
        .await;
        assert!(outcome.is_err_and(|join_error| join_error.is_panic()));

        let db_name = seen_db_name
            .lock()
            .expect("name mutex poisoned")
            .clone()
            .expect("test should have seen its database");
        let mut conn = PgConnection::connect(&test_db_base_url())
            .await
            .expect("should connect to the base database");
        let remaining: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM pg_catalog.pg_database WHERE datname = $1")
                .bind(&db_name)
                .fetch_one(&mut conn)
                .await
                .expect("should query the database catalog");
        let _ = conn.close().await;

        assert_eq!(0, remaining);
    }
}
