#[cfg(test)]
pub mod test_utils {
    use crate::auth::{AdminCredentials, Session, hash_password};
    use crate::config::AppConfig;
    use crate::database::apply_schema;
    use crate::directory::create_trainer;
    use crate::error::AppError;
    use crate::init_rocket;
    use crate::ledger::create_project;
    use crate::models::ProjectFields;
    use chrono::NaiveDateTime;
    use rocket::http::{ContentType, Status};
    use rocket::local::asynchronous::Client;
    use serde_json::json;
    use sqlx::sqlite::SqlitePoolOptions;
    use sqlx::{Pool, Sqlite};
    use std::collections::HashMap;
    use std::sync::Once;
    use std::time::Duration;

    static INIT: Once = Once::new();

    pub const ADMIN_USERNAME: &str = "admin";
    pub const ADMIN_PASSWORD: &str = "admin-password";
    pub const STANDARD_PASSWORD: &str = "password123";

    pub fn init_test_logging() {
        INIT.call_once(|| {
            let _ = tracing_subscriber::fmt()
                .with_env_filter("debug")
                .with_test_writer()
                .try_init();
        });
    }

    /// A single long-lived connection keeps the in-memory database alive for
    /// the whole test.
    pub async fn test_pool() -> Pool<Sqlite> {
        init_test_logging();

        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .idle_timeout(None::<Duration>)
            .max_lifetime(None::<Duration>)
            .connect("sqlite::memory:")
            .await
            .expect("Failed to create in-memory database");

        apply_schema(&pool).await.expect("Failed to apply schema");

        pool
    }

    pub fn project_fields(date: &str, name: &str, details: &str, remarks: &str) -> ProjectFields {
        ProjectFields {
            date: Some(date.to_string()),
            project_name: Some(name.to_string()),
            project_details: Some(details.to_string()),
            remarks: Some(remarks.to_string()),
        }
    }

    pub fn assert_timestamp_format(value: &str) {
        assert_eq!(value.len(), 19, "Unexpected timestamp {}", value);
        assert!(
            NaiveDateTime::parse_from_str(value, "%Y-%m-%d %H:%M:%S").is_ok(),
            "Timestamp {} is not YYYY-MM-DD HH:MM:SS",
            value
        );
    }

    #[derive(Default)]
    pub struct TestDbBuilder {
        trainers: Vec<TestTrainer>,
        projects: Vec<TestProject>,
    }

    pub struct TestTrainer {
        pub name: String,
        pub password: String,
    }

    pub struct TestProject {
        pub owner_name: String,
        pub fields: ProjectFields,
    }

    impl TestDbBuilder {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn trainer(self, name: &str) -> Self {
            self.trainer_with_password(name, STANDARD_PASSWORD)
        }

        pub fn trainer_with_password(mut self, name: &str, password: &str) -> Self {
            self.trainers.push(TestTrainer {
                name: name.to_string(),
                password: password.to_string(),
            });
            self
        }

        pub fn project(mut self, owner_name: &str, date: &str, name: &str) -> Self {
            self.projects.push(TestProject {
                owner_name: owner_name.to_string(),
                fields: project_fields(date, name, &format!("{} details", name), ""),
            });
            self
        }

        pub async fn build(self) -> Result<TestDb, AppError> {
            let pool = test_pool().await;

            let mut trainer_id_map: HashMap<String, String> = HashMap::new();
            let mut project_id_map: HashMap<String, String> = HashMap::new();

            for trainer in &self.trainers {
                let id = create_trainer(
                    &pool,
                    &Session::Administrator,
                    &trainer.name,
                    &trainer.password,
                )
                .await?;
                trainer_id_map.insert(trainer.name.clone(), id);
            }

            for project in &self.projects {
                let owner_id = trainer_id_map
                    .get(&project.owner_name)
                    .cloned()
                    .ok_or_else(|| AppError::NotFound(project.owner_name.clone()))?;

                let session = Session::trainer(owner_id, project.owner_name.clone());
                let id = create_project(&pool, &session, &project.fields).await?;

                if let Some(name) = &project.fields.project_name {
                    project_id_map.insert(name.clone(), id);
                }
            }

            Ok(TestDb {
                pool,
                trainer_id_map,
                project_id_map,
            })
        }
    }

    pub struct TestDb {
        pub pool: Pool<Sqlite>,
        pub trainer_id_map: HashMap<String, String>,
        pub project_id_map: HashMap<String, String>,
    }

    impl TestDb {
        pub fn trainer_id(&self, name: &str) -> String {
            self.trainer_id_map
                .get(name)
                .cloned()
                .unwrap_or_else(|| panic!("Trainer {} not in test db", name))
        }

        pub fn project_id(&self, name: &str) -> String {
            self.project_id_map
                .get(name)
                .cloned()
                .unwrap_or_else(|| panic!("Project {} not in test db", name))
        }

        pub fn trainer_session(&self, name: &str) -> Session {
            Session::trainer(self.trainer_id(name), name)
        }

        pub async fn project_count_for(&self, owner_id: &str) -> i64 {
            let (count,): (i64,) =
                sqlx::query_as("SELECT COUNT(*) FROM projects WHERE owner_id = ?")
                    .bind(owner_id)
                    .fetch_one(&self.pool)
                    .await
                    .expect("Failed to count projects");
            count
        }

        pub async fn session_count(&self) -> i64 {
            let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM sessions")
                .fetch_one(&self.pool)
                .await
                .expect("Failed to count sessions");
            count
        }
    }

    /// Two trainers; alice owns Alpha and Beta, bob owns Gamma.
    pub async fn create_standard_test_db() -> TestDb {
        TestDbBuilder::new()
            .trainer("alice")
            .trainer("bob")
            .project("alice", "2024-01-01", "Alpha")
            .project("alice", "2024-01-02", "Beta")
            .project("bob", "2024-02-01", "Gamma")
            .build()
            .await
            .expect("Failed to build test database")
    }

    pub async fn setup_test_client(test_db: TestDb) -> (Client, TestDb) {
        let admin = AdminCredentials::new(
            ADMIN_USERNAME,
            hash_password(ADMIN_PASSWORD).expect("Failed to hash admin password"),
        );

        let rocket = init_rocket(
            rocket::Config::figment(),
            test_db.pool.clone(),
            AppConfig::default(),
            admin,
        );

        let client = Client::tracked(rocket)
            .await
            .expect("Failed to build rocket client");

        (client, test_db)
    }

    pub async fn login_admin(client: &Client) -> Status {
        client
            .post("/api/admin/login")
            .header(ContentType::JSON)
            .body(
                json!({
                    "username": ADMIN_USERNAME,
                    "password": ADMIN_PASSWORD
                })
                .to_string(),
            )
            .dispatch()
            .await
            .status()
    }

    pub async fn login_trainer(client: &Client, name: &str, password: &str) -> Status {
        client
            .post("/api/user/login")
            .header(ContentType::JSON)
            .body(
                json!({
                    "trainer_name": name,
                    "password": password
                })
                .to_string(),
            )
            .dispatch()
            .await
            .status()
    }
}
