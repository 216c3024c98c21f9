pub mod applications;
pub mod jobs;
pub mod migrations;
pub mod pool;
pub mod profiles;
pub mod store;
pub mod users;
pub mod util;

pub use jobs::fetch_open_jobs;
pub use migrations::{MigrationError, run_migrations};
pub use pool::{DbPoolError, PgPool, create_pool_from_url, create_pool_from_url_checked};
pub use store::PgStore;
