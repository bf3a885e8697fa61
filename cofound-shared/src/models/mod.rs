/// Database models for Cofound
///
/// - `user`: founder and investor accounts
/// - `startup`: startup profiles and their list/detail projections
/// - `founder`: the `startup_founders` membership table
///
/// Every function takes the pool (or a connection) explicitly.
///
/// # Example
///
/// ```no_run
/// use cofound_shared::models::startup::Startup;
/// use sqlx::PgPool;
///
/// # async fn example(pool: PgPool) -> Result<(), sqlx::Error> {
/// for listing in Startup::list_with_founders(&pool).await? {
///     println!("{} ({} founders)", listing.startup.name, listing.founders.len());
/// }
/// # Ok(())
/// # }
/// ```

pub mod founder;
pub mod startup;
pub mod user;
