//! Schema migrations, applied in order by the CLI in `main.rs`.

pub use sea_orm_migration::prelude::*;

mod m20240101_000001_create_art_posts;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![Box::new(m20240101_000001_create_art_posts::Migration)]
    }
}
