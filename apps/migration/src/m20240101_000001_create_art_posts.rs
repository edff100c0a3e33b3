use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(ArtPosts::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(ArtPosts::Id).uuid().not_null().primary_key())
                    .col(
                        ColumnDef::new(ArtPosts::PostDate)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(ColumnDef::new(ArtPosts::PosterName).string().not_null())
                    .col(ColumnDef::new(ArtPosts::ImageRef).string().not_null())
                    .col(ColumnDef::new(ArtPosts::Title).string().not_null())
                    .col(ColumnDef::new(ArtPosts::ArtType).string().not_null())
                    .col(ColumnDef::new(ArtPosts::Description).text().not_null())
                    .col(
                        ColumnDef::new(ArtPosts::Subjects)
                            .json_binary()
                            .not_null()
                            .default(Expr::cust("'[]'::jsonb")),
                    )
                    .col(
                        ColumnDef::new(ArtPosts::ReviewCount)
                            .big_integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(ArtPosts::LikeCount)
                            .big_integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(ArtPosts::Reviews)
                            .json_binary()
                            .not_null()
                            .default(Expr::cust("'[]'::jsonb")),
                    )
                    .col(
                        ColumnDef::new(ArtPosts::Version)
                            .big_integer()
                            .not_null()
                            .default(0),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_art_posts_post_date")
                    .table(ArtPosts::Table)
                    .col(ArtPosts::PostDate)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(ArtPosts::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum ArtPosts {
    Table,
    Id,
    PostDate,
    PosterName,
    ImageRef,
    Title,
    ArtType,
    Description,
    Subjects,
    ReviewCount,
    LikeCount,
    Reviews,
    Version,
}
