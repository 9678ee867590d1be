use sea_orm::{ConnectionTrait, Database, DatabaseConnection, DbErr, Statement};

pub async fn init_db(database_url: &str) -> Result<DatabaseConnection, DbErr> {
    let db = Database::connect(database_url).await?;

    run_migrations(&db).await?;

    Ok(db)
}

async fn run_migrations(db: &DatabaseConnection) -> Result<(), DbErr> {
    db.execute(Statement::from_string(
        db.get_database_backend(),
        r#"
        CREATE TABLE IF NOT EXISTS books (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            title TEXT NOT NULL,
            author TEXT NOT NULL,
            description TEXT NOT NULL DEFAULT '',
            cover_image TEXT NOT NULL DEFAULT '',
            publication_year TEXT NOT NULL DEFAULT '',
            genres TEXT NOT NULL DEFAULT '',
            price INTEGER NOT NULL DEFAULT 0
        )
        "#
        .to_owned(),
    ))
    .await?;

    // Databases created before prices were stored lack the column; ignore the
    // error when it already exists.
    let _ = db
        .execute(Statement::from_string(
            db.get_database_backend(),
            "ALTER TABLE books ADD COLUMN price INTEGER NOT NULL DEFAULT 0".to_owned(),
        ))
        .await;

    Ok(())
}
