use console::style;
use forgecache::migration::Migrator;
use sea_orm_migration::MigratorTrait;

use crate::MigrateAction;
use crate::config::Config;

/// Handle the migrate command.
pub(crate) async fn handle(
    action: MigrateAction,
    config: &Config,
) -> Result<(), Box<dyn std::error::Error>> {
    let url = config.database_url()?;
    let db = forgecache::connect(&url).await?;

    match action {
        MigrateAction::Up => {
            Migrator::up(&db, None).await?;
            println!("{} migrations applied", style("✓").green());
        }
        MigrateAction::Down => {
            Migrator::down(&db, Some(1)).await?;
            println!("{} rolled back one migration", style("✓").green());
        }
        MigrateAction::Status => {
            Migrator::status(&db).await?;
        }
        MigrateAction::Fresh => {
            Migrator::fresh(&db).await?;
            println!("{} database reset and migrations reapplied", style("✓").green());
        }
    }

    Ok(())
}
