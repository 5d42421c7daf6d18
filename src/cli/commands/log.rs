use crate::cli::parser::Commands;
use crate::config::Config;
use crate::db::log::load_log;
use crate::db::pool::DbPool;
use crate::errors::AppResult;

pub fn handle(cmd: &Commands, cfg: &Config) -> AppResult<()> {
    if matches!(cmd, Commands::Log { print: true }) {
        let pool = DbPool::new(&cfg.database)?;
        let rows = load_log(&pool.conn)?;

        if rows.is_empty() {
            println!("Internal log is empty.");
            return Ok(());
        }

        for (date, operation, target, message) in rows {
            println!("{}  [{}] {}  {}", date, operation, target, message);
        }
    }

    Ok(())
}
