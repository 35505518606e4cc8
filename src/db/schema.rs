use rusqlite::Connection;

pub fn migrate(conn: &Connection) -> Result<(), rusqlite::Error> {
    conn.execute_batch(
        "
        CREATE TABLE IF NOT EXISTS attack_attempts (
            id                  INTEGER PRIMARY KEY AUTOINCREMENT,
            scenario_type       TEXT NOT NULL,
            attacker_model      TEXT NOT NULL,
            attack_data         TEXT NOT NULL, -- JSON
            suspicion_score     INTEGER NOT NULL,
            decision            TEXT NOT NULL,
            success             INTEGER NOT NULL,
            attacker_reasoning  TEXT NOT NULL,
            defender_reasoning  TEXT NOT NULL,
            created_at          TEXT NOT NULL
        );

        CREATE INDEX IF NOT EXISTS idx_attempts_scenario ON attack_attempts(scenario_type);
        CREATE INDEX IF NOT EXISTS idx_attempts_created ON attack_attempts(created_at DESC);
        ",
    )?;
    Ok(())
}
