//! SQL for the Skyline SQLite store.

/// Run on every new connection.
pub const CONNECTION_PRAGMAS: &str = "
PRAGMA journal_mode = WAL;
PRAGMA foreign_keys = ON;
";

/// Table DDL; idempotent thanks to `CREATE TABLE IF NOT EXISTS`.
pub const SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS iata_codes (
    code     TEXT PRIMARY KEY CHECK (length(code) <= 4),
    city     TEXT NOT NULL,
    country  TEXT
);

-- Surrogate ids are assigned by the store; INTEGER PRIMARY KEY aliases rowid.
CREATE TABLE IF NOT EXISTS flights (
    id              INTEGER PRIMARY KEY,
    iata_departure  TEXT NOT NULL REFERENCES iata_codes(code),
    iata_arrival    TEXT NOT NULL REFERENCES iata_codes(code),
    price           INTEGER NOT NULL,
    distance        INTEGER NOT NULL
);

CREATE TABLE IF NOT EXISTS passengers (
    id          INTEGER PRIMARY KEY,
    first_name  TEXT NOT NULL,
    last_name   TEXT NOT NULL,
    phone       TEXT NOT NULL,
    flight_id   INTEGER NOT NULL REFERENCES flights(id)
);

CREATE INDEX IF NOT EXISTS flights_departure_idx ON flights(iata_departure);
";

/// `PRAGMA user_version` once every seeding phase has committed.
pub const READY_VERSION: i64 = 1;
