use chrono::{DateTime, SecondsFormat, Utc};
use parkside_ledger::{Booking, BookingLedger, User, Waitlist};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// Persistence contract the ledger checkpoints through.
///
/// Saves are best-effort: a failed save is reported to the caller, but
/// the in-memory state it attempted to capture is not rolled back.
pub trait BookingStore {
    fn load_bookings(&self) -> Result<Vec<Booking>, StoreError>;
    fn save_bookings(&self, ledger: &BookingLedger) -> Result<(), StoreError>;
    fn load_waitlist(&self) -> Result<Vec<User>, StoreError>;
    fn save_waitlist(&self, waitlist: &Waitlist) -> Result<(), StoreError>;
}

/// Line-oriented flat-file store.
///
/// Booking lines carry exactly eight comma-separated fields:
/// `bookingId,userName,vehicleNumber,contact,slotId,entryTime,exitTime,fee`
/// with RFC 3339 UTC timestamps. Waitlist lines carry three:
/// `userName,vehicleNumber,contact`. Lines that are short a field or fail
/// to parse are skipped, never fatal.
pub struct FileStore {
    bookings_path: PathBuf,
    waitlist_path: PathBuf,
}

impl FileStore {
    pub fn new(bookings_path: impl Into<PathBuf>, waitlist_path: impl Into<PathBuf>) -> Self {
        Self {
            bookings_path: bookings_path.into(),
            waitlist_path: waitlist_path.into(),
        }
    }
}

impl BookingStore for FileStore {
    fn load_bookings(&self) -> Result<Vec<Booking>, StoreError> {
        let Some(contents) = read_if_exists(&self.bookings_path)? else {
            return Ok(Vec::new());
        };

        let mut records = Vec::new();
        for line in contents.lines() {
            if line.trim().is_empty() {
                continue;
            }
            match parse_booking(line) {
                Some(booking) => records.push(booking),
                None => tracing::warn!(line, "skipping malformed booking record"),
            }
        }
        Ok(records)
    }

    fn save_bookings(&self, ledger: &BookingLedger) -> Result<(), StoreError> {
        let mut out = String::new();
        for booking in ledger.bookings() {
            out.push_str(&encode_booking(booking));
            out.push('\n');
        }
        write_file(&self.bookings_path, &out)
    }

    fn load_waitlist(&self) -> Result<Vec<User>, StoreError> {
        let Some(contents) = read_if_exists(&self.waitlist_path)? else {
            return Ok(Vec::new());
        };

        let mut users = Vec::new();
        for line in contents.lines() {
            if line.trim().is_empty() {
                continue;
            }
            match parse_user(line) {
                Some(user) => users.push(user),
                None => tracing::warn!(line, "skipping malformed waitlist record"),
            }
        }
        Ok(users)
    }

    fn save_waitlist(&self, waitlist: &Waitlist) -> Result<(), StoreError> {
        let mut out = String::new();
        for user in waitlist.iter() {
            out.push_str(&format!(
                "{},{},{}\n",
                user.name, user.vehicle_number, user.contact
            ));
        }
        write_file(&self.waitlist_path, &out)
    }
}

fn encode_booking(booking: &Booking) -> String {
    format!(
        "{},{},{},{},{},{},{},{}",
        booking.id,
        booking.user.name,
        booking.user.vehicle_number,
        booking.user.contact,
        booking.slot_id,
        booking.entry_time.to_rfc3339_opts(SecondsFormat::Secs, true),
        booking.exit_time.to_rfc3339_opts(SecondsFormat::Secs, true),
        booking.fee,
    )
}

fn parse_booking(line: &str) -> Option<Booking> {
    let parts: Vec<&str> = line.split(',').collect();
    if parts.len() < 8 {
        return None;
    }

    let id = parts[0].trim().parse().ok()?;
    let user = User::new(parts[1].trim(), parts[2].trim(), parts[3].trim());
    let slot_id = parts[4].trim().parse().ok()?;
    let entry_time = parse_timestamp(parts[5])?;
    let exit_time = parse_timestamp(parts[6])?;
    // Tolerate a fractional fee from older writers
    let fee = parts[7].trim().parse::<f64>().ok()?.round() as i64;

    Some(Booking::new(id, user, slot_id, entry_time, exit_time, fee))
}

fn parse_user(line: &str) -> Option<User> {
    let parts: Vec<&str> = line.split(',').collect();
    if parts.len() < 3 {
        return None;
    }
    Some(User::new(parts[0].trim(), parts[1].trim(), parts[2].trim()))
}

fn parse_timestamp(field: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(field.trim())
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
}

fn read_if_exists(path: &Path) -> Result<Option<String>, StoreError> {
    match fs::read_to_string(path) {
        Ok(contents) => Ok(Some(contents)),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
        Err(source) => Err(StoreError::Read {
            path: path.to_path_buf(),
            source,
        }),
    }
}

fn write_file(path: &Path, contents: &str) -> Result<(), StoreError> {
    fs::write(path, contents).map_err(|source| StoreError::Write {
        path: path.to_path_buf(),
        source,
    })
}

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("Failed to read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        source: io::Error,
    },

    #[error("Failed to write {}: {source}", path.display())]
    Write {
        path: PathBuf,
        source: io::Error,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};
    use parkside_catalog::{SlotRegistry, Tariff, VehicleType};
    use parkside_ledger::CreateOutcome;

    fn at(hour: u32, minute: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 14, hour, minute, 0).unwrap()
    }

    fn store_in(dir: &tempfile::TempDir) -> FileStore {
        FileStore::new(
            dir.path().join("bookings.txt"),
            dir.path().join("waitlist.txt"),
        )
    }

    #[test]
    fn test_missing_files_load_as_empty_state() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);

        assert!(store.load_bookings().unwrap().is_empty());
        assert!(store.load_waitlist().unwrap().is_empty());
    }

    #[test]
    fn test_round_trip_reproduces_ledger_and_counter() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);

        let mut ledger = BookingLedger::new(Tariff::default(), Duration::hours(2));
        let mut registry = SlotRegistry::default_layout();

        let outcome = ledger.create(
            &mut registry,
            User::new("Asha", "KA01AB1234", "900000001"),
            at(10, 0),
            at(13, 30),
            &VehicleType::Car,
        );
        assert!(matches!(outcome, CreateOutcome::Booked(_)));
        ledger.create(
            &mut registry,
            User::new("Ravi", "KA02CD5678", "900000002"),
            at(9, 0),
            at(10, 0),
            &VehicleType::Bike,
        );
        ledger.enqueue_waitlist(User::new("Meera", "KA03EF9012", "900000003"));

        store.save_bookings(&ledger).unwrap();
        store.save_waitlist(ledger.waitlist()).unwrap();

        let mut reloaded = BookingLedger::new(Tariff::default(), Duration::hours(2));
        let mut fresh_registry = SlotRegistry::default_layout();
        let count = reloaded.restore(store.load_bookings().unwrap(), &mut fresh_registry);
        reloaded.restore_waitlist(store.load_waitlist().unwrap());

        assert_eq!(count, 2);
        assert_eq!(reloaded.next_id(), ledger.next_id());
        assert_eq!(reloaded.waitlist().len(), 1);
        assert_eq!(reloaded.waitlist().peek().unwrap().name, "Meera");

        for (original, loaded) in ledger.bookings().zip(reloaded.bookings()) {
            assert_eq!(original.id, loaded.id);
            assert_eq!(original.slot_id, loaded.slot_id);
            assert_eq!(original.entry_time, loaded.entry_time);
            assert_eq!(original.exit_time, loaded.exit_time);
            assert_eq!(original.fee, loaded.fee);
            assert_eq!(original.user.vehicle_number, loaded.user.vehicle_number);
        }

        // Reloaded bookings re-occupy their slots
        assert!(!fresh_registry.find(101).unwrap().is_available());
        assert!(!fresh_registry.find(102).unwrap().is_available());
    }

    #[test]
    fn test_malformed_lines_are_skipped() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);

        fs::write(
            dir.path().join("bookings.txt"),
            "1,Asha,KA01AB1234,900000001,101,2026-03-14T10:00:00Z,2026-03-14T12:00:00Z,40\n\
             too,few,fields\n\
             x,Bad,KA02CD5678,900000002,101,2026-03-14T10:00:00Z,2026-03-14T12:00:00Z,40\n\
             2,Ravi,KA02CD5678,900000002,102,not-a-date,2026-03-14T12:00:00Z,40\n\
             \n\
             3,Meera,KA03EF9012,900000003,104,2026-03-14T09:00:00Z,2026-03-14T10:00:00Z,20.0\n",
        )
        .unwrap();

        let records = store.load_bookings().unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].id, 1);
        assert_eq!(records[1].id, 3);
        assert_eq!(records[1].fee, 20);
    }

    #[test]
    fn test_malformed_waitlist_lines_are_skipped() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);

        fs::write(
            dir.path().join("waitlist.txt"),
            "Asha,KA01AB1234,900000001\nRavi,KA02CD5678\n",
        )
        .unwrap();

        let users = store.load_waitlist().unwrap();
        assert_eq!(users.len(), 1);
        assert_eq!(users[0].name, "Asha");
    }
}
