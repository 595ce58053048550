// src/db/models/distribution.rs

//! Distribution model - a release target tied to one vendor family

use super::component::Component;
use super::{require_id, touch_last_seen};
use crate::error::Result;
use rusqlite::{Connection, OptionalExtension, Row, params};
use std::fmt;
use std::str::FromStr;

/// Vendor of a distribution
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Vendor {
    Debian,
    Ubuntu,
    Fedora,
    RedHat,
}

/// Which ingestion pipeline handles a vendor's packages
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VendorFamily {
    /// `.changes`/`.deb` uploads published with reprepro
    Debian,
    /// `.rpm` uploads published into a createrepo tree
    Rpm,
}

impl Vendor {
    /// Vendors whose distributions are served from the RPM tree
    pub const RPM: [Vendor; 2] = [Vendor::Fedora, Vendor::RedHat];

    pub fn as_str(&self) -> &str {
        match self {
            Vendor::Debian => "debian",
            Vendor::Ubuntu => "ubuntu",
            Vendor::Fedora => "fedora",
            Vendor::RedHat => "redhat",
        }
    }

    pub fn family(&self) -> VendorFamily {
        match self {
            Vendor::Debian | Vendor::Ubuntu => VendorFamily::Debian,
            Vendor::Fedora | Vendor::RedHat => VendorFamily::Rpm,
        }
    }
}

impl fmt::Display for Vendor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Vendor {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "debian" => Ok(Vendor::Debian),
            "ubuntu" => Ok(Vendor::Ubuntu),
            "fedora" => Ok(Vendor::Fedora),
            "redhat" => Ok(Vendor::RedHat),
            _ => Err(format!("Invalid vendor: {s}")),
        }
    }
}

/// A named release (e.g. `bookworm`, `el9`)
#[derive(Debug, Clone)]
pub struct Distribution {
    pub id: Option<i64>,
    pub name: String,
    pub vendor: Vendor,
    pub last_seen: Option<String>,
}

impl Distribution {
    /// Create a new Distribution
    pub fn new(name: String, vendor: Vendor) -> Self {
        Self {
            id: None,
            name,
            vendor,
            last_seen: None,
        }
    }

    /// Row id of a stored distribution
    pub fn id(&self) -> Result<i64> {
        require_id(self.id, "distribution", &self.name)
    }

    /// Insert this distribution into the database
    pub fn insert(&mut self, conn: &Connection) -> Result<i64> {
        conn.execute(
            "INSERT INTO distributions (name, vendor, last_seen) VALUES (?1, ?2, ?3)",
            params![&self.name, self.vendor.as_str(), &self.last_seen],
        )?;

        let id = conn.last_insert_rowid();
        self.id = Some(id);
        Ok(id)
    }

    /// Find a distribution by ID
    pub fn find_by_id(conn: &Connection, id: i64) -> Result<Option<Self>> {
        let mut stmt = conn.prepare(
            "SELECT id, name, vendor, last_seen FROM distributions WHERE id = ?1",
        )?;

        let dist = stmt.query_row([id], Self::from_row).optional()?;
        Ok(dist)
    }

    /// Find a distribution by name
    pub fn find_by_name(conn: &Connection, name: &str) -> Result<Option<Self>> {
        let mut stmt = conn.prepare(
            "SELECT id, name, vendor, last_seen FROM distributions WHERE name = ?1",
        )?;

        let dist = stmt.query_row([name], Self::from_row).optional()?;
        Ok(dist)
    }

    /// List all distributions
    pub fn list_all(conn: &Connection) -> Result<Vec<Self>> {
        let mut stmt =
            conn.prepare("SELECT id, name, vendor, last_seen FROM distributions ORDER BY name")?;

        let dists = stmt
            .query_map([], Self::from_row)?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(dists)
    }

    /// List distributions belonging to any of the given vendors
    pub fn list_by_vendors(conn: &Connection, vendors: &[Vendor]) -> Result<Vec<Self>> {
        let dists = Self::list_all(conn)?
            .into_iter()
            .filter(|d| vendors.contains(&d.vendor))
            .collect();
        Ok(dists)
    }

    /// Advance `last_seen` to now
    pub fn touch(&mut self, conn: &Connection) -> Result<()> {
        self.last_seen = Some(touch_last_seen(conn, "distributions", self.id()?)?);
        Ok(())
    }

    /// Attach a component to this distribution
    pub fn add_component(&self, conn: &Connection, component_id: i64) -> Result<()> {
        conn.execute(
            "INSERT OR IGNORE INTO distribution_components (distribution_id, component_id)
             VALUES (?1, ?2)",
            params![self.id()?, component_id],
        )?;
        Ok(())
    }

    /// All components of this distribution, ordered by name
    pub fn components(&self, conn: &Connection) -> Result<Vec<Component>> {
        Component::query(
            conn,
            "SELECT c.id, c.name, c.enabled, c.last_seen FROM components c
             JOIN distribution_components dc ON dc.component_id = c.id
             WHERE dc.distribution_id = ?1 ORDER BY c.name",
            params![self.id()?],
        )
    }

    /// Enabled components of this distribution, ordered by name
    pub fn enabled_components(&self, conn: &Connection) -> Result<Vec<Component>> {
        Ok(self
            .components(conn)?
            .into_iter()
            .filter(|c| c.enabled)
            .collect())
    }

    /// Convert a database row to a Distribution
    fn from_row(row: &Row) -> rusqlite::Result<Self> {
        let vendor_str: String = row.get(2)?;
        let vendor = vendor_str.parse::<Vendor>().map_err(|e| {
            rusqlite::Error::FromSqlConversionFailure(
                2,
                rusqlite::types::Type::Text,
                Box::new(std::io::Error::new(std::io::ErrorKind::InvalidData, e)),
            )
        })?;

        Ok(Self {
            id: Some(row.get(0)?),
            name: row.get(1)?,
            vendor,
            last_seen: row.get(3)?,
        })
    }
}
