use parcel_utils::DayTime;
use serde::{Deserialize, Serialize};
use std::fmt;

pub type AddressId = usize;
pub type PackageId = usize;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Address {
    pub id: AddressId,
    pub name: String,
    pub street: String,
    pub city: String,
    pub state: String,
    pub zip: String,
}

impl Address {
    pub fn full_address(&self) -> String {
        format!("{}, {}, {} {}", self.street, self.city, self.state, self.zip)
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "A[{}]: {} - {}", self.id, self.full_address(), self.name)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Package {
    pub id: PackageId,
    pub address_id: AddressId,
    /// When the package arrives at the hub.
    pub earliest: DayTime,
    /// Delivery deadline.
    pub latest: DayTime,
    pub weight_kg: u32,
    #[serde(default)]
    pub notes: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub departure_time: Option<DayTime>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub delivery_time: Option<DayTime>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PackageStatus {
    /// Not yet arrived at the hub.
    InTransit,
    AtHub,
    EnRoute,
    Delivered,
}

impl fmt::Display for PackageStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            PackageStatus::InTransit => "In Transit",
            PackageStatus::AtHub => "At Hub",
            PackageStatus::EnRoute => "En Route",
            PackageStatus::Delivered => "Delivered",
        };
        write!(f, "{}", s)
    }
}

impl Package {
    /// Classifies the package against a clock time, from the three stamped
    /// timestamps. Departure and delivery are only present once the owning
    /// route has been solved.
    pub fn status_at(&self, now: DayTime) -> PackageStatus {
        if self.delivery_time.is_some_and(|t| t <= now) {
            PackageStatus::Delivered
        } else if self.departure_time.is_some_and(|t| t <= now) {
            PackageStatus::EnRoute
        } else if self.earliest <= now {
            PackageStatus::AtHub
        } else {
            PackageStatus::InTransit
        }
    }
}

impl fmt::Display for Package {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "P[{}]: A[{}] - {} to {} - {} kg",
            self.id, self.address_id, self.earliest, self.latest, self.weight_kg
        )?;
        if !self.notes.is_empty() {
            write!(f, " - {}", self.notes)?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Truck {
    pub id: String,
    pub hub_id: AddressId,
    pub speed_mph: f64,
    pub capacity: usize,
}
