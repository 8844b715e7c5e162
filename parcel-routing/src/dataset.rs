use crate::matrix::DistanceMatrix;
use crate::model::{Address, AddressId, Package, PackageId, Truck};
use anyhow::{anyhow, Context, Result};
use parcel_utils::{DayTime, OrderedHashMap};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// A route definition row from the dataset.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoutePlan {
    pub id: String,
    pub truck_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_time: Option<DayTime>,
    /// Id of a route whose end time gates this route's start (plus one
    /// minute); takes precedence over `start_time`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_after: Option<String>,
    #[serde(default)]
    pub package_ids: Vec<PackageId>,
    /// Defaults to the hub.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_address_id: Option<AddressId>,
    #[serde(default = "default_round_trip")]
    pub round_trip: bool,
    /// Only meaningful when `round_trip` is false; `None` leaves the end
    /// free for the solver to choose.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_address_id: Option<AddressId>,
}

fn default_round_trip() -> bool {
    true
}

/// All reference data, constructed once at startup and passed by reference
/// to whatever needs it. During route construction everything here except
/// package time stamps is read-only.
pub struct Dataset {
    pub day_start: DayTime,
    pub day_end: DayTime,
    pub hub_id: AddressId,
    pub addresses: OrderedHashMap<AddressId, Address>,
    pub packages: OrderedHashMap<PackageId, Package>,
    pub trucks: OrderedHashMap<String, Truck>,
    pub route_plans: Vec<RoutePlan>,
    pub distances: DistanceMatrix,
}

#[derive(Deserialize)]
struct DatasetFile {
    #[serde(default = "default_day_start")]
    day_start: DayTime,
    #[serde(default = "default_day_end")]
    day_end: DayTime,
    #[serde(default)]
    hub_id: AddressId,
    addresses: Vec<Address>,
    distances: Vec<Vec<f64>>,
    packages: Vec<PackageRow>,
    trucks: Vec<Truck>,
    #[serde(default)]
    routes: Vec<RoutePlan>,
}

fn default_day_start() -> DayTime {
    DayTime::from_hms(8, 0, 0)
}

fn default_day_end() -> DayTime {
    DayTime::from_hms(20, 0, 0)
}

/// Raw package row; `earliest`/`latest` also accept the `"SOD"`/`"EOD"`
/// spellings, resolved against the dataset's service day.
#[derive(Deserialize)]
struct PackageRow {
    id: PackageId,
    address_id: AddressId,
    earliest: String,
    latest: String,
    weight_kg: u32,
    #[serde(default)]
    notes: String,
}

fn resolve_time(s: &str, day_start: DayTime, day_end: DayTime) -> Result<DayTime> {
    match s {
        "SOD" => Ok(day_start),
        "EOD" => Ok(day_end),
        other => other.parse(),
    }
}

impl Dataset {
    pub fn from_path(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)
            .with_context(|| format!("failed to read dataset {}", path.display()))?;
        Self::from_json(&text)
    }

    pub fn from_json(text: &str) -> Result<Self> {
        let file: DatasetFile = serde_json::from_str(text).context("malformed dataset")?;

        let num_addresses = file.addresses.len();
        if file.distances.len() != num_addresses {
            return Err(anyhow!(
                "{} distance rows for {} addresses",
                file.distances.len(),
                num_addresses
            ));
        }
        let distances = DistanceMatrix::from_rows(&file.distances)?;

        let mut addresses = OrderedHashMap::new();
        for address in file.addresses {
            if addresses.contains_key(&address.id) {
                return Err(anyhow!("duplicate address id {}", address.id));
            }
            if address.id >= num_addresses {
                return Err(anyhow!("address id {} out of range", address.id));
            }
            addresses.insert(address.id, address);
        }
        if !addresses.contains_key(&file.hub_id) {
            return Err(anyhow!("hub id {} is not an address", file.hub_id));
        }

        let mut packages = OrderedHashMap::new();
        for row in file.packages {
            if packages.contains_key(&row.id) {
                return Err(anyhow!("duplicate package id {}", row.id));
            }
            if !addresses.contains_key(&row.address_id) {
                return Err(anyhow!(
                    "package {} references unknown address {}",
                    row.id,
                    row.address_id
                ));
            }
            let package = Package {
                id: row.id,
                address_id: row.address_id,
                earliest: resolve_time(&row.earliest, file.day_start, file.day_end)
                    .with_context(|| format!("package {}", row.id))?,
                latest: resolve_time(&row.latest, file.day_start, file.day_end)
                    .with_context(|| format!("package {}", row.id))?,
                weight_kg: row.weight_kg,
                notes: row.notes,
                departure_time: None,
                delivery_time: None,
            };
            packages.insert(package.id, package);
        }

        let mut trucks = OrderedHashMap::new();
        for truck in file.trucks {
            if truck.speed_mph <= 0.0 {
                return Err(anyhow!("truck {} has non-positive speed", truck.id));
            }
            if !addresses.contains_key(&truck.hub_id) {
                return Err(anyhow!(
                    "truck {} references unknown hub {}",
                    truck.id,
                    truck.hub_id
                ));
            }
            if trucks.contains_key(truck.id.as_str()) {
                return Err(anyhow!("duplicate truck id {}", truck.id));
            }
            trucks.insert(truck.id.clone(), truck);
        }

        Ok(Dataset {
            day_start: file.day_start,
            day_end: file.day_end,
            hub_id: file.hub_id,
            addresses,
            packages,
            trucks,
            route_plans: file.routes,
            distances,
        })
    }

    pub fn address(&self, id: AddressId) -> Result<&Address> {
        self.addresses
            .get(&id)
            .ok_or_else(|| anyhow!("unknown address id {}", id))
    }

    pub fn package(&self, id: PackageId) -> Result<&Package> {
        self.packages
            .get(&id)
            .ok_or_else(|| anyhow!("unknown package id {}", id))
    }

    pub fn truck(&self, id: &str) -> Result<&Truck> {
        self.trucks
            .get(id)
            .ok_or_else(|| anyhow!("unknown truck id {}", id))
    }
}
