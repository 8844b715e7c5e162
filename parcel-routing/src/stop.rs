use crate::dataset::Dataset;
use crate::model::{AddressId, PackageId};
use anyhow::Result;
use parcel_utils::{DayTime, OrderedHashMap};

/// One physical location visited once per route.
///
/// Groups every deliverable package at that location: the stop cannot be
/// serviced before all of them have arrived (`earliest` is the latest
/// arrival) and the binding deadline is the tightest one (`latest` is the
/// earliest deadline). Immutable after creation except for its position,
/// which is owned by the sequence it belongs to.
#[derive(Debug, Clone, PartialEq)]
pub struct Stop {
    pub address_id: AddressId,
    pub package_ids: Vec<PackageId>,
    pub earliest: DayTime,
    pub latest: DayTime,
}

impl Stop {
    /// A stop with nothing to deliver, marking a route's start or end
    /// location; its window spans the whole service day.
    pub fn passthrough(address_id: AddressId, day_start: DayTime, day_end: DayTime) -> Self {
        Self {
            address_id,
            package_ids: Vec::new(),
            earliest: day_start,
            latest: day_end,
        }
    }
}

/// Groups a route's packages into one [`Stop`] per address, in ascending
/// address order.
pub fn group_stops(package_ids: &[PackageId], dataset: &Dataset) -> Result<Vec<Stop>> {
    let mut by_address: OrderedHashMap<AddressId, Stop> = OrderedHashMap::new();
    for &package_id in package_ids {
        let package = dataset.package(package_id)?;
        match by_address.get_mut(&package.address_id) {
            Some(stop) => {
                stop.package_ids.push(package_id);
                stop.earliest = stop.earliest.max(package.earliest);
                stop.latest = stop.latest.min(package.latest);
            }
            None => {
                by_address.insert(
                    package.address_id,
                    Stop {
                        address_id: package.address_id,
                        package_ids: vec![package_id],
                        earliest: package.earliest,
                        latest: package.latest,
                    },
                );
            }
        }
    }
    Ok(by_address.values().cloned().collect())
}
