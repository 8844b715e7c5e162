use crate::dataset::{Dataset, RoutePlan};
use crate::model::PackageId;
use crate::stop::{group_stops, Stop};
use crate::tour::{build_tour, EndPolicy};
use anyhow::{anyhow, Result};
use log::warn;
use parcel_utils::DayTime;
use std::fmt;

/// A stop on a solved route.
#[derive(Debug, Clone)]
pub struct RouteStop {
    pub stop: Stop,
    pub distance_from_start: f64,
    pub arrival: DayTime,
}

/// A solved route: the ordered stops with arrival times, plus the deadline
/// misses discovered by the post-hoc scan. A late delivery is a reportable
/// outcome of the heuristic, not a failure.
#[derive(Debug, Clone)]
pub struct Route {
    pub id: String,
    pub truck_id: String,
    pub start_time: DayTime,
    pub end_time: DayTime,
    pub total_distance: f64,
    pub stops: Vec<RouteStop>,
    pub late_package_ids: Vec<PackageId>,
}

impl Route {
    /// Solves one route plan. Builds the tour, converts cumulative distance
    /// into arrival times at the truck's speed, stamps each package's
    /// departure and delivery time into the dataset, and scans for deadline
    /// misses.
    ///
    /// `start_override` carries a start time resolved from a `start_after`
    /// chain; otherwise the plan's own `start_time` applies. Either way the
    /// route cannot leave before its last package has arrived at the hub.
    pub fn solve(
        plan: &RoutePlan,
        start_override: Option<DayTime>,
        dataset: &mut Dataset,
    ) -> Result<Route> {
        let truck = dataset.truck(&plan.truck_id)?.clone();

        let mut package_ids = Vec::new();
        let mut earliest_start = dataset.day_start;
        for &package_id in &plan.package_ids {
            let package = dataset.package(package_id)?;
            if package.departure_time.is_some() {
                warn!(
                    "route {}: package {} is already on a route",
                    plan.id, package_id
                );
                continue;
            }
            earliest_start = earliest_start.max(package.earliest);
            package_ids.push(package_id);
        }

        let requested = start_override.or(plan.start_time);
        let start_time = match requested {
            None => earliest_start,
            Some(t) if t < earliest_start => {
                let adjusted = earliest_start + DayTime::from_minutes(1);
                warn!(
                    "route {}: start time {} is before the last package arrives at {}; starting at {}",
                    plan.id, t, earliest_start, adjusted
                );
                adjusted
            }
            Some(t) => t,
        };

        let start_address = plan.start_address_id.unwrap_or(dataset.hub_id);
        let end_policy = if plan.round_trip {
            EndPolicy::RoundTrip
        } else {
            match plan.end_address_id {
                Some(address) => EndPolicy::Fixed(address),
                None => EndPolicy::Free,
            }
        };

        let pending = group_stops(&package_ids, dataset)?;
        let tour = build_tour(
            start_address,
            end_policy,
            pending,
            dataset.day_start,
            dataset.day_end,
            &dataset.distances,
        )?;

        let mut stops = Vec::with_capacity(tour.stops.len());
        let mut late_package_ids = Vec::new();
        for tour_stop in tour.stops {
            let arrival =
                start_time + DayTime::from_hours(tour_stop.distance_from_start / truck.speed_mph);
            for &package_id in &tour_stop.stop.package_ids {
                let package = dataset
                    .packages
                    .get_mut(&package_id)
                    .ok_or_else(|| anyhow!("unknown package id {}", package_id))?;
                package.departure_time = Some(start_time);
                package.delivery_time = Some(arrival);
                if arrival > package.latest {
                    warn!(
                        "route {}: package {} delivered at {} past its {} deadline",
                        plan.id, package_id, arrival, package.latest
                    );
                    late_package_ids.push(package_id);
                }
            }
            stops.push(RouteStop {
                distance_from_start: tour_stop.distance_from_start,
                arrival,
                stop: tour_stop.stop,
            });
        }

        let end_time = stops.last().map_or(start_time, |s| s.arrival);

        Ok(Route {
            id: plan.id.clone(),
            truck_id: plan.truck_id.clone(),
            start_time,
            end_time,
            total_distance: tour.total_distance,
            stops,
            late_package_ids,
        })
    }
}

/// Solves every route plan of the dataset in definition order, resolving
/// `start_after` chains against already-solved routes. Each route owns its
/// own sequence; plans only share the read-only reference data.
pub fn solve_all(dataset: &mut Dataset) -> Result<Vec<Route>> {
    let plans = dataset.route_plans.clone();
    let mut routes: Vec<Route> = Vec::new();
    for plan in &plans {
        let start_override = match &plan.start_after {
            Some(prev_id) => {
                let prev = routes.iter().find(|r| &r.id == prev_id).ok_or_else(|| {
                    anyhow!(
                        "route {}: start_after references unsolved route {}",
                        plan.id,
                        prev_id
                    )
                })?;
                Some(prev.end_time + DayTime::from_minutes(1))
            }
            None => None,
        };
        routes.push(Route::solve(plan, start_override, dataset)?);
    }
    Ok(routes)
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "[{}] {}", self.id, self.truck_id)?;
        writeln!(
            f,
            "\tStart: {} - End: {} - {:.1} miles - {} late",
            self.start_time,
            self.end_time,
            self.total_distance,
            self.late_package_ids.len()
        )?;
        for route_stop in &self.stops {
            writeln!(
                f,
                "\tA[{}] {:.1}mi {} - packages {:?}",
                route_stop.stop.address_id,
                route_stop.distance_from_start,
                route_stop.arrival,
                route_stop.stop.package_ids
            )?;
        }
        Ok(())
    }
}
