use crate::matrix::DistanceMatrix;
use crate::model::AddressId;
use crate::stop::Stop;
use anyhow::{anyhow, Result};
use parcel_utils::{DayTime, Sequence};

/// Where a tour is allowed to end.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EndPolicy {
    /// End where it started.
    RoundTrip,
    /// End at a fixed address.
    Fixed(AddressId),
    /// The most urgent pending stop becomes the initial end; further stops
    /// may still be appended after it.
    Free,
}

/// A stop placed on a finished tour, with the cumulative distance from the
/// start of the tour to this position.
#[derive(Debug, Clone)]
pub struct TourStop {
    pub stop: Stop,
    pub distance_from_start: f64,
}

#[derive(Debug, Clone)]
pub struct Tour {
    /// Dense positions 0..n-1, start first, end last.
    pub stops: Vec<TourStop>,
    pub total_distance: f64,
}

/// Builds a tour with the cheapest-insertion heuristic.
///
/// Stops are processed in ascending deadline order. Each stop is inserted at
/// the adjacent pair (prev, next) minimizing the marginal cost
/// `d(prev, new) + d(new, next) - d(prev, next)`, scanning pairs backward
/// from the end of the sequence; ties keep the first (end-most) candidate.
/// With a free end, appending after the current last stop at cost
/// `d(last, new)` is also a candidate. The heuristic has no lookahead and no
/// feasibility guarantee: a stop whose deadline cannot be met is still
/// placed at minimum cost, and the miss surfaces later in the route report.
///
/// Deterministic: identical inputs always produce the identical tour.
pub fn build_tour(
    start_address: AddressId,
    end_policy: EndPolicy,
    mut pending: Vec<Stop>,
    day_start: DayTime,
    day_end: DayTime,
    distances: &DistanceMatrix,
) -> Result<Tour> {
    // Most urgent first; this order, not arrival order, drives insertion.
    pending.sort_by(|a, b| a.latest.cmp(&b.latest));

    let mut sequence: Sequence<Stop> = Sequence::new();

    let start_stop = match pending.iter().position(|s| s.address_id == start_address) {
        Some(i) => pending.remove(i),
        None => Stop::passthrough(start_address, day_start, day_end),
    };
    sequence.set_start(start_stop);

    let can_insert_end = match end_policy {
        EndPolicy::RoundTrip => {
            sequence.set_end(Stop::passthrough(start_address, day_start, day_end));
            false
        }
        EndPolicy::Fixed(end_address) => {
            let end_stop = match pending.iter().position(|s| s.address_id == end_address) {
                Some(i) => pending.remove(i),
                None => Stop::passthrough(end_address, day_start, day_end),
            };
            sequence.set_end(end_stop);
            false
        }
        EndPolicy::Free => {
            if pending.is_empty() {
                return Err(anyhow!("a free-end tour needs at least one pending stop"));
            }
            sequence.set_end(pending.remove(0));
            true
        }
    };

    while !pending.is_empty() {
        let stop = pending.remove(0);
        let insert_address = stop.address_id;

        let tail = sequence.last().unwrap();
        let mut insert_after = tail;
        let mut append = can_insert_end;
        let mut min_cost = if can_insert_end {
            distances.get(sequence.value(tail).address_id, insert_address)
        } else {
            f64::MAX
        };

        let mut next = tail;
        while let Some(prev) = sequence.prev(next) {
            let prev_address = sequence.value(prev).address_id;
            let next_address = sequence.value(next).address_id;
            let cost = distances.get(prev_address, insert_address)
                + distances.get(insert_address, next_address)
                - distances.get(prev_address, next_address);
            if cost < min_cost {
                min_cost = cost;
                insert_after = prev;
                append = false;
            }
            next = prev;
        }

        if append {
            sequence.append(stop)?;
        } else {
            let next = sequence.next(insert_after).unwrap();
            sequence.insert_between(insert_after, next, stop)?;
        }
    }

    let mut stops = Vec::with_capacity(sequence.len());
    let mut total_distance = 0.0;
    let mut prev_address: Option<AddressId> = None;
    for stop in sequence.into_ordered() {
        if let Some(prev) = prev_address {
            total_distance += distances.get(prev, stop.address_id);
        }
        prev_address = Some(stop.address_id);
        stops.push(TourStop {
            distance_from_start: total_distance,
            stop,
        });
    }

    Ok(Tour {
        stops,
        total_distance,
    })
}
