use anyhow::{anyhow, Result};
use clap::{arg, Command};
use parcel_routing::{solve_all, Dataset, PackageId, Route};
use parcel_utils::DayTime;
use std::collections::HashSet;
use std::path::PathBuf;

fn cli() -> Command {
    Command::new("parcel")
        .about("Solves delivery routes and reports package status")
        .arg_required_else_help(true)
        .subcommand(
            Command::new("solve")
                .about("Solves every route plan in a dataset")
                .arg(
                    arg!(<DATASET> "Path to a dataset json file")
                        .value_parser(clap::value_parser!(PathBuf)),
                ),
        )
        .subcommand(
            Command::new("status")
                .about("Shows the status of every package at a clock time")
                .arg(
                    arg!(<DATASET> "Path to a dataset json file")
                        .value_parser(clap::value_parser!(PathBuf)),
                )
                .arg(
                    arg!(<TIME> "Clock time, e.g. 9:25")
                        .value_parser(clap::value_parser!(String)),
                )
                .arg(
                    arg!(--truck [TRUCK_ID] "Only packages carried by this truck")
                        .value_parser(clap::value_parser!(String)),
                ),
        )
        .subcommand(
            Command::new("lookup")
                .about("Looks up one package")
                .arg(
                    arg!(<DATASET> "Path to a dataset json file")
                        .value_parser(clap::value_parser!(PathBuf)),
                )
                .arg(arg!(<PACKAGE_ID> "Package id").value_parser(clap::value_parser!(usize)))
                .arg(
                    arg!(--time [TIME] "Clock time, e.g. 9:25")
                        .value_parser(clap::value_parser!(String)),
                ),
        )
}

fn main() -> Result<()> {
    env_logger::init();
    let matches = cli().get_matches();
    match matches.subcommand() {
        Some(("solve", sub)) => {
            let path: &PathBuf = sub.get_one("DATASET").unwrap();
            let mut dataset = Dataset::from_path(path)?;
            let routes = solve_all(&mut dataset)?;
            print_routes(&routes);
            Ok(())
        }
        Some(("status", sub)) => {
            let path: &PathBuf = sub.get_one("DATASET").unwrap();
            let time: DayTime = sub.get_one::<String>("TIME").unwrap().parse()?;
            let truck_id = sub.get_one::<String>("truck");
            let mut dataset = Dataset::from_path(path)?;
            let routes = solve_all(&mut dataset)?;
            print_status(&dataset, &routes, truck_id.map(String::as_str), time)
        }
        Some(("lookup", sub)) => {
            let path: &PathBuf = sub.get_one("DATASET").unwrap();
            let package_id: PackageId = *sub.get_one("PACKAGE_ID").unwrap();
            let time = sub
                .get_one::<String>("time")
                .map(|s| s.parse::<DayTime>())
                .transpose()?;
            let mut dataset = Dataset::from_path(path)?;
            solve_all(&mut dataset)?;
            print_package(&dataset, package_id, time)
        }
        _ => Err(anyhow!("invalid subcommand")),
    }
}

fn print_routes(routes: &[Route]) {
    let mut total = 0.0;
    for route in routes {
        print!("{}", route);
        total += route.total_distance;
    }
    println!("Total mileage: {:.1}", total);
}

/// Package ids carried by one truck, across all of its solved routes.
fn truck_package_ids(routes: &[Route], truck_id: &str) -> HashSet<PackageId> {
    routes
        .iter()
        .filter(|route| route.truck_id == truck_id)
        .flat_map(|route| &route.stops)
        .flat_map(|route_stop| route_stop.stop.package_ids.iter().copied())
        .collect()
}

fn print_status(
    dataset: &Dataset,
    routes: &[Route],
    truck_id: Option<&str>,
    time: DayTime,
) -> Result<()> {
    let carried = match truck_id {
        Some(id) => {
            dataset.truck(id)?;
            println!("Package status for {} at {}:", id, time);
            Some(truck_package_ids(routes, id))
        }
        None => {
            println!("Package status at {}:", time);
            None
        }
    };
    for (_, package) in dataset.packages.iter() {
        if carried.as_ref().is_some_and(|ids| !ids.contains(&package.id)) {
            continue;
        }
        println!("\t[{}] {}", package.status_at(time), package);
    }
    Ok(())
}

fn print_package(dataset: &Dataset, package_id: PackageId, time: Option<DayTime>) -> Result<()> {
    let package = dataset.package(package_id)?;
    let address = dataset.address(package.address_id)?;
    println!("{}", package);
    println!("\t{}", address.full_address());
    if let Some(time) = time {
        println!("\tStatus at {}: {}", time, package.status_at(time));
    }
    if let (Some(departure), Some(delivery)) = (package.departure_time, package.delivery_time) {
        println!("\tDeparture: {} - Delivery: {}", departure, delivery);
        if delivery > package.latest {
            println!("\t[Warning] Late delivery");
        }
    }
    Ok(())
}
