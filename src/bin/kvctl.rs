use std::process::exit;

use clap::{arg, command, value_parser, ArgMatches, Command};
use kvtree::{KvClient, KvError, Result};
use log::debug;

const DEFAULT_ADDR: &str = "127.0.0.1:8000";

fn main() {
    env_logger::init();

    let matches = command!()
        .version(env!("CARGO_PKG_VERSION"))
        .author(env!("CARGO_PKG_AUTHORS"))
        .about(env!("CARGO_PKG_DESCRIPTION"))
        .subcommand_required(true)
        .arg(
            arg!(
                --addr <IP_PORT> "IP address of the server"
            )
            .required(false)
            .id("ip")
            .default_value(DEFAULT_ADDR)
            .global(true)
            .value_parser(value_parser!(String)),
        )
        .subcommand(
            Command::new("put")
                .about("Set the value of a string key to a string")
                .arg(
                    arg!(<KEY>)
                        .help("A string key")
                        .id("key")
                        .required(true)
                        .value_parser(value_parser!(String)),
                )
                .arg(
                    arg!(<VALUE>)
                        .help("A string value")
                        .id("val")
                        .required(true)
                        .value_parser(value_parser!(String)),
                ),
        )
        .subcommand(
            Command::new("get")
                .about("Get the string value of a given string key")
                .arg(
                    arg!(<KEY>)
                        .help("A string key to fetch from the server")
                        .id("key")
                        .required(true)
                        .value_parser(value_parser!(String)),
                ),
        )
        .subcommand(
            Command::new("del").about("Remove a given key").arg(
                arg!(<KEY>)
                    .help("A string key to delete from the server")
                    .id("key")
                    .required(true)
                    .value_parser(value_parser!(String)),
            ),
        )
        .subcommand(Command::new("walk").about("Print every key and value in key order"))
        .get_matches();

    if let Err(e) = run(&matches) {
        match e {
            KvError::KeyNotFound => eprintln!("Key not found"),
            e => eprintln!("{}", e),
        }
        exit(1);
    }
}

fn run(matches: &ArgMatches) -> Result<()> {
    let addr = matches
        .get_one::<String>("ip")
        .map(String::as_str)
        .unwrap_or(DEFAULT_ADDR);
    debug!("Trying to connect server on {}", addr);

    match matches.subcommand() {
        Some(("put", sub_m)) => {
            let (key, val) = (arg(sub_m, "key"), arg(sub_m, "val"));
            KvClient::connect(addr)?.put(key, val)
        }
        Some(("get", sub_m)) => match KvClient::connect(addr)?.get(arg(sub_m, "key")) {
            Ok(value) => {
                println!("{}", value);
                Ok(())
            }
            Err(KvError::KeyNotFound) => {
                println!("Key not found");
                Ok(())
            }
            Err(e) => Err(e),
        },
        Some(("del", sub_m)) => KvClient::connect(addr)?.delete(arg(sub_m, "key")),
        Some(("walk", _)) => {
            for (key, value) in KvClient::connect(addr)?.walk()? {
                println!("{}\t{}", key, value);
            }
            Ok(())
        }
        _ => unreachable!("clap requires a known subcommand"),
    }
}

fn arg(matches: &ArgMatches, id: &str) -> String {
    matches.get_one::<String>(id).cloned().unwrap_or_default()
}
