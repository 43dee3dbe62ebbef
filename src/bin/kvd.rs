use std::{process::exit, thread};

use clap::{arg, builder::PossibleValue, command, value_parser, ArgMatches};
use kvtree::{
    thread_pool::{NaiveThreadPool, RayonThreadPool, SharedQueueThreadPool, ThreadPool},
    Backend, Dispatcher, KvServer, Result,
};
use log::{debug, error, info};

const DEFAULT_ADDR: &str = "127.0.0.1:8000";

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let matches = command!()
        .version(env!("CARGO_PKG_VERSION"))
        .author(env!("CARGO_PKG_AUTHORS"))
        .about(env!("CARGO_PKG_DESCRIPTION"))
        .arg(
            arg!(
                --addr <IP_PORT> "IP address of the server"
            )
            .required(false)
            .default_value(DEFAULT_ADDR)
            .id("ip")
            .value_parser(value_parser!(String)),
        )
        .arg(
            arg!(
                --backend <BACKEND> "Tree backing the store: binary or redblack [default: redblack]"
            )
            .required(false)
            .id("backend")
            .value_parser(value_parser!(String)),
        )
        .arg(
            arg!(
                --pool <POOL> "Thread pool serving the connections"
            )
            .required(false)
            .id("pool")
            .default_value("shared")
            .value_parser([
                PossibleValue::new("naive"),
                PossibleValue::new("shared"),
                PossibleValue::new("rayon"),
            ]),
        )
        .arg(
            arg!(
                --threads <N> "Number of worker threads"
            )
            .required(false)
            .id("threads")
            .value_parser(value_parser!(u32).range(1..)),
        )
        .get_matches();

    if let Err(e) = run(&matches) {
        error!("{}", e);
        exit(1);
    }
}

fn run(matches: &ArgMatches) -> Result<()> {
    let addr = matches
        .get_one::<String>("ip")
        .map(String::as_str)
        .unwrap_or(DEFAULT_ADDR);

    // an unknown name stops the server instead of falling back
    let backend = match matches.get_one::<String>("backend") {
        Some(name) => name.parse::<Backend>()?,
        None => Backend::default(),
    };

    let threads = matches.get_one::<u32>("threads").copied().unwrap_or_else(|| {
        thread::available_parallelism()
            .map(|n| n.get() as u32)
            .unwrap_or(4)
    });
    let pool = matches
        .get_one::<String>("pool")
        .map(String::as_str)
        .unwrap_or("shared");

    info!("kvd {}", env!("CARGO_PKG_VERSION"));
    info!("backend: {}", backend);
    info!("listening on {}", addr);
    debug!("pool: {}, threads: {}", pool, threads);

    let server = KvServer::new(Dispatcher::new(backend));
    match pool {
        "naive" => server.start(addr, NaiveThreadPool::new(threads)?),
        "rayon" => server.start(addr, RayonThreadPool::new(threads)?),
        _ => server.start(addr, SharedQueueThreadPool::new(threads)?),
    }
}
