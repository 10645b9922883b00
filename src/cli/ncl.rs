// SPDX-License-Identifier: Apache-2.0

mod config;
mod error;
mod select;

use env_logger::Builder;
use log::LevelFilter;
use serde::Serialize;

use crate::config::Config;
use crate::error::{CliError, EXIT_FAILURE};

const APP_NAME: &str = "setipctl";

fn main() {
    let matches = match clap::Command::new(APP_NAME)
        .version(clap::crate_version!())
        .about(
            "Set IPv4 address, netmask, gateway and DNS server of a network \
            interface via NetworkManager, netplan or network-scripts",
        )
        .override_usage(
            "setipctl [OPTIONS] <IP> [MASK|PREFIX] [GATEWAY] [DNS]\n    \
            setipctl [OPTIONS] dns <DNS>\n    \
            setipctl [OPTIONS] --list",
        )
        .arg(
            clap::Arg::new("verbose")
                .short('v')
                .multiple_occurrences(true)
                .help("Set verbose level"),
        )
        .arg(clap::Arg::new("quiet").short('q').help("Disable logging"))
        .arg(
            clap::Arg::new("ARGS")
                .index(1)
                .multiple_values(true)
                .required_unless_present("LIST")
                .help(
                    "IP address, netmask or prefix length, gateway and DNS \
                    server. Use 'dns <DNS>' to change DNS server only",
                ),
        )
        .arg(
            clap::Arg::new("INTERFACE")
                .short('i')
                .long("interface")
                .takes_value(true)
                .help("Interface to configure instead of asking"),
        )
        .arg(
            clap::Arg::new("LIST")
                .long("list")
                .takes_value(false)
                .conflicts_with("ARGS")
                .help("Show detected OS, backend and interfaces only"),
        )
        .arg(
            clap::Arg::new("JSON")
                .long("json")
                .takes_value(false)
                .help("Show result in json format"),
        )
        .arg(
            clap::Arg::new("NO_VERIFY")
                .long("no-verify")
                .takes_value(false)
                .help("Do not wait for the new IP address to show up"),
        )
        .arg(
            clap::Arg::new("TIMEOUT")
                .long("timeout")
                .takes_value(true)
                .help("Seconds to wait for the new IP address to show up"),
        )
        .arg(
            clap::Arg::new("CONFIG")
                .short('c')
                .long("config")
                .takes_value(true)
                .default_value(Config::DEFAULT_CONFIG_PATH)
                .help("Configuration file"),
        )
        .try_get_matches()
    {
        Ok(m) => m,
        Err(e) => {
            let code = match e.kind() {
                clap::ErrorKind::DisplayHelp
                | clap::ErrorKind::DisplayVersion => 0,
                _ => EXIT_FAILURE,
            };
            if let Err(e) = e.print() {
                eprintln!("{e}");
            }
            std::process::exit(code);
        }
    };

    let (log_module_filters, log_level) =
        match matches.occurrences_of("verbose") {
            0 => (vec!["setip", "setipctl"], LevelFilter::Info),
            1 => (vec!["setip", "setipctl"], LevelFilter::Debug),
            _ => (vec![""], LevelFilter::Debug),
        };

    if !matches.is_present("quiet") {
        let mut log_builder = Builder::new();
        for log_module_filter in log_module_filters {
            if !log_module_filter.is_empty() {
                log_builder.filter(Some(log_module_filter), log_level);
            } else {
                log_builder.filter(None, log_level);
            }
        }
        log_builder.init();
    }

    print_result_and_exit(apply(&matches));
}

fn print_result_and_exit(result: Result<String, CliError>) {
    match result {
        Ok(s) => {
            print!("{s}");
            std::process::exit(0);
        }
        Err(e) => {
            eprintln!("{e}");
            std::process::exit(e.code);
        }
    }
}

fn format_output<T: Serialize>(
    data: &T,
    json: bool,
) -> Result<String, CliError> {
    Ok(if json {
        serde_json::to_string_pretty(data)? + "\n"
    } else {
        serde_yaml::to_string(data)?
    })
}

#[cfg(feature = "query_apply")]
fn apply(matches: &clap::ArgMatches) -> Result<String, CliError> {
    use setip::{FixedInterface, HostSystem, SetIp};

    use crate::select::TerminalSelector;

    let config = Config::load(
        matches
            .value_of("CONFIG")
            .unwrap_or(Config::DEFAULT_CONFIG_PATH),
    )?;
    let timeout = match matches.value_of("TIMEOUT") {
        Some(t) => Some(t.parse::<u64>().map_err(|e| {
            CliError::from(format!("Invalid timeout '{t}': {e}"))
        })?),
        None => None,
    };
    let json = matches.is_present("JSON");
    let host = HostSystem::new();
    let setip = SetIp::new(
        &host,
        config.to_options(matches.is_present("NO_VERIFY"), timeout),
    );

    if matches.is_present("LIST") {
        return format_output(&setip.show()?, json);
    }

    let args: Vec<&str> = matches
        .values_of("ARGS")
        .map(|v| v.collect())
        .unwrap_or_default();
    let report = match matches.value_of("INTERFACE") {
        Some(iface) => {
            setip.run(args.as_slice(), &FixedInterface(iface.to_string()))?
        }
        None => setip.run(args.as_slice(), &TerminalSelector)?,
    };
    format_output(&report, json)
}

#[cfg(not(feature = "query_apply"))]
fn apply(_matches: &clap::ArgMatches) -> Result<String, CliError> {
    Err(CliError::from(
        "setipctl was built without the query_apply feature",
    ))
}
