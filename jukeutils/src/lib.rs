//! Utilitaires système pour le jukebox.
//!
//! Ce crate regroupe les petites fonctions d'introspection de l'hôte dont
//! le contrôleur a besoin pour l'écran d'informations réseau :
//!
//! - [`guess_local_ip`] : devine l'adresse IP locale utilisée pour sortir
//! - [`list_all_ips`] : liste les adresses IPv4 non-loopback par interface
//! - [`host_name`] : nom d'hôte de la machine
//!
//! # Examples
//!
//! ```no_run
//! use jukeutils::{guess_local_ip, host_name};
//!
//! println!("{} ({})", host_name(), guess_local_ip());
//! ```
mod ip_utils;

pub use ip_utils::{guess_local_ip, list_all_ips};

use std::collections::HashMap;

use sysinfo::System;

const UNKNOWN_HOST: &str = "unknown";

/// Retourne le nom d'hôte de la machine, ou `"unknown"` s'il n'est pas disponible.
pub fn host_name() -> String {
    System::host_name()
        .filter(|name| !name.trim().is_empty())
        .unwrap_or_else(|| UNKNOWN_HOST.to_string())
}

/// Host name and preferred local address, as shown on the network info screen.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NetworkSummary {
    pub host_name: String,
    pub ip: String,
}

/// Interfaces looked at first when there is no outgoing route.
const PREFERRED_INTERFACES: [&str; 3] = ["wlan0", "eth0", "eno1"];

/// Collects the host name and the address used for outgoing traffic.
///
/// Without a route (offline jukebox) the address of a local interface is
/// used instead, `wlan0` first.
pub fn network_summary() -> NetworkSummary {
    let ip = match guess_local_ip() {
        ip if ip == ip_utils::LOOPBACK => pick_interface_ip(&list_all_ips()).unwrap_or(ip),
        ip => ip,
    };
    NetworkSummary {
        host_name: host_name(),
        ip,
    }
}

fn pick_interface_ip(ips: &HashMap<String, Vec<String>>) -> Option<String> {
    PREFERRED_INTERFACES
        .iter()
        .find_map(|name| ips.get(*name).and_then(|a| a.first()))
        .or_else(|| {
            let mut names: Vec<&String> = ips.keys().collect();
            names.sort();
            names.into_iter().find_map(|name| ips[name].first())
        })
        .cloned()
}
