use get_if_addrs::get_if_addrs;
use std::collections::HashMap;
use std::net::UdpSocket;

pub(crate) const LOOPBACK: &str = "127.0.0.1";

/// Devine l'adresse IP locale de la machine.
///
/// Crée un socket UDP et le "connecte" vers un DNS public : aucun paquet
/// n'est émis, mais le système choisit l'interface de sortie, dont on lit
/// l'adresse locale. En cas d'échec, retourne `127.0.0.1`.
///
/// Sur le jukebox, c'est l'adresse affichée par l'écran d'informations
/// réseau (interface Wi-Fi ou Ethernet selon le branchement).
pub fn guess_local_ip() -> String {
    match UdpSocket::bind("0.0.0.0:0") {
        Ok(socket) => {
            if socket.connect("8.8.8.8:80").is_ok() {
                if let Ok(local_addr) = socket.local_addr() {
                    return local_addr.ip().to_string();
                }
            }
            LOOPBACK.to_string()
        }
        Err(_) => LOOPBACK.to_string(),
    }
}

/// Liste toutes les adresses IPv4 non-loopback des interfaces réseau.
///
/// Clé : nom de l'interface (`eth0`, `wlan0`, ...), valeur : adresses de
/// l'interface. Retourne une table vide si les interfaces ne peuvent pas
/// être énumérées.
pub fn list_all_ips() -> HashMap<String, Vec<String>> {
    let mut result: HashMap<String, Vec<String>> = HashMap::new();

    if let Ok(interfaces) = get_if_addrs() {
        for iface in interfaces {
            let ip = iface.ip();
            if ip.is_loopback() || !ip.is_ipv4() {
                continue;
            }
            let addresses = result.entry(iface.name).or_default();
            let ip = ip.to_string();
            if !addresses.contains(&ip) {
                addresses.push(ip);
            }
        }
    }

    result
}
